use std::time::Duration;

use super::*;
use crate::assets::fetch::ManualFetcher;

fn sources(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("frame_{i:03}.jpg")).collect()
}

fn marker(index: usize) -> LoadedFrame {
    LoadedFrame::solid(1, 1, [index as u8, 0, 0, 255]).unwrap()
}

fn marker_index(frame: &LoadedFrame) -> u8 {
    frame.rgba8_premul[0]
}

fn opts(priority: usize, chunk: usize, delay_ms: u64) -> LoaderOpts {
    LoaderOpts {
        priority_count: priority,
        stream_chunk_size: chunk,
        stream_delay_ms: delay_ms,
    }
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn dispatched_indices(fetcher: &ManualFetcher) -> Vec<usize> {
    fetcher.dispatched().iter().map(|r| r.index).collect()
}

#[test]
fn construction_dispatches_the_priority_window() {
    let mut fetcher = ManualFetcher::new();
    let loader = SequenceLoader::new(sources(5), opts(2, 2, 50), &mut fetcher, ms(0)).unwrap();

    assert_eq!(dispatched_indices(&fetcher), vec![0, 1]);
    assert_eq!(loader.len(), 5);
    assert!(!loader.is_ready());
    assert!(!loader.is_fully_loaded());
}

#[test]
fn background_batches_follow_a_fixed_cadence() {
    let mut fetcher = ManualFetcher::new();
    let mut loader = SequenceLoader::new(sources(5), opts(2, 2, 50), &mut fetcher, ms(0)).unwrap();

    loader.pump(&mut fetcher, ms(49));
    assert_eq!(dispatched_indices(&fetcher), vec![0, 1]);

    loader.pump(&mut fetcher, ms(50));
    assert_eq!(dispatched_indices(&fetcher), vec![0, 1, 2, 3]);

    loader.pump(&mut fetcher, ms(99));
    assert_eq!(dispatched_indices(&fetcher), vec![0, 1, 2, 3]);

    loader.pump(&mut fetcher, ms(100));
    assert_eq!(dispatched_indices(&fetcher), vec![0, 1, 2, 3, 4]);

    // Cursor exhausted: no further dispatches at any later time.
    loader.pump(&mut fetcher, ms(10_000));
    assert_eq!(fetcher.dispatched().len(), 5);
}

#[test]
fn readiness_follows_priority_and_first_load() {
    let mut fetcher = ManualFetcher::new();
    let mut loader = SequenceLoader::new(sources(5), opts(2, 2, 50), &mut fetcher, ms(0)).unwrap();
    let epoch = fetcher.dispatched()[0].epoch;

    // Any single resolution anywhere makes the loader usable.
    fetcher.complete(epoch, 1, Some(marker(1)));
    loader.pump(&mut fetcher, ms(0));
    assert!(loader.is_ready());
    assert_eq!(loader.loaded_count(), 1);
    assert_eq!(loader.priority_loaded_count(), 1);

    fetcher.complete(epoch, 0, Some(marker(0)));
    loader.pump(&mut fetcher, ms(0));
    assert_eq!(loader.priority_loaded_count(), 2);
    assert!(!loader.is_fully_loaded());
}

#[test]
fn scenario_five_frames_full_lifecycle() {
    let mut fetcher = ManualFetcher::new();
    let mut loader = SequenceLoader::new(sources(5), opts(2, 2, 50), &mut fetcher, ms(0)).unwrap();

    loader.pump(&mut fetcher, ms(50));
    loader.pump(&mut fetcher, ms(100));
    assert_eq!(dispatched_indices(&fetcher), vec![0, 1, 2, 3, 4]);

    let requests: Vec<_> = fetcher.dispatched().to_vec();
    for request in &requests {
        fetcher.complete(request.epoch, request.index, Some(marker(request.index)));
    }
    loader.pump(&mut fetcher, ms(100));

    assert!(loader.is_fully_loaded());
    assert_eq!(loader.loaded_count(), 5);
}

#[test]
fn loaded_count_is_monotonic_and_bounded() {
    let mut fetcher = ManualFetcher::new();
    let mut loader = SequenceLoader::new(sources(4), opts(4, 2, 50), &mut fetcher, ms(0)).unwrap();
    let epoch = fetcher.dispatched()[0].epoch;

    let mut last = 0;
    for index in [2, 0, 0, 3, 1, 2] {
        fetcher.complete(epoch, index, Some(marker(index)));
        loader.pump(&mut fetcher, ms(0));
        assert!(loader.loaded_count() >= last);
        assert!(loader.loaded_count() <= loader.len());
        last = loader.loaded_count();
    }
    // Duplicate resolutions for 0 and 2 were ignored.
    assert_eq!(loader.loaded_count(), 4);
}

#[test]
fn single_loaded_slot_serves_every_position() {
    let mut fetcher = ManualFetcher::new();
    let mut loader = SequenceLoader::new(sources(7), opts(7, 2, 50), &mut fetcher, ms(0)).unwrap();
    let epoch = fetcher.dispatched()[0].epoch;

    fetcher.complete(epoch, 4, Some(marker(4)));
    loader.pump(&mut fetcher, ms(0));

    for progress in [0.0, 0.3, 0.5, 0.99, 1.0] {
        let frame = loader.get_frame(progress).expect("nearest frame");
        assert_eq!(marker_index(&frame), 4);
    }
}

#[test]
fn full_coverage_is_exact_and_deterministic() {
    let mut fetcher = ManualFetcher::new();
    let mut loader = SequenceLoader::new(sources(5), opts(5, 2, 50), &mut fetcher, ms(0)).unwrap();
    let epoch = fetcher.dispatched()[0].epoch;

    for index in 0..5 {
        fetcher.complete(epoch, index, Some(marker(index)));
    }
    loader.pump(&mut fetcher, ms(0));
    assert!(loader.is_fully_loaded());

    for progress in [0.0, 0.19, 0.2, 0.5, 0.81, 0.99, 1.0] {
        let expected = crate::foundation::core::frame_index(progress, 5).unwrap();
        let frame = loader.get_frame(progress).unwrap();
        assert_eq!(usize::from(marker_index(&frame)), expected);
    }
}

#[test]
fn failed_slots_are_skipped_by_the_nearest_search() {
    let mut fetcher = ManualFetcher::new();
    let mut loader = SequenceLoader::new(sources(3), opts(3, 2, 50), &mut fetcher, ms(0)).unwrap();
    let epoch = fetcher.dispatched()[0].epoch;

    fetcher.complete(epoch, 1, None);
    fetcher.complete(epoch, 0, Some(marker(0)));
    loader.pump(&mut fetcher, ms(0));

    // Failures still count as resolved.
    assert_eq!(loader.loaded_count(), 2);
    // Progress 0.5 targets the failed slot 1; its nearest loaded neighbor wins.
    let frame = loader.get_frame(0.5).unwrap();
    assert_eq!(marker_index(&frame), 0);
}

#[test]
fn stale_completions_never_touch_the_new_sequence() {
    let mut fetcher = ManualFetcher::new();
    let mut loader = SequenceLoader::new(sources(80), opts(8, 6, 120), &mut fetcher, ms(0)).unwrap();
    let old_requests: Vec<_> = fetcher.dispatched().to_vec();

    loader.set_sources(sources(3), &mut fetcher, ms(0));

    // Late resolutions from the 80-frame sequence arrive after the swap.
    for request in &old_requests {
        fetcher.complete(request.epoch, request.index, Some(marker(request.index)));
    }
    loader.pump(&mut fetcher, ms(0));

    assert_eq!(loader.len(), 3);
    assert_eq!(loader.loaded_count(), 0);
    assert!(loader.frames().iter().all(|slot| slot.is_none()));
    assert!(!loader.is_ready());

    // The new epoch still accepts its own completions.
    let new_epoch = fetcher.dispatched().last().unwrap().epoch;
    fetcher.complete(new_epoch, 0, Some(marker(0)));
    loader.pump(&mut fetcher, ms(0));
    assert_eq!(loader.loaded_count(), 1);
    assert!(loader.is_ready());
}

#[test]
fn slot_array_is_replaced_not_mutated() {
    let mut fetcher = ManualFetcher::new();
    let mut loader = SequenceLoader::new(sources(3), opts(3, 2, 50), &mut fetcher, ms(0)).unwrap();
    let epoch = fetcher.dispatched()[0].epoch;

    let before = loader.frames();
    fetcher.complete(epoch, 1, Some(marker(1)));
    loader.pump(&mut fetcher, ms(0));
    let after = loader.frames();

    assert!(!std::sync::Arc::ptr_eq(&before, &after));
    // A snapshot taken before the fill is untouched.
    assert!(before.iter().all(|slot| slot.is_none()));
    assert!(after[1].is_some());
}

#[test]
fn empty_sequence_is_never_ready() {
    let mut fetcher = ManualFetcher::new();
    let mut loader =
        SequenceLoader::new(Vec::new(), LoaderOpts::default(), &mut fetcher, ms(0)).unwrap();

    assert!(fetcher.dispatched().is_empty());
    loader.pump(&mut fetcher, ms(10_000));
    assert!(fetcher.dispatched().is_empty());
    assert!(!loader.is_ready());
    assert!(!loader.is_fully_loaded());
    assert!(loader.get_frame(0.5).is_none());
}

#[test]
fn priority_count_is_normalized_to_the_sequence() {
    let mut fetcher = ManualFetcher::new();
    // priority_count 0 still fetches one frame up front.
    let loader = SequenceLoader::new(sources(5), opts(0, 2, 50), &mut fetcher, ms(0)).unwrap();
    assert_eq!(dispatched_indices(&fetcher), vec![0]);
    drop(loader);

    let mut fetcher = ManualFetcher::new();
    // priority_count larger than the sequence covers everything immediately.
    let loader = SequenceLoader::new(sources(3), opts(8, 2, 50), &mut fetcher, ms(0)).unwrap();
    assert_eq!(dispatched_indices(&fetcher), vec![0, 1, 2]);
    drop(loader);
}

#[test]
fn zero_chunk_size_is_rejected() {
    let mut fetcher = ManualFetcher::new();
    assert!(SequenceLoader::new(sources(3), opts(2, 0, 50), &mut fetcher, ms(0)).is_err());
}
