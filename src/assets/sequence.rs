use std::sync::Arc;
use std::time::Duration;

use crate::assets::fetch::{FrameFetcher, FrameRequest, LoadedFrame};
use crate::foundation::core::{clamp_progress, frame_index};
use crate::foundation::error::{FilmstripError, FilmstripResult};

/// Loading policy for a frame sequence.
///
/// The first `priority_count` frames are dispatched immediately and in
/// parallel; the remainder streams in `stream_chunk_size`-frame batches on a
/// fixed `stream_delay_ms` cadence. The cadence bounds in-flight work and
/// yields the driving thread between batches, trading total load latency for
/// responsiveness during initial paint.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoaderOpts {
    /// Frames fetched immediately, starting at index 0.
    pub priority_count: usize,
    /// Frames fetched per background batch.
    pub stream_chunk_size: usize,
    /// Delay between background batch dispatches, in milliseconds.
    pub stream_delay_ms: u64,
}

impl Default for LoaderOpts {
    fn default() -> Self {
        Self {
            priority_count: 8,
            stream_chunk_size: 6,
            stream_delay_ms: 120,
        }
    }
}

impl LoaderOpts {
    /// Validate the policy.
    pub fn validate(&self) -> FilmstripResult<()> {
        if self.stream_chunk_size == 0 {
            return Err(FilmstripError::validation(
                "LoaderOpts stream_chunk_size must be >= 1",
            ));
        }
        Ok(())
    }

    /// Background batch cadence as a [`Duration`].
    pub fn stream_delay(&self) -> Duration {
        Duration::from_millis(self.stream_delay_ms)
    }
}

/// Progressive loader for an ordered image sequence.
///
/// The loader never blocks its caller: fetches are dispatched through a
/// [`FrameFetcher`] and their completions applied during [`pump`]. The frame
/// slot array is replaced wholesale (new `Arc`) on every fill, so a snapshot
/// taken by a reader stays internally consistent, and a bumped `epoch`
/// discards completions from a superseded sequence.
///
/// Time is an explicit `now: Duration` (elapsed on the host's timeline); the
/// loader never reads a clock itself.
///
/// [`pump`]: Self::pump
#[derive(Debug)]
pub struct SequenceLoader {
    sources: Vec<String>,
    opts: LoaderOpts,
    epoch: u64,

    frames: Arc<Vec<Option<Arc<LoadedFrame>>>>,
    resolved: Vec<bool>,
    loaded_count: usize,
    priority_loaded_count: usize,

    // Normalized for the current source list: at least 1, at most len.
    priority_count: usize,
    next_stream_index: usize,
    next_batch_at: Option<Duration>,
}

impl SequenceLoader {
    /// Create a loader and immediately dispatch the priority window.
    pub fn new(
        sources: Vec<String>,
        opts: LoaderOpts,
        fetcher: &mut dyn FrameFetcher,
        now: Duration,
    ) -> FilmstripResult<Self> {
        opts.validate()?;
        let mut loader = Self {
            sources: Vec::new(),
            opts,
            epoch: 0,
            frames: Arc::new(Vec::new()),
            resolved: Vec::new(),
            loaded_count: 0,
            priority_loaded_count: 0,
            priority_count: 0,
            next_stream_index: 0,
            next_batch_at: None,
        };
        loader.set_sources(sources, fetcher, now);
        Ok(loader)
    }

    /// Replace the sequence with a new source list.
    ///
    /// All bookkeeping for the previous sequence is discarded and its
    /// in-flight fetches become stale: their completions are dropped by the
    /// epoch guard in [`pump`](Self::pump).
    pub fn set_sources(
        &mut self,
        sources: Vec<String>,
        fetcher: &mut dyn FrameFetcher,
        now: Duration,
    ) {
        self.epoch += 1;
        let len = sources.len();
        self.sources = sources;
        self.frames = Arc::new(vec![None; len]);
        self.resolved = vec![false; len];
        self.loaded_count = 0;
        self.priority_loaded_count = 0;
        self.priority_count = if len == 0 {
            0
        } else {
            self.opts.priority_count.clamp(1, len)
        };
        self.next_stream_index = self.priority_count;
        self.next_batch_at = if self.next_stream_index < len {
            Some(now + self.opts.stream_delay())
        } else {
            None
        };

        tracing::debug!(
            epoch = self.epoch,
            frames = len,
            priority = self.priority_count,
            "sequence (re)initialized"
        );
        for index in 0..self.priority_count {
            self.dispatch(fetcher, index);
        }
    }

    fn dispatch(&self, fetcher: &mut dyn FrameFetcher, index: usize) {
        fetcher.dispatch(FrameRequest {
            epoch: self.epoch,
            index,
            source: self.sources[index].clone(),
        });
    }

    /// Dispatch due background batches and apply arrived completions.
    ///
    /// Batch cadence is fixed: batch *k+1* is due `stream_delay_ms` after
    /// batch *k* was dispatched, regardless of how long individual fetches
    /// take.
    pub fn pump(&mut self, fetcher: &mut dyn FrameFetcher, now: Duration) {
        while let Some(due) = self.next_batch_at {
            if due > now {
                break;
            }
            let end = (self.next_stream_index + self.opts.stream_chunk_size).min(self.sources.len());
            tracing::trace!(
                epoch = self.epoch,
                from = self.next_stream_index,
                to = end,
                "dispatching background batch"
            );
            for index in self.next_stream_index..end {
                self.dispatch(fetcher, index);
            }
            self.next_stream_index = end;
            self.next_batch_at = if end < self.sources.len() {
                Some(due + self.opts.stream_delay())
            } else {
                None
            };
        }

        for outcome in fetcher.drain() {
            if outcome.epoch != self.epoch {
                tracing::trace!(
                    stale_epoch = outcome.epoch,
                    index = outcome.index,
                    "dropping stale completion"
                );
                continue;
            }
            self.apply(outcome.index, outcome.frame);
        }
    }

    fn apply(&mut self, index: usize, frame: Option<LoadedFrame>) {
        if index >= self.resolved.len() || self.resolved[index] {
            return;
        }
        self.resolved[index] = true;

        let mut frames = self.frames.as_ref().clone();
        frames[index] = frame.map(Arc::new);
        self.frames = Arc::new(frames);

        self.loaded_count += 1;
        if index < self.priority_count {
            self.priority_loaded_count += 1;
        }
    }

    /// Number of frames in the sequence.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// True for an empty sequence.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Slots that have resolved (successfully or not).
    pub fn loaded_count(&self) -> usize {
        self.loaded_count
    }

    /// Resolved slots within the priority window.
    pub fn priority_loaded_count(&self) -> usize {
        self.priority_loaded_count
    }

    /// True once the priority window has fully resolved, or any slot has.
    ///
    /// An empty sequence is never ready.
    pub fn is_ready(&self) -> bool {
        !self.is_empty()
            && (self.priority_loaded_count >= self.priority_count || self.loaded_count > 0)
    }

    /// True once every slot has resolved.
    pub fn is_fully_loaded(&self) -> bool {
        !self.is_empty() && self.loaded_count == self.sources.len()
    }

    /// Snapshot of the current slot array.
    pub fn frames(&self) -> Arc<Vec<Option<Arc<LoadedFrame>>>> {
        Arc::clone(&self.frames)
    }

    /// Best available frame for a normalized position.
    ///
    /// Maps `progress` to its frame index, then searches outward with
    /// alternating backward/forward offsets for the nearest loaded slot.
    /// Returns `None` only while no slot anywhere has loaded. During early
    /// loading this may return a nearby rather than exact frame; perceived
    /// continuity is preferred over frame-exactness.
    pub fn get_frame(&self, progress: f64) -> Option<Arc<LoadedFrame>> {
        let len = self.frames.len();
        let target = frame_index(clamp_progress(progress), len)?;

        if let Some(frame) = &self.frames[target] {
            return Some(Arc::clone(frame));
        }
        for offset in 1..len {
            if offset <= target
                && let Some(frame) = &self.frames[target - offset]
            {
                return Some(Arc::clone(frame));
            }
            if let Some(Some(frame)) = self.frames.get(target + offset) {
                return Some(Arc::clone(frame));
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/sequence.rs"]
mod tests;
