use super::*;

#[test]
fn maps_start_and_end_edges() {
    // Region top meets viewport top at scroll 100; region bottom meets
    // viewport bottom at scroll 100 + (4000 - 1000).
    let region = ScrollRegion::new(100.0, 4000.0, 1000.0).unwrap();
    assert_eq!(region.extent(), 3000.0);
    assert_eq!(region.progress_at(100.0), 0.0);
    assert_eq!(region.progress_at(1600.0), 0.5);
    assert_eq!(region.progress_at(3100.0), 1.0);
}

#[test]
fn clamps_outside_the_region() {
    let region = ScrollRegion::new(100.0, 4000.0, 1000.0).unwrap();
    assert_eq!(region.progress_at(0.0), 0.0);
    assert_eq!(region.progress_at(10_000.0), 1.0);
}

#[test]
fn degenerate_region_snaps_to_the_edges() {
    let region = ScrollRegion::new(50.0, 500.0, 500.0).unwrap();
    assert_eq!(region.progress_at(0.0), 0.0);
    assert_eq!(region.progress_at(50.0), 1.0);
    assert_eq!(region.progress_at(60.0), 1.0);
}

#[test]
fn rejects_invalid_geometry() {
    assert!(ScrollRegion::new(0.0, 0.0, 100.0).is_err());
    assert!(ScrollRegion::new(0.0, 100.0, 0.0).is_err());
    assert!(ScrollRegion::new(f64::INFINITY, 100.0, 100.0).is_err());
}
