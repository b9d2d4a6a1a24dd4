use memscape::config::LayoutConfig;
use memscape::packer::{radius_for, Canvas, Packer, Placement, PlacedCircle, SearchResult};
use memscape::ranker::{rank, RankedEntry};
use memscape::sampler::ProcessSample;
use memscape::store::PositionStore;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn entries(items: &[(&str, f64, f64)]) -> Vec<RankedEntry> {
    let samples = items
        .iter()
        .enumerate()
        .map(|(i, &(name, mb, cpu))| ProcessSample::new(name, mb, cpu, i as u32 + 100))
        .collect();
    rank(samples, 0.0, usize::MAX)
}

fn assert_clean_placements_do_not_overlap(circles: &[PlacedCircle]) {
    for (i, c) in circles.iter().enumerate() {
        if c.placement != Placement::Placed {
            continue;
        }
        for earlier in &circles[..i] {
            let d = (c.x - earlier.x).hypot(c.y - earlier.y);
            assert!(d >= c.radius + earlier.radius, "{} overlaps {}", c.identity, earlier.identity);
        }
    }
}

const SCREEN: Canvas = Canvas { width: 1366.0, height: 768.0 };

#[test]
fn test_three_entries_on_empty_store() {
    let layout = LayoutConfig::default();
    let batch = entries(&[("chrome", 1200.0, 65.0), ("code", 800.0, 15.0), ("slack", 50.0, 5.0)]);
    let mut packer = Packer::new(&layout, StdRng::seed_from_u64(7));
    let (circles, store) = packer.place(&batch, PositionStore::new(), SCREEN);

    let ids: Vec<&str> = circles.iter().map(|c| c.identity.as_str()).collect();
    assert_eq!(ids, vec!["chrome", "code", "slack"]);
    assert!(circles[0].radius > circles[1].radius);
    assert!(circles[1].radius > circles[2].radius);
    for c in &circles {
        assert_eq!(c.placement, Placement::Placed);
        assert!(c.x >= c.radius && c.x <= SCREEN.width - c.radius);
        assert!(c.y >= c.radius && c.y <= SCREEN.height - c.radius);
        assert_eq!(store.get(&c.identity), Some((c.x, c.y)));
    }
    assert_clean_placements_do_not_overlap(&circles);
}

#[test]
fn test_stored_position_is_reused_exactly() {
    let layout = LayoutConfig::default();
    let batch = entries(&[("chrome", 1200.0, 65.0), ("code", 800.0, 15.0), ("slack", 50.0, 5.0)]);
    let mut store = PositionStore::new();
    store.upsert("chrome", 2.0, 3.0);
    store.upsert("gone", 400.0, 400.0);

    let mut packer = Packer::new(&layout, StdRng::seed_from_u64(99));
    let (circles, updated) = packer.place(&batch, store, SCREEN);

    assert_eq!((circles[0].x, circles[0].y), (2.0, 3.0));
    assert_eq!(circles[0].placement, Placement::Stored);
    for c in &circles[1..] {
        assert_eq!(c.placement, Placement::Placed);
        assert!(!circles[0].overlaps(c.x, c.y, c.radius));
    }
    assert_eq!(updated.get("chrome"), Some((2.0, 3.0)));
    assert_eq!(updated.get("gone"), Some((400.0, 400.0)));
    assert_eq!(updated.len(), 4);
}

#[test]
fn test_rerun_with_saved_store_is_identical() {
    let layout = LayoutConfig::default();
    let batch = entries(&[("a", 900.0, 0.0), ("b", 500.0, 0.0), ("c", 300.0, 0.0), ("d", 100.0, 0.0)]);
    let (first, store) = Packer::new(&layout, StdRng::seed_from_u64(1)).place(&batch, PositionStore::new(), SCREEN);
    let (second, store_again) = Packer::new(&layout, StdRng::seed_from_u64(2)).place(&batch, store.clone(), SCREEN);

    for (a, b) in first.iter().zip(&second) {
        assert_eq!((a.x, a.y), (b.x, b.y));
        assert_eq!(b.placement, Placement::Stored);
    }
    assert_eq!(store, store_again);
}

#[test]
fn test_exhausted_search_accepts_overlap() {
    let layout = LayoutConfig {
        max_attempts: 5,
        ..LayoutConfig::default()
    };
    let batch = entries(&[("a", 100.0, 0.0), ("b", 90.0, 0.0)]);
    let tiny = Canvas::new(10.0, 10.0);
    let (circles, _) = Packer::new(&layout, StdRng::seed_from_u64(3)).place(&batch, PositionStore::new(), tiny);

    // diameter exceeds the canvas, so both collapse onto the center
    assert_eq!(circles[0].placement, Placement::Placed);
    assert_eq!((circles[0].x, circles[0].y), (5.0, 5.0));
    assert_eq!(circles[1].placement, Placement::PlacedWithOverlap);
    assert_eq!((circles[1].x, circles[1].y), (5.0, 5.0));
}

#[test]
fn test_search_reports_clean_placement() {
    let layout = LayoutConfig::default();
    let mut packer = Packer::new(&layout, StdRng::seed_from_u64(5));
    match packer.search(20.0, &[], SCREEN) {
        SearchResult::Placed { x, y } => {
            assert!((20.0..=1346.0).contains(&x));
            assert!((20.0..=748.0).contains(&y));
        }
        other => panic!("expected a clean placement, got {:?}", other),
    }
}

#[test]
fn test_radius_bounds() {
    let layout = LayoutConfig::default();
    let largest = radius_for(1200.0, 1200.0, &layout);
    let expected = ((layout.area_scale + layout.area_floor) / std::f64::consts::PI).sqrt();
    assert!((largest - expected).abs() < 1e-9);
    let floor = (layout.area_floor / std::f64::consts::PI).sqrt();
    assert!((radius_for(0.0, 1200.0, &layout) - floor).abs() < 1e-9);
    assert!((radius_for(0.0, 0.0, &layout) - floor).abs() < 1e-9);
}

proptest! {
    #[test]
    fn prop_radius_is_monotonic(a in 0.0f64..10_000.0, b in 0.0f64..10_000.0) {
        prop_assume!(a != b);
        let layout = LayoutConfig::default();
        let max = a.max(b);
        let (big, small) = if a > b { (a, b) } else { (b, a) };
        prop_assert!(radius_for(big, max, &layout) > radius_for(small, max, &layout));
    }

    #[test]
    fn prop_clean_placements_never_overlap(
        mems in prop::collection::vec(50u32..4000, 1..10),
        seed in any::<u64>(),
    ) {
        let layout = LayoutConfig::default();
        let names: Vec<String> = (0..mems.len()).map(|i| format!("p{}", i)).collect();
        let items: Vec<(&str, f64, f64)> = names
            .iter()
            .zip(&mems)
            .map(|(n, &m)| (n.as_str(), m as f64, 0.0))
            .collect();
        let batch = entries(&items);
        let (circles, store) = Packer::new(&layout, StdRng::seed_from_u64(seed))
            .place(&batch, PositionStore::new(), SCREEN);
        prop_assert_eq!(circles.len(), batch.len());
        prop_assert_eq!(store.len(), batch.len());
        assert_clean_placements_do_not_overlap(&circles);
    }

    #[test]
    fn prop_stored_identities_are_placed_bit_exact(
        xs in prop::collection::vec((0.0f64..1366.0, 0.0f64..768.0), 1..8),
        seed in any::<u64>(),
    ) {
        let layout = LayoutConfig::default();
        let mut store = PositionStore::new();
        let names: Vec<String> = (0..xs.len()).map(|i| format!("p{}", i)).collect();
        for (name, &(x, y)) in names.iter().zip(&xs) {
            store.upsert(name, x, y);
        }
        let items: Vec<(&str, f64, f64)> = names.iter().map(|n| (n.as_str(), 100.0, 0.0)).collect();
        let batch = entries(&items);
        let (circles, _) = Packer::new(&layout, StdRng::seed_from_u64(seed)).place(&batch, store.clone(), SCREEN);
        for c in &circles {
            prop_assert_eq!(Some((c.x, c.y)), store.get(&c.identity));
            prop_assert_eq!(c.placement, Placement::Stored);
        }
    }
}
