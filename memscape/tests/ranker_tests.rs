use memscape::ranker::rank;
use memscape::sampler::ProcessSample;
use proptest::prelude::*;

fn sample(name: &str, mb: f64) -> ProcessSample {
    ProcessSample::new(name, mb, 0.0, 1)
}

#[test]
fn test_filters_sorts_and_truncates() {
    let ranked = rank(
        vec![
            sample("slack", 50.0),
            sample("tiny", 49.9),
            sample("chrome", 1200.0),
            sample("code", 800.0),
        ],
        50.0,
        2,
    );
    let ids: Vec<&str> = ranked.iter().map(|e| e.sample.identity.as_str()).collect();
    assert_eq!(ids, vec!["chrome", "code"]);
    assert_eq!(ranked[0].rank, 0);
    assert_eq!(ranked[1].rank, 1);
}

#[test]
fn test_floor_is_inclusive() {
    let ranked = rank(vec![sample("slack", 50.0)], 50.0, 6);
    assert_eq!(ranked.len(), 1);
}

#[test]
fn test_nothing_above_floor_is_empty() {
    assert!(rank(vec![sample("a", 10.0), sample("b", 20.0)], 50.0, 6).is_empty());
    assert!(rank(vec![], 0.0, 6).is_empty());
    assert!(rank(vec![sample("a", 100.0)], 50.0, 0).is_empty());
}

#[test]
fn test_ties_keep_input_order() {
    let ranked = rank(
        vec![sample("b", 100.0), sample("a", 100.0), sample("c", 200.0), sample("d", 100.0)],
        0.0,
        10,
    );
    let ids: Vec<&str> = ranked.iter().map(|e| e.sample.identity.as_str()).collect();
    assert_eq!(ids, vec!["c", "b", "a", "d"]);
}

proptest! {
    #[test]
    fn prop_rank_respects_limit_floor_and_order(
        mems in prop::collection::vec(0u32..5000, 0..40),
        min_mb in 0u32..2000,
        limit in 0usize..12,
    ) {
        let samples: Vec<ProcessSample> = mems
            .iter()
            .enumerate()
            .map(|(i, &m)| sample(&format!("p{}", i), m as f64))
            .collect();
        let ranked = rank(samples, min_mb as f64, limit);

        prop_assert!(ranked.len() <= limit);
        for (i, entry) in ranked.iter().enumerate() {
            prop_assert_eq!(entry.rank, i);
            prop_assert!(entry.sample.memory_mb >= min_mb as f64);
        }
        for pair in ranked.windows(2) {
            let (a, b) = (&pair[0].sample, &pair[1].sample);
            prop_assert!(a.memory_mb >= b.memory_mb);
            if a.memory_mb == b.memory_mb {
                // names encode input position
                let ia: usize = a.identity[1..].parse().unwrap();
                let ib: usize = b.identity[1..].parse().unwrap();
                prop_assert!(ia < ib);
            }
        }
    }
}
