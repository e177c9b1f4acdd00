use lmkit_core::PerplexityState;
use proptest::prelude::*;

const UNK: u32 = 1;

#[test]
fn test_mixed_zero_probability_stream() {
    let mut state = PerplexityState::new();
    for p in [0.5, 0.0, 0.25] {
        state.add(7, p, true, UNK);
    }
    assert_eq!(state.word_count, 3);
    assert_eq!(state.zeroprobs_count, 1);
    assert_eq!(state.unknown_count, 0);
    let expected = (-(0.5f64).ln() - (0.25f64).ln()) / 2.0;
    assert!((state.avg_log_perplexity - expected).abs() < 1e-12);
}

#[test]
fn test_excluded_unknown_leaves_average() {
    let mut state = PerplexityState::new();
    state.add(5, 0.5, false, UNK);
    let before = state.avg_log_perplexity;

    state.add(UNK, 0.01, false, UNK);
    assert_eq!(state.avg_log_perplexity, before);
    assert_eq!(state.unknown_count, 1);
    assert_eq!(state.word_count, 2);
    assert_eq!(state.included_count(false), 1);
}

#[test]
fn test_included_unknown_counts_in_average() {
    let mut state = PerplexityState::new();
    state.add(5, 0.5, true, UNK);
    state.add(UNK, 0.25, true, UNK);
    assert_eq!(state.unknown_count, 1);
    let expected = (-(0.5f64).ln() - (0.25f64).ln()) / 2.0;
    assert!((state.avg_log_perplexity - expected).abs() < 1e-12);
}

#[test]
fn test_zero_probability_leaves_average() {
    let mut state = PerplexityState::new();
    state.add(4, 0.2, true, UNK);
    let before = state.avg_log_perplexity;
    state.add(4, 0.0, true, UNK);
    assert_eq!(state.avg_log_perplexity, before);
    assert_eq!(state.zeroprobs_count, 1);
    assert_eq!(state.word_count, 2);
}

#[test]
fn test_perplexity_and_display() {
    let mut state = PerplexityState::new();
    state.add(4, 0.5, true, UNK);
    state.add(4, 0.5, true, UNK);
    assert!((state.perplexity() - 2.0).abs() < 1e-12);
    let rendered = state.to_string();
    assert!(rendered.starts_with("Avg ppl: "));
    assert!(rendered.ends_with("zeroprobs: 0, unk: 0"));
}

#[test]
fn test_state_threads_across_calls() {
    // Two batches into one accumulator equal one batch with everything.
    let probs = [0.9, 0.1, 0.3, 0.6, 0.05];
    let mut split = PerplexityState::new();
    for &p in &probs[..2] {
        split.add(4, p, true, UNK);
    }
    for &p in &probs[2..] {
        split.add(4, p, true, UNK);
    }
    let mut whole = PerplexityState::new();
    for &p in &probs {
        whole.add(4, p, true, UNK);
    }
    assert_eq!(split.word_count, whole.word_count);
    assert!((split.avg_log_perplexity - whole.avg_log_perplexity).abs() < 1e-12);
}

proptest! {
    #[test]
    fn prop_incremental_mean_matches_naive(
        steps in prop::collection::vec((0u32..6, prop_oneof![Just(0.0), 1e-6f64..=1.0]), 1..200),
        include_unknown in any::<bool>(),
    ) {
        let mut state = PerplexityState::new();
        let mut included = Vec::new();
        let (mut zeros, mut unknowns) = (0u64, 0u64);
        for &(index, p) in &steps {
            state.add(index, p, include_unknown, UNK);
            if index == UNK {
                unknowns += 1;
                if !include_unknown {
                    continue;
                }
            }
            if p == 0.0 {
                zeros += 1;
            } else {
                included.push(-p.ln());
            }
        }

        prop_assert_eq!(state.word_count, steps.len() as u64);
        prop_assert_eq!(state.zeroprobs_count, zeros);
        prop_assert_eq!(state.unknown_count, unknowns);
        let naive = if included.is_empty() {
            0.0
        } else {
            included.iter().sum::<f64>() / included.len() as f64
        };
        prop_assert!((state.avg_log_perplexity - naive).abs() < 1e-9);
    }
}
