use rand::rngs::StdRng;
use rand::SeedableRng;

use lmkit_core::LmError;
use lmkit_runtime::sampling::{choose, make_rng};

#[test]
fn test_single_candidate_is_certain() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        assert_eq!(choose(&[0.0, 0.0, 0.3, 0.0], &mut rng).unwrap(), 2);
    }
}

#[test]
fn test_zero_entries_never_drawn() {
    let mut rng = StdRng::seed_from_u64(11);
    let probs = [0.0, 0.5, 0.0, 0.5, 0.0];
    let mut seen = [0usize; 5];
    for _ in 0..500 {
        seen[choose(&probs, &mut rng).unwrap() as usize] += 1;
    }
    assert_eq!(seen[0] + seen[2] + seen[4], 0);
    assert!(seen[1] > 0 && seen[3] > 0);
}

#[test]
fn test_unnormalized_input() {
    let mut rng = StdRng::seed_from_u64(3);
    let probs = [0.0, 4.0, 0.0];
    assert_eq!(choose(&probs, &mut rng).unwrap(), 1);
}

#[test]
fn test_zero_mass_is_degenerate() {
    let mut rng = StdRng::seed_from_u64(0);
    let err = choose(&[0.0, 0.0, 0.0], &mut rng).unwrap_err();
    assert!(matches!(err, LmError::DegenerateDistribution(_)));
    assert!(matches!(
        choose(&[], &mut rng),
        Err(LmError::DegenerateDistribution(_))
    ));
}

#[test]
fn test_seeded_rng_reproducible() {
    let probs = [0.1, 0.2, 0.3, 0.4];
    let draw = |seed| {
        let mut rng = make_rng(Some(seed));
        (0..16)
            .map(|_| choose(&probs, &mut rng).unwrap())
            .collect::<Vec<_>>()
    };
    assert_eq!(draw(42), draw(42));
}
