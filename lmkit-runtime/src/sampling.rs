use rand::prelude::*;

use lmkit_core::{LmError, Result};

/// Random source for one decoding call: seeded when reproducibility is wanted.
pub fn make_rng(seed: Option<u64>) -> Box<dyn RngCore> {
    match seed {
        Some(s) => Box::new(StdRng::seed_from_u64(s)),
        None => Box::new(rand::thread_rng()),
    }
}

/// Draw one index from `probs`, normalized to unit mass.
///
/// Entries with zero probability are never drawn. Fails if the vector holds
/// no positive mass.
pub fn choose<R: Rng + ?Sized>(probs: &[f64], rng: &mut R) -> Result<u32> {
    let sum: f64 = probs.iter().sum();
    if !(sum > 0.0) || !sum.is_finite() {
        return Err(LmError::DegenerateDistribution(format!(
            "cannot sample from a distribution with total mass {sum}"
        )));
    }

    let r: f64 = rng.r#gen::<f64>() * sum;
    let mut cumulative = 0.0;
    for (i, &p) in probs.iter().enumerate() {
        if p <= 0.0 {
            continue;
        }
        cumulative += p;
        if r < cumulative {
            return Ok(i as u32);
        }
    }

    // Rounding left r just past the last bucket.
    let last = probs
        .iter()
        .rposition(|&p| p > 0.0)
        .ok_or_else(|| LmError::DegenerateDistribution("no positive entry".into()))?;
    Ok(last as u32)
}
