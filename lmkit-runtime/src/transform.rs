//! Probability transforms applied to a predictor's output before a token is chosen.
//!
//! A transform reshapes a vocabulary-sized probability vector in place. It never
//! changes the vector's length and never produces negative entries; rescaling
//! to a unit sum is left to the consumer. Stateful transforms observe committed
//! tokens through [`Transform::advance`] and nowhere else.

use std::cmp::Ordering;
use std::collections::HashSet;

pub trait Transform: Send {
    fn apply(&self, probs: &mut [f64]);

    /// Observe a token that has been committed to the sequence.
    fn advance(&mut self, _token_id: u32) {}

    fn box_clone(&self) -> Box<dyn Transform>;
}

impl Clone for Box<dyn Transform> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Transforms applied in a fixed order.
#[derive(Clone, Default)]
pub struct TransformPipeline {
    transforms: Vec<Box<dyn Transform>>,
}

impl TransformPipeline {
    pub fn new(transforms: Vec<Box<dyn Transform>>) -> Self {
        Self { transforms }
    }

    pub fn with<T: Transform + 'static>(mut self, transform: T) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    pub fn push(&mut self, transform: Box<dyn Transform>) {
        self.transforms.push(transform);
    }

    pub fn apply(&self, probs: &mut [f64]) {
        for transform in &self.transforms {
            transform.apply(probs);
        }
    }

    pub fn advance(&mut self, token_id: u32) {
        for transform in &mut self.transforms {
            transform.advance(token_id);
        }
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

/// Indices sorted by descending probability. Stable, so ties keep index order.
fn ranked(probs: &[f64]) -> Vec<(usize, f64)> {
    let mut indexed: Vec<(usize, f64)> = probs.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    indexed
}

fn keep_only(probs: &mut [f64], keep: impl IntoIterator<Item = usize>) {
    let mut mask = vec![false; probs.len()];
    for idx in keep {
        mask[idx] = true;
    }
    for (p, keep) in probs.iter_mut().zip(mask) {
        if !keep {
            *p = 0.0;
        }
    }
}

/// Zero out all but the `k` highest probabilities. Among equal probabilities
/// the lower index wins. `k == 0` keeps everything.
#[derive(Debug, Clone, Copy)]
pub struct TopK(pub usize);

impl Transform for TopK {
    fn apply(&self, probs: &mut [f64]) {
        let k = self.0;
        if k == 0 || k >= probs.len() {
            return;
        }
        let indexed = ranked(probs);
        keep_only(probs, indexed[..k].iter().map(|&(idx, _)| idx));
    }

    fn box_clone(&self) -> Box<dyn Transform> {
        Box::new(*self)
    }
}

/// Keep the smallest set of most-probable tokens whose mass exceeds `p`
/// of the total.
#[derive(Debug, Clone, Copy)]
pub struct TopP(pub f64);

impl Transform for TopP {
    fn apply(&self, probs: &mut [f64]) {
        if self.0 >= 1.0 {
            return;
        }
        let total: f64 = probs.iter().sum();
        if total <= 0.0 {
            return;
        }
        let threshold = self.0 * total;
        let indexed = ranked(probs);

        let mut cumulative = 0.0;
        let mut cutoff = indexed.len();
        for (i, &(_, p)) in indexed.iter().enumerate() {
            cumulative += p;
            if cumulative > threshold {
                cutoff = i + 1;
                break;
            }
        }
        keep_only(probs, indexed[..cutoff].iter().map(|&(idx, _)| idx));
    }

    fn box_clone(&self) -> Box<dyn Transform> {
        Box::new(*self)
    }
}

/// Sharpen (`t < 1`) or flatten (`t > 1`) the distribution: `p -> p^(1/t)`.
/// Non-positive temperatures leave the vector untouched.
#[derive(Debug, Clone, Copy)]
pub struct Temperature(pub f64);

impl Transform for Temperature {
    fn apply(&self, probs: &mut [f64]) {
        if self.0 <= 0.0 || (self.0 - 1.0).abs() < f64::EPSILON {
            return;
        }
        let exponent = 1.0 / self.0;
        for p in probs.iter_mut() {
            if *p > 0.0 {
                *p = p.powf(exponent);
            }
        }
    }

    fn box_clone(&self) -> Box<dyn Transform> {
        Box::new(*self)
    }
}

/// Never choose the given indices, e.g. the start and padding sentinels.
#[derive(Debug, Clone)]
pub struct ExcludeTokens {
    excluded: Vec<u32>,
}

impl ExcludeTokens {
    pub fn new(excluded: impl IntoIterator<Item = u32>) -> Self {
        Self {
            excluded: excluded.into_iter().collect(),
        }
    }
}

impl Transform for ExcludeTokens {
    fn apply(&self, probs: &mut [f64]) {
        for &idx in &self.excluded {
            if let Some(p) = probs.get_mut(idx as usize) {
                *p = 0.0;
            }
        }
    }

    fn box_clone(&self) -> Box<dyn Transform> {
        Box::new(self.clone())
    }
}

/// Forbid any token committed earlier, except the exempt ones.
#[derive(Debug, Clone, Default)]
pub struct NoRepeat {
    seen: HashSet<u32>,
    exempt: HashSet<u32>,
}

impl NoRepeat {
    pub fn new(exempt: impl IntoIterator<Item = u32>) -> Self {
        Self {
            seen: HashSet::new(),
            exempt: exempt.into_iter().collect(),
        }
    }
}

impl Transform for NoRepeat {
    fn apply(&self, probs: &mut [f64]) {
        for &idx in &self.seen {
            if let Some(p) = probs.get_mut(idx as usize) {
                *p = 0.0;
            }
        }
    }

    fn advance(&mut self, token_id: u32) {
        if !self.exempt.contains(&token_id) {
            self.seen.insert(token_id);
        }
    }

    fn box_clone(&self) -> Box<dyn Transform> {
        Box::new(self.clone())
    }
}
