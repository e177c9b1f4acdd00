//! Streaming perplexity accumulator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Running perplexity statistics, threaded through repeated scoring calls.
///
/// `avg_log_perplexity` is the mean of `-ln(p)` over included tokens, kept
/// exact incrementally. Zero-probability tokens are never included; unknown
/// tokens are included only when the caller asks for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerplexityState {
    pub word_count: u64,
    pub zeroprobs_count: u64,
    pub unknown_count: u64,
    pub avg_log_perplexity: f64,
}

impl PerplexityState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens contributing to `avg_log_perplexity`.
    pub fn included_count(&self, include_unknown: bool) -> u64 {
        let excluded_unknown = if include_unknown { 0 } else { self.unknown_count };
        self.word_count
            .saturating_sub(self.zeroprobs_count)
            .saturating_sub(excluded_unknown)
    }

    /// Record one observed token and the probability the model assigned to it.
    pub fn add(&mut self, word_index: u32, probability: f64, include_unknown: bool, unknown_index: u32) {
        let old_count = self.included_count(include_unknown);
        self.word_count += 1;

        if word_index == unknown_index {
            self.unknown_count += 1;
            if !include_unknown {
                return;
            }
        }

        if probability == 0.0 {
            self.zeroprobs_count += 1;
            return;
        }

        let log_prob = -probability.ln();
        let new_count = (old_count + 1) as f64;
        self.avg_log_perplexity =
            self.avg_log_perplexity * old_count as f64 / new_count + log_prob / new_count;
    }

    pub fn perplexity(&self) -> f64 {
        self.avg_log_perplexity.exp()
    }
}

impl fmt::Display for PerplexityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Avg ppl: {}, zeroprobs: {}, unk: {}",
            self.perplexity(),
            self.zeroprobs_count,
            self.unknown_count
        )
    }
}
