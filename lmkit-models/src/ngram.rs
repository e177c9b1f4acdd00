//! Count-based n-gram language model.
//!
//! Counts every context of length `0..order` seen in training, together with
//! the token that followed it. Prediction uses the longest trained suffix of
//! the context and applies additive smoothing over every token the model may
//! emit (all but the start and padding sentinels). Before any training the
//! model is uniform over those tokens.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use lmkit_core::{LanguageModel, LmError, Result, SpecialTokens, Vocabulary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NgramConfig {
    /// Tokens per n-gram, the predicted one included. 1 is a unigram model.
    pub order: usize,
    /// Pseudo-count added to every emittable token.
    pub smoothing: f64,
}

impl Default for NgramConfig {
    fn default() -> Self {
        Self {
            order: 3,
            smoothing: 0.1,
        }
    }
}

pub struct NgramModel {
    config: NgramConfig,
    vocab_size: usize,
    specials: SpecialTokens,
    /// context → next token → count
    index: HashMap<Vec<u32>, HashMap<u32, u32>>,
    /// context → number of observed continuations
    totals: HashMap<Vec<u32>, u32>,
}

impl NgramModel {
    pub fn new(vocab: &Vocabulary, config: NgramConfig) -> Result<Self> {
        if config.order == 0 {
            return Err(LmError::InvalidArgument("n-gram order must be at least 1".into()));
        }
        if !(config.smoothing.is_finite() && config.smoothing >= 0.0) {
            return Err(LmError::InvalidArgument(format!(
                "smoothing must be a finite non-negative number, got {}",
                config.smoothing
            )));
        }
        Ok(Self {
            config,
            vocab_size: vocab.vocab_size(),
            specials: vocab.specials(),
            index: HashMap::new(),
            totals: HashMap::new(),
        })
    }

    pub fn order(&self) -> usize {
        self.config.order
    }

    /// Number of distinct contexts seen in training.
    pub fn num_contexts(&self) -> usize {
        self.index.len()
    }

    fn is_emittable(&self, token_id: u32) -> bool {
        token_id != self.specials.start && token_id != self.specials.padding
    }

    fn uniform(&self) -> Vec<f64> {
        let share = 1.0 / (self.vocab_size - 2) as f64;
        (0..self.vocab_size as u32)
            .map(|i| if self.is_emittable(i) { share } else { 0.0 })
            .collect()
    }
}

impl LanguageModel for NgramModel {
    fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    fn predict(&self, context: &[u32]) -> Result<Vec<f64>> {
        let longest = context.len().min(self.config.order - 1);
        let alpha = self.config.smoothing;
        let emittable = (self.vocab_size - 2) as f64;

        for ctx_len in (0..=longest).rev() {
            let key = &context[context.len() - ctx_len..];
            let (Some(counts), Some(&total)) = (self.index.get(key), self.totals.get(key)) else {
                continue;
            };
            let denom = total as f64 + alpha * emittable;
            if denom <= 0.0 {
                continue;
            }
            let probs = (0..self.vocab_size as u32)
                .map(|i| {
                    if !self.is_emittable(i) {
                        return 0.0;
                    }
                    let count = counts.get(&i).copied().unwrap_or(0) as f64;
                    (count + alpha) / denom
                })
                .collect();
            return Ok(probs);
        }

        Ok(self.uniform())
    }

    fn train(&mut self, sentences: &[Vec<u32>]) -> Result<()> {
        for sentence in sentences {
            if let Some(&bad) = sentence.iter().find(|&&t| t as usize >= self.vocab_size) {
                return Err(LmError::InvalidSequence(format!(
                    "index {bad} outside vocabulary of size {}",
                    self.vocab_size
                )));
            }
            for i in 1..sentence.len() {
                let next = sentence[i];
                if !self.is_emittable(next) {
                    continue;
                }
                for ctx_len in 0..self.config.order.min(i + 1) {
                    let context = sentence[i - ctx_len..i].to_vec();
                    *self
                        .index
                        .entry(context.clone())
                        .or_default()
                        .entry(next)
                        .or_insert(0) += 1;
                    *self.totals.entry(context).or_insert(0) += 1;
                }
            }
        }
        debug!(
            sentences = sentences.len(),
            contexts = self.index.len(),
            "n-gram counts updated"
        );
        Ok(())
    }
}
