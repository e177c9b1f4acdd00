//! Beam search decoding.
//!
//! Every step expands each live hypothesis by its positive-probability
//! continuations, scored as `score + ln(p) + length_reward`. Terminated
//! hypotheses carry forward unchanged and compete for the same slots. A live
//! hypothesis with no continuation is dropped. The best `beam_width`
//! candidates survive; equal scores keep insertion order (earlier hypothesis
//! first, then lower index).

use std::cmp::Ordering;
use std::fmt;

use tracing::debug;

use lmkit_core::{BeamParams, FinishReason, LmError, Result};

use crate::transform::TransformPipeline;

/// A partial or complete decoding hypothesis.
#[derive(Clone)]
pub struct Hypothesis {
    pub tokens: Vec<u32>,
    /// Cumulative log-probability plus length rewards.
    pub score: f64,
    pub finish_reason: Option<FinishReason>,
    transforms: TransformPipeline,
}

impl fmt::Debug for Hypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hypothesis")
            .field("tokens", &self.tokens)
            .field("score", &self.score)
            .field("finish_reason", &self.finish_reason)
            .finish_non_exhaustive()
    }
}

impl Hypothesis {
    pub fn is_terminated(&self) -> bool {
        self.finish_reason.is_some()
    }
}

pub struct BeamSearch {
    eos_index: u32,
    beam_width: usize,
    max_length: usize,
    length_reward: f64,
}

impl BeamSearch {
    pub fn new(eos_index: u32, params: &BeamParams) -> Result<Self> {
        if params.beam_width == 0 {
            return Err(LmError::InvalidArgument("beam_width must be at least 1".into()));
        }
        if params.max_length == 0 {
            return Err(LmError::InvalidArgument("max_length must be at least 1".into()));
        }
        Ok(Self {
            eos_index,
            beam_width: params.beam_width,
            max_length: params.max_length,
            length_reward: params.length_reward,
        })
    }

    /// Decode from `initial` and return the best-scoring terminated hypothesis.
    ///
    /// Each hypothesis owns a clone of `transforms`, advanced only with the
    /// tokens appended to that hypothesis. `predict` must return one
    /// probability per vocabulary token.
    ///
    /// Fails with [`LmError::DegenerateDistribution`] when every live
    /// hypothesis runs out of continuations before any has terminated.
    pub fn decode<F>(
        &self,
        initial: Vec<u32>,
        transforms: &TransformPipeline,
        mut predict: F,
    ) -> Result<Hypothesis>
    where
        F: FnMut(&[u32]) -> Result<Vec<f64>>,
    {
        if initial.is_empty() {
            return Err(LmError::InvalidArgument("empty initial sequence".into()));
        }
        if initial.len() > self.max_length {
            return Err(LmError::InvalidArgument(format!(
                "context of {} tokens exceeds max_length {}",
                initial.len(),
                self.max_length
            )));
        }

        let finish_reason = self.finish_reason(&initial);
        let mut beams = vec![Hypothesis {
            tokens: initial,
            score: 0.0,
            finish_reason,
            transforms: transforms.clone(),
        }];

        let mut steps = 0usize;
        while beams.iter().any(|h| !h.is_terminated()) {
            let mut candidates = Vec::with_capacity(beams.len() * self.beam_width);
            for hyp in beams {
                if hyp.is_terminated() {
                    candidates.push(hyp);
                    continue;
                }

                let mut probs = predict(&hyp.tokens)?;
                hyp.transforms.apply(&mut probs);

                // Only a hypothesis' own top `beam_width` continuations can
                // survive pruning, so the rest are never materialized.
                let mut ranked: Vec<(usize, f64)> = probs
                    .iter()
                    .copied()
                    .enumerate()
                    .filter(|&(_, p)| p > 0.0)
                    .collect();
                ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
                ranked.truncate(self.beam_width);

                if ranked.is_empty() {
                    debug!(length = hyp.tokens.len(), "dropping hypothesis with no continuation");
                    continue;
                }

                for (idx, p) in ranked {
                    let token_id = idx as u32;
                    let mut tokens = Vec::with_capacity(hyp.tokens.len() + 1);
                    tokens.extend_from_slice(&hyp.tokens);
                    tokens.push(token_id);
                    let mut transforms = hyp.transforms.clone();
                    transforms.advance(token_id);
                    candidates.push(Hypothesis {
                        finish_reason: self.finish_reason(&tokens),
                        tokens,
                        score: hyp.score + p.ln() + self.length_reward,
                        transforms,
                    });
                }
            }

            if candidates.is_empty() {
                return Err(LmError::DegenerateDistribution(format!(
                    "no hypothesis has a positive-probability continuation after {} steps",
                    steps + 1
                )));
            }

            // Stable sort: ties keep insertion order.
            candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
            candidates.truncate(self.beam_width);
            beams = candidates;
            steps += 1;
        }

        let best = beams
            .into_iter()
            .next()
            .ok_or_else(|| LmError::DegenerateDistribution("beam emptied during search".into()))?;
        debug!(
            steps,
            length = best.tokens.len(),
            score = best.score,
            reason = ?best.finish_reason,
            "beam search finished"
        );
        Ok(best)
    }

    fn finish_reason(&self, tokens: &[u32]) -> Option<FinishReason> {
        if tokens.last() == Some(&self.eos_index) {
            Some(FinishReason::EosToken)
        } else if tokens.len() >= self.max_length {
            Some(FinishReason::MaxLength)
        } else {
            None
        }
    }
}
