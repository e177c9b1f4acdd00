use serde::{Deserialize, Serialize};

/// Parameters for top-k sampled decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleParams {
    /// Size of the sample pool per step. Clamped to the vocabulary size.
    pub top_k: usize,
    /// Cap on the full index sequence, start sentinel included.
    pub max_length: usize,
    pub seed: Option<u64>,
}

impl Default for SampleParams {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_length: 30,
            seed: None,
        }
    }
}

impl SampleParams {
    /// Deterministic decoding: always commit the most probable token.
    pub fn greedy(max_length: usize) -> Self {
        Self {
            top_k: 1,
            max_length,
            seed: None,
        }
    }
}

/// Parameters for beam search decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamParams {
    pub beam_width: usize,
    pub max_length: usize,
    /// Added to a hypothesis score for every appended token.
    pub length_reward: f64,
}

impl Default for BeamParams {
    fn default() -> Self {
        Self {
            beam_width: 5,
            max_length: 50,
            length_reward: 0.0,
        }
    }
}

/// Parameters for corpus-level perplexity measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerplexityParams {
    pub batch_size: usize,
    pub include_unknown: bool,
}

impl Default for PerplexityParams {
    fn default() -> Self {
        Self {
            batch_size: 100,
            include_unknown: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The end sentinel was committed.
    EosToken,
    /// The sequence reached `max_length`.
    MaxLength,
}
