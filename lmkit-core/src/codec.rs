//! Token codec: surface tokens <-> index sequences framed by sentinels.

use std::sync::Arc;

use crate::vocab::Vocabulary;
use crate::{LmError, Result};

#[derive(Debug, Clone)]
pub struct TokenCodec {
    vocab: Arc<Vocabulary>,
    reverse: bool,
}

impl TokenCodec {
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self {
            vocab,
            reverse: false,
        }
    }

    /// Reverse surface sequences before numericalization. Outputs are not
    /// reversed back.
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn is_reversed(&self) -> bool {
        self.reverse
    }

    /// Map surface tokens to indices, prefixed with the start sentinel.
    /// Out-of-vocabulary tokens become the unknown sentinel.
    pub fn numericalize<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<u32> {
        let mut indices = Vec::with_capacity(tokens.len() + 1);
        indices.push(self.vocab.start_index());
        if self.reverse {
            indices.extend(tokens.iter().rev().map(|t| self.vocab.token_to_index(t.as_ref())));
        } else {
            indices.extend(tokens.iter().map(|t| self.vocab.token_to_index(t.as_ref())));
        }
        indices
    }

    /// Drop the leading start and trailing end positions and map the rest back
    /// to surface tokens.
    pub fn denumericalize(&self, indices: &[u32]) -> Result<Vec<String>> {
        if indices.len() < 2 {
            return Err(LmError::InvalidSequence(format!(
                "expected at least 2 indices (start and end), got {}",
                indices.len()
            )));
        }
        indices[1..indices.len() - 1]
            .iter()
            .map(|&index| {
                self.vocab
                    .index_to_token(index)
                    .map(String::from)
                    .ok_or_else(|| {
                        LmError::InvalidSequence(format!(
                            "index {index} outside vocabulary of size {}",
                            self.vocab.vocab_size()
                        ))
                    })
            })
            .collect()
    }
}
