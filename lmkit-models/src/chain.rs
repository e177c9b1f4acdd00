use lmkit_core::{LanguageModel, LmError, Result, SpecialTokens, Vocabulary};

/// Deterministic chain through the vocabulary in index order.
///
/// After the start sentinel it predicts the first regular token; after index
/// `i` it predicts `i + 1` with certainty. The last index has no successor and
/// yields an all-zero vector.
#[derive(Debug, Clone)]
pub struct ChainModel {
    vocab_size: usize,
    specials: SpecialTokens,
    first_regular: u32,
}

impl ChainModel {
    pub fn new(vocab: &Vocabulary) -> Self {
        let specials = vocab.specials();
        let first_regular = (0..vocab.vocab_size() as u32)
            .find(|&i| !specials.contains(i))
            .unwrap_or(0);
        Self {
            vocab_size: vocab.vocab_size(),
            specials,
            first_regular,
        }
    }
}

impl LanguageModel for ChainModel {
    fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    fn predict(&self, context: &[u32]) -> Result<Vec<f64>> {
        let last = *context
            .last()
            .ok_or_else(|| LmError::InvalidSequence("empty context".into()))?;
        let mut probs = vec![0.0; self.vocab_size];
        if last == self.specials.start {
            probs[self.first_regular as usize] = 1.0;
        } else if (last as usize) + 1 < self.vocab_size {
            probs[last as usize + 1] = 1.0;
        }
        Ok(probs)
    }
}
