use lmkit_core::{LanguageModel, Result, SpecialTokens, Vocabulary};

/// Uniform over every token except the start and padding sentinels.
#[derive(Debug, Clone)]
pub struct EquiprobableModel {
    vocab_size: usize,
    specials: SpecialTokens,
}

impl EquiprobableModel {
    pub fn new(vocab: &Vocabulary) -> Self {
        Self {
            vocab_size: vocab.vocab_size(),
            specials: vocab.specials(),
        }
    }
}

impl LanguageModel for EquiprobableModel {
    fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    fn predict(&self, _context: &[u32]) -> Result<Vec<f64>> {
        let mut probs = vec![1.0 / (self.vocab_size - 2) as f64; self.vocab_size];
        probs[self.specials.start as usize] = 0.0;
        probs[self.specials.padding as usize] = 0.0;
        Ok(probs)
    }
}
