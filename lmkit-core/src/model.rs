use crate::Result;

/// Anything that can produce a next-token distribution over a fixed vocabulary.
pub trait LanguageModel {
    fn vocab_size(&self) -> usize;

    /// Probability of every vocabulary index following `context`.
    ///
    /// The returned vector must have exactly `vocab_size()` non-negative
    /// entries that sum to roughly 1.
    fn predict(&self, context: &[u32]) -> Result<Vec<f64>>;

    /// Fit the model on index sequences framed by the start and end sentinels.
    /// May be called repeatedly; each call adds to what was learned.
    fn train(&mut self, sentences: &[Vec<u32>]) -> Result<()> {
        let _ = sentences;
        Ok(())
    }
}

impl<M: LanguageModel + ?Sized> LanguageModel for Box<M> {
    fn vocab_size(&self) -> usize {
        (**self).vocab_size()
    }

    fn predict(&self, context: &[u32]) -> Result<Vec<f64>> {
        (**self).predict(context)
    }

    fn train(&mut self, sentences: &[Vec<u32>]) -> Result<()> {
        (**self).train(sentences)
    }
}
