//! Engine: ties together a language model, the token codec, and the transform
//! pipeline, and exposes decoding, querying, scoring, and training.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use lmkit_core::{
    BeamParams, FinishReason, LanguageModel, LmError, PerplexityParams, PerplexityState, Result,
    SampleParams, TokenCodec, Vocabulary,
};

use crate::beam::{BeamSearch, Hypothesis};
use crate::corpus::SentenceReader;
use crate::sampling::{choose, make_rng};
use crate::transform::{TopK, Transform, TransformPipeline};

/// Sentences handed to the model per `train` call when training from a file.
const TRAIN_BATCH_SIZE: usize = 1024;

pub struct Engine<M: LanguageModel> {
    model: M,
    codec: TokenCodec,
    transforms: TransformPipeline,
}

impl<M: LanguageModel> Engine<M> {
    pub fn new(model: M, codec: TokenCodec, transforms: TransformPipeline) -> Result<Self> {
        let vocab_size = codec.vocabulary().vocab_size();
        if model.vocab_size() != vocab_size {
            return Err(LmError::InvalidArgument(format!(
                "model covers {} tokens but the vocabulary has {vocab_size}",
                model.vocab_size()
            )));
        }
        Ok(Self {
            model,
            codec,
            transforms,
        })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        self.codec.vocabulary()
    }

    /// Run the model and enforce the predictor's output shape.
    pub fn predict(&self, context: &[u32]) -> Result<Vec<f64>> {
        let probs = self.model.predict(context)?;
        let expected = self.vocabulary().vocab_size();
        if probs.len() != expected {
            return Err(LmError::PredictorContractViolation {
                expected,
                got: probs.len(),
            });
        }
        Ok(probs)
    }

    /// Next-token probability for every vocabulary token after `tokens`.
    pub fn query<S: AsRef<str>>(&self, tokens: &[S]) -> Result<HashMap<String, f64>> {
        let context = self.codec.numericalize(tokens);
        let probs = self.predict(&context)?;
        Ok(self
            .vocabulary()
            .tokens()
            .zip(probs)
            .map(|(token, p)| (token.to_string(), p))
            .collect())
    }

    /// Continue `tokens` by top-k sampling until the end sentinel or `max_length`.
    pub fn sample_decoding<S: AsRef<str>>(
        &self,
        tokens: &[S],
        params: &SampleParams,
    ) -> Result<Vec<String>> {
        let context = self.codec.numericalize(tokens);
        let indices = self.sample_indices(context, params)?;
        self.codec.denumericalize(&indices)
    }

    /// Index-level sampling loop behind [`Engine::sample_decoding`].
    pub fn sample_indices(&self, context: Vec<u32>, params: &SampleParams) -> Result<Vec<u32>> {
        if params.top_k == 0 {
            return Err(LmError::InvalidArgument("top_k must be at least 1".into()));
        }
        check_context(&context, params.max_length)?;

        let vocab = self.vocabulary();
        let top_k = TopK(params.top_k.min(vocab.vocab_size()));
        let eos_index = vocab.end_index();
        let mut transforms = self.transforms.clone();
        let mut rng = make_rng(params.seed);

        let mut state = context;
        let mut last = state.last().copied().unwrap_or(vocab.start_index());
        while last != eos_index && state.len() < params.max_length {
            let mut probs = self.predict(&state)?;
            transforms.apply(&mut probs);
            top_k.apply(&mut probs);
            last = choose(&probs, &mut rng)?;
            transforms.advance(last);
            state.push(last);
        }

        let reason = if last == eos_index {
            FinishReason::EosToken
        } else {
            FinishReason::MaxLength
        };
        debug!(length = state.len(), ?reason, "sample decoding finished");
        Ok(state)
    }

    /// Continue `tokens` with beam search and return the best hypothesis.
    pub fn beam_decoding<S: AsRef<str>>(
        &self,
        tokens: &[S],
        params: &BeamParams,
    ) -> Result<Vec<String>> {
        let context = self.codec.numericalize(tokens);
        let best = self.beam_search(context, params)?;
        self.codec.denumericalize(&best.tokens)
    }

    /// Index-level beam search behind [`Engine::beam_decoding`].
    pub fn beam_search(&self, context: Vec<u32>, params: &BeamParams) -> Result<Hypothesis> {
        let vocab = self.vocabulary();
        let beam = BeamSearch::new(vocab.end_index(), params)?;
        beam.decode(context, &self.transforms, |seq| self.predict(seq))
    }

    /// Score each sentence, end sentinel included, into `state`.
    ///
    /// Every position after the start sentinel is predicted from its prefix.
    /// Transforms are not applied.
    pub fn measure_perplexity<S: AsRef<str>>(
        &self,
        sentences: &[Vec<S>],
        state: &mut PerplexityState,
        include_unknown: bool,
    ) -> Result<()> {
        let vocab = self.vocabulary();
        let unknown_index = vocab.unknown_index();
        for sentence in sentences {
            let mut indices = self.codec.numericalize(sentence);
            indices.push(vocab.end_index());
            for i in 1..indices.len() {
                let probs = self.predict(&indices[..i])?;
                let word_index = indices[i];
                state.add(word_index, probs[word_index as usize], include_unknown, unknown_index);
            }
        }
        Ok(())
    }

    /// Stream a newline-delimited corpus through the accumulator in batches,
    /// logging progress after each full batch.
    pub fn measure_perplexity_file(
        &self,
        path: &Path,
        params: &PerplexityParams,
    ) -> Result<PerplexityState> {
        if params.batch_size == 0 {
            return Err(LmError::InvalidArgument("batch_size must be at least 1".into()));
        }
        let reader = SentenceReader::open(path)?;

        let mut state = PerplexityState::new();
        let mut batch = Vec::with_capacity(params.batch_size);
        let mut processed = 0usize;
        for sentence in reader {
            batch.push(sentence?);
            if batch.len() == params.batch_size {
                self.measure_perplexity(&batch, &mut state, params.include_unknown)?;
                processed += batch.len();
                batch.clear();
                info!(sentences = processed, %state, "measure perplexity");
            }
        }
        if !batch.is_empty() {
            self.measure_perplexity(&batch, &mut state, params.include_unknown)?;
            processed += batch.len();
        }

        info!(
            sentences = processed,
            words = state.word_count,
            perplexity = state.perplexity(),
            "perplexity measured"
        );
        Ok(state)
    }

    /// Numericalize sentences (end sentinel appended) and train the model on them.
    pub fn train<S: AsRef<str>>(&mut self, sentences: &[Vec<S>]) -> Result<()> {
        let end_index = self.vocabulary().end_index();
        let indexed: Vec<Vec<u32>> = sentences
            .iter()
            .map(|sentence| {
                let mut indices = self.codec.numericalize(sentence);
                indices.push(end_index);
                indices
            })
            .collect();
        self.model.train(&indexed)
    }

    /// Train on a newline-delimited, whitespace-tokenized corpus.
    pub fn train_file(&mut self, path: &Path) -> Result<()> {
        let reader = SentenceReader::open(path)?;
        let mut batch = Vec::with_capacity(TRAIN_BATCH_SIZE);
        let mut trained = 0usize;
        for sentence in reader {
            batch.push(sentence?);
            if batch.len() == TRAIN_BATCH_SIZE {
                self.train(&batch)?;
                trained += batch.len();
                batch.clear();
                debug!(sentences = trained, "training");
            }
        }
        if !batch.is_empty() {
            self.train(&batch)?;
            trained += batch.len();
        }
        info!(sentences = trained, path = %path.display(), "model trained");
        Ok(())
    }
}

fn check_context(context: &[u32], max_length: usize) -> Result<()> {
    if context.is_empty() {
        return Err(LmError::InvalidArgument("empty context".into()));
    }
    if context.len() > max_length {
        return Err(LmError::InvalidArgument(format!(
            "context of {} tokens exceeds max_length {max_length}",
            context.len()
        )));
    }
    Ok(())
}
