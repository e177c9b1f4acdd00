use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use serde::Deserialize;

use lmkit_core::{BeamParams, PerplexityParams, SampleParams, Vocabulary};
use lmkit_models::NgramConfig;
use lmkit_runtime::{ExcludeTokens, NoRepeat, Temperature, TopK, TopP, TransformPipeline};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    #[default]
    Ngram,
    Uniform,
    Chain,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    pub kind: ModelKind,
    pub ngram: NgramConfig,
}

/// Transforms applied, in order, before every decoding step.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformSpec {
    TopK { k: usize },
    TopP { p: f64 },
    Temperature { t: f64 },
    /// Never emit the start, padding, or unknown sentinels.
    ExcludeSentinels,
    /// Never emit a regular token twice.
    NoRepeat,
}

/// Settings read from the optional `--config` JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LmkitConfig {
    pub reverse: bool,
    pub model: ModelSection,
    pub transforms: Vec<TransformSpec>,
    pub sample: SampleParams,
    pub beam: BeamParams,
    pub perplexity: PerplexityParams,
}

impl LmkitConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn build_transforms(&self, vocab: &Vocabulary) -> TransformPipeline {
        let specials = vocab.specials();
        self.transforms
            .iter()
            .fold(TransformPipeline::default(), |pipeline, spec| match spec {
                TransformSpec::TopK { k } => pipeline.with(TopK(*k)),
                TransformSpec::TopP { p } => pipeline.with(TopP(*p)),
                TransformSpec::Temperature { t } => pipeline.with(Temperature(*t)),
                TransformSpec::ExcludeSentinels => pipeline.with(ExcludeTokens::new([
                    specials.start,
                    specials.padding,
                    specials.unknown,
                ])),
                TransformSpec::NoRepeat => pipeline.with(NoRepeat::new([specials.end])),
            })
    }
}
