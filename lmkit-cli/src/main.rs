//! lmkit: decode with and score language models from the command line.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use lmkit_core::{LanguageModel, TokenCodec, Vocabulary};
use lmkit_models::{ChainModel, EquiprobableModel, NgramModel};
use lmkit_runtime::Engine;

use crate::config::{LmkitConfig, ModelKind};

#[derive(Parser)]
#[command(name = "lmkit", about = "Decode with and score language models")]
struct Cli {
    /// Vocabulary file, one token per line
    #[arg(long)]
    vocab: PathBuf,

    /// Corpus to train the model on before running the command
    #[arg(long)]
    train: Option<PathBuf>,

    /// Model to use (overrides the config file)
    #[arg(long, value_enum)]
    model: Option<ModelKind>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reverse input sequences before numericalization
    #[arg(long)]
    reverse: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Measure perplexity over a newline-delimited, whitespace-tokenized file
    Perplexity {
        file: PathBuf,
        #[arg(long)]
        batch_size: Option<usize>,
        /// Leave unknown tokens out of the average
        #[arg(long)]
        exclude_unknown: bool,
        /// Print the final statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Continue a context by top-k sampling
    Sample {
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long)]
        max_length: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        words: Vec<String>,
    },
    /// Continue a context with beam search
    Beam {
        #[arg(long)]
        beam_width: Option<usize>,
        #[arg(long)]
        max_length: Option<usize>,
        #[arg(long)]
        length_reward: Option<f64>,
        words: Vec<String>,
    },
    /// Print the most probable next tokens after a context
    Query {
        #[arg(long, default_value = "10")]
        top: usize,
        words: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => LmkitConfig::from_file(path)?,
        None => LmkitConfig::default(),
    };
    config.reverse |= cli.reverse;
    if let Some(kind) = cli.model {
        config.model.kind = kind;
    }

    let vocab = Vocabulary::from_file(&cli.vocab)
        .with_context(|| format!("Failed to load vocabulary from {}", cli.vocab.display()))?;
    let vocab = Arc::new(vocab);
    info!(vocab_size = vocab.vocab_size(), "vocabulary loaded");

    let model: Box<dyn LanguageModel> = match config.model.kind {
        ModelKind::Ngram => Box::new(NgramModel::new(&vocab, config.model.ngram.clone())?),
        ModelKind::Uniform => Box::new(EquiprobableModel::new(&vocab)),
        ModelKind::Chain => Box::new(ChainModel::new(&vocab)),
    };
    let codec = TokenCodec::new(vocab.clone()).with_reverse(config.reverse);
    let transforms = config.build_transforms(&vocab);
    let mut engine = Engine::new(model, codec, transforms)?;
    info!(model = ?config.model.kind, reverse = config.reverse, "engine ready");

    if let Some(path) = &cli.train {
        engine
            .train_file(path)
            .with_context(|| format!("Failed to train on {}", path.display()))?;
    }

    match cli.command {
        Command::Perplexity {
            file,
            batch_size,
            exclude_unknown,
            json,
        } => {
            let mut params = config.perplexity;
            if let Some(batch_size) = batch_size {
                params.batch_size = batch_size;
            }
            params.include_unknown &= !exclude_unknown;
            let state = engine.measure_perplexity_file(&file, &params)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                println!("{state}");
            }
        }
        Command::Sample {
            top_k,
            max_length,
            seed,
            words,
        } => {
            let mut params = config.sample;
            params.top_k = top_k.unwrap_or(params.top_k);
            params.max_length = max_length.unwrap_or(params.max_length);
            params.seed = seed.or(params.seed);
            let output = engine.sample_decoding(&words, &params)?;
            println!("{}", output.join(" "));
        }
        Command::Beam {
            beam_width,
            max_length,
            length_reward,
            words,
        } => {
            let mut params = config.beam;
            params.beam_width = beam_width.unwrap_or(params.beam_width);
            params.max_length = max_length.unwrap_or(params.max_length);
            params.length_reward = length_reward.unwrap_or(params.length_reward);
            let output = engine.beam_decoding(&words, &params)?;
            println!("{}", output.join(" "));
        }
        Command::Query { top, words } => {
            let mut probs: Vec<(String, f64)> = engine.query(&words)?.into_iter().collect();
            probs.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });
            for (token, p) in probs.into_iter().take(top) {
                println!("{token}\t{p:.6}");
            }
        }
    }

    Ok(())
}
