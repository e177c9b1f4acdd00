//! lmkit core types, traits, and error definitions.

pub mod codec;
pub mod error;
pub mod model;
pub mod perplexity;
pub mod types;
pub mod vocab;

pub use codec::TokenCodec;
pub use error::{LmError, Result};
pub use model::LanguageModel;
pub use perplexity::PerplexityState;
pub use types::*;
pub use vocab::{SpecialTokens, Vocabulary};
