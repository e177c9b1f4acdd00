//! Reference language models.

pub mod chain;
pub mod equiprobable;
pub mod ngram;

pub use chain::ChainModel;
pub use equiprobable::EquiprobableModel;
pub use ngram::{NgramConfig, NgramModel};
