//! lmkit runtime: transforms, sampling, beam search, and the decoding engine.

pub mod beam;
pub mod corpus;
pub mod engine;
pub mod sampling;
pub mod transform;

pub use beam::{BeamSearch, Hypothesis};
pub use engine::Engine;
pub use transform::{ExcludeTokens, NoRepeat, Temperature, TopK, TopP, Transform, TransformPipeline};
