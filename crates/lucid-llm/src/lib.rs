pub mod analysis;
pub mod analyzer;
pub mod dream;
pub mod error;
pub mod normalize;
pub mod prompt;
pub mod repair;
pub mod secrets;

pub use analysis::{AnalysisResponse, Symbol};
pub use analyzer::{DreamAnalyzer, GenerationOptions};
pub use dream::{DreamContext, DreamData, InterpretationMethod};
pub use error::{Error, Result};
pub use secrets::{EnvSecrets, SecretResolver, StaticSecrets};
