pub mod config;
pub mod dictionary;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod rank;
pub mod score;
pub mod segment;

pub use config::{Advisory, CategoryConfig, CategorySpec, ExtractionOptions, MatchMode};
pub use error::ConfigError;
pub use extract::Extractor;
pub use model::{ExtractionResult, RawDocument, Section};
