//! Comment sentiment pipeline: normalize, classify, accumulate, export.

pub mod classifier;
pub mod config;
pub mod error;
pub mod export;
pub mod label;
pub mod normalizer;
pub mod store;
pub mod worker;

pub use classifier::SentimentClassifier;
pub use error::CoreError;
pub use label::SentimentLabel;
pub use normalizer::normalize;
pub use store::{Record, RecordStore};
