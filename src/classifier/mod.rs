//! Boundary to the pretrained sentiment model.
//!
//! The rest of the crate only knows the [`SentimentClassifier`] trait: one
//! text in, one of five ordinal classes out. Model identity, tokenization and
//! truncation all belong to the implementation behind it.

pub mod remote;

use crate::error::CoreError;
use crate::label::SentimentLabel;

pub use remote::{RemoteClassifier, RemoteClassifierConfig};

pub trait SentimentClassifier: Send + Sync {
    /// Classify `text` as given. Backend failures of any kind come back as
    /// [`CoreError::ClassificationUnavailable`].
    fn classify(&self, text: &str) -> Result<SentimentLabel, CoreError>;
}

/// Maps the star-rating labels of the multilingual review model
/// ("1 star" .. "5 stars") to classes 0..4.
pub fn parse_star_label(label: &str) -> Option<SentimentLabel> {
    let stars: u8 = label.trim().split_whitespace().next()?.parse().ok()?;
    SentimentLabel::from_class(stars.checked_sub(1)?)
}
