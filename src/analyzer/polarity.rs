//! Polarity classification
//!
//! A [`PolarityOracle`] turns cleaned text into a continuous polarity score.
//! The [`PolarityClassifier`] normalizes the raw post text, asks the oracle,
//! and collapses the score to a [`SentimentClass`] by its sign alone:
//!
//! | Polarity `p` | Class    | Code |
//! |--------------|----------|------|
//! | `p > 0`      | Positive | `+1` |
//! | `p == 0`     | Neutral  | `0`  |
//! | `p < 0`      | Negative | `-1` |
//!
//! There is no dead band around zero: `1e-300` is positive. Scores outside
//! `[-1, 1]` are accepted as-is. NaN has no sign and is reported as an
//! [`OracleError`].

use super::normalize::normalize;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Trinary sentiment of a single post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentClass {
    Positive,
    Neutral,
    Negative,
}

impl SentimentClass {
    /// All classes in chart order.
    pub const ALL: [SentimentClass; 3] = [
        SentimentClass::Positive,
        SentimentClass::Neutral,
        SentimentClass::Negative,
    ];

    /// Map a polarity score to a class by its sign. Returns `None` for NaN.
    pub fn from_polarity(polarity: f64) -> Option<Self> {
        if polarity > 0.0 {
            Some(SentimentClass::Positive)
        } else if polarity < 0.0 {
            Some(SentimentClass::Negative)
        } else if polarity == 0.0 {
            // Covers -0.0 as well
            Some(SentimentClass::Neutral)
        } else {
            None
        }
    }

    /// Signed trinary code: `+1`, `0` or `-1`.
    pub fn code(self) -> i8 {
        match self {
            SentimentClass::Positive => 1,
            SentimentClass::Neutral => 0,
            SentimentClass::Negative => -1,
        }
    }

    /// Inverse of [`SentimentClass::code`].
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(SentimentClass::Positive),
            0 => Some(SentimentClass::Neutral),
            -1 => Some(SentimentClass::Negative),
            _ => None,
        }
    }

    /// Stars this class is worth on the 1-5 scale.
    pub fn stars(self) -> u32 {
        match self {
            SentimentClass::Positive => 5,
            SentimentClass::Neutral => 3,
            SentimentClass::Negative => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SentimentClass::Positive => "Positive",
            SentimentClass::Neutral => "Neutral",
            SentimentClass::Negative => "Negative",
        }
    }
}

impl fmt::Display for SentimentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure to score a piece of text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OracleError {
    /// The oracle could not score the text (unsupported language, backend down, ...)
    #[error("text could not be scored: {0}")]
    Unscorable(String),

    /// The oracle answered, but with NaN
    #[error("oracle returned a polarity that is not a number")]
    NotANumber,
}

/// Source of continuous polarity scores.
///
/// Implementations receive text that has already been normalized and may
/// be empty. They must be callable from several threads at once.
pub trait PolarityOracle: Send + Sync {
    fn score_polarity(&self, text: &str) -> Result<f64, OracleError>;
}

impl<F> PolarityOracle for F
where
    F: Fn(&str) -> Result<f64, OracleError> + Send + Sync,
{
    fn score_polarity(&self, text: &str) -> Result<f64, OracleError> {
        self(text)
    }
}

/// Normalizes text and classifies it through an oracle.
#[derive(Debug, Clone)]
pub struct PolarityClassifier<O> {
    oracle: O,
}

impl<O: PolarityOracle> PolarityClassifier<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Continuous polarity of the normalized text.
    pub fn polarity(&self, text: &str) -> Result<f64, OracleError> {
        let cleaned = normalize(text);
        self.oracle.score_polarity(&cleaned)
    }

    /// Sentiment class of raw post text.
    pub fn classify(&self, text: &str) -> Result<SentimentClass, OracleError> {
        let polarity = self.polarity(text)?;
        SentimentClass::from_polarity(polarity).ok_or(OracleError::NotANumber)
    }
}

/// Pins a test closure to the oracle signature so its types are inferred.
#[cfg(test)]
pub(crate) fn stub_oracle<F>(f: F) -> F
where
    F: Fn(&str) -> Result<f64, OracleError> + Send + Sync,
{
    f
}
