//! Sentiment analysis pipeline
//!
//! ```text
//! posts ─▶ PostTable::assemble ─▶ with_sentiment ─▶ OpinionSummary
//!                                    │
//!                          normalize ─▶ oracle ─▶ sign
//! ```
//!
//! [`Analyzer`] wires the stages together. The individual pieces are public
//! for callers that want to stop part-way (e.g. build a table without
//! summarizing it).

pub mod lexicon;
pub mod normalize;
pub mod opinion;
pub mod polarity;
pub mod table;

pub use lexicon::{LexiconError, LexiconOracle};
pub use normalize::normalize;
pub use opinion::{summarize, EmptyInputError, OpinionSummary};
pub use polarity::{OracleError, PolarityClassifier, PolarityOracle, SentimentClass};
pub use table::{build, OracleFailurePolicy, PostRecord, PostRow, PostTable};

use crate::source::Post;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("sentiment scoring failed for post {post_id} (row {index}): {source}")]
    Oracle {
        index: usize,
        post_id: u64,
        source: OracleError,
    },

    #[error(transparent)]
    EmptyInput(#[from] EmptyInputError),
}

/// Finished post table and its summary.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub records: Vec<PostRecord>,
    pub summary: OpinionSummary,
}

/// Runs the whole pipeline over a batch of posts.
#[derive(Debug, Clone)]
pub struct Analyzer<O = LexiconOracle> {
    classifier: PolarityClassifier<O>,
    on_oracle_error: OracleFailurePolicy,
}

impl Default for Analyzer<LexiconOracle> {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer<LexiconOracle> {
    /// Analyzer using the built-in lexicon oracle.
    pub fn new() -> Self {
        Self::with_oracle(LexiconOracle::new())
    }
}

impl<O: PolarityOracle> Analyzer<O> {
    pub fn with_oracle(oracle: O) -> Self {
        Self {
            classifier: PolarityClassifier::new(oracle),
            on_oracle_error: OracleFailurePolicy::default(),
        }
    }

    pub fn with_failure_policy(mut self, policy: OracleFailurePolicy) -> Self {
        self.on_oracle_error = policy;
        self
    }

    pub fn failure_policy(&self) -> OracleFailurePolicy {
        self.on_oracle_error
    }

    pub fn classifier(&self) -> &PolarityClassifier<O> {
        &self.classifier
    }

    pub fn analyze(&self, posts: &[Post]) -> Result<Analysis, AnalysisError> {
        self.analyze_with_progress(posts, |_| {})
    }

    /// Analyze, calling `on_scored` once per classified post.
    pub fn analyze_with_progress<F>(&self, posts: &[Post], on_scored: F) -> Result<Analysis, AnalysisError>
    where
        F: Fn(&PostRecord) + Sync,
    {
        if posts.is_empty() {
            return Err(EmptyInputError.into());
        }

        let records = PostTable::assemble(posts).with_sentiment_observed(
            &self.classifier,
            self.on_oracle_error,
            on_scored,
        )?;
        let summary = OpinionSummary::from_records(&records)?;

        info!(
            posts = records.len(),
            positive = summary.positive_count,
            neutral = summary.neutral_count,
            negative = summary.negative_count,
            "analysis complete"
        );

        Ok(Analysis { records, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::polarity::stub_oracle;
    use crate::analyzer::table::tests::post;

    #[test]
    fn test_default_analyzer_end_to_end() {
        let posts = vec![
            post(1, "What a great match, love this map!", 120, 40),
            post(2, "Servers are down again, terrible", 30, 2),
            post(3, "Episode 3 Act 1 starts June 23", 500, 80),
        ];

        let analysis = Analyzer::new().analyze(&posts).unwrap();

        let classes: Vec<_> = analysis.records.iter().map(|r| r.sentiment).collect();
        assert_eq!(
            classes,
            vec![SentimentClass::Positive, SentimentClass::Negative, SentimentClass::Neutral]
        );
        assert_eq!(analysis.summary.weighted_opinion_score, 200.0 - 34.0);
        assert_eq!(analysis.summary.average_star_rating, 3.0);
    }

    #[test]
    fn test_zero_posts_is_empty_input() {
        let err = Analyzer::new().analyze(&[]).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyInput(EmptyInputError)));
    }

    #[test]
    fn test_failure_policy_is_applied() {
        let failing = stub_oracle(|_| Err(OracleError::Unscorable("offline".to_string())));
        let posts = vec![post(1, "anything", 1, 1)];

        let strict = Analyzer::with_oracle(failing);
        assert_eq!(strict.failure_policy(), OracleFailurePolicy::Abort);
        assert!(matches!(strict.analyze(&posts), Err(AnalysisError::Oracle { post_id: 1, .. })));

        let lenient = strict.with_failure_policy(OracleFailurePolicy::Neutral);
        let analysis = lenient.analyze(&posts).unwrap();
        assert_eq!(analysis.summary.neutral_count, 1);
        assert_eq!(analysis.summary.average_star_rating, 3.0);
    }

    #[test]
    fn test_oracle_error_message() {
        let err = AnalysisError::Oracle {
            index: 4,
            post_id: 99,
            source: OracleError::NotANumber,
        };
        let msg = err.to_string();
        assert!(msg.contains("post 99"));
        assert!(msg.contains("row 4"));
    }
}
