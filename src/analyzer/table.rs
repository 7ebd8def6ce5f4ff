//! Row-per-post table
//!
//! The table is assembled in two passes:
//!
//! 1. [`PostTable::assemble`] copies each post into a [`PostRow`] and records
//!    the length of its raw text.
//! 2. [`PostTable::with_sentiment`] classifies every row's text and yields the
//!    final [`PostRecord`]s. After this pass the rows are never modified.
//!
//! Classification is per-row and independent, so the second pass runs on the
//! rayon pool. Output order always matches input order.

use super::polarity::{PolarityClassifier, PolarityOracle, SentimentClass};
use super::AnalysisError;
use crate::source::{timestamp, Post};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What to do when the oracle can't score one post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleFailurePolicy {
    /// Fail the whole build
    #[default]
    Abort,
    /// Record the post as neutral and keep going
    Neutral,
}

/// A post's row before the sentiment pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRow {
    pub id: u64,
    pub text: String,
    /// Characters in the raw text (not the cleaned text)
    pub text_length: usize,
    pub created_at: DateTime<Utc>,
    pub source: String,
    pub like_count: u64,
    pub retweet_count: u64,
}

impl From<&Post> for PostRow {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            text: post.text.clone(),
            text_length: post.text.chars().count(),
            created_at: post.created_at,
            source: post.source.clone(),
            like_count: post.like_count,
            retweet_count: post.retweet_count,
        }
    }
}

/// A finished table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: u64,
    pub text: String,
    pub text_length: usize,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub source: String,
    pub like_count: u64,
    pub retweet_count: u64,
    pub sentiment: SentimentClass,
}

impl PostRecord {
    fn from_row(row: PostRow, sentiment: SentimentClass) -> Self {
        Self {
            id: row.id,
            text: row.text,
            text_length: row.text_length,
            created_at: row.created_at,
            source: row.source,
            like_count: row.like_count,
            retweet_count: row.retweet_count,
            sentiment,
        }
    }

    /// Likes plus twice the shares: a reshare counts double.
    ///
    /// Computed in `f64` so counts near `u64::MAX` cannot overflow.
    pub fn engagement(&self) -> f64 {
        self.like_count as f64 + 2.0 * self.retweet_count as f64
    }

    /// This post's term of the weighted opinion score.
    pub fn weighted_opinion(&self) -> f64 {
        f64::from(self.sentiment.code()) * self.engagement()
    }
}

/// Table of posts awaiting classification.
#[derive(Debug, Clone, Default)]
pub struct PostTable {
    rows: Vec<PostRow>,
}

impl PostTable {
    /// First pass: one row per post, in input order.
    pub fn assemble(posts: &[Post]) -> Self {
        Self {
            rows: posts.iter().map(PostRow::from).collect(),
        }
    }

    pub fn rows(&self) -> &[PostRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Second pass: classify every row.
    pub fn with_sentiment<O: PolarityOracle>(
        self,
        classifier: &PolarityClassifier<O>,
        policy: OracleFailurePolicy,
    ) -> Result<Vec<PostRecord>, AnalysisError> {
        self.with_sentiment_observed(classifier, policy, |_| {})
    }

    /// Like [`PostTable::with_sentiment`], calling `on_scored` as each row
    /// is classified (from worker threads, in no particular order).
    ///
    /// Under [`OracleFailurePolicy::Abort`] the error reported is the one
    /// for the first failing row in table order.
    pub fn with_sentiment_observed<O, F>(
        self,
        classifier: &PolarityClassifier<O>,
        policy: OracleFailurePolicy,
        on_scored: F,
    ) -> Result<Vec<PostRecord>, AnalysisError>
    where
        O: PolarityOracle,
        F: Fn(&PostRecord) + Sync,
    {
        let scored: Vec<Result<PostRecord, AnalysisError>> = self
            .rows
            .into_par_iter()
            .enumerate()
            .map(|(index, row)| {
                let sentiment = match classifier.classify(&row.text) {
                    Ok(class) => class,
                    Err(source) => match policy {
                        OracleFailurePolicy::Abort => {
                            return Err(AnalysisError::Oracle {
                                index,
                                post_id: row.id,
                                source,
                            })
                        }
                        OracleFailurePolicy::Neutral => {
                            warn!(post_id = row.id, index, error = %source, "recording unscorable post as neutral");
                            SentimentClass::Neutral
                        }
                    },
                };

                let record = PostRecord::from_row(row, sentiment);
                on_scored(&record);
                Ok(record)
            })
            .collect();

        scored.into_iter().collect()
    }
}

/// Assemble and classify in one step.
pub fn build<O: PolarityOracle>(
    posts: &[Post],
    classifier: &PolarityClassifier<O>,
    policy: OracleFailurePolicy,
) -> Result<Vec<PostRecord>, AnalysisError> {
    PostTable::assemble(posts).with_sentiment(classifier, policy)
}
