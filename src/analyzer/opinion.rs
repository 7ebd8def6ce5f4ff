//! Opinion aggregation
//!
//! Reduces a finished post table to one [`OpinionSummary`]:
//!
//! - **Class counts**: how many posts fell in each sentiment class.
//! - **Weighted opinion score**: `Σ code × (likes + 2 × shares)`. A neutral
//!   post adds nothing however popular it is.
//! - **Average star rating**: positive posts count as 5 stars, neutral as 3,
//!   negative as 1. The result always lies in `[1, 5]`.
//!
//! Sums run in table order, so the same table always gives bit-identical
//! floats.

use super::polarity::SentimentClass;
use super::table::PostRecord;
use serde::Serialize;
use thiserror::Error;

/// Summary requested over zero posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot summarize an empty set of posts")]
pub struct EmptyInputError;

/// Aggregate opinion of one batch of posts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpinionSummary {
    pub positive_count: usize,
    pub neutral_count: usize,
    pub negative_count: usize,
    pub weighted_opinion_score: f64,
    pub average_star_rating: f64,
}

impl OpinionSummary {
    pub fn from_records(records: &[PostRecord]) -> Result<Self, EmptyInputError> {
        if records.is_empty() {
            return Err(EmptyInputError);
        }

        let mut positive_count = 0;
        let mut neutral_count = 0;
        let mut negative_count = 0;
        let mut weighted_opinion_score = 0.0;

        for record in records {
            match record.sentiment {
                SentimentClass::Positive => positive_count += 1,
                SentimentClass::Neutral => neutral_count += 1,
                SentimentClass::Negative => negative_count += 1,
            }
            weighted_opinion_score += record.weighted_opinion();
        }

        let stars = positive_count * SentimentClass::Positive.stars() as usize
            + neutral_count * SentimentClass::Neutral.stars() as usize
            + negative_count * SentimentClass::Negative.stars() as usize;
        let average_star_rating = stars as f64 / records.len() as f64;

        Ok(Self {
            positive_count,
            neutral_count,
            negative_count,
            weighted_opinion_score,
            average_star_rating,
        })
    }

    pub fn total(&self) -> usize {
        self.positive_count + self.neutral_count + self.negative_count
    }

    pub fn count(&self, class: SentimentClass) -> usize {
        match class {
            SentimentClass::Positive => self.positive_count,
            SentimentClass::Neutral => self.neutral_count,
            SentimentClass::Negative => self.negative_count,
        }
    }

    /// Bar chart data, Positive / Neutral / Negative.
    pub fn bars(&self) -> [(SentimentClass, usize); 3] {
        SentimentClass::ALL.map(|class| (class, self.count(class)))
    }

    /// Share of posts in `class`, as a percentage.
    pub fn percent(&self, class: SentimentClass) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.count(class) as f64 / total as f64 * 100.0
        }
    }
}

/// Summarize a post table. Fails on an empty table.
pub fn summarize(records: &[PostRecord]) -> Result<OpinionSummary, EmptyInputError> {
    OpinionSummary::from_records(records)
}
