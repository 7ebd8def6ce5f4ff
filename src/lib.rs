//! Postmood - How does an account's audience feel about its recent posts?
//!
//! Postmood takes an account's most recent posts, scores each one as
//! positive, neutral or negative, and reduces the batch to a single opinion
//! summary.
//!
//! # Overview
//!
//! Each post goes through three steps:
//!
//! 1. **Normalization**: mentions, URLs and every character outside
//!    `[0-9A-Za-z]` and whitespace are stripped, and runs of whitespace are
//!    collapsed. The result is only used for scoring; the table keeps the
//!    raw text.
//!
//! 2. **Classification**: a polarity oracle scores the cleaned text in
//!    `[-1, 1]` and the sign picks the class. The built-in oracle is a word
//!    lexicon; anything implementing [`PolarityOracle`] can replace it.
//!
//! 3. **Aggregation**: class counts, an engagement-weighted opinion score
//!    and an average star rating over the whole table.
//!
//! # Quick Start
//!
//! ```no_run
//! use postmood::{Analyzer, ArchiveSource, PostSource};
//!
//! let posts = ArchiveSource::new("timeline-archive").fetch_posts("playvalorant", 20)?;
//! let analysis = Analyzer::new().analyze(&posts)?;
//!
//! for record in &analysis.records {
//!     println!("[{}] {}", record.sentiment, record.text);
//! }
//! println!("General opinion: {}", analysis.summary.weighted_opinion_score);
//! println!("Average stars: {:.2}", analysis.summary.average_star_rating);
//! # Ok::<(), postmood::Error>(())
//! ```
//!
//! # Scoring
//!
//! | Polarity | Class | Code | Stars |
//! |----------|-------|------|-------|
//! | > 0 | Positive | 1 | 5 |
//! | = 0 | Neutral | 0 | 3 |
//! | < 0 | Negative | -1 | 1 |
//!
//! The weighted opinion score is `Σ code × (likes + 2 × retweets)`.
//!
//! # Modules
//!
//! - [`analyzer`]: normalization, classification, table building and aggregation
//! - [`source`]: where posts come from
//! - [`report`]: output formatters (CSV, JSON, HTML, SVG chart)
//! - [`db`]: optional SQLite store for finished runs
//! - [`config`]: TOML configuration file

pub mod analyzer;
pub mod config;
pub mod db;
pub mod error;
pub mod report;
pub mod schema;
pub mod source;

pub use analyzer::{
    Analysis, AnalysisError, Analyzer, LexiconOracle, OpinionSummary, OracleError, OracleFailurePolicy,
    PolarityClassifier, PolarityOracle, PostRecord, SentimentClass,
};
pub use config::Config;
pub use db::{Database, StoredRun};
pub use error::{Error, Result};
pub use report::{CollisionPolicy, ReportError};
pub use source::{ArchiveSource, Post, PostSource, SourceError};
