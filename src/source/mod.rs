//! Where posts come from
//!
//! The analysis only needs an ordered batch of [`Post`]s for one account.
//! Anything that can supply that implements [`PostSource`]; the crate ships
//! [`ArchiveSource`], which reads exported timelines from disk.

pub mod archive;

pub use archive::ArchiveSource;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// A single post as delivered by a source.
///
/// Field names follow the common timeline export format; `full_text`,
/// `favorite_count` and `share_count` are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(alias = "full_text")]
    pub text: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Client the post was made from ("Twitter Web App", "Sprinklr", ...)
    #[serde(default)]
    pub source: String,
    #[serde(alias = "favorite_count")]
    pub like_count: u64,
    #[serde(alias = "share_count")]
    pub retweet_count: u64,
}

/// Supplies an account's most recent posts.
pub trait PostSource {
    /// Up to `count` posts, newest first. Never returns more than `count`.
    fn fetch_posts(&self, account: &str, count: usize) -> Result<Vec<Post>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("post count must be greater than zero")]
    InvalidCount,

    #[error("invalid account name {0:?}")]
    InvalidAccount(String),

    #[error("no posts found for account {account:?} under {location}")]
    AccountNotFound { account: String, location: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed post data in {path}{}: {source}", .line.map(|l| format!(" line {}", l)).unwrap_or_default())]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        #[source]
        source: serde_json::Error,
    },
}

/// Timestamps are written as RFC 3339 and read as either RFC 3339 or the
/// classic timeline format (`Wed Oct 10 20:19:24 +0000 2018`).
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const TIMELINE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_str(raw, TIMELINE_FORMAT))
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(|e| de::Error::custom(format!("invalid timestamp {:?}: {}", raw, e)))
    }
}
