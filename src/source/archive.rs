//! Post source backed by exported timeline files
//!
//! An archive is a directory holding one entry per account:
//!
//! ```text
//! timeline-archive/
//! ├── playvalorant.json        # JSON array of posts (or {"data": [...]})
//! ├── riotgames.jsonl          # one post per line
//! └── someone/                 # paged export, walked recursively
//!     ├── page-001.json
//!     └── page-002.jsonl
//! ```
//!
//! Pages may overlap; posts are merged, de-duplicated by id and returned
//! newest first.

use super::{Post, PostSource, SourceError};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// A `.json` page is either a bare array or wrapped in `data`.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonPage {
    List(Vec<Post>),
    Wrapped { data: Vec<Post> },
}

/// Reads posts from a local timeline archive directory.
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    root: PathBuf,
}

impl ArchiveSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files holding `account`'s posts, in a stable order.
    fn locate(&self, account: &str) -> Result<Vec<PathBuf>, SourceError> {
        let dir = self.root.join(account);
        if dir.is_dir() {
            let pages = WalkDir::new(&dir)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_page(e.path()))
                .map(|e| e.path().to_path_buf())
                .collect();
            return Ok(pages);
        }

        let files: Vec<PathBuf> = ["json", "jsonl"]
            .iter()
            .map(|ext| self.root.join(format!("{}.{}", account, ext)))
            .filter(|p| p.is_file())
            .collect();

        if files.is_empty() {
            return Err(SourceError::AccountNotFound {
                account: account.to_string(),
                location: self.root.clone(),
            });
        }

        Ok(files)
    }
}

impl PostSource for ArchiveSource {
    fn fetch_posts(&self, account: &str, count: usize) -> Result<Vec<Post>, SourceError> {
        if count == 0 {
            return Err(SourceError::InvalidCount);
        }
        let account = account_key(account)?;

        let mut posts = Vec::new();
        for path in self.locate(account)? {
            let page = read_page(&path)?;
            debug!(path = %path.display(), posts = page.len(), "read archive page");
            posts.extend(page);
        }

        // Timeline order: newest first, ties by id
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let mut seen = HashSet::new();
        posts.retain(|p| seen.insert(p.id));
        posts.truncate(count);

        info!(account, requested = count, returned = posts.len(), "fetched posts from archive");
        Ok(posts)
    }
}

/// Strip a leading '@' and refuse anything that could escape the archive root.
fn account_key(account: &str) -> Result<&str, SourceError> {
    let key = account.trim().trim_start_matches('@');

    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && !key.contains(['/', '\\'])
        && !key.chars().any(char::is_whitespace);

    if valid {
        Ok(key)
    } else {
        Err(SourceError::InvalidAccount(account.to_string()))
    }
}

fn is_page(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "json" | "jsonl"))
        .unwrap_or(false)
}

fn read_page(path: &Path) -> Result<Vec<Post>, SourceError> {
    let content = fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_lines = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("jsonl"))
        .unwrap_or(false);

    if is_lines {
        return content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|source| SourceError::Parse {
                    path: path.to_path_buf(),
                    line: Some(i + 1),
                    source,
                })
            })
            .collect();
    }

    let page: JsonPage = serde_json::from_str(&content).map_err(|source| SourceError::Parse {
        path: path.to_path_buf(),
        line: None,
        source,
    })?;

    Ok(match page {
        JsonPage::List(posts) => posts,
        JsonPage::Wrapped { data } => data,
    })
}
