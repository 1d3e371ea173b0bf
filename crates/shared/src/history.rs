use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::models::HistoryEntry;

const FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Serialize, Deserialize)]
struct HistoryFile {
    version: String,
    posts: Vec<HistoryEntry>,
}

/// Append-only log of past posts, one JSON document on disk.
///
/// A run reads the file once at start and writes it at most once at the
/// end. Runs are assumed not to overlap (external scheduling guarantees
/// this); there is no file locking.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All recorded entries, oldest first. An absent file is an empty
    /// history; a file that exists but cannot be parsed is an error, so
    /// dedup context is never silently lost.
    pub fn load(&self) -> Result<Vec<HistoryEntry>, PipelineError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            PipelineError::HistoryUnavailable(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let file: HistoryFile = serde_json::from_str(&content).map_err(|e| {
            PipelineError::HistoryUnavailable(format!(
                "{} is not a valid history file: {}",
                self.path.display(),
                e
            ))
        })?;

        if file.version != FORMAT_VERSION {
            return Err(PipelineError::HistoryUnavailable(format!(
                "unsupported history file version: {} (expected {})",
                file.version, FORMAT_VERSION
            )));
        }

        Ok(file.posts)
    }

    /// Append one entry and persist the whole document.
    pub fn append(&self, entry: HistoryEntry) -> Result<(), PipelineError> {
        let mut posts = self.load()?;
        posts.push(entry);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    PipelineError::HistoryUnavailable(format!(
                        "failed to create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = HistoryFile {
            version: FORMAT_VERSION.to_string(),
            posts,
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| {
            PipelineError::HistoryUnavailable(format!("failed to serialize history: {}", e))
        })?;

        fs::write(&self.path, json).map_err(|e| {
            PipelineError::HistoryUnavailable(format!(
                "failed to write {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// Case-insensitive, whitespace-collapsed form used for every title
/// comparison. Exact match only, no fuzzy similarity.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// True if `title` matches the topic of any of the last `window` entries.
pub fn is_duplicate(title: &str, entries: &[HistoryEntry], window: usize) -> bool {
    let normalized = normalize_title(title);
    entries
        .iter()
        .rev()
        .take(window)
        .any(|entry| normalize_title(&entry.topic_title) == normalized)
}
