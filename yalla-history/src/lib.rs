//! History manager (C1): a persistent, navigable, deduplicating log of
//! prior REPL inputs.
//!
//! Grounded on `llmspell-kernel::repl::state::SessionHistory`: dedup against
//! only the immediately-previous entry, truncate from the front once the cap
//! is reached, and persist as a flat newline-joined text file.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Sentinel returned by [`History::next`] once the cursor walks past the
/// most recent entry: the input reader uses it to restore an empty buffer.
pub const EMPTY_SENTINEL: &str = "";

/// Ordered log of accepted input lines with cursor-based navigation.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    max_entries: usize,
    ignore_duplicates: bool,
    cursor: Option<usize>,
    file: Option<PathBuf>,
}

impl History {
    pub fn new(max_entries: usize, ignore_duplicates: bool) -> Self {
        Self {
            entries: Vec::new(),
            max_entries: max_entries.max(1),
            ignore_duplicates,
            cursor: None,
            file: None,
        }
    }

    /// Attaches a persistence file, loading any existing entries from it.
    /// A file that cannot be read starts with an empty log; this is not an
    /// error (§4.2).
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Ok(text) = fs::read_to_string(&path) {
            self.entries = text.lines().map(str::to_string).collect();
            self.truncate_from_front();
        }
        self.file = Some(path);
        self
    }

    /// Appends `line` unless blank or a suppressed duplicate, then persists.
    pub fn add(&mut self, line: impl Into<String>) -> Result<(), HistoryError> {
        let line = line.into();
        if line.trim().is_empty() {
            return Ok(());
        }
        if self.ignore_duplicates && self.entries.last().map(String::as_str) == Some(line.as_str())
        {
            self.cursor = None;
            return Ok(());
        }
        self.entries.push(line);
        self.truncate_from_front();
        self.cursor = None;
        self.persist()
    }

    fn truncate_from_front(&mut self) {
        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(0..excess);
        }
    }

    /// Moves the cursor one step toward older entries and returns it.
    pub fn previous(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        self.cursor = Some(match self.cursor {
            None => self.entries.len() - 1,
            Some(idx) => idx.saturating_sub(1),
        });
        self.cursor.map(|idx| self.entries[idx].as_str())
    }

    /// Moves the cursor one step toward newer entries; returns the empty
    /// sentinel once the cursor walks past the most recent entry.
    pub fn next(&mut self) -> &str {
        match self.cursor {
            None => EMPTY_SENTINEL,
            Some(idx) if idx + 1 < self.entries.len() => {
                self.cursor = Some(idx + 1);
                self.entries[idx + 1].as_str()
            }
            Some(_) => {
                self.cursor = None;
                EMPTY_SENTINEL
            }
        }
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    /// All entries containing `substring`, in original order.
    pub fn search(&self, substring: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.contains(substring))
            .map(String::as_str)
            .collect()
    }

    pub fn all(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empties the in-memory list and removes the persistence file, if any.
    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.entries.clear();
        self.cursor = None;
        if let Some(path) = &self.file {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    fn persist(&self) -> Result<(), HistoryError> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                create_user_only_dir(parent)?;
            }
        }
        let contents = self.entries.join("\n");
        fs::write(path, contents + "\n")?;
        Ok(())
    }
}

#[cfg(unix)]
fn create_user_only_dir(path: &Path) -> Result<(), HistoryError> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(path)?;
    Ok(())
}

#[cfg(not(unix))]
fn create_user_only_dir(path: &Path) -> Result<(), HistoryError> {
    fs::create_dir_all(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_ignores_blank_lines() {
        let mut history = History::new(10, true);
        history.add("   ").unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn add_suppresses_immediate_duplicate() {
        let mut history = History::new(10, true);
        history.add("ls").unwrap();
        history.add("ls").unwrap();
        assert_eq!(history.all(), &["ls".to_string()]);
    }

    #[test]
    fn add_allows_nonadjacent_duplicate() {
        let mut history = History::new(10, true);
        history.add("ls").unwrap();
        history.add("pwd").unwrap();
        history.add("ls").unwrap();
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn truncates_from_the_front_at_capacity() {
        let mut history = History::new(3, false);
        for i in 0..5 {
            history.add(format!("cmd{i}")).unwrap();
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.all(), &["cmd2", "cmd3", "cmd4"]);
    }

    #[test]
    fn previous_and_next_walk_the_cursor() {
        let mut history = History::new(10, false);
        history.add("a").unwrap();
        history.add("b").unwrap();
        history.add("c").unwrap();

        assert_eq!(history.previous(), Some("c"));
        assert_eq!(history.previous(), Some("b"));
        assert_eq!(history.previous(), Some("a"));
        assert_eq!(history.previous(), Some("a"));

        assert_eq!(history.next(), "b");
        assert_eq!(history.next(), "c");
        assert_eq!(history.next(), EMPTY_SENTINEL);
    }

    #[test]
    fn search_preserves_order() {
        let mut history = History::new(10, false);
        history.add("git status").unwrap();
        history.add("ls").unwrap();
        history.add("git log").unwrap();
        assert_eq!(history.search("git"), vec!["git status", "git log"]);
    }

    #[test]
    fn persists_and_reloads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history_file");

        let mut history = History::new(10, true).with_file(&path);
        history.add("one").unwrap();
        history.add("two").unwrap();

        let reloaded = History::new(10, true).with_file(&path);
        assert_eq!(reloaded.all(), &["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn clear_removes_file_and_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history_file");

        let mut history = History::new(10, true).with_file(&path);
        history.add("one").unwrap();
        assert!(path.exists());

        history.clear().unwrap();
        assert!(history.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn missing_history_file_is_not_an_error() {
        let history = History::new(10, true).with_file("/nonexistent/dir/hist");
        assert!(history.is_empty());
    }
}
