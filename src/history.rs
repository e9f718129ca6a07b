//! Markdown transcripts of completed exchanges.
//!
//! Each exchange becomes one file named `chat_YYYYMMDD_HHMMSS.md` so that a lexicographic
//! sort of the directory is also a chronological one.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use time::PrimitiveDateTime;
use time::macros::format_description;

use crate::error::{Error, Result};
use crate::observability::{HISTORY_WRITE_ERRORS, HISTORY_WRITES};
use crate::types::ChatExchange;

const PREFIX: &str = "chat_";
const SUFFIX: &str = ".md";
const STAMP_LEN: usize = "YYYYMMDD_HHMMSS".len();
const MAX_SAME_SECOND: u32 = 1000;

/// A transcript file found in the history directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// File name within the history directory.
    pub file_name: String,
    /// The time encoded in the file name, if it parses.
    pub timestamp: Option<PrimitiveDateTime>,
}

impl HistoryEntry {
    fn from_file_name(file_name: String) -> Self {
        let timestamp = file_name
            .strip_prefix(PREFIX)
            .and_then(|rest| rest.get(..STAMP_LEN))
            .and_then(|stamp| {
                PrimitiveDateTime::parse(
                    stamp,
                    format_description!("[year][month][day]_[hour][minute][second]"),
                )
                .ok()
            });
        Self {
            file_name,
            timestamp,
        }
    }

    /// A human-readable form of the entry's timestamp.
    pub fn display_time(&self) -> String {
        self.timestamp
            .and_then(|ts| {
                ts.format(format_description!(
                    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second]"
                ))
                .ok()
            })
            .unwrap_or_else(|| "unknown time".to_string())
    }
}

/// Writes and lists transcripts in one directory.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    /// Create a store rooted at `dir`.  The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the transcripts.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist `exchange` as a new transcript file and return its path.
    pub fn append(&self, exchange: &ChatExchange) -> Result<PathBuf> {
        let result = self.write_record(exchange);
        match &result {
            Ok(path) => {
                HISTORY_WRITES.click();
                tracing::info!(path = %path.display(), "saved chat history");
            }
            Err(err) => {
                HISTORY_WRITE_ERRORS.click();
                tracing::warn!(error = %err, "failed to save chat history");
            }
        }
        result
    }

    fn write_record(&self, exchange: &ChatExchange) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|err| {
            Error::io(
                format!("failed to create history directory {}", self.dir.display()),
                err,
            )
        })?;
        let stamp = file_stamp(exchange)?;
        let record = render_record(exchange, &stamp);
        for attempt in 0..MAX_SAME_SECOND {
            let name = if attempt == 0 {
                format!("{PREFIX}{stamp}{SUFFIX}")
            } else {
                format!("{PREFIX}{stamp}_{attempt}{SUFFIX}")
            };
            let path = self.dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(record.as_bytes()).map_err(|err| {
                        Error::io(
                            format!("failed to save chat history {}", path.display()),
                            err,
                        )
                    })?;
                    return Ok(path);
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => {
                    return Err(Error::io(
                        format!("failed to save chat history {}", path.display()),
                        err,
                    ));
                }
            }
        }
        Err(Error::io(
            format!("too many transcripts for {stamp}"),
            io::Error::from(io::ErrorKind::AlreadyExists),
        ))
    }

    /// Every transcript, sorted by file name.  A missing directory has no entries.
    pub fn list(&self) -> Result<Vec<HistoryEntry>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(Error::io(
                    format!("failed to read history directory {}", self.dir.display()),
                    err,
                ));
            }
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(SUFFIX) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names.into_iter().map(HistoryEntry::from_file_name).collect())
    }
}

fn file_stamp(exchange: &ChatExchange) -> Result<String> {
    exchange
        .timestamp
        .format(format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .map_err(|err| {
            Error::io(
                "failed to format history timestamp",
                io::Error::new(io::ErrorKind::InvalidData, err),
            )
        })
}

/// The Markdown body of a transcript.
pub fn render_record(exchange: &ChatExchange, stamp: &str) -> String {
    format!(
        "# Chat History ({stamp})\n\
         **Model**: {model}\n\
         **User**: {input}\n\
         **Response**: {response}\n\
         **Stats**:\n\
         - Total Tokens: {tokens}\n\
         - Completion Time: {secs:.2} seconds\n\
         - Tokens per Second: {tps:.2}\n",
        model = exchange.model,
        input = exchange.input,
        response = exchange.response,
        tokens = exchange.total_tokens,
        secs = exchange.completion_time,
        tps = exchange.tokens_per_second(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatReply;
    use tempfile::TempDir;
    use time::macros::datetime;

    fn exchange() -> ChatExchange {
        ChatExchange::new(
            "a",
            "hello",
            ChatReply {
                content: "hi there".to_string(),
                total_tokens: 10,
                completion_time: 2.0,
            },
            datetime!(2025-03-01 12:30:45 UTC),
        )
    }

    #[test]
    fn record_contains_exchange_and_stats() {
        let record = render_record(&exchange(), "20250301_123045");
        assert!(record.starts_with("# Chat History (20250301_123045)\n"));
        assert!(record.contains("**Model**: a\n"));
        assert!(record.contains("**User**: hello\n"));
        assert!(record.contains("**Response**: hi there\n"));
        assert!(record.contains("- Total Tokens: 10\n"));
        assert!(record.contains("- Completion Time: 2.00 seconds\n"));
        assert!(record.contains("- Tokens per Second: 5.00\n"));
    }

    #[test]
    fn append_creates_directory_and_file() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("history"));
        let path = store.append(&exchange()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "chat_20250301_123045.md"
        );
        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("hi there"));
    }

    #[test]
    fn same_second_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path());
        let first = store.append(&exchange()).unwrap();
        let second = store.append(&exchange()).unwrap();
        assert_ne!(first, second);
        assert_eq!(
            second.file_name().unwrap().to_str().unwrap(),
            "chat_20250301_123045_1.md"
        );
        let names: Vec<String> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|e| e.file_name)
            .collect();
        assert_eq!(
            names,
            vec!["chat_20250301_123045.md", "chat_20250301_123045_1.md"]
        );
    }

    #[test]
    fn missing_directory_lists_empty() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("nope"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn list_sorts_and_skips_other_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("chat_20250302_000000.md"), "").unwrap();
        fs::write(dir.path().join("chat_20250101_090000.md"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("sub.md")).unwrap();

        let entries = HistoryStore::new(dir.path()).list().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].file_name, "chat_20250101_090000.md");
        assert_eq!(entries[0].display_time(), "Wed, 01 Jan 2025 09:00:00");
        assert_eq!(entries[1].file_name, "chat_20250302_000000.md");
    }

    #[test]
    fn unparsable_names_have_no_timestamp() {
        let entry = HistoryEntry::from_file_name("random.md".to_string());
        assert_eq!(entry.timestamp, None);
        assert_eq!(entry.display_time(), "unknown time");
    }
}
