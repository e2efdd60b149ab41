use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

/// Speaker label for lines typed on this side.
pub const LOCAL_SPEAKER: &str = "You";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatEntry {
    pub speaker: String,
    pub text: String,
}

impl ChatEntry {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

/// Where a finished game's chat goes.
pub trait ChatLog {
    fn flush(&mut self, entries: &[ChatEntry]) -> io::Result<()>;
}

/// Appends each flushed chat to a text file as a timestamped block.
#[derive(Debug, Clone)]
pub struct FileChatLog {
    path: PathBuf,
}

impl FileChatLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChatLog for FileChatLog {
    fn flush(&mut self, entries: &[ChatEntry]) -> io::Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut block = format!("\n--- Chat at {} ---\n", Local::now().format("%Y-%m-%d %H:%M:%S"));
        for entry in entries {
            block.push_str(&format!("{}: {}\n", entry.speaker, entry.text));
        }
        file.write_all(block.as_bytes())?;
        file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_timestamped_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = FileChatLog::new(dir.path().join("chatlog.txt"));

        log.flush(&[ChatEntry::new("You", "hi"), ChatEntry::new("Bob", "hello there")]).unwrap();
        log.flush(&[ChatEntry::new("Bob", "rematch?")]).unwrap();

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(text.matches("--- Chat at ").count(), 2);
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty() && !l.starts_with("---")).collect();
        assert_eq!(lines, vec!["You: hi", "Bob: hello there", "Bob: rematch?"]);
    }

    #[test]
    fn empty_chat_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = FileChatLog::new(dir.path().join("chatlog.txt"));
        log.flush(&[]).unwrap();
        assert!(!log.path().exists());
    }
}
