use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::state::{default_transcript, Message, Transcript};

/// Default transcript location, relative to the working directory.
pub const DEFAULT_HISTORY_FILE: &str = "chat_history.json";

/// Reads and writes the transcript as a pretty-printed JSON array.
///
/// Every save replaces the whole file. The new contents go to a sibling
/// temporary file first and are renamed over the target, so an interrupted
/// save leaves the previous transcript intact.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    path: PathBuf,
}

impl TranscriptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the transcript, or the default one-message transcript when the
    /// file does not exist yet.
    pub fn load(&self) -> Result<Transcript, StoreError> {
        if !self.path.exists() {
            return Ok(default_transcript());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let transcript: Transcript =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(
            path = %self.path.display(),
            messages = transcript.len(),
            "loaded transcript"
        );
        Ok(transcript)
    }

    pub fn save(&self, transcript: &[Message]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(transcript)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
            }
        }

        let tmp_path = self.temp_path();
        let written = write_synced(&tmp_path, content.as_bytes())
            .and_then(|_| fs::rename(&tmp_path, &self.path));
        if let Err(source) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(self.io_error(source));
        }

        tracing::debug!(
            path = %self.path.display(),
            messages = transcript.len(),
            "saved transcript"
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_HISTORY_FILE.to_string());
        self.path.with_file_name(format!(".{file_name}.tmp"))
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DEFAULT_SYSTEM_PROMPT;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_default_system_message() {
        let dir = TempDir::new().unwrap();
        let store = TranscriptStore::new(dir.path().join("chat_history.json"));

        let transcript = store.load().unwrap();

        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0], Message::system(DEFAULT_SYSTEM_PROMPT));
    }

    #[test]
    fn save_then_load_preserves_order_and_unicode() {
        let dir = TempDir::new().unwrap();
        let store = TranscriptStore::new(dir.path().join("chat_history.json"));
        let transcript = vec![
            Message::system(DEFAULT_SYSTEM_PROMPT),
            Message::user("¿Qué tal? 日本語 🤖"),
            Message::assistant("Très bien, merci."),
        ];

        store.save(&transcript).unwrap();

        assert_eq!(store.load().unwrap(), transcript);
    }

    #[test]
    fn file_is_indented_with_literal_non_ascii() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat_history.json");
        let store = TranscriptStore::new(&path);

        store
            .save(&[Message::system(DEFAULT_SYSTEM_PROMPT), Message::user("café")])
            .unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("café"));
        assert!(!raw.contains("\\u00e9"));
        assert!(raw.starts_with("[\n  {\n    \"role\": \"system\","));
    }

    #[test]
    fn save_creates_parent_dirs_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("history.json");
        let store = TranscriptStore::new(&path);

        store.save(&default_transcript()).unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("nested").join(".history.json.tmp").exists());
    }

    #[test]
    fn failed_save_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat_history.json");
        // A non-empty directory at the target makes the rename fail
        fs::create_dir_all(path.join("occupied")).unwrap();
        let store = TranscriptStore::new(&path);

        let err = store.save(&default_transcript()).unwrap_err();

        assert!(matches!(err, StoreError::Io { .. }));
        assert!(!dir.path().join(".chat_history.json.tmp").exists());
        assert!(path.join("occupied").is_dir());
    }

    #[test]
    fn save_overwrites_previous_contents() {
        let dir = TempDir::new().unwrap();
        let store = TranscriptStore::new(dir.path().join("chat_history.json"));
        let longer = vec![
            Message::system(DEFAULT_SYSTEM_PROMPT),
            Message::user("one"),
            Message::assistant("two"),
        ];

        store.save(&longer).unwrap();
        store.save(&default_transcript()).unwrap();

        assert_eq!(store.load().unwrap(), default_transcript());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat_history.json");
        fs::write(&path, "{ not json").unwrap();

        let err = TranscriptStore::new(&path).load().unwrap_err();

        assert!(matches!(err, StoreError::Parse { .. }));
    }
}
