//! File sink
//!
//! Appends every record to a file and flushes immediately so nothing is lost
//! if the process dies right after logging.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::{LogError, Result};

use super::listener::LogListener;
use super::message::LogMessage;

/// Writes records to a file opened in append mode
///
/// A sink whose file failed to open stays attached but drops every record.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Option<Mutex<File>>,
    enabled: AtomicBool,
}

impl FileSink {
    /// Open `path` for appending, degrading to a no-op sink on failure
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::try_open(&path) {
            Ok(sink) => sink,
            Err(e) => {
                tracing::warn!("{}; file logging disabled", e);
                Self {
                    path,
                    file: None,
                    enabled: AtomicBool::new(true),
                }
            }
        }
    }

    /// Open `path` for appending, reporting failure
    pub fn try_open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                let _ = fs::create_dir_all(parent);
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| LogError::OpenFile {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(Mutex::new(file)),
            enabled: AtomicBool::new(true),
        })
    }

    /// Path this sink writes to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the target file was opened
    pub fn is_valid(&self) -> bool {
        self.file.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }
}

impl LogListener for FileSink {
    fn log(&self, message: &LogMessage) {
        if !self.is_enabled() {
            return;
        }
        let Some(file) = &self.file else {
            return;
        };

        if let Ok(mut file) = file.lock() {
            let _ = write!(file, "{} {}", message.header, message.msg);
            let _ = file.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::level::LogLevel;
    use tempfile::TempDir;

    fn message(text: &str) -> LogMessage {
        LogMessage {
            level: LogLevel::Info,
            channel: "BOOT".to_string(),
            header: "00:00:000 boot.rs:1 I[BOOT]:".to_string(),
            msg: format!("{}\n", text),
        }
    }

    #[test]
    fn test_writes_header_and_body() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.log");

        let sink = FileSink::open(&path);
        assert!(sink.is_valid());
        sink.log(&message("first"));
        sink.log(&message("second"));

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "00:00:000 boot.rs:1 I[BOOT]: first\n00:00:000 boot.rs:1 I[BOOT]: second\n"
        );
    }

    #[test]
    fn test_appends_to_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.log");
        fs::write(&path, "previous\n").unwrap();

        FileSink::open(&path).log(&message("next"));

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("previous\n"));
        assert!(content.ends_with("next\n"));
    }

    #[test]
    fn test_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("out.log");

        let sink = FileSink::open(&path);
        assert!(sink.is_valid());
        assert!(path.exists());
    }

    #[test]
    fn test_unopenable_path_drops_records() {
        let temp_dir = TempDir::new().unwrap();
        // A directory cannot be opened as a file
        let sink = FileSink::open(temp_dir.path());
        assert!(!sink.is_valid());
        sink.log(&message("dropped"));

        assert!(matches!(
            FileSink::try_open(temp_dir.path()),
            Err(LogError::OpenFile { .. })
        ));
    }

    #[test]
    fn test_disabled_sink_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.log");

        let sink = FileSink::open(&path);
        sink.set_enabled(false);
        sink.log(&message("hidden"));

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
