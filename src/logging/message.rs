//! Log record construction
//!
//! Builds the header (timestamp, worker name, severity glyph, channel, source
//! location) and the body of a record. Bodies are formatted into a fixed
//! stack buffer first and only allocate an exactly sized buffer when the
//! message does not fit.

use std::cell::RefCell;
use std::fmt::{self, Write};

use chrono::Local;

use crate::error::{LogError, Result};

use super::level::LogLevel;

/// Size of the stack buffer used by the formatting fast path
pub const FAST_PATH_BYTES: usize = 1024;

/// Body substituted when a message fails to format
pub const FORMAT_ERROR_BODY: &str = "<format error>";

/// Width of the worker name column in headers
const WORKER_NAME_WIDTH: usize = 12;

thread_local! {
    static WORKER_NAME: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Tag records logged from the current thread with `name`
pub fn set_worker_name(name: impl Into<String>) {
    let name = name.into();
    WORKER_NAME.with(|w| *w.borrow_mut() = Some(name));
}

/// Remove the worker tag from the current thread
pub fn clear_worker_name() {
    WORKER_NAME.with(|w| *w.borrow_mut() = None);
}

/// Worker tag of the current thread, if any
pub fn current_worker_name() -> Option<String> {
    WORKER_NAME.with(|w| w.borrow().clone())
}

/// Sets the worker name for the current thread and restores the previous
/// one when dropped
pub struct WorkerNameGuard {
    previous: Option<String>,
}

impl WorkerNameGuard {
    pub fn new(name: impl Into<String>) -> Self {
        let previous = current_worker_name();
        set_worker_name(name);
        Self { previous }
    }
}

impl Drop for WorkerNameGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(name) => set_worker_name(name),
            None => clear_worker_name(),
        }
    }
}

/// A single formatted log record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    /// Severity
    pub level: LogLevel,
    /// Short name of the channel
    pub channel: String,
    /// Timestamp, worker, glyph, channel and location
    pub header: String,
    /// Message text, always ending in exactly one newline
    pub msg: String,
}

/// Source location of a log call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation<'a> {
    pub file: &'a str,
    pub line: u32,
}

impl<'a> SourceLocation<'a> {
    pub fn new(file: &'a str, line: u32) -> Self {
        Self { file, line }
    }
}

/// Strip directories from a source path, accepting both separators
pub fn short_file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Current wall-clock time as `MM:SS:mmm`
pub fn formatted_time() -> String {
    Local::now().format("%M:%S:%3f").to_string()
}

/// Render the header line for a record
pub fn format_header(
    timestamp: &str,
    worker: Option<&str>,
    level: LogLevel,
    channel: &str,
    location: SourceLocation<'_>,
) -> String {
    let file = short_file_name(location.file);
    match worker {
        Some(worker) => {
            let worker: String = worker.chars().take(WORKER_NAME_WIDTH).collect();
            format!(
                "{} {:<width$} {}[{}]: {}:{}",
                timestamp,
                worker,
                level.glyph(),
                channel,
                file,
                location.line,
                width = WORKER_NAME_WIDTH
            )
        }
        None => format!(
            "{} {}:{} {}[{}]:",
            timestamp,
            file,
            location.line,
            level.glyph(),
            channel
        ),
    }
}

/// Fixed-capacity `fmt::Write` target that records whether it ran out of room
struct StackBuf {
    bytes: [u8; FAST_PATH_BYTES],
    len: usize,
    overflowed: bool,
}

impl StackBuf {
    fn new() -> Self {
        Self {
            bytes: [0; FAST_PATH_BYTES],
            len: 0,
            overflowed: false,
        }
    }

    fn as_str(&self) -> &str {
        // Only whole `&str` pieces are ever copied in, so the prefix is valid UTF-8.
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
    }
}

impl fmt::Write for StackBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.len + s.len();
        if end > FAST_PATH_BYTES {
            self.overflowed = true;
            return Err(fmt::Error);
        }
        self.bytes[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

/// Counts bytes without storing them
#[derive(Default)]
struct ByteCounter(usize);

impl fmt::Write for ByteCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

/// Format a message body without truncation
///
/// Messages up to [`FAST_PATH_BYTES`] are rendered on the stack. Longer
/// ones are measured and rendered again into a buffer of exactly the
/// required size. A formatter error from a `Display` impl is reported as
/// [`LogError::Format`].
pub fn format_body(args: fmt::Arguments<'_>) -> Result<String> {
    if let Some(s) = args.as_str() {
        return Ok(s.to_string());
    }

    // A `Display` impl may swallow the overflow error and still return `Ok`,
    // so the overflow flag decides the path, not the result.
    let mut fast = StackBuf::new();
    match fast.write_fmt(args) {
        _ if fast.overflowed => {}
        Ok(()) => return Ok(fast.as_str().to_string()),
        Err(_) => return Err(LogError::Format),
    }

    let mut counter = ByteCounter::default();
    counter.write_fmt(args).map_err(|_| LogError::Format)?;

    let mut body = String::with_capacity(counter.0 + 1);
    body.write_fmt(args).map_err(|_| LogError::Format)?;
    Ok(body)
}

/// Make `body` end in exactly one newline
pub fn terminate_line(body: &mut String) {
    let trimmed = body.trim_end_matches(['\n', '\r']).len();
    body.truncate(trimmed);
    body.push('\n');
}
