//! Logging system for emulog
//!
//! Severity-filtered, channel-based logging with pluggable listeners: a file
//! sink, a colored terminal sink, a debugger sink and an in-memory ring
//! buffer for UI scrollback.

mod buffer;
mod channel;
mod console;
mod file_writer;
mod level;
mod listener;
mod macros;
mod manager;
mod message;

pub use buffer::RingBufferSink;
pub use channel::{ChannelRegistry, LogChannel, LogType, MAX_SHORT_NAME, NUMBER_OF_LOGS};
pub use console::{debugger_present, level_color, ConsoleSink, DebuggerSink};
pub use file_writer::FileSink;
pub use level::{glyph_for_ordinal, LogLevel};
pub use listener::LogListener;
pub use manager::{LogHost, LogManager};
pub use message::{
    clear_worker_name, current_worker_name, format_body, set_worker_name, short_file_name,
    LogMessage, SourceLocation, WorkerNameGuard, FAST_PATH_BYTES,
};
