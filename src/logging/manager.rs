//! Log manager
//!
//! Owns the channel registry and the listener list, formats records and fans
//! them out to every attached listener. One manager exists per process; the
//! application's bootstrap creates it through [`LogHost`] and hands
//! `Arc<LogManager>` clones to the subsystems that log.

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{ConfigSection, LogConfig};

use super::buffer::RingBufferSink;
use super::channel::{ChannelRegistry, LogChannel, LogType};
use super::console::{ConsoleSink, DebuggerSink};
use super::file_writer::FileSink;
use super::level::LogLevel;
use super::listener::{same_listener, LogListener};
use super::message::{
    current_worker_name, format_body, format_header, formatted_time, terminate_line, LogMessage,
    SourceLocation, FORMAT_ERROR_BODY,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-wide logging coordinator
///
/// `log` takes the formatting lock and then the listener lock, and holds both
/// while dispatching, so every listener sees records in the same total order.
/// Listeners must not log through the manager from inside `LogListener::log`.
pub struct LogManager {
    logging_enabled: AtomicBool,
    channels: ChannelRegistry,
    log_lock: Mutex<()>,
    listeners: Mutex<Vec<Arc<dyn LogListener>>>,
    file_log: Mutex<Option<Arc<FileSink>>>,
    console_log: Option<Arc<ConsoleSink>>,
    debugger_log: Option<Arc<DebuggerSink>>,
    ring_log: Arc<RingBufferSink>,
}

impl LogManager {
    /// Create a manager with default channel thresholds and the built-in sinks
    ///
    /// Channels start enabled, at verbose in debug builds and errors-only in
    /// release builds. Stored channel settings are applied separately with
    /// [`LogManager::load_config`].
    pub fn new(config: &LogConfig) -> Self {
        let default_level = LogLevel::default_threshold(cfg!(debug_assertions));

        let console_log = config.console.then(|| Arc::new(ConsoleSink::stdout()));
        let debugger_log = if config.debugger_output {
            Some(Arc::new(DebuggerSink::new())).filter(|d| d.is_attached())
        } else {
            None
        };

        let manager = Self {
            logging_enabled: AtomicBool::new(config.enable_logging),
            channels: ChannelRegistry::new(default_level),
            log_lock: Mutex::new(()),
            listeners: Mutex::new(Vec::new()),
            file_log: Mutex::new(None),
            console_log,
            debugger_log,
            ring_log: Arc::new(RingBufferSink::new(config.ring_capacity)),
        };

        manager.change_file_sink(&config.log_file);
        if let Some(console) = &manager.console_log {
            manager.attach_listener(console.clone());
        }
        if let Some(debugger) = &manager.debugger_log {
            manager.attach_listener(debugger.clone());
        }
        manager.attach_listener(manager.ring_log.clone());

        tracing::debug!(
            "Log manager ready with {} channels and {} listeners",
            manager.channels.len(),
            manager.listener_count()
        );
        manager
    }

    /// Format a record and dispatch it to every listener
    ///
    /// Does nothing when logging is switched off or the channel filters the
    /// level out. Never fails: a message that cannot be formatted is
    /// delivered with a placeholder body.
    pub fn log(
        &self,
        level: LogLevel,
        log_type: LogType,
        location: SourceLocation<'_>,
        args: fmt::Arguments<'_>,
    ) {
        if !self.is_enabled(level, log_type) {
            return;
        }
        let channel = self.channels.get(log_type);

        let mut body = format_body(args).unwrap_or_else(|e| {
            tracing::warn!("{} at {}:{}", e, location.file, location.line);
            FORMAT_ERROR_BODY.to_string()
        });
        terminate_line(&mut body);

        let worker = current_worker_name();

        let _format_guard = lock(&self.log_lock);
        let header = format_header(
            &formatted_time(),
            worker.as_deref(),
            level,
            channel.short_name(),
            location,
        );
        let message = LogMessage {
            level,
            channel: channel.short_name().to_string(),
            header,
            msg: body,
        };

        let listeners = lock(&self.listeners);
        for listener in listeners.iter() {
            listener.log(&message);
        }
    }

    /// Whether a record at `level` on `log_type` would be delivered
    pub fn is_enabled(&self, level: LogLevel, log_type: LogType) -> bool {
        self.logging_enabled() && self.channels.get(log_type).accepts(level)
    }

    /// State of the process-wide logging switch
    pub fn logging_enabled(&self) -> bool {
        self.logging_enabled.load(Ordering::Relaxed)
    }

    /// Flip the process-wide logging switch
    pub fn set_logging_enabled(&self, enabled: bool) {
        self.logging_enabled.store(enabled, Ordering::Relaxed);
    }

    /// Append a listener; it receives records after those attached earlier
    pub fn attach_listener(&self, listener: Arc<dyn LogListener>) {
        lock(&self.listeners).push(listener);
    }

    /// Remove a listener by identity; unknown listeners are ignored
    pub fn detach_listener(&self, listener: &Arc<dyn LogListener>) {
        let mut listeners = lock(&self.listeners);
        if let Some(pos) = listeners.iter().position(|l| same_listener(l, listener)) {
            listeners.remove(pos);
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Replace the file sink
    ///
    /// The current file sink is detached and dropped. A non-empty `path`
    /// opens a new sink in append mode and attaches it; if the file cannot
    /// be opened the sink stays attached and drops its records.
    pub fn change_file_sink(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut file_log = lock(&self.file_log);

        if let Some(old) = file_log.take() {
            let old: Arc<dyn LogListener> = old;
            self.detach_listener(&old);
        }

        if !path.as_os_str().is_empty() {
            let sink = Arc::new(FileSink::open(path));
            self.attach_listener(sink.clone());
            *file_log = Some(sink);
        }
    }

    /// Current file sink, if any
    pub fn file_sink(&self) -> Option<Arc<FileSink>> {
        lock(&self.file_log).clone()
    }

    /// Terminal sink, if configured
    pub fn console_sink(&self) -> Option<&Arc<ConsoleSink>> {
        self.console_log.as_ref()
    }

    /// Debugger sink, if configured and a debugger is attached
    pub fn debugger_sink(&self) -> Option<&Arc<DebuggerSink>> {
        self.debugger_log.as_ref()
    }

    /// In-memory scrollback of recent records
    pub fn ring_buffer(&self) -> &Arc<RingBufferSink> {
        &self.ring_log
    }

    pub fn channels(&self) -> &ChannelRegistry {
        &self.channels
    }

    pub fn channel(&self, log_type: LogType) -> &LogChannel {
        self.channels.get(log_type)
    }

    pub fn set_enabled(&self, log_type: LogType, enabled: bool) {
        self.channels.get(log_type).set_enabled(enabled);
    }

    pub fn set_level(&self, log_type: LogType, level: LogLevel) {
        self.channels.get(log_type).set_level(level);
    }

    pub fn set_all_levels(&self, level: LogLevel) {
        self.channels.set_all_levels(level);
    }

    pub fn set_all_enabled(&self, enabled: bool) {
        self.channels.set_all_enabled(enabled);
    }

    /// Persist channel settings as `<NAME>Enabled` / `<NAME>Level` keys
    pub fn save_config(&self, section: &mut ConfigSection) {
        self.channels.save_config(section);
    }

    /// Restore channel settings, substituting defaults for missing keys
    pub fn load_config(&self, section: &ConfigSection, debug_defaults: bool) {
        self.channels.load_config(section, debug_defaults);
    }

    /// Detach every listener and close the file sink
    fn detach_all(&self) {
        let mut file_log = lock(&self.file_log);
        *file_log = None;
        lock(&self.listeners).clear();
    }
}

/// Owner of the process's log manager
///
/// The application bootstrap calls [`LogHost::init`] once before anything
/// logs and [`LogHost::shutdown`] once at teardown. Both are safe to repeat.
#[derive(Default)]
pub struct LogHost {
    manager: Option<Arc<LogManager>>,
}

impl LogHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the manager and apply stored channel settings
    ///
    /// If a manager already exists it is returned unchanged.
    pub fn init(&mut self, config: &LogConfig) -> Arc<LogManager> {
        if let Some(manager) = &self.manager {
            return manager.clone();
        }
        let manager = Arc::new(LogManager::new(config));
        manager.load_config(&config.channels, config.debug_defaults);
        self.manager = Some(manager.clone());
        manager
    }

    /// Tear the manager down
    ///
    /// Handles still held elsewhere stay valid but no longer deliver records.
    pub fn shutdown(&mut self) {
        if let Some(manager) = self.manager.take() {
            manager.set_logging_enabled(false);
            manager.detach_all();
            tracing::debug!("Log manager shut down");
        }
    }

    pub fn manager(&self) -> Option<&Arc<LogManager>> {
        self.manager.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.manager.is_some()
    }
}

impl Drop for LogHost {
    fn drop(&mut self) {
        self.shutdown();
    }
}
