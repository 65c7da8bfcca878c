//! Terminal and debugger sinks

use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

use super::level::LogLevel;
use super::listener::LogListener;
use super::message::LogMessage;

type SharedWriter = Mutex<Box<dyn Write + Send>>;

/// Color used for a severity on the terminal
pub fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Fatal => Color::DarkRed,
        LogLevel::Error => Color::Red,
        LogLevel::Warning => Color::Yellow,
        LogLevel::Notice => Color::Green,
        LogLevel::Info => Color::Reset,
        LogLevel::Debug => Color::Grey,
        LogLevel::Verbose => Color::DarkGrey,
    }
}

/// Writes records to the terminal, colored by severity
///
/// When stdout is not a terminal the sink is absent and drops everything.
pub struct ConsoleSink {
    out: SharedWriter,
    present: bool,
    colored: bool,
    enabled: AtomicBool,
}

impl ConsoleSink {
    /// Sink on the process stdout
    pub fn stdout() -> Self {
        let present = io::stdout().is_terminal();
        Self {
            out: Mutex::new(Box::new(io::stdout())),
            present,
            colored: present,
            enabled: AtomicBool::new(true),
        }
    }

    /// Sink on an arbitrary writer, always present
    pub fn with_writer(out: impl Write + Send + 'static, colored: bool) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
            present: true,
            colored,
            enabled: AtomicBool::new(true),
        }
    }

    /// Whether a console exists to write to
    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    fn write_record<W: Write>(&self, out: &mut W, message: &LogMessage) -> io::Result<()> {
        if self.colored {
            queue!(
                out,
                SetForegroundColor(level_color(message.level)),
                Print(&message.header),
                Print(' '),
                Print(&message.msg),
                ResetColor
            )?;
        } else {
            write!(out, "{} {}", message.header, message.msg)?;
        }
        out.flush()
    }
}

impl LogListener for ConsoleSink {
    fn log(&self, message: &LogMessage) {
        if !self.present || !self.is_enabled() {
            return;
        }
        if let Ok(mut out) = self.out.lock() {
            let _ = self.write_record(&mut *out, message);
        }
    }
}

/// Check whether a native debugger is tracing this process
pub fn debugger_present() -> bool {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|status| parse_tracer_pid(&status))
            .is_some_and(|pid| pid != 0)
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_tracer_pid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("TracerPid:"))
        .and_then(|pid| pid.trim().parse().ok())
}

/// Forwards message bodies to an attached debugger's output
///
/// The debugger shows the inferior's stderr, so bodies go there. Without an
/// attached debugger the sink does nothing.
pub struct DebuggerSink {
    out: SharedWriter,
    attached: bool,
}

impl DebuggerSink {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(Box::new(io::stderr())),
            attached: debugger_present(),
        }
    }

    /// Sink on an arbitrary writer, treated as attached
    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
            attached: true,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

impl Default for DebuggerSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogListener for DebuggerSink {
    fn log(&self, message: &LogMessage) {
        if !self.attached {
            return;
        }
        if let Ok(mut out) = self.out.lock() {
            let _ = out.write_all(message.msg.as_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Writer that shares its bytes with the test
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn message(level: LogLevel) -> LogMessage {
        LogMessage {
            level,
            channel: "CPU".to_string(),
            header: "00:00:000 cpu.rs:3 E[CPU]:".to_string(),
            msg: "bad opcode\n".to_string(),
        }
    }

    #[test]
    fn test_plain_console_output() {
        let capture = Capture::default();
        let sink = ConsoleSink::with_writer(capture.clone(), false);
        sink.log(&message(LogLevel::Error));
        assert_eq!(capture.text(), "00:00:000 cpu.rs:3 E[CPU]: bad opcode\n");
    }

    #[test]
    fn test_colored_console_output() {
        let capture = Capture::default();
        let sink = ConsoleSink::with_writer(capture.clone(), true);
        sink.log(&message(LogLevel::Error));

        let text = capture.text();
        assert!(text.starts_with('\u{1b}'));
        assert!(text.contains("00:00:000 cpu.rs:3 E[CPU]: bad opcode\n"));
    }

    #[test]
    fn test_disabled_console_is_silent() {
        let capture = Capture::default();
        let sink = ConsoleSink::with_writer(capture.clone(), false);
        sink.set_enabled(false);
        sink.log(&message(LogLevel::Fatal));
        assert!(capture.text().is_empty());
    }

    #[test]
    fn test_debugger_sink_writes_body_only() {
        let capture = Capture::default();
        let sink = DebuggerSink::with_writer(capture.clone());
        sink.log(&message(LogLevel::Warning));
        assert_eq!(capture.text(), "bad opcode\n");
    }

    #[test]
    fn test_parse_tracer_pid() {
        let status = "Name:\temulog\nState:\tR (running)\nTracerPid:\t4242\nUid:\t0\n";
        assert_eq!(parse_tracer_pid(status), Some(4242));
        assert_eq!(parse_tracer_pid("Name:\temulog\n"), None);
    }

    #[test]
    fn test_level_colors() {
        assert_eq!(level_color(LogLevel::Fatal), Color::DarkRed);
        assert_eq!(level_color(LogLevel::Error), Color::Red);
        assert_eq!(level_color(LogLevel::Warning), Color::Yellow);
        assert_eq!(level_color(LogLevel::Notice), Color::Green);
        assert_eq!(level_color(LogLevel::Info), Color::Reset);
    }

    #[test]
    fn test_level_colors_distinct() {
        let colors: Vec<Color> = LogLevel::ALL.iter().map(|l| level_color(*l)).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
