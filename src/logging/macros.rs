//! Call-site logging macros
//!
//! Each macro captures `file!()` and `line!()` and checks
//! `LogManager::is_enabled` before evaluating its format arguments, so a
//! filtered message costs no formatting work.
//!
//! ```rust,ignore
//! error_log!(manager, LogType::SceIo, "open failed: {}", path.display());
//! ```

#[macro_export]
macro_rules! emu_log {
    ($manager:expr, $level:expr, $log_type:expr, $($arg:tt)+) => {{
        let __manager = &$manager;
        let __level = $level;
        let __log_type = $log_type;
        if __manager.is_enabled(__level, __log_type) {
            __manager.log(
                __level,
                __log_type,
                $crate::logging::SourceLocation::new(file!(), line!()),
                format_args!($($arg)+),
            );
        }
    }};
}

#[macro_export]
macro_rules! fatal_log {
    ($manager:expr, $log_type:expr, $($arg:tt)+) => {
        $crate::emu_log!($manager, $crate::logging::LogLevel::Fatal, $log_type, $($arg)+)
    };
}

#[macro_export]
macro_rules! error_log {
    ($manager:expr, $log_type:expr, $($arg:tt)+) => {
        $crate::emu_log!($manager, $crate::logging::LogLevel::Error, $log_type, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn_log {
    ($manager:expr, $log_type:expr, $($arg:tt)+) => {
        $crate::emu_log!($manager, $crate::logging::LogLevel::Warning, $log_type, $($arg)+)
    };
}

#[macro_export]
macro_rules! notice_log {
    ($manager:expr, $log_type:expr, $($arg:tt)+) => {
        $crate::emu_log!($manager, $crate::logging::LogLevel::Notice, $log_type, $($arg)+)
    };
}

#[macro_export]
macro_rules! info_log {
    ($manager:expr, $log_type:expr, $($arg:tt)+) => {
        $crate::emu_log!($manager, $crate::logging::LogLevel::Info, $log_type, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug_log {
    ($manager:expr, $log_type:expr, $($arg:tt)+) => {
        $crate::emu_log!($manager, $crate::logging::LogLevel::Debug, $log_type, $($arg)+)
    };
}

#[macro_export]
macro_rules! verbose_log {
    ($manager:expr, $log_type:expr, $($arg:tt)+) => {
        $crate::emu_log!($manager, $crate::logging::LogLevel::Verbose, $log_type, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fmt;
    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::config::LogConfig;
    use crate::logging::{LogLevel, LogManager, LogType};

    /// Counts how often it gets formatted
    struct Probe<'a>(&'a Cell<usize>);

    impl fmt::Display for Probe<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0.set(self.0.get() + 1);
            f.write_str("probe")
        }
    }

    fn manager() -> Arc<LogManager> {
        Arc::new(LogManager::new(&LogConfig {
            log_file: PathBuf::new(),
            console: false,
            ..LogConfig::default()
        }))
    }

    #[test]
    fn test_macros_record_location() {
        let manager = manager();
        manager.set_level(LogType::Boot, LogLevel::Verbose);

        error_log!(manager, LogType::Boot, "code {}", 7);
        let line = line!() - 1;

        let ring = manager.ring_buffer();
        assert_eq!(ring.text_at(0).as_deref(), Some("code 7\n"));
        let header = &ring.entries()[0].header;
        assert!(header.contains(&format!("macros.rs:{}", line)));
        assert!(header.contains("E[BOOT]"));
    }

    #[test]
    fn test_each_level_macro() {
        let manager = manager();
        manager.set_level(LogType::Me, LogLevel::Verbose);

        fatal_log!(manager, LogType::Me, "f");
        error_log!(manager, LogType::Me, "e");
        warn_log!(manager, LogType::Me, "w");
        notice_log!(manager, LogType::Me, "n");
        info_log!(manager, LogType::Me, "i");
        debug_log!(manager, LogType::Me, "d");
        verbose_log!(manager, LogType::Me, "v");

        let levels: Vec<LogLevel> = manager
            .ring_buffer()
            .entries()
            .into_iter()
            .map(|m| m.level)
            .collect();
        assert_eq!(levels, LogLevel::ALL.to_vec());
    }

    #[test]
    fn test_filtered_message_is_not_formatted() {
        let manager = manager();
        manager.set_level(LogType::Jit, LogLevel::Error);
        let formatted = Cell::new(0);

        debug_log!(manager, LogType::Jit, "{}", Probe(&formatted));
        assert_eq!(formatted.get(), 0);

        error_log!(manager, LogType::Jit, "{}", Probe(&formatted));
        assert_eq!(formatted.get(), 1);
    }
}
