//! Message severities
//!
//! Lower ordinal means more important. A message passes a channel filter when
//! its ordinal is less than or equal to the channel threshold.

/// Glyphs indexed by severity ordinal. Slot 0 is the fallback.
const LEVEL_GLYPHS: [char; 8] = ['-', 'F', 'E', 'W', 'N', 'I', 'D', 'V'];

/// Severity of a log message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    Fatal = 1,
    Error = 2,
    Warning = 3,
    /// System notices (startup banners, state changes)
    Notice = 4,
    Info = 5,
    Debug = 6,
    Verbose = 7,
}

impl LogLevel {
    /// All severities, most critical first
    pub const ALL: [LogLevel; 7] = [
        LogLevel::Fatal,
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Notice,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Verbose,
    ];

    /// Numeric ordinal persisted in configuration
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Convert a persisted ordinal back into a level
    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|l| i64::from(l.ordinal()) == ordinal)
    }

    /// Single character used in record headers
    pub fn glyph(self) -> char {
        glyph_for_ordinal(i64::from(self.ordinal()))
    }

    /// Get the display name for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Fatal => "FATAL",
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Notice => "NOTICE",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Verbose => "VERBOSE",
        }
    }

    /// Whether a message at this level passes a channel with `threshold`
    pub fn passes(self, threshold: LogLevel) -> bool {
        self.ordinal() <= threshold.ordinal()
    }

    /// Threshold applied to channels that have no stored setting
    pub fn default_threshold(debug_defaults: bool) -> Self {
        if debug_defaults {
            LogLevel::Verbose
        } else {
            LogLevel::Error
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Glyph for a raw ordinal; anything unknown maps to `-`
pub fn glyph_for_ordinal(ordinal: i64) -> char {
    usize::try_from(ordinal)
        .ok()
        .and_then(|i| LEVEL_GLYPHS.get(i).copied())
        .unwrap_or(LEVEL_GLYPHS[0])
}
