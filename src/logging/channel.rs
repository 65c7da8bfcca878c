//! Log channel registry
//!
//! Every subsystem logs into a named channel. Each channel carries its own
//! enabled flag and severity threshold. The table is fixed at construction;
//! settings are mutated only through explicit setters and config load.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::config::ConfigSection;
use crate::error::LogError;

use super::level::LogLevel;

/// Maximum length of a channel short name
pub const MAX_SHORT_NAME: usize = 32;

/// Log categories, one per emulator subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogType {
    System,
    Boot,
    Common,
    Cpu,
    FileSys,
    G3d,
    Hle,
    Jit,
    Loader,
    /// Media Engine
    Me,
    MemMap,
    SasMix,
    SaveState,
    FrameBuf,
    SceAudio,
    SceCtrl,
    SceDisplay,
    SceFont,
    SceGe,
    SceIntc,
    SceIo,
    SceKernel,
    SceModule,
    SceNet,
    SceRtc,
    SceSas,
    SceUtility,
    SceMisc,
}

/// Number of registered channels
pub const NUMBER_OF_LOGS: usize = 28;

/// Channel table in `LogType` declaration order
const LOG_TABLE: [(LogType, &str); NUMBER_OF_LOGS] = [
    (LogType::System, "SYSTEM"),
    (LogType::Boot, "BOOT"),
    (LogType::Common, "COMMON"),
    (LogType::Cpu, "CPU"),
    (LogType::FileSys, "FILESYS"),
    (LogType::G3d, "G3D"),
    (LogType::Hle, "HLE"),
    (LogType::Jit, "JIT"),
    (LogType::Loader, "LOADER"),
    (LogType::Me, "ME"),
    (LogType::MemMap, "MEMMAP"),
    (LogType::SasMix, "SASMIX"),
    (LogType::SaveState, "SAVESTATE"),
    (LogType::FrameBuf, "FRAMEBUF"),
    (LogType::SceAudio, "SCEAUDIO"),
    (LogType::SceCtrl, "SCECTRL"),
    (LogType::SceDisplay, "SCEDISP"),
    (LogType::SceFont, "SCEFONT"),
    (LogType::SceGe, "SCESCEGE"),
    (LogType::SceIntc, "SCEINTC"),
    (LogType::SceIo, "SCEIO"),
    (LogType::SceKernel, "SCEKERNEL"),
    (LogType::SceModule, "SCEMODULE"),
    (LogType::SceNet, "SCENET"),
    (LogType::SceRtc, "SCERTC"),
    (LogType::SceSas, "SCESAS"),
    (LogType::SceUtility, "SCEUTIL"),
    (LogType::SceMisc, "SCEMISC"),
];

impl LogType {
    /// Index of this channel in the registry
    pub fn index(self) -> usize {
        self as usize
    }

    /// All channel types in table order
    pub fn all() -> impl Iterator<Item = LogType> {
        LOG_TABLE.iter().map(|(t, _)| *t)
    }
}

/// A single logging category
#[derive(Debug)]
pub struct LogChannel {
    short_name: String,
    enabled: AtomicBool,
    level: AtomicU8,
}

impl LogChannel {
    fn new(name: &str, level: LogLevel) -> Self {
        Self {
            short_name: name.chars().take(MAX_SHORT_NAME).collect(),
            enabled: AtomicBool::new(true),
            level: AtomicU8::new(level.ordinal()),
        }
    }

    /// Short name used in headers and config keys
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Current severity threshold
    pub fn level(&self) -> LogLevel {
        LogLevel::from_ordinal(i64::from(self.level.load(Ordering::Relaxed)))
            .unwrap_or(LogLevel::Verbose)
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level.ordinal(), Ordering::Relaxed);
    }

    /// Whether a message at `level` would be delivered
    pub fn accepts(&self, level: LogLevel) -> bool {
        self.is_enabled() && level.passes(self.level())
    }

    fn enabled_key(&self) -> String {
        format!("{}Enabled", self.short_name)
    }

    fn level_key(&self) -> String {
        format!("{}Level", self.short_name)
    }
}

/// Fixed table of channels indexed by [`LogType`]
///
/// Settings use relaxed atomics: a setter racing an in-flight `log` call can
/// at most cause one stale filtering decision.
#[derive(Debug)]
pub struct ChannelRegistry {
    channels: Vec<LogChannel>,
}

impl ChannelRegistry {
    /// Build the registry with every channel enabled at `level`
    ///
    /// # Panics
    ///
    /// Panics if the channel table is out of order with respect to
    /// [`LogType`]. That is a build-time mismatch, not a runtime condition.
    pub fn new(level: LogLevel) -> Self {
        Self::from_table(&LOG_TABLE, level)
    }

    fn from_table(table: &[(LogType, &str)], level: LogLevel) -> Self {
        let channels = table
            .iter()
            .enumerate()
            .map(|(i, (log_type, name))| {
                assert_eq!(
                    i,
                    log_type.index(),
                    "bad log table at {}: {:?} is registered out of order",
                    i,
                    log_type
                );
                LogChannel::new(name, level)
            })
            .collect();
        Self { channels }
    }

    /// Get a channel by type
    pub fn get(&self, log_type: LogType) -> &LogChannel {
        &self.channels[log_type.index()]
    }

    /// Find a channel type by its short name (case-insensitive)
    pub fn find(&self, name: &str) -> Option<LogType> {
        LogType::all().find(|t| self.get(*t).short_name().eq_ignore_ascii_case(name))
    }

    /// Iterate over all channels in table order
    pub fn iter(&self) -> impl Iterator<Item = (LogType, &LogChannel)> {
        LogType::all().map(move |t| (t, self.get(t)))
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn set_all_levels(&self, level: LogLevel) {
        for channel in &self.channels {
            channel.set_level(level);
        }
    }

    pub fn set_all_enabled(&self, enabled: bool) {
        for channel in &self.channels {
            channel.set_enabled(enabled);
        }
    }

    /// Write every channel's settings into `section`
    pub fn save_config(&self, section: &mut ConfigSection) {
        for channel in &self.channels {
            section.set_bool(&channel.enabled_key(), channel.is_enabled());
            section.set_int(&channel.level_key(), i64::from(channel.level().ordinal()));
        }
    }

    /// Restore every channel's settings from `section`
    ///
    /// Missing or malformed keys fall back to enabled, with a verbose
    /// threshold when `debug_defaults` is set and errors-only otherwise.
    pub fn load_config(&self, section: &ConfigSection, debug_defaults: bool) {
        let default_level = LogLevel::default_threshold(debug_defaults);
        for channel in &self.channels {
            let enabled = section.get_bool(&channel.enabled_key(), true);
            let key = channel.level_key();
            let raw = section.get_int(&key, i64::from(default_level.ordinal()));
            let level = LogLevel::from_ordinal(raw).unwrap_or_else(|| {
                let e = LogError::InvalidSetting { key: key.clone() };
                tracing::warn!("{} ({}), using {}", e, raw, default_level);
                default_level
            });
            channel.set_enabled(enabled);
            channel.set_level(level);
        }
    }
}
