//! emulog - channel-based logging core for an emulator front-end
//!
//! This library provides the log manager, its listeners and the configuration
//! the application shell uses to set them up.

pub mod config;
pub mod error;
pub mod logging;
