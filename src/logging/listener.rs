//! Listener trait implemented by every log sink

use std::sync::Arc;

use super::message::LogMessage;

/// A consumer of formatted log records
///
/// Listeners are called synchronously from the thread that logged, one
/// record at a time, in the same order for every listener.
pub trait LogListener: Send + Sync {
    fn log(&self, message: &LogMessage);
}

/// Compare two listener handles by identity
pub fn same_listener(a: &Arc<dyn LogListener>, b: &Arc<dyn LogListener>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}
