//! Process-wide default command timeout.
//!
//! The default is plain global state: set it once at startup. Every session reads it at
//! execution time, and concurrent writers race with last-writer-wins semantics.

use std::sync::RwLock;

static GLOBAL_TIMEOUT: RwLock<Option<u32>> = RwLock::new(None);

/// Set the default command timeout, in seconds, for every session without an override.
pub fn set_global_timeout(seconds: u32) {
    store(Some(seconds));
}

/// Remove the default so commands fall back to the driver's own behavior.
pub fn clear_global_timeout() {
    store(None);
}

/// Current process-wide default, if any.
#[must_use]
pub fn global_timeout() -> Option<u32> {
    match GLOBAL_TIMEOUT.read() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Session override, else the process-wide default, else none.
pub(crate) fn effective_timeout(session_override: Option<u32>) -> Option<u32> {
    session_override.or_else(global_timeout)
}

fn store(value: Option<u32>) {
    let mut guard = match GLOBAL_TIMEOUT.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = value;
}
