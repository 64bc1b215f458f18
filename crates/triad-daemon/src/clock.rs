//! Engine time source.
//!
//! The engine takes `now` explicitly on every call. The daemon reads it from
//! a [`Clock`]: wall-clock seconds in production, a settable counter in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of engine time in Unix seconds.
#[derive(Debug, Clone, Default)]
pub enum Clock {
    /// System wall clock.
    #[default]
    System,
    /// Manually advanced clock shared between handles.
    Manual(Arc<AtomicU64>),
}

impl Clock {
    /// A manual clock starting at `start`.
    pub fn manual(start: u64) -> Self {
        Clock::Manual(Arc::new(AtomicU64::new(start)))
    }

    /// Current time in seconds.
    pub fn now(&self) -> u64 {
        match self {
            Clock::System => std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            Clock::Manual(secs) => secs.load(Ordering::SeqCst),
        }
    }

    /// Move a manual clock forward. No-op on the system clock.
    pub fn advance(&self, secs: u64) {
        if let Clock::Manual(current) = self {
            current.fetch_add(secs, Ordering::SeqCst);
        }
    }

    /// Set a manual clock. No-op on the system clock.
    pub fn set(&self, secs: u64) {
        if let Clock::Manual(current) = self {
            current.store(secs, Ordering::SeqCst);
        }
    }
}
