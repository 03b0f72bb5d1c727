//! Wall-clock capability used to timestamp messages.
//!
//! Controllers never call `Utc::now()` directly; they ask an injected
//! [`Clock`], so tests can pin or step time deterministically.

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Source of message creation timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Shared clock handle, as stored by the controllers.
pub type SharedClock = Arc<dyn Clock>;
