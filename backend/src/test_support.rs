//! Shared fixtures for unit tests.

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

/// Clock pinned to a fixed instant so server-assigned timestamps are
/// deterministic under test.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    /// Pin the clock to the given instant.
    pub(crate) const fn pinned(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// The pinned instant.
    pub(crate) const fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        let now = Utc
            .with_ymd_and_hms(2026, 8, 7, 12, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("fixed test instant must be valid"));
        Self::pinned(now)
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.now
    }
}
