//! Expiry resolution for remembered parameters.
//!
//! Callers hand in a day count, a relative duration or an absolute point in
//! time. All of them resolve to an absolute [`OffsetDateTime`] that must lie
//! strictly after the moment of resolution.

use crate::errors::UtmError;
use time::{Duration, OffsetDateTime};

const SECONDS_PER_DAY: i64 = 86_400;

/// When remembered cookies should expire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Number of days from now, must be positive
    Days(i64),
    /// Relative duration from now
    In(Duration),
    /// Absolute point in time
    At(OffsetDateTime),
}

impl Expiry {
    /// Resolves against the current wall clock.
    pub fn resolve(&self) -> Result<OffsetDateTime, UtmError> {
        self.resolve_at(OffsetDateTime::now_utc())
    }

    /// Resolves against `now`.
    pub fn resolve_at(&self, now: OffsetDateTime) -> Result<OffsetDateTime, UtmError> {
        let expires = match *self {
            Expiry::Days(days) => {
                if days <= 0 {
                    return Err(UtmError::InvalidExpiry(format!(
                        "day count must be positive, got {days}"
                    )));
                }
                days.checked_mul(SECONDS_PER_DAY)
                    .map(Duration::seconds)
                    .and_then(|offset| now.checked_add(offset))
            }
            Expiry::In(duration) => now.checked_add(duration),
            Expiry::At(at) => Some(at),
        }
        .ok_or_else(|| UtmError::InvalidExpiry("expiry is out of range".to_string()))?;

        if expires <= now {
            return Err(UtmError::InvalidExpiry(
                "expiry may not be in the past, use forget() to clear stored parameters".to_string(),
            ));
        }

        Ok(expires)
    }
}

impl From<i64> for Expiry {
    fn from(days: i64) -> Self {
        Expiry::Days(days)
    }
}

impl From<Duration> for Expiry {
    fn from(duration: Duration) -> Self {
        Expiry::In(duration)
    }
}

impl From<OffsetDateTime> for Expiry {
    fn from(at: OffsetDateTime) -> Self {
        Expiry::At(at)
    }
}
