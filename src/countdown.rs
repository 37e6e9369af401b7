use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{DaziError, Result};

pub const MAX_HOURS: u32 = 99;
const MAX_TOTAL_SECS: u64 = MAX_HOURS as u64 * 3600 + 59 * 60 + 59;

/// Countdown configuration as entered in the timer dialog or stored in the
/// preferences file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    pub enabled: bool,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Countdown {
    /// Builds a normalized countdown: seconds and minutes carry upward and the
    /// total is capped at 99:59:59.
    pub fn new(enabled: bool, hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            enabled,
            hours,
            minutes,
            seconds,
        }
        .normalized()
    }

    pub fn from_secs(enabled: bool, total: u64) -> Self {
        let total = total.min(MAX_TOTAL_SECS);
        Self {
            enabled,
            hours: (total / 3600) as u32,
            minutes: ((total % 3600) / 60) as u32,
            seconds: (total % 60) as u32,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn normalized(self) -> Self {
        Self::from_secs(self.enabled, self.raw_total_secs())
    }

    fn raw_total_secs(&self) -> u64 {
        self.hours as u64 * 3600 + self.minutes as u64 * 60 + self.seconds as u64
    }

    pub fn total_secs(&self) -> u64 {
        self.raw_total_secs().min(MAX_TOTAL_SECS)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.total_secs())
    }

    /// A countdown only drives a session when it is switched on and has time
    /// on the clock.
    pub fn is_active(&self) -> bool {
        self.enabled && self.total_secs() > 0
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

/// Parses `H:M:S`, `M:S` or a bare number of seconds. The parsed countdown is
/// enabled and normalized.
impl FromStr for Countdown {
    type Err = DaziError;

    fn from_str(s: &str) -> Result<Self> {
        let parts = s
            .trim()
            .split(':')
            .map(|p| p.trim().parse::<u32>())
            .collect::<std::result::Result<Vec<u32>, _>>()
            .map_err(|_| DaziError::invalid_timer(s))?;

        match parts.as_slice() {
            [secs] => Ok(Self::new(true, 0, 0, *secs)),
            [mins, secs] => Ok(Self::new(true, 0, *mins, *secs)),
            [hours, mins, secs] => Ok(Self::new(true, *hours, *mins, *secs)),
            _ => Err(DaziError::invalid_timer(s)),
        }
    }
}
