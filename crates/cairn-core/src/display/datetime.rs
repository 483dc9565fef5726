//! Timestamp formatting in the system time zone.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

/// Formats a timestamp as `YYYY-MM-DD HH:MM TZ` in the system time zone.
#[derive(Debug, Clone, Copy)]
pub struct LocalDateTime(pub Timestamp);

impl fmt::Display for LocalDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let zoned = self.0.to_zoned(TimeZone::system());
        write!(f, "{}", zoned.strftime("%Y-%m-%d %H:%M %Z"))
    }
}

/// Formats an optional slot as `start → end`, omitting missing halves.
pub(crate) struct Slot(pub Option<Timestamp>, pub Option<Timestamp>);

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.0, self.1) {
            (Some(start), Some(end)) => {
                write!(f, "{} → {}", LocalDateTime(start), LocalDateTime(end))
            }
            (Some(start), None) => write!(f, "from {}", LocalDateTime(start)),
            (None, Some(end)) => write!(f, "until {}", LocalDateTime(end)),
            (None, None) => Ok(()),
        }
    }
}
