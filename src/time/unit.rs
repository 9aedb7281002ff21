use std::fmt;

use crate::Result;

/// Unit tag for a [`UnitDuration`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Every unit, smallest first
    pub const ALL: [TimeUnit; 7] = [
        TimeUnit::Nanoseconds,
        TimeUnit::Microseconds,
        TimeUnit::Milliseconds,
        TimeUnit::Seconds,
        TimeUnit::Minutes,
        TimeUnit::Hours,
        TimeUnit::Days,
    ];
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeUnit::Nanoseconds => "nanoseconds",
            TimeUnit::Microseconds => "microseconds",
            TimeUnit::Milliseconds => "milliseconds",
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
        };
        f.write_str(name)
    }
}

/// A signed duration value paired with its unit
///
/// # Examples
///
/// ```
/// use sockguard::time::{TimeUnit, UnitDuration};
///
/// let timeout = UnitDuration::seconds(2);
/// assert_eq!(timeout.to_milliseconds().unwrap(), 2000);
///
/// let odd = UnitDuration::new(1, TimeUnit::Hours);
/// assert!(odd.to_milliseconds().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitDuration {
    pub value: i64,
    pub unit: TimeUnit,
}

impl UnitDuration {
    pub fn new(value: i64, unit: TimeUnit) -> Self {
        Self { value, unit }
    }

    pub fn millis(value: i64) -> Self {
        Self::new(value, TimeUnit::Milliseconds)
    }

    pub fn seconds(value: i64) -> Self {
        Self::new(value, TimeUnit::Seconds)
    }

    /// Routes through [`super::to_milliseconds`]
    pub fn to_milliseconds(&self) -> Result<i64> {
        super::to_milliseconds(self.value, self.unit)
    }
}

impl fmt::Display for UnitDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}
