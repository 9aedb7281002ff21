//! Duration conversion for socket timeouts
//!
//! Timeouts are configured in milliseconds. This module converts a signed
//! value paired with a [`TimeUnit`] into that representation.

pub mod unit;

pub use unit::{TimeUnit, UnitDuration};

use crate::{Result, SocketError};
use tracing::error;

/// Converts `value` expressed in `unit` into milliseconds
///
/// Values of zero or below normalize to `0` without looking at the unit.
/// Only milliseconds and seconds are supported; any other unit fails with
/// [`SocketError::InvalidUnit`].
///
/// # Examples
///
/// ```
/// use sockguard::time::{to_milliseconds, TimeUnit};
///
/// assert_eq!(to_milliseconds(3, TimeUnit::Seconds).unwrap(), 3000);
/// assert_eq!(to_milliseconds(250, TimeUnit::Milliseconds).unwrap(), 250);
/// assert_eq!(to_milliseconds(-5, TimeUnit::Minutes).unwrap(), 0);
/// assert!(to_milliseconds(1, TimeUnit::Minutes).is_err());
/// ```
pub fn to_milliseconds(value: i64, unit: TimeUnit) -> Result<i64> {
    if value <= 0 {
        return Ok(0);
    }

    match unit {
        TimeUnit::Milliseconds => Ok(value),
        TimeUnit::Seconds => value.checked_mul(1000).ok_or_else(|| {
            error!(value, "Duration in seconds overflows milliseconds");
            SocketError::InvalidDuration(value)
        }),
        other => {
            error!(unit = %other, "Invalid unit conversion for timeout duration");
            Err(SocketError::InvalidUnit(other))
        }
    }
}
