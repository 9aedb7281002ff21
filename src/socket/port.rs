use crate::{Result, SocketError};
use tracing::error;

/// Checks that `port` fits in `0..=65535`
///
/// Port `0` is accepted and asks the operating system for a free port.
///
/// # Examples
///
/// ```
/// use sockguard::socket::validate_port;
///
/// assert_eq!(validate_port(8080).unwrap(), 8080);
/// assert!(validate_port(65536).is_err());
/// assert!(validate_port(-1).is_err());
/// ```
pub fn validate_port(port: i32) -> Result<u16> {
    u16::try_from(port).map_err(|_| {
        error!(port, "Cannot create socket as port is out of bounds");
        SocketError::InvalidPort(port)
    })
}
