use crate::{Result, SocketError};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Options applied when a socket is created
///
/// Every timeout defaults to `None`, which leaves the corresponding call
/// blocking until it completes.
///
/// # Examples
///
/// ```
/// use sockguard::SocketConfig;
/// use std::time::Duration;
///
/// let config = SocketConfig::new()
///     .with_accept_timeout(Duration::from_secs(5))
///     .with_read_timeout(Duration::from_secs(30))
///     .with_buffer_size(4096);
///
/// assert_eq!(config.accept_timeout, Some(Duration::from_secs(5)));
/// assert_eq!(config.buffer_size, 4096);
/// assert!(config.write_timeout.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketConfig {
    /// Local address listening sockets bind to
    pub bind_ip: IpAddr,
    /// Timeout for `accept` on listening sockets
    pub accept_timeout: Option<Duration>,
    /// Timeout for each blocking read on connected sockets
    pub read_timeout: Option<Duration>,
    /// Timeout for each blocking write on connected sockets
    pub write_timeout: Option<Duration>,
    /// Timeout for establishing an outbound connection, per resolved address
    pub connect_timeout: Option<Duration>,
    /// Disable Nagle's algorithm on connected sockets
    pub nodelay: bool,
    /// Chunk size used when draining an inbound stream
    pub buffer_size: usize,
}

impl SocketConfig {
    pub fn new() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            accept_timeout: None,
            read_timeout: None,
            write_timeout: None,
            connect_timeout: None,
            nodelay: false,
            buffer_size: 1024,
        }
    }

    /// Set the local bind address
    pub fn with_bind_ip(mut self, ip: IpAddr) -> Self {
        self.bind_ip = ip;
        self
    }

    /// Set the accept timeout
    pub fn with_accept_timeout(mut self, timeout: Duration) -> Self {
        self.accept_timeout = Some(timeout);
        self
    }

    /// Set the read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Set the write timeout
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set TCP_NODELAY on connected sockets
    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }

    /// Set the read chunk size
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Rejects zero timeouts and a zero buffer size before any socket exists
    pub(crate) fn validate(&self) -> Result<()> {
        let timeouts = [
            self.accept_timeout,
            self.read_timeout,
            self.write_timeout,
            self.connect_timeout,
        ];
        if timeouts.iter().flatten().any(Duration::is_zero) {
            return Err(SocketError::InvalidDuration(0));
        }
        if self.buffer_size == 0 {
            return Err(SocketError::InvalidConfig("buffer size must be positive"));
        }
        Ok(())
    }
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a millisecond count already checked to be positive
pub(crate) fn millis_to_duration(millis: i64) -> Result<Duration> {
    u64::try_from(millis)
        .ok()
        .filter(|&ms| ms > 0)
        .map(Duration::from_millis)
        .ok_or(SocketError::InvalidDuration(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = SocketConfig::default();
        assert_eq!(config.bind_ip, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.buffer_size, 1024);
        assert!(config.accept_timeout.is_none());
        assert!(config.read_timeout.is_none());
        assert!(config.write_timeout.is_none());
        assert!(config.connect_timeout.is_none());
        assert!(!config.nodelay);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = SocketConfig::new()
            .with_bind_ip(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .with_write_timeout(Duration::from_millis(250))
            .with_connect_timeout(Duration::from_secs(2))
            .with_nodelay(true);

        assert_eq!(config.bind_ip, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.write_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(2)));
        assert!(config.nodelay);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = SocketConfig::new().with_read_timeout(Duration::ZERO);
        assert_eq!(config.validate(), Err(SocketError::InvalidDuration(0)));

    }

    #[test]
    fn test_zero_buffer_size_rejected() {
        let config = SocketConfig::new().with_buffer_size(0);
        assert!(matches!(config.validate(), Err(SocketError::InvalidConfig(_))));
        assert!(SocketConfig::new().with_buffer_size(1).validate().is_ok());
    }

    #[test]
    fn test_millis_to_duration() {
        assert_eq!(millis_to_duration(1500), Ok(Duration::from_millis(1500)));
        assert_eq!(millis_to_duration(0), Err(SocketError::InvalidDuration(0)));
        assert_eq!(millis_to_duration(-3), Err(SocketError::InvalidDuration(-3)));
    }
}
