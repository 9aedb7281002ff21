use thiserror::Error;

/// Error types for the sockguard library
///
/// None of the variants carry the underlying `std::io::Error`. The cause is
/// logged where the failure happens and the caller only learns which
/// operation did not happen.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SocketError {
    /// Port outside `0..=65535`
    #[error("port {0} is out of range (0-65535)")]
    InvalidPort(i32),

    /// Timeout duration that is zero, negative or too large to represent
    #[error("invalid timeout duration: {0}ms")]
    InvalidDuration(i64),

    /// Socket option that is out of range or that the kernel refused
    #[error("invalid socket configuration: {0}")]
    InvalidConfig(&'static str),

    /// Time unit the duration converter does not support
    #[error("unsupported time unit: {0}")]
    InvalidUnit(TimeUnit),

    /// Listening socket could not be bound
    #[error("failed to bind listening socket on port {port}")]
    BindFailed { port: u16 },

    /// Resolution or connection to the remote host failed
    #[error("failed to connect to {host}:{port}")]
    ConnectFailed { host: String, port: u16 },

    /// Accept failed because of an I/O error or a closed listener
    #[error("failed to accept connection")]
    AcceptFailed,

    /// No peer connected before the accept timeout elapsed
    #[error("accept timed out")]
    AcceptTimeout,

    /// No data arrived before the read timeout elapsed
    #[error("read timed out")]
    ReadTimeout,

    /// The peer did not drain data before the write timeout elapsed
    #[error("write timed out")]
    WriteTimeout,

    /// A stream handle could not be obtained from the socket
    #[error("socket stream unavailable")]
    StreamUnavailable,

    /// The socket has already been closed
    #[error("socket is closed")]
    Closed,

    /// The operating system reported a failure while closing
    #[error("failed to close socket")]
    CloseFailed,
}

impl SocketError {
    /// Returns true for the timeout signals of accept, read and write
    ///
    /// # Examples
    ///
    /// ```
    /// use sockguard::SocketError;
    ///
    /// assert!(SocketError::ReadTimeout.is_timeout());
    /// assert!(!SocketError::AcceptFailed.is_timeout());
    /// ```
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            SocketError::AcceptTimeout | SocketError::ReadTimeout | SocketError::WriteTimeout
        )
    }
}

/// Result type for the sockguard library
pub type Result<T> = std::result::Result<T, SocketError>;

pub mod common;
pub mod socket;
pub mod stream;
pub mod time;

// Re-export main types for convenience
pub use socket::{ConnectedSocket, ListeningSocket, Role, ShutdownHandle, SocketConfig};
pub use stream::{InboundStream, OutboundStream};
pub use time::{TimeUnit, UnitDuration, to_milliseconds};
