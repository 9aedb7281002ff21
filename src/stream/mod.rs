//! Byte-level read and write views over a connected socket
//!
//! [`InboundStream`] drains the read direction and [`OutboundStream`]
//! writes UTF-8 text. Timeouts reach the caller as
//! [`crate::SocketError::ReadTimeout`] / [`crate::SocketError::WriteTimeout`];
//! every other I/O failure degrades to "no data" or "zero bytes written".

pub mod inbound;
pub mod outbound;
#[cfg(test)]
mod tests;

pub use inbound::InboundStream;
pub use outbound::OutboundStream;

use std::io;

/// SO_RCVTIMEO/SO_SNDTIMEO expiry surfaces as EAGAIN on Unix
pub(crate) fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
