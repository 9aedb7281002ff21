use super::is_timeout;
use crate::socket::ConnectedSocket;
use crate::socket::state::{CloseFlag, SocketState};
use crate::{Result, SocketError};
use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use tracing::{debug, error, warn};

/// Write direction of a [`ConnectedSocket`]
///
/// Holds a duplicated descriptor. Once the parent socket is closed every
/// write reports zero bytes.
///
/// # Examples
///
/// ```no_run
/// use sockguard::ConnectedSocket;
///
/// let socket = ConnectedSocket::connect("localhost", 8080)?;
/// let mut outbound = socket.outbound()?;
///
/// assert_eq!(outbound.write("   ")?, 0);
/// assert_eq!(outbound.write("héllo")?, 6);
/// assert!(outbound.close());
/// # Ok::<(), sockguard::SocketError>(())
/// ```
#[derive(Debug)]
pub struct OutboundStream {
    state: SocketState<TcpStream>,
    parent: CloseFlag,
    peer: SocketAddr,
}

impl OutboundStream {
    /// Obtains the write direction of `socket`
    ///
    /// Fails with [`SocketError::StreamUnavailable`] when the socket is
    /// closed.
    pub fn open(socket: &ConnectedSocket) -> Result<Self> {
        let stream = socket.duplicate()?;
        Ok(Self {
            state: SocketState::Open(stream),
            parent: socket.close_flag(),
            peer: socket.peer_addr(),
        })
    }

    pub fn is_closed(&self) -> bool {
        !self.state.is_open()
    }

    /// Writes `text` as UTF-8 and returns the number of bytes written
    ///
    /// Empty or whitespace-only text transmits nothing and returns `0`.
    /// See [`OutboundStream::write_bytes`] for the failure contract.
    pub fn write(&mut self, text: &str) -> Result<usize> {
        if text.trim().is_empty() {
            debug!(peer = %self.peer, "Skipping blank write");
            return Ok(0);
        }
        self.write_bytes(text.as_bytes())
    }

    /// Writes all of `data` in one operation
    ///
    /// Returns [`SocketError::WriteTimeout`] if the peer stops draining for
    /// longer than the socket timeout. Any other failure, including a closed
    /// stream, is logged and reported as `0` bytes written.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }

        let Some(mut stream) = self.state.get() else {
            warn!(peer = %self.peer, "Write attempted on a closed output stream");
            return Ok(0);
        };

        match stream.write_all(data).and_then(|()| stream.flush()) {
            Ok(()) => {
                debug!(peer = %self.peer, size = data.len(), "Wrote data");
                Ok(data.len())
            }
            Err(e) if is_timeout(&e) => {
                warn!(peer = %self.peer, "Write timed out");
                Err(SocketError::WriteTimeout)
            }
            Err(e) => {
                error!(peer = %self.peer, error = %e, "Unable to write to client socket output stream");
                Ok(0)
            }
        }
    }

    /// Closes the stream, reporting [`SocketError::CloseFailed`] on failure
    ///
    /// Like closing a socket stream, this ends the whole connection: the peer
    /// sees end-of-stream once it has read everything written so far, and the
    /// parent socket reports itself closed.
    pub fn try_close(&mut self) -> Result<()> {
        if self.state.is_open() {
            self.parent.mark();
        }
        self.state.release("output stream")
    }

    /// Closes the stream; false only if the operating system reported a failure
    pub fn close(&mut self) -> bool {
        self.try_close().is_ok()
    }
}
