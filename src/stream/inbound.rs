use super::is_timeout;
use crate::socket::ConnectedSocket;
use crate::socket::state::{CloseFlag, SocketState};
use crate::{Result, SocketError};
use bytes::{Bytes, BytesMut};
use std::io::{self, Read};
use std::net::{SocketAddr, TcpStream};
use tracing::{debug, error, warn};

/// Read direction of a [`ConnectedSocket`]
///
/// Holds a duplicated descriptor. Once the parent socket is closed every
/// read returns an empty buffer.
///
/// # Examples
///
/// ```no_run
/// use sockguard::ConnectedSocket;
///
/// let socket = ConnectedSocket::connect("localhost", 8080)?;
/// let mut inbound = socket.inbound()?;
///
/// match inbound.read_all() {
///     Ok(data) => println!("received {} bytes", data.len()),
///     Err(e) if e.is_timeout() => println!("nothing arrived in time"),
///     Err(e) => return Err(e),
/// }
/// # Ok::<(), sockguard::SocketError>(())
/// ```
#[derive(Debug)]
pub struct InboundStream {
    state: SocketState<TcpStream>,
    parent: CloseFlag,
    peer: SocketAddr,
    buffer_size: usize,
}

impl InboundStream {
    /// Obtains the read direction of `socket`
    ///
    /// Fails with [`SocketError::StreamUnavailable`] when the socket is
    /// closed. Nothing is read.
    pub fn open(socket: &ConnectedSocket) -> Result<Self> {
        let stream = socket.duplicate()?;
        Ok(Self {
            state: SocketState::Open(stream),
            parent: socket.close_flag(),
            peer: socket.peer_addr(),
            buffer_size: socket.buffer_size(),
        })
    }

    pub fn is_closed(&self) -> bool {
        !self.state.is_open()
    }

    /// Reads until the peer closes its side of the connection
    ///
    /// Returns [`SocketError::ReadTimeout`] if a single read waits longer
    /// than the socket timeout; whatever arrived before that is discarded.
    /// Any other failure, including a closed stream, yields an empty buffer,
    /// which is indistinguishable from a peer that closed without sending.
    pub fn read_all(&mut self) -> Result<Bytes> {
        let Some(mut stream) = self.state.get() else {
            warn!(peer = %self.peer, "Read attempted on a closed input stream");
            return Ok(Bytes::new());
        };

        let mut data = BytesMut::new();
        let mut chunk = vec![0u8; self.buffer_size];

        loop {
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => data.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(&e) => {
                    warn!(peer = %self.peer, buffered = data.len(), "Read timed out");
                    return Err(SocketError::ReadTimeout);
                }
                Err(e) => {
                    error!(peer = %self.peer, error = %e, "Unable to read from client socket input stream");
                    return Ok(Bytes::new());
                }
            }
        }

        debug!(peer = %self.peer, size = data.len(), "Read until end of stream");
        Ok(data.freeze())
    }

    /// Closes the stream, reporting [`SocketError::CloseFailed`] on failure
    ///
    /// Like closing a socket stream, this ends the whole connection: the peer
    /// sees end-of-stream and the parent socket reports itself closed.
    pub fn try_close(&mut self) -> Result<()> {
        if self.state.is_open() {
            self.parent.mark();
        }
        self.state.release("input stream")
    }

    /// Closes the stream; false only if the operating system reported a failure
    pub fn close(&mut self) -> bool {
        self.try_close().is_ok()
    }
}
