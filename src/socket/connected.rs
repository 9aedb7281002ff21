use super::config::millis_to_duration;
use super::state::{CloseFlag, SocketState};
use super::{ShutdownHandle, SocketConfig, validate_port};
use crate::stream::{InboundStream, OutboundStream};
use crate::time::UnitDuration;
use crate::{Result, SocketError};
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, error, info};

/// Which side initiated the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Created by [`ConnectedSocket::connect`]
    Client,
    /// Returned by [`super::ListeningSocket::accept`]
    Server,
}

/// One established TCP connection
///
/// Blocking reads and writes go through the stream adapters obtained from
/// [`ConnectedSocket::inbound`] and [`ConnectedSocket::outbound`]. Closing
/// the socket invalidates every adapter derived from it, and closing any
/// adapter closes the socket.
///
/// # Examples
///
/// ```no_run
/// use sockguard::ConnectedSocket;
///
/// let mut socket = ConnectedSocket::connect("localhost", 8080)?;
/// socket.set_timeout(1_000)?;
///
/// let mut outbound = socket.outbound()?;
/// outbound.write("hello")?;
///
/// assert!(socket.close());
/// # Ok::<(), sockguard::SocketError>(())
/// ```
#[derive(Debug)]
pub struct ConnectedSocket {
    state: SocketState<TcpStream>,
    closed: CloseFlag,
    role: Role,
    peer: SocketAddr,
    local: SocketAddr,
    buffer_size: usize,
}

impl ConnectedSocket {
    /// Connects to `host:port` with the default configuration
    ///
    /// `host` may be a hostname or a literal address. Every resolved address
    /// is tried in order.
    pub fn connect(host: &str, port: i32) -> Result<Self> {
        Self::connect_with(host, port, &SocketConfig::default())
    }

    /// Connects to `host:port` using `config`
    pub fn connect_with(host: &str, port: i32, config: &SocketConfig) -> Result<Self> {
        let port = validate_port(port)?;
        config.validate()?;

        let connect_failed = |e: io::Error| {
            error!(host, port, error = %e, "Failed to connect to server");
            SocketError::ConnectFailed {
                host: host.to_string(),
                port,
            }
        };

        let stream = match config.connect_timeout {
            Some(timeout) => connect_timeout(host, port, timeout),
            None => TcpStream::connect((host, port)),
        }
        .map_err(connect_failed)?;

        let socket = Self::from_stream(stream, Role::Client, config).map_err(connect_failed)?;
        info!(host, port, peer = %socket.peer, "Successfully connected to server");
        Ok(socket)
    }

    pub(crate) fn from_accepted(
        stream: TcpStream,
        peer: SocketAddr,
        config: &SocketConfig,
    ) -> Result<Self> {
        // BSD-derived systems hand out accepted sockets with the listener's
        // non-blocking flag
        let prepared = stream.set_nonblocking(false).and_then(|()| {
            Self::from_stream(stream, Role::Server, config)
        });

        prepared.map_err(|e| {
            error!(%peer, error = %e, "Unable to prepare accepted connection");
            SocketError::AcceptFailed
        })
    }

    fn from_stream(stream: TcpStream, role: Role, config: &SocketConfig) -> io::Result<Self> {
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;
        stream.set_nodelay(config.nodelay)?;

        Ok(Self {
            peer: stream.peer_addr()?,
            local: stream.local_addr()?,
            state: SocketState::Open(stream),
            closed: CloseFlag::default(),
            role,
            buffer_size: config.buffer_size,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Remote endpoint recorded when the connection was established
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    pub fn local_port(&self) -> u16 {
        self.local.port()
    }

    /// True once the connection was ended through this socket or anything
    /// derived from it
    pub fn is_closed(&self) -> bool {
        self.stream().is_none()
    }

    /// True while the socket is open and the kernel still knows its peer
    pub fn is_connected(&self) -> bool {
        self.stream().is_some_and(|stream| stream.peer_addr().is_ok())
    }

    /// Read timeout currently set on the socket, queried from the kernel
    pub fn timeout(&self) -> Option<Duration> {
        self.stream().and_then(|stream| stream.read_timeout().ok().flatten())
    }

    fn stream(&self) -> Option<&TcpStream> {
        self.state.get().filter(|_| !self.closed.is_marked())
    }

    /// Sets the read and write timeout in milliseconds
    ///
    /// Non-positive values fail with [`SocketError::InvalidDuration`] and
    /// leave the current timeout untouched. The timeout also applies to
    /// stream adapters opened before the call.
    pub fn set_timeout(&mut self, millis: i64) -> Result<()> {
        if millis <= 0 {
            error!(millis, "Duration cannot be 0 or negative");
            return Err(SocketError::InvalidDuration(millis));
        }
        let stream = self.stream().ok_or_else(|| {
            error!(peer = %self.peer, "Unable to set timeout on a closed socket");
            SocketError::Closed
        })?;

        let timeout = millis_to_duration(millis)?;
        stream
            .set_read_timeout(Some(timeout))
            .and_then(|()| stream.set_write_timeout(Some(timeout)))
            .map_err(|e| {
                error!(peer = %self.peer, error = %e, "Unable to set client socket timeout");
                SocketError::InvalidConfig("socket timeout rejected")
            })?;

        debug!(peer = %self.peer, millis, "Socket timeout set");
        Ok(())
    }

    /// Sets the read and write timeout from a value and unit
    ///
    /// Unsupported units fail with [`SocketError::InvalidUnit`].
    pub fn set_timeout_in(&mut self, duration: UnitDuration) -> Result<()> {
        let millis = duration.to_milliseconds()?;
        self.set_timeout(millis)
    }

    /// Opens the read direction; see [`InboundStream::open`]
    pub fn inbound(&self) -> Result<InboundStream> {
        InboundStream::open(self)
    }

    /// Opens the write direction; see [`OutboundStream::open`]
    pub fn outbound(&self) -> Result<OutboundStream> {
        OutboundStream::open(self)
    }

    /// Duplicates the descriptor for a stream adapter
    pub(crate) fn duplicate(&self) -> Result<TcpStream> {
        let stream = self.stream().ok_or_else(|| {
            error!(peer = %self.peer, "Unable to get stream of a closed socket");
            SocketError::StreamUnavailable
        })?;

        stream.try_clone().map_err(|e| {
            error!(peer = %self.peer, error = %e, "Unable to get socket stream");
            SocketError::StreamUnavailable
        })
    }

    pub(crate) fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub(crate) fn close_flag(&self) -> CloseFlag {
        self.closed.clone()
    }

    /// Handle another thread can use to interrupt blocked reads and writes
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        let duplicate = self.duplicate().map_err(|_| SocketError::Closed)?;
        Ok(ShutdownHandle::for_connection(duplicate, self.close_flag()))
    }

    /// Closes the socket, reporting [`SocketError::CloseFailed`] on failure
    ///
    /// The connection is shut down in both directions first, so adapters
    /// still holding a duplicate descriptor observe end-of-stream.
    pub fn try_close(&mut self) -> Result<()> {
        let was_open = self.state.is_open();
        self.state.release("client socket")?;
        if was_open {
            info!(peer = %self.peer, role = ?self.role, "Client socket has been closed");
        }
        Ok(())
    }

    /// Closes the socket; false only if the operating system reported a failure
    pub fn close(&mut self) -> bool {
        self.try_close().is_ok()
    }
}

/// Tries each resolved address with a bounded connect
fn connect_timeout(host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "host resolved to no addresses")
    }))
}
