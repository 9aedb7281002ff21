use super::config::millis_to_duration;
use super::state::{CloseFlag, SocketState};
use super::{ConnectedSocket, ShutdownHandle, SocketConfig, sys, validate_port};
use crate::time::UnitDuration;
use crate::{Result, SocketError};
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::os::unix::io::AsRawFd;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// A bound, listening TCP socket
///
/// Produces [`ConnectedSocket`]s through [`ListeningSocket::accept`]. The
/// socket is owned by whoever created it; another thread can only interrupt
/// it through a [`ShutdownHandle`].
///
/// # Examples
///
/// ```no_run
/// use sockguard::{ConnectedSocket, ListeningSocket};
///
/// let mut listener = ListeningSocket::bind(9090)?;
/// listener.set_timeout(5_000)?;
///
/// let client = ConnectedSocket::connect("localhost", 9090)?;
/// let server_side = listener.accept()?;
/// assert_eq!(server_side.local_port(), 9090);
///
/// assert!(listener.close());
/// # Ok::<(), sockguard::SocketError>(())
/// ```
#[derive(Debug)]
pub struct ListeningSocket {
    state: SocketState<TcpListener>,
    closed: CloseFlag,
    port: u16,
    accept_timeout: Option<Duration>,
    config: SocketConfig,
}

impl ListeningSocket {
    /// Binds and listens on `port` with the default configuration
    ///
    /// Port `0` lets the operating system pick a free port; read it back
    /// with [`ListeningSocket::local_port`].
    pub fn bind(port: i32) -> Result<Self> {
        Self::bind_with(port, &SocketConfig::default())
    }

    /// Binds and listens on `port` using `config`
    ///
    /// `config.accept_timeout` applies to [`ListeningSocket::accept`]; the
    /// remaining options are handed to every accepted connection.
    pub fn bind_with(port: i32, config: &SocketConfig) -> Result<Self> {
        let port = validate_port(port)?;
        config.validate()?;

        let addr = SocketAddr::new(config.bind_ip, port);
        let bind_failed = |e: io::Error| {
            error!(%addr, error = %e, "Unable to create server socket");
            SocketError::BindFailed { port }
        };

        let listener = TcpListener::bind(addr).map_err(bind_failed)?;
        // accept waits in poll, so the descriptor itself never blocks
        listener.set_nonblocking(true).map_err(bind_failed)?;
        let local_port = listener.local_addr().map_err(bind_failed)?.port();

        info!(address = %addr, port = local_port, "Server socket listening");

        Ok(Self {
            state: SocketState::Open(listener),
            closed: CloseFlag::default(),
            port: local_port,
            accept_timeout: config.accept_timeout,
            config: config.clone(),
        })
    }

    /// Port the socket is bound to, resolved when port `0` was requested
    pub fn local_port(&self) -> u16 {
        self.port
    }

    /// Full local address, or `None` once closed
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener().and_then(|l| l.local_addr().ok())
    }

    /// True after [`ListeningSocket::close`] or a [`ShutdownHandle`] shutdown
    pub fn is_closed(&self) -> bool {
        self.listener().is_none()
    }

    fn listener(&self) -> Option<&TcpListener> {
        self.state.get().filter(|_| !self.closed.is_marked())
    }

    /// Currently configured accept timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.accept_timeout
    }

    /// Blocks until a peer connects
    ///
    /// Fails with [`SocketError::AcceptTimeout`] when the configured timeout
    /// elapses, and with [`SocketError::AcceptFailed`] when the socket is
    /// closed, shut down from another thread, or reports an I/O error.
    pub fn accept(&self) -> Result<ConnectedSocket> {
        let listener = self.listener().ok_or_else(|| {
            warn!(port = self.port, "Cannot accept on a closed server socket");
            SocketError::AcceptFailed
        })?;

        let deadline = self.accept_timeout.map(|t| Instant::now() + t);

        loop {
            let remaining = match deadline {
                Some(deadline) => match deadline.checked_duration_since(Instant::now()) {
                    Some(left) if !left.is_zero() => Some(left),
                    _ => return Err(self.accept_timed_out()),
                },
                None => None,
            };

            let ready = sys::wait_readable(listener.as_raw_fd(), remaining).map_err(|e| {
                warn!(port = self.port, error = %e, "Unable to wait for a client connection");
                SocketError::AcceptFailed
            })?;
            if !ready {
                return Err(self.accept_timed_out());
            }

            match listener.accept() {
                Ok((stream, addr)) => {
                    info!(%addr, port = self.port, "Client connected");
                    return ConnectedSocket::from_accepted(stream, addr, &self.config);
                }
                // Connection vanished between poll and accept
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                    ) =>
                {
                    continue;
                }
                Err(_) if self.closed.is_marked() => {
                    info!(port = self.port, "Server socket shut down while accepting");
                    return Err(SocketError::AcceptFailed);
                }
                Err(e) => {
                    warn!(port = self.port, error = %e, "Unable to make a connection to the client");
                    return Err(SocketError::AcceptFailed);
                }
            }
        }
    }

    fn accept_timed_out(&self) -> SocketError {
        warn!(
            port = self.port,
            timeout = ?self.accept_timeout,
            "Timed out waiting for a client connection"
        );
        SocketError::AcceptTimeout
    }

    /// Sets the accept timeout in milliseconds
    ///
    /// Non-positive values fail with [`SocketError::InvalidDuration`] and
    /// leave the current timeout untouched.
    pub fn set_timeout(&mut self, millis: i64) -> Result<()> {
        if millis <= 0 {
            error!(millis, "Duration cannot be 0 or negative");
            return Err(SocketError::InvalidDuration(millis));
        }
        if self.is_closed() {
            error!(port = self.port, "Unable to set timeout on a closed server socket");
            return Err(SocketError::Closed);
        }

        self.accept_timeout = Some(millis_to_duration(millis)?);
        Ok(())
    }

    /// Sets the accept timeout from a value and unit
    ///
    /// Unsupported units fail with [`SocketError::InvalidUnit`].
    pub fn set_timeout_in(&mut self, duration: UnitDuration) -> Result<()> {
        let millis = duration.to_milliseconds()?;
        self.set_timeout(millis)
    }

    /// Handle another thread can use to interrupt a blocked accept
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        let listener = self.listener().ok_or(SocketError::Closed)?;
        let duplicate = listener.try_clone().map_err(|e| {
            error!(port = self.port, error = %e, "Unable to duplicate server socket");
            SocketError::Closed
        })?;
        Ok(ShutdownHandle::for_listener(duplicate, self.closed.clone()))
    }

    /// Closes the socket, reporting [`SocketError::CloseFailed`] on failure
    ///
    /// Closing an already closed socket succeeds.
    pub fn try_close(&mut self) -> Result<()> {
        let was_open = self.state.is_open();
        self.state.release("server socket")?;
        if was_open {
            info!(port = self.port, "Server socket has been closed");
        }
        Ok(())
    }

    /// Closes the socket; false only if the operating system reported a failure
    pub fn close(&mut self) -> bool {
        self.try_close().is_ok()
    }
}
