use super::state::CloseFlag;
use super::sys;
use std::net::{TcpListener, TcpStream};
use std::os::unix::io::AsRawFd;
use tracing::{error, info};

/// Cross-thread interrupt for a socket owned by someone else
///
/// Sockets are single-owner and unsynchronized. A thread that needs to wake
/// the owner out of a blocked `accept`, `read_all` or `write` obtains one of
/// these from the owner beforehand and calls [`ShutdownHandle::shutdown`].
///
/// The handle holds a duplicated descriptor, so the socket stays allocated
/// until both the owner has closed it and the handle has been dropped. After
/// a successful shutdown the owner reports itself closed and only `close`
/// still succeeds on it.
///
/// # Examples
///
/// ```no_run
/// use sockguard::ListeningSocket;
/// use std::thread;
///
/// let listener = ListeningSocket::bind(0)?;
/// let handle = listener.shutdown_handle()?;
///
/// let waiter = thread::spawn(move || listener.accept());
/// handle.shutdown();
/// assert!(waiter.join().unwrap().is_err());
/// # Ok::<(), sockguard::SocketError>(())
/// ```
#[derive(Debug)]
pub struct ShutdownHandle {
    target: Target,
    closed: CloseFlag,
}

#[derive(Debug)]
enum Target {
    Listener(TcpListener),
    Connection(TcpStream),
}

impl ShutdownHandle {
    pub(crate) fn for_listener(listener: TcpListener, closed: CloseFlag) -> Self {
        Self {
            target: Target::Listener(listener),
            closed,
        }
    }

    pub(crate) fn for_connection(stream: TcpStream, closed: CloseFlag) -> Self {
        Self {
            target: Target::Connection(stream),
            closed,
        }
    }

    /// Stop the socket in both directions
    ///
    /// A listening socket stops accepting and a connected socket sends FIN
    /// to its peer. Returns false only if the operating system reports a
    /// failure.
    pub fn shutdown(&self) -> bool {
        let (kind, fd) = match &self.target {
            Target::Listener(listener) => ("listener", listener.as_raw_fd()),
            Target::Connection(stream) => ("connection", stream.as_raw_fd()),
        };

        match sys::shutdown(fd) {
            Ok(()) => {
                self.closed.mark();
                info!(kind, "Socket shut down from another thread");
                true
            }
            Err(e) => {
                error!(kind, error = %e, "Unable to shut down socket");
                false
            }
        }
    }
}
