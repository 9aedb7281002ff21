use super::sys;
use crate::{Result, SocketError};
use std::os::unix::io::{AsRawFd, IntoRawFd};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error};

/// Closed marker shared by a socket and every handle derived from it
///
/// A stream adapter or [`super::ShutdownHandle`] that ends the connection
/// sets it, and the owning socket then rejects everything except close.
#[derive(Debug, Clone, Default)]
pub(crate) struct CloseFlag(Arc<AtomicBool>);

impl CloseFlag {
    pub(crate) fn mark(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub(crate) fn is_marked(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Lifecycle of a descriptor-owning handle
///
/// `Closed` and `CloseFailed` are terminal. A handle whose close failed
/// keeps reporting that failure on every later close.
#[derive(Debug)]
pub(crate) enum SocketState<T> {
    Open(T),
    Closed,
    CloseFailed,
}

impl<T> SocketState<T> {
    pub(crate) fn get(&self) -> Option<&T> {
        match self {
            SocketState::Open(handle) => Some(handle),
            _ => None,
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        matches!(self, SocketState::Open(_))
    }
}

impl<T: AsRawFd + IntoRawFd> SocketState<T> {
    /// Shut down and release the descriptor
    ///
    /// `what` names the handle in log output only.
    pub(crate) fn release(&mut self, what: &'static str) -> Result<()> {
        match std::mem::replace(self, SocketState::Closed) {
            SocketState::Closed => Ok(()),
            SocketState::CloseFailed => {
                *self = SocketState::CloseFailed;
                Err(SocketError::CloseFailed)
            }
            SocketState::Open(handle) => {
                // Duplicated descriptors keep the socket alive after close(2);
                // shutting down first tears the connection down for all of them.
                if let Err(e) = sys::shutdown(handle.as_raw_fd()) {
                    debug!(what, error = %e, "Shutdown before close failed");
                }

                if let Err(e) = sys::close(handle.into_raw_fd()) {
                    error!(what, error = %e, "Unable to close");
                    *self = SocketState::CloseFailed;
                    return Err(SocketError::CloseFailed);
                }

                debug!(what, "Closed");
                Ok(())
            }
        }
    }
}
