// Raw descriptor operations that std::net does not expose
//
// std offers no accept timeout, no way to wake a thread blocked in accept,
// and no way to observe the result of close(2). These wrappers fill the gap
// with direct libc calls on the socket's descriptor.

use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;

/// Wait until `fd` is readable, hung up or in error
///
/// Returns `Ok(false)` when `timeout` elapses first. `None` waits
/// indefinitely. Interrupted waits are restarted.
pub(crate) fn wait_readable(fd: RawFd, timeout: Option<Duration>) -> io::Result<bool> {
    let millis = match timeout {
        Some(t) => t.as_millis().clamp(1, libc::c_int::MAX as u128) as libc::c_int,
        None => -1,
    };

    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };

    loop {
        // Safety: pfd is a valid pollfd for the duration of the call and nfds is 1
        let result = unsafe { libc::poll(&mut pfd, 1, millis) };
        if result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        return Ok(result > 0);
    }
}

/// Shut down both directions of `fd`
///
/// On a listening socket this stops listening and wakes any thread blocked
/// in poll or accept on it. `ENOTCONN` is not an error: the socket is
/// already in the state the caller asked for.
pub(crate) fn shutdown(fd: RawFd) -> io::Result<()> {
    // Safety: shutdown only reads the descriptor number
    let result = unsafe { libc::shutdown(fd, libc::SHUT_RDWR) };
    if result != 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ENOTCONN) {
            return Err(err);
        }
    }
    Ok(())
}

/// Release `fd`, reporting the result of close(2)
///
/// The descriptor must be owned by the caller and must not be used again,
/// whatever the outcome.
pub(crate) fn close(fd: RawFd) -> io::Result<()> {
    // Safety: ownership of fd was transferred to us via into_raw_fd
    let result = unsafe { libc::close(fd) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
