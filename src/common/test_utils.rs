use crate::{ConnectedSocket, ListeningSocket, Result, SocketConfig};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Accept timeout used by the helpers so a broken test fails instead of hanging
pub const TEST_ACCEPT_TIMEOUT: Duration = Duration::from_secs(5);

/// Creates a listener on an OS-assigned loopback port
///
/// The listener carries [`TEST_ACCEPT_TIMEOUT`].
pub fn loopback_listener() -> Result<ListeningSocket> {
    let config = SocketConfig::new()
        .with_bind_ip(Ipv4Addr::LOCALHOST.into())
        .with_accept_timeout(TEST_ACCEPT_TIMEOUT);
    ListeningSocket::bind_with(0, &config)
}

/// Creates one loopback connection and returns `(client, server)`
///
/// The kernel completes the handshake from the listen backlog, so connecting
/// before accepting needs no second thread.
pub fn connected_pair() -> Result<(ConnectedSocket, ConnectedSocket)> {
    let mut listener = loopback_listener()?;
    let client = ConnectedSocket::connect("127.0.0.1", i32::from(listener.local_port()))?;
    let server = listener.accept()?;
    listener.close();
    Ok((client, server))
}
