use super::*;
use crate::SocketError;
use crate::common::connected_pair;
use std::time::{Duration, Instant};

#[test]
fn test_open_on_closed_socket() {
    let (mut client, _server) = connected_pair().unwrap();
    assert!(client.close());

    assert_eq!(
        InboundStream::open(&client).unwrap_err(),
        SocketError::StreamUnavailable
    );
    assert_eq!(
        OutboundStream::open(&client).unwrap_err(),
        SocketError::StreamUnavailable
    );
}

#[test]
fn test_open_reads_nothing() {
    let (client, server) = connected_pair().unwrap();
    let mut outbound = client.outbound().unwrap();
    assert_eq!(outbound.write("abc").unwrap(), 3);

    // Opening twice must not consume the pending bytes
    let _first = server.inbound().unwrap();
    let mut second = server.inbound().unwrap();
    assert!(outbound.close());

    assert_eq!(&second.read_all().unwrap()[..], b"abc");
}

#[test]
fn test_read_until_peer_closes() {
    let (client, server) = connected_pair().unwrap();

    let mut outbound = client.outbound().unwrap();
    assert_eq!(outbound.write("M").unwrap(), 1);
    assert!(outbound.close());

    let mut inbound = server.inbound().unwrap();
    let data = inbound.read_all().unwrap();
    assert_eq!(&data[..], &[77]);
    assert!(inbound.close());
}

#[test]
fn test_write_encodes_utf8() {
    let (client, server) = connected_pair().unwrap();

    let mut outbound = server.outbound().unwrap();
    assert_eq!(outbound.write("héllo wörld").unwrap(), 13);
    assert!(outbound.close());

    let data = client.inbound().unwrap().read_all().unwrap();
    assert_eq!(std::str::from_utf8(&data).unwrap(), "héllo wörld");
}

#[test]
fn test_blank_writes_transmit_nothing() {
    let (client, server) = connected_pair().unwrap();

    let mut outbound = client.outbound().unwrap();
    for text in ["", " ", "   ", "\t\n"] {
        assert_eq!(outbound.write(text).unwrap(), 0);
    }
    assert_eq!(outbound.write_bytes(&[]).unwrap(), 0);
    assert!(outbound.close());

    let data = server.inbound().unwrap().read_all().unwrap();
    assert!(data.is_empty());
}

#[test]
fn test_read_times_out() {
    let (_client, mut server) = connected_pair().unwrap();
    server.set_timeout(1000).unwrap();

    let mut inbound = server.inbound().unwrap();
    let started = Instant::now();
    let err = inbound.read_all().unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(err, SocketError::ReadTimeout);
    assert!(err.is_timeout());
    assert!(elapsed >= Duration::from_millis(900), "returned after {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "returned after {elapsed:?}");
}

#[test]
fn test_timeout_set_after_open_applies() {
    let (_client, mut server) = connected_pair().unwrap();
    let mut inbound = server.inbound().unwrap();
    server.set_timeout(100).unwrap();

    assert_eq!(inbound.read_all().unwrap_err(), SocketError::ReadTimeout);
}

#[test]
fn test_write_times_out_when_peer_stops_reading() {
    let (_client, mut server) = connected_pair().unwrap();
    server.set_timeout(200).unwrap();

    // Larger than the loopback send and receive buffers combined
    let payload = vec![b'x'; 64 * 1024 * 1024];
    let mut outbound = server.outbound().unwrap();
    assert_eq!(
        outbound.write_bytes(&payload).unwrap_err(),
        SocketError::WriteTimeout
    );
}

#[test]
fn test_stream_close_is_idempotent() {
    let (_client, server) = connected_pair().unwrap();

    let mut inbound = server.inbound().unwrap();
    let mut outbound = server.outbound().unwrap();

    assert!(inbound.close());
    assert!(inbound.is_closed());
    assert!(inbound.close());
    assert_eq!(inbound.try_close(), Ok(()));

    assert!(outbound.close());
    assert!(outbound.close());
}

#[test]
fn test_closed_streams_degrade() {
    let (_client, server) = connected_pair().unwrap();

    let mut inbound = server.inbound().unwrap();
    let mut outbound = server.outbound().unwrap();

    assert!(inbound.close());
    assert!(inbound.read_all().unwrap().is_empty());
    assert_eq!(outbound.write("still here").unwrap(), 0);
    assert!(outbound.close());
}

#[test]
fn test_parent_close_invalidates_streams() {
    let (_client, mut server) = connected_pair().unwrap();
    let mut inbound = server.inbound().unwrap();
    let mut outbound = server.outbound().unwrap();

    assert!(server.close());

    assert!(inbound.read_all().unwrap().is_empty());
    assert_eq!(outbound.write("after close").unwrap(), 0);
    assert!(inbound.close());
    assert!(outbound.close());
}

#[test]
fn test_stream_close_closes_parent() {
    let (_client, mut server) = connected_pair().unwrap();
    let mut inbound = server.inbound().unwrap();
    assert!(inbound.close());

    assert!(server.is_closed());
    assert!(!server.is_connected());
    assert!(server.timeout().is_none());
    assert_eq!(server.set_timeout(100), Err(SocketError::Closed));
    assert_eq!(server.inbound().unwrap_err(), SocketError::StreamUnavailable);
    assert_eq!(server.outbound().unwrap_err(), SocketError::StreamUnavailable);
    assert_eq!(server.shutdown_handle().unwrap_err(), SocketError::Closed);

    // The descriptor is still released on close
    assert!(server.close());
    assert!(server.close());
}

#[test]
fn test_outbound_close_closes_parent() {
    let (client, server) = connected_pair().unwrap();
    let mut outbound = client.outbound().unwrap();
    assert_eq!(outbound.write("bye").unwrap(), 3);
    assert!(outbound.close());

    assert!(client.is_closed());
    assert_eq!(client.inbound().unwrap_err(), SocketError::StreamUnavailable);

    // The peer still drains what was written before the close
    assert_eq!(&server.inbound().unwrap().read_all().unwrap()[..], b"bye");
    assert!(!server.is_closed());
}
