use proptest::prelude::*;
use sockguard::common::{connected_pair, loopback_listener};
use sockguard::{ConnectedSocket, ListeningSocket, SocketError, TimeUnit, to_milliseconds};
use std::time::Duration;

fn any_unit() -> impl Strategy<Value = TimeUnit> {
    prop::sample::select(TimeUnit::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: ports outside 0..=65535 fail validation before any bind or connect
    #[test]
    fn out_of_range_ports_rejected(port in prop_oneof![i32::MIN..0, 65536..=i32::MAX]) {
        prop_assert_eq!(ListeningSocket::bind(port).unwrap_err(), SocketError::InvalidPort(port));
        prop_assert_eq!(
            ConnectedSocket::connect("127.0.0.1", port).unwrap_err(),
            SocketError::InvalidPort(port)
        );
    }

    /// Property: non-positive durations normalize to zero whatever the unit
    #[test]
    fn non_positive_durations_normalize(value in i64::MIN..=0, unit in any_unit()) {
        prop_assert_eq!(to_milliseconds(value, unit), Ok(0));
    }

    /// Property: milliseconds pass through and seconds scale by 1000
    #[test]
    fn supported_units_convert(value in 1i64..=i64::MAX / 1000) {
        prop_assert_eq!(to_milliseconds(value, TimeUnit::Milliseconds), Ok(value));
        prop_assert_eq!(to_milliseconds(value, TimeUnit::Seconds), Ok(value * 1000));
    }

    /// Property: every other unit is rejected for positive values
    #[test]
    fn unsupported_units_rejected(value in 1i64.., unit in any_unit()) {
        prop_assume!(!matches!(unit, TimeUnit::Milliseconds | TimeUnit::Seconds));
        prop_assert_eq!(to_milliseconds(value, unit), Err(SocketError::InvalidUnit(unit)));
    }

    /// Property: rejected timeouts never alter the configured one
    #[test]
    fn invalid_timeout_keeps_previous(millis in i64::MIN..=0) {
        let mut listener = loopback_listener().unwrap();
        listener.set_timeout(750).unwrap();

        prop_assert_eq!(listener.set_timeout(millis), Err(SocketError::InvalidDuration(millis)));
        prop_assert_eq!(listener.timeout(), Some(Duration::from_millis(750)));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Property: blank text transmits nothing; the reader sees end-of-stream only
    #[test]
    fn blank_writes_transmit_nothing(text in "[ \t\r\n]{0,16}") {
        let (client, server) = connected_pair().unwrap();

        let mut outbound = client.outbound().unwrap();
        prop_assert_eq!(outbound.write(&text).unwrap(), 0);
        prop_assert!(outbound.close());

        let data = server.inbound().unwrap().read_all().unwrap();
        prop_assert!(data.is_empty());
    }

    /// Property: non-blank text arrives byte for byte as UTF-8
    #[test]
    fn text_arrives_intact(text in "[a-zA-Zéü0-9 ]{0,64}[a-z]") {
        let (client, server) = connected_pair().unwrap();

        let mut outbound = client.outbound().unwrap();
        prop_assert_eq!(outbound.write(&text).unwrap(), text.len());
        prop_assert!(outbound.close());

        let data = server.inbound().unwrap().read_all().unwrap();
        prop_assert_eq!(&data[..], text.as_bytes());
    }
}
