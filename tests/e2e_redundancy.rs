//! E2E tests for redundant pair binding and mirrored transmission
//!
//! Covers the role-checked symmetric binding and the full mirrored-send
//! scenario: a Connected primary with a bound secondary duplicates every
//! payload and counts one packet on each side.

use avbstream::{
    EntityId, MediaStream, MilanError, MilanStreamConfig, PayloadKind, RedundancyRole,
    RedundantPair, StreamId, StreamKey, StreamRegistry, TransportError,
};

fn audio_kind() -> PayloadKind {
    PayloadKind::Audio {
        sample_rate: avbstream::MILAN_SAMPLE_RATE,
        channels: avbstream::MILAN_CHANNELS as u16,
        bit_depth: avbstream::MILAN_BIT_DEPTH as u16,
    }
}

fn member(
    registry: &mut StreamRegistry,
    id: u32,
    role: RedundancyRole,
    fill: u8,
    capacity: usize,
) -> (MediaStream, StreamKey) {
    let key = registry.register(MilanStreamConfig::new(
        EntityId::new([fill; 8]),
        StreamId::new([fill; 8]),
        role,
    ));
    let mut stream = MediaStream::new(id, audio_kind());
    stream.attach_buffer(vec![0; capacity]);
    stream.bind_config(key);
    (stream, key)
}

fn connect(registry: &mut StreamRegistry, keys: [StreamKey; 2]) {
    for key in keys {
        registry.enable(key).unwrap();
        registry.connect(key).unwrap();
    }
}

/// Binding succeeds iff roles are exactly (Primary, Secondary)
#[test]
fn test_binding_role_matrix() {
    let roles = [
        RedundancyRole::None,
        RedundancyRole::Primary,
        RedundancyRole::Secondary,
    ];
    for first in roles {
        for second in roles {
            let mut registry = StreamRegistry::new();
            let a = registry.register(MilanStreamConfig::new(
                EntityId::new([0x10; 8]),
                StreamId::new([0x10; 8]),
                first,
            ));
            let b = registry.register(MilanStreamConfig::new(
                EntityId::new([0x20; 8]),
                StreamId::new([0x20; 8]),
                second,
            ));

            let result = registry.bind(a, b);
            let should_succeed =
                first == RedundancyRole::Primary && second == RedundancyRole::Secondary;
            assert_eq!(
                result.is_ok(),
                should_succeed,
                "bind({:?}, {:?}) acceptance mismatch",
                first,
                second
            );
            if !should_succeed {
                assert_eq!(result, Err(MilanError::BindingRejected));
                assert_eq!(registry.partner(a), None, "{:?}/{:?}", first, second);
                assert_eq!(registry.partner(b), None, "{:?}/{:?}", first, second);
            }
        }
    }
}

/// Full scenario from the wire contract: compliant pair, enable+connect,
/// bind, send [0xAA; 4] on the primary
#[test]
fn test_mirrored_send_scenario() {
    let mut registry = StreamRegistry::new();
    let (primary, pkey) = member(&mut registry, 1, RedundancyRole::Primary, 0x10, 64);
    let (secondary, skey) = member(&mut registry, 2, RedundancyRole::Secondary, 0x20, 64);
    connect(&mut registry, [pkey, skey]);

    let mut pair = RedundantPair::bind(&mut registry, primary, secondary)
        .map_err(|(_, _, e)| e)
        .unwrap();

    let written = pair.send_on_primary(&mut registry, &[0xAA; 4]).unwrap();

    assert_eq!(written, 4);
    assert_eq!(registry.config(pkey).unwrap().packets_sent(), 1);
    assert_eq!(registry.config(skey).unwrap().packets_sent(), 1);
    assert_eq!(
        &pair.secondary().buffer().unwrap()[..4],
        &[0xAA, 0xAA, 0xAA, 0xAA]
    );
}

/// Each mirrored send counts exactly one packet per side
#[test]
fn test_counters_track_packets_not_bytes() {
    let mut registry = StreamRegistry::new();
    let (primary, pkey) = member(&mut registry, 1, RedundancyRole::Primary, 0x10, 64);
    let (secondary, skey) = member(&mut registry, 2, RedundancyRole::Secondary, 0x20, 64);
    connect(&mut registry, [pkey, skey]);
    let mut pair = RedundantPair::bind(&mut registry, primary, secondary)
        .map_err(|(_, _, e)| e)
        .unwrap();

    for n in 1..=5u64 {
        pair.send_on_primary(&mut registry, &[0x55; 32]).unwrap();
        assert_eq!(registry.config(pkey).unwrap().packets_sent(), n);
        assert_eq!(registry.config(skey).unwrap().packets_sent(), n);
    }
}

/// Sending while the primary is not Connected touches neither side
#[test]
fn test_not_connected_send_is_atomic() {
    let mut registry = StreamRegistry::new();
    let (primary, pkey) = member(&mut registry, 1, RedundancyRole::Primary, 0x10, 64);
    let (secondary, skey) = member(&mut registry, 2, RedundancyRole::Secondary, 0x20, 64);
    connect(&mut registry, [pkey, skey]);
    let mut pair = RedundantPair::bind(&mut registry, primary, secondary)
        .map_err(|(_, _, e)| e)
        .unwrap();
    registry.disconnect(pkey);

    assert_eq!(
        pair.send_on_primary(&mut registry, &[1, 2, 3]),
        Err(TransportError::NotConnected)
    );
    assert_eq!(registry.config(pkey).unwrap().packets_sent(), 0);
    assert_eq!(registry.config(skey).unwrap().packets_sent(), 0);
    assert_eq!(pair.secondary().buffer().unwrap(), &[0u8; 64]);
}

/// An undersized partner buffer truncates the mirror copy instead of
/// failing the send; the partner still counts the packet
#[test]
fn test_undersized_partner_buffer_truncates_mirror() {
    let mut registry = StreamRegistry::new();
    let (primary, pkey) = member(&mut registry, 1, RedundancyRole::Primary, 0x10, 8);
    let (secondary, skey) = member(&mut registry, 2, RedundancyRole::Secondary, 0x20, 4);
    connect(&mut registry, [pkey, skey]);
    let mut pair = RedundantPair::bind(&mut registry, primary, secondary)
        .map_err(|(_, _, e)| e)
        .unwrap();

    // Violates the capacity precondition (partner 4 < sender 8).
    let written = pair.send_on_primary(&mut registry, &[0xAA; 8]).unwrap();

    assert_eq!(written, 8, "sender side commits the full payload");
    assert_eq!(pair.primary().buffer().unwrap(), &[0xAA; 8]);
    assert_eq!(
        pair.secondary().buffer().unwrap(),
        &[0xAA; 4],
        "mirror holds the truncated prefix"
    );
    assert_eq!(registry.config(pkey).unwrap().packets_sent(), 1);
    assert_eq!(registry.config(skey).unwrap().packets_sent(), 1);
}

/// The secondary side mirrors back to the primary symmetrically
#[test]
fn test_secondary_send_mirrors_to_primary() {
    let mut registry = StreamRegistry::new();
    let (primary, pkey) = member(&mut registry, 1, RedundancyRole::Primary, 0x10, 64);
    let (secondary, skey) = member(&mut registry, 2, RedundancyRole::Secondary, 0x20, 64);
    connect(&mut registry, [pkey, skey]);
    let mut pair = RedundantPair::bind(&mut registry, primary, secondary)
        .map_err(|(_, _, e)| e)
        .unwrap();

    pair.send_on_secondary(&mut registry, &[0xBB; 8]).unwrap();
    assert_eq!(&pair.primary().buffer().unwrap()[..8], &[0xBB; 8]);
    assert_eq!(registry.config(pkey).unwrap().packets_sent(), 1);
}

/// Receive on either side never mirrors or touches the partner
#[test]
fn test_receive_is_partner_neutral() {
    let mut registry = StreamRegistry::new();
    let (primary, pkey) = member(&mut registry, 1, RedundancyRole::Primary, 0x10, 64);
    let (secondary, skey) = member(&mut registry, 2, RedundancyRole::Secondary, 0x20, 64);
    connect(&mut registry, [pkey, skey]);
    let mut pair = RedundantPair::bind(&mut registry, primary, secondary)
        .map_err(|(_, _, e)| e)
        .unwrap();
    pair.send_on_primary(&mut registry, &[9; 16]).unwrap();

    let mut out = [0u8; 16];
    pair.receive_on_secondary(&mut registry, &mut out).unwrap();
    assert_eq!(out, [9; 16]);
    assert_eq!(registry.config(skey).unwrap().packets_received(), 1);
    assert_eq!(registry.config(pkey).unwrap().packets_received(), 0);
}

/// CRF pairs mirror with the same contract as AAF pairs
#[test]
fn test_crf_pair_mirrors_identically() {
    let mut registry = StreamRegistry::new();
    let pkey = registry.register(MilanStreamConfig::new(
        EntityId::new([0x10; 8]),
        StreamId::new([0x10; 8]),
        RedundancyRole::Primary,
    ));
    let skey = registry.register(MilanStreamConfig::new(
        EntityId::new([0x20; 8]),
        StreamId::new([0x20; 8]),
        RedundancyRole::Secondary,
    ));
    connect(&mut registry, [pkey, skey]);

    let kind = PayloadKind::ClockRef {
        tick_frequency: 48_000,
    };
    let mut primary = MediaStream::new(1, kind);
    primary.attach_buffer(vec![0; 16]);
    primary.bind_config(pkey);
    let mut secondary = MediaStream::new(2, kind);
    secondary.attach_buffer(vec![0; 16]);
    secondary.bind_config(skey);

    let mut pair = RedundantPair::bind(&mut registry, primary, secondary)
        .map_err(|(_, _, e)| e)
        .unwrap();
    pair.send_on_primary(&mut registry, &[0xC0, 0xC1]).unwrap();
    assert_eq!(&pair.secondary().buffer().unwrap()[..2], &[0xC0, 0xC1]);
    assert_eq!(registry.config(skey).unwrap().packets_sent(), 1);
}
