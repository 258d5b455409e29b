//! E2E tests for the Milan stream state machine
//!
//! Walks the Disabled → Enabled → Connected lifecycle and the Error sink
//! through the registry, checking recorded error codes along the way.

use avbstream::{
    EntityId, MilanError, MilanStreamConfig, RedundancyRole, StreamId, StreamRegistry, StreamState,
};

fn registry_with_stream() -> (StreamRegistry, avbstream::StreamKey) {
    let mut registry = StreamRegistry::new();
    let key = registry.register(MilanStreamConfig::new(
        EntityId::new([0x42; 8]),
        StreamId::new([0x43; 8]),
        RedundancyRole::None,
    ));
    (registry, key)
}

/// enable then connect on a fully compliant config always yields Connected
#[test]
fn test_enable_connect_yields_connected() {
    let (mut registry, key) = registry_with_stream();
    registry.enable(key).unwrap();
    registry.connect(key).unwrap();
    assert_eq!(
        registry.config(key).unwrap().state(),
        StreamState::Connected
    );
    assert_eq!(registry.config(key).unwrap().last_error(), 0);
}

/// connect never succeeds unless the immediately preceding state was Enabled
#[test]
fn test_connect_requires_enabled() {
    // From Disabled: failed attempt, not a no-op.
    let (mut registry, key) = registry_with_stream();
    assert_eq!(registry.connect(key), Err(MilanError::NonCompliant));
    assert_eq!(registry.config(key).unwrap().state(), StreamState::Error);
    assert_eq!(registry.config(key).unwrap().last_error(), 2);

    // From Connected: also a failed attempt.
    let (mut registry, key) = registry_with_stream();
    registry.enable(key).unwrap();
    registry.connect(key).unwrap();
    assert!(registry.connect(key).is_err());
    assert_eq!(registry.config(key).unwrap().state(), StreamState::Error);
}

/// disconnect is a no-op unless Connected, and returns to Enabled otherwise
#[test]
fn test_disconnect_semantics() {
    let (mut registry, key) = registry_with_stream();

    registry.disconnect(key);
    assert_eq!(registry.config(key).unwrap().state(), StreamState::Disabled);

    registry.enable(key).unwrap();
    registry.disconnect(key);
    assert_eq!(registry.config(key).unwrap().state(), StreamState::Enabled);

    registry.connect(key).unwrap();
    registry.disconnect(key);
    assert_eq!(registry.config(key).unwrap().state(), StreamState::Enabled);
}

/// disable resets to Disabled from any state without clearing diagnostics
#[test]
fn test_disable_from_every_state() {
    let (mut registry, key) = registry_with_stream();
    registry.enable(key).unwrap();
    registry.connect(key).unwrap();
    registry.disable(key);
    assert_eq!(registry.config(key).unwrap().state(), StreamState::Disabled);

    registry.report_error(key, 9);
    registry.disable(key);
    let cfg = registry.config(key).unwrap();
    assert_eq!(cfg.state(), StreamState::Disabled);
    assert_eq!(cfg.last_error(), 9, "disable must not clear last_error");
}

/// reportError forces the Error sink with the supplied code
#[test]
fn test_report_error_is_unconditional() {
    let (mut registry, key) = registry_with_stream();
    registry.enable(key).unwrap();
    registry.connect(key).unwrap();

    registry.report_error(key, 0xDEAD);
    let cfg = registry.config(key).unwrap();
    assert_eq!(cfg.state(), StreamState::Error);
    assert_eq!(cfg.last_error(), 0xDEAD);
}

/// enable re-runs the compliance check from any state, including Error
#[test]
fn test_enable_recovers_from_error_when_compliant() {
    let (mut registry, key) = registry_with_stream();
    registry.report_error(key, 5);
    assert_eq!(registry.config(key).unwrap().state(), StreamState::Error);

    registry.enable(key).unwrap();
    assert_eq!(registry.config(key).unwrap().state(), StreamState::Enabled);
}

/// A non-compliant stream can never leave Disabled/Error via enable
#[test]
fn test_noncompliant_stream_is_stuck_in_error() {
    let mut registry = StreamRegistry::new();
    let key = registry.register(MilanStreamConfig::new(
        EntityId::new([0x42, 0x42, 0x42, 0x00, 0x42, 0x42, 0x42, 0x42]),
        StreamId::new([0x43; 8]),
        RedundancyRole::None,
    ));

    assert_eq!(registry.enable(key), Err(MilanError::NonCompliant));
    let cfg = registry.config(key).unwrap();
    assert_eq!(cfg.state(), StreamState::Error);
    assert_eq!(cfg.last_error(), 1);

    // Re-running the check is allowed and fails the same way.
    assert!(registry.enable(key).is_err());
}

/// Transitions on an unknown key surface UnknownStream; the compliance
/// check treats an absent config as non-compliant
#[test]
fn test_unknown_key_is_rejected() {
    let mut other = StreamRegistry::new();
    let stale = other.register(MilanStreamConfig::new(
        EntityId::new([0x01; 8]),
        StreamId::new([0x02; 8]),
        RedundancyRole::None,
    ));

    let mut empty = StreamRegistry::new();
    assert!(!empty.is_compliant(stale));
    assert!(matches!(
        empty.enable(stale),
        Err(MilanError::UnknownStream(_))
    ));
    assert!(matches!(
        empty.connect(stale),
        Err(MilanError::UnknownStream(_))
    ));
    // Infallible ops are silent no-ops on unknown keys.
    empty.disconnect(stale);
    empty.disable(stale);
    empty.report_error(stale, 1);
    assert!(empty.is_empty());
}
