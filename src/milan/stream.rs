//! Milan stream configuration entity
//!
//! Identifiers, the fixed stream format, redundancy roles, connection
//! states and the central [`MilanStreamConfig`] entity. Configs are plain
//! data here; all state transitions go through
//! [`StreamRegistry`](crate::milan::registry::StreamRegistry), which owns
//! every config.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::{ID_LENGTH, MILAN_BIT_DEPTH, MILAN_CHANNELS, MILAN_SAMPLE_RATE, MILAN_STREAM_FORMAT};

/// Error parsing an entity or stream identifier from hex
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("identifier must be exactly {} hex digits", ID_LENGTH * 2)]
pub struct ParseIdError;

fn parse_id_bytes(s: &str) -> Result<[u8; ID_LENGTH], ParseIdError> {
    if s.len() != ID_LENGTH * 2 || !s.is_ascii() {
        return Err(ParseIdError);
    }
    let mut bytes = [0u8; ID_LENGTH];
    for (i, byte) in bytes.iter_mut().enumerate() {
        let pair = s.get(i * 2..i * 2 + 2).ok_or(ParseIdError)?;
        *byte = u8::from_str_radix(pair, 16).map_err(|_| ParseIdError)?;
    }
    Ok(bytes)
}

fn fmt_id_bytes(bytes: &[u8; ID_LENGTH], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for byte in bytes {
        write!(f, "{byte:02X}")?;
    }
    Ok(())
}

/// AVDECC entity identifier (8 bytes)
///
/// An identifier containing any zero byte is treated as unassigned by the
/// compliance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId([u8; ID_LENGTH]);

impl EntityId {
    /// Create an entity id from raw bytes
    pub fn new(bytes: [u8; ID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Raw identifier bytes
    pub fn as_bytes(&self) -> &[u8; ID_LENGTH] {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_id_bytes(&self.0, f)
    }
}

impl FromStr for EntityId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_id_bytes(s).map(Self)
    }
}

/// AVB stream identifier (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId([u8; ID_LENGTH]);

impl StreamId {
    /// Create a stream id from raw bytes
    pub fn new(bytes: [u8; ID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Raw identifier bytes
    pub fn as_bytes(&self) -> &[u8; ID_LENGTH] {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_id_bytes(&self.0, f)
    }
}

impl FromStr for StreamId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_id_bytes(s).map(Self)
    }
}

/// Stream format fields checked against the Milan base audio profile
///
/// `Default` is the profile itself; any deviation from it fails the
/// compliance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilanFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Audio channel count
    pub channels: u8,
    /// Sample bit depth
    pub bit_depth: u8,
    /// Stream format code (0x02 = MBLA)
    pub stream_format: u8,
}

impl Default for MilanFormat {
    fn default() -> Self {
        Self {
            sample_rate: MILAN_SAMPLE_RATE,
            channels: MILAN_CHANNELS,
            bit_depth: MILAN_BIT_DEPTH,
            stream_format: MILAN_STREAM_FORMAT,
        }
    }
}

/// Connection state of a Milan stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    /// Stream is idle (initial state)
    #[default]
    Disabled,
    /// Stream passed compliance and may connect
    Enabled,
    /// Stream is connected and may carry media
    Connected,
    /// Stream hit a fault; see `last_error`
    Error,
}

/// Redundancy role of a Milan stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedundancyRole {
    /// Not part of a redundant pair
    #[default]
    None,
    /// Primary member of a redundant pair
    Primary,
    /// Secondary member of a redundant pair
    Secondary,
}

/// Error code recorded when `enable` fails compliance
pub const ERROR_ENABLE_FAILED: u32 = 1;

/// Error code recorded when `connect` fails its gate
pub const ERROR_CONNECT_FAILED: u32 = 2;

/// Milan stream configuration
///
/// Identity, role and format are immutable after creation. The state is
/// mutated only by the registry's transition operations and the packet
/// counters only by the media transport.
#[derive(Debug, Clone)]
pub struct MilanStreamConfig {
    entity_id: EntityId,
    stream_id: StreamId,
    role: RedundancyRole,
    pub(crate) state: StreamState,
    pub(crate) format: MilanFormat,
    pub(crate) packets_sent: u64,
    pub(crate) packets_received: u64,
    pub(crate) last_error: u32,
}

impl MilanStreamConfig {
    /// Create a new configuration in the `Disabled` state with the fixed
    /// Milan profile format
    pub fn new(entity_id: EntityId, stream_id: StreamId, role: RedundancyRole) -> Self {
        Self {
            entity_id,
            stream_id,
            role,
            state: StreamState::Disabled,
            format: MilanFormat::default(),
            packets_sent: 0,
            packets_received: 0,
            last_error: 0,
        }
    }

    /// Create a configuration with an explicit (possibly non-compliant) format
    pub fn with_format(
        entity_id: EntityId,
        stream_id: StreamId,
        role: RedundancyRole,
        format: MilanFormat,
    ) -> Self {
        Self {
            format,
            ..Self::new(entity_id, stream_id, role)
        }
    }

    /// Entity identifier
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    /// Stream identifier
    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    /// Redundancy role (set at creation)
    pub fn role(&self) -> RedundancyRole {
        self.role
    }

    /// Current connection state
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Stream format fields
    pub fn format(&self) -> MilanFormat {
        self.format
    }

    /// Packets sent through this config
    pub fn packets_sent(&self) -> u64 {
        self.packets_sent
    }

    /// Packets received through this config
    pub fn packets_received(&self) -> u64 {
        self.packets_received
    }

    /// Last recorded error code (0 = none)
    pub fn last_error(&self) -> u32 {
        self.last_error
    }
}
