//! Avbstream - Milan AVB/TSN stream control and media transport
//!
//! This library models the control and data plane of a Milan-profile
//! AVB/TSN audio stream: a compliance-gated connection state machine,
//! primary/secondary stream redundancy, and transport of AAF (audio
//! sample) and CRF (clock reference) payloads over that state machine.
//!
//! Transport is an in-memory buffer hand-off standing in for a real
//! network send/receive; there is no packet framing or clock sync here.

pub mod config;
pub mod milan;
pub mod stats;
pub mod transport;

pub use milan::compliance::{format_is_compliant, is_compliant};
pub use milan::registry::{MilanError, StreamKey, StreamRegistry};
pub use milan::stream::{
    EntityId, MilanFormat, MilanStreamConfig, RedundancyRole, StreamId, StreamState,
};
pub use stats::store::EventLog;
pub use transport::media::{MediaStream, PayloadKind, TransportError};
pub use transport::pair::RedundantPair;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Milan base audio profile sample rate in Hz
pub const MILAN_SAMPLE_RATE: u32 = 48_000;

/// Milan base audio profile channel count
pub const MILAN_CHANNELS: u8 = 8;

/// Milan base audio profile bit depth
pub const MILAN_BIT_DEPTH: u8 = 24;

/// Milan stream format code (MBLA)
pub const MILAN_STREAM_FORMAT: u8 = 0x02;

/// Length of AVDECC entity and stream identifiers in bytes
pub const ID_LENGTH: usize = 8;
