//! Persistent stream setup configuration
//!
//! Stores the demo/caller stream setup - identifiers, buffer size and CRF
//! tick frequency - in a JSON file. Identifiers are 16-digit hex strings
//! so the file stays hand-editable.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::milan::stream::{EntityId, ParseIdError, StreamId};

fn default_entity_id() -> String {
    "001B21FFFE010101".to_string()
}

fn default_primary_stream_id() -> String {
    "001B21FFFE010102".to_string()
}

fn default_secondary_stream_id() -> String {
    "001B21FFFE010103".to_string()
}

fn default_buffer_size() -> usize {
    512
}

fn default_tick_frequency() -> u32 {
    crate::MILAN_SAMPLE_RATE
}

fn default_packets() -> u32 {
    8
}

/// Persistent stream setup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairSetup {
    /// AVDECC entity id as 16 hex digits
    #[serde(default = "default_entity_id")]
    pub entity_id: String,
    /// Primary stream id as 16 hex digits
    #[serde(default = "default_primary_stream_id")]
    pub primary_stream_id: String,
    /// Secondary stream id as 16 hex digits
    #[serde(default = "default_secondary_stream_id")]
    pub secondary_stream_id: String,
    /// Transport buffer capacity in bytes (both members)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// CRF clock tick frequency in Hz
    #[serde(default = "default_tick_frequency")]
    pub tick_frequency: u32,
    /// Number of packets the demo sends
    #[serde(default = "default_packets")]
    pub packets: u32,
}

impl Default for PairSetup {
    fn default() -> Self {
        Self {
            entity_id: default_entity_id(),
            primary_stream_id: default_primary_stream_id(),
            secondary_stream_id: default_secondary_stream_id(),
            buffer_size: default_buffer_size(),
            tick_frequency: default_tick_frequency(),
            packets: default_packets(),
        }
    }
}

impl PairSetup {
    /// Load setup from disk, falling back to defaults on any error
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(setup) => {
                    tracing::info!(path = %path.display(), "Loaded stream setup from disk");
                    setup
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to parse setup, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!(path = %path.display(), "No setup file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save setup to disk, creating parent directories if needed
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "Stream setup saved to disk");
        Ok(())
    }

    /// Parse the entity id
    pub fn entity_id(&self) -> Result<EntityId, ParseIdError> {
        EntityId::from_str(&self.entity_id)
    }

    /// Parse the primary stream id
    pub fn primary_stream_id(&self) -> Result<StreamId, ParseIdError> {
        StreamId::from_str(&self.primary_stream_id)
    }

    /// Parse the secondary stream id
    pub fn secondary_stream_id(&self) -> Result<StreamId, ParseIdError> {
        StreamId::from_str(&self.secondary_stream_id)
    }
}
