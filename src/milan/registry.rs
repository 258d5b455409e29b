//! Stream registry: ownership, state machine and redundancy binding
//!
//! The registry owns every [`MilanStreamConfig`] in an arena and hands out
//! [`StreamKey`]s. The redundant-partner relation is a symmetric pair of
//! keys inside the registry rather than a reference between configs, so
//! there is no ownership cycle and all mutation funnels through the
//! registry's operations.
//!
//! Every transition is compliance-gated where the profile demands it, and
//! every transition, binding and rejection is logged on the `tracing`
//! diagnostics sink and recorded in the registry's [`EventLog`].

use thiserror::Error;

use crate::milan::compliance;
use crate::milan::stream::{
    MilanFormat, MilanStreamConfig, StreamState, ERROR_CONNECT_FAILED, ERROR_ENABLE_FAILED,
};
use crate::stats::store::{EventKind, EventLog};
use crate::RedundancyRole;

/// Errors surfaced by the Milan control plane
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MilanError {
    /// Format or identifier check failed, or a gated transition was
    /// attempted from the wrong state
    #[error("stream is not Milan compliant")]
    NonCompliant,

    /// Redundancy binding roles were not exactly (Primary, Secondary)
    #[error("redundancy binding rejected: roles must be (Primary, Secondary)")]
    BindingRejected,

    /// The key does not name a registered stream
    #[error("unknown stream key {0:?}")]
    UnknownStream(StreamKey),
}

/// Key of a registered stream configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamKey(usize);

impl StreamKey {
    /// Arena index of this key
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Entry {
    config: MilanStreamConfig,
    partner: Option<StreamKey>,
}

/// Owning registry of Milan stream configurations
///
/// Configs are created `Disabled` and destroyed with the registry; keys
/// stay valid for the registry's lifetime.
#[derive(Debug, Default)]
pub struct StreamRegistry {
    entries: Vec<Entry>,
    events: EventLog,
}

impl StreamRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a configuration, taking ownership of it
    pub fn register(&mut self, config: MilanStreamConfig) -> StreamKey {
        let key = StreamKey(self.entries.len());
        tracing::info!(
            stream = %config.stream_id(),
            role = ?config.role(),
            "stream registered"
        );
        self.entries.push(Entry {
            config,
            partner: None,
        });
        key
    }

    /// Number of registered streams
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read access to a registered configuration
    pub fn config(&self, key: StreamKey) -> Option<&MilanStreamConfig> {
        self.entries.get(key.0).map(|e| &e.config)
    }

    /// Bound redundant partner of a stream, if any
    pub fn partner(&self, key: StreamKey) -> Option<StreamKey> {
        self.entries.get(key.0).and_then(|e| e.partner)
    }

    /// Control-plane event history
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Format of the bound partner, used by the compliance gate
    fn partner_format(&self, key: StreamKey) -> Option<MilanFormat> {
        self.partner(key)
            .and_then(|p| self.entries.get(p.0))
            .map(|e| e.config.format())
    }

    /// Check a registered stream for Milan compliance
    ///
    /// Returns `false` for an unknown key.
    pub fn is_compliant(&self, key: StreamKey) -> bool {
        let Some(entry) = self.entries.get(key.0) else {
            return false;
        };
        let partner_format = self.partner_format(key);
        compliance::is_compliant(&entry.config, partner_format.as_ref())
    }

    /// Enable a stream
    ///
    /// Allowed from any state; gated on compliance. On failure the stream
    /// moves to `Error` with error code 1.
    pub fn enable(&mut self, key: StreamKey) -> Result<(), MilanError> {
        let compliant = self.is_compliant(key);
        let entry = self
            .entries
            .get_mut(key.0)
            .ok_or(MilanError::UnknownStream(key))?;
        if compliant {
            entry.config.state = StreamState::Enabled;
            tracing::info!(stream = %entry.config.stream_id(), "stream enabled");
            self.events.record(key, EventKind::Enabled);
            Ok(())
        } else {
            entry.config.state = StreamState::Error;
            entry.config.last_error = ERROR_ENABLE_FAILED;
            tracing::warn!(
                stream = %entry.config.stream_id(),
                "stream enable failed: not Milan compliant"
            );
            self.events.record(key, EventKind::EnableRejected);
            Err(MilanError::NonCompliant)
        }
    }

    /// Connect a stream
    ///
    /// Requires the stream to be `Enabled` and compliant. Any failure -
    /// including calling from `Disabled` or `Connected` - moves the stream
    /// to `Error` with error code 2.
    pub fn connect(&mut self, key: StreamKey) -> Result<(), MilanError> {
        let compliant = self.is_compliant(key);
        let entry = self
            .entries
            .get_mut(key.0)
            .ok_or(MilanError::UnknownStream(key))?;
        if entry.config.state == StreamState::Enabled && compliant {
            entry.config.state = StreamState::Connected;
            tracing::info!(stream = %entry.config.stream_id(), "stream connected");
            self.events.record(key, EventKind::Connected);
            Ok(())
        } else {
            entry.config.state = StreamState::Error;
            entry.config.last_error = ERROR_CONNECT_FAILED;
            tracing::warn!(stream = %entry.config.stream_id(), "stream connect failed");
            self.events.record(key, EventKind::ConnectRejected);
            Err(MilanError::NonCompliant)
        }
    }

    /// Disconnect a stream
    ///
    /// Only effective from `Connected` (back to `Enabled`); otherwise a
    /// silent no-op.
    pub fn disconnect(&mut self, key: StreamKey) {
        let Some(entry) = self.entries.get_mut(key.0) else {
            return;
        };
        if entry.config.state == StreamState::Connected {
            entry.config.state = StreamState::Enabled;
            tracing::info!(stream = %entry.config.stream_id(), "stream disconnected");
            self.events.record(key, EventKind::Disconnected);
        }
    }

    /// Disable a stream unconditionally
    ///
    /// Resets to `Disabled` from any state. Counters, the last error code
    /// and the partner binding are retained.
    pub fn disable(&mut self, key: StreamKey) {
        let Some(entry) = self.entries.get_mut(key.0) else {
            return;
        };
        entry.config.state = StreamState::Disabled;
        tracing::info!(stream = %entry.config.stream_id(), "stream disabled");
        self.events.record(key, EventKind::Disabled);
    }

    /// Force a stream into the `Error` state with a caller-supplied code
    ///
    /// Hook for external fault detection.
    pub fn report_error(&mut self, key: StreamKey, code: u32) {
        let Some(entry) = self.entries.get_mut(key.0) else {
            return;
        };
        entry.config.state = StreamState::Error;
        entry.config.last_error = code;
        tracing::warn!(stream = %entry.config.stream_id(), code, "stream error reported");
        self.events.record(key, EventKind::ErrorReported(code));
    }

    /// Bind two streams as a redundant pair
    ///
    /// Succeeds only if `primary` has the `Primary` role and `secondary`
    /// the `Secondary` role; on success the relation is symmetric.
    /// Re-binding overwrites an existing relation without validating the
    /// previous partner. On rejection no relation is touched.
    pub fn bind(&mut self, primary: StreamKey, secondary: StreamKey) -> Result<(), MilanError> {
        let primary_role = self
            .config(primary)
            .ok_or(MilanError::UnknownStream(primary))?
            .role();
        let secondary_role = self
            .config(secondary)
            .ok_or(MilanError::UnknownStream(secondary))?
            .role();
        if primary_role != RedundancyRole::Primary || secondary_role != RedundancyRole::Secondary {
            tracing::warn!(
                primary = ?primary_role,
                secondary = ?secondary_role,
                "redundancy binding rejected"
            );
            return Err(MilanError::BindingRejected);
        }
        if let Some(entry) = self.entries.get_mut(primary.0) {
            entry.partner = Some(secondary);
        }
        if let Some(entry) = self.entries.get_mut(secondary.0) {
            entry.partner = Some(primary);
        }
        tracing::info!(
            primary = primary.index(),
            secondary = secondary.index(),
            "redundant pair bound"
        );
        self.events.record(primary, EventKind::PairBound);
        Ok(())
    }

    /// Increment the sent-packet counter (transport hook)
    pub(crate) fn record_sent(&mut self, key: StreamKey) {
        if let Some(entry) = self.entries.get_mut(key.0) {
            entry.config.packets_sent += 1;
        }
    }

    /// Increment the received-packet counter (transport hook)
    pub(crate) fn record_received(&mut self, key: StreamKey) {
        if let Some(entry) = self.entries.get_mut(key.0) {
            entry.config.packets_received += 1;
        }
    }
}
