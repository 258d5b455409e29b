//! Generic media stream transport
//!
//! One implementation carries both payload kinds - AAF audio samples and
//! CRF clock-reference packets - over an in-memory buffer hand-off. The
//! two kinds differ only in the metadata they report; gating and copy
//! semantics are identical.
//!
//! When a [`StreamKey`] is attached, every send and receive is gated on
//! the config being `Connected` and bumps its packet counters. Failures
//! are atomic: no bytes move and no counter changes on any error path.

use thiserror::Error;

use crate::milan::registry::{StreamKey, StreamRegistry};
use crate::milan::stream::StreamState;

/// Errors surfaced by the media transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Payload does not fit the destination buffer
    #[error("payload of {len} bytes exceeds buffer capacity {capacity}")]
    BufferOverflow { len: usize, capacity: usize },

    /// The attached Milan config is not in the `Connected` state
    #[error("stream is not connected")]
    NotConnected,

    /// No buffer attached, or the attached config key is stale
    #[error("transport is not initialized")]
    NotInitialized,
}

/// Payload kind carried by a media stream
///
/// The metadata exists for diagnostic reporting only; it does not change
/// transport behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// AAF PCM sample stream
    Audio {
        /// Sample rate in Hz
        sample_rate: u32,
        /// Channel count
        channels: u16,
        /// Sample bit depth
        bit_depth: u16,
    },
    /// CRF clock-reference stream
    ClockRef {
        /// Clock tick frequency in Hz
        tick_frequency: u32,
    },
}

impl PayloadKind {
    /// Short label used in diagnostics ("AAF" / "CRF")
    pub fn label(&self) -> &'static str {
        match self {
            PayloadKind::Audio { .. } => "AAF",
            PayloadKind::ClockRef { .. } => "CRF",
        }
    }
}

/// Buffer-backed media stream
///
/// The destination buffer is caller-provided; the stream never allocates
/// one on its own. The optional Milan config is shared through the
/// registry and referenced by key, never owned.
#[derive(Debug)]
pub struct MediaStream {
    id: u32,
    kind: PayloadKind,
    buffer: Option<Vec<u8>>,
    config: Option<StreamKey>,
}

impl MediaStream {
    /// Create a stream with no buffer and no Milan config
    pub fn new(id: u32, kind: PayloadKind) -> Self {
        Self {
            id,
            kind,
            buffer: None,
            config: None,
        }
    }

    /// Diagnostic stream id
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Payload kind and metadata
    pub fn kind(&self) -> PayloadKind {
        self.kind
    }

    /// Attached Milan config key, if any
    pub fn config(&self) -> Option<StreamKey> {
        self.config
    }

    /// Attach a Milan config by registry key
    pub fn bind_config(&mut self, key: StreamKey) {
        self.config = Some(key);
    }

    /// Attach a caller-provided destination buffer, replacing any previous one
    pub fn attach_buffer(&mut self, buffer: Vec<u8>) {
        self.buffer = Some(buffer);
    }

    /// Detach and return the destination buffer
    pub fn detach_buffer(&mut self) -> Option<Vec<u8>> {
        self.buffer.take()
    }

    /// Buffer capacity in bytes (0 if no buffer attached)
    pub fn capacity(&self) -> usize {
        self.buffer.as_ref().map(|b| b.len()).unwrap_or(0)
    }

    /// Read access to the destination buffer
    pub fn buffer(&self) -> Option<&[u8]> {
        self.buffer.as_deref()
    }

    /// Run the full send/receive gate without mutating anything
    ///
    /// Check order follows the wire contract: buffer presence, capacity,
    /// then connection state of the attached config.
    pub(crate) fn check_transfer(
        &self,
        registry: &StreamRegistry,
        len: usize,
    ) -> Result<(), TransportError> {
        let capacity = match &self.buffer {
            Some(buffer) => buffer.len(),
            None => return Err(TransportError::NotInitialized),
        };
        if len > capacity {
            return Err(TransportError::BufferOverflow { len, capacity });
        }
        if let Some(key) = self.config {
            let state = registry
                .config(key)
                .map(|c| c.state())
                .ok_or(TransportError::NotInitialized)?;
            if state != StreamState::Connected {
                tracing::warn!(
                    kind = self.kind.label(),
                    stream = self.id,
                    "transfer aborted: stream not connected"
                );
                return Err(TransportError::NotConnected);
            }
        }
        Ok(())
    }

    /// Copy a payload into the buffer without gating
    ///
    /// Used for redundant mirroring, where the sender's gate already
    /// passed and the partner capacity is a documented caller precondition
    /// (partner capacity >= sender capacity). Truncates if violated.
    pub(crate) fn copy_payload(&mut self, payload: &[u8]) {
        if let Some(buffer) = self.buffer.as_mut() {
            let n = payload.len().min(buffer.len());
            buffer[..n].copy_from_slice(&payload[..n]);
        }
    }

    /// Commit a gated send: copy the payload and bump the sent counter once
    ///
    /// Infallible; the gate must have passed already.
    pub(crate) fn commit_send(&mut self, registry: &mut StreamRegistry, payload: &[u8]) -> usize {
        if let Some(key) = self.config {
            registry.record_sent(key);
        }
        self.copy_payload(payload);
        tracing::debug!(
            kind = self.kind.label(),
            stream = self.id,
            bytes = payload.len(),
            milan = self.config.is_some(),
            "sent"
        );
        payload.len()
    }

    /// Send a payload into the stream buffer
    ///
    /// Returns the number of bytes written. If a Milan config is attached
    /// it must be `Connected`, and its sent counter is incremented by one.
    /// A standalone stream never mirrors to a redundant partner; mirrored
    /// transmission goes through
    /// [`RedundantPair`](crate::transport::pair::RedundantPair).
    pub fn send(
        &mut self,
        registry: &mut StreamRegistry,
        payload: &[u8],
    ) -> Result<usize, TransportError> {
        self.check_transfer(registry, payload.len())?;
        Ok(self.commit_send(registry, payload))
    }

    /// Receive up to `out.len()` bytes from the stream buffer
    ///
    /// Same gating as [`send`](Self::send) with `out.len()` as the length;
    /// increments the received counter. Never touches a redundant partner.
    pub fn receive(
        &mut self,
        registry: &mut StreamRegistry,
        out: &mut [u8],
    ) -> Result<usize, TransportError> {
        self.check_transfer(registry, out.len())?;
        if let Some(key) = self.config {
            registry.record_received(key);
        }
        if let Some(buffer) = self.buffer.as_ref() {
            out.copy_from_slice(&buffer[..out.len()]);
        }
        tracing::debug!(
            kind = self.kind.label(),
            stream = self.id,
            bytes = out.len(),
            milan = self.config.is_some(),
            "received"
        );
        Ok(out.len())
    }
}
