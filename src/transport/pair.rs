//! Redundant pair transport
//!
//! [`RedundantPair`] owns both member streams of a Milan redundant pair
//! and is the only place mirrored transmission happens. This replaces the
//! aliased cross-stream mutation of a classic primary/secondary setup:
//! the pair object holds both buffers, the registry holds both configs,
//! and `send_on_primary` / `send_on_secondary` are the only mutators that
//! touch both sides.

use crate::milan::registry::{MilanError, StreamKey, StreamRegistry};
use crate::transport::media::{MediaStream, TransportError};

/// A bound primary/secondary pair of media streams
///
/// Construction goes through [`RedundantPair::bind`], so a pair only
/// exists once the registry accepted the role-checked binding.
#[derive(Debug)]
pub struct RedundantPair {
    primary: MediaStream,
    secondary: MediaStream,
}

impl RedundantPair {
    /// Bind two streams into a redundant pair
    ///
    /// Both streams must carry a Milan config key; the registry binding is
    /// performed here and must accept the (Primary, Secondary) roles. On
    /// rejection the streams are handed back untouched.
    pub fn bind(
        registry: &mut StreamRegistry,
        primary: MediaStream,
        secondary: MediaStream,
    ) -> Result<Self, (MediaStream, MediaStream, MilanError)> {
        let (Some(primary_key), Some(secondary_key)) = (primary.config(), secondary.config())
        else {
            return Err((primary, secondary, MilanError::BindingRejected));
        };
        match registry.bind(primary_key, secondary_key) {
            Ok(()) => Ok(Self { primary, secondary }),
            Err(e) => Err((primary, secondary, e)),
        }
    }

    /// The primary member stream
    pub fn primary(&self) -> &MediaStream {
        &self.primary
    }

    /// The secondary member stream
    pub fn secondary(&self) -> &MediaStream {
        &self.secondary
    }

    /// Dissolve the pair and hand both streams back
    ///
    /// The registry binding stays in place; there is no unbind operation.
    pub fn into_parts(self) -> (MediaStream, MediaStream) {
        (self.primary, self.secondary)
    }

    /// Send a payload on the primary, mirroring to the secondary
    pub fn send_on_primary(
        &mut self,
        registry: &mut StreamRegistry,
        payload: &[u8],
    ) -> Result<usize, TransportError> {
        Self::send_mirrored(&mut self.primary, &mut self.secondary, registry, payload)
    }

    /// Send a payload on the secondary, mirroring to the primary
    pub fn send_on_secondary(
        &mut self,
        registry: &mut StreamRegistry,
        payload: &[u8],
    ) -> Result<usize, TransportError> {
        Self::send_mirrored(&mut self.secondary, &mut self.primary, registry, payload)
    }

    /// Receive from the primary's buffer (no redundancy side effect)
    pub fn receive_on_primary(
        &mut self,
        registry: &mut StreamRegistry,
        out: &mut [u8],
    ) -> Result<usize, TransportError> {
        self.primary.receive(registry, out)
    }

    /// Receive from the secondary's buffer (no redundancy side effect)
    pub fn receive_on_secondary(
        &mut self,
        registry: &mut StreamRegistry,
        out: &mut [u8],
    ) -> Result<usize, TransportError> {
        self.secondary.receive(registry, out)
    }

    /// Gate on the sender, mirror to the partner, then commit the send
    ///
    /// The sender's full gate runs first so a failed send touches neither
    /// side. Mirroring copies the payload into the partner's buffer and
    /// bumps the partner config's sent counter; the partner's capacity is
    /// not re-checked (caller precondition: partner capacity >= sender's,
    /// the copy truncates if violated) and the partner's connection state
    /// is not consulted. A partner with its buffer detached is skipped
    /// entirely: no copy, no counter.
    fn send_mirrored(
        sender: &mut MediaStream,
        mirror: &mut MediaStream,
        registry: &mut StreamRegistry,
        payload: &[u8],
    ) -> Result<usize, TransportError> {
        sender.check_transfer(registry, payload.len())?;
        if let Some(partner_key) = Self::bound_partner(sender, registry) {
            if mirror.buffer().is_some() {
                mirror.copy_payload(payload);
                registry.record_sent(partner_key);
                tracing::debug!(
                    kind = mirror.kind().label(),
                    stream = mirror.id(),
                    bytes = payload.len(),
                    "redundant transmission to partner stream"
                );
            } else {
                tracing::warn!(
                    kind = mirror.kind().label(),
                    stream = mirror.id(),
                    "mirror skipped: partner stream has no buffer"
                );
            }
        }
        Ok(sender.commit_send(registry, payload))
    }

    /// Partner key of the sender's config, if the binding is still in place
    fn bound_partner(sender: &MediaStream, registry: &StreamRegistry) -> Option<StreamKey> {
        sender.config().and_then(|key| registry.partner(key))
    }
}
