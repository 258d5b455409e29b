//! Milan control plane
//!
//! This module contains the Milan stream configuration entity and the
//! machinery around it:
//! - Identifiers, formats, roles and states ([`stream`])
//! - Pure profile compliance checking ([`compliance`])
//! - The owning registry, state machine and redundancy binding ([`registry`])

pub mod compliance;
pub mod registry;
pub mod stream;
