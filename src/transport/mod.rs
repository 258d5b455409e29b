//! Media data plane
//!
//! Generic payload transport over the Milan control plane:
//! - One buffer-backed stream for both AAF and CRF payloads ([`media`])
//! - Mirrored transmission on a bound redundant pair ([`pair`])

pub mod media;
pub mod pair;
