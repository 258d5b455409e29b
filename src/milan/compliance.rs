//! Milan profile compliance checking
//!
//! Pure, total functions with no side effects. A stream is compliant when
//! its format fields exactly match the fixed Milan base audio profile,
//! neither identifier contains a zero byte, and - when a redundant partner
//! is bound - the partner's format also matches the profile.
//!
//! The per-byte non-zero identifier rule is deliberate: a single zero byte
//! anywhere in an 8-byte identifier marks it unassigned.

use crate::milan::stream::{MilanFormat, MilanStreamConfig, RedundancyRole};

/// Check a format against the fixed Milan base audio profile
///
/// Exact match only; there is no partial or looser matching.
pub fn format_is_compliant(format: &MilanFormat) -> bool {
    *format == MilanFormat::default()
}

fn id_is_assigned(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b != 0)
}

/// Check a stream configuration for Milan compliance
///
/// `partner_format` is the format of the bound redundant partner, if any;
/// the registry resolves it from the partner relation. Partner identifiers
/// are not re-validated, only the partner's format.
pub fn is_compliant(cfg: &MilanStreamConfig, partner_format: Option<&MilanFormat>) -> bool {
    if !format_is_compliant(&cfg.format()) {
        return false;
    }
    if !id_is_assigned(cfg.entity_id().as_bytes()) || !id_is_assigned(cfg.stream_id().as_bytes()) {
        return false;
    }
    if cfg.role() != RedundancyRole::None {
        if let Some(partner) = partner_format {
            if !format_is_compliant(partner) {
                return false;
            }
        }
    }
    true
}
