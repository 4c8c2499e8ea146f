//! Sequence counter arithmetic shared by all profiles.
//!
//! Counters occupy the low nibble of the transmitted counter/control byte
//! and wrap at a profile-specific maximum (14 or 15). Delta classification
//! deliberately uses signed 8-bit truncation rather than modulo-N distance;
//! behavior near the wrap boundary depends on it.

use crate::{CheckStatus, E2EError, E2EResult};

/// Next counter value, wrapping after `counter_max`.
pub(crate) fn next(current: u8, counter_max: u8) -> u8 {
    if current < counter_max {
        current + 1
    } else {
        0
    }
}

/// Classify a received counter against the current baseline.
///
/// The delta is the signed 8-bit difference `received - checking`: zero is
/// a duplicate, negative means the counter went backward, anything beyond
/// `max_delta` means too many frames were lost.
pub(crate) fn classify(received: u8, checking: u8, max_delta: u8) -> CheckStatus {
    let delta = received.wrapping_sub(checking) as i8;

    if delta == 0 {
        CheckStatus::Repeated
    } else if delta < 0 {
        CheckStatus::WrongSequence
    } else if delta > max_delta as i8 {
        CheckStatus::WrongSequence
    } else {
        CheckStatus::Ok
    }
}

/// Validate a configured `max_delta_counter` against the profile's counter
/// range.
pub(crate) fn validate_max_delta(max_delta: u8, counter_max: u8) -> E2EResult<()> {
    if max_delta == 0 || max_delta > counter_max {
        return Err(E2EError::InvalidConfiguration(format!(
            "Max delta counter must be between 1 and {}",
            counter_max
        )));
    }
    Ok(())
}
