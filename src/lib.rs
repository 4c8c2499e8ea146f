//! # AUTOSAR E2E Protection Profiles
//!
//! This library implements the AUTOSAR E2E (End-to-End) communication
//! protection profiles 01, 02, 04, 05 and 11.
//!
//! ## Overview
//!
//! Each profile wraps a payload with a small header carrying a rolling
//! sequence counter and a CRC computed over a profile-specific byte order.
//! On the receive side the same profile classifies incoming frames:
//! - Data corruption (via CRC)
//! - Message loss, duplication, or reordering (via sequence counter)
//! - Incorrect addressing (via Data ID mixed into the CRC)
//!
//! A caller picks exactly one profile per data element (per AUTOSAR DataID)
//! and owns one instance per direction: the sender side calls
//! [`E2EProfile::try_protect`], the receiver side calls
//! [`E2EProfile::check`], and a gateway relaying already-checked data calls
//! [`E2EProfile::try_forward`].
//!
//! ## Example
//!
//! ```rust
//! use e2e_protection::{CheckStatus, E2EProfile, E2EResult};
//! use e2e_protection::profile01::{Profile01, Profile01Config};
//!
//! # fn main() -> E2EResult<()> {
//! let config = Profile01Config {
//!     data_id: 0x1234,
//!     max_delta_counter: 1,
//! };
//!
//! let mut sender = Profile01::new(config.clone())?;
//! let mut receiver = Profile01::new(config)?;
//!
//! // Protect data: a 2-byte header is prepended to the payload
//! let frame = sender.try_protect(&[0xDE, 0xAD, 0xBE, 0xEF])?;
//!
//! // Check protected data on the receiving side
//! assert_eq!(receiver.check(&frame), CheckStatus::Ok);
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

mod common;
mod profiles;
pub use profiles::profile01;
pub use profiles::profile02;
pub use profiles::profile04;
pub use profiles::profile05;
pub use profiles::profile11;

/// Result type for E2E operations
pub type E2EResult<T> = Result<T, E2EError>;

/// Outcome of checking one received frame.
///
/// These are expected, frequent results of normal operation (duplicate
/// delivery, lost frames), not error conditions; `check` never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// CRC and counter checks passed; counter advanced within the allowed delta
    Ok,
    /// Counter identical to the previous frame - duplicate delivery
    Repeated,
    /// Counter went backward or jumped beyond the configured max delta
    WrongSequence,
    /// Computed CRC does not match the embedded CRC - data corruption
    WrongCrc,
    /// Input shorter than header plus one payload byte - nothing to check
    NoNewData,
}

/// E2E Error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum E2EError {
    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Protect/forward called with an empty payload
    #[error("Cannot protect an empty payload")]
    EmptyPayload,
}

/// Common interface implemented by every E2E profile.
///
/// Each profile provides three operations:
/// - `try_protect`: build a protected frame for outgoing data
/// - `try_forward`: rebuild a frame with the last checked counter (gateway)
/// - `check`: verify a received frame
pub trait E2EProfile {
    /// Configuration type for this profile
    type Config;

    /// Create a new instance with the given configuration
    ///
    /// # Errors
    /// Returns `E2EError::InvalidConfiguration` if the configuration is invalid
    fn new(config: Self::Config) -> E2EResult<Self>
    where
        Self: Sized;

    /// Increment the protecting counter and prepend the profile header
    /// (CRC + counter/control bytes) to `unprotected`.
    ///
    /// The counter is incremented before use, so the first call after
    /// construction emits counter value 1.
    ///
    /// # Errors
    /// Returns `E2EError::EmptyPayload` for an empty payload; no state is
    /// mutated in that case.
    fn try_protect(&mut self, unprotected: &[u8]) -> E2EResult<Vec<u8>>;

    /// Build a protected frame carrying the counter of the last frame seen
    /// by [`E2EProfile::check`], without incrementing it.
    ///
    /// This supports the gateway use case: a node relays data whose
    /// freshness was already validated instead of starting a new sequence.
    /// As a side effect the protecting counter is re-synced to the checking
    /// counter, so a subsequent `try_protect` continues from that point.
    ///
    /// # Errors
    /// Returns `E2EError::EmptyPayload` for an empty payload; no state is
    /// mutated in that case.
    fn try_forward(&mut self, unprotected: &[u8]) -> E2EResult<Vec<u8>>;

    /// Verify a received frame and classify it.
    ///
    /// The checking counter baseline is updated to the received counter on
    /// every outcome except [`CheckStatus::NoNewData`], including
    /// [`CheckStatus::WrongCrc`] and [`CheckStatus::WrongSequence`]. A
    /// corrupted frame therefore advances the baseline for the next
    /// comparison; callers deciding on resync policy must account for this.
    fn check(&mut self, protected: &[u8]) -> CheckStatus;
}
