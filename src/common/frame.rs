//! Shared protect/forward/check engine.
//!
//! Every profile follows the same state machine over a prepended header;
//! only the byte-level wire policy differs. [`WireFormat`] captures that
//! policy (header size, counter range, CRC input ordering and header
//! serialization) and [`ProfileCore`] runs the common engine on top of it.

use crate::common::counter;
use crate::{CheckStatus, E2EError, E2EResult};

/// Byte-level policy of one E2E profile.
///
/// Implementations are stateless views over the profile configuration; all
/// mutable state (the two counters) lives in [`ProfileCore`].
pub(crate) trait WireFormat {
    /// CRC register type of this profile.
    type Crc: Copy + Eq;

    /// Header length in bytes, prepended to the payload.
    const HEADER_LENGTH: usize;
    /// Highest counter value before the wrap to zero.
    const COUNTER_MAX: u8;

    /// Build the transmitted counter/control byte for a counter value.
    fn counter_byte(&self, counter: u8) -> u8;

    /// Compute the CRC over the profile-defined input order. During check
    /// the counter byte is the one extracted from the wire, so any
    /// tampering with it surfaces as a CRC mismatch.
    fn compute_crc(&self, counter_byte: u8, payload: &[u8]) -> Self::Crc;

    /// Serialize the header (CRC bytes first) into `frame`.
    fn write_header(&self, crc: Self::Crc, counter_byte: u8, frame: &mut Vec<u8>);

    /// Extract the embedded CRC from a received frame.
    fn read_crc(&self, frame: &[u8]) -> Self::Crc;

    /// Extract the counter/control byte from a received frame.
    fn read_counter_byte(&self, frame: &[u8]) -> u8;

    /// Verify header bytes that are neither CRC nor counter (for example
    /// Profile 04's transmitted DataID low byte). Defaults to accepting.
    fn header_matches(&self, _frame: &[u8]) -> bool {
        true
    }
}

/// Counter state machine running on top of a [`WireFormat`] policy.
pub(crate) struct ProfileCore<F: WireFormat> {
    wire: F,
    max_delta_counter: u8,
    protecting_counter: u8,
    checking_counter: u8,
}

impl<F: WireFormat> ProfileCore<F> {
    pub(crate) fn new(wire: F, max_delta_counter: u8) -> Self {
        Self {
            wire,
            max_delta_counter,
            protecting_counter: 0,
            checking_counter: 0,
        }
    }

    fn build_frame(&self, counter: u8, payload: &[u8]) -> Vec<u8> {
        let counter_byte = self.wire.counter_byte(counter);
        let crc = self.wire.compute_crc(counter_byte, payload);
        let mut frame = Vec::with_capacity(F::HEADER_LENGTH + payload.len());
        self.wire.write_header(crc, counter_byte, &mut frame);
        frame.extend_from_slice(payload);
        frame
    }

    pub(crate) fn try_protect(&mut self, unprotected: &[u8]) -> E2EResult<Vec<u8>> {
        if unprotected.is_empty() {
            return Err(E2EError::EmptyPayload);
        }

        // Increment before use: the first frame carries counter 1.
        self.protecting_counter = counter::next(self.protecting_counter, F::COUNTER_MAX);
        Ok(self.build_frame(self.protecting_counter, unprotected))
    }

    pub(crate) fn try_forward(&mut self, unprotected: &[u8]) -> E2EResult<Vec<u8>> {
        if unprotected.is_empty() {
            return Err(E2EError::EmptyPayload);
        }

        let frame = self.build_frame(self.checking_counter, unprotected);
        // A forwarding node continues the sequence from the last checked
        // counter rather than from its own protect history.
        self.protecting_counter = self.checking_counter;
        Ok(frame)
    }

    pub(crate) fn check(&mut self, protected: &[u8]) -> CheckStatus {
        // Minimum: full header plus at least one payload byte.
        if protected.len() < F::HEADER_LENGTH + 1 {
            return CheckStatus::NoNewData;
        }

        let received_crc = self.wire.read_crc(protected);
        let counter_byte = self.wire.read_counter_byte(protected);
        let payload = &protected[F::HEADER_LENGTH..];

        let computed_crc = self.wire.compute_crc(counter_byte, payload);
        let received_counter = counter_byte & 0x0F;

        let status = if computed_crc != received_crc || !self.wire.header_matches(protected) {
            CheckStatus::WrongCrc
        } else {
            counter::classify(received_counter, self.checking_counter, self.max_delta_counter)
        };

        // The baseline follows the received counter on every outcome,
        // including rejected frames (AUTOSAR-mandated; see crate docs).
        self.checking_counter = received_counter;
        status
    }
}
