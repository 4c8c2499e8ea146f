//! # E2E Profile 01 Implementation
//!
//! Profile 01 protects small data packets with minimal overhead. It uses:
//! - 8-bit CRC (SAE-J1850, polynomial 0x1D) for data integrity
//! - 4-bit counter for sequence checking (0-14)
//! - 16-bit Data ID mixed into the CRC for addressing verification
//!
//! # Frame layout
//! [CRC(1B) | CTRL(1B) | payload ...]
//! - CTRL (bits 7..4): Data ID bits [15:12]
//! - CTRL (bits 3..0): counter
//!
//! The CRC covers, in order: Data ID high byte, Data ID low byte, the
//! control byte, then the payload. Initial value 0xFF, final XOR 0xFF.

use std::sync::OnceLock;

use crate::common::counter;
use crate::common::crc::CrcEngine;
use crate::common::frame::{ProfileCore, WireFormat};
use crate::{CheckStatus, E2EProfile, E2EResult};

const NIBBLE_MASK: u8 = 0x0F;
const COUNTER_MAX: u8 = 0x0E;
const CRC_POLY: u8 = 0x1D; // SAE-J1850
const CRC_INIT: u8 = 0xFF;
const CRC_XOR_OUT: u8 = 0xFF;

static CRC8: OnceLock<CrcEngine<u8>> = OnceLock::new();

fn crc8() -> &'static CrcEngine<u8> {
    CRC8.get_or_init(|| CrcEngine::new(CRC_POLY, false, CRC_INIT, CRC_XOR_OUT))
}

/// Configuration for E2E Profile 01
#[derive(Debug, Clone)]
pub struct Profile01Config {
    /// 16-bit identifier of the protected data element
    pub data_id: u16,
    /// Maximum allowed counter jump between consecutive valid frames
    pub max_delta_counter: u8,
}

impl Default for Profile01Config {
    fn default() -> Self {
        Self {
            data_id: 0x0000,
            max_delta_counter: 1,
        }
    }
}

struct Profile01Wire {
    data_id: u16,
}

impl WireFormat for Profile01Wire {
    type Crc = u8;

    const HEADER_LENGTH: usize = 2;
    const COUNTER_MAX: u8 = COUNTER_MAX;

    fn counter_byte(&self, counter: u8) -> u8 {
        let data_id_nibble = ((self.data_id & 0xF000) >> 8) as u8;
        data_id_nibble | (counter & NIBBLE_MASK)
    }

    fn compute_crc(&self, counter_byte: u8, payload: &[u8]) -> u8 {
        let engine = crc8();
        let mut crc = engine.start();
        crc = engine.step(crc, (self.data_id >> 8) as u8);
        crc = engine.step(crc, (self.data_id & 0xFF) as u8);
        crc = engine.step(crc, counter_byte);
        crc = engine.update(crc, payload);
        engine.finish(crc)
    }

    fn write_header(&self, crc: u8, counter_byte: u8, frame: &mut Vec<u8>) {
        frame.push(crc);
        frame.push(counter_byte);
    }

    fn read_crc(&self, frame: &[u8]) -> u8 {
        frame[0]
    }

    fn read_counter_byte(&self, frame: &[u8]) -> u8 {
        frame[1]
    }
}

/// E2E Profile 01 Implementation
///
/// Implements the AUTOSAR E2E Profile 01 protection mechanism with a
/// 2-byte prepended header.
pub struct Profile01 {
    core: ProfileCore<Profile01Wire>,
}

impl E2EProfile for Profile01 {
    type Config = Profile01Config;

    fn new(config: Self::Config) -> E2EResult<Self> {
        counter::validate_max_delta(config.max_delta_counter, COUNTER_MAX)?;
        Ok(Self {
            core: ProfileCore::new(
                Profile01Wire {
                    data_id: config.data_id,
                },
                config.max_delta_counter,
            ),
        })
    }

    fn try_protect(&mut self, unprotected: &[u8]) -> E2EResult<Vec<u8>> {
        self.core.try_protect(unprotected)
    }

    fn try_forward(&mut self, unprotected: &[u8]) -> E2EResult<Vec<u8>> {
        self.core.try_forward(unprotected)
    }

    fn check(&mut self, protected: &[u8]) -> CheckStatus {
        self.core.check(protected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: [u8; 4] = [0x12, 0x34, 0x56, 0x78];

    fn pair() -> (Profile01, Profile01) {
        let config = Profile01Config::default();
        (
            Profile01::new(config.clone()).unwrap(),
            Profile01::new(config).unwrap(),
        )
    }

    #[test]
    fn test_profile01_protect_example() {
        let (mut tx, mut rx) = pair();

        let frame = tx.try_protect(&PAYLOAD).unwrap();
        assert_eq!(frame, vec![0x16, 0x01, 0x12, 0x34, 0x56, 0x78]);
        assert_eq!(rx.check(&frame), CheckStatus::Ok);

        let frame = tx.try_protect(&PAYLOAD).unwrap();
        assert_eq!(frame, vec![0xa8, 0x02, 0x12, 0x34, 0x56, 0x78]);
        assert_eq!(rx.check(&frame), CheckStatus::Ok);
    }

    #[test]
    fn test_profile01_first_exchange_ok_for_any_payload() {
        let (mut tx, mut rx) = pair();
        let frame = tx.try_protect(&[0xAA]).unwrap();
        assert_eq!(frame, vec![0x66, 0x01, 0xAA]);
        assert_eq!(rx.check(&frame), CheckStatus::Ok);
    }

    #[test]
    fn test_profile01_data_id_in_header_and_crc() {
        let config = Profile01Config {
            data_id: 0x1234,
            max_delta_counter: 1,
        };
        let mut tx = Profile01::new(config).unwrap();

        let frame = tx.try_protect(&PAYLOAD).unwrap();
        // Data ID bits [15:12] land in the control byte's high nibble
        assert_eq!(frame[..2], [0xc2, 0x11]);

        // A checker configured for a different Data ID must reject the frame
        let mut other = Profile01::new(Profile01Config::default()).unwrap();
        assert_eq!(other.check(&frame), CheckStatus::WrongCrc);
    }

    #[test]
    fn test_profile01_empty_payload_rejected() {
        let (mut tx, _) = pair();
        assert!(tx.try_protect(&[]).is_err());
        assert!(tx.try_forward(&[]).is_err());
        // A rejected protect must not advance the counter
        let frame = tx.try_protect(&PAYLOAD).unwrap();
        assert_eq!(frame[1] & 0x0F, 1);
    }

    #[test]
    fn test_profile01_short_input_is_no_new_data() {
        let (mut tx, mut rx) = pair();
        let frame = tx.try_protect(&PAYLOAD).unwrap();

        assert_eq!(rx.check(&[]), CheckStatus::NoNewData);
        // A bare header with no payload byte never parses
        assert_eq!(rx.check(&frame[..2]), CheckStatus::NoNewData);
    }

    #[test]
    fn test_profile01_tampering_detected() {
        for position in 0..PAYLOAD.len() + 2 {
            let (mut tx, mut rx) = pair();
            let mut frame = tx.try_protect(&PAYLOAD).unwrap();
            frame[position] ^= 0x40;
            assert_eq!(rx.check(&frame), CheckStatus::WrongCrc, "byte {}", position);
        }
    }

    #[test]
    fn test_profile01_counter_wraparound() {
        let (mut tx, _) = pair();
        for expected in 1..=COUNTER_MAX {
            let frame = tx.try_protect(&PAYLOAD).unwrap();
            assert_eq!(frame[1] & 0x0F, expected);
        }
        let frame = tx.try_protect(&PAYLOAD).unwrap();
        assert_eq!(frame[1] & 0x0F, 0x00);
    }

    #[test]
    fn test_profile01_repeated_frame() {
        let (mut tx, mut rx) = pair();
        let frame = tx.try_protect(&PAYLOAD).unwrap();
        assert_eq!(rx.check(&frame), CheckStatus::Ok);
        assert_eq!(rx.check(&frame), CheckStatus::Repeated);
    }

    #[test]
    fn test_profile01_wrong_sequence_on_lost_frames() {
        let (mut tx, mut rx) = pair();
        let frame1 = tx.try_protect(&PAYLOAD).unwrap();
        let _frame2 = tx.try_protect(&PAYLOAD).unwrap();
        let frame3 = tx.try_protect(&PAYLOAD).unwrap();

        assert_eq!(rx.check(&frame1), CheckStatus::Ok);
        // frame2 lost: delta 2 exceeds max_delta_counter 1
        assert_eq!(rx.check(&frame3), CheckStatus::WrongSequence);
    }

    #[test]
    fn test_profile01_delta_within_tolerance() {
        let config = Profile01Config {
            data_id: 0x0000,
            max_delta_counter: 3,
        };
        let mut tx = Profile01::new(config.clone()).unwrap();
        let mut rx = Profile01::new(config).unwrap();

        let frame1 = tx.try_protect(&PAYLOAD).unwrap();
        let _lost = tx.try_protect(&PAYLOAD).unwrap();
        let frame3 = tx.try_protect(&PAYLOAD).unwrap();

        assert_eq!(rx.check(&frame1), CheckStatus::Ok);
        assert_eq!(rx.check(&frame3), CheckStatus::Ok);
    }

    #[test]
    fn test_profile01_backward_counter() {
        let (mut tx, mut rx) = pair();
        let frame1 = tx.try_protect(&PAYLOAD).unwrap();
        let frame2 = tx.try_protect(&PAYLOAD).unwrap();

        assert_eq!(rx.check(&frame1), CheckStatus::Ok);
        assert_eq!(rx.check(&frame2), CheckStatus::Ok);
        // Re-delivery of the older frame: counter went backward
        assert_eq!(rx.check(&frame1), CheckStatus::WrongSequence);
    }

    #[test]
    fn test_profile01_baseline_advances_on_wrong_crc() {
        let mut rx = Profile01::new(Profile01Config::default()).unwrap();

        // Counter 5 with a bogus CRC: rejected, but the baseline moves to 5
        let mut bad = vec![0x00, 0x05];
        bad.extend_from_slice(&PAYLOAD);
        assert_eq!(rx.check(&bad), CheckStatus::WrongCrc);

        // A valid counter-6 frame is now in sequence (delta 1)
        let mut good = vec![0x1d, 0x06];
        good.extend_from_slice(&PAYLOAD);
        assert_eq!(rx.check(&good), CheckStatus::Ok);
    }

    #[test]
    fn test_profile01_forward_resync() {
        let (mut sender, mut gateway) = pair();

        let frame = sender.try_protect(&PAYLOAD).unwrap();
        assert_eq!(gateway.check(&frame), CheckStatus::Ok);

        // Forward reuses the checked counter instead of a new one
        let forwarded = gateway.try_forward(&PAYLOAD).unwrap();
        assert_eq!(forwarded[1] & 0x0F, frame[1] & 0x0F);

        let mut receiver = Profile01::new(Profile01Config::default()).unwrap();
        assert_eq!(receiver.check(&forwarded), CheckStatus::Ok);

        // Protect continues the sequence from the forwarded counter
        let next = gateway.try_protect(&PAYLOAD).unwrap();
        assert_eq!(next[1] & 0x0F, (forwarded[1] & 0x0F) + 1);
    }

    #[test]
    fn test_profile01_invalid_config() {
        let config = Profile01Config {
            data_id: 0x0000,
            max_delta_counter: 0,
        };
        assert!(Profile01::new(config).is_err());

        let config = Profile01Config {
            data_id: 0x0000,
            max_delta_counter: COUNTER_MAX + 1,
        };
        assert!(Profile01::new(config).is_err());
    }
}
