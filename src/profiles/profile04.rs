//! # E2E Profile 04 Implementation
//!
//! Profile 04 protects larger payloads where an 8- or 16-bit CRC no longer
//! provides sufficient Hamming distance. It uses:
//! - 32-bit CRC (CRC-32/AUTOSAR, polynomial 0xF4ACFB13, reflected)
//! - 4-bit counter for sequence checking (0-14)
//! - 16-bit Data ID mixed into the CRC; low byte also transmitted
//!
//! # Frame layout
//! [CRC32 LE (4B) | COUNTER(1B) | DATA_ID_LOW(1B) | payload ...]
//!
//! The CRC covers, in order: Data ID high byte, Data ID low byte, the
//! counter byte, the Data ID low byte again, then the payload. Initial
//! value 0xFFFFFFFF, final XOR 0xFFFFFFFF.

use std::sync::OnceLock;

use crate::common::counter;
use crate::common::crc::CrcEngine;
use crate::common::frame::{ProfileCore, WireFormat};
use crate::{CheckStatus, E2EProfile, E2EResult};

const NIBBLE_MASK: u8 = 0x0F;
const COUNTER_MAX: u8 = 0x0E;
/// CRC-32/AUTOSAR polynomial 0xF4ACFB13, reflected for LSB-first stepping.
const CRC_POLY_REFLECTED: u32 = 0xC8DF352F;
const CRC_INIT: u32 = 0xFFFF_FFFF;
const CRC_XOR_OUT: u32 = 0xFFFF_FFFF;

static CRC32: OnceLock<CrcEngine<u32>> = OnceLock::new();

fn crc32() -> &'static CrcEngine<u32> {
    CRC32.get_or_init(|| CrcEngine::new(CRC_POLY_REFLECTED, true, CRC_INIT, CRC_XOR_OUT))
}

/// Configuration for E2E Profile 04
#[derive(Debug, Clone)]
pub struct Profile04Config {
    /// 16-bit identifier of the protected data element
    pub data_id: u16,
    /// Maximum allowed counter jump between consecutive valid frames
    pub max_delta_counter: u8,
}

impl Default for Profile04Config {
    fn default() -> Self {
        Self {
            data_id: 0x0000,
            max_delta_counter: 1,
        }
    }
}

struct Profile04Wire {
    data_id: u16,
}

impl WireFormat for Profile04Wire {
    type Crc = u32;

    const HEADER_LENGTH: usize = 6;
    const COUNTER_MAX: u8 = COUNTER_MAX;

    fn counter_byte(&self, counter: u8) -> u8 {
        counter & NIBBLE_MASK
    }

    fn compute_crc(&self, counter_byte: u8, payload: &[u8]) -> u32 {
        let engine = crc32();
        let data_id_low = (self.data_id & 0xFF) as u8;
        let mut crc = engine.start();
        crc = engine.step(crc, (self.data_id >> 8) as u8);
        crc = engine.step(crc, data_id_low);
        crc = engine.step(crc, counter_byte);
        // DataID low byte covered a second time, matching its spot in the header
        crc = engine.step(crc, data_id_low);
        crc = engine.update(crc, payload);
        engine.finish(crc)
    }

    fn write_header(&self, crc: u32, counter_byte: u8, frame: &mut Vec<u8>) {
        frame.extend_from_slice(&crc.to_le_bytes());
        frame.push(counter_byte);
        frame.push((self.data_id & 0xFF) as u8);
    }

    fn read_crc(&self, frame: &[u8]) -> u32 {
        u32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]])
    }

    fn read_counter_byte(&self, frame: &[u8]) -> u8 {
        frame[4]
    }

    fn header_matches(&self, frame: &[u8]) -> bool {
        // The transmitted DataID low byte is not an input of the CRC
        // recomputation, so it has to be compared explicitly.
        frame[5] == (self.data_id & 0xFF) as u8
    }
}

/// E2E Profile 04 Implementation
///
/// Implements the AUTOSAR E2E Profile 04 protection mechanism with a
/// 6-byte prepended header.
pub struct Profile04 {
    core: ProfileCore<Profile04Wire>,
}

impl E2EProfile for Profile04 {
    type Config = Profile04Config;

    fn new(config: Self::Config) -> E2EResult<Self> {
        counter::validate_max_delta(config.max_delta_counter, COUNTER_MAX)?;
        Ok(Self {
            core: ProfileCore::new(
                Profile04Wire {
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
