//! # E2E Profile 05 Implementation
//!
//! Profile 05 is the middle ground between Profile 01 and Profile 04. It
//! uses:
//! - 16-bit CRC (polynomial 0x8005, reflected, initial value 0xFFFF)
//! - 4-bit counter for sequence checking (0-15)
//! - 16-bit Data ID mixed into the CRC
//!
//! # Frame layout
//! [CRC16 LE (2B) | COUNTER(1B) | payload ...]
//!
//! The CRC covers, in order: Data ID high byte, Data ID low byte, the
//! counter byte, then the payload. No final XOR.

use std::sync::OnceLock;

use crate::common::counter;
use crate::common::crc::CrcEngine;
use crate::common::frame::{ProfileCore, WireFormat};
use crate::{CheckStatus, E2EProfile, E2EResult};

const NIBBLE_MASK: u8 = 0x0F;
const COUNTER_MAX: u8 = 0x0F;
/// Polynomial 0x8005, reflected for LSB-first stepping.
const CRC_POLY_REFLECTED: u16 = 0xA001;
const CRC_INIT: u16 = 0xFFFF;
const CRC_XOR_OUT: u16 = 0x0000;

static CRC16: OnceLock<CrcEngine<u16>> = OnceLock::new();

fn crc16() -> &'static CrcEngine<u16> {
    CRC16.get_or_init(|| CrcEngine::new(CRC_POLY_REFLECTED, true, CRC_INIT, CRC_XOR_OUT))
}

/// Configuration for E2E Profile 05
#[derive(Debug, Clone)]
pub struct Profile05Config {
    /// 16-bit identifier of the protected data element
    pub data_id: u16,
    /// Maximum allowed counter jump between consecutive valid frames
    pub max_delta_counter: u8,
}

impl Default for Profile05Config {
    fn default() -> Self {
        Self {
            data_id: 0x0000,
            max_delta_counter: 1,
        }
    }
}

struct Profile05Wire {
    data_id: u16,
}

impl WireFormat for Profile05Wire {
    type Crc = u16;

    const HEADER_LENGTH: usize = 3;
    const COUNTER_MAX: u8 = COUNTER_MAX;

    fn counter_byte(&self, counter: u8) -> u8 {
        counter & NIBBLE_MASK
    }

    fn compute_crc(&self, counter_byte: u8, payload: &[u8]) -> u16 {
        let engine = crc16();
        let mut crc = engine.start();
        crc = engine.step(crc, (self.data_id >> 8) as u8);
        crc = engine.step(crc, (self.data_id & 0xFF) as u8);
        crc = engine.step(crc, counter_byte);
        crc = engine.update(crc, payload);
        engine.finish(crc)
    }

    fn write_header(&self, crc: u16, counter_byte: u8, frame: &mut Vec<u8>) {
        frame.extend_from_slice(&crc.to_le_bytes());
        frame.push(counter_byte);
    }

    fn read_crc(&self, frame: &[u8]) -> u16 {
        u16::from_le_bytes([frame[0], frame[1]])
    }

    fn read_counter_byte(&self, frame: &[u8]) -> u8 {
        frame[2]
    }
}

/// E2E Profile 05 Implementation
///
/// Implements the AUTOSAR E2E Profile 05 protection mechanism with a
/// 3-byte prepended header.
pub struct Profile05 {
    core: ProfileCore<Profile05Wire>,
}

impl E2EProfile for Profile05 {
    type Config = Profile05Config;

    fn new(config: Self::Config) -> E2EResult<Self> {
        counter::validate_max_delta(config.max_delta_counter, COUNTER_MAX)?;
        Ok(Self {
            core: ProfileCore::new(
                Profile05Wire {
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
