//! # E2E Profile 11 Implementation
//!
//! Profile 11 is the nibble variant of the CRC-8 family. It uses:
//! - 8-bit CRC (SAE-J1850, polynomial 0x1D) for data integrity
//! - 4-bit counter for sequence checking (0-14)
//! - Data ID bits [11:8] transmitted explicitly in the header
//!
//! # Frame layout
//! [CRC(1B) | CTRL(1B) | payload ...]
//! - CTRL (bits 7..4): Data ID bits [11:8] (low nibble of the high byte)
//! - CTRL (bits 3..0): counter
//!
//! Unlike Profile 01 the CRC covers only the control byte and the payload;
//! the Data ID participates solely through its transmitted nibble. Initial
//! value 0xFF, final XOR 0xFF.

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

/// Configuration for E2E Profile 11
#[derive(Debug, Clone)]
pub struct Profile11Config {
    /// 16-bit identifier; only bits [11:8] reach the wire
    pub data_id: u16,
    /// Maximum allowed counter jump between consecutive valid frames
    pub max_delta_counter: u8,
}

impl Default for Profile11Config {
    fn default() -> Self {
        Self {
            data_id: 0x0F00,
            // Lenient by default: any forward jump within the counter
            // range is accepted, only backward counters are rejected
            max_delta_counter: COUNTER_MAX,
        }
    }
}

struct Profile11Wire {
    data_id: u16,
}

impl WireFormat for Profile11Wire {
    type Crc = u8;

    const HEADER_LENGTH: usize = 2;
    const COUNTER_MAX: u8 = COUNTER_MAX;

    fn counter_byte(&self, counter: u8) -> u8 {
        let data_id_nibble = ((self.data_id >> 4) as u8) & 0xF0;
        data_id_nibble | (counter & NIBBLE_MASK)
    }

    fn compute_crc(&self, counter_byte: u8, payload: &[u8]) -> u8 {
        let engine = crc8();
        let mut crc = engine.start();
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

/// E2E Profile 11 Implementation
///
/// Implements the AUTOSAR E2E Profile 11 protection mechanism with a
/// 2-byte prepended header.
pub struct Profile11 {
    core: ProfileCore<Profile11Wire>,
}

impl E2EProfile for Profile11 {
    type Config = Profile11Config;

    fn new(config: Self::Config) -> E2EResult<Self> {
        counter::validate_max_delta(config.max_delta_counter, COUNTER_MAX)?;
        Ok(Self {
            core: ProfileCore::new(
                Profile11Wire {
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
