//! # E2E Profile 02 Implementation
//!
//! Profile 02 extends the CRC-8 family with a stronger polynomial and an
//! explicit Data ID byte on the wire. It uses:
//! - 8-bit CRC (CRC-8H2F, polynomial 0x2F) for data integrity
//! - 4-bit counter for sequence checking (0-15)
//! - 16-bit Data ID: bits [15:12] and the low byte transmitted explicitly
//!
//! # Frame layout
//! [CRC(1B) | CTRL(1B) | DATA_ID_LOW(1B) | payload ...]
//! - CTRL (bits 7..4): Data ID bits [15:12]
//! - CTRL (bits 3..0): counter
//!
//! The CRC covers, in order: Data ID high byte, Data ID low byte, the
//! control byte, the Data ID low byte from the header, then the payload.
//! Initial value 0xFF, final XOR 0xFF.

use std::sync::OnceLock;

use crate::common::counter;
use crate::common::crc::CrcEngine;
use crate::common::frame::{ProfileCore, WireFormat};
use crate::{CheckStatus, E2EProfile, E2EResult};

const NIBBLE_MASK: u8 = 0x0F;
const COUNTER_MAX: u8 = 0x0F;
const CRC_POLY: u8 = 0x2F; // CRC-8H2F
const CRC_INIT: u8 = 0xFF;
const CRC_XOR_OUT: u8 = 0xFF;

static CRC8: OnceLock<CrcEngine<u8>> = OnceLock::new();

fn crc8() -> &'static CrcEngine<u8> {
    CRC8.get_or_init(|| CrcEngine::new(CRC_POLY, false, CRC_INIT, CRC_XOR_OUT))
}

/// Configuration for E2E Profile 02
#[derive(Debug, Clone)]
pub struct Profile02Config {
    /// 16-bit identifier of the protected data element
    pub data_id: u16,
    /// Maximum allowed counter jump between consecutive valid frames
    pub max_delta_counter: u8,
}

impl Default for Profile02Config {
    fn default() -> Self {
        Self {
            data_id: 0x0000,
            max_delta_counter: 1,
        }
    }
}

struct Profile02Wire {
    data_id: u16,
}

impl WireFormat for Profile02Wire {
    type Crc = u8;

    const HEADER_LENGTH: usize = 3;
    const COUNTER_MAX: u8 = COUNTER_MAX;

    fn counter_byte(&self, counter: u8) -> u8 {
        let data_id_nibble = ((self.data_id >> 12) as u8) << 4;
        data_id_nibble | (counter & NIBBLE_MASK)
    }

    fn compute_crc(&self, counter_byte: u8, payload: &[u8]) -> u8 {
        let engine = crc8();
        let data_id_low = (self.data_id & 0xFF) as u8;
        let mut crc = engine.start();
        crc = engine.step(crc, (self.data_id >> 8) as u8);
        crc = engine.step(crc, data_id_low);
        crc = engine.step(crc, counter_byte);
        // Second header byte, matching its spot on the wire
        crc = engine.step(crc, data_id_low);
        crc = engine.update(crc, payload);
        engine.finish(crc)
    }

    fn write_header(&self, crc: u8, counter_byte: u8, frame: &mut Vec<u8>) {
        frame.push(crc);
        frame.push(counter_byte);
        frame.push((self.data_id & 0xFF) as u8);
    }

    fn read_crc(&self, frame: &[u8]) -> u8 {
        frame[0]
    }

    fn read_counter_byte(&self, frame: &[u8]) -> u8 {
        frame[1]
    }

    fn header_matches(&self, frame: &[u8]) -> bool {
        // The CRC is recomputed with the configured DataID low byte, so
        // the transmitted one has to be compared explicitly.
        frame[2] == (self.data_id & 0xFF) as u8
    }
}

/// E2E Profile 02 Implementation
///
/// Implements the AUTOSAR E2E Profile 02 protection mechanism with a
/// 3-byte prepended header.
pub struct Profile02 {
    core: ProfileCore<Profile02Wire>,
}

impl E2EProfile for Profile02 {
    type Config = Profile02Config;

    fn new(config: Self::Config) -> E2EResult<Self> {
        counter::validate_max_delta(config.max_delta_counter, COUNTER_MAX)?;
        Ok(Self {
            core: ProfileCore::new(
                Profile02Wire {
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
