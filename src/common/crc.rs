//! Table-driven CRC support shared by all profiles.
//!
//! One generic 256-entry table builder and step function cover every
//! polynomial/bit-order combination used by the profile family:
//! - MSB-first (non-reflected): Profile 01 and 11 (CRC-8, poly 0x1D)
//! - LSB-first (reflected): Profile 05 (CRC-16, poly 0xA001) and
//!   Profile 04 (CRC-32, poly 0xC8DF352F)
//!
//! Each profile publishes its engine through a `OnceLock`, so the table is
//! computed at most once per profile type and every thread observes a fully
//! built table.

/// Integer widths usable as a CRC register.
pub(crate) trait CrcWord: Copy + Eq {
    const ZERO: Self;

    /// Table index placed in the low byte (reflected table build).
    fn from_index(index: usize) -> Self;
    /// Table index placed in the top byte (MSB-first table build).
    fn from_index_msb(index: usize) -> Self;
    fn msb_set(self) -> bool;
    fn lsb_set(self) -> bool;
    fn shl1(self) -> Self;
    fn shr1(self) -> Self;
    /// Register shifted left by one byte (zero for u8).
    fn shl8(self) -> Self;
    /// Register shifted right by one byte (zero for u8).
    fn shr8(self) -> Self;
    fn low_byte(self) -> u8;
    fn top_byte(self) -> u8;
    fn xor(self, other: Self) -> Self;
}

macro_rules! impl_crc_word {
    ($ty:ty) => {
        impl CrcWord for $ty {
            const ZERO: Self = 0;

            fn from_index(index: usize) -> Self {
                index as $ty
            }
            fn from_index_msb(index: usize) -> Self {
                ((index as u64) << (<$ty>::BITS - 8)) as $ty
            }
            fn msb_set(self) -> bool {
                self & (1 << (<$ty>::BITS - 1)) != 0
            }
            fn lsb_set(self) -> bool {
                self & 1 != 0
            }
            fn shl1(self) -> Self {
                ((self as u64) << 1) as $ty
            }
            fn shr1(self) -> Self {
                self >> 1
            }
            fn shl8(self) -> Self {
                ((self as u64) << 8) as $ty
            }
            fn shr8(self) -> Self {
                ((self as u64) >> 8) as $ty
            }
            fn low_byte(self) -> u8 {
                (self & 0xFF) as u8
            }
            fn top_byte(self) -> u8 {
                ((self as u64) >> (<$ty>::BITS - 8)) as u8
            }
            fn xor(self, other: Self) -> Self {
                self ^ other
            }
        }
    };
}

impl_crc_word!(u8);
impl_crc_word!(u16);
impl_crc_word!(u32);

/// Build the 256-entry lookup table for `poly`.
///
/// Every candidate byte is shifted against the polynomial eight times,
/// MSB-first for non-reflected algorithms and LSB-first for reflected ones.
/// Pure computation, deterministic for a given polynomial.
pub(crate) fn build_table<W: CrcWord>(poly: W, reflected: bool) -> [W; 256] {
    let mut table = [W::ZERO; 256];
    for (index, entry) in table.iter_mut().enumerate() {
        let mut crc = if reflected {
            W::from_index(index)
        } else {
            W::from_index_msb(index)
        };
        for _ in 0..8 {
            crc = if reflected {
                if crc.lsb_set() {
                    crc.shr1().xor(poly)
                } else {
                    crc.shr1()
                }
            } else if crc.msb_set() {
                crc.shl1().xor(poly)
            } else {
                crc.shl1()
            };
        }
        *entry = crc;
    }
    table
}

/// One polynomial/bit-order combination with its lazily built table.
pub(crate) struct CrcEngine<W: CrcWord> {
    table: [W; 256],
    reflected: bool,
    init: W,
    xor_out: W,
}

impl<W: CrcWord> CrcEngine<W> {
    pub(crate) fn new(poly: W, reflected: bool, init: W, xor_out: W) -> Self {
        Self {
            table: build_table(poly, reflected),
            reflected,
            init,
            xor_out,
        }
    }

    pub(crate) fn start(&self) -> W {
        self.init
    }

    /// Advance the register by one input byte.
    pub(crate) fn step(&self, crc: W, byte: u8) -> W {
        if self.reflected {
            let index = crc.low_byte() ^ byte;
            crc.shr8().xor(self.table[index as usize])
        } else {
            let index = crc.top_byte() ^ byte;
            crc.shl8().xor(self.table[index as usize])
        }
    }

    pub(crate) fn update(&self, mut crc: W, bytes: &[u8]) -> W {
        for &byte in bytes {
            crc = self.step(crc, byte);
        }
        crc
    }

    pub(crate) fn finish(&self, crc: W) -> W {
        crc.xor(self.xor_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crc::{Crc, CRC_16_MODBUS, CRC_32_AUTOSAR, CRC_8_AUTOSAR, CRC_8_SAE_J1850};

    fn compute<W: CrcWord>(engine: &CrcEngine<W>, data: &[u8]) -> W {
        engine.finish(engine.update(engine.start(), data))
    }

    #[test]
    fn test_table_spot_values() {
        let t8 = build_table::<u8>(0x1d, false);
        assert_eq!(t8[0x00], 0x00);
        assert_eq!(t8[0x01], 0x1d);
        assert_eq!(t8[0xff], 0xc4);

        let t16 = build_table::<u16>(0xa001, true);
        assert_eq!(t16[0x00], 0x0000);
        assert_eq!(t16[0x01], 0xc0c1);

        let t32 = build_table::<u32>(0xc8df352f, true);
        assert_eq!(t32[0x00], 0x00000000);
        assert_eq!(t32[0x01], 0x30850ff5);
    }

    #[test]
    fn test_crc8_sae_j1850_check_value() {
        let engine = CrcEngine::<u8>::new(0x1d, false, 0xff, 0xff);
        assert_eq!(compute(&engine, b"123456789"), 0x4b);
    }

    #[test]
    fn test_crc8_h2f_check_value() {
        // Profile 02 convention: poly 0x2F, init 0xFF, xor-out 0xFF
        let engine = CrcEngine::<u8>::new(0x2f, false, 0xff, 0xff);
        assert_eq!(compute(&engine, b"123456789"), 0xdf);
    }

    #[test]
    fn test_crc16_check_value() {
        // Profile 05 convention: poly 0x8005 reflected, init 0xFFFF, no xor-out
        let engine = CrcEngine::<u16>::new(0xa001, true, 0xffff, 0x0000);
        assert_eq!(compute(&engine, b"123456789"), 0x4b37);
    }

    #[test]
    fn test_crc32_autosar_check_value() {
        let engine = CrcEngine::<u32>::new(0xc8df352f, true, 0xffff_ffff, 0xffff_ffff);
        assert_eq!(compute(&engine, b"123456789"), 0x1697d06a);
    }

    #[test]
    fn test_matches_crc_crate() {
        let samples: [&[u8]; 4] = [
            &[0x00],
            &[0x12, 0x34, 0x56, 0x78],
            &[0xff; 16],
            b"The quick brown fox jumps over the lazy dog",
        ];

        let crc8 = CrcEngine::<u8>::new(0x1d, false, 0xff, 0xff);
        let crc8_h2f = CrcEngine::<u8>::new(0x2f, false, 0xff, 0xff);
        let crc16 = CrcEngine::<u16>::new(0xa001, true, 0xffff, 0x0000);
        let crc32 = CrcEngine::<u32>::new(0xc8df352f, true, 0xffff_ffff, 0xffff_ffff);

        for sample in samples {
            assert_eq!(
                compute(&crc8, sample),
                Crc::<u8>::new(&CRC_8_SAE_J1850).checksum(sample)
            );
            assert_eq!(
                compute(&crc8_h2f, sample),
                Crc::<u8>::new(&CRC_8_AUTOSAR).checksum(sample)
            );
            assert_eq!(
                compute(&crc16, sample),
                Crc::<u16>::new(&CRC_16_MODBUS).checksum(sample)
            );
            assert_eq!(
                compute(&crc32, sample),
                Crc::<u32>::new(&CRC_32_AUTOSAR).checksum(sample)
            );
        }
    }

    #[test]
    fn test_update_is_pure() {
        let engine = CrcEngine::<u16>::new(0xa001, true, 0xffff, 0x0000);
        let data = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(compute(&engine, &data), compute(&engine, &data));
    }
}
