use primitive_types::U256;
use thiserror::Error;

use crate::crypto::Hash;

// Difficulty of a block relative to the easiest accepted target:
// difficulty = MAX_TARGET / target. All operations are done on U256 to
// avoid overflow.
pub type Difficulty = U256;

// Largest target expressible in compact form (difficulty 1).
// 0xFFFF * 2^240, encoded as 0x2100FFFF.
pub const MAX_TARGET_COMPACT: u32 = 0x2100_FFFF;

#[derive(Error, Debug)]
pub enum DifficultyError {
    #[error("Difficulty cannot be a value zero")]
    DifficultyCannotBeZero,
    #[error("Invalid compact target encoding: {0:#010x}")]
    InvalidCompact(u32),
}

#[inline]
pub fn max_target() -> U256 {
    U256::from(0xFFFFu64) << 240
}

// Expand a compact target (exponent byte + 3 mantissa bytes) to its
// 256-bit value. Rejects the mantissa sign bit and any encoding whose
// value would not fit in 256 bits.
pub fn compact_to_target(compact: u32) -> Result<U256, DifficultyError> {
    let exponent = compact >> 24;
    let mantissa = compact & 0x007F_FFFF;

    // the sign bit has no meaning for a target
    if compact & 0x0080_0000 != 0 {
        return Err(DifficultyError::InvalidCompact(compact));
    }
    if mantissa == 0 {
        return Err(DifficultyError::InvalidCompact(compact));
    }

    if exponent <= 3 {
        return Ok(U256::from(mantissa >> (8 * (3 - exponent))));
    }

    // overflow: mantissa bytes must fit below the 256-bit boundary
    if exponent > 34
        || (mantissa > 0xFF && exponent > 33)
        || (mantissa > 0xFFFF && exponent > 32)
    {
        return Err(DifficultyError::InvalidCompact(compact));
    }

    Ok(U256::from(mantissa) << (8 * (exponent - 3)))
}

// Compress a target back to compact form. Lossy beyond 3 significant
// bytes; the mantissa sign bit is normalized away.
pub fn target_to_compact(target: &U256) -> u32 {
    if target.is_zero() {
        return 0;
    }

    let mut exponent = (target.bits() as u32 + 7) / 8;
    let mut mantissa = if exponent <= 3 {
        target.low_u32() << (8 * (3 - exponent))
    } else {
        (*target >> (8 * (exponent - 3))).low_u32()
    };

    if mantissa & 0x0080_0000 != 0 {
        mantissa >>= 8;
        exponent += 1;
    }

    (exponent << 24) | mantissa
}

// Target height = ceil(log2(target)). Smaller height means harder.
pub fn get_target_height(target: &U256) -> u32 {
    let bits = target.bits() as u32;
    if bits == 0 {
        return 0;
    }

    let floor = bits - 1;
    if *target == (U256::one() << floor) {
        floor
    } else {
        bits
    }
}

// The pure power-of-two target for one interlink level
#[inline]
pub fn level_target(height: u32) -> U256 {
    debug_assert!(height < 256, "level target height out of range: {}", height);
    U256::one() << height
}

// A hash meets a target when, read as a big-endian integer, it is
// numerically below or equal to it
#[inline]
pub fn is_proof_of_work(hash: &Hash, target: &U256) -> bool {
    let work = U256::from_big_endian(hash.as_bytes());
    work <= *target
}

pub fn difficulty_from_target(target: &U256) -> Result<Difficulty, DifficultyError> {
    if target.is_zero() {
        return Err(DifficultyError::DifficultyCannotBeZero);
    }
    Ok(max_target() / target)
}

// Compact encoding of the target a given difficulty demands
pub fn difficulty_to_compact(difficulty: &Difficulty) -> Result<u32, DifficultyError> {
    if difficulty.is_zero() {
        return Err(DifficultyError::DifficultyCannotBeZero);
    }
    Ok(target_to_compact(&(max_target() / difficulty)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_target_compact() {
        let target = compact_to_target(MAX_TARGET_COMPACT).unwrap();
        assert_eq!(target, max_target());
        assert_eq!(target_to_compact(&target), MAX_TARGET_COMPACT);
    }

    #[test]
    fn test_bitcoin_genesis_vector() {
        // 0x1d00ffff expands to 0xFFFF * 2^208
        let target = compact_to_target(0x1d00_ffff).unwrap();
        assert_eq!(target, U256::from(0xFFFFu64) << 208);
        assert_eq!(target_to_compact(&target), 0x1d00_ffff);
    }

    #[test]
    fn test_small_exponents() {
        assert_eq!(compact_to_target(0x0101_0000).unwrap(), U256::from(1u64));
        assert_eq!(compact_to_target(0x0201_2300).unwrap(), U256::from(0x0123u64));
        assert_eq!(compact_to_target(0x0301_2345).unwrap(), U256::from(0x0123_45u64));
        assert_eq!(compact_to_target(0x0401_2345).unwrap(), U256::from(0x0123_4500u64));
    }

    #[test]
    fn test_sign_bit_rejected() {
        assert!(matches!(
            compact_to_target(0x0492_3456),
            Err(DifficultyError::InvalidCompact(_))
        ));
    }

    #[test]
    fn test_zero_mantissa_rejected() {
        assert!(compact_to_target(0x0000_0000).is_err());
        assert!(compact_to_target(0x2000_0000).is_err());
    }

    #[test]
    fn test_overflow_rejected() {
        assert!(compact_to_target(0xFF01_0000).is_err());
        assert!(compact_to_target(0x2201_0000).is_err());
        // one byte of mantissa still fits at exponent 34
        assert!(compact_to_target(0x2200_00FF).is_ok());
    }

    #[test]
    fn test_sign_bit_normalization() {
        // 0x800000 would set the sign bit, so the encoder shifts it out
        let target = U256::from(0x0080_0000u64);
        let compact = target_to_compact(&target);
        assert_eq!(compact, 0x0400_8000);
        assert_eq!(compact_to_target(compact).unwrap(), target);
    }

    #[test]
    fn test_target_height() {
        assert_eq!(get_target_height(&U256::from(1u64)), 0);
        assert_eq!(get_target_height(&U256::from(2u64)), 1);
        assert_eq!(get_target_height(&U256::from(3u64)), 2);
        assert_eq!(get_target_height(&U256::from(4u64)), 2);
        assert_eq!(get_target_height(&U256::from(5u64)), 3);
        assert_eq!(get_target_height(&(U256::one() << 240)), 240);
        assert_eq!(get_target_height(&max_target()), 256);
    }

    #[test]
    fn test_is_proof_of_work_boundaries() {
        let target = U256::one() << 255;
        let mut below = [0u8; 32];
        below[0] = 0x7F;
        assert!(is_proof_of_work(&Hash::new(below), &target));

        // equality meets the target
        let mut exact = [0u8; 32];
        exact[0] = 0x80;
        assert!(is_proof_of_work(&Hash::new(exact), &target));

        let mut above = [0u8; 32];
        above[0] = 0x80;
        above[31] = 0x01;
        assert!(!is_proof_of_work(&Hash::new(above), &target));
    }

    #[test]
    fn test_difficulty_one_is_max_target() {
        let difficulty = difficulty_from_target(&max_target()).unwrap();
        assert_eq!(difficulty, U256::one());
        assert_eq!(difficulty_to_compact(&difficulty).unwrap(), MAX_TARGET_COMPACT);
    }

    #[test]
    fn test_zero_rejected() {
        assert!(difficulty_from_target(&U256::zero()).is_err());
        assert!(difficulty_to_compact(&U256::zero()).is_err());
    }
}
