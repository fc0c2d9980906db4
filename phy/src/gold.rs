//! Length-31 Gold pseudo-random sequence used for NR scrambling (38.211 5.2.1).

use crate::PhyError;

/// Number of outputs discarded before the first returned bit.
const NC: usize = 1600;

/// Mask of the 31 register cells.
const REG_MASK: u32 = 0x7fff_ffff;

/// First `len` bits of the Gold sequence for the given initialization.
///
/// Both m-sequence registers are held as 31-bit words with cell `n` in bit 0,
/// so each step is a shift plus feedback into bit 30.
pub fn gold31(c_init: u32, len: usize) -> Result<Vec<u8>, PhyError> {
    if c_init > REG_MASK {
        return Err(PhyError::SeedTooLarge(c_init));
    }

    let mut x1: u32 = 1;
    let mut x2: u32 = c_init;
    let mut out = Vec::with_capacity(len);

    for n in 0..NC + len {
        if n >= NC {
            out.push(((x1 ^ x2) & 1) as u8);
        }
        let f1 = (x1 ^ (x1 >> 3)) & 1;
        let f2 = (x2 ^ (x2 >> 1) ^ (x2 >> 2) ^ (x2 >> 3)) & 1;
        x1 = (x1 >> 1) | (f1 << 30);
        x2 = (x2 >> 1) | (f2 << 30);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sequences() {
        assert_eq!(
            gold31(0, 32).unwrap(),
            vec![
                0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 1, 0, 1, 0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 1, 1, 1,
                1, 0, 1, 0
            ]
        );
        assert_eq!(
            gold31(1, 32).unwrap(),
            vec![
                0, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 1, 1, 0, 1, 1, 1,
                0, 1, 0, 0
            ]
        );
        assert_eq!(
            gold31(12345, 32).unwrap(),
            vec![
                0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 0, 1, 1, 1, 1, 1, 1, 0, 1, 0, 0, 1, 1, 0, 1,
                0, 0, 0, 0
            ]
        );
    }

    #[test]
    fn test_top_seed_bit_is_used() {
        // Bit 30 of the seed reaches the output, unlike a 30-cell load.
        let c_init = 0x5A5A_5A5A & REG_MASK;
        assert_eq!(
            gold31(c_init, 16).unwrap(),
            vec![1, 1, 1, 1, 0, 0, 1, 0, 1, 0, 0, 1, 1, 0, 1, 0]
        );
    }

    #[test]
    fn test_prefix_stable() {
        let long = gold31(777, 500).unwrap();
        let short = gold31(777, 100).unwrap();
        assert_eq!(&long[..100], &short[..]);
        assert!(gold31(777, 0).unwrap().is_empty());
    }

    #[test]
    fn test_seed_range() {
        assert!(gold31(REG_MASK, 4).is_ok());
        assert_eq!(gold31(1 << 31, 4), Err(PhyError::SeedTooLarge(1 << 31)));
    }
}
