//! CRC computation over unpacked bits by shift-register division in GF(2).
//!
//! Bits and polynomial coefficients are `u8` values 0 or 1, highest degree
//! first. The remainder equals `b(x) x^L mod g(x)` for a generator of degree
//! `L`, so appending it to the block makes the whole block divisible by g.

use crate::PhyError;

/// Generator polynomials of 38.212 section 5.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrcPolynomial {
    Crc24A,
    Crc24B,
    Crc24C,
    Crc16,
    Crc11,
    Crc6,
}

impl CrcPolynomial {
    /// Exponents of the nonzero terms.
    fn degrees(self) -> &'static [usize] {
        match self {
            CrcPolynomial::Crc24A => &[24, 23, 18, 17, 14, 11, 10, 7, 6, 5, 4, 3, 1, 0],
            CrcPolynomial::Crc24B => &[24, 23, 6, 5, 1, 0],
            CrcPolynomial::Crc24C => &[24, 23, 21, 20, 17, 15, 13, 12, 8, 4, 2, 1, 0],
            CrcPolynomial::Crc16 => &[16, 12, 5, 0],
            CrcPolynomial::Crc11 => &[11, 10, 9, 5, 0],
            CrcPolynomial::Crc6 => &[6, 5, 0],
        }
    }

    /// Number of parity bits.
    pub fn len(self) -> usize {
        self.degrees()[0]
    }

    /// Coefficients, highest degree first.
    pub fn coefficients(self) -> Vec<u8> {
        let degrees = self.degrees();
        let mut poly = vec![0u8; degrees[0] + 1];
        for &d in degrees {
            poly[degrees[0] - d] = 1;
        }
        poly
    }
}

fn check_bits(bits: &[u8]) -> Result<(), PhyError> {
    match bits.iter().position(|&b| b > 1) {
        Some(index) => Err(PhyError::NotABit {
            index,
            value: bits[index],
        }),
        None => Ok(()),
    }
}

/// Remainder of `bits` shifted by the generator degree, `poly.len() - 1` bits.
pub fn crc_remainder(bits: &[u8], poly: &[u8]) -> Result<Vec<u8>, PhyError> {
    if poly.len() < 2 || poly[0] != 1 {
        return Err(PhyError::InvalidPolynomial);
    }
    check_bits(poly)?;
    check_bits(bits)?;

    let len = poly.len();
    let mut lfsr = vec![0u8; len];
    // Feed the block followed by `len - 1` zeros.
    let input = bits.iter().copied().chain(std::iter::repeat(0).take(len - 1));
    for bit in input {
        lfsr.copy_within(1.., 0);
        lfsr[len - 1] = bit;
        if lfsr[0] != 0 {
            for (cell, &coeff) in lfsr.iter_mut().zip(poly) {
                *cell ^= coeff;
            }
        }
    }

    Ok(lfsr.split_off(1))
}

/// `bits` followed by their CRC.
pub fn crc_attach(bits: &[u8], poly: &[u8]) -> Result<Vec<u8>, PhyError> {
    let parity = crc_remainder(bits, poly)?;
    let mut out = Vec::with_capacity(bits.len() + parity.len());
    out.extend_from_slice(bits);
    out.extend(parity);
    Ok(out)
}

/// Whether a block produced by [`crc_attach`] arrived intact.
pub fn crc_check(block: &[u8], poly: &[u8]) -> Result<bool, PhyError> {
    Ok(crc_remainder(block, poly)?.iter().all(|&b| b == 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hand_division() {
        // (x^3 + x^2 + 1) x^3 mod (x^3 + x + 1) = 1
        assert_eq!(crc_remainder(&[1, 1, 0, 1], &[1, 0, 1, 1]).unwrap(), vec![0, 0, 1]);
        assert_eq!(crc_remainder(&[], &[1, 0, 1, 1]).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn test_crc16_vector() {
        let poly = CrcPolynomial::Crc16.coefficients();
        assert_eq!(poly.len(), 17);
        let bits = [1, 0, 1, 1, 0, 0, 1, 0, 1, 1];
        assert_eq!(
            crc_remainder(&bits, &poly).unwrap(),
            vec![0, 0, 0, 0, 1, 1, 1, 0, 0, 1, 0, 0, 0, 1, 0, 1]
        );
    }

    #[test]
    fn test_attach_then_check() {
        for poly in [
            CrcPolynomial::Crc24A,
            CrcPolynomial::Crc24B,
            CrcPolynomial::Crc24C,
            CrcPolynomial::Crc16,
            CrcPolynomial::Crc11,
            CrcPolynomial::Crc6,
        ] {
            let g = poly.coefficients();
            assert_eq!(g.len(), poly.len() + 1);
            let bits: Vec<u8> = (0..100).map(|i| ((i * 7 + 3) % 5 == 0) as u8).collect();
            let mut block = crc_attach(&bits, &g).unwrap();
            assert_eq!(block.len(), 100 + poly.len());
            assert!(crc_check(&block, &g).unwrap());
            block[17] ^= 1;
            assert!(!crc_check(&block, &g).unwrap());
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(crc_remainder(&[1, 0], &[1]), Err(PhyError::InvalidPolynomial));
        assert_eq!(crc_remainder(&[1, 0], &[0, 1, 1]), Err(PhyError::InvalidPolynomial));
        assert_eq!(
            crc_remainder(&[1, 2], &[1, 1]),
            Err(PhyError::NotABit { index: 1, value: 2 })
        );
    }

    proptest! {
        #[test]
        fn prop_remainder_is_linear(
            a in prop::collection::vec(0u8..2, 40),
            b in prop::collection::vec(0u8..2, 40),
        ) {
            let g = CrcPolynomial::Crc11.coefficients();
            let sum: Vec<u8> = a.iter().zip(&b).map(|(x, y)| x ^ y).collect();
            let ra = crc_remainder(&a, &g).unwrap();
            let rb = crc_remainder(&b, &g).unwrap();
            let expected: Vec<u8> = ra.iter().zip(&rb).map(|(x, y)| x ^ y).collect();
            prop_assert_eq!(crc_remainder(&sum, &g).unwrap(), expected);
        }
    }
}
