use crate::{LdpcError, ParityCheckMatrix};

/// Hard decision on LLRs: negative means 1.
pub fn hard_decision(llrs: &[f64]) -> Vec<u8> {
    llrs.iter().map(|&x| u8::from(x < 0.0)).collect()
}

/// Per-check parity counters reused across syndrome evaluations.
///
/// Every evaluation leaves the counters zeroed, so consecutive calls never see
/// each other's marks.
#[derive(Debug, Clone)]
pub struct SyndromeChecker {
    counts: Vec<u32>,
}

impl SyndromeChecker {
    pub fn new(n_checks: usize) -> Self {
        Self {
            counts: vec![0; n_checks],
        }
    }

    /// Number of checks with odd parity, where `is_one(v)` gives the current
    /// bit estimate of variable `v`.
    pub fn unsatisfied<F>(&mut self, h: &ParityCheckMatrix, is_one: F) -> usize
    where
        F: Fn(usize) -> bool,
    {
        debug_assert_eq!(self.counts.len(), h.rows());

        for v in (0..h.cols()).filter(|&v| is_one(v)) {
            for &c in h.entries_in_col(v) {
                self.counts[c] += 1;
            }
        }

        let mut odd = 0;
        for count in &mut self.counts {
            odd += (*count & 1) as usize;
            *count = 0;
        }
        odd
    }

    pub fn llrs_satisfy(&mut self, h: &ParityCheckMatrix, llrs: &[f64]) -> bool {
        self.unsatisfied(h, |v| llrs[v] < 0.0) == 0
    }

    pub fn bits_satisfy(&mut self, h: &ParityCheckMatrix, bits: &[u8]) -> bool {
        self.unsatisfied(h, |v| bits[v] != 0) == 0
    }
}

/// Count the parity checks a hard-decision word violates.
pub fn unsatisfied_checks(h: &ParityCheckMatrix, bits: &[u8]) -> Result<usize, LdpcError> {
    if bits.len() != h.cols() {
        return Err(LdpcError::LengthMismatch {
            what: "codeword",
            expected: h.cols(),
            actual: bits.len(),
        });
    }

    Ok(SyndromeChecker::new(h.rows()).unsatisfied(h, |v| bits[v] != 0))
}

pub fn is_codeword(h: &ParityCheckMatrix, bits: &[u8]) -> Result<bool, LdpcError> {
    unsatisfied_checks(h, bits).map(|n| n == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn johnson() -> ParityCheckMatrix {
        ParityCheckMatrix::from_dense(&[
            [1u8, 1, 0, 1, 0, 0],
            [0, 1, 1, 0, 1, 0],
            [1, 0, 0, 0, 1, 1],
            [0, 0, 1, 1, 0, 1],
        ])
        .unwrap()
    }

    #[test]
    fn test_hard_decision() {
        assert_eq!(hard_decision(&[-0.1, 0.0, -0.0, 3.0, -7.0]), vec![1, 0, 0, 0, 1]);
    }

    #[test]
    fn test_codewords() {
        let h = johnson();
        assert!(is_codeword(&h, &[0, 0, 0, 0, 0, 0]).unwrap());
        assert!(is_codeword(&h, &[0, 0, 1, 0, 1, 1]).unwrap());
        // Bit 0 sits in checks 0 and 2.
        assert_eq!(unsatisfied_checks(&h, &[1, 0, 1, 0, 1, 1]).unwrap(), 2);
        assert!(unsatisfied_checks(&h, &[0; 5]).is_err());
    }

    #[test]
    fn test_counters_reset_between_calls() {
        let h = johnson();
        let mut checker = SyndromeChecker::new(h.rows());

        assert!(!checker.llrs_satisfy(&h, &[-1.0, 1.0, 1.0, 1.0, 1.0, 1.0]));
        assert!(checker.counts.iter().all(|&c| c == 0));
        // A stale odd count on check 0 or 2 would fail this one.
        assert!(checker.llrs_satisfy(&h, &[1.0; 6]));
        assert!(checker.bits_satisfy(&h, &[0, 0, 1, 0, 1, 1]));
    }

    proptest! {
        #[test]
        fn prop_syndrome_is_linear(a in prop::collection::vec(0u8..2, 6), b in prop::collection::vec(0u8..2, 6)) {
            let h = johnson();
            let sum: Vec<u8> = a.iter().zip(&b).map(|(x, y)| x ^ y).collect();
            let both_valid = is_codeword(&h, &a).unwrap() && is_codeword(&h, &b).unwrap();
            if both_valid {
                prop_assert!(is_codeword(&h, &sum).unwrap());
            }

            let mut checker = SyndromeChecker::new(h.rows());
            let llrs: Vec<f64> = a.iter().map(|&x| if x == 1 { -1.0 } else { 1.0 }).collect();
            prop_assert_eq!(checker.llrs_satisfy(&h, &llrs), is_codeword(&h, &a).unwrap());
        }
    }
}
