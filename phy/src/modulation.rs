//! Constellation mapping and soft demapping.
//!
//! A constellation of `2^ord` points is indexed by the symbol label, with the
//! first bit of each group as the most significant label bit. The demapper
//! produces one LLR per bit in the same order, positive meaning the bit is
//! more likely 0, which is the convention the LDPC decoder consumes.

use crate::PhyError;
use num_complex::Complex64;
use std::fmt;
use std::str::FromStr;

/// The 38.211 section 5.1 modulation schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModulationScheme {
    /// Plain BPSK, without the pi/2 rotation between symbols.
    Bpsk,
    Qpsk,
    Qam16,
    Qam64,
    Qam256,
}

impl ModulationScheme {
    pub fn bits_per_symbol(self) -> usize {
        match self {
            ModulationScheme::Bpsk => 1,
            ModulationScheme::Qpsk => 2,
            ModulationScheme::Qam16 => 4,
            ModulationScheme::Qam64 => 6,
            ModulationScheme::Qam256 => 8,
        }
    }
}

impl FromStr for ModulationScheme {
    type Err = PhyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BPSK" => Ok(ModulationScheme::Bpsk),
            "QPSK" => Ok(ModulationScheme::Qpsk),
            "16QAM" => Ok(ModulationScheme::Qam16),
            "64QAM" => Ok(ModulationScheme::Qam64),
            "256QAM" => Ok(ModulationScheme::Qam256),
            _ => Err(PhyError::UnknownScheme(s.to_string())),
        }
    }
}

impl fmt::Display for ModulationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModulationScheme::Bpsk => "BPSK",
            ModulationScheme::Qpsk => "QPSK",
            ModulationScheme::Qam16 => "16QAM",
            ModulationScheme::Qam64 => "64QAM",
            ModulationScheme::Qam256 => "256QAM",
        };
        f.write_str(name)
    }
}

/// How bit metrics are derived from the received symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DemapMethod {
    /// Exact log-likelihood ratio over all points.
    TrueLlr,
    /// Max-log approximation using the nearest point of each bit value.
    #[default]
    ApproxLlr,
    /// `±1/N0` according to the nearest point.
    Hard,
}

impl FromStr for DemapMethod {
    type Err = PhyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "True LLR" => Ok(DemapMethod::TrueLlr),
            "Approx LLR" => Ok(DemapMethod::ApproxLlr),
            "Hard" => Ok(DemapMethod::Hard),
            _ => Err(PhyError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for DemapMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DemapMethod::TrueLlr => "True LLR",
            DemapMethod::ApproxLlr => "Approx LLR",
            DemapMethod::Hard => "Hard",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constellation {
    ord: usize,
    points: Vec<Complex64>,
}

impl Constellation {
    /// Arbitrary labelled constellation; `points.len()` must be `2^ord`.
    pub fn from_points(ord: usize, points: Vec<Complex64>) -> Result<Self, PhyError> {
        if ord == 0 || ord >= usize::BITS as usize || points.len() != 1usize << ord {
            return Err(PhyError::ConstellationSize {
                points: points.len(),
                ord,
            });
        }
        Ok(Self { ord, points })
    }

    /// Unit average energy NR constellation.
    pub fn nr(scheme: ModulationScheme) -> Self {
        let ord = scheme.bits_per_symbol();
        let points = match scheme {
            ModulationScheme::Bpsk => {
                let a = std::f64::consts::FRAC_1_SQRT_2;
                vec![Complex64::new(a, a), Complex64::new(-a, -a)]
            }
            _ => (0..1usize << ord).map(|t| square_qam_point(t, ord)).collect(),
        };
        Self { ord, points }
    }

    pub fn bits_per_symbol(&self) -> usize {
        self.ord
    }

    pub fn points(&self) -> &[Complex64] {
        &self.points
    }

    /// Group `bits` into symbols and look up their points.
    pub fn map(&self, bits: &[u8]) -> Result<Vec<Complex64>, PhyError> {
        if bits.len() % self.ord != 0 {
            return Err(PhyError::PartialSymbol {
                len: bits.len(),
                ord: self.ord,
            });
        }

        bits.chunks_exact(self.ord)
            .enumerate()
            .map(|(sym, group)| {
                let mut t = 0usize;
                for (j, &b) in group.iter().enumerate() {
                    if b > 1 {
                        return Err(PhyError::NotABit {
                            index: sym * self.ord + j,
                            value: b,
                        });
                    }
                    t = (t << 1) | b as usize;
                }
                Ok(self.points[t])
            })
            .collect()
    }

    /// Per-bit metrics for the received symbols, `n0[i]` being the noise
    /// variance on symbol `i`.
    pub fn demap(&self, iq: &[Complex64], n0: &[f64], method: DemapMethod) -> Result<Vec<f64>, PhyError> {
        if n0.len() != iq.len() {
            return Err(PhyError::LengthMismatch {
                what: "noise variances",
                expected: iq.len(),
                actual: n0.len(),
            });
        }
        if let Some(index) = n0.iter().position(|&v| v.is_nan() || v <= 0.0) {
            return Err(PhyError::NoiseVariance {
                index,
                value: n0[index],
            });
        }

        let mut llr = Vec::with_capacity(iq.len() * self.ord);
        let mut dist = vec![0.0; self.points.len()];

        for (&y, &noise) in iq.iter().zip(n0) {
            for (d, s) in dist.iter_mut().zip(&self.points) {
                *d = (y - s).norm_sqr();
            }
            for q in 0..self.ord {
                let mask = 1 << (self.ord - 1 - q);
                let value = match method {
                    DemapMethod::TrueLlr => {
                        let m0 = log_sum_exp(labelled(&dist, mask, false).map(|d| -d / noise));
                        let m1 = log_sum_exp(labelled(&dist, mask, true).map(|d| -d / noise));
                        m0 - m1
                    }
                    DemapMethod::ApproxLlr => {
                        let d0 = nearest(labelled(&dist, mask, false));
                        let d1 = nearest(labelled(&dist, mask, true));
                        -(d0 - d1) / noise
                    }
                    DemapMethod::Hard => {
                        let d0 = nearest(labelled(&dist, mask, false));
                        let d1 = nearest(labelled(&dist, mask, true));
                        if d0 > d1 {
                            -1.0 / noise
                        } else {
                            1.0 / noise
                        }
                    }
                };
                llr.push(value);
            }
        }

        Ok(llr)
    }
}

/// Square QAM with Gray labelling: even label bits drive I, odd ones Q.
fn square_qam_point(t: usize, ord: usize) -> Complex64 {
    let m = ord / 2;
    let bit = |j: usize| (t >> (ord - 1 - j)) & 1;
    let sign = |j: usize| 1.0 - 2.0 * bit(j) as f64;

    let axis = |first: usize| {
        let mut v = sign(first + 2 * (m - 1));
        for k in (0..m - 1).rev() {
            v = sign(first + 2 * k) * ((1usize << (m - 1 - k)) as f64 - v);
        }
        v
    };

    let scale = (2.0 * ((1usize << (2 * m)) - 1) as f64 / 3.0).sqrt();
    Complex64::new(axis(0), axis(1)) / scale
}

/// Distances of the points whose label has `mask` set (or clear).
fn labelled(dist: &[f64], mask: usize, set: bool) -> impl Iterator<Item = f64> + Clone + '_ {
    dist.iter()
        .enumerate()
        .filter(move |(t, _)| (t & mask != 0) == set)
        .map(|(_, &d)| d)
}

fn nearest(dist: impl Iterator<Item = f64>) -> f64 {
    dist.fold(f64::INFINITY, f64::min)
}

fn log_sum_exp(terms: impl Iterator<Item = f64> + Clone) -> f64 {
    let max = terms.clone().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return max;
    }
    max + terms.map(|x| (x - max).exp()).sum::<f64>().ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMES: [ModulationScheme; 5] = [
        ModulationScheme::Bpsk,
        ModulationScheme::Qpsk,
        ModulationScheme::Qam16,
        ModulationScheme::Qam64,
        ModulationScheme::Qam256,
    ];

    fn close(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-12
    }

    #[test]
    fn test_nr_points() {
        let r2 = std::f64::consts::FRAC_1_SQRT_2;
        let qpsk = Constellation::nr(ModulationScheme::Qpsk);
        assert!(close(qpsk.points()[0], Complex64::new(r2, r2)));
        assert!(close(qpsk.points()[1], Complex64::new(r2, -r2)));
        assert!(close(qpsk.points()[2], Complex64::new(-r2, r2)));
        assert!(close(qpsk.points()[3], Complex64::new(-r2, -r2)));

        let r10 = 10f64.sqrt();
        let qam16 = Constellation::nr(ModulationScheme::Qam16);
        assert!(close(qam16.points()[0b0000], Complex64::new(1.0, 1.0) / r10));
        assert!(close(qam16.points()[0b0010], Complex64::new(3.0, 1.0) / r10));
        assert!(close(qam16.points()[0b1011], Complex64::new(-3.0, 3.0) / r10));

        let r42 = 42f64.sqrt();
        let qam64 = Constellation::nr(ModulationScheme::Qam64);
        // b0..b5 = 0,0,1,0,1,0 -> I = 4 - (-1)(2 - (-1)) = 7, Q = 4 - (2 - 1) = 3
        assert!(close(qam64.points()[0b001010], Complex64::new(7.0, 3.0) / r42));
    }

    #[test]
    fn test_unit_average_energy() {
        for scheme in SCHEMES {
            let c = Constellation::nr(scheme);
            assert_eq!(c.points().len(), 1 << scheme.bits_per_symbol());
            let energy: f64 = c.points().iter().map(|p| p.norm_sqr()).sum::<f64>() / c.points().len() as f64;
            assert!((energy - 1.0).abs() < 1e-12, "{}: {}", scheme, energy);
        }
    }

    #[test]
    fn test_gray_neighbours() {
        // Adjacent 16QAM points differ in exactly one label bit.
        let c = Constellation::nr(ModulationScheme::Qam16);
        let step = 2.0 / 10f64.sqrt();
        for (a, pa) in c.points().iter().enumerate() {
            for (b, pb) in c.points().iter().enumerate() {
                if ((pa - pb).norm() - step).abs() < 1e-9 {
                    assert_eq!((a ^ b).count_ones(), 1);
                }
            }
        }
    }

    #[test]
    fn test_map_groups_msb_first() {
        let c = Constellation::nr(ModulationScheme::Qpsk);
        let iq = c.map(&[0, 1, 1, 0]).unwrap();
        assert_eq!(iq, vec![c.points()[1], c.points()[2]]);
        assert_eq!(
            c.map(&[0, 1, 1]),
            Err(PhyError::PartialSymbol { len: 3, ord: 2 })
        );
        assert_eq!(c.map(&[0, 3]), Err(PhyError::NotABit { index: 1, value: 3 }));
    }

    #[test]
    fn test_bpsk_llr_values() {
        let c = Constellation::nr(ModulationScheme::Bpsk);
        let y = c.points()[0];
        for method in [DemapMethod::TrueLlr, DemapMethod::ApproxLlr] {
            let llr = c.demap(&[y], &[1.0], method).unwrap();
            assert!((llr[0] - 4.0).abs() < 1e-12);
        }
        assert_eq!(c.demap(&[y], &[0.5], DemapMethod::Hard).unwrap(), vec![2.0]);
        assert_eq!(c.demap(&[-y], &[0.5], DemapMethod::Hard).unwrap(), vec![-2.0]);
    }

    #[test]
    fn test_noiseless_demap_signs() {
        for scheme in SCHEMES {
            let c = Constellation::nr(scheme);
            let ord = scheme.bits_per_symbol();
            let bits: Vec<u8> = (0..(1usize << ord))
                .flat_map(|t| (0..ord).map(move |j| ((t >> (ord - 1 - j)) & 1) as u8))
                .collect();
            let iq = c.map(&bits).unwrap();
            let n0 = vec![0.01; iq.len()];

            for method in [DemapMethod::TrueLlr, DemapMethod::ApproxLlr, DemapMethod::Hard] {
                let llr = c.demap(&iq, &n0, method).unwrap();
                assert_eq!(llr.len(), bits.len());
                for (l, &b) in llr.iter().zip(&bits) {
                    assert_eq!(*l < 0.0, b == 1, "{} {}", scheme, method);
                }
            }
        }
    }

    #[test]
    fn test_true_llr_approaches_max_log() {
        let c = Constellation::nr(ModulationScheme::Qam16);
        let y = [Complex64::new(0.2, -0.5), Complex64::new(-0.9, 0.1)];
        let n0 = [1e-3, 1e-3];
        let exact = c.demap(&y, &n0, DemapMethod::TrueLlr).unwrap();
        let approx = c.demap(&y, &n0, DemapMethod::ApproxLlr).unwrap();
        for (e, a) in exact.iter().zip(&approx) {
            assert!(e.is_finite());
            assert!((e - a).abs() / a.abs().max(1.0) < 1e-2);
        }
    }

    #[test]
    fn test_demap_rejects_bad_noise() {
        let c = Constellation::nr(ModulationScheme::Qpsk);
        let y = [Complex64::new(0.0, 0.0); 2];
        assert_eq!(
            c.demap(&y, &[1.0], DemapMethod::Hard),
            Err(PhyError::LengthMismatch {
                what: "noise variances",
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            c.demap(&y, &[1.0, 0.0], DemapMethod::Hard),
            Err(PhyError::NoiseVariance { index: 1, value: 0.0 })
        );
    }

    #[test]
    fn test_custom_constellation() {
        assert!(Constellation::from_points(2, vec![Complex64::new(1.0, 0.0); 3]).is_err());
        let c = Constellation::from_points(1, vec![Complex64::new(1.0, 0.0), Complex64::new(-1.0, 0.0)]).unwrap();
        assert_eq!(c.demap(&[Complex64::new(0.5, 0.0)], &[1.0], DemapMethod::ApproxLlr).unwrap(), vec![2.0]);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("True LLR".parse::<DemapMethod>().unwrap(), DemapMethod::TrueLlr);
        assert_eq!("Approx LLR".parse::<DemapMethod>().unwrap(), DemapMethod::ApproxLlr);
        assert_eq!("Hard".parse::<DemapMethod>().unwrap(), DemapMethod::Hard);
        assert!("soft".parse::<DemapMethod>().is_err());
        for scheme in SCHEMES {
            assert_eq!(scheme.to_string().parse::<ModulationScheme>().unwrap(), scheme);
        }
        assert_eq!("qpsk".parse::<ModulationScheme>().unwrap(), ModulationScheme::Qpsk);
    }
}
