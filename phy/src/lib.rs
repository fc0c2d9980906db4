//! Single-pass link-level kernels around the LDPC decoder: CRC, Gold
//! scrambling sequences, constellation mapping and soft demapping,
//! circular-buffer rate matching, and sum-of-sinusoids fading.

pub mod crc;
pub mod fading;
pub mod gold;
pub mod modulation;
pub mod rate_matching;

// Re-export main types
pub use crc::{crc_attach, crc_check, crc_remainder, CrcPolynomial};
pub use fading::ZhengFading;
pub use gold::gold31;
pub use modulation::{Constellation, DemapMethod, ModulationScheme};
pub use rate_matching::{BaseGraph, CircularBuffer};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhyError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Value {value} at index {index} is not a bit")]
    NotABit { index: usize, value: u8 },
    #[error("Polynomial must start with a 1 and have at least two coefficients")]
    InvalidPolynomial,
    #[error("Gold sequence seed {0:#x} does not fit in 31 bits")]
    SeedTooLarge(u32),
    #[error("{len} bits do not fill whole symbols of {ord} bits")]
    PartialSymbol { len: usize, ord: usize },
    #[error("Constellation of {points} points does not match {ord} bits per symbol")]
    ConstellationSize { points: usize, ord: usize },
    #[error("Noise variance {value} at symbol {index} must be positive")]
    NoiseVariance { index: usize, value: f64 },
    #[error("Unknown demapping method '{0}'")]
    UnknownMethod(String),
    #[error("Unknown modulation scheme '{0}'")]
    UnknownScheme(String),
}
