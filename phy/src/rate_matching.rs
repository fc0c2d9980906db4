//! NR LDPC rate matching by circular buffer (38.212 5.4.2).
//!
//! Bit selection reads the coded block circularly from the redundancy
//! version start `k0`, skipping filler positions, and the result is
//! bit-interleaved across the `q_m` bits of each modulation symbol. The
//! receive side walks the same path and accumulates into the soft buffer,
//! which combines repetitions and retransmissions for free.

use crate::PhyError;
use std::ops::{AddAssign, Range};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BaseGraph {
    Bg1,
    Bg2,
}

impl BaseGraph {
    /// Number of systematic-plus-parity columns in units of the lifting size.
    fn n_over_zc(self) -> usize {
        match self {
            BaseGraph::Bg1 => 66,
            BaseGraph::Bg2 => 50,
        }
    }

    fn rv_numerators(self) -> [usize; 4] {
        match self {
            BaseGraph::Bg1 => [0, 17, 33, 56],
            BaseGraph::Bg2 => [0, 13, 25, 43],
        }
    }

    /// Starting position of redundancy version `rv` in a buffer of `n_cb` bits.
    pub fn k0(self, rv: usize, n_cb: usize, zc: usize) -> Result<usize, PhyError> {
        if rv > 3 {
            return Err(PhyError::InvalidParameter(format!(
                "redundancy version must be 0..=3, got {}",
                rv
            )));
        }
        if zc == 0 {
            return Err(PhyError::InvalidParameter(
                "lifting size must be > 0".to_string(),
            ));
        }
        let num = self.rv_numerators()[rv];
        Ok((num * n_cb) / (self.n_over_zc() * zc) * zc)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularBuffer {
    n_cb: usize,
    q_m: usize,
    k0: usize,
    filler: Range<usize>,
}

impl CircularBuffer {
    pub fn new(n_cb: usize, q_m: usize, k0: usize) -> Result<Self, PhyError> {
        if n_cb == 0 || q_m == 0 {
            return Err(PhyError::InvalidParameter(format!(
                "buffer length ({}) and bits per symbol ({}) must be > 0",
                n_cb, q_m
            )));
        }
        if k0 >= n_cb {
            return Err(PhyError::InvalidParameter(format!(
                "start position {} outside a buffer of {}",
                k0, n_cb
            )));
        }
        Ok(Self {
            n_cb,
            q_m,
            k0,
            filler: 0..0,
        })
    }

    /// Mark `len` positions from `start` as filler bits, never transmitted.
    pub fn with_filler(mut self, start: usize, len: usize) -> Result<Self, PhyError> {
        if start + len > self.n_cb {
            return Err(PhyError::InvalidParameter(format!(
                "filler {}..{} outside a buffer of {}",
                start,
                start + len,
                self.n_cb
            )));
        }
        self.filler = start..start + len;
        Ok(self)
    }

    pub fn n_cb(&self) -> usize {
        self.n_cb
    }

    pub fn q_m(&self) -> usize {
        self.q_m
    }

    pub fn k0(&self) -> usize {
        self.k0
    }

    pub fn filler(&self) -> Range<usize> {
        self.filler.clone()
    }

    /// Buffer positions of the `e` transmitted values, in transmission order.
    fn path(&self, e: usize) -> impl Iterator<Item = usize> + '_ {
        (self.k0..self.n_cb)
            .chain(0..self.k0)
            .filter(move |i| !self.filler.contains(i))
            .cycle()
            .take(e)
    }

    fn check(&self, buffer_len: usize, e: usize) -> Result<(), PhyError> {
        if buffer_len != self.n_cb {
            return Err(PhyError::LengthMismatch {
                what: "circular buffer",
                expected: self.n_cb,
                actual: buffer_len,
            });
        }
        if e % self.q_m != 0 {
            return Err(PhyError::PartialSymbol { len: e, ord: self.q_m });
        }
        if e > 0 && self.filler.len() == self.n_cb {
            return Err(PhyError::InvalidParameter(
                "filler covers the whole buffer".to_string(),
            ));
        }
        Ok(())
    }

    /// Select `e` values of `d` and interleave them over symbol bits.
    pub fn interleave<T: Copy>(&self, d: &[T], e: usize) -> Result<Vec<T>, PhyError> {
        self.check(d.len(), e)?;

        let selected: Vec<T> = self.path(e).map(|i| d[i]).collect();
        let per_bit = e / self.q_m;
        let mut f = Vec::with_capacity(e);
        for i in 0..per_bit {
            for j in 0..self.q_m {
                f.push(selected[j * per_bit + i]);
            }
        }
        Ok(f)
    }

    /// Undo [`interleave`](Self::interleave), adding each received value into
    /// its buffer position of `d`.
    pub fn deinterleave<T: Copy + AddAssign>(&self, f: &[T], d: &mut [T]) -> Result<(), PhyError> {
        let e = f.len();
        self.check(d.len(), e)?;

        let per_bit = e / self.q_m;
        let received = |n: usize| f[(n % per_bit) * self.q_m + n / per_bit];
        for (n, pos) in self.path(e).enumerate() {
            d[pos] += received(n);
        }
        Ok(())
    }
}
