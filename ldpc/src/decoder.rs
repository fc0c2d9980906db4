//! Flooding sum-product decoder.

use crate::boxplus::{BoxPlus, BoxPlusKind, ExactBoxPlus, LinearBoxPlus};
use crate::syndrome::{hard_decision, SyndromeChecker};
use crate::{AdjacencyIndex, LdpcError, MessageStore, Node, ParityCheckMatrix};
use log::{debug, trace};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Decoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecoderConfig {
    /// Upper bound on message-passing iterations.
    pub max_iters: usize,
    /// Check-node combination rule.
    pub boxplus: BoxPlusKind,
    /// Reject NaN or infinite channel LLRs instead of letting them propagate.
    pub reject_non_finite: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_iters: 50,
            boxplus: BoxPlusKind::Linear,
            reject_non_finite: true,
        }
    }
}

impl DecoderConfig {
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn with_boxplus(mut self, boxplus: BoxPlusKind) -> Self {
        self.boxplus = boxplus;
        self
    }

    pub fn with_reject_non_finite(mut self, reject: bool) -> Self {
        self.reject_non_finite = reject;
        self
    }
}

/// Outcome of one decode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeResult {
    /// Hard decision of the final a-posteriori LLRs, also when decoding failed.
    pub hard_bits: Vec<u8>,
    /// The hard decision satisfies every parity check.
    pub cw_valid: bool,
    /// 0 when the channel word already was a codeword, otherwise the 0-based
    /// index of the iteration that converged, or `max_iters` on failure.
    pub iterations: usize,
}

/// Reusable sum-product decoder for one code.
///
/// The graph is shared read-only, so several decoders (one per thread) can
/// work on the same code at once; each owns its message buffers.
#[derive(Debug, Clone)]
pub struct SpaDecoder {
    h: Arc<ParityCheckMatrix>,
    adj: Arc<AdjacencyIndex>,
    config: DecoderConfig,
    store: MessageStore,
    syndrome: SyndromeChecker,
    posterior: Vec<f64>,
}

impl SpaDecoder {
    /// Build a decoder, rejecting graphs it cannot run on.
    pub fn new(
        h: Arc<ParityCheckMatrix>,
        adj: Arc<AdjacencyIndex>,
        config: DecoderConfig,
    ) -> Result<Self, LdpcError> {
        adj.ensure_matches(&h)?;
        if let Some(c) = (0..adj.n_checks()).find(|&c| adj.check_degree(c) == 1) {
            return Err(LdpcError::DegenerateCheck(Node::Check(c)));
        }

        let store = MessageStore::new(&adj);
        let syndrome = SyndromeChecker::new(h.rows());
        let posterior = vec![0.0; h.cols()];

        Ok(Self {
            h,
            adj,
            config,
            store,
            syndrome,
            posterior,
        })
    }

    /// Build a decoder whose adjacency is derived from `h`.
    pub fn from_matrix(h: ParityCheckMatrix, config: DecoderConfig) -> Result<Self, LdpcError> {
        let adj = AdjacencyIndex::from_matrix(&h);
        Self::new(Arc::new(h), Arc::new(adj), config)
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn matrix(&self) -> &ParityCheckMatrix {
        &self.h
    }

    pub fn adjacency(&self) -> &AdjacencyIndex {
        &self.adj
    }

    /// A-posteriori LLRs left by the last decode call.
    pub fn posterior_llrs(&self) -> &[f64] {
        &self.posterior
    }

    /// Decode with the configured iteration limit.
    pub fn decode(&mut self, llr_in: &[f64]) -> Result<DecodeResult, LdpcError> {
        self.decode_with_limit(llr_in, self.config.max_iters)
    }

    /// Decode with an explicit iteration limit.
    pub fn decode_with_limit(
        &mut self,
        llr_in: &[f64],
        max_iters: usize,
    ) -> Result<DecodeResult, LdpcError> {
        if llr_in.len() != self.h.cols() {
            return Err(LdpcError::LengthMismatch {
                what: "LLRin",
                expected: self.h.cols(),
                actual: llr_in.len(),
            });
        }
        if self.config.reject_non_finite {
            if let Some((index, &value)) = llr_in.iter().enumerate().find(|(_, x)| !x.is_finite()) {
                return Err(LdpcError::NonFiniteLlr { index, value });
            }
        }

        let result = match self.config.boxplus {
            BoxPlusKind::Linear => self.run::<LinearBoxPlus>(llr_in, max_iters),
            BoxPlusKind::Exact => self.run::<ExactBoxPlus>(llr_in, max_iters),
        };

        if result.cw_valid {
            debug!("decoded after {} iterations", result.iterations);
        } else {
            debug!("no codeword within {} iterations", max_iters);
        }
        Ok(result)
    }

    fn run<B: BoxPlus>(&mut self, llr_in: &[f64], max_iters: usize) -> DecodeResult {
        self.posterior.copy_from_slice(llr_in);
        self.store.reset(&self.adj, llr_in);

        if self.syndrome.llrs_satisfy(&self.h, llr_in) {
            return DecodeResult {
                hard_bits: hard_decision(llr_in),
                cw_valid: true,
                iterations: 0,
            };
        }

        let mut cw_valid = false;
        let mut iterations = max_iters;
        for iter in 0..max_iters {
            self.store.update_checks::<B>(&self.adj);
            self.store.update_vars(&self.adj, llr_in, &mut self.posterior);

            let posterior = &self.posterior;
            let odd = self.syndrome.unsatisfied(&self.h, |v| posterior[v] < 0.0);
            trace!("iteration {}: {} unsatisfied checks", iter, odd);
            if odd == 0 {
                cw_valid = true;
                iterations = iter;
                break;
            }
        }

        DecodeResult {
            hard_bits: hard_decision(&self.posterior),
            cw_valid,
            iterations,
        }
    }
}

/// One-shot decode from the toolbox's raw inputs: CSC matrix, channel LLRs,
/// degree arrays and column-major slot tables.
pub fn decode_spa(
    h: &ParityCheckMatrix,
    llr_in: &[f64],
    sum_x1: &[usize],
    sum_x2: &[usize],
    i_idx: &[usize],
    j_idx: &[usize],
    max_iters: usize,
) -> Result<DecodeResult, LdpcError> {
    let adj = AdjacencyIndex::from_tables(h, sum_x1, sum_x2, i_idx, j_idx)?;
    let config = DecoderConfig::default().with_max_iters(max_iters);
    SpaDecoder::new(Arc::new(h.clone()), Arc::new(adj), config)?.decode(llr_in)
}
