//! Sum-product LDPC decoding over compressed sparse Tanner graphs.
//!
//! The decoder takes channel log-likelihood ratios (negative means the bit is
//! more likely a 1), runs flooding belief propagation with a box-plus check
//! operator, and stops early as soon as the a-posteriori hard decision
//! satisfies every parity check.

pub mod adjacency;
pub mod boxplus;
pub mod construct;
pub mod decoder;
pub mod message;
pub mod sparse_matrix;
pub mod syndrome;

// Re-export main types
pub use adjacency::{AdjacencyIndex, CvSlot, Node, VcSlot};
pub use boxplus::{BoxPlus, BoxPlusKind, ExactBoxPlus, LinearBoxPlus};
pub use construct::make_evencol;
pub use decoder::{decode_spa, DecodeResult, DecoderConfig, SpaDecoder};
pub use message::MessageStore;
pub use sparse_matrix::{ParityCheckMatrix, SparseError};
pub use syndrome::{hard_decision, is_codeword, unsatisfied_checks, SyndromeChecker};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LdpcError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{node} has degree {degree}, exceeding the table width {max}")]
    DegreeOverflow { node: Node, degree: usize, max: usize },
    #[error("{node} has degree {table} in the degree table but {matrix} in the matrix")]
    DegreeMismatch {
        node: Node,
        table: usize,
        matrix: usize,
    },
    #[error("{node} slot {slot} points at position {position}, outside a buffer of {len}")]
    SlotOutOfRange {
        node: Node,
        slot: usize,
        position: usize,
        len: usize,
    },
    #[error("{node} slot {slot} points at position {position}, which is not one of its edges")]
    DanglingSlot {
        node: Node,
        slot: usize,
        position: usize,
    },
    #[error("{0} has degree 1 and cannot produce an extrinsic message")]
    DegenerateCheck(Node),
    #[error("Channel LLR {index} is not finite ({value})")]
    NonFiniteLlr { index: usize, value: f64 },
    #[error("Sparse matrix error: {0}")]
    SparseMatrix(#[from] SparseError),
}
