//! Message-slot tables tying the Tanner graph to the message buffers.
//!
//! Variable-to-check messages live in an `n_vars x cmax` buffer and
//! check-to-variable messages in an `n_checks x vmax` buffer, both stored
//! column-major: slot `k` of variable `v` is at `v + k * n_vars`, slot `k` of
//! check `c` at `c + k * n_checks`. This is the layout of the `i_idx` / `j_idx`
//! tables handed over by the simulation toolbox, so imported tables are used
//! as-is.

use crate::{LdpcError, ParityCheckMatrix};
use std::fmt;

/// Position of a variable-to-check message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VcSlot(usize);

/// Position of a check-to-variable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CvSlot(usize);

impl VcSlot {
    pub fn index(self) -> usize {
        self.0
    }
}

impl CvSlot {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node of the Tanner graph, used to point at the culprit in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Variable(usize),
    Check(usize),
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Variable(v) => write!(f, "variable {}", v),
            Node::Check(c) => write!(f, "check {}", c),
        }
    }
}

/// Per-node inboxes: for each variable the check-to-variable slots it sums,
/// for each check the variable-to-check slots it combines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyIndex {
    n_vars: usize,
    n_checks: usize,
    cmax: usize,
    vmax: usize,
    var_offsets: Vec<usize>,
    var_inbox: Vec<CvSlot>,
    check_offsets: Vec<usize>,
    check_inbox: Vec<VcSlot>,
}

impl AdjacencyIndex {
    /// Derive the tables from the matrix. A variable's checks keep the CSC
    /// order, a check's variables are taken in increasing column order.
    pub fn from_matrix(h: &ParityCheckMatrix) -> Self {
        let n_vars = h.cols();
        let n_checks = h.rows();
        let rows = h.row_entries();
        let cmax = (0..n_vars).map(|v| h.col_weight(v)).max().unwrap_or(0);
        let vmax = rows.iter().map(Vec::len).max().unwrap_or(0);

        // Position of every edge inside its check's variable list.
        let mut fill = vec![0usize; n_checks];
        let mut edge_check_slot = vec![0usize; h.nnz()];
        for v in 0..n_vars {
            let base = h.col_offsets()[v];
            for (k, &c) in h.entries_in_col(v).iter().enumerate() {
                edge_check_slot[base + k] = fill[c];
                fill[c] += 1;
            }
        }

        let mut var_offsets = Vec::with_capacity(n_vars + 1);
        let mut var_inbox = Vec::with_capacity(h.nnz());
        var_offsets.push(0);
        // The k-th variable of check c, seen from that variable's side.
        let mut check_side: Vec<Vec<VcSlot>> = rows.iter().map(|r| Vec::with_capacity(r.len())).collect();
        for v in 0..n_vars {
            let base = h.col_offsets()[v];
            for (k, &c) in h.entries_in_col(v).iter().enumerate() {
                var_inbox.push(CvSlot(c + edge_check_slot[base + k] * n_checks));
                check_side[c].push(VcSlot(v + k * n_vars));
            }
            var_offsets.push(var_inbox.len());
        }

        let mut check_offsets = Vec::with_capacity(n_checks + 1);
        let mut check_inbox = Vec::with_capacity(h.nnz());
        check_offsets.push(0);
        for slots in check_side {
            check_inbox.extend(slots);
            check_offsets.push(check_inbox.len());
        }

        Self {
            n_vars,
            n_checks,
            cmax,
            vmax,
            var_offsets,
            var_inbox,
            check_offsets,
            check_inbox,
        }
    }

    /// Adopt caller-supplied degree arrays and index tables.
    ///
    /// `i_idx` is `n_vars x cmax` and `j_idx` is `n_checks x vmax`, both
    /// column-major; the widths are implied by the table lengths. Entries
    /// beyond a node's degree are padding and never read. Every used entry
    /// must address a live slot of a node it is actually connected to in `h`.
    pub fn from_tables(
        h: &ParityCheckMatrix,
        sum_x1: &[usize],
        sum_x2: &[usize],
        i_idx: &[usize],
        j_idx: &[usize],
    ) -> Result<Self, LdpcError> {
        let n_vars = h.cols();
        let n_checks = h.rows();

        if sum_x1.len() != n_vars {
            return Err(LdpcError::LengthMismatch {
                what: "sumX1",
                expected: n_vars,
                actual: sum_x1.len(),
            });
        }
        if sum_x2.len() != n_checks {
            return Err(LdpcError::LengthMismatch {
                what: "sumX2",
                expected: n_checks,
                actual: sum_x2.len(),
            });
        }
        if i_idx.len() % n_vars != 0 {
            return Err(LdpcError::LengthMismatch {
                what: "i_idx",
                expected: (i_idx.len() / n_vars + 1) * n_vars,
                actual: i_idx.len(),
            });
        }
        if j_idx.len() % n_checks != 0 {
            return Err(LdpcError::LengthMismatch {
                what: "j_idx",
                expected: (j_idx.len() / n_checks + 1) * n_checks,
                actual: j_idx.len(),
            });
        }
        let cmax = i_idx.len() / n_vars;
        let vmax = j_idx.len() / n_checks;

        for (v, &degree) in sum_x1.iter().enumerate() {
            let node = Node::Variable(v);
            if degree > cmax {
                return Err(LdpcError::DegreeOverflow { node, degree, max: cmax });
            }
            if degree != h.col_weight(v) {
                return Err(LdpcError::DegreeMismatch {
                    node,
                    table: degree,
                    matrix: h.col_weight(v),
                });
            }
        }
        let row_weights = h.row_weights();
        for (c, &degree) in sum_x2.iter().enumerate() {
            let node = Node::Check(c);
            if degree > vmax {
                return Err(LdpcError::DegreeOverflow { node, degree, max: vmax });
            }
            if degree != row_weights[c] {
                return Err(LdpcError::DegreeMismatch {
                    node,
                    table: degree,
                    matrix: row_weights[c],
                });
            }
        }

        let mut var_offsets = Vec::with_capacity(n_vars + 1);
        let mut var_inbox = Vec::with_capacity(h.nnz());
        var_offsets.push(0);
        for v in 0..n_vars {
            let node = Node::Variable(v);
            for slot in 0..sum_x1[v] {
                let position = i_idx[v + slot * n_vars];
                let len = n_checks * vmax;
                if position >= len {
                    return Err(LdpcError::SlotOutOfRange { node, slot, position, len });
                }
                let (c, k) = (position % n_checks, position / n_checks);
                if k >= sum_x2[c] || !h.find(c, v) {
                    return Err(LdpcError::DanglingSlot { node, slot, position });
                }
                var_inbox.push(CvSlot(position));
            }
            var_offsets.push(var_inbox.len());
        }

        let mut check_offsets = Vec::with_capacity(n_checks + 1);
        let mut check_inbox = Vec::with_capacity(h.nnz());
        check_offsets.push(0);
        for c in 0..n_checks {
            let node = Node::Check(c);
            for slot in 0..sum_x2[c] {
                let position = j_idx[c + slot * n_checks];
                let len = n_vars * cmax;
                if position >= len {
                    return Err(LdpcError::SlotOutOfRange { node, slot, position, len });
                }
                let (v, k) = (position % n_vars, position / n_vars);
                if k >= sum_x1[v] || !h.find(c, v) {
                    return Err(LdpcError::DanglingSlot { node, slot, position });
                }
                check_inbox.push(VcSlot(position));
            }
            check_offsets.push(check_inbox.len());
        }

        // Each edge's two slots must name each other.
        for v in 0..n_vars {
            for (slot, cv) in var_inbox[var_offsets[v]..var_offsets[v + 1]].iter().enumerate() {
                let (c, k) = (cv.index() % n_checks, cv.index() / n_checks);
                if check_inbox[check_offsets[c] + k] != VcSlot(v + slot * n_vars) {
                    return Err(LdpcError::DanglingSlot {
                        node: Node::Variable(v),
                        slot,
                        position: cv.index(),
                    });
                }
            }
        }
        for c in 0..n_checks {
            for (slot, vc) in check_inbox[check_offsets[c]..check_offsets[c + 1]].iter().enumerate() {
                let (v, k) = (vc.index() % n_vars, vc.index() / n_vars);
                if var_inbox[var_offsets[v] + k] != CvSlot(c + slot * n_checks) {
                    return Err(LdpcError::DanglingSlot {
                        node: Node::Check(c),
                        slot,
                        position: vc.index(),
                    });
                }
            }
        }

        Ok(Self {
            n_vars,
            n_checks,
            cmax,
            vmax,
            var_offsets,
            var_inbox,
            check_offsets,
            check_inbox,
        })
    }

    /// Export as `(sumX1, sumX2, i_idx, j_idx)` in the toolbox layout, with
    /// unused table entries set to zero.
    pub fn to_tables(&self) -> (Vec<usize>, Vec<usize>, Vec<usize>, Vec<usize>) {
        let sum_x1 = (0..self.n_vars).map(|v| self.var_degree(v)).collect();
        let sum_x2 = (0..self.n_checks).map(|c| self.check_degree(c)).collect();

        let mut i_idx = vec![0; self.n_vars * self.cmax];
        for v in 0..self.n_vars {
            for (k, slot) in self.var_inbox(v).iter().enumerate() {
                i_idx[v + k * self.n_vars] = slot.index();
            }
        }
        let mut j_idx = vec![0; self.n_checks * self.vmax];
        for c in 0..self.n_checks {
            for (k, slot) in self.check_inbox(c).iter().enumerate() {
                j_idx[c + k * self.n_checks] = slot.index();
            }
        }

        (sum_x1, sum_x2, i_idx, j_idx)
    }

    /// Confirm this index describes the graph of `h`: same dimensions and
    /// degrees, and every slot lands on an edge of `h`.
    pub fn ensure_matches(&self, h: &ParityCheckMatrix) -> Result<(), LdpcError> {
        if self.n_vars != h.cols() {
            return Err(LdpcError::LengthMismatch {
                what: "adjacency variables",
                expected: h.cols(),
                actual: self.n_vars,
            });
        }
        if self.n_checks != h.rows() {
            return Err(LdpcError::LengthMismatch {
                what: "adjacency checks",
                expected: h.rows(),
                actual: self.n_checks,
            });
        }

        for v in 0..self.n_vars {
            let node = Node::Variable(v);
            if self.var_degree(v) != h.col_weight(v) {
                return Err(LdpcError::DegreeMismatch {
                    node,
                    table: self.var_degree(v),
                    matrix: h.col_weight(v),
                });
            }
            for (slot, cv) in self.var_inbox(v).iter().enumerate() {
                if !h.find(cv.index() % self.n_checks, v) {
                    return Err(LdpcError::DanglingSlot {
                        node,
                        slot,
                        position: cv.index(),
                    });
                }
            }
        }

        let row_weights = h.row_weights();
        for c in 0..self.n_checks {
            let node = Node::Check(c);
            if self.check_degree(c) != row_weights[c] {
                return Err(LdpcError::DegreeMismatch {
                    node,
                    table: self.check_degree(c),
                    matrix: row_weights[c],
                });
            }
            for (slot, vc) in self.check_inbox(c).iter().enumerate() {
                if !h.find(c, vc.index() % self.n_vars) {
                    return Err(LdpcError::DanglingSlot {
                        node,
                        slot,
                        position: vc.index(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    pub fn n_checks(&self) -> usize {
        self.n_checks
    }

    /// Width of the variable tables (largest variable degree it can hold).
    pub fn cmax(&self) -> usize {
        self.cmax
    }

    /// Width of the check tables (largest check degree it can hold).
    pub fn vmax(&self) -> usize {
        self.vmax
    }

    pub fn var_degree(&self, v: usize) -> usize {
        self.var_offsets[v + 1] - self.var_offsets[v]
    }

    pub fn check_degree(&self, c: usize) -> usize {
        self.check_offsets[c + 1] - self.check_offsets[c]
    }

    /// Check-to-variable slots summed by variable `v`.
    #[inline]
    pub fn var_inbox(&self, v: usize) -> &[CvSlot] {
        &self.var_inbox[self.var_offsets[v]..self.var_offsets[v + 1]]
    }

    /// Variable-to-check slots combined by check `c`.
    #[inline]
    pub fn check_inbox(&self, c: usize) -> &[VcSlot] {
        &self.check_inbox[self.check_offsets[c]..self.check_offsets[c + 1]]
    }

    /// Outgoing slot `k` of variable `v`.
    #[inline]
    pub fn vc_slot(&self, v: usize, k: usize) -> VcSlot {
        VcSlot(v + k * self.n_vars)
    }

    /// Outgoing slot `k` of check `c`.
    #[inline]
    pub fn cv_slot(&self, c: usize, k: usize) -> CvSlot {
        CvSlot(c + k * self.n_checks)
    }
}
