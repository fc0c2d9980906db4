//! Extrinsic message buffers and the two flooding half-iterations.

use crate::adjacency::{AdjacencyIndex, CvSlot, VcSlot};
use crate::boxplus::BoxPlus;

/// Variable-to-check (`mvc`) and check-to-variable (`mcv`) messages, plus the
/// forward/backward box-plus scratch used by the check update.
#[derive(Debug, Clone)]
pub struct MessageStore {
    mvc: Vec<f64>,
    mcv: Vec<f64>,
    ml: Vec<f64>,
    mr: Vec<f64>,
}

impl MessageStore {
    pub fn new(adj: &AdjacencyIndex) -> Self {
        Self {
            mvc: vec![0.0; adj.n_vars() * adj.cmax()],
            mcv: vec![0.0; adj.n_checks() * adj.vmax()],
            ml: vec![0.0; adj.vmax()],
            mr: vec![0.0; adj.vmax()],
        }
    }

    /// Seed every slot of variable `v` with `llr_in[v]` and clear the check
    /// messages.
    pub fn reset(&mut self, adj: &AdjacencyIndex, llr_in: &[f64]) {
        for k in 0..adj.cmax() {
            let row = &mut self.mvc[k * adj.n_vars()..(k + 1) * adj.n_vars()];
            row.copy_from_slice(llr_in);
        }
        self.mcv.fill(0.0);
    }

    pub fn vc(&self, slot: VcSlot) -> f64 {
        self.mvc[slot.index()]
    }

    pub fn cv(&self, slot: CvSlot) -> f64 {
        self.mcv[slot.index()]
    }

    /// Check-node half-iteration.
    ///
    /// Each outgoing message of a check of degree `d` is the box-plus of the
    /// other `d - 1` incoming ones. Running combinations from the left (`ml`)
    /// and from the right (`mr`) give all `d` outputs in O(d): the end slots
    /// take the opposite running value whole, interior slot `k` joins
    /// `ml[k-1]` with `mr[d-2-k]`. Checks of degree below two send nothing.
    pub fn update_checks<B: BoxPlus>(&mut self, adj: &AdjacencyIndex) {
        for c in 0..adj.n_checks() {
            let inbox = adj.check_inbox(c);
            if inbox.len() < 2 {
                continue;
            }
            let n = inbox.len() - 1;

            self.ml[0] = self.mvc[inbox[0].index()];
            self.mr[0] = self.mvc[inbox[n].index()];
            for i in 1..n {
                self.ml[i] = B::combine(self.ml[i - 1], self.mvc[inbox[i].index()]);
                self.mr[i] = B::combine(self.mr[i - 1], self.mvc[inbox[n - i].index()]);
            }

            self.mcv[adj.cv_slot(c, 0).index()] = self.mr[n - 1];
            self.mcv[adj.cv_slot(c, n).index()] = self.ml[n - 1];
            for i in 1..n {
                self.mcv[adj.cv_slot(c, i).index()] = B::combine(self.ml[i - 1], self.mr[n - 1 - i]);
            }
        }
    }

    /// Variable-node half-iteration. Writes the a-posteriori LLRs into
    /// `posterior` and sends each check the total minus its own message.
    pub fn update_vars(&mut self, adj: &AdjacencyIndex, llr_in: &[f64], posterior: &mut [f64]) {
        for (v, (&llr, out)) in llr_in.iter().zip(posterior.iter_mut()).enumerate() {
            let inbox = adj.var_inbox(v);
            let total = inbox.iter().fold(llr, |acc, slot| acc + self.mcv[slot.index()]);
            *out = total;
            for (k, slot) in inbox.iter().enumerate() {
                self.mvc[adj.vc_slot(v, k).index()] = total - self.mcv[slot.index()];
            }
        }
    }
}
