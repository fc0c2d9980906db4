//! Seeded random parity-check matrices for simulations and tests.

use crate::{LdpcError, ParityCheckMatrix};
use log::warn;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Random matrix with exactly `col_weight` ones per column ("evencol").
///
/// Rows left with fewer than two ones afterwards get extra random entries,
/// since a check on a single bit cannot pass extrinsic information. The same
/// seed always yields the same matrix.
pub fn make_evencol(
    n_checks: usize,
    n_vars: usize,
    col_weight: usize,
    seed: u64,
) -> Result<ParityCheckMatrix, LdpcError> {
    if n_checks == 0 || n_vars == 0 {
        return Err(LdpcError::InvalidParameter(
            "dimensions must be > 0".to_string(),
        ));
    }

    if n_vars <= n_checks {
        return Err(LdpcError::InvalidParameter(format!(
            "Number of bits ({}) should be greater than number of checks ({})",
            n_vars, n_checks
        )));
    }

    if col_weight == 0 || col_weight > n_checks {
        return Err(LdpcError::InvalidParameter(format!(
            "Checks per bit ({}) must be between 1 and the number of checks ({})",
            col_weight, n_checks
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_mul(10).wrapping_add(1));
    let mut cols: Vec<Vec<usize>> = vec![Vec::with_capacity(col_weight); n_vars];
    let mut row_weight = vec![0usize; n_checks];

    for col in cols.iter_mut() {
        for _ in 0..col_weight {
            place_random(col, &mut row_weight, &mut rng, n_checks);
        }
    }

    let mut added = 0;
    for row in 0..n_checks {
        while row_weight[row] < 2 {
            let j = rng.gen_range(0..n_vars);
            if let Err(pos) = cols[j].binary_search(&row) {
                cols[j].insert(pos, row);
                row_weight[row] += 1;
                added += 1;
            }
        }
    }

    if added > 0 {
        warn!(
            "Added {} extra bit-checks to make row counts at least two",
            added
        );
    }

    Ok(ParityCheckMatrix::from_columns(n_checks, cols))
}

/// Put a one into a row of `col` that does not hold one yet.
fn place_random(col: &mut Vec<usize>, row_weight: &mut [usize], rng: &mut ChaCha8Rng, n_checks: usize) {
    loop {
        let row = rng.gen_range(0..n_checks);
        if let Err(pos) = col.binary_search(&row) {
            col.insert(pos, row);
            row_weight[row] += 1;
            return;
        }
    }
}
