use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SparseError {
    #[error("Invalid matrix dimensions {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },
    #[error("Entry ({row}, {col}) out of bounds")]
    IndexOutOfBounds { row: usize, col: usize },
    #[error("Expected {expected} column offsets, got {actual}")]
    OffsetCount { expected: usize, actual: usize },
    #[error("Column offsets decrease at column {col}")]
    OffsetOrder { col: usize },
    #[error("Column offsets span {span} entries but {nnz} row indices were given")]
    OffsetSpan { span: usize, nnz: usize },
    #[error("Row {row} appears twice in column {col}")]
    DuplicateEntry { row: usize, col: usize },
    #[error("Dense row {row} has {actual} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Binary parity-check matrix in compressed-column form.
///
/// Column `v` (a variable node) owns the run
/// `row_indices[col_offsets[v]..col_offsets[v + 1]]`, the checks that variable
/// participates in. The matrix is immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityCheckMatrix {
    n_rows: usize,
    n_cols: usize,
    col_offsets: Vec<usize>,
    row_indices: Vec<usize>,
}

impl ParityCheckMatrix {
    /// Build from a raw CSC triple, validating every index.
    pub fn from_csc(
        n_rows: usize,
        n_cols: usize,
        row_indices: Vec<usize>,
        col_offsets: Vec<usize>,
    ) -> Result<Self, SparseError> {
        if n_rows == 0 || n_cols == 0 {
            return Err(SparseError::InvalidDimensions {
                rows: n_rows,
                cols: n_cols,
            });
        }

        if col_offsets.len() != n_cols + 1 {
            return Err(SparseError::OffsetCount {
                expected: n_cols + 1,
                actual: col_offsets.len(),
            });
        }

        if col_offsets[0] != 0 || col_offsets[n_cols] != row_indices.len() {
            return Err(SparseError::OffsetSpan {
                span: col_offsets[n_cols].saturating_sub(col_offsets[0]),
                nnz: row_indices.len(),
            });
        }

        if let Some(col) = (0..n_cols).find(|&col| col_offsets[col + 1] < col_offsets[col]) {
            return Err(SparseError::OffsetOrder { col });
        }

        let mut seen = vec![usize::MAX; n_rows];
        for col in 0..n_cols {
            for &row in &row_indices[col_offsets[col]..col_offsets[col + 1]] {
                if row >= n_rows {
                    return Err(SparseError::IndexOutOfBounds { row, col });
                }
                // `seen` remembers the last column that touched each row
                if seen[row] == col {
                    return Err(SparseError::DuplicateEntry { row, col });
                }
                seen[row] = col;
            }
        }

        Ok(Self {
            n_rows,
            n_cols,
            col_offsets,
            row_indices,
        })
    }

    /// Build from `(row, col)` positions of the ones. Repeated positions are
    /// kept once, and rows within a column end up sorted.
    pub fn from_entries<I>(n_rows: usize, n_cols: usize, entries: I) -> Result<Self, SparseError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        if n_rows == 0 || n_cols == 0 {
            return Err(SparseError::InvalidDimensions {
                rows: n_rows,
                cols: n_cols,
            });
        }

        let mut col_entries: Vec<Vec<usize>> = vec![Vec::new(); n_cols];
        for (row, col) in entries {
            if row >= n_rows || col >= n_cols {
                return Err(SparseError::IndexOutOfBounds { row, col });
            }
            let list = &mut col_entries[col];
            if let Err(pos) = list.binary_search(&row) {
                list.insert(pos, row);
            }
        }

        Ok(Self::from_columns(n_rows, col_entries))
    }

    /// Build from dense 0/1 rows; any nonzero byte counts as a one.
    pub fn from_dense<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, SparseError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |r| r.as_ref().len());

        let mut entries = Vec::new();
        for (row, bits) in rows.iter().enumerate() {
            let bits = bits.as_ref();
            if bits.len() != n_cols {
                return Err(SparseError::RaggedRow {
                    row,
                    expected: n_cols,
                    actual: bits.len(),
                });
            }
            entries.extend(
                bits.iter()
                    .enumerate()
                    .filter(|&(_, &b)| b != 0)
                    .map(|(col, _)| (row, col)),
            );
        }

        Self::from_entries(n_rows, n_cols, entries)
    }

    /// Columns must already be duplicate free and in range.
    pub(crate) fn from_columns(n_rows: usize, col_entries: Vec<Vec<usize>>) -> Self {
        let mut col_offsets = Vec::with_capacity(col_entries.len() + 1);
        let mut row_indices = Vec::with_capacity(col_entries.iter().map(Vec::len).sum());
        col_offsets.push(0);
        for list in &col_entries {
            row_indices.extend_from_slice(list);
            col_offsets.push(row_indices.len());
        }

        Self {
            n_rows,
            n_cols: col_entries.len(),
            col_offsets,
            row_indices,
        }
    }

    /// Number of checks.
    pub fn rows(&self) -> usize {
        self.n_rows
    }

    /// Number of variables.
    pub fn cols(&self) -> usize {
        self.n_cols
    }

    /// Number of ones (Tanner graph edges).
    pub fn nnz(&self) -> usize {
        self.row_indices.len()
    }

    pub fn col_offsets(&self) -> &[usize] {
        &self.col_offsets
    }

    pub fn row_indices(&self) -> &[usize] {
        &self.row_indices
    }

    /// Checks touched by variable `col`, in storage order.
    pub fn entries_in_col(&self, col: usize) -> &[usize] {
        &self.row_indices[self.col_offsets[col]..self.col_offsets[col + 1]]
    }

    pub fn find(&self, row: usize, col: usize) -> bool {
        row < self.n_rows && col < self.n_cols && self.entries_in_col(col).contains(&row)
    }

    pub fn col_weight(&self, col: usize) -> usize {
        self.col_offsets[col + 1] - self.col_offsets[col]
    }

    /// Weight of every row, i.e. the check-node degrees.
    pub fn row_weights(&self) -> Vec<usize> {
        let mut weights = vec![0; self.n_rows];
        for &row in &self.row_indices {
            weights[row] += 1;
        }
        weights
    }

    /// Variables touched by each check, in increasing column order.
    pub fn row_entries(&self) -> Vec<Vec<usize>> {
        let mut rows: Vec<Vec<usize>> = self
            .row_weights()
            .into_iter()
            .map(Vec::with_capacity)
            .collect();
        for col in 0..self.n_cols {
            for &row in self.entries_in_col(col) {
                rows[row].push(col);
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let matrix = ParityCheckMatrix::from_entries(3, 4, [(0, 1), (1, 2), (0, 3), (0, 1)]).unwrap();

        assert!(matrix.find(0, 1));
        assert!(matrix.find(1, 2));
        assert!(!matrix.find(2, 0));
        assert!(!matrix.find(7, 0));
        assert_eq!(matrix.nnz(), 3);

        assert_eq!(matrix.col_offsets(), &[0, 0, 1, 2, 3]);
        assert_eq!(matrix.row_entries()[0], vec![1, 3]);
        assert_eq!(matrix.row_weights(), vec![2, 1, 0]);
    }

    #[test]
    fn test_dense_rows() {
        let matrix = ParityCheckMatrix::from_dense(&[[1u8, 1, 0, 1], [0, 1, 1, 0]]).unwrap();
        assert_eq!(matrix.rows(), 2);
        assert_eq!(matrix.cols(), 4);
        assert_eq!(matrix.entries_in_col(1), &[0, 1]);
        assert_eq!(matrix.col_weight(3), 1);

        let ragged: [&[u8]; 2] = [&[1, 0, 1], &[1, 0]];
        assert_eq!(
            ParityCheckMatrix::from_dense(&ragged),
            Err(SparseError::RaggedRow {
                row: 1,
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_csc_validation() {
        let ok = ParityCheckMatrix::from_csc(2, 3, vec![0, 1, 1, 0], vec![0, 2, 3, 4]).unwrap();
        assert_eq!(ok.entries_in_col(0), &[0, 1]);

        assert_eq!(
            ParityCheckMatrix::from_csc(2, 3, vec![0, 1, 1, 0], vec![0, 2, 3]),
            Err(SparseError::OffsetCount {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            ParityCheckMatrix::from_csc(2, 3, vec![0, 1, 1, 0], vec![0, 3, 2, 4]),
            Err(SparseError::OffsetOrder { col: 1 })
        );
        assert_eq!(
            ParityCheckMatrix::from_csc(2, 3, vec![0, 2, 1, 0], vec![0, 2, 3, 4]),
            Err(SparseError::IndexOutOfBounds { row: 2, col: 0 })
        );
        assert_eq!(
            ParityCheckMatrix::from_csc(2, 3, vec![1, 1, 1, 0], vec![0, 2, 3, 4]),
            Err(SparseError::DuplicateEntry { row: 1, col: 0 })
        );
        assert!(matches!(
            ParityCheckMatrix::from_csc(2, 3, vec![0, 1, 1], vec![0, 2, 3, 4]),
            Err(SparseError::OffsetSpan { .. })
        ));
        assert!(ParityCheckMatrix::from_csc(0, 3, vec![], vec![0, 0, 0, 0]).is_err());
    }
}
