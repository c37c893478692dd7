use crate::storage::{StateId, StateSet};
use crate::value::ValueOps;

/// A single `(column, value)` entry of a matrix row.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixEntry<V> {
    pub column: StateId,
    pub value: V,
}

impl<V> MatrixEntry<V> {
    pub fn new(column: StateId, value: V) -> MatrixEntry<V> {
        MatrixEntry { column, value }
    }
}

/// An immutable square-or-rectangular sparse matrix in row-compressed form.
///
/// Entries of each row are sorted by column and there are no duplicate columns. Unless the
/// matrix was built with [`SparseMatrixBuilder::keep_zero_entries`], there are also no
/// entries with (syntactically) zero value.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparseMatrix<V> {
    row_starts: Vec<usize>,
    entries: Vec<MatrixEntry<V>>,
    column_count: usize,
}

impl<V: ValueOps> SparseMatrix<V> {
    pub fn row_count(&self) -> usize {
        self.row_starts.len() - 1
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// # Panics
    ///
    /// Reading a row outside of `0..row_count` is a correctness violation.
    pub fn row(&self, row: StateId) -> &[MatrixEntry<V>] {
        let index = row.index();
        assert!(
            index < self.row_count(),
            "Correctness violation: Row {index} out of range for a matrix with {} rows.",
            self.row_count()
        );
        &self.entries[self.row_starts[index]..self.row_starts[index + 1]]
    }

    pub fn get(&self, row: StateId, column: StateId) -> Option<&V> {
        let entries = self.row(row);
        entries
            .binary_search_by_key(&column, |it| it.column)
            .ok()
            .map(|i| &entries[i].value)
    }

    /// Iterate all `(row, column, value)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, StateId, &V)> {
        (0..self.row_count()).flat_map(move |row| {
            let row = StateId::new(row);
            self.row(row).iter().map(move |e| (row, e.column, &e.value))
        })
    }

    /// Sum of the row entries whose column is in `columns`.
    pub fn constrained_row_sum(&self, row: StateId, columns: &StateSet) -> V {
        self.row(row)
            .iter()
            .filter(|e| columns.contains(e.column))
            .fold(V::zero(), |acc, e| acc.add(&e.value))
            .simplify()
    }

    /// For every row in `rows` (in increasing order), the sum of its entries in `columns`.
    pub fn constrained_row_sums(&self, rows: &StateSet, columns: &StateSet) -> Vec<V> {
        rows.iter()
            .map(|row| self.constrained_row_sum(row, columns))
            .collect()
    }

    /// For every row, the sum of `self[row][column] * other[row][column]`.
    ///
    /// Entries missing in `other` count as zero.
    pub fn pointwise_product_row_sums(&self, other: &SparseMatrix<V>) -> Vec<V> {
        assert_eq!(
            self.row_count(),
            other.row_count(),
            "Correctness violation: Pointwise product of matrices with different row counts."
        );
        (0..self.row_count())
            .map(|row| {
                let row = StateId::new(row);
                self.row(row)
                    .iter()
                    .filter_map(|e| other.get(row, e.column).map(|o| e.value.mul(o)))
                    .fold(V::zero(), |acc, it| acc.add(&it))
                    .simplify()
            })
            .collect()
    }

    /// Select the rows in `rows` and the columns in `columns`, renumbering both
    /// to consecutive indices (see [`StateSet::compress`]).
    pub fn submatrix(&self, rows: &StateSet, columns: &StateSet) -> SparseMatrix<V> {
        assert_eq!(rows.universe(), self.row_count());
        assert_eq!(columns.universe(), self.column_count());
        let mut new_column = vec![usize::MAX; self.column_count()];
        for (new_index, column) in columns.iter().enumerate() {
            new_column[column.index()] = new_index;
        }
        let mut builder = SparseMatrixBuilder::new(rows.len(), columns.len());
        for (new_row, row) in rows.iter().enumerate() {
            for entry in self.row(row) {
                let column = new_column[entry.column.index()];
                if column != usize::MAX {
                    builder.add(new_row, column, entry.value.clone());
                }
            }
        }
        builder.build()
    }

    pub fn transpose(&self) -> SparseMatrix<V> {
        let mut builder = SparseMatrixBuilder::new(self.column_count(), self.row_count());
        for (row, column, value) in self.iter() {
            builder.add(column.index(), row.index(), value.clone());
        }
        builder.build()
    }

    /// Convert all values using `f`, dropping entries that become zero.
    pub fn map_values<W: ValueOps>(&self, f: impl Fn(&V) -> W) -> SparseMatrix<W> {
        let mut builder = SparseMatrixBuilder::new(self.row_count(), self.column_count());
        for (row, column, value) in self.iter() {
            builder.add(row.index(), column.index(), f(value));
        }
        builder.build()
    }
}

/// Collects matrix entries in arbitrary order and builds a [`SparseMatrix`].
///
/// Entries with the same position are summed, zero entries are dropped.
pub struct SparseMatrixBuilder<V> {
    rows: Vec<Vec<MatrixEntry<V>>>,
    column_count: usize,
    keep_zeros: bool,
}

impl<V: ValueOps> SparseMatrixBuilder<V> {
    pub fn new(row_count: usize, column_count: usize) -> SparseMatrixBuilder<V> {
        SparseMatrixBuilder {
            rows: vec![Vec::new(); row_count],
            column_count,
            keep_zeros: false,
        }
    }

    /// Keep explicitly added zero entries (e.g. zero self-loops) in the result.
    pub fn keep_zero_entries(mut self) -> SparseMatrixBuilder<V> {
        self.keep_zeros = true;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// # Panics
    ///
    /// The position must be within the dimensions given in [`SparseMatrixBuilder::new`].
    pub fn add(&mut self, row: usize, column: usize, value: V) {
        assert!(
            row < self.rows.len() && column < self.column_count,
            "Entry ({row}, {column}) out of range for a {}x{} matrix.",
            self.rows.len(),
            self.column_count
        );
        self.rows[row].push(MatrixEntry::new(StateId::new(column), value));
    }

    pub fn build(self) -> SparseMatrix<V> {
        let mut row_starts = Vec::with_capacity(self.rows.len() + 1);
        let mut entries = Vec::new();
        row_starts.push(0);
        for mut row in self.rows {
            row.sort_by_key(|e| e.column);
            let mut merged: Vec<MatrixEntry<V>> = Vec::with_capacity(row.len());
            for entry in row {
                match merged.last_mut() {
                    Some(last) if last.column == entry.column => {
                        last.value = last.value.add(&entry.value).simplify();
                    }
                    _ => merged.push(entry),
                }
            }
            let keep_zeros = self.keep_zeros;
            entries.extend(
                merged
                    .into_iter()
                    .filter(|e| keep_zeros || !e.value.is_zero()),
            );
            row_starts.push(entries.len());
        }
        SparseMatrix {
            row_starts,
            entries,
            column_count: self.column_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SparseMatrixBuilder;
    use crate::storage::{StateId, StateSet};

    fn example() -> super::SparseMatrix<f64> {
        let mut builder = SparseMatrixBuilder::new(3, 3);
        builder.add(0, 2, 0.25);
        builder.add(0, 1, 0.5);
        builder.add(0, 1, 0.25);
        builder.add(1, 1, 1.0);
        builder.add(2, 0, 0.0);
        builder.add(2, 2, 1.0);
        builder.build()
    }

    #[test]
    fn builder_sorts_merges_and_drops_zeros() {
        let matrix = example();
        assert_eq!(matrix.entry_count(), 4);
        let row: Vec<_> = matrix.row(StateId::new(0)).iter().map(|e| e.column).collect();
        assert_eq!(row, vec![StateId::new(1), StateId::new(2)]);
        assert_eq!(matrix.get(StateId::new(0), StateId::new(1)), Some(&0.75));
        assert_eq!(matrix.get(StateId::new(2), StateId::new(0)), None);
    }

    #[test]
    fn submatrix_and_transpose() {
        let matrix = example();
        let keep = StateSet::from_indices(3, &[0, 2]);
        let sub = matrix.submatrix(&keep, &keep);
        assert_eq!(sub.row_count(), 2);
        assert_eq!(sub.get(StateId::new(0), StateId::new(1)), Some(&0.25));
        assert_eq!(sub.get(StateId::new(1), StateId::new(1)), Some(&1.0));

        let transposed = matrix.transpose();
        assert_eq!(transposed.get(StateId::new(2), StateId::new(0)), Some(&0.25));
        assert_eq!(transposed.get(StateId::new(1), StateId::new(0)), Some(&0.75));
    }

    #[test]
    fn row_sums() {
        let matrix = example();
        let rows = StateSet::from_indices(3, &[0, 1]);
        let columns = StateSet::from_indices(3, &[2]);
        assert_eq!(matrix.constrained_row_sums(&rows, &columns), vec![0.25, 0.0]);

        let mut rewards = SparseMatrixBuilder::new(3, 3);
        rewards.add(0, 1, 4.0);
        rewards.add(2, 2, 2.0);
        let products = matrix.pointwise_product_row_sums(&rewards.build());
        assert_eq!(products, vec![3.0, 0.0, 2.0]);
    }

    #[test]
    #[should_panic]
    fn row_out_of_range() {
        let _ = example().row(StateId::new(3));
    }
}
