//! Storage strata
//!
//! Every element kind has two representations:
//! - [`DenseStore`]: contiguous column-major buffer;
//! - [`SparseStore`]: ordered coordinate map keyed by `(row, col)`, giving
//!   O(log nnz) lookup and row-major iteration of the non-zeros.
//!
//! All coordinates at this layer are 0-based and assumed in range.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use tessera_core::{Element, ModelError, ModelResult, StorageKind};

#[derive(Debug, Clone, PartialEq)]
pub struct DenseStore<T: Element> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Element> DenseStore<T> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::zero(); rows * cols],
        }
    }

    /// Wrap a column-major buffer of exactly `rows * cols` elements
    pub fn from_column_major(rows: usize, cols: usize, data: Vec<T>) -> ModelResult<Self> {
        if data.len() != rows * cols {
            return Err(ModelError::parameter(
                "data",
                format!("expected {} elements for {}x{}, got {}", rows * cols, rows, cols, data.len()),
            ));
        }
        Ok(Self { rows, cols, data })
    }

    /// Fill column by column from `f(row, col)`
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for c in 0..cols {
            for r in 0..rows {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        col * self.rows + row
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SparseStore<T: Element> {
    rows: usize,
    cols: usize,
    entries: BTreeMap<(usize, usize), T>,
}

impl<T: Element> SparseStore<T> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: BTreeMap::new(),
        }
    }

    /// Build from coordinates; zeros are dropped and later duplicates win
    pub fn from_entries(
        rows: usize,
        cols: usize,
        entries: impl IntoIterator<Item = ((usize, usize), T)>,
    ) -> Self {
        let entries = entries
            .into_iter()
            .filter(|&((r, c), v)| r < rows && c < cols && !v.is_zero())
            .collect();
        Self { rows, cols, entries }
    }

    pub fn entries(&self) -> &BTreeMap<(usize, usize), T> {
        &self.entries
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Store<T: Element> {
    Dense(DenseStore<T>),
    Sparse(SparseStore<T>),
}

impl<T: Element> Store<T> {
    pub fn zeros(kind: StorageKind, rows: usize, cols: usize) -> Self {
        match kind {
            StorageKind::Dense => Store::Dense(DenseStore::zeros(rows, cols)),
            StorageKind::Sparse => Store::Sparse(SparseStore::zeros(rows, cols)),
        }
    }

    pub fn storage_kind(&self) -> StorageKind {
        match self {
            Store::Dense(_) => StorageKind::Dense,
            Store::Sparse(_) => StorageKind::Sparse,
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            Store::Dense(d) => d.rows,
            Store::Sparse(s) => s.rows,
        }
    }

    pub fn cols(&self) -> usize {
        match self {
            Store::Dense(d) => d.cols,
            Store::Sparse(s) => s.cols,
        }
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    pub fn at(&self, row: usize, col: usize) -> T {
        match self {
            Store::Dense(d) => d.data.get(d.offset(row, col)).copied().unwrap_or_else(T::zero),
            Store::Sparse(s) => s.entries.get(&(row, col)).copied().unwrap_or_else(T::zero),
        }
    }

    /// Writable slot; sparse stores only accept writes through [`Store::update`]
    pub fn at_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        match self {
            Store::Dense(d) => {
                let offset = d.offset(row, col);
                d.data.get_mut(offset)
            }
            Store::Sparse(_) => None,
        }
    }

    pub fn update(&mut self, row: usize, col: usize, value: T) {
        match self {
            Store::Dense(d) => {
                let offset = d.offset(row, col);
                if let Some(slot) = d.data.get_mut(offset) {
                    *slot = value;
                }
            }
            Store::Sparse(s) => {
                if value.is_zero() {
                    s.entries.remove(&(row, col));
                } else if row < s.rows && col < s.cols {
                    s.entries.insert((row, col), value);
                }
            }
        }
    }

    pub fn number_nonzeros(&self) -> usize {
        match self {
            Store::Dense(d) => d.data.iter().filter(|v| !v.is_zero()).count(),
            Store::Sparse(s) => s.entries.len(),
        }
    }

    /// Non-zero entries in row-major order
    pub fn nonzeros(&self) -> Vec<(usize, usize, T)> {
        match self {
            Store::Dense(d) => {
                let mut out = Vec::new();
                for r in 0..d.rows {
                    for c in 0..d.cols {
                        let v = d.data[d.offset(r, c)];
                        if !v.is_zero() {
                            out.push((r, c, v));
                        }
                    }
                }
                out
            }
            Store::Sparse(s) => s.entries.iter().map(|(&(r, c), &v)| (r, c, v)).collect(),
        }
    }

    /// All elements in column-major order
    pub fn column_major(&self) -> Vec<T> {
        match self {
            Store::Dense(d) => d.data.clone(),
            Store::Sparse(s) => {
                let mut data = vec![T::zero(); s.rows * s.cols];
                for (&(r, c), &v) in &s.entries {
                    data[c * s.rows + r] = v;
                }
                data
            }
        }
    }

    /// Element-wise map into another kind. `f` must send zero to zero since
    /// sparse stores only map their non-zeros.
    pub fn map<U: Element>(&self, f: impl Fn(T) -> U) -> Store<U> {
        match self {
            Store::Dense(d) => Store::Dense(DenseStore {
                rows: d.rows,
                cols: d.cols,
                data: d.data.iter().map(|&v| f(v)).collect(),
            }),
            Store::Sparse(s) => Store::Sparse(SparseStore::from_entries(
                s.rows,
                s.cols,
                s.entries.iter().map(|(&k, &v)| (k, f(v))),
            )),
        }
    }

    pub fn to_dense(&self) -> Store<T> {
        match self {
            Store::Dense(_) => self.clone(),
            Store::Sparse(s) => Store::Dense(DenseStore {
                rows: s.rows,
                cols: s.cols,
                data: self.column_major(),
            }),
        }
    }

    pub fn to_sparse(&self) -> Store<T> {
        match self {
            Store::Sparse(_) => self.clone(),
            Store::Dense(d) => Store::Sparse(SparseStore::from_entries(
                d.rows,
                d.cols,
                self.nonzeros().into_iter().map(|(r, c, v)| ((r, c), v)),
            )),
        }
    }

    /// Resize preserving the overlap; new cells are zero.
    ///
    /// A dense store fails without allocating when `rows × cols` elements
    /// can not be held.
    pub fn resize_to(&mut self, rows: usize, cols: usize, force_realloc: bool) -> ModelResult<()> {
        match self {
            Store::Dense(d) => {
                if d.rows == rows && d.cols == cols && !force_realloc {
                    return Ok(());
                }
                let too_large = |details: String| {
                    ModelError::parameter("dimensions", format!("{}x{} dense matrix: {}", rows, cols, details))
                };
                let len = rows
                    .checked_mul(cols)
                    .filter(|n| n.checked_mul(std::mem::size_of::<T>()).is_some_and(|b| b <= isize::MAX as usize))
                    .ok_or_else(|| too_large("exceeds the address space".to_string()))?;
                let mut data = Vec::new();
                data.try_reserve_exact(len).map_err(|e| too_large(e.to_string()))?;
                data.resize(len, T::zero());
                for c in 0..cols.min(d.cols) {
                    for r in 0..rows.min(d.rows) {
                        data[c * rows + r] = d.data[d.offset(r, c)];
                    }
                }
                if force_realloc {
                    data.shrink_to_fit();
                }
                *d = DenseStore { rows, cols, data };
            }
            Store::Sparse(s) => {
                s.entries.retain(|&(r, c), _| r < rows && c < cols);
                s.rows = rows;
                s.cols = cols;
            }
        }
        Ok(())
    }

    pub fn row_reverse(&self) -> Store<T> {
        let rows = self.rows();
        self.remap(self.rows(), self.cols(), |r, c| (rows - 1 - r, c))
    }

    pub fn column_reverse(&self) -> Store<T> {
        let cols = self.cols();
        self.remap(self.rows(), self.cols(), |r, c| (r, cols - 1 - c))
    }

    /// Copy of the store with the transpose applied
    pub fn transposed(&self) -> Store<T> {
        self.remap(self.cols(), self.rows(), |r, c| (c, r))
    }

    /// Place `other` to the right of `self`
    pub fn combine_left_right(&self, other: &Store<T>) -> ModelResult<Store<T>> {
        if self.rows() != other.rows() {
            return Err(ModelError::dimensions("combine_left_right", self.dims(), other.dims()));
        }
        Ok(self.stack(other, self.rows(), self.cols() + other.cols(), (0, self.cols())))
    }

    /// Place `other` below `self`
    pub fn combine_top_bottom(&self, other: &Store<T>) -> ModelResult<Store<T>> {
        if self.cols() != other.cols() {
            return Err(ModelError::dimensions("combine_top_bottom", self.dims(), other.dims()));
        }
        Ok(self.stack(other, self.rows() + other.rows(), self.cols(), (self.rows(), 0)))
    }

    /// Shape then element-wise equality, independent of storage kind
    pub fn is_equal_to(&self, other: &Store<T>) -> bool {
        if self.dims() != other.dims() {
            return false;
        }
        match (self, other) {
            (Store::Dense(a), Store::Dense(b)) => a.data == b.data,
            (Store::Sparse(a), Store::Sparse(b)) => a.entries == b.entries,
            _ => self.column_major() == other.column_major(),
        }
    }

    /// Storage kind tag, then dimensions, then raw element bytes column-major
    pub fn relative_order(&self, other: &Store<T>) -> Ordering {
        self.storage_kind()
            .tag()
            .cmp(&other.storage_kind().tag())
            .then_with(|| self.rows().cmp(&other.rows()))
            .then_with(|| self.cols().cmp(&other.cols()))
            .then_with(|| compare_bytes(&self.column_major(), &other.column_major()))
    }

    fn remap(&self, rows: usize, cols: usize, to: impl Fn(usize, usize) -> (usize, usize)) -> Store<T> {
        match self {
            Store::Dense(d) => {
                let mut data = vec![T::zero(); rows * cols];
                for c in 0..d.cols {
                    for r in 0..d.rows {
                        let (nr, nc) = to(r, c);
                        data[nc * rows + nr] = d.data[d.offset(r, c)];
                    }
                }
                Store::Dense(DenseStore { rows, cols, data })
            }
            Store::Sparse(s) => Store::Sparse(SparseStore {
                rows,
                cols,
                entries: s.entries.iter().map(|(&(r, c), &v)| (to(r, c), v)).collect(),
            }),
        }
    }

    fn stack(&self, other: &Store<T>, rows: usize, cols: usize, shift: (usize, usize)) -> Store<T> {
        let (dr, dc) = shift;
        match (self, other) {
            (Store::Sparse(a), Store::Sparse(b)) => {
                let mut entries = a.entries.clone();
                entries.extend(b.entries.iter().map(|(&(r, c), &v)| ((r + dr, c + dc), v)));
                Store::Sparse(SparseStore { rows, cols, entries })
            }
            _ => {
                let mut out = DenseStore::zeros(rows, cols);
                for (r, c, v) in self.nonzeros() {
                    let offset = out.offset(r, c);
                    out.data[offset] = v;
                }
                for (r, c, v) in other.nonzeros() {
                    let offset = out.offset(r + dr, c + dc);
                    out.data[offset] = v;
                }
                Store::Dense(out)
            }
        }
    }
}

fn compare_bytes<T: Element>(a: &[T], b: &[T]) -> Ordering {
    let mut left = Vec::with_capacity(T::WIDTH);
    let mut right = Vec::with_capacity(T::WIDTH);
    for (&x, &y) in a.iter().zip(b) {
        left.clear();
        right.clear();
        x.write_le(&mut left);
        y.write_le(&mut right);
        match left.cmp(&right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense_2x3() -> Store<i64> {
        // [[1, 2, 3], [4, 5, 6]]
        Store::Dense(DenseStore::from_column_major(2, 3, vec![1, 4, 2, 5, 3, 6]).unwrap())
    }

    #[test]
    fn test_column_major_layout() {
        let s = dense_2x3();
        assert_eq!(s.at(0, 1), 2);
        assert_eq!(s.at(1, 0), 4);
        assert_eq!(s.dims(), (2, 3));
    }

    #[test]
    fn test_sparse_row_major_iteration() {
        let s = dense_2x3().to_sparse();
        let order: Vec<_> = s.nonzeros().iter().map(|&(_, _, v)| v).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5, 6]);
        assert!(s.is_equal_to(&dense_2x3()));
    }

    #[test]
    fn test_sparse_update_drops_zero() {
        let mut s: Store<f64> = Store::zeros(StorageKind::Sparse, 3, 3);
        s.update(1, 2, 4.0);
        assert_eq!(s.number_nonzeros(), 1);
        s.update(1, 2, 0.0);
        assert_eq!(s.number_nonzeros(), 0);
        assert!(s.at_mut(0, 0).is_none());
    }

    #[test]
    fn test_resize_preserves_overlap() {
        for mut s in [dense_2x3(), dense_2x3().to_sparse()] {
            s.resize_to(3, 2, false).unwrap();
            assert_eq!(s.dims(), (3, 2));
            assert_eq!(s.at(1, 1), 5);
            assert_eq!(s.at(2, 1), 0);
        }
    }

    #[test]
    fn test_resize_beyond_address_space() {
        let mut d = dense_2x3();
        assert!(matches!(
            d.resize_to(usize::MAX, 2, false),
            Err(ModelError::InvalidParameterValue { .. })
        ));
        assert!(d.resize_to(1 << 40, 1 << 30, false).is_err());
        assert!(d.is_equal_to(&dense_2x3()));

        let mut s = dense_2x3().to_sparse();
        s.resize_to(usize::MAX, 2, false).unwrap();
        assert_eq!(s.rows(), usize::MAX);
    }

    #[test]
    fn test_reverse() {
        let s = dense_2x3();
        assert_eq!(s.row_reverse().at(0, 0), 4);
        assert_eq!(s.column_reverse().at(0, 0), 3);
        assert_eq!(s.to_sparse().column_reverse().at(1, 2), 4);
        assert_eq!(s.transposed().at(2, 1), 6);
    }

    #[test]
    fn test_combine() {
        let s = dense_2x3();
        let wide = s.combine_left_right(&s).unwrap();
        assert_eq!(wide.dims(), (2, 6));
        assert_eq!(wide.at(1, 3), 4);
        let tall = s.to_sparse().combine_top_bottom(&s.to_sparse()).unwrap();
        assert_eq!(tall.storage_kind(), StorageKind::Sparse);
        assert_eq!(tall.at(3, 2), 6);
        assert!(s.combine_top_bottom(&s.transposed()).is_err());
    }

    #[test]
    fn test_relative_order() {
        let s = dense_2x3();
        assert_eq!(s.relative_order(&s.clone()), Ordering::Equal);
        assert_eq!(s.relative_order(&s.to_sparse()), Ordering::Less);
        assert_eq!(s.relative_order(&s.transposed()), Ordering::Less);
    }
}
