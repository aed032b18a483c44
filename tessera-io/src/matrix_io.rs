//! Matrix load and save by path
//!
//! Loading detects the format from the file's leading bytes; saving writes
//! the binary format when `binary` is set and CSV otherwise.

use std::path::Path;
use tessera_core::{Element, ModelResult};
use tessera_matrix::{BooleanMatrix, ComplexMatrix, IntegerMatrix, Matrix, MatrixFileFormat, RealMatrix};

pub fn load_matrix<T: Element>(path: impl AsRef<Path>) -> ModelResult<Matrix<T>> {
    Matrix::from_file(path)
}

pub fn save_matrix<T: Element>(matrix: &Matrix<T>, path: impl AsRef<Path>, binary: bool) -> ModelResult<()> {
    let format = if binary { MatrixFileFormat::Binary } else { MatrixFileFormat::Csv };
    matrix.to_file(path, format)
}

pub fn load_boolean_matrix(path: impl AsRef<Path>) -> ModelResult<BooleanMatrix> {
    load_matrix(path)
}

pub fn load_integer_matrix(path: impl AsRef<Path>) -> ModelResult<IntegerMatrix> {
    load_matrix(path)
}

pub fn load_real_matrix(path: impl AsRef<Path>) -> ModelResult<RealMatrix> {
    load_matrix(path)
}

pub fn load_complex_matrix(path: impl AsRef<Path>) -> ModelResult<ComplexMatrix> {
    load_matrix(path)
}

pub fn save_boolean_matrix(matrix: &BooleanMatrix, path: impl AsRef<Path>, binary: bool) -> ModelResult<()> {
    save_matrix(matrix, path, binary)
}

pub fn save_integer_matrix(matrix: &IntegerMatrix, path: impl AsRef<Path>, binary: bool) -> ModelResult<()> {
    save_matrix(matrix, path, binary)
}

pub fn save_real_matrix(matrix: &RealMatrix, path: impl AsRef<Path>, binary: bool) -> ModelResult<()> {
    save_matrix(matrix, path, binary)
}

pub fn save_complex_matrix(matrix: &ComplexMatrix, path: impl AsRef<Path>, binary: bool) -> ModelResult<()> {
    save_matrix(matrix, path, binary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tessera_core::{Complex, ModelError, StorageKind};

    #[test]
    fn test_real_round_trip_both_formats() {
        let dir = tempdir().unwrap();
        let m = RealMatrix::from_rows(&[vec![1.0, 2.5], vec![-3.0, 0.125]]).unwrap();
        for binary in [false, true] {
            let path = dir.path().join(format!("m{}", binary));
            save_real_matrix(&m, &path, binary).unwrap();
            assert_eq!(load_real_matrix(&path).unwrap(), m);
        }
    }

    #[test]
    fn test_kind_conversion_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ints.bin");
        let m = IntegerMatrix::from_rows(&[vec![1, 0, 3]]).unwrap();
        save_integer_matrix(&m, &path, true).unwrap();

        let as_complex = load_complex_matrix(&path).unwrap();
        assert_eq!(as_complex.get(0, 2), Some(Complex::new(3.0, 0.0)));
        let as_bool = load_boolean_matrix(&path).unwrap();
        assert_eq!(as_bool.to_rows(), vec![vec![true, false, true]]);
    }

    #[test]
    fn test_sparse_binary_keeps_storage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sparse.bin");
        let mut m = BooleanMatrix::sparse(3, 3);
        m.update(2, 3, true).unwrap();
        save_boolean_matrix(&m, &path, true).unwrap();
        let loaded = load_boolean_matrix(&path).unwrap();
        assert_eq!(loaded.storage_kind(), StorageKind::Sparse);
        assert_eq!(loaded.get(1, 2), Some(true));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_real_matrix(dir.path().join("absent.csv")),
            Err(ModelError::FileOpenError { .. })
        ));
    }
}
