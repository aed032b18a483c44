//! Matrix file formats
//!
//! Binary layout (all integers little-endian):
//!
//! ```text
//! "TSMX" storage-tag element-tag 0 0      8 bytes
//! rows: u64, cols: u64                    16 bytes
//! dense:  rows·cols elements, column-major
//! sparse: nnz: u64, nnz row indices: u64, nnz column indices: u64,
//!         nnz elements
//! ```
//!
//! Element widths are 1 (boolean), 8 (integer, real) and 16 (complex, real
//! part first). CSV files hold one matrix row per line; complex cells are
//! either `re,im` pairs or `re+imj`. A matrix with no elements but a
//! non-zero dimension is written as the single line `#shape ROWSxCOLS`.

use crate::handle::Matrix;
use crate::store::{DenseStore, SparseStore, Store};
use std::path::Path;
use tessera_core::config::{self, CsvComplexStyle};
use tessera_core::format::{parse_complex, render_real_with};
use tessera_core::{convert, Boolean, Complex, Element, ElementKind, FileTarget, Integer, ModelError, ModelResult, Real, StorageKind};

pub const MAGIC: &[u8; 4] = b"TSMX";
const CSV_SHAPE: &str = "#shape ";
const HEADER_LEN: usize = 8 + 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixFileFormat {
    Csv,
    Binary,
}

// ============================================================================
// Binary
// ============================================================================

struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    target: &'a FileTarget,
}

impl<'a> ByteReader<'a> {
    fn take(&mut self, n: usize) -> ModelResult<&'a [u8]> {
        let bytes = self.bytes;
        let end = self.pos.checked_add(n).filter(|&e| e <= bytes.len()).ok_or_else(|| {
            ModelError::file_content(self.target.clone(), format!("truncated matrix data at byte {}", self.pos))
        })?;
        let slice = &bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u64(&mut self) -> ModelResult<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    fn index(&mut self, bound: usize) -> ModelResult<usize> {
        let value = self.u64()?;
        usize::try_from(value)
            .ok()
            .filter(|&v| v < bound)
            .ok_or_else(|| ModelError::file_content(self.target.clone(), format!("index {} out of range", value)))
    }

    fn element<S: Element>(&mut self) -> ModelResult<S> {
        Ok(S::read_le(self.take(S::WIDTH)?))
    }
}

fn decode_store<S: Element>(
    storage: StorageKind,
    rows: usize,
    cols: usize,
    reader: &mut ByteReader<'_>,
) -> ModelResult<Store<S>> {
    match storage {
        StorageKind::Dense => {
            let count = rows.checked_mul(cols).ok_or_else(|| {
                ModelError::file_content(reader.target.clone(), format!("{}x{} is too large", rows, cols))
            })?;
            // validate the length before allocating
            let body = reader.take(count.saturating_mul(S::WIDTH))?;
            let data = body.chunks_exact(S::WIDTH).map(S::read_le).collect();
            DenseStore::from_column_major(rows, cols, data).map(Store::Dense)
        }
        StorageKind::Sparse => {
            let nnz = reader.u64()? as usize;
            let mut keys = Vec::with_capacity(nnz.min(1 << 20));
            let mut row_index = Vec::with_capacity(nnz.min(1 << 20));
            for _ in 0..nnz {
                row_index.push(reader.index(rows)?);
            }
            for r in row_index {
                keys.push((r, reader.index(cols)?));
            }
            let mut entries = Vec::with_capacity(keys.len());
            for key in keys {
                entries.push((key, reader.element::<S>()?));
            }
            Ok(Store::Sparse(SparseStore::from_entries(rows, cols, entries)))
        }
    }
}

impl<T: Element> Matrix<T> {
    pub fn to_binary_bytes(&self) -> Vec<u8> {
        let canonical = self.materialised();
        let store = canonical.store();
        let mut out = Vec::with_capacity(HEADER_LEN + store.number_nonzeros() * T::WIDTH);
        out.extend_from_slice(MAGIC);
        out.push(store.storage_kind().tag());
        out.push(T::KIND.tag());
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&(store.rows() as u64).to_le_bytes());
        out.extend_from_slice(&(store.cols() as u64).to_le_bytes());
        match store {
            Store::Dense(d) => {
                for &v in d.as_slice() {
                    v.write_le(&mut out);
                }
            }
            Store::Sparse(s) => {
                let entries = s.entries();
                out.extend_from_slice(&(entries.len() as u64).to_le_bytes());
                for &(r, _) in entries.keys() {
                    out.extend_from_slice(&(r as u64).to_le_bytes());
                }
                for &(_, c) in entries.keys() {
                    out.extend_from_slice(&(c as u64).to_le_bytes());
                }
                for &v in entries.values() {
                    v.write_le(&mut out);
                }
            }
        }
        out
    }

    /// Decode the binary format, converting from the stored element kind
    pub fn parse_binary(bytes: &[u8], source: impl Into<FileTarget>) -> ModelResult<Self> {
        let target = source.into();
        let mut reader = ByteReader {
            bytes,
            pos: 0,
            target: &target,
        };
        let header = reader.take(8)?;
        if &header[..4] != MAGIC {
            return Err(ModelError::file_content(target.clone(), "missing matrix file signature"));
        }
        let storage = StorageKind::from_tag(header[4])
            .ok_or_else(|| ModelError::file_content(target.clone(), "unknown storage kind"))?;
        let kind = ElementKind::from_tag(header[5])
            .ok_or_else(|| ModelError::file_content(target.clone(), "unknown element kind"))?;
        let rows = reader.u64()? as usize;
        let cols = reader.u64()? as usize;

        let store = match kind {
            ElementKind::Boolean => decode_store::<Boolean>(storage, rows, cols, &mut reader)?.map(convert::<Boolean, T>),
            ElementKind::Integer => decode_store::<Integer>(storage, rows, cols, &mut reader)?.map(convert::<Integer, T>),
            ElementKind::Real => decode_store::<Real>(storage, rows, cols, &mut reader)?.map(convert::<Real, T>),
            ElementKind::Complex => decode_store::<Complex>(storage, rows, cols, &mut reader)?.map(convert::<Complex, T>),
        };
        Ok(Self::from_store(store))
    }

    // ========================================================================
    // CSV
    // ========================================================================

    pub fn to_csv_string(&self, style: CsvComplexStyle) -> String {
        let digits = config::current().significant_digits;
        let real = |x: f64| render_real_with(x, digits);
        let cell = |v: T| -> String {
            match T::KIND {
                ElementKind::Real => real(v.to_complex().re),
                ElementKind::Complex => {
                    let z = v.to_complex();
                    match style {
                        CsvComplexStyle::Pairs => format!("{},{}", real(z.re), real(z.im)),
                        CsvComplexStyle::Suffix => {
                            let sign = if z.im.is_sign_negative() { '-' } else { '+' };
                            format!("{}{}{}j", real(z.re), sign, real(z.im.abs()))
                        }
                    }
                }
                _ => v.render(),
            }
        };

        let (rows, cols) = self.dims();
        if rows * cols == 0 && rows + cols > 0 {
            return format!("{}{}x{}\n", CSV_SHAPE, rows, cols);
        }

        let mut out = String::new();
        for row in self.to_rows() {
            let line: Vec<String> = row.into_iter().map(cell).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }

    /// Parse CSV text. Complex cells are recognised by an `i` or `j`
    /// suffix; without one, complex matrices read `re,im` pairs when `style`
    /// is `Pairs`.
    pub fn parse_csv(text: &str, style: CsvComplexStyle, source: impl Into<FileTarget>) -> ModelResult<Self> {
        let target = source.into();
        let mut lines: Vec<Vec<&str>> = text.lines().map(|l| l.split(',').map(str::trim).collect()).collect();
        while lines.last().is_some_and(|cells| cells.iter().all(|c| c.is_empty())) {
            lines.pop();
        }
        if lines.is_empty() {
            return Ok(Self::new(0, 0));
        }
        if let Some(shape) = text.trim().strip_prefix(CSV_SHAPE) {
            return parse_csv_shape(shape)
                .map(|(rows, cols)| Self::new(rows, cols))
                .ok_or_else(|| ModelError::file_content(target, format!("bad empty-matrix shape '{}'", shape)));
        }

        let suffixed = lines.iter().flatten().any(|cell| cell.ends_with(|ch| ch == 'i' || ch == 'j'));
        let pairs = T::KIND == ElementKind::Complex && style == CsvComplexStyle::Pairs && !suffixed;

        let mut rows: Vec<Vec<T>> = Vec::with_capacity(lines.len());
        for (line_no, cells) in lines.iter().enumerate() {
            let bad = |cell: &str| {
                ModelError::file_content(target.clone(), format!("line {}: cannot parse '{}'", line_no + 1, cell))
            };
            let parse = |cell: &str| -> ModelResult<Complex> { parse_complex(cell).ok_or_else(|| bad(cell)) };

            let row: Vec<T> = if pairs {
                if cells.len() % 2 != 0 {
                    return Err(ModelError::file_content(
                        target.clone(),
                        format!("line {}: odd number of cells for re,im pairs", line_no + 1),
                    ));
                }
                cells
                    .chunks_exact(2)
                    .map(|pair| Ok(T::from_complex(Complex::new(parse(pair[0])?.re, parse(pair[1])?.re))))
                    .collect::<ModelResult<_>>()?
            } else {
                cells
                    .iter()
                    .map(|&cell| match T::parse(cell) {
                        Some(v) => Ok(v),
                        None => parse(cell).map(T::from_complex),
                    })
                    .collect::<ModelResult<_>>()?
            };
            rows.push(row);
        }

        Self::from_rows(&rows).map_err(|_| ModelError::file_content(target, "rows have different lengths"))
    }

    // ========================================================================
    // Files
    // ========================================================================

    pub fn to_file(&self, path: impl AsRef<Path>, format: MatrixFileFormat) -> ModelResult<()> {
        let path = path.as_ref();
        let bytes = match format {
            MatrixFileFormat::Binary => self.to_binary_bytes(),
            MatrixFileFormat::Csv => self.to_csv_string(config::current().csv_complex_style).into_bytes(),
        };
        std::fs::write(path, bytes).map_err(|e| ModelError::file_write(path, &e))?;
        tracing::debug!(path = %path.display(), ?format, rows = self.rows(), cols = self.cols(), "saved matrix");
        Ok(())
    }

    /// Load a matrix, detecting binary or CSV content
    pub fn from_file(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => ModelError::file_open(path, &e),
            _ => ModelError::file_read(path, &e),
        })?;
        let matrix = if bytes.starts_with(MAGIC) {
            Self::parse_binary(&bytes, path)?
        } else {
            let text = std::str::from_utf8(&bytes)
                .map_err(|e| ModelError::file_content(path, format!("not UTF-8: {}", e)))?;
            Self::parse_csv(text, config::current().csv_complex_style, path)?
        };
        tracing::debug!(path = %path.display(), rows = matrix.rows(), cols = matrix.cols(), "loaded matrix");
        Ok(matrix)
    }
}

/// `ROWSxCOLS` of a matrix with no elements
fn parse_csv_shape(shape: &str) -> Option<(usize, usize)> {
    let (rows, cols) = shape.trim().split_once('x')?;
    let (rows, cols) = (rows.parse::<usize>().ok()?, cols.parse::<usize>().ok()?);
    (rows.checked_mul(cols)? == 0).then_some((rows, cols))
}
