//! Tessera Matrix - Reference-counted matrices and linear algebra
//!
//! Provides the matrix value type of the tessera runtime:
//! - Dense (column-major) and sparse (coordinate map) storage
//! - Copy-on-write backing shared between handles
//! - Lazy transpose / conjugate / adjoint and scalar multiplier
//! - Arithmetic, products (matrix, Hadamard, Kronecker), structural tests
//! - Decompositions (PLU, SVD, QR, LQ, Cholesky, Hessenberg, Schur, eigen)
//! - Linear solvers, least squares, equilibration, norms
//! - DFT / DCT / Hilbert transforms, pseudo-random constructors
//! - Binary and CSV file formats
//!
//! Dense linear algebra runs on nalgebra over `f64` and complex elements.

mod backing;
mod store;
mod transform;
mod handle;
mod arith;
mod props;
mod elementwise;
mod numeric;
mod decompose;
mod solve;
mod norms;
mod spectral;
mod random;
mod file;

pub use backing::Backing;
pub use store::{DenseStore, SparseStore, Store};
pub use transform::Transform;
pub use handle::{BooleanMatrix, ComplexMatrix, IntegerMatrix, Matrix, RealMatrix};
pub use numeric::Numeric;
pub use decompose::{Eigen, Hessenberg, Lq, Plu, Qr, Schur, Svd};
pub use solve::Equilibration;
pub use file::{MatrixFileFormat, MAGIC};
