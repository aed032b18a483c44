//! Tessera IO - Files for the modelling runtime
//!
//! Provides:
//! - `FileRegistry`: process-wide numbered file handles with byte, string,
//!   integer and real reads and writes at selectable widths and byte orders
//! - matrix load/save by path, CSV or binary, detected on load

mod codec;
mod registry;
mod matrix_io;

pub use registry::{FileRegistry, OpenMode};
pub use matrix_io::{
    load_boolean_matrix, load_complex_matrix, load_integer_matrix, load_matrix, load_real_matrix,
    save_boolean_matrix, save_complex_matrix, save_integer_matrix, save_matrix, save_real_matrix,
};
