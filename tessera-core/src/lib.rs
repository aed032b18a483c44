//! Tessera Core - Fundamental types
//!
//! This crate provides the types shared by every tessera crate:
//! - `ModelError`: the error taxonomy, with machine-readable codes
//! - `ElementKind`, `ValueKind`, `StorageKind`: kind tags
//! - `Element`: scalar arithmetic for boolean, integer, real and complex
//! - number rendering (canonical short form and printf-style)
//! - `RuntimeConfig`: process-wide tolerances and output conventions

mod error;
mod kind;
mod scalar;
pub mod config;
pub mod format;

pub use error::{codes, FileTarget, ModelError, ModelResult};
pub use kind::{ElementKind, StorageKind, ValueKind};
pub use scalar::{convert, Boolean, Complex, Element, Integer, Real};
pub use config::{CsvComplexStyle, RuntimeConfig};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Boolean, Complex, Element, ElementKind, Integer, ModelError, ModelResult, Real, StorageKind,
        ValueKind,
    };
    pub use crate::error::codes;
}
