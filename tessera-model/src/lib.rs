//! Tessera Model - Polymorphic values and containers
//!
//! Provides the value layer on top of the matrix crate:
//! - `Variant`: scalars, sets, tuples and matrices behind one totally
//!   ordered type, with exact coercions
//! - `Set`: ordered copy-on-write sets with snapshot iterators
//! - `Tuple`: 1-indexed sequences with concatenation, right-cancellation,
//!   search and split
//! - `Range`: integer progressions
//! - `IndexSpec` / `MatrixIndex`: matrix indexing by any index kind
//! - set-theoretic free functions and the built-in type sets
//! - alphabets and string rendering of scalars

mod variant;
mod set;
mod tuple;
mod range;
mod index;
mod set_ops;
mod text;

pub use variant::{Coefficient, Variant};
pub use set::{Set, SetIter};
pub use tuple::{SplitOn, Tuple};
pub use range::Range;
pub use index::{IndexSpec, Indexed, MatrixIndex};
pub use set_ops::{
    cartesian_product_of, cartesian_product_of_all, disjoint_union_of, disjoint_union_of_all,
    intersection_of, intersection_of_all, is_element_of, relative_complement_of,
    relative_complement_of_all, symmetric_difference_of, symmetric_difference_of_all, union_of,
    union_of_all, SetOperand, TypeSet,
};
pub use text::{alphabet, to_tuple_string};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{IndexSpec, Indexed, MatrixIndex, Range, Set, SplitOn, Tuple, TypeSet, Variant};
}
