//! Kind tags for elements, values and backing stores

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar domain of a matrix element.
///
/// Declaration order is the promotion order: `Boolean < Integer < Real < Complex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Boolean,
    Integer,
    Real,
    Complex,
}

impl ElementKind {
    /// Kind an operator result takes for operands of kinds `self` and `other`
    pub fn join(self, other: ElementKind) -> ElementKind {
        self.max(other)
    }

    /// True if a value of this kind can be widened to `target` without loss
    pub fn promotes_to(self, target: ElementKind) -> bool {
        self <= target
    }

    /// Value kind of a scalar of this element kind
    pub fn scalar_kind(self) -> ValueKind {
        match self {
            ElementKind::Boolean => ValueKind::Boolean,
            ElementKind::Integer => ValueKind::Integer,
            ElementKind::Real => ValueKind::Real,
            ElementKind::Complex => ValueKind::Complex,
        }
    }

    /// Value kind of a matrix over this element kind
    pub fn matrix_kind(self) -> ValueKind {
        match self {
            ElementKind::Boolean => ValueKind::MatrixBoolean,
            ElementKind::Integer => ValueKind::MatrixInteger,
            ElementKind::Real => ValueKind::MatrixReal,
            ElementKind::Complex => ValueKind::MatrixComplex,
        }
    }

    /// One-byte tag used by the binary matrix format
    pub fn tag(self) -> u8 {
        match self {
            ElementKind::Boolean => b'B',
            ElementKind::Integer => b'I',
            ElementKind::Real => b'R',
            ElementKind::Complex => b'C',
        }
    }

    pub fn from_tag(tag: u8) -> Option<ElementKind> {
        match tag {
            b'B' => Some(ElementKind::Boolean),
            b'I' => Some(ElementKind::Integer),
            b'R' => Some(ElementKind::Real),
            b'C' => Some(ElementKind::Complex),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        self.scalar_kind().name()
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Backing representation of a matrix, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StorageKind {
    Dense,
    Sparse,
}

impl StorageKind {
    pub fn tag(self) -> u8 {
        match self {
            StorageKind::Dense => b'D',
            StorageKind::Sparse => b'S',
        }
    }

    pub fn from_tag(tag: u8) -> Option<StorageKind> {
        match tag {
            b'D' => Some(StorageKind::Dense),
            b'S' => Some(StorageKind::Sparse),
            _ => None,
        }
    }
}

/// Kind of payload a `Variant` may carry.
///
/// Declaration order is the first key of the variant total order.
/// `Variant` itself is only used to describe "any kind" in conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    None,
    Boolean,
    Integer,
    Real,
    Complex,
    Set,
    Tuple,
    MatrixBoolean,
    MatrixInteger,
    MatrixReal,
    MatrixComplex,
    Variant,
}

impl ValueKind {
    /// Element kind for scalar kinds
    pub fn element_kind(self) -> Option<ElementKind> {
        match self {
            ValueKind::Boolean => Some(ElementKind::Boolean),
            ValueKind::Integer => Some(ElementKind::Integer),
            ValueKind::Real => Some(ElementKind::Real),
            ValueKind::Complex => Some(ElementKind::Complex),
            _ => None,
        }
    }

    /// Element kind of the coefficients for matrix kinds
    pub fn matrix_element_kind(self) -> Option<ElementKind> {
        match self {
            ValueKind::MatrixBoolean => Some(ElementKind::Boolean),
            ValueKind::MatrixInteger => Some(ElementKind::Integer),
            ValueKind::MatrixReal => Some(ElementKind::Real),
            ValueKind::MatrixComplex => Some(ElementKind::Complex),
            _ => None,
        }
    }

    pub fn is_scalar(self) -> bool {
        self.element_kind().is_some()
    }

    pub fn is_matrix(self) -> bool {
        self.matrix_element_kind().is_some()
    }

    /// Type name for error messages
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::None => "None",
            ValueKind::Boolean => "Boolean",
            ValueKind::Integer => "Integer",
            ValueKind::Real => "Real",
            ValueKind::Complex => "Complex",
            ValueKind::Set => "Set",
            ValueKind::Tuple => "Tuple",
            ValueKind::MatrixBoolean => "MatrixBoolean",
            ValueKind::MatrixInteger => "MatrixInteger",
            ValueKind::MatrixReal => "MatrixReal",
            ValueKind::MatrixComplex => "MatrixComplex",
            ValueKind::Variant => "Variant",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
