//! Lazy transform state
//!
//! Transforms are a 2-bit tag: bit 0 is transpose, bit 1 is conjugate.
//! Composition is XOR, so the folding table is
//!
//! | incoming \ current | N  | Tt | Cj | Aj |
//! |--------------------|----|----|----|----|
//! | transpose          | Tt | N  | Aj | Cj |
//! | conjugate          | Cj | Aj | N  | Tt |
//! | adjoint            | Aj | Cj | Tt | N  |

use std::fmt;
use tessera_core::ElementKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Transform(u8);

impl Transform {
    pub const NONE: Transform = Transform(0);
    pub const TRANSPOSE: Transform = Transform(1);
    pub const CONJUGATE: Transform = Transform(2);
    pub const ADJOINT: Transform = Transform(3);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn is_transposed(self) -> bool {
        self.0 & 1 != 0
    }

    pub fn is_conjugated(self) -> bool {
        self.0 & 2 != 0
    }

    /// Fold an incoming transform into this one
    pub fn then(self, incoming: Transform) -> Transform {
        Transform(self.0 ^ incoming.0)
    }

    /// Drop the conjugate bit for kinds where it is a no-op
    pub fn for_kind(self, kind: ElementKind) -> Transform {
        if kind == ElementKind::Complex {
            self
        } else {
            Transform(self.0 & 1)
        }
    }

    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "none",
            1 => "transpose",
            2 => "conjugate",
            _ => "adjoint",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Transform; 4] = [
        Transform::NONE,
        Transform::TRANSPOSE,
        Transform::CONJUGATE,
        Transform::ADJOINT,
    ];

    #[test]
    fn test_folding_table() {
        let expected = [
            // transpose row
            [Transform::TRANSPOSE, Transform::NONE, Transform::ADJOINT, Transform::CONJUGATE],
            // conjugate row
            [Transform::CONJUGATE, Transform::ADJOINT, Transform::NONE, Transform::TRANSPOSE],
            // adjoint row
            [Transform::ADJOINT, Transform::CONJUGATE, Transform::TRANSPOSE, Transform::NONE],
        ];
        let incoming = [Transform::TRANSPOSE, Transform::CONJUGATE, Transform::ADJOINT];
        for (row, op) in incoming.iter().enumerate() {
            for (col, current) in ALL.iter().enumerate() {
                assert_eq!(current.then(*op), expected[row][col], "{} then {}", current, op);
            }
        }
    }

    #[test]
    fn test_involutions() {
        for t in ALL {
            assert_eq!(t.then(t), Transform::NONE);
        }
        assert_eq!(Transform::CONJUGATE.then(Transform::TRANSPOSE), Transform::ADJOINT);
    }

    #[test]
    fn test_for_kind() {
        assert_eq!(Transform::ADJOINT.for_kind(ElementKind::Real), Transform::TRANSPOSE);
        assert_eq!(Transform::CONJUGATE.for_kind(ElementKind::Integer), Transform::NONE);
        assert_eq!(Transform::ADJOINT.for_kind(ElementKind::Complex), Transform::ADJOINT);
    }
}
