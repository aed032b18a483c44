//! Alphabets and string rendering of scalars

use crate::set::Set;
use crate::tuple::Tuple;
use crate::variant::{Coefficient, Variant};
use tessera_core::config;
use tessera_core::format::{format_printf, render_complex, render_real_with, FormatArg};
use tessera_core::{ModelError, ModelResult, ValueKind};
use tessera_matrix::Matrix;

fn coefficients<T: Coefficient>(m: &Matrix<T>) -> Set {
    m.column_major().into_iter().map(T::into_variant).collect()
}

/// Distinct elements of a tuple or matrix (sets give themselves)
pub fn alphabet(x: &Variant) -> ModelResult<Set> {
    match x {
        Variant::Tuple(t) => Ok(t.iter().cloned().collect()),
        Variant::Set(s) => Ok(s.clone()),
        Variant::MatrixBoolean(m) => Ok(coefficients(m)),
        Variant::MatrixInteger(m) => Ok(coefficients(m)),
        Variant::MatrixReal(m) => Ok(coefficients(m)),
        Variant::MatrixComplex(m) => Ok(coefficients(m)),
        other => Err(ModelError::conversion(other.value_type(), ValueKind::Set)),
    }
}

/// Render a scalar as a string tuple.
///
/// An empty format gives the canonical short rendering; otherwise the
/// format tuple is decoded as a printf-style format with one conversion.
pub fn to_tuple_string(scalar: &Variant, format: &Tuple) -> ModelResult<Tuple> {
    let arg = match scalar {
        Variant::Boolean(b) => FormatArg::Boolean(*b),
        Variant::Integer(i) => FormatArg::Integer(*i),
        Variant::Real(x) => FormatArg::Real(*x),
        Variant::Complex(z) => FormatArg::Complex(*z),
        other => {
            return Err(ModelError::not_a_string(format!("{} is not a scalar", other.value_type())));
        }
    };

    let text = if format.is_empty() {
        match arg {
            FormatArg::Boolean(b) => b.to_string(),
            FormatArg::Integer(i) => i.to_string(),
            FormatArg::Real(x) => render_real_with(x, config::current().significant_digits),
            FormatArg::Complex(z) => render_complex(z),
        }
    } else {
        format_printf(&format.to_utf8_string()?, arg)?
    };
    Ok(Tuple::from_utf8(&text))
}
