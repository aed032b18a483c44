//! Width conventions for typed reads and writes
//!
//! A width of 0 selects decimal text. Non-zero widths select a binary
//! encoding of `|width|` bytes: little-endian when positive, big-endian when
//! negative. Integers accept 1 to 8 bytes (two's complement); reals accept 4
//! (single) and 8 (double).

use tessera_core::{ModelError, ModelResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Width {
    Text,
    Binary { bytes: usize, little_endian: bool },
}

fn binary(width: i32) -> Width {
    Width::Binary {
        bytes: width.unsigned_abs() as usize,
        little_endian: width > 0,
    }
}

pub(crate) fn integer_width(width: i32) -> ModelResult<Width> {
    match width {
        0 => Ok(Width::Text),
        -8..=8 => Ok(binary(width)),
        _ => Err(ModelError::parameter("width", format!("{} is not 0 or ±1…±8 for an integer", width))),
    }
}

pub(crate) fn real_width(width: i32) -> ModelResult<Width> {
    match width {
        0 => Ok(Width::Text),
        4 | -4 | 8 | -8 => Ok(binary(width)),
        _ => Err(ModelError::parameter("width", format!("{} is not 0, ±4 or ±8 for a real", width))),
    }
}

fn ordered(mut le: Vec<u8>, little_endian: bool) -> Vec<u8> {
    if !little_endian {
        le.reverse();
    }
    le
}

/// Two's complement in `bytes` bytes; fails when `value` does not fit
pub(crate) fn encode_integer(value: i64, bytes: usize, little_endian: bool) -> ModelResult<Vec<u8>> {
    if bytes < 8 {
        let limit = 1i64 << (8 * bytes - 1);
        if value < -limit || value >= limit {
            return Err(ModelError::parameter(
                "value",
                format!("{} does not fit in {} byte(s)", value, bytes),
            ));
        }
    }
    Ok(ordered(value.to_le_bytes()[..bytes].to_vec(), little_endian))
}

/// Sign-extending decode of up to 8 bytes
pub(crate) fn decode_integer(raw: &[u8], little_endian: bool) -> i64 {
    let le = ordered(raw.to_vec(), little_endian);
    let negative = le.last().is_some_and(|&b| b & 0x80 != 0);
    let mut full = if negative { [0xFF; 8] } else { [0; 8] };
    full[..le.len()].copy_from_slice(&le);
    i64::from_le_bytes(full)
}

pub(crate) fn encode_real(value: f64, bytes: usize, little_endian: bool) -> Vec<u8> {
    let le = if bytes == 4 {
        (value as f32).to_le_bytes().to_vec()
    } else {
        value.to_le_bytes().to_vec()
    };
    ordered(le, little_endian)
}

pub(crate) fn decode_real(raw: &[u8], little_endian: bool) -> f64 {
    let le = ordered(raw.to_vec(), little_endian);
    match le.len() {
        4 => {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&le);
            f32::from_le_bytes(buf) as f64
        }
        _ => {
            let mut buf = [0u8; 8];
            buf[..le.len().min(8)].copy_from_slice(&le[..le.len().min(8)]);
            f64::from_le_bytes(buf)
        }
    }
}

/// Decimal, `0x` hexadecimal or `0b` binary with an optional sign
pub(crate) fn parse_integer_text(token: &str) -> Option<i64> {
    let (negative, body) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    let (radix, digits) = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        (16, hex)
    } else if let Some(bin) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        (2, bin)
    } else {
        (10, body)
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = i128::from(u64::from_str_radix(digits, radix).ok()?);
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths() {
        assert_eq!(integer_width(0).unwrap(), Width::Text);
        assert_eq!(
            integer_width(-2).unwrap(),
            Width::Binary { bytes: 2, little_endian: false }
        );
        assert!(integer_width(9).is_err());
        assert!(real_width(2).is_err());
        assert!(matches!(real_width(-4), Ok(Width::Binary { bytes: 4, little_endian: false })));
    }

    #[test]
    fn test_integer_bytes() {
        assert_eq!(encode_integer(-2, 2, true).unwrap(), vec![0xFE, 0xFF]);
        assert_eq!(encode_integer(0x0102, 2, false).unwrap(), vec![0x01, 0x02]);
        assert_eq!(decode_integer(&[0xFE, 0xFF], true), -2);
        assert_eq!(decode_integer(&[0x80], true), -128);
        assert_eq!(decode_integer(&[0x00, 0x80], false), 128);
        assert!(encode_integer(128, 1, true).is_err());
        assert!(encode_integer(-129, 1, true).is_err());
        assert_eq!(decode_integer(&encode_integer(i64::MIN, 8, false).unwrap(), false), i64::MIN);
    }

    #[test]
    fn test_real_bytes() {
        assert_eq!(decode_real(&encode_real(1.5, 4, false), false), 1.5);
        assert_eq!(decode_real(&encode_real(0.1, 8, true), true), 0.1);
        assert_eq!(encode_real(1.0, 8, false)[0], 0x3F);
    }

    #[test]
    fn test_integer_text() {
        assert_eq!(parse_integer_text("42"), Some(42));
        assert_eq!(parse_integer_text("-0x1F"), Some(-31));
        assert_eq!(parse_integer_text("+0b101"), Some(5));
        assert_eq!(parse_integer_text("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_integer_text("9223372036854775808"), None);
        assert_eq!(parse_integer_text("--1"), None);
        assert_eq!(parse_integer_text("0x"), None);
        assert_eq!(parse_integer_text("12a"), None);
    }
}
