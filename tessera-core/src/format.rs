//! Number rendering
//!
//! Two renderers live here:
//! - the canonical short rendering used by `Display`, CSV output and empty
//!   format strings (shortest round-trip digits, with float noise such as
//!   `0.30000000000000004` folded back to `0.3`);
//! - a printf-style formatter for explicit format strings.

use crate::error::{ModelError, ModelResult};
use crate::scalar::Complex;

/// Default threshold above which a digit string is considered noisy
pub const DEFAULT_SIGNIFICANT_DIGITS: u32 = 15;

/// Smallest run of repeated 0s or 9s that is folded away
const MIN_NOISE_RUN: usize = 3;

/// Render a real number with the canonical short rule
pub fn render_real(value: f64) -> String {
    render_real_with(value, DEFAULT_SIGNIFICANT_DIGITS)
}

/// Render a real number, folding noisy tails of digit strings longer than
/// `significant_digits`
pub fn render_real_with(value: f64, significant_digits: u32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let (digits, exponent) = decimal_digits(value.abs());
    let (digits, exponent) = match fold_noise(&digits, exponent, significant_digits as usize) {
        Some((folded, folded_exp)) => {
            let candidate = layout(&folded, folded_exp);
            match candidate.parse::<f64>() {
                Ok(v) if (v - value.abs()).abs() <= 4.0 * f64::EPSILON * value.abs() => (folded, folded_exp),
                _ => (digits, exponent),
            }
        }
        None => (digits, exponent),
    };

    let body = layout(&digits, exponent);
    if value < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// Render a complex number as `re+imi`
pub fn render_complex(value: Complex) -> String {
    let sign = if value.im.is_sign_negative() { '-' } else { '+' };
    format!("{}{}{}i", render_real(value.re), sign, render_real(value.im.abs()))
}

/// Parse `re`, `imi`, `imj`, `re+imi` or `re-imj`
pub fn parse_complex(text: &str) -> Option<Complex> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let Some(body) = text.strip_suffix('i').or_else(|| text.strip_suffix('j')) else {
        return text.parse::<f64>().ok().map(|re| Complex::new(re, 0.0));
    };

    let bytes = body.as_bytes();
    let split = (1..bytes.len())
        .rev()
        .find(|&k| (bytes[k] == b'+' || bytes[k] == b'-') && !matches!(bytes[k - 1], b'e' | b'E'));

    let parse_imag = |s: &str| -> Option<f64> {
        match s {
            "" | "+" => Some(1.0),
            "-" => Some(-1.0),
            _ => s.parse::<f64>().ok(),
        }
    };

    match split {
        Some(k) => {
            let re = body[..k].trim().parse::<f64>().ok()?;
            let im = parse_imag(body[k..].trim())?;
            Some(Complex::new(re, im))
        }
        None => parse_imag(body).map(|im| Complex::new(0.0, im)),
    }
}

/// Shortest round-trip digits and decimal exponent of a positive finite value
fn decimal_digits(value: f64) -> (Vec<u8>, i32) {
    // `{:e}` yields the shortest representation that round-trips, e.g. "3.0000000000000004e-1"
    let text = format!("{:e}", value);
    let (mantissa, exp) = text.split_once('e').unwrap_or((text.as_str(), "0"));
    let exponent = exp.parse::<i32>().unwrap_or(0);
    let digits: Vec<u8> = mantissa.bytes().filter(|b| b.is_ascii_digit()).collect();
    (digits, exponent)
}

/// Detect a run of repeated 0s or 9s followed by at most one noise digit
fn fold_noise(digits: &[u8], exponent: i32, significant_digits: usize) -> Option<(Vec<u8>, i32)> {
    let n = digits.len();
    if n <= significant_digits {
        return None;
    }
    for p in 0..n - 1 {
        let run = &digits[p..n - 1];
        if run.len() < MIN_NOISE_RUN {
            break;
        }
        if p > 0 && run.iter().all(|&d| d == b'0') {
            return Some((digits[..p].to_vec(), exponent));
        }
        if run.iter().all(|&d| d == b'9') {
            let mut prefix = digits[..p].to_vec();
            return match prefix.last_mut() {
                // p is the first 9 of the run, so the digit before it is not a 9
                Some(last) => {
                    *last += 1;
                    Some((prefix, exponent))
                }
                None => Some((vec![b'1'], exponent + 1)),
            };
        }
    }
    None
}

/// Lay out digits `d0.d1d2...` × 10^exponent, fixed or scientific
fn layout(digits: &[u8], exponent: i32) -> String {
    let mut digits: Vec<u8> = digits.to_vec();
    while digits.len() > 1 && digits.last() == Some(&b'0') {
        digits.pop();
    }
    let text = |d: &[u8]| String::from_utf8_lossy(d).into_owned();

    if (-5..15).contains(&exponent) {
        if exponent >= 0 {
            let int_len = exponent as usize + 1;
            if digits.len() <= int_len {
                let mut s = text(&digits);
                s.extend(std::iter::repeat('0').take(int_len - digits.len()));
                s
            } else {
                format!("{}.{}", text(&digits[..int_len]), text(&digits[int_len..]))
            }
        } else {
            let zeros = "0".repeat((-exponent - 1) as usize);
            format!("0.{}{}", zeros, text(&digits))
        }
    } else if digits.len() == 1 {
        format!("{}e{}", text(&digits), exponent)
    } else {
        format!("{}.{}e{}", text(&digits[..1]), text(&digits[1..]), exponent)
    }
}

// ============================================================================
// printf-style formatting
// ============================================================================

/// A scalar handed to the printf-style formatter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormatArg {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Complex(Complex),
}

#[derive(Debug, Default, Clone, Copy)]
struct Directive {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alternate: bool,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: char,
}

/// Format a single scalar with a printf-style format string.
///
/// The string must hold exactly one conversion (`%%` is a literal percent).
/// Supported conversions: `d i u x X o b e E f F g G s c`.
pub fn format_printf(format: &str, arg: FormatArg) -> ModelResult<String> {
    let mut out = String::new();
    let mut chars = format.char_indices().peekable();
    let mut converted = false;

    while let Some((offset, ch)) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        if let Some((_, '%')) = chars.peek() {
            chars.next();
            out.push('%');
            continue;
        }
        if converted {
            return Err(ModelError::malformed(format, offset));
        }

        let mut directive = Directive::default();
        while let Some(&(_, flag)) = chars.peek() {
            match flag {
                '-' => directive.left = true,
                '+' => directive.plus = true,
                ' ' => directive.space = true,
                '0' => directive.zero = true,
                '#' => directive.alternate = true,
                _ => break,
            }
            chars.next();
        }
        directive.width = take_number(&mut chars);
        if let Some((_, '.')) = chars.peek() {
            chars.next();
            directive.precision = Some(take_number(&mut chars).unwrap_or(0));
        }
        while let Some(&(_, m)) = chars.peek() {
            if matches!(m, 'h' | 'l' | 'L' | 'q' | 'j' | 'z' | 't') {
                chars.next();
            } else {
                break;
            }
        }
        let Some((conv_offset, conversion)) = chars.next() else {
            return Err(ModelError::malformed(format, format.len()));
        };
        if !"diuxXobeEfFgGsc".contains(conversion) {
            return Err(ModelError::malformed(format, conv_offset));
        }
        directive.conversion = conversion;
        out.push_str(&apply_directive(&directive, arg)?);
        converted = true;
    }

    if !converted {
        return Err(ModelError::malformed(format, format.len()));
    }
    Ok(out)
}

fn take_number(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> Option<usize> {
    let mut value: Option<usize> = None;
    while let Some(&(_, c)) = chars.peek() {
        match c.to_digit(10) {
            Some(d) => {
                value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(d as usize));
                chars.next();
            }
            None => break,
        }
    }
    value
}

fn apply_directive(directive: &Directive, arg: FormatArg) -> ModelResult<String> {
    match directive.conversion {
        'd' | 'i' | 'u' => {
            let v = integer_of(arg);
            let digits = pad_precision(v.unsigned_abs().to_string(), directive.precision);
            Ok(pad(directive, sign_of(directive, v < 0), "", &digits, true))
        }
        'x' | 'X' | 'o' | 'b' => {
            let v = integer_of(arg) as u64;
            let (digits, prefix) = match directive.conversion {
                'x' => (format!("{:x}", v), "0x"),
                'X' => (format!("{:X}", v), "0X"),
                'o' => (format!("{:o}", v), "0"),
                _ => (format!("{:b}", v), "0b"),
            };
            let prefix = if directive.alternate && v != 0 { prefix } else { "" };
            Ok(pad(directive, "", prefix, &pad_precision(digits, directive.precision), true))
        }
        'e' | 'E' | 'f' | 'F' | 'g' | 'G' => match arg {
            FormatArg::Complex(c) => {
                let inner = Directive { width: None, ..*directive };
                let re = float_body(&inner, c.re.abs());
                let im_sign = if c.im.is_sign_negative() { "-" } else { "+" };
                let im = float_body(&Directive { plus: false, space: false, ..inner }, c.im.abs());
                let text = format!("{}{}{}i", sign_of(directive, c.re.is_sign_negative()), re, im_sign);
                Ok(pad(directive, "", "", &format!("{}{}", text, im), false))
            }
            other => {
                let v = real_of(other);
                let body = float_body(directive, v.abs());
                Ok(pad(directive, sign_of(directive, v.is_sign_negative() && !v.is_nan()), "", &body, v.is_finite()))
            }
        },
        's' => {
            let mut text = match arg {
                FormatArg::Boolean(b) => b.to_string(),
                FormatArg::Integer(i) => i.to_string(),
                FormatArg::Real(r) => render_real(r),
                FormatArg::Complex(c) => render_complex(c),
            };
            if let Some(p) = directive.precision {
                text = text.chars().take(p).collect();
            }
            Ok(pad(directive, "", "", &text, false))
        }
        _ => {
            let code = integer_of(arg);
            let ch = u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| ModelError::not_a_string(format!("{} is not a Unicode scalar value", code)))?;
            Ok(pad(directive, "", "", &ch.to_string(), false))
        }
    }
}

fn integer_of(arg: FormatArg) -> i64 {
    match arg {
        FormatArg::Boolean(b) => b as i64,
        FormatArg::Integer(i) => i,
        FormatArg::Real(r) => r as i64,
        FormatArg::Complex(c) => c.re as i64,
    }
}

fn real_of(arg: FormatArg) -> f64 {
    match arg {
        FormatArg::Boolean(b) => b as i64 as f64,
        FormatArg::Integer(i) => i as f64,
        FormatArg::Real(r) => r,
        FormatArg::Complex(c) => c.re,
    }
}

fn sign_of(directive: &Directive, negative: bool) -> &'static str {
    if negative {
        "-"
    } else if directive.plus {
        "+"
    } else if directive.space {
        " "
    } else {
        ""
    }
}

fn pad_precision(digits: String, precision: Option<usize>) -> String {
    match precision {
        Some(p) if digits.len() < p => format!("{}{}", "0".repeat(p - digits.len()), digits),
        _ => digits,
    }
}

/// Apply width, justification and zero padding
fn pad(directive: &Directive, sign: &str, prefix: &str, body: &str, numeric: bool) -> String {
    let len = sign.len() + prefix.len() + body.chars().count();
    let width = directive.width.unwrap_or(0);
    if len >= width {
        return format!("{}{}{}", sign, prefix, body);
    }
    let fill = width - len;
    if directive.left {
        format!("{}{}{}{}", sign, prefix, body, " ".repeat(fill))
    } else if directive.zero && numeric {
        format!("{}{}{}{}", sign, prefix, "0".repeat(fill), body)
    } else {
        format!("{}{}{}{}", " ".repeat(fill), sign, prefix, body)
    }
}

/// Render |v| for e/f/g conversions
fn float_body(directive: &Directive, v: f64) -> String {
    let upper = directive.conversion.is_ascii_uppercase();
    if !v.is_finite() {
        let text = if v.is_nan() { "nan" } else { "inf" };
        return if upper { text.to_uppercase() } else { text.to_string() };
    }
    let precision = directive.precision.unwrap_or(6);
    let text = match directive.conversion.to_ascii_lowercase() {
        'f' => format!("{:.*}", precision, v),
        'e' => c_exponent(v, precision),
        _ => {
            let p = precision.max(1);
            let trial = c_exponent(v, p - 1);
            let x = trial
                .rsplit_once('e')
                .and_then(|(_, e)| e.parse::<i32>().ok())
                .unwrap_or(0);
            let text = if x >= -4 && x < p as i32 {
                format!("{:.*}", (p as i32 - 1 - x).max(0) as usize, v)
            } else {
                trial
            };
            if directive.alternate {
                text
            } else {
                strip_fraction_zeros(&text)
            }
        }
    };
    if upper {
        text.to_uppercase()
    } else {
        text
    }
}

/// `%e` layout: mantissa, `e`, sign, at least two exponent digits
fn c_exponent(v: f64, precision: usize) -> String {
    let text = format!("{:.*e}", precision, v);
    match text.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => text,
    }
}

fn strip_fraction_zeros(text: &str) -> String {
    let (mantissa, exponent) = match text.find('e') {
        Some(k) => (&text[..k], &text[k..]),
        None => (text, ""),
    };
    if !mantissa.contains('.') {
        return text.to_string();
    }
    let trimmed = mantissa.trim_end_matches('0').trim_end_matches('.');
    format!("{}{}", trimmed, exponent)
}
