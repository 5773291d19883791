//! Utility functions and types used accross the library
use crate::Scalar;
use std::fmt;

/// Number of significant digits used by `scalar_fmt`
pub const SCALAR_PRECISION: usize = 6;

/// Restrict value to a certain interval
#[inline]
pub fn clamp<T>(val: T, min: T, max: T) -> T
where
    T: PartialOrd,
{
    if val < min {
        min
    } else if val > max {
        max
    } else {
        val
    }
}

/// Format floats the same way C `printf("%g")` does
///
/// Six significant digits, trailing zeros are removed, exponent notation is
/// used when the exponent is less than -4 or not less than the precision.
pub fn scalar_fmt(f: &mut fmt::Formatter<'_>, value: Scalar) -> fmt::Result {
    if value.is_nan() {
        return f.write_str("nan");
    }
    if value.is_infinite() {
        return f.write_str(if value < 0.0 { "-inf" } else { "inf" });
    }
    if value == 0.0 {
        return f.write_str(if value.is_sign_negative() { "-0" } else { "0" });
    }

    // rounding to significant digits may bump the exponent (999999.5 -> 1e+06),
    // so the exponent is taken from the already rounded representation
    let sci = format!("{:.*e}", SCALAR_PRECISION - 1, value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some(parts) => parts,
        None => return f.write_str(&sci),
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    if exp < -4 || exp >= SCALAR_PRECISION as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        write!(f, "{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs())
    } else {
        let digits = (SCALAR_PRECISION as i32 - 1 - exp) as usize;
        let fixed = format!("{:.*}", digits, value);
        f.write_str(trim_zeros(&fixed))
    }
}

fn trim_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Wrapper which displays a scalar with `scalar_fmt`
#[derive(Clone, Copy, PartialEq)]
pub struct ScalarFmt(pub Scalar);

impl fmt::Display for ScalarFmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        scalar_fmt(f, self.0)
    }
}

impl fmt::Debug for ScalarFmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        scalar_fmt(f, self.0)
    }
}
