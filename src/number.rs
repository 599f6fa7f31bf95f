//! Number to text conversions that match the ECMAScript `Number` methods.
//!
//! Rounding is decided on the exact binary value of the float. Exact ties
//! go to the larger magnitude, the way `toFixed` and `toExponential` do,
//! which differs from the round-half-even of `format!("{:.2}")`.

/// Largest digit count accepted by `toFixed`/`toExponential`.
pub const MAX_DIGITS: usize = 100;

/// `Number.prototype.toFixed`.
pub fn to_fixed(x: f64, digits: usize) -> String {
    if !x.is_finite() {
        return non_finite(x);
    }
    if x.abs() >= 1e21 {
        return to_js_string(x);
    }
    let digits = digits.min(MAX_DIGITS);
    let exact = ExactDecimal::of(x.abs());
    let mut int_len = exact.int_len;

    let (mut kept, carry) = round_half_up(&exact.digits, int_len + digits);
    if carry {
        kept.insert(0, b'1');
        int_len += 1;
    }

    let mut out = String::with_capacity(kept.len() + 2);
    if x < 0.0 {
        out.push('-');
    }
    push_digits(&mut out, &kept[..int_len]);
    if digits > 0 {
        out.push('.');
        push_digits(&mut out, &kept[int_len..]);
    }
    out
}

/// `Number.prototype.toExponential`.
pub fn to_exponential(x: f64, digits: usize) -> String {
    if !x.is_finite() {
        return non_finite(x);
    }
    let digits = digits.min(MAX_DIGITS);

    let (mantissa, exponent) = if x == 0.0 {
        (vec![b'0'; digits + 1], 0)
    } else {
        let exact = ExactDecimal::of(x.abs());
        let first = exact
            .digits
            .iter()
            .position(|&d| d != b'0')
            .unwrap_or(exact.digits.len() - 1);
        let mut exponent = exact.int_len as i32 - 1 - first as i32;
        let (mut kept, carry) = round_half_up(&exact.digits[first..], digits + 1);
        if carry {
            kept.insert(0, b'1');
            kept.truncate(digits + 1);
            exponent += 1;
        }
        (kept, exponent)
    };

    let mut out = String::with_capacity(digits + 8);
    if x < 0.0 {
        out.push('-');
    }
    push_digits(&mut out, &mantissa[..1]);
    if digits > 0 {
        out.push('.');
        push_digits(&mut out, &mantissa[1..]);
    }
    out.push('e');
    out.push(if exponent < 0 { '-' } else { '+' });
    out.push_str(&exponent.unsigned_abs().to_string());
    out
}

/// `Number.prototype.toString()` with the default radix.
pub fn to_js_string(x: f64) -> String {
    if !x.is_finite() {
        return non_finite(x);
    }
    if x == 0.0 {
        return "0".to_string();
    }
    let abs = x.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let s = format!("{:e}", x);
        return match s.split_once('e') {
            Some((m, e)) if !e.starts_with('-') => format!("{}e+{}", m, e),
            _ => s,
        };
    }
    format!("{}", x)
}

/// `Math.round`: halves go toward positive infinity.
pub fn js_round(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let floor = x.floor();
    if x - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

fn non_finite(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x > 0.0 {
        "Infinity".to_string()
    } else {
        "-Infinity".to_string()
    }
}

/// All decimal digits of a non-negative finite float, integer part first.
struct ExactDecimal {
    digits: Vec<u8>,
    int_len: usize,
}

impl ExactDecimal {
    fn of(x: f64) -> Self {
        // a float with k binary fraction digits has exactly k decimal ones
        let text = format!("{:.*}", binary_fraction_digits(x), x);
        let int_len = text.find('.').unwrap_or(text.len());
        let digits = text.bytes().filter(u8::is_ascii_digit).collect();
        Self { digits, int_len }
    }
}

fn binary_fraction_digits(x: f64) -> usize {
    let bits = x.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exp) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    };
    if mantissa == 0 {
        return 0;
    }
    let exp = exp + mantissa.trailing_zeros() as i32;
    if exp >= 0 {
        0
    } else {
        exp.unsigned_abs() as usize
    }
}

/// Keeps `keep` digits, rounding on the first dropped digit. Returns the
/// kept digits and whether the carry ran past the first one.
fn round_half_up(digits: &[u8], keep: usize) -> (Vec<u8>, bool) {
    let mut kept = digits[..keep.min(digits.len())].to_vec();
    kept.resize(keep, b'0');
    if digits.len() <= keep || digits[keep] < b'5' {
        return (kept, false);
    }
    for d in kept.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return (kept, false);
        }
    }
    (kept, true)
}

fn push_digits(out: &mut String, digits: &[u8]) {
    out.extend(digits.iter().map(|&d| d as char));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_rounds_ties_away_from_zero() {
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(-2.5, 0), "-3");
        assert_eq!(to_fixed(0.125, 2), "0.13");
        // 1.005 is stored slightly below the tie
        assert_eq!(to_fixed(1.005, 2), "1.00");
    }

    #[test]
    fn fixed_carries_into_integer_part() {
        assert_eq!(to_fixed(9.996, 2), "10.00");
        assert_eq!(to_fixed(999.5, 0), "1000");
        assert_eq!(to_fixed(0.96, 1), "1.0");
    }

    #[test]
    fn fixed_sign_handling() {
        assert_eq!(to_fixed(-0.0, 2), "0.00");
        assert_eq!(to_fixed(-0.001, 2), "-0.00");
        assert_eq!(to_fixed(-1.25, 3), "-1.250");
    }

    #[test]
    fn fixed_large_and_special_values() {
        assert_eq!(to_fixed(1e21, 2), "1e+21");
        assert_eq!(to_fixed(123456789.0, 0), "123456789");
        assert_eq!(to_fixed(f64::NAN, 2), "NaN");
        assert_eq!(to_fixed(f64::NEG_INFINITY, 2), "-Infinity");
    }

    #[test]
    fn exponential_forms() {
        assert_eq!(to_exponential(1234.5678, 2), "1.23e+3");
        assert_eq!(to_exponential(0.00012346, 3), "1.235e-4");
        assert_eq!(to_exponential(0.0, 2), "0.00e+0");
        assert_eq!(to_exponential(1.0, 0), "1e+0");
        assert_eq!(to_exponential(-5e-7, 1), "-5.0e-7");
        assert_eq!(to_exponential(9.99, 1), "1.0e+1");
    }

    #[test]
    fn js_string_forms() {
        assert_eq!(to_js_string(-0.0), "0");
        assert_eq!(to_js_string(42.0), "42");
        assert_eq!(to_js_string(0.5), "0.5");
        assert_eq!(to_js_string(2e21), "2e+21");
        assert_eq!(to_js_string(1.5e-7), "1.5e-7");
    }

    #[test]
    fn math_round_semantics() {
        assert_eq!(js_round(2.5), 3.0);
        assert_eq!(js_round(-2.5), -2.0);
        assert_eq!(js_round(-2.6), -3.0);
        assert_eq!(js_round(0.49999999999999994), 0.0);
    }
}
