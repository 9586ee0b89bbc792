//! Decimal text rendering for the formatted append operations.
//!
//! Floating values are rendered at a fixed number of *significant*
//! digits with trailing zeros removed, switching to exponent form
//! outside `[1e-4, 10^digits)` — the behavior of a C++ ostream with
//! `setprecision`, which the container format's textual sections were
//! written with. 17 significant digits round-trip any IEEE-754
//! binary64 value.

/// Render an `f32` at 7 significant digits.
#[must_use]
pub fn float32_to_text(value: f32) -> String {
    float_to_text(f64::from(value), 7)
}

/// Render an `f64` at 17 significant digits (lossless round-trip).
#[must_use]
pub fn float64_to_text(value: f64) -> String {
    float_to_text(value, 17)
}

/// Render `value` at `significant` digits, `%g`-style.
#[must_use]
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn float_to_text(value: f64, significant: usize) -> String {
    debug_assert!(significant >= 1);

    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_owned();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_owned();
    }

    // Round at the requested precision first; the decimal exponent of
    // the *rounded* value decides between fixed and exponent form.
    let scientific = format!("{:.*e}", significant - 1, value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .expect("scientific formatting always contains an exponent");
    let exponent: i32 = exponent
        .parse()
        .expect("scientific exponent is a decimal integer");

    if exponent < -4 || exponent >= significant as i32 {
        let mantissa = trim_trailing_zeros(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    } else {
        let decimals = (significant as i32 - 1 - exponent).max(0) as usize;
        let fixed = format!("{value:.decimals$}");
        trim_trailing_zeros(&fixed).to_owned()
    }
}

fn trim_trailing_zeros(text: &str) -> &str {
    if !text.contains('.') {
        return text;
    }
    let text = text.trim_end_matches('0');
    text.strip_suffix('.').unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn integral_doubles_drop_the_point() {
        assert_eq!(float64_to_text(0.0), "0");
        assert_eq!(float64_to_text(1.0), "1");
        assert_eq!(float64_to_text(-42.0), "-42");
        assert_eq!(float64_to_text(123_456_789.0), "123456789");
    }

    #[test]
    fn fractional_doubles_trim_trailing_zeros() {
        assert_eq!(float64_to_text(1.5), "1.5");
        assert_eq!(float64_to_text(-0.015625), "-0.015625");
        assert_eq!(float64_to_text(2.25), "2.25");
        assert_eq!(float64_to_text(0.001), "0.001");
    }

    #[test]
    fn exponent_form_outside_fixed_range() {
        assert_eq!(float64_to_text(9.5367431640625e-7), "9.5367431640625e-07");
        assert_eq!(float64_to_text(1e17), "1e+17");
        assert_eq!(float64_to_text(-2.5e20), "-2.5e+20");
        assert_eq!(float32_to_text(1e8), "1e+08");
    }

    // Values without an exact binary64 representation expose their
    // stored neighbor at 17 significant digits, as printf's %.17g does.
    #[test]
    fn inexact_values_render_their_stored_neighbor() {
        assert_eq!(float64_to_text(1e-5), "1.0000000000000001e-05");
    }

    #[test]
    fn f32_renders_seven_significant_digits() {
        assert_eq!(float32_to_text(0.1), "0.1");
        #[allow(clippy::approx_constant)]
        let third = 1.0_f32 / 3.0;
        assert_eq!(float32_to_text(third), "0.3333333");
    }

    #[test]
    fn f64_renders_seventeen_significant_digits() {
        let third = 1.0_f64 / 3.0;
        assert_eq!(float64_to_text(third), "0.33333333333333331");
    }

    #[test]
    fn non_finite_values() {
        assert_eq!(float64_to_text(f64::NAN), "nan");
        assert_eq!(float64_to_text(f64::INFINITY), "inf");
        assert_eq!(float64_to_text(f64::NEG_INFINITY), "-inf");
    }

    proptest! {
        // 17 significant digits must round-trip any finite binary64.
        #[test]
        fn f64_text_round_trips(value in proptest::num::f64::NORMAL | proptest::num::f64::SUBNORMAL | proptest::num::f64::ZERO) {
            let text = float64_to_text(value);
            let parsed: f64 = text.parse().expect("rendered float parses");
            prop_assert_eq!(parsed.to_bits(), value.to_bits());
        }
    }
}
