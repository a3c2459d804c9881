//! Price Normalizer
//!
//! Storefront markup writes prices every way imaginable: `6720`, `"6720.00"`,
//! `"6 720 ₽"`, `"6720,50"`. Everything funnels through [`normalize_price`],
//! which never fails: malformed input degrades to `NaN` and callers check
//! `is_finite()` before use.

/// Currency glyph stripped from price text unless configured otherwise
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₽";

/// Raw price as it arrives from markup, an inline call, or a stored record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawPrice<'a> {
    Number(f64),
    Text(&'a str),
    Missing,
}

impl From<f64> for RawPrice<'_> {
    fn from(value: f64) -> Self {
        RawPrice::Number(value)
    }
}

impl<'a> From<&'a str> for RawPrice<'a> {
    fn from(value: &'a str) -> Self {
        RawPrice::Text(value)
    }
}

impl<'a> From<&'a String> for RawPrice<'a> {
    fn from(value: &'a String) -> Self {
        RawPrice::Text(value.as_str())
    }
}

impl<'a> From<Option<&'a str>> for RawPrice<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map(RawPrice::Text).unwrap_or(RawPrice::Missing)
    }
}

pub fn normalize_price<'a>(raw: impl Into<RawPrice<'a>>) -> f64 {
    normalize_price_with(raw, DEFAULT_CURRENCY_SYMBOL)
}

/// Normalize with an explicit currency symbol. Only the first occurrence of
/// the symbol and of `,` are rewritten.
pub fn normalize_price_with<'a>(raw: impl Into<RawPrice<'a>>, currency_symbol: &str) -> f64 {
    let text = match raw.into() {
        RawPrice::Missing => return f64::NAN,
        RawPrice::Number(value) => return finite_or_nan(value),
        RawPrice::Text(text) => text,
    };

    let mut compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if !currency_symbol.is_empty() {
        compact = compact.replacen(currency_symbol, "", 1);
    }
    let compact = compact.replacen(',', ".", 1);

    if compact.is_empty() {
        return f64::NAN;
    }
    compact.parse::<f64>().map(finite_or_nan).unwrap_or(f64::NAN)
}

fn finite_or_nan(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        f64::NAN
    }
}

/// Render a price the way it appears inside synthesized keys. Matches the
/// browser's number-to-string: integral values without a fractional part,
/// exponent form from `1e21` up and below `1e-6`, `NaN` for unresolved prices.
pub fn format_price(value: f64) -> String {
    if value == 0.0 {
        // keeps -0 from leaking into keys
        return "0".to_string();
    }
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    // shortest round-trip digits and decimal exponent
    let scientific = format!("{:e}", value.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (whole, fraction) = digits.split_at(n as usize);
        format!("{}.{}", whole, fraction)
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let sign = if exponent >= 0 { "+" } else { "-" };
        let (lead, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", lead, sign, exponent.abs())
        } else {
            format!("{}.{}e{}{}", lead, rest, sign, exponent.abs())
        }
    };

    if value < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped_price_with_currency() {
        assert_eq!(normalize_price("6 720 ₽"), 6720.0);
        assert_eq!(normalize_price("6\u{a0}720\u{a0}₽"), 6720.0);
        assert_eq!(normalize_price("6\u{202f}720 ₽"), 6720.0);
    }

    #[test]
    fn test_comma_decimal_separator() {
        assert_eq!(normalize_price("6720,50"), 6720.5);
        assert_eq!(normalize_price("6720.00"), 6720.0);
    }

    #[test]
    fn test_numbers_pass_through() {
        assert_eq!(normalize_price(6720.0), 6720.0);
        assert!(normalize_price(f64::INFINITY).is_nan());
    }

    #[test]
    fn test_malformed_degrades_to_nan() {
        assert!(normalize_price("abc").is_nan());
        assert!(normalize_price("").is_nan());
        assert!(normalize_price("  ₽ ").is_nan());
        assert!(normalize_price("inf").is_nan());
        assert!(normalize_price(RawPrice::Missing).is_nan());
        // only the first comma becomes a decimal point
        assert!(normalize_price("1,234,5").is_nan());
    }

    #[test]
    fn test_custom_currency_symbol() {
        assert_eq!(normalize_price_with("$ 12,5", "$"), 12.5);
        assert!(normalize_price_with("12 ₽", "$").is_nan());
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1500.0), "1500");
        assert_eq!(format_price(6720.5), "6720.5");
        assert_eq!(format_price(-0.0), "0");
        assert_eq!(format_price(f64::NAN), "NaN");
        assert_eq!(format_price(-12.5), "-12.5");
        assert_eq!(format_price(0.1), "0.1");
    }

    #[test]
    fn test_format_price_extreme_magnitudes() {
        assert_eq!(format_price(1e21), "1e+21");
        assert_eq!(format_price(2.5e22), "2.5e+22");
        assert_eq!(format_price(123456789012345680000.0), "123456789012345680000");
        assert_eq!(format_price(0.000001), "0.000001");
        assert_eq!(format_price(1e-7), "1e-7");
        assert_eq!(format_price(1.5e-7), "1.5e-7");
        assert_eq!(format_price(f64::INFINITY), "Infinity");
    }
}
