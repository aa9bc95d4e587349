//! Exact resource quantities.
//!
//! Quantities follow the platform's textual grammar (`"200m"`, `"10Mi"`,
//! `"1.5Gi"`, `"1e3"`) and are held as a base-10 mantissa/exponent pair so
//! that comparisons never go through binary floating point.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Largest accepted decimal exponent after normalisation.
const MAX_EXPONENT: i32 = 30;

/// Mantissas are kept below 10^38 so two values can always be aligned in a `u128`.
const MANTISSA_LIMIT: u128 = 100_000_000_000_000_000_000_000_000_000_000_000_000;

/// Errors produced while parsing a quantity string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("quantity is empty")]
    Empty,

    #[error("invalid quantity '{input}': {reason}")]
    Invalid { input: String, reason: &'static str },

    #[error("quantity '{0}' is out of range")]
    OutOfRange(String),
}

#[derive(Debug, Clone, Copy)]
enum Suffix {
    /// Multiply by 10^n.
    Decimal(i32),
    /// Multiply by 1024^n.
    Binary(u32),
}

fn parse_suffix(suffix: &str) -> Option<Suffix> {
    let parsed = match suffix {
        "" => Suffix::Decimal(0),
        "n" => Suffix::Decimal(-9),
        "u" => Suffix::Decimal(-6),
        "m" => Suffix::Decimal(-3),
        "k" => Suffix::Decimal(3),
        "M" => Suffix::Decimal(6),
        "G" => Suffix::Decimal(9),
        "T" => Suffix::Decimal(12),
        "P" => Suffix::Decimal(15),
        "E" => Suffix::Decimal(18),
        "Ki" => Suffix::Binary(1),
        "Mi" => Suffix::Binary(2),
        "Gi" => Suffix::Binary(3),
        "Ti" => Suffix::Binary(4),
        "Pi" => Suffix::Binary(5),
        "Ei" => Suffix::Binary(6),
        other => {
            let exponent = other
                .strip_prefix('e')
                .or_else(|| other.strip_prefix('E'))?;
            let digits = exponent
                .strip_prefix(|c: char| c == '+' || c == '-')
                .unwrap_or(exponent);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            Suffix::Decimal(exponent.parse().ok()?)
        }
    };
    Some(parsed)
}

fn decimal_digits(mut value: u128) -> i32 {
    let mut digits = 0;
    while value > 0 {
        value /= 10;
        digits += 1;
    }
    digits
}

/// An exact resource quantity such as `"200m"` CPU or `"10Mi"` memory.
///
/// Equality, hashing and ordering compare numeric values, so `"1"` equals
/// `"1000m"`. Display always returns the text that was parsed.
#[derive(Clone)]
pub struct Quantity {
    text: String,
    mantissa: i128,
    exponent: i32,
}

impl Quantity {
    /// Parse a quantity string.
    pub fn parse(input: &str) -> Result<Self, QuantityError> {
        if input.is_empty() {
            return Err(QuantityError::Empty);
        }
        let invalid = |reason| QuantityError::Invalid {
            input: input.to_string(),
            reason,
        };
        let out_of_range = || QuantityError::OutOfRange(input.to_string());

        let (negative, unsigned) = match input.as_bytes()[0] {
            b'-' => (true, &input[1..]),
            b'+' => (false, &input[1..]),
            _ => (false, input),
        };

        let int_end = unsigned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(unsigned.len());
        let (int_digits, rest) = unsigned.split_at(int_end);

        let (frac_digits, suffix) = match rest.strip_prefix('.') {
            Some(after_dot) => {
                let frac_end = after_dot
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(after_dot.len());
                after_dot.split_at(frac_end)
            }
            None => ("", rest),
        };

        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(invalid("missing digits"));
        }
        let suffix = parse_suffix(suffix).ok_or_else(|| invalid("unknown suffix"))?;

        let frac_digits = frac_digits.trim_end_matches('0');
        let digits = format!("{}{}", int_digits, frac_digits);
        let digits = digits.trim_start_matches('0');
        if digits.len() > 38 {
            return Err(out_of_range());
        }
        let mut mantissa: i128 = if digits.is_empty() {
            0
        } else {
            digits.parse().map_err(|_| out_of_range())?
        };
        let mut exponent = -(frac_digits.len() as i32);

        match suffix {
            Suffix::Decimal(scale) => {
                exponent = exponent.checked_add(scale).ok_or_else(out_of_range)?;
            }
            Suffix::Binary(power) => {
                let factor = 1024i128.checked_pow(power).ok_or_else(out_of_range)?;
                mantissa = mantissa.checked_mul(factor).ok_or_else(out_of_range)?;
            }
        }

        if negative {
            mantissa = -mantissa;
        }

        if mantissa == 0 {
            exponent = 0;
        } else {
            while mantissa % 10 == 0 {
                mantissa /= 10;
                exponent += 1;
            }
        }

        if mantissa.unsigned_abs() >= MANTISSA_LIMIT || exponent.abs() > MAX_EXPONENT {
            return Err(out_of_range());
        }

        Ok(Self {
            text: input.to_string(),
            mantissa,
            exponent,
        })
    }

    /// The textual form this quantity was parsed from.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa < 0
    }

    /// Value scaled by 1000 (CPU millicores), or `None` below milli precision.
    pub fn millis(&self) -> Option<i128> {
        let shift = self.exponent + 3;
        if shift < 0 {
            return None;
        }
        10i128
            .checked_pow(shift as u32)
            .and_then(|factor| self.mantissa.checked_mul(factor))
    }

    fn cmp_value(&self, other: &Self) -> Ordering {
        match self.mantissa.signum().cmp(&other.mantissa.signum()) {
            Ordering::Equal => {}
            ordering => return ordering,
        }
        if self.mantissa == 0 {
            return Ordering::Equal;
        }

        let magnitude = compare_magnitude(
            self.mantissa.unsigned_abs(),
            self.exponent,
            other.mantissa.unsigned_abs(),
            other.exponent,
        );
        if self.mantissa < 0 {
            magnitude.reverse()
        } else {
            magnitude
        }
    }
}

fn compare_magnitude(a: u128, a_exp: i32, b: u128, b_exp: i32) -> Ordering {
    let a_lead = decimal_digits(a) + a_exp;
    let b_lead = decimal_digits(b) + b_exp;
    if a_lead != b_lead {
        return a_lead.cmp(&b_lead);
    }

    // Same leading power of ten: aligned values stay below 10^38.
    let common = a_exp.min(b_exp);
    let a = a * 10u128.pow((a_exp - common) as u32);
    let b = b * 10u128.pow((b_exp - common) as u32);
    a.cmp(&b)
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.mantissa == other.mantissa && self.exponent == other.exponent
    }
}

impl Eq for Quantity {}

impl Hash for Quantity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mantissa.hash(state);
        self.exponent.hash(state);
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_value(other)
    }
}

impl fmt::Debug for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quantity({})", self.text)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Quantity {
    type Error = QuantityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

struct QuantityVisitor;

impl<'de> Visitor<'de> for QuantityVisitor {
    type Value = Quantity;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a resource quantity such as \"200m\" or \"10Mi\"")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Quantity, E> {
        Quantity::parse(value).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Quantity, E> {
        self.visit_str(&value.to_string())
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Quantity, E> {
        self.visit_str(&value.to_string())
    }

    // Manifests may carry bare numbers such as `cpu: 0.5`; the shortest
    // round-trip rendering is parsed as decimal text.
    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Quantity, E> {
        if !value.is_finite() {
            return Err(E::custom("quantity must be finite"));
        }
        self.visit_str(&value.to_string())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(QuantityVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str) -> Quantity {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_common_forms() {
        assert_eq!(q("200m").millis(), Some(200));
        assert_eq!(q("2").millis(), Some(2000));
        assert_eq!(q("0.5").millis(), Some(500));
        assert_eq!(q("1Ki").millis(), Some(1_024_000));
        assert_eq!(q("10Mi"), q("10485760"));
        assert_eq!(q("+5m").millis(), Some(5));
        assert!(q("-1").is_negative());
        assert!(q("0Mi").is_zero());
    }

    #[test]
    fn test_equal_values_in_different_notation() {
        assert_eq!(q("1"), q("1000m"));
        assert_eq!(q("1k"), q("1e3"));
        assert_eq!(q("1.5Gi"), q("1536Mi"));
        assert_eq!(q(".5"), q("500m"));
        assert_ne!(q("1M"), q("1Mi"));
    }

    #[test]
    fn test_display_keeps_original_text() {
        assert_eq!(q("1000m").to_string(), "1000m");
        assert_eq!(q("1.50Gi").as_str(), "1.50Gi");
    }

    #[test]
    fn test_ordering() {
        assert!(q("100m") < q("1"));
        assert!(q("1Mi") > q("1M"));
        assert!(q("-1") < q("0"));
        assert!(q("-2") < q("-1"));
        assert!(q("999m") < q("1"));
        assert!(q("1n") < q("1u"));
    }

    #[test]
    fn test_sub_milli_precision() {
        assert_eq!(q("1u").millis(), None);
        assert_eq!(q("1500u").millis(), None);
        assert_eq!(q("2000u").millis(), Some(2));
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert_eq!(Quantity::parse(""), Err(QuantityError::Empty));
        for input in ["m", "Mi", ".", "-", "1 Gi", " 1", "1x", "1.5.5", "1e", "1e+", "1Kib", "abc"] {
            assert!(
                matches!(Quantity::parse(input), Err(QuantityError::Invalid { .. })),
                "expected '{}' to be rejected",
                input
            );
        }
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            Quantity::parse("1e99"),
            Err(QuantityError::OutOfRange(_))
        ));
        assert!(matches!(
            Quantity::parse("999999999999999999999999999999999999999"),
            Err(QuantityError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_serde_uses_text_form() {
        let json = serde_json::to_string(&q("10Mi")).unwrap();
        assert_eq!(json, "\"10Mi\"");

        let parsed: Quantity = serde_json::from_str("\"250m\"").unwrap();
        assert_eq!(parsed.millis(), Some(250));

        let bare: Quantity = serde_json::from_str("2").unwrap();
        assert_eq!(bare, q("2000m"));

        assert!(serde_json::from_str::<Quantity>("\"ten\"").is_err());
    }
}
