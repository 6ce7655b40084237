//! Money type for representing monetary values.
//!
//! Amounts are integer cents of the store currency (BRL). At the boundary
//! with the storefront backend they travel as locale-formatted decimal-comma
//! strings such as `"12,34"` or `"1.234,56"`; conversion happens only here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// Currency symbol used for display.
pub const CURRENCY_SYMBOL: &str = "R$";

/// A monetary amount in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a value from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Zero.
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Amount in cents.
    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Checked addition. `None` on overflow.
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Checked subtraction. `None` on overflow.
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Checked multiplication by a quantity. `None` on overflow.
    pub fn checked_mul(self, factor: i64) -> Option<Money> {
        self.0.checked_mul(factor).map(Money)
    }

    /// Sum an iterator of values, `None` on overflow.
    pub fn try_sum(iter: impl IntoIterator<Item = Money>) -> Option<Money> {
        iter.into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }

    /// Parse a locale-formatted amount (see [`parse_decimal_comma`]).
    pub fn parse(input: &str) -> Option<Money> {
        parse_decimal_comma(input).map(Money)
    }

    /// Read an amount out of loosely typed JSON.
    ///
    /// Strings go through [`parse_decimal_comma`]; JSON numbers are read as
    /// currency units (`5` is `5,00`, `4.5` is `4,50`), rounded to the
    /// nearest cent. Amounts outside the `i64` cent range and anything else
    /// are `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Money> {
        match value {
            serde_json::Value::String(s) => Money::parse(s),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(units) => units.checked_mul(100).map(Money),
                None => Money::from_units_f64(n.as_f64()?),
            },
            _ => None,
        }
    }

    fn from_units_f64(units: f64) -> Option<Money> {
        let cents = (units * 100.0).round();
        // i64::MAX as f64 rounds up to 2^63, which is itself out of range
        if !cents.is_finite() || cents.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// Decimal-comma string without symbol, e.g. `"1.234,56"`.
    pub fn to_decimal_comma(&self) -> String {
        format_decimal_comma(self.0)
    }

    /// Display string with symbol, e.g. `"R$ 49,90"`.
    pub fn display(&self) -> String {
        format!("{} {}", CURRENCY_SYMBOL, self.to_decimal_comma())
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Format cents as a decimal-comma string with `.` thousands separators.
///
/// ```
/// use vitrine_commerce::money::format_decimal_comma;
/// assert_eq!(format_decimal_comma(123456), "1.234,56");
/// assert_eq!(format_decimal_comma(5), "0,05");
/// ```
pub fn format_decimal_comma(cents: i64) -> String {
    let negative = cents < 0;
    let abs = cents.unsigned_abs();
    let units = (abs / 100).to_string();
    let fraction = abs % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped},{fraction:02}")
}

/// Parse a locale-formatted amount into cents.
///
/// A comma is the decimal separator and dots group thousands (`"1.234,56"`).
/// Without a comma, a trailing dot followed by one or two digits is read as
/// a decimal point (`"12.5"`), otherwise dots are thousands separators. A
/// leading currency symbol and surrounding whitespace are ignored. More than
/// two fractional digits, stray characters or an empty amount give `None`.
pub fn parse_decimal_comma(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix(CURRENCY_SYMBOL)
        .map(str::trim_start)
        .unwrap_or(trimmed);

    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    if body.is_empty() {
        return None;
    }

    let (int_part, frac_part) = split_decimal(body);

    let digits: String = int_part
        .chars()
        .filter(|c| !matches!(c, '.' | ' ' | '\u{a0}'))
        .collect();
    if digits.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if frac_part.len() > 2 || !frac_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let units: i64 = if digits.is_empty() {
        0
    } else {
        digits.parse().ok()?
    };
    let fraction: i64 = match frac_part.len() {
        0 => 0,
        1 => frac_part.parse::<i64>().ok()? * 10,
        _ => frac_part.parse().ok()?,
    };

    let cents = units.checked_mul(100)?.checked_add(fraction)?;
    Some(if negative { -cents } else { cents })
}

fn split_decimal(body: &str) -> (&str, &str) {
    if let Some(idx) = body.rfind(',') {
        return (&body[..idx], &body[idx + 1..]);
    }
    if let Some(idx) = body.rfind('.') {
        let frac = &body[idx + 1..];
        if (1..=2).contains(&frac.len()) {
            return (&body[..idx], frac);
        }
    }
    (body, "")
}

/// Serde adapter for fields that cross the backend boundary as
/// decimal-comma strings.
pub mod decimal_comma {
    use super::Money;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_decimal_comma())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Money::from_json(&value)
            .ok_or_else(|| de::Error::custom(format!("invalid monetary amount: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_decimal_comma() {
        assert_eq!(format_decimal_comma(0), "0,00");
        assert_eq!(format_decimal_comma(1234), "12,34");
        assert_eq!(format_decimal_comma(100_000), "1.000,00");
        assert_eq!(format_decimal_comma(123_456_789), "1.234.567,89");
        assert_eq!(format_decimal_comma(-250), "-2,50");
    }

    #[test]
    fn test_parse_decimal_comma() {
        assert_eq!(parse_decimal_comma("12,34"), Some(1234));
        assert_eq!(parse_decimal_comma("20,00"), Some(2000));
        assert_eq!(parse_decimal_comma("1.234,56"), Some(123_456));
        assert_eq!(parse_decimal_comma("R$ 5,00"), Some(500));
        assert_eq!(parse_decimal_comma("  7,5 "), Some(750));
        assert_eq!(parse_decimal_comma(",50"), Some(50));
        assert_eq!(parse_decimal_comma("15"), Some(1500));
        assert_eq!(parse_decimal_comma("-3,00"), Some(-300));
    }

    #[test]
    fn test_parse_dot_decimal_fallback() {
        assert_eq!(parse_decimal_comma("12.5"), Some(1250));
        assert_eq!(parse_decimal_comma("12.50"), Some(1250));
        // three digits after a dot means thousands
        assert_eq!(parse_decimal_comma("1.500"), Some(150_000));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_decimal_comma(""), None);
        assert_eq!(parse_decimal_comma("R$"), None);
        assert_eq!(parse_decimal_comma("abc"), None);
        assert_eq!(parse_decimal_comma("12,345"), None);
        assert_eq!(parse_decimal_comma("1,2,3"), None);
        assert_eq!(parse_decimal_comma("99999999999999999999,00"), None);
    }

    #[test]
    fn test_round_trip_sweep() {
        let mut cents = 0i64;
        while cents <= 100_000_000 {
            assert_eq!(parse_decimal_comma(&format_decimal_comma(cents)), Some(cents));
            cents += 7919;
        }
        for cents in [0, 1, 9, 10, 99, 100, 999, 1000, 99_999, 100_000, 100_000_000] {
            assert_eq!(parse_decimal_comma(&format_decimal_comma(cents)), Some(cents));
        }
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Money::from_json(&serde_json::json!("4,90")), Some(Money::from_cents(490)));
        assert_eq!(Money::from_json(&serde_json::json!(5)), Some(Money::from_cents(500)));
        assert_eq!(Money::from_json(&serde_json::json!(4.5)), Some(Money::from_cents(450)));
        assert_eq!(Money::from_json(&serde_json::json!(4.999)), Some(Money::from_cents(500)));
        assert_eq!(Money::from_json(&serde_json::json!(0.1 + 0.2)), Some(Money::from_cents(30)));
        assert_eq!(Money::from_json(&serde_json::json!(1e3)), Some(Money::from_cents(100_000)));
        assert_eq!(Money::from_json(&serde_json::json!(1e300)), None);
        assert_eq!(Money::from_json(&serde_json::json!(u64::MAX)), None);
        assert_eq!(Money::from_json(&serde_json::json!(null)), None);
        assert_eq!(Money::from_json(&serde_json::json!(true)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(4990).display(), "R$ 49,90");
        assert_eq!(Money::from_cents(4990).to_string(), "R$ 49,90");
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::from_cents(1000);
        assert_eq!(a.checked_mul(3), Some(Money::from_cents(3000)));
        assert_eq!(Money::from_cents(i64::MAX).checked_add(a), None);
        assert_eq!(
            Money::try_sum([Money::from_cents(1), Money::from_cents(2)]),
            Some(Money::from_cents(3))
        );
        assert_eq!(Money::try_sum([Money::from_cents(i64::MAX), a]), None);
    }

    #[test]
    fn test_decimal_comma_serde() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Wire {
            #[serde(with = "decimal_comma")]
            total: Money,
        }

        let json = serde_json::to_string(&Wire { total: Money::from_cents(123_456) }).unwrap();
        assert_eq!(json, r#"{"total":"1.234,56"}"#);
        let back: Wire = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total.cents(), 123_456);
        assert!(serde_json::from_str::<Wire>(r#"{"total":"nope"}"#).is_err());
    }
}
