//! Fixed-point currency values.
//!
//! Amounts are stored as integer minor units ("wei"-style) tagged with a
//! currency kind that fixes the decimal count: USDC carries 6 decimals, ETH
//! carries 18. All arithmetic runs on `i128` minor units so decimal math is
//! exact; floating point only appears at the display boundary.

use serde::ser::SerializeStruct;
use serde::{de, Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

use crate::error::StorefrontError;

/// Largest whole-unit magnitude the decimal constructors accept.
///
/// Matches the range where an `f64` still represents every integer exactly,
/// so a decimal amount that survives construction round-trips through
/// [`Currency::to_decimal`] without silent corruption.
const MAX_SAFE_DECIMAL: i128 = (1 << 53) - 1;

/// Supported currency kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyKind {
    #[default]
    #[serde(rename = "USDC")]
    Usdc,
    #[serde(rename = "ETH")]
    Eth,
}

impl CurrencyKind {
    /// Get the wire tag (e.g., "USDC").
    pub fn code(&self) -> &'static str {
        match self {
            CurrencyKind::Usdc => "USDC",
            CurrencyKind::Eth => "ETH",
        }
    }

    /// Get the number of decimal places for this kind.
    pub fn decimals(&self) -> u32 {
        match self {
            CurrencyKind::Usdc => 6,
            CurrencyKind::Eth => 18,
        }
    }

    /// Minor units per whole unit (`10^decimals`).
    pub fn unit(&self) -> i128 {
        10_i128.pow(self.decimals())
    }

    /// Parse a wire tag.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "USDC" => Some(CurrencyKind::Usdc),
            "ETH" => Some(CurrencyKind::Eth),
            _ => None,
        }
    }
}

impl fmt::Display for CurrencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// An immutable fixed-point currency amount.
///
/// Two values combine only when their kinds match: `add`/`sub` on mismatched
/// kinds is a programming error and panics, while the `try_*` variants return
/// a typed failure for heterogeneous aggregation paths. Equality against a
/// different kind is simply `false`.
///
/// ```
/// use cafe_commerce::money::{Currency, CurrencyKind};
///
/// let price = Currency::from_decimal(CurrencyKind::Usdc, "3.50").unwrap();
/// assert_eq!(price.minor_units(), 3_500_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Currency {
    kind: CurrencyKind,
    minor_units: i128,
}

impl Currency {
    /// Create a zero amount of the given kind.
    pub const fn zero(kind: CurrencyKind) -> Self {
        Self {
            kind,
            minor_units: 0,
        }
    }

    /// Create from a raw minor-unit count.
    ///
    /// Fails with `AmountTooLarge` when the magnitude exceeds the safe
    /// whole-unit range scaled by the kind's unit size.
    pub fn from_minor_units(kind: CurrencyKind, minor_units: i128) -> Result<Self, StorefrontError> {
        let magnitude = minor_units
            .checked_abs()
            .ok_or(StorefrontError::AmountTooLarge)?;
        if magnitude > MAX_SAFE_DECIMAL * kind.unit() {
            return Err(StorefrontError::AmountTooLarge);
        }
        Ok(Self { kind, minor_units })
    }

    /// Create from a decimal-integer string of minor units.
    ///
    /// A fractional minor-unit count is truncated toward zero;
    /// non-numeric input fails with `InvalidAmount`.
    pub fn from_minor_units_str(kind: CurrencyKind, text: &str) -> Result<Self, StorefrontError> {
        let text = text.trim();
        let (negative, digits) = split_sign(text);
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(StorefrontError::InvalidAmount(text.to_string()));
        }
        if !is_all_digits(int_part) || !is_all_digits(frac_part) {
            return Err(StorefrontError::InvalidAmount(text.to_string()));
        }
        let magnitude: i128 = if int_part.is_empty() {
            0
        } else {
            // All-digit input, so a parse failure can only be overflow
            int_part
                .parse()
                .map_err(|_| StorefrontError::AmountTooLarge)?
        };
        let minor_units = if negative { -magnitude } else { magnitude };
        Self::from_minor_units(kind, minor_units)
    }

    /// Create from a decimal string (e.g., `"3.50"`).
    ///
    /// The empty string is zero. The fractional part is padded or truncated
    /// to exactly `decimals` digits, rounding half-up on the first dropped
    /// digit with carry into the integer part.
    pub fn from_decimal(kind: CurrencyKind, text: &str) -> Result<Self, StorefrontError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::zero(kind));
        }
        let (negative, digits) = split_sign(text);
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(StorefrontError::InvalidAmount(text.to_string()));
        }
        if !is_all_digits(int_part) || !is_all_digits(frac_part) {
            return Err(StorefrontError::InvalidAmount(text.to_string()));
        }

        let mut whole: i128 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| StorefrontError::AmountTooLarge)?
        };

        let decimals = kind.decimals() as usize;
        let mut frac_digits: Vec<u8> = frac_part.bytes().map(|b| b - b'0').collect();
        let mut round_up = false;
        if frac_digits.len() > decimals {
            // Half-up on the digit immediately past the cutoff
            round_up = frac_digits[decimals] >= 5;
            frac_digits.truncate(decimals);
        } else {
            frac_digits.resize(decimals, 0);
        }

        let mut frac: i128 = 0;
        for d in &frac_digits {
            frac = frac * 10 + i128::from(*d);
        }
        if round_up {
            frac += 1;
            if frac >= kind.unit() {
                // Carry propagates into the integer part
                frac -= kind.unit();
                whole += 1;
            }
        }

        let magnitude = whole
            .checked_mul(kind.unit())
            .and_then(|v| v.checked_add(frac))
            .ok_or(StorefrontError::AmountTooLarge)?;
        let minor_units = if negative { -magnitude } else { magnitude };
        Self::from_minor_units(kind, minor_units)
    }

    /// Create from a floating-point decimal amount.
    ///
    /// `0.0` is zero; a magnitude above the safe-integer limit fails with
    /// `AmountTooLarge`; non-finite input fails with `InvalidAmount`.
    pub fn from_number(kind: CurrencyKind, value: f64) -> Result<Self, StorefrontError> {
        if !value.is_finite() {
            return Err(StorefrontError::InvalidAmount(value.to_string()));
        }
        if value.abs() > MAX_SAFE_DECIMAL as f64 {
            return Err(StorefrontError::AmountTooLarge);
        }
        if value == 0.0 {
            return Ok(Self::zero(kind));
        }
        // `Display` for f64 is the shortest round-trip decimal and never
        // scientific, so 0.1 renders as "0.1" rather than surfacing the
        // binary mantissa at 18-decimal kinds.
        Self::from_decimal(kind, &value.to_string())
    }

    /// Create from a whole-unit integer amount.
    pub fn from_int(kind: CurrencyKind, value: i64) -> Result<Self, StorefrontError> {
        let minor_units = i128::from(value)
            .checked_mul(kind.unit())
            .ok_or(StorefrontError::AmountTooLarge)?;
        Self::from_minor_units(kind, minor_units)
    }

    /// The currency kind.
    pub const fn kind(&self) -> CurrencyKind {
        self.kind
    }

    /// The raw minor-unit count.
    pub const fn minor_units(&self) -> i128 {
        self.minor_units
    }

    /// Check if this is zero.
    pub const fn is_zero(&self) -> bool {
        self.minor_units == 0
    }

    /// Check if this is positive.
    pub const fn is_positive(&self) -> bool {
        self.minor_units > 0
    }

    /// Check if this is negative.
    pub const fn is_negative(&self) -> bool {
        self.minor_units < 0
    }

    /// Get the absolute value.
    pub const fn abs(&self) -> Self {
        Self {
            kind: self.kind,
            minor_units: self.minor_units.abs(),
        }
    }

    fn ensure_same_kind(&self, other: &Currency) -> Result<(), StorefrontError> {
        if self.kind != other.kind {
            return Err(StorefrontError::CurrencyKindMismatch {
                expected: self.kind.code(),
                got: other.kind.code(),
            });
        }
        Ok(())
    }

    /// Try to add another value, failing on kind mismatch or overflow.
    pub fn try_add(&self, other: &Currency) -> Result<Currency, StorefrontError> {
        self.ensure_same_kind(other)?;
        let minor_units = self
            .minor_units
            .checked_add(other.minor_units)
            .ok_or(StorefrontError::Overflow)?;
        Self::from_minor_units(self.kind, minor_units)
    }

    /// Try to subtract another value, failing on kind mismatch or overflow.
    pub fn try_sub(&self, other: &Currency) -> Result<Currency, StorefrontError> {
        self.ensure_same_kind(other)?;
        let minor_units = self
            .minor_units
            .checked_sub(other.minor_units)
            .ok_or(StorefrontError::Overflow)?;
        Self::from_minor_units(self.kind, minor_units)
    }

    /// Multiply by another value of the same kind.
    ///
    /// Computes `(a * b) / unit` with truncating integer division, so the
    /// factor is read as a decimal number, not a minor-unit count.
    pub fn mul(&self, factor: &Currency) -> Result<Currency, StorefrontError> {
        self.ensure_same_kind(factor)?;
        let product = self
            .minor_units
            .checked_mul(factor.minor_units)
            .ok_or(StorefrontError::Overflow)?;
        Self::from_minor_units(self.kind, product / self.kind.unit())
    }

    /// Divide by another value of the same kind.
    ///
    /// Computes `(a * unit) / b` with truncating integer division. Fails
    /// with `DivideByZero` when the divisor's decimal value is exactly zero.
    pub fn div(&self, divisor: &Currency) -> Result<Currency, StorefrontError> {
        self.ensure_same_kind(divisor)?;
        if divisor.minor_units == 0 {
            return Err(StorefrontError::DivideByZero);
        }
        let scaled = self
            .minor_units
            .checked_mul(self.kind.unit())
            .ok_or(StorefrontError::Overflow)?;
        Self::from_minor_units(self.kind, scaled / divisor.minor_units)
    }

    /// Multiply by a decimal number.
    pub fn mul_number(&self, factor: f64) -> Result<Currency, StorefrontError> {
        self.mul(&Self::from_number(self.kind, factor)?)
    }

    /// Divide by a decimal number.
    pub fn div_number(&self, divisor: f64) -> Result<Currency, StorefrontError> {
        self.div(&Self::from_number(self.kind, divisor)?)
    }

    /// Multiply by a whole-unit integer.
    pub fn mul_int(&self, factor: i64) -> Result<Currency, StorefrontError> {
        self.mul(&Self::from_int(self.kind, factor)?)
    }

    /// Divide by a whole-unit integer.
    pub fn div_int(&self, divisor: i64) -> Result<Currency, StorefrontError> {
        self.div(&Self::from_int(self.kind, divisor)?)
    }

    /// Take a percentage of this amount.
    ///
    /// Multiplies first, then divides by 100, which keeps intermediate
    /// precision under truncating division. The percentage must be strictly
    /// greater than `0.0001` and at most `100`.
    pub fn percentage_of(&self, percent: f64) -> Result<Currency, StorefrontError> {
        if !(percent > 0.0001 && percent <= 100.0) {
            return Err(StorefrontError::InvalidPercentage(percent));
        }
        self.mul_number(percent)?.div_int(100)
    }

    /// Strictly greater than, same kind only (`false` across kinds).
    pub fn gt(&self, other: &Currency) -> bool {
        self.kind == other.kind && self.minor_units > other.minor_units
    }

    /// Greater than or equal, same kind only (`false` across kinds).
    pub fn gte(&self, other: &Currency) -> bool {
        self.kind == other.kind && self.minor_units >= other.minor_units
    }

    /// Strictly less than, same kind only (`false` across kinds).
    pub fn lt(&self, other: &Currency) -> bool {
        self.kind == other.kind && self.minor_units < other.minor_units
    }

    /// Less than or equal, same kind only (`false` across kinds).
    pub fn lte(&self, other: &Currency) -> bool {
        self.kind == other.kind && self.minor_units <= other.minor_units
    }

    /// Convert to a floating-point decimal value (display/estimation only).
    pub fn to_decimal(&self) -> f64 {
        self.minor_units as f64 / self.kind.unit() as f64
    }

    /// Render with thousands separators and exactly `decimals` fraction
    /// digits, preserving a leading `-` for negative values.
    ///
    /// ```
    /// use cafe_commerce::money::{Currency, CurrencyKind};
    ///
    /// let v = Currency::from_decimal(CurrencyKind::Usdc, "1234.5").unwrap();
    /// assert_eq!(v.pretty_format(), "1,234.500000");
    /// ```
    pub fn pretty_format(&self) -> String {
        let unit = self.kind.unit().unsigned_abs();
        let magnitude = self.minor_units.unsigned_abs();
        let whole = group_thousands(magnitude / unit);
        let frac = magnitude % unit;
        let sign = if self.minor_units < 0 { "-" } else { "" };
        format!(
            "{sign}{whole}.{frac:0width$}",
            width = self.kind.decimals() as usize
        )
    }

    /// Serialize to the tagged wire format.
    ///
    /// This is the only lossless serialization path: the minor-unit count is
    /// emitted as a decimal string, never floating point.
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "tag": self.kind.code(),
            "minorUnits": self.minor_units.to_string(),
        })
        .to_string()
    }

    /// Parse the tagged wire format, requiring a specific kind.
    ///
    /// A malformed payload or a tag other than `kind` fails with
    /// `InvalidPayload`.
    pub fn from_json(kind: CurrencyKind, json: &str) -> Result<Currency, StorefrontError> {
        let value: Currency = serde_json::from_str(json)
            .map_err(|e| StorefrontError::InvalidPayload(e.to_string()))?;
        if value.kind != kind {
            return Err(StorefrontError::InvalidPayload(format!(
                "expected tag {}, got {}",
                kind.code(),
                value.kind.code()
            )));
        }
        Ok(value)
    }
}

fn split_sign(text: &str) -> (bool, &str) {
    match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    }
}

fn is_all_digits(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_digit())
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Addition of two same-kind values.
///
/// # Panics
/// Panics on kind mismatch or overflow. Use `try_add` for fallible addition.
impl Add for Currency {
    type Output = Currency;

    fn add(self, other: Currency) -> Currency {
        self.try_add(&other).expect("currency addition failed")
    }
}

/// Subtraction of two same-kind values.
///
/// # Panics
/// Panics on kind mismatch or overflow. Use `try_sub` for fallible subtraction.
impl Sub for Currency {
    type Output = Currency;

    fn sub(self, other: Currency) -> Currency {
        self.try_sub(&other).expect("currency subtraction failed")
    }
}

/// Ordering is defined within a kind only; values of different kinds are
/// unordered.
impl PartialOrd for Currency {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        (self.kind == other.kind).then(|| self.minor_units.cmp(&other.minor_units))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.pretty_format(), self.kind.code())
    }
}

impl Serialize for Currency {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Currency", 2)?;
        state.serialize_field("tag", self.kind.code())?;
        state.serialize_field("minorUnits", &self.minor_units.to_string())?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Payload {
            tag: String,
            #[serde(rename = "minorUnits")]
            minor_units: String,
        }

        let payload = Payload::deserialize(deserializer)?;
        let kind = CurrencyKind::from_code(&payload.tag)
            .ok_or_else(|| de::Error::custom(format!("unknown currency tag: {}", payload.tag)))?;
        let minor_units: i128 = payload
            .minor_units
            .parse()
            .map_err(|_| de::Error::custom("minorUnits must be a decimal integer string"))?;
        Currency::from_minor_units(kind, minor_units).map_err(de::Error::custom)
    }
}
