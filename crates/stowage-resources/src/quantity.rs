//! Exact resource amounts in Kubernetes quantity notation.
//!
//! A [`Quantity`] is an integer count of nano-units, so capacity arithmetic
//! (in particular the floor division the capacity calculator relies on) is
//! exact. Floating point never enters a fit decision; efficiency reporting
//! converts to `f64` at the very end.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Nano-units per whole unit.
const NANO: i128 = 1_000_000_000;

/// Decimal SI suffixes and their power-of-ten exponent relative to one unit.
const DECIMAL_SUFFIXES: [(&str, i32); 9] = [
    ("n", -9),
    ("u", -6),
    ("m", -3),
    ("k", 3),
    ("M", 6),
    ("G", 9),
    ("T", 12),
    ("P", 15),
    ("E", 18),
];

/// Binary suffixes and their power-of-two exponent.
const BINARY_SUFFIXES: [(&str, u32); 6] = [
    ("Ki", 10),
    ("Mi", 20),
    ("Gi", 30),
    ("Ti", 40),
    ("Pi", 50),
    ("Ei", 60),
];

/// How a quantity was written. Remembered so the value formats back in the
/// family it was expressed in (`"2Gi"` stays binary, `"1500m"` stays decimal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Plain integers and decimal SI suffixes (`n`, `u`, `m`, `k`, `M`, ...).
    #[default]
    DecimalSi,
    /// Power-of-two suffixes (`Ki`, `Mi`, `Gi`, ...).
    BinarySi,
}

/// Errors from parsing a quantity string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuantityParseError {
    #[error("empty quantity")]
    Empty,

    #[error("malformed number in quantity {0:?}")]
    Number(String),

    #[error("unknown suffix {suffix:?} in quantity {input:?}")]
    Suffix { input: String, suffix: String },

    #[error("quantity {0:?} is finer than nano precision")]
    TooPrecise(String),

    #[error("quantity {0:?} does not fit the representable range")]
    Overflow(String),
}

/// An exact resource amount: CPU cores, bytes of memory, or GPU count.
///
/// Supports the Kubernetes resource-quantity conventions: `"1500m"` is 1.5
/// CPUs, `"2Gi"` is 2147483648 bytes, `"3"` is three whole units. Two
/// quantities are equal when their values are equal, regardless of the
/// notation they were written in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quantity {
    nanos: i128,
    format: Format,
}

impl Quantity {
    /// The zero quantity.
    pub const fn zero() -> Self {
        Quantity {
            nanos: 0,
            format: Format::DecimalSi,
        }
    }

    /// A whole number of units (cores, GPUs, plain bytes).
    pub fn from_whole(units: i64) -> Self {
        Quantity {
            nanos: i128::from(units) * NANO,
            format: Format::DecimalSi,
        }
    }

    /// A quantity of milli-units, e.g. `from_milli(1500)` is 1.5 cores.
    pub fn from_milli(millis: i64) -> Self {
        Quantity {
            nanos: i128::from(millis) * (NANO / 1000),
            format: Format::DecimalSi,
        }
    }

    /// A byte count that formats with binary suffixes when possible.
    pub fn from_binary(bytes: i64) -> Self {
        Quantity {
            nanos: i128::from(bytes) * NANO,
            format: Format::BinarySi,
        }
    }

    /// Raw nano-unit count.
    pub fn nanos(&self) -> i128 {
        self.nanos
    }

    /// The notation family this quantity formats in.
    pub fn format(&self) -> Format {
        self.format
    }

    pub fn is_zero(&self) -> bool {
        self.nanos == 0
    }

    pub fn is_negative(&self) -> bool {
        self.nanos < 0
    }

    /// Component addition. Keeps `self`'s format.
    pub fn saturating_add(self, other: Quantity) -> Quantity {
        Quantity {
            nanos: self.nanos.saturating_add(other.nanos),
            format: self.format,
        }
    }

    /// Signed component subtraction. Keeps `self`'s format; the result may
    /// be negative and is then only meaningful as an intermediate.
    pub fn saturating_sub(self, other: Quantity) -> Quantity {
        Quantity {
            nanos: self.nanos.saturating_sub(other.nanos),
            format: self.format,
        }
    }

    /// Exact `floor(self / divisor)` for non-negative `self`.
    ///
    /// Returns `None` when the divisor is not positive; the capacity
    /// calculator maps a zero requirement to its unbounded sentinel before
    /// dividing.
    pub fn div_floor(self, divisor: Quantity) -> Option<i128> {
        if divisor.nanos <= 0 {
            return None;
        }
        Some(self.nanos.max(0) / divisor.nanos)
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.nanos == other.nanos
    }
}

impl Eq for Quantity {}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.nanos.cmp(&other.nanos)
    }
}

impl FromStr for Quantity {
    type Err = QuantityParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err(QuantityParseError::Empty);
        }

        let (negative, rest) = match input.as_bytes()[0] {
            b'-' => (true, &input[1..]),
            b'+' => (false, &input[1..]),
            _ => (false, input),
        };

        let number_len = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        let (number, suffix) = rest.split_at(number_len);

        let (digits, scale) = parse_decimal(number)
            .ok_or_else(|| QuantityParseError::Number(input.to_string()))?;

        let (format, pow10, pow2) = match suffix {
            "" => (Format::DecimalSi, 0, 0),
            _ => {
                if let Some(&(_, exp)) = BINARY_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
                    (Format::BinarySi, 0, exp)
                } else if let Some(&(_, exp)) =
                    DECIMAL_SUFFIXES.iter().find(|(s, _)| *s == suffix)
                {
                    (Format::DecimalSi, exp, 0)
                } else {
                    return Err(QuantityParseError::Suffix {
                        input: input.to_string(),
                        suffix: suffix.to_string(),
                    });
                }
            }
        };

        // nanos = digits * 10^(9 - scale + pow10) * 2^pow2
        let mut nanos = digits;
        if pow2 > 0 {
            nanos = nanos
                .checked_mul(1i128 << pow2)
                .ok_or_else(|| QuantityParseError::Overflow(input.to_string()))?;
        }
        let exp = 9 - scale + pow10;
        if exp >= 0 {
            for _ in 0..exp {
                nanos = nanos
                    .checked_mul(10)
                    .ok_or_else(|| QuantityParseError::Overflow(input.to_string()))?;
            }
        } else {
            for _ in 0..-exp {
                if nanos % 10 != 0 {
                    return Err(QuantityParseError::TooPrecise(input.to_string()));
                }
                nanos /= 10;
            }
        }

        if negative {
            nanos = -nanos;
        }
        Ok(Quantity { nanos, format })
    }
}

/// Parses `number` into `(digits, scale)` where the value is
/// `digits * 10^-scale`. Rejects empty and multi-point inputs.
fn parse_decimal(number: &str) -> Option<(i128, i32)> {
    let (int_part, frac_part) = match number.split_once('.') {
        Some((i, f)) => (i, f),
        None => (number, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if frac_part.contains('.') {
        return None;
    }
    // 38 significant digits overflow i128 regardless of suffix.
    if int_part.len() + frac_part.len() > 38 {
        return None;
    }

    let mut digits: i128 = 0;
    for b in int_part.bytes().chain(frac_part.bytes()) {
        if !b.is_ascii_digit() {
            return None;
        }
        digits = digits.checked_mul(10)?.checked_add(i128::from(b - b'0'))?;
    }
    Some((digits, frac_part.len() as i32))
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.format == Format::BinarySi && self.nanos % NANO == 0 {
            let bytes = self.nanos / NANO;
            for &(suffix, exp) in BINARY_SUFFIXES.iter().rev() {
                let factor = 1i128 << exp;
                if bytes != 0 && bytes % factor == 0 {
                    return write!(f, "{}{}", bytes / factor, suffix);
                }
            }
            return write!(f, "{bytes}");
        }

        if self.nanos % NANO == 0 {
            write!(f, "{}", self.nanos / NANO)
        } else if self.nanos % (NANO / 1000) == 0 {
            write!(f, "{}m", self.nanos / (NANO / 1000))
        } else if self.nanos % 1000 == 0 {
            write!(f, "{}u", self.nanos / 1000)
        } else {
            write!(f, "{}n", self.nanos)
        }
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct QuantityVisitor;

        impl Visitor<'_> for QuantityVisitor {
            type Value = Quantity;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a quantity string like \"1500m\" or \"2Gi\", or an integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Quantity, E> {
                v.parse().map_err(de::Error::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Quantity, E> {
                Ok(Quantity {
                    nanos: i128::from(v) * NANO,
                    format: Format::DecimalSi,
                })
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Quantity, E> {
                Ok(Quantity::from_whole(v))
            }
        }

        deserializer.deserialize_any(QuantityVisitor)
    }
}
