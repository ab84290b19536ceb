//! Exact decimal literals for conversion factors.
//!
//! Scale and offset values are kept exactly as written in the schema so the
//! reciprocal check in [crate::conversion] is decided in decimal arithmetic,
//! not on the nearest binary float. When a literal is emitted it is rendered
//! as the shortest text that parses back to the same `f64`.

use std::{fmt, str::FromStr};

use crate::errors::CompileError;

/// Largest number of significant digits a literal may carry. Enough for the
/// exact decimal expansion of any `f64`.
const MAX_DIGITS: usize = 1024;

/// Exponents further than this from the digits are displayed in `e` notation.
const MAX_POSITIONAL_ZEROS: usize = 64;

/// A decimal value `(-1)^negative * digits * 10^exponent`.
///
/// `digits` holds the significant digits without leading or trailing zeros
/// (empty for zero), so two literals that denote the same number (`0.1`,
/// `0.10`, `1e-1`) compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct Decimal {
    negative: bool,
    digits: String,
    exponent: i32,
    value: f64,
}

impl Decimal {
    pub fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Nearest `f64` to the literal. May be infinite for huge exponents.
    pub fn to_f64(&self) -> f64 {
        self.value
    }

    /// Returns `|1 / self|` when it is a whole number.
    ///
    /// `0.1` gives 10 and `0.25` gives 4, while `0.3` and `2` give `None`.
    pub fn reciprocal(&self) -> Option<Reciprocal> {
        if self.digits.is_empty() {
            return None;
        }
        if self.exponent >= 0 {
            return (self.digits == "1" && self.exponent == 0).then_some(Reciprocal::ONE);
        }

        // 1 / (d * 10^-k) = 10^k / d, whole iff d = 2^a * 5^b with a, b <= k.
        let k = self.exponent.unsigned_abs();
        let mut rest = self.digits.as_bytes().to_vec();
        let twos = strip_factor(&mut rest, 2);
        let fives = strip_factor(&mut rest, 5);
        if rest != b"1" || twos > k || fives > k {
            return None;
        }

        Some(Reciprocal {
            twos: k - twos,
            fives: k - fives,
        })
    }

    /// Shortest round-trip literal for this value, e.g. `0.3` or `1000.0`.
    pub fn literal(&self) -> Result<String, CompileError> {
        if !self.value.is_finite() {
            return Err(CompileError::InvalidLiteral {
                literal: self.to_scientific(),
                reason: "value does not fit in a 64-bit float".to_string(),
            });
        }
        Ok(float_literal(self.value))
    }

    /// `digits` and exponent in `e` notation, e.g. `-27315e-2`.
    pub fn to_scientific(&self) -> String {
        let sign = if self.negative { "-" } else { "" };
        let digits = if self.digits.is_empty() {
            "0"
        } else {
            &self.digits
        };
        format!("{sign}{digits}e{}", self.exponent)
    }
}

/// Divides the ASCII decimal `digits` by `factor` for as long as the
/// division is exact and returns how many times it divided.
fn strip_factor(digits: &mut Vec<u8>, factor: u32) -> u32 {
    let mut count = 0;
    while let Some(quotient) = divide_exact(digits, factor) {
        *digits = quotient;
        count += 1;
    }
    count
}

fn divide_exact(digits: &[u8], divisor: u32) -> Option<Vec<u8>> {
    let mut quotient = Vec::with_capacity(digits.len());
    let mut remainder = 0u32;
    for &digit in digits {
        let current = remainder * 10 + u32::from(digit - b'0');
        // current / divisor < 10 since remainder < divisor
        quotient.push(b'0' + (current / divisor) as u8);
        remainder = current % divisor;
    }
    if remainder != 0 {
        return None;
    }

    let leading = quotient.iter().take_while(|&&b| b == b'0').count();
    quotient.drain(..leading);
    (!quotient.is_empty()).then_some(quotient)
}

/// A whole number `2^twos * 5^fives`, the exact reciprocal of a scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reciprocal {
    twos: u32,
    fives: u32,
}

impl Reciprocal {
    const ONE: Reciprocal = Reciprocal { twos: 0, fives: 0 };

    /// Whether the number is below `f64::MAX`, so its literal is a valid
    /// Rust float.
    pub fn fits_f64(self) -> bool {
        let magnitude = f64::from(self.twos) * 2f64.log10() + f64::from(self.fives) * 5f64.log10();
        if magnitude < 308.0 {
            return true;
        }
        if magnitude > 309.0 {
            return false;
        }
        self.to_string()
            .parse::<f64>()
            .is_ok_and(|value| value.is_finite())
    }
}

impl fmt::Display for Reciprocal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Little-endian base-10 digits.
        let mut digits: Vec<u32> = vec![1];
        for (factor, count) in [(2, self.twos), (5, self.fives)] {
            for _ in 0..count {
                let mut carry = 0;
                for digit in digits.iter_mut() {
                    let value = *digit * factor + carry;
                    *digit = value % 10;
                    carry = value / 10;
                }
                while carry > 0 {
                    digits.push(carry % 10);
                    carry /= 10;
                }
            }
        }

        let text: String = digits
            .iter()
            .rev()
            .map(|&d| char::from(b'0' + d as u8))
            .collect();
        f.write_str(&text)
    }
}

/// Formats a finite float as a Rust literal that parses back to the same
/// bits. Always positional and always with a fractional part.
pub fn float_literal(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

fn invalid(literal: &str, reason: &str) -> CompileError {
    CompileError::InvalidLiteral {
        literal: literal.to_string(),
        reason: reason.to_string(),
    }
}

impl FromStr for Decimal {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, unsigned) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
            Some(pos) => {
                let exponent = unsigned[pos + 1..]
                    .parse::<i32>()
                    .map_err(|_| invalid(s, "malformed exponent"))?;
                (&unsigned[..pos], exponent)
            }
            None => (unsigned, 0),
        };

        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid(s, "no digits"));
        }
        if !int_part
            .bytes()
            .chain(frac_part.bytes())
            .all(|b| b.is_ascii_digit())
        {
            return Err(invalid(s, "unexpected character"));
        }

        let all_digits = format!("{int_part}{frac_part}");
        let significant = all_digits.trim_start_matches('0');
        let trimmed = significant.trim_end_matches('0');
        if trimmed.len() > MAX_DIGITS {
            return Err(invalid(s, "too many significant digits"));
        }

        let exponent = if trimmed.is_empty() {
            0
        } else {
            let trailing = i32::try_from(significant.len() - trimmed.len())
                .map_err(|_| invalid(s, "exponent out of range"))?;
            let frac_len = i32::try_from(frac_part.len())
                .map_err(|_| invalid(s, "exponent out of range"))?;
            exponent
                .checked_sub(frac_len)
                .and_then(|e| e.checked_add(trailing))
                .ok_or_else(|| invalid(s, "exponent out of range"))?
        };

        let decimal = Decimal {
            negative: negative && !trimmed.is_empty(),
            digits: trimmed.to_string(),
            exponent,
            value: 0.0,
        };
        let value = decimal
            .to_scientific()
            .parse::<f64>()
            .map_err(|_| invalid(s, "not a number"))?;

        Ok(Decimal { value, ..decimal })
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = if self.digits.is_empty() {
            "0"
        } else {
            &self.digits
        };
        let k = self.exponent.unsigned_abs() as usize;

        if self.exponent >= 0 && k <= MAX_POSITIONAL_ZEROS {
            if self.negative {
                f.write_str("-")?;
            }
            write!(f, "{digits}{}", "0".repeat(k))
        } else if self.exponent < 0 && k <= digits.len() + MAX_POSITIONAL_ZEROS {
            if self.negative {
                f.write_str("-")?;
            }
            if digits.len() > k {
                let (int_part, frac_part) = digits.split_at(digits.len() - k);
                write!(f, "{int_part}.{frac_part}")
            } else {
                write!(f, "0.{}{digits}", "0".repeat(k - digits.len()))
            }
        } else {
            f.write_str(&self.to_scientific())
        }
    }
}
