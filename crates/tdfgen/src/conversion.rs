//! A [`Conversion`] describes how a raw field value becomes its output value:
//! - **Packed integer**: a 3 or 6 byte array read as one 24/48-bit integer.
//! - **Affine**: optional `m` and `c` applied as `value * m + c` on an `f64`.
//!
//! ## Affine steps
//!
//! The multiply step is dropped when `m` is absent or zero and the add step
//! when `c` is absent or zero; the cast to `f64` stays as long as either is
//! present. When `1 / m` is a whole number the multiply becomes a division by
//! that number (`/ 10.0` instead of `* 0.1`), which is exact.

use std::fmt;

use crate::{
    decimal::{Decimal, Reciprocal, float_literal},
    errors::CompileError,
    primitive::Endian,
};

/// Conversion attached to a field.
///
/// Use the builder-style setters (`set_scale`, `set_packed`, etc.) to
/// configure.
///
/// # Example
///
/// ```
/// use tdfgen::conversion::Conversion;
///
/// let mut conversion = Conversion::new();
/// conversion.set_scale("0.1".parse().unwrap());
/// let affine = conversion.affine().unwrap().unwrap();
/// assert_eq!(affine.to_string(), " as f64 / 10.0");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversion {
    /// Multiplier `m`.
    pub scale: Option<Decimal>,
    /// Offset `c`, added after scaling.
    pub offset: Option<Decimal>,
    /// If set, the field's bytes form one integer in this byte order.
    pub packed: Option<Endian>,
}

impl Conversion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_scale(&mut self, scale: Decimal) -> &mut Self {
        self.scale = Some(scale);
        self
    }

    pub fn set_offset(&mut self, offset: Decimal) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    pub fn set_packed(&mut self, endian: Endian) -> &mut Self {
        self.packed = Some(endian);
        self
    }

    /// Computes the affine steps, or `None` when neither `m` nor `c` is set.
    pub fn affine(&self) -> Result<Option<Affine>, CompileError> {
        if self.scale.is_none() && self.offset.is_none() {
            return Ok(None);
        }

        let scale = match &self.scale {
            Some(m) if !m.is_zero() => Some(Scale::from_decimal(m)?),
            _ => None,
        };
        let offset = match &self.offset {
            Some(c) if !c.is_zero() => {
                c.literal()?;
                Some(c.to_f64())
            }
            _ => None,
        };

        Ok(Some(Affine { scale, offset }))
    }
}

/// Multiply step of an affine conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// Divide by a whole number, used when `m` is its exact reciprocal.
    Divide { divisor: Reciprocal, negative: bool },
    /// Multiply by the nearest `f64` to `m`.
    Multiply(f64),
}

impl Scale {
    fn from_decimal(m: &Decimal) -> Result<Self, CompileError> {
        if let Some(divisor) = m.reciprocal() {
            if !divisor.fits_f64() {
                return Err(CompileError::InvalidLiteral {
                    literal: m.to_scientific(),
                    reason: "reciprocal does not fit in a 64-bit float".to_string(),
                });
            }
            return Ok(Scale::Divide {
                divisor,
                negative: m.is_negative(),
            });
        }
        m.literal()?;
        Ok(Scale::Multiply(m.to_f64()))
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scale::Divide { divisor, negative } => {
                let sign = if *negative { "-" } else { "" };
                write!(f, " / {sign}{divisor}.0")
            }
            Scale::Multiply(m) => write!(f, " * {}", float_literal(*m)),
        }
    }
}

/// Cast to `f64` followed by the optional multiply and add steps.
///
/// Displays as the expression suffix appended to a read, e.g.
/// ` as f64 * 0.3 + -40.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub scale: Option<Scale>,
    pub offset: Option<f64>,
}

impl fmt::Display for Affine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(" as f64")?;
        if let Some(scale) = &self.scale {
            write!(f, "{scale}")?;
        }
        if let Some(offset) = self.offset {
            write!(f, " + {}", float_literal(offset))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn suffix(scale: Option<&str>, offset: Option<&str>) -> Option<String> {
        let mut conversion = Conversion::new();
        if let Some(m) = scale {
            conversion.set_scale(dec(m));
        }
        if let Some(c) = offset {
            conversion.set_offset(dec(c));
        }
        conversion.affine().unwrap().map(|a| a.to_string())
    }

    #[test]
    fn test_no_affine() {
        assert_eq!(suffix(None, None), None);

        let mut conversion = Conversion::new();
        conversion.set_packed(Endian::Big);
        assert_eq!(conversion.affine().unwrap(), None);
    }

    #[test]
    fn test_reciprocal_divides() {
        assert_eq!(suffix(Some("0.1"), None).unwrap(), " as f64 / 10.0");
        assert_eq!(suffix(Some("0.001"), None).unwrap(), " as f64 / 1000.0");
        assert_eq!(suffix(Some("-1"), None).unwrap(), " as f64 / -1.0");
        assert_eq!(suffix(Some("1"), None).unwrap(), " as f64 / 1.0");
    }

    #[test]
    fn test_large_reciprocal_divides() {
        assert_eq!(
            suffix(Some("1e-40"), None).unwrap(),
            format!(" as f64 / 1{}.0", "0".repeat(40))
        );
        assert_eq!(
            suffix(Some("-0.0000000000000000000000000000000000000000005"), None).unwrap(),
            format!(" as f64 / -2{}.0", "0".repeat(42))
        );

        let mut conversion = Conversion::new();
        conversion.set_scale(dec("1e-400"));
        assert!(matches!(
            conversion.affine(),
            Err(CompileError::InvalidLiteral { .. })
        ));
    }

    #[test]
    fn test_non_reciprocal_multiplies() {
        assert_eq!(suffix(Some("0.3"), None).unwrap(), " as f64 * 0.3");
        assert_eq!(suffix(Some("2"), None).unwrap(), " as f64 * 2.0");
        assert_eq!(suffix(Some("0.15"), None).unwrap(), " as f64 * 0.15");
    }

    #[test]
    fn test_zero_steps_are_dropped() {
        assert_eq!(suffix(Some("0"), None).unwrap(), " as f64");
        assert_eq!(suffix(Some("0"), Some("0.0")).unwrap(), " as f64");
        assert_eq!(suffix(None, Some("-40")).unwrap(), " as f64 + -40.0");
        assert_eq!(
            suffix(Some("0.5"), Some("273.15")).unwrap(),
            " as f64 / 2.0 + 273.15"
        );
    }

    #[test]
    fn test_non_finite_is_rejected() {
        let mut conversion = Conversion::new();
        conversion.set_scale(dec("1e999"));
        assert!(matches!(
            conversion.affine(),
            Err(CompileError::InvalidLiteral { .. })
        ));

        let mut conversion = Conversion::new();
        conversion.set_offset(dec("-1e999"));
        assert!(conversion.affine().is_err());
    }
}
