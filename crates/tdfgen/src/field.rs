//! Definition of logical fields used to build a [crate::schema::Schema].

use crate::{conversion::Conversion, primitive::Primitive};

/// A single named field of a struct or definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Name used for the flattened entries of this field.
    pub name: String,
    /// Primitive or struct type of one element.
    pub ty: FieldType,
    /// Array length, or string length for `char`. `Some(0)` marks a
    /// variable-length field that consumes the rest of the record.
    pub count: Option<usize>,
    /// Optional packed-integer and affine conversion.
    pub conversion: Option<Conversion>,
    /// Optional display hint for the formatted output.
    pub display: Option<DisplayFormat>,
}

impl Field {
    /// Creates a scalar field; `ty` is resolved with [FieldType::resolve].
    pub fn new(name: impl Into<String>, ty: &str) -> Self {
        Field {
            name: name.into(),
            ty: FieldType::resolve(ty),
            count: None,
            conversion: None,
            display: None,
        }
    }

    pub fn set_count(&mut self, count: usize) -> &mut Self {
        self.count = Some(count);
        self
    }

    pub fn set_conversion(&mut self, conversion: Conversion) -> &mut Self {
        self.conversion = Some(conversion);
        self
    }

    pub fn set_display(&mut self, display: DisplayFormat) -> &mut Self {
        self.display = Some(display);
        self
    }
}

#[cfg(feature = "serde")]
impl TryFrom<crate::serde::FieldDef> for Field {
    type Error = crate::errors::CompileError;

    fn try_from(value: crate::serde::FieldDef) -> Result<Self, Self::Error> {
        Ok(Field {
            ty: FieldType::resolve(&value.ty),
            count: value.num,
            conversion: value.conversion.map(TryInto::try_into).transpose()?,
            display: value.display.map(|d| d.fmt.into()),
            name: value.name,
        })
    }
}

/// Type of a field: one of the catalog's primitives or a named struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Primitive(Primitive),
    /// Reference to a struct; checked against the registry at compile time.
    Struct(String),
}

impl FieldType {
    /// Primitive names win; any other name is taken as a struct reference.
    pub fn resolve(name: &str) -> Self {
        match Primitive::from_name(name) {
            Some(primitive) => FieldType::Primitive(primitive),
            None => FieldType::Struct(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FieldType::Primitive(primitive) => primitive.name(),
            FieldType::Struct(name) => name,
        }
    }
}

/// How a field's values are shown in the formatted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayFormat {
    /// Zero-padded hexadecimal with a `0x` prefix.
    Hex,
}

#[cfg(feature = "serde")]
impl From<crate::serde::DisplayFmtDef> for DisplayFormat {
    fn from(value: crate::serde::DisplayFmtDef) -> Self {
        match value {
            crate::serde::DisplayFmtDef::Hex => DisplayFormat::Hex,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(
            FieldType::resolve("int16_t"),
            FieldType::Primitive(Primitive::Int16)
        );
        assert_eq!(
            FieldType::resolve("bt_addr_le"),
            FieldType::Struct("bt_addr_le".to_string())
        );
        assert_eq!(FieldType::resolve("float64_t").name(), "float64_t");
    }

    #[test]
    fn test_builder() {
        let mut field = Field::new("payload", "uint8_t");
        field.set_count(9).set_display(DisplayFormat::Hex);

        assert_eq!(field.count, Some(9));
        assert_eq!(field.display, Some(DisplayFormat::Hex));
        assert_eq!(field.conversion, None);
    }
}
