//! Error types for schema compilation and loading.

use thiserror::Error;

/// Errors produced when compiling a [crate::schema::Schema] into render contexts.
///
/// Every variant aborts the whole run. Errors raised while compiling a struct
/// or definition are wrapped in [CompileError::InStruct] or
/// [CompileError::InDefinition] so the message names where the failure
/// happened; use [CompileError::innermost] to match on the underlying kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Field type is neither a primitive nor a registered struct.
    #[error("field `{field}` has unknown type `{ty}`")]
    UnknownType { field: String, ty: String },
    /// Conversion cannot be applied to the field's type or length.
    #[error("field `{field}` has an invalid conversion: {reason}")]
    InvalidConversion { field: String, reason: String },
    /// Display hint cannot be rendered for the field's decoded value.
    #[error("field `{field}` has an invalid display format: {reason}")]
    InvalidDisplay { field: String, reason: String },
    /// A numeric literal for `m` or `c` could not be parsed or is not finite.
    #[error("invalid numeric literal `{literal}`: {reason}")]
    InvalidLiteral { literal: String, reason: String },
    /// A struct references itself or a struct declared after it.
    #[error("field `{field}` references struct `{target}` before it is defined")]
    ForwardStructReference { field: String, target: String },
    /// Struct name declared twice or shadowing a primitive type.
    #[error("struct `{0}` is defined more than once")]
    DuplicateStruct(String),
    /// Definition id declared twice.
    #[error("definition {0} is defined more than once")]
    DuplicateDefinition(u16),
    /// Definition id is not an integer in `0..=0x0FFF`.
    #[error("definition id `{0}` is not an integer between 0 and 4095")]
    InvalidDefinitionId(String),
    /// The fixed fields of a definition need more bytes than a record holds.
    #[error("fields need {size} bytes, more than the 255 a record holds")]
    RecordTooLarge { size: usize },
    /// A variable-length field is followed by more fields.
    #[error("variable-length field `{0}` must be the last field")]
    MisplacedVariableTail(String),
    #[error("in struct `{name}`")]
    InStruct {
        name: String,
        #[source]
        source: Box<CompileError>,
    },
    #[error("in definition {id}")]
    InDefinition {
        id: u16,
        #[source]
        source: Box<CompileError>,
    },
}

impl CompileError {
    /// Strips struct/definition context and returns the error that caused it.
    pub fn innermost(&self) -> &CompileError {
        let mut err = self;
        while let CompileError::InStruct { source, .. } | CompileError::InDefinition { source, .. } =
            err
        {
            err = &**source;
        }
        err
    }

    pub(crate) fn in_struct(self, name: &str) -> Self {
        CompileError::InStruct {
            name: name.to_string(),
            source: Box::new(self),
        }
    }

    pub(crate) fn in_definition(self, id: u16) -> Self {
        CompileError::InDefinition {
            id,
            source: Box::new(self),
        }
    }

    pub(crate) fn conversion(field: &str, reason: impl Into<String>) -> Self {
        CompileError::InvalidConversion {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors produced when loading a schema document (see [crate::serde]).
#[cfg(feature = "serde")]
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document is not valid JSON or does not have the schema's shape.
    #[error("malformed schema document")]
    Parse(#[from] serde_json::Error),
    /// The document parsed but describes an invalid schema.
    #[error("invalid schema")]
    Compile(#[from] CompileError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_innermost_unwraps_context() {
        let err = CompileError::UnknownType {
            field: "x".to_string(),
            ty: "uint128_t".to_string(),
        }
        .in_struct("inner")
        .in_definition(7);

        assert_eq!(err.to_string(), "in definition 7");
        assert_eq!(
            err.innermost(),
            &CompileError::UnknownType {
                field: "x".to_string(),
                ty: "uint128_t".to_string(),
            }
        );
    }
}
