//! Struct registry: every named struct flattened once, before any definition.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::{
    errors::CompileError,
    field::{Field, FieldType},
    primitive::Primitive,
    schema::{RenderContext, Struct},
};

/// Flattened entries of every struct, keyed by struct name.
///
/// Built once by [StructRegistry::build] and read-only afterwards. Structs
/// are compiled in declaration order and may only use structs declared
/// before them, which also rules out cycles.
#[derive(Debug, Clone, Default)]
pub struct StructRegistry {
    structs: HashMap<String, RenderContext>,
}

impl StructRegistry {
    /// An empty registry, for schemas without structs.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(structs: &[Struct]) -> Result<Self, CompileError> {
        let mut registry = StructRegistry::new();
        let mut pending: HashSet<&str> = HashSet::with_capacity(structs.len());

        for s in structs {
            if Primitive::from_name(&s.name).is_some() || !pending.insert(&s.name) {
                return Err(CompileError::DuplicateStruct(s.name.clone()));
            }
        }

        for s in structs {
            for field in &s.fields {
                if let FieldType::Struct(target) = &field.ty {
                    if !registry.structs.contains_key(target) && pending.contains(target.as_str())
                    {
                        return Err(CompileError::ForwardStructReference {
                            field: field.name.clone(),
                            target: target.clone(),
                        }
                        .in_struct(&s.name));
                    }
                }
            }

            let context = RenderContext::assemble(&s.fields, &registry)
                .map_err(|e| e.in_struct(&s.name))?;
            debug!("compiled struct {} ({} entries)", s.name, context.len());

            pending.remove(s.name.as_str());
            registry.structs.insert(s.name.clone(), context);
        }

        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&RenderContext> {
        self.structs.get(name)
    }

    /// Resolves the struct `field` refers to, failing with
    /// [CompileError::UnknownType] if it was never registered.
    pub fn lookup(&self, field: &Field, name: &str) -> Result<&RenderContext, CompileError> {
        self.get(name).ok_or_else(|| CompileError::UnknownType {
            field: field.name.clone(),
            ty: name.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(name: &str, fields: Vec<Field>) -> Struct {
        Struct {
            name: name.to_string(),
            fields,
        }
    }

    #[test]
    fn test_build_empty() {
        let registry = StructRegistry::build(&[]).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_nested_structs() {
        let registry = StructRegistry::build(&[
            s(
                "point",
                vec![Field::new("x", "int16_t"), Field::new("y", "int16_t")],
            ),
            s(
                "segment",
                vec![Field::new("start", "point"), Field::new("end", "point")],
            ),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.get("segment").unwrap().names(),
            &["start.x", "start.y", "end.x", "end.y"]
        );
    }

    #[test]
    fn test_forward_reference_rejected() {
        let err = StructRegistry::build(&[
            s("outer", vec![Field::new("inner", "inner")]),
            s("inner", vec![Field::new("x", "uint8_t")]),
        ])
        .unwrap_err();

        assert_eq!(
            err.innermost(),
            &CompileError::ForwardStructReference {
                field: "inner".to_string(),
                target: "inner".to_string(),
            }
        );
    }

    #[test]
    fn test_self_reference_rejected() {
        let err = StructRegistry::build(&[s("node", vec![Field::new("next", "node")])])
            .unwrap_err();
        assert!(matches!(
            err.innermost(),
            CompileError::ForwardStructReference { .. }
        ));
    }

    #[test]
    fn test_duplicates_rejected() {
        let err = StructRegistry::build(&[
            s("a", vec![Field::new("x", "uint8_t")]),
            s("a", vec![Field::new("y", "uint8_t")]),
        ])
        .unwrap_err();
        assert_eq!(err, CompileError::DuplicateStruct("a".to_string()));

        let err = StructRegistry::build(&[s("uint8_t", vec![])]).unwrap_err();
        assert_eq!(err, CompileError::DuplicateStruct("uint8_t".to_string()));
    }

    #[test]
    fn test_unknown_inner_type() {
        let err = StructRegistry::build(&[s("a", vec![Field::new("x", "nope")])]).unwrap_err();
        assert_eq!(err.to_string(), "in struct `a`");
        assert!(matches!(err.innermost(), CompileError::UnknownType { .. }));
    }
}
