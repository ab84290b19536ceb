//! Schema: structs and definitions compiled into per-definition render contexts.

use std::collections::HashSet;

use log::debug;

use crate::{
    compiled::{DecodeOp, MAX_RECORD_SIZE, compile_field},
    errors::CompileError,
    field::Field,
    format::{FormatToken, compile_formats},
    registry::StructRegistry,
};

/// A named, ordered group of fields usable as a field type.
#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    pub name: String,
    pub fields: Vec<Field>,
}

/// A top-level record layout, identified by its TDF id.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    /// TDF id, `0..=0x0FFF`.
    pub id: u16,
    /// Display name; defaults to the decimal id.
    pub name: Option<String>,
    pub fields: Vec<Field>,
}

/// Flattened field names, decode operations and format tokens of one struct
/// or definition. The three lists are positionally aligned and always have
/// the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderContext {
    names: Vec<String>,
    ops: Vec<DecodeOp>,
    formats: Vec<FormatToken>,
}

impl RenderContext {
    /// Compiles `fields` in order, resolving struct types through `registry`.
    pub fn assemble(fields: &[Field], registry: &StructRegistry) -> Result<Self, CompileError> {
        let mut context = RenderContext::default();

        for field in fields {
            let entries = compile_field(field, registry)?;
            let formats = compile_formats(field, registry)?;
            debug_assert_eq!(entries.len(), formats.len(), "field `{}`", field.name);

            for ((name, op), format) in entries.into_iter().zip(formats) {
                context.push(name, op, format);
            }
        }

        Ok(context)
    }

    pub fn push(&mut self, name: String, op: DecodeOp, format: FormatToken) {
        self.names.push(name);
        self.ops.push(op);
        self.formats.push(format);
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn ops(&self) -> &[DecodeOp] {
        &self.ops
    }

    pub fn formats(&self) -> &[FormatToken] {
        &self.formats
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DecodeOp, &FormatToken)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(&self.ops)
            .zip(&self.formats)
            .map(|((name, op), format)| (name, op, format))
    }

    /// Bytes read by the fixed-size entries.
    pub fn fixed_size(&self) -> usize {
        self.ops.iter().map(|op| op.read.fixed_size()).sum()
    }

    /// All format tokens joined with `,`, e.g. `{},0x{:08x}`.
    pub fn format_string(&self) -> String {
        self.formats
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Fails if a variable-length entry is followed by other entries.
    fn check_variable_tail(&self) -> Result<(), CompileError> {
        let last = self.ops.len().saturating_sub(1);
        match self
            .ops
            .iter()
            .position(|op| op.read.is_variable())
            .filter(|&pos| pos != last)
        {
            Some(pos) => Err(CompileError::MisplacedVariableTail(self.names[pos].clone())),
            None => Ok(()),
        }
    }

    fn check_record_size(&self) -> Result<(), CompileError> {
        match self.fixed_size() {
            size if size > MAX_RECORD_SIZE => Err(CompileError::RecordTooLarge { size }),
            _ => Ok(()),
        }
    }
}

/// A definition together with its render context.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDefinition {
    pub id: u16,
    pub name: String,
    pub context: RenderContext,
}

/// A compiled schema. Use [Schema::compile] to build from [Struct]s and
/// [Definition]s, then hand [Schema::definitions] to a renderer.
#[derive(Debug, Clone)]
pub struct Schema {
    registry: StructRegistry,
    /// Compiled definitions in declaration order.
    pub definitions: Vec<CompiledDefinition>,
}

impl Schema {
    /// Builds the struct registry, then compiles every definition against
    /// it. Fails on the first invalid struct or definition.
    pub fn compile(structs: &[Struct], definitions: &[Definition]) -> Result<Self, CompileError> {
        let registry = StructRegistry::build(structs)?;
        let mut compiled = Vec::with_capacity(definitions.len());
        let mut seen = HashSet::with_capacity(definitions.len());

        for definition in definitions {
            if !seen.insert(definition.id) {
                return Err(CompileError::DuplicateDefinition(definition.id));
            }

            let context = RenderContext::assemble(&definition.fields, &registry)
                .and_then(|context| {
                    context.check_variable_tail()?;
                    context.check_record_size()?;
                    Ok(context)
                })
                .map_err(|e| e.in_definition(definition.id))?;

            let name = definition
                .name
                .clone()
                .unwrap_or_else(|| definition.id.to_string());
            debug!(
                "compiled definition {} {} ({} entries)",
                definition.id,
                name,
                context.len()
            );

            compiled.push(CompiledDefinition {
                id: definition.id,
                name,
                context,
            });
        }

        Ok(Self {
            registry,
            definitions: compiled,
        })
    }

    pub fn registry(&self) -> &StructRegistry {
        &self.registry
    }

    pub fn get(&self, id: u16) -> Option<&CompiledDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }
}
