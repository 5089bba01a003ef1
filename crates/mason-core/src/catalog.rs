//! The brick catalog: descriptors, lowering implementations, and the registry
//! that indexes both by brick type name.
//!
//! The catalog is open for extension: registering a new brick type never
//! touches the validator or the compiler, because each entry carries its own
//! field schemas and its own lowering implementation.

use crate::compile::LowerContext;
use crate::field::FieldSpec;
use crate::format::FormatTag;
use crate::pipeline::BrickInstance;
use crate::properties::Properties;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Category of a brick type. Determines which pipeline slot may hold it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrickKind {
    Source,
    Transformation,
    Sink,
}

impl fmt::Display for BrickKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BrickKind::Source => "source",
            BrickKind::Transformation => "transformation",
            BrickKind::Sink => "sink",
        };
        f.write_str(label)
    }
}

/// Declaration of a brick type's interface.
///
/// Describes what a brick accepts and produces without containing lowering
/// logic; the matching [`Lower`] implementation is registered alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickDescriptor {
    /// Unique name, e.g. `"HTTP"` or `"CSV to JSON"`.
    pub name: String,
    /// Which pipeline slot this brick may occupy.
    pub kind: BrickKind,
    /// Format required on the input side.
    pub input: FormatTag,
    /// Format produced on the output side.
    pub output: FormatTag,
    /// Field schemas, in display order.
    pub fields: IndexMap<String, FieldSpec>,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}

impl BrickDescriptor {
    pub fn new(name: impl Into<String>, kind: BrickKind) -> Self {
        Self {
            name: name.into(),
            kind,
            input: FormatTag::Any,
            output: FormatTag::Any,
            fields: IndexMap::new(),
            description: String::new(),
        }
    }

    /// Convenience: a source brick (input side is irrelevant).
    pub fn source(name: impl Into<String>) -> Self {
        Self::new(name, BrickKind::Source)
    }

    /// Convenience: a transformation brick.
    pub fn transformation(name: impl Into<String>) -> Self {
        Self::new(name, BrickKind::Transformation)
    }

    /// Convenience: a sink brick (output side is irrelevant).
    pub fn sink(name: impl Into<String>) -> Self {
        Self::new(name, BrickKind::Sink)
    }

    /// Set the required input format.
    pub fn consumes(mut self, tag: FormatTag) -> Self {
        self.input = tag;
        self
    }

    /// Set the produced output format.
    pub fn produces(mut self, tag: FormatTag) -> Self {
        self.output = tag;
        self
    }

    /// Add a field schema.
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    /// Set the description.
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }
}

/// Errors raised while lowering a single brick.
///
/// Field validation has already passed by the time lowering runs, so these
/// cover structural problems only visible when a property is actually used.
#[derive(Debug, thiserror::Error)]
pub enum LowerError {
    #[error("missing required property: {0}")]
    MissingProperty(String),

    #[error("property {property} is unusable: {reason}")]
    UnusableProperty { property: String, reason: String },

    #[error("lowering failed: {0}")]
    Failed(String),
}

/// Trait for lowering one brick type into processing units and services.
///
/// Implementations are pure over their inputs; all output goes through the
/// [`LowerContext`].
pub trait Lower: Send + Sync {
    fn lower(&self, properties: &Properties, ctx: &mut LowerContext) -> Result<(), LowerError>;
}

/// Blanket impl so plain functions can be registered as lowerings.
impl<F> Lower for F
where
    F: Fn(&Properties, &mut LowerContext) -> Result<(), LowerError> + Send + Sync,
{
    fn lower(&self, properties: &Properties, ctx: &mut LowerContext) -> Result<(), LowerError> {
        self(properties, ctx)
    }
}

struct CatalogEntry {
    descriptor: BrickDescriptor,
    lowering: Arc<dyn Lower>,
}

/// Registry of brick types, read-only after construction.
#[derive(Default)]
pub struct Catalog {
    entries: IndexMap<String, CatalogEntry>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a brick type with its lowering implementation.
    ///
    /// Registering the same name twice replaces the earlier entry.
    pub fn register(&mut self, descriptor: BrickDescriptor, lowering: impl Lower + 'static) {
        let name = descriptor.name.clone();
        self.entries.insert(
            name,
            CatalogEntry {
                descriptor,
                lowering: Arc::new(lowering),
            },
        );
    }

    /// Look up a descriptor by brick type name.
    pub fn get(&self, name: &str) -> Option<&BrickDescriptor> {
        self.entries.get(name).map(|e| &e.descriptor)
    }

    /// Look up the lowering implementation for a brick type.
    pub fn lowering(&self, name: &str) -> Option<Arc<dyn Lower>> {
        self.entries.get(name).map(|e| e.lowering.clone())
    }

    /// Build an instance of a brick type with every field at its default.
    pub fn default_instance(&self, name: &str) -> Option<BrickInstance> {
        let descriptor = self.get(name)?;
        let properties: Properties = descriptor
            .fields
            .iter()
            .map(|(field, spec)| (field.clone(), spec.default.clone()))
            .collect();
        Some(BrickInstance {
            brick_type: descriptor.name.clone(),
            properties,
        })
    }

    /// Names of all brick types of the given kind, in registration order.
    ///
    /// The UI uses this to restrict what is selectable per slot.
    pub fn kind_members(&self, kind: BrickKind) -> Vec<&str> {
        self.entries
            .values()
            .filter(|e| e.descriptor.kind == kind)
            .map(|e| e.descriptor.name.as_str())
            .collect()
    }

    /// Iterate over all descriptors.
    pub fn descriptors(&self) -> impl Iterator<Item = &BrickDescriptor> {
        self.entries.values().map(|e| &e.descriptor)
    }

    /// Number of registered brick types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
