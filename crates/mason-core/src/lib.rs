//! Mason: a pipeline definition compiler.
//!
//! Mason turns an abstract pipeline of "bricks" (one source, zero or more
//! transformations, one sink) into a concrete execution plan for a target
//! processing runtime. The core is a pure library: it type-checks a
//! [`PipelineDefinition`] against the [`Catalog`], verifies that the chain of
//! bricks is format-compatible end to end, and lowers each brick into target
//! processing units and deduplicated shared services.
//!
//! The catalog is always an explicit argument, never process-global state, so
//! multiple catalogs can coexist (e.g. versioned catalogs in tests).

mod api;
mod catalog;
mod compile;
mod field;
mod format;
mod pipeline;
mod plan;
mod properties;
mod validate;

pub use api::{BoundaryError, ValidationReport, compile_definition, validate_definition};
pub use catalog::{BrickDescriptor, BrickKind, Catalog, Lower, LowerError};
pub use compile::{CompileError, Compiler, LowerContext};
pub use field::{FieldSpec, FieldValidator};
pub use format::FormatTag;
pub use pipeline::{BrickInstance, DefinitionError, DefinitionFormat, PipelineDefinition};
pub use plan::{ExecutionPlan, ProcessingUnit, ServiceSpec};
pub use properties::{Properties, PropertiesExt, Value};
pub use validate::{Diagnostic, DiagnosticKind, Slot, ValidationResult, Validator};
