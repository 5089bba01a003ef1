//! The external boundary: JSON in, JSON-serializable results out.
//!
//! These two functions are the whole contract with the surrounding system
//! (UI, persistence, deployment). The core has no CLI and performs no
//! network calls.

use crate::catalog::Catalog;
use crate::compile::{CompileError, Compiler};
use crate::pipeline::{DefinitionError, DefinitionFormat, PipelineDefinition};
use crate::plan::ExecutionPlan;
use crate::validate::{Diagnostic, ValidationResult, Validator};
use serde::Serialize;

/// Wire-shaped validation outcome: `{ "valid": ..., "diagnostics": [...] }`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl From<ValidationResult> for ValidationReport {
    fn from(result: ValidationResult) -> Self {
        let valid = result.is_valid();
        Self {
            valid,
            diagnostics: result.into_diagnostics(),
        }
    }
}

/// Errors crossing the boundary. Parse failures and compile failures; a
/// definition that merely fails validation is a report, not an error.
#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Validate a JSON pipeline definition against a catalog.
pub fn validate_definition(
    catalog: &Catalog,
    json: &[u8],
) -> Result<ValidationReport, BoundaryError> {
    let def = PipelineDefinition::parse(json, DefinitionFormat::Json)?;
    Ok(Validator::new(catalog).validate(&def).into())
}

/// Compile a JSON pipeline definition into an execution plan.
pub fn compile_definition(
    catalog: &Catalog,
    json: &[u8],
) -> Result<ExecutionPlan, BoundaryError> {
    let def = PipelineDefinition::parse(json, DefinitionFormat::Json)?;
    Ok(Compiler::new(catalog).compile(&def)?)
}
