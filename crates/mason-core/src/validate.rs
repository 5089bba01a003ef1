//! Semantic validation of pipeline definitions.
//!
//! Validation never stops at the first problem: the user edits the pipeline
//! interactively and needs complete feedback per run, so every check executes
//! and all diagnostics are collected. The validator is pure and performs no
//! I/O; it can run on every keystroke.

use crate::catalog::{BrickDescriptor, BrickKind, Catalog};
use crate::pipeline::{BrickInstance, PipelineDefinition};
use serde::Serialize;
use std::fmt;

/// Position of a brick within the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Source,
    Transformation(usize),
    Sink,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Source => f.write_str("source"),
            Slot::Transformation(index) => write!(f, "transformation[{}]", index),
            Slot::Sink => f.write_str("sink"),
        }
    }
}

/// What went wrong. Every kind is recoverable by editing the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The brick type is not in the catalog.
    UnknownBrick,
    /// A slot holds a brick of the wrong category.
    CategoryMismatch,
    /// A field is missing or fails its validator.
    FieldInvalid,
    /// A property is not declared by the brick's descriptor.
    UnknownField,
    /// Two adjacent bricks cannot be chained.
    FormatIncompatible,
    /// The source slot is empty.
    MissingSource,
    /// The sink slot is empty.
    MissingSink,
}

/// One finding, specific enough to pinpoint the offending brick and field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub slot: Slot,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    fn new(slot: Slot, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            slot,
            kind,
            message: message.into(),
        }
    }
}

/// Outcome of validating a definition. Never an `Err`: diagnostics are data.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid,
    Invalid(Vec<Diagnostic>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// The collected diagnostics; empty when valid.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            ValidationResult::Valid => &[],
            ValidationResult::Invalid(diags) => diags,
        }
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        match self {
            ValidationResult::Valid => Vec::new(),
            ValidationResult::Invalid(diags) => diags,
        }
    }
}

/// Validator over a catalog. The catalog is an explicit dependency so that
/// multiple catalogs can coexist.
pub struct Validator<'a> {
    catalog: &'a Catalog,
}

impl<'a> Validator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Validate a definition, collecting every diagnostic found.
    pub fn validate(&self, def: &PipelineDefinition) -> ValidationResult {
        let mut diags = Vec::new();

        match &def.source {
            Some(brick) => self.check_brick(Slot::Source, brick, BrickKind::Source, &mut diags),
            None => diags.push(Diagnostic::new(
                Slot::Source,
                DiagnosticKind::MissingSource,
                "pipeline has no source brick",
            )),
        }

        for (index, brick) in def.transformations.iter().enumerate() {
            self.check_brick(
                Slot::Transformation(index),
                brick,
                BrickKind::Transformation,
                &mut diags,
            );
        }

        match &def.sink {
            Some(brick) => self.check_brick(Slot::Sink, brick, BrickKind::Sink, &mut diags),
            None => diags.push(Diagnostic::new(
                Slot::Sink,
                DiagnosticKind::MissingSink,
                "pipeline has no sink brick",
            )),
        }

        self.check_format_chain(def, &mut diags);

        tracing::debug!(
            pipeline = %def.name,
            diagnostics = diags.len(),
            "validated pipeline definition"
        );

        if diags.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(diags)
        }
    }

    /// Category membership plus field schema conformance for one brick.
    fn check_brick(
        &self,
        slot: Slot,
        brick: &BrickInstance,
        expected: BrickKind,
        diags: &mut Vec<Diagnostic>,
    ) {
        let Some(descriptor) = self.catalog.get(&brick.brick_type) else {
            diags.push(Diagnostic::new(
                slot,
                DiagnosticKind::UnknownBrick,
                format!("unknown brick type \"{}\"", brick.brick_type),
            ));
            return;
        };

        if descriptor.kind != expected {
            diags.push(Diagnostic::new(
                slot,
                DiagnosticKind::CategoryMismatch,
                format!(
                    "\"{}\" is a {} brick but the {} slot requires a {}",
                    descriptor.name, descriptor.kind, slot, expected
                ),
            ));
        }

        for (field, spec) in &descriptor.fields {
            match brick.properties.get(field) {
                Some(value) => {
                    if let Err(reason) = spec.validator.check(value) {
                        diags.push(Diagnostic::new(
                            slot,
                            DiagnosticKind::FieldInvalid,
                            format!("field \"{}\": {}", field, reason),
                        ));
                    }
                }
                None if spec.required => diags.push(Diagnostic::new(
                    slot,
                    DiagnosticKind::FieldInvalid,
                    format!("required field \"{}\" is missing", field),
                )),
                None => {}
            }
        }

        for property in brick.properties.keys() {
            if !descriptor.fields.contains_key(property) {
                diags.push(Diagnostic::new(
                    slot,
                    DiagnosticKind::UnknownField,
                    format!(
                        "\"{}\" has no field named \"{}\"",
                        descriptor.name, property
                    ),
                ));
            }
        }
    }

    /// Walk `[source, t_1, ..., t_n, sink]` and check each adjacent pair.
    ///
    /// Bricks with unknown types are skipped; they already produced an
    /// `UnknownBrick` diagnostic and have no format declaration to check.
    /// An incompatibility is attributed to the downstream brick's slot.
    fn check_format_chain(&self, def: &PipelineDefinition, diags: &mut Vec<Diagnostic>) {
        let mut chain: Vec<(Slot, &BrickDescriptor)> = Vec::new();

        if let Some(brick) = &def.source
            && let Some(descriptor) = self.catalog.get(&brick.brick_type)
        {
            chain.push((Slot::Source, descriptor));
        }
        for (index, brick) in def.transformations.iter().enumerate() {
            if let Some(descriptor) = self.catalog.get(&brick.brick_type) {
                chain.push((Slot::Transformation(index), descriptor));
            }
        }
        if let Some(brick) = &def.sink
            && let Some(descriptor) = self.catalog.get(&brick.brick_type)
        {
            chain.push((Slot::Sink, descriptor));
        }

        for pair in chain.windows(2) {
            let (_, upstream) = pair[0];
            let (slot, downstream) = pair[1];
            if !downstream.input.accepts(upstream.output) {
                diags.push(Diagnostic::new(
                    slot,
                    DiagnosticKind::FormatIncompatible,
                    format!(
                        "\"{}\" produces {} but \"{}\" requires {}",
                        upstream.name, upstream.output, downstream.name, downstream.input
                    ),
                ));
            }
        }
    }
}
