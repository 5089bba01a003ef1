//! The lowering engine: turn a validated definition into an execution plan.
//!
//! Lowering is table-driven. Each catalog entry owns its lowering
//! implementation; the compiler just walks the pipeline in order and threads
//! a per-call [`LowerContext`] through every brick. The context owns name
//! disambiguation and shared-service deduplication, so it is never shared
//! across compile calls.

use crate::catalog::{Catalog, LowerError};
use crate::pipeline::{BrickInstance, PipelineDefinition};
use crate::plan::{ExecutionPlan, ProcessingUnit, ServiceSpec};
use crate::properties::{Properties, Value};
use crate::validate::{Diagnostic, Slot, ValidationResult, Validator};
use indexmap::IndexMap;

/// Errors terminating a compile. Partial plans are never returned.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Compile was called on a definition that does not validate. This is a
    /// caller bug; the diagnostics are carried for debugging, not for users.
    #[error("pipeline failed validation with {} diagnostic(s)", .0.len())]
    NotValidated(Vec<Diagnostic>),

    /// A structurally valid field turned out to be unusable at lowering time.
    #[error("lowering \"{brick}\" at {slot} failed: {source}")]
    LoweringFailed {
        slot: Slot,
        brick: String,
        #[source]
        source: LowerError,
    },
}

/// Accumulator threaded through the lowering of one pipeline.
///
/// Collects units in brick order, deduplicates shared services by
/// `(target type, normalized configuration)`, and keeps display names unique
/// with `#n` suffixes.
#[derive(Default)]
pub struct LowerContext {
    units: Vec<ProcessingUnit>,
    services: Vec<ServiceSpec>,
    /// Dedup key -> id of the already-created service.
    service_index: IndexMap<String, String>,
    /// How many services already claimed each role slug.
    role_counts: IndexMap<String, usize>,
    /// How many units already claimed each display name.
    name_counts: IndexMap<String, usize>,
}

impl LowerContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a processing unit. The display name is made unique within the
    /// plan: a second "Split Records" becomes "Split Records #2".
    pub fn push_unit(
        &mut self,
        target_type: impl Into<String>,
        display_name: &str,
        properties: Properties,
        service_refs: Vec<String>,
    ) {
        let seen = self.name_counts.entry(display_name.to_string()).or_insert(0);
        *seen += 1;
        let name = if *seen == 1 {
            display_name.to_string()
        } else {
            format!("{} #{}", display_name, seen)
        };
        self.units.push(ProcessingUnit {
            target_type: target_type.into(),
            name,
            properties,
            service_refs,
        });
    }

    /// Get or create a shared service, returning its id.
    ///
    /// A service with the same target type and identical configuration is
    /// reused. A different configuration under the same role gets a fresh id
    /// (`"csv-reader-service-2"`).
    pub fn require_service(
        &mut self,
        role: &str,
        target_type: impl Into<String>,
        properties: Properties,
    ) -> String {
        let target_type = target_type.into();
        let key = dedup_key(&target_type, &properties);
        if let Some(id) = self.service_index.get(&key) {
            return id.clone();
        }

        let claimed = self.role_counts.entry(role.to_string()).or_insert(0);
        *claimed += 1;
        let id = if *claimed == 1 {
            role.to_string()
        } else {
            format!("{}-{}", role, claimed)
        };

        self.service_index.insert(key, id.clone());
        self.services.push(ServiceSpec {
            id: id.clone(),
            target_type,
            properties,
        });
        id
    }

    /// Finish the context into a plan. The compiler calls this after the
    /// last brick; tests of individual lowerings use it directly.
    pub fn into_plan(self) -> ExecutionPlan {
        ExecutionPlan {
            units: self.units,
            services: self.services,
        }
    }
}

/// Deterministic dedup key: target type plus configuration with top-level
/// keys sorted, so insertion order does not split identical services.
fn dedup_key(target_type: &str, properties: &Properties) -> String {
    let mut entries: Vec<(&String, &Value)> = properties.iter().collect();
    entries.sort_by_key(|(key, _)| key.as_str());
    let mut key = String::from(target_type);
    for (name, value) in entries {
        key.push('\u{1f}');
        key.push_str(name);
        key.push('=');
        // Values are serde-serializable; serialization cannot fail here.
        key.push_str(&serde_json::to_string(value).unwrap_or_default());
    }
    key
}

/// The lowering engine. Like the validator, it takes the catalog as an
/// explicit dependency.
pub struct Compiler<'a> {
    catalog: &'a Catalog,
}

impl<'a> Compiler<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Compile a definition into an execution plan.
    ///
    /// The definition is re-validated first; callers are expected to have
    /// validated already, so an invalid definition yields
    /// [`CompileError::NotValidated`]. The first lowering failure aborts the
    /// whole compile.
    pub fn compile(&self, def: &PipelineDefinition) -> Result<ExecutionPlan, CompileError> {
        if let ValidationResult::Invalid(diags) = Validator::new(self.catalog).validate(def) {
            return Err(CompileError::NotValidated(diags));
        }

        let mut ctx = LowerContext::new();

        if let Some(brick) = &def.source {
            self.lower_brick(Slot::Source, brick, &mut ctx)?;
        }
        for (index, brick) in def.transformations.iter().enumerate() {
            self.lower_brick(Slot::Transformation(index), brick, &mut ctx)?;
        }
        if let Some(brick) = &def.sink {
            self.lower_brick(Slot::Sink, brick, &mut ctx)?;
        }

        let plan = ctx.into_plan();
        tracing::debug!(
            pipeline = %def.name,
            units = plan.units.len(),
            services = plan.services.len(),
            "compiled pipeline"
        );
        Ok(plan)
    }

    fn lower_brick(
        &self,
        slot: Slot,
        brick: &BrickInstance,
        ctx: &mut LowerContext,
    ) -> Result<(), CompileError> {
        // Validation already confirmed the type exists.
        let lowering = self.catalog.lowering(&brick.brick_type).ok_or_else(|| {
            CompileError::LoweringFailed {
                slot,
                brick: brick.brick_type.clone(),
                source: LowerError::Failed("brick type vanished from catalog".into()),
            }
        })?;
        lowering
            .lower(&brick.properties, ctx)
            .map_err(|source| CompileError::LoweringFailed {
                slot,
                brick: brick.brick_type.clone(),
                source,
            })
    }
}
