//! The execution plan: the compiler's terminal output.
//!
//! A plan is handed to an external deployment collaborator; this crate never
//! pushes it anywhere. Wire keys are camelCase (`targetType`, `serviceRefs`)
//! to match the deployment boundary.

use crate::properties::Properties;
use serde::{Deserialize, Serialize};

/// One concrete processing unit in the target runtime's vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingUnit {
    /// Concrete unit type, e.g. `"ListenHTTP"`.
    pub target_type: String,
    /// Human-readable name, unique within the plan.
    pub name: String,
    /// Target-specific configuration keys.
    pub properties: Properties,
    /// Ids of shared services this unit depends on.
    #[serde(default)]
    pub service_refs: Vec<String>,
}

/// A shared, deduplicated configuration service.
///
/// Two units needing the same service role with identical configuration
/// reference a single spec; differing configurations get distinct ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    /// Stable identifier derived from the service role,
    /// e.g. `"csv-reader-service"`.
    pub id: String,
    /// Concrete service type, e.g. `"CSVReader"`.
    pub target_type: String,
    /// Target-specific configuration keys.
    pub properties: Properties,
}

/// The compiled plan: units in pipeline order plus the deduplicated services
/// they reference. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// Processing units: source unit(s) first, then transformations in
    /// definition order, then sink unit(s).
    pub units: Vec<ProcessingUnit>,
    /// Shared services. No positional meaning.
    pub services: Vec<ServiceSpec>,
}

impl ExecutionPlan {
    /// Look up a service by id.
    pub fn service(&self, id: &str) -> Option<&ServiceSpec> {
        self.services.iter().find(|s| s.id == id)
    }

    /// Check that every `service_refs` entry resolves to a service in the
    /// plan. Holds for every plan the compiler produces.
    pub fn refs_resolved(&self) -> bool {
        self.units
            .iter()
            .flat_map(|u| u.service_refs.iter())
            .all(|id| self.service(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::PropertiesExt;

    fn sample_plan() -> ExecutionPlan {
        ExecutionPlan {
            units: vec![ProcessingUnit {
                target_type: "PutElasticsearchRecord".into(),
                name: "Elasticsearch".into(),
                properties: Properties::new().with("index", "orders"),
                service_refs: vec!["elasticsearch-client-service".into()],
            }],
            services: vec![ServiceSpec {
                id: "elasticsearch-client-service".into(),
                target_type: "ElasticsearchClientService".into(),
                properties: Properties::new().with("http-hosts", "http://localhost:9200"),
            }],
        }
    }

    #[test]
    fn test_refs_resolved() {
        let mut plan = sample_plan();
        assert!(plan.refs_resolved());

        plan.services.clear();
        assert!(!plan.refs_resolved());
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let json = serde_json::to_string(&sample_plan()).unwrap();

        assert!(json.contains("\"targetType\""));
        assert!(json.contains("\"serviceRefs\""));
        assert!(!json.contains("target_type"));
    }
}
