//! Pipeline definitions: the abstract, user-assembled pipeline.
//!
//! A definition is an ordered chain: one source, zero or more
//! transformations, one sink. The canonical wire shape uses named fields:
//!
//! ```json
//! {
//!   "name": "orders",
//!   "source": { "type": "HTTP", "properties": { "port": "8080", "path": "/data" } },
//!   "transformations": [],
//!   "sink": { "type": "Elasticsearch", "properties": { "url": "http://localhost:9200", "index": "orders" } }
//! }
//! ```
//!
//! The legacy shape where `processors[0]` doubled as the source is not
//! accepted; the two shapes are not interchangeable.

use crate::catalog::Catalog;
use crate::properties::Properties;
use serde::{Deserialize, Serialize};

/// One configured brick inside a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickInstance {
    /// Name of the brick type in the catalog.
    #[serde(rename = "type")]
    pub brick_type: String,

    /// Field values, keyed by field name.
    #[serde(default)]
    pub properties: Properties,
}

impl BrickInstance {
    /// Create an instance with empty properties.
    pub fn new(brick_type: impl Into<String>) -> Self {
        Self {
            brick_type: brick_type.into(),
            properties: Properties::new(),
        }
    }

    /// Set one property, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<crate::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Switch this instance to a different brick type.
    ///
    /// Properties are reset to the new type's defaults; the old values are
    /// meaningless under the new schema. Returns false if the type is not in
    /// the catalog, leaving the instance untouched.
    pub fn change_type(&mut self, catalog: &Catalog, brick_type: &str) -> bool {
        match catalog.default_instance(brick_type) {
            Some(fresh) => {
                *self = fresh;
                true
            }
            None => false,
        }
    }
}

/// A user's abstract pipeline: source, transformations in data-flow order,
/// sink. Slots may be empty while the pipeline is being assembled; the
/// validator reports empty required slots as diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    /// Non-empty identifier chosen by the user.
    #[serde(default)]
    pub name: String,

    /// The single source slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<BrickInstance>,

    /// Transformation slots; order is the data-flow order.
    #[serde(default)]
    pub transformations: Vec<BrickInstance>,

    /// The single sink slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink: Option<BrickInstance>,
}

impl PipelineDefinition {
    /// Create an empty definition with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the source slot.
    pub fn source(mut self, brick: BrickInstance) -> Self {
        self.source = Some(brick);
        self
    }

    /// Append a transformation.
    pub fn transform(mut self, brick: BrickInstance) -> Self {
        self.transformations.push(brick);
        self
    }

    /// Set the sink slot.
    pub fn sink(mut self, brick: BrickInstance) -> Self {
        self.sink = Some(brick);
        self
    }

    /// Total number of brick instances across all slots.
    pub fn brick_count(&self) -> usize {
        usize::from(self.source.is_some())
            + self.transformations.len()
            + usize::from(self.sink.is_some())
    }

    /// Parse a definition from bytes, picking the format from a file path.
    /// Without a recognizable extension the canonical JSON shape is assumed.
    pub fn from_bytes(data: &[u8], path: Option<&str>) -> Result<Self, DefinitionError> {
        let format = path
            .and_then(DefinitionFormat::from_path)
            .unwrap_or(DefinitionFormat::Json);
        Self::parse(data, format)
    }

    /// Parse a definition from bytes in a known format.
    pub fn parse(data: &[u8], format: DefinitionFormat) -> Result<Self, DefinitionError> {
        match format {
            DefinitionFormat::Json => {
                serde_json::from_slice(data).map_err(|e| DefinitionError::Parse(e.to_string()))
            }
            DefinitionFormat::Yaml => {
                serde_yaml::from_slice(data).map_err(|e| DefinitionError::Parse(e.to_string()))
            }
            DefinitionFormat::Toml => {
                let s = std::str::from_utf8(data)
                    .map_err(|e| DefinitionError::Parse(format!("invalid UTF-8: {}", e)))?;
                toml::from_str(s).map_err(|e| DefinitionError::Parse(e.to_string()))
            }
        }
    }

    /// Serialize the definition.
    pub fn to_bytes(&self, format: DefinitionFormat) -> Result<Vec<u8>, DefinitionError> {
        match format {
            DefinitionFormat::Json => {
                serde_json::to_vec_pretty(self).map_err(|e| DefinitionError::Parse(e.to_string()))
            }
            DefinitionFormat::Yaml => serde_yaml::to_string(self)
                .map(String::into_bytes)
                .map_err(|e| DefinitionError::Parse(e.to_string())),
            DefinitionFormat::Toml => toml::to_string_pretty(self)
                .map(String::into_bytes)
                .map_err(|e| DefinitionError::Parse(e.to_string())),
        }
    }
}

/// On-disk encodings a pipeline definition can be read from and written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Json,
    Yaml,
    Toml,
}

impl DefinitionFormat {
    /// Recognize a format from a file path extension.
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = path.rsplit('.').next()?;
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Errors related to reading and writing pipeline definitions.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("failed to parse pipeline definition: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::Value;

    #[test]
    fn test_builder() {
        let def = PipelineDefinition::new("orders")
            .source(BrickInstance::new("HTTP").with("port", "8080"))
            .transform(BrickInstance::new("Split Records").with("path", "$.*"))
            .sink(BrickInstance::new("Elasticsearch"));

        assert_eq!(def.name, "orders");
        assert_eq!(def.brick_count(), 3);
        assert_eq!(def.transformations.len(), 1);
    }

    #[test]
    fn test_canonical_json_shape() {
        let json = br#"{
            "name": "orders",
            "source": { "type": "HTTP", "properties": { "port": "8080", "path": "/data" } },
            "transformations": [
                { "type": "Split Records", "properties": { "path": "$.items" } }
            ],
            "sink": { "type": "Elasticsearch", "properties": { "url": "http://localhost:9200" } }
        }"#;

        let def = PipelineDefinition::parse(json, DefinitionFormat::Json).unwrap();

        assert_eq!(def.source.as_ref().unwrap().brick_type, "HTTP");
        assert_eq!(
            def.transformations[0].properties.get("path").and_then(Value::as_str),
            Some("$.items")
        );
        assert_eq!(def.sink.as_ref().unwrap().brick_type, "Elasticsearch");
    }

    #[test]
    fn test_partial_definition_parses() {
        // A half-built pipeline is representable; the validator flags it.
        let def =
            PipelineDefinition::parse(br#"{ "name": "wip" }"#, DefinitionFormat::Json).unwrap();

        assert!(def.source.is_none());
        assert!(def.sink.is_none());
        assert_eq!(def.brick_count(), 0);
    }

    #[test]
    fn test_json_roundtrip() {
        let def = PipelineDefinition::new("roundtrip")
            .source(BrickInstance::new("File").with("path", "/in"))
            .sink(BrickInstance::new("Elasticsearch").with("index", "x"));

        let bytes = def.to_bytes(DefinitionFormat::Json).unwrap();
        let parsed = PipelineDefinition::from_bytes(&bytes, Some("pipeline.json")).unwrap();

        assert_eq!(parsed, def);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(DefinitionFormat::from_path("orders.json"), Some(DefinitionFormat::Json));
        assert_eq!(DefinitionFormat::from_path("orders.YML"), Some(DefinitionFormat::Yaml));
        assert_eq!(DefinitionFormat::from_path("orders.toml"), Some(DefinitionFormat::Toml));
        assert_eq!(DefinitionFormat::from_path("orders.ini"), None);
        assert_eq!(DefinitionFormat::from_path("orders"), None);
    }
}
