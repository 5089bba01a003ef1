//! Standard brick catalog for Mason.
//!
//! Ships the brick types the pipeline builder offers out of the box:
//!
//! - Sources: `HTTP`, `File`
//! - Transformations: `CSV to JSON`, `XML to JSON`, `Split Records`,
//!   `Add Fields`, `Merge Records`
//! - Sink: `Elasticsearch`
//!
//! The sink category is extensible like the others; Elasticsearch is simply
//! the only sink registered here. Target unit and service type names follow
//! the downstream runtime's vocabulary (`ListenHTTP`, `ConvertRecord`,
//! `CSVReader`, ...).

mod sink;
mod source;
mod transform;

use mason_core::{Catalog, LowerError, Properties};

/// Register every standard brick type with the given catalog.
pub fn register_all(catalog: &mut Catalog) {
    source::register(catalog);
    transform::register(catalog);
    sink::register(catalog);
}

/// Build a catalog containing exactly the standard bricks.
pub fn standard_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    register_all(&mut catalog);
    catalog
}

/// Fetch a required property as configuration text. Accepts the same scalar
/// shapes the field validators do, so a miss here means the descriptor and
/// the lowering disagree.
pub(crate) fn require_text(props: &Properties, key: &str) -> Result<String, LowerError> {
    props
        .get(key)
        .and_then(|v| v.to_text())
        .ok_or_else(|| LowerError::MissingProperty(key.to_string()))
}

/// Fetch an optional property as text, falling back to the field default.
pub(crate) fn text_or(props: &Properties, key: &str, default: &str) -> String {
    props
        .get(key)
        .and_then(|v| v.to_text())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mason_core::BrickKind;

    #[test]
    fn test_standard_catalog_contents() {
        let catalog = standard_catalog();

        assert_eq!(catalog.kind_members(BrickKind::Source), vec!["HTTP", "File"]);
        assert_eq!(
            catalog.kind_members(BrickKind::Transformation),
            vec![
                "CSV to JSON",
                "XML to JSON",
                "Split Records",
                "Add Fields",
                "Merge Records"
            ]
        );
        assert_eq!(catalog.kind_members(BrickKind::Sink), vec!["Elasticsearch"]);
    }

    #[test]
    fn test_every_brick_has_a_lowering() {
        let catalog = standard_catalog();
        for descriptor in catalog.descriptors() {
            assert!(
                catalog.lowering(&descriptor.name).is_some(),
                "{} has no lowering",
                descriptor.name
            );
        }
    }
}
