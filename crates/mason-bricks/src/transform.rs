//! Transformation bricks.
//!
//! Record-oriented transformations (`CSV to JSON`, `XML to JSON`,
//! `Merge Records`) need shared reader/writer services; the lowering context
//! deduplicates those across the plan, so two bricks asking for a JSON
//! writer with the same configuration reference a single service.

use crate::{require_text, text_or};
use mason_core::{
    BrickDescriptor, Catalog, FieldSpec, FieldValidator, FormatTag, Lower, LowerContext,
    LowerError, Properties, PropertiesExt,
};

pub(crate) fn register(catalog: &mut Catalog) {
    catalog.register(
        BrickDescriptor::transformation("CSV to JSON")
            .consumes(FormatTag::Csv)
            .produces(FormatTag::JsonRecordStream)
            .field("delimiter", FieldSpec::optional(FieldValidator::one_of([",", ";", "\t"]), ","))
            .field("header", FieldSpec::optional(FieldValidator::one_of(["true", "false"]), "true"))
            .description("Parse CSV rows into a stream of JSON records"),
        CsvToJson,
    );
    catalog.register(
        BrickDescriptor::transformation("XML to JSON")
            .consumes(FormatTag::Xml)
            .produces(FormatTag::JsonRecordStream)
            .field("record-tag", FieldSpec::optional(FieldValidator::NonEmpty, "record"))
            .description("Parse XML elements into a stream of JSON records"),
        XmlToJson,
    );
    catalog.register(
        BrickDescriptor::transformation("Split Records")
            .consumes(FormatTag::JsonRecordStream)
            .produces(FormatTag::JsonRecordStream)
            .field("path", FieldSpec::required(FieldValidator::NonEmpty, "$.*"))
            .description("Split each record at a path expression"),
        SplitRecords,
    );
    catalog.register(
        BrickDescriptor::transformation("Add Fields")
            .consumes(FormatTag::JsonRecordStream)
            .produces(FormatTag::JsonRecordStream)
            .field("spec", FieldSpec::required(FieldValidator::NonEmpty, "[]"))
            .description("Add or modify record fields via a transformation specification"),
        AddFields,
    );
    catalog.register(
        BrickDescriptor::transformation("Merge Records")
            .consumes(FormatTag::JsonRecordStream)
            .produces(FormatTag::JsonRecordStream)
            .field("min-records", FieldSpec::optional(FieldValidator::Numeric, "1"))
            .description("Merge consecutive records into batches"),
        MergeRecords,
    );
}

/// Shared JSON record writer with default configuration. Every
/// record-oriented brick writes through the same service instance.
fn json_writer(ctx: &mut LowerContext) -> String {
    ctx.require_service("json-writer-service", "JSONRecordSetWriter", Properties::new())
}

/// `CSV to JSON` lowers to one conversion unit plus two shared services:
/// a CSV-format reader and a JSON-format writer.
struct CsvToJson;

impl Lower for CsvToJson {
    fn lower(&self, props: &Properties, ctx: &mut LowerContext) -> Result<(), LowerError> {
        let delimiter = text_or(props, "delimiter", ",");
        let header = text_or(props, "header", "true");
        let reader = ctx.require_service(
            "csv-reader-service",
            "CSVReader",
            Properties::new()
                .with("value-separator", delimiter)
                .with("treat-first-line-as-header", header),
        );
        let writer = json_writer(ctx);
        ctx.push_unit(
            "ConvertRecord",
            "CSV to JSON",
            Properties::new()
                .with("record-reader", reader.as_str())
                .with("record-writer", writer.as_str()),
            vec![reader, writer],
        );
        Ok(())
    }
}

/// `XML to JSON` mirrors the CSV brick with an XML-format reader.
struct XmlToJson;

impl Lower for XmlToJson {
    fn lower(&self, props: &Properties, ctx: &mut LowerContext) -> Result<(), LowerError> {
        let record_tag = text_or(props, "record-tag", "record");
        let reader = ctx.require_service(
            "xml-reader-service",
            "XMLReader",
            Properties::new().with("record-tag", record_tag),
        );
        let writer = json_writer(ctx);
        ctx.push_unit(
            "ConvertRecord",
            "XML to JSON",
            Properties::new()
                .with("record-reader", reader.as_str())
                .with("record-writer", writer.as_str()),
            vec![reader, writer],
        );
        Ok(())
    }
}

/// `Split Records` lowers to one splitting unit configured with a path
/// expression. No shared services.
struct SplitRecords;

impl Lower for SplitRecords {
    fn lower(&self, props: &Properties, ctx: &mut LowerContext) -> Result<(), LowerError> {
        let path = require_text(props, "path")?;
        ctx.push_unit(
            "SplitJson",
            "Split Records",
            Properties::new().with("json-path-expression", path),
            Vec::new(),
        );
        Ok(())
    }
}

/// `Add Fields` lowers to one field-transformation unit.
///
/// The `spec` field only has to be non-empty to pass validation; lowering is
/// where it must actually parse. A malformed specification aborts the whole
/// compile.
struct AddFields;

impl Lower for AddFields {
    fn lower(&self, props: &Properties, ctx: &mut LowerContext) -> Result<(), LowerError> {
        let spec = require_text(props, "spec")?;
        let parsed: serde_json::Value =
            serde_json::from_str(&spec).map_err(|e| LowerError::UnusableProperty {
                property: "spec".into(),
                reason: format!("not valid JSON: {}", e),
            })?;
        if !parsed.is_array() {
            return Err(LowerError::UnusableProperty {
                property: "spec".into(),
                reason: "transformation specification must be a JSON array of operations".into(),
            });
        }
        ctx.push_unit(
            "JoltTransformJSON",
            "Add Fields",
            Properties::new().with("jolt-specification", spec),
            Vec::new(),
        );
        Ok(())
    }
}

/// `Merge Records` lowers to one merging unit plus shared JSON reader and
/// writer services.
struct MergeRecords;

impl Lower for MergeRecords {
    fn lower(&self, props: &Properties, ctx: &mut LowerContext) -> Result<(), LowerError> {
        let min_records = text_or(props, "min-records", "1");
        let reader =
            ctx.require_service("json-reader-service", "JsonTreeReader", Properties::new());
        let writer = json_writer(ctx);
        ctx.push_unit(
            "MergeRecord",
            "Merge Records",
            Properties::new()
                .with("record-reader", reader.as_str())
                .with("record-writer", writer.as_str())
                .with("minimum-records", min_records),
            vec![reader, writer],
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mason_core::Value;

    #[test]
    fn test_csv_to_json_units_and_services() {
        let mut ctx = LowerContext::new();
        CsvToJson.lower(&Properties::new().with("delimiter", ";"), &mut ctx).unwrap();

        let plan = ctx.into_plan();
        assert_eq!(plan.units.len(), 1);
        assert_eq!(plan.units[0].target_type, "ConvertRecord");
        assert_eq!(plan.services.len(), 2);
        assert_eq!(plan.services[0].target_type, "CSVReader");
        assert_eq!(
            plan.services[0].properties.get("value-separator").and_then(Value::as_str),
            Some(";")
        );
        assert_eq!(plan.services[1].target_type, "JSONRecordSetWriter");
        assert!(plan.refs_resolved());
    }

    #[test]
    fn test_json_writer_shared_across_bricks() {
        let mut ctx = LowerContext::new();
        CsvToJson.lower(&Properties::new(), &mut ctx).unwrap();
        MergeRecords.lower(&Properties::new(), &mut ctx).unwrap();

        let plan = ctx.into_plan();
        let writers: Vec<_> = plan
            .services
            .iter()
            .filter(|s| s.target_type == "JSONRecordSetWriter")
            .collect();
        assert_eq!(writers.len(), 1);
        assert_eq!(writers[0].id, "json-writer-service");

        for unit in &plan.units {
            assert!(unit.service_refs.contains(&writers[0].id));
        }
    }

    #[test]
    fn test_distinct_csv_configurations_get_distinct_services() {
        let mut ctx = LowerContext::new();
        CsvToJson.lower(&Properties::new().with("delimiter", ","), &mut ctx).unwrap();
        CsvToJson.lower(&Properties::new().with("delimiter", ";"), &mut ctx).unwrap();

        let plan = ctx.into_plan();
        let readers: Vec<_> = plan
            .services
            .iter()
            .filter(|s| s.target_type == "CSVReader")
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(readers, vec!["csv-reader-service", "csv-reader-service-2"]);
    }

    #[test]
    fn test_split_records_unit() {
        let mut ctx = LowerContext::new();
        SplitRecords.lower(&Properties::new().with("path", "$.items"), &mut ctx).unwrap();

        let plan = ctx.into_plan();
        assert_eq!(plan.units[0].target_type, "SplitJson");
        assert_eq!(
            plan.units[0].properties.get("json-path-expression").and_then(Value::as_str),
            Some("$.items")
        );
    }

    #[test]
    fn test_add_fields_rejects_malformed_spec() {
        let mut ctx = LowerContext::new();
        let err = AddFields
            .lower(&Properties::new().with("spec", "not json at all"), &mut ctx)
            .unwrap_err();

        assert!(matches!(err, LowerError::UnusableProperty { property, .. } if property == "spec"));
    }

    #[test]
    fn test_add_fields_rejects_non_array_spec() {
        let mut ctx = LowerContext::new();
        let err = AddFields
            .lower(&Properties::new().with("spec", "{\"shift\": {}}"), &mut ctx)
            .unwrap_err();

        assert!(matches!(err, LowerError::UnusableProperty { .. }));
    }

    #[test]
    fn test_add_fields_accepts_operation_array() {
        let mut ctx = LowerContext::new();
        let spec = r#"[{"operation": "default", "spec": {"source": "http"}}]"#;
        AddFields.lower(&Properties::new().with("spec", spec), &mut ctx).unwrap();

        let plan = ctx.into_plan();
        assert_eq!(plan.units[0].target_type, "JoltTransformJSON");
    }

    #[test]
    fn test_merge_records_uses_defaults() {
        let mut ctx = LowerContext::new();
        MergeRecords.lower(&Properties::new(), &mut ctx).unwrap();

        let plan = ctx.into_plan();
        assert_eq!(plan.units[0].target_type, "MergeRecord");
        assert_eq!(
            plan.units[0].properties.get("minimum-records").and_then(Value::as_str),
            Some("1")
        );
        assert_eq!(plan.services.len(), 2);
    }

    #[test]
    fn test_merge_records_keeps_integer_minimum() {
        let mut ctx = LowerContext::new();
        MergeRecords.lower(&Properties::new().with("min-records", 5i64), &mut ctx).unwrap();

        let plan = ctx.into_plan();
        assert_eq!(
            plan.units[0].properties.get("minimum-records").and_then(Value::as_str),
            Some("5")
        );
    }
}
