//! Sink bricks: where records leave the pipeline.

use crate::require_text;
use mason_core::{
    BrickDescriptor, Catalog, FieldSpec, FieldValidator, FormatTag, Lower, LowerContext,
    LowerError, Properties, PropertiesExt,
};

pub(crate) fn register(catalog: &mut Catalog) {
    catalog.register(
        BrickDescriptor::sink("Elasticsearch")
            .consumes(FormatTag::JsonRecordStream)
            .field("url", FieldSpec::required(FieldValidator::Url, "http://localhost:9200"))
            .field("index", FieldSpec::required(FieldValidator::NonEmpty, "records"))
            .description("Index records into Elasticsearch"),
        ElasticsearchSink,
    );
}

/// `Elasticsearch` lowers to one output unit plus one shared client service
/// carrying the connection configuration. Two sinks pointed at the same
/// cluster would share the client.
struct ElasticsearchSink;

impl Lower for ElasticsearchSink {
    fn lower(&self, props: &Properties, ctx: &mut LowerContext) -> Result<(), LowerError> {
        let url = require_text(props, "url")?;
        let index = require_text(props, "index")?;
        let client = ctx.require_service(
            "elasticsearch-client-service",
            "ElasticsearchClientService",
            Properties::new().with("http-hosts", url),
        );
        ctx.push_unit(
            "PutElasticsearchRecord",
            "Elasticsearch",
            Properties::new()
                .with("index", index)
                .with("client-service", client.as_str()),
            vec![client],
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mason_core::Value;

    #[test]
    fn test_sink_unit_and_client_service() {
        let mut ctx = LowerContext::new();
        let props = Properties::new()
            .with("url", "http://localhost:9200")
            .with("index", "orders");
        ElasticsearchSink.lower(&props, &mut ctx).unwrap();

        let plan = ctx.into_plan();
        assert_eq!(plan.units.len(), 1);
        assert_eq!(plan.units[0].target_type, "PutElasticsearchRecord");
        assert_eq!(plan.units[0].properties.get("index").and_then(Value::as_str), Some("orders"));
        assert_eq!(plan.services.len(), 1);
        assert_eq!(plan.services[0].id, "elasticsearch-client-service");
        assert_eq!(
            plan.services[0].properties.get("http-hosts").and_then(Value::as_str),
            Some("http://localhost:9200")
        );
        assert!(plan.refs_resolved());
    }

    #[test]
    fn test_same_cluster_shares_client() {
        let mut ctx = LowerContext::new();
        let props = Properties::new()
            .with("url", "http://localhost:9200")
            .with("index", "orders");
        ElasticsearchSink.lower(&props, &mut ctx).unwrap();
        let other = Properties::new()
            .with("url", "http://localhost:9200")
            .with("index", "returns");
        ElasticsearchSink.lower(&other, &mut ctx).unwrap();

        let plan = ctx.into_plan();
        assert_eq!(plan.services.len(), 1);
        assert_eq!(plan.units[1].name, "Elasticsearch #2");
    }

    #[test]
    fn test_missing_url() {
        let mut ctx = LowerContext::new();
        let err = ElasticsearchSink
            .lower(&Properties::new().with("index", "orders"), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, LowerError::MissingProperty(p) if p == "url"));
    }
}
