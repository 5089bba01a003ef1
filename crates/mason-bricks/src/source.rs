//! Source bricks: where data enters the pipeline.

use crate::require_text;
use mason_core::{
    BrickDescriptor, Catalog, FieldSpec, FieldValidator, FormatTag, Lower, LowerContext,
    LowerError, Properties, PropertiesExt,
};

pub(crate) fn register(catalog: &mut Catalog) {
    catalog.register(
        BrickDescriptor::source("HTTP")
            .produces(FormatTag::Json)
            .field("port", FieldSpec::required(FieldValidator::PortNumber, "8080"))
            .field("path", FieldSpec::required(FieldValidator::AbsolutePath, "/data"))
            .description("Listen for JSON payloads pushed over HTTP"),
        HttpSource,
    );
    catalog.register(
        BrickDescriptor::source("File")
            .produces(FormatTag::RawBytes)
            .field("path", FieldSpec::required(FieldValidator::AbsolutePath, "/data/in"))
            .description("Pick up files from a directory"),
        FileSource,
    );
}

/// `HTTP` lowers to one listening unit configured with port and base path.
struct HttpSource;

impl Lower for HttpSource {
    fn lower(&self, props: &Properties, ctx: &mut LowerContext) -> Result<(), LowerError> {
        let port = require_text(props, "port")?;
        let path = require_text(props, "path")?;
        ctx.push_unit(
            "ListenHTTP",
            "HTTP",
            Properties::new()
                .with("listening-port", port)
                .with("base-path", path),
            Vec::new(),
        );
        Ok(())
    }
}

/// `File` lowers to one pickup unit watching a directory.
struct FileSource;

impl Lower for FileSource {
    fn lower(&self, props: &Properties, ctx: &mut LowerContext) -> Result<(), LowerError> {
        let path = require_text(props, "path")?;
        ctx.push_unit(
            "GetFile",
            "File",
            Properties::new().with("input-directory", path),
            Vec::new(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mason_core::Value;

    #[test]
    fn test_http_lowers_to_one_listening_unit() {
        let mut ctx = LowerContext::new();
        let props = Properties::new().with("port", "9090").with("path", "/events");
        HttpSource.lower(&props, &mut ctx).unwrap();

        let plan = ctx.into_plan();
        assert_eq!(plan.units.len(), 1);
        assert!(plan.services.is_empty());

        let unit = &plan.units[0];
        assert_eq!(unit.target_type, "ListenHTTP");
        assert_eq!(unit.properties.get("listening-port").and_then(Value::as_str), Some("9090"));
        assert_eq!(unit.properties.get("base-path").and_then(Value::as_str), Some("/events"));
    }

    #[test]
    fn test_file_lowers_to_one_pickup_unit() {
        let mut ctx = LowerContext::new();
        let props = Properties::new().with("path", "/drop");
        FileSource.lower(&props, &mut ctx).unwrap();

        let plan = ctx.into_plan();
        assert_eq!(plan.units[0].target_type, "GetFile");
        assert_eq!(
            plan.units[0].properties.get("input-directory").and_then(Value::as_str),
            Some("/drop")
        );
    }

    #[test]
    fn test_http_integer_port_renders_as_text() {
        let mut ctx = LowerContext::new();
        let props = Properties::new().with("port", 9090i64).with("path", "/events");
        HttpSource.lower(&props, &mut ctx).unwrap();

        let plan = ctx.into_plan();
        assert_eq!(
            plan.units[0].properties.get("listening-port").and_then(Value::as_str),
            Some("9090")
        );
    }

    #[test]
    fn test_http_missing_property() {
        let mut ctx = LowerContext::new();
        let err = HttpSource.lower(&Properties::new(), &mut ctx).unwrap_err();
        assert!(matches!(err, LowerError::MissingProperty(p) if p == "port"));
    }

    #[test]
    fn test_file_missing_property() {
        let mut ctx = LowerContext::new();
        let err = FileSource.lower(&Properties::new(), &mut ctx).unwrap_err();
        assert!(matches!(err, LowerError::MissingProperty(p) if p == "path"));
    }

}
