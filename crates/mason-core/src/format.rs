//! Data-format tags and the chain compatibility relation.
//!
//! Every brick declares what shape of data it consumes and produces. The
//! validator walks the pipeline and checks each adjacent pair against the
//! fixed relation in [`FormatTag::accepts`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbolic tag for the shape of data flowing between bricks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatTag {
    /// Uninterpreted bytes, e.g. file contents before parsing.
    RawBytes,
    /// Delimiter-separated text rows.
    Csv,
    /// An XML document.
    Xml,
    /// A single JSON document.
    Json,
    /// A stream of individual JSON records.
    JsonRecordStream,
    /// Indifferent to data shape. Used by sources on the input side and
    /// sinks on the output side.
    Any,
}

impl FormatTag {
    /// Whether data produced as `produced` satisfies a port requiring `self`.
    ///
    /// A tag always accepts itself. Parser-style ports (`Csv`, `Xml`, `Json`)
    /// accept raw bytes, since parsing is what they are for. A record stream
    /// port accepts a single JSON document (a one-record stream) but not raw
    /// bytes: record-oriented bricks need already-parsed input.
    pub fn accepts(self, produced: FormatTag) -> bool {
        use FormatTag::*;
        if self == produced || self == Any {
            return true;
        }
        matches!(
            (self, produced),
            (Csv, RawBytes) | (Xml, RawBytes) | (Json, RawBytes) | (JsonRecordStream, Json)
        )
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FormatTag::RawBytes => "raw bytes",
            FormatTag::Csv => "CSV",
            FormatTag::Xml => "XML",
            FormatTag::Json => "JSON",
            FormatTag::JsonRecordStream => "JSON record stream",
            FormatTag::Any => "any",
        };
        f.write_str(label)
    }
}
