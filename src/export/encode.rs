//! Row encoders for the three export formats.
//!
//! Encoders are incremental so the exporter can stream: `rows` may be called
//! any number of times, then `finish` closes the document. Headers are
//! emitted lazily with the first row, so an empty export is empty for CSV
//! and text, and `[]` for JSON.
//!
//! The text format is tab-separated with no escaping. A value that itself
//! contains a tab or newline shifts or splits its row; consumers that need
//! exact round-trips should use CSV or JSON.

use crate::export::columns;
use crate::export::record::ExportRecord;
use crate::export::ExportError;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use time::macros::format_description;
use time::Date;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const TEXT_RULE_WIDTH: usize = 200;
const JSON_INDENT: &[u8] = b"    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Text,
    Json,
}

impl ExportFormat {
    /// Unknown names fall back to JSON.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" => ExportFormat::Csv,
            "txt" | "plain" => ExportFormat::Text,
            _ => ExportFormat::Json,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Text => "text/plain; charset=utf-8",
            ExportFormat::Json => "application/json; charset=utf-8",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
        }
    }

    pub fn filename(self, date: Date, num_found: u64) -> String {
        let day = date
            .format(format_description!("[year]-[month]-[day]"))
            .unwrap_or_default();
        format!("publications_export_{day}_{num_found}.{}", self.extension())
    }
}

#[derive(Debug)]
pub struct RowEncoder {
    format: ExportFormat,
    rows: usize,
}

impl RowEncoder {
    pub fn new(format: ExportFormat) -> Self {
        Self { format, rows: 0 }
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn rows(&mut self, records: &[ExportRecord]) -> Result<Vec<u8>, ExportError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let out = match self.format {
            ExportFormat::Csv => self.csv_rows(records)?,
            ExportFormat::Text => self.text_rows(records),
            ExportFormat::Json => self.json_rows(records)?,
        };
        self.rows += records.len();
        Ok(out)
    }

    pub fn finish(&mut self) -> Vec<u8> {
        match self.format {
            ExportFormat::Json if self.rows == 0 => b"[]".to_vec(),
            ExportFormat::Json => b"\n]".to_vec(),
            ExportFormat::Csv | ExportFormat::Text => Vec::new(),
        }
    }

    fn csv_rows(&self, records: &[ExportRecord]) -> Result<Vec<u8>, ExportError> {
        let mut buf = Vec::new();
        if self.rows == 0 {
            buf.extend_from_slice(UTF8_BOM);
        }
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(buf);
        if self.rows == 0 {
            writer.write_record(columns::labels())?;
        }
        for record in records {
            writer.write_record(record.values())?;
        }
        writer.into_inner().map_err(|err| ExportError::Io(err.into_error()))
    }

    fn text_rows(&self, records: &[ExportRecord]) -> Vec<u8> {
        let mut out = String::new();
        if self.rows == 0 {
            out.push_str(&columns::labels().collect::<Vec<_>>().join("\t"));
            out.push('\n');
            out.push_str(&"-".repeat(TEXT_RULE_WIDTH));
            out.push('\n');
        }
        for record in records {
            out.push_str(&record.values().collect::<Vec<_>>().join("\t"));
            out.push('\n');
        }
        out.into_bytes()
    }

    fn json_rows(&self, records: &[ExportRecord]) -> Result<Vec<u8>, ExportError> {
        let mut out = Vec::new();
        for (i, record) in records.iter().enumerate() {
            if self.rows == 0 && i == 0 {
                out.extend_from_slice(b"[\n");
            } else {
                out.extend_from_slice(b",\n");
            }
            let mut object = Vec::new();
            let mut ser = serde_json::Serializer::with_formatter(&mut object, PrettyFormatter::with_indent(JSON_INDENT));
            record.serialize(&mut ser)?;
            for (n, line) in object.split(|b| *b == b'\n').enumerate() {
                if n > 0 {
                    out.push(b'\n');
                }
                out.extend_from_slice(JSON_INDENT);
                out.extend_from_slice(line);
            }
        }
        Ok(out)
    }
}

/// Whole document in one buffer.
pub fn encode_all(format: ExportFormat, records: &[ExportRecord]) -> Result<Vec<u8>, ExportError> {
    let mut encoder = RowEncoder::new(format);
    let mut out = encoder.rows(records)?;
    out.extend(encoder.finish());
    Ok(out)
}
