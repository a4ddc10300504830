//! Output formatting for the CLI tools.
//!
//! Supports human-readable, JSON, and tab-separated output.

use crate::ber::tag_name;
use crate::cli::args::OutputFormat;
use crate::format::{hex, hex_dump, printable_value};
use crate::table::Table;
use crate::{Value, VarBind, Version};
use serde::Serialize;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::time::Duration;

/// One varbind, ready for output.
#[derive(Debug, Serialize)]
pub struct VarBindResult {
    pub oid: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

/// Result of a get, ready for output.
#[derive(Debug, Serialize)]
pub struct OperationResult {
    pub target: String,
    pub version: String,
    pub results: Vec<VarBindResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing_ms: Option<f64>,
}

/// One table row, ready for output.
#[derive(Debug, Serialize)]
pub struct RowResult {
    pub keys: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub cells: Vec<Option<String>>,
}

/// Result of a table discovery, ready for output.
#[derive(Debug, Serialize)]
pub struct TableResult {
    pub target: String,
    pub base: String,
    pub columns: Vec<u64>,
    pub rows: Vec<RowResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing_ms: Option<f64>,
}

/// How results are printed.
pub struct OutputContext {
    pub format: OutputFormat,
    pub force_hex: bool,
    pub show_timing: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            force_hex: false,
            show_timing: false,
        }
    }

    /// Write varbinds to stdout.
    pub fn write_results(
        &self,
        target: SocketAddr,
        version: Version,
        varbinds: &[VarBind],
        elapsed: Option<Duration>,
    ) -> io::Result<()> {
        let result = OperationResult {
            target: target.to_string(),
            version: version.to_string(),
            results: varbinds.iter().map(|vb| self.format_varbind(vb)).collect(),
            timing_ms: elapsed.map(|d| d.as_secs_f64() * 1000.0),
        };
        let mut stdout = io::stdout().lock();

        match self.format {
            OutputFormat::Human => self.write_human(&mut stdout, &result),
            OutputFormat::Json => write_json(&mut stdout, &result),
            OutputFormat::Raw => write_raw(&mut stdout, &result),
        }
    }

    /// Write a discovered table to stdout.
    pub fn write_table(
        &self,
        target: SocketAddr,
        table: &Table,
        elapsed: Option<Duration>,
    ) -> io::Result<()> {
        let result = self.build_table(target, table, elapsed);
        let mut stdout = io::stdout().lock();

        match self.format {
            OutputFormat::Json => write_json(&mut stdout, &result),
            OutputFormat::Human | OutputFormat::Raw => {
                self.write_table_text(&mut stdout, &result)
            }
        }
    }

    fn build_table(&self, target: SocketAddr, table: &Table, elapsed: Option<Duration>) -> TableResult {
        let layout = table.layout();
        let columns: Vec<u64> = (layout.first_column..=layout.last_column).collect();
        let rows = table
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| RowResult {
                keys: row.keys().to_vec(),
                status: layout
                    .status_column
                    .and(table.row_status_label(i))
                    .map(String::from),
                cells: row
                    .cells()
                    .iter()
                    .map(|cell| cell.as_ref().map(|v| self.cell_text(v)))
                    .collect(),
            })
            .collect();

        TableResult {
            target: target.to_string(),
            base: table.base().to_string(),
            columns,
            rows,
            timing_ms: elapsed.map(|d| d.as_secs_f64() * 1000.0),
        }
    }

    fn cell_text(&self, value: &Value) -> String {
        match value.as_bytes() {
            Some(data) if self.force_hex => hex::encode(data),
            _ => printable_value(value),
        }
    }

    fn format_varbind(&self, vb: &VarBind) -> VarBindResult {
        let value_type = tag_name(vb.value.tag()).into_owned();
        let (value, formatted) = match &vb.value {
            Value::Null => (serde_json::Value::Null, None),
            Value::Boolean(b) => ((*b).into(), None),
            Value::Integer(v) | Value::Integer64(v) => ((*v).into(), None),
            Value::UnsignedInteger(v)
            | Value::Counter(v)
            | Value::Gauge(v)
            | Value::Counter64(v)
            | Value::Unsigned64(v) => ((*v).into(), None),
            Value::TimeTicks(v) => ((*v).into(), Some(format!("({}) {}", v, vb.value))),
            Value::OctetString(data) if self.force_hex || vb.value.as_str().is_none() => (
                serde_json::Value::String(hex::encode(data)),
                Some(printable_value(&vb.value)),
            ),
            Value::Unknown { data, .. } => (
                serde_json::Value::String(hex::encode(data)),
                Some(vb.value.to_string()),
            ),
            other => (serde_json::Value::String(printable_value(other)), None),
        };

        VarBindResult {
            oid: vb.oid.to_string(),
            value_type,
            value,
            formatted,
        }
    }

    fn write_human<W: Write>(&self, w: &mut W, result: &OperationResult) -> io::Result<()> {
        for vb in &result.results {
            write!(w, "{} = {}: ", vb.oid, vb.value_type)?;
            match (&vb.formatted, &vb.value) {
                (Some(formatted), _) => writeln!(w, "{}", formatted)?,
                (None, serde_json::Value::String(s)) => writeln!(w, "\"{}\"", s)?,
                (None, serde_json::Value::Null) => writeln!(w)?,
                (None, other) => writeln!(w, "{}", other)?,
            }
        }

        if self.show_timing
            && let Some(ms) = result.timing_ms
        {
            writeln!(w, "\nTiming: {:.1}ms", ms)?;
        }
        Ok(())
    }

    fn write_table_text<W: Write>(&self, w: &mut W, result: &TableResult) -> io::Result<()> {
        let sep = if self.format == OutputFormat::Raw { "\t" } else { " | " };

        if self.format == OutputFormat::Human {
            write!(w, "index")?;
            for column in &result.columns {
                write!(w, "{}{}", sep, column)?;
            }
            writeln!(w)?;
        }

        for row in &result.rows {
            let keys: Vec<String> = row.keys.iter().map(u64::to_string).collect();
            write!(w, "{}", keys.join("."))?;
            for cell in &row.cells {
                write!(w, "{}{}", sep, cell.as_deref().unwrap_or(""))?;
            }
            if let Some(status) = &row.status {
                write!(w, "{}[{}]", sep, status)?;
            }
            writeln!(w)?;
        }

        if self.format == OutputFormat::Human {
            writeln!(w, "\n{} row(s) under {}", result.rows.len(), result.base)?;
            if self.show_timing
                && let Some(ms) = result.timing_ms
            {
                writeln!(w, "Timing: {:.1}ms", ms)?;
            }
        }
        Ok(())
    }
}

fn write_json<W: Write, T: Serialize>(w: &mut W, result: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
    writeln!(w, "{}", json)
}

fn write_raw<W: Write>(w: &mut W, result: &OperationResult) -> io::Result<()> {
    for vb in &result.results {
        let value = match &vb.value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        writeln!(w, "{}\t{}", vb.oid, value)?;
    }
    Ok(())
}

/// Dump the raw encoding of each varbind to stderr.
pub fn write_verbose_varbinds(varbinds: &[VarBind]) {
    let mut stderr = io::stderr().lock();
    for vb in varbinds {
        let _ = writeln!(stderr, "{} ({})", vb.oid, tag_name(vb.value.tag()));
        if let Some(raw) = &vb.raw {
            for line in hex_dump(raw).lines() {
                let _ = writeln!(stderr, "    {}", line);
            }
        }
    }
}

/// Write an error message to stderr.
pub fn write_error(err: &crate::Error) {
    eprintln!("Error: {}", err);
}
