//! Renderers for the aggregated cross-shard result.
//!
//! The registry is fixed and enumerable: a renderer is selected by name
//! once, before any database work happens, so a typo in the configuration
//! can never cost a full fan-out run.

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::aggregate::AggregatedResult;
use crate::error::ConfigError;
use crate::row::{RowSet, Value};

/// A renderer turns the aggregated result into one displayable string.
pub type RenderFn = fn(&AggregatedResult) -> String;

/// Renderer used when the configuration does not pick one.
pub const DEFAULT_RENDERER: &str = "table";

const RENDERERS: &[(&str, RenderFn)] = &[
    ("table", render_table),
    ("csv", render_csv),
    ("json", render_json),
];

/// Names of every available renderer, in registry order.
pub fn renderer_names() -> Vec<&'static str> {
    RENDERERS.iter().map(|(name, _)| *name).collect()
}

/// Resolve a renderer by name. Unknown names fail here, before any
/// connection is attempted.
pub fn lookup_renderer(name: &str) -> Result<RenderFn, ConfigError> {
    RENDERERS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, render)| *render)
        .ok_or_else(|| ConfigError::UnknownRenderer {
            name: name.to_string(),
            available: renderer_names().join(", "),
        })
}

fn cell(value: &Value) -> String {
    value.to_text().unwrap_or_else(|| "NULL".to_string())
}

fn format_table_section(rows: &RowSet) -> String {
    let cols = rows.columns();
    let mut out = String::new();

    if cols.is_empty() {
        out.push_str("(0 rows)\n");
        return out;
    }

    let mut widths: Vec<usize> = cols.iter().map(|c| c.len()).collect();
    for row in rows.rows() {
        for (i, w) in widths.iter_mut().enumerate() {
            *w = (*w).max(cell(&row[i]).len());
        }
    }

    let header: Vec<String> = cols
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
        .collect();
    out.push_str(&format!(" {} \n", header.join(" | ")));

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w + 2)).collect();
    out.push_str(&format!("{}\n", sep.join("+")));

    for row in rows.rows() {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:<width$}", cell(v), width = widths[i]))
            .collect();
        out.push_str(&format!(" {} \n", cells.join(" | ")));
    }

    let count = rows.len();
    out.push_str(&format!(
        "({} row{})\n",
        count,
        if count == 1 { "" } else { "s" }
    ));
    out
}

/// psql-style table, one section per shard in discovery order.
fn render_table(agg: &AggregatedResult) -> String {
    let mut out = String::new();
    for (shard, rows) in agg.iter() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("== {} ==\n", shard));
        out.push_str(&format_table_section(rows));
    }
    out
}

/// Quote a CSV field when it contains the delimiter, a quote, or a line
/// break.
fn quote_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Flat CSV with the shard name as the leading column. All shards share a
/// schema, so the header comes from the first shard that reported columns.
fn render_csv(agg: &AggregatedResult) -> String {
    let mut out = String::new();

    let header_cols = agg
        .iter()
        .map(|(_, rows)| rows.columns())
        .find(|cols| !cols.is_empty())
        .unwrap_or(&[]);
    let mut header = vec!["shard".to_string()];
    header.extend(header_cols.iter().cloned());
    out.push_str(&header.join(","));
    out.push('\n');

    for (shard, rows) in agg.iter() {
        for row in rows.rows() {
            let mut fields = vec![quote_field(shard)];
            fields.extend(row.iter().map(|v| quote_field(&cell(v))));
            out.push_str(&fields.join(","));
            out.push('\n');
        }
    }
    out
}

/// JSON object keyed by shard name, each shard an array of row objects.
fn render_json(agg: &AggregatedResult) -> String {
    let mut top = JsonMap::new();
    for (shard, rows) in agg.iter() {
        let json_rows: Vec<JsonValue> = rows
            .rows()
            .iter()
            .map(|row| {
                let mut object = JsonMap::new();
                for (col, value) in rows.columns().iter().zip(row) {
                    object.insert(col.clone(), value.to_json());
                }
                JsonValue::Object(object)
            })
            .collect();
        top.insert(shard.to_string(), JsonValue::Array(json_rows));
    }

    let mut out = serde_json::to_string_pretty(&JsonValue::Object(top)).unwrap_or_default();
    out.push('\n');
    out
}
