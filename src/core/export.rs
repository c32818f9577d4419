use chrono::Local;
use serde_json::Value;

use crate::core::table::RecordTable;
use crate::utils::error::Result;

const DELIMITER: char = ',';

/// Output file stem: requested count plus the run date.
pub fn file_stem(target_count: usize) -> String {
    format!(
        "reviews_{}_{}",
        target_count,
        Local::now().format("%Y%m%d")
    )
}

/// Delimited-text rendering. This is framing, not CSV quoting: delimiter and
/// line-break characters inside values are swapped for safe stand-ins
/// (semicolon / space), so such values do not round-trip verbatim.
pub fn to_delimited(table: &RecordTable) -> String {
    let mut lines = Vec::with_capacity(table.row_count() + 1);
    lines.push(table.columns().join(","));

    for row in table.rows() {
        let values: Vec<String> = table
            .columns()
            .iter()
            .map(|col| row.get(col).map(sanitize_value).unwrap_or_default())
            .collect();
        lines.push(values.join(","));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Primary JSON rendering: one indented array of field mappings.
pub fn to_pretty_tree(table: &RecordTable) -> Result<String> {
    Ok(serde_json::to_string_pretty(table.rows())?)
}

/// Degraded fallback: each row serialized independently, one per line.
pub fn to_json_lines(table: &RecordTable) -> Result<String> {
    let mut out = String::new();
    for row in table.rows() {
        out.push_str(&serde_json::to_string(row)?);
        out.push('\n');
    }
    Ok(out)
}

fn sanitize_value(value: &Value) -> String {
    let raw = match value {
        Value::Null => return String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    raw.replace(DELIMITER, ";").replace(['\n', '\r'], " ")
}
