use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};

use crate::domain::model::Record;

/// Fixed rename map applied after the column union is built. Keys absent from
/// the data are never synthesized.
const COLUMN_RENAMES: &[(&str, &str)] = &[
    ("reviewCreatedVersion", "appVersion"),
    ("at", "reviewDate"),
];

pub const REVIEW_DATE_COLUMN: &str = "reviewDate";
pub const SCORE_COLUMN: &str = "score";

const REVIEW_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reviews coerced to one shared column set: the union of keys seen across
/// all records, in first-seen order. Rows keep only the fields the feed
/// actually sent.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl RecordTable {
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for record in &records {
            for key in record.data.keys() {
                if seen.insert(key.clone()) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records.into_iter().map(|r| r.data).collect();
        Self { columns, rows }
    }

    /// Full normalization pass: rename, de-duplicate collisions, reformat
    /// review dates.
    pub fn normalized(records: Vec<Record>) -> Self {
        let mut table = Self::from_records(records);
        table.apply_renames();
        table.reformat_review_dates();
        table
    }

    /// Applies the fixed rename map and resolves any duplicate column names
    /// the renaming produced. Row keys follow their columns.
    pub fn apply_renames(&mut self) {
        let renamed: Vec<String> = self
            .columns
            .iter()
            .map(|col| rename_for(col).to_string())
            .collect();
        let finals = dedupe_columns(&renamed);

        if finals != renamed {
            tracing::warn!("Detected duplicate column names after rename, repairing");
        }

        if finals == self.columns {
            return;
        }

        for row in &mut self.rows {
            let mut rebuilt = Map::new();
            for (old, new) in self.columns.iter().zip(finals.iter()) {
                if let Some(value) = row.remove(old) {
                    rebuilt.insert(new.clone(), value);
                }
            }
            *row = rebuilt;
        }
        self.columns = finals;
    }

    /// Rewrites `reviewDate` values to a fixed human-readable form. Values
    /// that do not parse are left untouched.
    pub fn reformat_review_dates(&mut self) {
        if !self.columns.iter().any(|c| c == REVIEW_DATE_COLUMN) {
            return;
        }

        for row in &mut self.rows {
            if let Some(value) = row.get_mut(REVIEW_DATE_COLUMN) {
                if let Some(formatted) = reformat_timestamp(value) {
                    *value = Value::String(formatted);
                }
            }
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn head(&self, n: usize) -> &[Map<String, Value>] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Count of rows per integer score, ordered by score.
    pub fn score_distribution(&self) -> BTreeMap<i64, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            if let Some(score) = row.get(SCORE_COLUMN).and_then(Value::as_i64) {
                *counts.entry(score).or_insert(0) += 1;
            }
        }
        counts
    }
}

fn rename_for(column: &str) -> &str {
    COLUMN_RENAMES
        .iter()
        .find(|(from, _)| *from == column)
        .map(|(_, to)| *to)
        .unwrap_or(column)
}

/// Makes a column list duplicate-free: the first occurrence keeps the bare
/// name, later ones get `_1`, `_2`… suffixes (bumped further if the suffixed
/// name is itself taken). Idempotent.
pub fn dedupe_columns(columns: &[String]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<String> = Vec::with_capacity(columns.len());

    for col in columns {
        let mut name = col.clone();
        while taken.contains(&name) {
            let n = counts.entry(col.as_str()).or_insert(0);
            *n += 1;
            name = format!("{}_{}", col, n);
        }
        taken.insert(name.clone());
        out.push(name);
    }
    out
}

fn reformat_timestamp(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.format(REVIEW_DATE_FORMAT).to_string()),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .map(|dt| dt.format(REVIEW_DATE_FORMAT).to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_column_union_keeps_first_seen_order() {
        let table = RecordTable::from_records(vec![
            record(json!({"reviewId": "a", "content": "ok"})),
            record(json!({"score": 5, "reviewId": "b"})),
            record(json!({"content": "meh", "userName": "x"})),
        ]);

        assert_eq!(table.columns(), ["reviewId", "content", "score", "userName"]);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_rename_only_touches_present_columns() {
        let mut table = RecordTable::from_records(vec![record(
            json!({"reviewId": "a", "reviewCreatedVersion": "4.1.2"}),
        )]);
        table.apply_renames();

        assert_eq!(table.columns(), ["reviewId", "appVersion"]);
        assert_eq!(table.rows()[0].get("appVersion").unwrap(), "4.1.2");
        assert!(!table.columns().iter().any(|c| c == "reviewDate"));
    }

    #[test]
    fn test_rename_collision_gets_numeric_suffix() {
        // A record already carrying "appVersion" collides with the renamed
        // "reviewCreatedVersion".
        let mut table = RecordTable::from_records(vec![record(
            json!({"appVersion": "5.0.0", "reviewCreatedVersion": "4.1.2"}),
        )]);
        table.apply_renames();

        assert_eq!(table.columns(), ["appVersion", "appVersion_1"]);
        assert_eq!(table.rows()[0].get("appVersion").unwrap(), "5.0.0");
        assert_eq!(table.rows()[0].get("appVersion_1").unwrap(), "4.1.2");
    }

    #[test]
    fn test_dedupe_columns_is_idempotent() {
        let columns: Vec<String> = ["a", "a", "a_1", "b"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let once = dedupe_columns(&columns);
        assert_eq!(once, ["a", "a_1", "a_1_1", "b"]);

        let twice = dedupe_columns(&once);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_reformat_rfc3339_and_epoch_dates() {
        let mut table = RecordTable::from_records(vec![
            record(json!({"at": "2025-07-14T09:30:05+00:00"})),
            record(json!({"at": 1752485405})),
            record(json!({"at": "not a date"})),
        ]);
        table.apply_renames();
        table.reformat_review_dates();

        assert_eq!(
            table.rows()[0].get("reviewDate").unwrap(),
            "2025-07-14 09:30:05"
        );
        assert_eq!(
            table.rows()[1].get("reviewDate").unwrap(),
            "2025-07-14 09:30:05"
        );
        // Unparseable values pass through unchanged.
        assert_eq!(table.rows()[2].get("reviewDate").unwrap(), "not a date");
    }

    #[test]
    fn test_score_distribution_sorted_by_score() {
        let table = RecordTable::from_records(vec![
            record(json!({"score": 5})),
            record(json!({"score": 1})),
            record(json!({"score": 5})),
            record(json!({"content": "no score"})),
        ]);

        let dist = table.score_distribution();
        let pairs: Vec<(i64, usize)> = dist.into_iter().collect();
        assert_eq!(pairs, [(1, 1), (5, 2)]);
    }

    #[test]
    fn test_empty_input_yields_empty_table() {
        let table = RecordTable::normalized(vec![]);
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 0);
    }
}
