//! Column-oriented view over Pushshift records.
//!
//! A [`Table`] is the unit every stage passes around: fetched from the API,
//! concatenated across batches, deduplicated, projected and finally written
//! as CSV with a leading row index.

use std::{collections::HashSet, io::Write};

use indexmap::IndexSet;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Zero rows, the given columns.
    pub fn empty(columns: &[String]) -> Self {
        Self {
            columns: columns.to_vec(),
            rows: Vec::new(),
        }
    }

    /// One row per record; columns are the union of record keys in the order
    /// they are first seen. Keys a record lacks are left null.
    pub fn from_records(records: Vec<Map<String, Value>>) -> Self {
        let mut columns: IndexSet<String> = IndexSet::new();
        for record in &records {
            for key in record.keys() {
                if !columns.contains(key.as_str()) {
                    columns.insert(key.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|column| record.remove(column).unwrap_or(Value::Null))
                    .collect::<Vec<_>>()
            })
            .collect();

        Self {
            columns: columns.into_iter().collect(),
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at (`row`, `column`), `None` when either is out of range.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Every value of `column`, in row order; empty when the column is absent.
    pub fn column(&self, name: &str) -> Vec<&Value> {
        match self.column_index(name) {
            Some(idx) => self.rows.iter().map(|row| &row[idx]).collect(),
            None => Vec::new(),
        }
    }

    /// Stack `other` under `self`, widening both to the union of columns.
    pub fn append(&mut self, other: Table) {
        if self.columns.is_empty() && self.rows.is_empty() {
            *self = other;
            return;
        }

        let mapping: Vec<usize> = other
            .columns
            .iter()
            .map(|column| match self.column_index(column) {
                Some(idx) => idx,
                None => {
                    self.columns.push(column.clone());
                    for row in &mut self.rows {
                        row.push(Value::Null);
                    }
                    self.columns.len() - 1
                }
            })
            .collect();

        let width = self.columns.len();
        for source in other.rows {
            let mut row = vec![Value::Null; width];
            for (value, &target) in source.into_iter().zip(&mapping) {
                row[target] = value;
            }
            self.rows.push(row);
        }
    }

    pub fn concat<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = Table>,
    {
        tables.into_iter().fold(Table::default(), |mut acc, table| {
            acc.append(table);
            acc
        })
    }

    /// Keep only the first row for each distinct value of `key`, returning
    /// how many rows were dropped. Returns `None` (and changes nothing) when
    /// the table has no such column.
    pub fn dedupe_by(&mut self, key: &str) -> Option<usize> {
        let idx = self.column_index(key)?;
        let before = self.rows.len();
        let mut seen = HashSet::new();
        self.rows.retain(|row| seen.insert(dedupe_token(&row[idx])));
        Some(before - self.rows.len())
    }

    /// Exactly `fields`, in that order. Columns the table lacks come out null.
    pub fn project(&self, fields: &[String]) -> Table {
        let sources: Vec<Option<usize>> = fields.iter().map(|f| self.column_index(f)).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                sources
                    .iter()
                    .map(|source| source.map_or(Value::Null, |idx| row[idx].clone()))
                    .collect::<Vec<_>>()
            })
            .collect();
        Table {
            columns: fields.to_vec(),
            rows,
        }
    }

    /// Add (or overwrite) `name` with the same value on every row.
    pub fn with_constant(mut self, name: &str, value: Value) -> Self {
        match self.column_index(name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = value.clone();
                }
            }
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(value.clone());
                }
            }
        }
        self
    }

    /// Serialise as CSV: an unnamed index header followed by the columns, and
    /// every row prefixed by its 0-based position.
    pub fn write_csv<W: Write>(&self, sink: W) -> csv::Result<()> {
        let mut writer = csv::Writer::from_writer(sink);
        writer.write_record(std::iter::once("").chain(self.columns.iter().map(String::as_str)))?;
        for (index, row) in self.rows.iter().enumerate() {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(index.to_string());
            record.extend(row.iter().map(cell_text));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Text written to a CSV cell: strings verbatim, null as empty, the rest as JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Key used to compare values for deduplication. Strings and numbers with the
/// same text count as equal, so `"123"` and `123` collapse together.
fn dedupe_token(value: &Value) -> String {
    match value {
        Value::Null => "\u{0}null".to_string(),
        other => cell_text(other),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn records(values: Value) -> Vec<Map<String, Value>> {
        values
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn columns_are_the_union_of_record_keys() {
        let table = Table::from_records(records(json!([
            {"id": "a", "score": 3},
            {"id": "b", "body": "hi"}
        ])));
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns().len(), 3);
        assert_eq!(table.get(1, "score"), Some(&Value::Null));
        assert_eq!(table.get(1, "body"), Some(&json!("hi")));
    }

    #[test]
    fn dedupe_keeps_first_occurrence_in_order() {
        let mut table = Table::from_records(records(json!([
            {"id": "a", "n": 1},
            {"id": "b", "n": 2},
            {"id": "a", "n": 3},
            {"id": "c", "n": 4},
            {"id": "b", "n": 5}
        ])));
        assert_eq!(table.dedupe_by("id"), Some(2));
        let ids: Vec<_> = table.column("id").into_iter().cloned().collect();
        assert_eq!(ids, vec![json!("a"), json!("b"), json!("c")]);
        let kept: Vec<_> = table.column("n").into_iter().cloned().collect();
        assert_eq!(kept, vec![json!(1), json!(2), json!(4)]);
    }

    #[test]
    fn dedupe_on_missing_column_is_a_no_op() {
        let mut table = Table::from_records(records(json!([{"id": "a"}, {"id": "a"}])));
        assert_eq!(table.dedupe_by("author"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn projection_follows_requested_order() {
        let table = Table::from_records(records(json!([
            {"title": "t", "num_comments": 4, "id": "x", "score": 10}
        ])));
        let projected = table.project(&names(&["id", "title"]));
        assert_eq!(projected.columns(), names(&["id", "title"]).as_slice());
        assert_eq!(projected.get(0, "id"), Some(&json!("x")));

        let widened = table.project(&names(&["id", "selftext"]));
        assert_eq!(widened.get(0, "selftext"), Some(&Value::Null));
    }

    #[test]
    fn append_widens_to_union_of_columns() {
        let mut left = Table::from_records(records(json!([{"id": "a", "body": "x"}])));
        let right = Table::from_records(records(json!([{"id": "b", "score": 2}])));
        left.append(right);
        assert_eq!(left.len(), 2);
        assert_eq!(left.columns(), names(&["id", "body", "score"]).as_slice());
        assert_eq!(left.get(0, "score"), Some(&Value::Null));
        assert_eq!(left.get(1, "id"), Some(&json!("b")));
    }

    #[test]
    fn concat_of_nothing_is_empty() {
        let table = Table::concat(Vec::new());
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
    }

    #[test]
    fn csv_has_leading_index_column() {
        let table = Table::from_records(records(json!([
            {"id": "a", "body": "hello, world"},
            {"id": "b", "body": null}
        ])))
        .project(&names(&["id", "body"]))
        .with_constant("submission_id", json!("s1"));

        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            ",id,body,submission_id\n0,a,\"hello, world\",s1\n1,b,,s1\n"
        );
    }

    #[test]
    fn empty_table_still_writes_header() {
        let mut out = Vec::new();
        Table::empty(&names(&["id", "title"])).write_csv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), ",id,title\n");
    }
}
