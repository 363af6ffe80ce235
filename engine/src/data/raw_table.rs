// Untyped rows as handed over by the external loader.
use std::collections::HashMap;

use crate::error::EngineError;

/// Header names plus rows of raw string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        RawTable { headers, rows }
    }

    /// Builds a table from column→value mappings. Headers are the union of
    /// keys in first-seen order; keys differing only in case or surrounding
    /// whitespace share a column.
    pub fn from_maps<I, M, K, V>(maps: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut headers: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut rows: Vec<Vec<String>> = Vec::new();

        for map in maps {
            let mut row = vec![String::new(); headers.len()];
            for (key, value) in map {
                let key: String = key.into();
                let lookup = header_key(&key);
                let pos = *positions.entry(lookup).or_insert_with(|| {
                    headers.push(key.trim().to_string());
                    headers.len() - 1
                });
                if row.len() <= pos {
                    row.resize(pos + 1, String::new());
                }
                row[pos] = value.into();
            }
            rows.push(row);
        }

        RawTable { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Trimmed, case-insensitive header lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = header_key(name);
        self.headers.iter().position(|header| header_key(header) == wanted)
    }

    pub fn require_column(&self, table: &str, name: &str) -> Result<usize, EngineError> {
        self.column_index(name).ok_or_else(|| EngineError::missing_column(table, name))
    }

    /// Cell accessor that reads past-the-end cells of short rows as empty.
    pub fn cell(row: &[String], index: usize) -> &str {
        row.get(index).map(String::as_str).unwrap_or("")
    }
}

fn header_key(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_lowercase()
}
