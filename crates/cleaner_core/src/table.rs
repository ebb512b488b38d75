use std::collections::BTreeMap;

use crate::FieldSchema;

/// Sparse field -> value map produced for one row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldMap {
    values: BTreeMap<String, String>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (field, value) in iter {
            map.insert(field, value);
        }
        map
    }
}

/// Read-only copy of a row's original columns handed to a row task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSnapshot {
    index: usize,
    cells: Vec<(String, String)>,
}

impl RowSnapshot {
    pub fn new(index: usize, cells: Vec<(String, String)>) -> Self {
        Self { index, cells }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn cells(&self) -> &[(String, String)] {
        &self.cells
    }
}

/// Rows sharing the original columns plus the table-wide extracted columns.
///
/// Every row always holds one cell per column; adding an extracted column
/// fills it with an empty string in every row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    original_columns: Vec<String>,
    extracted_columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Rows shorter than the header are padded. Rows longer than the header
    /// widen it with generated `column_N` names so no cell is dropped.
    pub fn new(mut columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let widest = rows.iter().map(Vec::len).max().unwrap_or(0);
        while columns.len() < widest {
            let mut n = columns.len() + 1;
            while columns.iter().any(|c| *c == format!("column_{n}")) {
                n += 1;
            }
            columns.push(format!("column_{n}"));
        }
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self {
            original_columns: columns,
            extracted_columns: Vec::new(),
            rows,
        }
    }

    pub fn original_columns(&self) -> &[String] {
        &self.original_columns
    }

    /// Columns added for the schema, excluding names the input already had.
    pub fn extracted_columns(&self) -> &[String] {
        &self.extracted_columns
    }

    /// Original columns followed by extracted columns.
    pub fn headers(&self) -> Vec<String> {
        self.original_columns
            .iter()
            .chain(self.extracted_columns.iter())
            .cloned()
            .collect()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.original_columns
            .iter()
            .chain(self.extracted_columns.iter())
            .position(|column| column == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|cells| cells[col].as_str())
    }

    /// Add one column per schema field not already present. Returns the names
    /// that were added.
    pub fn add_extracted_columns(&mut self, schema: &FieldSchema) -> Vec<String> {
        let mut added = Vec::new();
        for field in schema.iter() {
            if self.column_index(field).is_some() {
                continue;
            }
            self.extracted_columns.push(field.to_string());
            for row in &mut self.rows {
                row.push(String::new());
            }
            added.push(field.to_string());
        }
        added
    }

    pub fn row_snapshot(&self, index: usize) -> Option<RowSnapshot> {
        let row = self.rows.get(index)?;
        let cells = self
            .original_columns
            .iter()
            .zip(row.iter())
            .map(|(column, value)| (column.clone(), value.clone()))
            .collect();
        Some(RowSnapshot::new(index, cells))
    }

    /// Merge a row's extracted fields. Keys outside `schema` or without a
    /// column, and empty values, are ignored so a populated cell is never
    /// cleared. Returns the number of cells written.
    pub fn merge(&mut self, index: usize, fields: &FieldMap, schema: &FieldSchema) -> usize {
        let mut written = 0;
        for (field, value) in fields.iter() {
            if value.is_empty() || !schema.contains(field) {
                continue;
            }
            let Some(col) = self.column_index(field) else {
                continue;
            };
            if let Some(row) = self.rows.get_mut(index) {
                row[col] = value.to_string();
                written += 1;
            }
        }
        written
    }
}
