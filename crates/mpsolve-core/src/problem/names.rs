//! Column and row name tables.
//!
//! Names arrive either as one string per entry or as a single buffer of
//! NUL-terminated names. Both loaders normalize into the same [`NameTable`].

use std::collections::HashMap;

use crate::problem::error::{NameKind, ProblemError};
use crate::problem::Problem;

/// Delimiter between names in a packed buffer.
pub const PACKED_NAME_DELIMITER: char = '\0';

/// Positional name table for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTable {
    names: Vec<String>,
    // First position of each name.
    positions: HashMap<String, usize>,
}

impl NameTable {
    /// Build a table from one string per entry.
    pub fn from_names<I, S>(kind: NameKind, expected: usize, names: I) -> Result<Self, ProblemError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();
        Self::from_owned(kind, expected, names)
    }

    /// Build a table from a NUL-delimited buffer; a trailing NUL is optional.
    pub fn from_packed(kind: NameKind, expected: usize, buffer: &str) -> Result<Self, ProblemError> {
        let trimmed = buffer
            .strip_suffix(PACKED_NAME_DELIMITER)
            .unwrap_or(buffer);
        let names: Vec<String> = if trimmed.is_empty() && expected == 0 {
            Vec::new()
        } else {
            trimmed
                .split(PACKED_NAME_DELIMITER)
                .map(str::to_string)
                .collect()
        };
        Self::from_owned(kind, expected, names)
    }

    fn from_owned(kind: NameKind, expected: usize, names: Vec<String>) -> Result<Self, ProblemError> {
        if names.len() != expected {
            return Err(ProblemError::InvalidNames {
                kind,
                reason: format!("expected {} names, got {}", expected, names.len()),
            });
        }
        let mut positions = HashMap::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(ProblemError::InvalidNames {
                    kind,
                    reason: format!("empty name at position {position}"),
                });
            }
            if name.contains(PACKED_NAME_DELIMITER) {
                return Err(ProblemError::InvalidNames {
                    kind,
                    reason: format!("name at position {position} contains a NUL byte"),
                });
            }
            positions.entry(name.clone()).or_insert(position);
        }
        Ok(Self { names, positions })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.names.get(position).map(String::as_str)
    }

    /// First position holding `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Every `(name, first, duplicate)` triple in positional order.
    pub fn duplicates(&self) -> Vec<(String, usize, usize)> {
        self.names
            .iter()
            .enumerate()
            .filter_map(|(position, name)| {
                let first = self.positions.get(name).copied()?;
                (first != position).then(|| (name.clone(), first, position))
            })
            .collect()
    }
}

impl Problem {
    /// Load names from one string per column and per row.
    ///
    /// `None` leaves that namespace on generated default names.
    pub fn load_names<S: AsRef<str>>(
        &mut self,
        column_names: Option<&[S]>,
        row_names: Option<&[S]>,
        objective_name: Option<&str>,
    ) -> Result<(), ProblemError> {
        self.ensure_loaded("load_names")?;
        let columns = column_names
            .map(|names| NameTable::from_names(NameKind::Column, self.num_columns(), names))
            .transpose();
        let rows = row_names
            .map(|names| NameTable::from_names(NameKind::Row, self.num_rows(), names))
            .transpose();
        self.install_names(columns, rows, objective_name, "array")
    }

    /// Load names from NUL-delimited buffers.
    pub fn load_names_packed(
        &mut self,
        column_buffer: Option<&str>,
        row_buffer: Option<&str>,
        objective_name: Option<&str>,
    ) -> Result<(), ProblemError> {
        self.ensure_loaded("load_names_packed")?;
        let columns = column_buffer
            .map(|buffer| NameTable::from_packed(NameKind::Column, self.num_columns(), buffer))
            .transpose();
        let rows = row_buffer
            .map(|buffer| NameTable::from_packed(NameKind::Row, self.num_rows(), buffer))
            .transpose();
        self.install_names(columns, rows, objective_name, "packed")
    }

    fn install_names(
        &mut self,
        columns: Result<Option<NameTable>, ProblemError>,
        rows: Result<Option<NameTable>, ProblemError>,
        objective_name: Option<&str>,
        layout: &'static str,
    ) -> Result<(), ProblemError> {
        let (columns, rows) = match (columns, rows) {
            (Ok(columns), Ok(rows)) => (columns, rows),
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(
                    component = "problem",
                    operation = "load_names",
                    status = "error",
                    layout,
                    code = err.code(),
                    "{err}"
                );
                return Err(err);
            }
        };

        tracing::debug!(
            component = "problem",
            operation = "load_names",
            status = "success",
            layout,
            column_names = columns.as_ref().map_or(0, NameTable::len),
            row_names = rows.as_ref().map_or(0, NameTable::len),
            objective_name = objective_name.unwrap_or(""),
            "Loaded names"
        );

        if columns.is_some() {
            self.column_names = columns;
        }
        if rows.is_some() {
            self.row_names = rows;
        }
        if let Some(name) = objective_name {
            self.objective_name = Some(name.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_and_array_tables_match() {
        let array = NameTable::from_names(NameKind::Column, 2, ["Sun", "Moon"]).unwrap();
        let packed = NameTable::from_packed(NameKind::Column, 2, "Sun\0Moon\0").unwrap();
        let unterminated = NameTable::from_packed(NameKind::Column, 2, "Sun\0Moon").unwrap();
        assert_eq!(array, packed);
        assert_eq!(array, unterminated);
        assert_eq!(array.position("Moon"), Some(1));
    }

    #[test]
    fn test_count_mismatch_is_rejected() {
        let err = NameTable::from_packed(NameKind::Row, 3, "c1\0c2\0").unwrap_err();
        assert_eq!(err.code(), "NAMES_INVALID");
        assert!(err.to_string().contains("expected 3 names, got 2"));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = NameTable::from_packed(NameKind::Row, 3, "c1\0\0c3\0").unwrap_err();
        assert!(err.to_string().contains("empty name at position 1"));
    }

    #[test]
    fn test_empty_table() {
        let table = NameTable::from_packed(NameKind::Row, 0, "").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_duplicates_are_reported_not_rejected() {
        let table = NameTable::from_names(NameKind::Row, 3, ["a", "b", "a"]).unwrap();
        assert_eq!(table.duplicates(), vec![("a".to_string(), 0, 2)]);
        assert_eq!(table.position("a"), Some(0));
    }
}
