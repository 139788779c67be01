use std::collections::HashMap;
use std::path::Path;

use crate::error::StyleError;

/// Display-name columns tried in priority order when resolving a player
/// query. The order is semantically significant: the first column with any
/// match wins, so a `short_name` hit shadows a `long_name` hit.
pub const NAME_COLUMNS: [&str; 4] = ["short_name", "name", "long_name", "player_name"];

/// Result of a name lookup: the matched row plus which name column matched,
/// so callers can report every candidate's name from that same column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerMatch {
    pub row: usize,
    pub name_column: usize,
}

/// Read-only tabular player dataset. Loaded once (training or bundle load)
/// and never mutated afterwards; cells stay as raw strings and parse to
/// numbers on access, so non-numeric columns (names, positions) coexist
/// with attribute columns.
#[derive(Debug, Clone)]
pub struct PlayerTable {
    columns: Vec<String>,
    col_idx: HashMap<String, usize>,
    cells: Vec<Vec<String>>,
}

impl PlayerTable {
    pub fn from_csv_path(path: &Path) -> Result<Self, StyleError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|source| StyleError::Dataset {
                path: path.to_path_buf(),
                source,
            })?;

        let columns: Vec<String> = reader
            .headers()
            .map_err(|source| StyleError::Dataset {
                path: path.to_path_buf(),
                source,
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut cells = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| StyleError::Dataset {
                path: path.to_path_buf(),
                source,
            })?;
            let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
            row.resize(columns.len(), String::new());
            cells.push(row);
        }

        Self::from_columns(columns, cells)
    }

    pub fn from_columns(
        columns: Vec<String>,
        cells: Vec<Vec<String>>,
    ) -> Result<Self, StyleError> {
        if columns.is_empty() {
            return Err(StyleError::Configuration(
                "player table has no columns".to_string(),
            ));
        }
        let mut col_idx = HashMap::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            col_idx.entry(name.clone()).or_insert(idx);
        }
        Ok(Self {
            columns,
            col_idx,
            cells,
        })
    }

    /// Test/bench convenience over `from_columns`.
    pub fn from_rows(columns: &[&str], rows: &[&[&str]]) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let cells = rows
            .iter()
            .map(|row| {
                let mut out: Vec<String> = row.iter().map(|c| c.to_string()).collect();
                out.resize(columns.len(), String::new());
                out
            })
            .collect();
        Self::from_columns(columns, cells).expect("non-empty column set")
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.col_idx.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.col_idx.contains_key(name)
    }

    pub fn value_at(&self, row: usize, col: usize) -> Option<&str> {
        self.cells.get(row)?.get(col).map(|s| s.as_str())
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        self.value_at(row, self.column_index(column)?)
    }

    pub fn numeric_at(&self, row: usize, col: usize) -> Option<f64> {
        let raw = self.value_at(row, col)?.trim();
        if raw.is_empty() {
            return None;
        }
        let v = raw.parse::<f64>().ok()?;
        v.is_finite().then_some(v)
    }

    pub fn numeric(&self, row: usize, column: &str) -> Option<f64> {
        self.numeric_at(row, self.column_index(column)?)
    }

    /// The row as a raw attribute record: every column whose cell parses as
    /// a finite number. Name and position columns drop out naturally.
    pub fn row_record(&self, row: usize) -> HashMap<String, f64> {
        let mut out = HashMap::new();
        for (col, name) in self.columns.iter().enumerate() {
            if let Some(v) = self.numeric_at(row, col) {
                out.insert(name.clone(), v);
            }
        }
        out
    }

    /// First recognized name column present in this table, used for sample
    /// listings where no query picked a column.
    pub fn primary_name_column(&self) -> Option<usize> {
        NAME_COLUMNS.iter().find_map(|c| self.column_index(c))
    }

    /// Case-insensitive substring lookup across `NAME_COLUMNS` in priority
    /// order; the first column with any match decides, and the first
    /// matching row in that column is the result.
    pub fn find_player(&self, query: &str) -> Result<PlayerMatch, StyleError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(StyleError::InvalidInput(
                "empty player name query".to_string(),
            ));
        }

        for column in NAME_COLUMNS {
            let Some(col) = self.column_index(column) else {
                continue;
            };
            for row in 0..self.len() {
                let Some(cell) = self.value_at(row, col) else {
                    continue;
                };
                if cell.to_lowercase().contains(&needle) {
                    return Ok(PlayerMatch {
                        row,
                        name_column: col,
                    });
                }
            }
        }

        Err(StyleError::NotFound {
            query: query.trim().to_string(),
        })
    }

    /// Every row's display name from one specific name column (the one a
    /// query matched), raw cell contents included for rows with empty names.
    pub fn names_from_column(&self, col: usize) -> Vec<String> {
        (0..self.len())
            .map(|row| self.value_at(row, col).unwrap_or_default().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PlayerTable {
        PlayerTable::from_rows(
            &["short_name", "long_name", "overall", "skill_dribbling"],
            &[
                &["K. Mbappe", "Kylian Mbappe Lottin", "91", "92"],
                &["E. Haaland", "Erling Braut Haaland", "91", "80"],
                &["Rodri", "Rodrigo Hernandez Cascante", "90", "84"],
            ],
        )
    }

    #[test]
    fn numeric_parses_and_skips_non_numeric() {
        let t = sample();
        assert_eq!(t.numeric(0, "overall"), Some(91.0));
        assert_eq!(t.numeric(0, "short_name"), None);
        assert_eq!(t.numeric(0, "missing"), None);
    }

    #[test]
    fn row_record_keeps_only_numeric_cells() {
        let t = sample();
        let rec = t.row_record(2);
        assert_eq!(rec.len(), 2);
        assert_eq!(rec.get("skill_dribbling"), Some(&84.0));
        assert!(!rec.contains_key("short_name"));
    }

    #[test]
    fn find_player_is_case_insensitive_substring() {
        let t = sample();
        let m = t.find_player("haaland").expect("should match");
        assert_eq!(m.row, 1);
        assert_eq!(m.name_column, t.column_index("short_name").unwrap());
    }

    #[test]
    fn find_player_falls_through_to_long_name() {
        let t = sample();
        // "Lottin" only appears in the long_name column.
        let m = t.find_player("lottin").expect("should match via long_name");
        assert_eq!(m.row, 0);
        assert_eq!(m.name_column, t.column_index("long_name").unwrap());
    }

    #[test]
    fn short_name_column_shadows_long_name() {
        // "rodri" is a substring of row 2's short_name but also of row 2's
        // long_name; and of nothing else. Add a table where a later column
        // would match an earlier row to check column priority beats row order.
        let t = PlayerTable::from_rows(
            &["short_name", "long_name"],
            &[&["A. Silva", "Paulo Ferreira"], &["P. Ferreira", "Andre Silva"]],
        );
        let m = t.find_player("ferreira").expect("match");
        // short_name column is scanned first, so row 1 wins even though
        // row 0's long_name also contains the needle.
        assert_eq!(m.row, 1);
        assert_eq!(m.name_column, 0);
    }

    #[test]
    fn unknown_player_is_not_found() {
        let t = sample();
        let err = t.find_player("Zlatan").unwrap_err();
        assert!(matches!(err, StyleError::NotFound { .. }));
    }
}
