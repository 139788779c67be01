use std::collections::HashMap;

use once_cell::sync::Lazy;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::StyleError;
use crate::table::PlayerTable;

pub const STYLE_DIMENSION_COUNT: usize = 6;

/// Canonical order of the derived style dimensions. Every reduced vector
/// uses this order; artifacts persist it so training and inference agree.
pub const STYLE_DIMENSION_NAMES: [&str; STYLE_DIMENSION_COUNT] = [
    "pace",
    "dribbling",
    "creativity",
    "finishing",
    "defense",
    "physicality",
];

/// Value a dimension falls back to when none of its candidate attributes
/// are present. The attribute scale midpoint, a known approximation: a
/// record with no pace-related attributes reduces to average pace rather
/// than failing.
pub const DEFAULT_DIMENSION_VALUE: f64 = 50.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionSpec {
    pub name: String,
    /// Accepted source-attribute names, covering both the prefixed FC-export
    /// scheme (`skill_dribbling`) and the bare legacy scheme (`dribbling`).
    pub candidates: Vec<String>,
}

/// Ordered dimension -> candidate-attribute table. The reducer is a pure
/// function of this table; it is persisted at training time so the serving
/// side reduces with the exact same rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionTable {
    pub dimensions: Vec<DimensionSpec>,
}

static CANONICAL: Lazy<DimensionTable> = Lazy::new(|| {
    let spec: [(&str, &[&str]); STYLE_DIMENSION_COUNT] = [
        (
            "pace",
            &[
                "movement_acceleration",
                "movement_sprint_speed",
                "acceleration",
                "sprint_speed",
            ],
        ),
        (
            "dribbling",
            &[
                "skill_dribbling",
                "skill_ball_control",
                "movement_agility",
                "movement_balance",
                "dribbling",
                "ball_control",
                "agility",
                "balance",
            ],
        ),
        (
            "creativity",
            &[
                "attacking_short_passing",
                "skill_long_passing",
                "mentality_vision",
                "skill_curve",
                "short_passing",
                "long_passing",
                "vision",
                "curve",
            ],
        ),
        (
            "finishing",
            &[
                "attacking_finishing",
                "power_shot_power",
                "mentality_positioning",
                "finishing",
                "shot_power",
                "positioning",
            ],
        ),
        (
            "defense",
            &[
                "mentality_interceptions",
                "defending_standing_tackle",
                "defending_sliding_tackle",
                "mentality_aggression",
                "interceptions",
                "standing_tackle",
                "sliding_tackle",
                "aggression",
            ],
        ),
        (
            "physicality",
            &[
                "power_strength",
                "power_stamina",
                "power_jumping",
                "strength",
                "stamina",
                "jumping",
            ],
        ),
    ];

    let dimensions = spec
        .iter()
        .map(|(name, candidates)| DimensionSpec {
            name: name.to_string(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
        })
        .collect();
    DimensionTable { dimensions }
});

impl DimensionTable {
    /// The built-in table covering both known attribute naming schemes.
    pub fn canonical() -> &'static DimensionTable {
        &CANONICAL
    }

    pub fn new(dimensions: Vec<DimensionSpec>) -> Result<Self, StyleError> {
        let table = Self { dimensions };
        table.validate()?;
        Ok(table)
    }

    /// Construction-time check. Missing attributes at reduce time are never
    /// an error; a malformed table itself is.
    pub fn validate(&self) -> Result<(), StyleError> {
        if self.dimensions.is_empty() {
            return Err(StyleError::Configuration(
                "dimension table has no dimensions".to_string(),
            ));
        }
        for dim in &self.dimensions {
            if dim.name.trim().is_empty() {
                return Err(StyleError::Configuration(
                    "dimension with empty name".to_string(),
                ));
            }
            if dim.candidates.is_empty() {
                return Err(StyleError::Configuration(format!(
                    "dimension '{}' has no candidate attributes",
                    dim.name
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    pub fn dimension_names(&self) -> Vec<&str> {
        self.dimensions.iter().map(|d| d.name.as_str()).collect()
    }

    /// Reduce a single raw attribute record to one value per dimension, in
    /// table order. Candidates absent from the record are skipped in the
    /// average, not treated as zero.
    pub fn reduce_record(&self, record: &HashMap<String, f64>) -> Vec<f64> {
        self.dimensions
            .iter()
            .map(|dim| {
                let mut sum = 0.0;
                let mut n = 0usize;
                for candidate in &dim.candidates {
                    if let Some(v) = record.get(candidate.as_str()) {
                        sum += v;
                        n += 1;
                    }
                }
                if n > 0 {
                    sum / n as f64
                } else {
                    DEFAULT_DIMENSION_VALUE
                }
            })
            .collect()
    }

    /// Reduce every table row. Works column-wise against the table's actual
    /// schema: each dimension's candidate list is intersected with the
    /// columns once, then each row averages the parseable cells in that
    /// intersection. Agrees exactly with `reduce_record` on the same row.
    pub fn reduce_table(&self, table: &PlayerTable) -> Vec<Vec<f64>> {
        let per_dim_cols: Vec<Vec<usize>> = self
            .dimensions
            .iter()
            .map(|dim| {
                dim.candidates
                    .iter()
                    .filter_map(|c| table.column_index(c))
                    .collect()
            })
            .collect();

        (0..table.len())
            .into_par_iter()
            .map(|row| {
                per_dim_cols
                    .iter()
                    .map(|cols| {
                        let mut sum = 0.0;
                        let mut n = 0usize;
                        for &col in cols {
                            if let Some(v) = table.numeric_at(row, col) {
                                sum += v;
                                n += 1;
                            }
                        }
                        if n > 0 {
                            sum / n as f64
                        } else {
                            DEFAULT_DIMENSION_VALUE
                        }
                    })
                    .collect()
            })
            .collect()
    }
}
