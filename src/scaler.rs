use serde::{Deserialize, Serialize};

use crate::error::StyleError;

/// Threshold below which a column's standard deviation is treated as zero.
const STD_EPSILON: f64 = 1e-12;

/// Fitted per-column standardization: `(x - mean) / std`, columns
/// independent. Fitted exactly once per training run over the full training
/// matrix; the persisted state is the single source of statistics for both
/// training-time and inference-time transforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl StandardScaler {
    /// Population statistics (N denominator): the training table is the
    /// whole relevant universe, not a sample.
    pub fn fit(matrix: &[Vec<f64>]) -> Result<Self, StyleError> {
        let Some(first) = matrix.first() else {
            return Err(StyleError::Configuration(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        };
        let dims = first.len();
        if dims == 0 {
            return Err(StyleError::Configuration(
                "cannot fit scaler on zero-width rows".to_string(),
            ));
        }
        if let Some(bad) = matrix.iter().find(|row| row.len() != dims) {
            return Err(StyleError::Configuration(format!(
                "ragged matrix: expected {} columns, found a row with {}",
                dims,
                bad.len()
            )));
        }

        let n = matrix.len() as f64;
        let mut means = vec![0.0; dims];
        for row in matrix {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut means {
            *m /= n;
        }

        let mut stds = vec![0.0; dims];
        for row in matrix {
            for ((s, v), m) in stds.iter_mut().zip(row).zip(&means) {
                *s += (v - m) * (v - m);
            }
        }
        for s in &mut stds {
            *s = (*s / n).sqrt();
        }

        Ok(Self { means, stds })
    }

    pub fn dims(&self) -> usize {
        self.means.len()
    }

    // Zero-variance columns pass through after centering instead of
    // dividing by zero.
    fn scale(&self, idx: usize) -> f64 {
        let s = self.stds[idx];
        if s > STD_EPSILON { s } else { 1.0 }
    }

    pub fn transform_vec(&self, v: &[f64]) -> Vec<f64> {
        debug_assert_eq!(v.len(), self.dims());
        v.iter()
            .enumerate()
            .map(|(idx, x)| (x - self.means[idx]) / self.scale(idx))
            .collect()
    }

    pub fn transform_matrix(&self, matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
        matrix.iter().map(|row| self.transform_vec(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(matrix: &[Vec<f64>], idx: usize) -> Vec<f64> {
        matrix.iter().map(|r| r[idx]).collect()
    }

    fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    fn std_pop(values: &[f64]) -> f64 {
        let m = mean(values);
        (values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64).sqrt()
    }

    #[test]
    fn transform_yields_zero_mean_unit_std() {
        let matrix = vec![
            vec![10.0, 55.0],
            vec![20.0, 60.0],
            vec![30.0, 65.0],
            vec![40.0, 70.0],
        ];
        let scaler = StandardScaler::fit(&matrix).expect("fit");
        let out = scaler.transform_matrix(&matrix);

        for idx in 0..2 {
            let col = column(&out, idx);
            assert!(mean(&col).abs() < 1e-9);
            assert!((std_pop(&col) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_variance_column_centers_without_dividing() {
        let matrix = vec![vec![50.0, 1.0], vec![50.0, 2.0], vec![50.0, 3.0]];
        let scaler = StandardScaler::fit(&matrix).expect("fit");
        let out = scaler.transform_matrix(&matrix);

        let constant = column(&out, 0);
        assert!(constant.iter().all(|v| v.abs() < 1e-12));
        assert!(std_pop(&constant) < 1e-12);
        assert!(out.iter().all(|row| row.iter().all(|v| v.is_finite())));
    }

    #[test]
    fn vector_and_matrix_transform_agree() {
        let matrix = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 8.0, 9.0]];
        let scaler = StandardScaler::fit(&matrix).expect("fit");
        let whole = scaler.transform_matrix(&matrix);
        for (row, scaled) in matrix.iter().zip(&whole) {
            assert_eq!(&scaler.transform_vec(row), scaled);
        }
    }

    #[test]
    fn empty_matrix_is_rejected() {
        let err = StandardScaler::fit(&[]).unwrap_err();
        assert!(matches!(err, StyleError::Configuration(_)));
    }

    #[test]
    fn ragged_matrix_is_rejected() {
        let err = StandardScaler::fit(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, StyleError::Configuration(_)));
    }
}
