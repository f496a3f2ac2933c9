use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::data::model::{FEATURE_COLUMNS, LABEL_COLUMN};
use crate::data::table::Table;
use crate::error::{PipelineError, PipelineResult};

const SVD_EPS: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Ridge regression
// ---------------------------------------------------------------------------

/// Linear model with an intercept and an L2 penalty on standardized
/// coefficients.
///
/// The objective minimised is
///
/// ```text
/// 1/(2n) Σ (yᵢ - b - xᵢ·β)²  +  λ/(2σ_y) Σ (σⱼ βⱼ)²
/// ```
///
/// where `σⱼ` and `σ_y` are the population standard deviations of feature
/// `j` and of the label. Features with zero variance get a zero coefficient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RidgeRegression {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    pub reg_param: f64,
}

impl RidgeRegression {
    /// Fit on `features` (one row per sample) against `labels`.
    pub fn fit(features: &[Vec<f64>], labels: &[f64], reg_param: f64) -> PipelineResult<Self> {
        let n = labels.len();
        if n == 0 || features.len() != n {
            return Err(PipelineError::NotEnoughRows { needed: 1, found: n });
        }
        let k = features[0].len();
        let nf = n as f64;

        let x_mean: Vec<f64> = (0..k)
            .map(|j| features.iter().map(|r| r[j]).sum::<f64>() / nf)
            .collect();
        let x_std: Vec<f64> = (0..k)
            .map(|j| {
                let var = features.iter().map(|r| (r[j] - x_mean[j]).powi(2)).sum::<f64>() / nf;
                var.sqrt()
            })
            .collect();
        let y_mean = labels.iter().sum::<f64>() / nf;
        let y_std = (labels.iter().map(|y| (y - y_mean).powi(2)).sum::<f64>() / nf).sqrt();

        if y_std == 0.0 {
            log::debug!("label is constant; returning intercept-only model");
            return Ok(RidgeRegression {
                intercept: y_mean,
                coefficients: vec![0.0; k],
                reg_param,
            });
        }

        // Constant features drop out of the system entirely.
        let active: Vec<usize> = (0..k).filter(|&j| x_std[j] > 0.0).collect();
        let mut coefficients = vec![0.0; k];

        if !active.is_empty() {
            let m = active.len();
            let x = DMatrix::from_fn(n, m, |i, a| features[i][active[a]] - x_mean[active[a]]);
            let y = DVector::from_fn(n, |i, _| labels[i] - y_mean);

            let penalty = reg_param / y_std;
            let mut gram = x.transpose() * &x / nf;
            for (a, &j) in active.iter().enumerate() {
                gram[(a, a)] += penalty * x_std[j] * x_std[j];
            }
            let rhs = x.transpose() * y / nf;

            let beta = match gram.clone().cholesky() {
                Some(chol) => chol.solve(&rhs),
                None => gram
                    .svd(true, true)
                    .solve(&rhs, SVD_EPS)
                    .map_err(|_| PipelineError::SingularSystem)?,
            };
            for (a, &j) in active.iter().enumerate() {
                coefficients[j] = beta[a];
            }
        }

        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_mean)
                .map(|(b, m)| b * m)
                .sum::<f64>();

        Ok(RidgeRegression {
            intercept,
            coefficients,
            reg_param,
        })
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(b, x)| b * x)
                .sum::<f64>()
    }
}

// ---------------------------------------------------------------------------
// Regression artifact: model + in-sample predictions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    /// Dataset row the prediction belongs to.
    pub row: usize,
    pub actual: f64,
    pub predicted: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegressionArtifact {
    pub features: Vec<String>,
    pub label: String,
    pub model: RidgeRegression,
    pub predictions: Vec<Prediction>,
}

/// Feature rows in [`FEATURE_COLUMNS`] order plus labels. Rows with any
/// missing value are skipped; the third vector holds their dataset rows.
pub fn assemble<T: Table + ?Sized>(
    table: &T,
) -> PipelineResult<(Vec<Vec<f64>>, Vec<f64>, Vec<usize>)> {
    let columns = FEATURE_COLUMNS
        .iter()
        .map(|c| table.column_f64(c))
        .collect::<PipelineResult<Vec<_>>>()?;
    let labels = table.column_f64(LABEL_COLUMN)?;

    let mut features = Vec::new();
    let mut ys = Vec::new();
    let mut rows = Vec::new();
    for (i, label) in labels.iter().enumerate() {
        let row: Option<Vec<f64>> = columns.iter().map(|col| col[i]).collect();
        if let (Some(row), Some(y)) = (row, label) {
            features.push(row);
            ys.push(*y);
            rows.push(table.source_index(i));
        }
    }
    Ok((features, ys, rows))
}

/// Fit on `table` and predict the same rows.
pub fn fit_and_predict<T: Table + ?Sized>(
    table: &T,
    reg_param: f64,
) -> PipelineResult<RegressionArtifact> {
    let (features, labels, rows) = assemble(table)?;
    let skipped = table.num_rows() - rows.len();
    if skipped > 0 {
        log::debug!("regression: skipped {skipped} row(s) with missing values");
    }
    let model = RidgeRegression::fit(&features, &labels, reg_param)?;
    let predictions = features
        .iter()
        .zip(&labels)
        .zip(&rows)
        .map(|((x, &actual), &row)| Prediction {
            row,
            actual,
            predicted: model.predict(x),
        })
        .collect();

    Ok(RegressionArtifact {
        features: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        label: LABEL_COLUMN.to_string(),
        model,
        predictions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, YEARLY_INCOME};
    use crate::data::testing::sample_dataset;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol * (1.0 + b.abs())
    }

    #[test]
    fn recovers_exact_linear_relation_with_tiny_penalty() {
        // y = 3 + 2 x0 - x1
        let xs: Vec<Vec<f64>> = vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![2.0, 3.0],
            vec![3.0, 1.0],
            vec![4.0, 5.0],
        ];
        let ys: Vec<f64> = xs.iter().map(|r| 3.0 + 2.0 * r[0] - r[1]).collect();
        let model = RidgeRegression::fit(&xs, &ys, 1e-9).unwrap();
        assert!(close(model.coefficients[0], 2.0, 1e-6));
        assert!(close(model.coefficients[1], -1.0, 1e-6));
        assert!(close(model.intercept, 3.0, 1e-6));
    }

    #[test]
    fn penalty_shrinks_coefficients() {
        let xs: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let ys: Vec<f64> = (0..10).map(|i| 5.0 * i as f64 + 1.0).collect();
        let loose = RidgeRegression::fit(&xs, &ys, 0.0).unwrap();
        let tight = RidgeRegression::fit(&xs, &ys, 10.0).unwrap();
        assert!(close(loose.coefficients[0], 5.0, 1e-9));
        assert!(tight.coefficients[0].abs() < loose.coefficients[0].abs());
    }

    #[test]
    fn constant_label_gives_intercept_only() {
        let xs = vec![vec![1.0], vec![2.0], vec![3.0]];
        let model = RidgeRegression::fit(&xs, &[7.0, 7.0, 7.0], 0.01).unwrap();
        assert_eq!(model.coefficients, vec![0.0]);
        assert_eq!(model.intercept, 7.0);
    }

    #[test]
    fn constant_feature_gets_zero_weight() {
        let xs = vec![vec![1.0, 4.0], vec![2.0, 4.0], vec![3.0, 4.0]];
        let model = RidgeRegression::fit(&xs, &[2.0, 4.0, 6.0], 0.0).unwrap();
        assert_eq!(model.coefficients[1], 0.0);
        assert!(close(model.predict(&[4.0, 4.0]), 8.0, 1e-9));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            RidgeRegression::fit(&[], &[], 0.01),
            Err(PipelineError::NotEnoughRows { found: 0, .. })
        ));
    }

    #[test]
    fn assembles_features_in_catalogue_order() {
        let ds = sample_dataset();
        let (features, labels, rows) = assemble(&ds).unwrap();
        assert_eq!(features.len(), 4);
        assert_eq!(
            features[0],
            vec![40_000.0, 2.0, 1.0, 1.0, 50.0, 30_000.0, 1.0]
        );
        assert_eq!(labels[0], 1200.0);
        assert_eq!(rows, vec![0, 1, 2, 3]);
    }

    #[test]
    fn rows_with_missing_values_are_excluded() {
        let mut ds = sample_dataset();
        let inc = ds.schema.index_of(YEARLY_INCOME).unwrap();
        ds.records[2][inc] = CellValue::Null;
        let artifact = fit_and_predict(&ds, 0.01).unwrap();
        let rows: Vec<usize> = artifact.predictions.iter().map(|p| p.row).collect();
        assert_eq!(rows, vec![0, 1, 3]);
    }

    #[test]
    fn non_finite_cells_are_excluded_like_nulls() {
        use crate::data::model::coerce_numeric;

        for raw in ["NaN", "inf"] {
            let mut ds = sample_dataset();
            let inc = ds.schema.index_of(YEARLY_INCOME).unwrap();
            ds.records[0][inc] = coerce_numeric(&CellValue::text(raw));
            let artifact = fit_and_predict(&ds, 0.01).unwrap();
            let rows: Vec<usize> = artifact.predictions.iter().map(|p| p.row).collect();
            assert_eq!(rows, vec![1, 2, 3], "{raw}");
            assert!(artifact.predictions.iter().all(|p| p.predicted.is_finite()), "{raw}");
        }
    }

    #[test]
    fn in_sample_predictions_cover_every_row() {
        let ds = sample_dataset();
        let artifact = fit_and_predict(&ds, 0.01).unwrap();
        assert_eq!(artifact.predictions.len(), ds.len());
        assert_eq!(artifact.features.len(), 7);
        assert!(artifact.predictions.iter().all(|p| p.predicted.is_finite()));
    }
}
