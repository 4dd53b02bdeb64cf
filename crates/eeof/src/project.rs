//! Projection of an embedded anomaly onto the EEOF patterns.

use miso_grid::ensure_lats_match;
use ndarray::{Array1, Array2, s};
use tracing::debug;

use crate::embedding::EmbeddedMatrix;
use crate::error::EeofError;
use crate::index::{IndexSeries, mode_name};
use crate::operator::{EigenvectorSet, ScoreNormalizer};

fn check_operands(embedded: &EmbeddedMatrix, eofs: &EigenvectorSet) -> Result<(), EeofError> {
    if embedded.n_lags() != eofs.lags().len() {
        return Err(EeofError::ShapeMismatch {
            name: "embedding",
            expected: eofs.lags().len(),
            got: embedded.n_lags(),
        });
    }
    for (index, (&expected, &got)) in eofs.lags().iter().zip(embedded.lags()).enumerate() {
        if expected != got {
            return Err(EeofError::LagMismatch {
                index,
                expected,
                got,
            });
        }
    }
    ensure_lats_match(eofs.lats(), embedded.lats())?;
    Ok(())
}

/// Unnormalized scores of shape `(mode, time)`.
///
/// `raw[m, t] = Σ_k Σ_y eofs[m, k, y] · embedded[k, t, y]`. NaN inputs
/// propagate into the affected scores.
///
/// # Errors
///
/// Returns [`EeofError::ShapeMismatch`] or [`EeofError::LagMismatch`] if
/// the lag axes disagree, and a grid error if the latitudes do.
pub fn raw_scores(
    embedded: &EmbeddedMatrix,
    eofs: &EigenvectorSet,
) -> Result<Array2<f64>, EeofError> {
    check_operands(embedded, eofs)?;

    let mut raw = Array2::zeros((eofs.n_modes(), embedded.n_times()));
    for m in 0..eofs.n_modes() {
        let mut acc = Array1::<f64>::zeros(embedded.n_times());
        for k in 0..embedded.n_lags() {
            acc += &embedded.lag(k).dot(&eofs.data().slice(s![m, k, ..]));
        }
        raw.row_mut(m).assign(&acc);
    }
    Ok(raw)
}

/// Normalized index series, one per mode, named `MISO1`, `MISO2`, ….
///
/// Each score is stamped with the last date of its lag window.
///
/// # Errors
///
/// Everything [`raw_scores`] reports, plus [`EeofError::ShapeMismatch`]
/// when the normalizer has a different number of modes.
pub fn project(
    embedded: &EmbeddedMatrix,
    eofs: &EigenvectorSet,
    normalizer: &ScoreNormalizer,
) -> Result<Vec<IndexSeries>, EeofError> {
    if normalizer.n_modes() != eofs.n_modes() {
        return Err(EeofError::ShapeMismatch {
            name: "mode",
            expected: eofs.n_modes(),
            got: normalizer.n_modes(),
        });
    }
    let raw = raw_scores(embedded, eofs)?;

    let series = raw
        .outer_iter()
        .zip(normalizer.std())
        .enumerate()
        .map(|(m, (row, &std))| {
            let values = row.iter().map(|v| v / std).collect();
            IndexSeries::new(mode_name(m), embedded.valid_times().to_vec(), values)
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        n_modes = series.len(),
        n_times = embedded.n_times(),
        "scores projected"
    );
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::build_embedding;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use miso_grid::GriddedSeries;
    use ndarray::Array3;

    fn series(values: Array2<f64>) -> GriddedSeries {
        let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let times = start.iter_days().take(values.nrows()).collect();
        let lats = (0..values.ncols()).map(|y| y as f64).collect();
        GriddedSeries::new(times, lats, values).unwrap()
    }

    #[test]
    fn zero_anomaly_gives_zero_scores() {
        let embedded = build_embedding(&series(Array2::zeros((20, 3))), 1, 5).unwrap();
        let eofs = EigenvectorSet::new(
            vec![0, 1, 2, 3, 4],
            vec![0.0, 1.0, 2.0],
            Array3::from_elem((2, 5, 3), 0.7),
        )
        .unwrap();
        let std = ScoreNormalizer::new(vec![1.5, 2.5]).unwrap();
        let scores = project(&embedded, &eofs, &std).unwrap();
        assert_eq!(scores.len(), 2);
        for s in &scores {
            assert_eq!(s.len(), 16);
            assert!(s.values().iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn matches_hand_computed_sum() {
        // x[t, y] = t + 10y, two lags at tau 2, eof weights w[k, y] = k + 1
        let values = Array2::from_shape_fn((6, 2), |(t, y)| (t + 10 * y) as f64);
        let embedded = build_embedding(&series(values), 2, 2).unwrap();
        let data = Array3::from_shape_fn((1, 2, 2), |(_, k, _)| (k + 1) as f64);
        let eofs = EigenvectorSet::new(vec![0, 2], vec![0.0, 1.0], data).unwrap();
        let raw = raw_scores(&embedded, &eofs).unwrap();
        // t = 0: 1·(0 + 10) + 2·(2 + 12) = 38
        assert_relative_eq!(raw[[0, 0]], 38.0);
        // t = 3: 1·(3 + 13) + 2·(5 + 15) = 56
        assert_relative_eq!(raw[[0, 3]], 56.0);
    }

    #[test]
    fn scores_are_divided_by_std() {
        let embedded = build_embedding(&series(Array2::ones((4, 1))), 1, 1).unwrap();
        let eofs = EigenvectorSet::new(vec![0], vec![0.0], Array3::from_elem((1, 1, 1), 3.0)).unwrap();
        let std = ScoreNormalizer::new(vec![4.0]).unwrap();
        let scores = project(&embedded, &eofs, &std).unwrap();
        assert_relative_eq!(scores[0].values()[2], 0.75);
    }

    #[test]
    fn scores_stamp_window_end() {
        let input = series(Array2::ones((10, 1)));
        let embedded = build_embedding(&input, 1, 3).unwrap();
        let eofs = EigenvectorSet::new(vec![0, 1, 2], vec![0.0], Array3::ones((1, 3, 1))).unwrap();
        let std = ScoreNormalizer::new(vec![1.0]).unwrap();
        let scores = project(&embedded, &eofs, &std).unwrap();
        assert_eq!(scores[0].times(), &input.times()[2..]);
    }

    #[test]
    fn nan_propagates_to_affected_windows() {
        let mut values = Array2::zeros((5, 1));
        values[[2, 0]] = f64::NAN;
        let embedded = build_embedding(&series(values), 1, 2).unwrap();
        let eofs = EigenvectorSet::new(vec![0, 1], vec![0.0], Array3::ones((1, 2, 1))).unwrap();
        let raw = raw_scores(&embedded, &eofs).unwrap();
        assert_eq!(raw[[0, 0]], 0.0);
        assert!(raw[[0, 1]].is_nan());
        assert!(raw[[0, 2]].is_nan());
        assert_eq!(raw[[0, 3]], 0.0);
    }

    #[test]
    fn rejects_mismatched_lags() {
        let embedded = build_embedding(&series(Array2::zeros((10, 1))), 2, 2).unwrap();
        let eofs = EigenvectorSet::new(vec![0, 1], vec![0.0], Array3::zeros((1, 2, 1))).unwrap();
        assert_eq!(
            raw_scores(&embedded, &eofs).unwrap_err(),
            EeofError::LagMismatch {
                index: 1,
                expected: 1,
                got: 2
            }
        );
    }

    #[test]
    fn rejects_mismatched_lats() {
        let embedded = build_embedding(&series(Array2::zeros((10, 2))), 1, 1).unwrap();
        let eofs = EigenvectorSet::new(vec![0], vec![0.0, 2.0], Array3::zeros((1, 1, 2))).unwrap();
        assert!(matches!(
            raw_scores(&embedded, &eofs),
            Err(EeofError::Grid(_))
        ));
    }

    #[test]
    fn rejects_normalizer_mode_mismatch() {
        let embedded = build_embedding(&series(Array2::zeros((4, 1))), 1, 1).unwrap();
        let eofs = EigenvectorSet::new(vec![0], vec![0.0], Array3::zeros((2, 1, 1))).unwrap();
        let std = ScoreNormalizer::new(vec![1.0]).unwrap();
        assert!(matches!(
            project(&embedded, &eofs, &std),
            Err(EeofError::ShapeMismatch { name: "mode", .. })
        ));
    }
}
