//! Supervised examples cut from a scaled price series.
//!
//! Each example is `WINDOW_SIZE` consecutive scaled prices and the scaled
//! price right after them. A series of length `L` yields `L - WINDOW_SIZE`
//! examples.

use crate::domain::types::WINDOW_SIZE;
use ndarray::{s, Array1, Array2, ArrayView1};

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    /// One row per example, `WINDOW_SIZE` columns.
    pub inputs: Array2<f64>,
    /// Next scaled price for each row of `inputs`.
    pub targets: Array1<f64>,
}

impl TrainingSet {
    /// Returns `None` when the series cannot fill a single window plus target.
    pub fn from_scaled(scaled: &[f64]) -> Option<Self> {
        if scaled.len() < WINDOW_SIZE + 1 {
            return None;
        }

        let n = scaled.len() - WINDOW_SIZE;
        let mut inputs = Array2::<f64>::zeros((n, WINDOW_SIZE));
        let mut targets = Array1::<f64>::zeros(n);

        let series = ArrayView1::from(scaled);
        for (i, w) in series.windows(WINDOW_SIZE + 1).into_iter().enumerate() {
            inputs.row_mut(i).assign(&w.slice(s![..WINDOW_SIZE]));
            targets[i] = w[WINDOW_SIZE];
        }

        Some(Self { inputs, targets })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Rows as owned vectors, the layout `smartcore` matrices are built from.
    pub fn input_rows(&self) -> Vec<Vec<f64>> {
        self.inputs.outer_iter().map(|row| row.to_vec()).collect()
    }

    pub fn target_vec(&self) -> Vec<f64> {
        self.targets.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f64> {
        (0..len).map(|i| i as f64).collect()
    }

    #[test]
    fn test_too_short_series_has_no_examples() {
        assert!(TrainingSet::from_scaled(&ramp(WINDOW_SIZE)).is_none());
        assert!(TrainingSet::from_scaled(&[]).is_none());
    }

    #[test]
    fn test_minimum_series_yields_one_example() {
        let set = TrainingSet::from_scaled(&ramp(WINDOW_SIZE + 1)).unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.inputs.shape(), &[1, WINDOW_SIZE]);
        assert_eq!(set.targets[0], WINDOW_SIZE as f64);
    }

    #[test]
    fn test_example_count_and_alignment() {
        for len in [61, 70, 137] {
            let series = ramp(len);
            let set = TrainingSet::from_scaled(&series).unwrap();

            assert_eq!(set.len(), len - WINDOW_SIZE);
            for i in 0..set.len() {
                let row = set.inputs.row(i);
                assert_eq!(row.len(), WINDOW_SIZE);
                assert_eq!(row[0], series[i]);
                assert_eq!(row[WINDOW_SIZE - 1], series[i + WINDOW_SIZE - 1]);
                assert_eq!(set.targets[i], series[i + WINDOW_SIZE]);
            }
        }
    }

    #[test]
    fn test_input_rows_match_matrix() {
        let set = TrainingSet::from_scaled(&ramp(63)).unwrap();
        let rows = set.input_rows();

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.len() == WINDOW_SIZE));
        assert_eq!(rows[2][0], 2.0);
        assert_eq!(set.target_vec(), vec![60.0, 61.0, 62.0]);
    }
}
