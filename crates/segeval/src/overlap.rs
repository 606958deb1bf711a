// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Pairwise overlap matrix and its margin vectors.
//!
//! Rows correspond to reference regions, columns to test regions.

use crate::{annotation::Annotation, geometry::Geometry};
use rayon::prelude::*;
use std::ops::Index;

/// Intersection areas between every reference and every test region.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl OverlapMatrix {
    /// Compute the intersection area of every `(reference, test)` pair.
    ///
    /// Rows are computed in parallel. Most pairs are expected to have no
    /// overlap and yield `0.0`.
    #[cfg_attr(feature = "profiling", tracing::instrument(skip_all))]
    pub fn build<S>(reference: &[Annotation<S>], test: &[Annotation<S>]) -> Self
    where
        S: Geometry + Sync,
    {
        let rows: Vec<Vec<f64>> = reference
            .par_iter()
            .map(|r| {
                test.iter()
                    .map(|t| r.shape.intersection_area(&t.shape))
                    .collect()
            })
            .collect();

        Self {
            rows: reference.len(),
            cols: test.len(),
            data: rows.into_iter().flatten().collect(),
        }
    }

    /// Build a matrix from row-major values.
    ///
    /// Returns `None` if `values` does not hold `rows * cols` entries.
    pub fn from_vec(rows: usize, cols: usize, values: Vec<f64>) -> Option<Self> {
        (values.len() == rows * cols).then_some(Self {
            rows,
            cols,
            data: values,
        })
    }

    /// Number of reference regions.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of test regions.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Overlaps of reference region `i` with every test region.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Overlaps of test region `j` with every reference region.
    pub fn column(&self, j: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.rows).map(move |i| self.data[i * self.cols + j])
    }
}

impl Index<(usize, usize)> for OverlapMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.cols + j]
    }
}

/// Per-region totals of the overlap matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct MarginVectors {
    /// Row sums, one per reference region.
    pub reference: Vec<f64>,
    /// Column sums, one per test region.
    pub test: Vec<f64>,
}

impl MarginVectors {
    /// Row and column sums of an overlap matrix.
    #[cfg_attr(feature = "profiling", tracing::instrument(skip_all))]
    pub fn from_overlap(overlap: &OverlapMatrix) -> Self {
        let reference = (0..overlap.rows())
            .map(|i| overlap.row(i).iter().sum())
            .collect();
        let test = (0..overlap.cols())
            .map(|j| overlap.column(j).sum())
            .collect();
        Self { reference, test }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Annotation {
        Annotation::new(Shape::rectangle(x, y, w, h), "coin")
    }

    #[test]
    fn test_build_overlap_matrix() {
        let reference = vec![rect(0.0, 0.0, 10.0, 10.0), rect(20.0, 0.0, 10.0, 10.0)];
        let test = vec![
            rect(5.0, 0.0, 10.0, 10.0),
            rect(20.0, 0.0, 10.0, 5.0),
            rect(100.0, 100.0, 1.0, 1.0),
        ];
        let overlap = OverlapMatrix::build(&reference, &test);

        assert_eq!(overlap.rows(), 2);
        assert_eq!(overlap.cols(), 3);
        assert!((overlap[(0, 0)] - 50.0).abs() < 1e-9);
        assert_eq!(overlap[(0, 1)], 0.0);
        assert_eq!(overlap[(0, 2)], 0.0);
        assert_eq!(overlap[(1, 0)], 0.0);
        assert!((overlap[(1, 1)] - 50.0).abs() < 1e-9);
        assert_eq!(overlap[(1, 2)], 0.0);
    }

    #[test]
    fn test_margin_consistency() {
        let overlap =
            OverlapMatrix::from_vec(2, 3, vec![1.0, 2.0, 0.0, 0.0, 4.0, 8.0]).unwrap();
        let margins = MarginVectors::from_overlap(&overlap);

        assert_eq!(margins.reference, vec![3.0, 12.0]);
        assert_eq!(margins.test, vec![1.0, 6.0, 8.0]);
        for i in 0..overlap.rows() {
            assert_eq!(margins.reference[i], overlap.row(i).iter().sum::<f64>());
        }
        for j in 0..overlap.cols() {
            assert_eq!(margins.test[j], overlap.column(j).sum::<f64>());
        }
    }

    #[test]
    fn test_empty_sides() {
        let some = vec![rect(0.0, 0.0, 1.0, 1.0), rect(2.0, 0.0, 1.0, 1.0)];

        let overlap = OverlapMatrix::build(&[], &some);
        assert_eq!((overlap.rows(), overlap.cols()), (0, 2));
        let margins = MarginVectors::from_overlap(&overlap);
        assert!(margins.reference.is_empty());
        assert_eq!(margins.test, vec![0.0, 0.0]);

        let overlap = OverlapMatrix::build(&some, &[]);
        assert_eq!((overlap.rows(), overlap.cols()), (2, 0));
        let margins = MarginVectors::from_overlap(&overlap);
        assert_eq!(margins.reference, vec![0.0, 0.0]);
        assert!(margins.test.is_empty());
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        assert!(OverlapMatrix::from_vec(2, 2, vec![0.0; 3]).is_none());
        assert!(OverlapMatrix::from_vec(3, 0, vec![]).is_some());
    }
}
