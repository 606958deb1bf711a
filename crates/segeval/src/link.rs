// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Thresholded bipartite link matrix.
//!
//! A reference region `i` and a test region `j` are linked when their
//! overlap is significant. Significance is decided with a relative gate
//! (share of the region's total overlap) followed by an absolute gate (share
//! of the region's own area).
//!
//! The reference side is tried first. When the reference relative gate
//! passes, the reference absolute gate alone decides the link and the test
//! side is never consulted, even if it would have accepted the pair. The
//! test side is only evaluated when the reference relative gate fails.
//!
//! Note: this ordering is not the same as OR-ing two symmetric conditions.
//! It is kept as is until confirmed against the structural matching
//! literature it comes from.

use crate::{
    Error,
    annotation::Annotation,
    geometry::Geometry,
    overlap::{MarginVectors, OverlapMatrix},
};
use rayon::prelude::*;
use serde::Deserialize;
use std::ops::Index;

/// Thresholds of the link decision.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum share of a region's margin for the pair to be considered
    /// from that region's side.
    pub threshold_relative: f64,
    /// Share of the reference region's area the overlap must exceed.
    pub threshold_ref: f64,
    /// Share of the test region's area the overlap must exceed.
    pub threshold_test: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            threshold_relative: 0.2,
            threshold_ref: 0.5,
            threshold_test: 0.5,
        }
    }
}

impl Thresholds {
    /// Reject non-finite or negative thresholds.
    pub fn validate(&self) -> Result<(), Error> {
        for (name, value) in [
            ("threshold_relative", self.threshold_relative),
            ("threshold_ref", self.threshold_ref),
            ("threshold_test", self.threshold_test),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidParameters(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Decide whether an overlap of `weight` between two regions is
    /// significant.
    ///
    /// `weight` must be strictly positive, which guarantees both margins are
    /// strictly positive as well.
    fn is_significant(
        &self,
        weight: f64,
        ref_margin: f64,
        test_margin: f64,
        ref_area: f64,
        test_area: f64,
    ) -> bool {
        if weight / ref_margin >= self.threshold_relative {
            weight / ref_area > self.threshold_ref
        } else if weight / test_margin >= self.threshold_relative {
            weight / test_area > self.threshold_test
        } else {
            false
        }
    }
}

/// Boolean matrix of significant reference/test overlaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatrix {
    rows: usize,
    cols: usize,
    data: Vec<bool>,
}

impl LinkMatrix {
    /// Build a matrix from row-major values.
    ///
    /// Returns `None` if `values` does not hold `rows * cols` entries.
    pub fn from_vec(rows: usize, cols: usize, values: Vec<bool>) -> Option<Self> {
        (values.len() == rows * cols).then_some(Self {
            rows,
            cols,
            data: values,
        })
    }

    /// Build a matrix from nested rows, all of length `cols`.
    pub fn from_rows(cols: usize, rows: &[Vec<bool>]) -> Option<Self> {
        if rows.iter().any(|row| row.len() != cols) {
            return None;
        }
        Self::from_vec(rows.len(), cols, rows.concat())
    }

    /// Number of reference regions.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of test regions.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of test regions linked to reference region `i`.
    pub fn row_degree(&self, i: usize) -> usize {
        self.data[i * self.cols..(i + 1) * self.cols]
            .iter()
            .filter(|&&linked| linked)
            .count()
    }

    /// Number of reference regions linked to test region `j`.
    pub fn column_degree(&self, j: usize) -> usize {
        (0..self.rows)
            .filter(|&i| self.data[i * self.cols + j])
            .count()
    }

    /// Degrees of every reference region.
    pub fn row_degrees(&self) -> Vec<usize> {
        (0..self.rows).map(|i| self.row_degree(i)).collect()
    }

    /// Degrees of every test region.
    pub fn column_degrees(&self) -> Vec<usize> {
        (0..self.cols).map(|j| self.column_degree(j)).collect()
    }

    /// Test regions linked to reference region `i`.
    pub fn linked_columns(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.cols).filter(move |&j| self.data[i * self.cols + j])
    }
}

impl Index<(usize, usize)> for LinkMatrix {
    type Output = bool;

    fn index(&self, (i, j): (usize, usize)) -> &bool {
        &self.data[i * self.cols + j]
    }
}

/// Derive the link matrix from the overlap matrix and its margins.
///
/// The annotation lists provide each region's own area. All lengths must
/// agree with the overlap matrix dimensions, otherwise
/// [`Error::DimensionMismatch`] is returned.
#[cfg_attr(feature = "profiling", tracing::instrument(skip_all))]
pub fn classify_links<S>(
    overlap: &OverlapMatrix,
    margins: &MarginVectors,
    reference: &[Annotation<S>],
    test: &[Annotation<S>],
    thresholds: &Thresholds,
) -> Result<LinkMatrix, Error>
where
    S: Geometry + Sync,
{
    let (rows, cols) = (overlap.rows(), overlap.cols());
    if rows != margins.reference.len() || rows != reference.len() {
        return Err(Error::DimensionMismatch(format!(
            "reference vectors have different lengths: w:{} m:{} d:{}",
            rows,
            margins.reference.len(),
            reference.len()
        )));
    }
    if cols != margins.test.len() || cols != test.len() {
        return Err(Error::DimensionMismatch(format!(
            "test vectors have different lengths: w:{} m:{} d:{}",
            cols,
            margins.test.len(),
            test.len()
        )));
    }

    let test_areas: Vec<f64> = test.iter().map(|t| t.shape.area()).collect();
    let data: Vec<bool> = (0..rows)
        .into_par_iter()
        .flat_map_iter(|i| {
            let ref_area = reference[i].shape.area();
            let test_areas = &test_areas;
            (0..cols).map(move |j| {
                let weight = overlap[(i, j)];
                weight > 0.0
                    && thresholds.is_significant(
                        weight,
                        margins.reference[i],
                        margins.test[j],
                        ref_area,
                        test_areas[j],
                    )
            })
        })
        .collect();

    Ok(LinkMatrix { rows, cols, data })
}
