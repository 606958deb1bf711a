// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! End-to-end evaluation of a test segmentation against a reference.
//!
//! The pipeline runs in three stages, each one consuming the complete output
//! of the previous one:
//!
//! 1. [`OverlapMatrix::build`] and [`MarginVectors::from_overlap`]
//! 2. [`classify_links`]
//! 3. [`SegmentationMetrics::from_links`]
//!
//! # Example
//!
//! ```rust
//! use segeval::{Annotation, Shape, Thresholds, evaluate};
//!
//! let reference = vec![Annotation::new(Shape::rectangle(0.0, 0.0, 10.0, 10.0), "coin")];
//! let test = vec![Annotation::new(Shape::rectangle(0.0, 0.0, 10.0, 10.0), "coin")];
//!
//! let evaluation = evaluate(&reference, &test, &Thresholds::default())?;
//! assert_eq!(evaluation.metrics.total_correct, 1);
//! # Ok::<(), segeval::Error>(())
//! ```

use crate::{
    Error,
    annotation::Annotation,
    geometry::Geometry,
    link::{LinkMatrix, Thresholds, classify_links},
    metrics::SegmentationMetrics,
    overlap::{MarginVectors, OverlapMatrix},
};
use log::debug;

/// Intermediate and final results of one evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Intersection areas, reference rows by test columns.
    pub overlap: OverlapMatrix,
    /// Row and column sums of `overlap`.
    pub margins: MarginVectors,
    /// Significant reference/test pairs.
    pub links: LinkMatrix,
    /// Counts derived from `links`.
    pub metrics: SegmentationMetrics,
}

/// Evaluate `test` regions against `reference` regions.
///
/// Empty inputs are valid and yield zero counts apart from the region
/// totals.
#[cfg_attr(feature = "profiling", tracing::instrument(skip_all))]
pub fn evaluate<S>(
    reference: &[Annotation<S>],
    test: &[Annotation<S>],
    thresholds: &Thresholds,
) -> Result<Evaluation, Error>
where
    S: Geometry + Sync,
{
    debug!(
        "Evaluating {} reference region(s) against {} test region(s).",
        reference.len(),
        test.len()
    );

    debug!("Compute weighting matrix.");
    let overlap = OverlapMatrix::build(reference, test);

    debug!("Compute marginal values.");
    let margins = MarginVectors::from_overlap(&overlap);

    debug!("Compute link matrix.");
    let links = classify_links(&overlap, &margins, reference, test, thresholds)?;

    debug!("Compute statistics.");
    let metrics = SegmentationMetrics::from_links(&links);

    Ok(Evaluation {
        overlap,
        margins,
        links,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Annotation {
        Annotation::new(Shape::rectangle(x, y, w, h), "coin")
    }

    fn run(reference: &[Annotation], test: &[Annotation]) -> SegmentationMetrics {
        evaluate(reference, test, &Thresholds::default())
            .unwrap()
            .metrics
    }

    #[test]
    fn test_identical_region() {
        let m = run(&[rect(0.0, 0.0, 10.0, 10.0)], &[rect(0.0, 0.0, 10.0, 10.0)]);
        assert_eq!(m.values(), [1, 0, 0, 0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_reference_split_in_two() {
        // Each half covers exactly 50% of the reference, which does not pass
        // the default strict 0.5 gate.
        let reference = [rect(0.0, 0.0, 10.0, 10.0)];
        let test = [rect(0.0, 0.0, 5.0, 10.0), rect(5.0, 0.0, 5.0, 10.0)];
        let m = run(&reference, &test);
        assert_eq!(m.missed_components, 1);
        assert_eq!(m.false_alarm_components, 2);

        let thresholds = Thresholds {
            threshold_ref: 0.3,
            ..Default::default()
        };
        let m = evaluate(&reference, &test, &thresholds).unwrap().metrics;
        assert_eq!(m.over_components, 1);
        assert_eq!(m.total_over, 1);
        assert_eq!(m.total_correct, 0);
        assert_eq!(m.missed_components, 0);
        assert_eq!(m.false_alarm_components, 0);
    }

    #[test]
    fn test_test_region_merging_two_references() {
        let reference = [rect(0.0, 0.0, 5.0, 10.0), rect(5.0, 0.0, 5.0, 10.0)];
        let test = [rect(0.0, 0.0, 10.0, 10.0)];
        let m = run(&reference, &test);
        assert_eq!(m.under_components, 1);
        assert_eq!(m.total_under, 1);
        assert_eq!(m.total_correct, 0);
        assert_eq!(m.over_components, 0);
        assert_eq!(m.missed_components, 0);
    }

    #[test]
    fn test_unmatched_regions() {
        let reference = [rect(0.0, 0.0, 10.0, 10.0), rect(100.0, 100.0, 10.0, 10.0)];
        let test = [rect(0.0, 0.0, 10.0, 10.0), rect(50.0, 50.0, 10.0, 10.0)];
        let m = run(&reference, &test);
        assert_eq!(m.values(), [1, 0, 0, 0, 0, 1, 1, 2, 2]);
    }

    #[test]
    fn test_empty_reference() {
        let test = [rect(0.0, 0.0, 10.0, 10.0), rect(20.0, 0.0, 10.0, 10.0)];
        let m = run(&[], &test);
        assert_eq!(m.values(), [0, 0, 0, 0, 0, 0, 2, 0, 2]);

        let m = run(&test, &[]);
        assert_eq!(m.values(), [0, 0, 0, 0, 0, 2, 0, 2, 0]);

        assert_eq!(run(&[], &[]), SegmentationMetrics::default());
    }

    #[test]
    fn test_intermediate_results() {
        let reference = [rect(0.0, 0.0, 10.0, 10.0), rect(20.0, 0.0, 10.0, 10.0)];
        let test = [rect(5.0, 0.0, 20.0, 10.0)];
        let evaluation = evaluate(&reference, &test, &Thresholds::default()).unwrap();

        assert_eq!(evaluation.overlap.rows(), 2);
        assert_eq!(evaluation.overlap.cols(), 1);
        assert!((evaluation.overlap[(0, 0)] - 50.0).abs() < 1e-9);
        assert!((evaluation.overlap[(1, 0)] - 50.0).abs() < 1e-9);
        assert!((evaluation.margins.test[0] - 100.0).abs() < 1e-9);

        for i in 0..evaluation.links.rows() {
            for j in 0..evaluation.links.cols() {
                if evaluation.links[(i, j)] {
                    assert!(evaluation.overlap[(i, j)] > 0.0);
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let reference: Vec<Annotation> = (0..12)
            .map(|k| rect((k % 4) as f64 * 30.0, (k / 4) as f64 * 30.0, 25.0, 25.0))
            .collect();
        let test: Vec<Annotation> = (0..15)
            .map(|k| rect((k % 5) as f64 * 24.0 + 3.0, (k / 5) as f64 * 29.0, 20.0, 28.0))
            .collect();

        let first = evaluate(&reference, &test, &Thresholds::default()).unwrap();
        let second = evaluate(&reference, &test, &Thresholds::default()).unwrap();
        assert_eq!(first.metrics, second.metrics);
        assert_eq!(first.links, second.links);
        assert_eq!(first.metrics.reference_count, 12);
        assert_eq!(first.metrics.test_count, 15);
    }
}
