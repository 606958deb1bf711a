// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Segmentation quality counts derived from the link matrix.
//!
//! Every count only depends on the number of links of each reference row
//! and test column:
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `Tc`  | mutual one-to-one matches |
//! | `To`  | excess links of over-segmented reference regions |
//! | `Tu`  | excess links of under-segmented test regions |
//! | `Co`  | reference regions linked to several test regions |
//! | `Cu`  | test regions linked to several reference regions |
//! | `Cm`  | reference regions without any link (missed) |
//! | `Cf`  | test regions without any link (false alarms) |
//! | `Cr`  | reference regions considered |
//! | `Ct`  | test regions considered |

use crate::link::LinkMatrix;
use std::fmt;

/// Short names of the metrics, in report order.
pub const FIELD_NAMES: [&str; 9] = ["Tc", "To", "Tu", "Co", "Cu", "Cm", "Cf", "Cr", "Ct"];

/// Result of one segmentation evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SegmentationMetrics {
    /// `Tc`: total correct segmentation (mutual 1-to-1 matches).
    pub total_correct: usize,
    /// `To`: total over-segmentation.
    pub total_over: usize,
    /// `Tu`: total under-segmentation.
    pub total_under: usize,
    /// `Co`: over-segmentation components.
    pub over_components: usize,
    /// `Cu`: under-segmentation components.
    pub under_components: usize,
    /// `Cm`: missed components.
    pub missed_components: usize,
    /// `Cf`: false alarm components.
    pub false_alarm_components: usize,
    /// `Cr`: total components in reference.
    pub reference_count: usize,
    /// `Ct`: total components in test.
    pub test_count: usize,
}

impl SegmentationMetrics {
    /// Count correspondences from the degrees of a link matrix.
    #[cfg_attr(feature = "profiling", tracing::instrument(skip_all))]
    pub fn from_links(links: &LinkMatrix) -> Self {
        let row_degrees = links.row_degrees();
        let column_degrees = links.column_degrees();

        // A reference row with a single link only counts as correct when the
        // linked column has no other link. Otherwise the pair is part of an
        // under-segmentation.
        let total_correct = row_degrees
            .iter()
            .enumerate()
            .filter(|&(_, &degree)| degree == 1)
            .filter_map(|(i, _)| links.linked_columns(i).next())
            .filter(|&j| column_degrees[j] == 1)
            .count();

        let (over_components, total_over) = split_count(&row_degrees);
        let (under_components, total_under) = split_count(&column_degrees);

        Self {
            total_correct,
            total_over,
            total_under,
            over_components,
            under_components,
            missed_components: row_degrees.iter().filter(|&&d| d == 0).count(),
            false_alarm_components: column_degrees.iter().filter(|&&d| d == 0).count(),
            reference_count: links.rows(),
            test_count: links.cols(),
        }
    }

    /// Values in [`FIELD_NAMES`] order.
    pub fn values(&self) -> [usize; 9] {
        [
            self.total_correct,
            self.total_over,
            self.total_under,
            self.over_components,
            self.under_components,
            self.missed_components,
            self.false_alarm_components,
            self.reference_count,
            self.test_count,
        ]
    }
}

/// Number of regions with more than one link, and the sum of their links
/// beyond the first.
fn split_count(degrees: &[usize]) -> (usize, usize) {
    degrees
        .iter()
        .filter(|&&d| d > 1)
        .fold((0, 0), |(components, excess), &d| (components + 1, excess + d - 1))
}

impl fmt::Display for SegmentationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "╔══════════════════════════════════════════════════════════════╗"
        )?;
        writeln!(
            f,
            "║                   SEGMENTATION RESULTS                       ║"
        )?;
        writeln!(
            f,
            "╠══════════════════════════════════════════════════════════════╣"
        )?;
        writeln!(f, "║ Tc (total correct segmentation)      = {}", self.total_correct)?;
        writeln!(f, "║ To (total over segmentation)         = {}", self.total_over)?;
        writeln!(f, "║ Tu (total under segmentation)        = {}", self.total_under)?;
        writeln!(f, "║ Co (over segmentation components)    = {}", self.over_components)?;
        writeln!(f, "║ Cu (under segmentation components)   = {}", self.under_components)?;
        writeln!(f, "║ Cm (missed components)               = {}", self.missed_components)?;
        writeln!(
            f,
            "║ Cf (false alarms components)         = {}",
            self.false_alarm_components
        )?;
        writeln!(
            f,
            "╠══════════════════════════════════════════════════════════════╣"
        )?;
        writeln!(f, "║ Cr (total components in reference)   = {}", self.reference_count)?;
        writeln!(f, "║ Ct (total components in test)        = {}", self.test_count)?;
        writeln!(
            f,
            "╚══════════════════════════════════════════════════════════════╝"
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(cols: usize, rows: &[Vec<bool>]) -> SegmentationMetrics {
        SegmentationMetrics::from_links(&LinkMatrix::from_rows(cols, rows).unwrap())
    }

    #[test]
    fn test_identity() {
        let m = metrics(
            3,
            &[
                vec![true, false, false],
                vec![false, true, false],
                vec![false, false, true],
            ],
        );
        assert_eq!(m.values(), [3, 0, 0, 0, 0, 0, 0, 3, 3]);
    }

    #[test]
    fn test_over_segmentation() {
        // Reference 0 split into three test regions.
        let m = metrics(4, &[vec![true, true, true, false], vec![false, false, false, true]]);
        assert_eq!(m.over_components, 1);
        assert_eq!(m.total_over, 2);
        assert_eq!(m.total_correct, 1);
        assert_eq!(m.under_components, 0);
        assert_eq!(m.missed_components, 0);
        assert_eq!(m.false_alarm_components, 0);
    }

    #[test]
    fn test_under_segmentation_absorbs_single_links() {
        // Both reference rows have a single link, but to the same column:
        // neither counts as correct.
        let m = metrics(2, &[vec![true, false], vec![true, false]]);
        assert_eq!(m.total_correct, 0);
        assert_eq!(m.under_components, 1);
        assert_eq!(m.total_under, 1);
        assert_eq!(m.false_alarm_components, 1);
        assert_eq!(m.missed_components, 0);
    }

    #[test]
    fn test_missed_and_false_alarms() {
        let m = metrics(2, &[vec![false, false], vec![false, true], vec![false, false]]);
        assert_eq!(m.missed_components, 2);
        assert_eq!(m.false_alarm_components, 1);
        assert_eq!(m.total_correct, 1);
        assert_eq!(m.reference_count, 3);
        assert_eq!(m.test_count, 2);
    }

    #[test]
    fn test_many_to_many() {
        // Rows 0 and 1 both split over columns 0 and 1.
        let m = metrics(2, &[vec![true, true], vec![true, true]]);
        assert_eq!(m.over_components, 2);
        assert_eq!(m.total_over, 2);
        assert_eq!(m.under_components, 2);
        assert_eq!(m.total_under, 2);
        assert_eq!(m.total_correct, 0);
    }

    #[test]
    fn test_empty_link_matrices() {
        let m = metrics(3, &[]);
        assert_eq!(m.values(), [0, 0, 0, 0, 0, 0, 3, 0, 3]);

        let m = metrics(0, &[vec![], vec![]]);
        assert_eq!(m.values(), [0, 0, 0, 0, 0, 2, 0, 2, 0]);

        let m = metrics(0, &[]);
        assert_eq!(m, SegmentationMetrics::default());
    }

    #[test]
    fn test_display_lists_every_field() {
        let m = metrics(1, &[vec![true]]);
        let text = m.to_string();
        for name in FIELD_NAMES {
            assert!(text.contains(&format!("{} (", name)), "missing {}", name);
        }
    }
}
