// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! # Segmentation Evaluation Library
//!
//! Compares a test segmentation of a document image against a reference
//! (ground truth) segmentation and reports how well regions correspond.
//!
//! ## Features
//!
//! - **Overlap Matrix**: intersection areas of every reference/test pair and
//!   their row and column totals
//! - **Link Classification**: thresholded one-to-one, one-to-many and
//!   many-to-one correspondences
//! - **Metrics**: the nine counts `Tc, To, Tu, Co, Cu, Cm, Cf, Cr, Ct`
//! - **Drivers**: LIF (JSON) and `cat_info.xml` annotation readers
//! - **Export**: tab-delimited reports and masked segment images
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use segeval::{Thresholds, TypeFilter, evaluate};
//! use segeval::drivers::{default_drivers, load_with_any_driver};
//!
//! fn main() -> Result<(), segeval::Error> {
//!     let drivers = default_drivers();
//!     let filter = TypeFilter::new(["coin"]);
//!
//!     let reference = filter.apply(load_with_any_driver("reference.lif", &drivers)?);
//!     let test = filter.apply(load_with_any_driver("test.lif", &drivers)?);
//!
//!     let evaluation = evaluate(&reference, &test, &Thresholds::load(None)?)?;
//!     println!("{}", evaluation.metrics);
//!     Ok(())
//! }
//! ```
//!
//! ## Optional Features
//!
//! - `profiling`: Adds `tracing` spans around the evaluation stages

mod annotation;
mod config;
pub mod drivers;
mod error;
mod eval;
mod export;
mod geometry;
mod link;
mod metrics;
mod overlap;
mod segmenter;

pub use crate::{
    annotation::{Annotation, TypeFilter},
    config::{ENV_PREFIX, default_config_path},
    error::Error,
    eval::{Evaluation, evaluate},
    export::ReportWriter,
    geometry::{BoundingBox, Geometry, Shape, is_simple_contour},
    link::{LinkMatrix, Thresholds, classify_links},
    metrics::{FIELD_NAMES, SegmentationMetrics},
    overlap::{MarginVectors, OverlapMatrix},
    segmenter::{PixelRect, export_segments, filename_base, pixel_bounds, rasterize},
};

#[cfg(test)]
mod tests {
    #[ctor::ctor]
    fn init() {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .is_test(true)
            .try_init();
    }
}
