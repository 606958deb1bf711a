// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

use clap::{Parser, Subcommand};
use log::{debug, info};
use segeval::{
    Annotation, Error, ReportWriter, Thresholds, TypeFilter,
    drivers::{default_drivers, load_with_any_driver},
    evaluate, export_segments,
};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[clap(long, short, global = true)]
    debug: bool,

    /// Segmentation Command
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Command {
    /// Print the segeval version.
    Version,
    /// Evaluate a test segmentation against a reference segmentation and
    /// print the segmentation counts.  Both files are read with the first
    /// driver supporting them (LIF or cat_info XML).
    Evaluate {
        /// Reference (ground truth) segmentation file
        reference: PathBuf,

        /// Test segmentation file
        test: PathBuf,

        /// Only consider annotations of this type, may be repeated.  All
        /// types are considered if none is given.
        #[clap(long = "type", short = 't')]
        types: Vec<String>,

        /// Write the results to a tab-delimited report file
        #[clap(long, short)]
        output: Option<PathBuf>,

        /// Threshold configuration file (TOML)
        #[clap(long)]
        config: Option<PathBuf>,

        /// Minimum share of a region's total overlap for a pair to be
        /// considered
        #[clap(long)]
        threshold_relative: Option<f64>,

        /// Share of the reference region's area the overlap must exceed
        #[clap(long)]
        threshold_ref: Option<f64>,

        /// Share of the test region's area the overlap must exceed
        #[clap(long)]
        threshold_test: Option<f64>,
    },
    /// Export every annotated region of an image as a masked crop together
    /// with its polygon in crop coordinates.
    Segment {
        /// Image the segmentation was made on
        base_image: PathBuf,

        /// Segmentation file
        seg_file: PathBuf,

        /// Directory receiving the segments, created if needed
        output_dir: PathBuf,

        /// Only export annotations of this type, may be repeated
        #[clap(long = "type", short = 't')]
        types: Vec<String>,
    },
}

// Command handler functions

fn handle_version() -> Result<(), Error> {
    println!("segeval {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_evaluate(
    reference: PathBuf,
    test: PathBuf,
    types: Vec<String>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    threshold_relative: Option<f64>,
    threshold_ref: Option<f64>,
    threshold_test: Option<f64>,
) -> Result<(), Error> {
    require_file(&reference)?;
    require_file(&test)?;

    let mut thresholds = Thresholds::load(config.as_deref())?;
    if let Some(value) = threshold_relative {
        thresholds.threshold_relative = value;
    }
    if let Some(value) = threshold_ref {
        thresholds.threshold_ref = value;
    }
    if let Some(value) = threshold_test {
        thresholds.threshold_test = value;
    }
    thresholds.validate()?;

    let filter = TypeFilter::new(types);
    let reference_annotations = load(&reference, &filter)?;
    let test_annotations = load(&test, &filter)?;

    let evaluation = evaluate(&reference_annotations, &test_annotations, &thresholds)?;
    let metrics = &evaluation.metrics;
    info!(
        "Evaluated '{}' against '{}': Tc={} To={} Tu={} Co={} Cu={} Cm={} Cf={} Cr={} Ct={}",
        test.display(),
        reference.display(),
        metrics.total_correct,
        metrics.total_over,
        metrics.total_under,
        metrics.over_components,
        metrics.under_components,
        metrics.missed_components,
        metrics.false_alarm_components,
        metrics.reference_count,
        metrics.test_count
    );
    println!("{}", metrics);

    if let Some(output) = output {
        let mut report = ReportWriter::create(&output)?;
        report.write(
            &reference.display().to_string(),
            &test.display().to_string(),
            metrics,
        )?;
        report.into_inner()?;
        info!("Report written to '{}'.", output.display());
    }

    Ok(())
}

fn handle_segment(
    base_image: PathBuf,
    seg_file: PathBuf,
    output_dir: PathBuf,
    types: Vec<String>,
) -> Result<(), Error> {
    require_file(&base_image)?;
    require_file(&seg_file)?;

    let annotations = load(&seg_file, &TypeFilter::new(types))?;
    std::fs::create_dir_all(&output_dir)?;

    let written = export_segments(&base_image, &annotations, &output_dir)?;
    info!(
        "Exported {} file(s) for {} annotation(s) to '{}'.",
        written.len(),
        annotations.len(),
        output_dir.display()
    );
    Ok(())
}

fn require_file(path: &Path) -> Result<(), Error> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::InvalidParameters(format!(
            "input file '{}' does not exist",
            path.display()
        )))
    }
}

fn load(path: &Path, filter: &TypeFilter) -> Result<Vec<Annotation>, Error> {
    let annotations = load_with_any_driver(path, &default_drivers())?;
    let total = annotations.len();
    let annotations = filter.apply(annotations);
    debug!(
        "Loaded {} annotation(s) from '{}', {} kept by the type filter.",
        total,
        path.display(),
        annotations.len()
    );
    Ok(annotations)
}

#[cfg(feature = "profiling")]
fn init_profiling() {
    use tracing_subscriber::fmt::format::FmtSpan;

    let subscriber = tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(tracing_subscriber::EnvFilter::new("segeval=trace"))
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        log::warn!("Failed to install tracing subscriber: {}", err);
    }
}

fn main() -> Result<(), Error> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    debug!("segeval {}", env!("CARGO_PKG_VERSION"));
    debug!("{:?}", args);

    #[cfg(feature = "profiling")]
    init_profiling();

    match args.cmd {
        Command::Version => handle_version(),
        Command::Evaluate {
            reference,
            test,
            types,
            output,
            config,
            threshold_relative,
            threshold_ref,
            threshold_test,
        } => handle_evaluate(
            reference,
            test,
            types,
            output,
            config,
            threshold_relative,
            threshold_ref,
            threshold_test,
        ),
        Command::Segment {
            base_image,
            seg_file,
            output_dir,
            types,
        } => handle_segment(base_image, seg_file, output_dir, types),
    }
}
