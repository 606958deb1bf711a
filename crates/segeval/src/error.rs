// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

use std::path::PathBuf;

/// Error type for segmentation evaluation.
///
/// Covers invalid geometry rejected at the annotation-source boundary,
/// caller-side contract violations inside the evaluation pipeline, and the
/// I/O, parsing and configuration failures of the surrounding tooling.
#[derive(Debug)]
pub enum Error {
    /// An I/O error occurred during file operations.
    IoError(std::io::Error),
    /// Configuration parsing or loading error.
    ConfigError(config::ConfigError),
    /// JSON serialization or deserialization error.
    JsonError(serde_json::Error),
    /// XML parsing error, including mismatched or unexpected tags.
    XmlError(String),
    /// Tab-delimited report writing error.
    CsvError(csv::Error),
    /// Image decoding or encoding error.
    ImageError(image::ImageError),
    /// A polygon contour crosses itself.
    SelfIntersectingPolygon(String),
    /// Lengths of the overlap matrix, margins and annotation lists disagree.
    DimensionMismatch(String),
    /// The file is not handled by the driver that was asked to read it.
    UnsupportedFile(PathBuf),
    /// No input driver could read the file.
    NoCompatibleDriver(PathBuf),
    /// An annotation label does not follow the expected grammar.
    InvalidLabel(String),
    /// Annotation type has no known file naming scheme.
    UnknownAnnotationType(String),
    /// A required annotation attribute is missing.
    MissingAttribute(String),
    /// Invalid parameters provided to an operation.
    InvalidParameters(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::ConfigError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonError(err)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlError(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlError(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::CsvError(err)
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageError(err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "I/O error: {}", e),
            Error::ConfigError(e) => write!(f, "Configuration error: {}", e),
            Error::JsonError(e) => write!(f, "JSON error: {}", e),
            Error::XmlError(s) => write!(f, "XML error: {}", s),
            Error::CsvError(e) => write!(f, "Report error: {}", e),
            Error::ImageError(e) => write!(f, "Image error: {}", e),
            Error::SelfIntersectingPolygon(s) => {
                write!(f, "Polygon is self-intersecting, and this is not supported: {}", s)
            }
            Error::DimensionMismatch(s) => write!(f, "Dimension mismatch: {}", s),
            Error::UnsupportedFile(p) => {
                write!(f, "File '{}' is of an unsupported format", p.display())
            }
            Error::NoCompatibleDriver(p) => write!(
                f,
                "File '{}' could not be read by any of the input drivers provided",
                p.display()
            ),
            Error::InvalidLabel(s) => write!(f, "Invalid annotation label: '{}'", s),
            Error::UnknownAnnotationType(s) => write!(f, "Unknown annotation type: {}", s),
            Error::MissingAttribute(s) => write!(f, "Missing annotation attribute: {}", s),
            Error::InvalidParameters(s) => write!(f, "Invalid parameters: {}", s),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            Error::ConfigError(e) => Some(e),
            Error::JsonError(e) => Some(e),
            Error::CsvError(e) => Some(e),
            Error::ImageError(e) => Some(e),
            _ => None,
        }
    }
}
