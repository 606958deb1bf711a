// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! LIF (labelled image file) driver.
//!
//! LIF files are JSON documents listing labelled polygons:
//!
//! ```json
//! {
//!   "shapes": [
//!     { "label": "ca101", "points": [[10, 10], [60, 10], [60, 60], [10, 60]] },
//!     { "label": "l101",  "points": [[70, 10], [90, 10], [90, 20], [70, 20]] }
//!   ]
//! }
//! ```
//!
//! Labels encode the annotation type in their first character:
//!
//! - `c<side><id>`: coin, side is `a` (avers), `r` (revers) or `i` (isolated)
//! - `l<id>`: label
//! - `t<id>`: text
//! - `n`: noise

use super::{InputDriver, has_extension};
use crate::{Error, annotation::Annotation, geometry::Shape};
use serde::Deserialize;
use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

const SUFFIX: &str = "lif";

#[derive(Debug, Deserialize)]
struct LifDocument {
    shapes: Vec<LifShape>,
}

#[derive(Debug, Deserialize)]
struct LifShape {
    label: String,
    points: Vec<[f64; 2]>,
}

/// Driver for `.lif` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifDriver;

impl LifDriver {
    /// Split a LIF label into its annotation type and attributes.
    pub fn parse_label(label: &str) -> Result<(String, BTreeMap<String, String>), Error> {
        let invalid = || Error::InvalidLabel(label.to_owned());
        let mut chars = label.chars();
        let kind = match chars.next().ok_or_else(invalid)? {
            'c' => "coin",
            'l' => "label",
            't' => "text",
            'n' => "noise",
            _ => return Err(invalid()),
        };

        let mut attributes = BTreeMap::new();
        match kind {
            "coin" => {
                let side = match chars.next().ok_or_else(invalid)? {
                    'a' => "avers",
                    'r' => "revers",
                    'i' => "isolated",
                    _ => return Err(invalid()),
                };
                let id = chars.as_str();
                if id.is_empty() {
                    return Err(invalid());
                }
                attributes.insert("side".to_owned(), side.to_owned());
                attributes.insert("id".to_owned(), id.to_owned());
            }
            "label" | "text" => {
                let id = chars.as_str();
                if id.is_empty() {
                    return Err(invalid());
                }
                attributes.insert("id".to_owned(), id.to_owned());
            }
            _ => {}
        }

        Ok((kind.to_owned(), attributes))
    }
}

impl InputDriver for LifDriver {
    fn name(&self) -> &'static str {
        "lif"
    }

    fn load(&self, path: &Path) -> Result<Vec<Annotation>, Error> {
        if !has_extension(path, SUFFIX) {
            return Err(Error::UnsupportedFile(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let document: LifDocument = serde_json::from_reader(BufReader::new(file))?;

        document
            .shapes
            .into_iter()
            .map(|shape| {
                let outline = Shape::from_contour(shape.points.iter().map(|&[x, y]| (x, y)))?;
                let (kind, attributes) = Self::parse_label(&shape.label)?;
                Ok(Annotation {
                    shape: outline,
                    kind,
                    attributes,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use std::io::Write;

    #[test]
    fn test_parse_coin_labels() {
        let (kind, attributes) = LifDriver::parse_label("ca101").unwrap();
        assert_eq!(kind, "coin");
        assert_eq!(attributes["side"], "avers");
        assert_eq!(attributes["id"], "101");

        let (_, attributes) = LifDriver::parse_label("cr7").unwrap();
        assert_eq!(attributes["side"], "revers");
        let (_, attributes) = LifDriver::parse_label("ci42").unwrap();
        assert_eq!(attributes["side"], "isolated");
    }

    #[test]
    fn test_parse_other_labels() {
        let (kind, attributes) = LifDriver::parse_label("l12").unwrap();
        assert_eq!(kind, "label");
        assert_eq!(attributes["id"], "12");

        let (kind, attributes) = LifDriver::parse_label("t3").unwrap();
        assert_eq!(kind, "text");
        assert_eq!(attributes["id"], "3");

        let (kind, attributes) = LifDriver::parse_label("n").unwrap();
        assert_eq!(kind, "noise");
        assert!(attributes.is_empty());
    }

    #[test]
    fn test_parse_invalid_labels() {
        for label in ["", "x1", "c", "ca", "cx1", "l", "t"] {
            assert!(
                matches!(LifDriver::parse_label(label), Err(Error::InvalidLabel(_))),
                "label {:?} should be rejected",
                label
            );
        }
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::Builder::new().suffix(".LIF").tempfile().unwrap();
        write!(
            file,
            r#"{{"shapes": [
                {{"label": "ca1", "points": [[0, 0], [10, 0], [10, 10], [0, 10]]}},
                {{"label": "n", "points": [[20, 0], [30, 0], [25, 5]]}}
            ]}}"#
        )
        .unwrap();

        let annotations = LifDriver.load(file.path()).unwrap();
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].kind, "coin");
        assert_eq!(annotations[0].attribute("id"), Some("1"));
        assert!((annotations[0].shape.area() - 100.0).abs() < 1e-9);
        assert_eq!(annotations[1].kind, "noise");
        assert!((annotations[1].shape.area() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_self_intersecting_polygon_rejected() {
        let mut file = tempfile::Builder::new().suffix(".lif").tempfile().unwrap();
        write!(
            file,
            r#"{{"shapes": [{{"label": "l1", "points": [[0, 0], [10, 10], [10, 0], [0, 10]]}}]}}"#
        )
        .unwrap();
        assert!(matches!(
            LifDriver.load(file.path()),
            Err(Error::SelfIntersectingPolygon(_))
        ));
    }

    #[test]
    fn test_other_extensions_unsupported() {
        assert!(matches!(
            LifDriver.load(Path::new("annotations.xml")),
            Err(Error::UnsupportedFile(_))
        ));
    }
}
