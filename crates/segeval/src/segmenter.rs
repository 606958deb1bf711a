// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Export of annotated image regions.
//!
//! For every annotation, the image region under its bounding box is cropped,
//! pixels outside the annotation polygon are cleared, and two files are
//! written to the output directory:
//!
//! - `NNN-<name>.<ext>`: the masked crop, in the input image format
//! - `NNN-<name>.msk`: the polygon in crop coordinates, one contour per line
//!
//! `NNN` is the 1-based annotation index and `<name>` is derived from the
//! annotation type and attributes (see [`filename_base`]).

use crate::{
    Error,
    annotation::Annotation,
    geometry::{Geometry, Shape},
};
use image::{DynamicImage, GenericImageView, GrayImage, ImageBuffer, Luma, Pixel};
use imageproc::{drawing::draw_polygon_mut, point::Point};
use itertools::Itertools;
use log::{debug, error, warn};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

const DEFAULT_EXTENSION: &str = "png";

/// Pixel-aligned crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Pixel rectangle covering a shape, clamped to the image.
///
/// Returns `None` if the shape has no surface inside the image.
pub fn pixel_bounds<S: Geometry>(shape: &S, width: u32, height: u32) -> Option<PixelRect> {
    let bbox = shape.bounding_box()?;
    let x0 = bbox.x_min.floor().clamp(0.0, width as f64) as u32;
    let y0 = bbox.y_min.floor().clamp(0.0, height as f64) as u32;
    let x1 = bbox.x_max.ceil().clamp(0.0, width as f64) as u32;
    let y1 = bbox.y_max.ceil().clamp(0.0, height as f64) as u32;
    if bbox.is_empty() || x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(PixelRect {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    })
}

/// File name stem for an annotation.
///
/// - `coin`: `c` + first letter of `side` + `id` (e.g. `ca101`)
/// - `label`: `l` + `id`
/// - `text`: `t` + `id`
/// - `noise`: `n`
pub fn filename_base(kind: &str, attributes: &BTreeMap<String, String>) -> Result<String, Error> {
    let attribute = |key: &str| {
        attributes
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| Error::MissingAttribute(format!("'{}' on {} annotation", key, kind)))
    };
    match kind {
        "coin" => {
            let side = attribute("side")?.chars().next().ok_or_else(|| {
                Error::MissingAttribute(format!("'side' on {} annotation is empty", kind))
            })?;
            Ok(format!("c{}{}", side, attribute("id")?))
        }
        "label" => Ok(format!("l{}", attribute("id")?)),
        "text" => Ok(format!("t{}", attribute("id")?)),
        "noise" => Ok("n".to_owned()),
        _ => Err(Error::UnknownAnnotationType(format!(
            "t={}; attr={:?}",
            kind, attributes
        ))),
    }
}

/// Crop and mask every annotation of `image_path` into `output_dir`.
///
/// Annotations without surface inside the image are skipped. Returns the
/// paths of the written files.
pub fn export_segments<P, Q>(
    image_path: P,
    annotations: &[Annotation],
    output_dir: Q,
) -> Result<Vec<PathBuf>, Error>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let image_path = image_path.as_ref();
    let output_dir = output_dir.as_ref();

    let image = image::open(image_path)?;
    let (width, height) = image.dimensions();
    let extension = match image_path.extension().and_then(|e| e.to_str()) {
        Some(extension) if !extension.is_empty() => extension.to_owned(),
        _ => {
            warn!(
                "Cannot detect input image format, will use {} format.",
                DEFAULT_EXTENSION.to_uppercase()
            );
            DEFAULT_EXTENSION.to_owned()
        }
    };

    let mut written = Vec::new();
    for (index, annotation) in annotations.iter().enumerate() {
        let number = index + 1;
        debug!(
            "Processing annotation {:03} with type {}",
            number, annotation.kind
        );

        let Some(roi) = pixel_bounds(&annotation.shape, width, height) else {
            error!(
                "Annotation {:03} was skipped because its area is null.",
                number
            );
            error!("\t polygon: {}", annotation.shape);
            continue;
        };

        let base = format!(
            "{:03}-{}",
            number,
            filename_base(&annotation.kind, &annotation.attributes)?
        );
        let image_file = output_dir.join(format!("{}.{}", base, extension));
        let mask_file = output_dir.join(format!("{}.msk", base));

        let shape = annotation.shape.translate(-(roi.x as f64), -(roi.y as f64));
        let mask = rasterize(&shape, roi.width, roi.height);
        let crop = image.crop_imm(roi.x, roi.y, roi.width, roi.height);
        apply_mask(crop, &mask).save(&image_file)?;
        write_mask_file(&mask_file, &shape)?;

        written.push(image_file);
        written.push(mask_file);
    }

    Ok(written)
}

/// Binary mask of a shape: 255 inside, 0 outside.
pub fn rasterize(shape: &Shape, width: u32, height: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for contour in shape.contours() {
        fill_ring(&mut mask, &contour, 255);
    }
    for hole in shape.holes() {
        fill_ring(&mut mask, &hole, 0);
    }
    mask
}

fn fill_ring(mask: &mut GrayImage, ring: &[(f64, f64)], value: u8) {
    let mut points: Vec<Point<i32>> = ring
        .iter()
        .map(|&(x, y)| Point::new(x.round() as i32, y.round() as i32))
        .collect();
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() >= 3 {
        draw_polygon_mut(mask, &points, Luma([value]));
    }
}

fn apply_mask(image: DynamicImage, mask: &GrayImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(mut buffer) => {
            clear_outside(&mut buffer, mask);
            DynamicImage::ImageLuma8(buffer)
        }
        DynamicImage::ImageLumaA8(mut buffer) => {
            clear_outside(&mut buffer, mask);
            DynamicImage::ImageLumaA8(buffer)
        }
        DynamicImage::ImageRgb8(mut buffer) => {
            clear_outside(&mut buffer, mask);
            DynamicImage::ImageRgb8(buffer)
        }
        DynamicImage::ImageRgba8(mut buffer) => {
            clear_outside(&mut buffer, mask);
            DynamicImage::ImageRgba8(buffer)
        }
        other if other.color().has_alpha() => {
            let mut buffer = other.to_rgba8();
            clear_outside(&mut buffer, mask);
            DynamicImage::ImageRgba8(buffer)
        }
        other => {
            let mut buffer = other.to_rgb8();
            clear_outside(&mut buffer, mask);
            DynamicImage::ImageRgb8(buffer)
        }
    }
}

fn clear_outside<P>(buffer: &mut ImageBuffer<P, Vec<u8>>, mask: &GrayImage)
where
    P: Pixel<Subpixel = u8>,
{
    for (x, y, pixel) in buffer.enumerate_pixels_mut() {
        if mask.get_pixel(x, y)[0] == 0 {
            pixel.apply(|_| 0);
        }
    }
}

fn write_mask_file(path: &Path, shape: &Shape) -> Result<(), Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    for contour in shape.contours() {
        let line = contour
            .iter()
            .map(|(x, y)| format!("({:.2},{:.2})", x, y))
            .join(";");
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn attributes(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_filename_base() {
        assert_eq!(
            filename_base("coin", &attributes(&[("side", "avers"), ("id", "101")])).unwrap(),
            "ca101"
        );
        assert_eq!(
            filename_base("label", &attributes(&[("id", "7")])).unwrap(),
            "l7"
        );
        assert_eq!(
            filename_base("text", &attributes(&[("id", "3")])).unwrap(),
            "t3"
        );
        assert_eq!(filename_base("noise", &BTreeMap::new()).unwrap(), "n");
        assert!(matches!(
            filename_base("stamp", &BTreeMap::new()),
            Err(Error::UnknownAnnotationType(_))
        ));
        assert!(matches!(
            filename_base("label", &BTreeMap::new()),
            Err(Error::MissingAttribute(_))
        ));
    }

    #[test]
    fn test_pixel_bounds() {
        let shape = Shape::rectangle(2.5, 3.2, 4.0, 4.0);
        assert_eq!(
            pixel_bounds(&shape, 100, 100),
            Some(PixelRect {
                x: 2,
                y: 3,
                width: 5,
                height: 5
            })
        );

        // Clamped to the image.
        let shape = Shape::rectangle(90.0, 90.0, 20.0, 20.0);
        assert_eq!(
            pixel_bounds(&shape, 100, 100),
            Some(PixelRect {
                x: 90,
                y: 90,
                width: 10,
                height: 10
            })
        );

        // Outside or flat shapes have no crop.
        assert!(pixel_bounds(&Shape::rectangle(200.0, 0.0, 5.0, 5.0), 100, 100).is_none());
        assert!(pixel_bounds(&Shape::rectangle(10.0, 10.0, 0.0, 5.0), 100, 100).is_none());
    }

    #[test]
    fn test_rasterize_triangle() {
        let shape = Shape::from_contour([(0.0, 0.0), (9.0, 0.0), (0.0, 9.0)]).unwrap();
        let mask = rasterize(&shape, 10, 10);
        assert_eq!(mask.get_pixel(1, 1)[0], 255);
        assert_eq!(mask.get_pixel(9, 9)[0], 0);
    }

    #[test]
    fn test_export_segments() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("page.png");
        RgbImage::from_pixel(40, 30, Rgb([200, 100, 50]))
            .save(&image_path)
            .unwrap();

        let annotations = vec![
            Annotation::new(
                Shape::from_contour([(0.0, 0.0), (20.0, 0.0), (0.0, 20.0)]).unwrap(),
                "coin",
            )
            .with_attribute("side", "revers")
            .with_attribute("id", "12"),
            Annotation::new(Shape::rectangle(500.0, 500.0, 5.0, 5.0), "noise"),
            Annotation::new(Shape::rectangle(25.0, 5.0, 10.0, 10.0), "label").with_attribute("id", "4"),
        ];

        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        let written = export_segments(&image_path, &annotations, &out).unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["001-cr12.png", "001-cr12.msk", "003-l4.png", "003-l4.msk"]);

        let crop = image::open(out.join("001-cr12.png")).unwrap().to_rgb8();
        assert_eq!(crop.dimensions(), (20, 20));
        assert_eq!(crop.get_pixel(2, 2), &Rgb([200, 100, 50]));
        assert_eq!(crop.get_pixel(19, 19), &Rgb([0, 0, 0]));

        let msk = std::fs::read_to_string(out.join("003-l4.msk")).unwrap();
        assert_eq!(msk.lines().count(), 1);
        assert!(msk.contains("(0.00,0.00)"));
        assert!(msk.contains("(10.00,10.00)"));
    }
}
