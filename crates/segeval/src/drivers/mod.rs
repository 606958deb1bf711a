// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Input drivers reading annotation files.
//!
//! Each driver turns one file format into an ordered list of
//! [`Annotation`]s. Drivers decide from the file name whether they handle a
//! file and return [`Error::UnsupportedFile`] otherwise, so several drivers
//! can be tried in turn with [`load_with_any_driver`].
//!
//! Drivers validate geometry: a self-intersecting polygon fails the whole
//! file with [`Error::SelfIntersectingPolygon`].
//!
//! # Example
//!
//! ```rust,no_run
//! use segeval::drivers::{default_drivers, load_with_any_driver};
//!
//! let annotations = load_with_any_driver("page_001.lif", &default_drivers())?;
//! println!("Loaded {} annotations", annotations.len());
//! # Ok::<(), segeval::Error>(())
//! ```

mod catinfo;
mod lif;

pub use catinfo::CatInfoDriver;
pub use lif::LifDriver;

use crate::{Error, annotation::Annotation};
use log::debug;
use std::path::Path;

/// A reader for one annotation file format.
pub trait InputDriver: Send + Sync {
    /// Human readable driver name, used in logs.
    fn name(&self) -> &'static str;

    /// Load a file into a sequence of annotations.
    ///
    /// Must return [`Error::UnsupportedFile`] if the file is not handled by
    /// this driver.
    fn load(&self, path: &Path) -> Result<Vec<Annotation>, Error>;
}

/// The drivers available out of the box, in probing order.
pub fn default_drivers() -> Vec<Box<dyn InputDriver>> {
    vec![Box::new(LifDriver), Box::new(CatInfoDriver)]
}

/// Load a file with the first driver that supports it.
///
/// Drivers are tried in order. Errors other than
/// [`Error::UnsupportedFile`] are returned immediately. If no driver
/// supports the file, [`Error::NoCompatibleDriver`] is returned.
pub fn load_with_any_driver<P: AsRef<Path>>(
    path: P,
    drivers: &[Box<dyn InputDriver>],
) -> Result<Vec<Annotation>, Error> {
    let path = path.as_ref();
    for driver in drivers {
        debug!(
            "Trying to open and load '{}' with driver '{}'.",
            path.display(),
            driver.name()
        );
        match driver.load(path) {
            Err(Error::UnsupportedFile(_)) => {
                debug!(
                    "Cannot read '{}' with driver '{}', trying next driver.",
                    path.display(),
                    driver.name()
                );
            }
            result => return result,
        }
    }
    Err(Error::NoCompatibleDriver(path.to_path_buf()))
}

/// Returns true if `path` has the given extension, ignoring case.
fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;
    use std::path::PathBuf;

    struct Fixed(&'static str);

    impl InputDriver for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn load(&self, path: &Path) -> Result<Vec<Annotation>, Error> {
            if !has_extension(path, self.0) {
                return Err(Error::UnsupportedFile(path.to_path_buf()));
            }
            Ok(vec![Annotation::new(Shape::rectangle(0.0, 0.0, 1.0, 1.0), self.0)])
        }
    }

    #[test]
    fn test_first_supporting_driver_wins() {
        let drivers: Vec<Box<dyn InputDriver>> = vec![Box::new(Fixed("abc")), Box::new(Fixed("xyz"))];
        let loaded = load_with_any_driver("file.XYZ", &drivers).unwrap();
        assert_eq!(loaded[0].kind, "xyz");
    }

    #[test]
    fn test_no_compatible_driver() {
        let drivers: Vec<Box<dyn InputDriver>> = vec![Box::new(Fixed("abc"))];
        let result = load_with_any_driver("file.txt", &drivers);
        assert!(matches!(result, Err(Error::NoCompatibleDriver(p)) if p == PathBuf::from("file.txt")));
    }

    #[test]
    fn test_driver_errors_propagate() {
        // The LIF driver accepts the extension, so the missing file is
        // reported as an I/O error rather than skipped.
        let result = load_with_any_driver("/nonexistent/file.lif", &default_drivers());
        assert!(matches!(result, Err(Error::IoError(_))));
    }
}
