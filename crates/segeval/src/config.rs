// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Threshold configuration loading.
//!
//! # Configuration
//!
//! Sources are layered, later ones overriding earlier ones:
//!
//! 1. Built-in defaults (`0.2`, `0.5`, `0.5`)
//! 2. A TOML file: the path given by the caller (must exist), otherwise
//!    `segeval.toml` in the user configuration directory (optional)
//! 3. Environment variables:
//!    - `SEGEVAL_THRESHOLD_RELATIVE`
//!    - `SEGEVAL_THRESHOLD_REF`
//!    - `SEGEVAL_THRESHOLD_TEST`
//!
//! ```toml
//! threshold_relative = 0.2
//! threshold_ref = 0.5
//! threshold_test = 0.5
//! ```

use crate::{Error, link::Thresholds};
use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use log::debug;
use std::path::{Path, PathBuf};

/// Environment variable prefix for threshold overrides.
pub const ENV_PREFIX: &str = "SEGEVAL";

/// Default configuration file location, if the platform provides one.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("ai", "EdgeFirst", "segeval")
        .map(|dirs| dirs.config_dir().join("segeval.toml"))
}

impl Thresholds {
    /// Load thresholds from defaults, a configuration file and the
    /// environment, then validate them.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let defaults = Thresholds::default();
        let mut builder = Config::builder()
            .set_default("threshold_relative", defaults.threshold_relative)?
            .set_default("threshold_ref", defaults.threshold_ref)?
            .set_default("threshold_test", defaults.threshold_test)?;

        builder = match path {
            Some(path) => {
                debug!("Loading thresholds from '{}'.", path.display());
                builder.add_source(File::from(path).format(FileFormat::Toml).required(true))
            }
            None => match default_config_path() {
                Some(path) => {
                    debug!("Looking for thresholds in '{}'.", path.display());
                    builder.add_source(File::from(path).format(FileFormat::Toml).required(false))
                }
                None => builder,
            },
        };

        let thresholds: Thresholds = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        thresholds.validate()?;

        debug!(
            "Thresholds: relative={} ref={} test={}",
            thresholds.threshold_relative, thresholds.threshold_ref, thresholds.threshold_test
        );
        Ok(thresholds)
    }
}
