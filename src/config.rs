// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Read once at startup from `$XDG_CONFIG_HOME/frontcam/config.json`. The
//! file is optional and never written by the application.

use crate::backends::camera::DisplayOrientation;
use crate::constants::{preview, terminal};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Clockwise preview rotation in degrees (multiple of 90)
    pub display_orientation: i32,
    /// Mirror camera preview horizontally (selfie mode)
    pub mirror_preview: bool,
    /// Use a camera without a reported location when no camera says "front"
    pub accept_external_camera: bool,
    /// Aspect-ratio tolerance for preview size selection
    pub aspect_tolerance: f64,
    /// Redraw / input poll interval
    pub frame_poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_orientation: preview::DISPLAY_ORIENTATION_DEGREES,
            mirror_preview: true, // Default to mirrored (selfie mode)
            accept_external_camera: true,
            aspect_tolerance: preview::ASPECT_TOLERANCE,
            frame_poll_interval_ms: terminal::DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("frontcam").join("config.json"))
    }

    /// Load the configuration
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// tried and a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => {
                    debug!("No config directory, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                info!(path = %path.display(), "Loading configuration");
                Self::from_json(&contents)
            }
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(AppError::Config(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Parse and validate a JSON document; absent fields take their defaults
    pub fn from_json(contents: &str) -> AppResult<Self> {
        let config: Config =
            serde_json::from_str(contents).map_err(|e| AppError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        self.orientation()?;
        if !(self.aspect_tolerance.is_finite() && self.aspect_tolerance >= 0.0) {
            return Err(AppError::Config(format!(
                "aspect_tolerance must be a non-negative number, got {}",
                self.aspect_tolerance
            )));
        }
        if self.frame_poll_interval_ms == 0 {
            return Err(AppError::Config(
                "frame_poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Preview rotation as a typed orientation
    pub fn orientation(&self) -> AppResult<DisplayOrientation> {
        DisplayOrientation::from_degrees(self.display_orientation).ok_or_else(|| {
            AppError::Config(format!(
                "display_orientation must be a multiple of 90, got {}",
                self.display_orientation
            ))
        })
    }
}
