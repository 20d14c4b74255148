// SPDX-License-Identifier: GPL-3.0-only

//! frontcam - live preview of the front-facing camera
//!
//! Opens the front camera through PipeWire, picks the supported preview
//! size that best matches the display, and draws the feed in the terminal
//! with a cover transform so the image fills the screen undistorted.
//!
//! # Architecture
//!
//! - [`app`]: Preview controller and surface lifecycle
//! - [`backends`]: Camera backend abstraction and the PipeWire backend
//! - [`preview`]: Preview size selection and the cover transform
//! - [`terminal`]: Terminal surface (half-block renderer)
//! - [`config`]: User configuration handling

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod preview;
pub mod terminal;

// Re-export commonly used types
pub use app::{PreviewController, PreviewOptions, PreviewPlan, SurfaceEvent};
pub use config::Config;
pub use errors::{AppError, AppResult, CameraError, PreviewError};
pub use preview::{DisplayDimensions, TransformMatrix, compute_transform, select_best_size};
