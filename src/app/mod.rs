// SPDX-License-Identifier: GPL-3.0-only

//! Preview application logic
//!
//! The [`PreviewController`] owns the camera for the lifetime of the
//! surface and reacts to [`SurfaceEvent`]s dispatched by the host surface.

mod controller;
mod surface;

pub use controller::{PreviewController, PreviewOptions, PreviewPlan, find_front_camera};
pub use surface::SurfaceEvent;
