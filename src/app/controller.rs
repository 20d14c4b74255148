// SPDX-License-Identifier: GPL-3.0-only

//! Preview controller
//!
//! Drives the camera through one preview session:
//!
//! 1. pick the front camera and acquire it
//! 2. choose the preview size closest to the display and configure it
//! 3. compute the cover transform for that size
//! 4. start/stop the stream as the surface is created and destroyed
//!
//! The camera lives in a [`CameraHandle`], so it is released exactly once
//! whether the surface goes away first, initialization fails, or the
//! controller is simply dropped.

use super::SurfaceEvent;
use crate::backends::camera::{
    CameraBackend, CameraDevice, CameraFacing, CameraFrame, CameraHandle, CameraResolution,
    DisplayOrientation, FrameReceiver,
};
use crate::config::Config;
use crate::constants::{preview, terminal, timing};
use crate::errors::{AppResult, CameraError};
use crate::preview::{
    DisplayDimensions, TransformMatrix, compute_transform, select_best_size_with_tolerance,
};
use futures::channel::mpsc;
use tracing::{debug, info, warn};

/// Tunables for a preview session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewOptions {
    /// Rotation applied to the camera output
    pub orientation: DisplayOrientation,
    /// Aspect-ratio tolerance for size selection
    pub aspect_tolerance: f64,
    /// Fall back to a camera without a location when none reports "front"
    pub accept_external_camera: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            orientation: DisplayOrientation::default(),
            aspect_tolerance: preview::ASPECT_TOLERANCE,
            accept_external_camera: true,
        }
    }
}

impl PreviewOptions {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(Self {
            orientation: config.orientation()?,
            aspect_tolerance: config.aspect_tolerance,
            accept_external_camera: config.accept_external_camera,
        })
    }
}

/// Outcome of initialization: which camera, which size, which transform
#[derive(Debug, Clone)]
pub struct PreviewPlan {
    /// Index of the camera in enumeration order
    pub camera_index: usize,
    pub device: CameraDevice,
    /// Sizes the camera reported, in driver order
    pub supported_sizes: Vec<CameraResolution>,
    /// Size the camera was configured with (a member of `supported_sizes`)
    pub preview_size: CameraResolution,
    /// Cover transform, in the camera's axes
    pub transform: TransformMatrix,
}

/// Find the camera to preview
///
/// The first camera reporting a front location wins. Otherwise, when
/// `accept_external` is set, the first camera without a location is used;
/// back cameras are never picked.
pub fn find_front_camera(
    cameras: &[CameraDevice],
    accept_external: bool,
) -> Result<usize, CameraError> {
    if let Some(index) = cameras.iter().position(|c| c.facing == CameraFacing::Front) {
        return Ok(index);
    }

    if accept_external
        && let Some(index) = cameras
            .iter()
            .position(|c| c.facing == CameraFacing::External)
    {
        debug!(
            camera = %cameras[index].name,
            "No camera reports a front location, using external camera"
        );
        return Ok(index);
    }

    Err(CameraError::NoFrontCameraFound)
}

/// Owns the camera and the preview geometry for one surface
pub struct PreviewController {
    camera: CameraHandle,
    display: DisplayDimensions,
    options: PreviewOptions,
    plan: Option<PreviewPlan>,
    frames: Option<FrameReceiver>,
    frames_received: u64,
}

impl PreviewController {
    pub fn new(
        backend: Box<dyn CameraBackend>,
        display: DisplayDimensions,
        options: PreviewOptions,
    ) -> Self {
        Self {
            camera: CameraHandle::new(backend),
            display,
            options,
            plan: None,
            frames: None,
            frames_received: 0,
        }
    }

    /// Open and configure the front camera
    ///
    /// On any failure the camera is released before the error is returned.
    pub fn initialize(&mut self) -> AppResult<&PreviewPlan> {
        match self.configure_camera() {
            Ok(plan) => {
                info!(
                    device = %plan.device.name,
                    size = %plan.preview_size,
                    display = %self.display,
                    transform = %plan.transform,
                    "Preview configured"
                );
                Ok(self.plan.insert(plan))
            }
            Err(e) => {
                warn!(error = %e, "Preview initialization failed");
                self.camera.release();
                Err(e)
            }
        }
    }

    fn configure_camera(&mut self) -> AppResult<PreviewPlan> {
        let cameras = self.camera.enumerate_cameras();
        let camera_index = find_front_camera(&cameras, self.options.accept_external_camera)?;
        let device = cameras[camera_index].clone();
        info!(device = %device.name, facing = %device.facing, "Selected camera");

        self.camera.acquire(camera_index)?;

        let view = self.sensor_view();
        let orientation = self.options.orientation;
        let backend = self.camera.backend_mut()?;

        let supported_sizes = backend.supported_preview_sizes()?;
        debug!(count = supported_sizes.len(), "Camera preview sizes");

        // The selector's target uses the portrait convention (height/width),
        // so the camera-axis view goes in transposed.
        let preview_size = select_best_size_with_tolerance(
            &supported_sizes,
            view.height,
            view.width,
            self.options.aspect_tolerance,
        )?;

        backend.set_preview_size(preview_size)?;
        backend.set_display_orientation(orientation)?;

        let transform = compute_transform(preview_size, view.width, view.height);

        Ok(PreviewPlan {
            camera_index,
            device,
            supported_sizes,
            preview_size,
            transform,
        })
    }

    /// Display dimensions expressed in the camera's axes
    fn sensor_view(&self) -> DisplayDimensions {
        if self.options.orientation.swaps_dimensions() {
            self.display.swapped()
        } else {
            self.display
        }
    }

    /// React to a surface lifecycle notification
    ///
    /// A failure to bind the preview on `Created` is logged and returned as
    /// [`CameraError::PreviewBindFailed`]; the controller stays usable and
    /// the camera stays held until `Destroyed`.
    pub fn handle_surface_event(&mut self, event: SurfaceEvent) -> Result<(), CameraError> {
        debug!(%event, "Surface event");
        match event {
            SurfaceEvent::Created => self
                .start_preview()
                .inspect_err(|e| warn!(error = %e, "Preview did not start")),
            SurfaceEvent::Changed { width, height } => {
                debug!(width, height, "Surface changed, preview geometry unchanged");
                Ok(())
            }
            SurfaceEvent::Destroyed => {
                if self.camera.release() {
                    info!("Surface destroyed, camera released");
                }
                self.frames = None;
                Ok(())
            }
        }
    }

    fn start_preview(&mut self) -> Result<(), CameraError> {
        if self.plan.is_none() {
            return Err(CameraError::PreviewBindFailed(
                "preview is not initialized".to_string(),
            ));
        }

        let backend = self
            .camera
            .backend_mut()
            .map_err(|e| CameraError::PreviewBindFailed(e.to_string()))?;

        let (sender, receiver) = mpsc::channel(terminal::FRAME_CHANNEL_CAPACITY);
        backend
            .start_preview(sender)
            .map_err(|e| CameraError::PreviewBindFailed(e.to_string()))?;

        self.frames = Some(receiver);
        info!("Preview started");
        Ok(())
    }

    /// Newest frame from the preview, discarding older queued ones
    pub fn latest_frame(&mut self) -> Option<CameraFrame> {
        let frames = self.frames.as_mut()?;
        let mut latest: Option<CameraFrame> = None;
        while let Ok(frame) = frames.try_recv() {
            self.frames_received += 1;
            if self.frames_received % timing::FRAME_LOG_INTERVAL == 0 {
                debug!(
                    frame = self.frames_received,
                    latency_ms = frame.captured_at.elapsed().as_millis() as u64,
                    "Frame latency"
                );
            }
            latest = Some(frame);
        }
        latest
    }

    /// Frames pulled from the preview so far, including skipped ones
    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    /// Release the camera now instead of at drop
    pub fn shutdown(&mut self) -> bool {
        self.frames = None;
        self.camera.release()
    }

    pub fn plan(&self) -> Option<&PreviewPlan> {
        self.plan.as_ref()
    }

    /// Cover transform in the camera's axes (identity before initialization)
    pub fn transform(&self) -> TransformMatrix {
        self.plan
            .as_ref()
            .map(|plan| plan.transform)
            .unwrap_or_default()
    }

    /// Cover transform in the display's axes
    pub fn display_transform(&self) -> TransformMatrix {
        self.transform().oriented(self.options.orientation)
    }

    pub fn display(&self) -> DisplayDimensions {
        self.display
    }

    pub fn options(&self) -> &PreviewOptions {
        &self.options
    }

    /// Check if the camera is still held
    pub fn is_camera_held(&self) -> bool {
        self.camera.is_acquired()
    }

    pub fn is_previewing(&self) -> bool {
        self.camera.is_acquired() && self.camera.backend().is_previewing()
    }
}

impl std::fmt::Debug for PreviewController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewController")
            .field("camera", &self.camera)
            .field("display", &self.display)
            .field("options", &self.options)
            .field("plan", &self.plan)
            .finish_non_exhaustive()
    }
}
