// SPDX-License-Identifier: GPL-3.0-only

//! Exclusive owner of the open camera
//!
//! The camera device is a single resource: acquired once during
//! initialization and released exactly once, whichever of surface
//! destruction, controller teardown or an initialization error comes first.

use super::types::*;
use super::CameraBackend;
use crate::errors::CameraError;
use tracing::{debug, info, warn};

/// Owns a camera backend and guarantees a single release
pub struct CameraHandle {
    backend: Box<dyn CameraBackend>,
    acquired: bool,
}

impl CameraHandle {
    /// Wrap a backend; nothing is opened until [`CameraHandle::acquire`]
    pub fn new(backend: Box<dyn CameraBackend>) -> Self {
        Self {
            backend,
            acquired: false,
        }
    }

    /// Open the camera at `index` for exclusive use
    ///
    /// A previously acquired camera is released first.
    pub fn acquire(&mut self, index: usize) -> Result<(), CameraError> {
        if self.acquired {
            debug!("Camera already acquired, releasing before re-acquire");
            self.release();
        }

        info!(index, "Acquiring camera");
        self.backend
            .open(index)
            .map_err(|e| CameraError::CameraUnavailable(e.to_string()))?;
        self.acquired = true;
        Ok(())
    }

    /// Stop the preview and release the camera
    ///
    /// Returns `true` if this call released the device, `false` if it was
    /// already released (or never acquired).
    pub fn release(&mut self) -> bool {
        if !self.acquired {
            debug!("Camera release requested but nothing is held");
            return false;
        }
        self.acquired = false;

        if self.backend.is_previewing()
            && let Err(e) = self.backend.stop_preview()
        {
            warn!(error = %e, "Failed to stop preview during release");
        }
        if let Err(e) = self.backend.release() {
            warn!(error = %e, "Backend reported an error while releasing camera");
        }

        info!("Camera released");
        true
    }

    /// Check if the camera is currently held
    pub fn is_acquired(&self) -> bool {
        self.acquired
    }

    /// Enumerate cameras through the wrapped backend
    ///
    /// Indexes passed to [`CameraHandle::acquire`] refer to this list.
    pub fn enumerate_cameras(&mut self) -> Vec<CameraDevice> {
        self.backend.enumerate_cameras()
    }

    /// Borrow the backend for configuration calls
    ///
    /// Fails with [`BackendError::NotOpen`] once the camera is released, so
    /// a stale callback can never reach a closed device.
    pub fn backend_mut(&mut self) -> BackendResult<&mut dyn CameraBackend> {
        if !self.acquired {
            return Err(BackendError::NotOpen);
        }
        Ok(self.backend.as_mut())
    }

    /// Borrow the backend read-only
    pub fn backend(&self) -> &dyn CameraBackend {
        self.backend.as_ref()
    }
}

impl Drop for CameraHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for CameraHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraHandle")
            .field("acquired", &self.acquired)
            .field("previewing", &self.backend.is_previewing())
            .finish_non_exhaustive()
    }
}
