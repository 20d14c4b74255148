// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │ PreviewController   │  ← Surface lifecycle, size selection, transform
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │    CameraHandle     │  ← Exclusive ownership, idempotent release
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  CameraBackend Trait│  ← Common interface
//! └──────────┬──────────┘
//!            │
//!            ▼
//!       ┌────────┐
//!       │PipeWire│  ← Concrete implementation
//!       └────────┘
//! ```

pub mod handle;
pub mod pipewire;
pub mod types;

pub use handle::CameraHandle;
pub use types::*;

/// Camera backend trait
///
/// Mirrors the lifecycle of a single preview camera: enumerate, open one
/// device, configure it, bind its preview to a frame sink, and release it.
pub trait CameraBackend {
    // ===== Enumeration =====

    /// Enumerate available cameras
    ///
    /// The returned list is the one `open` indexes into until the next call.
    fn enumerate_cameras(&mut self) -> Vec<CameraDevice>;

    // ===== Lifecycle =====

    /// Open the camera at `index` in the last enumeration for exclusive use
    fn open(&mut self, index: usize) -> BackendResult<()>;

    /// Release the open camera, stopping any active preview
    ///
    /// Releasing a backend that is not open is a no-op.
    fn release(&mut self) -> BackendResult<()>;

    /// Check if a camera is currently open
    fn is_open(&self) -> bool;

    // ===== Configuration =====

    /// Preview resolutions supported by the open camera, in driver order
    fn supported_preview_sizes(&self) -> BackendResult<Vec<CameraResolution>>;

    /// Select the preview resolution used by the next `start_preview`
    fn set_preview_size(&mut self, size: CameraResolution) -> BackendResult<()>;

    /// Rotate the preview output before it reaches the sink
    fn set_display_orientation(&mut self, orientation: DisplayOrientation) -> BackendResult<()>;

    // ===== Preview =====

    /// Bind the preview output to `sink` and start streaming frames
    fn start_preview(&mut self, sink: FrameSender) -> BackendResult<()>;

    /// Stop streaming; the camera stays open
    fn stop_preview(&mut self) -> BackendResult<()>;

    /// Check if frames are currently being streamed
    fn is_previewing(&self) -> bool;
}

/// Get the default backend (PipeWire)
pub fn get_backend() -> Box<dyn CameraBackend> {
    Box::new(pipewire::PipeWireBackend::new())
}
