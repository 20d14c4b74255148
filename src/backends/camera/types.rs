// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Which way a camera points relative to the display
///
/// Parsed from libcamera's `api.libcamera.location` node property.
/// Cameras that do not report a location (most USB webcams) are `External`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CameraFacing {
    /// Faces the user (selfie camera)
    Front,
    /// Faces away from the user
    Back,
    /// Unknown or detachable camera
    #[default]
    External,
}

impl CameraFacing {
    /// Parse facing from a location property value
    pub fn from_location(location: &str) -> Self {
        match location.trim().to_ascii_lowercase().as_str() {
            "front" | "0" => CameraFacing::Front,
            "back" | "1" => CameraFacing::Back,
            _ => CameraFacing::External,
        }
    }
}

impl std::fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraFacing::Front => write!(f, "front"),
            CameraFacing::Back => write!(f, "back"),
            CameraFacing::External => write!(f, "external"),
        }
    }
}

/// Clockwise rotation applied to the preview before it reaches the surface
///
/// Mobile sensors are mounted landscape while the display is portrait, so the
/// preview is rotated 90° by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayOrientation {
    Rotate0,
    #[default]
    Rotate90,
    Rotate180,
    Rotate270,
}

impl DisplayOrientation {
    /// Create an orientation from a degree value (normalised to 0-360).
    ///
    /// Returns `None` for angles that are not a multiple of 90.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(DisplayOrientation::Rotate0),
            90 => Some(DisplayOrientation::Rotate90),
            180 => Some(DisplayOrientation::Rotate180),
            270 => Some(DisplayOrientation::Rotate270),
            _ => None,
        }
    }

    /// Get the rotation in degrees
    pub fn degrees(&self) -> u32 {
        match self {
            DisplayOrientation::Rotate0 => 0,
            DisplayOrientation::Rotate90 => 90,
            DisplayOrientation::Rotate180 => 180,
            DisplayOrientation::Rotate270 => 270,
        }
    }

    /// Check if rotation swaps width and height
    pub fn swaps_dimensions(&self) -> bool {
        matches!(
            self,
            DisplayOrientation::Rotate90 | DisplayOrientation::Rotate270
        )
    }

    /// GStreamer `videoflip` direction for this rotation
    pub fn videoflip_direction(&self) -> &'static str {
        match self {
            DisplayOrientation::Rotate0 => "identity",
            DisplayOrientation::Rotate90 => "90r",
            DisplayOrientation::Rotate180 => "180",
            DisplayOrientation::Rotate270 => "90l",
        }
    }
}

impl std::fmt::Display for DisplayOrientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// A camera-supported preview resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraResolution {
    pub width: u32,
    pub height: u32,
}

impl CameraResolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for CameraResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Represents a camera device
#[derive(Debug, Clone)]
pub struct CameraDevice {
    pub name: String,
    pub path: String,            // pipewiresrc target (pipewire-serial-N / pipewire-N)
    pub node_id: Option<String>, // PipeWire node ID, used for format enumeration
    pub facing: CameraFacing,
}

/// Framerate as a fraction (numerator/denominator)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Framerate {
    pub num: u32,
    pub denom: u32,
}

impl Framerate {
    /// Create a new framerate from numerator and denominator
    pub fn new(num: u32, denom: u32) -> Self {
        Self {
            num,
            denom: if denom == 0 { 1 } else { denom },
        }
    }

    /// Create a framerate from an integer (e.g., 30 becomes 30/1)
    pub fn from_int(fps: u32) -> Self {
        Self { num: fps, denom: 1 }
    }

    /// Get the framerate as a floating point value
    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.denom as f64
    }

    /// Get the rounded-down integer framerate
    pub fn as_int(&self) -> u32 {
        self.num / self.denom
    }

    /// Format as GStreamer fraction string (e.g., "60000/1001")
    pub fn as_gst_fraction(&self) -> String {
        format!("{}/{}", self.num, self.denom)
    }
}

impl std::fmt::Display for Framerate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.denom != 1 {
            write!(f, "{:.2}", self.as_f64())
        } else {
            write!(f, "{}", self.num)
        }
    }
}

/// A capture format offered by a camera
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFormat {
    pub width: u32,
    pub height: u32,
    pub framerate: Option<Framerate>, // None when the driver negotiates (libcamera)
    pub pixel_format: String,         // FourCC code (e.g., "MJPG", "YUY2", "NV12")
}

impl CameraFormat {
    pub fn resolution(&self) -> CameraResolution {
        CameraResolution::new(self.width, self.height)
    }
}

impl std::fmt::Display for CameraFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(fps) = &self.framerate {
            write!(
                f,
                "{}x{} @ {}fps ({})",
                self.width, self.height, fps, self.pixel_format
            )
        } else {
            write!(f, "{}x{} ({})", self.width, self.height, self.pixel_format)
        }
    }
}

/// Collapse a format list into the distinct resolutions, in enumeration order
pub fn distinct_resolutions(formats: &[CameraFormat]) -> Vec<CameraResolution> {
    let mut sizes: Vec<CameraResolution> = Vec::new();
    for format in formats {
        let size = format.resolution();
        if !sizes.contains(&size) {
            sizes.push(size);
        }
    }
    sizes
}

/// A single RGBA frame from the camera
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    pub data: Arc<[u8]>,
    /// Timestamp when frame was captured (for latency diagnostics)
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Read the RGB value at (x, y), clamped to the frame bounds
    pub fn rgb_at(&self, x: u32, y: u32) -> (u8, u8, u8) {
        if self.width == 0 || self.height == 0 {
            return (0, 0, 0);
        }
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let idx = (y * self.stride + x * 4) as usize;
        if idx + 2 < self.data.len() {
            (self.data[idx], self.data[idx + 1], self.data[idx + 2])
        } else {
            (0, 0, 0)
        }
    }
}

/// Frame receiver type for preview streams
pub type FrameReceiver = futures::channel::mpsc::Receiver<CameraFrame>;

/// Frame sender type for preview streams
pub type FrameSender = futures::channel::mpsc::Sender<CameraFrame>;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Backend is not available on this system
    NotAvailable(String),
    /// Camera device not found
    DeviceNotFound(String),
    /// Format not supported
    FormatNotSupported(String),
    /// Operation requires an open camera
    NotOpen,
    /// Preview pipeline could not be created or started
    PipelineFailed(String),
    /// Other errors
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::FormatNotSupported(msg) => write!(f, "Format not supported: {}", msg),
            BackendError::NotOpen => write!(f, "Camera is not open"),
            BackendError::PipelineFailed(msg) => write!(f, "Pipeline failed: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}
