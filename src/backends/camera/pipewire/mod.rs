// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire camera backend
//!
//! Uses PipeWire for camera enumeration and format detection, and a
//! GStreamer `pipewiresrc` pipeline for the preview stream.

mod enumeration;
mod pipeline;

pub use enumeration::{
    enumerate_pipewire_cameras, get_pipewire_formats, is_pipewire_available, parse_enum_formats,
    parse_node_location, parse_pw_cli_nodes,
};
pub use pipeline::{PreviewPipeline, build_pipeline_string};

use super::CameraBackend;
use super::types::*;
use tracing::{debug, info};

/// PipeWire backend implementation
pub struct PipeWireBackend {
    /// Cameras seen by the last `enumerate_cameras`, indexed by `open`
    cameras: Vec<CameraDevice>,
    /// Currently open camera device
    current_device: Option<CameraDevice>,
    /// Formats offered by the open camera
    formats: Vec<CameraFormat>,
    /// Format chosen through `set_preview_size`
    current_format: Option<CameraFormat>,
    orientation: DisplayOrientation,
    /// Active GStreamer pipeline for preview
    pipeline: Option<PreviewPipeline>,
}

impl PipeWireBackend {
    /// Create a new PipeWire backend
    pub fn new() -> Self {
        Self {
            cameras: Vec::new(),
            current_device: None,
            formats: Vec::new(),
            current_format: None,
            orientation: DisplayOrientation::default(),
            pipeline: None,
        }
    }
}

impl Default for PipeWireBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the best format for a resolution: highest framerate, then driver order
fn best_format_for(formats: &[CameraFormat], size: CameraResolution) -> Option<CameraFormat> {
    formats
        .iter()
        .filter(|f| f.resolution() == size)
        .fold(None::<&CameraFormat>, |best, candidate| match best {
            Some(current)
                if candidate.framerate.map(|f| f.as_f64()).unwrap_or(0.0)
                    <= current.framerate.map(|f| f.as_f64()).unwrap_or(0.0) =>
            {
                Some(current)
            }
            _ => Some(candidate),
        })
        .cloned()
}

/// An open camera needs at least one enumerated format
fn require_formats(
    device: &CameraDevice,
    formats: Vec<CameraFormat>,
) -> BackendResult<Vec<CameraFormat>> {
    if formats.is_empty() {
        return Err(BackendError::FormatNotSupported(format!(
            "No formats available for camera: {}",
            device.name
        )));
    }
    Ok(formats)
}

impl CameraBackend for PipeWireBackend {
    fn enumerate_cameras(&mut self) -> Vec<CameraDevice> {
        info!("Using PipeWire backend for camera enumeration");

        self.cameras = match enumerate_pipewire_cameras() {
            Some(cameras) => {
                info!(count = cameras.len(), "PipeWire cameras enumerated");
                cameras
            }
            None => {
                info!("PipeWire enumeration returned None");
                Vec::new()
            }
        };
        self.cameras.clone()
    }

    fn open(&mut self, index: usize) -> BackendResult<()> {
        let device = self
            .cameras
            .get(index)
            .cloned()
            .ok_or_else(|| BackendError::DeviceNotFound(format!("camera index {}", index)))?;

        if !is_pipewire_available() {
            return Err(BackendError::NotAvailable(
                "pipewiresrc GStreamer element not found".to_string(),
            ));
        }

        let formats = require_formats(&device, get_pipewire_formats(&device))?;

        info!(device = %device.name, formats = formats.len(), "Opened camera");
        self.current_device = Some(device);
        self.formats = formats;
        self.current_format = None;
        Ok(())
    }

    fn release(&mut self) -> BackendResult<()> {
        let stopped = match self.pipeline.take() {
            Some(pipeline) => pipeline.stop(),
            None => Ok(()),
        };

        if let Some(device) = self.current_device.take() {
            info!(device = %device.name, "Released camera");
        }
        self.formats.clear();
        self.current_format = None;
        stopped
    }

    fn is_open(&self) -> bool {
        self.current_device.is_some()
    }

    fn supported_preview_sizes(&self) -> BackendResult<Vec<CameraResolution>> {
        if !self.is_open() {
            return Err(BackendError::NotOpen);
        }
        Ok(distinct_resolutions(&self.formats))
    }

    fn set_preview_size(&mut self, size: CameraResolution) -> BackendResult<()> {
        if !self.is_open() {
            return Err(BackendError::NotOpen);
        }
        let format = best_format_for(&self.formats, size).ok_or_else(|| {
            BackendError::FormatNotSupported(format!("{} is not a supported preview size", size))
        })?;

        debug!(format = %format, "Preview format selected");
        self.current_format = Some(format);
        Ok(())
    }

    fn set_display_orientation(&mut self, orientation: DisplayOrientation) -> BackendResult<()> {
        if !self.is_open() {
            return Err(BackendError::NotOpen);
        }
        self.orientation = orientation;
        Ok(())
    }

    fn start_preview(&mut self, sink: FrameSender) -> BackendResult<()> {
        let device = self.current_device.as_ref().ok_or(BackendError::NotOpen)?;
        let format = self
            .current_format
            .as_ref()
            .ok_or_else(|| BackendError::Other("No preview size set".to_string()))?;

        if let Some(previous) = self.pipeline.take() {
            previous.stop()?;
        }

        self.pipeline = Some(PreviewPipeline::new(
            device,
            format,
            self.orientation,
            sink,
        )?);
        Ok(())
    }

    fn stop_preview(&mut self) -> BackendResult<()> {
        match self.pipeline.take() {
            Some(pipeline) => pipeline.stop(),
            None => Ok(()),
        }
    }

    fn is_previewing(&self) -> bool {
        self.pipeline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(width: u32, height: u32, fps: Option<u32>) -> CameraFormat {
        CameraFormat {
            width,
            height,
            framerate: fps.map(Framerate::from_int),
            pixel_format: "MJPG".to_string(),
        }
    }

    #[test]
    fn test_best_format_prefers_highest_framerate() {
        let formats = vec![
            fmt(1280, 720, Some(30)),
            fmt(640, 480, Some(90)),
            fmt(1280, 720, Some(60)),
            fmt(1280, 720, Some(15)),
        ];
        let best = best_format_for(&formats, CameraResolution::new(1280, 720));
        assert_eq!(best, Some(fmt(1280, 720, Some(60))));
    }

    #[test]
    fn test_best_format_missing_size() {
        let formats = vec![fmt(640, 480, None)];
        assert_eq!(
            best_format_for(&formats, CameraResolution::new(1920, 1080)),
            None
        );
    }

    #[test]
    fn test_open_without_formats_fails() {
        let device = CameraDevice {
            name: "Silent".to_string(),
            path: "pipewire-70".to_string(),
            node_id: Some("70".to_string()),
            facing: CameraFacing::Front,
        };
        let err = require_formats(&device, Vec::new()).unwrap_err();
        assert!(matches!(err, BackendError::FormatNotSupported(_)));
        assert_eq!(
            crate::errors::CameraError::from(err),
            crate::errors::CameraError::CameraUnavailable(
                "Format not supported: No formats available for camera: Silent".to_string()
            )
        );

        let formats = vec![fmt(640, 480, None)];
        assert_eq!(require_formats(&device, formats.clone()), Ok(formats));
    }

    #[test]
    fn test_open_only_indexes_enumerated_cameras() {
        // Nothing enumerated yet: no index is valid
        let mut backend = PipeWireBackend::new();
        assert!(matches!(
            backend.open(0),
            Err(BackendError::DeviceNotFound(_))
        ));
        assert!(!backend.is_open());
    }

    #[test]
    fn test_unopened_backend_rejects_configuration() {
        let mut backend = PipeWireBackend::new();
        assert!(!backend.is_open());
        assert_eq!(
            backend.supported_preview_sizes(),
            Err(BackendError::NotOpen)
        );
        assert_eq!(
            backend.set_preview_size(CameraResolution::new(640, 480)),
            Err(BackendError::NotOpen)
        );
        assert!(backend.release().is_ok());
    }
}
