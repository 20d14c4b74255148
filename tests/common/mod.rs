// SPDX-License-Identifier: GPL-3.0-only

//! Scripted in-memory camera backend for controller tests

#![allow(dead_code)]

use frontcam::backends::camera::{
    BackendError, BackendResult, CameraBackend, CameraDevice, CameraFacing, CameraFrame,
    CameraResolution, DisplayOrientation, FrameSender,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

/// Every call the controller made into the backend
#[derive(Debug, Default)]
pub struct CallLog {
    pub enumerations: usize,
    pub opens: Vec<usize>,
    pub releases: usize,
    pub preview_sizes: Vec<CameraResolution>,
    pub orientations: Vec<DisplayOrientation>,
    pub starts: usize,
    pub stops: usize,
}

pub struct ScriptedBackend {
    cameras: Vec<CameraDevice>,
    sizes: Vec<CameraResolution>,
    fail_open: bool,
    fail_start: bool,
    open: Option<usize>,
    preview_size: Option<CameraResolution>,
    sink: Option<FrameSender>,
    log: Rc<RefCell<CallLog>>,
}

impl ScriptedBackend {
    pub fn new(cameras: Vec<CameraDevice>, sizes: Vec<CameraResolution>) -> Self {
        Self {
            cameras,
            sizes,
            fail_open: false,
            fail_start: false,
            open: None,
            preview_size: None,
            sink: None,
            log: Rc::new(RefCell::new(CallLog::default())),
        }
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Shared view of the call log, readable after the backend is boxed
    pub fn log(&self) -> Rc<RefCell<CallLog>> {
        Rc::clone(&self.log)
    }
}

pub fn device(name: &str, facing: CameraFacing) -> CameraDevice {
    CameraDevice {
        name: name.to_string(),
        path: format!("pipewire-serial-{}", name.len()),
        node_id: None,
        facing,
    }
}

pub fn sizes(list: &[(u32, u32)]) -> Vec<CameraResolution> {
    list.iter()
        .map(|&(w, h)| CameraResolution::new(w, h))
        .collect()
}

/// Solid grey RGBA frame
pub fn frame(width: u32, height: u32) -> CameraFrame {
    CameraFrame {
        width,
        height,
        stride: width * 4,
        data: Arc::from(vec![128u8; (width * height * 4) as usize]),
        captured_at: Instant::now(),
    }
}

impl CameraBackend for ScriptedBackend {
    fn enumerate_cameras(&mut self) -> Vec<CameraDevice> {
        self.log.borrow_mut().enumerations += 1;
        self.cameras.clone()
    }

    fn open(&mut self, index: usize) -> BackendResult<()> {
        self.log.borrow_mut().opens.push(index);
        if self.fail_open {
            return Err(BackendError::NotAvailable("device busy".to_string()));
        }
        if index >= self.cameras.len() {
            return Err(BackendError::DeviceNotFound(format!("camera index {}", index)));
        }
        self.open = Some(index);
        Ok(())
    }

    fn release(&mut self) -> BackendResult<()> {
        self.log.borrow_mut().releases += 1;
        self.open = None;
        self.preview_size = None;
        self.sink = None;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn supported_preview_sizes(&self) -> BackendResult<Vec<CameraResolution>> {
        if !self.is_open() {
            return Err(BackendError::NotOpen);
        }
        Ok(self.sizes.clone())
    }

    fn set_preview_size(&mut self, size: CameraResolution) -> BackendResult<()> {
        if !self.sizes.contains(&size) {
            return Err(BackendError::FormatNotSupported(size.to_string()));
        }
        self.log.borrow_mut().preview_sizes.push(size);
        self.preview_size = Some(size);
        Ok(())
    }

    fn set_display_orientation(&mut self, orientation: DisplayOrientation) -> BackendResult<()> {
        self.log.borrow_mut().orientations.push(orientation);
        Ok(())
    }

    fn start_preview(&mut self, mut sink: FrameSender) -> BackendResult<()> {
        self.log.borrow_mut().starts += 1;
        if self.fail_start {
            return Err(BackendError::PipelineFailed("no pipewiresrc".to_string()));
        }
        let size = self.preview_size.ok_or(BackendError::NotOpen)?;
        // Rotated 90°, as the real pipeline delivers it
        sink.try_send(frame(size.height, size.width))
            .map_err(|e| BackendError::Other(e.to_string()))?;
        self.sink = Some(sink);
        Ok(())
    }

    fn stop_preview(&mut self) -> BackendResult<()> {
        self.log.borrow_mut().stops += 1;
        self.sink = None;
        Ok(())
    }

    fn is_previewing(&self) -> bool {
        self.sink.is_some()
    }
}
