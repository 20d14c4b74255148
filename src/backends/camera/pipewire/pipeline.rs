// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire GStreamer pipeline for the camera preview
//!
//! `pipewiresrc` → decode → `videoconvert` to RGBA → `videoflip` for the
//! display orientation → `appsink`, whose callback forwards frames into the
//! surface's frame channel.

use super::super::types::*;
use crate::constants::{pipeline, timing};
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Running preview pipeline
///
/// Dropping the pipeline sets it to `Null`, which hands the device back to
/// PipeWire.
pub struct PreviewPipeline {
    pipeline: gstreamer::Pipeline,
    appsink: AppSink,
}

impl PreviewPipeline {
    /// Create and start a preview pipeline that feeds `frame_sender`
    pub fn new(
        device: &CameraDevice,
        format: &CameraFormat,
        orientation: DisplayOrientation,
        frame_sender: FrameSender,
    ) -> BackendResult<Self> {
        info!(
            device = %device.name,
            format = %format,
            orientation = %orientation,
            "Creating preview pipeline"
        );

        gstreamer::init().map_err(|e| BackendError::NotAvailable(e.to_string()))?;

        let description = build_pipeline_string(&device.path, format, orientation);
        info!(pipeline = %description, "Launching pipeline");

        let pipeline = gstreamer::parse::launch(&description)
            .map_err(|e| BackendError::PipelineFailed(e.to_string()))?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(|_| BackendError::PipelineFailed("Failed to cast to pipeline".to_string()))?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| BackendError::PipelineFailed("Failed to get appsink".to_string()))?
            .dynamic_cast::<AppSink>()
            .map_err(|_| BackendError::PipelineFailed("Failed to cast appsink".to_string()))?;

        appsink.set_property("emit-signals", true);
        appsink.set_property("sync", false);
        appsink.set_property("max-buffers", pipeline::MAX_BUFFERS);
        appsink.set_property("drop", true);
        appsink.set_property("enable-last-sample", false);

        appsink.set_callbacks(
            gstreamer_app::AppSinkCallbacks::builder()
                .new_sample(move |appsink| {
                    let frame_start = Instant::now();
                    let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);

                    let sample = appsink.pull_sample().map_err(|e| {
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            error!(frame = frame_num, error = ?e, "Failed to pull sample");
                        }
                        gstreamer::FlowError::Eos
                    })?;

                    let buffer = sample.buffer().ok_or(gstreamer::FlowError::Error)?;
                    let caps = sample.caps().ok_or(gstreamer::FlowError::Error)?;
                    let video_info =
                        VideoInfo::from_caps(caps).map_err(|_| gstreamer::FlowError::Error)?;
                    let map = buffer
                        .map_readable()
                        .map_err(|_| gstreamer::FlowError::Error)?;

                    let frame = CameraFrame {
                        width: video_info.width(),
                        height: video_info.height(),
                        stride: video_info.stride()[0] as u32,
                        data: Arc::from(map.as_slice()),
                        captured_at: frame_start,
                    };

                    // Non-blocking: a slow surface drops frames instead of stalling the camera
                    let mut sender = frame_sender.clone();
                    if let Err(e) = sender.try_send(frame)
                        && frame_num % timing::FRAME_LOG_INTERVAL == 0
                    {
                        debug!(frame = frame_num, error = ?e, "Frame dropped (channel full)");
                    }

                    Ok(gstreamer::FlowSuccess::Ok)
                })
                .build(),
        );

        pipeline.set_state(gstreamer::State::Playing).map_err(|e| {
            check_bus_for_errors(&pipeline);
            let _ = pipeline.set_state(gstreamer::State::Null);
            BackendError::PipelineFailed(format!("Failed to start pipeline: {}", e))
        })?;

        let (result, state, pending) = pipeline.state(gstreamer::ClockTime::from_mseconds(
            timing::STATE_CHANGE_TIMEOUT_MS,
        ));
        debug!(?result, ?state, ?pending, "Pipeline state");

        if result.is_err() {
            check_bus_for_errors(&pipeline);
            let _ = pipeline.set_state(gstreamer::State::Null);
            let _ = pipeline.state(gstreamer::ClockTime::from_seconds(
                timing::STOP_TIMEOUT_SECS,
            ));
            return Err(BackendError::PipelineFailed(format!(
                "Pipeline failed to reach PLAYING (state: {:?})",
                state
            )));
        }

        Ok(Self { pipeline, appsink })
    }

    /// Stop the pipeline and release the device
    pub fn stop(self) -> BackendResult<()> {
        info!("Stopping preview pipeline");

        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());

        self.pipeline
            .set_state(gstreamer::State::Null)
            .map_err(|e| BackendError::Other(format!("Failed to stop pipeline: {}", e)))?;

        let (result, state, _) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::STOP_TIMEOUT_SECS,
        ));
        match result {
            Ok(_) => info!(state = ?state, "Preview pipeline stopped"),
            Err(e) => debug!(error = ?e, state = ?state, "Pipeline state change had issues"),
        }

        Ok(())
    }
}

impl Drop for PreviewPipeline {
    fn drop(&mut self) {
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        let _ = self.pipeline.set_state(gstreamer::State::Null);
    }
}

/// Build the `gst-launch` style description for a preview pipeline
pub fn build_pipeline_string(
    device_path: &str,
    format: &CameraFormat,
    orientation: DisplayOrientation,
) -> String {
    let mut caps_filter = format!("width=(int){},height=(int){}", format.width, format.height);
    if let Some(fps) = format.framerate {
        caps_filter.push_str(&format!(",framerate=(fraction){}", fps.as_gst_fraction()));
    }

    let source_caps = match format.pixel_format.as_str() {
        "MJPG" | "MJPEG" => format!("image/jpeg,{} ! jpegparse ! jpegdec", caps_filter),
        "H264" => format!("video/x-h264,{} ! h264parse ! avdec_h264", caps_filter),
        "YUYV" => format!("video/x-raw,format=YUY2,{}", caps_filter),
        "" => format!("video/x-raw,{}", caps_filter),
        raw => format!("video/x-raw,format={},{}", raw, caps_filter),
    };

    format!(
        "pipewiresrc {}do-timestamp=true ! \
         {} ! \
         videoconvert n-threads={} ! \
         video/x-raw,format={} ! \
         videoflip video-direction={} ! \
         queue max-size-buffers={} leaky=downstream ! \
         appsink name=sink",
        target_object_property(device_path),
        source_caps,
        pipeline::videoconvert_threads(),
        pipeline::OUTPUT_FORMAT,
        orientation.videoflip_direction(),
        pipeline::MAX_BUFFERS
    )
}

/// Map a device path onto the `pipewiresrc` property selecting it
fn target_object_property(device_path: &str) -> String {
    if device_path.is_empty() {
        String::new()
    } else if let Some(serial) = device_path.strip_prefix("pipewire-serial-") {
        format!("target-object={} ", serial)
    } else if let Some(node_id) = device_path.strip_prefix("pipewire-") {
        format!("target-object={} ", node_id)
    } else if device_path.starts_with("/dev/video") {
        format!("path=v4l2:{} ", device_path)
    } else {
        warn!(device_path, "Unknown device path format, using path property");
        format!("path={} ", device_path)
    }
}

fn check_bus_for_errors(pipeline: &gstreamer::Pipeline) {
    if let Some(bus) = pipeline.bus()
        && let Some(msg) = bus.timed_pop_filtered(
            gstreamer::ClockTime::from_mseconds(100),
            &[gstreamer::MessageType::Error, gstreamer::MessageType::Warning],
        )
    {
        match msg.view() {
            gstreamer::MessageView::Error(err) => {
                error!(
                    error = %err.error(),
                    debug = ?err.debug(),
                    source = ?err.src().map(|s| s.name()),
                    "GStreamer ERROR during pipeline start"
                );
            }
            gstreamer::MessageView::Warning(warn_msg) => {
                warn!(
                    warning = %warn_msg.error(),
                    debug = ?warn_msg.debug(),
                    "GStreamer WARNING during pipeline start"
                );
            }
            _ => {}
        }
    }
}
