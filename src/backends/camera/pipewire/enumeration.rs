// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire camera enumeration and format detection
//!
//! Cameras are discovered with `pw-cli ls Node`, their facing is read from
//! `pw-cli info <id>` and their formats from `pw-cli enum-params <id>
//! EnumFormat`. The text parsers are kept separate from the subprocess calls.

use super::super::types::{CameraDevice, CameraFacing, CameraFormat, Framerate};
use tracing::{debug, info, warn};

/// Enumerate cameras using PipeWire
///
/// Returns `None` when GStreamer or `pipewiresrc` is unavailable. Only
/// nodes `pw-cli` actually lists are returned.
pub fn enumerate_pipewire_cameras() -> Option<Vec<CameraDevice>> {
    debug!("Attempting to enumerate cameras via PipeWire");

    if !is_pipewire_available() {
        warn!("pipewiresrc not available");
        return None;
    }

    match try_enumerate_with_pw_cli() {
        Some(cameras) => {
            debug!(count = cameras.len(), "Found PipeWire cameras");
            Some(cameras)
        }
        None => {
            info!("No PipeWire cameras listed");
            Some(Vec::new())
        }
    }
}

fn try_enumerate_with_pw_cli() -> Option<Vec<CameraDevice>> {
    debug!("Trying pw-cli for camera enumeration");

    let stdout = run_pw_cli(&["ls", "Node"])?;
    let mut cameras = Vec::new();

    for (mut camera, location) in parse_node_entries(&stdout) {
        let node_id = camera.node_id.clone();
        camera.facing = resolve_facing(location.as_deref(), || {
            node_id.as_deref().and_then(query_node_location)
        });
        debug!(name = %camera.name, path = %camera.path, facing = %camera.facing, "Found video camera");
        cameras.push(camera);
    }

    if cameras.is_empty() {
        debug!("No cameras found via pw-cli");
        None
    } else {
        Some(cameras)
    }
}

fn run_pw_cli(args: &[&str]) -> Option<String> {
    let output = std::process::Command::new("pw-cli")
        .args(args)
        .output()
        .ok()?;

    if !output.status.success() {
        debug!(?args, "pw-cli command failed");
        return None;
    }

    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Node being accumulated while scanning `pw-cli ls Node` output
#[derive(Default)]
struct PendingNode {
    id: Option<String>,
    serial: Option<String>,
    name: Option<String>,
    location: Option<String>,
    is_video_source: bool,
}

impl PendingNode {
    fn into_entry(self) -> Option<(CameraDevice, Option<String>)> {
        if !self.is_video_source {
            return None;
        }
        let (id, name) = (self.id?, self.name?);

        // Prefer object.serial for target-object, fall back to node ID
        let path = match self.serial {
            Some(serial) => format!("pipewire-serial-{}", serial),
            None => format!("pipewire-{}", id),
        };

        let facing = self
            .location
            .as_deref()
            .map(CameraFacing::from_location)
            .unwrap_or_default();

        Some((
            CameraDevice {
                name,
                path,
                node_id: Some(id),
                facing,
            },
            self.location,
        ))
    }
}

/// Parse `pw-cli ls Node` output into video source devices, in listing order
pub fn parse_pw_cli_nodes(stdout: &str) -> Vec<CameraDevice> {
    parse_node_entries(stdout)
        .into_iter()
        .map(|(device, _)| device)
        .collect()
}

/// Video source devices with the location `ls Node` reported for each
fn parse_node_entries(stdout: &str) -> Vec<(CameraDevice, Option<String>)> {
    let mut cameras = Vec::new();
    let mut current = PendingNode::default();

    for line in stdout.lines() {
        let trimmed = line.trim();

        // "id 76, type PipeWire:Interface:Node/3"
        if trimmed.starts_with("id ") && trimmed.contains("type PipeWire:Interface:Node") {
            if let Some(device) = std::mem::take(&mut current).into_entry() {
                cameras.push(device);
            }

            if let Some(id_str) = trimmed.strip_prefix("id ")
                && let Some(id_num) = id_str.split(',').next()
            {
                current.id = Some(id_num.trim().to_string());
            }
            continue;
        }

        if trimmed.contains("media.class") && trimmed.contains("\"Video/Source\"") {
            current.is_video_source = true;
        } else if trimmed.contains("object.serial") {
            current.serial = extract_quoted_value(trimmed);
        } else if trimmed.contains("node.description") {
            current.name = extract_quoted_value(trimmed);
        } else if trimmed.contains("api.libcamera.location") {
            current.location = extract_quoted_value(trimmed);
        }
    }

    if let Some(device) = current.into_entry() {
        cameras.push(device);
    }

    cameras
}

/// Extract quoted value from a property line (e.g., 'property = "value"' -> "value")
fn extract_quoted_value(line: &str) -> Option<String> {
    let start = line.find('"')?;
    let end = line[start + 1..].find('"')?;
    Some(line[start + 1..start + 1 + end].to_string())
}

/// Facing from the listed location, asking `query` only when none was listed
fn resolve_facing(
    listed_location: Option<&str>,
    query: impl FnOnce() -> Option<String>,
) -> CameraFacing {
    match listed_location {
        Some(location) => CameraFacing::from_location(location),
        None => query()
            .map(|location| CameraFacing::from_location(&location))
            .unwrap_or_default(),
    }
}

/// Query a node's location; `pw-cli ls Node` often omits the libcamera properties
fn query_node_location(node_id: &str) -> Option<String> {
    match run_pw_cli(&["info", node_id]) {
        Some(stdout) => parse_node_location(&stdout),
        None => {
            debug!(node_id, "Failed to query node info for location");
            None
        }
    }
}

/// Find `api.libcamera.location = "front"` in `pw-cli info` output
pub fn parse_node_location(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| line.contains("api.libcamera.location"))
        .and_then(extract_quoted_value)
}

/// Get supported formats for a PipeWire camera
///
/// Empty when the node cannot be queried; formats are never guessed.
pub fn get_pipewire_formats(device: &CameraDevice) -> Vec<CameraFormat> {
    debug!(path = %device.path, node_id = ?device.node_id, "Getting PipeWire formats");

    if let Some(node_id) = device.node_id.as_deref() {
        let formats = run_pw_cli(&["enum-params", node_id, "EnumFormat"])
            .map(|stdout| parse_enum_formats(&stdout))
            .unwrap_or_default();
        if !formats.is_empty() {
            info!(count = formats.len(), node_id = %node_id, "Enumerated formats via pw-cli");
            return formats;
        }
        warn!(node_id = %node_id, "Failed to enumerate formats from node");
    } else {
        warn!(path = %device.path, "No node ID for format enumeration");
    }

    Vec::new()
}

/// Format group being accumulated while scanning `pw-cli enum-params` output
#[derive(Default)]
struct PendingFormat {
    width: Option<u32>,
    height: Option<u32>,
    framerates: Vec<Framerate>,
    subtype: Option<String>,
    video_format: Option<String>,
}

impl PendingFormat {
    fn flush_into(&mut self, formats: &mut Vec<CameraFormat>) {
        let pending = std::mem::take(self);
        let (Some(width), Some(height), Some(subtype)) =
            (pending.width, pending.height, pending.subtype)
        else {
            return;
        };

        // Raw formats carry a VideoFormat, compressed ones only a subtype
        let pixel_format = if subtype == "raw" {
            pending.video_format.unwrap_or_else(|| "YUY2".to_string())
        } else {
            subtype.to_uppercase()
        };

        if pending.framerates.is_empty() {
            // libcamera negotiates framerate itself
            formats.push(CameraFormat {
                width,
                height,
                framerate: None,
                pixel_format,
            });
        } else {
            for fps in pending.framerates {
                formats.push(CameraFormat {
                    width,
                    height,
                    framerate: Some(fps),
                    pixel_format: pixel_format.clone(),
                });
            }
        }
    }
}

/// Parse `pw-cli enum-params <id> EnumFormat` output
pub fn parse_enum_formats(stdout: &str) -> Vec<CameraFormat> {
    let mut formats = Vec::new();
    let mut current = PendingFormat::default();

    for line in stdout.lines() {
        let trimmed = line.trim();

        // Each "Object:" line opens a new format group
        if trimmed.starts_with("Object:") {
            current.flush_into(&mut formats);
            continue;
        }

        // Id 131074   (Spa:Enum:MediaSubtype:mjpg)
        if trimmed.contains("Spa:Enum:MediaSubtype:")
            && let Some(start) = trimmed.rfind(':')
        {
            current.subtype = Some(trimmed[start + 1..].trim_end_matches(')').to_lowercase());
        }

        // Id 4   (Spa:Enum:VideoFormat:YUY2)
        if trimmed.contains("Spa:Enum:VideoFormat:")
            && let Some(start) = trimmed.rfind(':')
        {
            current.video_format =
                Some(trimmed[start + 1..].trim_end_matches(')').to_uppercase());
        }

        // Rectangle 1920x1080
        if let Some(res_str) = trimmed.strip_prefix("Rectangle ")
            && let Some((w_str, h_str)) = res_str.split_once('x')
        {
            current.width = w_str.trim().parse().ok();
            current.height = h_str.trim().parse().ok();
        }

        // Fraction 30/1 or Fraction 60000/1001
        if let Some(frac_str) = trimmed.strip_prefix("Fraction ")
            && let Some((num_str, denom_str)) = frac_str.split_once('/')
            && let (Ok(num), Ok(denom)) = (num_str.trim().parse::<u32>(), denom_str.trim().parse::<u32>())
            && denom > 0
        {
            let fps = Framerate::new(num, denom);
            if !current.framerates.iter().any(|f| f.as_int() == fps.as_int()) {
                current.framerates.push(fps);
            }
        }
    }

    current.flush_into(&mut formats);
    formats
}

/// Test if PipeWire is available and working
pub fn is_pipewire_available() -> bool {
    if gstreamer::init().is_err() {
        return false;
    }
    gstreamer::ElementFactory::find("pipewiresrc").is_some()
}
