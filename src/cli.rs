// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! - Listing available cameras with their facing and preview formats
//! - Printing the preview plan (selected size and transform) for a display

use frontcam::backends::camera::pipewire::{enumerate_pipewire_cameras, get_pipewire_formats};
use frontcam::backends::camera::{CameraFormat, get_backend};
use frontcam::preview::transform::{MSCALE_X, MSCALE_Y, MTRANS_X, MTRANS_Y};
use frontcam::{Config, DisplayDimensions, PreviewController, PreviewOptions};

/// List all available cameras
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    gstreamer::init()?;

    let cameras = enumerate_pipewire_cameras().unwrap_or_default();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {} ({})", index, camera.name, camera.facing);

        let formats = get_pipewire_formats(camera);
        if !formats.is_empty() {
            println!("      Preview sizes: {}", summarize_formats(&formats).join(", "));
        }
        println!();
    }

    Ok(())
}

/// One "WxH@Nfps" entry per resolution, best framerate, driver order
fn summarize_formats(formats: &[CameraFormat]) -> Vec<String> {
    let mut resolutions: Vec<(u32, u32, u32)> = Vec::new();
    for format in formats {
        let fps = format.framerate.map(|f| f.as_int()).unwrap_or(30);
        if let Some(existing) = resolutions
            .iter_mut()
            .find(|(w, h, _)| *w == format.width && *h == format.height)
        {
            existing.2 = existing.2.max(fps);
        } else {
            resolutions.push((format.width, format.height, fps));
        }
    }

    resolutions
        .iter()
        .map(|(w, h, fps)| format!("{}x{}@{}fps", w, h, fps))
        .collect()
}

/// Select the preview size and transform for a display, without previewing
pub fn print_plan(
    config: &Config,
    width: u32,
    height: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = PreviewOptions::from_config(config)?;
    let display = DisplayDimensions::new(width, height);

    let mut controller = PreviewController::new(get_backend(), display, options);
    let plan = controller.initialize()?.clone();
    controller.shutdown();

    let values = plan.transform.values();
    let display_transform = plan.transform.oriented(options.orientation);

    println!("Camera:       [{}] {}", plan.camera_index, plan.device.name);
    println!("Display:      {}", display);
    println!("Orientation:  {}", options.orientation);
    println!(
        "Sizes:        {}",
        plan.supported_sizes
            .iter()
            .map(|size| size.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Preview size: {}", plan.preview_size);
    println!(
        "Transform:    scale=({}, {}) translate=({}, {})",
        values[MSCALE_X], values[MSCALE_Y], values[MTRANS_X], values[MTRANS_Y]
    );
    println!("On display:   {}", display_transform);

    Ok(())
}
