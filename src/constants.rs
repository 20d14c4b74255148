// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Preview geometry constants
pub mod preview {
    /// Maximum difference between a candidate's width/height ratio and the
    /// display's height/width ratio for the candidate to count as matching
    pub const ASPECT_TOLERANCE: f64 = 0.1;

    /// Preview rotation applied to the camera output, in degrees clockwise
    pub const DISPLAY_ORIENTATION_DEGREES: i32 = 90;
}

/// Terminal surface constants
pub mod terminal {
    /// Vertical pixels per terminal cell when drawing with half blocks
    pub const PIXELS_PER_CELL_Y: u32 = 2;

    /// Rows reserved below the preview for the status bar
    pub const STATUS_BAR_ROWS: u16 = 1;

    /// Default input poll interval (~60 redraws per second)
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 16;

    /// Capacity of the frame channel between the pipeline and the surface
    pub const FRAME_CHANNEL_CAPACITY: usize = 4;
}

/// GStreamer pipeline constants
pub mod pipeline {
    /// Maximum buffer queue size (keep small for low latency)
    pub const MAX_BUFFERS: u32 = 2;

    /// Get number of threads for videoconvert based on available CPU threads
    pub fn videoconvert_threads() -> u32 {
        std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(4)
    }

    /// Output pixel format for appsink
    pub const OUTPUT_FORMAT: &str = "RGBA";
}

/// Timing constants
pub mod timing {
    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;

    /// GStreamer state change timeout on start; async transitions are accepted
    pub const STATE_CHANGE_TIMEOUT_MS: u64 = 50;

    /// Pipeline state change timeout on stop
    pub const STOP_TIMEOUT_SECS: u64 = 2;
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_orientation_is_quarter_turn() {
        assert_eq!(preview::DISPLAY_ORIENTATION_DEGREES % 90, 0);
    }
}
