// SPDX-License-Identifier: GPL-3.0-only

//! Render surface lifecycle events

/// Lifecycle notification from the surface hosting the preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The surface exists and can receive frames
    Created,
    /// The surface was resized; sizes are in surface pixels
    Changed { width: u32, height: u32 },
    /// The surface is gone; nothing may be drawn to it anymore
    Destroyed,
}

impl std::fmt::Display for SurfaceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceEvent::Created => write!(f, "created"),
            SurfaceEvent::Changed { width, height } => write!(f, "changed ({}x{})", width, height),
            SurfaceEvent::Destroyed => write!(f, "destroyed"),
        }
    }
}
