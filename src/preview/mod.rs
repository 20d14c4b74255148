// SPDX-License-Identifier: GPL-3.0-only

//! Preview geometry: size selection and the cover transform

pub mod size_selector;
pub mod transform;

pub use size_selector::{select_best_size, select_best_size_with_tolerance};
pub use transform::{TransformMatrix, compute_transform};

/// Display size in pixels, read once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayDimensions {
    pub width: u32,
    pub height: u32,
}

impl DisplayDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width and height exchanged
    pub const fn swapped(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

impl std::fmt::Display for DisplayDimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
