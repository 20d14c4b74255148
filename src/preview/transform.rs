// SPDX-License-Identifier: GPL-3.0-only

//! Cover transform for the preview surface
//!
//! The preview surface is laid out at the view's size, which stretches the
//! camera image whenever the two aspect ratios differ. The transform scales
//! one axis up until the image is undistorted and covers the whole view,
//! then centers it, cropping the overflow equally on both sides.

use crate::backends::camera::{CameraResolution, DisplayOrientation};

/// Scale + translate affine transform
///
/// Maps a point `p` to `(p.x * scale_x + translate_x, p.y * scale_y + translate_y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformMatrix {
    pub scale_x: f32,
    pub scale_y: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

/// Index of the x scale in [`TransformMatrix::values`]
pub const MSCALE_X: usize = 0;
/// Index of the x translation in [`TransformMatrix::values`]
pub const MTRANS_X: usize = 2;
/// Index of the y scale in [`TransformMatrix::values`]
pub const MSCALE_Y: usize = 4;
/// Index of the y translation in [`TransformMatrix::values`]
pub const MTRANS_Y: usize = 5;

impl TransformMatrix {
    pub const fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }

    /// Concatenate a scale about the origin after this transform
    pub fn post_scale(self, sx: f32, sy: f32) -> Self {
        Self {
            scale_x: self.scale_x * sx,
            scale_y: self.scale_y * sy,
            translate_x: self.translate_x * sx,
            translate_y: self.translate_y * sy,
        }
    }

    /// Concatenate a translation after this transform
    pub fn post_translate(self, dx: f32, dy: f32) -> Self {
        Self {
            translate_x: self.translate_x + dx,
            translate_y: self.translate_y + dy,
            ..self
        }
    }

    /// Row-major 3x3 matrix
    pub fn values(&self) -> [f32; 9] {
        [
            self.scale_x,
            0.0,
            self.translate_x,
            0.0,
            self.scale_y,
            self.translate_y,
            0.0,
            0.0,
            1.0,
        ]
    }

    /// Apply the transform to a point
    pub fn map_point(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.scale_x + self.translate_x,
            y * self.scale_y + self.translate_y,
        )
    }

    /// Apply the inverse transform to a point
    ///
    /// Scales must be non-zero, which holds for every transform produced by
    /// [`compute_transform`].
    pub fn invert_point(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.translate_x) / self.scale_x,
            (y - self.translate_y) / self.scale_y,
        )
    }

    /// Re-express the transform in display axes
    ///
    /// [`compute_transform`] works in the sensor's axes. A quarter-turn
    /// swaps which display axis each component applies to; since the
    /// transform is a centered scale the swap is exact.
    pub fn oriented(&self, orientation: DisplayOrientation) -> Self {
        if orientation.swaps_dimensions() {
            Self {
                scale_x: self.scale_y,
                scale_y: self.scale_x,
                translate_x: self.translate_y,
                translate_y: self.translate_x,
            }
        } else {
            *self
        }
    }
}

impl Default for TransformMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::fmt::Display for TransformMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "scale=({:.4}, {:.4}) translate=({:.2}, {:.2})",
            self.scale_x, self.scale_y, self.translate_x, self.translate_y
        )
    }
}

/// Compute the cover transform for a preview of `preview` size shown in a
/// `view_width` × `view_height` view
///
/// With a 90° preview rotation the caller passes the display's height as
/// `view_width` and its width as `view_height`. Zero dimensions are not
/// checked.
pub fn compute_transform(
    preview: CameraResolution,
    view_width: u32,
    view_height: u32,
) -> TransformMatrix {
    let view_width = view_width as f32;
    let view_height = view_height as f32;

    let ratio_preview = preview.width as f32 / preview.height as f32;
    let ratio_view = view_width / view_height;

    let (scale_x, scale_y) = if ratio_view < ratio_preview {
        (ratio_preview / ratio_view, 1.0)
    } else {
        (1.0, ratio_view / ratio_preview)
    };

    let scaled_width = view_width * scale_x;
    let scaled_height = view_height * scale_y;
    let dx = (view_width - scaled_width) / 2.0;
    let dy = (view_height - scaled_height) / 2.0;

    TransformMatrix::identity()
        .post_scale(scale_x, scale_y)
        .post_translate(dx, dy)
}
