// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for camera capture
//!
//! - [`camera`]: Camera backend with device enumeration and preview streaming

pub mod camera;
