// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the preview application

use crate::backends::camera::BackendError;
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug)]
pub enum AppError {
    /// Camera-related errors
    Camera(CameraError),
    /// Preview geometry errors
    Preview(PreviewError),
    /// Configuration errors
    Config(String),
    /// Terminal / I/O errors
    Io(std::io::Error),
}

/// Camera-specific errors
#[derive(Debug, Clone, PartialEq)]
pub enum CameraError {
    /// No camera reports a front-facing location
    NoFrontCameraFound,
    /// The camera could not be opened or configured
    CameraUnavailable(String),
    /// The preview could not be bound to the surface (recoverable)
    PreviewBindFailed(String),
}

/// Preview geometry errors
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewError {
    /// Input outside the domain of a preview computation
    InvalidArgument(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Preview(e) => write!(f, "Preview error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NoFrontCameraFound => write!(f, "No front-facing camera found"),
            CameraError::CameraUnavailable(msg) => write!(f, "Camera unavailable: {}", msg),
            CameraError::PreviewBindFailed(msg) => {
                write!(f, "Failed to bind preview to surface: {}", msg)
            }
        }
    }
}

impl fmt::Display for PreviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Camera(e) => Some(e),
            AppError::Preview(e) => Some(e),
            AppError::Io(e) => Some(e),
            AppError::Config(_) => None,
        }
    }
}
impl std::error::Error for CameraError {}
impl std::error::Error for PreviewError {}

impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<PreviewError> for AppError {
    fn from(err: PreviewError) -> Self {
        AppError::Preview(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}

// Configuration failures after the device is open abort initialization
impl From<BackendError> for CameraError {
    fn from(err: BackendError) -> Self {
        CameraError::CameraUnavailable(err.to_string())
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        AppError::Camera(err.into())
    }
}
