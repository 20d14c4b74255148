// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the preview controller and camera lifecycle

mod common;

use common::{ScriptedBackend, device, sizes};
use frontcam::backends::camera::{CameraFacing, CameraResolution, DisplayOrientation};
use frontcam::{
    AppError, CameraError, DisplayDimensions, PreviewController, PreviewError, PreviewOptions,
    SurfaceEvent, TransformMatrix, compute_transform,
};

const PORTRAIT: DisplayDimensions = DisplayDimensions::new(1080, 1920);

fn phone_backend() -> ScriptedBackend {
    ScriptedBackend::new(
        vec![
            device("rear", CameraFacing::Back),
            device("selfie", CameraFacing::Front),
        ],
        sizes(&[(640, 480), (1280, 720), (1920, 1080)]),
    )
}

fn controller(backend: ScriptedBackend) -> PreviewController {
    PreviewController::new(Box::new(backend), PORTRAIT, PreviewOptions::default())
}

#[test]
fn test_initialize_configures_front_camera() {
    let backend = phone_backend();
    let log = backend.log();
    let mut controller = controller(backend);

    let plan = controller.initialize().expect("initialization should succeed");
    assert_eq!(plan.camera_index, 1);
    assert_eq!(plan.device.name, "selfie");
    assert_eq!(plan.preview_size, CameraResolution::new(1920, 1080));
    assert!(plan.supported_sizes.contains(&plan.preview_size));

    // 16:9 sensor on a 9:16 display rotated 90°: nothing to correct
    assert_eq!(plan.transform, TransformMatrix::identity());

    let log = log.borrow();
    // open indexes into the single enumeration it was chosen from
    assert_eq!(log.enumerations, 1);
    assert_eq!(log.opens, vec![1]);
    assert_eq!(log.preview_sizes, vec![CameraResolution::new(1920, 1080)]);
    assert_eq!(log.orientations, vec![DisplayOrientation::Rotate90]);
    assert_eq!(log.releases, 0);
}

#[test]
fn test_transform_uses_swapped_display() {
    let backend = ScriptedBackend::new(
        vec![device("selfie", CameraFacing::Front)],
        sizes(&[(640, 480), (1280, 960)]),
    );
    let mut controller = controller(backend);

    let plan = controller.initialize().unwrap().clone();
    assert_eq!(
        plan.transform,
        compute_transform(plan.preview_size, PORTRAIT.height, PORTRAIT.width)
    );
    assert_eq!(
        controller.display_transform(),
        plan.transform.oriented(DisplayOrientation::Rotate90)
    );
}

#[test]
fn test_missing_front_camera_fails_before_open() {
    let backend = ScriptedBackend::new(
        vec![device("rear", CameraFacing::Back)],
        sizes(&[(640, 480)]),
    );
    let log = backend.log();
    let mut controller = controller(backend);

    let err = controller.initialize().unwrap_err();
    assert!(matches!(
        err,
        AppError::Camera(CameraError::NoFrontCameraFound)
    ));
    assert!(log.borrow().opens.is_empty());
    assert!(!controller.is_camera_held());

    drop(controller);
    assert_eq!(log.borrow().releases, 0);
}

#[test]
fn test_external_camera_only_when_accepted() {
    let cameras = vec![device("usb", CameraFacing::External)];

    let backend = ScriptedBackend::new(cameras.clone(), sizes(&[(640, 480)]));
    let mut accepting = controller(backend);
    assert_eq!(accepting.initialize().unwrap().device.name, "usb");

    let backend = ScriptedBackend::new(cameras, sizes(&[(640, 480)]));
    let options = PreviewOptions {
        accept_external_camera: false,
        ..PreviewOptions::default()
    };
    let mut strict = PreviewController::new(Box::new(backend), PORTRAIT, options);
    assert!(matches!(
        strict.initialize(),
        Err(AppError::Camera(CameraError::NoFrontCameraFound))
    ));
}

#[test]
fn test_open_failure_is_camera_unavailable() {
    let backend = phone_backend().failing_open();
    let log = backend.log();
    let mut controller = controller(backend);

    let err = controller.initialize().unwrap_err();
    assert!(matches!(
        err,
        AppError::Camera(CameraError::CameraUnavailable(_))
    ));
    assert!(!controller.is_camera_held());
    assert!(controller.plan().is_none());

    drop(controller);
    assert_eq!(log.borrow().releases, 0);
}

#[test]
fn test_no_preview_sizes_releases_camera() {
    let backend = ScriptedBackend::new(vec![device("selfie", CameraFacing::Front)], Vec::new());
    let log = backend.log();
    let mut controller = controller(backend);

    let err = controller.initialize().unwrap_err();
    assert!(matches!(
        err,
        AppError::Preview(PreviewError::InvalidArgument(_))
    ));
    assert!(!controller.is_camera_held());

    drop(controller);
    assert_eq!(log.borrow().releases, 1);
}

#[test]
fn test_created_starts_preview() {
    let mut controller = controller(phone_backend());
    controller.initialize().unwrap();

    controller
        .handle_surface_event(SurfaceEvent::Created)
        .expect("preview should start");
    assert!(controller.is_previewing());

    let frame = controller.latest_frame().expect("a frame was queued");
    assert_eq!((frame.width, frame.height), (1080, 1920));
    assert!(controller.latest_frame().is_none());
}

#[test]
fn test_latest_frame_counts_skipped_frames() {
    let mut controller = controller(phone_backend());
    controller.initialize().unwrap();
    assert_eq!(controller.frames_received(), 0);

    controller
        .handle_surface_event(SurfaceEvent::Created)
        .unwrap();
    controller.latest_frame().expect("a frame was queued");
    assert_eq!(controller.frames_received(), 1);

    assert!(controller.latest_frame().is_none());
    assert_eq!(controller.frames_received(), 1);
}

#[test]
fn test_created_before_initialize_does_not_open() {
    let backend = phone_backend();
    let log = backend.log();
    let mut controller = controller(backend);

    let result = controller.handle_surface_event(SurfaceEvent::Created);
    assert!(matches!(result, Err(CameraError::PreviewBindFailed(_))));
    assert!(log.borrow().opens.is_empty());
    assert_eq!(log.borrow().starts, 0);
}

#[test]
fn test_bind_failure_is_not_fatal() {
    let backend = phone_backend().failing_start();
    let log = backend.log();
    let mut controller = controller(backend);
    controller.initialize().unwrap();

    let result = controller.handle_surface_event(SurfaceEvent::Created);
    assert!(matches!(result, Err(CameraError::PreviewBindFailed(_))));

    // Camera stays held and the controller keeps handling events
    assert!(controller.is_camera_held());
    assert!(!controller.is_previewing());
    assert!(controller.latest_frame().is_none());
    assert!(
        controller
            .handle_surface_event(SurfaceEvent::Changed {
                width: 1080,
                height: 1920
            })
            .is_ok()
    );

    controller
        .handle_surface_event(SurfaceEvent::Destroyed)
        .unwrap();
    assert_eq!(log.borrow().releases, 1);
}

#[test]
fn test_changed_leaves_preview_alone() {
    let backend = phone_backend();
    let log = backend.log();
    let mut controller = controller(backend);
    controller.initialize().unwrap();
    controller
        .handle_surface_event(SurfaceEvent::Created)
        .unwrap();
    let transform = controller.transform();

    controller
        .handle_surface_event(SurfaceEvent::Changed {
            width: 720,
            height: 1280,
        })
        .unwrap();

    assert_eq!(controller.transform(), transform);
    assert!(controller.is_previewing());
    let log = log.borrow();
    assert_eq!(log.starts, 1);
    assert_eq!(log.stops, 0);
    assert_eq!(log.opens.len(), 1);
}

#[test]
fn test_destroyed_stops_and_releases() {
    let backend = phone_backend();
    let log = backend.log();
    let mut controller = controller(backend);
    controller.initialize().unwrap();
    controller
        .handle_surface_event(SurfaceEvent::Created)
        .unwrap();

    controller
        .handle_surface_event(SurfaceEvent::Destroyed)
        .unwrap();

    assert!(!controller.is_camera_held());
    assert!(!controller.is_previewing());
    assert_eq!(log.borrow().stops, 1);
    assert_eq!(log.borrow().releases, 1);
}

#[test]
fn test_release_happens_once_on_duplicate_teardown() {
    let backend = phone_backend();
    let log = backend.log();
    let mut controller = controller(backend);
    controller.initialize().unwrap();
    controller
        .handle_surface_event(SurfaceEvent::Created)
        .unwrap();

    controller
        .handle_surface_event(SurfaceEvent::Destroyed)
        .unwrap();
    controller
        .handle_surface_event(SurfaceEvent::Destroyed)
        .unwrap();
    assert!(!controller.shutdown());
    drop(controller);

    let log = log.borrow();
    assert_eq!(log.releases, 1);
    assert_eq!(log.stops, 1);
}

#[test]
fn test_drop_releases_held_camera() {
    let backend = phone_backend();
    let log = backend.log();
    let mut controller = controller(backend);
    controller.initialize().unwrap();
    controller
        .handle_surface_event(SurfaceEvent::Created)
        .unwrap();

    drop(controller);

    let log = log.borrow();
    assert_eq!(log.stops, 1);
    assert_eq!(log.releases, 1);
}

#[test]
fn test_created_after_destroyed_cannot_reach_camera() {
    let backend = phone_backend();
    let log = backend.log();
    let mut controller = controller(backend);
    controller.initialize().unwrap();
    controller
        .handle_surface_event(SurfaceEvent::Destroyed)
        .unwrap();

    let result = controller.handle_surface_event(SurfaceEvent::Created);
    assert!(matches!(result, Err(CameraError::PreviewBindFailed(_))));
    assert_eq!(log.borrow().starts, 0);
    assert_eq!(log.borrow().opens.len(), 1);
}

#[test]
fn test_upright_orientation_keeps_display_axes() {
    let backend = ScriptedBackend::new(
        vec![device("selfie", CameraFacing::Front)],
        sizes(&[(640, 480), (1280, 720)]),
    );
    let options = PreviewOptions {
        orientation: DisplayOrientation::Rotate0,
        ..PreviewOptions::default()
    };
    let landscape = DisplayDimensions::new(1920, 1080);
    let mut controller = PreviewController::new(Box::new(backend), landscape, options);

    let plan = controller.initialize().unwrap().clone();
    assert_eq!(plan.preview_size, CameraResolution::new(1280, 720));
    assert_eq!(plan.transform, compute_transform(plan.preview_size, 1920, 1080));
    assert_eq!(controller.display_transform(), plan.transform);
}
