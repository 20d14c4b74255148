// SPDX-License-Identifier: GPL-3.0-only

//! Preview size selection
//!
//! Picks the camera resolution whose aspect ratio matches the display,
//! preferring the one closest in height. The display is described in
//! portrait terms (its width is the short edge) while sensor sizes are
//! landscape, so the target ratio is `height / width`.

use crate::backends::camera::CameraResolution;
use crate::constants::preview::ASPECT_TOLERANCE;
use crate::errors::PreviewError;

/// Select the best preview size for a display of `target_width` × `target_height`
///
/// Uses the default aspect tolerance of 0.1.
pub fn select_best_size(
    candidates: &[CameraResolution],
    target_width: u32,
    target_height: u32,
) -> Result<CameraResolution, PreviewError> {
    select_best_size_with_tolerance(candidates, target_width, target_height, ASPECT_TOLERANCE)
}

/// [`select_best_size`] with an explicit aspect-ratio tolerance
///
/// Ties go to the earliest candidate.
pub fn select_best_size_with_tolerance(
    candidates: &[CameraResolution],
    target_width: u32,
    target_height: u32,
    tolerance: f64,
) -> Result<CameraResolution, PreviewError> {
    if candidates.is_empty() {
        return Err(PreviewError::InvalidArgument(
            "no candidate preview sizes".to_string(),
        ));
    }

    let target_ratio = target_height as f64 / target_width as f64;

    let within_tolerance = candidates.iter().filter(|size| {
        let ratio = size.width as f64 / size.height as f64;
        // A degenerate 0x0 size has a NaN ratio and stays a candidate
        !((ratio - target_ratio).abs() > tolerance)
    });

    closest_height(within_tolerance, target_height)
        .or_else(|| closest_height(candidates.iter(), target_height))
        .ok_or_else(|| PreviewError::InvalidArgument("no candidate preview sizes".to_string()))
}

/// First size with the minimal `|height - target_height|`
fn closest_height<'a>(
    sizes: impl Iterator<Item = &'a CameraResolution>,
    target_height: u32,
) -> Option<CameraResolution> {
    let mut best: Option<(CameraResolution, u32)> = None;
    for size in sizes {
        let diff = size.height.abs_diff(target_height);
        if best.is_none_or(|(_, min_diff)| diff < min_diff) {
            best = Some((*size, diff));
        }
    }
    best.map(|(size, _)| size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(list: &[(u32, u32)]) -> Vec<CameraResolution> {
        list.iter()
            .map(|&(w, h)| CameraResolution::new(w, h))
            .collect()
    }

    #[test]
    fn test_picks_matching_ratio_closest_height() {
        let candidates = sizes(&[(640, 480), (1280, 720), (1920, 1080)]);
        let best = select_best_size(&candidates, 1080, 1920).unwrap();
        assert_eq!(best, CameraResolution::new(1920, 1080));
    }

    #[test]
    fn test_ratio_filter_beats_height_match() {
        // 640x480 is closest in height but 4:3 against a 16:9 display
        let candidates = sizes(&[(640, 480), (1280, 720)]);
        let best = select_best_size(&candidates, 270, 480).unwrap();
        assert_eq!(best, CameraResolution::new(1280, 720));
    }

    #[test]
    fn test_fallback_uses_full_list() {
        // target ratio 1.0: nothing within tolerance
        let candidates = sizes(&[(1920, 1080), (640, 480), (1280, 720)]);
        let best = select_best_size(&candidates, 700, 700).unwrap();
        assert_eq!(best, CameraResolution::new(1280, 720));
    }

    #[test]
    fn test_tie_goes_to_first_candidate() {
        let candidates = sizes(&[(1280, 720), (1200, 720), (1281, 720)]);
        let best = select_best_size(&candidates, 720, 1280).unwrap();
        assert_eq!(best, CameraResolution::new(1280, 720));

        // fallback path also keeps the first
        let best = select_best_size(&candidates, 100, 100).unwrap();
        assert_eq!(best, CameraResolution::new(1280, 720));
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        // 1.5 against a 1.6 target: 0.1 apart, up to float error
        let candidates = sizes(&[(1500, 1000), (2000, 1600)]);

        let best = select_best_size_with_tolerance(&candidates, 1000, 1600, 0.1 + 1e-9).unwrap();
        assert_eq!(best, CameraResolution::new(1500, 1000));

        // tighter tolerance drops it and falls back to the height match
        let best = select_best_size_with_tolerance(&candidates, 1000, 1600, 0.05).unwrap();
        assert_eq!(best, CameraResolution::new(2000, 1600));
    }

    #[test]
    fn test_zero_size_is_kept_by_ratio_filter() {
        // 0x0 is the only size in the ratio set, so the height fallback never runs
        let candidates = sizes(&[(1000, 1000), (0, 0)]);
        let best = select_best_size(&candidates, 720, 1280).unwrap();
        assert_eq!(best, CameraResolution::new(0, 0));
    }

    #[test]
    fn test_empty_candidates_is_invalid_argument() {
        let result = select_best_size(&[], 1080, 1920);
        assert!(matches!(result, Err(PreviewError::InvalidArgument(_))));
    }

    #[test]
    fn test_result_is_always_a_candidate() {
        let candidates = sizes(&[
            (176, 144),
            (320, 240),
            (352, 288),
            (640, 360),
            (800, 600),
            (1024, 768),
            (1280, 960),
            (1600, 1200),
        ]);
        for (w, h) in [(1, 1), (1080, 1920), (1920, 1080), (93, 80), (4000, 3)] {
            let best = select_best_size(&candidates, w, h).unwrap();
            assert!(candidates.contains(&best), "{best} not in candidates");
        }
    }
}
