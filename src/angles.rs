// angles.rs — azimuth math shared by the camera, wall culling and marker logic

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

const THREE_HALVES_PI: f32 = 3.0 * FRAC_PI_2;

/// Distances closer than this count as a tie in `snap_to_nearest`.
const TIE_EPSILON: f32 = 1e-5;

/// Straight (axis-aligned) azimuths used while the camera is top-down.
pub const STRAIGHT_ANGLES: [f32; 4] = [0.0, FRAC_PI_2, PI, THREE_HALVES_PI];

/// Quadrant centres (45°, 135°, 225°, 315°) used as transition targets.
pub const QUADRANT_CENTERS: [f32; 4] = [
    FRAC_PI_4,
    FRAC_PI_2 + FRAC_PI_4,
    PI + FRAC_PI_4,
    THREE_HALVES_PI + FRAC_PI_4,
];

/// Wraps any angle into `[0, 2π)`. Non-finite input maps to 0.
pub fn normalize(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let r = angle % TAU;
    let r = if r < 0.0 { r + TAU } else { r };
    // tiny negative inputs can round up to exactly 2π
    if r >= TAU {
        0.0
    } else {
        r
    }
}

/// Circular distance between two angles, in `[0, π]`.
pub fn circular_distance(a: f32, b: f32) -> f32 {
    let d = (normalize(a) - normalize(b)).abs();
    d.min(TAU - d)
}

/// Signed shortest rotation from `from` to `to`, in `(-π, π]`.
pub fn shortest_delta(from: f32, to: f32) -> f32 {
    let d = normalize(to) - normalize(from);
    if d > PI {
        d - TAU
    } else if d <= -PI {
        d + TAU
    } else {
        d
    }
}

/// Returns the candidate closest to `angle` on the circle.
///
/// Ties (within `TIE_EPSILON`) go to the earliest candidate. `None` only for an empty slice.
pub fn snap_to_nearest(angle: f32, candidates: &[f32]) -> Option<f32> {
    let mut best: Option<(f32, f32)> = None;
    for &candidate in candidates {
        let distance = circular_distance(angle, candidate);
        match best {
            Some((_, best_distance)) if distance >= best_distance - TIE_EPSILON => {}
            _ => best = Some((candidate, distance)),
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Buckets an azimuth into quadrant 1..=4 (90° each, starting at 0°).
pub fn quadrant_of(angle: f32) -> u8 {
    let a = normalize(angle);
    if a < FRAC_PI_2 {
        1
    } else if a < PI {
        2
    } else if a < THREE_HALVES_PI {
        3
    } else {
        4
    }
}
