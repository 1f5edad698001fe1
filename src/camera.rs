// camera.rs — orbit pose and the scroll-driven transition between top-down and perspective
//
// Regimes, chosen by transition progress t = clamp(progress / transition_end):
//   t <  ortho_threshold   orthographic: azimuth eases to the nearest straight angle
//   t in [threshold, 1)    transition:   azimuth eases to a quadrant centre fixed on entry
//   t == 1                 perspective:  azimuth belongs to the user (and the idle spin)
//
// Smoothing is a fixed factor per frame, so animation speed follows the frame rate.

use crate::angles::{self, QUADRANT_CENTERS, STRAIGHT_ANGLES};
use crate::config::CameraConfig;
use glam::{Mat4, Vec2, Vec3};
use std::time::{Duration, Instant};

/// Camera state handed to the renderer every frame.
///
/// `radius` and `beta` are locked: only the rig changes them, so their
/// limits always equal the current value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Azimuth, unbounded (taken mod 2π).
    pub alpha: f32,
    /// Elevation measured from straight down.
    pub beta: f32,
    /// Vertical field of view.
    pub fov: f32,
    pub radius: f32,
    pub near: f32,
    /// True while the rig owns the azimuth (orthographic and transition regimes).
    pub alpha_locked: bool,
}

/// Orthonormal camera frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl CameraPose {
    pub fn radius_limits(&self) -> (f32, f32) {
        (self.radius, self.radius)
    }

    pub fn beta_limits(&self) -> (f32, f32) {
        (self.beta, self.beta)
    }

    pub fn quadrant(&self) -> u8 {
        angles::quadrant_of(self.alpha)
    }

    /// Unit vector from the orbit target towards the eye.
    pub fn eye_direction(&self) -> Vec3 {
        let (sin_a, cos_a) = self.alpha.sin_cos();
        let (sin_b, cos_b) = self.beta.sin_cos();
        Vec3::new(cos_a * sin_b, cos_b, sin_a * sin_b)
    }

    pub fn eye(&self, target: Vec3) -> Vec3 {
        target + self.eye_direction() * self.radius
    }

    pub fn basis(&self) -> CameraBasis {
        let forward = -self.eye_direction();
        // derived from alpha directly so it stays valid when looking straight down
        let (sin_a, cos_a) = self.alpha.sin_cos();
        let right = Vec3::new(sin_a, 0.0, -cos_a);
        let up = right.cross(forward).normalize_or_zero();
        CameraBasis { forward, right, up }
    }

    /// World-space ray through a point in normalised device coordinates.
    pub fn ray_through(&self, target: Vec3, ndc: Vec2, aspect: f32) -> (Vec3, Vec3) {
        let basis = self.basis();
        let tan_half = (self.fov * 0.5).tan();
        let dir = basis.forward
            + basis.right * ndc.x * tan_half * aspect
            + basis.up * ndc.y * tan_half;
        (self.eye(target), dir.normalize_or_zero())
    }

    pub fn view_projection(&self, target: Vec3, aspect: f32, far: f32) -> Mat4 {
        let basis = self.basis();
        let view = Mat4::look_at_rh(self.eye(target), target, basis.up);
        let proj = Mat4::perspective_rh(self.fov, aspect, self.near, far);
        proj * view
    }

    /// Projects a world point to NDC; `None` when it sits behind the camera.
    pub fn project(&self, target: Vec3, aspect: f32, far: f32, point: Vec3) -> Option<Vec2> {
        let clip = self.view_projection(target, aspect, far) * point.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        Some(Vec2::new(clip.x / clip.w, clip.y / clip.w))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraRegime {
    Orthographic,
    Transition,
    Perspective,
}

/// What happened during one `CameraRig::update`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub regime: CameraRegime,
    pub transition_progress: f32,
    /// Set on the frame the orthographic flag flips.
    pub view_mode_changed: bool,
    pub idle_rotating: bool,
}

pub struct CameraRig {
    config: CameraConfig,
    pose: CameraPose,
    last_transition_progress: f32,
    ortho_snap_alpha: Option<f32>,
    transition_target_alpha: Option<f32>,
    is_ortho_view: bool,
    idle_rotating: bool,
    last_interaction: Option<Instant>,
}

impl CameraRig {
    pub fn new(config: CameraConfig) -> Self {
        let config = config.sanitized();
        let pose = Self::settled_pose(&config);
        Self {
            config,
            pose,
            last_transition_progress: 0.0,
            ortho_snap_alpha: None,
            transition_target_alpha: None,
            is_ortho_view: true,
            idle_rotating: false,
            last_interaction: None,
        }
    }

    fn settled_pose(config: &CameraConfig) -> CameraPose {
        let radius = radius_for_fov(config.apparent_size, config.ortho_fov);
        CameraPose {
            alpha: config.initial_alpha,
            beta: config.ortho_beta,
            fov: config.ortho_fov,
            radius,
            near: near_for_radius(config, radius),
            alpha_locked: true,
        }
    }

    /// Back to the initial top-down pose; the idle timer restarts on the next update.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    pub fn pose(&self) -> &CameraPose {
        &self.pose
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn is_ortho_view(&self) -> bool {
        self.is_ortho_view
    }

    pub fn is_idle_rotating(&self) -> bool {
        self.idle_rotating
    }

    pub fn transition_target_alpha(&self) -> Option<f32> {
        self.transition_target_alpha
    }

    pub fn transition_progress(&self, progress: f32) -> f32 {
        if self.config.transition_end <= 0.0 {
            return 1.0;
        }
        (progress / self.config.transition_end).clamp(0.0, 1.0)
    }

    /// Records a user interaction; idle rotation stops on the next update.
    pub fn register_interaction(&mut self, now: Instant) {
        self.last_interaction = Some(now);
    }

    /// Applies a user azimuth drag. Returns false while the rig owns the azimuth.
    pub fn orbit(&mut self, delta_alpha: f32, now: Instant) -> bool {
        self.register_interaction(now);
        if self.pose.alpha_locked || !delta_alpha.is_finite() {
            return false;
        }
        self.pose.alpha += delta_alpha;
        true
    }

    pub fn update(&mut self, progress: f32, now: Instant) -> CameraFrame {
        let last_interaction = *self.last_interaction.get_or_insert(now);
        let t = self.transition_progress(progress);
        let smoothing = self.config.smoothing;

        let target_beta = lerp(self.config.ortho_beta, self.config.perspective_beta, t);
        let target_fov = lerp(self.config.ortho_fov, self.config.perspective_fov, t);
        self.pose.beta += (target_beta - self.pose.beta) * smoothing;
        self.pose.fov += (target_fov - self.pose.fov) * smoothing;

        let fov_lo = self.config.ortho_fov.min(self.config.perspective_fov);
        let fov_hi = self.config.ortho_fov.max(self.config.perspective_fov);
        self.pose.fov = self.pose.fov.clamp(fov_lo, fov_hi);

        self.pose.radius = radius_for_fov(self.config.apparent_size, self.pose.fov);
        self.pose.near = near_for_radius(&self.config, self.pose.radius);

        let regime = if t < self.config.ortho_threshold {
            CameraRegime::Orthographic
        } else if t < 1.0 {
            CameraRegime::Transition
        } else {
            CameraRegime::Perspective
        };

        match regime {
            CameraRegime::Orthographic => {
                let target =
                    angles::snap_to_nearest(self.pose.alpha, &STRAIGHT_ANGLES).unwrap_or(0.0);
                self.ease_alpha_towards(target);
                self.ortho_snap_alpha = Some(target);
                self.transition_target_alpha = None;
                self.pose.alpha_locked = true;
            }
            CameraRegime::Transition => {
                let entered_from_below = self.last_transition_progress < self.config.ortho_threshold;
                if entered_from_below || self.transition_target_alpha.is_none() {
                    let base = if entered_from_below {
                        self.ortho_snap_alpha.unwrap_or(self.pose.alpha)
                    } else {
                        self.pose.alpha
                    };
                    let target =
                        angles::snap_to_nearest(base, &QUADRANT_CENTERS).unwrap_or(base);
                    log::debug!("Transition target captured at {:.1}°", target.to_degrees());
                    self.transition_target_alpha = Some(target);
                }
                if let Some(target) = self.transition_target_alpha {
                    self.ease_alpha_towards(target);
                }
                self.pose.alpha_locked = true;
            }
            CameraRegime::Perspective => {
                self.transition_target_alpha = None;
                self.pose.alpha_locked = false;
            }
        }

        let idle_timeout = Duration::from_millis(self.config.idle_timeout_ms);
        self.idle_rotating = progress >= self.config.transition_end
            && now.saturating_duration_since(last_interaction) > idle_timeout;
        if self.idle_rotating {
            self.pose.alpha += self.config.idle_speed;
        }

        let is_ortho = t < self.config.ortho_threshold;
        let view_mode_changed = is_ortho != self.is_ortho_view;
        if view_mode_changed {
            log::debug!(
                "View mode -> {}",
                if is_ortho { "orthographic" } else { "perspective" }
            );
        }
        self.is_ortho_view = is_ortho;
        self.last_transition_progress = t;

        CameraFrame {
            regime,
            transition_progress: t,
            view_mode_changed,
            idle_rotating: self.idle_rotating,
        }
    }

    fn ease_alpha_towards(&mut self, target: f32) {
        self.pose.alpha += angles::shortest_delta(self.pose.alpha, target) * self.config.smoothing;
    }
}

/// Orbit radius that keeps `radius * tan(fov / 2) == apparent_size`.
pub fn radius_for_fov(apparent_size: f32, fov: f32) -> f32 {
    apparent_size / (fov * 0.5).tan()
}

fn near_for_radius(config: &CameraConfig, radius: f32) -> f32 {
    config.near_min.max(radius * config.near_fraction)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    const EPS: f32 = 1e-4;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    fn run(rig: &mut CameraRig, progress: f32, frames: usize, start: Instant) -> CameraFrame {
        let mut frame = rig.update(progress, start);
        for _ in 1..frames {
            frame = rig.update(progress, start);
        }
        frame
    }

    #[test]
    fn test_initial_pose_is_top_down() {
        let rig = CameraRig::new(CameraConfig::default());
        let pose = rig.pose();
        assert!(rig.is_ortho_view());
        assert!(pose.alpha_locked);
        assert_eq!(pose.radius_limits(), (pose.radius, pose.radius));
        assert_eq!(pose.beta_limits(), (pose.beta, pose.beta));
    }

    #[test]
    fn test_ortho_snaps_to_straight_angle() {
        let config = CameraConfig {
            initial_alpha: 100f32.to_radians(),
            ..CameraConfig::default()
        };
        let mut rig = CameraRig::new(config);
        let now = Instant::now();
        let frame = run(&mut rig, 0.0, 400, now);
        assert_eq!(frame.regime, CameraRegime::Orthographic);
        assert!(approx(angles::normalize(rig.pose().alpha), FRAC_PI_2));
        assert_eq!(rig.transition_target_alpha(), None);
    }

    #[test]
    fn test_transition_target_fixed_on_entry() {
        let config = CameraConfig {
            initial_alpha: 0.2,
            ..CameraConfig::default()
        };
        let mut rig = CameraRig::new(config);
        let now = Instant::now();
        run(&mut rig, 0.0, 200, now);

        let frame = rig.update(0.1, now);
        assert_eq!(frame.regime, CameraRegime::Transition);
        assert!(frame.view_mode_changed);
        let target = rig.transition_target_alpha().expect("target captured");
        // snapped to 0°, equidistant from 45° and 315°: the first centre wins
        assert_eq!(target, QUADRANT_CENTERS[0]);

        // the target does not follow the azimuth as it eases
        for _ in 0..400 {
            rig.update(0.2, now);
            assert_eq!(rig.transition_target_alpha(), Some(target));
        }
        assert!(approx(angles::normalize(rig.pose().alpha), target));
        assert!(rig.pose().alpha_locked);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 0)]
    #[case(2, 1)]
    #[case(3, 2)]
    fn test_transition_target_from_each_straight_angle(#[case] straight: usize, #[case] centre: usize) {
        let config = CameraConfig {
            initial_alpha: STRAIGHT_ANGLES[straight],
            ..CameraConfig::default()
        };
        let mut rig = CameraRig::new(config);
        let now = Instant::now();
        run(&mut rig, 0.0, 50, now);

        rig.update(0.15, now);
        assert_eq!(rig.transition_target_alpha(), Some(QUADRANT_CENTERS[centre]));
    }

    #[test]
    fn test_zero_fov_config_keeps_pose_finite() {
        let config = CameraConfig {
            ortho_fov: 0.0,
            smoothing: f32::NAN,
            ..CameraConfig::default()
        };
        let mut rig = CameraRig::new(config);
        let now = Instant::now();
        for progress in [0.0, 0.2, 1.0] {
            rig.update(progress, now);
            let pose = rig.pose();
            assert!(pose.radius.is_finite() && pose.radius > 0.0);
            assert!(pose.near.is_finite() && pose.near > 0.0);
            assert!(pose.fov > 0.0);
        }
    }

    #[test]
    fn test_entering_transition_from_above_captures_target() {
        let config = CameraConfig {
            initial_alpha: 1.0,
            ..CameraConfig::default()
        };
        let mut rig = CameraRig::new(config);
        let now = Instant::now();
        run(&mut rig, 1.0, 5, now);
        assert_eq!(rig.transition_target_alpha(), None);

        rig.update(0.2, now);
        assert_eq!(rig.transition_target_alpha(), Some(FRAC_PI_4));
    }

    #[test]
    fn test_perspective_releases_alpha() {
        let mut rig = CameraRig::new(CameraConfig::default());
        let now = Instant::now();
        let frame = run(&mut rig, 1.0, 3, now);
        assert_eq!(frame.regime, CameraRegime::Perspective);
        assert!(!rig.pose().alpha_locked);
        assert_eq!(rig.transition_target_alpha(), None);

        let before = rig.pose().alpha;
        assert!(rig.orbit(0.25, now));
        assert!(approx(rig.pose().alpha, before + 0.25));
    }

    #[test]
    fn test_orbit_rejected_while_locked() {
        let mut rig = CameraRig::new(CameraConfig::default());
        let now = Instant::now();
        rig.update(0.0, now);
        let before = rig.pose().alpha;
        assert!(!rig.orbit(0.5, now));
        assert_eq!(rig.pose().alpha, before);
    }

    #[test]
    fn test_apparent_size_invariant() {
        let config = CameraConfig::default();
        let k = config.apparent_size;
        let mut rig = CameraRig::new(config);
        let now = Instant::now();
        for progress in [0.0, 0.05, 0.2, 0.5, 1.0] {
            run(&mut rig, progress, 300, now);
            let pose = rig.pose();
            assert!((pose.radius * (pose.fov * 0.5).tan() - k).abs() < 1e-3);
            assert!(pose.near >= rig.config().near_min);
        }
        assert!(approx(rig.pose().fov, rig.config().perspective_fov));
        assert!(approx(rig.pose().beta, rig.config().perspective_beta));
    }

    #[test]
    fn test_smoothing_moves_fraction_per_frame() {
        let config = CameraConfig::default();
        let mut rig = CameraRig::new(config.clone());
        rig.update(1.0, Instant::now());
        let expected = config.ortho_beta + (config.perspective_beta - config.ortho_beta) * 0.08;
        assert!(approx(rig.pose().beta, expected));
    }

    #[test]
    fn test_view_mode_edges_fire_once() {
        let mut rig = CameraRig::new(CameraConfig::default());
        let now = Instant::now();
        assert!(!rig.update(0.0, now).view_mode_changed);
        assert!(rig.update(0.5, now).view_mode_changed);
        assert!(!rig.update(0.6, now).view_mode_changed);
        assert!(rig.update(0.01, now).view_mode_changed);
        assert!(rig.is_ortho_view());
    }

    #[test]
    fn test_idle_rotation_after_timeout() {
        let config = CameraConfig {
            idle_timeout_ms: 1000,
            ..CameraConfig::default()
        };
        let speed = config.idle_speed;
        let mut rig = CameraRig::new(config);
        let t0 = Instant::now();
        rig.update(1.0, t0);

        let frame = rig.update(1.0, t0 + Duration::from_millis(500));
        assert!(!frame.idle_rotating);

        let mut previous = rig.pose().alpha;
        for i in 0..10 {
            let frame = rig.update(1.0, t0 + Duration::from_millis(2000 + i * 16));
            assert!(frame.idle_rotating);
            let alpha = rig.pose().alpha;
            assert!(approx(alpha - previous, speed));
            previous = alpha;
        }

        let touched = t0 + Duration::from_millis(3000);
        rig.register_interaction(touched);
        let frame = rig.update(1.0, touched + Duration::from_millis(16));
        assert!(!frame.idle_rotating);
        assert_eq!(rig.pose().alpha, previous);
    }

    #[test]
    fn test_idle_rotation_suppressed_before_perspective() {
        let config = CameraConfig {
            idle_timeout_ms: 10,
            ..CameraConfig::default()
        };
        let mut rig = CameraRig::new(config);
        let t0 = Instant::now();
        rig.update(0.2, t0);
        let frame = rig.update(0.2, t0 + Duration::from_secs(60));
        assert!(!frame.idle_rotating);
    }

    #[test]
    fn test_ray_through_centre_hits_target() {
        let mut rig = CameraRig::new(CameraConfig::default());
        run(&mut rig, 1.0, 200, Instant::now());
        let target = Vec3::new(1.0, 0.0, -2.0);
        let (origin, dir) = rig.pose().ray_through(target, Vec2::ZERO, 1.5);
        let to_target = (target - origin).normalize();
        assert!(dir.dot(to_target) > 0.9999);
    }

    #[test]
    fn test_project_target_is_screen_centre() {
        let mut rig = CameraRig::new(CameraConfig::default());
        run(&mut rig, 1.0, 200, Instant::now());
        let ndc = rig.pose().project(Vec3::ZERO, 1.0, 500.0, Vec3::ZERO).unwrap();
        assert!(ndc.length() < 1e-3);
    }

    #[test]
    fn test_basis_is_orthonormal_top_down() {
        let rig = CameraRig::new(CameraConfig::default());
        let b = rig.pose().basis();
        assert!(approx(b.right.length(), 1.0));
        assert!(approx(b.up.length(), 1.0));
        assert!(b.forward.dot(b.right).abs() < EPS);
        assert!(b.forward.dot(b.up).abs() < EPS);
    }
}
