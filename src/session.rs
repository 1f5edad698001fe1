// session.rs — the walkthrough session: one object owning the scene and every controller
//
// Lifecycle:
//   1. Walkthrough::new(config)
//   2. load_scene(scene)          (load phase; may be skipped or repeated)
//   3. update(progress, now)      once per frame
//   input events (pick / orbit / cycle_furniture / select_time_index) between frames
//
// Without a loaded scene only the camera moves; every other operation is a no-op.

use crate::bindings::SceneBindings;
use crate::camera::{CameraFrame, CameraPose, CameraRig};
use crate::config::WalkthroughConfig;
use crate::emission::{time_of_day_label, EmissionController, SunBlendState};
use crate::furniture::FurnitureController;
use crate::marker::{EntranceMarker, MarkerLink};
use crate::scene::{NodeId, Scene, SunVariant};
use crate::scroll::sanitize_progress;
use crate::visibility::{WallController, WallVisibility};
use glam::{Vec2, Vec3};
use std::time::Instant;

/// Events produced by one frame update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSummary {
    pub camera: CameraFrame,
    pub quadrant: u8,
    pub quadrant_changed: bool,
    pub walls_changed: bool,
    pub marker_relinked: bool,
}

pub struct Walkthrough {
    config: WalkthroughConfig,
    camera: CameraRig,
    scene: Scene,
    bindings: Option<SceneBindings>,
    target: Vec3,
    toggle_mode: bool,
    progress: f32,
    quadrant: u8,
    walls_dirty: bool,
    walls: WallController,
    emission: EmissionController,
    furniture: FurnitureController,
    marker: EntranceMarker,
}

impl Walkthrough {
    pub fn new(config: WalkthroughConfig) -> Self {
        Self {
            camera: CameraRig::new(config.camera.clone()),
            scene: Scene::new(),
            bindings: None,
            target: Vec3::ZERO,
            toggle_mode: false,
            progress: 0.0,
            quadrant: 0,
            walls_dirty: true,
            walls: WallController::new(),
            emission: EmissionController::new(&config.emission),
            furniture: FurnitureController::new(),
            marker: EntranceMarker::new(Vec2::from(config.marker.offset_px)),
            config,
        }
    }

    /// Installs a freshly loaded scene and binds its named parts.
    pub fn load_scene(&mut self, scene: Scene) {
        self.scene = scene;
        let bindings = SceneBindings::bind(&self.scene, &self.config.names);
        self.target = bindings.target(&self.scene);
        self.furniture.hide_all(&mut self.scene, &bindings.furniture);
        self.bindings = Some(bindings);

        self.walls.invalidate();
        self.walls_dirty = true;
        self.emission.invalidate();
        self.marker.clear();
        log::info!(
            "Scene bound: {} nodes, orbit target {:?}",
            self.scene.node_count(),
            self.target
        );
    }

    /// Back to the initial state. The loaded scene stays bound.
    pub fn reset(&mut self) {
        self.camera.reset();
        self.toggle_mode = false;
        self.progress = 0.0;
        self.quadrant = 0;
        self.emission = EmissionController::new(&self.config.emission);
        self.walls.invalidate();
        self.walls_dirty = true;
        self.marker.clear();
        if let Some(bindings) = &self.bindings {
            self.furniture.hide_all(&mut self.scene, &bindings.furniture);
        }
    }

    pub fn update(&mut self, progress: f32, now: Instant) -> FrameSummary {
        if let Some(p) = sanitize_progress(progress) {
            self.progress = p;
        }
        let progress = self.progress;

        let camera = self.camera.update(progress, now);
        let quadrant = self.camera.pose().quadrant();
        let quadrant_changed = quadrant != self.quadrant;
        if quadrant_changed {
            log::debug!("Quadrant {} -> {}", self.quadrant, quadrant);
        }
        self.quadrant = quadrant;

        let mut walls_changed = false;
        let mut marker_relinked = false;
        if let Some(bindings) = &self.bindings {
            let is_ortho = self.camera.is_ortho_view();
            let interior = !is_ortho && self.toggle_mode;
            if self.walls_dirty || camera.view_mode_changed || (quadrant_changed && interior) {
                walls_changed = self.walls.apply(
                    &mut self.scene,
                    &bindings.walls,
                    is_ortho,
                    self.toggle_mode,
                    quadrant,
                );
                self.walls_dirty = false;
            }

            marker_relinked = self.marker.update(quadrant, &bindings.anchors);

            self.emission.update(
                &mut self.scene,
                &bindings.materials,
                self.toggle_mode,
                progress,
                &self.config.sections,
            );
            self.furniture.update(
                &mut self.scene,
                &bindings.furniture,
                self.toggle_mode,
                progress,
                &self.config.sections,
            );
        }

        FrameSummary {
            camera,
            quadrant,
            quadrant_changed,
            walls_changed,
            marker_relinked,
        }
    }

    /// Flips toggle mode; walls and emission follow on the next update.
    pub fn toggle(&mut self, now: Instant) {
        self.camera.register_interaction(now);
        self.toggle_mode = !self.toggle_mode;
        self.walls_dirty = true;
        log::debug!("Toggle mode -> {}", self.toggle_mode);
    }

    /// A pick on a model mesh flips toggle mode. Returns whether it qualified.
    pub fn pick(&mut self, node: NodeId, now: Instant) -> bool {
        self.camera.register_interaction(now);
        let qualifies = self.bindings.is_some()
            && self.scene.node(node).is_some_and(|n| n.material().is_some());
        if qualifies {
            self.toggle(now);
        }
        qualifies
    }

    /// Picks through a screen point given in normalised device coordinates.
    pub fn pick_at(&mut self, ndc: Vec2, aspect: f32, now: Instant) -> Option<NodeId> {
        let (origin, dir) = self.camera.pose().ray_through(self.target, ndc, aspect);
        let hit = self.scene.pick(origin, dir);
        match hit {
            Some(node) => {
                self.pick(node, now);
            }
            None => self.camera.register_interaction(now),
        }
        hit
    }

    pub fn orbit(&mut self, delta_alpha: f32, now: Instant) -> bool {
        self.camera.orbit(delta_alpha, now)
    }

    pub fn register_interaction(&mut self, now: Instant) {
        self.camera.register_interaction(now);
    }

    pub fn cycle_furniture(&mut self) -> Option<usize> {
        let bindings = self.bindings.as_ref()?;
        self.furniture.cycle(&mut self.scene, &bindings.furniture)
    }

    pub fn select_time_index(&mut self, index: usize) -> bool {
        self.emission.select_time_index(index)
    }

    pub fn time_index(&self) -> usize {
        self.emission.time_index()
    }

    pub fn time_samples(&self) -> usize {
        self.emission.time_samples()
    }

    pub fn time_label(&self) -> String {
        time_of_day_label(self.emission.time_index())
    }

    pub fn sun_state(&self) -> SunBlendState {
        self.emission.sun_state()
    }

    pub fn sun_base_color(&self, variant: SunVariant) -> Vec3 {
        self.emission.base_color(variant)
    }

    pub fn config(&self) -> &WalkthroughConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn is_loaded(&self) -> bool {
        self.bindings.is_some()
    }

    pub fn pose(&self) -> &CameraPose {
        self.camera.pose()
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn toggle_mode(&self) -> bool {
        self.toggle_mode
    }

    pub fn is_ortho_view(&self) -> bool {
        self.camera.is_ortho_view()
    }

    pub fn is_idle_rotating(&self) -> bool {
        self.camera.is_idle_rotating()
    }

    pub fn quadrant(&self) -> u8 {
        self.quadrant
    }

    pub fn wall_visibility(&self) -> Option<WallVisibility> {
        self.walls.current()
    }

    pub fn furniture_selection(&self) -> Option<usize> {
        self.furniture.active()
    }

    pub fn marker_link(&self) -> Option<MarkerLink> {
        self.marker.link()
    }

    /// World position of the linked entrance anchor.
    pub fn marker_position(&self) -> Option<Vec3> {
        let link = self.marker.link()?;
        self.scene.node(link.node).map(|n| n.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emission::sun_blend_factor;
    use crate::model::build_demo_house;
    use crate::scene::Emission;
    use crate::visibility::{wall_visibility, WallSide};
    use std::time::Duration;

    fn loaded() -> Walkthrough {
        let mut w = Walkthrough::new(WalkthroughConfig::default());
        w.load_scene(build_demo_house(10.0, 8.0, 3.0));
        w
    }

    fn settle(w: &mut Walkthrough, progress: f32, now: Instant) -> FrameSummary {
        let mut summary = w.update(progress, now);
        for _ in 0..300 {
            summary = w.update(progress, now);
        }
        summary
    }

    fn wall_enabled(w: &Walkthrough, side: WallSide) -> bool {
        let walls = &w.bindings.as_ref().unwrap().walls;
        walls
            .nodes(side)
            .iter()
            .all(|&n| w.scene().node(n).unwrap().state.enabled)
    }

    #[test]
    fn test_ortho_hides_walls_perspective_shows_them() {
        let mut w = loaded();
        let now = Instant::now();
        settle(&mut w, 0.0, now);
        assert!(w.is_ortho_view());
        assert!(WallSide::ALL.iter().all(|s| !wall_enabled(&w, *s)));

        settle(&mut w, 1.0, now);
        assert!(!w.is_ortho_view());
        assert!(WallSide::ALL.iter().all(|s| wall_enabled(&w, *s)));
    }

    #[test]
    fn test_toggle_culls_walls_for_quadrant() {
        let mut w = loaded();
        let now = Instant::now();
        settle(&mut w, 1.0, now);
        w.toggle(now);
        w.update(1.0, now);

        let expected = wall_visibility(false, true, w.quadrant());
        for side in WallSide::ALL {
            assert_eq!(wall_enabled(&w, side), expected.is_visible(side), "{side:?}");
        }

        // rotate into the next quadrant; walls follow
        let before = w.quadrant();
        w.orbit(std::f32::consts::FRAC_PI_2, now);
        let summary = w.update(1.0, now);
        assert!(summary.quadrant_changed);
        assert_ne!(w.quadrant(), before);
        let expected = wall_visibility(false, true, w.quadrant());
        for side in WallSide::ALL {
            assert_eq!(wall_enabled(&w, side), expected.is_visible(side), "{side:?}");
        }
    }

    #[test]
    fn test_pick_toggles_and_drives_emission() {
        let mut w = loaded();
        let now = Instant::now();
        settle(&mut w, 1.0, now);
        let hit = w.pick_at(Vec2::ZERO, 1.5, now);
        assert!(hit.is_some());
        assert!(w.toggle_mode());

        w.update(0.5, now);
        let accent = w.bindings.as_ref().unwrap().materials.accent.unwrap();
        let color = Vec3::from(w.config().emission.accent_color);
        assert_eq!(w.scene().material(accent.id).unwrap().emission, Emission::Flat(color));

        w.update(0.8, now);
        assert_eq!(
            w.scene().material(accent.id).unwrap().emission,
            Emission::Sun(SunVariant::Accent)
        );
        assert_eq!(w.sun_state().blend, sun_blend_factor(0.8, 0.66, 0.05));
    }

    #[test]
    fn test_toggle_round_trip_keeps_demo_accent_intensity() {
        let mut w = loaded();
        let now = Instant::now();
        let accent = w.bindings.as_ref().unwrap().materials.accent.unwrap();
        w.update(0.5, now);
        let before = w.scene().material(accent.id).unwrap().clone();

        w.toggle(now);
        w.update(0.5, now);
        assert_eq!(w.scene().material(accent.id).unwrap().emissive_intensity(), 1.0);

        w.toggle(now);
        w.update(0.5, now);
        let after = w.scene().material(accent.id).unwrap();
        assert_eq!(after.emissive_intensity(), 0.6);
        assert_eq!(after.emission, before.emission);
    }

    #[test]
    fn test_toggle_and_scroll_input_stop_idle_spin() {
        let mut w = loaded();
        let start = Instant::now();
        settle(&mut w, 1.0, start);

        let later = start + Duration::from_millis(w.config().camera.idle_timeout_ms + 100);
        w.update(1.0, later);
        assert!(w.is_idle_rotating());

        w.toggle(later);
        w.update(1.0, later + Duration::from_millis(10));
        assert!(!w.is_idle_rotating());

        let much_later = later + Duration::from_millis(w.config().camera.idle_timeout_ms + 100);
        w.update(1.0, much_later);
        assert!(w.is_idle_rotating());

        // wheel scrolling reports itself through register_interaction
        w.register_interaction(much_later);
        w.update(0.9, much_later + Duration::from_millis(10));
        assert!(!w.is_idle_rotating());
    }

    #[test]
    fn test_pick_on_anchor_does_not_toggle() {
        let mut w = loaded();
        let anchor = w.bindings.as_ref().unwrap().anchors.high.unwrap();
        assert!(!w.pick(anchor, Instant::now()));
        assert!(!w.toggle_mode());
    }

    #[test]
    fn test_marker_follows_quadrant() {
        let mut w = loaded();
        let now = Instant::now();
        let summary = settle(&mut w, 1.0, now);
        let link = w.marker_link().expect("marker linked");
        let anchors = w.bindings.as_ref().unwrap().anchors;
        let expected = crate::marker::anchor_for_quadrant(summary.quadrant);
        assert_eq!(Some(link.node), anchors.node(expected));
        assert!(w.marker_position().is_some());
    }

    #[test]
    fn test_furniture_cycle_and_reset() {
        let mut w = loaded();
        assert_eq!(w.cycle_furniture(), Some(0));
        assert_eq!(w.cycle_furniture(), Some(1));
        w.toggle(Instant::now());
        w.reset();
        assert_eq!(w.furniture_selection(), None);
        assert!(!w.toggle_mode());
        assert!(w.is_loaded());
    }

    #[test]
    fn test_unloaded_session_is_soft() {
        let mut w = Walkthrough::new(WalkthroughConfig::default());
        let now = Instant::now();
        let summary = w.update(0.5, now);
        assert!(!summary.walls_changed);
        assert_eq!(w.cycle_furniture(), None);
        assert_eq!(w.pick_at(Vec2::ZERO, 1.0, now), None);
        assert_eq!(w.marker_position(), None);
    }

    #[test]
    fn test_non_finite_progress_is_ignored() {
        let mut w = loaded();
        let now = Instant::now();
        w.update(0.4, now);
        w.update(f32::NAN, now);
        assert_eq!(w.progress(), 0.4);
        w.update(7.0, now);
        assert_eq!(w.progress(), 1.0);
    }

    #[test]
    fn test_time_selection() {
        let mut w = loaded();
        assert!(w.select_time_index(1));
        assert_eq!(w.time_label(), "Sun path - 6AM");
        assert!(!w.select_time_index(99));
        assert_eq!(w.time_index(), 1);
    }
}
