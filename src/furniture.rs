// furniture.rs — one-at-a-time furniture layouts and the end-of-page shrink

use crate::config::SectionConfig;
use crate::scene::{NodeId, Scene};
use glam::Vec3;

pub const FURNITURE_SET_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FurnitureMember {
    pub node: NodeId,
    /// Scale captured at load; the shrink multiplies this.
    pub original_scale: Vec3,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FurnitureSet {
    pub members: Vec<FurnitureMember>,
}

impl FurnitureSet {
    fn hide(&self, scene: &mut Scene) {
        for m in &self.members {
            scene.set_enabled(m.node, false);
            scene.set_scale(m.node, m.original_scale);
            scene.set_visibility(m.node, 1.0);
        }
    }

    fn show(&self, scene: &mut Scene) {
        for m in &self.members {
            scene.set_scale(m.node, m.original_scale);
            scene.set_visibility(m.node, 1.0);
            scene.set_enabled(m.node, true);
        }
    }
}

/// Shrink multiplier for a scroll position: 1 before the section, `floor` at its end.
pub fn shrink_factor(progress: f32, sections: &SectionConfig) -> (f32, bool) {
    let t = if sections.shrink_span <= 0.0 {
        if progress >= sections.shrink_start { 1.0 } else { 0.0 }
    } else {
        ((progress - sections.shrink_start) / sections.shrink_span).clamp(0.0, 1.0)
    };
    let factor = 1.0 - (1.0 - sections.shrink_floor) * t;
    (factor, t >= 1.0)
}

#[derive(Debug, Default)]
pub struct FurnitureController {
    active: Option<usize>,
}

impl FurnitureController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the visible set, `None` when no furniture is shown.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Hides every set; used right after binding a model.
    pub fn hide_all(&mut self, scene: &mut Scene, sets: &[FurnitureSet]) {
        for set in sets {
            set.hide(scene);
        }
        self.active = None;
    }

    /// none → 1 → 2 → 3 → none. Returns the new selection.
    pub fn cycle(&mut self, scene: &mut Scene, sets: &[FurnitureSet]) -> Option<usize> {
        if let Some(set) = self.active.and_then(|i| sets.get(i)) {
            set.hide(scene);
        }
        self.active = match self.active {
            None if !sets.is_empty() => Some(0),
            Some(i) if i + 1 < sets.len() => Some(i + 1),
            _ => None,
        };
        if let Some(set) = self.active.and_then(|i| sets.get(i)) {
            set.show(scene);
        }
        log::debug!("Furniture selection -> {:?}", self.active.map(|i| i + 1));
        self.active
    }

    /// Shrinks the active set as progress enters the final section.
    pub fn update(
        &mut self,
        scene: &mut Scene,
        sets: &[FurnitureSet],
        toggle_mode: bool,
        progress: f32,
        sections: &SectionConfig,
    ) {
        if !toggle_mode {
            return;
        }
        let Some(set) = self.active.and_then(|i| sets.get(i)) else {
            return;
        };
        let (factor, gone) = shrink_factor(progress, sections);
        for m in &set.members {
            scene.set_scale(m.node, m.original_scale * factor);
            scene.set_visibility(m.node, if gone { 0.0 } else { 1.0 });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Aabb, Material, MaterialKind};

    fn build() -> (Scene, Vec<FurnitureSet>) {
        let mut scene = Scene::new();
        let m = scene.add_material(Material::new("Wood", MaterialKind::Standard));
        let sets = (0..FURNITURE_SET_COUNT)
            .map(|i| {
                let members = (0..2)
                    .map(|j| {
                        let x = (i * 4 + j * 2) as f32;
                        let node = scene.add_mesh(
                            format!("Furniture_{}_{j}", i + 1),
                            Aabb::new(Vec3::new(x, 0.0, 0.0), Vec3::new(x + 1.0, 1.0, 1.0)),
                            m,
                        );
                        FurnitureMember {
                            node,
                            original_scale: Vec3::ONE,
                        }
                    })
                    .collect();
                FurnitureSet { members }
            })
            .collect();
        (scene, sets)
    }

    fn enabled_sets(scene: &Scene, sets: &[FurnitureSet]) -> usize {
        sets.iter()
            .filter(|s| s.members.iter().any(|m| scene.node(m.node).unwrap().state.enabled))
            .count()
    }

    #[test]
    fn test_cycle_wraps_through_none() {
        let (mut scene, sets) = build();
        let mut c = FurnitureController::new();
        c.hide_all(&mut scene, &sets);
        let seen: Vec<_> = (0..5).map(|_| c.cycle(&mut scene, &sets)).collect();
        assert_eq!(seen, vec![Some(0), Some(1), Some(2), None, Some(0)]);
    }

    #[test]
    fn test_at_most_one_set_enabled() {
        let (mut scene, sets) = build();
        let mut c = FurnitureController::new();
        c.hide_all(&mut scene, &sets);
        assert_eq!(enabled_sets(&scene, &sets), 0);
        for _ in 0..11 {
            c.cycle(&mut scene, &sets);
            let expected = usize::from(c.active().is_some());
            assert_eq!(enabled_sets(&scene, &sets), expected);
        }
    }

    #[test]
    fn test_shrink_and_regrow() {
        let (mut scene, sets) = build();
        let sections = SectionConfig::default();
        let mut c = FurnitureController::new();
        c.hide_all(&mut scene, &sets);
        c.cycle(&mut scene, &sets);
        let node = sets[0].members[0].node;

        c.update(&mut scene, &sets, true, 0.5, &sections);
        assert_eq!(scene.node(node).unwrap().state.scale, Vec3::ONE);

        c.update(&mut scene, &sets, true, 0.685, &sections);
        let state = scene.node(node).unwrap().state;
        assert!((state.scale.x - 0.95).abs() < 1e-3);
        assert_eq!(state.visibility, 1.0);

        c.update(&mut scene, &sets, true, 0.8, &sections);
        let state = scene.node(node).unwrap().state;
        assert!((state.scale.x - 0.9).abs() < 1e-5);
        assert_eq!(state.visibility, 0.0);
        assert!(state.enabled);

        c.update(&mut scene, &sets, true, 0.3, &sections);
        assert_eq!(scene.node(node).unwrap().state.visibility, 1.0);
    }

    #[test]
    fn test_shrink_noop_when_toggle_off() {
        let (mut scene, sets) = build();
        let mut c = FurnitureController::new();
        c.hide_all(&mut scene, &sets);
        c.cycle(&mut scene, &sets);
        c.update(&mut scene, &sets, false, 1.0, &SectionConfig::default());
        let state = scene.node(sets[0].members[0].node).unwrap().state;
        assert_eq!(state.scale, Vec3::ONE);
        assert_eq!(state.visibility, 1.0);
    }

    #[test]
    fn test_switching_restores_scale() {
        let (mut scene, sets) = build();
        let mut c = FurnitureController::new();
        c.hide_all(&mut scene, &sets);
        c.cycle(&mut scene, &sets);
        c.update(&mut scene, &sets, true, 1.0, &SectionConfig::default());
        c.cycle(&mut scene, &sets);
        let state = scene.node(sets[0].members[0].node).unwrap().state;
        assert_eq!(state.scale, Vec3::ONE);
        assert!(!state.enabled);
    }
}
