// bindings.rs — the single place where scene names turn into typed handles
//
// Everything downstream works with NodeId / MaterialId groups; naming
// conventions (see NameConfig) stay here.

use crate::config::NameConfig;
use crate::emission::{AccentMaterials, MaterialSlot};
use crate::furniture::{FurnitureMember, FurnitureSet, FURNITURE_SET_COUNT};
use crate::marker::EntranceAnchors;
use crate::scene::{MaterialId, NodeId, Scene};
use crate::visibility::{WallGroups, WallSide};
use glam::Vec3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneBindings {
    pub walls: WallGroups,
    pub materials: AccentMaterials,
    pub furniture: Vec<FurnitureSet>,
    pub anchors: EntranceAnchors,
    /// Orbit target node.
    pub base: Option<NodeId>,
}

impl SceneBindings {
    pub fn bind(scene: &Scene, names: &NameConfig) -> Self {
        let mut bindings = SceneBindings {
            furniture: vec![FurnitureSet::default(); FURNITURE_SET_COUNT],
            ..SceneBindings::default()
        };

        let sides = [
            (WallSide::North, names.north.to_lowercase()),
            (WallSide::South, names.south.to_lowercase()),
            (WallSide::East, names.east.to_lowercase()),
            (WallSide::West, names.west.to_lowercase()),
        ];

        for (id, node) in scene.nodes() {
            let name = node.name.as_str();

            if let Some(material_id) = node.material() {
                bindings.capture_material(scene, material_id, names);
            }

            if node.material().is_some() && name.contains(&names.wall_marker) {
                let lower = name.to_lowercase();
                if let Some((side, _)) = sides.iter().find(|(_, s)| lower.contains(s.as_str())) {
                    bindings.walls.push(*side, id);
                }
            }

            if node.material().is_some() {
                if let Some(i) = names
                    .furniture_prefixes
                    .iter()
                    .position(|prefix| name.starts_with(prefix.as_str()))
                {
                    bindings.furniture[i].members.push(FurnitureMember {
                        node: id,
                        original_scale: node.state.scale,
                    });
                }
            }

            if name == names.entrance_high && bindings.anchors.high.is_none() {
                bindings.anchors.high = Some(id);
            } else if name == names.entrance_low && bindings.anchors.low.is_none() {
                bindings.anchors.low = Some(id);
            } else if name == names.base && bindings.base.is_none() {
                bindings.base = Some(id);
            }
        }

        bindings.report_missing(names);
        bindings
    }

    // the first mesh that uses a material name decides which material is bound
    fn capture_material(&mut self, scene: &Scene, id: MaterialId, names: &NameConfig) {
        let Some(material) = scene.material(id) else {
            return;
        };
        let slot = if material.name == names.accent_material {
            &mut self.materials.accent
        } else if material.name == names.accent_2_material {
            &mut self.materials.accent_2
        } else if material.name == names.white_material {
            &mut self.materials.white
        } else {
            return;
        };
        if slot.is_none() {
            *slot = Some(MaterialSlot {
                id,
                original_emissive: material.emissive_color().unwrap_or(Vec3::ZERO),
                original_intensity: material.emissive_intensity(),
            });
        }
    }

    fn report_missing(&self, names: &NameConfig) {
        if self.walls.is_empty() {
            log::warn!("No wall meshes matching '{}' found", names.wall_marker);
        }
        for (slot, name) in [
            (self.materials.accent, &names.accent_material),
            (self.materials.accent_2, &names.accent_2_material),
            (self.materials.white, &names.white_material),
        ] {
            if slot.is_none() {
                log::warn!("Material '{name}' not found on any mesh");
            }
        }
        for (set, prefix) in self.furniture.iter().zip(&names.furniture_prefixes) {
            if set.members.is_empty() {
                log::warn!("Furniture set '{prefix}' has no meshes");
            }
        }
        if self.anchors.high.is_none() || self.anchors.low.is_none() {
            log::warn!(
                "Entrance anchors incomplete (high: {}, low: {})",
                self.anchors.high.is_some(),
                self.anchors.low.is_some()
            );
        }
    }

    /// Centre the camera orbits around.
    pub fn target(&self, scene: &Scene) -> Vec3 {
        self.base
            .and_then(|id| scene.node(id))
            .map(|node| node.position())
            .or_else(|| scene.bounds().map(|b| b.center()))
            .unwrap_or(Vec3::ZERO)
    }
}
