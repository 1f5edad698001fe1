// model.rs — model loading: JSON model files and the built-in demo house
//
// A model file lists materials and nodes. Mesh nodes are boxes:
//   { "name": "Wall_Top_north", "min": [..], "max": [..], "material": "White" }
// Transform nodes only carry a position:
//   { "name": "Entrance_High", "position": [..] }

use crate::error::{Result, WalkthroughError};
use crate::scene::{Aabb, Material, MaterialId, MaterialKind, Scene};
use glam::Vec3;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ModelFile {
    #[serde(default)]
    materials: Vec<MaterialDesc>,
    #[serde(default)]
    nodes: Vec<NodeDesc>,
}

#[derive(Debug, Deserialize)]
struct MaterialDesc {
    name: String,
    #[serde(default = "default_diffuse")]
    diffuse: [f32; 3],
    #[serde(default)]
    emissive: [f32; 3],
    #[serde(default)]
    kind: MaterialKindDesc,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MaterialKindDesc {
    #[default]
    Standard,
    Pbr {
        #[serde(default = "default_intensity")]
        emissive_intensity: f32,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NodeDesc {
    Mesh {
        name: String,
        min: [f32; 3],
        max: [f32; 3],
        material: String,
    },
    Transform {
        name: String,
        position: [f32; 3],
    },
}

fn default_diffuse() -> [f32; 3] {
    [0.8, 0.8, 0.8]
}

fn default_intensity() -> f32 {
    1.0
}

/// Builds a scene from model JSON. `path` is only used for error messages.
pub fn parse_model(text: &str, path: &Path) -> Result<Scene> {
    let file: ModelFile = serde_json::from_str(text).map_err(|source| WalkthroughError::ModelParse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut scene = Scene::new();
    let mut by_name: Vec<(String, MaterialId)> = Vec::new();
    for desc in file.materials {
        let kind = match desc.kind {
            MaterialKindDesc::Standard => MaterialKind::Standard,
            MaterialKindDesc::Pbr { emissive_intensity } => MaterialKind::Pbr { emissive_intensity },
        };
        let id = scene.add_material(
            Material::new(desc.name.clone(), kind)
                .with_diffuse(Vec3::from(desc.diffuse))
                .with_emissive(Vec3::from(desc.emissive)),
        );
        by_name.push((desc.name, id));
    }

    for desc in file.nodes {
        match desc {
            NodeDesc::Mesh {
                name,
                min,
                max,
                material,
            } => {
                // first material with a given name wins
                let Some(&(_, id)) = by_name.iter().find(|(n, _)| *n == material) else {
                    return Err(WalkthroughError::UnknownMaterial { node: name, material });
                };
                scene.add_mesh(name, Aabb::new(Vec3::from(min), Vec3::from(max)), id);
            }
            NodeDesc::Transform { name, position } => {
                scene.add_transform(name, Vec3::from(position));
            }
        }
    }

    Ok(scene)
}

pub fn load_model_file(path: &Path) -> Result<Scene> {
    let text = std::fs::read_to_string(path).map_err(|source| WalkthroughError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let scene = parse_model(&text, path)?;
    log::info!(
        "Loaded model {} ({} nodes, {} materials)",
        path.display(),
        scene.node_count(),
        scene.material_count()
    );
    Ok(scene)
}

/// A small procedural house that follows every naming convention the walkthrough binds.
///
/// Wall sides sit so that each quadrant's hidden pair faces the camera:
/// west on +X, east on -X, south on +Z, north on -Z.
pub fn build_demo_house(width: f32, depth: f32, height: f32) -> Scene {
    let mut scene = Scene::new();
    let hw = width * 0.5;
    let hd = depth * 0.5;
    let t = 0.2;

    let floor = scene.add_material(
        Material::new("Floor", MaterialKind::Standard).with_diffuse(Vec3::new(0.55, 0.42, 0.3)),
    );
    let white = scene.add_material(
        Material::new("White", MaterialKind::Standard)
            .with_diffuse(Vec3::splat(0.92))
            .with_emissive(Vec3::splat(0.05)),
    );
    let accent = scene.add_material(
        Material::new("Accent", MaterialKind::Pbr { emissive_intensity: 0.6 })
            .with_diffuse(Vec3::new(0.8, 0.5, 0.3)),
    );
    let accent_2 = scene.add_material(
        Material::new("Accent_2", MaterialKind::Pbr { emissive_intensity: 0.6 })
            .with_diffuse(Vec3::new(0.3, 0.5, 0.8)),
    );
    let wood = scene.add_material(
        Material::new("Wood", MaterialKind::Standard).with_diffuse(Vec3::new(0.45, 0.3, 0.18)),
    );
    let fabric = scene.add_material(
        Material::new("Fabric", MaterialKind::Standard).with_diffuse(Vec3::new(0.35, 0.38, 0.42)),
    );

    let aabb = |min: [f32; 3], max: [f32; 3]| Aabb::new(Vec3::from(min), Vec3::from(max));

    scene.add_mesh("Base", aabb([-hw - t, -t, -hd - t], [hw + t, 0.0, hd + t]), floor);

    // two segments per side leave a doorway in the middle
    let gap = 0.6;
    scene.add_mesh("Wall_Top_west_a", aabb([hw, 0.0, -hd], [hw + t, height, -gap]), white);
    scene.add_mesh("Wall_Top_west_b", aabb([hw, 0.0, gap], [hw + t, height, hd]), white);
    scene.add_mesh("Wall_Top_east_a", aabb([-hw - t, 0.0, -hd], [-hw, height, -gap]), white);
    scene.add_mesh("Wall_Top_east_b", aabb([-hw - t, 0.0, gap], [-hw, height, hd]), white);
    scene.add_mesh("Wall_Top_south_a", aabb([-hw, 0.0, hd], [-gap, height, hd + t]), white);
    scene.add_mesh("Wall_Top_south_b", aabb([gap, 0.0, hd], [hw, height, hd + t]), white);
    scene.add_mesh("Wall_Top_north_a", aabb([-hw, 0.0, -hd - t], [-gap, height, -hd]), white);
    scene.add_mesh("Wall_Top_north_b", aabb([gap, 0.0, -hd - t], [hw, height, -hd]), white);

    scene.add_mesh("Interior_Wall", aabb([-t * 0.5, 0.0, -hd], [t * 0.5, height, -hd * 0.2]), white);
    scene.add_mesh("Kitchen_Island", aabb([-hw * 0.7, 0.0, -hd * 0.8], [-hw * 0.3, 0.9, -hd * 0.5]), accent);
    scene.add_mesh("Fireplace", aabb([hw * 0.5, 0.0, -hd * 0.9], [hw * 0.9, 1.2, -hd * 0.75]), accent_2);
    scene.add_mesh("Ceiling_Light", aabb([-0.3, height - 0.15, -0.3], [0.3, height - 0.05, 0.3]), white);

    // furniture layouts, one visible at a time
    scene.add_mesh("Furniture_1_Sofa", aabb([hw * 0.2, 0.0, hd * 0.4], [hw * 0.8, 0.8, hd * 0.7]), fabric);
    scene.add_mesh("Furniture_1_Table", aabb([hw * 0.35, 0.0, hd * 0.05], [hw * 0.65, 0.45, hd * 0.3]), wood);
    scene.add_mesh("Furniture_2_Bed", aabb([-hw * 0.8, 0.0, hd * 0.2], [-hw * 0.3, 0.6, hd * 0.8]), fabric);
    scene.add_mesh("Furniture_2_Desk", aabb([hw * 0.3, 0.0, hd * 0.6], [hw * 0.8, 0.75, hd * 0.85]), wood);
    scene.add_mesh("Furniture_3_Dining", aabb([-hw * 0.3, 0.0, hd * 0.1], [hw * 0.3, 0.75, hd * 0.5]), wood);
    scene.add_mesh("Furniture_3_Shelf", aabb([-hw * 0.9, 0.0, -hd * 0.1], [-hw * 0.75, 1.8, hd * 0.6]), wood);

    scene.add_transform("Entrance_High", Vec3::new(hw + t, height * 0.5, 0.0));
    scene.add_transform("Entrance_Low", Vec3::new(-hw - t, height * 0.5, 0.0));

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Emission, NodeKind};

    const SAMPLE: &str = r#"{
        "materials": [
            { "name": "White", "emissive": [0.1, 0.1, 0.1] },
            { "name": "Accent", "kind": { "pbr": { "emissive_intensity": 0.4 } } },
            { "name": "White", "emissive": [0.9, 0.0, 0.0] }
        ],
        "nodes": [
            { "name": "Wall_Top_north", "min": [0, 0, 0], "max": [1, 2, 0.2], "material": "White" },
            { "name": "Entrance_High", "position": [1, 2, 3] }
        ]
    }"#;

    #[test]
    fn test_parse_model() {
        let scene = parse_model(SAMPLE, Path::new("sample.json")).unwrap();
        assert_eq!(scene.node_count(), 2);
        assert_eq!(scene.material_count(), 3);

        let (_, wall) = scene.nodes().next().unwrap();
        let material = scene.material(wall.material().unwrap()).unwrap();
        assert_eq!(material.emission, Emission::Flat(Vec3::splat(0.1)));

        let (_, anchor) = scene.nodes().nth(1).unwrap();
        assert!(matches!(anchor.kind, NodeKind::Transform { .. }));
        assert_eq!(anchor.position(), Vec3::new(1.0, 2.0, 3.0));

        let (_, accent) = scene.materials().nth(1).unwrap();
        assert_eq!(accent.kind, MaterialKind::Pbr { emissive_intensity: 0.4 });
    }

    #[test]
    fn test_unknown_material() {
        let text = r#"{ "nodes": [ { "name": "Sofa", "min": [0,0,0], "max": [1,1,1], "material": "Velvet" } ] }"#;
        let err = parse_model(text, Path::new("m.json")).unwrap_err();
        assert!(matches!(err, WalkthroughError::UnknownMaterial { .. }));
    }

    #[test]
    fn test_demo_house_has_conventions() {
        let scene = build_demo_house(10.0, 8.0, 3.0);
        let names: Vec<&str> = scene.nodes().map(|(_, n)| n.name.as_str()).collect();
        for needle in ["Base", "Entrance_High", "Entrance_Low", "Wall_Top_north_a", "Furniture_3_Shelf"] {
            assert!(names.contains(&needle), "missing {needle}");
        }
        let bounds = scene.bounds().unwrap();
        assert!(bounds.min.x < -5.0 && bounds.max.x > 5.0);
    }
}
