// scene.rs — registry of scene nodes and materials with typed handles
//
// Membership is fixed once the model is loaded; only per-node state
// (enabled / visibility / scale) and per-material emission change afterwards.

use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl MaterialId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Scales the box about its own centre.
    pub fn scaled(&self, scale: Vec3) -> Aabb {
        let c = self.center();
        let h = self.half_extents() * scale.abs();
        Aabb {
            min: c - h,
            max: c + h,
        }
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Slab test. Returns the entry distance along `dir`, if in front of `origin`.
    pub fn ray_hit(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let inv = dir.recip();
        let t0 = (self.min - origin) * inv;
        let t1 = (self.max - origin) * inv;
        let t_enter = t0.min(t1).max_element();
        let t_exit = t0.max(t1).min_element();
        if t_enter.is_nan() || t_exit.is_nan() || t_exit < t_enter.max(0.0) {
            return None;
        }
        Some(t_enter.max(0.0))
    }
}

/// Which material variants the renderer understands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialKind {
    Standard,
    /// Physically based; emission is additionally scaled by an intensity.
    Pbr { emissive_intensity: f32 },
}

/// Which base colour a sun-blended texture mixes with the time-of-day image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SunVariant {
    Neutral,
    Accent,
    Accent2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Emission {
    Flat(Vec3),
    /// Blend of the variant's base colour with the current time-of-day image.
    Sun(SunVariant),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: Vec3,
    pub kind: MaterialKind,
    pub emission: Emission,
}

impl Material {
    pub fn new(name: impl Into<String>, kind: MaterialKind) -> Self {
        Self {
            name: name.into(),
            diffuse: Vec3::splat(0.8),
            kind,
            emission: Emission::Flat(Vec3::ZERO),
        }
    }

    pub fn with_diffuse(mut self, diffuse: Vec3) -> Self {
        self.diffuse = diffuse;
        self
    }

    pub fn with_emissive(mut self, emissive: Vec3) -> Self {
        self.emission = Emission::Flat(emissive);
        self
    }

    pub fn emissive_color(&self) -> Option<Vec3> {
        match self.emission {
            Emission::Flat(c) => Some(c),
            Emission::Sun(_) => None,
        }
    }

    pub fn emissive_intensity(&self) -> f32 {
        match self.kind {
            MaterialKind::Standard => 1.0,
            MaterialKind::Pbr { emissive_intensity } => emissive_intensity,
        }
    }

    /// Drives the emission at full intensity.
    pub fn set_emission(&mut self, emission: Emission) {
        self.emission = emission;
        if let MaterialKind::Pbr { emissive_intensity } = &mut self.kind {
            *emissive_intensity = 1.0;
        }
    }

    /// Puts back a captured flat colour and intensity.
    pub fn restore_emission(&mut self, color: Vec3, intensity: f32) {
        self.emission = Emission::Flat(color);
        if let MaterialKind::Pbr { emissive_intensity } = &mut self.kind {
            *emissive_intensity = intensity;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeState {
    pub enabled: bool,
    /// 0 = present but invisible, 1 = fully visible.
    pub visibility: f32,
    pub scale: Vec3,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            enabled: true,
            visibility: 1.0,
            scale: Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Mesh { bounds: Aabb, material: MaterialId },
    /// Positional anchor without geometry.
    Transform { position: Vec3 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub state: NodeState,
}

impl Node {
    pub fn position(&self) -> Vec3 {
        match &self.kind {
            NodeKind::Mesh { bounds, .. } => bounds.center(),
            NodeKind::Transform { position } => *position,
        }
    }

    pub fn material(&self) -> Option<MaterialId> {
        match &self.kind {
            NodeKind::Mesh { material, .. } => Some(*material),
            NodeKind::Transform { .. } => None,
        }
    }

    /// Bounds with the current scale applied.
    pub fn world_bounds(&self) -> Option<Aabb> {
        match &self.kind {
            NodeKind::Mesh { bounds, .. } => Some(bounds.scaled(self.state.scale)),
            NodeKind::Transform { .. } => None,
        }
    }

    pub fn is_drawn(&self) -> bool {
        self.state.enabled && self.state.visibility > 0.0 && self.world_bounds().is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    materials: Vec<Material>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId((self.materials.len() - 1) as u32)
    }

    pub fn add_mesh(&mut self, name: impl Into<String>, bounds: Aabb, material: MaterialId) -> NodeId {
        self.push_node(Node {
            name: name.into(),
            kind: NodeKind::Mesh { bounds, material },
            state: NodeState::default(),
        })
    }

    pub fn add_transform(&mut self, name: impl Into<String>, position: Vec3) -> NodeId {
        self.push_node(Node {
            name: name.into(),
            kind: NodeKind::Transform { position },
            state: NodeState::default(),
        })
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId((self.nodes.len() - 1) as u32)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.index())
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialId(i as u32), m))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.state.enabled = enabled;
        }
    }

    pub fn set_visibility(&mut self, id: NodeId, visibility: f32) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.state.visibility = visibility.clamp(0.0, 1.0);
        }
    }

    pub fn set_scale(&mut self, id: NodeId, scale: Vec3) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.state.scale = scale;
        }
    }

    pub fn set_emission(&mut self, id: MaterialId, emission: Emission) {
        if let Some(material) = self.materials.get_mut(id.index()) {
            material.set_emission(emission);
        }
    }

    pub fn restore_emission(&mut self, id: MaterialId, color: Vec3, intensity: f32) {
        if let Some(material) = self.materials.get_mut(id.index()) {
            material.restore_emission(color, intensity);
        }
    }

    /// Nearest drawn mesh hit by the ray.
    pub fn pick(&self, origin: Vec3, dir: Vec3) -> Option<NodeId> {
        self.nodes()
            .filter(|(_, node)| node.is_drawn())
            .filter_map(|(id, node)| {
                let bounds = node.world_bounds()?;
                bounds.ray_hit(origin, dir).map(|t| (id, t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Union of all mesh bounds, ignoring state.
    pub fn bounds(&self) -> Option<Aabb> {
        self.nodes
            .iter()
            .filter_map(|node| match &node.kind {
                NodeKind::Mesh { bounds, .. } => Some(*bounds),
                NodeKind::Transform { .. } => None,
            })
            .reduce(|a, b| a.union(&b))
    }
}
