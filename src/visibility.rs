// visibility.rs — which wall groups are shown for a view mode / toggle / quadrant

use crate::scene::{NodeId, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WallSide {
    North,
    South,
    East,
    West,
}

impl WallSide {
    pub const ALL: [WallSide; 4] = [WallSide::North, WallSide::South, WallSide::East, WallSide::West];

    fn index(self) -> usize {
        match self {
            WallSide::North => 0,
            WallSide::South => 1,
            WallSide::East => 2,
            WallSide::West => 3,
        }
    }
}

/// Visible/hidden flag per wall side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallVisibility([bool; 4]);

impl WallVisibility {
    pub const ALL_VISIBLE: WallVisibility = WallVisibility([true; 4]);
    pub const ALL_HIDDEN: WallVisibility = WallVisibility([false; 4]);

    pub fn is_visible(&self, side: WallSide) -> bool {
        self.0[side.index()]
    }

    pub fn visible_sides(&self) -> Vec<WallSide> {
        WallSide::ALL
            .into_iter()
            .filter(|side| self.is_visible(*side))
            .collect()
    }

    fn hiding(hidden: [WallSide; 2]) -> Self {
        let mut flags = [true; 4];
        for side in hidden {
            flags[side.index()] = false;
        }
        WallVisibility(flags)
    }
}

/// Walls hidden in the interior view: the two nearest the camera per quadrant.
pub fn walls_hidden_in_quadrant(quadrant: u8) -> [WallSide; 2] {
    match quadrant {
        1 => [WallSide::West, WallSide::South],
        2 => [WallSide::South, WallSide::East],
        3 => [WallSide::East, WallSide::North],
        _ => [WallSide::North, WallSide::West],
    }
}

pub fn wall_visibility(is_ortho_view: bool, toggle_mode: bool, quadrant: u8) -> WallVisibility {
    if is_ortho_view {
        WallVisibility::ALL_HIDDEN
    } else if !toggle_mode {
        WallVisibility::ALL_VISIBLE
    } else {
        WallVisibility::hiding(walls_hidden_in_quadrant(quadrant))
    }
}

/// Wall meshes grouped by side, fixed once the model is bound.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WallGroups {
    groups: [Vec<NodeId>; 4],
}

impl WallGroups {
    pub fn push(&mut self, side: WallSide, node: NodeId) {
        self.groups[side.index()].push(node);
    }

    pub fn nodes(&self, side: WallSide) -> &[NodeId] {
        &self.groups[side.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Vec::is_empty)
    }
}

/// Applies the wall table only when one of its inputs changes.
#[derive(Debug, Default)]
pub struct WallController {
    applied: Option<WallVisibility>,
}

impl WallController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<WallVisibility> {
        self.applied
    }

    /// Forces the next `apply` to write even if nothing changed.
    pub fn invalidate(&mut self) {
        self.applied = None;
    }

    /// Returns true when the scene was written.
    pub fn apply(
        &mut self,
        scene: &mut Scene,
        walls: &WallGroups,
        is_ortho_view: bool,
        toggle_mode: bool,
        quadrant: u8,
    ) -> bool {
        let visibility = wall_visibility(is_ortho_view, toggle_mode, quadrant);
        if self.applied == Some(visibility) {
            return false;
        }
        for side in WallSide::ALL {
            let enabled = visibility.is_visible(side);
            for &node in walls.nodes(side) {
                scene.set_enabled(node, enabled);
            }
        }
        log::debug!("Walls visible: {:?}", visibility.visible_sides());
        self.applied = Some(visibility);
        true
    }
}
