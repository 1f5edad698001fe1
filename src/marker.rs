// marker.rs — keeps the screen-space entrance marker linked to the visible entrance

use crate::scene::NodeId;
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntranceAnchor {
    High,
    Low,
}

/// Quadrants 1 and 4 see the high entrance, 2 and 3 the low one.
pub fn anchor_for_quadrant(quadrant: u8) -> EntranceAnchor {
    match quadrant {
        2 | 3 => EntranceAnchor::Low,
        _ => EntranceAnchor::High,
    }
}

/// Scene nodes for both anchors; either may be absent in a partial model.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EntranceAnchors {
    pub high: Option<NodeId>,
    pub low: Option<NodeId>,
}

impl EntranceAnchors {
    pub fn node(&self, anchor: EntranceAnchor) -> Option<NodeId> {
        match anchor {
            EntranceAnchor::High => self.high,
            EntranceAnchor::Low => self.low,
        }
    }
}

/// The node the marker follows plus its pixel offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerLink {
    pub anchor: EntranceAnchor,
    pub node: NodeId,
    pub offset_px: Vec2,
}

#[derive(Debug)]
pub struct EntranceMarker {
    offset_px: Vec2,
    link: Option<MarkerLink>,
    relinks: u32,
}

impl EntranceMarker {
    pub fn new(offset_px: Vec2) -> Self {
        Self {
            offset_px,
            link: None,
            relinks: 0,
        }
    }

    pub fn link(&self) -> Option<MarkerLink> {
        self.link
    }

    /// How many times the marker has been re-linked.
    pub fn relinks(&self) -> u32 {
        self.relinks
    }

    pub fn clear(&mut self) {
        self.link = None;
    }

    /// Re-links only when the chosen anchor differs from the current link.
    pub fn update(&mut self, quadrant: u8, anchors: &EntranceAnchors) -> bool {
        let anchor = anchor_for_quadrant(quadrant);
        if self.link.map(|l| l.anchor) == Some(anchor) {
            return false;
        }
        let Some(node) = anchors.node(anchor) else {
            return false;
        };
        self.link = Some(MarkerLink {
            anchor,
            node,
            offset_px: self.offset_px,
        });
        self.relinks += 1;
        log::debug!("Entrance marker linked to {anchor:?}");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use glam::Vec3;

    fn anchors() -> EntranceAnchors {
        let mut scene = Scene::new();
        EntranceAnchors {
            high: Some(scene.add_transform("Entrance_High", Vec3::Y)),
            low: Some(scene.add_transform("Entrance_Low", Vec3::ZERO)),
        }
    }

    #[test]
    fn test_anchor_table() {
        assert_eq!(anchor_for_quadrant(1), EntranceAnchor::High);
        assert_eq!(anchor_for_quadrant(2), EntranceAnchor::Low);
        assert_eq!(anchor_for_quadrant(3), EntranceAnchor::Low);
        assert_eq!(anchor_for_quadrant(4), EntranceAnchor::High);
    }

    #[test]
    fn test_relinks_once_per_change() {
        let anchors = anchors();
        let mut marker = EntranceMarker::new(Vec2::new(0.0, -40.0));
        assert!(marker.update(1, &anchors));
        for _ in 0..10 {
            assert!(!marker.update(1, &anchors));
            assert!(!marker.update(4, &anchors));
        }
        assert!(marker.update(2, &anchors));
        assert!(!marker.update(3, &anchors));
        assert_eq!(marker.relinks(), 2);

        let link = marker.link().unwrap();
        assert_eq!(link.node, anchors.low.unwrap());
        assert_eq!(link.offset_px, Vec2::new(0.0, -40.0));
    }

    #[test]
    fn test_missing_anchor_keeps_old_link() {
        let anchors = EntranceAnchors {
            low: None,
            ..anchors()
        };
        let mut marker = EntranceMarker::new(Vec2::ZERO);
        assert!(marker.update(1, &anchors));
        assert!(!marker.update(2, &anchors));
        assert_eq!(marker.link().unwrap().anchor, EntranceAnchor::High);
    }
}
