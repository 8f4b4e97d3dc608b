use glam::DVec3;
use tracing::trace;

use crate::model::{InteractableDescriptor, InteractableId};

/// Nearest interactable within its own trigger radius.
pub fn nearest(position: DVec3, descriptors: &[InteractableDescriptor]) -> Option<InteractableId> {
    let mut best: Option<(InteractableId, f64)> = None;
    for d in descriptors {
        let distance = position.distance(d.position);
        if distance >= d.trigger_radius {
            continue;
        }
        if best.map_or(true, |(_, min)| distance < min) {
            best = Some((d.id, distance));
        }
    }
    best.map(|(id, _)| id)
}

/// Throttled [`nearest`] lookup; holds the last result between refreshes.
#[derive(Debug, Clone)]
pub struct ProximityIndex {
    interval: u32,
    frame: u32,
    current: Option<InteractableId>,
}

impl ProximityIndex {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            frame: 0,
            current: None,
        }
    }

    pub fn current(&self) -> Option<InteractableId> {
        self.current
    }

    /// Advance one frame; recomputes on the first frame and every `interval` frames after.
    pub fn tick(&mut self, position: DVec3, descriptors: &[InteractableDescriptor]) -> Option<InteractableId> {
        if self.frame % self.interval == 0 {
            let next = nearest(position, descriptors);
            if next != self.current {
                trace!(from = ?self.current, to = ?next, "nearest interactable changed");
            }
            self.current = next;
        }
        self.frame = self.frame.wrapping_add(1);
        self.current
    }

    pub fn reset(&mut self) {
        self.frame = 0;
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InteractableKind;

    fn desc(id: InteractableId, x: f64, radius: f64) -> InteractableDescriptor {
        InteractableDescriptor {
            id,
            position: DVec3::new(x, 0.0, 0.0),
            trigger_radius: radius,
            kind: InteractableKind::Toggle,
            label: String::new(),
        }
    }

    #[test]
    fn test_picks_closest_qualifying() {
        let list = [desc(InteractableId::Monitor, 4.0, 5.0), desc(InteractableId::Laptop, -2.0, 3.0)];
        assert_eq!(nearest(DVec3::ZERO, &list), Some(InteractableId::Laptop));
    }

    #[test]
    fn test_radius_is_exclusive() {
        let list = [desc(InteractableId::Trophy, 3.0, 3.0)];
        assert_eq!(nearest(DVec3::ZERO, &list), None);
    }

    #[test]
    fn test_closer_but_out_of_range_loses() {
        let list = [desc(InteractableId::Laptop, 1.0, 0.5), desc(InteractableId::Whiteboard, 4.0, 5.0)];
        assert_eq!(nearest(DVec3::ZERO, &list), Some(InteractableId::Whiteboard));
    }

    #[test]
    fn test_throttled_holds_result() {
        let list = [desc(InteractableId::Phone, 0.0, 3.0)];
        let mut index = ProximityIndex::new(5);

        assert_eq!(index.tick(DVec3::ZERO, &list), Some(InteractableId::Phone));
        for _ in 0..4 {
            assert_eq!(index.tick(DVec3::new(50.0, 0.0, 0.0), &list), Some(InteractableId::Phone));
        }
        assert_eq!(index.tick(DVec3::new(50.0, 0.0, 0.0), &list), None);
    }

    #[test]
    fn test_reset_clears() {
        let list = [desc(InteractableId::Phone, 0.0, 3.0)];
        let mut index = ProximityIndex::new(5);
        index.tick(DVec3::ZERO, &list);
        index.reset();
        assert_eq!(index.current(), None);
    }
}
