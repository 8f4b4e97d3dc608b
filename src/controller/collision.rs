//! Axis-separated sliding against static boxes.
//!
//! A blocked move is retried along X alone and then Z alone, so walking
//! diagonally into a wall slides along it instead of stopping dead.

use glam::DVec3;
use tracing::trace;

use crate::config::NavigationConfig;
use crate::model::StaticObstacle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Combined,
    XOnly,
    ZOnly,
    Blocked,
}

#[derive(Debug, Clone)]
pub struct CollisionResolver {
    /// Horizontal padding around every obstacle.
    pub margin: f64,
    /// Height above an obstacle's top that still collides.
    pub vertical_allowance: f64,
}

impl CollisionResolver {
    pub fn new(config: &NavigationConfig) -> Self {
        Self {
            margin: config.collision_margin,
            vertical_allowance: config.vertical_allowance,
        }
    }

    pub fn overlaps(&self, p: DVec3, o: &StaticObstacle) -> bool {
        let c = o.position;
        let h = o.half_extents;
        p.x > c.x - h.x - self.margin
            && p.x < c.x + h.x + self.margin
            && p.y > c.y - h.y
            && p.y < c.y + h.y + self.vertical_allowance
            && p.z > c.z - h.z - self.margin
            && p.z < c.z + h.z + self.margin
    }

    /// A candidate is clear when it enters no obstacle the current position is not already inside.
    fn is_clear(&self, current: DVec3, candidate: DVec3, obstacles: &[StaticObstacle]) -> bool {
        obstacles
            .iter()
            .all(|o| !self.overlaps(candidate, o) || self.overlaps(current, o))
    }

    /// Accepted position for a horizontal displacement. `current.y` is carried through untouched.
    pub fn resolve(&self, current: DVec3, displacement: DVec3, obstacles: &[StaticObstacle]) -> (DVec3, Resolution) {
        let displacement = DVec3::new(displacement.x, 0.0, displacement.z);
        if displacement == DVec3::ZERO {
            return (current, Resolution::Combined);
        }

        let candidates = [
            (current + displacement, Resolution::Combined),
            (current + DVec3::new(displacement.x, 0.0, 0.0), Resolution::XOnly),
            (current + DVec3::new(0.0, 0.0, displacement.z), Resolution::ZOnly),
        ];
        for (candidate, resolution) in candidates {
            if self.is_clear(current, candidate, obstacles) {
                if resolution != Resolution::Combined {
                    trace!(?resolution, "sliding along obstacle");
                }
                return (candidate, resolution);
            }
        }

        (current, Resolution::Blocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> CollisionResolver {
        CollisionResolver::new(&NavigationConfig::default())
    }

    fn desk() -> StaticObstacle {
        StaticObstacle::new(DVec3::new(0.0, 0.8, 0.0), DVec3::new(3.1, 0.5, 1.35))
    }

    #[test]
    fn test_free_move_accepted() {
        let start = DVec3::new(0.0, 2.2, 5.0);
        let (p, r) = resolver().resolve(start, DVec3::new(0.1, 0.0, -0.1), &[desk()]);
        assert_eq!(r, Resolution::Combined);
        assert_eq!(p, start + DVec3::new(0.1, 0.0, -0.1));
    }

    #[test]
    fn test_diagonal_into_desk_slides() {
        // Just outside the desk's +Z face, moving diagonally towards -Z and +X.
        let start = DVec3::new(0.0, 2.2, 1.66);
        let (p, r) = resolver().resolve(start, DVec3::new(0.1, 0.0, -0.1), &[desk()]);
        assert_eq!(r, Resolution::XOnly);
        assert!((p.x - 0.1).abs() < 1e-12);
        assert_eq!(p.z, start.z);
        assert!(!resolver().overlaps(p, &desk()));
    }

    #[test]
    fn test_diagonal_along_side_face_slides_on_z() {
        // Just outside the desk's +X face.
        let start = DVec3::new(3.41, 2.2, 0.0);
        let (p, r) = resolver().resolve(start, DVec3::new(-0.1, 0.0, 0.1), &[desk()]);
        assert_eq!(r, Resolution::ZOnly);
        assert_eq!(p.x, start.x);
        assert!((p.z - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_corner_blocks_everything() {
        let wall_x = StaticObstacle::new(DVec3::new(1.0, 2.0, 0.0), DVec3::new(0.25, 5.0, 5.0));
        let wall_z = StaticObstacle::new(DVec3::new(0.0, 2.0, 1.0), DVec3::new(5.0, 5.0, 0.25));
        let start = DVec3::new(0.4, 2.2, 0.4);
        let (p, r) = resolver().resolve(start, DVec3::new(0.1, 0.0, 0.1), &[wall_x, wall_z]);
        assert_eq!(r, Resolution::Blocked);
        assert_eq!(p, start);
    }

    #[test]
    fn test_obstacle_order_irrelevant() {
        let a = desk();
        let b = StaticObstacle::new(DVec3::new(0.5, 1.0, 3.0), DVec3::new(0.5, 2.0, 0.5));
        let start = DVec3::new(0.0, 2.2, 1.7);
        let d = DVec3::new(0.2, 0.0, -0.2);
        assert_eq!(resolver().resolve(start, d, &[a, b]), resolver().resolve(start, d, &[b, a]));
    }

    #[test]
    fn test_high_enough_clears_obstacle() {
        // Desk top is 1.3; the allowance makes everything below 2.3 collide.
        assert!(resolver().overlaps(DVec3::new(0.0, 2.29, 0.0), &desk()));
        assert!(!resolver().overlaps(DVec3::new(0.0, 2.31, 0.0), &desk()));
    }

    #[test]
    fn test_can_walk_out_when_already_inside() {
        let start = DVec3::new(0.0, 2.2, 1.5);
        assert!(resolver().overlaps(start, &desk()));
        let (p, r) = resolver().resolve(start, DVec3::new(0.0, 0.0, 0.5), &[desk()]);
        assert_eq!(r, Resolution::Combined);
        assert!(!resolver().overlaps(p, &desk()));
    }

    #[test]
    fn test_never_penetrates_along_random_walk() {
        let obstacles = crate::model::presets::interior().obstacles;
        let r = resolver();
        let mut p = DVec3::new(0.0, 2.2, 12.0);
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        for _ in 0..5000 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let angle = (seed % 6283) as f64 / 1000.0;
            let d = DVec3::new(angle.cos(), 0.0, angle.sin()) * 0.25;
            p = r.resolve(p, d, &obstacles).0;
            for o in &obstacles {
                assert!(!r.overlaps(p, o), "penetrated {o:?} at {p:?}");
            }
        }
    }
}
