//! Collision detection on axis-aligned boxes
//!
//! Boxes are in screen space (y grows downward), exactly as the browser
//! reports them from `getBoundingClientRect`. The obstacle test is
//! deliberately forgiving: the cactus tail and the dino's horn are drawn but
//! don't count.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box (screen space)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Aabb {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Box from top-left corner and size
    pub fn from_origin_size(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Same box moved by (dx, dy)
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.left + dx, self.top + dy, self.right + dx, self.bottom + dy)
    }
}

/// Strict overlap on both axes (touching edges don't count)
pub fn aabb_overlap(a: &Aabb, b: &Aabb) -> bool {
    let x_overlap = b.right > a.left && b.left < a.right;
    let y_overlap = b.bottom > a.top && b.top < a.bottom;
    x_overlap && y_overlap
}

/// Player vs obstacle
///
/// `trailing_margin` trims the obstacle's right edge, `leading_margin` trims
/// the player's right edge. Vertically only the player's feet matter: the
/// player is never below an obstacle.
pub fn obstacle_collision(
    player: &Aabb,
    obstacle: &Aabb,
    trailing_margin: f32,
    leading_margin: f32,
) -> bool {
    let x_collision = obstacle.right - trailing_margin > player.left
        && obstacle.left < player.right - leading_margin;
    let y_collision = player.bottom > obstacle.top;
    x_collision && y_collision
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRAIL: f32 = 40.0;
    const LEAD: f32 = 20.0;

    fn player() -> Aabb {
        Aabb::new(50.0, 60.0, 90.0, 100.0)
    }

    fn obstacle(left: f32, right: f32, top: f32) -> Aabb {
        Aabb::new(left, top, right, 140.0)
    }

    #[test]
    fn test_obstacle_horn_is_forgiven() {
        // Effective player right = 70, obstacle left 80 -> miss
        assert!(!obstacle_collision(&player(), &obstacle(80.0, 120.0, 60.0), TRAIL, LEAD));
        // Boundary: left 70 is not < 70, left 69 is
        assert!(!obstacle_collision(&player(), &obstacle(70.0, 110.0, 60.0), TRAIL, LEAD));
        assert!(obstacle_collision(&player(), &obstacle(69.0, 109.0, 60.0), TRAIL, LEAD));
    }

    #[test]
    fn test_obstacle_tail_is_forgiven() {
        // Effective obstacle right = right - 40 must exceed player left (50)
        assert!(!obstacle_collision(&player(), &obstacle(40.0, 90.0, 60.0), TRAIL, LEAD));
        assert!(obstacle_collision(&player(), &obstacle(41.0, 91.0, 60.0), TRAIL, LEAD));
    }

    #[test]
    fn test_obstacle_jumped_over() {
        // Player feet at 100; obstacle top at 100 is clear, 99 is a hit
        assert!(!obstacle_collision(&player(), &obstacle(60.0, 100.0, 100.0), TRAIL, LEAD));
        assert!(obstacle_collision(&player(), &obstacle(60.0, 100.0, 99.0), TRAIL, LEAD));

        let airborne = player().translated(0.0, -50.0);
        assert!(!obstacle_collision(&airborne, &obstacle(60.0, 100.0, 60.0), TRAIL, LEAD));
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::from_origin_size(0.0, 0.0, 10.0, 10.0);
        assert!(aabb_overlap(&a, &Aabb::from_origin_size(9.0, 9.0, 5.0, 5.0)));
        // Touching edges
        assert!(!aabb_overlap(&a, &Aabb::from_origin_size(10.0, 0.0, 5.0, 5.0)));
        assert!(!aabb_overlap(&a, &Aabb::from_origin_size(0.0, 10.0, 5.0, 5.0)));
        // Contained
        assert!(aabb_overlap(&a, &Aabb::from_origin_size(2.0, 2.0, 1.0, 1.0)));
    }
}
