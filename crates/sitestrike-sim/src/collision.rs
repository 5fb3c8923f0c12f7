use crate::map::Rect;

/// Distance between raycast samples.
pub const RAY_STEP: f32 = 4.0;
/// A ray blocked within this distance of its target still counts as visible.
pub const SIGHT_TOLERANCE: f32 = 5.0;

/// Result of marching a segment through the wall list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub hit: bool,
    pub x: f32,
    pub y: f32,
    /// Distance from the origin to the first blocked sample (or the full length).
    pub dist: f32,
}

/// First wall whose closest point lies strictly within `radius` of `(x, y)`.
pub fn collide(walls: &[Rect], x: f32, y: f32, radius: f32) -> Option<&Rect> {
    let r2 = radius * radius;
    walls.iter().find(|w| {
        let (cx, cy) = w.closest_point(x, y);
        let dx = x - cx;
        let dy = y - cy;
        dx * dx + dy * dy < r2
    })
}

/// Sample the segment every [`RAY_STEP`] units and report the first sample inside a wall.
pub fn raycast(walls: &[Rect], x1: f32, y1: f32, x2: f32, y2: f32) -> RayHit {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let dist = (dx * dx + dy * dy).sqrt();
    let steps = (dist / RAY_STEP).ceil().max(1.0) as u32;

    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let px = x1 + dx * t;
        let py = y1 + dy * t;
        if walls.iter().any(|w| w.contains(px, py)) {
            return RayHit {
                hit: true,
                x: px,
                y: py,
                dist: dist * t,
            };
        }
    }
    RayHit {
        hit: false,
        x: x2,
        y: y2,
        dist,
    }
}

/// Unobstructed sight between two points, tolerating walls at the very end of the ray.
pub fn has_line_of_sight(walls: &[Rect], x1: f32, y1: f32, x2: f32, y2: f32) -> bool {
    let ray = raycast(walls, x1, y1, x2, y2);
    !ray.hit || ray.dist >= ray_length(x1, y1, x2, y2) - SIGHT_TOLERANCE
}

fn ray_length(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt()
}
