//! Body geometry, stage constraints and fighter separation

/// Axis-aligned rectangle in screen space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle whose left edge midpoint sits at (x, y)
    pub fn from_mid_left(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y - height / 2.0, width, height)
    }

    /// Rectangle whose right edge midpoint sits at (x, y)
    pub fn from_mid_right(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x - width, y - height / 2.0, width, height)
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }

    /// Strict overlap test; rectangles that only share an edge do not collide
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}

/// Physics helpers shared by fighters and the match controller
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Horizontal velocity retained after one second without input
    pub const GROUND_FRICTION: f64 = 0.001;
    /// Velocity scale applied to both fighters when bodies are pushed apart
    pub const SEPARATION_DAMPING: f64 = 0.6;

    /// Exponential decay of horizontal velocity over `dt`
    pub fn apply_friction(vel_x: f64, dt: f64) -> f64 {
        vel_x * Self::GROUND_FRICTION.powf(dt)
    }

    /// Clamp a body center within the stage walls
    pub fn clamp_to_stage(x: f64, half_width: f64, bounds: (f64, f64)) -> f64 {
        let (left, right) = bounds;
        x.clamp(left + half_width, right - half_width)
    }

    /// Horizontal overlap between two bodies, measured from the one on the left
    pub fn overlap_x(r1: &Rect, r2: &Rect) -> f64 {
        if r1.center_x() < r2.center_x() {
            r1.right() - r2.left
        } else {
            r2.right() - r1.left
        }
    }

    /// Push two overlapping bodies apart along x by half the overlap each.
    /// Returns the new centers, or `None` when the bodies do not touch.
    pub fn separate(x1: f64, r1: &Rect, x2: f64, r2: &Rect) -> Option<(f64, f64)> {
        if !r1.intersects(r2) {
            return None;
        }

        let half = Self::overlap_x(r1, r2) / 2.0;
        if x1 < x2 {
            Some((x1 - half, x2 + half))
        } else {
            Some((x1 + half, x2 - half))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        let c = Rect::new(9.5, 9.5, 10.0, 10.0);
        assert!(a.intersects(&c));
    }

    #[test]
    fn mid_anchors() {
        let r = Rect::from_mid_left(100.0, 50.0, 72.0, 28.0);
        assert_eq!(r.left, 100.0);
        assert_eq!(r.center_y(), 50.0);

        let r = Rect::from_mid_right(100.0, 50.0, 72.0, 28.0);
        assert_eq!(r.right(), 100.0);
        assert_eq!(r.top, 36.0);
    }

    #[test]
    fn clamp_to_stage_walls() {
        assert_eq!(PhysicsSystem::clamp_to_stage(10.0, 28.0, (80.0, 1200.0)), 108.0);
        assert_eq!(PhysicsSystem::clamp_to_stage(5000.0, 28.0, (80.0, 1200.0)), 1172.0);
        assert_eq!(PhysicsSystem::clamp_to_stage(500.0, 28.0, (80.0, 1200.0)), 500.0);
    }

    #[test]
    fn friction_decays_toward_zero() {
        let v = PhysicsSystem::apply_friction(360.0, 1.0 / 60.0);
        assert!(v < 360.0 && v > 0.0);
        assert!((PhysicsSystem::apply_friction(100.0, 1.0) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn separation_splits_overlap() {
        let r1 = Rect::new(100.0, 0.0, 56.0, 120.0);
        let r2 = Rect::new(140.0, 0.0, 56.0, 120.0);
        let (x1, x2) = PhysicsSystem::separate(128.0, &r1, 168.0, &r2).unwrap();
        assert_eq!(x1, 120.0);
        assert_eq!(x2, 176.0);

        let apart = Rect::new(400.0, 0.0, 56.0, 120.0);
        assert!(PhysicsSystem::separate(128.0, &r1, 428.0, &apart).is_none());
    }
}
