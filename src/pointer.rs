use particle_common::{Bounds, MonotonicClock, PointerSource, TimeSource, Vec2};

/// A scripted pointer circling the middle of the world, standing in for a
/// real mouse when running headless.
pub struct OrbitingPointer {
    clock: MonotonicClock,
    center: Vec2,
    radius: f64,
    /// Radians per second.
    angular_speed: f64,
}

impl OrbitingPointer {
    pub fn new(bounds: Bounds, angular_speed: f64) -> Self {
        OrbitingPointer {
            clock: MonotonicClock::new(),
            center: bounds.center(),
            radius: bounds.width().min(bounds.height()) / 3.0,
            angular_speed,
        }
    }

    fn position_at(&self, seconds: f64) -> Vec2 {
        self.center + Vec2::from_polar(self.radius, seconds * self.angular_speed)
    }
}

impl PointerSource for OrbitingPointer {
    fn position(&self) -> Option<Vec2> {
        Some(self.position_at(self.clock.now_ns() as f64 * 1e-9))
    }
}
