use crate::color::Color;
use crate::vecmath::{Vec2, SMALL_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The world rectangle. Particles may leave it; it only supplies defaults
/// (centre spawn position) and the off-screen rule.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Bounds { min, max }
    }

    /// A `width` x `height` rectangle anchored at the origin.
    pub fn from_size(width: f64, height: f64) -> Self {
        Bounds { min: Vec2::ZERO, max: Vec2::new(width, height) }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        self.at_fraction(0.5, 0.5)
    }

    /// The point `fx` of the way across and `fy` of the way down.
    pub fn at_fraction(&self, fx: f64, fy: f64) -> Vec2 {
        Vec2::new(self.min.x + self.width() * fx, self.min.y + self.height() * fy)
    }

    /// Off screen means out of range on *both* axes at once.
    /// A particle past only the left edge, say, is still kept.
    pub fn is_off_screen(&self, p: Vec2) -> bool {
        let x_out = p.x < self.min.x || p.x > self.max.x;
        let y_out = p.y < self.min.y || p.y > self.max.y;
        x_out && y_out
    }
}

/// Arrow and colour settings for renderers. The core only carries them to the snapshot helpers.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub show_velocity: bool,
    /// `None` draws the arrow in the particle's own colour.
    pub velocity_color: Option<Color>,
    pub show_acceleration: bool,
    pub acceleration_color: Option<Color>,
    /// Arrows for vectors whose components are both under this are skipped.
    pub small_threshold: f64,
}

/// Runtime parameters derived from the configuration, fixed for the life of a world.
#[derive(Debug, Clone, PartialEq)]
pub struct SimParams {
    // World
    pub bounds: Bounds,

    // Time
    pub tick_interval: Duration,
    pub frame_interval: Duration,
    pub time_scale: f64,

    // Particle defaults
    pub default_radius: f64,

    pub render: RenderSettings,
}

impl Default for SimParams {
    /// 1080x608 world, 100 ticks and 25 frames per second, real-time speed.
    fn default() -> Self {
        SimParams {
            bounds: Bounds::from_size(1080.0, 608.0),
            tick_interval: Duration::from_millis(10),
            frame_interval: Duration::from_millis(40),
            time_scale: 1.0,
            default_radius: 1.0,
            render: RenderSettings {
                show_velocity: true,
                velocity_color: None,
                show_acceleration: false,
                acceleration_color: None,
                small_threshold: SMALL_THRESHOLD,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_default_config() {
        let from_config = crate::config::SimulationConfig::default().get_sim_params().unwrap();
        assert_eq!(SimParams::default(), from_config);
    }

    #[test]
    fn fractions_follow_bounds() {
        let b = Bounds::from_size(1080.0, 608.0);
        assert_eq!(b.center(), Vec2::new(540.0, 304.0));
        assert_eq!(b.at_fraction(1.0 / 3.0, 0.0).x, 360.0);
    }

    #[test]
    fn off_screen_needs_both_axes_out() {
        let b = Bounds::from_size(1080.0, 608.0);
        assert!(b.is_off_screen(Vec2::new(-10.0, -10.0)));
        assert!(b.is_off_screen(Vec2::new(2000.0, 700.0)));
        assert!(!b.is_off_screen(Vec2::new(-10.0, 300.0)));
        assert!(!b.is_off_screen(Vec2::new(500.0, -1.0)));
        assert!(!b.is_off_screen(Vec2::new(1080.0, 608.0)));
    }
}
