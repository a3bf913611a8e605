use crate::color::{BetaHsvColors, Color, ColorPolicy, FixedColor};
use crate::error::SimError;
use crate::sim_params::{Bounds, RenderSettings, SimParams};
use crate::vecmath::SMALL_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// Configuration for tick and frame pacing
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingConfig {
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: f64,
    /// Owned by the renderer; the core only validates it.
    #[serde(default = "default_frame_rate_hz")]
    pub frame_rate_hz: f64,
    /// Multiplier on elapsed real time. 0.5 is slow motion, 2.0 fast-forward.
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
}

// Configuration for the world rectangle
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct WorldConfig {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ParticleDefaultsConfig {
    #[serde(default = "default_radius")]
    pub default_radius: f64,
    /// Display threshold for velocity/acceleration arrows.
    #[serde(default = "default_small_threshold")]
    pub small_threshold: f64,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorPolicyType {
    BetaHsv,
    Fixed,
}

// Default colour generation for particles spawned without one
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ColorConfig {
    #[serde(default = "default_color_policy")]
    pub policy: ColorPolicyType,
    /// Used when `policy = "fixed"`.
    #[serde(default = "default_fixed_color")]
    pub fixed: String,
    /// Seed for `beta_hsv`; omitted means a fresh seed every run.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RenderConfig {
    #[serde(default = "default_true")]
    pub show_velocity: bool,
    #[serde(default)]
    pub velocity_color: Option<String>, // None: that of the particle
    #[serde(default)]
    pub show_acceleration: bool,
    #[serde(default)]
    pub acceleration_color: Option<String>,
}

// Main simulation configuration structure, loaded from config.toml.
// Every section may be omitted.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SimulationConfig {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub particles: ParticleDefaultsConfig,
    #[serde(default)]
    pub color: ColorConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            tick_rate_hz: default_tick_rate_hz(),
            frame_rate_hz: default_frame_rate_hz(),
            time_scale: default_time_scale(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig { width: default_width(), height: default_height() }
    }
}

impl Default for ParticleDefaultsConfig {
    fn default() -> Self {
        ParticleDefaultsConfig {
            default_radius: default_radius(),
            small_threshold: default_small_threshold(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        ColorConfig { policy: default_color_policy(), fixed: default_fixed_color(), seed: None }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            show_velocity: true,
            velocity_color: None,
            show_acceleration: false,
            acceleration_color: None,
        }
    }
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let config_str = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&config_str)
    }

    /// Parses and validates configuration text.
    pub fn from_toml_str(config_str: &str) -> Result<Self, SimError> {
        let config: SimulationConfig = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), SimError> {
        let rate_ok = |hz: f64| hz.is_finite() && hz > 0.0;
        if !rate_ok(self.timing.tick_rate_hz) {
            return Err(invalid(format!("tick_rate_hz must be positive, got {}", self.timing.tick_rate_hz)));
        }
        if !rate_ok(self.timing.frame_rate_hz) {
            return Err(invalid(format!("frame_rate_hz must be positive, got {}", self.timing.frame_rate_hz)));
        }
        interval("tick_rate_hz", self.timing.tick_rate_hz)?;
        interval("frame_rate_hz", self.timing.frame_rate_hz)?;
        if !self.timing.time_scale.is_finite() || self.timing.time_scale < 0.0 {
            return Err(invalid(format!("time_scale must be finite and non-negative, got {}", self.timing.time_scale)));
        }
        if !(self.world.width > 0.0 && self.world.height > 0.0) {
            return Err(invalid(format!(
                "world size must be positive, got {}x{}",
                self.world.width, self.world.height
            )));
        }
        if !(self.particles.default_radius > 0.0) {
            return Err(invalid(format!("default_radius must be positive, got {}", self.particles.default_radius)));
        }
        if !(self.particles.small_threshold >= 0.0) {
            return Err(invalid(format!(
                "small_threshold must be non-negative, got {}",
                self.particles.small_threshold
            )));
        }
        Color::from_hex(&self.color.fixed)?;
        self.render_settings()?;
        Ok(())
    }

    /// Converts the configuration into the parameters a world runs with.
    pub fn get_sim_params(&self) -> Result<SimParams, SimError> {
        self.validate()?;
        Ok(SimParams {
            bounds: Bounds::from_size(self.world.width, self.world.height),
            tick_interval: interval("tick_rate_hz", self.timing.tick_rate_hz)?,
            frame_interval: interval("frame_rate_hz", self.timing.frame_rate_hz)?,
            time_scale: self.timing.time_scale,
            default_radius: self.particles.default_radius,
            render: self.render_settings()?,
        })
    }

    /// Builds the configured default-colour generator.
    pub fn color_policy(&self) -> Result<Box<dyn ColorPolicy>, SimError> {
        Ok(match self.color.policy {
            ColorPolicyType::BetaHsv => Box::new(BetaHsvColors::new(self.color.seed)?),
            ColorPolicyType::Fixed => Box::new(FixedColor(Color::from_hex(&self.color.fixed)?)),
        })
    }

    fn render_settings(&self) -> Result<RenderSettings, SimError> {
        let parse = |hex: &Option<String>| hex.as_deref().map(Color::from_hex).transpose();
        Ok(RenderSettings {
            show_velocity: self.render.show_velocity,
            velocity_color: parse(&self.render.velocity_color)?,
            show_acceleration: self.render.show_acceleration,
            acceleration_color: parse(&self.render.acceleration_color)?,
            small_threshold: self.particles.small_threshold,
        })
    }
}

fn invalid(message: String) -> SimError {
    SimError::InvalidConfiguration(message)
}

/// Period of a rate, rejected when it does not fit in a `Duration`.
fn interval(name: &str, hz: f64) -> Result<Duration, SimError> {
    Duration::try_from_secs_f64(1.0 / hz)
        .map_err(|e| invalid(format!("{} = {} gives an unusable interval: {}", name, hz, e)))
}

// Defaults mirror the interactive settings the engine grew up with:
// a 1080x608 canvas, 100 ticks and 25 frames per second.
fn default_tick_rate_hz() -> f64 {
    100.0
}

fn default_frame_rate_hz() -> f64 {
    25.0
}

fn default_time_scale() -> f64 {
    1.0
}

fn default_width() -> f64 {
    1080.0
}

fn default_height() -> f64 {
    608.0
}

fn default_radius() -> f64 {
    1.0
}

fn default_small_threshold() -> f64 {
    SMALL_THRESHOLD
}

fn default_color_policy() -> ColorPolicyType {
    ColorPolicyType::BetaHsv
}

fn default_fixed_color() -> String {
    "#ffffff".to_string()
}

fn default_true() -> bool {
    true
}
