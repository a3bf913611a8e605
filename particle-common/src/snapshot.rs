use crate::color::Color;
use crate::particle::{Drive, Particle, ParticleId, SpeciesKind};
use crate::sim_params::RenderSettings;
use crate::vecmath::Vec2;
use serde::Serialize;

/// The state of one particle at a tick boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleState {
    pub id: ParticleId,
    pub species: SpeciesKind,
    /// Capability tag: renderers branch on this, not on `acceleration` being present.
    pub drive: Drive,
    pub color: Color,
    pub radius: f64,
    pub position: Vec2,
    pub velocity: Vec2,
    #[serde(skip_serializing_if = "Option::is_none")] // Don't write "acceleration": null
    pub acceleration: Option<Vec2>,
    pub fixed: bool,
}

impl ParticleState {
    pub fn has_acceleration(&self) -> bool {
        self.drive == Drive::Acceleration
    }
}

impl From<&Particle> for ParticleState {
    fn from(p: &Particle) -> Self {
        ParticleState {
            id: p.id(),
            species: p.species().kind(),
            drive: p.species().drive(),
            color: p.color,
            radius: p.radius,
            position: p.position(),
            velocity: p.velocity(),
            acceleration: p.acceleration(),
            fixed: p.is_fixed(),
        }
    }
}

/// A read-only copy of every live particle, taken between ticks.
/// Owned data, so it can be handed to a renderer on another thread.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Number of ticks completed when the snapshot was taken.
    pub tick: u64,
    /// Particles in registration order.
    pub particles: Vec<ParticleState>,
}

/// A renderer-neutral drawing instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Filled circle in the particle's colour.
    Disc { center: Vec2, radius: f64, color: Color },
    /// Line from `from` to `to` with a head at `to`.
    Arrow { from: Vec2, to: Vec2, color: Color },
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn get(&self, id: ParticleId) -> Option<&ParticleState> {
        self.particles.iter().find(|p| p.id == id)
    }

    /// Translates the snapshot into draw commands: one disc per particle, plus
    /// velocity and acceleration arrows (tip at `position + vector`) when enabled
    /// and not small.
    pub fn primitives(&self, settings: &RenderSettings) -> Vec<DrawCommand> {
        let mut commands = Vec::with_capacity(self.particles.len());
        for p in &self.particles {
            commands.push(DrawCommand::Disc { center: p.position, radius: p.radius, color: p.color });

            if settings.show_velocity && !p.velocity.is_small_within(settings.small_threshold) {
                commands.push(DrawCommand::Arrow {
                    from: p.position,
                    to: p.position + p.velocity,
                    color: settings.velocity_color.unwrap_or(p.color),
                });
            }
            if settings.show_acceleration && p.has_acceleration() {
                let a = p.acceleration.unwrap_or_default();
                if !a.is_small_within(settings.small_threshold) {
                    commands.push(DrawCommand::Arrow {
                        from: p.position,
                        to: p.position + a,
                        color: settings.acceleration_color.unwrap_or(p.color),
                    });
                }
            }
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim_params::SimParams;

    fn state(velocity: Vec2, acceleration: Option<Vec2>) -> ParticleState {
        ParticleState {
            id: ParticleId { index: 0, generation: 0 },
            species: SpeciesKind::Heavy,
            drive: if acceleration.is_some() { Drive::Acceleration } else { Drive::Velocity },
            color: Color::rgb(1, 2, 3),
            radius: 2.0,
            position: Vec2::new(10.0, 10.0),
            velocity,
            acceleration,
            fixed: false,
        }
    }

    #[test]
    fn small_velocity_draws_no_arrow() {
        let snap = Snapshot { tick: 0, particles: vec![state(Vec2::new(1.0, 1.0), None)] };
        let commands = snap.primitives(&SimParams::default().render);
        assert_eq!(commands.len(), 1);
        assert!(matches!(commands[0], DrawCommand::Disc { .. }));
    }

    #[test]
    fn arrows_use_override_or_particle_colour() {
        let mut settings = SimParams::default().render;
        settings.show_acceleration = true;
        settings.acceleration_color = Some(Color::WHITE);
        let snap = Snapshot {
            tick: 3,
            particles: vec![state(Vec2::new(20.0, 0.0), Some(Vec2::new(0.0, -30.0)))],
        };
        let commands = snap.primitives(&settings);
        assert_eq!(
            commands[1],
            DrawCommand::Arrow { from: Vec2::new(10.0, 10.0), to: Vec2::new(30.0, 10.0), color: Color::rgb(1, 2, 3) }
        );
        assert_eq!(
            commands[2],
            DrawCommand::Arrow { from: Vec2::new(10.0, 10.0), to: Vec2::new(10.0, -20.0), color: Color::WHITE }
        );
    }

    #[test]
    fn acceleration_arrows_need_the_capability() {
        let mut settings = SimParams::default().render;
        settings.show_velocity = false;
        settings.show_acceleration = true;
        let snap = Snapshot { tick: 0, particles: vec![state(Vec2::new(50.0, 50.0), None)] };
        assert_eq!(snap.primitives(&settings).len(), 1);
    }

    #[test]
    fn serializes_colours_as_hex_and_skips_missing_acceleration() {
        let snap = Snapshot { tick: 1, particles: vec![state(Vec2::ZERO, None)] };
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"color\":\"#010203\""), "{}", json);
        assert!(!json.contains("acceleration"), "{}", json);
    }
}
