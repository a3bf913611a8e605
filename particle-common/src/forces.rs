//! Per-species laws evaluated in phase 0 of a tick.
//!
//! Every function here is pure: it reads positions and group data frozen at the
//! start of the tick and returns the new velocity or acceleration.

use crate::error::SimError;
use crate::particle::ParticleId;
use crate::vecmath::Vec2;

/// One member of an interaction group as seen by the other members.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Source {
    pub id: ParticleId,
    pub position: Vec2,
    /// Mass for gravity, charge for electrostatics. Unused by cohesion.
    pub strength: f64,
}

/// `(pointer - position) * speed`. Velocity for followers, acceleration for
/// attracted particles.
pub fn toward_pointer(position: Vec2, pointer: Vec2, speed: f64) -> Vec2 {
    (pointer - position) * speed
}

/// Sum over every other member of `strength / |r|²` along `r`,
/// where `r = other - own`.
///
/// Two members in the same place is a division by zero.
pub fn inverse_square_field(own: ParticleId, position: Vec2, sources: &[Source]) -> Result<Vec2, SimError> {
    let mut field = Vec2::ZERO;
    for source in sources.iter().filter(|s| s.id != own) {
        let r = source.position - position;
        let r_sq = r.magnitude_squared();
        if r_sq == 0.0 {
            return Err(SimError::DivisionByZero(format!(
                "particles {} and {} share position ({}, {})",
                own, source.id, position.x, position.y
            )));
        }
        field += Vec2::from_polar(source.strength / r_sq, r.direction());
    }
    Ok(field)
}

/// Gravitational acceleration of a heavy particle.
pub fn gravity(own: ParticleId, position: Vec2, group: &[Source]) -> Result<Vec2, SimError> {
    inverse_square_field(own, position, group)
}

/// Electrostatic acceleration: field · charge / mass.
pub fn electrostatic(own: ParticleId, position: Vec2, charge: f64, mass: f64, group: &[Source]) -> Result<Vec2, SimError> {
    let field = inverse_square_field(own, position, group)?;
    (field * charge).divide(mass).map_err(|_| zero_mass(own))
}

/// Cohesive acceleration: the summed offsets to every other member over own mass.
pub fn cohesion(own: ParticleId, position: Vec2, mass: f64, group: &[Source]) -> Result<Vec2, SimError> {
    let mut pull = Vec2::ZERO;
    for source in group.iter().filter(|s| s.id != own) {
        pull += source.position - position;
    }
    pull.divide(mass).map_err(|_| zero_mass(own))
}

fn zero_mass(own: ParticleId) -> SimError {
    SimError::DivisionByZero(format!("particle {} has zero mass", own))
}
