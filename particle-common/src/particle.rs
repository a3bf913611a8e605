use crate::color::Color;
use crate::vecmath::Vec2;
use serde::Serialize;
use std::fmt;

/// Handle to a particle in a [`crate::World`].
///
/// The generation makes a handle to a deleted particle stay dead even after
/// its slot is reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ParticleId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Which kinematic quantity a species' law sets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Drive {
    Velocity,
    Acceleration,
}

/// The pairwise interaction groups. Each member's law sums over every other member.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Group {
    Gravity,
    Charge,
    Cohesion,
}

/// A particle kind together with its parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Species {
    /// velocity = (pointer - position) * speed
    PointerFollower { speed: f64 },
    /// acceleration = (pointer - position) * speed
    PointerAttracted { speed: f64 },
    /// Pulled toward every other cohesive particle, linearly in distance.
    Cohesive { mass: f64 },
    /// Inverse-square gravity between heavy particles.
    Heavy { mass: f64 },
    /// Inverse-square electrostatics between charged particles.
    Charged { charge: f64, mass: f64 },
}

/// Field-less tag of [`Species`], for snapshots and logs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeciesKind {
    PointerFollower,
    PointerAttracted,
    Cohesive,
    Heavy,
    Charged,
}

impl Species {
    pub fn kind(&self) -> SpeciesKind {
        match self {
            Species::PointerFollower { .. } => SpeciesKind::PointerFollower,
            Species::PointerAttracted { .. } => SpeciesKind::PointerAttracted,
            Species::Cohesive { .. } => SpeciesKind::Cohesive,
            Species::Heavy { .. } => SpeciesKind::Heavy,
            Species::Charged { .. } => SpeciesKind::Charged,
        }
    }

    pub fn drive(&self) -> Drive {
        match self {
            Species::PointerFollower { .. } => Drive::Velocity,
            _ => Drive::Acceleration,
        }
    }

    pub fn group(&self) -> Option<Group> {
        match self {
            Species::PointerFollower { .. } | Species::PointerAttracted { .. } => None,
            Species::Cohesive { .. } => Some(Group::Cohesion),
            Species::Heavy { .. } => Some(Group::Gravity),
            Species::Charged { .. } => Some(Group::Charge),
        }
    }

    /// What this particle contributes to its group's field: mass for gravity,
    /// charge for electrostatics. Cohesion ignores it.
    pub fn source_strength(&self) -> f64 {
        match self {
            Species::Heavy { mass } | Species::Cohesive { mass } => *mass,
            Species::Charged { charge, .. } => *charge,
            Species::PointerFollower { .. } | Species::PointerAttracted { .. } => 0.0,
        }
    }
}

/// Optional creation attributes shared by every species.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleOptions {
    /// `None` asks the world's colour policy.
    pub color: Option<Color>,
    /// `None` uses the configured default radius.
    pub radius: Option<f64>,
    /// `None` places the particle at the centre of the world bounds.
    pub position: Option<Vec2>,
    pub velocity: Vec2,
    /// Fixed particles are never scheduled and never move.
    pub fixed: bool,
}

impl ParticleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = Some(position);
        self
    }

    pub fn velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }
}

/// The output of a species law for one tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Law {
    Velocity(Vec2),
    Acceleration(Vec2),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub(crate) id: ParticleId,
    pub(crate) species: Species,
    pub color: Color,
    pub radius: f64,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    /// `Some` exactly when the species is acceleration-driven.
    pub(crate) acceleration: Option<Vec2>,
    pub(crate) fixed: bool,
}

impl Particle {
    pub(crate) fn new(
        id: ParticleId,
        species: Species,
        color: Color,
        radius: f64,
        position: Vec2,
        velocity: Vec2,
        fixed: bool,
    ) -> Self {
        let acceleration = match species.drive() {
            Drive::Acceleration => Some(Vec2::ZERO),
            Drive::Velocity => None,
        };
        Particle { id, species, color, radius, position, velocity, acceleration, fixed }
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    pub fn species(&self) -> &Species {
        &self.species
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn acceleration(&self) -> Option<Vec2> {
        self.acceleration
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Stores the result of phase 0. Position is never touched here.
    /// A law of the wrong drive for this species is ignored.
    pub(crate) fn apply_law(&mut self, law: Law) {
        match (law, self.species.drive()) {
            (Law::Velocity(v), Drive::Velocity) => self.velocity = v,
            (Law::Acceleration(a), Drive::Acceleration) => self.acceleration = Some(a),
            (law, drive) => log::warn!("Ignoring {:?} for {:?}-driven particle {}", law, drive, self.id),
        }
    }

    /// Advances this particle by `dt` seconds of (already time-scaled) simulation time.
    ///
    /// Velocity-driven: `s += v dt`.
    /// Acceleration-driven: `s += v dt + a dt²/2`, then `v += a dt`.
    pub fn integrate(&mut self, dt: f64) {
        if self.fixed {
            return;
        }
        match self.acceleration {
            None => self.position += self.velocity * dt,
            Some(a) => {
                self.position += self.velocity * dt + a * (dt * dt / 2.0);
                self.velocity += a * dt;
            }
        }
    }
}
