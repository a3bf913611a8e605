//! Simulation core for the particle engine: vectors, particle species and
//! their laws, the two-phase tick scheduler and the world that ties them
//! together. Rendering, windowing and pointer polling live outside this crate.

pub mod clock;
pub mod color;
pub mod config;
pub mod error;
pub mod forces;
pub mod particle;
pub mod pointer;
mod registry;
pub mod sim_params;
pub mod snapshot;
pub mod updater;
pub mod vecmath;
pub mod world;

// Re-export key types for easier use by dependent crates
pub use clock::{ManualClock, MonotonicClock, TimeSource};
pub use color::{BetaHsvColors, Color, ColorPolicy, FixedColor};
pub use config::{ColorPolicyType, SimulationConfig};
pub use error::SimError;
pub use particle::{Drive, Group, Law, Particle, ParticleId, ParticleOptions, Species, SpeciesKind};
pub use pointer::{NoPointer, PointerSource, SharedPointer};
pub use sim_params::{Bounds, RenderSettings, SimParams};
pub use snapshot::{DrawCommand, ParticleState, Snapshot};
pub use updater::{TaskEntry, TickReport, TickTarget, Updater};
pub use vecmath::Vec2;
pub use world::World;
