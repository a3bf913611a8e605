use anyhow::Result;
use clap::ValueEnum;
use log::info;
use particle_common::{ParticleOptions, Vec2, World};
use rand::distr::Uniform;
use rand::prelude::*;
use rand_distr::Normal;

/// Preset particle arrangements for the headless host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// One particle chasing the pointer by velocity.
    Follower,
    /// One particle accelerated toward the pointer.
    Attractor,
    /// A pair of opposite charges.
    Dipole,
    /// A light planet circling a heavy sun.
    Orbit,
    /// Three cohesive particles pulling together.
    Cohesion,
    /// A Gaussian cloud of heavy particles around a fixed core.
    Cloud,
}

const CLOUD_SIZE: usize = 40;

impl Scenario {
    /// Spawns the scenario's particles into `world`, positioned relative to its bounds.
    pub fn populate(self, world: &mut World, rng: &mut StdRng) -> Result<()> {
        let bounds = world.bounds();
        match self {
            Scenario::Follower => {
                world.create_pointer_follower(1.3, ParticleOptions::new().radius(5.0));
            }
            Scenario::Attractor => {
                world.create_pointer_attracted(0.01, ParticleOptions::new().radius(2.0));
            }
            Scenario::Dipole => {
                world.create_charged(-1.0, 1.0, ParticleOptions::new().radius(5.0).at(bounds.at_fraction(1.0 / 3.0, 1.0 / 3.0)));
                world.create_charged(1.0, 1.0, ParticleOptions::new().radius(5.0).at(bounds.at_fraction(2.0 / 3.0, 2.0 / 3.0)));
            }
            Scenario::Orbit => {
                world.create_heavy(1e6, ParticleOptions::new().radius(10.0).at(bounds.center()));
                world.create_heavy(
                    1e3,
                    ParticleOptions::new()
                        .radius(2.0)
                        .at(bounds.at_fraction(0.75, 0.5))
                        .velocity(Vec2::new(0.0, 50.0)),
                );
            }
            Scenario::Cohesion => {
                for (fx, fy) in [(1.0 / 3.0, 1.0 / 3.0), (2.0 / 3.0, 1.0 / 3.0), (0.5, 2.0 / 3.0)] {
                    world.create_cohesive(10.0, ParticleOptions::new().radius(2.0).at(bounds.at_fraction(fx, fy)));
                }
            }
            Scenario::Cloud => {
                let center = bounds.center();
                let spread = bounds.width().min(bounds.height()) / 6.0;
                let offset = Normal::new(0.0, spread)?;
                let mass = Uniform::new(1e2, 1e3)?;

                world.create_heavy(1e5, ParticleOptions::new().radius(8.0).at(center).fixed());
                for _ in 0..CLOUD_SIZE {
                    let position = center + Vec2::new(rng.sample(&offset), rng.sample(&offset));
                    world.create_heavy(rng.sample(&mass), ParticleOptions::new().radius(2.0).at(position));
                }
            }
        }
        info!("Scenario {:?} populated with {} particles.", self, world.len());
        Ok(())
    }
}
