use crate::clock::TimeSource;
use crate::color::ColorPolicy;
use crate::config::SimulationConfig;
use crate::error::SimError;
use crate::forces::{self, Source};
use crate::particle::{Group, Law, Particle, ParticleId, ParticleOptions, Species};
use crate::pointer::PointerSource;
use crate::registry::{Groups, Registry};
use crate::sim_params::{Bounds, SimParams};
use crate::snapshot::{ParticleState, Snapshot};
use crate::updater::{TickReport, TickTarget, Updater};
use log::{debug, trace};

/// Owns every particle, the interaction-group rosters and the tick scheduler.
///
/// All mutation goes through `&mut self`, so no deletion or enumeration can
/// interleave with a running tick.
pub struct World {
    params: SimParams,
    registry: Registry,
    groups: Groups,
    updater: Updater,
    clock: Box<dyn TimeSource>,
    pointer: Box<dyn PointerSource>,
    colors: Box<dyn ColorPolicy>,
}

impl World {
    pub fn new(
        params: SimParams,
        clock: Box<dyn TimeSource>,
        pointer: Box<dyn PointerSource>,
        colors: Box<dyn ColorPolicy>,
    ) -> Self {
        World {
            params,
            registry: Registry::default(),
            groups: Groups::default(),
            updater: Updater::new(),
            clock,
            pointer,
            colors,
        }
    }

    /// Builds a world from a validated configuration, with its configured colour policy.
    pub fn from_config(
        config: &SimulationConfig,
        clock: Box<dyn TimeSource>,
        pointer: Box<dyn PointerSource>,
    ) -> Result<Self, SimError> {
        let params = config.get_sim_params()?;
        let colors = config.color_policy()?;
        Ok(Self::new(params, clock, pointer, colors))
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn bounds(&self) -> Bounds {
        self.params.bounds
    }

    // --- Lifecycle ---

    /// Registers a new particle with its group and, unless fixed, the scheduler.
    pub fn spawn(&mut self, species: Species, options: ParticleOptions) -> ParticleId {
        let color = options.color.unwrap_or_else(|| self.colors.next_color());
        let radius = options.radius.unwrap_or(self.params.default_radius);
        let position = options.position.unwrap_or_else(|| self.params.bounds.center());
        let (velocity, fixed) = (options.velocity, options.fixed);

        let id = self
            .registry
            .insert(|id| Particle::new(id, species, color, radius, position, velocity, fixed));
        if let Some(group) = species.group() {
            self.groups.enroll(group, id);
        }
        if !fixed {
            self.updater.add_task(id, self.clock.now_ns());
        }
        debug!("Spawned {:?} {} at ({:.2}, {:.2}){}", species, id, position.x, position.y, if fixed { " (fixed)" } else { "" });
        id
    }

    pub fn create_pointer_follower(&mut self, speed: f64, options: ParticleOptions) -> ParticleId {
        self.spawn(Species::PointerFollower { speed }, options)
    }

    pub fn create_pointer_attracted(&mut self, speed: f64, options: ParticleOptions) -> ParticleId {
        self.spawn(Species::PointerAttracted { speed }, options)
    }

    pub fn create_cohesive(&mut self, mass: f64, options: ParticleOptions) -> ParticleId {
        self.spawn(Species::Cohesive { mass }, options)
    }

    pub fn create_heavy(&mut self, mass: f64, options: ParticleOptions) -> ParticleId {
        self.spawn(Species::Heavy { mass }, options)
    }

    pub fn create_charged(&mut self, charge: f64, mass: f64, options: ParticleOptions) -> ParticleId {
        self.spawn(Species::Charged { charge, mass }, options)
    }

    /// Removes a particle from the registry, its group and the scheduler.
    /// Deleting an unknown or already deleted particle returns `false`.
    pub fn delete(&mut self, id: ParticleId) -> bool {
        let Some(particle) = self.registry.remove(id) else {
            trace!("delete: {} is not live", id);
            return false;
        };
        if let Some(group) = particle.species().group() {
            self.groups.withdraw(group, id);
        }
        if !particle.is_fixed() {
            self.updater.remove_task(id);
        }
        debug!("Deleted {}", id);
        true
    }

    /// Deletes every particle. Returns how many were removed.
    pub fn clear_all(&mut self) -> usize {
        let ids = self.registry.ids().to_vec();
        let removed = ids.into_iter().filter(|&id| self.delete(id)).count();
        debug!("clear_all removed {} particles", removed);
        removed
    }

    /// Deletes particles outside `bounds` on both axes at once.
    /// Returns how many were removed.
    pub fn clear_off_screen(&mut self, bounds: Bounds) -> usize {
        let doomed: Vec<ParticleId> = self
            .registry
            .iter()
            .filter(|p| bounds.is_off_screen(p.position()))
            .map(|p| p.id())
            .collect();
        let removed = doomed.into_iter().filter(|&id| self.delete(id)).count();
        if removed > 0 {
            debug!("clear_off_screen removed {} particles", removed);
        }
        removed
    }

    // --- Queries ---

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.registry.get(id)
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.registry.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// Live particles in registration order.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.registry.iter()
    }

    pub fn group_members(&self, group: Group) -> &[ParticleId] {
        self.groups.members(group)
    }

    pub fn is_scheduled(&self, id: ParticleId) -> bool {
        self.updater.contains(id)
    }

    pub fn scheduled_count(&self) -> usize {
        self.updater.len()
    }

    pub fn ticks_run(&self) -> u64 {
        self.updater.ticks_run()
    }

    /// Copies the state of every live particle for a renderer.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.updater.ticks_run(),
            particles: self.registry.iter().map(ParticleState::from).collect(),
        }
    }

    // --- Ticking ---

    /// Runs one two-phase tick over every scheduled particle.
    ///
    /// A law that fails (coincident group members, zero mass) aborts the
    /// tick before anything moves and the error is returned.
    pub fn run_tick(&mut self) -> Result<TickReport, SimError> {
        let sources = GroupSources::collect(&self.registry, &self.groups);
        let mut ctx = TickContext {
            registry: &mut self.registry,
            sources: &sources,
            pointer: &*self.pointer,
            clock: &*self.clock,
            time_scale: self.params.time_scale,
        };
        self.updater.run_tick(&mut ctx)
    }
}

/// Group members as the laws see them, frozen at the start of a tick.
struct GroupSources {
    gravity: Vec<Source>,
    charge: Vec<Source>,
    cohesion: Vec<Source>,
}

impl GroupSources {
    fn collect(registry: &Registry, groups: &Groups) -> Self {
        let sources = |group: Group| -> Vec<Source> {
            groups
                .members(group)
                .iter()
                .filter_map(|&id| registry.get(id))
                .map(|p| Source { id: p.id(), position: p.position(), strength: p.species().source_strength() })
                .collect()
        };
        GroupSources {
            gravity: sources(Group::Gravity),
            charge: sources(Group::Charge),
            cohesion: sources(Group::Cohesion),
        }
    }
}

/// Split borrow of a world for the duration of one tick.
struct TickContext<'a> {
    registry: &'a mut Registry,
    sources: &'a GroupSources,
    pointer: &'a dyn PointerSource,
    clock: &'a dyn TimeSource,
    time_scale: f64,
}

impl TickTarget for TickContext<'_> {
    fn recompute_law(&self, id: ParticleId) -> Result<Option<Law>, SimError> {
        let Some(p) = self.registry.get(id) else {
            return Ok(None);
        };
        let position = p.position();
        let law = match *p.species() {
            // Without a pointer there is nothing to follow; keep the last law.
            Species::PointerFollower { speed } => self
                .pointer
                .position()
                .map(|pointer| Law::Velocity(forces::toward_pointer(position, pointer, speed))),
            Species::PointerAttracted { speed } => self
                .pointer
                .position()
                .map(|pointer| Law::Acceleration(forces::toward_pointer(position, pointer, speed))),
            Species::Cohesive { mass } => {
                Some(Law::Acceleration(forces::cohesion(id, position, mass, &self.sources.cohesion)?))
            }
            Species::Heavy { .. } => Some(Law::Acceleration(forces::gravity(id, position, &self.sources.gravity)?)),
            Species::Charged { charge, mass } => Some(Law::Acceleration(forces::electrostatic(
                id,
                position,
                charge,
                mass,
                &self.sources.charge,
            )?)),
        };
        Ok(law)
    }

    fn apply_law(&mut self, id: ParticleId, law: Law) {
        if let Some(p) = self.registry.get_mut(id) {
            p.apply_law(law);
        }
    }

    fn integrate(&mut self, id: ParticleId, last_updated_ns: u64) -> u64 {
        let now = self.clock.now_ns();
        // A clock that went backwards integrates zero time rather than negative time.
        let dt = now.saturating_sub(last_updated_ns) as f64 * 1e-9 * self.time_scale;
        if let Some(p) = self.registry.get_mut(id) {
            p.integrate(dt);
        }
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::color::{Color, FixedColor};
    use crate::pointer::{NoPointer, SharedPointer};
    use crate::vecmath::Vec2;
    use std::time::Duration;

    fn world_with(pointer: Box<dyn PointerSource>) -> (World, ManualClock) {
        let clock = ManualClock::new();
        let world = World::new(SimParams::default(), Box::new(clock.clone()), pointer, Box::new(FixedColor(Color::WHITE)));
        (world, clock)
    }

    #[test]
    fn defaults_come_from_params_and_colour_policy() {
        let (mut world, _) = world_with(Box::new(NoPointer));
        let id = world.create_heavy(1.0, ParticleOptions::new());
        let p = world.get(id).unwrap();
        assert_eq!(p.position(), Vec2::new(540.0, 304.0));
        assert_eq!(p.radius, 1.0);
        assert_eq!(p.color, Color::WHITE);
        assert_eq!(p.velocity(), Vec2::ZERO);
        assert_eq!(p.acceleration(), Some(Vec2::ZERO));
        assert!(world.is_scheduled(id));
        assert_eq!(world.group_members(Group::Gravity), &[id]);
    }

    #[test]
    fn fixed_particles_join_groups_but_not_the_scheduler() {
        let (mut world, _) = world_with(Box::new(NoPointer));
        let sun = world.create_heavy(1e6, ParticleOptions::new().fixed());
        assert!(!world.is_scheduled(sun));
        assert_eq!(world.group_members(Group::Gravity), &[sun]);
        assert_eq!(world.scheduled_count(), 0);
    }

    #[test]
    fn follower_tracks_pointer_and_moves_by_velocity_times_dt() {
        let pointer = SharedPointer::at(Vec2::new(110.0, 0.0));
        let (mut world, clock) = world_with(Box::new(pointer));
        let id = world.create_pointer_follower(2.0, ParticleOptions::new().at(Vec2::new(100.0, 0.0)));

        clock.advance(Duration::from_millis(250));
        world.run_tick().unwrap();

        let p = world.get(id).unwrap();
        assert_eq!(p.velocity(), Vec2::new(20.0, 0.0));
        assert!((p.position().x - 105.0).abs() < 1e-9);
    }

    #[test]
    fn pointer_particles_keep_their_law_without_a_pointer() {
        let (mut world, clock) = world_with(Box::new(NoPointer));
        let id = world.create_pointer_follower(
            1.0,
            ParticleOptions::new().at(Vec2::ZERO).velocity(Vec2::new(4.0, 0.0)),
        );
        clock.advance(Duration::from_secs(1));
        let report = world.run_tick().unwrap();
        assert_eq!(report.laws_applied, 0);
        assert!((world.get(id).unwrap().position().x - 4.0).abs() < 1e-9);
    }

    #[test]
    fn time_scale_multiplies_elapsed_time() {
        let clock = ManualClock::new();
        let params = SimParams { time_scale: 3.0, ..SimParams::default() };
        let mut world = World::new(params, Box::new(clock.clone()), Box::new(NoPointer), Box::new(FixedColor(Color::WHITE)));
        let id = world.create_pointer_follower(1.0, ParticleOptions::new().at(Vec2::ZERO).velocity(Vec2::new(1.0, 2.0)));
        clock.advance(Duration::from_millis(500));
        world.run_tick().unwrap();
        let pos = world.get(id).unwrap().position();
        assert!((pos.x - 1.5).abs() < 1e-9 && (pos.y - 3.0).abs() < 1e-9, "{}", pos);
    }

    #[test]
    fn coincident_heavy_particles_fail_the_tick_without_moving_anything() {
        let (mut world, clock) = world_with(Box::new(NoPointer));
        let mover = world.create_pointer_follower(1.0, ParticleOptions::new().at(Vec2::ZERO).velocity(Vec2::new(1.0, 0.0)));
        world.create_heavy(1.0, ParticleOptions::new().at(Vec2::new(5.0, 5.0)));
        world.create_heavy(1.0, ParticleOptions::new().at(Vec2::new(5.0, 5.0)));

        clock.advance(Duration::from_secs(1));
        let err = world.run_tick().unwrap_err();
        assert!(matches!(err, SimError::DivisionByZero(_)));
        assert_eq!(world.get(mover).unwrap().position(), Vec2::ZERO);
        assert_eq!(world.ticks_run(), 0);
    }

    #[test]
    fn delete_is_idempotent() {
        let (mut world, _) = world_with(Box::new(NoPointer));
        let id = world.create_charged(1.0, 1.0, ParticleOptions::new());
        assert!(world.delete(id));
        assert!(!world.delete(id));
        assert!(world.is_empty());
        assert!(world.group_members(Group::Charge).is_empty());
        assert!(!world.is_scheduled(id));
    }

    #[test]
    fn clear_all_removes_everything() {
        let (mut world, _) = world_with(Box::new(NoPointer));
        for i in 0..5 {
            world.create_cohesive(1.0, ParticleOptions::new().at(Vec2::new(i as f64, 0.0)));
        }
        world.create_heavy(1.0, ParticleOptions::new().fixed());
        assert_eq!(world.clear_all(), 6);
        assert!(world.is_empty());
        assert_eq!(world.scheduled_count(), 0);
        assert!(world.group_members(Group::Cohesion).is_empty());
        assert!(world.group_members(Group::Gravity).is_empty());
    }
}
