//! The two-phase tick scheduler.
//!
//! Within one tick every scheduled particle first has its law recomputed
//! (phase 0), then every scheduled particle is integrated (phase 1), both in
//! registration order. Laws therefore only ever see positions from the
//! previous tick, which makes a tick independent of registration order.
//!
//! The updater owns no timer. The host calls [`Updater::run_tick`] at its
//! configured rate.

use crate::error::SimError;
use crate::particle::{Law, ParticleId};
use log::trace;

/// The two per-particle callbacks driven by a tick.
pub trait TickTarget {
    /// Phase 0. Computes the particle's law without mutating anything.
    /// `Ok(None)` means "no update this tick"; the previous law stays.
    fn recompute_law(&self, id: ParticleId) -> Result<Option<Law>, SimError>;

    /// Stores a law computed in phase 0.
    fn apply_law(&mut self, id: ParticleId, law: Law);

    /// Phase 1. Integrates from `last_updated_ns` to now and returns the new timestamp.
    fn integrate(&mut self, id: ParticleId, last_updated_ns: u64) -> u64;
}

/// One scheduled particle and the time it was last integrated.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TaskEntry {
    pub particle: ParticleId,
    pub last_updated_ns: u64,
}

/// What one tick did.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct TickReport {
    /// 1-based number of this tick.
    pub tick: u64,
    pub laws_applied: usize,
    pub integrated: usize,
}

#[derive(Debug, Default)]
pub struct Updater {
    tasks: Vec<TaskEntry>,
    ticks_run: u64,
    // Reused across ticks to hold phase-0 results.
    pending_laws: Vec<(ParticleId, Law)>,
}

impl Updater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a particle; its first integration measures time from `now_ns`.
    pub fn add_task(&mut self, particle: ParticleId, now_ns: u64) {
        if self.contains(particle) {
            trace!("Particle {} is already scheduled", particle);
            return;
        }
        self.tasks.push(TaskEntry { particle, last_updated_ns: now_ns });
    }

    /// Unschedules a particle. Unknown handles are a no-op returning `false`.
    pub fn remove_task(&mut self, particle: ParticleId) -> bool {
        match self.tasks.iter().position(|t| t.particle == particle) {
            Some(idx) => {
                // `remove` rather than `swap_remove`: registration order is part of the contract.
                self.tasks.remove(idx);
                true
            }
            None => {
                trace!("remove_task: {} is not scheduled", particle);
                false
            }
        }
    }

    pub fn contains(&self, particle: ParticleId) -> bool {
        self.tasks.iter().any(|t| t.particle == particle)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Scheduled particles in registration order.
    pub fn tasks(&self) -> &[TaskEntry] {
        &self.tasks
    }

    pub fn ticks_run(&self) -> u64 {
        self.ticks_run
    }

    /// Runs one tick over `target`.
    ///
    /// All laws are computed before any is stored. If any law fails the tick
    /// is abandoned with no particle changed and the error is returned.
    pub fn run_tick<T: TickTarget + ?Sized>(&mut self, target: &mut T) -> Result<TickReport, SimError> {
        // --- Phase 0: recompute laws against last tick's positions ---
        self.pending_laws.clear();
        for task in &self.tasks {
            if let Some(law) = target.recompute_law(task.particle)? {
                self.pending_laws.push((task.particle, law));
            }
        }
        for &(particle, law) in &self.pending_laws {
            target.apply_law(particle, law);
        }

        // --- Phase 1: integrate ---
        for task in self.tasks.iter_mut() {
            task.last_updated_ns = target.integrate(task.particle, task.last_updated_ns);
        }

        self.ticks_run += 1;
        let report = TickReport {
            tick: self.ticks_run,
            laws_applied: self.pending_laws.len(),
            integrated: self.tasks.len(),
        };
        trace!("Tick {} applied {} laws, integrated {} particles", report.tick, report.laws_applied, report.integrated);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vecmath::Vec2;

    fn id(index: u32) -> ParticleId {
        ParticleId { index, generation: 0 }
    }

    /// Records the order of callbacks.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        fail_on: Option<ParticleId>,
        clock: u64,
    }

    impl TickTarget for Recorder {
        fn recompute_law(&self, id: ParticleId) -> Result<Option<Law>, SimError> {
            if Some(id) == self.fail_on {
                return Err(SimError::DivisionByZero(format!("{}", id)));
            }
            Ok(Some(Law::Velocity(Vec2::new(id.index as f64, 0.0))))
        }

        fn apply_law(&mut self, id: ParticleId, _law: Law) {
            self.calls.push(format!("law {}", id.index));
        }

        fn integrate(&mut self, id: ParticleId, last: u64) -> u64 {
            self.calls.push(format!("integrate {} from {}", id.index, last));
            self.clock
        }
    }

    #[test]
    fn all_laws_run_before_any_integration() {
        let mut updater = Updater::new();
        for i in 0..3 {
            updater.add_task(id(i), 0);
        }
        let mut target = Recorder { clock: 100, ..Default::default() };
        let report = updater.run_tick(&mut target).unwrap();

        assert_eq!(
            target.calls,
            vec!["law 0", "law 1", "law 2", "integrate 0 from 0", "integrate 1 from 0", "integrate 2 from 0"]
        );
        assert_eq!(report, TickReport { tick: 1, laws_applied: 3, integrated: 3 });
        assert!(updater.tasks().iter().all(|t| t.last_updated_ns == 100));
    }

    #[test]
    fn failed_law_leaves_every_particle_untouched() {
        let mut updater = Updater::new();
        for i in 0..3 {
            updater.add_task(id(i), 0);
        }
        let mut target = Recorder { fail_on: Some(id(2)), clock: 100, ..Default::default() };
        assert!(updater.run_tick(&mut target).is_err());
        assert!(target.calls.is_empty());
        assert_eq!(updater.ticks_run(), 0);
        assert!(updater.tasks().iter().all(|t| t.last_updated_ns == 0));
    }

    #[test]
    fn removing_unknown_task_is_a_noop() {
        let mut updater = Updater::new();
        updater.add_task(id(0), 0);
        assert!(!updater.remove_task(id(9)));
        assert!(updater.remove_task(id(0)));
        assert!(!updater.remove_task(id(0)));
        assert!(updater.is_empty());
    }

    #[test]
    fn removal_keeps_registration_order() {
        let mut updater = Updater::new();
        for i in 0..4 {
            updater.add_task(id(i), i as u64);
        }
        updater.add_task(id(1), 99);
        updater.remove_task(id(1));
        let order: Vec<u32> = updater.tasks().iter().map(|t| t.particle.index).collect();
        assert_eq!(order, vec![0, 2, 3]);
        assert_eq!(updater.tasks()[1].last_updated_ns, 2);
    }
}
