use crate::sink::FrameSink;
use anyhow::{Context, Result};
use log::{debug, error, info};
use particle_common::World;
use std::time::{Duration, Instant};

/// Counters for a host run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostStats {
    pub ticks: u64,
    pub frames: u64,
    pub culled: usize,
}

/// Drives a [`World`] in real time: ticks at the configured tick rate and
/// presents snapshots at the frame rate, both on this one thread, so a
/// frame never observes a half-finished tick.
pub struct Host {
    world: World,
    sink: Box<dyn FrameSink>,
    tick_interval: Duration,
    frame_interval: Duration,
    next_tick: Instant,
    next_frame: Instant,
    cull_offscreen: bool,
    stats: HostStats,
}

impl Host {
    /// The first tick and the first frame are both due at `start`.
    pub fn new(world: World, sink: Box<dyn FrameSink>, start: Instant, cull_offscreen: bool) -> Self {
        let tick_interval = world.params().tick_interval;
        let frame_interval = world.params().frame_interval;
        Host {
            world,
            sink,
            tick_interval,
            frame_interval,
            next_tick: start,
            next_frame: start,
            cull_offscreen,
            stats: HostStats::default(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn stats(&self) -> HostStats {
        self.stats
    }

    /// The earlier of the next tick and the next frame.
    pub fn next_deadline(&self) -> Instant {
        self.next_tick.min(self.next_frame)
    }

    /// Runs whatever is due at `now`: at most one tick, then at most one frame.
    /// A late host does not burst to catch up; the next deadline is measured from `now`.
    pub fn pump(&mut self, now: Instant) -> Result<()> {
        if now >= self.next_tick {
            let report = self.world.run_tick().map_err(|e| {
                error!("Tick {} failed: {}", self.world.ticks_run() + 1, e);
                e
            })?;
            self.stats.ticks += 1;
            debug!("Tick {} | laws: {} | integrated: {}", report.tick, report.laws_applied, report.integrated);
            self.next_tick = now + self.tick_interval;
        }

        if now >= self.next_frame {
            if self.cull_offscreen {
                let bounds = self.world.bounds();
                self.stats.culled += self.world.clear_off_screen(bounds);
            }
            let frame = self.world.snapshot();
            self.sink
                .present(&frame, &self.world.params().render)
                .with_context(|| format!("Failed to present frame at tick {}", frame.tick))?;
            self.stats.frames += 1;
            self.next_frame = now + self.frame_interval;
        }
        Ok(())
    }

    /// Pumps in real time until `duration` has elapsed, sleeping between deadlines.
    pub fn run_for(&mut self, duration: Duration) -> Result<HostStats> {
        let start = Instant::now();
        let end = start
            .checked_add(duration)
            .with_context(|| format!("Run time of {:?} is out of range", duration))?;
        info!("Running for {:.2} s ({:?} per tick, {:?} per frame).", duration.as_secs_f64(), self.tick_interval, self.frame_interval);

        loop {
            let now = Instant::now();
            if now >= end {
                break;
            }
            self.pump(now)?;
            let wake = self.next_deadline().min(end);
            let now = Instant::now();
            if wake > now {
                std::thread::sleep(wake - now);
            }
        }

        info!(
            "Finished after {:.3} s: {} ticks, {} frames, {} particles culled, {} remaining.",
            start.elapsed().as_secs_f64(),
            self.stats.ticks,
            self.stats.frames,
            self.stats.culled,
            self.world.len()
        );
        Ok(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use particle_common::{
        Color, FixedColor, ManualClock, NoPointer, ParticleOptions, RenderSettings, SimParams, Snapshot, Vec2,
    };
    use std::sync::{Arc, Mutex};

    /// Keeps every presented snapshot.
    #[derive(Clone, Default)]
    struct Collect(Arc<Mutex<Vec<Snapshot>>>);

    impl FrameSink for Collect {
        fn present(&mut self, frame: &Snapshot, _render: &RenderSettings) -> Result<()> {
            self.0.lock().unwrap().push(frame.clone());
            Ok(())
        }
    }

    fn world() -> World {
        World::new(
            SimParams::default(),
            Box::new(ManualClock::new()),
            Box::new(NoPointer),
            Box::new(FixedColor(Color::WHITE)),
        )
    }

    #[test]
    fn ticks_and_frames_follow_their_own_rates() {
        let frames = Collect::default();
        let start = Instant::now();
        let mut host = Host::new(world(), Box::new(frames.clone()), start, false);

        // 10 ms ticks, 40 ms frames.
        for ms in (0..100).step_by(5) {
            host.pump(start + Duration::from_millis(ms)).unwrap();
        }
        let stats = host.stats();
        assert_eq!(stats.ticks, 10);
        assert_eq!(stats.frames, 3);

        let seen: Vec<u64> = frames.0.lock().unwrap().iter().map(|s| s.tick).collect();
        assert_eq!(seen, vec![1, 5, 9]);
    }

    #[test]
    fn frames_cull_off_screen_particles_when_asked() {
        let start = Instant::now();
        let mut host = Host::new(world(), Box::new(Collect::default()), start, true);
        host.world_mut().create_heavy(1.0, ParticleOptions::new().at(Vec2::new(-50.0, -50.0)));
        host.world_mut().create_heavy(1.0, ParticleOptions::new().at(Vec2::new(-50.0, 50.0)));
        host.pump(start).unwrap();
        assert_eq!(host.stats().culled, 1);
        assert_eq!(host.world().len(), 1);
    }

    #[test]
    fn run_time_past_the_clock_range_is_an_error() {
        let mut host = Host::new(world(), Box::new(Collect::default()), Instant::now(), false);
        assert!(host.run_for(Duration::MAX).is_err());
        assert_eq!(host.stats(), HostStats::default());
    }

    #[test]
    fn failed_tick_is_reported() {
        let start = Instant::now();
        let mut host = Host::new(world(), Box::new(Collect::default()), start, false);
        host.world_mut().create_heavy(1.0, ParticleOptions::new().at(Vec2::new(1.0, 1.0)));
        host.world_mut().create_heavy(1.0, ParticleOptions::new().at(Vec2::new(1.0, 1.0)));
        assert!(host.pump(start).is_err());
        assert_eq!(host.stats().ticks, 0);
    }
}
