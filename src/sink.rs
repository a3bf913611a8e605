use anyhow::Result;
use log::{debug, info};
use particle_common::{DrawCommand, RenderSettings, Snapshot};
use std::io::Write;

/// Consumes one frozen snapshot per render frame.
pub trait FrameSink {
    fn present(&mut self, frame: &Snapshot, render: &RenderSettings) -> Result<()>;
}

/// Logs a one-line summary now and then, and every frame at debug level.
pub struct LogSink {
    frames: u64,
    summary_every: u64,
}

impl LogSink {
    /// `summary_every`: frames between `info!` summaries (0 disables them).
    pub fn new(summary_every: u64) -> Self {
        LogSink { frames: 0, summary_every }
    }
}

impl FrameSink for LogSink {
    fn present(&mut self, frame: &Snapshot, render: &RenderSettings) -> Result<()> {
        self.frames += 1;
        let commands = frame.primitives(render);
        let arrows = commands.iter().filter(|c| matches!(c, DrawCommand::Arrow { .. })).count();

        if self.summary_every > 0 && self.frames % self.summary_every == 0 {
            let fastest = frame
                .particles
                .iter()
                .map(|p| p.velocity.magnitude())
                .fold(0.0f64, f64::max);
            info!(
                "Frame {} | Tick {} | Particles: {} | Arrows: {} | Fastest: {:.2} px/s",
                self.frames,
                frame.tick,
                frame.len(),
                arrows,
                fastest
            );
        } else {
            debug!("Frame {} | Tick {} | {} draw commands", self.frames, frame.tick, commands.len());
        }
        Ok(())
    }
}

/// Writes every frame as one JSON object per line: the snapshot and its draw commands.
pub struct JsonLinesSink<W: Write> {
    out: W,
    frames: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        JsonLinesSink { out, frames: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for JsonLinesSink<W> {
    fn present(&mut self, frame: &Snapshot, render: &RenderSettings) -> Result<()> {
        self.frames += 1;
        let mut line = serde_json::Map::new();
        line.insert("frame".to_string(), self.frames.into());
        line.insert("snapshot".to_string(), serde_json::to_value(frame)?);
        line.insert("draw".to_string(), serde_json::to_value(frame.primitives(render))?);
        serde_json::to_writer(&mut self.out, &line)?;
        writeln!(self.out)?;
        Ok(())
    }
}
