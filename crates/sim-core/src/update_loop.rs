use crate::generator::generate_reading;
use crate::registry::Registry;
use crate::space::{SpaceError, WritableHandle};
use crate::stats::{SharedStats, TickStats};
use crate::tags::TagName;
use log::info;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct LoopConfig {
    pub tick_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopping,
}

/// Drives the periodic write pass over the registry.
///
/// Single thread of control; every handle is owned exclusively by this loop.
pub struct UpdateLoop<H: WritableHandle, R: Rng> {
    registry: Registry<H>,
    rng: R,
    config: LoopConfig,
    stats: Arc<SharedStats>,
}

impl<H: WritableHandle, R: Rng> UpdateLoop<H, R> {
    pub fn new(
        registry: Registry<H>,
        rng: R,
        config: LoopConfig,
        stats: Arc<SharedStats>,
    ) -> Self {
        Self {
            registry,
            rng,
            config,
            stats,
        }
    }

    /// One update pass: a fresh reading per equipment, all seven tags written
    /// before moving to the next equipment.
    pub fn tick(&mut self) -> Result<(), SpaceError> {
        for equipment in self.registry.iter_mut() {
            let reading = generate_reading(&mut self.rng);
            equipment.apply(&reading)?;
        }
        self.stats
            .record_tick((self.registry.len() * TagName::COUNT) as u64);
        Ok(())
    }

    /// Runs until the stop flag is observed, then returns the final stats.
    /// The inter-tick sleep is the only suspension point; a write failure
    /// exits through the error path instead of Stopping.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<TickStats, SpaceError> {
        info!(
            "update loop entering RUNNING with {} equipment",
            self.registry.len()
        );

        let mut state = RunState::Running;
        while state == RunState::Running {
            if stop.load(Ordering::Relaxed) {
                state = RunState::Stopping;
                continue;
            }
            self.tick()?;
            thread::sleep(self.config.tick_interval);
        }

        let stats = self.stats.snapshot();
        info!("update loop stopped after {} ticks", stats.ticks);
        Ok(stats)
    }

    pub fn stats(&self) -> TickStats {
        self.stats.snapshot()
    }
}
