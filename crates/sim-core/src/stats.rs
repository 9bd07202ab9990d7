use std::sync::atomic::{AtomicU64, Ordering};

/// Counters published by the update loop and polled by telemetry.
#[derive(Debug, Default)]
pub struct SharedStats {
    ticks: AtomicU64,
    values_written: AtomicU64,
}

/// Point-in-time copy of [`SharedStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub ticks: u64,
    pub values_written: u64,
}

impl SharedStats {
    pub fn record_tick(&self, values_written: u64) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.values_written.fetch_add(values_written, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TickStats {
        TickStats {
            ticks: self.ticks.load(Ordering::Relaxed),
            values_written: self.values_written.load(Ordering::Relaxed),
        }
    }
}
