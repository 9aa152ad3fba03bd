//! Virtual clock for deterministic host simulation.

use std::time::Duration;

/// Monotonic clock that only moves when the simulation advances it.
///
/// Stored as integer nanoseconds so repeated small steps do not drift.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: u64,
}

impl SimClock {
    /// Creates a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Advances virtual time by the given duration.
    pub fn advance(&mut self, duration: Duration) {
        self.virtual_time_ns += duration.as_nanos() as u64;
    }
    
    /// Returns the current virtual time.
    pub fn now(&self) -> Duration {
        Duration::from_nanos(self.virtual_time_ns)
    }
    
    /// Returns the current virtual time in seconds, the trail's time base.
    pub fn now_secs(&self) -> f64 {
        self.now().as_secs_f64()
    }
}
