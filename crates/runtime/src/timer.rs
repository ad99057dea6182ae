/// Deterministic repeating timer driven by elapsed milliseconds.
///
/// The host feeds wall-clock deltas through [`RepeatingTimer::advance`]; the
/// timer never reads a clock itself, so playback can be replayed exactly.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RepeatingTimer {
    period_ms: f64,
    elapsed_ms: f64,
}

impl RepeatingTimer {
    /// Periods are floored at 1 ms.
    pub fn new(period_ms: f64) -> Self {
        Self {
            period_ms: period_ms.max(1.0),
            elapsed_ms: 0.0,
        }
    }

    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }

    /// Time accumulated towards the next tick.
    pub fn pending_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Adds `dt_ms` and returns how many periods completed.
    pub fn advance(&mut self, dt_ms: f64) -> u32 {
        if !dt_ms.is_finite() || dt_ms <= 0.0 {
            return 0;
        }
        self.elapsed_ms += dt_ms;
        let ticks = (self.elapsed_ms / self.period_ms).floor();
        self.elapsed_ms -= ticks * self.period_ms;
        ticks as u32
    }
}
