use core::cell::Cell;

/// Source of the current emulated time, in milliseconds since power-on
/// (fractional, advancing with executed instructions).
pub trait EmulatedClock {
    fn now_ms(&self) -> f64;
}

/// Clock advanced explicitly by its owner.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<f64>,
}

impl ManualClock {
    pub const fn new(now_ms: f64) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
        }
    }

    /// Moves time forward by `ms` milliseconds.
    pub fn advance(&self, ms: f64) {
        debug_assert!(ms >= 0.0, "emulated time cannot run backwards");
        self.now_ms.set(self.now_ms.get() + ms);
    }

    /// Sets the current time, e.g. after restoring a snapshot.
    pub fn set(&self, now_ms: f64) {
        self.now_ms.set(now_ms);
    }
}

impl EmulatedClock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }
}
