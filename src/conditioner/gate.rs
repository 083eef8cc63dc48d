//! Noise gate with a hysteresis band between its onset and release levels.
//!
//! The gate is a four state machine:
//!
//! ```text
//!            level >= onset             ramp done
//!   Closed ─────────────────▶ Attacking ─────────▶ Open
//!     ▲                        ▲     │              │
//!     │ ramp done   level >= onset   │ level <      │ level < release
//!     │                        │     ▼ release      ▼
//!     └──────────────────── Releasing ◀────────────┘
//! ```
//!
//! Besides the main cycle, two transitions interrupt a ramp: an onset while
//! releasing goes back to Attacking, and a level under the release threshold
//! while attacking goes to Releasing. Closed and Open are never connected
//! directly.
//!
//! Ramps restart from whatever gain the gate had when it changed state, so a
//! release that is interrupted by a new onset never jumps back to zero.
use crate::float::Float;
use crate::utils::level::db_to_gain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Closed,
    Attacking,
    Open,
    Releasing,
}

#[derive(Debug, Clone)]
pub struct NoiseGate<T>
where
    T: Float,
{
    onset: T,
    release: T,
    attack_step: T,
    release_step: T,
    state: GateState,
    // Samples spent in `state`.
    elapsed: usize,
    // Gain when `state` was entered.
    entry_gain: T,
    gain: T,
}

impl<T> NoiseGate<T>
where
    T: Float,
{
    /// Create a gate. Thresholds are in dBFS and `onset_db` is expected to be
    /// above `release_db`; the configuration layer enforces this. Widths are
    /// the ramp lengths in samples; zero is treated as one.
    pub fn new(onset_db: T, release_db: T, attack_width: usize, release_width: usize) -> Self {
        NoiseGate {
            onset: db_to_gain(onset_db),
            release: db_to_gain(release_db),
            attack_step: T::one() / T::cast(attack_width.max(1) as f64),
            release_step: T::one() / T::cast(release_width.max(1) as f64),
            state: GateState::Closed,
            elapsed: 0,
            entry_gain: T::zero(),
            gain: T::zero(),
        }
    }

    /// Advance by one sample with the current envelope `level` and return
    /// the gain to apply.
    #[inline]
    pub fn update(&mut self, level: T) -> T {
        let next = self.transition(level, self.elapsed);
        if next != self.state {
            self.state = next;
            self.elapsed = 0;
            self.entry_gain = self.gain;
        }
        self.elapsed += 1;
        self.gain = self.ramp(self.elapsed);
        self.gain
    }

    /// Next state for an envelope `level` after `elapsed` samples in the
    /// current state.
    fn transition(&self, level: T, elapsed: usize) -> GateState {
        match self.state {
            GateState::Closed if level >= self.onset => GateState::Attacking,
            GateState::Attacking if self.ramp(elapsed) >= T::one() => GateState::Open,
            GateState::Attacking if level < self.release => GateState::Releasing,
            GateState::Open if level < self.release => GateState::Releasing,
            GateState::Releasing if level >= self.onset => GateState::Attacking,
            GateState::Releasing if self.ramp(elapsed) <= T::zero() => GateState::Closed,
            state => state,
        }
    }

    /// Gain after `elapsed` samples in the current state.
    fn ramp(&self, elapsed: usize) -> T {
        let progress = T::cast(elapsed as f64);
        match self.state {
            GateState::Closed => T::zero(),
            GateState::Open => T::one(),
            GateState::Attacking => (self.entry_gain + progress * self.attack_step).min(T::one()),
            GateState::Releasing => {
                (self.entry_gain - progress * self.release_step).max(T::zero())
            }
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn gain(&self) -> T {
        self.gain
    }

    pub fn reset(&mut self) {
        self.state = GateState::Closed;
        self.elapsed = 0;
        self.entry_gain = T::zero();
        self.gain = T::zero();
    }
}
