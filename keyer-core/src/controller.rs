//! State shared between the paddle edge handler and the scheduling loop

use portable_atomic::{AtomicU32, Ordering};

use crate::fsm::{adjusted_wpm, next_state};
use crate::timing::{clamp_wpm, TimingProfile};
use crate::types::{KeyerState, PaddleLevels, DEFAULT_WPM};

const STATE_MASK: u32 = 0xff;
const WPM_SHIFT: u32 = 8;

const fn pack(state: KeyerState, wpm: u32) -> u32 {
    state.to_bits() | (clamp_wpm(wpm) << WPM_SHIFT)
}

const fn unpack(word: u32) -> (KeyerState, u32) {
    (KeyerState::from_bits(word & STATE_MASK), clamp_wpm(word >> WPM_SHIFT))
}

/// What the scheduling loop sees in one cycle
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyerSnapshot {
    pub state: KeyerState,
    pub timing: TimingProfile,
}

/// Keyer state and speed packed into one atomic word.
///
/// The edge handler publishes with a single compare-and-swap and the scheduler
/// reads with a single load, so neither side can observe a state from one event
/// paired with a speed from another. Safe to call from interrupt context.
pub struct SharedKeyerState {
    word: AtomicU32,
}

impl SharedKeyerState {
    /// Idle at the power-on default speed
    pub const fn new() -> Self {
        Self::with_wpm(DEFAULT_WPM)
    }

    pub const fn with_wpm(wpm: u32) -> Self {
        Self {
            word: AtomicU32::new(pack(KeyerState::Idle, wpm)),
        }
    }

    /// Paddle edge handler body.
    ///
    /// With the speed-adjust contact closed the levels become speed steps and
    /// the keyer state is left alone; otherwise the state machine advances.
    pub fn on_paddle_edge(&self, levels: PaddleLevels) -> KeyerSnapshot {
        let previous = self
            .word
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                Some(Self::apply(word, levels))
            })
            .unwrap_or_else(|word| word);
        let (old_state, old_wpm) = unpack(previous);
        let (state, wpm) = unpack(Self::apply(previous, levels));

        if state != old_state {
            trace!("paddle: {:?} -> {:?}", old_state, state);
        }
        if wpm != old_wpm {
            debug!("speed: {} -> {} WPM", old_wpm, wpm);
        }

        KeyerSnapshot {
            state,
            timing: TimingProfile::from_wpm(wpm),
        }
    }

    fn apply(word: u32, levels: PaddleLevels) -> u32 {
        let (state, wpm) = unpack(word);
        if levels.speed_adjust {
            pack(state, adjusted_wpm(wpm, levels))
        } else {
            pack(next_state(state, levels), wpm)
        }
    }

    /// Consistent state and timing for one scheduling cycle
    pub fn snapshot(&self) -> KeyerSnapshot {
        let (state, wpm) = unpack(self.word.load(Ordering::Acquire));
        KeyerSnapshot {
            state,
            timing: TimingProfile::from_wpm(wpm),
        }
    }

    pub fn state(&self) -> KeyerState {
        self.snapshot().state
    }

    pub fn wpm(&self) -> u32 {
        unpack(self.word.load(Ordering::Acquire)).1
    }

    /// Set the speed directly, clamped to the supported range
    pub fn set_speed(&self, wpm: u32) {
        self.word
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                let (state, _) = unpack(word);
                Some(pack(state, wpm))
            })
            .unwrap_or_else(|word| word);
    }

    /// Back to Idle, keeping the speed
    pub fn reset(&self) {
        self.word
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                let (_, wpm) = unpack(word);
                Some(pack(KeyerState::Idle, wpm))
            })
            .unwrap_or_else(|word| word);
    }
}

impl Default for SharedKeyerState {
    fn default() -> Self {
        Self::new()
    }
}
