//! Words-per-minute to element timing (PARIS standard, 50 units per word)

use crate::hal::Duration;

pub const MIN_WPM: u32 = 5;
pub const MAX_WPM: u32 = 30;

/// Clamp a requested speed into the supported range
pub const fn clamp_wpm(wpm: u32) -> u32 {
    if wpm < MIN_WPM {
        MIN_WPM
    } else if wpm > MAX_WPM {
        MAX_WPM
    } else {
        wpm
    }
}

/// Durations derived from a single WPM setting.
///
/// Every field is a function of `speed_wpm` alone. The two thresholds are
/// measured from the end of an element's trailing gap, which is why each is one
/// dit shorter than the nominal 3-unit character and 7-unit word spacing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimingProfile {
    pub speed_wpm: u32,
    /// Mark length of a Dit
    pub dit: Duration,
    /// Mark length of a Dah (3 dits)
    pub dah: Duration,
    /// Silence after every element (1 dit)
    pub element_gap: Duration,
    /// Silence after which a pending character is complete
    pub char_boundary_threshold: Duration,
    /// Silence after which a word space is emitted
    pub word_boundary_threshold: Duration,
}

impl TimingProfile {
    /// Compute the profile for `wpm`, clamped to [`MIN_WPM`, `MAX_WPM`]
    pub fn from_wpm(wpm: u32) -> Self {
        let speed_wpm = clamp_wpm(wpm);
        let dit_ms = (1200 / speed_wpm) as u64;

        Self {
            speed_wpm,
            dit: Duration::from_millis(dit_ms),
            dah: Duration::from_millis(dit_ms * 3),
            element_gap: Duration::from_millis(dit_ms),
            char_boundary_threshold: Duration::from_millis(dit_ms),
            word_boundary_threshold: Duration::from_millis(dit_ms * 6),
        }
    }

    /// Replace the speed, recomputing every derived duration
    pub fn set_speed(&mut self, wpm: u32) {
        *self = Self::from_wpm(wpm);
    }

    /// Mark length of `element`
    pub fn mark(&self, element: crate::types::Element) -> Duration {
        match element {
            crate::types::Element::Dit => self.dit,
            crate::types::Element::Dah => self.dah,
        }
    }

    /// Extra silence the encoder inserts before a character; together with
    /// the trailing element gap this makes the 3-unit character space.
    pub fn char_space(&self) -> Duration {
        Duration::from_millis(self.dah.as_millis() - self.element_gap.as_millis())
    }

    /// Extra silence the encoder inserts for a word space
    pub fn word_space(&self) -> Duration {
        self.word_boundary_threshold
    }
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self::from_wpm(crate::types::DEFAULT_WPM)
    }
}
