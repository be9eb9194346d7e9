//! Core data types for the iambic keyer

use crate::hal::Duration;
use crate::timing::{clamp_wpm, TimingProfile, MAX_WPM, MIN_WPM};

/// Morse code elements
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Element {
    /// Dit (short element, one unit)
    Dit,
    /// Dah (long element, three units)
    Dah,
}

impl Element {
    /// Returns the mark duration of this element in units
    pub const fn duration_units(&self) -> u32 {
        match self {
            Element::Dit => 1,
            Element::Dah => 3,
        }
    }

    /// Returns the opposite element (Dit <-> Dah)
    pub const fn opposite(&self) -> Element {
        match self {
            Element::Dit => Element::Dah,
            Element::Dah => Element::Dit,
        }
    }

    /// Offset added to `2 * index` when descending the Morse tree
    pub const fn tree_offset(&self) -> usize {
        match self {
            Element::Dit => 1,
            Element::Dah => 2,
        }
    }

    /// `.` for Dit, `-` for Dah
    pub const fn symbol(&self) -> char {
        match self {
            Element::Dit => '.',
            Element::Dah => '-',
        }
    }
}

/// Keyer states driven by paddle edges
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyerState {
    /// No paddles pressed
    #[default]
    Idle,
    /// Dit paddle held, repeating Dit elements
    SendingDit,
    /// Dah paddle held, repeating Dah elements
    SendingDah,
    /// Both paddles held, Dit contact detected first
    SqueezeDitFirst,
    /// Both paddles held, Dah contact detected first
    SqueezeDahFirst,
}

impl KeyerState {
    /// Element a squeeze starts with when nothing has been played yet
    pub const fn squeeze_entry(&self) -> Option<Element> {
        match self {
            KeyerState::SqueezeDitFirst => Some(Element::Dit),
            KeyerState::SqueezeDahFirst => Some(Element::Dah),
            _ => None,
        }
    }

    pub(crate) const fn to_bits(self) -> u32 {
        match self {
            KeyerState::Idle => 0,
            KeyerState::SendingDit => 1,
            KeyerState::SendingDah => 2,
            KeyerState::SqueezeDitFirst => 3,
            KeyerState::SqueezeDahFirst => 4,
        }
    }

    pub(crate) const fn from_bits(bits: u32) -> KeyerState {
        match bits {
            1 => KeyerState::SendingDit,
            2 => KeyerState::SendingDah,
            3 => KeyerState::SqueezeDitFirst,
            4 => KeyerState::SqueezeDahFirst,
            _ => KeyerState::Idle,
        }
    }
}

/// Contact levels sampled at a paddle edge. `true` means closed (pressed).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PaddleLevels {
    pub dit: bool,
    pub dah: bool,
    pub speed_adjust: bool,
}

impl PaddleLevels {
    pub const RELEASED: PaddleLevels = PaddleLevels::new(false, false);

    /// Paddle levels with the speed-adjust contact open
    pub const fn new(dit: bool, dah: bool) -> Self {
        Self { dit, dah, speed_adjust: false }
    }

    /// Paddle levels with the speed-adjust contact closed
    pub const fn adjusting(dit: bool, dah: bool) -> Self {
        Self { dit, dah, speed_adjust: true }
    }

    pub const fn both_pressed(&self) -> bool {
        self.dit && self.dah
    }

    pub const fn both_released(&self) -> bool {
        !self.dit && !self.dah
    }
}

/// Configuration validation failures
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Speed outside the supported WPM range
    SpeedOutOfRange,
    /// Sidetone frequency outside the supported range
    ToneOutOfRange,
}

#[cfg(feature = "std")]
impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::SpeedOutOfRange => {
                write!(f, "WPM must be between {} and {}", MIN_WPM, MAX_WPM)
            }
            ConfigError::ToneOutOfRange => {
                write!(f, "Tone must be between {} and {} Hz", MIN_TONE_HZ, MAX_TONE_HZ)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Startup speed when nothing else is configured
pub const DEFAULT_WPM: u32 = 15;
/// Sidetone frequency in Hz
pub const DEFAULT_TONE_HZ: u32 = 550;
pub const MIN_TONE_HZ: u32 = 100;
pub const MAX_TONE_HZ: u32 = 4000;

/// Keyer configuration parameters. Never persisted; every run starts from here.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyerConfig {
    /// Speed the keyer starts at
    pub initial_wpm: u32,
    /// Sidetone frequency written with every tone-on
    pub tone_hz: u32,
    /// Pause between scheduling cycles while idle
    pub idle_poll: Duration,
}

impl Default for KeyerConfig {
    fn default() -> Self {
        Self {
            initial_wpm: DEFAULT_WPM,
            tone_hz: DEFAULT_TONE_HZ,
            idle_poll: Duration::from_millis(1),
        }
    }
}

impl KeyerConfig {
    /// Create a new configuration with validation
    pub fn new(wpm: u32, tone_hz: u32) -> Result<Self, ConfigError> {
        if !(MIN_WPM..=MAX_WPM).contains(&wpm) {
            return Err(ConfigError::SpeedOutOfRange);
        }
        if !(MIN_TONE_HZ..=MAX_TONE_HZ).contains(&tone_hz) {
            return Err(ConfigError::ToneOutOfRange);
        }

        Ok(Self {
            initial_wpm: wpm,
            tone_hz,
            ..Self::default()
        })
    }

    /// Starting speed, clamped into the supported range
    pub fn wpm(&self) -> u32 {
        clamp_wpm(self.initial_wpm)
    }

    /// Timing profile for the starting speed
    pub fn timing(&self) -> TimingProfile {
        TimingProfile::from_wpm(self.initial_wpm)
    }
}
