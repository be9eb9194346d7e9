//! Hardware Abstraction Layer consumed by the keyer core

// Re-export time types based on feature
#[cfg(feature = "embassy-time")]
pub use embassy_time::{Duration, Instant};

#[cfg(not(feature = "embassy-time"))]
pub use self::mock_time::{Duration, Instant};

#[cfg(not(feature = "embassy-time"))]
mod mock_time {
    /// Millisecond instant used when embassy-time is not available
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Instant(u64);

    impl Instant {
        pub const fn from_millis(ms: u64) -> Self {
            Self(ms)
        }

        pub const fn as_millis(&self) -> u64 {
            self.0
        }
    }

    impl core::ops::Add<Duration> for Instant {
        type Output = Instant;

        fn add(self, rhs: Duration) -> Instant {
            Instant(self.0 + rhs.as_millis())
        }
    }

    /// Millisecond duration used when embassy-time is not available
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Duration(u64);

    impl Duration {
        pub const fn from_millis(ms: u64) -> Self {
            Self(ms)
        }

        pub const fn as_millis(&self) -> u64 {
            self.0
        }
    }
}

use crate::types::PaddleLevels;

/// Capacity of one text request handed to the encoder
pub const TEXT_CAPACITY: usize = 64;

/// Text received for encoding
pub type TextBuffer = heapless::String<TEXT_CAPACITY>;

/// Handler invoked by the platform on any edge of either paddle contact
pub type EdgeHandler = fn(PaddleLevels);

/// Time elapsed from `earlier` to `later`, zero if the clock went backwards
pub fn elapsed(earlier: Instant, later: Instant) -> Duration {
    Duration::from_millis(later.as_millis().saturating_sub(earlier.as_millis()))
}

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// GPIO operation failed
    GpioError,
    /// Tone generator rejected the request
    ToneError,
    /// Text channel failed
    ChannelError,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
            HalError::ToneError => write!(f, "Tone output failed"),
            HalError::ChannelError => write!(f, "Text channel failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Paddle and speed-adjust contacts
pub trait PaddleContacts {
    /// Instantaneous level of the dit contact (true = closed)
    fn read_dit(&mut self) -> Result<bool, HalError>;

    /// Instantaneous level of the dah contact (true = closed)
    fn read_dah(&mut self) -> Result<bool, HalError>;

    /// Instantaneous level of the speed-adjust contact (true = closed)
    fn read_speed_adjust(&mut self) -> Result<bool, HalError>;

    /// Register `handler` for any edge on the dit or dah contact
    fn on_paddle_edge(&mut self, handler: EdgeHandler) -> Result<(), HalError>;

    /// Sample all three contacts
    fn levels(&mut self) -> Result<PaddleLevels, HalError> {
        Ok(PaddleLevels {
            dit: self.read_dit()?,
            dah: self.read_dah()?,
            speed_adjust: self.read_speed_adjust()?,
        })
    }
}

/// Transmitter keying line and sidetone
pub trait KeyOutput {
    /// Set the transmit keying output (true = key down)
    fn set_keying(&mut self, active: bool) -> Result<(), HalError>;

    /// Start or stop the sidetone
    fn set_tone(&mut self, active: bool, frequency_hz: u32) -> Result<(), HalError>;
}

/// Monotonic clock with a blocking delay
pub trait Clock {
    fn now(&self) -> Instant;

    /// Block for `duration`
    fn sleep(&mut self, duration: Duration);
}

/// Decoded text out, text to encode in
pub trait TextChannel {
    fn emit_decoded_char(&mut self, c: char) -> Result<(), HalError>;

    /// Non-blocking poll for operator text
    fn receive_text(&mut self) -> Option<TextBuffer>;
}

/// Complete keyer HAL interface
pub trait KeyerHal {
    type Paddles: PaddleContacts;
    type Output: KeyOutput;
    type Clock: Clock;
    type Text: TextChannel;

    fn paddles(&mut self) -> &mut Self::Paddles;

    fn key_output(&mut self) -> &mut Self::Output;

    fn clock(&mut self) -> &mut Self::Clock;

    fn text(&mut self) -> &mut Self::Text;
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock hardware with a virtual clock and scripted paddle edges

    use super::*;
    use crate::controller::SharedKeyerState;
    use crate::types::Element;
    use heapless::{Deque, String, Vec};

    /// One change of the keying line
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct KeyTransition {
        pub at_ms: u64,
        pub down: bool,
    }

    /// Mock keyer hardware. Time only moves on `sleep`/`advance`; scripted
    /// edges fire when the clock passes them, including during a blocking play.
    pub struct MockHal<'a> {
        now_ms: u64,
        levels: PaddleLevels,
        script: Deque<(u64, PaddleLevels), 64>,
        shared: Option<&'a SharedKeyerState>,
        handler: Option<EdgeHandler>,
        key: bool,
        tone: bool,
        tone_hz: u32,
        key_log: Vec<KeyTransition, 512>,
        decoded: String<256>,
        inbox: Deque<TextBuffer, 4>,
        fail_keying: bool,
    }

    impl<'a> Default for MockHal<'a> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<'a> MockHal<'a> {
        pub fn new() -> Self {
            Self {
                now_ms: 0,
                levels: PaddleLevels::RELEASED,
                script: Deque::new(),
                shared: None,
                handler: None,
                key: false,
                tone: false,
                tone_hz: 0,
                key_log: Vec::new(),
                decoded: String::new(),
                inbox: Deque::new(),
                fail_keying: false,
            }
        }

        /// Mock whose edges go straight into `shared`
        pub fn with_shared(shared: &'a SharedKeyerState) -> Self {
            Self {
                shared: Some(shared),
                ..Self::new()
            }
        }

        /// Schedule contact levels to change at `at_ms`
        pub fn at(&mut self, at_ms: u64, levels: PaddleLevels) -> &mut Self {
            self.script.push_back((at_ms, levels)).ok();
            self
        }

        /// Change contact levels now and fire the edge
        pub fn press(&mut self, levels: PaddleLevels) {
            self.levels = levels;
            if let Some(shared) = self.shared {
                shared.on_paddle_edge(levels);
            } else if let Some(handler) = self.handler {
                handler(levels);
            }
        }

        /// Move the clock forward, firing scripted edges on the way
        pub fn advance(&mut self, duration: Duration) {
            let end = self.now_ms + duration.as_millis();
            while let Some(&(at, levels)) = self.script.front() {
                if at > end {
                    break;
                }
                self.script.pop_front();
                self.now_ms = self.now_ms.max(at);
                self.press(levels);
            }
            self.now_ms = end;
        }

        pub fn now_ms(&self) -> u64 {
            self.now_ms
        }

        pub fn is_keyed(&self) -> bool {
            self.key
        }

        pub fn tone(&self) -> (bool, u32) {
            (self.tone, self.tone_hz)
        }

        pub fn key_log(&self) -> &[KeyTransition] {
            &self.key_log
        }

        /// Keyed elements recovered from mark lengths
        pub fn elements(&self, dit_ms: u64) -> Vec<Element, 128> {
            let mut out = Vec::new();
            for pair in self.key_log.windows(2) {
                if pair[0].down && !pair[1].down {
                    let mark = pair[1].at_ms - pair[0].at_ms;
                    let element = if mark >= 2 * dit_ms { Element::Dah } else { Element::Dit };
                    out.push(element).ok();
                }
            }
            out
        }

        pub fn decoded(&self) -> &str {
            &self.decoded
        }

        /// Queue text to be returned by `receive_text`
        pub fn queue_text(&mut self, text: &str) {
            let mut buf = TextBuffer::new();
            buf.push_str(text).ok();
            self.inbox.push_back(buf).ok();
        }

        pub fn has_handler(&self) -> bool {
            self.handler.is_some()
        }

        /// Make every keying write fail from now on
        pub fn fail_keying(&mut self) {
            self.fail_keying = true;
        }
    }

    impl<'a> PaddleContacts for MockHal<'a> {
        fn read_dit(&mut self) -> Result<bool, HalError> {
            Ok(self.levels.dit)
        }

        fn read_dah(&mut self) -> Result<bool, HalError> {
            Ok(self.levels.dah)
        }

        fn read_speed_adjust(&mut self) -> Result<bool, HalError> {
            Ok(self.levels.speed_adjust)
        }

        fn on_paddle_edge(&mut self, handler: EdgeHandler) -> Result<(), HalError> {
            self.handler = Some(handler);
            Ok(())
        }
    }

    impl<'a> KeyOutput for MockHal<'a> {
        fn set_keying(&mut self, active: bool) -> Result<(), HalError> {
            if self.fail_keying {
                return Err(HalError::GpioError);
            }
            if active != self.key {
                self.key_log
                    .push(KeyTransition { at_ms: self.now_ms, down: active })
                    .ok();
            }
            self.key = active;
            Ok(())
        }

        fn set_tone(&mut self, active: bool, frequency_hz: u32) -> Result<(), HalError> {
            self.tone = active;
            self.tone_hz = frequency_hz;
            Ok(())
        }
    }

    impl<'a> Clock for MockHal<'a> {
        fn now(&self) -> Instant {
            Instant::from_millis(self.now_ms)
        }

        fn sleep(&mut self, duration: Duration) {
            self.advance(duration);
        }
    }

    impl<'a> TextChannel for MockHal<'a> {
        fn emit_decoded_char(&mut self, c: char) -> Result<(), HalError> {
            self.decoded.push(c).map_err(|_| HalError::ChannelError)
        }

        fn receive_text(&mut self) -> Option<TextBuffer> {
            self.inbox.pop_front()
        }
    }

    impl<'a> KeyerHal for MockHal<'a> {
        type Paddles = Self;
        type Output = Self;
        type Clock = Self;
        type Text = Self;

        fn paddles(&mut self) -> &mut Self {
            self
        }

        fn key_output(&mut self) -> &mut Self {
            self
        }

        fn clock(&mut self) -> &mut Self {
            self
        }

        fn text(&mut self) -> &mut Self {
            self
        }
    }
}
