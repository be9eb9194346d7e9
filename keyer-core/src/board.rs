//! Keyer HAL over embedded-hal pins, a PWM sidetone and a delay

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::pwm::SetDutyCycle;

use crate::hal::{
    Clock, Duration, EdgeHandler, HalError, Instant, KeyOutput, KeyerHal, PaddleContacts,
    TextBuffer, TextChannel,
};

/// Paddle and speed-adjust inputs, active low (pulled up, grounded when
/// pressed)
pub struct PinPaddles<DIT, DAH, ADJ> {
    dit: DIT,
    dah: DAH,
    adjust: ADJ,
    handler: Option<EdgeHandler>,
}

impl<DIT, DAH, ADJ> PinPaddles<DIT, DAH, ADJ>
where
    DIT: InputPin,
    DAH: InputPin,
    ADJ: InputPin,
{
    pub fn new(dit: DIT, dah: DAH, adjust: ADJ) -> Self {
        Self {
            dit,
            dah,
            adjust,
            handler: None,
        }
    }

    /// Samples the contacts and runs the registered handler.
    ///
    /// The [`Board`] handed to [`Keyer`](crate::Keyer) is owned by the main
    /// loop, so an interrupt cannot reach its paddles. Give the pin-change
    /// interrupt its own `PinPaddles` over the same input lines (shared or
    /// split pin handles) and register the handler on that one. A platform
    /// that polls instead can call this through `keyer.hal_mut().paddles`.
    pub fn service_edge(&mut self) -> Result<(), HalError> {
        if let Some(handler) = self.handler {
            let levels = self.levels()?;
            handler(levels);
        }
        Ok(())
    }
}

impl<DIT, DAH, ADJ> PaddleContacts for PinPaddles<DIT, DAH, ADJ>
where
    DIT: InputPin,
    DAH: InputPin,
    ADJ: InputPin,
{
    fn read_dit(&mut self) -> Result<bool, HalError> {
        self.dit.is_low().map_err(|_| HalError::GpioError)
    }

    fn read_dah(&mut self) -> Result<bool, HalError> {
        self.dah.is_low().map_err(|_| HalError::GpioError)
    }

    fn read_speed_adjust(&mut self) -> Result<bool, HalError> {
        self.adjust.is_low().map_err(|_| HalError::GpioError)
    }

    fn on_paddle_edge(&mut self, handler: EdgeHandler) -> Result<(), HalError> {
        // Edge detection itself (EXTI / GPIO interrupt) is set up by the platform
        self.handler = Some(handler);
        Ok(())
    }
}

/// Keying pin plus a PWM channel for the sidetone.
///
/// The PWM frequency is fixed when the platform configures the timer; only the
/// duty cycle is switched here.
pub struct PinKeyOutput<KEY, TONE> {
    key: KEY,
    tone: TONE,
    inverted: bool,
}

impl<KEY, TONE> PinKeyOutput<KEY, TONE>
where
    KEY: OutputPin,
    TONE: SetDutyCycle,
{
    pub fn new(key: KEY, tone: TONE, inverted: bool) -> Self {
        Self { key, tone, inverted }
    }
}

impl<KEY, TONE> KeyOutput for PinKeyOutput<KEY, TONE>
where
    KEY: OutputPin,
    TONE: SetDutyCycle,
{
    fn set_keying(&mut self, active: bool) -> Result<(), HalError> {
        let output_state = if self.inverted { !active } else { active };
        if output_state {
            self.key.set_high().map_err(|_| HalError::GpioError)
        } else {
            self.key.set_low().map_err(|_| HalError::GpioError)
        }
    }

    fn set_tone(&mut self, active: bool, _frequency_hz: u32) -> Result<(), HalError> {
        if active {
            self.tone.set_duty_cycle_percent(50).map_err(|_| HalError::ToneError)
        } else {
            self.tone.set_duty_cycle_fully_off().map_err(|_| HalError::ToneError)
        }
    }
}

/// Source of monotonic time
pub trait Monotonic {
    fn now(&self) -> Instant;
}

/// [`Clock`] made of a blocking delay and a monotonic time source
pub struct DelayClock<D, M> {
    delay: D,
    monotonic: M,
}

impl<D: DelayNs, M: Monotonic> DelayClock<D, M> {
    pub fn new(delay: D, monotonic: M) -> Self {
        Self { delay, monotonic }
    }
}

impl<D: DelayNs, M: Monotonic> Clock for DelayClock<D, M> {
    fn now(&self) -> Instant {
        self.monotonic.now()
    }

    fn sleep(&mut self, duration: Duration) {
        let ms = duration.as_millis().min(u32::MAX as u64) as u32;
        self.delay.delay_ms(ms);
    }
}

#[cfg(feature = "embassy-time")]
mod system {
    use super::{DelayClock, Monotonic};
    use crate::hal::Instant;

    /// embassy-time's global time driver
    #[derive(Copy, Clone, Debug, Default)]
    pub struct SystemClock;

    impl Monotonic for SystemClock {
        fn now(&self) -> Instant {
            Instant::now()
        }
    }

    /// Clock backed by the embassy time driver
    pub fn system_clock() -> DelayClock<embassy_time::Delay, SystemClock> {
        DelayClock::new(embassy_time::Delay, SystemClock)
    }
}

#[cfg(feature = "embassy-time")]
pub use system::{system_clock, SystemClock};

/// Text channel over two closures: a decoded-character sink and a poll for
/// text to send (a UART line reader, a USB CDC endpoint, ...)
pub struct FnTextChannel<E, R> {
    emit: E,
    receive: R,
}

impl<E, R> FnTextChannel<E, R>
where
    E: FnMut(char),
    R: FnMut() -> Option<TextBuffer>,
{
    pub fn new(emit: E, receive: R) -> Self {
        Self { emit, receive }
    }
}

impl<E, R> TextChannel for FnTextChannel<E, R>
where
    E: FnMut(char),
    R: FnMut() -> Option<TextBuffer>,
{
    fn emit_decoded_char(&mut self, c: char) -> Result<(), HalError> {
        (self.emit)(c);
        Ok(())
    }

    fn receive_text(&mut self) -> Option<TextBuffer> {
        (self.receive)()
    }
}

/// Complete board: paddles, outputs, clock and text channel
pub struct Board<P, K, C, T> {
    pub paddles: P,
    pub output: K,
    pub clock: C,
    pub text: T,
}

impl<P, K, C, T> Board<P, K, C, T>
where
    P: PaddleContacts,
    K: KeyOutput,
    C: Clock,
    T: TextChannel,
{
    pub fn new(paddles: P, output: K, clock: C, text: T) -> Self {
        Self {
            paddles,
            output,
            clock,
            text,
        }
    }
}

impl<P, K, C, T> KeyerHal for Board<P, K, C, T>
where
    P: PaddleContacts,
    K: KeyOutput,
    C: Clock,
    T: TextChannel,
{
    type Paddles = P;
    type Output = K;
    type Clock = C;
    type Text = T;

    fn paddles(&mut self) -> &mut P {
        &mut self.paddles
    }

    fn key_output(&mut self) -> &mut K {
        &mut self.output
    }

    fn clock(&mut self) -> &mut C {
        &mut self.clock
    }

    fn text(&mut self) -> &mut T {
        &mut self.text
    }
}
