//! Scheduling loop tying the state cell, player, decoder and encoder together

use core::convert::Infallible;

use heapless::Vec;

use crate::controller::{KeyerSnapshot, SharedKeyerState};
use crate::decoder::MorseDecoder;
use crate::encoder;
use crate::hal::{Clock, EdgeHandler, HalError, KeyerHal, PaddleContacts, TextChannel};
use crate::player::ElementPlayer;
use crate::types::{Element, KeyerConfig, KeyerState};

/// Result of one scheduling cycle
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Cycle {
    /// Element keyed from the paddles this cycle
    pub played: Option<Element>,
    /// Character the decoder completed this cycle
    pub decoded: Option<char>,
    /// Characters sent from a text request this cycle
    pub text_sent: usize,
}

impl Cycle {
    /// Nothing was keyed
    pub fn is_idle(&self) -> bool {
        self.played.is_none() && self.text_sent == 0
    }
}

/// The keyer main loop.
///
/// Paddle edges land in the [`SharedKeyerState`] from interrupt context; every
/// cycle here takes one snapshot of it, plays at most one element, feeds the
/// decoder and writes decoded characters to the text channel. While the
/// paddles are idle, queued text is played instead.
pub struct Keyer<'a, H: KeyerHal> {
    shared: &'a SharedKeyerState,
    player: ElementPlayer<H>,
    decoder: MorseDecoder,
    config: KeyerConfig,
}

impl<'a, H: KeyerHal> Keyer<'a, H> {
    /// Build the keyer and reset `shared` to the configured starting speed
    pub fn new(mut hal: H, shared: &'a SharedKeyerState, config: KeyerConfig) -> Self {
        shared.reset();
        shared.set_speed(config.wpm());
        let now = hal.clock().now();

        info!("keyer: {} WPM, sidetone {} Hz", config.wpm(), config.tone_hz);

        Self {
            shared,
            player: ElementPlayer::new(hal, config.tone_hz),
            decoder: MorseDecoder::new(now),
            config,
        }
    }

    /// Register the platform's paddle edge handler and pick up the current
    /// contact levels.
    ///
    /// The handler is expected to forward to [`SharedKeyerState::on_paddle_edge`]
    /// on the same state this keyer reads.
    pub fn attach(&mut self, handler: EdgeHandler) -> Result<KeyerSnapshot, HalError> {
        self.player.hal_mut().paddles().on_paddle_edge(handler)?;
        self.resync()
    }

    /// Read the contacts and apply them as a paddle edge. For startup and for
    /// platforms that poll instead of taking edge interrupts.
    ///
    /// A closed speed-adjust contact is not treated as a speed step here.
    pub fn resync(&mut self) -> Result<KeyerSnapshot, HalError> {
        let levels = self.player.hal_mut().paddles().levels()?;
        if levels.speed_adjust {
            return Ok(self.shared.snapshot());
        }
        Ok(self.shared.on_paddle_edge(levels))
    }

    /// Run one scheduling cycle
    pub fn run_cycle(&mut self) -> Result<Cycle, HalError> {
        let snapshot = self.shared.snapshot();

        if snapshot.state == KeyerState::Idle {
            if let Some(text) = self.player.hal_mut().text().receive_text() {
                let text_sent = self.send_text(&text)?;
                return Ok(Cycle {
                    text_sent,
                    ..Cycle::default()
                });
            }
        }

        let played = self.player.step(snapshot.state, &snapshot.timing)?;
        let now = self.player.hal_mut().clock().now();
        let decoded = self.decoder.decode(played, now, &snapshot.timing);
        if let Some(c) = decoded {
            self.player.hal_mut().text().emit_decoded_char(c)?;
        }

        Ok(Cycle {
            played,
            decoded,
            text_sent: 0,
        })
    }

    /// Play `text` at the current speed, echoing it through the decoder.
    /// Returns the number of characters sent.
    ///
    /// Text leaves no last element behind: a squeeze closed while it plays
    /// starts with its own entry element.
    pub fn send_text(&mut self, text: &str) -> Result<usize, HalError> {
        let timing = self.shared.snapshot().timing;
        let mut sent = 0;

        for c in text.chars() {
            let mut utf8 = [0u8; 4];
            let mut echoed = Vec::<char, 4>::new();
            let decoder = &mut self.decoder;

            sent += encoder::play_text(&mut self.player, c.encode_utf8(&mut utf8), &timing, |element, at| {
                if let Some(d) = decoder.decode(element, at, &timing) {
                    echoed.push(d).ok();
                }
            })?;

            for d in echoed {
                self.player.hal_mut().text().emit_decoded_char(d)?;
            }
        }

        self.player.reset_last();
        debug!("keyer: sent {} characters of text", sent as u32);
        Ok(sent)
    }

    /// Run forever. Only returns on a hardware error.
    pub fn run(&mut self) -> Result<Infallible, HalError> {
        loop {
            let cycle = self.run_cycle()?;
            if cycle.is_idle() {
                let idle_poll = self.config.idle_poll;
                self.player.hal_mut().clock().sleep(idle_poll);
            }
        }
    }

    pub fn snapshot(&self) -> KeyerSnapshot {
        self.shared.snapshot()
    }

    pub fn config(&self) -> &KeyerConfig {
        &self.config
    }

    pub fn decoder(&self) -> &MorseDecoder {
        &self.decoder
    }

    pub fn last_element(&self) -> Option<Element> {
        self.player.last_element()
    }

    pub fn hal(&self) -> &H {
        self.player.hal()
    }

    pub fn hal_mut(&mut self) -> &mut H {
        self.player.hal_mut()
    }
}
