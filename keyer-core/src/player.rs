//! Element player: keys the transmitter for one element at a time

use crate::hal::{Clock, HalError, KeyOutput, KeyerHal};
use crate::timing::TimingProfile;
use crate::types::{Element, KeyerState};

/// Plays elements on the keying and tone outputs and remembers the last one.
///
/// Owns the hardware, so a `&mut` borrow is the only way to key: live paddle
/// playback and text playback can never interleave.
pub struct ElementPlayer<H: KeyerHal> {
    hal: H,
    tone_hz: u32,
    last: Option<Element>,
}

impl<H: KeyerHal> ElementPlayer<H> {
    pub fn new(hal: H, tone_hz: u32) -> Self {
        Self {
            hal,
            tone_hz,
            last: None,
        }
    }

    /// Element most recently completed, `None` after an idle cycle
    pub fn last_element(&self) -> Option<Element> {
        self.last
    }

    /// Forget the last element, so the next squeeze starts from its entry
    /// element
    pub(crate) fn reset_last(&mut self) {
        self.last = None;
    }

    /// Key one element and its trailing gap. Blocks for mark plus gap.
    pub fn play(&mut self, element: Element, timing: &TimingProfile) -> Result<(), HalError> {
        let tone_hz = self.tone_hz;
        self.hal.key_output().set_tone(true, tone_hz)?;
        self.hal.key_output().set_keying(true)?;
        self.hal.clock().sleep(timing.mark(element));

        self.hal.key_output().set_keying(false)?;
        self.hal.key_output().set_tone(false, 0)?;
        self.hal.clock().sleep(timing.element_gap);

        self.last = Some(element);
        Ok(())
    }

    /// Element the scheduler should play next for `state`, if any
    pub fn next_element(&self, state: KeyerState) -> Option<Element> {
        match state {
            KeyerState::Idle => None,
            KeyerState::SendingDit => Some(Element::Dit),
            KeyerState::SendingDah => Some(Element::Dah),
            KeyerState::SqueezeDitFirst | KeyerState::SqueezeDahFirst => match self.last {
                None => state.squeeze_entry(),
                Some(last) => Some(last.opposite()),
            },
        }
    }

    /// One scheduling decision. Returns the element played, if any.
    pub fn step(
        &mut self,
        state: KeyerState,
        timing: &TimingProfile,
    ) -> Result<Option<Element>, HalError> {
        match self.next_element(state) {
            Some(element) => {
                self.play(element, timing)?;
                Ok(Some(element))
            }
            None => {
                self.reset_last();
                Ok(None)
            }
        }
    }

    pub fn tone_hz(&self) -> u32 {
        self.tone_hz
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    /// Give the hardware back
    pub fn release(self) -> H {
        self.hal
    }
}
