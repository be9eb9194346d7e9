//! Text-to-Morse encoder

use crate::hal::{Clock, HalError, Instant, KeyerHal};
use crate::morse;
use crate::player::ElementPlayer;
use crate::timing::TimingProfile;
use crate::types::Element;

/// Play `text` through `player` as if it had been keyed on the paddles.
///
/// Each character is preceded by a character space, or a word space for
/// `' '`. Characters without a code are skipped without keying anything.
/// `observe` sees every element as it completes and a silent tick after every
/// gap, with the time at that point, so a decoder can follow along.
///
/// Returns the number of characters sent, spaces included.
pub fn play_text<H, F>(
    player: &mut ElementPlayer<H>,
    text: &str,
    timing: &TimingProfile,
    mut observe: F,
) -> Result<usize, HalError>
where
    H: KeyerHal,
    F: FnMut(Option<Element>, Instant),
{
    let mut sent = 0;

    for c in text.chars() {
        let Some(elements) = morse::encode_char(c) else {
            debug!("encoder: skipping {}", c);
            continue;
        };

        let pause = if elements.is_empty() {
            timing.word_space()
        } else {
            timing.char_space()
        };
        let clock = player.hal_mut().clock();
        clock.sleep(pause);
        observe(None, clock.now());

        for &element in elements.iter() {
            player.play(element, timing)?;
            observe(Some(element), player.hal_mut().clock().now());
        }
        sent += 1;
    }

    Ok(sent)
}
