//! Timing-threshold Morse decoder

use crate::hal::{elapsed, Instant};
use crate::morse::{self, MAX_INDEX, UNKNOWN};
use crate::timing::TimingProfile;
use crate::types::Element;

/// Decoder state carried from one scheduling cycle to the next
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DecoderProgress {
    /// Position in the Morse tree for the elements seen so far
    pub path_index: usize,
    /// End of the last element's trailing gap
    pub last_element_at: Instant,
    /// A word space was already emitted for the current silence
    pub word_boundary_emitted: bool,
}

impl DecoderProgress {
    /// Fresh progress at `now`. Starts with the word boundary marked as sent
    /// so a keyer that powers up silent does not print a leading space.
    pub fn new(now: Instant) -> Self {
        Self {
            path_index: 0,
            last_element_at: now,
            word_boundary_emitted: true,
        }
    }
}

/// Rebuilds characters from played elements and the silence between them.
///
/// Must be fed every scheduling cycle, element or not: boundaries are found by
/// elapsed time, not by events.
#[derive(Copy, Clone, Debug)]
pub struct MorseDecoder {
    progress: DecoderProgress,
}

impl MorseDecoder {
    pub fn new(now: Instant) -> Self {
        Self {
            progress: DecoderProgress::new(now),
        }
    }

    /// Resume from explicitly stored progress
    pub fn from_progress(progress: DecoderProgress) -> Self {
        Self { progress }
    }

    pub fn progress(&self) -> DecoderProgress {
        self.progress
    }

    /// Feed one cycle: the element just played, or `None` for silence.
    pub fn decode(
        &mut self,
        played: Option<Element>,
        now: Instant,
        timing: &TimingProfile,
    ) -> Option<char> {
        let progress = &mut self.progress;

        match played {
            Some(element) => {
                progress.word_boundary_emitted = false;
                let next = morse::advance(progress.path_index, element);
                if next > MAX_INDEX {
                    warn!("decode overflow at index {}", next as u32);
                    progress.path_index = 0;
                    return Some(UNKNOWN);
                }
                progress.path_index = next;
                progress.last_element_at = now;
                None
            }
            None => {
                let silence = elapsed(progress.last_element_at, now);
                if progress.path_index != 0 && silence > timing.char_boundary_threshold {
                    let c = morse::char_at(progress.path_index).unwrap_or(UNKNOWN);
                    progress.path_index = 0;
                    trace!("decoded {}", c);
                    Some(c)
                } else if !progress.word_boundary_emitted && silence > timing.word_boundary_threshold {
                    let c = morse::char_at(progress.path_index).unwrap_or(UNKNOWN);
                    progress.word_boundary_emitted = true;
                    Some(c)
                } else {
                    None
                }
            }
        }
    }
}
