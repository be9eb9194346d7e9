//! Paddle state machine (Iambic-A)

use crate::types::{KeyerState, PaddleLevels};

/// Next keyer state for the paddle levels sampled at an edge.
///
/// The speed-adjust contact is not looked at here; edges taken while it is
/// closed never reach the state machine.
pub const fn next_state(current: KeyerState, levels: PaddleLevels) -> KeyerState {
    let dit = levels.dit;
    let dah = levels.dah;

    match current {
        KeyerState::Idle => match (dit, dah) {
            (true, true) => KeyerState::SqueezeDitFirst,
            (true, false) => KeyerState::SendingDit,
            (false, true) => KeyerState::SendingDah,
            (false, false) => KeyerState::Idle,
        },
        KeyerState::SendingDit => match (dit, dah) {
            (true, true) => KeyerState::SqueezeDitFirst,
            (true, false) => KeyerState::SendingDit,
            (false, true) => KeyerState::SendingDah,
            (false, false) => KeyerState::Idle,
        },
        KeyerState::SendingDah => match (dit, dah) {
            (true, true) => KeyerState::SqueezeDahFirst,
            (true, false) => KeyerState::SendingDit,
            (false, true) => KeyerState::SendingDah,
            (false, false) => KeyerState::Idle,
        },
        // Entry order is sticky until a contact opens
        KeyerState::SqueezeDitFirst | KeyerState::SqueezeDahFirst => match (dit, dah) {
            (true, true) => current,
            (true, false) => KeyerState::SendingDit,
            (false, true) => KeyerState::SendingDah,
            (false, false) => KeyerState::Idle,
        },
    }
}

/// Speed after one speed-adjust edge: a closed dit contact slows down by one
/// WPM, a closed dah contact speeds up by one. Bounds are applied by the caller.
pub const fn adjusted_wpm(wpm: u32, levels: PaddleLevels) -> u32 {
    let mut wpm = wpm;
    if levels.dit && wpm > crate::timing::MIN_WPM {
        wpm -= 1;
    }
    if levels.dah && wpm < crate::timing::MAX_WPM {
        wpm += 1;
    }
    wpm
}
