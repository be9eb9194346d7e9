//! Squeeze and paddle behavior driven through the full keyer

use keyer_core::test_utils::output_capture::{to_morse_string, TimingAnalysis};
use keyer_core::test_utils::paddle_simulator::PaddleScript;
use keyer_core::test_utils::scenario::simulate;
use keyer_core::{Element, PaddleLevels};
use rstest::rstest;

#[test]
fn squeeze_from_idle_alternates_dit_first() {
    let result = simulate(&PaddleScript::squeeze(0, 1000), 20, 2000, 5);

    assert_eq!(to_morse_string(&result.marks), ".-.-.-");
    // .-.-.- runs off the tree
    assert_eq!(result.decoded, "* ");
}

#[test]
fn dah_first_squeeze_alternates_dah_first() {
    let result = simulate(&PaddleScript::squeeze_dah_first(0, 30, 700), 20, 1500, 5);

    assert_eq!(to_morse_string(&result.marks), "-.-.");
    assert_eq!(result.decoded, "C ");
}

#[test]
fn releasing_both_mid_element_sends_nothing_more() {
    // Iambic-A: no memory of the opposite paddle after release
    let result = simulate(&PaddleScript::squeeze(0, 50), 20, 1000, 5);

    assert_eq!(to_morse_string(&result.marks), ".");
    assert_eq!(result.decoded, "E ");
}

#[test]
fn releasing_dah_during_squeeze_continues_with_dits() {
    let script = PaddleScript::new("Squeeze then dit only")
        .then(0, PaddleLevels::new(true, true))
        .then(400, PaddleLevels::new(true, false))
        .then(700, PaddleLevels::RELEASED);
    let result = simulate(&script, 20, 1500, 5);

    assert_eq!(to_morse_string(&result.marks), ".-...");
    assert_eq!(result.decoded, "& ");
}

#[test]
fn releasing_dit_during_squeeze_continues_with_dahs() {
    let script = PaddleScript::new("Squeeze then dah only")
        .then(0, PaddleLevels::new(true, true))
        .then(130, PaddleLevels::new(false, true))
        .then(500, PaddleLevels::RELEASED);
    let result = simulate(&script, 20, 1500, 5);

    // dit 5-125, dah 125-365, dah 365-605
    assert_eq!(to_morse_string(&result.marks), ".--");
    assert_eq!(result.decoded, "W ");
}

#[rstest]
#[case(5)]
#[case(12)]
#[case(20)]
#[case(30)]
fn held_squeeze_never_repeats_an_element(#[case] wpm: u32) {
    let dit = 1200 / wpm as u64;
    // long enough for eight dit-dah pairs
    let hold = 8 * 6 * dit;
    let result = simulate(&PaddleScript::squeeze(0, hold), wpm, hold + 10 * dit, 1);

    assert!(result.marks.len() >= 16);
    assert_eq!(result.marks[0].element, Element::Dit);
    for pair in result.marks.windows(2) {
        assert_ne!(pair[0].element, pair[1].element);
    }
}

#[rstest]
#[case::dit(PaddleScript::hold_dit(0, 500), "5 ")]
#[case::dah(PaddleScript::hold_dah(0, 1100), "0 ")]
#[case::short_dah(PaddleScript::hold_dah(0, 100), "T ")]
fn single_paddle_repeats(#[case] script: PaddleScript, #[case] decoded: &str) {
    let result = simulate(&script, 20, 2000, 5);
    assert_eq!(result.decoded, decoded);

    let analysis = TimingAnalysis::new(&result.marks, result.dit_ms);
    assert!(analysis.marks_exact());
    if let Some(gap) = analysis.min_gap() {
        assert_eq!(gap, result.dit_ms);
    }
}

#[test]
fn letters_keyed_with_pauses_decode_separately() {
    // N (-.) then a character pause, then A (.-)
    let script = PaddleScript::new("NA")
        .then(0, PaddleLevels::new(false, true))
        .then(200, PaddleLevels::new(true, true))
        .then(300, PaddleLevels::RELEASED)
        .then(600, PaddleLevels::new(true, false))
        .then(650, PaddleLevels::new(true, true))
        .then(750, PaddleLevels::RELEASED);
    let result = simulate(&script, 20, 1500, 5);

    assert_eq!(to_morse_string(&result.marks), "-..-");
    assert_eq!(result.decoded, "NA ");
}

#[rstest]
#[case::faster(true, 5, 20)]
#[case::slower(false, 5, 10)]
#[case::clamped_low(false, 20, 5)]
#[case::clamped_high(true, 20, 30)]
fn speed_adjust_taps(#[case] faster: bool, #[case] taps: u64, #[case] expected_wpm: u32) {
    let result = simulate(&PaddleScript::speed_taps(0, faster, taps), 15, 1000, 5);

    assert_eq!(result.final_wpm, expected_wpm);
    // speed taps never key the transmitter
    assert!(result.marks.is_empty());
    assert_eq!(result.decoded, "");
}

#[test]
fn speed_change_applies_to_following_elements() {
    let script = PaddleScript::speed_taps(0, false, 5).merge(PaddleScript::hold_dit(300, 400));
    let result = simulate(&script, 20, 1500, 5);

    assert_eq!(result.final_wpm, 15);
    assert_eq!(result.dit_ms, 80);
    assert!(result.marks.iter().all(|m| m.length_ms == 80));
}
