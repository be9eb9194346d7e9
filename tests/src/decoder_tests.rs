//! Decoder properties over arbitrary text and speeds

use keyer_core::hal::mock::MockHal;
use keyer_core::morse::{self, MAX_INDEX, MORSE_TREE, UNKNOWN};
use keyer_core::{play_text, Element, ElementPlayer, Instant, MorseDecoder, TimingProfile};
use proptest::prelude::*;
use rstest::rstest;

use crate::decode_key_log;

const ALPHABET: &str = "ETIANMSURWDKGOHVFLPJBXCYZQ0123456789/=+?";

fn word() -> impl Strategy<Value = String> {
    proptest::collection::vec(proptest::sample::select(ALPHABET.chars().collect::<Vec<_>>()), 1..5)
        .prop_map(|chars| chars.into_iter().collect())
}

fn sentence() -> impl Strategy<Value = String> {
    proptest::collection::vec(word(), 1..4).prop_map(|words| words.join(" "))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn encoded_text_decodes_back(text in sentence(), wpm in 5u32..=30) {
        let timing = TimingProfile::from_wpm(wpm);
        let mut player = ElementPlayer::new(MockHal::new(), 550);
        play_text(&mut player, &text, &timing, |_, _| {}).unwrap();

        let hal = player.release();
        let until = hal.now_ms() + 2 * timing.word_boundary_threshold.as_millis();
        let decoded = decode_key_log(hal.key_log(), &timing, 5, until);

        prop_assert_eq!(decoded, format!("{} ", text));
    }

    #[test]
    fn decoder_follows_the_encoder_observer(text in sentence(), wpm in 5u32..=30) {
        let timing = TimingProfile::from_wpm(wpm);
        let mut player = ElementPlayer::new(MockHal::new(), 550);
        let mut decoder = MorseDecoder::new(Instant::from_millis(0));
        let mut decoded = String::new();

        play_text(&mut player, &text, &timing, |element, at| {
            decoded.extend(decoder.decode(element, at, &timing));
        }).unwrap();

        // everything but the last character is out once its gap has passed
        let last = text.chars().last().unwrap();
        prop_assert_eq!(format!("{}{}", decoded, last), text);
    }

    #[test]
    fn any_element_sequence_stays_in_bounds(
        elements in proptest::collection::vec(prop_oneof![Just(Element::Dit), Just(Element::Dah)], 0..40),
    ) {
        let timing = TimingProfile::from_wpm(20);
        let mut decoder = MorseDecoder::new(Instant::from_millis(0));
        let mut now = 0;

        for element in elements {
            now += 120;
            let out = decoder.decode(Some(element), Instant::from_millis(now), &timing);
            prop_assert!(out.is_none() || out == Some(UNKNOWN));
            prop_assert!(decoder.progress().path_index <= MAX_INDEX);
        }

        let flushed = decoder.decode(None, Instant::from_millis(now + 1_000), &timing);
        if let Some(c) = flushed {
            prop_assert!(MORSE_TREE.contains(&c));
        }
        prop_assert_eq!(decoder.progress().path_index, 0);
    }
}

#[rstest]
#[case(5)]
#[case(13)]
#[case(20)]
#[case(30)]
fn character_boundary_is_strictly_after_one_dit(#[case] wpm: u32) {
    let timing = TimingProfile::from_wpm(wpm);
    let threshold = timing.char_boundary_threshold.as_millis();
    let mut decoder = MorseDecoder::new(Instant::from_millis(0));

    decoder.decode(Some(Element::Dit), Instant::from_millis(1_000), &timing);
    assert_eq!(decoder.decode(None, Instant::from_millis(1_000 + threshold), &timing), None);
    assert_eq!(decoder.decode(None, Instant::from_millis(1_001 + threshold), &timing), Some('E'));
}

#[rstest]
#[case(5)]
#[case(13)]
#[case(20)]
#[case(30)]
fn word_boundary_is_strictly_after_six_dits(#[case] wpm: u32) {
    let timing = TimingProfile::from_wpm(wpm);
    let threshold = timing.word_boundary_threshold.as_millis();
    let mut decoder = MorseDecoder::new(Instant::from_millis(0));

    decoder.decode(Some(Element::Dah), Instant::from_millis(1_000), &timing);
    assert_eq!(decoder.decode(None, Instant::from_millis(1_000 + threshold / 2), &timing), Some('T'));
    assert_eq!(decoder.decode(None, Instant::from_millis(1_000 + threshold), &timing), None);
    assert_eq!(decoder.decode(None, Instant::from_millis(1_001 + threshold), &timing), Some(' '));
}

#[test]
fn every_assigned_character_decodes_from_its_own_code() {
    let timing = TimingProfile::from_wpm(20);

    for (index, &c) in MORSE_TREE.iter().enumerate().skip(1) {
        if c == UNKNOWN {
            continue;
        }
        let mut decoder = MorseDecoder::new(Instant::from_millis(0));
        let mut now = 0;
        for &element in morse::path_to(index).iter() {
            now += 120;
            assert_eq!(decoder.decode(Some(element), Instant::from_millis(now), &timing), None);
        }
        assert_eq!(decoder.decode(None, Instant::from_millis(now + 61), &timing), Some(c), "index {}", index);
    }
}
