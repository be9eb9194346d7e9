//! Test utilities: scripted paddle input, key-line analysis and a scenario
//! runner on the mock HAL's virtual clock

pub mod paddle_simulator {
    //! Paddle input scripts

    use crate::hal::mock::MockHal;
    use crate::types::PaddleLevels;

    /// Contact levels taking effect at `at_ms`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PaddleEvent {
        pub at_ms: u64,
        pub levels: PaddleLevels,
    }

    /// Time-ordered paddle events
    #[derive(Debug, Clone, Default)]
    pub struct PaddleScript {
        pub events: Vec<PaddleEvent>,
        pub description: String,
    }

    impl PaddleScript {
        pub fn new(description: &str) -> Self {
            Self {
                events: Vec::new(),
                description: description.to_string(),
            }
        }

        /// Add an event; events are kept sorted by time
        pub fn then(mut self, at_ms: u64, levels: PaddleLevels) -> Self {
            self.events.push(PaddleEvent { at_ms, levels });
            self.events.sort_by_key(|e| e.at_ms);
            self
        }

        /// Dit paddle held from `from_ms` until `to_ms`
        pub fn hold_dit(from_ms: u64, to_ms: u64) -> Self {
            Self::new("Dit hold")
                .then(from_ms, PaddleLevels::new(true, false))
                .then(to_ms, PaddleLevels::RELEASED)
        }

        /// Dah paddle held from `from_ms` until `to_ms`
        pub fn hold_dah(from_ms: u64, to_ms: u64) -> Self {
            Self::new("Dah hold")
                .then(from_ms, PaddleLevels::new(false, true))
                .then(to_ms, PaddleLevels::RELEASED)
        }

        /// Both paddles closing together at `from_ms`, released at `to_ms`
        pub fn squeeze(from_ms: u64, to_ms: u64) -> Self {
            Self::new("Squeeze")
                .then(from_ms, PaddleLevels::new(true, true))
                .then(to_ms, PaddleLevels::RELEASED)
        }

        /// Dah first, dit joining `lead_ms` later, both released at `to_ms`
        pub fn squeeze_dah_first(from_ms: u64, lead_ms: u64, to_ms: u64) -> Self {
            Self::new("Squeeze, dah first")
                .then(from_ms, PaddleLevels::new(false, true))
                .then(from_ms + lead_ms, PaddleLevels::new(true, true))
                .then(to_ms, PaddleLevels::RELEASED)
        }

        /// `count` speed-adjust taps starting at `from_ms`, 20ms apart
        pub fn speed_taps(from_ms: u64, faster: bool, count: u64) -> Self {
            let mut script = Self::new("Speed adjust");
            for n in 0..count {
                let at = from_ms + n * 20;
                script = script
                    .then(at, PaddleLevels::adjusting(!faster, faster))
                    .then(at + 10, PaddleLevels::adjusting(false, false));
            }
            script
        }

        /// Merge two scripts into one timeline
        pub fn merge(mut self, other: PaddleScript) -> Self {
            self.events.extend(other.events);
            self.events.sort_by_key(|e| e.at_ms);
            self.description = format!("{} + {}", self.description, other.description);
            self
        }

        /// Time of the last event
        pub fn end_ms(&self) -> u64 {
            self.events.last().map(|e| e.at_ms).unwrap_or(0)
        }

        /// Queue the events on a mock
        pub fn load(&self, hal: &mut MockHal<'_>) {
            for event in &self.events {
                hal.at(event.at_ms, event.levels);
            }
        }
    }
}

pub mod output_capture {
    //! Key-line analysis

    use crate::hal::mock::KeyTransition;
    use crate::types::Element;

    /// One keyed mark
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Mark {
        pub element: Element,
        pub start_ms: u64,
        pub length_ms: u64,
    }

    /// Marks recovered from a key log; anything at least two dits long is a Dah
    pub fn marks(log: &[KeyTransition], dit_ms: u64) -> Vec<Mark> {
        log.windows(2)
            .filter(|pair| pair[0].down && !pair[1].down)
            .map(|pair| {
                let length_ms = pair[1].at_ms - pair[0].at_ms;
                let element = if length_ms >= 2 * dit_ms { Element::Dah } else { Element::Dit };
                Mark {
                    element,
                    start_ms: pair[0].at_ms,
                    length_ms,
                }
            })
            .collect()
    }

    /// `.`/`-` rendering of marks
    pub fn to_morse_string(marks: &[Mark]) -> String {
        marks.iter().map(|m| m.element.symbol()).collect()
    }

    /// Timing of a run of marks against the nominal dit length
    #[derive(Debug)]
    pub struct TimingAnalysis {
        pub expected_dit_ms: u64,
        pub dit_lengths: Vec<u64>,
        pub dah_lengths: Vec<u64>,
        /// Key-up time between consecutive marks
        pub gaps: Vec<u64>,
    }

    impl TimingAnalysis {
        pub fn new(marks: &[Mark], expected_dit_ms: u64) -> Self {
            let mut dit_lengths = Vec::new();
            let mut dah_lengths = Vec::new();
            for mark in marks {
                match mark.element {
                    Element::Dit => dit_lengths.push(mark.length_ms),
                    Element::Dah => dah_lengths.push(mark.length_ms),
                }
            }
            let gaps = marks
                .windows(2)
                .map(|pair| pair[1].start_ms - (pair[0].start_ms + pair[0].length_ms))
                .collect();

            Self {
                expected_dit_ms,
                dit_lengths,
                dah_lengths,
                gaps,
            }
        }

        /// Every dit is exactly one unit and every dah exactly three
        pub fn marks_exact(&self) -> bool {
            self.dit_lengths.iter().all(|&l| l == self.expected_dit_ms)
                && self.dah_lengths.iter().all(|&l| l == 3 * self.expected_dit_ms)
        }

        /// Smallest key-up time between marks, if there were at least two
        pub fn min_gap(&self) -> Option<u64> {
            self.gaps.iter().copied().min()
        }
    }
}

pub mod scenario {
    //! Drive a full keyer from a paddle script

    use super::output_capture::{marks, Mark};
    use super::paddle_simulator::PaddleScript;
    use crate::controller::SharedKeyerState;
    use crate::hal::mock::MockHal;
    use crate::hal::Duration;
    use crate::keyer::Keyer;
    use crate::types::KeyerConfig;

    /// Everything a scenario produced
    #[derive(Debug)]
    pub struct SimulationResult {
        pub marks: Vec<Mark>,
        pub decoded: String,
        pub final_wpm: u32,
        pub dit_ms: u64,
    }

    /// Run `script` against a keyer starting at `wpm` until `until_ms`.
    /// Idle cycles advance the virtual clock by `idle_step_ms`.
    pub fn simulate(script: &PaddleScript, wpm: u32, until_ms: u64, idle_step_ms: u64) -> SimulationResult {
        let shared = SharedKeyerState::new();
        let mut hal = MockHal::with_shared(&shared);
        script.load(&mut hal);

        let config = KeyerConfig {
            initial_wpm: wpm,
            idle_poll: Duration::from_millis(idle_step_ms),
            ..KeyerConfig::default()
        };
        let mut keyer = Keyer::new(hal, &shared, config);

        while keyer.hal().now_ms() < until_ms {
            let cycle = keyer.run_cycle().expect("mock hardware does not fail");
            if cycle.is_idle() {
                keyer.hal_mut().advance(Duration::from_millis(idle_step_ms));
            }
        }

        let dit_ms = keyer.snapshot().timing.dit.as_millis();
        SimulationResult {
            marks: marks(keyer.hal().key_log(), dit_ms),
            decoded: keyer.hal().decoded().to_string(),
            final_wpm: keyer.snapshot().timing.speed_wpm,
            dit_ms,
        }
    }
}
