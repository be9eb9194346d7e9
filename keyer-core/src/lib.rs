#![cfg_attr(not(any(feature = "std", test)), no_std)]

//! # Keyer Core
//!
//! Iambic-A paddle keyer with a timing-threshold Morse decoder and a
//! text-to-Morse encoder, for embedded systems.
//!
//! Paddle edges are handled in interrupt context by
//! [`SharedKeyerState::on_paddle_edge`]; a single loop ([`Keyer`]) plays
//! elements, decodes them and plays queued text.
//!
//! ```ignore
//! static SHARED: SharedKeyerState = SharedKeyerState::new();
//!
//! fn on_edge(levels: PaddleLevels) {
//!     SHARED.on_paddle_edge(levels);
//! }
//!
//! let mut keyer = Keyer::new(board, &SHARED, default_config());
//! keyer.attach(on_edge)?;
//! keyer.run()?;
//! ```

#[macro_use]
mod fmt;

pub mod board;
pub mod controller;
pub mod decoder;
pub mod encoder;
pub mod fsm;
pub mod hal;
pub mod keyer;
pub mod morse;
pub mod player;
pub mod timing;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use controller::{KeyerSnapshot, SharedKeyerState};
pub use decoder::{DecoderProgress, MorseDecoder};
pub use encoder::play_text;
pub use fsm::next_state;
pub use hal::{Duration, HalError, Instant, KeyerHal};
pub use keyer::{Cycle, Keyer};
pub use player::ElementPlayer;
pub use timing::TimingProfile;
pub use types::*;

/// Keyer library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Power-on configuration: 15 WPM, 550 Hz sidetone
pub fn default_config() -> KeyerConfig {
    KeyerConfig::default()
}
