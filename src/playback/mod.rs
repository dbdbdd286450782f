//! # Playback Module
//!
//! Turn parsed charts into timed chord events for audio playback and MIDI
//! export.
//!
//! ## Purpose
//! This module flattens a [`Document`](crate::ast::Document) into a list of
//! chord events that can be used for:
//! 1. **MIDI export** - see the `midi` module
//! 2. **Live playback** - a [`Player`] triggers notes as the caller's clock advances
//! 3. **Highlighting** - [`event_at`] finds the chord under a playhead position
//!
//! ## Sub-modules
//! - `types` - ChordEvent and Timeline definitions
//! - `engine` - Event extraction and lookup
//! - `player` - Frame-driven transport
//!
//! ## Example
//! ```rust
//! use chartmark::playback::extract_timeline;
//! use chartmark::parse;
//!
//! let doc = parse("Verse 1\n|C|G|%|\n|").unwrap().unwrap();
//! let timeline = extract_timeline(&doc);
//!
//! assert_eq!(timeline.events.len(), 2);
//! assert_eq!(timeline.events[1].start_beat, 4.0);
//! // The repeated bar and the empty bar still take up time
//! assert_eq!(timeline.total_beats, 16.0);
//! ```
//!
//! ## Related Modules
//! - `chord` - Resolves chord symbols to pitches
//! - `ast` - Document and bar types
//! - `midi` - Encodes events as a Standard MIDI File

mod engine;
mod player;
mod types;

#[cfg(test)]
mod tests;

pub use engine::{event_at, extract_events, extract_timeline};
pub use player::{beat_interval, NoteSink, Player, CHORD_VELOCITY, DEFAULT_TEMPO};
pub use types::{ChordEvent, Timeline};
