//! # Error Types
//!
//! This module defines the error type for the chartmark pipeline.
//!
//! Most of the pipeline is lenient: malformed chord tokens, unknown chord
//! qualities and empty input all degrade to silence or empty output instead of
//! failing. Errors are reserved for the places where a caller asked for a
//! strict result:
//! - `MetadataError` - the YAML front matter could not be decoded
//! - `InvalidChord` - strict chord parsing (`"X".parse::<Chord>()`)
//! - `NoSections` / `NoChords` - MIDI export preconditions
//! - `InvalidTempo` / `MidiError` - MIDI encoding failures
//!
//! ## Usage
//! ```rust
//! use chartmark::{export_midi, ChartError};
//!
//! match export_midi("Verse 1\n|N.C.|", 120) {
//!     Ok(bytes) => println!("{} bytes", bytes.len()),
//!     Err(ChartError::NoChords) => eprintln!("nothing to play"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    /// Invalid front matter.
    ///
    /// # Example
    /// ```
    /// # use chartmark::ChartError;
    /// let err = ChartError::MetadataError("time-signature must be in format N/D".to_string());
    /// assert_eq!(err.to_string(), "Invalid metadata: time-signature must be in format N/D");
    /// ```
    #[error("Invalid metadata: {0}")]
    MetadataError(String),

    /// A chord symbol that could not be parsed strictly.
    #[error("Invalid chord symbol: '{0}'")]
    InvalidChord(String),

    /// The chart parsed to zero sections.
    ///
    /// # Example
    /// ```
    /// # use chartmark::ChartError;
    /// assert_eq!(
    ///     ChartError::NoSections.to_string(),
    ///     "No sections found: the chart does not contain any bars"
    /// );
    /// ```
    #[error("No sections found: the chart does not contain any bars")]
    NoSections,

    /// Not a single chord in the chart could be resolved to notes.
    #[error("No chords found: none of the chord symbols could be resolved to notes")]
    NoChords,

    #[error("Invalid tempo: {0} BPM")]
    InvalidTempo(u16),

    #[error("MIDI error: {0}")]
    MidiError(String),
}
