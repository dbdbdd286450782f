//! Playback data type definitions
//!
//! This module defines the timed chord events produced from a document.

use crate::pitch::Pitch;
use serde::Serialize;

/// One resolved chord occurrence
///
/// # Fields
/// - `chord_symbol`: the symbol as written in the chart (without duration dots)
/// - `notes`: MIDI pitches, lowest first, never empty
/// - `start_beat`: beats from the start of the chart
/// - `duration_beats`: sounding length in beats
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordEvent {
    pub chord_symbol: String,
    pub notes: Vec<Pitch>,
    pub start_beat: f64,
    pub duration_beats: f64,
}

impl ChordEvent {
    pub fn end_beat(&self) -> f64 {
        self.start_beat + self.duration_beats
    }

    /// Whether `beat` falls inside the sounding part of the event
    pub fn contains(&self, beat: f64) -> bool {
        beat >= self.start_beat && beat < self.end_beat()
    }
}

/// The events of a whole chart plus its total length
///
/// `total_beats` covers every bar, so it extends past the last event when the
/// chart ends in silence.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub events: Vec<ChordEvent>,
    pub total_beats: f64,
}

impl Timeline {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
