//! Timed event extraction
//!
//! Walks the bars of a document with a running beat cursor and emits one
//! [`ChordEvent`] per resolvable chord token.
//!
//! ## Timing
//! - A bar of `B` beats holding `k` tokens gives each token a slot of `B / k`
//!   beats (one beat per chord in a four-chord 4/4 bar).
//! - Duration dots shorten the sounding part: `slot / (dots + 1)`. The cursor
//!   still advances by the full slot so later chords stay on the grid.
//! - Empty and repeated bars advance the cursor by `B` and emit nothing.
//! - `%`, empty symbols and unresolvable symbols advance their slot silently.

use super::types::{ChordEvent, Timeline};
use crate::ast::{Bar, Document};
use crate::chord::Chord;

/// Build the timeline of a document
pub fn extract_timeline(doc: &Document) -> Timeline {
    let chart = doc.sections();
    let mut events = Vec::new();
    let mut cursor = 0.0;

    for bar in chart.bars() {
        cursor = extract_bar(bar, cursor, &mut events);
    }

    Timeline {
        events,
        total_beats: cursor,
    }
}

/// Timed chord events of a document, in order
///
/// ```
/// use chartmark::{extract_events, parse};
///
/// let doc = parse("|C G|Am|").unwrap().unwrap();
/// let events = extract_events(&doc);
///
/// assert_eq!(events.len(), 3);
/// assert_eq!(events[0].chord_symbol, "C");
/// assert_eq!((events[0].start_beat, events[0].duration_beats), (0.0, 2.0));
/// assert_eq!((events[2].start_beat, events[2].duration_beats), (4.0, 4.0));
/// ```
pub fn extract_events(doc: &Document) -> Vec<ChordEvent> {
    extract_timeline(doc).events
}

/// Emit the events of one bar starting at `cursor`, returning the cursor
/// after the bar
fn extract_bar(bar: &Bar, cursor: f64, events: &mut Vec<ChordEvent>) -> f64 {
    let beats = bar.beats as f64;
    if bar.repeated || bar.chords.is_empty() {
        return cursor + beats;
    }

    let slot = beats / bar.chords.len() as f64;
    let mut cursor = cursor;

    for token in &bar.chords {
        let start = cursor;
        cursor += slot;

        if token.symbol.is_empty() || token.is_rest() {
            continue;
        }

        let chord = match Chord::parse(&token.symbol) {
            Some(chord) => chord,
            None => {
                log::debug!("Unresolvable chord '{}' at beat {}", token.symbol, start);
                continue;
            }
        };
        if chord.degraded {
            log::warn!(
                "Unknown chord quality '{}' in '{}', playing {:?} triad",
                chord.suffix,
                token.symbol,
                chord.quality
            );
        }

        let notes = chord.pitches();
        if notes.is_empty() {
            continue;
        }

        events.push(ChordEvent {
            chord_symbol: token.symbol.clone(),
            notes,
            start_beat: start,
            duration_beats: slot * token.sounding_fraction(),
        });
    }

    cursor
}

/// The event sounding at `beat`, if any.
///
/// `events` must be sorted by start beat, as extracted. Falls between events
/// (rests, dotted gaps) return `None`.
///
/// ```
/// use chartmark::{event_at, extract_events, parse};
///
/// let doc = parse("|C. G|").unwrap().unwrap();
/// let events = extract_events(&doc);
///
/// assert_eq!(event_at(&events, 0.5).map(|e| e.chord_symbol.as_str()), Some("C"));
/// assert!(event_at(&events, 1.5).is_none());
/// assert_eq!(event_at(&events, 3.0).map(|e| e.chord_symbol.as_str()), Some("G"));
/// assert!(event_at(&events, 4.0).is_none());
/// ```
pub fn event_at(events: &[ChordEvent], beat: f64) -> Option<&ChordEvent> {
    let index = events.partition_point(|event| event.start_beat <= beat);
    let event = events.get(index.checked_sub(1)?)?;
    if event.contains(beat) {
        Some(event)
    } else {
        None
    }
}
