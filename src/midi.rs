//! # MIDI Export
//!
//! This module writes timed chord events as a Standard MIDI File.
//!
//! ## Layout
//! - Format 0 (one track), 480 ticks per beat
//! - Tempo and 4/4 time signature meta events at tick 0
//! - Every chord event becomes simultaneous note-on/note-off pairs at
//!   velocity 90
//! - Silent stretches (rests, empty bars, dotted gaps) are filled with a
//!   single velocity-1 note so the track keeps its full length
//! - End of track at the end of the timeline
//!
//! ## Example
//! ```rust
//! use chartmark::midi::{encode_midi, TICKS_PER_BEAT};
//! use chartmark::{extract_events, parse};
//!
//! let doc = parse("|C|G|").unwrap().unwrap();
//! let bytes = encode_midi(&extract_events(&doc), 120).unwrap();
//!
//! let smf = midly::Smf::parse(&bytes).unwrap();
//! let ticks: u32 = smf.tracks[0].iter().map(|e| e.delta.as_int()).sum();
//! assert_eq!(ticks, 8 * TICKS_PER_BEAT as u32);
//! ```
//!
//! ## Related Modules
//! - `playback` - Produces the events
//! - `api` - `export_midi` runs the whole text-to-bytes pipeline

use crate::error::ChartError;
use crate::playback::{ChordEvent, Timeline, CHORD_VELOCITY};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};

pub const TICKS_PER_BEAT: u16 = 480;

/// Velocity of the placeholder notes spanning silence
pub const REST_VELOCITY: u8 = 1;

/// Pitch of the placeholder notes (middle C)
const REST_NOTE: u8 = 60;

/// Largest value of the 24-bit tempo field
const MAX_MICROSECONDS_PER_BEAT: u32 = 0xFF_FFFF;

pub const MIDI_CONTENT_TYPE: &str = "audio/midi";

/// A `.mid` file name for a chart title
///
/// ```
/// use chartmark::midi::midi_filename;
///
/// assert_eq!(midi_filename(Some("Amazing Grace!")), "amazing-grace.mid");
/// assert_eq!(midi_filename(None), "chart.mid");
/// ```
pub fn midi_filename(title: Option<&str>) -> String {
    let slug = title
        .unwrap_or_default()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<String>>()
        .join("-");
    if slug.is_empty() {
        "chart.mid".to_string()
    } else {
        format!("{}.mid", slug)
    }
}

/// Encode chord events. The file ends with the last event.
pub fn encode_midi(events: &[ChordEvent], tempo: u16) -> Result<Vec<u8>, ChartError> {
    let end = events.iter().map(ChordEvent::end_beat).fold(0.0, f64::max);
    encode(events, end, tempo)
}

/// Encode a timeline, keeping any silence after the last event
pub fn encode_timeline(timeline: &Timeline, tempo: u16) -> Result<Vec<u8>, ChartError> {
    encode(&timeline.events, timeline.total_beats, tempo)
}

fn encode(events: &[ChordEvent], end_beat: f64, tempo: u16) -> Result<Vec<u8>, ChartError> {
    if tempo == 0 || 60_000_000 / tempo as u32 > MAX_MICROSECONDS_PER_BEAT {
        return Err(ChartError::InvalidTempo(tempo));
    }
    if events.iter().all(|event| event.notes.is_empty()) {
        return Err(ChartError::NoChords);
    }

    let track = build_track(events, end_beat, tempo);

    let header = Header {
        format: Format::SingleTrack,
        timing: Timing::Metrical(TICKS_PER_BEAT.into()),
    };
    let smf = Smf {
        header,
        tracks: vec![track],
    };

    let mut out = Vec::new();
    smf.write(&mut out)
        .map_err(|e| ChartError::MidiError(format!("Failed to write MIDI: {}", e)))?;
    Ok(out)
}

fn beats_to_ticks(beats: f64) -> u32 {
    (beats * TICKS_PER_BEAT as f64).round().max(0.0) as u32
}

fn build_track<'a>(events: &[ChordEvent], end_beat: f64, tempo: u16) -> Track<'a> {
    let microseconds_per_beat = 60_000_000 / tempo as u32;
    let mut track = vec![
        TrackEvent {
            delta: 0.into(),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(microseconds_per_beat.into())),
        },
        TrackEvent {
            delta: 0.into(),
            kind: TrackEventKind::Meta(MetaMessage::TimeSignature(4, 2, 24, 8)),
        },
    ];

    // Absolute ticks for now, converted to deltas once sorted
    let mut cursor = 0u32;
    for event in events.iter().filter(|event| !event.notes.is_empty()) {
        let start = beats_to_ticks(event.start_beat);
        let end = beats_to_ticks(event.end_beat()).max(start + 1);

        if start > cursor {
            push_note(&mut track, REST_NOTE, REST_VELOCITY, cursor, start);
        }
        for pitch in &event.notes {
            push_note(&mut track, pitch.midi(), CHORD_VELOCITY, start, end);
        }
        cursor = cursor.max(end);
    }

    let end = beats_to_ticks(end_beat).max(cursor);
    if end > cursor {
        push_note(&mut track, REST_NOTE, REST_VELOCITY, cursor, end);
    }

    // Note-offs sort before note-ons on the same tick
    track.sort_by_key(|e| (e.delta.as_int(), event_order(&e.kind)));
    convert_to_delta_times(&mut track);

    let last = track_length(&track);
    track.push(TrackEvent {
        delta: end.saturating_sub(last).into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    track
}

fn push_note(track: &mut Track, key: u8, velocity: u8, start: u32, end: u32) {
    track.push(TrackEvent {
        delta: start.into(),
        kind: TrackEventKind::Midi {
            channel: 0.into(),
            message: MidiMessage::NoteOn {
                key: key.into(),
                vel: velocity.into(),
            },
        },
    });
    track.push(TrackEvent {
        delta: end.into(),
        kind: TrackEventKind::Midi {
            channel: 0.into(),
            message: MidiMessage::NoteOff {
                key: key.into(),
                vel: 0.into(),
            },
        },
    });
}

fn event_order(kind: &TrackEventKind) -> u8 {
    match kind {
        TrackEventKind::Meta(_) => 0,
        TrackEventKind::Midi {
            message: MidiMessage::NoteOff { .. },
            ..
        } => 1,
        _ => 2,
    }
}

/// Convert absolute tick times to delta times (time since previous event)
fn convert_to_delta_times(events: &mut [TrackEvent]) {
    let mut prev_tick = 0u32;
    for event in events.iter_mut() {
        let current_tick = event.delta.as_int();
        let delta = current_tick.saturating_sub(prev_tick);
        event.delta = delta.into();
        prev_tick = current_tick;
    }
}

/// Total length of a track in ticks
fn track_length(track: &[TrackEvent]) -> u32 {
    track.iter().map(|e| e.delta.as_int()).sum()
}
