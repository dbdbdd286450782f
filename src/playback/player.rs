//! Live playback transport
//!
//! A [`Player`] walks an immutable [`Timeline`] in step with the caller's own
//! clock: every call to [`Player::frame`] advances the playhead by the wall
//! time that passed and triggers the chord notes crossed on the way. Nothing
//! here owns a thread or a timer.

use super::engine::event_at;
use super::types::{ChordEvent, Timeline};
use crate::pitch::Pitch;

pub const DEFAULT_TEMPO: u16 = 120;

/// Velocity of played chords
pub const CHORD_VELOCITY: u8 = 90;

/// Receiver of the notes a player triggers
pub trait NoteSink {
    fn note_on(&mut self, pitch: Pitch, velocity: u8);
    fn note_off(&mut self, pitch: Pitch);
}

/// Handles timeline playback.
pub struct Player {
    timeline: Timeline,
    playing: bool,
    beat: f64,
    tempo: u16,
    /// Index of the first event not yet triggered
    next_event: usize,
    /// Indices of events whose notes are on
    sounding: Vec<usize>,
}

impl Player {
    pub fn new(timeline: Timeline, tempo: u16) -> Self {
        Self {
            timeline,
            playing: false,
            beat: 0.0,
            tempo: tempo.max(1),
            next_event: 0,
            sounding: Vec::new(),
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Playhead position in beats
    pub fn position(&self) -> f64 {
        self.beat
    }

    pub fn tempo(&self) -> u16 {
        self.tempo
    }

    pub fn set_tempo(&mut self, tempo: u16) {
        self.tempo = tempo.max(1);
    }

    /// The chord under the playhead
    pub fn current_event(&self) -> Option<&ChordEvent> {
        event_at(&self.timeline.events, self.beat)
    }

    /// Stop playback: drop pending triggers, rewind to the start and release
    /// every sounding note.
    pub fn stop(&mut self, sink: &mut impl NoteSink) {
        self.playing = false;
        self.release_all(sink);
        self.next_event = 0;
        self.beat = 0.0;
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Start playing at `beat`. A chord already sounding at `beat` is
    /// triggered on the next frame.
    pub fn play_from(&mut self, beat: f64, sink: &mut impl NoteSink) {
        self.release_all(sink);
        self.beat = beat.max(0.0);
        self.next_event = self
            .timeline
            .events
            .partition_point(|event| event.end_beat() <= self.beat);
        self.play();
    }

    /// Handle a frame of length `dt` seconds.
    pub fn frame(&mut self, dt: f64, sink: &mut impl NoteSink) {
        if !self.playing {
            return;
        }

        self.beat += interval_beats(dt, self.tempo);
        let beat = self.beat;

        // Releases first, so a repeated chord is re-struck cleanly
        let events = &self.timeline.events;
        self.sounding.retain(|&i| {
            let event = &events[i];
            if event.end_beat() <= beat {
                release(event, sink);
                false
            } else {
                true
            }
        });

        while let Some(event) = events.get(self.next_event) {
            if event.start_beat >= beat {
                break;
            }
            for pitch in &event.notes {
                sink.note_on(*pitch, CHORD_VELOCITY);
            }
            if event.end_beat() <= beat {
                release(event, sink);
            } else {
                self.sounding.push(self.next_event);
            }
            self.next_event += 1;
        }

        if beat >= self.timeline.total_beats && self.next_event >= events.len() {
            self.playing = false;
            self.release_all(sink);
        }
    }

    fn release_all(&mut self, sink: &mut impl NoteSink) {
        for i in self.sounding.drain(..) {
            release(&self.timeline.events[i], sink);
        }
    }
}

fn release(event: &ChordEvent, sink: &mut impl NoteSink) {
    for pitch in &event.notes {
        sink.note_off(*pitch);
    }
}

/// Convert a time interval to beat-space.
fn interval_beats(dt: f64, tempo: u16) -> f64 {
    dt * tempo as f64 / 60.0
}

/// Convert a beat interval to a wall clock interval.
pub fn beat_interval(beats: f64, tempo: u16) -> f64 {
    beats * 60.0 / tempo.max(1) as f64
}
