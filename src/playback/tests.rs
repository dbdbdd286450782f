use super::*;
use crate::ast::Document;
use crate::parse;
use crate::parser::{parse_as, Dialect};
use crate::pitch::Pitch;

fn doc(source: &str) -> Document {
    parse(source).unwrap().unwrap()
}

/// Read as a bar chart even when tokens are not chord-like
fn chart(source: &str) -> Document {
    parse_as(source, Dialect::Chart).unwrap().unwrap()
}

fn symbols(events: &[ChordEvent]) -> Vec<&str> {
    events.iter().map(|e| e.chord_symbol.as_str()).collect()
}

fn timing(events: &[ChordEvent]) -> Vec<(f64, f64)> {
    events.iter().map(|e| (e.start_beat, e.duration_beats)).collect()
}

#[test]
fn test_one_chord_per_beat() {
    let events = extract_events(&doc("|C G Am F|"));
    assert_eq!(symbols(&events), vec!["C", "G", "Am", "F"]);
    assert_eq!(timing(&events), vec![(0.0, 1.0), (1.0, 1.0), (2.0, 1.0), (3.0, 1.0)]);
}

#[test]
fn test_whole_bar_chords() {
    let events = extract_events(&doc("|C|G|"));
    assert_eq!(timing(&events), vec![(0.0, 4.0), (4.0, 4.0)]);
    assert_eq!(events[0].notes, vec![Pitch(48), Pitch(52), Pitch(55)]);
}

#[test]
fn test_duration_dots_leave_trailing_silence() {
    let events = extract_events(&doc("|C. G.. Am F|"));
    assert_eq!(
        timing(&events),
        vec![(0.0, 0.5), (1.0, 1.0 / 3.0), (2.0, 1.0), (3.0, 1.0)]
    );
}

#[test]
fn test_rests_and_unresolvable_chords_keep_the_grid() {
    let events = extract_events(&chart("|C % H7 G|"));
    assert_eq!(symbols(&events), vec!["C", "G"]);
    assert_eq!(events[1].start_beat, 3.0);

    let events = extract_events(&doc("|N.C. C|"));
    assert_eq!(symbols(&events), vec!["C"]);
    assert_eq!(events[0].start_beat, 2.0);
}

#[test]
fn test_repeated_and_empty_bars_advance_a_full_bar() {
    let timeline = extract_timeline(&doc("|C|%|\n| |\n|G|"));
    assert_eq!(symbols(&timeline.events), vec!["C", "G"]);
    assert_eq!(timeline.events[1].start_beat, 16.0);
    assert_eq!(timeline.total_beats, 20.0);
}

#[test]
fn test_time_signature_changes_bar_length() {
    let source = "key: G\n|G|D|\n3/4\n|Em|C|\nla la la";
    let timeline = extract_timeline(&doc(source));
    assert_eq!(
        timing(&timeline.events),
        vec![(0.0, 4.0), (4.0, 4.0), (8.0, 3.0), (11.0, 3.0)]
    );
    assert_eq!(timeline.total_beats, 14.0);
}

#[test]
fn test_metadata_time_signature() {
    let source = "---\ntime-signature: 6/8\n---\n|C|G|";
    let timeline = extract_timeline(&doc(source));
    assert_eq!(timing(&timeline.events), vec![(0.0, 6.0), (6.0, 6.0)]);
}

#[test]
fn test_repeats_and_multipliers_are_expanded() {
    let events = extract_events(&doc("|C|G| x3"));
    assert_eq!(symbols(&events), vec!["C", "G", "C", "G", "C", "G"]);

    let events = extract_events(&doc("#c x2\n|F|\nsing"));
    assert_eq!(symbols(&events), vec!["F", "F"]);
    assert_eq!(events[1].start_beat, 4.0);
}

#[test]
fn test_events_are_monotone_and_end_at_total_beats() {
    let source = "Intro\n|C G|Am|\nVerse 1\n|F . C|G Am F C|\n| |\n|Dm|G7|C|C|";
    let timeline = extract_timeline(&doc(source));
    let events = &timeline.events;
    assert!(events.windows(2).all(|w| w[0].start_beat <= w[1].start_beat));

    let bar_beats: f64 = doc(source).sections().bars().map(|b| b.beats as f64).sum();
    assert_eq!(timeline.total_beats, bar_beats);
    let last = events.last().unwrap();
    assert_eq!(last.end_beat(), bar_beats);
}

#[test]
fn test_event_at() {
    let events = extract_events(&doc("|C. G|%|Am|"));
    assert_eq!(event_at(&events, 0.0).map(|e| e.chord_symbol.as_str()), Some("C"));
    assert!(event_at(&events, 1.0).is_none());
    assert_eq!(event_at(&events, 2.0).map(|e| e.chord_symbol.as_str()), Some("G"));
    assert!(event_at(&events, 5.0).is_none());
    assert_eq!(event_at(&events, 11.9).map(|e| e.chord_symbol.as_str()), Some("Am"));
    assert!(event_at(&events, 12.0).is_none());
    assert!(event_at(&events, -1.0).is_none());
    assert!(event_at(&[], 0.0).is_none());
}

#[test]
fn test_degraded_quality_still_plays() {
    let events = extract_events(&chart("|Cxyz|"));
    assert_eq!(events[0].notes, vec![Pitch(48), Pitch(52), Pitch(55)]);
}

#[test]
fn test_event_serialization() {
    let events = extract_events(&doc("|C|"));
    let json = serde_json::to_string(&events[0]).unwrap();
    assert_eq!(
        json,
        r#"{"chordSymbol":"C","notes":[48,52,55],"startBeat":0.0,"durationBeats":4.0}"#
    );
}

#[derive(Default)]
struct RecordingSink {
    on: Vec<u8>,
    off: Vec<u8>,
}

impl RecordingSink {
    fn sounding(&self) -> usize {
        self.on.len() - self.off.len()
    }
}

impl NoteSink for RecordingSink {
    fn note_on(&mut self, pitch: Pitch, velocity: u8) {
        assert_eq!(velocity, CHORD_VELOCITY);
        self.on.push(pitch.midi());
    }

    fn note_off(&mut self, pitch: Pitch) {
        self.off.push(pitch.midi());
    }
}

#[test]
fn test_player_triggers_and_releases() {
    // 60 BPM: one beat per second
    let mut player = Player::new(extract_timeline(&doc("|C G|")), 60);
    let mut sink = RecordingSink::default();

    player.frame(0.5, &mut sink);
    assert!(sink.on.is_empty(), "a stopped player makes no sound");

    player.play();
    player.frame(0.5, &mut sink);
    assert_eq!(sink.on, vec![48, 52, 55]);
    assert_eq!(player.current_event().map(|e| e.chord_symbol.as_str()), Some("C"));

    player.frame(2.0, &mut sink);
    assert_eq!(sink.off, vec![48, 52, 55]);
    assert_eq!(sink.on.len(), 6);
    assert_eq!(player.current_event().map(|e| e.chord_symbol.as_str()), Some("G"));

    player.frame(2.0, &mut sink);
    assert!(!player.is_playing());
    assert_eq!(sink.sounding(), 0);
}

#[test]
fn test_player_stop_releases_and_rewinds() {
    let mut player = Player::new(extract_timeline(&doc("|C|G|")), 120);
    let mut sink = RecordingSink::default();

    player.play();
    player.frame(0.25, &mut sink);
    assert_eq!(sink.sounding(), 3);

    player.stop(&mut sink);
    assert_eq!(sink.sounding(), 0);
    assert_eq!(player.position(), 0.0);
    assert!(!player.is_playing());

    // Playing again starts from the first chord
    player.play();
    player.frame(0.25, &mut sink);
    assert_eq!(&sink.on[3..], &[48, 52, 55]);
}

#[test]
fn test_player_play_from() {
    let mut player = Player::new(extract_timeline(&doc("|C|G|Am|")), 60);
    let mut sink = RecordingSink::default();

    player.play_from(5.0, &mut sink);
    player.frame(0.1, &mut sink);
    // G is already sounding at beat 5 and is struck right away
    assert_eq!(sink.on, vec![55, 59, 62]);
    assert!(player.position() > 5.0);
}

#[test]
fn test_short_events_inside_one_frame() {
    let mut player = Player::new(extract_timeline(&doc("|C G Am F|")), 60);
    let mut sink = RecordingSink::default();

    player.play();
    player.frame(10.0, &mut sink);
    assert_eq!(sink.on.len(), sink.off.len());
    assert_eq!(sink.on.len(), 12);
    assert!(!player.is_playing());
}

#[test]
fn test_beat_interval() {
    assert_eq!(beat_interval(2.0, 120), 1.0);
    assert_eq!(beat_interval(1.0, 60), 1.0);
}

#[test]
fn test_player_tempo_change() {
    let mut player = Player::new(extract_timeline(&doc("|C|G|")), 60);
    let mut sink = RecordingSink::default();

    player.set_tempo(240);
    assert_eq!(player.tempo(), 240);
    player.play();
    player.frame(0.5, &mut sink);
    assert_eq!(player.position(), 2.0);
    player.frame(0.6, &mut sink);
    assert_eq!(sink.off, vec![48, 52, 55]);
    assert_eq!(&sink.on[3..], &[55, 59, 62]);

    player.set_tempo(0);
    assert_eq!(player.tempo(), 1);
}
