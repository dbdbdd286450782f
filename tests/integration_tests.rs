//! Integration tests for chartmark
//!
//! Tests the full pipeline from chart text to views, serialized text, events
//! and MIDI bytes.

use chartmark::{
    event_at, export_midi, extract_events, extract_timeline, parse, parse_chart, render,
    render_source, resolve, serialize, transpose_document, validate, ChartError, Pitch, ViewMode,
};

const HYMN: &str = r#"---
title: Amazing Grace
key: G
tempo: 80
time-signature: 3/4
---
#v
G             C             G
Amazing grace how sweet the sound
G              D
That saved a wretch like me

#c x2
C       G
Sing it out

#v
G             C        G
I once was lost but now am found

#c
"#;

#[test]
fn test_resolver_never_empty_for_valid_roots() {
    for root in ["C", "C#", "Db", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B"] {
        for quality in ["", "m", "7", "maj7", "m7", "sus4", "dim", "aug", "5", "xyz"] {
            let symbol = format!("{}{}", root, quality);
            assert!(!resolve(&symbol).is_empty(), "{} resolved to nothing", symbol);
        }
    }
}

#[test]
fn test_slash_bass_is_lowest() {
    let notes = resolve("C/G");
    let lowest = notes.iter().min().unwrap();
    assert_eq!(lowest.pitch_class(), 7);
    assert_eq!(notes.iter().filter(|p| p.pitch_class() == 7).count(), 1);
}

#[test]
fn test_chart_parser_examples() {
    assert_eq!(parse_chart("").total_bars(), 0);
    assert_eq!(parse_chart("|C|G| x3").total_bars(), 6);

    let chart = parse_chart("A:\n|Am.| |C D| |Am.| x 2");
    assert_eq!(chart.labels(), vec!["A"]);
    assert_eq!(chart.sections[0].bars.len(), 6);

    let chart = parse_chart("| |");
    assert_eq!(chart.total_bars(), 2);
    assert!(chart.bars().all(|bar| bar.is_empty()));
}

#[test]
fn test_hymn_structure() {
    let doc = parse(HYMN).unwrap().unwrap();
    assert_eq!(doc.metadata.title.as_deref(), Some("Amazing Grace"));
    assert_eq!(doc.metadata.tempo, Some(80));

    let chart = doc.sections();
    assert_eq!(chart.labels(), vec!["Verse 1", "Chorus", "Verse 2", "Chorus"]);
    // The closing chorus copies the doubled chorus
    assert_eq!(chart.sections[3].bars, chart.sections[1].bars);
    assert!(chart.bars().all(|bar| bar.beats == 3));
    assert!(validate(&doc).is_ok());
}

#[test]
fn test_hymn_views() {
    let doc = parse(HYMN).unwrap();

    let full = render(doc.as_ref(), ViewMode::Full);
    assert!(full.contains("<h2 class=\"cm-title\">Amazing Grace</h2>"));
    assert!(full.contains("<span class=\"cm-chord\">C</span><span class=\"cm-lyric\">how sweet the </span>"));

    let one_line = render(doc.as_ref(), ViewMode::OneLine);
    assert!(one_line.contains("[G]Amazing grace [C]how sweet the [G]sound"));
    assert!(one_line.contains("[CHORUS X2]"));

    let lyrics = render(doc.as_ref(), ViewMode::LyricsOnly);
    assert!(lyrics.contains("That saved a wretch like me"));
    assert!(!lyrics.contains("cm-chord"));

    let chords = render(doc.as_ref(), ViewMode::ChordsOnly);
    assert!(!chords.contains("wretch"));
    assert_eq!(chords.matches("cm-chord-line").count(), 4);
}

#[test]
fn test_round_trip_is_idempotent() {
    for source in [HYMN, "Intro: |C G|Am|\nVerse 1\n|F|G|\nx2\n| |\n|C..|%|", "|C|G| x3"] {
        let first = parse(source).unwrap().unwrap();
        let text = serialize(&first);
        let second = parse(&text).unwrap().unwrap();

        let (a, b) = (first.sections(), second.sections());
        assert_eq!(a.labels(), b.labels(), "{}", text);
        for (x, y) in a.sections.iter().zip(&b.sections) {
            assert_eq!(x.bars.len(), y.bars.len(), "{}", text);
            let xs: Vec<Vec<&str>> = x.bars.iter().map(|bar| bar.symbols()).collect();
            let ys: Vec<Vec<&str>> = y.bars.iter().map(|bar| bar.symbols()).collect();
            assert_eq!(xs, ys);
        }

        // Serializing the reparsed text changes nothing further
        assert_eq!(serialize(&second), text);
    }
}

#[test]
fn test_events_cover_every_bar() {
    let doc = parse("Intro\n|C G Am F|\nVerse 1\n|C|G|\n|Am|F|").unwrap().unwrap();
    let timeline = extract_timeline(&doc);
    let events = &timeline.events;

    assert!(events.windows(2).all(|w| w[0].start_beat <= w[1].start_beat));
    assert_eq!(events[0].duration_beats, 1.0);
    let bar_beats: u32 = doc.sections().bars().map(|bar| bar.beats as u32).sum();
    assert_eq!(events.last().unwrap().end_beat(), bar_beats as f64);
    assert_eq!(timeline.total_beats, 20.0);
}

#[test]
fn test_event_lookup_during_playback() {
    let doc = parse(HYMN).unwrap().unwrap();
    let events = extract_events(&doc);
    let at_start = event_at(&events, 0.0).unwrap();
    assert_eq!(at_start.chord_symbol, "G");
    assert_eq!(at_start.notes[0], Pitch(55));
    assert!(event_at(&events, 1.0e6).is_none());
}

#[test]
fn test_midi_export() {
    let bytes = export_midi(HYMN, 80).unwrap();
    let smf = midly::Smf::parse(&bytes).unwrap();
    assert_eq!(smf.tracks.len(), 1);

    let doc = parse(HYMN).unwrap().unwrap();
    let ticks: u32 = smf.tracks[0].iter().map(|e| e.delta.as_int()).sum();
    assert_eq!(ticks as f64, extract_timeline(&doc).total_beats * 480.0);
}

#[test]
fn test_midi_export_errors() {
    assert_eq!(export_midi("", 120), Err(ChartError::NoSections));
    assert_eq!(export_midi("Chorus\n|N.C.|", 120), Err(ChartError::NoChords));
    assert_eq!(
        export_midi("Chorus\n|N.C.|", 120).unwrap_err().to_string(),
        "No chords found: none of the chord symbols could be resolved to notes"
    );
}

#[test]
fn test_single_beat_midi() {
    let bytes = chartmark::midi::encode_midi(
        &[chartmark::ChordEvent {
            chord_symbol: "C".to_string(),
            notes: resolve("C"),
            start_beat: 0.0,
            duration_beats: 1.0,
        }],
        60,
    )
    .unwrap();
    let smf = midly::Smf::parse(&bytes).unwrap();
    let ticks: u32 = smf.tracks[0].iter().map(|e| e.delta.as_int()).sum();
    assert_eq!(ticks, 480);
}

#[test]
fn test_transposed_hymn() {
    let doc = parse(HYMN).unwrap().unwrap();
    let up = transpose_document(&doc, 5);
    assert_eq!(up.metadata.key.map(|k| k.to_string()), Some("C".to_string()));

    let one_line = render(Some(&up), ViewMode::OneLine);
    assert!(one_line.contains("[C]Amazing grace [F]how sweet the [C]sound"));
}

#[test]
fn test_unrenderable_input_degrades_to_raw() {
    let html = render_source("Verse 1\nBridge", ViewMode::Full);
    assert_eq!(html, "<pre class=\"cm-raw\">Verse 1\nBridge</pre>\n");
    assert_eq!(render_source("", ViewMode::Full), "");
}

#[test]
fn test_header_with_trailing_text_starts_a_section() {
    let doc = parse("Verse 1\n|C|G|\nChorus x2\n|F|G|").unwrap().unwrap();
    let chart = doc.sections();
    assert_eq!(chart.labels(), vec!["Verse 1", "Chorus"]);
    assert_eq!(chart.sections[0].bars.len(), 2);
    let chorus: Vec<Vec<&str>> = chart.sections[1].bars.iter().map(|bar| bar.symbols()).collect();
    assert_eq!(chorus, vec![vec!["F"], vec!["G"], vec!["F"], vec!["G"]]);

    let doc = parse("Verse 1 (soft)\n|C|\nChorus (repeat)\n|F|").unwrap().unwrap();
    assert_eq!(doc.sections().labels(), vec!["Verse 1", "Chorus"]);
    assert_eq!(doc.sections().total_bars(), 2);
}

#[test]
fn test_unknown_token_keeps_the_grid() {
    let doc = parse("Verse 1\n|C|G|Hm7|F|\n|Am|F|").unwrap().unwrap();
    assert_eq!(doc.sections().total_bars(), 6);

    let timeline = extract_timeline(&doc);
    assert_eq!(timeline.total_beats, 24.0);
    let symbols: Vec<&str> = timeline.events.iter().map(|e| e.chord_symbol.as_str()).collect();
    assert_eq!(symbols, vec!["C", "G", "F", "Am", "F"]);
    // F after the silent bar still starts on beat 12
    assert_eq!(timeline.events[2].start_beat, 12.0);
}

#[test]
fn test_lower_case_chart() {
    let doc = parse("|am|f|c|g|").unwrap().unwrap();
    assert_eq!(doc.sections().total_bars(), 4);
    let events = extract_events(&doc);
    assert_eq!(events.len(), 4);
    assert_eq!(events[0].notes, resolve("Am"));

    let bytes = export_midi("|am|f|c|g|", 120).unwrap();
    assert_eq!(&bytes[0..4], b"MThd");
}

#[test]
fn test_lyrics_that_look_like_chords_stay_lyrics() {
    let doc = parse("#v\nG\nGo Go Go\n...").unwrap().unwrap();
    assert_eq!(doc.chord_lines().count(), 1);
    let one_line = render(Some(&doc), ViewMode::OneLine);
    assert!(one_line.contains("[G]Go Go Go"));
}
