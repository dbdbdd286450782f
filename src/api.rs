//! # Public API
//!
//! This module contains the text-in, result-out entry points of the library.
//!
//! ## Functions
//!
//! - [`export_midi()`] - Chart text to Standard MIDI File bytes, with validation
//! - [`export_document()`] - The same for a document already parsed
//! - [`timeline()`] - Chart text to timed chord events
//! - [`transpose()`] - Chart text transposed and written back as chart text
//! - [`effective_tempo()`] - The tempo a chart plays at
//!
//! Rendering goes through [`crate::render::render_source`].
//!
//! ## Typical Usage
//!
//! ```rust
//! use chartmark::export_midi;
//!
//! let source = r#"---
//! title: My Song
//! tempo: 96
//! ---
//! Verse 1
//! |C|G|Am|F|
//! "#;
//!
//! let bytes = export_midi(source, 96)?;
//! assert_eq!(&bytes[0..4], b"MThd");
//! # Ok::<(), chartmark::ChartError>(())
//! ```

use crate::ast::Document;
use crate::error::ChartError;
use crate::midi::encode_timeline;
use crate::playback::{extract_timeline, Timeline, DEFAULT_TEMPO};
use crate::render::serialize;
use crate::transpose::transpose_document;
use crate::{parse, validate};

/// Slowest tempo accepted from callers
pub const MIN_TEMPO: u16 = 30;

/// Fastest tempo accepted from callers
pub const MAX_TEMPO: u16 = 300;

/// Export chart text as a MIDI file.
///
/// # Pipeline
/// 1. Parse the text (either dialect)
/// 2. Validate: at least one section, at least one playable chord
/// 3. Extract the timeline
/// 4. Encode at `tempo`, clamped to 30-300 BPM
///
/// # Errors
/// - [`ChartError::MetadataError`] for undecodable front matter
/// - [`ChartError::NoSections`] when the text holds no bars (or is blank)
/// - [`ChartError::NoChords`] when no chord resolves to notes
///
/// ```rust
/// use chartmark::{export_midi, ChartError};
///
/// assert_eq!(export_midi("", 120), Err(ChartError::NoSections));
/// assert_eq!(export_midi("|N.C.|%|", 120), Err(ChartError::NoChords));
/// ```
pub fn export_midi(source: &str, tempo: u16) -> Result<Vec<u8>, ChartError> {
    let doc = parse(source)?.ok_or(ChartError::NoSections)?;
    export_document(&doc, tempo)
}

/// Export an already parsed document as a MIDI file.
///
/// # Errors
/// [`ChartError::NoSections`] or [`ChartError::NoChords`], as for
/// [`export_midi()`].
pub fn export_document(doc: &Document, tempo: u16) -> Result<Vec<u8>, ChartError> {
    validate(doc)?;
    let timeline = extract_timeline(doc);
    encode_timeline(&timeline, clamp_tempo(tempo))
}

/// Timed chord events of chart text. Blank text has an empty timeline.
///
/// # Errors
/// Returns [`ChartError::MetadataError`] for undecodable front matter.
pub fn timeline(source: &str) -> Result<Timeline, ChartError> {
    Ok(parse(source)?
        .map(|doc| extract_timeline(&doc))
        .unwrap_or_default())
}

/// Transpose chart text by `semitones` and serialize it back.
///
/// Blank text stays blank.
///
/// ```rust
/// use chartmark::api::transpose;
///
/// let text = transpose("Chorus\n|C|G/B|Am|", 2)?;
/// assert_eq!(text, "Chorus:\n|D|A/C#|Bm|\n");
/// # Ok::<(), chartmark::ChartError>(())
/// ```
pub fn transpose(source: &str, semitones: i32) -> Result<String, ChartError> {
    Ok(parse(source)?
        .map(|doc| serialize(&transpose_document(&doc, semitones)))
        .unwrap_or_default())
}

/// The tempo a chart plays at: the override, else the front matter tempo,
/// else 120, clamped to 30-300 BPM.
pub fn effective_tempo(doc: Option<&Document>, tempo_override: Option<u16>) -> u16 {
    let tempo = tempo_override
        .or_else(|| doc.and_then(|doc| doc.metadata.tempo))
        .unwrap_or(DEFAULT_TEMPO);
    clamp_tempo(tempo)
}

pub fn clamp_tempo(tempo: u16) -> u16 {
    tempo.clamp(MIN_TEMPO, MAX_TEMPO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::{MetaMessage, Smf, TrackEventKind};

    fn tempo_meta(bytes: &[u8]) -> u32 {
        let smf = Smf::parse(bytes).unwrap();
        smf.tracks[0]
            .iter()
            .find_map(|event| match event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(t)) => Some(t.as_int()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_export_midi() {
        let bytes = export_midi("Verse 1\n|C|G|Am|F|", 120).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        let ticks: u32 = smf.tracks[0].iter().map(|e| e.delta.as_int()).sum();
        assert_eq!(ticks, 16 * 480);
        assert_eq!(tempo_meta(&bytes), 500_000);
    }

    #[test]
    fn test_export_clamps_tempo() {
        assert_eq!(tempo_meta(&export_midi("|C|", 0).unwrap()), 2_000_000);
        assert_eq!(tempo_meta(&export_midi("|C|", 1000).unwrap()), 200_000);
    }

    #[test]
    fn test_export_preconditions() {
        assert_eq!(export_midi("   ", 120), Err(ChartError::NoSections));
        assert_eq!(export_midi("Verse 1\nChorus", 120), Err(ChartError::NoSections));
        assert_eq!(export_midi("just lyrics here", 120), Err(ChartError::NoSections));
        assert_eq!(export_midi("| |", 120), Err(ChartError::NoChords));
        assert!(matches!(
            export_midi("---\ntempo: [\n---\n|C|", 120),
            Err(ChartError::MetadataError(_))
        ));
    }

    #[test]
    fn test_timeline() {
        let timeline = timeline("#c x2\nC   G\nsing along").unwrap();
        assert_eq!(timeline.events.len(), 4);
        assert_eq!(timeline.total_beats, 8.0);
        assert!(super::timeline("").unwrap().is_empty());
    }

    #[test]
    fn test_transpose_round_trips_as_chart_text() {
        let text = transpose("---\nkey: F\n---\n#v\nF   C\nhello\n", 2).unwrap();
        assert!(text.contains("key: G"));
        assert!(text.ends_with("Verse 1:\n|G D|\n"));
        assert_eq!(transpose("", 3).unwrap(), "");
    }

    #[test]
    fn test_effective_tempo() {
        let doc = parse("---\ntempo: 72\n---\n|C|").unwrap();
        assert_eq!(effective_tempo(doc.as_ref(), None), 72);
        assert_eq!(effective_tempo(doc.as_ref(), Some(140)), 140);
        assert_eq!(effective_tempo(None, None), DEFAULT_TEMPO);
        assert_eq!(effective_tempo(None, Some(10)), MIN_TEMPO);
    }
}
