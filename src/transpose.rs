//! Chord transposition
//!
//! Shifts chord roots, slash basses and key declarations by a number of
//! semitones. Suffixes are kept as written (`Cmin7` up a step is `Dmin7`) and
//! symbols that are not chords pass through untouched.
//!
//! Spelling follows the key being transposed into: flat keys get flat roots,
//! everything else sharps. The key is the one declared in the front matter or
//! by a `key` line, or failing both, the key of the first chord.

use crate::ast::{Bar, ChordLine, ChordToken, Document, KeySignature, Line};
use crate::chord::{Chord, Quality};
use crate::pitch::Accidental;

/// Transpose a single chord symbol.
///
/// ```
/// use chartmark::transpose::transpose_symbol;
///
/// assert_eq!(transpose_symbol("Am7", 3, true), "Cm7");
/// assert_eq!(transpose_symbol("D/F#", 1, true), "Eb/G");
/// assert_eq!(transpose_symbol("N.C.", 5, false), "N.C.");
/// ```
pub fn transpose_symbol(symbol: &str, semitones: i32, prefer_flats: bool) -> String {
    if semitones.rem_euclid(12) == 0 {
        return symbol.to_string();
    }
    let Some(chord) = Chord::parse(symbol) else {
        return symbol.to_string();
    };

    let shift = |pitch_class: u8| (pitch_class as i32 + semitones).rem_euclid(12) as u8;
    chord.respelled(
        shift(chord.root),
        chord.bass.map(|(bass, _)| shift(bass)),
        prefer_flats,
    )
}

/// Transpose every chord and key of a document.
///
/// The returned document keeps the original `source` text.
pub fn transpose_document(doc: &Document, semitones: i32) -> Document {
    let mut prefer_flats = starting_key(doc)
        .map(|key| key.transposed(semitones).uses_flats())
        .unwrap_or(false);

    let lines = doc
        .lines
        .iter()
        .map(|line| match line {
            Line::Key(key) => {
                let key = transpose_key(key, semitones);
                prefer_flats = key.uses_flats();
                Line::Key(key)
            }
            Line::Chords(chords) => Line::Chords(transpose_chord_line(chords, semitones, prefer_flats)),
            Line::Empty | Line::Lyrics(_) | Line::Section(_) | Line::TimeSignature(_) => line.clone(),
        })
        .collect();

    let mut metadata = doc.metadata.clone();
    metadata.key = metadata.key.map(|key| transpose_key(&key, semitones));

    Document {
        metadata,
        lines,
        source: doc.source.clone(),
    }
}

fn transpose_key(key: &KeySignature, semitones: i32) -> KeySignature {
    if semitones.rem_euclid(12) == 0 {
        *key
    } else {
        key.transposed(semitones)
    }
}

fn transpose_chord_line(chords: &ChordLine, semitones: i32, prefer_flats: bool) -> ChordLine {
    let bars = chords
        .bars
        .iter()
        .map(|bar| Bar {
            chords: bar
                .chords
                .iter()
                .map(|token| ChordToken {
                    symbol: transpose_symbol(&token.symbol, semitones, prefer_flats),
                    dots: token.dots,
                })
                .collect(),
            ..bar.clone()
        })
        .collect();
    ChordLine {
        bars,
        ..chords.clone()
    }
}

fn starting_key(doc: &Document) -> Option<KeySignature> {
    doc.initial_key().or_else(|| {
        doc.chord_lines()
            .flat_map(|line| line.tokens())
            .find_map(|token| Chord::parse(&token.symbol))
            .map(|chord| key_of_chord(&chord))
    })
}

fn key_of_chord(chord: &Chord) -> KeySignature {
    let minor = matches!(
        chord.quality,
        Quality::Minor
            | Quality::Minor7
            | Quality::MinorMajor7
            | Quality::Minor6
            | Quality::Minor9
            | Quality::MinorAdd9
    );
    KeySignature {
        tonic: chord.root,
        minor,
        flat: chord.root_accidental == Accidental::Flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn symbols(doc: &Document) -> Vec<String> {
        doc.chord_lines()
            .flat_map(|line| line.tokens())
            .map(|token| token.to_string())
            .collect()
    }

    #[test]
    fn test_transpose_symbol() {
        assert_eq!(transpose_symbol("C", 2, false), "D");
        assert_eq!(transpose_symbol("F#m", 1, false), "Gm");
        assert_eq!(transpose_symbol("C/E", 5, true), "F/A");
        assert_eq!(transpose_symbol("Bb", 2, false), "C");
        assert_eq!(transpose_symbol("B", 1, false), "C");
        assert_eq!(transpose_symbol("C", -1, false), "B");
        assert_eq!(transpose_symbol("Cmin7", 1, true), "Dbmin7");
        assert_eq!(transpose_symbol("Cxyz", 2, false), "Dxyz");
    }

    #[test]
    fn test_non_chords_pass_through() {
        assert_eq!(transpose_symbol("H7", 2, false), "H7");
        assert_eq!(transpose_symbol("%", 2, false), "%");
        assert_eq!(transpose_symbol("", 2, false), "");
    }

    #[test]
    fn test_whole_octaves_keep_spelling() {
        assert_eq!(transpose_symbol("Db", 12, false), "Db");
        assert_eq!(transpose_symbol("f#m7", 0, true), "f#m7");
    }

    #[test]
    fn test_key_line_sets_spelling() {
        let doc = parse("key: C\n|C|G/B|Am|F|\nla la").unwrap().unwrap();
        let transposed = transpose_document(&doc, 3);

        assert_eq!(transposed.lines[0], Line::Key(KeySignature::from_str("Eb").unwrap()));
        assert_eq!(symbols(&transposed), vec!["Eb", "Bb/D", "Cm", "Ab"]);
        // Lyrics are untouched
        assert_eq!(transposed.lines[2], doc.lines[2]);
    }

    #[test]
    fn test_metadata_key() {
        let doc = parse("---\nkey: G\n---\n|G|D.|").unwrap().unwrap();
        let transposed = transpose_document(&doc, 5);
        assert_eq!(transposed.metadata.key.map(|k| k.to_string()), Some("C".to_string()));
        assert_eq!(symbols(&transposed), vec!["C", "G."]);
    }

    #[test]
    fn test_key_from_first_chord() {
        let doc = parse("|Dm|A7|").unwrap().unwrap();
        // D minor down a tone is C minor, a flat key
        assert_eq!(symbols(&transpose_document(&doc, -2)), vec!["Cm", "G7"]);
        // D minor up a tone is E minor, a sharp key
        assert_eq!(symbols(&transpose_document(&doc, 2)), vec!["Em", "B7"]);
        assert_eq!(symbols(&transpose_document(&doc, 3)), vec!["Fm", "C7"]);
        // C major up a semitone is Db major
        let doc = parse("|C|Bb|").unwrap().unwrap();
        assert_eq!(symbols(&transpose_document(&doc, 1)), vec!["Db", "B"]);
    }

    #[test]
    fn test_timing_is_unchanged() {
        let doc = parse("#c x2\n|C . G|%|\nsing").unwrap().unwrap();
        let transposed = transpose_document(&doc, 7);
        assert_eq!(
            crate::playback::extract_timeline(&transposed).total_beats,
            crate::playback::extract_timeline(&doc).total_beats
        );
        assert_eq!(symbols(&transposed), vec!["G.", "D"]);
    }
}
