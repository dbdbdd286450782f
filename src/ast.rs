//! # Chart Model Types
//!
//! This module defines the structured forms a chord chart is parsed into.
//!
//! ## Type Hierarchy
//! ```text
//! Document
//!   ├── Metadata (title, artist, key, tempo, time signature)
//!   └── Vec<Line>
//!         ├── Empty
//!         ├── Chords(ChordLine)      bars + time signature + repeat count
//!         ├── Lyrics(LyricLine)      text + chord alignment offsets
//!         ├── Section(SectionLabel)  label + multiplier + copy target
//!         ├── Key(KeySignature)
//!         └── TimeSignature(TimeSignature)
//!
//! ParsedChart
//!   └── Vec<Section>
//!         ├── label
//!         └── Vec<Bar>
//!               └── Vec<ChordToken> (symbol + duration dots)
//! ```
//!
//! ## Key Concepts
//!
//! ### Document vs ParsedChart
//! A `Document` is line oriented and keeps everything needed to render the
//! chart again (lyrics, alignment, labels, key and time signature changes).
//! A `ParsedChart` is the flattened musical structure: sections of bars with
//! every repeat already expanded into literal copies. [`Document::sections`]
//! projects the former onto the latter.
//!
//! ### Duration Dots
//! A chord token occupies one slot of its bar. Trailing dots subdivide it:
//! `C` sounds for the whole slot, `C.` for half of it, `C..` for a third.
//! The rest of the slot is silence.
//!
//! ### Repeated Bars
//! A bar written as a lone `%` repeats the previous bar. It lasts a full bar
//! and carries no chords of its own.
//!
//! ## Related Modules
//! - `lexer` - Splits bar lines into `ChordToken`s
//! - `parser` - Builds `Document`s and `ParsedChart`s
//! - `render` - Projects `Document`s into views
//! - `playback` - Flattens `Document`s into timed chord events

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pitch::{note_name, parse_note_name};

/// Symbol of the rest / repeat marker
pub const REST_SYMBOL: &str = "%";

/// Time signature (e.g., 4/4, 3/4, 6/8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSignature {
    pub beats: u8,
    pub beat_type: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            beats: 4,
            beat_type: 4,
        }
    }
}

impl TimeSignature {
    /// Parse `"3/4"`. The numerator must be 1-32 and the denominator a power
    /// of two up to 16.
    pub fn from_str(s: &str) -> Option<Self> {
        let (beats, beat_type) = s.trim().split_once('/')?;
        let beats: u8 = beats.trim().parse().ok()?;
        let beat_type: u8 = beat_type.trim().parse().ok()?;
        if !(1..=32).contains(&beats) || !matches!(beat_type, 1 | 2 | 4 | 8 | 16) {
            return None;
        }
        Some(Self { beats, beat_type })
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats, self.beat_type)
    }
}

/// Key of a chart, e.g. `G` or `F#m`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeySignature {
    /// Pitch class of the tonic (0 = C)
    pub tonic: u8,
    pub minor: bool,
    /// Whether the tonic was written with a flat
    pub flat: bool,
}

impl KeySignature {
    /// Parse a key name like "G", "Bb", "F#m" or "Ebmin".
    pub fn from_str(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        let (tonic, accidental, consumed) = parse_note_name(trimmed)?;
        let minor = match &trimmed[consumed..] {
            "" | "maj" | "major" | "M" => false,
            "m" | "min" | "minor" | "-" => true,
            _ => return None,
        };
        Some(Self {
            tonic,
            minor,
            flat: accidental == crate::pitch::Accidental::Flat,
        })
    }

    /// Key signatures that are conventionally spelled with flats.
    ///
    /// Major: F Bb Eb Ab Db Gb, minor: D G C F Bb Eb.
    pub fn uses_flats(&self) -> bool {
        // Relative major decides the signature
        let major_tonic = if self.minor { (self.tonic + 3) % 12 } else { self.tonic };
        match major_tonic {
            5 | 10 | 3 | 8 | 1 => true,
            6 => self.flat,
            _ => false,
        }
    }

    /// Move the tonic by `semitones`, respelling for the new key
    pub fn transposed(&self, semitones: i32) -> Self {
        let tonic = (self.tonic as i32 + semitones).rem_euclid(12) as u8;
        let mut key = Self { tonic, minor: self.minor, flat: false };
        key.flat = key.uses_flats();
        key
    }
}

impl fmt::Display for KeySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = note_name(self.tonic, self.flat);
        write!(f, "{}{}", name, if self.minor { "m" } else { "" })
    }
}

/// A chord token of a bar: a symbol plus its trailing duration dots
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordToken {
    pub symbol: String,
    pub dots: u8,
}

impl ChordToken {
    /// Split trailing dots off a raw token: `"Am.."` → `Am` with 2 dots.
    pub fn parse(raw: &str) -> Self {
        let symbol = raw.trim_end_matches('.');
        let dots = (raw.len() - symbol.len()).min(u8::MAX as usize) as u8;
        Self {
            symbol: symbol.to_string(),
            dots,
        }
    }

    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            dots: 0,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.symbol == REST_SYMBOL
    }

    /// Fraction of the token's slot that actually sounds
    pub fn sounding_fraction(&self) -> f64 {
        1.0 / (self.dots as f64 + 1.0)
    }
}

impl fmt::Display for ChordToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)?;
        for _ in 0..self.dots {
            f.write_str(".")?;
        }
        Ok(())
    }
}

/// One bar of a chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub chords: Vec<ChordToken>,
    /// Shorthand for "same as the previous bar"
    pub repeated: bool,
    /// Beats per bar of the time signature the bar was written in
    pub beats: u8,
}

impl Bar {
    /// Build a bar from its tokens. A lone undotted `%` marks a repeated bar.
    pub fn new(chords: Vec<ChordToken>, beats: u8) -> Self {
        if chords.len() == 1 && chords[0].is_rest() && chords[0].dots == 0 {
            return Self::repeated(beats);
        }
        Self {
            chords,
            repeated: false,
            beats,
        }
    }

    pub fn empty(beats: u8) -> Self {
        Self {
            chords: Vec::new(),
            repeated: false,
            beats,
        }
    }

    pub fn repeated(beats: u8) -> Self {
        Self {
            chords: Vec::new(),
            repeated: true,
            beats,
        }
    }

    /// True when the bar carries neither chords nor a repeat mark
    pub fn is_empty(&self) -> bool {
        self.chords.is_empty() && !self.repeated
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.chords.iter().map(|c| c.symbol.as_str()).collect()
    }
}

/// A labelled run of bars
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub label: String,
    pub bars: Vec<Bar>,
    /// True for the `Main` section collecting bars written before any label
    pub implicit: bool,
}

/// Label of the section that collects unlabelled bars
pub const MAIN_SECTION: &str = "Main";

/// Flattened musical structure: sections of bars, repeats expanded
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParsedChart {
    pub sections: Vec<Section>,
}

impl ParsedChart {
    pub fn total_bars(&self) -> usize {
        self.sections.iter().map(|s| s.bars.len()).sum()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn bars(&self) -> impl Iterator<Item = &Bar> {
        self.sections.iter().flat_map(|s| s.bars.iter())
    }
}

/// A line of bars
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChordLine {
    pub bars: Vec<Bar>,
    pub time_signature: TimeSignature,
    /// How many times the line is played (`x N` shorthand), at least 1
    pub repeat: u32,
}

impl ChordLine {
    pub fn tokens(&self) -> impl Iterator<Item = &ChordToken> {
        self.bars.iter().flat_map(|b| b.chords.iter())
    }
}

/// A line of lyrics with the character offsets chords align to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LyricLine {
    pub text: String,
    pub positions: Vec<usize>,
}

impl LyricLine {
    /// Build a lyric line, keeping only positions that index into `text` and
    /// do not go backwards.
    pub fn new(text: &str, positions: Vec<usize>) -> Self {
        let len = text.chars().count();
        let mut kept: Vec<usize> = Vec::with_capacity(positions.len());
        for position in positions {
            if position >= len {
                break;
            }
            if kept.last().map_or(true, |last| position >= *last) {
                kept.push(position);
            }
        }
        Self {
            text: text.to_string(),
            positions: kept,
        }
    }
}

/// A section label line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionLabel {
    pub label: String,
    /// Number of times the section is played, at least 1
    pub multiplier: u32,
    /// Label of an earlier section whose bars this one reuses
    pub copy_of: Option<String>,
}

impl SectionLabel {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            multiplier: 1,
            copy_of: None,
        }
    }
}

/// One line of a document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Line {
    Empty,
    Chords(ChordLine),
    Lyrics(LyricLine),
    Section(SectionLabel),
    Key(KeySignature),
    TimeSignature(TimeSignature),
}

/// Chart-wide settings from the front matter
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub key: Option<KeySignature>,
    pub tempo: Option<u16>,
    pub time_signature: TimeSignature,
}

/// Raw metadata for the YAML front matter
#[derive(Deserialize, Serialize, Debug, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct RawMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_signature: Option<String>,
}

impl From<&Metadata> for RawMetadata {
    /// The default 4/4 time signature is left out
    fn from(metadata: &Metadata) -> Self {
        let time_signature = if metadata.time_signature == TimeSignature::default() {
            None
        } else {
            Some(metadata.time_signature.to_string())
        };
        Self {
            title: metadata.title.clone(),
            artist: metadata.artist.clone(),
            key: metadata.key.map(|key| key.to_string()),
            tempo: metadata.tempo,
            time_signature,
        }
    }
}

/// A parsed chart in line form
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Document {
    pub metadata: Metadata,
    pub lines: Vec<Line>,
    /// The text the document was parsed from (without front matter)
    #[serde(skip)]
    pub source: String,
}

impl Document {
    /// Build the line form of a chart parsed from the bar-chart dialect
    pub fn from_chart(chart: &ParsedChart, metadata: Metadata, source: &str) -> Self {
        const BARS_PER_LINE: usize = 4;
        let time_signature = metadata.time_signature;
        let mut lines = Vec::new();

        for section in &chart.sections {
            if !lines.is_empty() {
                lines.push(Line::Empty);
            }
            if !section.implicit {
                lines.push(Line::Section(SectionLabel::new(&section.label)));
            }
            for chunk in section.bars.chunks(BARS_PER_LINE) {
                lines.push(Line::Chords(ChordLine {
                    bars: chunk.to_vec(),
                    time_signature,
                    repeat: 1,
                }));
            }
        }

        Self {
            metadata,
            lines,
            source: source.to_string(),
        }
    }

    /// True when there is nothing but empty lines
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| matches!(line, Line::Empty))
    }

    pub fn chord_lines(&self) -> impl Iterator<Item = &ChordLine> {
        self.lines.iter().filter_map(|line| match line {
            Line::Chords(chords) => Some(chords),
            _ => None,
        })
    }

    /// The key in force at the start of the document
    pub fn initial_key(&self) -> Option<KeySignature> {
        self.metadata.key.or_else(|| {
            self.lines.iter().find_map(|line| match line {
                Line::Key(key) => Some(*key),
                _ => None,
            })
        })
    }

    /// Project the document onto sections of bars.
    ///
    /// Line repeats and section multipliers are expanded, copy sections take
    /// the bars of the most recent section with the copied label, bars written
    /// before the first label collect into an implicit `Main` section and
    /// sections without bars are dropped.
    pub fn sections(&self) -> ParsedChart {
        let mut sections: Vec<Section> = Vec::new();
        let mut current = Section {
            label: MAIN_SECTION.to_string(),
            bars: Vec::new(),
            implicit: true,
        };
        let mut multiplier = 1;

        for line in &self.lines {
            match line {
                Line::Section(label) => {
                    flush_section(&mut sections, current, multiplier);
                    multiplier = label.multiplier.max(1);
                    let bars = match &label.copy_of {
                        Some(target) => sections
                            .iter()
                            .rev()
                            .find(|s| s.label.eq_ignore_ascii_case(target))
                            .map(|s| s.bars.clone())
                            .unwrap_or_default(),
                        None => Vec::new(),
                    };
                    current = Section {
                        label: label.label.clone(),
                        bars,
                        implicit: false,
                    };
                }
                Line::Chords(chords) => {
                    for _ in 0..chords.repeat.max(1) {
                        current.bars.extend(chords.bars.iter().cloned());
                    }
                }
                Line::Empty | Line::Lyrics(_) | Line::Key(_) | Line::TimeSignature(_) => {}
            }
        }
        flush_section(&mut sections, current, multiplier);

        ParsedChart { sections }
    }
}

fn flush_section(sections: &mut Vec<Section>, mut section: Section, multiplier: u32) {
    if section.bars.is_empty() {
        return;
    }
    if multiplier > 1 {
        let once = section.bars.clone();
        for _ in 1..multiplier {
            section.bars.extend(once.iter().cloned());
        }
    }
    sections.push(section);
}
