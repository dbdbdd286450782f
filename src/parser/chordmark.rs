//! Chordmark front end
//!
//! Classifies every line on its own (no backtracking), then resolves section
//! copies in a second pass. Classification order, first match wins:
//!
//! 1. blank line
//! 2. `#label [x N]` section label (`#v`, `#c`, `#b`, `#i`, `#o`, `#pc`, `#t`, ...)
//! 3. `key G` / `key: Bbm`
//! 4. time signature (`3/4`), applying to the chord lines after it
//! 5. `x N`, multiplying the preceding chord line
//! 6. a bar-chart section header (`Chorus`, `A:`, `Chorus x2`,
//!    `Verse 1 (soft)`), but not `Chorus of angels`
//! 7. chord line: any line with a `|`, or one where every token is a chord,
//!    `%`, `NC` or dots
//! 8. lyric line
//!
//! Lyrics align to chords either through `_` markers in the lyric text or,
//! without markers, through the columns of the chord line directly above.

use super::chart::clamp_repeat;
use super::{match_header, parse_key_line, parse_time_signature_line};
use crate::ast::*;
use crate::lexer::{is_bar_line, parse_repeat_directive, scan_bar_line, split_trailing_repeat};
use once_cell::sync::Lazy;
use regex::Regex;

static SECTION_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#\s*(?P<name>\S+(?:\s+\S+)*?)(?:\s*[xX]\s*(?P<count>\d+))?$")
        .expect("section label regex")
});

/// Position marker in lyric lines
const LYRIC_MARKER: char = '_';

/// Canonical label for a `#` shorthand, and whether it is numbered by
/// occurrence
fn canonical_label(name: &str) -> (String, bool) {
    let label = match name.to_ascii_lowercase().as_str() {
        "v" | "verse" => return ("Verse".to_string(), true),
        "c" | "chorus" => "Chorus",
        "b" | "bridge" => "Bridge",
        "i" | "intro" => "Intro",
        "o" | "outro" => "Outro",
        "p" | "pc" | "prechorus" | "pre-chorus" => "Pre-Chorus",
        "t" | "tag" => "Tag",
        "s" | "solo" => "Solo",
        "in" | "inst" | "instrumental" => "Instrumental",
        _ => return (title_case(name), false),
    };
    (label.to_string(), false)
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Strip `_` markers, returning the clean text and the marker offsets in it
fn strip_markers(line: &str) -> (String, Vec<usize>) {
    let mut text = String::with_capacity(line.len());
    let mut positions = Vec::new();
    let mut column = 0;
    for c in line.chars() {
        if c == LYRIC_MARKER {
            positions.push(column);
        } else {
            text.push(c);
            column += 1;
        }
    }
    (text, positions)
}

struct ChordmarkBuilder {
    lines: Vec<Line>,
    /// (line index, section kind) of every section label
    labels: Vec<(usize, String)>,
    time_signature: TimeSignature,
    /// Token columns of the chord line just pushed
    chord_columns: Option<Vec<usize>>,
    verses: u32,
}

impl ChordmarkBuilder {
    fn new(time_signature: TimeSignature) -> Self {
        Self {
            lines: Vec::new(),
            labels: Vec::new(),
            time_signature,
            chord_columns: None,
            verses: 0,
        }
    }

    fn push(&mut self, line: Line) {
        if !matches!(line, Line::Chords(_)) {
            self.chord_columns = None;
        }
        self.lines.push(line);
    }

    fn section(&mut self, kind: String, label: SectionLabel) {
        self.labels.push((self.lines.len(), kind));
        self.push(Line::Section(label));
    }

    fn line(&mut self, raw: &str) {
        let line = raw.trim_end();
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            self.push(Line::Empty);
            return;
        }

        if let Some(captures) = SECTION_LABEL_RE.captures(trimmed) {
            let (base, numbered) = canonical_label(&captures["name"]);
            let label = if numbered {
                self.verses += 1;
                format!("{} {}", base, self.verses)
            } else {
                base.clone()
            };
            let mut section = SectionLabel::new(&label);
            if let Some(count) = captures.name("count") {
                section.multiplier = clamp_repeat(count.as_str().parse().unwrap_or(u32::MAX));
            }
            self.section(base.to_ascii_lowercase(), section);
            return;
        }

        if let Some(key) = parse_key_line(trimmed) {
            self.push(Line::Key(key));
            return;
        }

        if let Some(time_signature) = parse_time_signature_line(trimmed) {
            self.time_signature = time_signature;
            self.push(Line::TimeSignature(time_signature));
            return;
        }

        if let Some(count) = parse_repeat_directive(trimmed) {
            self.repeat_previous(clamp_repeat(count));
            return;
        }

        if let Some(header) = match_header(trimmed).filter(|header| header.is_standalone()) {
            let kind = header.label.to_ascii_lowercase();
            let mut section = SectionLabel::new(&header.label);
            section.multiplier = clamp_repeat(header.repeat);
            self.section(kind, section);
            if !header.rest.is_empty() {
                self.chords(header.rest);
            }
            return;
        }

        if !self.chords(line) {
            self.lyrics(line);
        }
    }

    /// Push a chord line if the line is bar content
    fn chords(&mut self, line: &str) -> bool {
        let (content, repeat) = match split_trailing_repeat(line) {
            Some((content, count)) => (content, clamp_repeat(count)),
            None => (line.trim(), 1),
        };
        if !is_bar_line(content) {
            return false;
        }

        // Keep leading whitespace so token columns line up with the lyrics below
        let indent = line.len() - line.trim_start().len();
        let scanned = scan_bar_line(&line[..indent + content.len()]);

        // Columns follow the chord tokens that survive; a `%` bar has none
        let mut columns: Vec<usize> = Vec::new();
        let mut bars: Vec<Bar> = Vec::with_capacity(scanned.len());
        for scanned_bar in scanned {
            let bar_columns: Vec<usize> = scanned_bar.iter().map(|t| t.column).collect();
            let tokens = scanned_bar.into_iter().map(|t| t.token).collect();
            let bar = Bar::new(tokens, self.time_signature.beats);
            if !bar.repeated {
                columns.extend(bar_columns);
            }
            bars.push(bar);
        }

        self.push(Line::Chords(ChordLine {
            bars,
            time_signature: self.time_signature,
            repeat,
        }));
        self.chord_columns = Some(columns);
        true
    }

    fn lyrics(&mut self, line: &str) {
        let lyric = if line.contains(LYRIC_MARKER) {
            let (text, positions) = strip_markers(line);
            LyricLine::new(&text, positions)
        } else {
            let positions = self.chord_columns.take().unwrap_or_default();
            LyricLine::new(line, positions)
        };
        self.push(Line::Lyrics(lyric));
    }

    /// `x N` on its own line: play the previous chord line of the section N times
    fn repeat_previous(&mut self, count: u32) {
        let previous = self
            .lines
            .iter_mut()
            .rev()
            .take_while(|line| !matches!(line, Line::Section(_)))
            .find_map(|line| match line {
                Line::Chords(chords) => Some(chords),
                _ => None,
            });
        match previous {
            Some(chords) => chords.repeat = count,
            None => log::debug!("Ignoring repeat x{} with no chord line before it", count),
        }
        self.chord_columns = None;
    }

    /// Labels with no chord line before the next label (or the end) copy the
    /// most recent earlier section of the same kind
    fn resolve_copies(&mut self) {
        for (i, (index, kind)) in self.labels.iter().enumerate() {
            let end = self.labels.get(i + 1).map_or(self.lines.len(), |(next, _)| *next);
            let has_chords = self.lines[index + 1..end]
                .iter()
                .any(|line| matches!(line, Line::Chords(_)));
            if has_chords {
                continue;
            }

            let source = self.labels[..i]
                .iter()
                .rev()
                .find(|(_, earlier)| earlier == kind)
                .and_then(|(earlier_index, _)| match &self.lines[*earlier_index] {
                    Line::Section(label) => Some(label.label.clone()),
                    _ => None,
                });

            if let (Some(source), Line::Section(label)) = (source, &mut self.lines[*index]) {
                label.copy_of = Some(source);
            }
        }
    }

    fn finish(mut self) -> Vec<Line> {
        self.resolve_copies();
        self.lines
    }
}

/// Parse Chordmark text into a document
pub fn parse_chordmark(source: &str, metadata: Metadata) -> Document {
    let mut builder = ChordmarkBuilder::new(metadata.time_signature);
    for line in source.lines() {
        builder.line(line);
    }

    // Leading and trailing blank lines carry nothing
    let mut lines = builder.finish();
    while matches!(lines.last(), Some(Line::Empty)) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|line| matches!(line, Line::Empty)).count();
    lines.drain(..leading);

    Document {
        metadata,
        lines,
        source: source.to_string(),
    }
}
