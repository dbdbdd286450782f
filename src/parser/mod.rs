//! # Parser Module
//!
//! This module turns raw chart text into a [`Document`].
//!
//! ## Purpose
//! Charts arrive as free-form, hand-typed text in one of two dialects:
//!
//! - **Bar charts**: section headers (`Verse 1`, `Chorus`, `A:`) over lines of
//!   `|`-delimited bars, with `x N` repeat shorthand.
//! - **Chordmark**: chord lines aligned over lyric lines, `#v`/`#c` section
//!   labels with multipliers and copies, `key` and time-signature lines.
//!
//! Both front ends produce the same line-oriented [`Document`].
//!
//! ## Pipeline
//! 1. Extract the optional YAML front matter (`---` ... `---`) into [`Metadata`]
//! 2. Detect the dialect once, from the shape of every content line
//! 3. Run exactly one front end ([`chart`] or [`chordmark`])
//!
//! There is no fallback between front ends: detection is deterministic and
//! both front ends accept any input.
//!
//! ## Entry Point
//! `parse(source: &str) -> Result<Option<Document>, ChartError>`
//!
//! ## Example
//! ```rust
//! use chartmark::parse;
//!
//! let source = r#"---
//! title: My Song
//! time-signature: 3/4
//! ---
//! Verse 1
//! |C|G|Am|F|
//! "#;
//!
//! let doc = parse(source).unwrap().unwrap();
//! assert_eq!(doc.metadata.title, Some("My Song".to_string()));
//! let chart = doc.sections();
//! assert_eq!(chart.labels(), vec!["Verse 1"]);
//! assert_eq!(chart.sections[0].bars[0].beats, 3);
//!
//! // Blank input is "no document", not an error
//! assert!(parse("   \n").unwrap().is_none());
//! ```
//!
//! ## Related Modules
//! - `lexer` - Tokenizes bar lines
//! - `ast` - Document, ParsedChart and line types
//! - `error` - MetadataError for bad front matter

pub mod chart;
pub mod chordmark;

use crate::ast::*;
use crate::error::ChartError;
use crate::lexer::{is_bar_line, parse_repeat_directive, split_trailing_repeat};
use once_cell::sync::Lazy;
use regex::Regex;

pub use chart::parse_chart;

/// Built-in section names and single-letter labels
static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(Verse \d+|Bridge|Tag|Chorus|Intro|Outro|Pre-Chorus|[A-Z]:)")
        .expect("section header regex")
});

/// Any label terminated by a colon: `Solo:`, `Verse 1: |C|G|`
static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<label>[\p{L}\p{N}][^|:]*?)\s*:\s*(?P<rest>.*)$").expect("label regex")
});

static KEY_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^key\s*:?\s*(\S+)$").expect("key line regex"));

static TIME_SIGNATURE_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\s*/\s*\d+$").expect("time signature line regex"));

/// The two input dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Chart,
    Chordmark,
}

/// A section header line split into its label and what follows it
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Header<'a> {
    pub label: String,
    /// Bar content after the label
    pub rest: &'a str,
    /// `Chorus x2`: the section is played this many times
    pub repeat: u32,
    /// Other text after a built-in name: `Verse 1 (soft)`, `Chorus of angels`
    pub note: &'a str,
    /// The built-in name runs on into a longer word (`Introducing`)
    pub joined: bool,
}

impl Header<'_> {
    /// Whether the line reads as a header even where lyrics are possible:
    /// nothing but bars, a repeat count or a parenthetical follows the name.
    pub fn is_standalone(&self) -> bool {
        !self.joined
            && (self.note.is_empty() || (self.note.starts_with('(') && self.note.ends_with(')')))
    }
}

/// Recognize a section header.
///
/// A `Label:` line is tried first so that arbitrary labels (and built-in
/// names followed by a colon) keep their full text. Otherwise the built-in
/// names match as a prefix of the line. Whatever follows the label is split
/// into bar content, a repeat count or a free-text note.
pub(crate) fn match_header(line: &str) -> Option<Header<'_>> {
    let line = line.trim();

    if let Some(captures) = LABEL_RE.captures(line) {
        let rest = captures.name("rest").map_or("", |m| m.as_str()).trim();
        let repeat = parse_repeat_directive(rest);
        if rest.is_empty() || repeat.is_some() || is_bar_content(rest) {
            return Some(Header {
                label: captures["label"].to_string(),
                rest: if repeat.is_some() { "" } else { rest },
                repeat: repeat.unwrap_or(1),
                note: "",
                joined: false,
            });
        }
    }

    let matched = HEADER_RE.find(line)?;
    let after = &line[matched.end()..];
    let joined = !matched.as_str().ends_with(':')
        && after.chars().next().is_some_and(char::is_alphanumeric);
    let mut header = Header {
        label: matched.as_str().trim_end_matches(':').to_string(),
        rest: "",
        repeat: 1,
        note: "",
        joined,
    };

    let after = after.trim_start_matches(':').trim();
    if let Some(count) = parse_repeat_directive(after) {
        header.repeat = count;
    } else if is_bar_content(after) {
        header.rest = after;
    } else {
        header.note = after;
    }
    Some(header)
}

/// Bar content, optionally followed by a trailing repeat count
pub(crate) fn is_bar_content(line: &str) -> bool {
    match split_trailing_repeat(line) {
        Some((content, _)) => is_bar_line(content),
        None => is_bar_line(line),
    }
}

pub(crate) fn parse_key_line(line: &str) -> Option<KeySignature> {
    let captures = KEY_LINE_RE.captures(line.trim())?;
    KeySignature::from_str(&captures[1])
}

pub(crate) fn parse_time_signature_line(line: &str) -> Option<TimeSignature> {
    let line = line.trim();
    if !TIME_SIGNATURE_LINE_RE.is_match(line) {
        return None;
    }
    TimeSignature::from_str(line)
}

/// Decide which front end reads `source`.
///
/// A text is a bar chart when every non-blank line is a section header, a
/// repeat directive or bar content. A header may carry any text after a
/// built-in name (`Chorus x2`, `Verse 1 (soft)`). Any line with a `|` is bar
/// content. Lyrics, `#` labels, key and time signature lines all make it
/// Chordmark.
///
/// ```
/// use chartmark::parser::{detect_dialect, Dialect};
///
/// assert_eq!(detect_dialect("Chorus\n|C|G| x2"), Dialect::Chart);
/// assert_eq!(detect_dialect("Verse 1 (soft)\n|am|f|c|g|"), Dialect::Chart);
/// assert_eq!(detect_dialect("#v\nC    G\nAmazing grace"), Dialect::Chordmark);
/// ```
pub fn detect_dialect(source: &str) -> Dialect {
    let is_chart = source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .all(|line| {
            if parse_key_line(line).is_some() || parse_time_signature_line(line).is_some() {
                return false;
            }
            match_header(line).is_some_and(|header| !header.joined)
                || parse_repeat_directive(line).is_some()
                || is_bar_content(line)
        });

    let dialect = if is_chart { Dialect::Chart } else { Dialect::Chordmark };
    log::debug!("Detected {:?} dialect", dialect);
    dialect
}

/// Extract the YAML front matter block.
///
/// The block is delimited by two `---` lines and may sit anywhere in the
/// source. Returns (metadata_content, remaining_source).
pub(crate) fn extract_metadata(source: &str) -> (Option<String>, String) {
    let lines: Vec<&str> = source.lines().collect();

    let mut start_idx = None;
    let mut end_idx = None;

    for (i, line) in lines.iter().enumerate() {
        if line.trim() == "---" {
            if start_idx.is_none() {
                start_idx = Some(i);
            } else {
                end_idx = Some(i);
                break;
            }
        }
    }

    match (start_idx, end_idx) {
        (Some(start), Some(end)) => {
            let metadata_content: String = lines[start + 1..end].join("\n");

            let remaining: Vec<&str> = lines[..start]
                .iter()
                .chain(lines[end + 1..].iter())
                .copied()
                .collect();

            (Some(metadata_content), remaining.join("\n"))
        }
        _ => (None, source.to_string()),
    }
}

/// Decode the front matter into [`Metadata`]
pub(crate) fn parse_yaml_metadata(content: &str) -> Result<Metadata, ChartError> {
    if content.trim().is_empty() {
        return Ok(Metadata::default());
    }

    let raw: RawMetadata =
        serde_yaml::from_str(content).map_err(|e| ChartError::MetadataError(e.to_string()))?;

    let time_signature = match &raw.time_signature {
        Some(ts) => TimeSignature::from_str(ts).ok_or_else(|| {
            ChartError::MetadataError(format!("Invalid time signature: {}", ts))
        })?,
        None => TimeSignature::default(),
    };

    let key = match &raw.key {
        Some(k) => Some(
            KeySignature::from_str(k)
                .ok_or_else(|| ChartError::MetadataError(format!("Invalid key: {}", k)))?,
        ),
        None => None,
    };

    if raw.tempo == Some(0) {
        return Err(ChartError::MetadataError("tempo must be positive".to_string()));
    }

    Ok(Metadata {
        title: raw.title,
        artist: raw.artist,
        key,
        tempo: raw.tempo,
        time_signature,
    })
}

/// Parse chart text, detecting its dialect.
///
/// Returns `Ok(None)` when there is nothing but whitespace (after front
/// matter), and `Err` only for undecodable front matter.
pub fn parse(source: &str) -> Result<Option<Document>, ChartError> {
    let (metadata_content, body) = extract_metadata(source);
    if body.trim().is_empty() {
        return Ok(None);
    }
    let dialect = detect_dialect(&body);
    parse_body(metadata_content, &body, dialect).map(Some)
}

/// Parse chart text with an explicit dialect
pub fn parse_as(source: &str, dialect: Dialect) -> Result<Option<Document>, ChartError> {
    let (metadata_content, body) = extract_metadata(source);
    if body.trim().is_empty() {
        return Ok(None);
    }
    parse_body(metadata_content, &body, dialect).map(Some)
}

fn parse_body(
    metadata_content: Option<String>,
    body: &str,
    dialect: Dialect,
) -> Result<Document, ChartError> {
    let metadata = match metadata_content {
        Some(content) => parse_yaml_metadata(&content)?,
        None => Metadata::default(),
    };

    let doc = match dialect {
        Dialect::Chart => {
            let chart = chart::parse_chart_with(body, metadata.time_signature);
            Document::from_chart(&chart, metadata, body)
        }
        Dialect::Chordmark => chordmark::parse_chordmark(body, metadata),
    };
    Ok(doc)
}
