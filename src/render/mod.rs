//! # Render Module
//!
//! This module projects a [`Document`] into display markup and back into
//! chart text.
//!
//! ## Views
//! - [`ViewMode::Full`] - chords positioned over their aligned lyrics
//! - [`ViewMode::ChordsOnly`] - chord lines packed bar by bar, no lyrics
//! - [`ViewMode::LyricsOnly`] - lyric text under its section headers
//! - [`ViewMode::OneLine`] - chords inlined into the lyric text as `[C]Amazing`
//!
//! Every view shows section labels. The markup is a fragment of `div`/`span`
//! elements with `cm-*` class names; all chart text is XML-escaped.
//!
//! When a document has no chord or lyric lines at all, the views fall back to
//! the raw source in a `<pre class="cm-raw">` block so nothing the user typed
//! disappears.
//!
//! ## Serialization
//! [`serialize`] writes a document back as bar-chart text that parses to the
//! same sections, bar counts and chord symbols.
//!
//! ## Example
//! ```rust
//! use chartmark::render::{render, ViewMode};
//! use chartmark::parse;
//!
//! let doc = parse("#v\nC       G\nAmazing grace").unwrap();
//! let html = render(doc.as_ref(), ViewMode::OneLine);
//! assert!(html.contains("[VERSE 1]"));
//! assert!(html.contains("[C]Amazing [G]grace"));
//!
//! assert_eq!(render(None, ViewMode::Full), "");
//! ```
//!
//! ## Related Modules
//! - `parser` - Produces the documents rendered here
//! - `ast` - Line types matched by every view

mod html;
mod one_line;
mod serialize;

use std::fmt;
use std::str::FromStr;

use crate::ast::{ChordLine, Document, Line, SectionLabel};
use crate::parser::parse;

pub use serialize::serialize;

/// How a document is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Full,
    ChordsOnly,
    LyricsOnly,
    OneLine,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [
        ViewMode::Full,
        ViewMode::ChordsOnly,
        ViewMode::LyricsOnly,
        ViewMode::OneLine,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ViewMode::Full => "full",
            ViewMode::ChordsOnly => "chords",
            ViewMode::LyricsOnly => "lyrics",
            ViewMode::OneLine => "one-line",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ViewMode::ALL
            .into_iter()
            .find(|mode| mode.name() == lower)
            .ok_or_else(|| {
                format!("Unknown view '{}' (expected full, chords, lyrics or one-line)", s)
            })
    }
}

/// Render a document in the given view.
///
/// No document renders as an empty string.
pub fn render(doc: Option<&Document>, mode: ViewMode) -> String {
    let Some(doc) = doc else {
        return String::new();
    };

    if !has_content(doc) {
        return raw_fallback(&doc.source);
    }

    match mode {
        ViewMode::Full => html::render_full(doc),
        ViewMode::ChordsOnly => html::render_chords_only(doc),
        ViewMode::LyricsOnly => html::render_lyrics_only(doc),
        ViewMode::OneLine => one_line::render_one_line(doc),
    }
}

/// Parse and render in one step.
///
/// Text that cannot be parsed (bad front matter) is shown raw.
pub fn render_source(source: &str, mode: ViewMode) -> String {
    match parse(source) {
        Ok(doc) => render(doc.as_ref(), mode),
        Err(e) => {
            log::warn!("Showing chart source unparsed: {}", e);
            raw_fallback(source)
        }
    }
}

fn has_content(doc: &Document) -> bool {
    doc.lines
        .iter()
        .any(|line| matches!(line, Line::Chords(_) | Line::Lyrics(_)))
}

fn raw_fallback(source: &str) -> String {
    if source.trim().is_empty() {
        return String::new();
    }
    format!("<pre class=\"cm-raw\">{}</pre>\n", escape(source.trim_matches('\n')))
}

pub(crate) fn escape(text: &str) -> String {
    quick_xml::escape::escape(text).to_string()
}

/// Chord symbols of a line in playing order, `%` standing for repeated bars
pub(crate) fn display_symbols(chords: &ChordLine) -> Vec<String> {
    chords
        .bars
        .iter()
        .flat_map(|bar| {
            if bar.repeated {
                vec!["%".to_string()]
            } else {
                bar.chords.iter().map(|token| token.to_string()).collect()
            }
        })
        .collect()
}

/// Label text with its multiplier
pub(crate) fn label_text(label: &SectionLabel) -> String {
    let mut text = label.label.clone();
    if label.multiplier > 1 {
        text.push_str(&format!(" x{}", label.multiplier));
    }
    text
}

/// Split lyric text at the chord positions.
///
/// Returns the text before the first chord, then one segment per aligned
/// chord. Chords beyond the last position are not covered.
pub(crate) fn split_at_positions(text: &str, positions: &[usize]) -> (String, Vec<String>) {
    let chars: Vec<char> = text.chars().collect();
    let Some(&first) = positions.first() else {
        return (text.to_string(), Vec::new());
    };

    let clamp = |position: usize| position.min(chars.len());
    let lead: String = chars[..clamp(first)].iter().collect();
    let segments = positions
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = positions.get(i + 1).map_or(chars.len(), |&next| clamp(next));
            chars[clamp(start).min(end)..end].iter().collect()
        })
        .collect();
    (lead, segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(source: &str) -> Document {
        parse(source).unwrap().unwrap()
    }

    #[test]
    fn test_view_mode_names() {
        assert_eq!("full".parse::<ViewMode>(), Ok(ViewMode::Full));
        assert_eq!("Chords".parse::<ViewMode>(), Ok(ViewMode::ChordsOnly));
        assert_eq!("one-line".parse::<ViewMode>(), Ok(ViewMode::OneLine));
        assert!("sheet".parse::<ViewMode>().is_err());
        for mode in ViewMode::ALL {
            assert_eq!(mode.to_string().parse::<ViewMode>(), Ok(mode));
        }
    }

    #[test]
    fn test_no_document_renders_nothing() {
        for mode in ViewMode::ALL {
            assert_eq!(render(None, mode), "");
            assert_eq!(render_source("  \n\n", mode), "");
        }
    }

    #[test]
    fn test_labels_only_fall_back_to_raw_source() {
        let doc = doc("Verse 1\nChorus");
        for mode in ViewMode::ALL {
            let html = render(Some(&doc), mode);
            assert!(html.starts_with("<pre class=\"cm-raw\">"), "{}", html);
            assert!(html.contains("Verse 1\nChorus"));
        }
    }

    #[test]
    fn test_bad_front_matter_shows_source() {
        let html = render_source("---\ntempo: fast\n---\n|C|", ViewMode::Full);
        assert!(html.starts_with("<pre class=\"cm-raw\">"));
        assert!(html.contains("tempo: fast"));
    }

    #[test]
    fn test_every_view_shows_labels() {
        let doc = doc("#c\nC   G\nSing & shout");
        for mode in ViewMode::ALL {
            let html = render(Some(&doc), mode);
            assert!(html.to_uppercase().contains("CHORUS"), "{}: {}", mode, html);
        }
    }

    #[test]
    fn test_text_is_escaped() {
        let doc = doc("#v\nC\nRock & <roll>");
        for mode in [ViewMode::Full, ViewMode::LyricsOnly, ViewMode::OneLine] {
            let html = render(Some(&doc), mode);
            assert!(html.contains("&amp;"), "{}", html);
            assert!(html.contains("&lt;roll&gt;"), "{}", html);
            assert!(!html.contains("<roll>"));
        }
    }

    #[test]
    fn test_split_at_positions() {
        let (lead, segments) = split_at_positions("Amazing grace", &[0, 8]);
        assert_eq!(lead, "");
        assert_eq!(segments, vec!["Amazing ", "grace"]);

        let (lead, segments) = split_at_positions("Oh amazing", &[3]);
        assert_eq!(lead, "Oh ");
        assert_eq!(segments, vec!["amazing"]);

        let (lead, segments) = split_at_positions("hum", &[]);
        assert_eq!(lead, "hum");
        assert!(segments.is_empty());
    }

    #[test]
    fn test_display_symbols() {
        let doc = doc("|C. G|%|Am|");
        let line = doc.chord_lines().next().unwrap();
        assert_eq!(display_symbols(line), vec!["C.", "G", "%", "Am"]);
    }
}
