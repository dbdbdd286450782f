//! # Semantic Validation Module
//!
//! This module checks a parsed chart before it is exported.
//!
//! ## Purpose
//! Parsing never fails on chart content: unknown chords, empty sections and
//! stray tokens all parse to something. Exporting a chart needs more than
//! that, so this module provides two levels of checking:
//! - [`validate`] - hard preconditions for MIDI export
//! - [`lint`] - non-fatal diagnostics about individual chord symbols
//!
//! ## Validation Rules
//!
//! ### Sections
//! - The chart must contain at least one section with bars
//!
//! ### Chords
//! - At least one chord symbol must resolve to notes
//! - `%`, `NC` and empty bars are silence, not chords
//!
//! ## Lint Rules
//! - A symbol that does not start with a note name cannot be played
//! - A symbol with an unknown quality plays as a plain triad
//!
//! ## Example
//! ```rust
//! use chartmark::parser::{parse_as, Dialect};
//! use chartmark::{lint, parse, validate, ChartError};
//!
//! let doc = parse_as("Verse 1\n|C|H7|Am11|", Dialect::Chart).unwrap().unwrap();
//! assert!(validate(&doc).is_ok());
//!
//! let diagnostics = lint(&doc);
//! assert_eq!(diagnostics.len(), 2);
//! assert_eq!(diagnostics[0].to_string(), "Verse 1, bar 2: 'H7' is not a chord and will not sound");
//!
//! let doc = parse("Intro\n|N.C.|%|").unwrap().unwrap();
//! assert_eq!(validate(&doc), Err(ChartError::NoChords));
//! ```
//!
//! ## Related Modules
//! - `chord` - Resolves the symbols checked here
//! - `api` - Runs `validate` before MIDI export

use serde::Serialize;
use std::fmt;

use crate::ast::{ChordToken, Document, Line, ParsedChart, MAIN_SECTION};
use crate::chord::{resolve, Chord};
use crate::error::ChartError;
use crate::lexer::is_no_chord;

/// Validate a document for export
///
/// Checks two rules:
/// 1. There is at least one section with bars
/// 2. At least one chord resolves to notes
pub fn validate(doc: &Document) -> Result<(), ChartError> {
    let chart = doc.sections();
    validate_sections(&chart)?;
    validate_chords(&chart)?;
    Ok(())
}

fn validate_sections(chart: &ParsedChart) -> Result<(), ChartError> {
    if chart.sections.is_empty() {
        return Err(ChartError::NoSections);
    }
    Ok(())
}

fn validate_chords(chart: &ParsedChart) -> Result<(), ChartError> {
    let playable = chart
        .bars()
        .flat_map(|bar| bar.chords.iter())
        .any(|token| !resolve(&token.symbol).is_empty());
    if !playable {
        return Err(ChartError::NoChords);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LintKind {
    /// No note name at the start of the symbol
    UnresolvableChord,
    /// Known root, unknown quality
    DegradedQuality,
}

/// A problem with one chord symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: LintKind,
    pub section: String,
    /// 1-based bar number within the section, as written
    pub bar: usize,
    pub symbol: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let problem = match self.kind {
            LintKind::UnresolvableChord => "is not a chord and will not sound",
            LintKind::DegradedQuality => "has an unknown quality and plays as a triad",
        };
        write!(f, "{}, bar {}: '{}' {}", self.section, self.bar, self.symbol, problem)
    }
}

/// Report chord symbols that will not play as written.
///
/// Bars are counted as the document holds them: copied sections and the
/// `x N` line repeats of Chordmark text are not expanded.
pub fn lint(doc: &Document) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut section = MAIN_SECTION.to_string();
    let mut bar_number = 0;

    for line in &doc.lines {
        match line {
            Line::Section(label) => {
                section = label.label.clone();
                bar_number = 0;
            }
            Line::Chords(chords) => {
                for bar in &chords.bars {
                    bar_number += 1;
                    diagnostics.extend(
                        bar.chords
                            .iter()
                            .filter_map(check_token)
                            .map(|(kind, symbol)| Diagnostic {
                                kind,
                                section: section.clone(),
                                bar: bar_number,
                                symbol,
                            }),
                    );
                }
            }
            Line::Empty | Line::Lyrics(_) | Line::Key(_) | Line::TimeSignature(_) => {}
        }
    }

    diagnostics
}

fn check_token(token: &ChordToken) -> Option<(LintKind, String)> {
    let symbol = token.symbol.trim();
    if symbol.is_empty() || token.is_rest() || is_no_chord(symbol) {
        return None;
    }
    match Chord::parse(symbol) {
        None => Some((LintKind::UnresolvableChord, symbol.to_string())),
        Some(chord) if chord.degraded => Some((LintKind::DegradedQuality, symbol.to_string())),
        Some(_) => None,
    }
}
