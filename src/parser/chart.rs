//! Bar-chart front end
//!
//! A single pass over the lines of a chart, with two states: before the first
//! section header and inside a section. Repeat shorthand only ever refers to
//! the bars of the line just before it, so no lookahead or symbol table is
//! needed.

use super::match_header;
use crate::ast::{Bar, ParsedChart, Section, TimeSignature, MAIN_SECTION};
use crate::lexer::{parse_repeat_directive, split_trailing_repeat, tokenize_bar_line};

/// Upper bound for repeat counts
pub const MAX_REPEAT: u32 = 100;

/// Clamp a repeat count to `1..=MAX_REPEAT`
pub(crate) fn clamp_repeat(count: u32) -> u32 {
    if count > MAX_REPEAT {
        log::warn!("Repeat count {} exceeds {}, clamping", count, MAX_REPEAT);
        MAX_REPEAT
    } else {
        count.max(1)
    }
}

struct ChartBuilder {
    sections: Vec<Section>,
    current: Section,
    /// How many times the current section is played (`Chorus x2`)
    repeat: u32,
    /// Bars of the last bar-producing line, for `x N` directives
    last_line: Vec<Bar>,
    beats: u8,
}

impl ChartBuilder {
    fn new(time_signature: TimeSignature) -> Self {
        Self {
            sections: Vec::new(),
            current: Section {
                label: MAIN_SECTION.to_string(),
                bars: Vec::new(),
                implicit: true,
            },
            repeat: 1,
            last_line: Vec::new(),
            beats: time_signature.beats,
        }
    }

    fn start_section(&mut self, label: String, repeat: u32) {
        let next = Section {
            label,
            bars: Vec::new(),
            implicit: false,
        };
        let finished = std::mem::replace(&mut self.current, next);
        let finished_repeat = std::mem::replace(&mut self.repeat, repeat);
        push_section(&mut self.sections, finished, finished_repeat);
        self.last_line.clear();
    }

    fn bar_line(&mut self, content: &str, times: u32) {
        let bars: Vec<Bar> = tokenize_bar_line(content)
            .into_iter()
            .map(|tokens| Bar::new(tokens, self.beats))
            .collect();
        if bars.is_empty() {
            return;
        }
        for _ in 0..times {
            self.current.bars.extend(bars.iter().cloned());
        }
        self.last_line = bars;
    }

    fn repeat_last(&mut self, count: u32) {
        for _ in 1..count {
            self.current.bars.extend(self.last_line.iter().cloned());
        }
    }

    fn line(&mut self, line: &str) {
        if let Some(header) = match_header(line) {
            self.start_section(header.label, clamp_repeat(header.repeat));
            if !header.rest.is_empty() {
                self.content(header.rest);
            }
            return;
        }
        if let Some(count) = parse_repeat_directive(line) {
            self.repeat_last(clamp_repeat(count));
            return;
        }
        self.content(line);
    }

    fn content(&mut self, line: &str) {
        match split_trailing_repeat(line) {
            Some((content, count)) => self.bar_line(content, clamp_repeat(count)),
            None => self.bar_line(line, 1),
        }
    }

    fn finish(self) -> ParsedChart {
        let ChartBuilder {
            mut sections,
            current,
            repeat,
            ..
        } = self;
        push_section(&mut sections, current, repeat);
        ParsedChart { sections }
    }
}

/// Keep a finished section, played `repeat` times; sections without bars are
/// dropped
fn push_section(sections: &mut Vec<Section>, mut section: Section, repeat: u32) {
    if section.bars.is_empty() {
        return;
    }
    let once = section.bars.clone();
    for _ in 1..repeat {
        section.bars.extend(once.iter().cloned());
    }
    sections.push(section);
}

/// Parse a bar chart in 4/4.
///
/// ```
/// use chartmark::parse_chart;
///
/// let chart = parse_chart("|C|G| x3");
/// assert_eq!(chart.labels(), vec!["Main"]);
/// let symbols: Vec<&str> = chart.bars().flat_map(|b| b.symbols()).collect();
/// assert_eq!(symbols, vec!["C", "G", "C", "G", "C", "G"]);
/// ```
pub fn parse_chart(source: &str) -> ParsedChart {
    parse_chart_with(source, TimeSignature::default())
}

/// Parse a bar chart whose bars last `time_signature.beats` beats
pub fn parse_chart_with(source: &str, time_signature: TimeSignature) -> ParsedChart {
    let mut builder = ChartBuilder::new(time_signature);
    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        builder.line(line);
    }
    builder.finish()
}
