//! Chart text output
//!
//! Writes the flattened sections of a document as a bar chart: a `Label:`
//! line per section, four bars per line, `%` for repeated bars and lines of
//! bare pipes for runs of empty bars. Repeats come out expanded, so parsing
//! the text again yields the same sections, bar counts and chord symbols.

use crate::ast::{Bar, Document, RawMetadata, Section};

const BARS_PER_LINE: usize = 4;

/// Serialize a document back to bar-chart text.
///
/// Front matter is written when the document carries any metadata.
///
/// ```
/// use chartmark::{parse, serialize};
///
/// let doc = parse("#c x2\nC   G\nSing it").unwrap().unwrap();
/// assert_eq!(serialize(&doc), "Chorus:\n|C G|C G|\n");
/// ```
pub fn serialize(doc: &Document) -> String {
    let mut out = front_matter(doc);

    let chart = doc.sections();
    let blocks: Vec<String> = chart.sections.iter().map(section_text).collect();
    out.push_str(&blocks.join("\n"));
    out
}

fn front_matter(doc: &Document) -> String {
    let raw = RawMetadata::from(&doc.metadata);
    if raw == RawMetadata::default() {
        return String::new();
    }
    match serde_yaml::to_string(&raw) {
        Ok(yaml) => format!("---\n{}---\n\n", yaml),
        Err(e) => {
            log::warn!("Leaving out front matter: {}", e);
            String::new()
        }
    }
}

fn section_text(section: &Section) -> String {
    let mut text = String::new();
    if !section.implicit {
        text.push_str(&header_text(&section.label));
        text.push_str(":\n");
    }
    for line in bar_lines(&section.bars) {
        text.push_str(&line);
        text.push('\n');
    }
    text
}

/// A label that reads back as a header: no bar or colon characters and
/// starting with a letter or digit
fn header_text(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| if c == '|' || c == ':' { ' ' } else { c })
        .skip_while(|c| !c.is_alphanumeric())
        .collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<&str>>().join(" ");
    if cleaned.is_empty() {
        "Section".to_string()
    } else {
        cleaned
    }
}

/// Group bars into output lines. Empty bars only survive on a line of bare
/// pipes, where `k` pipes stand for `k` bars.
fn bar_lines(bars: &[Bar]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut index = 0;

    while index < bars.len() {
        let empty = bars[index].is_empty();
        let run = bars[index..]
            .iter()
            .take_while(|bar| bar.is_empty() == empty)
            .count();

        if empty {
            lines.push(vec!["|"; run].join(" "));
        } else {
            for chunk in bars[index..index + run].chunks(BARS_PER_LINE) {
                let cells: String = chunk.iter().map(|bar| format!("{}|", bar_text(bar))).collect();
                lines.push(format!("|{}", cells));
            }
        }
        index += run;
    }

    lines
}

fn bar_text(bar: &Bar) -> String {
    if bar.repeated {
        return "%".to_string();
    }
    bar.chords
        .iter()
        .map(|token| token.to_string())
        .collect::<Vec<String>>()
        .join(" ")
}
