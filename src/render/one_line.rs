//! Condensed view: chords inlined into lyric text as `[C]Amazing [G]grace`

use super::{display_symbols, escape, label_text};
use crate::ast::{ChordLine, Document, Line, LyricLine};

pub(super) fn render_one_line(doc: &Document) -> String {
    let mut html = String::from("<div class=\"cm-chart cm-one-line\">\n");

    let mut lines = doc.lines.iter().peekable();
    while let Some(line) = lines.next() {
        let text = match line {
            Line::Section(label) => format!("[{}]", label_text(label).to_uppercase()),
            Line::Chords(chords) => {
                if let Some(Line::Lyrics(lyrics)) = lines.peek() {
                    lines.next();
                    inline_chords(chords, lyrics)
                } else {
                    bracketed(display_symbols(chords).iter()).join(" ")
                }
            }
            Line::Lyrics(lyrics) => lyrics.text.clone(),
            // Blank lines, key and time changes are dropped
            Line::Empty | Line::Key(_) | Line::TimeSignature(_) => continue,
        };
        html.push_str(&format!("  <div class=\"cm-line\">{}</div>\n", escape(&text)));
    }

    html.push_str("</div>\n");
    html
}

fn bracketed<'a>(symbols: impl Iterator<Item = &'a String>) -> Vec<String> {
    symbols.map(|symbol| format!("[{}]", symbol)).collect()
}

/// Insert each chord before the lyric character it is aligned to; chords
/// without a position are appended after the text.
fn inline_chords(chords: &ChordLine, lyrics: &LyricLine) -> String {
    let symbols: Vec<String> = chords.tokens().map(|token| token.to_string()).collect();
    let chars: Vec<char> = lyrics.text.chars().collect();
    let aligned = lyrics.positions.len().min(symbols.len());

    let mut text = String::with_capacity(lyrics.text.len() + symbols.len() * 4);
    let mut last = 0;
    for (symbol, &position) in symbols.iter().zip(&lyrics.positions) {
        let position = position.clamp(last, chars.len());
        text.extend(&chars[last..position]);
        text.push_str(&format!("[{}]", symbol));
        last = position;
    }
    text.extend(&chars[last..]);

    for leftover in bracketed(symbols[aligned..].iter()) {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&leftover);
    }
    text
}
