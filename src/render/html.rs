//! HTML fragments for the full, chords-only and lyrics-only views

use super::{escape, label_text, split_at_positions};
use crate::ast::{Bar, ChordLine, Document, Line, LyricLine, SectionLabel};

pub(super) fn render_full(doc: &Document) -> String {
    let mut html = open_chart("cm-full", doc);

    let mut lines = doc.lines.iter().peekable();
    while let Some(line) = lines.next() {
        match line {
            Line::Empty => html.push_str("  <div class=\"cm-empty\"></div>\n"),
            Line::Section(label) => html.push_str(&section_header(label)),
            Line::Chords(chords) => {
                // A chord line directly over lyrics is rendered as one aligned line
                if let Some(Line::Lyrics(lyrics)) = lines.peek() {
                    html.push_str(&aligned_line(chords, lyrics));
                    lines.next();
                } else {
                    html.push_str(&chord_line(chords));
                }
            }
            Line::Lyrics(lyrics) => html.push_str(&lyric_line(lyrics)),
            Line::Key(key) => html.push_str(&format!(
                "  <div class=\"cm-key\">Key: {}</div>\n",
                escape(&key.to_string())
            )),
            Line::TimeSignature(ts) => html.push_str(&format!(
                "  <div class=\"cm-time-signature\">{}</div>\n",
                ts
            )),
        }
    }

    html.push_str("</div>\n");
    html
}

pub(super) fn render_chords_only(doc: &Document) -> String {
    let mut html = open_chart("cm-chords-only", doc);

    for line in &doc.lines {
        match line {
            Line::Section(label) => html.push_str(&section_header(label)),
            Line::Chords(chords) => html.push_str(&chord_line(chords)),
            Line::Empty => html.push_str("  <div class=\"cm-empty\"></div>\n"),
            Line::Lyrics(_) | Line::Key(_) | Line::TimeSignature(_) => {}
        }
    }

    html.push_str("</div>\n");
    html
}

pub(super) fn render_lyrics_only(doc: &Document) -> String {
    let mut html = open_chart("cm-lyrics-only", doc);

    for line in &doc.lines {
        match line {
            Line::Section(label) => html.push_str(&section_header(label)),
            Line::Lyrics(lyrics) => html.push_str(&lyric_line(lyrics)),
            Line::Empty => html.push_str("  <div class=\"cm-empty\"></div>\n"),
            Line::Chords(_) | Line::Key(_) | Line::TimeSignature(_) => {}
        }
    }

    html.push_str("</div>\n");
    html
}

fn open_chart(view_class: &str, doc: &Document) -> String {
    let mut html = format!("<div class=\"cm-chart {}\">\n", view_class);

    if let Some(title) = &doc.metadata.title {
        html.push_str(&format!("  <h2 class=\"cm-title\">{}</h2>\n", escape(title)));
    }
    if let Some(artist) = &doc.metadata.artist {
        html.push_str(&format!("  <div class=\"cm-artist\">{}</div>\n", escape(artist)));
    }

    html
}

fn section_header(label: &SectionLabel) -> String {
    let class = if label.copy_of.is_some() {
        "cm-section cm-copy"
    } else {
        "cm-section"
    };
    format!(
        "  <h3 class=\"{}\">{}</h3>\n",
        class,
        escape(&label_text(label))
    )
}

fn repeat_marker(chords: &ChordLine) -> String {
    if chords.repeat > 1 {
        format!("<span class=\"cm-repeat\">x{}</span>", chords.repeat)
    } else {
        String::new()
    }
}

fn bar(bar: &Bar) -> String {
    if bar.repeated {
        return "<span class=\"cm-bar cm-repeated\">%</span>".to_string();
    }
    let chords: Vec<String> = bar
        .chords
        .iter()
        .map(|token| format!("<span class=\"cm-chord\">{}</span>", escape(&token.to_string())))
        .collect();
    format!("<span class=\"cm-bar\">{}</span>", chords.join(" "))
}

/// Bars packed side by side, no alignment spacing
fn chord_line(chords: &ChordLine) -> String {
    let bars: String = chords.bars.iter().map(bar).collect();
    format!(
        "  <div class=\"cm-chord-line\">{}{}</div>\n",
        bars,
        repeat_marker(chords)
    )
}

fn lyric_line(lyrics: &LyricLine) -> String {
    format!("  <div class=\"cm-lyric-line\">{}</div>\n", escape(&lyrics.text))
}

fn pair(chord: &str, lyric: &str) -> String {
    format!(
        "<span class=\"cm-pair\"><span class=\"cm-chord\">{}</span><span class=\"cm-lyric\">{}</span></span>",
        escape(chord),
        escape(lyric)
    )
}

/// Chords stacked over the lyric syllables they are aligned to. Chords
/// without a position follow the lyrics; `%` bars have no column.
fn aligned_line(chords: &ChordLine, lyrics: &LyricLine) -> String {
    let symbols: Vec<String> = chords.tokens().map(|token| token.to_string()).collect();
    let (lead, segments) = split_at_positions(&lyrics.text, &lyrics.positions);
    let aligned = segments.len().min(symbols.len());

    let mut html = String::from("  <div class=\"cm-line\">");
    if !lead.is_empty() {
        html.push_str(&pair("", &lead));
    }
    for (symbol, segment) in symbols.iter().zip(&segments) {
        html.push_str(&pair(symbol, segment));
    }
    // More positions than chords: the rest of the text is unaccompanied
    for segment in segments.iter().skip(aligned) {
        html.push_str(&pair("", segment));
    }
    for symbol in symbols.iter().skip(aligned) {
        html.push_str(&pair(symbol, ""));
    }
    html.push_str(&repeat_marker(chords));
    html.push_str("</div>\n");
    html
}
