//! Bar line tokenizer
//!
//! Splits a single line of chart text into bars (`|` delimited) and the chord
//! tokens of each bar. Also hosts the small line-level recognizers shared by
//! both front ends: chord-symbol classification and the `x N` repeat
//! shorthand.

use crate::ast::ChordToken;
use once_cell::sync::Lazy;
use regex::Regex;

/// Chord symbol syntax used to tell pipe-less chord lines from lyric lines.
/// Roots are case-insensitive. A bare `o` is not a diminished mark, so
/// words like "Go" stay lyrics; `o7` and `°` are.
static CHORD_SYMBOL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Ga-g](?:#|b|♯|♭)?(?:maj|Maj|min|m|M|dim|aug|sus|add|alt|dom|[0-9]|\+|-|°|ø|Δ|o[0-9]|\(|\)|#|b|♯|♭|/[0-9]+)*(?:/[A-Ga-g](?:#|b|♯|♭)?)?$",
    )
    .expect("chord symbol regex")
});

/// Standalone repeat directive: `x3`, `x 3`, `X 12`
static REPEAT_DIRECTIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^x\s*(\d+)$").expect("repeat directive regex"));

/// Bar content followed by a repeat count: `|C|G| x3`, `C G x 2`
static TRAILING_REPEAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<content>.*?(?:\||\s))\s*x\s*(?P<count>\d+)\s*$")
        .expect("trailing repeat regex")
});

/// A chord token together with the character column it starts at
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedToken {
    pub token: ChordToken,
    pub column: usize,
}

/// Tokenize one line into bars of chord tokens.
///
/// - Bars are separated by `|`. Blank segments are dropped, so `|C|G|` gives
///   two bars, except on a line made only of pipes and whitespace where every
///   segment after the first pipe is kept as an empty bar (`| |` gives two).
/// - `…` counts as `.`.
/// - A standalone `.` extends the previous token of the bar with a duration
///   dot; with no previous token it is dropped.
///
/// ```
/// use chartmark::lexer::tokenize_bar_line;
///
/// let bars = tokenize_bar_line("|C . G|Am…|");
/// assert_eq!(bars.len(), 2);
/// assert_eq!(bars[0][0].symbol, "C");
/// assert_eq!(bars[0][0].dots, 1);
/// assert_eq!(bars[1][0].dots, 1);
///
/// let empty = tokenize_bar_line("| |");
/// assert_eq!(empty.len(), 2);
/// assert!(empty.iter().all(|bar| bar.is_empty()));
/// assert!(tokenize_bar_line("").is_empty());
/// ```
pub fn tokenize_bar_line(line: &str) -> Vec<Vec<ChordToken>> {
    scan_bar_line(line)
        .into_iter()
        .map(|bar| bar.into_iter().map(|scanned| scanned.token).collect())
        .collect()
}

/// Same as [`tokenize_bar_line`], keeping the column of every token
pub fn scan_bar_line(line: &str) -> Vec<Vec<ScannedToken>> {
    let chars: Vec<char> = line
        .chars()
        .map(|c| if c == '…' { '.' } else { c })
        .collect();

    if chars.iter().all(|c| c.is_whitespace()) {
        return Vec::new();
    }

    // (start column, characters) of each pipe-delimited segment
    let mut segments: Vec<(usize, &[char])> = Vec::new();
    let mut start = 0;
    for (i, c) in chars.iter().enumerate() {
        if *c == '|' {
            segments.push((start, &chars[start..i]));
            start = i + 1;
        }
    }
    segments.push((start, &chars[start..]));

    let pipes_only = chars.iter().all(|c| *c == '|' || c.is_whitespace());
    if pipes_only {
        return segments.iter().skip(1).map(|_| Vec::new()).collect();
    }

    segments
        .into_iter()
        .filter(|(_, segment)| segment.iter().any(|c| !c.is_whitespace()))
        .map(|(offset, segment)| scan_bar(offset, segment))
        .collect()
}

/// Tokenize the inside of one bar
fn scan_bar(offset: usize, segment: &[char]) -> Vec<ScannedToken> {
    let mut tokens: Vec<ScannedToken> = Vec::new();
    let mut i = 0;

    while i < segment.len() {
        if segment[i].is_whitespace() {
            i += 1;
            continue;
        }
        let word_start = i;
        while i < segment.len() && !segment[i].is_whitespace() {
            i += 1;
        }
        let word: String = segment[word_start..i].iter().collect();

        if word.chars().all(|c| c == '.') {
            if let Some(previous) = tokens.last_mut() {
                let dots = previous.token.dots as usize + word.len();
                previous.token.dots = dots.min(u8::MAX as usize) as u8;
            }
            continue;
        }

        tokens.push(ScannedToken {
            token: ChordToken::parse(&word),
            column: offset + word_start,
        });
    }

    tokens
}

/// Whether a whitespace-separated word reads as a chord-line token: a chord
/// symbol with optional duration dots, the `%` marker, a no-chord mark or a
/// lone run of dots.
pub fn is_chord_symbol(word: &str) -> bool {
    let word = word.replace('…', ".");
    let symbol = word.trim_end_matches('.');
    if symbol.is_empty() || symbol == "%" {
        return true;
    }
    is_no_chord(symbol) || CHORD_SYMBOL_RE.is_match(symbol)
}

/// `NC`, `N.C.` or `N/C`: an explicit no-chord mark
pub fn is_no_chord(symbol: &str) -> bool {
    matches!(symbol.trim_end_matches('.'), "NC" | "N.C" | "N/C")
}

/// Whether a line is bar content.
///
/// Any line with a `|` is bars, whatever its tokens: an unknown token
/// becomes a silent slot. Without pipes every word must read as a chord
/// token and at least one must be more than dots.
pub fn is_bar_line(line: &str) -> bool {
    if line.contains('|') {
        return true;
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    words.iter().all(|word| is_chord_symbol(word))
        && words
            .iter()
            .any(|word| !word.trim_end_matches(['.', '…']).is_empty())
}

/// Recognize a line that is only a repeat count (`x3`, `x 3`)
pub fn parse_repeat_directive(line: &str) -> Option<u32> {
    let captures = REPEAT_DIRECTIVE_RE.captures(line.trim())?;
    Some(parse_count(&captures[1]))
}

/// Split `<bar content> x <N>` into the content and the count
pub fn split_trailing_repeat(line: &str) -> Option<(&str, u32)> {
    let captures = TRAILING_REPEAT_RE.captures(line.trim_end())?;
    let content = captures.name("content")?.as_str().trim();
    if content.is_empty() {
        return None;
    }
    let count = parse_count(&captures["count"]);
    Some((content, count))
}

/// Counts too large for a `u32` saturate; callers clamp them anyway
fn parse_count(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}
