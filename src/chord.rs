//! Chord symbol resolution
//!
//! Parses chord symbols (C, Am7, F#sus4, C/G, ...) into a structured [`Chord`]
//! and resolves them to concrete MIDI pitches for playback.
//!
//! Resolution is lenient: an unknown root resolves to no pitches (silence) and
//! an unknown quality degrades to the triad of the root. Nothing in here
//! panics or returns an error except the strict [`std::str::FromStr`] impl.

use crate::error::ChartError;
use crate::pitch::{note_name, parse_note_name, Accidental, Pitch};
use std::fmt;
use std::str::FromStr;

/// MIDI note of the C the voicings are built on (C3)
const VOICING_BASE: u8 = 48;

/// Chord quality with its interval structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Major,
    Minor,
    Power,
    Dominant7,
    Major7,
    Minor7,
    MinorMajor7,
    Major6,
    Minor6,
    SixNine,
    Dominant9,
    Major9,
    Minor9,
    Add9,
    MinorAdd9,
    Sus2,
    Sus4,
    SevenSus4,
    Diminished,
    Diminished7,
    HalfDiminished,
    Augmented,
}

impl Quality {
    /// Semitone intervals above the root
    pub fn intervals(self) -> &'static [u8] {
        match self {
            Quality::Major => &[0, 4, 7],
            Quality::Minor => &[0, 3, 7],
            Quality::Power => &[0, 7],
            Quality::Dominant7 => &[0, 4, 7, 10],
            Quality::Major7 => &[0, 4, 7, 11],
            Quality::Minor7 => &[0, 3, 7, 10],
            Quality::MinorMajor7 => &[0, 3, 7, 11],
            Quality::Major6 => &[0, 4, 7, 9],
            Quality::Minor6 => &[0, 3, 7, 9],
            Quality::SixNine => &[0, 4, 7, 9, 14],
            Quality::Dominant9 => &[0, 4, 7, 10, 14],
            Quality::Major9 => &[0, 4, 7, 11, 14],
            Quality::Minor9 => &[0, 3, 7, 10, 14],
            Quality::Add9 => &[0, 4, 7, 14],
            Quality::MinorAdd9 => &[0, 3, 7, 14],
            Quality::Sus2 => &[0, 2, 7],
            Quality::Sus4 => &[0, 5, 7],
            Quality::SevenSus4 => &[0, 5, 7, 10],
            Quality::Diminished => &[0, 3, 6],
            Quality::Diminished7 => &[0, 3, 6, 9],
            Quality::HalfDiminished => &[0, 3, 6, 10],
            Quality::Augmented => &[0, 4, 8],
        }
    }

    /// Canonical suffix used in normalized symbols
    pub fn suffix(self) -> &'static str {
        match self {
            Quality::Major => "",
            Quality::Minor => "m",
            Quality::Power => "5",
            Quality::Dominant7 => "7",
            Quality::Major7 => "maj7",
            Quality::Minor7 => "m7",
            Quality::MinorMajor7 => "mMaj7",
            Quality::Major6 => "6",
            Quality::Minor6 => "m6",
            Quality::SixNine => "6/9",
            Quality::Dominant9 => "9",
            Quality::Major9 => "maj9",
            Quality::Minor9 => "m9",
            Quality::Add9 => "add9",
            Quality::MinorAdd9 => "madd9",
            Quality::Sus2 => "sus2",
            Quality::Sus4 => "sus4",
            Quality::SevenSus4 => "7sus4",
            Quality::Diminished => "dim",
            Quality::Diminished7 => "dim7",
            Quality::HalfDiminished => "m7b5",
            Quality::Augmented => "aug",
        }
    }

    /// Look up a quality suffix. Parentheses are ignored, so `m(maj7)` and
    /// `mmaj7` are the same thing.
    fn from_suffix(suffix: &str) -> Option<Self> {
        let cleaned: String = suffix.chars().filter(|c| *c != '(' && *c != ')').collect();
        let quality = match cleaned.as_str() {
            "" | "maj" | "M" | "major" => Quality::Major,
            "m" | "min" | "-" | "minor" => Quality::Minor,
            "5" => Quality::Power,
            "7" | "dom7" => Quality::Dominant7,
            "maj7" | "Maj7" | "M7" | "ma7" | "Δ" | "Δ7" => Quality::Major7,
            "m7" | "min7" | "-7" => Quality::Minor7,
            "mMaj7" | "mmaj7" | "mM7" | "minMaj7" | "-maj7" => Quality::MinorMajor7,
            "6" => Quality::Major6,
            "m6" | "min6" | "-6" => Quality::Minor6,
            "6/9" | "69" => Quality::SixNine,
            "9" => Quality::Dominant9,
            "maj9" | "Maj9" | "M9" => Quality::Major9,
            "m9" | "min9" | "-9" => Quality::Minor9,
            "add9" | "add2" | "2" => Quality::Add9,
            "madd9" | "minadd9" | "-add9" => Quality::MinorAdd9,
            "sus2" => Quality::Sus2,
            "sus4" | "sus" => Quality::Sus4,
            "7sus4" | "7sus" => Quality::SevenSus4,
            "dim" | "°" | "o" => Quality::Diminished,
            "dim7" | "°7" | "o7" => Quality::Diminished7,
            "m7b5" | "min7b5" | "-7b5" | "ø" | "ø7" => Quality::HalfDiminished,
            "aug" | "+" | "+5" => Quality::Augmented,
            _ => return None,
        };
        Some(quality)
    }
}

/// True when a quality suffix starts with a minor marker (`m`, `min`, `-`)
/// rather than `maj`
fn has_minor_marker(suffix: &str) -> bool {
    if suffix.starts_with('-') || suffix.starts_with("min") {
        return true;
    }
    suffix.starts_with('m') && !suffix.to_ascii_lowercase().starts_with("maj")
}

/// A parsed chord symbol
#[derive(Debug, Clone, PartialEq)]
pub struct Chord {
    /// Pitch class of the root (0 = C)
    pub root: u8,
    pub root_accidental: Accidental,
    pub quality: Quality,
    /// The quality text as written (without root and bass)
    pub suffix: String,
    /// True when `suffix` was not understood and `quality` is a fallback triad
    pub degraded: bool,
    /// Pitch class and accidental of a slash bass
    pub bass: Option<(u8, Accidental)>,
}

impl Chord {
    /// Parse a chord symbol leniently.
    ///
    /// Returns `None` only when the symbol does not start with a note name.
    ///
    /// ```
    /// use chartmark::chord::{Chord, Quality};
    ///
    /// let chord = Chord::parse("f#min7").unwrap();
    /// assert_eq!(chord.root, 6);
    /// assert_eq!(chord.quality, Quality::Minor7);
    /// assert_eq!(chord.normalized(), "F#m7");
    ///
    /// assert!(Chord::parse("N.C.").is_none());
    /// ```
    pub fn parse(symbol: &str) -> Option<Self> {
        let symbol = symbol.trim();
        let (body, bass) = split_slash_bass(symbol);

        let (root, root_accidental, consumed) = parse_note_name(body)?;
        let suffix = &body[consumed..];

        let (quality, degraded) = match Quality::from_suffix(suffix) {
            Some(quality) => (quality, false),
            None => {
                let fallback = if has_minor_marker(suffix) {
                    Quality::Minor
                } else {
                    Quality::Major
                };
                log::debug!("Unknown chord quality '{}' in '{}'", suffix, symbol);
                (fallback, true)
            }
        };

        Some(Self {
            root,
            root_accidental,
            quality,
            suffix: suffix.to_string(),
            degraded,
            bass,
        })
    }

    /// Resolve to MIDI pitches, lowest first.
    ///
    /// The voicing is built on the root in the C3 octave. A slash bass becomes
    /// the lowest note and any other occurrence of its pitch class is removed
    /// from the voicing above it.
    pub fn pitches(&self) -> Vec<Pitch> {
        let root_midi = VOICING_BASE + self.root;
        let mut notes: Vec<u8> = self
            .quality
            .intervals()
            .iter()
            .map(|interval| root_midi + interval)
            .collect();

        if let Some((bass_pc, _)) = self.bass {
            notes.retain(|note| note % 12 != bass_pc);
            let lowest = notes.first().copied().unwrap_or(root_midi);
            let mut distance = (lowest as i16 % 12 - bass_pc as i16).rem_euclid(12) as u8;
            if distance == 0 {
                distance = 12;
            }
            notes.insert(0, lowest - distance);
        }

        notes.into_iter().map(Pitch).collect()
    }

    /// Canonical spelling of the symbol. Degraded qualities keep their
    /// original text.
    pub fn normalized(&self) -> String {
        let suffix = if self.degraded {
            self.suffix.as_str()
        } else {
            self.quality.suffix()
        };
        self.spell(self.root, self.root_accidental == Accidental::Flat, suffix)
    }

    /// Symbol with the root and bass spelled from the given pitch classes and
    /// the suffix kept as written. Used by transposition.
    pub(crate) fn respelled(&self, root: u8, bass: Option<u8>, prefer_flats: bool) -> String {
        let mut out = note_name(root, prefer_flats);
        out.push_str(&self.suffix);
        if let Some(bass) = bass {
            out.push('/');
            out.push_str(&note_name(bass, prefer_flats));
        }
        out
    }

    fn spell(&self, root: u8, root_flat: bool, suffix: &str) -> String {
        let mut out = note_name(root, root_flat);
        out.push_str(suffix);
        if let Some((bass, accidental)) = self.bass {
            out.push('/');
            out.push_str(&note_name(bass, accidental == Accidental::Flat));
        }
        out
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized())
    }
}

impl FromStr for Chord {
    type Err = ChartError;

    /// Strict parsing: unknown roots and unknown qualities are errors.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Chord::parse(s) {
            Some(chord) if !chord.degraded => Ok(chord),
            _ => Err(ChartError::InvalidChord(s.trim().to_string())),
        }
    }
}

/// Split `C/G` into `("C", Some(G))`. When the part after the last `/` is not
/// a note name (as in `C6/9`) the symbol is returned whole.
fn split_slash_bass(symbol: &str) -> (&str, Option<(u8, Accidental)>) {
    if let Some(slash) = symbol.rfind('/') {
        let bass = &symbol[slash + 1..];
        if let Some((pitch_class, accidental, consumed)) = parse_note_name(bass) {
            if consumed == bass.len() && slash > 0 {
                return (&symbol[..slash], Some((pitch_class, accidental)));
            }
        }
    }
    (symbol, None)
}

/// Resolve a chord symbol to MIDI pitches.
///
/// Unknown roots give an empty vector, which callers treat as silence.
///
/// # Examples
/// ```
/// use chartmark::chord::resolve;
/// use chartmark::pitch::Pitch;
///
/// // C major: C3, E3, G3
/// assert_eq!(resolve("C"), vec![Pitch(48), Pitch(52), Pitch(55)]);
///
/// // Power chord: root and fifth
/// assert_eq!(resolve("E5"), vec![Pitch(52), Pitch(59)]);
///
/// // C/G: G2 in the bass, no second G above
/// assert_eq!(resolve("C/G"), vec![Pitch(43), Pitch(48), Pitch(52)]);
///
/// assert!(resolve("%").is_empty());
/// ```
pub fn resolve(symbol: &str) -> Vec<Pitch> {
    Chord::parse(symbol).map(|chord| chord.pitches()).unwrap_or_default()
}
