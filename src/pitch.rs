//! Pitch representation
//!
//! A [`Pitch`] is a MIDI note number (0-127). It can be spelled as a
//! `{letter, accidental, octave}` triple with [`Pitch::spelled`], using
//! scientific octave numbering (C4 = middle C = MIDI 60).

use serde::Serialize;
use std::fmt;

/// Sharp spellings for the 12 pitch classes, starting at C
const SHARP_NAMES: [(char, Accidental); 12] = [
    ('C', Accidental::Natural),
    ('C', Accidental::Sharp),
    ('D', Accidental::Natural),
    ('D', Accidental::Sharp),
    ('E', Accidental::Natural),
    ('F', Accidental::Natural),
    ('F', Accidental::Sharp),
    ('G', Accidental::Natural),
    ('G', Accidental::Sharp),
    ('A', Accidental::Natural),
    ('A', Accidental::Sharp),
    ('B', Accidental::Natural),
];

/// Flat spellings for the 12 pitch classes, starting at C
const FLAT_NAMES: [(char, Accidental); 12] = [
    ('C', Accidental::Natural),
    ('D', Accidental::Flat),
    ('D', Accidental::Natural),
    ('E', Accidental::Flat),
    ('E', Accidental::Natural),
    ('F', Accidental::Natural),
    ('G', Accidental::Flat),
    ('G', Accidental::Natural),
    ('A', Accidental::Flat),
    ('A', Accidental::Natural),
    ('B', Accidental::Flat),
    ('B', Accidental::Natural),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    pub fn semitones(self) -> i8 {
        match self {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        }
    }
}

/// A MIDI note number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Pitch(pub u8);

/// A pitch spelled with a letter, an accidental and an octave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpelledPitch {
    pub letter: char,
    pub accidental: Accidental,
    pub octave: i8,
}

impl Pitch {
    pub fn midi(self) -> u8 {
        self.0
    }

    pub fn pitch_class(self) -> u8 {
        self.0 % 12
    }

    /// Spell this pitch with sharps or flats.
    ///
    /// ```
    /// use chartmark::pitch::{Accidental, Pitch};
    ///
    /// let spelled = Pitch(61).spelled(true);
    /// assert_eq!(spelled.letter, 'D');
    /// assert_eq!(spelled.accidental, Accidental::Flat);
    /// assert_eq!(spelled.octave, 4);
    /// ```
    pub fn spelled(self, prefer_flats: bool) -> SpelledPitch {
        let (letter, accidental) = spell_pitch_class(self.pitch_class(), prefer_flats);
        SpelledPitch {
            letter,
            accidental,
            octave: (self.0 / 12) as i8 - 1,
        }
    }

    /// Build a pitch from a spelled triple, `None` when it falls outside 0-127
    pub fn from_spelled(spelled: SpelledPitch) -> Option<Self> {
        let base = letter_pitch_class(spelled.letter)? as i16;
        let midi = (spelled.octave as i16 + 1) * 12 + base + spelled.accidental.semitones() as i16;
        if (0..=127).contains(&midi) {
            Some(Pitch(midi as u8))
        } else {
            None
        }
    }
}

impl fmt::Display for SpelledPitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.letter, self.accidental.symbol(), self.octave)
    }
}

/// Pitch class of a natural note letter (case-insensitive)
pub fn letter_pitch_class(letter: char) -> Option<u8> {
    match letter.to_ascii_uppercase() {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Parse a note name (letter + optional accidental) at the start of `s`.
///
/// Returns the pitch class, the accidental and the number of bytes consumed.
/// The letter is case-insensitive and the accidental may be `#`, `b`, `B`,
/// `♯` or `♭`.
pub fn parse_note_name(s: &str) -> Option<(u8, Accidental, usize)> {
    let mut chars = s.chars();
    let letter = chars.next()?;
    let natural = letter_pitch_class(letter)?;
    let mut consumed = letter.len_utf8();

    let accidental = match chars.next() {
        Some(c @ ('#' | '♯')) => {
            consumed += c.len_utf8();
            Accidental::Sharp
        }
        Some(c @ ('b' | 'B' | '♭')) => {
            consumed += c.len_utf8();
            Accidental::Flat
        }
        _ => Accidental::Natural,
    };

    let pitch_class = (natural as i8 + accidental.semitones()).rem_euclid(12) as u8;
    Some((pitch_class, accidental, consumed))
}

/// Letter and accidental for a pitch class
pub fn spell_pitch_class(pitch_class: u8, prefer_flats: bool) -> (char, Accidental) {
    let table = if prefer_flats { &FLAT_NAMES } else { &SHARP_NAMES };
    table[(pitch_class % 12) as usize]
}

/// Note name string for a pitch class, e.g. `"F#"` or `"Gb"`
pub fn note_name(pitch_class: u8, prefer_flats: bool) -> String {
    let (letter, accidental) = spell_pitch_class(pitch_class, prefer_flats);
    format!("{}{}", letter, accidental.symbol())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_name() {
        assert_eq!(parse_note_name("C"), Some((0, Accidental::Natural, 1)));
        assert_eq!(parse_note_name("f#m"), Some((6, Accidental::Sharp, 2)));
        assert_eq!(parse_note_name("Bb7"), Some((10, Accidental::Flat, 2)));
        assert_eq!(parse_note_name("EB"), Some((3, Accidental::Flat, 2)));
        assert_eq!(parse_note_name("Cb"), Some((11, Accidental::Flat, 2)));
        assert_eq!(parse_note_name("H"), None);
        assert_eq!(parse_note_name(""), None);
    }

    #[test]
    fn test_spelling_round_trip() {
        for midi in 0..=127u8 {
            let pitch = Pitch(midi);
            assert_eq!(Pitch::from_spelled(pitch.spelled(false)), Some(pitch));
            assert_eq!(Pitch::from_spelled(pitch.spelled(true)), Some(pitch));
        }
    }

    #[test]
    fn test_middle_c() {
        let spelled = Pitch(60).spelled(false);
        assert_eq!(spelled.to_string(), "C4");
    }

    #[test]
    fn test_note_name() {
        assert_eq!(note_name(6, false), "F#");
        assert_eq!(note_name(6, true), "Gb");
        assert_eq!(note_name(0, true), "C");
    }
}
