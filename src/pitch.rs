//! # Pitch Table
//!
//! Static lookups between the three parallel representations of a pitch:
//!
//! - **Staff offset** - vertical drawing offset on a treble staff
//! - **Sample key** - identifier handed to the audio subsystem
//! - **Fretboard position** - string/fret pair in standard tuning
//!
//! ## Staff Geometry
//! Offsets grow downwards, in pixels, with the top staff line (F5) at `0.0`.
//! Each diatonic step is half a line spacing ([`STAFF_STEP`]):
//!
//! ```text
//!  0.0  ───── F5
//! 10.0  ───── D5
//! 20.0  ───── B4   <- fallback offset
//! 30.0  ───── G4
//! 40.0  ───── E4
//! 50.0   (C4, ledger line)
//! ```
//!
//! ## Fallbacks
//! Lookups by name never fail. Unknown names draw on the middle line
//! ([`FALLBACK_STAFF_OFFSET`]) and play the default sample ([`DEFAULT_SAMPLE_KEY`]).

use serde::{Deserialize, Deserializer, Serialize};

/// Half the distance between two staff lines
pub const STAFF_STEP: f64 = 5.0;

/// Offset used for rests and unknown pitch names (middle staff line)
pub const FALLBACK_STAFF_OFFSET: f64 = 20.0;

/// Sample played when a pitch has no sample of its own
pub const DEFAULT_SAMPLE_KEY: &str = "C4";

/// Open-string MIDI notes in standard tuning, string 1 (high E) first
pub const STANDARD_TUNING: [u8; 6] = [64, 59, 55, 50, 45, 40];

/// Highest fret accepted in pattern data
pub const MAX_FRET: u8 = 24;

/// Staff offset of the bottom line (E4)
const BOTTOM_LINE_OFFSET: f64 = 40.0;

/// Diatonic position of E4 within [`Pitch::ALL`]
const BOTTOM_LINE_STEP: i32 = 7;

/// A supported pitch, or the rest sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Pitch {
    E3,
    F3,
    G3,
    A3,
    B3,
    C4,
    D4,
    E4,
    F4,
    G4,
    A4,
    B4,
    C5,
    D5,
    E5,
    F5,
    G5,
    Rest,
}

impl Pitch {
    /// Every sounding pitch in ascending diatonic order
    pub const ALL: [Pitch; 17] = [
        Pitch::E3,
        Pitch::F3,
        Pitch::G3,
        Pitch::A3,
        Pitch::B3,
        Pitch::C4,
        Pitch::D4,
        Pitch::E4,
        Pitch::F4,
        Pitch::G4,
        Pitch::A4,
        Pitch::B4,
        Pitch::C5,
        Pitch::D5,
        Pitch::E5,
        Pitch::F5,
        Pitch::G5,
    ];

    /// Parse a pitch name like "C4" or "rest"
    pub fn from_name(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        if trimmed.eq_ignore_ascii_case("rest") || trimmed == "R" {
            return Some(Pitch::Rest);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(trimmed))
    }

    pub fn name(self) -> &'static str {
        match self {
            Pitch::E3 => "E3",
            Pitch::F3 => "F3",
            Pitch::G3 => "G3",
            Pitch::A3 => "A3",
            Pitch::B3 => "B3",
            Pitch::C4 => "C4",
            Pitch::D4 => "D4",
            Pitch::E4 => "E4",
            Pitch::F4 => "F4",
            Pitch::G4 => "G4",
            Pitch::A4 => "A4",
            Pitch::B4 => "B4",
            Pitch::C5 => "C5",
            Pitch::D5 => "D5",
            Pitch::E5 => "E5",
            Pitch::F5 => "F5",
            Pitch::G5 => "G5",
            Pitch::Rest => "rest",
        }
    }

    pub fn is_rest(self) -> bool {
        self == Pitch::Rest
    }

    /// Concert MIDI note number, `None` for rests
    pub fn midi_note(self) -> Option<u8> {
        let midi = match self {
            Pitch::E3 => 52,
            Pitch::F3 => 53,
            Pitch::G3 => 55,
            Pitch::A3 => 57,
            Pitch::B3 => 59,
            Pitch::C4 => 60,
            Pitch::D4 => 62,
            Pitch::E4 => 64,
            Pitch::F4 => 65,
            Pitch::G4 => 67,
            Pitch::A4 => 69,
            Pitch::B4 => 71,
            Pitch::C5 => 72,
            Pitch::D5 => 74,
            Pitch::E5 => 76,
            Pitch::F5 => 77,
            Pitch::G5 => 79,
            Pitch::Rest => return None,
        };
        Some(midi)
    }

    /// Vertical drawing offset on the staff
    ///
    /// # Example
    /// ```rust
    /// use fretscroll::pitch::{Pitch, FALLBACK_STAFF_OFFSET};
    ///
    /// assert_eq!(Pitch::E4.staff_offset(), 40.0);
    /// assert_eq!(Pitch::C4.staff_offset(), 50.0);
    /// assert_eq!(Pitch::Rest.staff_offset(), FALLBACK_STAFF_OFFSET);
    /// ```
    pub fn staff_offset(self) -> f64 {
        match Self::ALL.iter().position(|p| *p == self) {
            Some(step) => BOTTOM_LINE_OFFSET - (step as i32 - BOTTOM_LINE_STEP) as f64 * STAFF_STEP,
            None => FALLBACK_STAFF_OFFSET,
        }
    }

    /// Identifier passed to the audio subsystem
    ///
    /// Identity for sounding pitches; rests map to the default sample.
    pub fn sample_key(self) -> &'static str {
        if self.is_rest() {
            DEFAULT_SAMPLE_KEY
        } else {
            self.name()
        }
    }
}

/// Accepts every name [`Pitch::from_name`] does
impl<'de> Deserialize<'de> for Pitch {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Pitch::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown pitch '{}'", name)))
    }
}

impl std::fmt::Display for Pitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Staff offset for an arbitrary pitch name, falling back to the middle line
pub fn staff_offset(name: &str) -> f64 {
    Pitch::from_name(name)
        .map(Pitch::staff_offset)
        .unwrap_or(FALLBACK_STAFF_OFFSET)
}

/// Sample key for an arbitrary pitch name, falling back to [`DEFAULT_SAMPLE_KEY`]
///
/// # Example
/// ```rust
/// use fretscroll::pitch::{sample_key, DEFAULT_SAMPLE_KEY};
///
/// assert_eq!(sample_key("G4"), "G4");
/// assert_eq!(sample_key("Z9"), DEFAULT_SAMPLE_KEY);
/// ```
pub fn sample_key(name: &str) -> &'static str {
    Pitch::from_name(name)
        .map(Pitch::sample_key)
        .unwrap_or(DEFAULT_SAMPLE_KEY)
}

/// MIDI note sounding at `fret` on `string` (1 = high E) in standard tuning
pub fn sounding_midi(string: u8, fret: u8) -> Option<u8> {
    if !(1..=6).contains(&string) || fret > MAX_FRET {
        return None;
    }
    Some(STANDARD_TUNING[usize::from(string - 1)] + fret)
}
