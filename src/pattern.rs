//! # Pattern Catalog
//!
//! Patterns are short musical phrases, each an ordered list of
//! pitch/fret/string triples. Order is playback order.
//!
//! The catalog is fixed once built and always holds at least one pattern,
//! so [`PatternCatalog::pick_random`] cannot fail. Randomness comes from the
//! caller so sessions can be seeded.
//!
//! ## Custom Catalogs
//! A catalog can be read from YAML:
//!
//! ```rust
//! use fretscroll::PatternCatalog;
//!
//! let yaml = r#"
//! - name: Open E
//!   notes:
//!     - { pitch: E4, fret: 0, string: 1 }
//!     - { pitch: B3, fret: 0, string: 2 }
//! "#;
//!
//! let catalog = PatternCatalog::from_yaml(yaml).unwrap();
//! assert_eq!(catalog.len(), 1);
//! assert_eq!(catalog.get(0).unwrap().notes.len(), 2);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::TrainerError;
use crate::pitch::{sounding_midi, Pitch, MAX_FRET};

/// One playable position on a six-string guitar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternEntry {
    pub pitch: Pitch,
    pub fret: u8,
    /// 1 = high E, 6 = low E
    pub string: u8,
}

impl PatternEntry {
    pub const fn new(pitch: Pitch, fret: u8, string: u8) -> Self {
        Self { pitch, fret, string }
    }

    /// Whether the fret/string pair actually sounds the written pitch.
    ///
    /// Rests are always consistent.
    pub fn is_consistent(&self) -> bool {
        match self.pitch.midi_note() {
            Some(midi) => sounding_midi(self.string, self.fret) == Some(midi),
            None => true,
        }
    }

    fn check_position(&self) -> Result<(), String> {
        if !(1..=6).contains(&self.string) {
            return Err(format!("string {} is outside 1..=6", self.string));
        }
        if self.fret > MAX_FRET {
            return Err(format!("fret {} is above {}", self.fret, MAX_FRET));
        }
        Ok(())
    }
}

/// An ordered musical phrase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub name: String,
    pub notes: Vec<PatternEntry>,
}

impl Pattern {
    pub fn new(name: impl Into<String>, notes: Vec<PatternEntry>) -> Self {
        Self {
            name: name.into(),
            notes,
        }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Immutable, non-empty collection of patterns
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    patterns: Vec<Pattern>,
}

impl PatternCatalog {
    /// Build a catalog, rejecting empty collections and impossible positions.
    ///
    /// Entries whose fret/string pair does not sound the written pitch are
    /// accepted but logged, since the staff and fretboard then disagree.
    pub fn new(patterns: Vec<Pattern>) -> Result<Self, TrainerError> {
        if patterns.is_empty() {
            return Err(TrainerError::EmptyCatalog);
        }

        for (index, pattern) in patterns.iter().enumerate() {
            if pattern.is_empty() {
                return Err(TrainerError::Pattern {
                    index,
                    message: format!("'{}' has no notes", pattern.name),
                });
            }
            for entry in &pattern.notes {
                entry
                    .check_position()
                    .map_err(|message| TrainerError::Pattern { index, message })?;
                if !entry.is_consistent() {
                    tracing::warn!(
                        pattern = %pattern.name,
                        pitch = %entry.pitch,
                        string = entry.string,
                        fret = entry.fret,
                        "fretboard position does not sound the written pitch"
                    );
                }
            }
        }

        Ok(Self { patterns })
    }

    /// Parse a YAML list of patterns
    pub fn from_yaml(source: &str) -> Result<Self, TrainerError> {
        let patterns: Vec<Pattern> =
            serde_yaml::from_str(source).map_err(|e| TrainerError::Config(e.to_string()))?;
        Self::new(patterns)
    }

    /// The phrases shipped with the trainer
    pub fn builtin() -> Self {
        Self {
            patterns: builtin_patterns(),
        }
    }

    /// Uniformly pick one pattern using the caller's random source
    ///
    /// # Example
    /// ```rust
    /// use fretscroll::PatternCatalog;
    /// use rand::SeedableRng;
    /// use rand_pcg::Pcg32;
    ///
    /// let catalog = PatternCatalog::builtin();
    /// let first = catalog.pick_random(&mut Pcg32::seed_from_u64(7)).clone();
    /// let again = catalog.pick_random(&mut Pcg32::seed_from_u64(7));
    /// assert_eq!(&first, again);
    /// ```
    pub fn pick_random<R: Rng>(&self, rng: &mut R) -> &Pattern {
        let index = rng.random_range(0..self.patterns.len());
        &self.patterns[index]
    }

    pub fn get(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }
}

impl Default for PatternCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_patterns() -> Vec<Pattern> {
    use Pitch::*;
    let e = PatternEntry::new;

    vec![
        Pattern::new(
            "C major arpeggio",
            vec![e(C4, 1, 2), e(E4, 0, 1), e(G4, 3, 1), e(C5, 8, 1)],
        ),
        Pattern::new(
            "C major scale",
            vec![
                e(C4, 1, 2),
                e(D4, 3, 2),
                e(E4, 0, 1),
                e(F4, 1, 1),
                e(G4, 3, 1),
                e(A4, 5, 1),
                e(B4, 7, 1),
                e(C5, 8, 1),
            ],
        ),
        Pattern::new(
            "Open strings",
            vec![e(E4, 0, 1), e(B3, 0, 2), e(G3, 0, 3), e(B3, 0, 2), e(E4, 0, 1)],
        ),
        Pattern::new(
            "Ode to Joy",
            vec![
                e(E4, 0, 1),
                e(E4, 0, 1),
                e(F4, 1, 1),
                e(G4, 3, 1),
                e(G4, 3, 1),
                e(F4, 1, 1),
                e(E4, 0, 1),
                e(D4, 3, 2),
            ],
        ),
        Pattern::new(
            "Walking down from G",
            vec![
                e(G4, 3, 1),
                e(F4, 1, 1),
                e(E4, 0, 1),
                e(D4, 3, 2),
                e(C4, 1, 2),
                e(B3, 0, 2),
                e(A3, 2, 3),
                e(G3, 0, 3),
            ],
        ),
        Pattern::new(
            "Low strings",
            vec![
                e(E3, 2, 4),
                e(F3, 3, 4),
                e(G3, 0, 3),
                e(A3, 2, 3),
                e(B3, 0, 2),
                e(C4, 1, 2),
            ],
        ),
        Pattern::new(
            "Up the neck",
            vec![e(C5, 8, 1), e(D5, 10, 1), e(E5, 12, 1), e(F5, 13, 1), e(G5, 15, 1)],
        ),
        Pattern::new(
            "Call and response",
            vec![
                e(C4, 1, 2),
                e(E4, 0, 1),
                e(Rest, 0, 1),
                e(G4, 3, 1),
                e(E4, 0, 1),
                e(Rest, 0, 1),
                e(C4, 1, 2),
            ],
        ),
    ]
}
