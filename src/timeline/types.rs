//! Timeline type definitions
//!
//! The runtime note entity, the timeline's geometry and release settings,
//! and the serializable snapshot handed to renderers.

use serde::{Deserialize, Serialize};

use crate::pattern::PatternEntry;
use crate::pitch::Pitch;

/// A note scrolling across the staff
///
/// # Flags
/// - `active`: inside its highlight period, between trigger and release
/// - `played`: released; stays true until the next load
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub pitch: Pitch,
    pub fret: u8,
    pub string: u8,
    pub x: f64,
    pub active: bool,
    pub played: bool,
}

impl Note {
    pub(crate) fn from_entry(entry: &PatternEntry, x: f64) -> Self {
        Self {
            pitch: entry.pitch,
            fret: entry.fret,
            string: entry.string,
            x,
            active: false,
            played: false,
        }
    }

    pub fn staff_offset(&self) -> f64 {
        self.pitch.staff_offset()
    }
}

/// How long a triggered note stays active before it is marked played
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ReleaseDelay {
    /// Constant delay in milliseconds
    Fixed { ms: f64 },
    /// One quarter note at the current tempo
    NoteLength,
}

impl ReleaseDelay {
    pub fn delay_ms(&self, tempo_bpm: u16) -> f64 {
        match self {
            ReleaseDelay::Fixed { ms } => *ms,
            ReleaseDelay::NoteLength => 60_000.0 / f64::from(tempo_bpm.max(1)),
        }
    }
}

impl Default for ReleaseDelay {
    fn default() -> Self {
        ReleaseDelay::Fixed { ms: 500.0 }
    }
}

/// Timeline geometry in pixels, timing in milliseconds
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TimelineConfig {
    pub play_line_x: f64,
    pub lead_distance: f64,
    pub note_spacing: f64,
    pub trigger_tolerance: f64,
    /// Clock advance of one `advance` call when the caller has no frame time
    pub frame_interval_ms: f64,
    pub release: ReleaseDelay,
}

impl TimelineConfig {
    /// Exclusive upper bound on per-tick speed that cannot skip the trigger window
    pub fn max_safe_speed(&self) -> f64 {
        2.0 * self.trigger_tolerance
    }

    /// Initial x of the note at `index`
    pub fn start_x(&self, index: usize) -> f64 {
        self.play_line_x + self.lead_distance + index as f64 * self.note_spacing
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            play_line_x: 100.0,
            lead_distance: 400.0,
            note_spacing: 120.0,
            trigger_tolerance: 5.0,
            frame_interval_ms: 1000.0 / 60.0,
            release: ReleaseDelay::default(),
        }
    }
}

/// Render data for one note
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    pub pitch: Pitch,
    pub string: u8,
    pub fret: u8,
    pub x: f64,
    pub staff_offset: f64,
    pub active: bool,
    pub played: bool,
}

impl From<&Note> for NoteView {
    fn from(note: &Note) -> Self {
        Self {
            pitch: note.pitch,
            string: note.string,
            fret: note.fret,
            x: note.x,
            staff_offset: note.staff_offset(),
            active: note.active,
            played: note.played,
        }
    }
}

/// Render data for the whole timeline
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSnapshot {
    pub generation: u64,
    pub play_line_x: f64,
    pub notes: Vec<NoteView>,
    pub complete: bool,
}
