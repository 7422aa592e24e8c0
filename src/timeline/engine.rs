//! Timeline engine
//!
//! Owns the live notes, moves them each tick, detects play-line crossings
//! and applies deferred releases keyed by load generation.

use crate::audio::AudioGateway;
use crate::events::{Event, EventChannel};
use crate::pattern::Pattern;

use super::types::{Note, NoteView, TimelineConfig, TimelineSnapshot};

/// Everything a tick needs from the rest of the session
pub struct TickContext<'a> {
    pub playing: bool,
    pub tempo_bpm: u16,
    /// Session clock at this tick
    pub now_ms: f64,
    pub audio: &'a mut AudioGateway,
    pub events: &'a EventChannel,
}

/// A scheduled active -> played transition
#[derive(Debug, Clone, Copy)]
struct PendingRelease {
    generation: u64,
    index: usize,
    due_ms: f64,
}

#[derive(Debug, Clone)]
pub struct NoteTimeline {
    config: TimelineConfig,
    notes: Vec<Note>,
    generation: u64,
    pending: Vec<PendingRelease>,
}

impl NoteTimeline {
    pub fn new(config: TimelineConfig) -> Self {
        Self {
            config,
            notes: Vec::new(),
            generation: 0,
            pending: Vec::new(),
        }
    }

    /// Replace all notes with a fresh copy of `pattern`.
    ///
    /// Releases still pending from the previous load become inert.
    ///
    /// # Example
    /// ```rust
    /// use fretscroll::timeline::{NoteTimeline, TimelineConfig};
    /// use fretscroll::PatternCatalog;
    ///
    /// let catalog = PatternCatalog::builtin();
    /// let pattern = catalog.get(0).unwrap();
    ///
    /// let mut timeline = NoteTimeline::new(TimelineConfig::default());
    /// timeline.load_pattern(pattern);
    ///
    /// assert_eq!(timeline.notes().len(), pattern.len());
    /// assert!(timeline.notes().iter().all(|n| !n.played && !n.active));
    /// ```
    pub fn load_pattern(&mut self, pattern: &Pattern) {
        self.generation += 1;
        self.notes = pattern
            .notes
            .iter()
            .enumerate()
            .map(|(i, entry)| Note::from_entry(entry, self.config.start_x(i)))
            .collect();

        tracing::debug!(
            pattern = %pattern.name,
            notes = self.notes.len(),
            generation = self.generation,
            "pattern loaded"
        );
    }

    /// Move every note left by `speed` and fire the ones reaching the play-line.
    ///
    /// Does nothing while paused. Returns how many notes fired.
    pub fn advance(&mut self, speed: f64, ctx: &mut TickContext<'_>) -> usize {
        if !ctx.playing {
            return 0;
        }

        let play_line = self.config.play_line_x;
        let tolerance = self.config.trigger_tolerance;
        let release_ms = self.config.release.delay_ms(ctx.tempo_bpm);
        let duration_secs = 60.0 / f64::from(ctx.tempo_bpm.max(1));
        let mut fired = 0;

        for index in 0..self.notes.len() {
            let note = &mut self.notes[index];
            note.x -= speed;

            if note.played || note.active || (note.x - play_line).abs() >= tolerance {
                continue;
            }

            note.active = true;
            fired += 1;
            self.pending.push(PendingRelease {
                generation: self.generation,
                index,
                due_ms: ctx.now_ms + release_ms,
            });

            if note.pitch.is_rest() {
                continue;
            }

            let (pitch, string, fret) = (note.pitch, note.string, note.fret);
            tracing::debug!(index, %pitch, string, fret, "note reached play-line");

            ctx.events.publish(&Event::NoteActivated {
                index,
                pitch,
                string,
                fret,
                at_ms: ctx.now_ms,
            });
            if ctx.audio.play_note(pitch.sample_key(), duration_secs) {
                ctx.events.publish(&Event::PlaybackStarted {
                    sample_key: pitch.sample_key().to_string(),
                    duration_secs,
                });
            }
        }

        fired
    }

    /// Apply every release due at `now_ms`, returning how many notes changed.
    pub fn run_due_releases(&mut self, now_ms: f64) -> usize {
        let generation = self.generation;
        let mut applied = 0;

        let notes = &mut self.notes;
        self.pending.retain(|release| {
            if release.due_ms > now_ms {
                return true;
            }
            if release.generation != generation {
                tracing::debug!(
                    stale = release.generation,
                    current = generation,
                    "dropping release from replaced pattern"
                );
                return false;
            }
            if let Some(note) = notes.get_mut(release.index) {
                note.active = false;
                note.played = true;
                applied += 1;
            }
            false
        });

        applied
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Releases scheduled but not yet due, including stale ones
    pub fn pending_releases(&self) -> usize {
        self.pending.len()
    }

    /// True once every note of a non-empty load has been played
    pub fn is_complete(&self) -> bool {
        !self.notes.is_empty() && self.notes.iter().all(|n| n.played)
    }

    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot {
            generation: self.generation,
            play_line_x: self.config.play_line_x,
            notes: self.notes.iter().map(NoteView::from).collect(),
            complete: self.is_complete(),
        }
    }
}
