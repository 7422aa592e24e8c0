//! # Transport
//!
//! Play/pause/tempo state and the commands that change it.
//!
//! ## States
//! `Paused` (initial) and `Playing`. Only `play`, `pause` and `replay`
//! change the state; `regenerate` does so only when configured with
//! [`RegenerateBehavior::StartPlaying`].
//!
//! ## Tempo to Speed
//! Scroll speed in pixels per tick is derived from tempo through a
//! [`SpeedCurve`] and recomputed on every tempo change. Two curves exist:
//!
//! - `Ratio` (default): `speed = tempo / 60 * unit_speed`
//! - `Linear`: the tempo range mapped linearly onto `min_speed..=max_speed`,
//!   clamped at both ends
//!
//! Both are monotonic in tempo.

use rand::Rng;
use serde::Deserialize;

use crate::events::{Event, EventChannel};
use crate::pattern::{Pattern, PatternCatalog};
use crate::timeline::NoteTimeline;

/// Tempo to scroll speed mapping
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SpeedCurve {
    /// Speed proportional to tempo; `unit_speed` px/tick at 60 bpm
    #[serde(rename_all = "kebab-case")]
    Ratio { unit_speed: f64 },
    /// Linear map of the tempo range onto a speed range
    #[serde(rename_all = "kebab-case")]
    Linear { min_speed: f64, max_speed: f64 },
}

impl Default for SpeedCurve {
    fn default() -> Self {
        SpeedCurve::Ratio { unit_speed: 2.0 }
    }
}

impl SpeedCurve {
    /// Pixels per tick at `bpm`, given the valid tempo range
    pub fn speed(&self, bpm: u16, min_tempo: u16, max_tempo: u16) -> f64 {
        match *self {
            SpeedCurve::Ratio { unit_speed } => f64::from(bpm) / 60.0 * unit_speed,
            SpeedCurve::Linear {
                min_speed,
                max_speed,
            } => {
                if max_tempo <= min_tempo {
                    return min_speed;
                }
                let span = f64::from(max_tempo - min_tempo);
                let t = (f64::from(bpm) - f64::from(min_tempo)) / span;
                min_speed + t.clamp(0.0, 1.0) * (max_speed - min_speed)
            }
        }
    }
}

/// Whether loading a new pattern also starts playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegenerateBehavior {
    #[default]
    KeepPlayState,
    StartPlaying,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TransportConfig {
    pub initial_tempo: u16,
    pub min_tempo: u16,
    pub max_tempo: u16,
    pub speed_curve: SpeedCurve,
    pub regenerate: RegenerateBehavior,
}

impl TransportConfig {
    pub fn clamp_tempo(&self, bpm: u16) -> u16 {
        bpm.clamp(self.min_tempo, self.max_tempo)
    }

    pub fn speed_for(&self, bpm: u16) -> f64 {
        self.speed_curve.speed(bpm, self.min_tempo, self.max_tempo)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            initial_tempo: 100,
            min_tempo: 60,
            max_tempo: 180,
            speed_curve: SpeedCurve::default(),
            regenerate: RegenerateBehavior::default(),
        }
    }
}

/// Current transport values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportState {
    pub is_playing: bool,
    pub tempo_bpm: u16,
    pub note_speed: f64,
}

/// UI commands, dispatched by [`crate::Session::execute`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play,
    Pause,
    Replay,
    RegeneratePattern,
    ToggleAudio,
    SetTempo(u16),
}

#[derive(Debug, Clone)]
pub struct TransportController {
    config: TransportConfig,
    state: TransportState,
    current: Option<Pattern>,
}

impl TransportController {
    pub fn new(config: TransportConfig) -> Self {
        let tempo_bpm = config.clamp_tempo(config.initial_tempo);
        let state = TransportState {
            is_playing: false,
            tempo_bpm,
            note_speed: config.speed_for(tempo_bpm),
        };
        Self {
            config,
            state,
            current: None,
        }
    }

    pub fn play(&mut self, events: &EventChannel) {
        self.set_playing(true, events);
    }

    pub fn pause(&mut self, events: &EventChannel) {
        self.set_playing(false, events);
    }

    /// Reload the current pattern from scratch and start playing
    pub fn replay(&mut self, timeline: &mut NoteTimeline, events: &EventChannel) {
        if let Some(pattern) = &self.current {
            timeline.load_pattern(pattern);
            tracing::info!(pattern = %pattern.name, "replaying pattern");
        }
        self.set_playing(true, events);
    }

    /// Clamp and apply a new tempo. Returns the tempo actually set.
    ///
    /// # Example
    /// ```rust
    /// use fretscroll::events::EventChannel;
    /// use fretscroll::transport::{TransportConfig, TransportController};
    ///
    /// let events = EventChannel::new();
    /// let mut transport = TransportController::new(TransportConfig::default());
    ///
    /// assert_eq!(transport.set_tempo(300, &events), 180);
    /// assert_eq!(transport.set_tempo(30, &events), 60);
    /// assert!(!transport.state().is_playing);
    /// ```
    pub fn set_tempo(&mut self, bpm: u16, events: &EventChannel) -> u16 {
        let tempo_bpm = self.config.clamp_tempo(bpm);
        if tempo_bpm != bpm {
            tracing::debug!(requested = bpm, applied = tempo_bpm, "tempo clamped");
        }
        self.state.tempo_bpm = tempo_bpm;
        self.state.note_speed = self.config.speed_for(tempo_bpm);
        events.publish(&Event::TempoChanged {
            bpm: tempo_bpm,
            note_speed: self.state.note_speed,
        });
        tempo_bpm
    }

    /// Pick a new pattern and load it
    pub fn regenerate_pattern<R: Rng>(
        &mut self,
        catalog: &PatternCatalog,
        rng: &mut R,
        timeline: &mut NoteTimeline,
        events: &EventChannel,
    ) {
        let pattern = catalog.pick_random(rng).clone();
        self.load(pattern, timeline, events);
        if self.config.regenerate == RegenerateBehavior::StartPlaying {
            self.set_playing(true, events);
        }
    }

    /// Make `pattern` current and load it, leaving play state alone
    pub fn load(&mut self, pattern: Pattern, timeline: &mut NoteTimeline, events: &EventChannel) {
        timeline.load_pattern(&pattern);
        tracing::info!(pattern = %pattern.name, notes = pattern.len(), "pattern selected");
        let event = Event::PatternSelected {
            name: pattern.name.clone(),
            note_count: pattern.len(),
        };
        self.current = Some(pattern);
        events.publish(&event);
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn current_pattern(&self) -> Option<&Pattern> {
        self.current.as_ref()
    }

    fn set_playing(&mut self, playing: bool, events: &EventChannel) {
        self.state.is_playing = playing;
        events.publish(&Event::PlayStateChanged { playing });
    }
}
