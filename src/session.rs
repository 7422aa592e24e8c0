//! # Session
//!
//! Top-level owner of every component. The UI talks to a session through
//! [`Command`]s and drives it with [`Session::tick`] once per frame.
//!
//! ## Tick Order
//! 1. Advance the session clock by the frame time
//! 2. Apply deferred releases that came due
//! 3. Expire fretboard highlights
//! 4. Advance the timeline (only while playing)

use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::rc::Rc;

use crate::audio::AudioGateway;
use crate::config::TrainerConfig;
use crate::error::TrainerError;
use crate::events::{Event, EventChannel, SubscriptionId, Topic};
use crate::highlight::FretHighlighter;
use crate::pattern::PatternCatalog;
use crate::timeline::{NoteTimeline, TickContext, TimelineSnapshot};
use crate::transport::{Command, TransportController, TransportState};

#[derive(Debug)]
pub struct Session {
    events: Rc<EventChannel>,
    audio: AudioGateway,
    catalog: PatternCatalog,
    timeline: NoteTimeline,
    transport: TransportController,
    highlighter: FretHighlighter,
    rng: Pcg32,
    clock_ms: f64,
}

impl Session {
    /// Build a session and load its first pattern. Playback starts paused.
    ///
    /// # Example
    /// ```rust
    /// use fretscroll::{audio::AudioGateway, Command, Session, TrainerConfig};
    ///
    /// let config = TrainerConfig { seed: Some(1), ..Default::default() };
    /// let mut session = Session::new(config, AudioGateway::silent()).unwrap();
    ///
    /// session.execute(Command::Play);
    /// for _ in 0..600 {
    ///     session.tick_frame();
    /// }
    /// assert!(session.timeline().notes().iter().any(|n| n.played));
    /// ```
    pub fn new(config: TrainerConfig, audio: AudioGateway) -> Result<Self, TrainerError> {
        config.validate()?;
        let catalog = config.catalog()?;
        let seed = resolve_seed(config.seed)?;

        let mut session = Self {
            events: Rc::new(EventChannel::new()),
            audio,
            catalog,
            timeline: NoteTimeline::new(config.timeline.clone()),
            transport: TransportController::new(config.transport.clone()),
            highlighter: FretHighlighter::new(config.highlight_ms),
            rng: Pcg32::seed_from_u64(seed),
            clock_ms: 0.0,
        };
        session.highlighter.attach(&session.events);

        tracing::info!(seed, patterns = session.catalog.len(), "session created");
        session.transport.regenerate_pattern(
            &session.catalog,
            &mut session.rng,
            &mut session.timeline,
            &session.events,
        );
        Ok(session)
    }

    /// Dispatch one UI command
    pub fn execute(&mut self, command: Command) {
        tracing::debug!(?command, "executing command");
        match command {
            Command::Play => self.transport.play(&self.events),
            Command::Pause => self.transport.pause(&self.events),
            Command::Replay => {
                self.highlighter.clear();
                self.transport.replay(&mut self.timeline, &self.events);
            }
            Command::RegeneratePattern => {
                self.highlighter.clear();
                self.transport.regenerate_pattern(
                    &self.catalog,
                    &mut self.rng,
                    &mut self.timeline,
                    &self.events,
                );
            }
            Command::ToggleAudio => {
                self.audio.toggle();
            }
            Command::SetTempo(bpm) => {
                self.transport.set_tempo(bpm, &self.events);
            }
        }
    }

    /// Advance the session by `elapsed_ms` of wall time
    pub fn tick(&mut self, elapsed_ms: f64) {
        self.clock_ms += elapsed_ms.max(0.0);
        self.timeline.run_due_releases(self.clock_ms);
        self.highlighter.expire(self.clock_ms);

        let state = self.transport.state();
        let mut ctx = TickContext {
            playing: state.is_playing,
            tempo_bpm: state.tempo_bpm,
            now_ms: self.clock_ms,
            audio: &mut self.audio,
            events: &self.events,
        };
        self.timeline.advance(state.note_speed, &mut ctx);
    }

    /// Advance by one configured frame interval
    pub fn tick_frame(&mut self) {
        let frame_ms = self.timeline.config().frame_interval_ms;
        self.tick(frame_ms);
    }

    /// Try to bring audio up; false leaves the session visual-only
    pub fn initialize_audio(&mut self) -> bool {
        self.audio.initialize()
    }

    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + 'static,
    {
        self.events.subscribe(topic, handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Shared handle to the session's channel, for handlers that publish
    pub fn events(&self) -> Rc<EventChannel> {
        self.events.clone()
    }

    pub fn transport(&self) -> TransportState {
        self.transport.state()
    }

    pub fn timeline(&self) -> &NoteTimeline {
        &self.timeline
    }

    pub fn audio(&self) -> &AudioGateway {
        &self.audio
    }

    pub fn highlighter(&self) -> &FretHighlighter {
        &self.highlighter
    }

    pub fn current_pattern_name(&self) -> Option<&str> {
        self.transport.current_pattern().map(|p| p.name.as_str())
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn snapshot(&self) -> TimelineSnapshot {
        self.timeline.snapshot()
    }
}

/// The configured seed, or fresh entropy where the platform has it
#[cfg(not(target_arch = "wasm32"))]
fn resolve_seed(seed: Option<u64>) -> Result<u64, TrainerError> {
    Ok(seed.unwrap_or_else(rand::random::<u64>))
}

/// The browser page supplies the seed; there is no entropy source here
#[cfg(target_arch = "wasm32")]
fn resolve_seed(seed: Option<u64>) -> Result<u64, TrainerError> {
    seed.ok_or_else(|| TrainerError::Config("a seed is required in the browser".to_string()))
}
