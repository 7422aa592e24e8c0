//! # Audio Gateway
//!
//! Best-effort boundary between the timeline and whatever actually makes
//! sound. The gateway owns a [`SampleBackend`] and guarantees:
//!
//! - `initialize()` reports success as a boolean and is idempotent
//! - a failed initialization can be retried
//! - `play_note()` never fails: nothing plays until audio is initialized
//!   and enabled, a missing sample falls back to [`DEFAULT_SAMPLE_KEY`] once,
//!   and a failing fallback drops the note
//!
//! A session whose audio never starts keeps running in visual-only mode.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::AudioError;
use crate::pitch::DEFAULT_SAMPLE_KEY;

/// Sound engine driven by the gateway
pub trait SampleBackend {
    /// Bring the engine up. Called again on retry after a failure.
    fn start(&mut self) -> Result<(), AudioError>;

    /// Play the sample for `sample_key` for `duration_secs`
    fn trigger(&mut self, sample_key: &str, duration_secs: f64) -> Result<(), AudioError>;
}

/// Initialization state of the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioStatus {
    Uninitialized,
    Ready,
    Failed,
}

/// Backend that accepts everything and plays nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentBackend;

impl SampleBackend for SilentBackend {
    fn start(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn trigger(&mut self, _sample_key: &str, _duration_secs: f64) -> Result<(), AudioError> {
        Ok(())
    }
}

/// A sound requested from a [`QueueBackend`]
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedSound {
    pub sample_key: String,
    pub duration_secs: f64,
}

/// Backend that queues triggered sounds for an external player to drain.
///
/// The external player reports whether its own engine came up through
/// [`QueueBackend::set_engine_ready`]; `start` fails until it has.
#[derive(Debug, Clone, Default)]
pub struct QueueBackend {
    ready: Rc<RefCell<bool>>,
    queue: Rc<RefCell<Vec<QueuedSound>>>,
}

impl QueueBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_engine_ready(&self, ready: bool) {
        *self.ready.borrow_mut() = ready;
    }

    /// Take every sound queued since the last drain
    pub fn drain(&self) -> Vec<QueuedSound> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }
}

impl SampleBackend for QueueBackend {
    fn start(&mut self) -> Result<(), AudioError> {
        if *self.ready.borrow() {
            Ok(())
        } else {
            Err(AudioError::NotStarted)
        }
    }

    fn trigger(&mut self, sample_key: &str, duration_secs: f64) -> Result<(), AudioError> {
        self.queue.borrow_mut().push(QueuedSound {
            sample_key: sample_key.to_string(),
            duration_secs,
        });
        Ok(())
    }
}

pub struct AudioGateway {
    backend: Box<dyn SampleBackend>,
    status: AudioStatus,
    enabled: bool,
}

impl AudioGateway {
    pub fn new(backend: Box<dyn SampleBackend>) -> Self {
        Self {
            backend,
            status: AudioStatus::Uninitialized,
            enabled: false,
        }
    }

    /// Gateway for visual-only sessions
    pub fn silent() -> Self {
        Self::new(Box::new(SilentBackend))
    }

    /// Start the backend and enable playback.
    ///
    /// Returns true if audio is ready, including when it already was.
    pub fn initialize(&mut self) -> bool {
        if self.status == AudioStatus::Ready {
            return true;
        }

        match self.backend.start() {
            Ok(()) => {
                tracing::info!("audio initialized");
                self.status = AudioStatus::Ready;
                self.enabled = true;
                true
            }
            Err(e) => {
                tracing::warn!("audio initialization failed: {}", e);
                self.status = AudioStatus::Failed;
                self.enabled = false;
                false
            }
        }
    }

    /// Flip audio on or off, initializing on the first enable.
    ///
    /// Returns the resulting enabled flag.
    pub fn toggle(&mut self) -> bool {
        if self.enabled {
            self.enabled = false;
        } else if self.status == AudioStatus::Ready {
            self.enabled = true;
        } else {
            self.initialize();
        }
        tracing::debug!(enabled = self.enabled, "audio toggled");
        self.enabled
    }

    /// Fire-and-forget playback. Returns true if a sample was triggered,
    /// either the requested one or the fallback.
    ///
    /// # Example
    /// ```rust
    /// use fretscroll::audio::AudioGateway;
    ///
    /// let mut audio = AudioGateway::silent();
    /// assert!(!audio.play_note("C4", 0.5)); // not initialized yet
    /// assert!(!audio.is_enabled());
    /// assert!(audio.initialize());
    /// assert!(audio.play_note("C4", 0.5));
    /// ```
    pub fn play_note(&mut self, sample_key: &str, duration_secs: f64) -> bool {
        if !self.is_playable() {
            tracing::debug!(sample_key, "audio unavailable, note skipped");
            return false;
        }

        let Err(e) = self.backend.trigger(sample_key, duration_secs) else {
            return true;
        };
        tracing::warn!("playback of {} failed ({}), using {}", sample_key, e, DEFAULT_SAMPLE_KEY);
        if sample_key == DEFAULT_SAMPLE_KEY {
            return false;
        }
        match self.backend.trigger(DEFAULT_SAMPLE_KEY, duration_secs) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("fallback playback failed, note dropped: {}", e);
                false
            }
        }
    }

    pub fn status(&self) -> AudioStatus {
        self.status
    }

    pub fn is_initialized(&self) -> bool {
        self.status == AudioStatus::Ready
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_playable(&self) -> bool {
        self.enabled && self.status == AudioStatus::Ready
    }
}

impl std::fmt::Debug for AudioGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioGateway")
            .field("status", &self.status)
            .field("enabled", &self.enabled)
            .finish()
    }
}
