use fretscroll::audio::{AudioGateway, AudioStatus, QueueBackend};
use fretscroll::highlight::Highlight;
use fretscroll::timeline::TimelineSnapshot;
use fretscroll::{Command, Session, TrainerConfig, TrainerError};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct ConfigError {
    message: String,
    pattern: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Sound {
    sample_key: String,
    duration_secs: f64,
}

/// Everything the page needs to draw one frame and play its sounds
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Frame {
    timeline: TimelineSnapshot,
    highlights: Vec<Highlight>,
    sounds: Vec<Sound>,
    playing: bool,
    tempo: u16,
    audio: &'static str,
}

fn error_to_js(e: TrainerError) -> JsValue {
    let error = match e {
        TrainerError::Pattern { index, message } => ConfigError {
            message,
            pattern: Some(index),
        },
        other => ConfigError {
            message: other.to_string(),
            pattern: None,
        },
    };
    JsValue::from_str(&serde_json::to_string(&error).unwrap_or_else(|_| "{}".to_string()))
}

/// A trainer session driven from `requestAnimationFrame`
#[wasm_bindgen]
pub struct Trainer {
    session: Session,
    backend: QueueBackend,
}

#[wasm_bindgen]
impl Trainer {
    /// Create a session from a YAML config (may be empty) and a seed from the page
    #[wasm_bindgen(constructor)]
    pub fn new(config_yaml: &str, seed: u32) -> Result<Trainer, JsValue> {
        let mut config = TrainerConfig::from_yaml(config_yaml).map_err(error_to_js)?;
        if config.seed.is_none() {
            config.seed = Some(u64::from(seed));
        }

        let backend = QueueBackend::new();
        let audio = AudioGateway::new(Box::new(backend.clone()));
        let session = Session::new(config, audio).map_err(error_to_js)?;
        Ok(Trainer { session, backend })
    }

    pub fn play(&mut self) {
        self.session.execute(Command::Play);
    }

    pub fn pause(&mut self) {
        self.session.execute(Command::Pause);
    }

    pub fn replay(&mut self) {
        self.session.execute(Command::Replay);
    }

    pub fn regenerate(&mut self) {
        self.session.execute(Command::RegeneratePattern);
    }

    #[wasm_bindgen(js_name = toggleAudio)]
    pub fn toggle_audio(&mut self) -> bool {
        self.session.execute(Command::ToggleAudio);
        self.session.audio().is_enabled()
    }

    /// Returns the tempo actually applied after clamping
    #[wasm_bindgen(js_name = setTempo)]
    pub fn set_tempo(&mut self, bpm: u16) -> u16 {
        self.session.execute(Command::SetTempo(bpm));
        self.session.transport().tempo_bpm
    }

    /// Report the outcome of the page's audio engine start-up
    #[wasm_bindgen(js_name = audioStarted)]
    pub fn audio_started(&mut self, ok: bool) -> bool {
        self.backend.set_engine_ready(ok);
        self.session.initialize_audio()
    }

    /// Advance by `elapsed_ms` and return the frame to render
    pub fn tick(&mut self, elapsed_ms: f64) -> Result<JsValue, JsValue> {
        self.session.tick(elapsed_ms);

        let sounds = self
            .backend
            .drain()
            .into_iter()
            .map(|s| Sound {
                sample_key: s.sample_key,
                duration_secs: s.duration_secs,
            })
            .collect();

        let audio = self.session.audio();
        let frame = Frame {
            timeline: self.session.snapshot(),
            highlights: self.session.highlighter().highlights(),
            sounds,
            playing: self.session.transport().is_playing,
            tempo: self.session.transport().tempo_bpm,
            audio: match audio.status() {
                AudioStatus::Uninitialized => "off",
                AudioStatus::Failed => "failed",
                AudioStatus::Ready if audio.is_enabled() => "on",
                AudioStatus::Ready => "muted",
            },
        };

        serde_wasm_bindgen::to_value(&frame).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = patternName)]
    pub fn pattern_name(&self) -> Option<String> {
        self.session.current_pattern_name().map(str::to_string)
    }
}
