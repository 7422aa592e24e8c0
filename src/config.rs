//! # Trainer Configuration
//!
//! All tunables of a session, loadable from YAML. Every field has a
//! default, so an empty document is a valid configuration.
//!
//! ## Example
//! ```yaml
//! seed: 42
//! highlight-ms: 400
//! timeline:
//!   note-spacing: 150
//!   release: { kind: note-length }
//! transport:
//!   initial-tempo: 90
//!   speed-curve: { kind: linear, min-speed: 1.0, max-speed: 6.0 }
//!   regenerate: start-playing
//! patterns:
//!   - name: Open E
//!     notes:
//!       - { pitch: E4, fret: 0, string: 1 }
//! ```

use serde::Deserialize;

use crate::error::TrainerError;
use crate::pattern::{Pattern, PatternCatalog};
use crate::timeline::{ReleaseDelay, TimelineConfig};
use crate::transport::{SpeedCurve, TransportConfig};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TrainerConfig {
    pub timeline: TimelineConfig,
    pub transport: TransportConfig,
    /// How long a fretboard position stays lit
    pub highlight_ms: f64,
    /// Seed for pattern selection; random when absent
    pub seed: Option<u64>,
    /// Replaces the built-in catalog when present
    pub patterns: Option<Vec<Pattern>>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            timeline: TimelineConfig::default(),
            transport: TransportConfig::default(),
            highlight_ms: 500.0,
            seed: None,
            patterns: None,
        }
    }
}

impl TrainerConfig {
    /// Parse and validate a YAML configuration
    ///
    /// # Example
    /// ```rust
    /// use fretscroll::TrainerConfig;
    ///
    /// let config = TrainerConfig::from_yaml("transport:\n  initial-tempo: 90\n").unwrap();
    /// assert_eq!(config.transport.initial_tempo, 90);
    /// assert_eq!(config.transport.max_tempo, 180);
    /// ```
    pub fn from_yaml(source: &str) -> Result<Self, TrainerError> {
        let config: TrainerConfig = if source.trim().is_empty() {
            TrainerConfig::default()
        } else {
            serde_yaml::from_str(source).map_err(|e| TrainerError::Config(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TrainerError> {
        let timeline = &self.timeline;
        let transport = &self.transport;

        if !timeline.play_line_x.is_finite() {
            return Err(TrainerError::Config("play-line-x must be finite".to_string()));
        }
        positive("lead-distance", timeline.lead_distance)?;
        positive("note-spacing", timeline.note_spacing)?;
        positive("trigger-tolerance", timeline.trigger_tolerance)?;
        positive("frame-interval-ms", timeline.frame_interval_ms)?;
        if let ReleaseDelay::Fixed { ms } = timeline.release {
            if !(ms.is_finite() && ms >= 0.0) {
                return Err(TrainerError::Config(format!(
                    "release delay {} ms must be finite and not negative",
                    ms
                )));
            }
        }
        positive("highlight-ms", self.highlight_ms)?;

        if transport.min_tempo == 0 || transport.min_tempo > transport.max_tempo {
            return Err(TrainerError::Config(format!(
                "tempo range {}..={} is invalid",
                transport.min_tempo, transport.max_tempo
            )));
        }

        match transport.speed_curve {
            SpeedCurve::Ratio { unit_speed } => positive("unit-speed", unit_speed)?,
            SpeedCurve::Linear {
                min_speed,
                max_speed,
            } => {
                positive("min-speed", min_speed)?;
                positive("max-speed", max_speed)?;
                if min_speed > max_speed {
                    return Err(TrainerError::Config(format!(
                        "min-speed {} is above max-speed {}",
                        min_speed, max_speed
                    )));
                }
            }
        }

        // Notes must move left at every tempo, and never far enough to jump the window.
        let bottom_speed = transport.speed_for(transport.min_tempo);
        if !(bottom_speed.is_finite() && bottom_speed > 0.0) {
            return Err(TrainerError::Config(format!(
                "speed at {} bpm must be positive",
                transport.min_tempo
            )));
        }

        let top_speed = transport.speed_for(transport.max_tempo);
        if top_speed >= timeline.max_safe_speed() {
            return Err(TrainerError::Config(format!(
                "speed {:.2} px/tick at {} bpm would skip the {:.2} px trigger window",
                top_speed,
                transport.max_tempo,
                timeline.max_safe_speed()
            )));
        }

        Ok(())
    }

    /// The configured catalog, or the built-in one
    pub fn catalog(&self) -> Result<PatternCatalog, TrainerError> {
        match &self.patterns {
            Some(patterns) => PatternCatalog::new(patterns.clone()),
            None => Ok(PatternCatalog::builtin()),
        }
    }
}

/// Finite and strictly positive
fn positive(name: &str, value: f64) -> Result<(), TrainerError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TrainerError::Config(format!("{} must be positive, got {}", name, value)))
    }
}
