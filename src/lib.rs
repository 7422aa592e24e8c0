//! # fretscroll
//!
//! Timing and pitch-mapping core of a guitar sight-reading trainer: notes
//! scroll toward a play-line, sound when they cross it and light their
//! fretboard position.
//!
//! ## Components
//! - `pitch` - staff offset, sample key and fretboard lookups
//! - `pattern` - phrases and the random pattern catalog
//! - `events` - synchronous publish/subscribe channel
//! - `timeline` - scrolling notes, crossing detection, deferred releases
//! - `transport` - play/pause/tempo state and UI commands
//! - `audio` - best-effort audio gateway over a pluggable backend
//! - `highlight` - timed fretboard highlights
//! - `session` - owner of all of the above
//!
//! ## Example
//! ```rust
//! use fretscroll::{audio::AudioGateway, Command, Session, TrainerConfig};
//!
//! let config = TrainerConfig::from_yaml("seed: 7\n").unwrap();
//! let mut session = Session::new(config, AudioGateway::silent()).unwrap();
//!
//! session.initialize_audio();
//! session.execute(Command::SetTempo(120));
//! session.execute(Command::Play);
//! session.tick(16.7);
//!
//! assert!(session.transport().is_playing);
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod events;
pub mod highlight;
pub mod pattern;
pub mod pitch;
pub mod session;
pub mod timeline;
pub mod transport;

pub use config::TrainerConfig;
pub use error::*;
pub use pattern::{Pattern, PatternCatalog, PatternEntry};
pub use pitch::Pitch;
pub use session::Session;
pub use transport::Command;
