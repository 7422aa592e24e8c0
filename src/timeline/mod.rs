//! # Note Timeline
//!
//! Scrolls the notes of the current pattern toward a fixed play-line and
//! fires each one exactly once as it crosses.
//!
//! ## Sub-modules
//! - `types` - Note entity, configuration, render snapshot
//! - `engine` - Loading, per-tick advance, deferred releases
//!
//! ## Note Lifecycle
//!
//! ```text
//!   waiting ──(enters trigger window)──> active ──(release delay)──> played
//! ```
//!
//! - **Load** places note `i` at `play_line_x + lead_distance + i * note_spacing`
//!   with `active = false`, `played = false`
//! - **Advance** moves every note left by the current speed. A note inside
//!   `|x - play_line_x| < trigger_tolerance` that is neither active nor played
//!   becomes active, publishes `NoteActivated`, asks the audio gateway to play
//!   a quarter note (`60 / tempo` seconds) and schedules its release
//! - **Release** fires once, after the configured delay, clearing `active`
//!   and latching `played` in the same step
//!
//! ## Stale Releases
//! Every load bumps a generation counter and pending releases carry the
//! generation they were scheduled under. Releases from an earlier load are
//! dropped unapplied when they come due, so a reload never sees notes
//! released by timers from the pattern it replaced.
//!
//! ## Skip Bound
//! A note can only be missed if one tick moves it across the whole window,
//! so speeds must stay strictly below `2 * trigger_tolerance` pixels per
//! tick. [`TimelineConfig::max_safe_speed`] reports that bound and
//! configuration validation rejects tempo ranges that exceed it.

mod engine;
mod types;

#[cfg(test)]
mod tests;

pub use engine::{NoteTimeline, TickContext};
pub use types::{Note, NoteView, ReleaseDelay, TimelineConfig, TimelineSnapshot};
