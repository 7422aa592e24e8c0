use super::*;
use crate::audio::{AudioGateway, SampleBackend};
use crate::error::AudioError;
use crate::events::{Event, EventChannel, Topic};
use crate::pattern::{Pattern, PatternEntry};
use crate::pitch::Pitch;
use std::cell::RefCell;
use std::rc::Rc;

type Plays = Rc<RefCell<Vec<(String, f64)>>>;

struct RecordingBackend(Plays);

impl SampleBackend for RecordingBackend {
    fn start(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn trigger(&mut self, sample_key: &str, duration_secs: f64) -> Result<(), AudioError> {
        self.0.borrow_mut().push((sample_key.to_string(), duration_secs));
        Ok(())
    }
}

/// Drives a timeline the way a session does, with a recording audio backend
struct Harness {
    timeline: NoteTimeline,
    audio: AudioGateway,
    events: EventChannel,
    plays: Plays,
    clock_ms: f64,
    playing: bool,
}

impl Harness {
    fn new(config: TimelineConfig) -> Self {
        let plays: Plays = Rc::new(RefCell::new(Vec::new()));
        let mut audio = AudioGateway::new(Box::new(RecordingBackend(plays.clone())));
        audio.initialize();
        Self {
            timeline: NoteTimeline::new(config),
            audio,
            events: EventChannel::new(),
            plays,
            clock_ms: 0.0,
            playing: true,
        }
    }

    fn tick(&mut self, speed: f64, tempo_bpm: u16) -> usize {
        self.clock_ms += self.timeline.config().frame_interval_ms;
        self.timeline.run_due_releases(self.clock_ms);
        let mut ctx = TickContext {
            playing: self.playing,
            tempo_bpm,
            now_ms: self.clock_ms,
            audio: &mut self.audio,
            events: &self.events,
        };
        self.timeline.advance(speed, &mut ctx)
    }

    fn play_count(&self) -> usize {
        self.plays.borrow().len()
    }
}

fn arpeggio() -> Pattern {
    Pattern::new(
        "arpeggio",
        vec![
            PatternEntry::new(Pitch::C4, 1, 2),
            PatternEntry::new(Pitch::E4, 0, 1),
            PatternEntry::new(Pitch::G4, 3, 1),
            PatternEntry::new(Pitch::C5, 8, 1),
        ],
    )
}

fn speed_at(bpm: u16) -> f64 {
    f64::from(bpm) / 60.0 * 2.0
}

#[test]
fn test_load_creates_one_fresh_note_per_entry() {
    let config = TimelineConfig::default();
    let mut timeline = NoteTimeline::new(config.clone());
    timeline.load_pattern(&arpeggio());

    assert_eq!(timeline.notes().len(), 4);
    for (i, note) in timeline.notes().iter().enumerate() {
        assert!(!note.active);
        assert!(!note.played);
        assert_eq!(note.x, config.play_line_x + config.lead_distance + i as f64 * config.note_spacing);
    }
    assert_eq!(timeline.notes()[0].string, 2);
    assert_eq!(timeline.notes()[0].fret, 1);
    assert_eq!(timeline.generation(), 1);
}

#[test]
fn test_advance_is_noop_while_paused() {
    let mut h = Harness::new(TimelineConfig::default());
    h.timeline.load_pattern(&arpeggio());
    h.playing = false;

    let before: Vec<f64> = h.timeline.notes().iter().map(|n| n.x).collect();
    for _ in 0..500 {
        assert_eq!(h.tick(5.0, 100), 0);
    }
    let after: Vec<f64> = h.timeline.notes().iter().map(|n| n.x).collect();
    assert_eq!(before, after);
    assert_eq!(h.play_count(), 0);
}

#[test]
fn test_arpeggio_at_100_bpm_plays_each_note_once_in_order() {
    let mut h = Harness::new(TimelineConfig::default());
    h.timeline.load_pattern(&arpeggio());

    let played_order = Rc::new(RefCell::new(Vec::new()));
    let order = played_order.clone();
    h.events.subscribe(Topic::NoteActivated, move |event| {
        if let Event::NoteActivated { index, .. } = event {
            order.borrow_mut().push(*index);
        }
    });

    let mut latched_order = Vec::new();
    for _ in 0..1000 {
        h.tick(speed_at(100), 100);
        for (i, note) in h.timeline.notes().iter().enumerate() {
            if note.played && !latched_order.contains(&i) {
                latched_order.push(i);
            }
        }
    }

    assert_eq!(latched_order, vec![0, 1, 2, 3]);
    assert_eq!(*played_order.borrow(), vec![0, 1, 2, 3]);
    let plays = h.plays.borrow();
    assert_eq!(plays.len(), 4);
    let keys: Vec<&str> = plays.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["C4", "E4", "G4", "C5"]);
    assert!(plays.iter().all(|(_, duration)| *duration == 0.6));
    assert!(h.timeline.is_complete());
}

#[test]
fn test_trigger_fires_once_per_load() {
    let mut h = Harness::new(TimelineConfig::default());
    h.timeline.load_pattern(&arpeggio());

    for _ in 0..400 {
        h.tick(speed_at(100), 100);
    }
    assert_eq!(h.play_count(), 4);

    // Far past the play-line, nothing fires again
    for _ in 0..5000 {
        assert_eq!(h.tick(speed_at(100), 100), 0);
    }
    assert_eq!(h.play_count(), 4);
}

#[test]
fn test_active_and_played_are_never_both_set() {
    let mut h = Harness::new(TimelineConfig::default());
    h.timeline.load_pattern(&arpeggio());

    let mut seen_active = false;
    for _ in 0..600 {
        h.tick(speed_at(140), 140);
        for note in h.timeline.notes() {
            assert!(!(note.active && note.played));
            seen_active |= note.active;
        }
    }
    assert!(seen_active);
}

#[test]
fn test_played_latches_until_reload() {
    let mut h = Harness::new(TimelineConfig::default());
    let pattern = arpeggio();
    h.timeline.load_pattern(&pattern);

    let mut first_played_at = None;
    for tick in 0..600 {
        h.tick(speed_at(100), 100);
        let played = h.timeline.notes()[0].played;
        match first_played_at {
            None if played => first_played_at = Some(tick),
            Some(_) => assert!(played, "played flag reset at tick {}", tick),
            None => {}
        }
    }
    assert!(first_played_at.is_some());

    h.timeline.load_pattern(&pattern);
    assert!(h.timeline.notes().iter().all(|n| !n.played && !n.active));
    assert_eq!(h.timeline.notes()[0].x, h.timeline.config().start_x(0));
}

#[test]
fn test_release_from_replaced_load_is_inert() {
    let mut h = Harness::new(TimelineConfig::default());
    let pattern = arpeggio();
    h.timeline.load_pattern(&pattern);

    // Run until the first note is active but not yet released
    while !h.timeline.notes()[0].active {
        h.tick(speed_at(100), 100);
    }
    assert_eq!(h.timeline.pending_releases(), 1);

    h.timeline.load_pattern(&pattern);
    h.playing = false;
    for _ in 0..60 {
        h.tick(speed_at(100), 100);
    }

    assert_eq!(h.timeline.pending_releases(), 0);
    assert!(h.timeline.notes().iter().all(|n| !n.played && !n.active));
}

#[test]
fn test_release_waits_for_fixed_delay() {
    let config = TimelineConfig {
        frame_interval_ms: 10.0,
        ..Default::default()
    };
    let mut h = Harness::new(config);
    h.timeline.load_pattern(&arpeggio());

    while !h.timeline.notes()[0].active {
        h.tick(speed_at(100), 100);
    }
    let activated_at = h.clock_ms;

    while h.timeline.notes()[0].active {
        h.tick(speed_at(100), 100);
    }
    let released_after = h.clock_ms - activated_at;
    assert!(h.timeline.notes()[0].played);
    assert!((500.0..510.0).contains(&released_after), "{}", released_after);
}

#[test]
fn test_note_length_release_follows_tempo() {
    let config = TimelineConfig {
        frame_interval_ms: 10.0,
        release: ReleaseDelay::NoteLength,
        ..Default::default()
    };
    assert_eq!(config.release.delay_ms(120), 500.0);
    assert_eq!(config.release.delay_ms(60), 1000.0);

    let mut h = Harness::new(config);
    h.timeline.load_pattern(&arpeggio());
    while !h.timeline.notes()[0].active {
        h.tick(speed_at(60), 60);
    }
    let activated_at = h.clock_ms;
    while h.timeline.notes()[0].active {
        h.tick(speed_at(60), 60);
    }
    let released_after = h.clock_ms - activated_at;
    assert!((1000.0..1010.0).contains(&released_after), "{}", released_after);
}

#[test]
fn test_rest_latches_without_sound_or_highlight() {
    let mut h = Harness::new(TimelineConfig::default());
    h.timeline.load_pattern(&Pattern::new(
        "rest",
        vec![
            PatternEntry::new(Pitch::Rest, 0, 1),
            PatternEntry::new(Pitch::E4, 0, 1),
        ],
    ));

    let activations = Rc::new(RefCell::new(0));
    let count = activations.clone();
    h.events
        .subscribe(Topic::NoteActivated, move |_| *count.borrow_mut() += 1);

    for _ in 0..600 {
        h.tick(speed_at(100), 100);
    }
    assert!(h.timeline.is_complete());
    assert_eq!(*activations.borrow(), 1);
    assert_eq!(*h.plays.borrow(), vec![("E4".to_string(), 0.6)]);
}

#[test]
fn test_every_tempo_in_range_triggers_each_note_once() {
    let config = TimelineConfig::default();
    assert!(speed_at(180) < config.max_safe_speed());

    for bpm in 60..=180u16 {
        let mut h = Harness::new(config.clone());
        h.timeline.load_pattern(&arpeggio());
        for _ in 0..2000 {
            h.tick(speed_at(bpm), bpm);
        }
        assert_eq!(h.play_count(), 4, "wrong trigger count at {} bpm", bpm);
    }
}

#[test]
fn test_speed_past_bound_can_skip_window() {
    // One note starting 6 px right of the play-line: an 11 px step lands at -5,
    // outside the 5 px tolerance, and the note never fires.
    let config = TimelineConfig {
        lead_distance: 6.0,
        ..Default::default()
    };
    assert!(11.0 >= config.max_safe_speed());

    let mut h = Harness::new(config);
    h.timeline.load_pattern(&Pattern::new(
        "single",
        vec![PatternEntry::new(Pitch::E4, 0, 1)],
    ));
    for _ in 0..100 {
        h.tick(11.0, 180);
    }
    assert_eq!(h.play_count(), 0);
    assert!(!h.timeline.notes()[0].played);
}

#[test]
fn test_audio_failure_does_not_disturb_timeline() {
    let mut h = Harness::new(TimelineConfig::default());
    h.audio = AudioGateway::silent(); // never initialized
    h.timeline.load_pattern(&arpeggio());

    for _ in 0..1000 {
        h.tick(speed_at(100), 100);
    }
    assert!(h.timeline.is_complete());
}

#[test]
fn test_playback_event_only_when_audio_plays() {
    let mut h = Harness::new(TimelineConfig::default());
    h.audio = AudioGateway::silent(); // never initialized
    h.timeline.load_pattern(&arpeggio());

    let activated = Rc::new(RefCell::new(0));
    let started = Rc::new(RefCell::new(Vec::new()));
    let count = activated.clone();
    h.events
        .subscribe(Topic::NoteActivated, move |_| *count.borrow_mut() += 1);
    let keys = started.clone();
    h.events.subscribe(Topic::PlaybackStarted, move |event| {
        if let Event::PlaybackStarted { sample_key, .. } = event {
            keys.borrow_mut().push(sample_key.clone());
        }
    });

    for _ in 0..1000 {
        h.tick(speed_at(100), 100);
    }
    assert_eq!(*activated.borrow(), 4);
    assert!(started.borrow().is_empty());

    assert!(h.audio.initialize());
    h.timeline.load_pattern(&arpeggio());
    for _ in 0..1000 {
        h.tick(speed_at(100), 100);
    }
    assert_eq!(*activated.borrow(), 8);
    assert_eq!(*started.borrow(), vec!["C4", "E4", "G4", "C5"]);
}

#[test]
fn test_snapshot_reports_render_data() {
    let mut timeline = NoteTimeline::new(TimelineConfig::default());
    timeline.load_pattern(&arpeggio());

    let snapshot = timeline.snapshot();
    assert_eq!(snapshot.generation, 1);
    assert_eq!(snapshot.notes.len(), 4);
    assert_eq!(snapshot.notes[0].staff_offset, Pitch::C4.staff_offset());
    assert!(!snapshot.complete);

    let yaml = serde_yaml::to_string(&snapshot).unwrap();
    assert!(yaml.contains("playLineX"));
    assert!(yaml.contains("staffOffset"));
}
