//! # Event Channel
//!
//! Synchronous in-process publish/subscribe used to decouple pattern
//! selection, playback and fretboard highlighting.
//!
//! ## Delivery Rules
//! - Handlers for a topic run in registration order
//! - `publish` calls every handler before returning, on the caller's stack
//! - There is no queue: a handler that publishes recurses synchronously
//! - Handlers subscribed during a publish are not called for that publish
//!
//! Events are a closed set of tagged variants; the topic of an event is
//! derived from its variant.
//!
//! ## Example
//! ```rust
//! use fretscroll::events::{Event, EventChannel, Topic};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let channel = EventChannel::new();
//! let seen = Rc::new(Cell::new(false));
//!
//! let flag = seen.clone();
//! channel.subscribe(Topic::PlayStateChanged, move |event| {
//!     if let Event::PlayStateChanged { playing } = event {
//!         flag.set(*playing);
//!     }
//! });
//!
//! channel.publish(&Event::PlayStateChanged { playing: true });
//! assert!(seen.get());
//! ```

use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::pitch::Pitch;

/// Channel topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    PatternSelected,
    TempoChanged,
    PlayStateChanged,
    NoteActivated,
    PlaybackStarted,
}

/// Event payloads, one variant per topic
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Event {
    /// A pattern was loaded into the timeline
    #[serde(rename_all = "camelCase")]
    PatternSelected { name: String, note_count: usize },

    /// Tempo changed, with the recomputed scroll speed
    #[serde(rename_all = "camelCase")]
    TempoChanged { bpm: u16, note_speed: f64 },

    PlayStateChanged { playing: bool },

    /// A note reached the play-line; consumed by the fretboard highlighter
    #[serde(rename_all = "camelCase")]
    NoteActivated {
        index: usize,
        pitch: Pitch,
        string: u8,
        fret: u8,
        at_ms: f64,
    },

    /// A note's sample (or the fallback) was actually played
    #[serde(rename_all = "camelCase")]
    PlaybackStarted {
        sample_key: String,
        duration_secs: f64,
    },
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::PatternSelected { .. } => Topic::PatternSelected,
            Event::TempoChanged { .. } => Topic::TempoChanged,
            Event::PlayStateChanged { .. } => Topic::PlayStateChanged,
            Event::NoteActivated { .. } => Topic::NoteActivated,
            Event::PlaybackStarted { .. } => Topic::PlaybackStarted,
        }
    }
}

/// Handle returned by [`EventChannel::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&Event)>;

struct Subscription {
    id: SubscriptionId,
    topic: Topic,
    handler: Handler,
}

/// Session-scoped publish/subscribe register
#[derive(Default)]
pub struct EventChannel {
    subscriptions: RefCell<Vec<Subscription>>,
    next_id: Cell<u64>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; several handlers per topic are allowed
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscriptions.borrow_mut().push(Subscription {
            id,
            topic,
            handler: Rc::new(handler),
        });
        id
    }

    /// Remove a handler. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.borrow_mut();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }

    /// Deliver `event` to every handler of its topic, returning how many ran
    pub fn publish(&self, event: &Event) -> usize {
        let topic = event.topic();
        // Release the borrow before calling out so handlers may subscribe or publish.
        let handlers: Vec<Handler> = self
            .subscriptions
            .borrow()
            .iter()
            .filter(|s| s.topic == topic)
            .map(|s| s.handler.clone())
            .collect();

        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub fn handler_count(&self, topic: Topic) -> usize {
        self.subscriptions
            .borrow()
            .iter()
            .filter(|s| s.topic == topic)
            .count()
    }
}

impl std::fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscriptions", &self.subscriptions.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handlers_run_in_registration_order() {
        let channel = EventChannel::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let log = log.clone();
            channel.subscribe(Topic::TempoChanged, move |_| log.borrow_mut().push(label));
        }

        let ran = channel.publish(&Event::TempoChanged {
            bpm: 90,
            note_speed: 3.0,
        });
        assert_eq!(ran, 3);
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_publish_only_reaches_matching_topic() {
        let channel = EventChannel::new();
        let count = Rc::new(Cell::new(0));

        let c = count.clone();
        channel.subscribe(Topic::NoteActivated, move |_| c.set(c.get() + 1));

        assert_eq!(channel.publish(&Event::PlayStateChanged { playing: true }), 0);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_unsubscribe_removes_handler() {
        let channel = EventChannel::new();
        let id = channel.subscribe(Topic::PlayStateChanged, |_| {});
        assert_eq!(channel.handler_count(Topic::PlayStateChanged), 1);
        assert!(channel.unsubscribe(id));
        assert!(!channel.unsubscribe(id));
        assert_eq!(channel.publish(&Event::PlayStateChanged { playing: false }), 0);
    }

    #[test]
    fn test_nested_publish_recurses_synchronously() {
        let channel = Rc::new(EventChannel::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_channel = channel.clone();
        let outer_log = log.clone();
        channel.subscribe(Topic::PlayStateChanged, move |_| {
            outer_log.borrow_mut().push("play-state: before");
            inner_channel.publish(&Event::TempoChanged {
                bpm: 120,
                note_speed: 4.0,
            });
            outer_log.borrow_mut().push("play-state: after");
        });

        let tempo_log = log.clone();
        channel.subscribe(Topic::TempoChanged, move |_| {
            tempo_log.borrow_mut().push("tempo");
        });

        channel.publish(&Event::PlayStateChanged { playing: true });
        assert_eq!(
            *log.borrow(),
            vec!["play-state: before", "tempo", "play-state: after"]
        );
    }

    #[test]
    fn test_subscribing_during_publish_takes_effect_next_time() {
        let channel = Rc::new(EventChannel::new());
        let late_calls = Rc::new(Cell::new(0));

        let inner_channel = channel.clone();
        let calls = late_calls.clone();
        channel.subscribe(Topic::PatternSelected, move |_| {
            let calls = calls.clone();
            inner_channel.subscribe(Topic::PatternSelected, move |_| calls.set(calls.get() + 1));
        });

        let event = Event::PatternSelected {
            name: "x".to_string(),
            note_count: 1,
        };
        assert_eq!(channel.publish(&event), 1);
        assert_eq!(late_calls.get(), 0);
        channel.publish(&event);
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = Event::NoteActivated {
            index: 0,
            pitch: Pitch::C4,
            string: 2,
            fret: 1,
            at_ms: 10.0,
        };
        let yaml = serde_yaml::to_string(&event).unwrap();
        assert!(yaml.contains("type: note-activated"));
        assert!(yaml.contains("atMs: 10.0"));
    }
}
