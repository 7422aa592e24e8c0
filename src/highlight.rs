//! Fretboard highlighting driven by `NoteActivated` events.
//!
//! Each activation lights its string/fret position for a fixed time. A new
//! activation of the same position restarts its timer.

use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

use crate::events::{Event, EventChannel, SubscriptionId, Topic};

/// A lit fretboard position
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub string: u8,
    pub fret: u8,
    pub expires_at_ms: f64,
}

#[derive(Debug, Clone)]
pub struct FretHighlighter {
    duration_ms: f64,
    lit: Rc<RefCell<Vec<Highlight>>>,
}

impl FretHighlighter {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            lit: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Start listening for activations on `events`
    pub fn attach(&self, events: &EventChannel) -> SubscriptionId {
        let lit = self.lit.clone();
        let duration_ms = self.duration_ms;
        events.subscribe(Topic::NoteActivated, move |event| {
            if let Event::NoteActivated {
                string, fret, at_ms, ..
            } = *event
            {
                let mut lit = lit.borrow_mut();
                lit.retain(|h| !(h.string == string && h.fret == fret));
                lit.push(Highlight {
                    string,
                    fret,
                    expires_at_ms: at_ms + duration_ms,
                });
            }
        })
    }

    /// Drop highlights whose time is up
    pub fn expire(&self, now_ms: f64) {
        self.lit.borrow_mut().retain(|h| h.expires_at_ms > now_ms);
    }

    pub fn clear(&self) {
        self.lit.borrow_mut().clear();
    }

    pub fn highlights(&self) -> Vec<Highlight> {
        self.lit.borrow().clone()
    }

    pub fn is_lit(&self, string: u8, fret: u8) -> bool {
        self.lit
            .borrow()
            .iter()
            .any(|h| h.string == string && h.fret == fret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::Pitch;

    fn activation(string: u8, fret: u8, at_ms: f64) -> Event {
        Event::NoteActivated {
            index: 0,
            pitch: Pitch::C4,
            string,
            fret,
            at_ms,
        }
    }

    #[test]
    fn test_activation_lights_position_until_expiry() {
        let events = EventChannel::new();
        let highlighter = FretHighlighter::new(300.0);
        highlighter.attach(&events);

        events.publish(&activation(2, 1, 1000.0));
        assert!(highlighter.is_lit(2, 1));

        highlighter.expire(1299.0);
        assert!(highlighter.is_lit(2, 1));
        highlighter.expire(1300.0);
        assert!(!highlighter.is_lit(2, 1));
    }

    #[test]
    fn test_repeat_activation_restarts_timer() {
        let events = EventChannel::new();
        let highlighter = FretHighlighter::new(300.0);
        highlighter.attach(&events);

        events.publish(&activation(1, 0, 0.0));
        events.publish(&activation(1, 0, 200.0));
        assert_eq!(highlighter.highlights().len(), 1);

        highlighter.expire(400.0);
        assert!(highlighter.is_lit(1, 0));
    }

    #[test]
    fn test_ignores_other_topics_and_detaches() {
        let events = EventChannel::new();
        let highlighter = FretHighlighter::new(300.0);
        let id = highlighter.attach(&events);

        events.publish(&Event::PlayStateChanged { playing: true });
        assert!(highlighter.highlights().is_empty());

        events.unsubscribe(id);
        events.publish(&activation(3, 2, 0.0));
        assert!(highlighter.highlights().is_empty());
    }
}
