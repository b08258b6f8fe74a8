//! Mock construction helpers

use co2_overlay::backend::{MessageSource, TransportEvent};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Message source that replays a fixed list of events
///
/// Once the script runs out it reports [`TransportEvent::Idle`], sleeping for
/// the poll timeout like a quiet broker would.
pub struct ScriptedSource {
    events: VecDeque<TransportEvent>,
    closed: Arc<AtomicBool>,
}

impl ScriptedSource {
    pub fn new(events: Vec<TransportEvent>) -> Self {
        Self {
            events: events.into(),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag set once the worker closes the source
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }
}

impl MessageSource for ScriptedSource {
    fn poll(&mut self, timeout: Duration) -> TransportEvent {
        match self.events.pop_front() {
            Some(event) => event,
            None => {
                std::thread::sleep(timeout);
                TransportEvent::Idle
            }
        }
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn describe(&self) -> String {
        format!("scripted source ({} events left)", self.events.len())
    }
}
