use runtime::{Event, EventBus};

use crate::composer::ComposeError;
use crate::session::{MapEvent, MapSession, SessionConfig};

/// Pairs a session with the event bus that feeds it.
#[derive(Debug)]
pub struct SessionHost {
    session: MapSession,
    bus: EventBus<MapEvent>,
}

impl SessionHost {
    pub fn new(config: SessionConfig) -> Result<Self, ComposeError> {
        Ok(Self {
            session: MapSession::new(config)?,
            bus: EventBus::new(),
        })
    }

    pub fn session(&self) -> &MapSession {
        &self.session
    }

    /// Queues `event` and runs it (and anything queued before it) to
    /// completion.
    pub fn post(&mut self, event: MapEvent) -> usize {
        self.bus.emit(event);
        self.bus.dispatch(&mut self.session)
    }

    pub fn trace(&self) -> &[Event] {
        self.bus.events()
    }
}
