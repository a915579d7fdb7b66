use std::collections::VecDeque;

/// Implemented by event enums so the bus can keep a readable trace.
pub trait EventKind {
    fn kind(&self) -> &'static str;
}

/// Receives events from an [`EventBus`].
///
/// Handlers get exclusive access for the duration of one event, so a
/// handler never observes two events at once.
pub trait EventHandler<E> {
    fn handle(&mut self, event: E);
}

/// Trace entry for a dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub sequence: u64,
    pub kind: &'static str,
}

/// Dispatch trace entries kept by default.
pub const DEFAULT_TRACE_LIMIT: usize = 256;

/// FIFO event queue with a bounded dispatch trace.
#[derive(Debug)]
pub struct EventBus<E> {
    pending: VecDeque<E>,
    next_sequence: u64,
    trace: Vec<Event>,
    trace_limit: usize,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            next_sequence: 0,
            trace: Vec::new(),
            trace_limit: DEFAULT_TRACE_LIMIT,
        }
    }

    pub fn with_trace_limit(mut self, trace_limit: usize) -> Self {
        self.trace_limit = trace_limit;
        self
    }

    pub fn emit(&mut self, event: E) {
        self.pending.push_back(event);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn events(&self) -> &[Event] {
        &self.trace
    }

    pub fn drain_trace(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.trace)
    }
}

impl<E: EventKind> EventBus<E> {
    /// Delivers every queued event to `handler` in emission order.
    /// Returns the number of events delivered.
    pub fn dispatch<H: EventHandler<E> + ?Sized>(&mut self, handler: &mut H) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.pending.pop_front() {
            let kind = event.kind();
            tracing::trace!(sequence = self.next_sequence, kind, "dispatching map event");
            if self.trace_limit > 0 {
                if self.trace.len() >= self.trace_limit {
                    self.trace.remove(0);
                }
                self.trace.push(Event {
                    sequence: self.next_sequence,
                    kind,
                });
            }
            self.next_sequence += 1;
            handler.handle(event);
            delivered += 1;
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, EventHandler, EventKind};

    #[derive(Debug, PartialEq)]
    enum Ping {
        A(u32),
        B,
    }

    impl EventKind for Ping {
        fn kind(&self) -> &'static str {
            match self {
                Ping::A(_) => "a",
                Ping::B => "b",
            }
        }
    }

    #[derive(Default)]
    struct Recorder(Vec<Ping>);

    impl EventHandler<Ping> for Recorder {
        fn handle(&mut self, event: Ping) {
            self.0.push(event);
        }
    }

    #[test]
    fn dispatches_in_emission_order() {
        let mut bus = EventBus::new();
        bus.emit(Ping::A(1));
        bus.emit(Ping::B);
        bus.emit(Ping::A(2));

        let mut rec = Recorder::default();
        assert_eq!(bus.dispatch(&mut rec), 3);
        assert_eq!(rec.0, vec![Ping::A(1), Ping::B, Ping::A(2)]);
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn trace_records_sequence_and_kind() {
        let mut bus = EventBus::new();
        bus.emit(Ping::B);
        bus.dispatch(&mut Recorder::default());
        bus.emit(Ping::A(7));
        bus.dispatch(&mut Recorder::default());

        let trace = bus.drain_trace();
        assert_eq!(trace.len(), 2);
        assert_eq!((trace[0].sequence, trace[0].kind), (0, "b"));
        assert_eq!((trace[1].sequence, trace[1].kind), (1, "a"));
        assert!(bus.events().is_empty());
    }

    #[test]
    fn trace_is_bounded() {
        let mut bus = EventBus::new().with_trace_limit(2);
        for i in 0..5 {
            bus.emit(Ping::A(i));
        }
        bus.dispatch(&mut Recorder::default());
        let seqs: Vec<u64> = bus.events().iter().map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![3, 4]);
    }
}
