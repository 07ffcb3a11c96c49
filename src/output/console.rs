//! Controller → console event stream

use crate::output::CrawlReport;
use tokio::sync::mpsc;

/// Messages delivered to the operator console
#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    /// One log line, in emission order
    Log(String),

    /// Busy indicator changed (drives progress display and control enablement)
    Busy(bool),

    /// A session was finalized
    Finished(CrawlReport),
}

/// Cloneable sending half of the console stream
///
/// Sending never fails from the caller's point of view: if the console has
/// gone away the events are dropped.
#[derive(Debug, Clone)]
pub struct ConsoleSink {
    events: Option<mpsc::UnboundedSender<ConsoleEvent>>,
}

impl ConsoleSink {
    /// Creates a sink and the receiver the console reads from
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ConsoleEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { events: Some(tx) }, rx)
    }

    /// A sink that discards everything
    pub fn disabled() -> Self {
        Self { events: None }
    }

    /// Appends a log line, mirrored to tracing
    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(target: "trawler::console", "{}", message);
        self.send(ConsoleEvent::Log(message));
    }

    pub fn busy(&self, busy: bool) {
        self.send(ConsoleEvent::Busy(busy));
    }

    pub fn finished(&self, report: CrawlReport) {
        self.send(ConsoleEvent::Finished(report));
    }

    fn send(&self, event: ConsoleEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}
