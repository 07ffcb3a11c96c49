//! Cooperative pause/stop gate
//!
//! Every pausable operation (frontier pops, per-link iteration, per-chunk
//! writes) awaits [`CrawlControl::checkpoint`]. While paused the call parks on
//! a `watch` channel until the signal changes; a stop always opens the gate so
//! a paused session can still unwind.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Run,
    Pause,
    Stop,
}

/// What a caller should do after passing a checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// Keep working
    Proceed,
    /// Unwind promptly; no further work should start
    Stop,
}

/// Shared stop/pause flags for one crawl session
///
/// Clones share the same underlying signal.
#[derive(Debug, Clone)]
pub struct CrawlControl {
    signal: Arc<watch::Sender<Signal>>,
}

impl CrawlControl {
    pub fn new() -> Self {
        let (signal, _) = watch::channel(Signal::Run);
        Self {
            signal: Arc::new(signal),
        }
    }

    /// Closes the gate. Returns false if already paused or stopped.
    pub fn pause(&self) -> bool {
        self.signal.send_if_modified(|signal| {
            if *signal == Signal::Run {
                *signal = Signal::Pause;
                true
            } else {
                false
            }
        })
    }

    /// Reopens the gate. Returns false if not paused.
    pub fn resume(&self) -> bool {
        self.signal.send_if_modified(|signal| {
            if *signal == Signal::Pause {
                *signal = Signal::Run;
                true
            } else {
                false
            }
        })
    }

    /// Requests a stop and forces the gate open. Returns false if already stopped.
    pub fn stop(&self) -> bool {
        self.signal.send_if_modified(|signal| {
            if *signal == Signal::Stop {
                false
            } else {
                *signal = Signal::Stop;
                true
            }
        })
    }

    pub fn is_paused(&self) -> bool {
        *self.signal.borrow() == Signal::Pause
    }

    pub fn is_stop_requested(&self) -> bool {
        *self.signal.borrow() == Signal::Stop
    }

    /// Blocks while paused, then reports whether to proceed or stop
    pub async fn checkpoint(&self) -> Checkpoint {
        let mut receiver = self.signal.subscribe();
        let signal = receiver
            .wait_for(|signal| *signal != Signal::Pause)
            .await
            .map(|signal| *signal);

        match signal {
            Ok(Signal::Run) => Checkpoint::Proceed,
            // The sender lives as long as `self`, so Err is unreachable in practice
            Ok(_) | Err(_) => Checkpoint::Stop,
        }
    }
}

impl Default for CrawlControl {
    fn default() -> Self {
        Self::new()
    }
}
