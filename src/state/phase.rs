/// Controller phase definitions
///
/// A controller starts `Idle`, runs one session at a time and always comes
/// back to `Idle` once the session has been finalized.
use std::fmt;

/// Represents the lifecycle phase of the crawl controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    // ===== Resting State =====
    /// No session is active; a new one may be started
    Idle,

    // ===== Active States =====
    /// The crawl loop is consuming the frontier
    Running,

    /// Pausable operations are blocked on the gate
    Paused,

    // ===== Exit States =====
    /// The session ended because a stop was requested
    Stopped,

    /// The session ended because the frontier or the page budget ran out
    Completed,
}

impl CrawlPhase {
    /// Returns true while a session owns the controller
    ///
    /// This drives the console's busy indicator.
    pub fn is_busy(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Returns true if the crawl loop is still live (running or paused)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    /// Returns true for the exit states a session passes through before Idle
    pub fn is_exit(&self) -> bool {
        matches!(self, Self::Stopped | Self::Completed)
    }

    /// Returns a lowercase label for log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Completed => "completed",
        }
    }

    /// Checks whether a transition from this phase to another is valid
    ///
    /// # Valid Transitions
    ///
    /// - Idle → Running
    /// - Running → Paused, Stopped, Completed
    /// - Paused → Running, Stopped, Completed
    /// - Stopped, Completed → Idle
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        matches!(
            (self, next),
            (Idle, Running)
                | (Running, Paused)
                | (Running, Stopped)
                | (Running, Completed)
                | (Paused, Running)
                | (Paused, Stopped)
                | (Paused, Completed)
                | (Stopped, Idle)
                | (Completed, Idle)
        )
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
