/// Task state definitions for the traversal state machine
///
/// Every crawl task moves through these states exactly once, in order:
/// `Queued → Fetching → Extracted → EnqueuingChildren → Done`, or ends in
/// `Failed` straight after `Fetching`.
use serde::Serialize;
use std::fmt;

/// Represents the current state of a crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    // ===== Active States =====
    /// Task is in the frontier waiting to be processed
    Queued,

    /// Content is being obtained (network fetch or override lookup)
    Fetching,

    /// Content was parsed into a page record
    Extracted,

    /// Same-host children are being pushed onto the frontier
    EnqueuingChildren,

    // ===== Terminal States =====
    /// Task finished; its page was processed (and mirrored, if enabled)
    Done,

    /// Content could not be obtained; the node was not expanded
    Failed,
}

impl TaskState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if the state machine allows moving from `self` to `next`
    ///
    /// `Fetching → Done` covers non-HTML bodies, which are stored but never
    /// parsed; `Extracted → Done` covers pages at the depth limit.
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Fetching)
                | (Self::Fetching, Self::Extracted)
                | (Self::Fetching, Self::Failed)
                | (Self::Fetching, Self::Done)
                | (Self::Extracted, Self::EnqueuingChildren)
                | (Self::Extracted, Self::Done)
                | (Self::EnqueuingChildren, Self::Done)
        )
    }

    /// Stable lowercase name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Fetching => "fetching",
            Self::Extracted => "extracted",
            Self::EnqueuingChildren => "enqueuing-children",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
