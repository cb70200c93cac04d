//! Process-wide async reporting policy.

/// Decides whether a completed operation is reported as "accepted, poll
/// for completion".
///
/// Read-only after construction and shared by every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsyncPolicy {
    enabled: bool,
}

impl AsyncPolicy {
    /// Create a policy.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Whether asynchronous reporting is enabled at all.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Resolve the `async` flag of a response.
    ///
    /// Only callers that accept incomplete results ever see `true`.
    pub fn resolve(&self, accepts_incomplete: bool) -> bool {
        accepts_incomplete && self.enabled
    }
}
