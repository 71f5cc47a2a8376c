//! Progress notifications emitted while resharers are fetched.

/// Observer notified at batch milestones of a reach computation.
///
/// Passed per call to the importer; the CLI renders a progress bar, every
/// other caller uses [`NoProgress`].
pub trait ReachProgress: Send + Sync {
    /// Work is about to start; `total` steps are expected.
    fn on_start(&self, total: u64);

    /// One step has completed.
    fn on_advance(&self);

    /// Human-readable description of the current step.
    fn on_message(&self, message: &str);

    /// All steps have completed.
    fn on_finish(&self);
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ReachProgress for NoProgress {
    fn on_start(&self, _total: u64) {}

    fn on_advance(&self) {}

    fn on_message(&self, _message: &str) {}

    fn on_finish(&self) {}
}
