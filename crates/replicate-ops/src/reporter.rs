//! Per-action notifications.

use tokio::sync::mpsc;

use replicate_core::Action;

/// Receives every action of a plan, in order, exactly once.
///
/// Called for dry and live runs alike, before the action is applied.
pub trait Reporter {
    /// Handle one action.
    fn report(&mut self, action: &Action);
}

impl<F> Reporter for F
where
    F: FnMut(&Action),
{
    fn report(&mut self, action: &Action) {
        self(action)
    }
}

/// Discards all notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&mut self, _action: &Action) {}
}

/// Emits one `tracing` event per action.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, action: &Action) {
        tracing::info!(
            operation = %action.operation,
            kind = %action.kind,
            path = %action.path,
            "replicate"
        );
    }
}

/// Keeps a copy of every reported action.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    actions: Vec<Action>,
}

impl CollectingReporter {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Actions reported so far.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

impl Reporter for CollectingReporter {
    fn report(&mut self, action: &Action) {
        self.actions.push(action.clone());
    }
}

/// Forwards actions to an unbounded channel, e.g. for a UI task.
///
/// A closed receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<Action>,
}

impl ChannelReporter {
    /// Create a reporter and the receiving end.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Reporter for ChannelReporter {
    fn report(&mut self, action: &Action) {
        let _ = self.tx.send(action.clone());
    }
}
