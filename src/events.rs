//! Progress events for drivers that run the executor on a worker thread.
//!
//! The executor itself only knows about a callback; this module wraps a
//! crossbeam channel so a UI thread can consume progress as a stream.
//!
//! ```
//! use dirsort::events::{ProgressChannel, ProgressEvent};
//! use dirsort::executor::PlanExecutor;
//! use dirsort::planner::OrganizationPlan;
//!
//! let (sender, receiver) = ProgressChannel::new();
//! let worker = std::thread::spawn(move || {
//!     PlanExecutor::new().execute_with_events(&OrganizationPlan::default(), &sender)
//! });
//! let events: Vec<ProgressEvent> = receiver.iter().collect();
//! let summary = worker.join().unwrap();
//! assert_eq!(summary.moved_count, 0);
//! assert_eq!(events.len(), 2); // Started + Finished
//! ```

use crate::executor::ExecutionResult;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::path::PathBuf;

/// Something that happened during plan execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Execution began.
    Started { total: usize },
    /// One entry was processed; `done` is 1-based and strictly increasing.
    Progress {
        done: usize,
        total: usize,
        source: PathBuf,
        outcome: ExecutionResult,
    },
    /// Execution ended, normally or by cancellation.
    Finished {
        moved: usize,
        failed: usize,
        cancelled: bool,
    },
}

/// Sending half of a progress channel.
#[derive(Clone)]
pub struct ProgressSender {
    inner: Sender<ProgressEvent>,
}

impl ProgressSender {
    /// Send an event. If the receiver is gone the event is dropped.
    pub fn send(&self, event: ProgressEvent) {
        let _ = self.inner.send(event);
    }
}

/// Receiving half of a progress channel.
pub struct ProgressReceiver {
    inner: Receiver<ProgressEvent>,
}

impl ProgressReceiver {
    /// Block until the next event, or `None` once every sender is dropped.
    pub fn recv(&self) -> Option<ProgressEvent> {
        self.inner.recv().ok()
    }

    pub fn try_recv(&self) -> Option<ProgressEvent> {
        self.inner.try_recv().ok()
    }

    /// Iterate until every sender is dropped.
    pub fn iter(&self) -> impl Iterator<Item = ProgressEvent> + '_ {
        self.inner.iter()
    }
}

/// Constructor for progress channels.
pub struct ProgressChannel;

impl ProgressChannel {
    /// Unbounded, so the executor never blocks on a slow consumer and no
    /// event is ever coalesced.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (ProgressSender, ProgressReceiver) {
        let (sender, receiver) = unbounded();
        (
            ProgressSender { inner: sender },
            ProgressReceiver { inner: receiver },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn events_can_be_sent_across_threads() {
        let (sender, receiver) = ProgressChannel::new();

        let handle = thread::spawn(move || {
            sender.send(ProgressEvent::Started { total: 3 });
        });
        handle.join().unwrap();

        assert_eq!(receiver.recv(), Some(ProgressEvent::Started { total: 3 }));
        assert_eq!(receiver.recv(), None);
    }

    #[test]
    fn send_without_receiver_does_not_panic() {
        let (sender, receiver) = ProgressChannel::new();
        drop(receiver);
        sender.send(ProgressEvent::Started { total: 0 });
    }

    #[test]
    fn try_recv_on_empty_channel() {
        let (_sender, receiver) = ProgressChannel::new();
        assert!(receiver.try_recv().is_none());
    }
}
