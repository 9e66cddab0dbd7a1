use std::{fmt, time::Duration};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::{LoadError, ModuleBuffer};

type Outcome = std::result::Result<ModuleBuffer, String>;

/// Creates a linked resolver/completion pair for one load.
///
/// The resolver is consumed by fulfilling it, so a load can complete at most
/// once. Dropping it unfulfilled surfaces as [`LoadError::Abandoned`].
pub fn load_channel() -> (LoadResolver, LoadCompletion) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    (LoadResolver { tx }, LoadCompletion { rx })
}

/// Engine-side half of a load. May be moved to a worker thread.
pub struct LoadResolver {
    tx: Sender<Outcome>,
}

impl LoadResolver {
    pub fn resolve(self, buffer: ModuleBuffer) {
        self.send(Ok(buffer));
    }

    pub fn reject(self, reason: impl Into<String>) {
        self.send(Err(reason.into()));
    }

    fn send(self, outcome: Outcome) {
        // The session drops its completion after a timeout; late results go nowhere.
        if self.tx.send(outcome).is_err() {
            tracing::debug!("load finished after the session stopped waiting");
        }
    }
}

impl fmt::Debug for LoadResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadResolver").finish()
    }
}

/// Session-side half of a load.
pub struct LoadCompletion {
    rx: Receiver<Outcome>,
}

/// Result of polling a [`LoadCompletion`] without blocking.
#[derive(Debug)]
pub enum LoadPoll {
    /// Not finished yet; the completion is handed back for the next poll.
    Pending(LoadCompletion),
    Ready(ModuleBuffer),
    Failed(LoadError),
}

impl LoadCompletion {
    /// Completion that has already failed, for engines that can refuse a file
    /// without starting any work.
    pub fn rejected(reason: impl Into<String>) -> Self {
        let (resolver, completion) = load_channel();
        resolver.reject(reason);
        completion
    }

    pub fn poll(self) -> LoadPoll {
        match self.rx.try_recv() {
            Ok(outcome) => outcome_to_poll(outcome),
            Err(TryRecvError::Empty) => LoadPoll::Pending(self),
            Err(TryRecvError::Disconnected) => LoadPoll::Failed(LoadError::Abandoned),
        }
    }

    /// Blocks for up to `timeout`. Only meant for one-shot tools; the session
    /// itself never blocks.
    pub fn wait(self, timeout: Duration) -> std::result::Result<ModuleBuffer, LoadError> {
        match self.rx.recv_timeout(timeout) {
            Ok(Ok(buffer)) => Ok(buffer),
            Ok(Err(reason)) => Err(LoadError::Rejected(reason)),
            Err(RecvTimeoutError::Timeout) => Err(LoadError::TimedOut(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(LoadError::Abandoned),
        }
    }
}

fn outcome_to_poll(outcome: Outcome) -> LoadPoll {
    match outcome {
        Ok(buffer) => LoadPoll::Ready(buffer),
        Err(reason) => LoadPoll::Failed(LoadError::Rejected(reason)),
    }
}

impl fmt::Debug for LoadCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadCompletion")
            .field("ready", &!self.rx.is_empty())
            .finish()
    }
}
