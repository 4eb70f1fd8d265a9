use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use tracing::{debug, warn};

/// Work running on a helper thread whose result is picked up by the UI
/// thread. The worker never touches UI state; it only sends its result.
#[derive(Debug)]
pub struct BackgroundJob<T> {
    name: &'static str,
    receiver: Option<Receiver<T>>,
}

impl<T: Send + 'static> BackgroundJob<T> {
    /// Spawn `work`. `notify` runs on the worker right after the result is
    /// sent, e.g. to wake the UI event loop.
    pub fn spawn<F, N>(name: &'static str, work: F, notify: N) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
        N: FnOnce() + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let spawned = thread::Builder::new().name(name.to_string()).spawn(move || {
            let result = work();
            if sender.send(result).is_ok() {
                notify();
            }
        });
        match spawned {
            Ok(_) => BackgroundJob {
                name,
                receiver: Some(receiver),
            },
            Err(err) => {
                warn!("could not start {}: {}", name, err);
                BackgroundJob { name, receiver: None }
            }
        }
    }

    /// Take the result if it has arrived. Returns `None` while the job is
    /// still running and after the result was taken.
    pub fn try_take(&mut self) -> Option<T> {
        let receiver = self.receiver.as_ref()?;
        match receiver.try_recv() {
            Ok(value) => {
                debug!("{} finished", self.name);
                self.receiver = None;
                Some(value)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!("{} ended without a result", self.name);
                self.receiver = None;
                None
            }
        }
    }

    /// True until the result has been taken or the worker died.
    pub fn is_pending(&self) -> bool {
        self.receiver.is_some()
    }
}
