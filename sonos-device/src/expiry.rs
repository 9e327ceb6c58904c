//! Cancel-then-set expiration timer.
//!
//! At most one expiry task is pending per timer. Every schedule bumps a
//! generation counter; a fired task must present its generation to
//! [`ExpiryTimer::fire`], so a task that was superseded while already waking
//! up can never be mistaken for the live one.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Longest window a timer is armed for; longer requests are clamped to it
pub(crate) const MAX_EXPIRY: Duration = Duration::from_secs(86400 * 365 * 30);

#[derive(Debug, Default)]
pub(crate) struct ExpiryTimer {
    handle: Option<JoinHandle<()>>,
    deadline: Option<Instant>,
    generation: u64,
}

impl ExpiryTimer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending expiry and run `on_expire` after `after`
    ///
    /// Returns the generation handed to `on_expire`.
    pub(crate) fn schedule<F>(&mut self, runtime: &Handle, after: Duration, on_expire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();

        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let deadline = Instant::now() + after.min(MAX_EXPIRY);

        self.handle = Some(runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            on_expire(generation);
        }));
        self.deadline = Some(deadline);

        generation
    }

    /// Abort the pending expiry, if any
    pub(crate) fn cancel(&mut self) -> bool {
        self.deadline = None;
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Called from a fired task: clears the handle if `generation` is still live
    pub(crate) fn fire(&mut self, generation: u64) -> bool {
        if self.handle.is_none() || self.generation != generation {
            return false;
        }
        self.handle = None;
        self.deadline = None;
        true
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl Drop for ExpiryTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
