use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};

/// Idle -> Running -> Done. Dropping a running task returns it to Idle.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessPhase {
    Idle,
    Running,
    Done,
}

/// A unit of work preceded by a fixed delay. The delay stands in for real
/// latency (document generation, evidence processing); it cannot be aborted
/// from inside the session once started.
#[derive(Debug)]
pub struct DelayedTask {
    delay: Duration,
    phase: watch::Sender<ProcessPhase>,
}

impl DelayedTask {
    pub fn new(delay: Duration) -> Self {
        let (phase, _) = watch::channel(ProcessPhase::Idle);
        Self { delay, phase }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn phase(&self) -> ProcessPhase {
        *self.phase.borrow()
    }

    /// Observe phase transitions from elsewhere, e.g. a progress indicator.
    pub fn subscribe(&self) -> watch::Receiver<ProcessPhase> {
        self.phase.subscribe()
    }

    pub fn reset(&self) {
        self.phase.send_replace(ProcessPhase::Idle);
    }

    pub async fn run<T, F>(&self, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let mut guard = PhaseGuard {
            phase: &self.phase,
            finished: false,
        };
        self.phase.send_replace(ProcessPhase::Running);
        sleep(self.delay).await;
        let out = work.await;
        guard.finished = true;
        self.phase.send_replace(ProcessPhase::Done);
        out
    }

    /// Like [`DelayedTask::run`], but only an `Ok` result reaches `Done`.
    /// A failed run goes back to `Idle`.
    pub async fn try_run<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let mut guard = PhaseGuard {
            phase: &self.phase,
            finished: false,
        };
        self.phase.send_replace(ProcessPhase::Running);
        sleep(self.delay).await;
        let out = work.await?;
        guard.finished = true;
        self.phase.send_replace(ProcessPhase::Done);
        Ok(out)
    }
}

struct PhaseGuard<'a> {
    phase: &'a watch::Sender<ProcessPhase>,
    finished: bool,
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.phase.send_replace(ProcessPhase::Idle);
        }
    }
}

/// A flag that reads as set until a deadline passes, like the "Downloaded" badge.
#[derive(Debug, Clone, Default)]
pub struct TransientFlag {
    until: Option<Instant>,
}

impl TransientFlag {
    pub fn raise_for(&mut self, duration: Duration) {
        self.until = Some(Instant::now() + duration);
    }

    pub fn is_set(&self) -> bool {
        self.until.map(|u| Instant::now() < u).unwrap_or(false)
    }
}
