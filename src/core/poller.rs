//! Race status poller - fetches race state until a terminal status
//!
//! `Idle -> Polling -> Terminated`. The first fetch happens immediately, the
//! next ones on a fixed cadence. Fetches run inside the polling task itself,
//! so a slow fetch delays the next tick instead of overlapping it.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::core::constants::{MIN_TIMER_PERIOD, POLL_INTERVAL};
use crate::core::events::{EventSink, LifecycleEvent};
use crate::core::io_traits::RaceService;
use crate::core::protocol::{Position, Race, RaceStatus};
use crate::core::types::RaceId;

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// What one fetched status means for the loop
#[derive(Debug, Clone, PartialEq)]
pub enum PollStep {
    /// In progress: report positions and keep polling
    Continue(Vec<Position>),
    /// Finished: report final positions and stop
    Finished(Vec<Position>),
    /// Any other status: stop and report the raw status
    Stop(RaceStatus),
}

pub fn classify(race: Race) -> PollStep {
    match race.status {
        RaceStatus::InProgress => PollStep::Continue(race.positions),
        RaceStatus::Finished => PollStep::Finished(race.positions),
        other => PollStep::Stop(other),
    }
}

/// How a polling run terminated
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Finished(Vec<Position>),
    Stopped(RaceStatus),
    Cancelled,
    /// The polling task died; an `Error` event has been emitted
    Failed(String),
}

// =============================================================================
// POLLER
// =============================================================================

/// An idle poller. `start` consumes it, so a poller runs at most once.
pub struct RaceStatusPoller {
    service: Arc<dyn RaceService>,
    events: EventSink,
    interval: Duration,
}

impl RaceStatusPoller {
    pub fn new(service: Arc<dyn RaceService>, events: EventSink) -> Self {
        Self {
            service,
            events,
            interval: POLL_INTERVAL,
        }
    }

    /// Periods below `MIN_TIMER_PERIOD` are raised to it
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_TIMER_PERIOD);
        self
    }

    /// Spawn the polling task on the current runtime
    pub fn start(self, race_id: RaceId) -> PollerHandle {
        let cancel = CancellationToken::new();
        let skipped = Arc::new(AtomicU32::new(0));

        info!(race_id, interval_ms = self.interval.as_millis() as u64, "[poller] Starting");
        let task = tokio::spawn(poll_loop(
            self.service,
            self.events.clone(),
            race_id,
            self.interval,
            cancel.clone(),
            Arc::clone(&skipped),
        ));

        PollerHandle {
            race_id,
            events: self.events,
            cancel,
            task,
            skipped,
        }
    }
}

/// Handle to a running poller
pub struct PollerHandle {
    race_id: RaceId,
    events: EventSink,
    cancel: CancellationToken,
    task: JoinHandle<PollOutcome>,
    skipped: Arc<AtomicU32>,
}

impl PollerHandle {
    pub fn race_id(&self) -> RaceId {
        self.race_id
    }

    /// Stop polling. An in-flight fetch is abandoned.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once the poller has terminated
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Number of ticks whose fetch failed
    pub fn skipped_ticks(&self) -> u32 {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Wait for termination. A task that died without reaching a terminal
    /// status is reported as an `Error` event.
    pub async fn wait(self) -> PollOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => {
                warn!(race_id = self.race_id, "[poller] Task aborted");
                PollOutcome::Cancelled
            }
            Err(e) => {
                error!(race_id = self.race_id, error = %e, "[poller] Task failed");
                let message = format!("Race status polling stopped: {}", e);
                self.events.emit(LifecycleEvent::Error(message.clone()));
                PollOutcome::Failed(message)
            }
        }
    }
}

async fn poll_loop(
    service: Arc<dyn RaceService>,
    events: EventSink,
    race_id: RaceId,
    period: Duration,
    cancel: CancellationToken,
    skipped: Arc<AtomicU32>,
) -> PollOutcome {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = service.get_race(race_id) => result,
        };

        let race = match fetched {
            Ok(race) => race,
            Err(e) => {
                skipped.fetch_add(1, Ordering::SeqCst);
                warn!(race_id, error = %e, "[poller] Fetch failed, waiting for next tick");
                continue;
            }
        };

        match classify(race) {
            PollStep::Continue(positions) => {
                debug!(race_id, count = positions.len(), "[poller] In progress");
                events.emit(LifecycleEvent::Progress(positions));
            }
            PollStep::Finished(positions) => {
                info!(race_id, "[poller] Race finished");
                events.emit(LifecycleEvent::Finished(positions.clone()));
                return PollOutcome::Finished(positions);
            }
            PollStep::Stop(status) => {
                warn!(race_id, status = %status, "[poller] Stopped on non-running status");
                events.emit(LifecycleEvent::Stopped(status.clone()));
                return PollOutcome::Stopped(status);
            }
        }
    }

    info!(race_id, "[poller] Cancelled");
    PollOutcome::Cancelled
}

// =============================================================================
// TESTS
// =============================================================================
