//! Race lifecycle controller - create, count down, start, poll
//!
//! RaceLifecycleController sequences one lifecycle run:
//! 1. Snapshot racer/track from the session and validate them
//! 2. Create the race and record it as the active race
//! 3. Lead-in delay, then the countdown
//! 4. Start the race (failure is non-fatal)
//! 5. Poll until a terminal status
//!
//! Steps 3 to 5 are strictly sequential. Every failure is reported as a
//! lifecycle event before the run returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::core::constants::{
    COUNTDOWN_LEAD_IN, COUNTDOWN_SECONDS, COUNTDOWN_TICK, POLL_INTERVAL,
};
use crate::core::countdown::CountdownTimer;
use crate::core::error::{LifecycleError, ValidationError};
use crate::core::events::{EventSink, LifecycleEvent};
use crate::core::io_traits::RaceService;
use crate::core::poller::{PollOutcome, RaceStatusPoller};
use crate::core::protocol::{Position, Racer, Track};
use crate::core::session::{SessionPatch, SessionStore};
use crate::core::types::{RaceId, RaceRequest};

// =============================================================================
// TIMING
// =============================================================================

/// Fixed intervals of a lifecycle run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleTiming {
    pub lead_in: Duration,
    pub countdown_seconds: u32,
    pub countdown_tick: Duration,
    pub poll_interval: Duration,
}

impl Default for LifecycleTiming {
    fn default() -> Self {
        Self {
            lead_in: COUNTDOWN_LEAD_IN,
            countdown_seconds: COUNTDOWN_SECONDS,
            countdown_tick: COUNTDOWN_TICK,
            poll_interval: POLL_INTERVAL,
        }
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// Result of a lifecycle run that reached the poller
#[derive(Debug, Clone, PartialEq)]
pub struct RaceOutcome {
    pub race_id: RaceId,
    pub request: RaceRequest,
    pub poll: PollOutcome,
}

impl RaceOutcome {
    /// Final positions, if the race finished
    pub fn final_positions(&self) -> Option<&[Position]> {
        match &self.poll {
            PollOutcome::Finished(positions) => Some(positions),
            _ => None,
        }
    }
}

/// Catalog loaded at startup. `None` means that fetch failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub tracks: Option<Vec<Track>>,
    pub racers: Option<Vec<Racer>>,
}

/// Clears the running flag when a run ends, including on task abort
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| RunGuard(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

pub struct RaceLifecycleController {
    service: Arc<dyn RaceService>,
    store: SessionStore,
    events: EventSink,
    timing: LifecycleTiming,
    running: AtomicBool,
}

impl RaceLifecycleController {
    pub fn new(service: Arc<dyn RaceService>, store: SessionStore, events: EventSink) -> Self {
        Self {
            service,
            store,
            events,
            timing: LifecycleTiming::default(),
            running: AtomicBool::new(false),
        }
    }

    pub fn with_timing(mut self, timing: LifecycleTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    /// True while a lifecycle run is between creation and poller termination
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Fetch tracks and racers. Each success emits its loaded event; a
    /// failure is logged and leaves that half of the catalog empty.
    pub async fn load_catalog(&self) -> Catalog {
        let (tracks, racers) = tokio::join!(self.service.list_tracks(), self.service.list_racers());

        let tracks = match tracks {
            Ok(tracks) => {
                info!(count = tracks.len(), "[lifecycle] Tracks loaded");
                self.events.emit(LifecycleEvent::TracksLoaded(tracks.clone()));
                Some(tracks)
            }
            Err(e) => {
                warn!(error = %e, "[lifecycle] Problem getting tracks");
                None
            }
        };

        let racers = match racers {
            Ok(racers) => {
                info!(count = racers.len(), "[lifecycle] Racers loaded");
                self.events.emit(LifecycleEvent::RacersLoaded(racers.clone()));
                Some(racers)
            }
            Err(e) => {
                warn!(error = %e, "[lifecycle] Problem getting racers");
                None
            }
        };

        Catalog { tracks, racers }
    }

    /// Run one full lifecycle from the current selection to a terminal status
    pub async fn create_and_run_race(&self) -> Result<RaceOutcome, LifecycleError> {
        let request = match self.capture_request() {
            Ok(request) => request,
            Err(e) => {
                info!(reason = %e, "[lifecycle] Race submission rejected");
                self.events.emit(LifecycleEvent::ValidationFailed(e.to_string()));
                return Err(e.into());
            }
        };

        let Some(_guard) = RunGuard::acquire(&self.running) else {
            warn!("[lifecycle] Race submitted while another is running");
            self.events.emit(LifecycleEvent::ValidationFailed(
                LifecycleError::AlreadyRunning.to_string(),
            ));
            return Err(LifecycleError::AlreadyRunning);
        };

        // 1. Create
        info!(
            racer_id = request.racer_id,
            track_id = request.track_id,
            "[lifecycle] Creating race"
        );
        let race = match self
            .service
            .create_race(request.racer_id, request.track_id)
            .await
        {
            Ok(race) => race,
            Err(e) => {
                error!(error = %e, "[lifecycle] Problem creating race");
                self.events
                    .emit(LifecycleEvent::Error(format!("Problem creating race: {}", e)));
                return Err(LifecycleError::Create(e));
            }
        };
        let race_id = race.id;
        self.store.set(SessionPatch::active_race(race_id));
        self.events.emit(LifecycleEvent::RaceCreated {
            race_id,
            racer_id: request.racer_id,
            track_id: request.track_id,
            track_label: request.track_label(),
        });

        // 2. Countdown
        tokio::time::sleep(self.timing.lead_in).await;
        let mut timer = CountdownTimer::with_tick(self.timing.countdown_tick);
        let tick_events = self.events.clone();
        if let Err(e) = timer
            .start(self.timing.countdown_seconds, move |remaining| {
                tick_events.emit(LifecycleEvent::CountdownTick(remaining))
            })
            .await
        {
            error!(error = %e, "[lifecycle] Countdown failed");
            self.events.emit(LifecycleEvent::Error(e.to_string()));
            return Err(LifecycleError::Countdown);
        }

        // 3. Start
        if let Err(e) = self.service.start_race(race_id).await {
            warn!(race_id, error = %e, "[lifecycle] Problem starting race, polling anyway");
            self.events.emit(LifecycleEvent::Degraded {
                operation: "start_race",
                message: e.to_string(),
            });
        } else {
            debug!(race_id, "[lifecycle] Race started");
        }

        // 4. Poll
        let poller = RaceStatusPoller::new(Arc::clone(&self.service), self.events.clone())
            .with_interval(self.timing.poll_interval)
            .start(race_id);
        debug!(race_id = poller.race_id(), "[lifecycle] Polling race status");
        let poll = poller.wait().await;
        info!(race_id, outcome = ?poll, "[lifecycle] Race run complete");

        Ok(RaceOutcome {
            race_id,
            request,
            poll,
        })
    }

    /// Accelerate the active race. Returns false (and sends nothing) when no
    /// race has been created yet.
    pub async fn accelerate(&self) -> bool {
        let Some(race_id) = self.store.active_race_id() else {
            debug!("[lifecycle] Accelerate ignored, no active race");
            return false;
        };

        if let Err(e) = self.service.accelerate(race_id).await {
            warn!(race_id, error = %e, "[lifecycle] Problem accelerating");
            self.events.emit(LifecycleEvent::Degraded {
                operation: "accelerate",
                message: e.to_string(),
            });
        }
        true
    }

    fn capture_request(&self) -> Result<RaceRequest, ValidationError> {
        let state = self.store.get();
        match (state.selected_racer_id, state.selected_track_id) {
            (Some(racer_id), Some(track_id)) => Ok(RaceRequest {
                racer_id,
                track_id,
                track_name: state.selected_track_name,
            }),
            (None, None) => Err(ValidationError::MissingSelection),
            (None, Some(_)) => Err(ValidationError::MissingRacer),
            (Some(_), None) => Err(ValidationError::MissingTrack),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
