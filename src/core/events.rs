//! Lifecycle events handed to the view layer
//!
//! Events carry plain data only. The view drains them once per frame with
//! the non-blocking `EventStream::poll`.

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use tracing::{debug, warn};

use crate::core::protocol::{Position, RaceStatus, Racer, Track};
use crate::core::types::{RaceId, RacerId, TrackId};

// =============================================================================
// EVENTS
// =============================================================================

/// Which candidate list a selection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    Track,
    Racer,
}

/// Events emitted by the lifecycle controller and the input router
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// Track catalog loaded
    TracksLoaded(Vec<Track>),
    /// Racer catalog loaded
    RacersLoaded(Vec<Racer>),
    /// A track or racer was chosen
    Selected { kind: SelectionKind, name: String },
    /// Race exists on the server; switch to the in-race view
    /// `racer_id` is the racer the run was submitted with
    RaceCreated {
        race_id: RaceId,
        racer_id: RacerId,
        track_id: TrackId,
        track_label: String,
    },
    /// Remaining countdown seconds
    CountdownTick(u32),
    /// In-progress positions
    Progress(Vec<Position>),
    /// Final positions
    Finished(Vec<Position>),
    /// Poller stopped on a status other than in-progress/finished
    Stopped(RaceStatus),
    /// Race submission rejected before contacting the server. Does not end
    /// a run already in flight.
    ValidationFailed(String),
    /// Lifecycle aborted
    Error(String),
    /// A fire-and-forget call failed; the lifecycle continues
    Degraded {
        operation: &'static str,
        message: String,
    },
}

impl LifecycleEvent {
    /// Events after which no further race events follow for the run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleEvent::Finished(_) | LifecycleEvent::Stopped(_) | LifecycleEvent::Error(_)
        )
    }
}

// =============================================================================
// CHANNEL
// =============================================================================

/// Create a connected sink/stream pair
pub fn event_channel() -> (EventSink, EventStream) {
    let (tx, rx) = unbounded();
    (EventSink { tx }, EventStream { rx })
}

/// Sending half, cloned into every component that emits events
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Sender<LifecycleEvent>,
}

impl EventSink {
    pub fn emit(&self, event: LifecycleEvent) {
        debug!(?event, "[events] Emit");
        if self.tx.send(event).is_err() {
            warn!("[events] View layer gone, event dropped");
        }
    }
}

/// Receiving half, owned by the view layer
#[derive(Debug)]
pub struct EventStream {
    rx: Receiver<LifecycleEvent>,
}

impl EventStream {
    /// Next pending event, if any (non-blocking)
    pub fn poll(&self) -> Option<LifecycleEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// All pending events
    pub fn drain(&self) -> Vec<LifecycleEvent> {
        std::iter::from_fn(|| self.poll()).collect()
    }
}
