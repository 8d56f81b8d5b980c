//! Input event router - UI interactions to session and controller calls
//!
//! Handlers are synchronous: they update the session right away and spawn
//! any server work on the runtime, returning its `JoinHandle`.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::core::error::LifecycleError;
use crate::core::events::{LifecycleEvent, SelectionKind};
use crate::core::lifecycle::{RaceLifecycleController, RaceOutcome};
use crate::core::session::SessionPatch;
use crate::core::types::{RacerId, TrackId};

/// Raw interaction from the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    TrackChosen { id: TrackId, name: String },
    RacerChosen { id: RacerId, name: String },
    RaceSubmitted,
    AcceleratePressed,
}

/// What a dispatched event set in motion
#[derive(Debug)]
pub enum Dispatched {
    /// Handled synchronously
    Selected,
    /// Lifecycle run spawned
    Race(JoinHandle<Result<RaceOutcome, LifecycleError>>),
    /// Accelerate request spawned
    Accelerate(JoinHandle<bool>),
    /// Nothing to do
    Ignored,
}

/// "Selected" visual flag over one candidate list; at most one is set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight<T> {
    selected: Option<T>,
}

impl<T: Copy + PartialEq> Highlight<T> {
    pub fn new() -> Self {
        Self { selected: None }
    }

    /// Move the flag to `id`, returning the previously flagged candidate
    pub fn select(&mut self, id: T) -> Option<T> {
        self.selected.replace(id).filter(|prev| *prev != id)
    }

    pub fn is_selected(&self, id: T) -> bool {
        self.selected == Some(id)
    }

    pub fn selected(&self) -> Option<T> {
        self.selected
    }
}

impl<T: Copy + PartialEq> Default for Highlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct InputEventRouter {
    controller: Arc<RaceLifecycleController>,
    runtime: Handle,
    tracks: Highlight<TrackId>,
    racers: Highlight<RacerId>,
}

impl InputEventRouter {
    pub fn new(controller: Arc<RaceLifecycleController>, runtime: Handle) -> Self {
        Self {
            controller,
            runtime,
            tracks: Highlight::new(),
            racers: Highlight::new(),
        }
    }

    pub fn tracks(&self) -> &Highlight<TrackId> {
        &self.tracks
    }

    pub fn racers(&self) -> &Highlight<RacerId> {
        &self.racers
    }

    pub fn dispatch(&mut self, event: UiEvent) -> Dispatched {
        match event {
            UiEvent::TrackChosen { id, name } => {
                let previous = self.tracks.select(id);
                debug!(track_id = id, ?previous, "[router] Track selected");
                self.controller.store().set(SessionPatch::track(id, name.clone()));
                self.notify(SelectionKind::Track, name);
                Dispatched::Selected
            }
            UiEvent::RacerChosen { id, name } => {
                let previous = self.racers.select(id);
                debug!(racer_id = id, ?previous, "[router] Racer selected");
                self.controller.store().set(SessionPatch::racer(id, name.clone()));
                self.notify(SelectionKind::Racer, name);
                Dispatched::Selected
            }
            UiEvent::RaceSubmitted => {
                info!("[router] Race submitted");
                let controller = Arc::clone(&self.controller);
                Dispatched::Race(
                    self.runtime
                        .spawn(async move { controller.create_and_run_race().await }),
                )
            }
            UiEvent::AcceleratePressed => {
                if self.controller.store().active_race_id().is_none() {
                    debug!("[router] Accelerate pressed without a race");
                    return Dispatched::Ignored;
                }
                let controller = Arc::clone(&self.controller);
                Dispatched::Accelerate(
                    self.runtime.spawn(async move { controller.accelerate().await }),
                )
            }
        }
    }

    fn notify(&self, kind: SelectionKind, name: String) {
        self.controller
            .events()
            .emit(LifecycleEvent::Selected { kind, name });
    }
}
