//! Session store - selection and active race state
//!
//! One `SessionStore` exists per client. It is cloned (cheaply, it is a
//! shared handle) into the controller and the router rather than living in
//! a global. The store performs no validation; that is the controller's job.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::types::{RaceId, RacerId, TrackId};

// =============================================================================
// SESSION STATE
// =============================================================================

/// Browser-local selection state, independent of any single lifecycle run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub selected_track_id: Option<TrackId>,
    pub selected_track_name: Option<String>,
    pub selected_racer_id: Option<RacerId>,
    pub selected_racer_name: Option<String>,
    /// Set only after a successful race creation, superseded by the next one
    pub active_race_id: Option<RaceId>,
}

/// Partial update merged by `SessionStore::set`. `None` fields are left as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPatch {
    pub selected_track_id: Option<TrackId>,
    pub selected_track_name: Option<String>,
    pub selected_racer_id: Option<RacerId>,
    pub selected_racer_name: Option<String>,
    pub active_race_id: Option<RaceId>,
}

impl SessionPatch {
    pub fn track(id: TrackId, name: impl Into<String>) -> Self {
        Self {
            selected_track_id: Some(id),
            selected_track_name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn racer(id: RacerId, name: impl Into<String>) -> Self {
        Self {
            selected_racer_id: Some(id),
            selected_racer_name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn active_race(id: RaceId) -> Self {
        Self {
            active_race_id: Some(id),
            ..Default::default()
        }
    }
}

// =============================================================================
// SESSION STORE
// =============================================================================

/// Shared handle to the session state
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current state
    pub fn get(&self) -> SessionState {
        self.inner.lock().clone()
    }

    /// Merge the patch's present fields into the state in one step
    pub fn set(&self, patch: SessionPatch) {
        let mut state = self.inner.lock();
        if let Some(id) = patch.selected_track_id {
            state.selected_track_id = Some(id);
        }
        if let Some(name) = patch.selected_track_name {
            state.selected_track_name = Some(name);
        }
        if let Some(id) = patch.selected_racer_id {
            state.selected_racer_id = Some(id);
        }
        if let Some(name) = patch.selected_racer_name {
            state.selected_racer_name = Some(name);
        }
        if let Some(id) = patch.active_race_id {
            state.active_race_id = Some(id);
        }
    }

    pub fn active_race_id(&self) -> Option<RaceId> {
        self.inner.lock().active_race_id
    }

    pub fn selected_racer_id(&self) -> Option<RacerId> {
        self.inner.lock().selected_racer_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_initial_state() {
        let store = SessionStore::new();
        assert_eq!(store.get(), SessionState::default());
        assert_eq!(store.active_race_id(), None);
    }

    #[test]
    fn test_set_merges_only_present_fields() {
        let store = SessionStore::new();
        store.set(SessionPatch::track(3, "Track 3"));
        store.set(SessionPatch::racer(7, "Racer 7"));

        let state = store.get();
        assert_eq!(state.selected_track_id, Some(3));
        assert_eq!(state.selected_track_name.as_deref(), Some("Track 3"));
        assert_eq!(state.selected_racer_id, Some(7));
        assert_eq!(state.selected_racer_name.as_deref(), Some("Racer 7"));
        assert_eq!(state.active_race_id, None);
    }

    #[test]
    fn test_selection_overwrite() {
        let store = SessionStore::new();
        store.set(SessionPatch::track(3, "Track 3"));
        store.set(SessionPatch::track(5, "Track 5"));
        assert_eq!(store.get().selected_track_id, Some(5));
        assert_eq!(store.get().selected_track_name.as_deref(), Some("Track 5"));
    }

    #[test]
    fn test_active_race_superseded() {
        let store = SessionStore::new();
        store.set(SessionPatch::active_race(1));
        store.set(SessionPatch::active_race(2));
        assert_eq!(store.active_race_id(), Some(2));
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::new();
        let other = store.clone();
        other.set(SessionPatch::racer(4, "Racer 4"));
        assert_eq!(store.selected_racer_id(), Some(4));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = SessionStore::new();
        store.set(SessionPatch::track(1, "Track 1"));
        let snapshot = store.get();
        store.set(SessionPatch::track(2, "Track 2"));
        assert_eq!(snapshot.selected_track_id, Some(1));
    }
}
