//! Core types - identifiers and selection snapshots
//!
//! The server uses plain integer ids for tracks, racers and races.

pub type TrackId = u32;
pub type RacerId = u32;
pub type RaceId = u32;

// =============================================================================
// RACE REQUEST
// =============================================================================

/// Racer and track captured from the session when a race is submitted.
///
/// Later selection changes never reach a run that already holds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceRequest {
    pub racer_id: RacerId,
    pub track_id: TrackId,
    pub track_name: Option<String>,
}

impl RaceRequest {
    pub fn new(racer_id: RacerId, track_id: TrackId) -> Self {
        Self {
            racer_id,
            track_id,
            track_name: None,
        }
    }

    /// Track label for the race view header ("Track 3" when no name is known)
    pub fn track_label(&self) -> String {
        match &self.track_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("Track {}", self.track_id),
        }
    }
}
