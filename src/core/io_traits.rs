//! I/O traits for race server operations
//!
//! `RaceService` abstracts the race server's REST API so the lifecycle,
//! poller and router can be tested with the scripted mock below.

use async_trait::async_trait;

use crate::core::error::ServiceError;
use crate::core::protocol::{Race, Racer, Track};
use crate::core::types::{RaceId, RacerId, TrackId};

// =============================================================================
// I/O TRAITS
// =============================================================================

/// Typed request/response wrapper around the race server
///
/// Pure I/O boundary: implementations never retry and hold no race state.
/// Every call except `create_race` is idempotent.
#[async_trait]
pub trait RaceService: Send + Sync {
    /// List all tracks
    async fn list_tracks(&self) -> Result<Vec<Track>, ServiceError>;

    /// List all racers
    async fn list_racers(&self) -> Result<Vec<Racer>, ServiceError>;

    /// Create a race; the server assigns the id. Status is `Unstarted`.
    async fn create_race(&self, racer_id: RacerId, track_id: TrackId)
        -> Result<Race, ServiceError>;

    /// Fetch current race status and positions
    async fn get_race(&self, race_id: RaceId) -> Result<Race, ServiceError>;

    /// Start a created race. The response body is ignored.
    async fn start_race(&self, race_id: RaceId) -> Result<(), ServiceError>;

    /// Accelerate the local racer. The response body is ignored.
    async fn accelerate(&self, race_id: RaceId) -> Result<(), ServiceError>;
}

// =============================================================================
// MOCK IMPLEMENTATIONS FOR TESTING
// =============================================================================


// =============================================================================
// TESTS
// =============================================================================
