//! Race server protocol types
//!
//! This module contains the JSON bodies exchanged with the race server's
//! REST API. These types are transport-independent and can be tested
//! without a running server.

use serde::{Deserialize, Serialize};

use super::constants::{STATUS_FINISHED, STATUS_IN_PROGRESS, STATUS_UNSTARTED};
use super::types::{RaceId, RacerId, TrackId};

// =============================================================================
// CATALOG
// =============================================================================

/// A track as listed by `GET /api/tracks`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
}

/// A racer as listed by `GET /api/cars`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Racer {
    pub id: RacerId,
    pub driver_name: String,
    #[serde(default)]
    pub top_speed: f64,
    #[serde(default)]
    pub acceleration: f64,
    #[serde(default)]
    pub handling: f64,
}

// =============================================================================
// RACE CREATION
// =============================================================================

/// Body of `POST /api/races`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRaceRequest {
    pub player_id: RacerId,
    pub track_id: TrackId,
}

/// Response of `POST /api/races`. Only the id is used; the server's other
/// fields (track, cars, results) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRace {
    #[serde(rename = "ID")]
    pub id: RaceId,
}

// =============================================================================
// RACE STATUS
// =============================================================================

/// Race status as reported by `GET /api/races/{id}`
///
/// Unknown strings are kept verbatim so the poller can report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RaceStatus {
    Unstarted,
    InProgress,
    Finished,
    Unrecognized(String),
}

impl RaceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RaceStatus::Unstarted => STATUS_UNSTARTED,
            RaceStatus::InProgress => STATUS_IN_PROGRESS,
            RaceStatus::Finished => STATUS_FINISHED,
            RaceStatus::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for RaceStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            STATUS_UNSTARTED => RaceStatus::Unstarted,
            STATUS_IN_PROGRESS => RaceStatus::InProgress,
            STATUS_FINISHED => RaceStatus::Finished,
            _ => RaceStatus::Unrecognized(raw),
        }
    }
}

impl From<RaceStatus> for String {
    fn from(status: RaceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for RaceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One racer's standing within a race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(rename = "id")]
    pub racer_id: RacerId,
    pub driver_name: String,
    /// Progress marker, higher = further along
    #[serde(default)]
    pub segment: u32,
    /// Final rank, only present once the race is finished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_position: Option<u32>,
}

/// Server-owned race record, mirrored for one poll cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    /// Not part of the status body; filled in from the request path
    #[serde(default)]
    pub id: RaceId,
    pub status: RaceStatus,
    #[serde(default)]
    pub positions: Vec<Position>,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Catalog tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_track_deserialize_ignores_segments() {
        let json = r#"{"id": 3, "name": "Track 3", "segments": [100, 92, 87]}"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.id, 3);
        assert_eq!(track.name, "Track 3");
    }

    #[test]
    fn test_racer_deserialize() {
        let json = r#"{"id": 7, "driver_name": "Racer 7", "top_speed": 500, "acceleration": 10, "handling": 10}"#;
        let racer: Racer = serde_json::from_str(json).unwrap();
        assert_eq!(racer.id, 7);
        assert_eq!(racer.driver_name, "Racer 7");
        assert_eq!(racer.top_speed, 500.0);
        assert_eq!(racer.acceleration, 10.0);
    }

    // -------------------------------------------------------------------------
    // Race creation tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_create_race_request_serialize() {
        let req = CreateRaceRequest {
            player_id: 7,
            track_id: 3,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"player_id":7,"track_id":3}"#);
    }

    #[test]
    fn test_created_race_reads_upper_case_id() {
        let json = r#"{"ID": 42, "Track": {"id": 3}, "PlayerID": 7, "Cars": [], "Results": {}}"#;
        let created: CreatedRace = serde_json::from_str(json).unwrap();
        assert_eq!(created.id, 42);
    }

    #[test]
    fn test_created_race_missing_id_is_error() {
        let json = r#"{"id": 42}"#;
        assert!(serde_json::from_str::<CreatedRace>(json).is_err());
    }

    // -------------------------------------------------------------------------
    // Race status tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_race_status_known_values() {
        assert_eq!(RaceStatus::from("unstarted".to_string()), RaceStatus::Unstarted);
        assert_eq!(RaceStatus::from("in-progress".to_string()), RaceStatus::InProgress);
        assert_eq!(RaceStatus::from("finished".to_string()), RaceStatus::Finished);
    }

    #[test]
    fn test_race_status_unrecognized_keeps_raw() {
        let status = RaceStatus::from("crashed".to_string());
        assert_eq!(status, RaceStatus::Unrecognized("crashed".to_string()));
        assert_eq!(status.to_string(), "crashed");
    }

    #[test]
    fn test_race_status_serializes_as_string() {
        let json = serde_json::to_string(&RaceStatus::InProgress).unwrap();
        assert_eq!(json, r#""in-progress""#);
    }

    #[test]
    fn test_race_in_progress_deserialize() {
        let json = r#"{
            "status": "in-progress",
            "positions": [
                {"id": 1, "driver_name": "Racer 1", "top_speed": 500, "speed": 120, "segment": 12},
                {"id": 7, "driver_name": "Racer 7", "top_speed": 400, "speed": 90, "segment": 15}
            ]
        }"#;
        let race: Race = serde_json::from_str(json).unwrap();
        assert_eq!(race.id, 0); // not in body
        assert_eq!(race.status, RaceStatus::InProgress);
        assert_eq!(race.positions.len(), 2);
        assert_eq!(race.positions[1].racer_id, 7);
        assert_eq!(race.positions[1].segment, 15);
        assert_eq!(race.positions[1].final_position, None);
    }

    #[test]
    fn test_race_finished_has_final_positions() {
        let json = r#"{
            "status": "finished",
            "positions": [
                {"id": 7, "driver_name": "Racer 7", "segment": 201, "final_position": 1},
                {"id": 1, "driver_name": "Racer 1", "segment": 201, "final_position": 2}
            ]
        }"#;
        let race: Race = serde_json::from_str(json).unwrap();
        assert_eq!(race.status, RaceStatus::Finished);
        assert_eq!(race.positions[0].final_position, Some(1));
        assert_eq!(race.positions[1].final_position, Some(2));
    }

    #[test]
    fn test_race_without_positions() {
        let race: Race = serde_json::from_str(r#"{"status": "unstarted"}"#).unwrap();
        assert_eq!(race.status, RaceStatus::Unstarted);
        assert!(race.positions.is_empty());
    }

    #[test]
    fn test_position_skips_absent_final_position() {
        let pos = Position {
            racer_id: 7,
            driver_name: "Racer 7".to_string(),
            segment: 4,
            final_position: None,
        };
        let json = serde_json::to_string(&pos).unwrap();
        assert!(json.contains(r#""id":7"#));
        assert!(!json.contains("final_position"));
    }
}
