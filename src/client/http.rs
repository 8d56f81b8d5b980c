//! HTTP client for the race server
//!
//! Implements `RaceService` over the server's JSON REST API. Calls are
//! never retried here; callers decide what a failure means.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::config::ServerSettings;
use crate::core::error::ServiceError;
use crate::core::io_traits::RaceService;
use crate::core::protocol::{CreateRaceRequest, CreatedRace, Race, RaceStatus, Racer, Track};
use crate::core::types::{RaceId, RacerId, TrackId};

const JSON: &str = "application/json";

pub struct HttpRaceService {
    client: Client,
    base_url: String,
}

impl HttpRaceService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::transport(base_url.clone(), e))?;

        info!(url = %base_url, "[http] Race server client ready");
        Ok(Self { client, base_url })
    }

    pub fn from_settings(settings: &ServerSettings) -> Result<Self, ServiceError> {
        Self::new(&settings.url, settings.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return the body of a 2xx response
    async fn send(&self, path: &str, request: RequestBuilder) -> Result<String, ServiceError> {
        debug!(path, "[http] Request");
        let response = request
            .header(ACCEPT, JSON)
            .send()
            .await
            .map_err(|e| ServiceError::transport(path, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ServiceError::transport(path, e))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let request = self.client.get(self.url(path)).header(CONTENT_TYPE, JSON);
        let body = self.send(path, request).await?;
        serde_json::from_str(&body).map_err(|e| ServiceError::decode(path, e))
    }

    /// POST without a body; the response body is ignored
    async fn post_command(&self, path: &str) -> Result<(), ServiceError> {
        let request = self.client.post(self.url(path)).header(CONTENT_TYPE, JSON);
        self.send(path, request).await.map(|_| ())
    }
}

#[async_trait]
impl RaceService for HttpRaceService {
    async fn list_tracks(&self) -> Result<Vec<Track>, ServiceError> {
        self.get_json("/api/tracks").await
    }

    async fn list_racers(&self) -> Result<Vec<Racer>, ServiceError> {
        self.get_json("/api/cars").await
    }

    async fn create_race(
        &self,
        racer_id: RacerId,
        track_id: TrackId,
    ) -> Result<Race, ServiceError> {
        let path = "/api/races";
        let body = CreateRaceRequest {
            player_id: racer_id,
            track_id,
        };
        let request = self.client.post(self.url(path)).json(&body);
        let text = self.send(path, request).await?;
        let created: CreatedRace =
            serde_json::from_str(&text).map_err(|e| ServiceError::decode(path, e))?;

        info!(race_id = created.id, racer_id, track_id, "[http] Race created");
        Ok(Race {
            id: created.id,
            status: RaceStatus::Unstarted,
            positions: Vec::new(),
        })
    }

    async fn get_race(&self, race_id: RaceId) -> Result<Race, ServiceError> {
        let mut race: Race = self.get_json(&format!("/api/races/{}", race_id)).await?;
        race.id = race_id;
        Ok(race)
    }

    async fn start_race(&self, race_id: RaceId) -> Result<(), ServiceError> {
        self.post_command(&format!("/api/races/{}/start", race_id))
            .await
    }

    async fn accelerate(&self, race_id: RaceId) -> Result<(), ServiceError> {
        self.post_command(&format!("/api/races/{}/accelerate", race_id))
            .await
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::sync::Arc;

    type Log = Arc<Mutex<Vec<String>>>;

    /// Fake race server on an ephemeral port
    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    fn race_app(log: Log) -> Router {
        Router::new()
            .route(
                "/api/tracks",
                get(|| async { Json(json!([{"id": 1, "name": "Track 1", "segments": [1, 2]}])) }),
            )
            .route(
                "/api/cars",
                get(|| async {
                    Json(json!([{"id": 7, "driver_name": "Racer 7", "top_speed": 500,
                                 "acceleration": 10, "handling": 8}]))
                }),
            )
            .route(
                "/api/races",
                post(|State(log): State<Log>, Json(body): Json<Value>| async move {
                    log.lock().push(format!("create {}", body));
                    Json(json!({"ID": 42, "Track": {"id": 3}, "PlayerID": 7, "Cars": []}))
                }),
            )
            .route(
                "/api/races/{id}",
                get(|Path(id): Path<u32>| async move {
                    if id == 999 {
                        return Err(StatusCode::INTERNAL_SERVER_ERROR);
                    }
                    Ok(Json(json!({
                        "status": "in-progress",
                        "positions": [{"id": 7, "driver_name": "Racer 7", "segment": 12, "speed": 80}]
                    })))
                }),
            )
            .route(
                "/api/races/{id}/start",
                post(|State(log): State<Log>, Path(id): Path<u32>| async move {
                    log.lock().push(format!("start {}", id));
                    StatusCode::OK
                }),
            )
            .route(
                "/api/races/{id}/accelerate",
                post(|State(log): State<Log>, Path(id): Path<u32>| async move {
                    log.lock().push(format!("accelerate {}", id));
                    StatusCode::OK
                }),
            )
            .with_state(log)
    }

    async fn client(log: &Log) -> HttpRaceService {
        let url = spawn_server(race_app(Arc::clone(log))).await;
        HttpRaceService::new(&url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let service = HttpRaceService::new("http://localhost:3001/", Duration::from_secs(1)).unwrap();
        assert_eq!(service.base_url(), "http://localhost:3001");
        assert_eq!(service.url("/api/tracks"), "http://localhost:3001/api/tracks");
    }

    #[tokio::test]
    async fn test_list_catalog() {
        let log = Log::default();
        let service = client(&log).await;

        let tracks = service.list_tracks().await.unwrap();
        assert_eq!(tracks, vec![Track { id: 1, name: "Track 1".to_string() }]);

        let racers = service.list_racers().await.unwrap();
        assert_eq!(racers.len(), 1);
        assert_eq!(racers[0].driver_name, "Racer 7");
        assert_eq!(racers[0].handling, 8.0);
    }

    #[tokio::test]
    async fn test_create_race_sends_numeric_ids() {
        let log = Log::default();
        let service = client(&log).await;

        let race = service.create_race(7, 3).await.unwrap();
        assert_eq!(race.id, 42);
        assert_eq!(race.status, RaceStatus::Unstarted);
        assert_eq!(log.lock().as_slice(), [r#"create {"player_id":7,"track_id":3}"#]);
    }

    #[tokio::test]
    async fn test_get_race_fills_id_and_is_idempotent() {
        let log = Log::default();
        let service = client(&log).await;

        let first = service.get_race(42).await.unwrap();
        let second = service.get_race(42).await.unwrap();
        assert_eq!(first.id, 42);
        assert_eq!(first.status, RaceStatus::InProgress);
        assert_eq!(first.positions[0].segment, 12);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_commands_hit_race_paths() {
        let log = Log::default();
        let service = client(&log).await;

        service.start_race(42).await.unwrap();
        service.accelerate(42).await.unwrap();
        assert_eq!(log.lock().as_slice(), ["start 42", "accelerate 42"]);
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let log = Log::default();
        let service = client(&log).await;

        let err = service.get_race(999).await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::Status {
                endpoint: "/api/races/999".to_string(),
                status: 500,
            }
        );
    }

    #[tokio::test]
    async fn test_decode_error() {
        let app = Router::new().route("/api/tracks", get(|| async { "not json" }));
        let url = spawn_server(app).await;
        let service = HttpRaceService::new(&url, Duration::from_secs(5)).unwrap();

        let err = service.list_tracks().await.unwrap_err();
        assert!(matches!(err, ServiceError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_transport_error_when_server_down() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let service =
            HttpRaceService::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        let err = service.start_race(1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Transport { .. }));
    }
}
