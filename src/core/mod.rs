//! Core module - race lifecycle logic, independent of the HTTP transport

pub mod constants;
pub mod countdown;
pub mod error;
pub mod events;
pub mod io_traits;
pub mod leaderboard;
pub mod lifecycle;
pub mod poller;
pub mod protocol;
pub mod router;
pub mod session;
pub mod types;

pub use countdown::{CountdownState, CountdownTimer};
pub use error::{LifecycleError, ServiceError, ValidationError};
pub use events::{event_channel, EventSink, EventStream, LifecycleEvent, SelectionKind};
pub use io_traits::RaceService;
pub use leaderboard::{progress_board, results_board, LeaderboardRow};
pub use lifecycle::{Catalog, LifecycleTiming, RaceLifecycleController, RaceOutcome};
pub use poller::{PollOutcome, PollerHandle, RaceStatusPoller};
pub use protocol::{Position, Race, RaceStatus, Racer, Track};
pub use router::{Dispatched, InputEventRouter, UiEvent};
pub use session::{SessionPatch, SessionState, SessionStore};
pub use types::{RaceId, RaceRequest, RacerId, TrackId};
