//! Race lifecycle constants - timings, server defaults, status strings
//!
//! Every fixed interval the lifecycle depends on lives here so tests and
//! config defaults agree on the same numbers.

use std::time::Duration;

// =============================================================================
// SERVER
// =============================================================================

/// Race server used when no config or CLI override is given
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3001";

/// Per-request timeout for race server calls
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// LIFECYCLE TIMINGS
// =============================================================================

/// Countdown length before `start_race` is issued
pub const COUNTDOWN_SECONDS: u32 = 3;

/// Delay between race creation and the first countdown tick, so the
/// race view has time to render
pub const COUNTDOWN_LEAD_IN: Duration = Duration::from_secs(1);

/// Interval between two countdown ticks
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Race status polling cadence
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Shortest period accepted for the countdown tick and the poll cadence
pub const MIN_TIMER_PERIOD: Duration = Duration::from_millis(1);

// =============================================================================
// RACE STATUS STRINGS
// =============================================================================

pub const STATUS_UNSTARTED: &str = "unstarted";
pub const STATUS_IN_PROGRESS: &str = "in-progress";
pub const STATUS_FINISHED: &str = "finished";

// =============================================================================
// LEADERBOARD
// =============================================================================

/// Suffix appended to the local racer's driver name
pub const USER_MARKER: &str = " (you)";
