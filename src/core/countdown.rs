//! Countdown timer - one-shot pre-race countdown
//!
//! `Idle -> Running -> Done`. The full value is reported immediately on
//! start, then one value per elapsed tick until 0. A finished timer is inert;
//! create a new one for the next race.

use std::time::Duration;

use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::core::constants::{COUNTDOWN_TICK, MIN_TIMER_PERIOD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Idle,
    Running,
    Done,
}

/// Returned when `start` is called on a timer that is not `Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("countdown timer is {0:?}, not Idle")]
pub struct CountdownError(pub CountdownState);

#[derive(Debug)]
pub struct CountdownTimer {
    state: CountdownState,
    tick: Duration,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::with_tick(COUNTDOWN_TICK)
    }

    /// Periods below `MIN_TIMER_PERIOD` are raised to it
    pub fn with_tick(tick: Duration) -> Self {
        Self {
            state: CountdownState::Idle,
            tick: tick.max(MIN_TIMER_PERIOD),
        }
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    /// Count down from `seconds` to 0, calling `on_tick` with each remaining
    /// value (`seconds, seconds - 1, ..., 0`), and resolve once 0 is reported.
    pub async fn start(
        &mut self,
        seconds: u32,
        mut on_tick: impl FnMut(u32),
    ) -> Result<(), CountdownError> {
        if self.state != CountdownState::Idle {
            return Err(CountdownError(self.state));
        }
        self.state = CountdownState::Running;
        debug!(seconds, "[countdown] Started");

        // First tick completes immediately
        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut remaining = seconds;
        loop {
            ticker.tick().await;
            on_tick(remaining);
            if remaining == 0 {
                break;
            }
            remaining -= 1;
        }

        self.state = CountdownState::Done;
        debug!("[countdown] Done");
        Ok(())
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_countdown_three_emits_exact_sequence() {
        let mut timer = CountdownTimer::new();
        let started = Instant::now();
        let mut ticks = Vec::new();

        timer
            .start(3, |remaining| ticks.push((remaining, started.elapsed())))
            .await
            .unwrap();

        let values: Vec<u32> = ticks.iter().map(|(r, _)| *r).collect();
        assert_eq!(values, vec![3, 2, 1, 0]);

        // Full value immediately, then one per second
        for (i, (_, at)) in ticks.iter().enumerate() {
            let expected = Duration::from_secs(i as u64);
            assert!(*at >= expected && *at < expected + Duration::from_millis(5), "{:?}", ticks);
        }
        assert_eq!(timer.state(), CountdownState::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_strictly_decreasing() {
        let mut timer = CountdownTimer::with_tick(Duration::from_millis(10));
        let mut ticks = Vec::new();
        timer.start(5, |r| ticks.push(r)).await.unwrap();

        assert!(ticks.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(ticks.last(), Some(&0));
        assert_eq!(ticks.len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_zero_reports_once() {
        let mut timer = CountdownTimer::new();
        let mut ticks = Vec::new();
        timer.start(0, |r| ticks.push(r)).await.unwrap();
        assert_eq!(ticks, vec![0]);
        assert_eq!(timer.state(), CountdownState::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_tick_is_clamped() {
        let mut timer = CountdownTimer::with_tick(Duration::ZERO);
        let started = Instant::now();
        let mut ticks = Vec::new();
        timer.start(3, |r| ticks.push(r)).await.unwrap();

        assert_eq!(ticks, vec![3, 2, 1, 0]);
        assert!(started.elapsed() >= MIN_TIMER_PERIOD * 3);
        assert_eq!(timer.state(), CountdownState::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_cannot_restart() {
        let mut timer = CountdownTimer::new();
        assert_eq!(timer.state(), CountdownState::Idle);
        timer.start(1, |_| {}).await.unwrap();

        let mut ticks = Vec::new();
        let err = timer.start(3, |r| ticks.push(r)).await.unwrap_err();
        assert_eq!(err, CountdownError(CountdownState::Done));
        assert!(ticks.is_empty());
    }
}
