//! Leaderboard projection for race data display.
//!
//! Turns polled positions into ranked rows; the view decides how to draw them.

use crate::core::constants::USER_MARKER;
use crate::core::protocol::Position;
use crate::core::types::RacerId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    /// 1-based display rank
    pub rank: usize,
    pub racer_id: RacerId,
    /// Driver name, with the user marker on the local racer
    pub label: String,
    pub is_user: bool,
}

/// Rank in-progress positions, furthest segment first.
pub fn progress_board(positions: &[Position], user: Option<RacerId>) -> Vec<LeaderboardRow> {
    let mut sorted: Vec<&Position> = positions.iter().collect();
    sorted.sort_by(|a, b| b.segment.cmp(&a.segment));
    rows(sorted, user)
}

/// Rank finished positions by final position; racers without one go last.
pub fn results_board(positions: &[Position], user: Option<RacerId>) -> Vec<LeaderboardRow> {
    let mut sorted: Vec<&Position> = positions.iter().collect();
    sorted.sort_by_key(|p| p.final_position.unwrap_or(u32::MAX));
    rows(sorted, user)
}

/// The position belonging to the local racer, if present
pub fn user_position(positions: &[Position], user: RacerId) -> Option<&Position> {
    positions.iter().find(|p| p.racer_id == user)
}

fn rows(sorted: Vec<&Position>, user: Option<RacerId>) -> Vec<LeaderboardRow> {
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let is_user = user == Some(p.racer_id);
            let label = if is_user {
                format!("{}{}", p.driver_name, USER_MARKER)
            } else {
                p.driver_name.clone()
            };
            LeaderboardRow {
                rank: i + 1,
                racer_id: p.racer_id,
                label,
                is_user,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: RacerId, segment: u32, final_position: Option<u32>) -> Position {
        Position {
            racer_id: id,
            driver_name: format!("Racer {}", id),
            segment,
            final_position,
        }
    }

    #[test]
    fn test_progress_board_orders_by_segment() {
        let positions = vec![p(1, 10, None), p(2, 30, None), p(7, 20, None)];
        let board = progress_board(&positions, Some(7));

        let ids: Vec<_> = board.iter().map(|r| r.racer_id).collect();
        assert_eq!(ids, vec![2, 7, 1]);
        assert_eq!(board[1].rank, 2);
        assert!(board[1].is_user);
        assert_eq!(board[1].label, "Racer 7 (you)");
        assert_eq!(board[0].label, "Racer 2");
    }

    #[test]
    fn test_results_board_orders_by_final_position() {
        let positions = vec![p(1, 201, Some(3)), p(7, 201, Some(1)), p(2, 201, Some(2))];
        let board = results_board(&positions, Some(7));

        let ids: Vec<_> = board.iter().map(|r| r.racer_id).collect();
        assert_eq!(ids, vec![7, 2, 1]);
        assert_eq!(board[0].rank, 1);
        assert!(board[0].is_user);
    }

    #[test]
    fn test_results_board_missing_final_position_last() {
        let positions = vec![p(1, 100, None), p(2, 201, Some(1))];
        let board = results_board(&positions, None);
        assert_eq!(board[0].racer_id, 2);
        assert_eq!(board[1].racer_id, 1);
        assert!(board.iter().all(|r| !r.is_user));
    }

    #[test]
    fn test_board_does_not_mutate_positions() {
        let positions = vec![p(7, 1, None)];
        progress_board(&positions, Some(7));
        assert_eq!(positions[0].driver_name, "Racer 7");
    }

    #[test]
    fn test_user_position() {
        let positions = vec![p(1, 1, None), p(7, 2, None)];
        assert_eq!(user_position(&positions, 7).map(|p| p.segment), Some(2));
        assert!(user_position(&positions, 9).is_none());
    }

    #[test]
    fn test_empty_board() {
        assert!(progress_board(&[], Some(1)).is_empty());
    }
}
