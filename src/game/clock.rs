use chess::Color;
use serde::Serialize;

/// Remaining seconds for each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClockState {
    pub white: u32,
    pub black: u32,
}

/// Result of a single clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    /// The named side has no time left.
    Expired(Color),
}

impl ClockState {
    pub fn new(seconds_per_side: u32) -> Self {
        Self {
            white: seconds_per_side,
            black: seconds_per_side,
        }
    }

    /// The side already at zero, White first when both are.
    pub fn expired_side(&self) -> Option<Color> {
        if self.white == 0 {
            Some(Color::White)
        } else if self.black == 0 {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// Advance by one second for the side to move.
    pub fn tick(&mut self, turn: Color) -> TickOutcome {
        if let Some(expired) = self.expired_side() {
            return TickOutcome::Expired(expired);
        }

        let remaining = match turn {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        };
        *remaining = remaining.saturating_sub(1);

        if *remaining == 0 {
            TickOutcome::Expired(turn)
        } else {
            TickOutcome::Running
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_side_to_move_is_charged() {
        let mut clock = ClockState::new(10);
        assert_eq!(clock.tick(Color::Black), TickOutcome::Running);
        assert_eq!(clock, ClockState { white: 10, black: 9 });
        assert_eq!(clock.tick(Color::White), TickOutcome::Running);
        assert_eq!(clock, ClockState { white: 9, black: 9 });
    }

    #[test]
    fn white_runs_out_after_three_hundred_ticks() {
        let mut clock = ClockState::new(300);
        for _ in 0..299 {
            assert_eq!(clock.tick(Color::White), TickOutcome::Running);
        }
        assert_eq!(clock.tick(Color::White), TickOutcome::Expired(Color::White));
        assert_eq!(clock, ClockState { white: 0, black: 300 });

        for turn in [Color::White, Color::Black] {
            assert_eq!(clock.tick(turn), TickOutcome::Expired(Color::White));
            assert_eq!(clock, ClockState { white: 0, black: 300 });
        }
    }

    #[test]
    fn expired_side_is_reported_even_when_not_to_move() {
        let mut clock = ClockState { white: 5, black: 0 };
        assert_eq!(clock.tick(Color::White), TickOutcome::Expired(Color::Black));
        assert_eq!(clock.white, 5);
    }

    #[test]
    fn both_at_zero_means_white_loses() {
        let mut clock = ClockState::new(0);
        assert_eq!(clock.expired_side(), Some(Color::White));
        assert_eq!(clock.tick(Color::Black), TickOutcome::Expired(Color::White));
    }
}
