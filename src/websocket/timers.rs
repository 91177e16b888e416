use crate::error::MatchError;
use crate::game::rating::RatingState;
use crate::game::session::{MatchSession, SessionId, Transition};

/// A scheduled callback together with the game it was scheduled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Armed<H> {
    session_id: SessionId,
    handle: H,
}

/// Bookkeeping for the two timers a match runs: the clock interval and the
/// deferred engine trigger.
///
/// `H` is whatever the scheduler hands back to cancel a callback
/// (`SpawnHandle` inside the actor). Callbacks capture the session id they
/// were armed for and are checked against the live session when they fire,
/// so a callback that outlived a restart changes nothing.
#[derive(Debug)]
pub struct MatchTimers<H> {
    clock: Option<Armed<H>>,
    engine_trigger: Option<Armed<H>>,
}

impl<H> Default for MatchTimers<H> {
    fn default() -> Self {
        Self {
            clock: None,
            engine_trigger: None,
        }
    }
}

impl<H: Copy> MatchTimers<H> {
    /// Record a new clock interval; returns the one it replaces.
    pub fn arm_clock(&mut self, session_id: SessionId, handle: H) -> Option<H> {
        self.clock
            .replace(Armed { session_id, handle })
            .map(|armed| armed.handle)
    }

    /// Record a new engine trigger; returns the one it replaces.
    pub fn arm_engine_trigger(&mut self, session_id: SessionId, handle: H) -> Option<H> {
        self.engine_trigger
            .replace(Armed { session_id, handle })
            .map(|armed| armed.handle)
    }

    /// Forget every timer and return the handles to cancel.
    pub fn disarm(&mut self) -> Vec<H> {
        self.clock
            .take()
            .into_iter()
            .chain(self.engine_trigger.take())
            .map(|armed| armed.handle)
            .collect()
    }

    /// A clock interval armed for `captured` fired.
    ///
    /// `None` when the interval belongs to a replaced game; the session is
    /// left untouched in that case.
    pub fn clock_fired(
        &self,
        captured: SessionId,
        session: &mut MatchSession,
        ratings: &mut RatingState,
    ) -> Option<Result<Transition, MatchError>> {
        if captured != session.session_id() {
            return None;
        }
        Some(session.tick(ratings))
    }

    /// The engine trigger armed for `captured` fired. Returns whether the
    /// engine should really be asked for a move now.
    pub fn engine_trigger_fired(&mut self, captured: SessionId, session: &MatchSession) -> bool {
        if self
            .engine_trigger
            .map_or(false, |armed| armed.session_id == captured)
        {
            self.engine_trigger = None;
        }
        captured == session.session_id() && session.is_engine_turn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rules::MoveIntent;
    use crate::game::session::{HumanColor, MatchConfig, Mode, MoveSource};

    fn engine_plays_white() -> MatchSession {
        let mut session = MatchSession::new();
        session
            .configure(MatchConfig {
                mode: Mode::Pve,
                human_color: HumanColor::Black,
                ..MatchConfig::default()
            })
            .unwrap();
        session
    }

    #[test]
    fn restart_cancels_the_pending_trigger() {
        let mut session = engine_plays_white();
        let mut timers = MatchTimers::default();

        session.start();
        assert_eq!(timers.arm_clock(session.session_id(), 1), None);
        assert_eq!(timers.arm_engine_trigger(session.session_id(), 2), None);

        let cancelled = timers.disarm();
        assert_eq!(cancelled, vec![1, 2]);
        assert!(timers.disarm().is_empty());
    }

    #[test]
    fn rescheduling_hands_back_the_old_handle() {
        let mut timers = MatchTimers::default();
        assert_eq!(timers.arm_engine_trigger(1, 10), None);
        assert_eq!(timers.arm_engine_trigger(1, 11), Some(10));
        assert_eq!(timers.arm_clock(2, 20), None);
        assert_eq!(timers.arm_clock(3, 21), Some(20));
    }

    #[test]
    fn trigger_from_a_replaced_game_does_not_ask_the_engine() {
        let mut session = engine_plays_white();
        let mut timers = MatchTimers::default();

        session.start();
        let old_id = session.session_id();
        timers.arm_engine_trigger(old_id, 1);

        // Restart into a new game where the engine is again to move
        timers.disarm();
        session.start();
        timers.arm_engine_trigger(session.session_id(), 2);
        assert!(session.is_engine_turn());

        assert!(!timers.engine_trigger_fired(old_id, &session));
        // The new game's trigger is still armed
        assert_eq!(timers.arm_engine_trigger(session.session_id(), 3), Some(2));

        assert!(timers.engine_trigger_fired(session.session_id(), &session));
        assert!(timers.disarm().is_empty());
    }

    #[test]
    fn trigger_is_dropped_once_the_engine_is_no_longer_to_move() {
        let mut ratings = RatingState::default();
        let mut session = engine_plays_white();
        let mut timers = MatchTimers::default();

        session.start();
        let id = session.session_id();
        timers.arm_engine_trigger(id, 1);
        session
            .on_engine_response("bestmove e2e4", id, &mut ratings)
            .unwrap();

        assert!(!timers.engine_trigger_fired(id, &session));
    }

    #[test]
    fn tick_from_a_replaced_game_leaves_the_clock_alone() {
        let mut ratings = RatingState::default();
        let mut session = MatchSession::new();
        let timers: MatchTimers<u32> = MatchTimers::default();

        session.start();
        let old_id = session.session_id();
        session
            .submit_move(
                MoveIntent::parse("e2", "e4", None).unwrap(),
                MoveSource::Human,
                &mut ratings,
            )
            .unwrap();
        session.start();
        let clock = session.snapshot().clock;

        assert!(timers.clock_fired(old_id, &mut session, &mut ratings).is_none());
        assert_eq!(session.snapshot().clock, clock);

        let current = session.session_id();
        assert_eq!(
            timers.clock_fired(current, &mut session, &mut ratings),
            Some(Ok(Transition::Continue {
                engine_to_move: false
            }))
        );
        assert_eq!(session.snapshot().clock.white, clock.white - 1);
    }
}
