use actix::{Actor, AsyncContext, Handler};
use actix_web_actors::ws;
use log::{debug, info, warn};

use crate::engine::{EngineCoordinator, EngineReply, RequestMove};
use crate::error::MatchError;
use crate::game::rules::{parse_square, MoveIntent};
use crate::game::session::{MoveSource, SessionId, Transition};
use crate::models::{ClientMessage, ServerMessage};
use crate::websocket::handler::ChessWebSocket;

impl ChessWebSocket {
    pub fn handle_message(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        match msg.message_type.as_str() {
            "configure" => self.handle_configure(msg, ctx),
            "start" => self.handle_start(ctx),
            "move" => self.handle_move(msg, ctx),
            "state" => self.send_state(ctx),
            "get_moves" => self.handle_get_moves(msg, ctx),
            _ => {
                info!("Unknown message type: {}", msg.message_type);
                self.send(
                    ctx,
                    &ServerMessage::error(format!("Unknown message type: {}", msg.message_type)),
                );
            }
        }
    }

    pub fn handle_configure(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        let config = msg.config_over(self.session.pending_config());
        match self.session.configure(config) {
            Ok(()) => {
                info!("Connection {} configured: {:?}", self.id, config);
                self.send_state(ctx);
            }
            Err(e) => {
                warn!("Rejected configuration from {}: {}", self.id, e);
                self.send(ctx, &ServerMessage::error(e.to_string()));
            }
        }
    }

    pub fn handle_start(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        self.stop_timers(ctx);
        let transition = self.session.start();
        self.start_clock(ctx);
        self.after_transition(transition, ctx);
    }

    pub fn handle_move(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        let (Some(from), Some(to)) = (msg.move_from.as_deref(), msg.move_to.as_deref()) else {
            warn!("Move action missing from or to");
            self.send(ctx, &ServerMessage::error("Move needs move_from and move_to"));
            return;
        };

        let intent = match MoveIntent::parse(from, to, msg.promote_to.as_deref()) {
            Ok(intent) => intent,
            Err(_) => {
                warn!("Invalid move format: {} {}", from, to);
                self.send(ctx, &ServerMessage::error(MatchError::IllegalMove.to_string()));
                return;
            }
        };

        let result = self
            .app_state
            .with_ratings(|ratings| self.session.submit_move(intent, MoveSource::Human, ratings));
        match result {
            Ok(transition) => self.after_transition(transition, ctx),
            Err(e) if e.is_user_visible() => {
                info!("Move {}{} refused: {}", from, to, e);
                self.send(ctx, &ServerMessage::error(e.to_string()));
                self.send_state(ctx);
            }
            Err(e) => debug!("Move {}{} ignored: {}", from, to, e),
        }
    }

    pub fn handle_get_moves(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        let square = match msg.square.as_deref().map(parse_square) {
            Some(Ok(square)) => square,
            _ => {
                warn!("Invalid square: {:?}", msg.square);
                self.send(ctx, &ServerMessage::error("Invalid square format"));
                return;
            }
        };

        let moves = self
            .session
            .legal_destinations(square)
            .into_iter()
            .map(|dest| dest.to_string())
            .collect();
        self.send(
            ctx,
            &ServerMessage::available_moves(self.session.session_id(), moves),
        );
    }

    /// React to a finished transition: stop the clock on game end, schedule
    /// the engine when it is its turn, and push the new state.
    fn after_transition(&mut self, transition: Transition, ctx: &mut ws::WebsocketContext<Self>) {
        match transition {
            Transition::Finished { status, winner } => {
                info!(
                    "Game {} on {} ended: {:?}, winner {:?}",
                    self.session.session_id(),
                    self.id,
                    status,
                    winner
                );
                self.stop_timers(ctx);
            }
            Transition::Continue {
                engine_to_move: true,
            } => self.schedule_engine_move(ctx),
            Transition::Continue { .. } => {}
        }
        self.send_state(ctx);
    }

    fn start_clock(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let session_id = self.session.session_id();
        let interval = self.app_state.settings.tick_interval;
        let handle = ctx.run_interval(interval, move |act, ctx| {
            act.on_clock_tick(session_id, ctx);
        });
        if let Some(previous) = self.timers.arm_clock(session_id, handle) {
            ctx.cancel_future(previous);
        }
    }

    fn on_clock_tick(&mut self, session_id: SessionId, ctx: &mut ws::WebsocketContext<Self>) {
        let timers = &self.timers;
        let session = &mut self.session;
        let result = self
            .app_state
            .with_ratings(|ratings| timers.clock_fired(session_id, session, ratings));
        match result {
            None => debug!("Ignoring clock tick of replaced game {}", session_id),
            Some(Ok(transition)) => self.after_transition(transition, ctx),
            Some(Err(e)) => {
                debug!("Clock stopped for game {}: {}", session_id, e);
                self.stop_timers(ctx);
            }
        }
    }

    /// Cancel the clock and any deferred engine request.
    pub fn stop_timers(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        for handle in self.timers.disarm() {
            ctx.cancel_future(handle);
        }
    }

    fn schedule_engine_move(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let session_id = self.session.session_id();
        let delay = self.app_state.settings.engine_delay;
        let handle = ctx.run_later(delay, move |act, ctx| {
            act.request_engine_move(session_id, ctx);
        });
        if let Some(previous) = self.timers.arm_engine_trigger(session_id, handle) {
            ctx.cancel_future(previous);
        }
    }

    fn request_engine_move(&mut self, session_id: SessionId, ctx: &mut ws::WebsocketContext<Self>) {
        if !self.timers.engine_trigger_fired(session_id, &self.session) {
            debug!("Deferred engine request for game {} is obsolete", session_id);
            return;
        }

        let engine_path = self.app_state.settings.engine_path.clone();
        let engine = self
            .engine
            .get_or_insert_with(|| EngineCoordinator::new(engine_path).start());
        engine.do_send(RequestMove {
            fen: self.session.position().fen(),
            difficulty: self.session.active_config().engine_difficulty,
            session_id,
            reply_to: ctx.address().recipient(),
        });
    }
}

impl Handler<EngineReply> for ChessWebSocket {
    type Result = ();

    fn handle(&mut self, msg: EngineReply, ctx: &mut Self::Context) {
        let result = self.app_state.with_ratings(|ratings| {
            self.session
                .on_engine_response(&msg.raw, msg.session_id, ratings)
        });
        match result {
            Ok(transition) => self.after_transition(transition, ctx),
            Err(MatchError::StaleResponse { got, current }) => {
                debug!("Dropped engine reply for game {} (current {})", got, current);
            }
            Err(MatchError::UnparseableEngineResponse) => {
                debug!("Engine had no move: {}", msg.raw);
            }
            Err(e) => warn!("Engine move `{}` refused: {}", msg.raw, e),
        }
    }
}
