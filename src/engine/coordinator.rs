use actix::prelude::*;
use log::{debug, error, info, warn};
use std::collections::VecDeque;
use std::path::PathBuf;

use crate::engine::process::UciProcess;
use crate::engine::protocol::{depth_for_difficulty, is_best_move_line, EngineCommand};
use crate::error::EngineError;
use crate::game::session::SessionId;

/// Outbound half of a connection to a move-suggesting engine.
pub trait EngineLink {
    fn send(&mut self, command: &EngineCommand) -> Result<(), EngineError>;
}

/// Ask the engine for a move in `fen`. Fire-and-forget: the answer, if any,
/// arrives later as an [`EngineReply`] at `reply_to`.
#[derive(Message)]
#[rtype(result = "()")]
pub struct RequestMove {
    pub fen: String,
    pub difficulty: u8,
    pub session_id: SessionId,
    pub reply_to: Recipient<EngineReply>,
}

/// One line printed by the engine.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct EngineOutput(pub String);

/// A `bestmove` line tagged with the game it was requested for.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
#[rtype(result = "()")]
pub struct EngineReply {
    pub raw: String,
    pub session_id: SessionId,
}

/// Stop the coordinator and the engine process behind it.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Shutdown;

struct PendingRequest {
    session_id: SessionId,
    reply_to: Recipient<EngineReply>,
}

/// Bridges a match to the engine process.
///
/// The engine answers every `go` with exactly one `bestmove`, in order, even
/// when a newer search was queued behind it. Requests are therefore kept
/// oldest first and each answer is tagged with the request it belongs to.
pub struct EngineCoordinator {
    engine_path: Option<PathBuf>,
    link: Option<Box<dyn EngineLink>>,
    pending: VecDeque<PendingRequest>,
    last_session: Option<SessionId>,
}

impl EngineCoordinator {
    /// Coordinator that spawns the engine at `engine_path` when it starts.
    pub fn new(engine_path: PathBuf) -> Self {
        Self {
            engine_path: Some(engine_path),
            link: None,
            pending: VecDeque::new(),
            last_session: None,
        }
    }

    /// Coordinator over an already established link.
    pub fn with_link(link: Box<dyn EngineLink>) -> Self {
        Self {
            engine_path: None,
            link: Some(link),
            pending: VecDeque::new(),
            last_session: None,
        }
    }

    fn send_all(&mut self, commands: &[EngineCommand]) -> Result<(), EngineError> {
        let link = self.link.as_mut().ok_or(EngineError::Unavailable)?;
        for command in commands {
            link.send(command)?;
        }
        Ok(())
    }
}

impl Actor for EngineCoordinator {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        if self.link.is_none() {
            if let Some(path) = &self.engine_path {
                match UciProcess::spawn(path, ctx.address().recipient()) {
                    Ok(process) => self.link = Some(Box::new(process)),
                    Err(e) => error!("Engine unavailable: {}", e),
                }
            }
        }
        if let Err(e) = self.send_all(&[EngineCommand::Uci]) {
            warn!("Engine handshake failed: {}", e);
        }
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        if let Err(e) = self.send_all(&[EngineCommand::Quit]) {
            debug!("Engine already gone on shutdown: {}", e);
        }
        info!("Engine coordinator stopped");
    }
}

impl Handler<RequestMove> for EngineCoordinator {
    type Result = ();

    fn handle(&mut self, msg: RequestMove, _: &mut Self::Context) {
        let depth = depth_for_difficulty(msg.difficulty);
        let mut commands = Vec::with_capacity(3);
        if self.last_session != Some(msg.session_id) {
            commands.push(EngineCommand::NewGame);
        }
        commands.push(EngineCommand::Position { fen: msg.fen });
        commands.push(EngineCommand::GoDepth(depth));

        if !self.pending.is_empty() {
            debug!(
                "Engine request for session {} queued behind {} outstanding",
                msg.session_id,
                self.pending.len()
            );
        }

        match self.send_all(&commands) {
            Ok(()) => {
                info!(
                    "Requested engine move for session {} at depth {}",
                    msg.session_id, depth
                );
                self.last_session = Some(msg.session_id);
                self.pending.push_back(PendingRequest {
                    session_id: msg.session_id,
                    reply_to: msg.reply_to,
                });
            }
            Err(e) => {
                warn!(
                    "Engine request for session {} not sent: {}",
                    msg.session_id, e
                );
                // A broken link will not answer the earlier searches either
                self.pending.clear();
            }
        }
    }
}

impl Handler<EngineOutput> for EngineCoordinator {
    type Result = ();

    fn handle(&mut self, msg: EngineOutput, _: &mut Self::Context) {
        let line = msg.0;
        if !is_best_move_line(&line) {
            debug!("engine -> {}", line);
            return;
        }

        match self.pending.pop_front() {
            Some(request) => {
                debug!("engine -> {} (session {})", line, request.session_id);
                request.reply_to.do_send(EngineReply {
                    raw: line,
                    session_id: request.session_id,
                });
            }
            None => debug!("Dropping unsolicited engine answer: {}", line),
        }
    }
}

impl Handler<Shutdown> for EngineCoordinator {
    type Result = ();

    fn handle(&mut self, _: Shutdown, ctx: &mut Self::Context) {
        self.pending.clear();
        ctx.stop();
    }
}
