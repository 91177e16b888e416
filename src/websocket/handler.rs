use actix::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::engine::{EngineCoordinator, Shutdown};
use crate::game::session::MatchSession;
use crate::models::{AppState, ClientMessage, ServerMessage};
use crate::websocket::timers::MatchTimers;

/// WebSocket handler driving one local match.
///
/// The actor's mailbox is the match's event loop: player commands, clock
/// ticks, the deferred engine trigger and engine replies are all processed
/// one at a time, in arrival order.
pub struct ChessWebSocket {
    pub id: String,
    pub app_state: web::Data<AppState>,
    pub session: MatchSession,
    /// Started the first time this connection needs an engine move.
    pub engine: Option<Addr<EngineCoordinator>>,
    pub timers: MatchTimers<SpawnHandle>,
}

impl ChessWebSocket {
    pub fn new(app_state: web::Data<AppState>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            app_state,
            session: MatchSession::new(),
            engine: None,
            timers: MatchTimers::default(),
        }
    }
}

impl Actor for ChessWebSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!("WebSocket connection started: {}", self.id);
        self.send_state(ctx);
    }

    fn stopping(&mut self, ctx: &mut Self::Context) -> Running {
        self.stop_timers(ctx);
        if let Some(engine) = self.engine.take() {
            engine.do_send(Shutdown);
        }
        info!("WebSocket connection closed: {}", self.id);
        Running::Stop
    }
}

// WebSocket message handler
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ChessWebSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                // Do nothing for pong messages
            }
            Ok(ws::Message::Text(text)) => {
                debug!("Received text message: {}", text);
                match serde_json::from_str::<ClientMessage>(text.as_ref()) {
                    Ok(client_msg) => self.handle_message(client_msg, ctx),
                    Err(e) => {
                        warn!("Error parsing client message: {}", e);
                        self.send(ctx, &ServerMessage::error(format!("Invalid message format: {}", e)));
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                warn!("Binary messages are not supported");
                self.send(ctx, &ServerMessage::error("Binary messages are not supported"));
            }
            Ok(ws::Message::Close(reason)) => {
                info!("Connection closed: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            _ => {
                ctx.stop();
            }
        }
    }
}

impl ChessWebSocket {
    pub fn send(&self, ctx: &mut ws::WebsocketContext<Self>, message: &ServerMessage) {
        match serde_json::to_string(message) {
            Ok(text) => ctx.text(text),
            Err(e) => {
                warn!("Failed to serialize response: {}", e);
                ctx.text("{\"error\": \"Internal server error\"}");
            }
        }
    }

    pub fn send_state(&self, ctx: &mut ws::WebsocketContext<Self>) {
        let message = ServerMessage::state(&self.session.snapshot(), self.app_state.ratings());
        self.send(ctx, &message);
    }
}

// WebSocket connection handler
pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let socket = ChessWebSocket::new(app_state.clone());
    info!("New WebSocket connection: {}", socket.id);
    ws::start(socket, &req, stream)
}
