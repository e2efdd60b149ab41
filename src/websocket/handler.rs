use actix::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{info, warn};
use uuid::Uuid;

use crate::models::{ClientMessage, ErrorMessage};
use crate::session::{
    CellClicked, ChatSubmitted, GameSession, ResetClicked, Subscribe, UiEvent, Unsubscribe,
};

/// WebSocket bridge between a browser tab and the game session
pub struct UiSocket {
    pub id: Uuid,
    pub session: Addr<GameSession>,
}

impl Actor for UiSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        // Register with the session; it answers with a snapshot
        self.session.do_send(Subscribe {
            id: self.id,
            recipient: ctx.address().recipient(),
        });
        info!("Presentation connected: {}", self.id);
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.session.do_send(Unsubscribe(self.id));
        info!("Presentation disconnected: {}", self.id);
        Running::Stop
    }
}

impl Handler<UiEvent> for UiSocket {
    type Result = ();

    fn handle(&mut self, event: UiEvent, ctx: &mut Self::Context) {
        match serde_json::to_string(&event) {
            Ok(text) => ctx.text(text),
            Err(e) => warn!("Error serializing event: {}", e),
        }
    }
}

// WebSocket message handler
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for UiSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {}
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => self.handle_message(client_msg, ctx),
                Err(e) => {
                    warn!("Error parsing client message: {}", e);
                    self.reply_error(format!("Invalid message format: {}", e), ctx);
                }
            },
            Ok(ws::Message::Binary(_)) => {
                warn!("Binary messages are not supported");
                self.reply_error("Binary messages are not supported", ctx);
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

impl UiSocket {
    pub fn handle_message(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        match msg.message_type.as_str() {
            "move" => match msg.cell {
                Some(cell) => self.session.do_send(CellClicked(cell)),
                None => self.reply_error("Move requires a cell", ctx),
            },
            "chat" => match msg.text {
                Some(text) => self.session.do_send(ChatSubmitted(text)),
                None => self.reply_error("Chat requires text", ctx),
            },
            "reset" => self.session.do_send(ResetClicked),
            other => {
                warn!("Unknown message type: {}", other);
                self.reply_error(format!("Unknown message type: {}", other), ctx);
            }
        }
    }

    fn reply_error(&self, error: impl Into<String>, ctx: &mut ws::WebsocketContext<Self>) {
        match serde_json::to_string(&ErrorMessage::new(error)) {
            Ok(text) => ctx.text(text),
            Err(e) => warn!("Error serializing error reply: {}", e),
        }
    }
}

/// WebSocket connection handler
pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    session: web::Data<Addr<GameSession>>,
) -> Result<HttpResponse, Error> {
    let id = Uuid::new_v4();
    info!("New presentation connection: {}", id);

    let socket = UiSocket {
        id,
        session: session.get_ref().clone(),
    };

    ws::start(socket, &req, stream)
}
