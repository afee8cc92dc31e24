use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

pub const WS_PATH: &str = "/ws";
pub const MAX_PAYLOAD: usize = 1_048_576;
pub const HANDSHAKE_HEADER: &str = "x-fastify-header";
pub const HANDSHAKE_VALUE: &str = "fastify";

const CHANNEL_CAPACITY: usize = 256;

/// Relays every text or binary message to all connected clients.
#[derive(Clone)]
pub struct WsHub {
    sender: broadcast::Sender<Message>,
    shutdown: CancellationToken,
}

impl Default for WsHub {
    fn default() -> Self {
        Self::new()
    }
}

impl WsHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);

        WsHub {
            sender,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn connected(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Ends every open connection. Upgraded sockets are not tracked by the
    /// server's graceful shutdown, so this has to run alongside it.
    pub fn close(&self) {
        self.shutdown.cancel();
    }

    async fn serve(self, socket: WebSocket) {
        let (mut sink, mut stream) = socket.split();
        let mut inbox = self.sender.subscribe();
        tracing::info!(connected = self.connected(), "websocket client connected");

        let mut forward = tokio::spawn(async move {
            loop {
                match inbox.recv().await {
                    Ok(message) => {
                        if sink.send(message).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "websocket client lagging, messages dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        let sender = self.sender.clone();
        let mut receive = tokio::spawn(async move {
            while let Some(Ok(message)) = stream.next().await {
                match message {
                    Message::Text(_) | Message::Binary(_) => {
                        let _ = sender.send(message);
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        });

        tokio::select! {
            _ = &mut forward => receive.abort(),
            _ = &mut receive => forward.abort(),
            _ = self.shutdown.cancelled() => {
                forward.abort();
                receive.abort();
            }
        }

        tracing::info!("websocket client disconnected");
    }
}

/// Refuses the handshake unless `x-fastify-header: fastify` is present.
pub async fn verify_client(request: Request, next: Next) -> Result<Response, StatusCode> {
    let accepted = request
        .headers()
        .get(HANDSHAKE_HEADER)
        .is_some_and(|value| value.as_bytes() == HANDSHAKE_VALUE.as_bytes());

    if !accepted {
        tracing::debug!("websocket handshake rejected");

        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}

pub async fn upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let hub = state.hub.clone();

    ws.max_message_size(MAX_PAYLOAD)
        .max_frame_size(MAX_PAYLOAD)
        .on_upgrade(move |socket| hub.serve(socket))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(WS_PATH, get(upgrade))
        .route_layer(middleware::from_fn(verify_client))
}
