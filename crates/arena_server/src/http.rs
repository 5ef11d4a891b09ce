//! HTTP surface: the WebSocket upgrade endpoint and a bare index page.

use crate::arena::Arena;
use crate::connection::{Connection, TransportEnd};
use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::Request;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use tower::ServiceBuilder;
use tracing::{debug, info, instrument, warn};

/// Path clients open their WebSocket on.
pub const GAME_PATH: &str = "/tictactoe";

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Tic-tac-toe</title><link rel="stylesheet" href="/static/style.css"></head>
<body><div class="center" id="root"></div><script src="/static/js.js"></script></body>
</html>
"#;

/// Builds the router serving `arena`.
pub fn router(arena: Arena) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route(GAME_PATH, get(upgrade))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(arena)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> &'static str {
    "ok"
}

async fn upgrade(ws: WebSocketUpgrade, State(arena): State<Arena>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_socket(arena, socket))
}

/// Bridges one WebSocket to the arena until either side goes away.
#[instrument(skip_all)]
async fn serve_socket(arena: Arena, socket: WebSocket) {
    let (connection, mut transport) = Connection::channel();
    let id = connection.id();
    info!(connection_id = %id, "New WebSocket connection");
    arena.connect(connection);

    pump(socket, &mut transport).await;

    transport.close();
    info!(connection_id = %id, "WebSocket closed");
    arena.disconnect(id).await;
}

/// Moves frames both ways until the socket or the arena side closes.
async fn pump(socket: WebSocket, transport: &mut TransportEnd) {
    let (mut sink, mut stream) = socket.split();
    let outbound = &mut transport.outbound;
    let inbound = &transport.inbound;

    let writer = async {
        while let Some(text) = outbound.recv().await {
            if let Err(e) = sink.send(Message::Text(text.into())).await {
                warn!(error = %e, "WebSocket send failed");
                break;
            }
        }
    };

    let reader = async {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    if inbound.send(text.as_str().to_owned()).is_err() {
                        break;
                    }
                }
                Ok(Message::Close(reason)) => {
                    debug!(?reason, "Client closed the socket");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "WebSocket receive failed");
                    break;
                }
            }
        }
    };

    tokio::select! {
        _ = writer => {}
        _ = reader => {}
    }
}
