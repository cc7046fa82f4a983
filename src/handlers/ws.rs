//! WebSocket observer channel
//!
//! One socket per observer. The full dashboard state goes out first, then
//! the socket relays hub events outward and command frames inward until
//! either side closes.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use tokio::sync::broadcast;
use tracing::Instrument;
use uuid::Uuid;

use crate::models::ServerEvent;
use crate::{AppError, AppResult, AppState};

pub async fn upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> AppResult<impl IntoResponse> {
    if state.dashboard.simulator().is_closed() {
        return Err(AppError::ShuttingDown);
    }

    let observer_id = Uuid::new_v4();
    let span = tracing::info_span!("observer", id = %observer_id);
    Ok(ws.on_upgrade(move |socket| observe(socket, state).instrument(span)))
}

async fn observe(mut socket: WebSocket, state: AppState) {
    let (initial, mut rx) = state.dashboard.connect();
    tracing::info!("Observer connected ({} total)", state.dashboard.hub().observer_count());

    if send_event(&mut socket, &ServerEvent::DashboardState(initial)).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(frame))) => {
                        state.dashboard.handle_frame(&frame);
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if socket.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => {
                        break;
                    }
                    _ => {}
                }
            }
            outgoing = rx.recv() => {
                match outgoing {
                    Ok(event) => {
                        if send_event(&mut socket, &event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Observer lagged, skipped {} event(s)", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        }
    }

    tracing::info!("Observer disconnected");
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> AppResult<()> {
    let payload = serde_json::to_string(event)?;
    socket.send(Message::Text(payload)).await?;
    Ok(())
}
