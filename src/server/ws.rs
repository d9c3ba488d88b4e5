//! WebSocket tracking endpoint.
//!
//! One task per connection. A client binds a session with `start_session`,
//! streams `location_update` fixes, and receives a `tracking_update` after
//! each fix plus `mission_event` frames whenever progress is durably
//! recorded. Dropping the connection tears the live session down; the
//! progress ledger keeps whatever was already recorded.

use std::sync::Arc;

use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};
use uuid::Uuid;

use crate::tracking::protocol::{MissionEventKind, Navigation, TrackingMessage};
use crate::tracking::{Coordinates, TrackingError, TrackingService};

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Accept tracking connections until the listener fails.
pub async fn run(addr: &str, service: Arc<TrackingService>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Tracking socket listening on {}", addr);

    loop {
        let (stream, peer) = listener.accept().await?;
        tracing::debug!("Tracking connection from {}", peer);
        tokio::spawn(handle_connection(stream, Arc::clone(&service)));
    }
}

async fn handle_connection(stream: TcpStream, service: Arc<TrackingService>) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::warn!("WebSocket handshake failed: {}", e);
            return;
        }
    };

    let (mut ws_write, mut ws_read) = ws_stream.split();

    // Hunter and mission bound by start_session; fixes arriving before
    // that are rejected.
    let mut active: Option<(Uuid, Uuid)> = None;

    while let Some(msg) = ws_read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!("WebSocket read error: {}", e);
                break;
            }
        };

        match msg {
            Message::Text(text) => match TrackingMessage::from_json(&text) {
                Ok(frame) => dispatch(frame, &mut active, &service, &mut ws_write).await,
                Err(e) => {
                    let reply = TrackingMessage::Error {
                        message: format!("Malformed message: {}", e),
                    };
                    send(&mut ws_write, &reply).await;
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Connection gone. Durable progress is already on disk; only the live
    // odometer dies with the session.
    if let Some((hunter_id, _)) = active {
        service.stop_session(hunter_id);
    }
}

/// Handle one parsed client frame.
async fn dispatch(
    frame: TrackingMessage,
    active: &mut Option<(Uuid, Uuid)>,
    service: &TrackingService,
    ws_write: &mut WsSink,
) {
    match frame {
        TrackingMessage::StartSession {
            hunter_id,
            mission_id,
        } => match service.start_session(hunter_id, mission_id) {
            Ok(start) => {
                *active = Some((hunter_id, mission_id));
                let reply = TrackingMessage::SessionStarted {
                    status: "active".to_string(),
                    mission_id,
                    mission_title: start.mission.title,
                    progress: start.progress,
                };
                send(ws_write, &reply).await;
            }
            Err(e) => send_error(ws_write, &e).await,
        },

        TrackingMessage::LocationUpdate {
            latitude,
            longitude,
            speed,
        } => {
            let (hunter_id, mission_id) = match *active {
                Some(pair) => pair,
                None => {
                    send_error(ws_write, &TrackingError::NoSession).await;
                    return;
                }
            };

            let position = Coordinates::new(latitude, longitude);

            // The registry may have evicted the session while idle.
            let live_stats = match service.record_fix(hunter_id, position, speed) {
                Some(stats) => stats,
                None => {
                    *active = None;
                    send_error(ws_write, &TrackingError::NoSession).await;
                    return;
                }
            };

            match service.check_location(hunter_id, mission_id, position) {
                Ok(check) => {
                    let update = TrackingMessage::TrackingUpdate {
                        live_stats,
                        navigation: check.navigation.clone(),
                        progress: check.progress,
                    };
                    send(ws_write, &update).await;

                    if let Navigation::ClueReached {
                        clue,
                        points,
                        newly_recorded: true,
                        ..
                    } = check.navigation
                    {
                        let event = TrackingMessage::MissionEvent {
                            event: MissionEventKind::ClueReached,
                            clue: Some(clue),
                            points: Some(points),
                            completion: None,
                        };
                        send(ws_write, &event).await;
                    }

                    if let Some(completion) = check.completion {
                        let event = TrackingMessage::MissionEvent {
                            event: MissionEventKind::MissionCompleted,
                            clue: None,
                            points: Some(completion.points),
                            completion: Some(completion),
                        };
                        send(ws_write, &event).await;
                    }
                }
                Err(e) => send_error(ws_write, &e).await,
            }
        }

        TrackingMessage::StopSession => {
            if let Some((hunter_id, _)) = active.take() {
                service.stop_session(hunter_id);
            }
        }

        // Server frames arriving from a client.
        TrackingMessage::SessionStarted { .. }
        | TrackingMessage::TrackingUpdate { .. }
        | TrackingMessage::MissionEvent { .. }
        | TrackingMessage::Error { .. } => {
            let reply = TrackingMessage::Error {
                message: "Unexpected message type".to_string(),
            };
            send(ws_write, &reply).await;
        }
    }
}

/// Send one frame, logging failures without tearing down the task.
async fn send(ws_write: &mut WsSink, msg: &TrackingMessage) {
    match msg.to_json() {
        Ok(text) => {
            if let Err(e) = ws_write.send(Message::Text(text)).await {
                tracing::debug!("WebSocket send failed: {}", e);
            }
        }
        Err(e) => tracing::error!("Failed to serialize frame: {}", e),
    }
}

/// Report a service failure to the client. Storage detail stays in the
/// server log.
async fn send_error(ws_write: &mut WsSink, err: &TrackingError) {
    let message = match err {
        TrackingError::Storage(e) => {
            tracing::error!("Storage error during tracking: {}", e);
            "Internal error".to_string()
        }
        other => other.to_string(),
    };
    send(ws_write, &TrackingMessage::Error { message }).await;
}
