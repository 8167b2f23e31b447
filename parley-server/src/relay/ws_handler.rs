use crate::relay::relay_command::RelayCommand;
use crate::relay::relay_service::RelayService;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use parley_core::{ClientEvent, ConnectionId};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<RelayService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service))
}

async fn handle_socket(socket: WebSocket, service: RelayService) {
    let connection = ConnectionId::new();
    info!("New WebSocket connection: {}", connection);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_connection(connection, tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => {
                            let cmd = command_for(event, connection);
                            if service.command_tx.send(cmd).await.is_err() {
                                error!("Relay task is gone");
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid client event from {}: {:?}", connection, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // Transport teardown doubles as an implicit leave. Issued here, after
    // either half has exited, so a write failure aborting the receive half
    // still unbinds the participant.
    let _ = service
        .command_tx
        .send(RelayCommand::Disconnect { connection })
        .await;

    service.remove_connection(&connection);
    info!("WebSocket disconnected: {}", connection);
}

fn command_for(event: ClientEvent, connection: ConnectionId) -> RelayCommand {
    match event {
        ClientEvent::Join { room, participant } => RelayCommand::Join {
            room,
            participant,
            connection,
        },
        ClientEvent::Signal {
            room,
            from,
            to,
            payload,
        } => RelayCommand::Signal {
            room,
            from,
            to,
            payload,
        },
        ClientEvent::Leave { room, participant } => RelayCommand::Leave { room, participant },
    }
}
