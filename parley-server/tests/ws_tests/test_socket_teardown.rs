use crate::utils::{self, init_tracing, participants};
use futures::{SinkExt, StreamExt};
use parley_core::{ClientEvent, ParticipantId, RoomId, ServerEvent};
use parley_server::{Relay, RelayCommand, RelayService, router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server() -> (SocketAddr, mpsc::Sender<RelayCommand>) {
    let (command_tx, command_rx) = mpsc::channel(100);
    let service = RelayService::new(command_tx);

    let relay = Relay::new(command_rx, Arc::new(service.clone()));
    tokio::spawn(relay.run());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local addr");

    let cmd_tx = service.command_sender();
    tokio::spawn(async move {
        axum::serve(listener, router(service))
            .await
            .expect("Server error");
    });

    (addr, cmd_tx)
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (ws, _) = connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("Failed to connect");
    ws
}

async fn join(ws: &mut WsClient, room: &RoomId, name: &str) {
    let event = ClientEvent::Join {
        room: room.clone(),
        participant: ParticipantId::from(name),
    };
    let json = serde_json::to_string(&event).expect("Failed to serialize");
    ws.send(Message::Text(json.into()))
        .await
        .expect("Failed to send");
}

async fn next_event(ws: &mut WsClient) -> ServerEvent {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("Timed out waiting for a server event")
            .expect("Socket closed")
            .expect("Socket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).expect("Undecodable server event");
        }
    }
}

#[tokio::test]
async fn abrupt_socket_drop_unbinds_the_participant() {
    init_tracing();

    let (addr, cmd_tx) = spawn_server().await;
    let room = utils::create_room(&cmd_tx).await.expect("create failed");

    let mut ws1 = connect(addr).await;
    join(&mut ws1, &room, "u1").await;
    assert_eq!(
        next_event(&mut ws1).await,
        ServerEvent::Participants {
            room: room.clone(),
            participants: participants(&["u1"]),
        }
    );

    let mut ws2 = connect(addr).await;
    join(&mut ws2, &room, "u2").await;
    assert_eq!(
        next_event(&mut ws1).await,
        ServerEvent::Participants {
            room: room.clone(),
            participants: participants(&["u1", "u2"]),
        }
    );
    assert_eq!(
        next_event(&mut ws2).await,
        ServerEvent::Participants {
            room: room.clone(),
            participants: participants(&["u1", "u2"]),
        }
    );

    // u1's transport dies with no Leave and no close frame.
    drop(ws1);

    assert_eq!(
        next_event(&mut ws2).await,
        ServerEvent::Participants {
            room: room.clone(),
            participants: participants(&["u2"]),
        },
        "The survivor must see a departure broadcast"
    );

    // With u1 truly unbound, u2's departure empties and deletes the room.
    drop(ws2);
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if !utils::validate_room(&cmd_tx, &room).await.expect("validate failed") {
            break;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("Room still exists, a ghost participant is keeping it alive");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
