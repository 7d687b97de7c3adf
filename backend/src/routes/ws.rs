use super::imports::*;
use crate::presence::{ConId, WsServerMsg, CON_ID_HEADER};
use crate::startup::UserConnectInfo;
use axum::extract::{
    connect_info::ConnectInfo,
    ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use hyper::header::HeaderValue;
use std::net::SocketAddr;
use tokio::sync::mpsc;

pub async fn ws(
    maybe_ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    ConnectInfo(con_info): ConnectInfo<UserConnectInfo>,
    headers: hyper::HeaderMap,
    Extension(relay): Extension<Relay>,
    Extension(env): Extension<Env>,
) -> Response {
    let ws = match maybe_ws {
        Ok(ws) => ws,
        Err(e) => {
            tracing::trace!("{headers:?}");
            tracing::error!("{e}");
            return e.into_response();
        }
    };

    let con = relay.next_con();
    let sock_addr = env.local().then(|| con_info.socket_addr(&headers));

    let mut response = ws.on_upgrade(move |socket| handle_socket(socket, con, sock_addr, relay));
    // lets the player find its own entry in snapshots
    response
        .headers_mut()
        .insert(CON_ID_HEADER, HeaderValue::from(u64::from(con)));
    response
}

async fn handle_socket(
    socket: WebSocket,
    con: ConId,
    sock_addr: Option<SocketAddr>,
    relay: Relay,
) {
    let (server_msg_sender, server_msg_receiver) = mpsc::unbounded_channel::<WsServerMsg>();

    // registered before anything is read, so own snapshots reach the player
    relay.connect(con, server_msg_sender);
    match sock_addr {
        Some(sock_addr) => tracing::info!("Player {con} connected from {sock_addr}"),
        None => tracing::info!("Player {con} connected"),
    }

    let (sender, receiver) = socket.split();
    let mut rh = tokio::spawn(read(receiver, relay.clone(), con));
    let mut wh = tokio::spawn(write(sender, server_msg_receiver, con));

    // as soon as either side is done, cancel the other
    tokio::select! {
        _ = &mut rh => wh.abort(),
        _ = &mut wh => rh.abort(),
    };

    relay.disconnect(con);
    tracing::info!("Player {con} disconnected");
}

async fn read(mut receiver: SplitStream<WebSocket>, relay: Relay, con: ConId) {
    loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<WsClientMsg>(&text) {
                Ok(WsClientMsg { event, data }) => {
                    tracing::debug!("Received message from {con}: {text:?}");
                    relay.state(con, event, data);
                }
                Err(e) => {
                    tracing::info!("Received unexpected message from {con}: {text:?} ({e})");
                }
            },
            Some(Ok(Message::Close(frame))) => {
                tracing::debug!("Close from {con}: {frame:?}");
                return;
            }
            Some(Ok(msg)) => {
                tracing::debug!("Received unhandled message from {con}: {msg:?}");
            }
            Some(Err(e)) => {
                tracing::info!("Read from {con} failed: {e}");
                return;
            }
            None => {
                return;
            }
        }
    }
}

async fn write(
    mut sender: SplitSink<WebSocket, Message>,
    mut server_msg_receiver: mpsc::UnboundedReceiver<WsServerMsg>,
    con: ConId,
) {
    while let Some(msg) = server_msg_receiver.recv().await {
        let text = match serde_json::to_string(&msg) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to serialize {}: {e}", msg.as_ref());
                continue;
            }
        };

        match sender.send(Message::Text(text)).await {
            Ok(()) => {
                tracing::trace!("Sent {} to {con}", msg.as_ref());
            }
            Err(e) => {
                tracing::info!("Write to {con} failed: {e}");
                return;
            }
        }
    }
}
