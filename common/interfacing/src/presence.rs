// Presence relay messages, exchanged as JSON text frames over a websocket
//

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Response header of the websocket upgrade carrying the assigned `ConId`
pub const CON_ID_HEADER: &str = "x-con-id";

/// Identifies a websocket connection for as long as it stays open.
///
/// Serialized as a string, since it keys the snapshot object.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConId(u64);

impl From<u64> for ConId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<ConId> for u64 {
    fn from(con: ConId) -> Self {
        con.0
    }
}

impl std::str::FromStr for ConId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(ConId)
    }
}

impl Serialize for ConId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ConId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ConIdVisitor;

        impl<'de> serde::de::Visitor<'de> for ConIdVisitor {
            type Value = ConId;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a connection id")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<ConId, E> {
                Ok(ConId(v))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<ConId, E> {
                v.parse().map(ConId).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(ConIdVisitor)
    }
}

/// Client supplied player state, relayed without interpretation
pub type Payload = serde_json::Value;

/// Last known state of every player that announced itself
pub type Players = HashMap<ConId, Payload>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::AsRefStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ClientEvent {
    /// first state announcement of a player
    NewPlayer,
    Update,
}

/// Client to server message
///
/// Missing `data` is treated as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsClientMsg {
    pub event: ClientEvent,
    #[serde(default)]
    pub data: Payload,
}

impl WsClientMsg {
    pub fn new_player(data: Payload) -> Self {
        Self {
            event: ClientEvent::NewPlayer,
            data,
        }
    }

    pub fn update(data: Payload) -> Self {
        Self {
            event: ClientEvent::Update,
            data,
        }
    }
}

/// Server to client message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, strum::AsRefStr)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum WsServerMsg {
    /// full registry snapshot
    UpdatePlayers(Players),
    /// removal notice
    PlayerDisconnected(ConId),
}
