use super::relay::RelayMsg;
use super::{Ch, ClientEvent, ConId, Payload, Players, WsServerMsg};
use std::collections::HashMap;

/// Connected clients and the last state each of them announced.
///
/// A con is in `players` only while it is in `clients` and after it
/// announced at least once.
#[derive(Default, derived_deref::Deref)]
pub struct Registry {
    #[target]
    players: Players,
    clients: HashMap<ConId, Ch>,
}

impl Registry {
    pub fn handle(&mut self, msg: RelayMsg) {
        match msg {
            RelayMsg::Connect { con, ch } => self.on_connect(con, ch),
            RelayMsg::State {
                con,
                event,
                payload,
            } => self.on_state(con, event, payload),
            RelayMsg::Disconnect { con } => self.on_disconnect(con),
            RelayMsg::Players(reply) => {
                // requester may have given up waiting
                reply.send(self.players.clone()).unwrap_or(());
            }
        }
    }

    pub fn on_connect(&mut self, con: ConId, ch: Ch) {
        if self.clients.insert(con, ch).is_some() {
            tracing::warn!("con {con} connected twice, channel replaced");
        }
        tracing::debug!("con {con} connected, {} clients", self.clients.len());
    }

    /// Announce and update are handled alike: upsert, then send the snapshot to everyone
    pub fn on_state(&mut self, con: ConId, event: ClientEvent, payload: Payload) {
        if !self.clients.contains_key(&con) {
            tracing::debug!("dropped {} from disconnected con {con}", event.as_ref());
            return;
        }

        self.players.insert(con, payload);
        tracing::debug!("con {con} sent {}", event.as_ref());

        self.broadcast(&WsServerMsg::UpdatePlayers(self.players.clone()));
    }

    pub fn on_disconnect(&mut self, con: ConId) {
        if self.clients.remove(&con).is_none() {
            return;
        }
        self.players.remove(&con);
        tracing::debug!("con {con} disconnected, {} clients", self.clients.len());

        self.broadcast(&WsServerMsg::PlayerDisconnected(con));
    }
}

#[cfg(test)]
impl Registry {
    fn is_connected(&self, con: ConId) -> bool {
        self.clients.contains_key(&con)
    }

    fn client_count(&self) -> usize {
        self.clients.len()
    }
}

// broadcast impl
impl Registry {
    /// Send to every connected client, announced or not
    fn broadcast(&self, msg: &WsServerMsg) {
        self.clients
            .values()
            .for_each(|ch| ch.send(msg.clone()).unwrap_or(()));
    }
}
