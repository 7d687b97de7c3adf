use super::registry::Registry;
use super::{Ch, ClientEvent, ConId, Payload, Players};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Events processed by the registry task, one at a time in arrival order
#[derive(Debug)]
pub enum RelayMsg {
    Connect {
        con: ConId,
        ch: Ch,
    },
    State {
        con: ConId,
        event: ClientEvent,
        payload: Payload,
    },
    Disconnect {
        con: ConId,
    },
    Players(oneshot::Sender<Players>),
}

/// Handle to the registry task.
///
/// The registry lives until the last handle is dropped.
#[derive(Clone)]
pub struct Relay {
    ch: mpsc::UnboundedSender<RelayMsg>,
    con_counter: Arc<AtomicU64>,
}

impl Relay {
    /// Must be called within a tokio runtime
    pub fn spawn() -> Self {
        let (ch, mut r) = mpsc::unbounded_channel::<RelayMsg>();

        tokio::spawn(async move {
            let mut registry = Registry::default();
            while let Some(msg) = r.recv().await {
                registry.handle(msg);
            }
            tracing::debug!("relay stopped");
        });

        Self {
            ch,
            con_counter: Default::default(),
        }
    }

    /// Fresh connection identifier, never handed out twice by this relay
    pub fn next_con(&self) -> ConId {
        ConId::from(self.con_counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn connect(&self, con: ConId, ch: Ch) {
        self.send(RelayMsg::Connect { con, ch });
    }

    pub fn state(&self, con: ConId, event: ClientEvent, payload: Payload) {
        self.send(RelayMsg::State {
            con,
            event,
            payload,
        });
    }

    pub fn disconnect(&self, con: ConId) {
        self.send(RelayMsg::Disconnect { con });
    }

    /// Copy of the current registry
    pub async fn players(&self) -> Players {
        let (reply, r) = oneshot::channel();
        self.send(RelayMsg::Players(reply));
        r.await.unwrap_or_default()
    }

    fn send(&self, msg: RelayMsg) {
        if self.ch.send(msg).is_err() {
            tracing::error!("relay is not running");
        }
    }
}
