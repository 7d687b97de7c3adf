pub use interfacing::presence::{
    ClientEvent, ConId, CON_ID_HEADER, Payload, Players, WsClientMsg, WsServerMsg,
};

// outbound message channel of a single connection
pub type Ch = tokio::sync::mpsc::UnboundedSender<WsServerMsg>;

pub mod registry;
pub mod relay;

pub use relay::{Relay, RelayMsg};
