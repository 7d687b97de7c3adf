#[allow(unused)]
pub use crate::{
    conf::Env,
    presence::{Relay, WsClientMsg, WsServerMsg},
};
#[allow(unused)]
pub use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
