mod imports;
pub mod ws;

use imports::*;

pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Current registry snapshot, same shape as the `updatePlayers` payload
pub async fn players(Extension(relay): Extension<Relay>) -> Json<crate::presence::Players> {
    Json(relay.players().await)
}
