use crate::helpers::spawn_app;
use hyper::StatusCode;

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;

    let response = app.get("/api/health_check").send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn players_empty_on_start() {
    let app = spawn_app().await;

    assert!(app.players().await.is_empty());
}

#[tokio::test]
async fn ws_route_requires_upgrade() {
    let app = spawn_app().await;

    let response = app.get("/ws").send().await.unwrap();

    assert!(response.status().is_client_error());
}
