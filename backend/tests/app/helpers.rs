use futures_util::{SinkExt, StreamExt};
use once_cell::sync::Lazy;
use relay::{
    conf,
    presence::{ConId, CON_ID_HEADER, Payload, Players, WsClientMsg, WsServerMsg},
    startup::Application,
    telemetry,
};
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

static TRACING: Lazy<()> = Lazy::new(|| {
    let subscriber = telemetry::TracingSubscriber::new("debug");

    if std::env::var("TEST_LOG").is_ok() {
        telemetry::init_global_default(subscriber.build(std::io::stdout)).unwrap();
    } else {
        telemetry::init_global_default(subscriber.build(std::io::sink)).unwrap();
    };
});

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let env_conf = conf::EnvConf::test_default();
    let env = conf::Env::Local;
    let conf = conf::Conf { env, env_conf };

    let application = Application::build(&conf).await.unwrap();

    let host = application.host().to_owned();
    let port = application.port();

    let app_handle = tokio::spawn(application.server());

    let api_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address: format!("http://{}:{}", host, port),
        ws_address: format!("ws://{}:{}/ws", host, port),
        api_client,
        app_handle,
    }
}

pub struct TestApp {
    pub address: String,
    pub ws_address: String,
    pub api_client: reqwest::Client,

    app_handle: tokio::task::JoinHandle<hyper::Result<()>>,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.app_handle.abort();
    }
}

impl TestApp {
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    pub async fn players(&self) -> Players {
        self.get("/api/players")
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    pub async fn connect(&self) -> Player {
        let (stream, response) = connect_async(self.ws_address.as_str()).await.unwrap();

        let con = response
            .headers()
            .get(CON_ID_HEADER)
            .expect("con id header on upgrade")
            .to_str()
            .unwrap()
            .parse()
            .unwrap();

        Player { stream, con }
    }

    /// Connects and announces, returning once the own snapshot arrived
    pub async fn join(&self, payload: Payload) -> (Player, ConId) {
        let mut player = self.connect().await;
        let con = player.con;

        player.send(&WsClientMsg::new_player(payload)).await;

        // a removal notice for an earlier player may still be in flight
        loop {
            match player.recv().await {
                WsServerMsg::UpdatePlayers(players) if players.contains_key(&con) => break,
                WsServerMsg::UpdatePlayers(_) | WsServerMsg::PlayerDisconnected(_) => continue,
            }
        }

        (player, con)
    }
}

pub struct Player {
    stream: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
    pub con: ConId,
}

impl Player {
    pub async fn send(&mut self, msg: &WsClientMsg) {
        self.send_text(serde_json::to_string(msg).unwrap()).await;
    }

    pub async fn send_text(&mut self, text: impl Into<String>) {
        self.stream.send(Message::Text(text.into())).await.unwrap();
    }

    pub async fn recv(&mut self) -> WsServerMsg {
        loop {
            let msg = tokio::time::timeout(RECV_TIMEOUT, self.stream.next())
                .await
                .expect("message before timeout")
                .expect("open stream")
                .unwrap();

            match msg {
                Message::Text(text) => return serde_json::from_str(&text).unwrap(),
                Message::Ping(_) | Message::Pong(_) => continue,
                other => panic!("unexpected frame {other:?}"),
            }
        }
    }

    pub async fn recv_snapshot(&mut self) -> Players {
        match self.recv().await {
            WsServerMsg::UpdatePlayers(players) => players,
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    pub async fn recv_removal(&mut self) -> ConId {
        match self.recv().await {
            WsServerMsg::PlayerDisconnected(con) => con,
            other => panic!("expected removal notice, got {other:?}"),
        }
    }

    /// Nothing arrives within a short window
    pub async fn assert_silent(&mut self) {
        let r = tokio::time::timeout(Duration::from_millis(200), self.stream.next()).await;
        assert!(r.is_err(), "unexpected {r:?}");
    }

    pub async fn leave(mut self) {
        self.stream.close(None).await.unwrap();
    }
}
