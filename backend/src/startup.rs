// Server and router definition and tests
//

use crate::conf::Conf;
use crate::error::StartupError;
use crate::presence::Relay;

use axum::{routing::get, Router};
use std::net::{IpAddr, SocketAddr};
use tower_http::{add_extension::AddExtensionLayer, compression::CompressionLayer};

pub type ServerOutput = hyper::Result<()>;
pub type Server = std::pin::Pin<Box<dyn std::future::Future<Output = ServerOutput> + Send>>;

pub fn router(conf: &Conf, relay: Relay) -> Router {
    use crate::routes::*;

    let api_router = Router::new()
        .route("/health_check", get(health_check))
        .route("/players", get(players));

    let router = Router::new()
        .nest("/api", api_router)
        .route("/ws", get(ws::ws))
        .layer(CompressionLayer::new())
        .layer(AddExtensionLayer::new(relay))
        .layer(AddExtensionLayer::new(conf.env));

    crate::trace::with_request_tracing(router)
}

pub struct Application {
    host: String,
    port: u16,
    server: Server,
}

impl Application {
    /// Bind the listener and spawn the relay; nothing is served until `server()` is awaited
    pub async fn build(conf: &Conf) -> Result<Self, StartupError> {
        let address = format!("{}:{}", conf.env_conf.host, conf.env_conf.port);
        tracing::debug!("Binding to {}", address);

        let listener = std::net::TcpListener::bind(&address).map_err(|source| {
            StartupError::Bind {
                address: address.clone(),
                source,
            }
        })?;
        let host = conf.env_conf.host.clone();
        let port = listener
            .local_addr()
            .map_err(|source| StartupError::Bind { address, source })?
            .port();
        tracing::info!("Serving on http://{}:{}", host, port);

        let relay = Relay::spawn();

        let server = axum::Server::from_tcp(listener)?.serve(
            router(conf, relay).into_make_service_with_connect_info::<UserConnectInfo>(),
        );

        Ok(Self {
            server: Box::pin(server),
            port,
            host,
        })
    }

    // consumes to produce 1 server max
    pub fn server(self) -> Server {
        self.server
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[derive(Clone, Debug)]
pub struct UserConnectInfo {
    remote_addr: SocketAddr,
}

impl UserConnectInfo {
    pub fn socket_addr(&self, headers: &hyper::HeaderMap) -> SocketAddr {
        let mut sock = self.remote_addr;
        // rewrite ip address because server may be behind reverse proxy
        if let Some(ip) = forwarded_ip(headers) {
            sock.set_ip(ip);
        }
        sock
    }
}

impl axum::extract::connect_info::Connected<&hyper::server::conn::AddrStream> for UserConnectInfo {
    fn connect_info(target: &hyper::server::conn::AddrStream) -> Self {
        Self {
            remote_addr: target.remote_addr(),
        }
    }
}

fn header_str<'h>(h: &'h hyper::HeaderMap, name: &str) -> Option<&'h str> {
    h.get(name).and_then(|v| v.to_str().ok())
}

fn url_host_ip(h: &hyper::HeaderMap, name: &str) -> Option<IpAddr> {
    let url = url::Url::parse(header_str(h, name)?).ok()?;
    match url.host()? {
        url::Host::Ipv4(ip) => Some(ip.into()),
        url::Host::Ipv6(ip) => Some(ip.into()),
        url::Host::Domain(_) => None,
    }
}

fn x_forwarded_for(h: &hyper::HeaderMap) -> Option<IpAddr> {
    header_str(h, "x-forwarded-for")?
        .split(',')
        .map(str::trim)
        .last()?
        .parse()
        .ok()
}

/// Client ip as seen by a reverse proxy or the browser, if any header tells
pub fn forwarded_ip(h: &hyper::HeaderMap) -> Option<IpAddr> {
    x_forwarded_for(h) // when behind reverse proxy
        .or_else(|| url_host_ip(h, "origin")) // when local ws
        .or_else(|| url_host_ip(h, "referer"))
}
