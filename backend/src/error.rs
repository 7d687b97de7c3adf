// Failures that stop the server from starting
//

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Conf(#[from] config::ConfigError),

    #[error("{0}")]
    Env(String),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serve(#[from] hyper::Error),

    #[error("failed to install tracing subscriber: {0}")]
    Telemetry(String),
}
