// Tracing subscriber setup
//

use crate::error::StartupError;
use tracing::Subscriber;
use tracing_subscriber::{fmt, fmt::MakeWriter, layer::SubscriberExt, EnvFilter, Registry};

pub struct TracingSubscriber {
    default_filter: String,
    pretty: bool,
}

impl TracingSubscriber {
    /// `default_filter` applies when `RUST_LOG` is unset or invalid
    pub fn new(default_filter: impl Into<String>) -> Self {
        Self {
            default_filter: default_filter.into(),
            pretty: false,
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn build<W>(self, sink: W) -> Box<dyn Subscriber + Send + Sync>
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.default_filter));

        let registry = Registry::default().with(filter);

        if self.pretty {
            Box::new(registry.with(fmt::layer().pretty().with_writer(sink)))
        } else {
            Box::new(registry.with(fmt::layer().with_target(false).with_writer(sink)))
        }
    }
}

/// Route `log` records into tracing and install `subscriber` process wide.
/// Can succeed only once per process.
pub fn init_global_default(
    subscriber: impl Subscriber + Send + Sync + 'static,
) -> Result<(), StartupError> {
    tracing_log::LogTracer::init().map_err(|e| StartupError::Telemetry(e.to_string()))?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| StartupError::Telemetry(e.to_string()))
}
