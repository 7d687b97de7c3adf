// Configuration definitions, functions and tests
//

use crate::error::StartupError;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

static ENV_PREFIX: &str = "RELAY";

// One variable to rule all
static GLOB_ENV: &str = "PRESENCE_ENV";

// plain port override, applied last
static PORT_ENV: &str = "PORT";

fn prefixed_env(suffix: &str) -> String {
    format!("{}__{}", ENV_PREFIX, suffix)
}

#[derive(Clone, Debug)]
pub struct Conf {
    pub env_conf: EnvConf,
    pub env: Env,
}

impl Conf {
    pub fn current() -> Result<Self, StartupError> {
        let env = Env::current()?;
        let env_conf = EnvConf::derive(&env)?;
        Ok(Self { env_conf, env })
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct EnvConf {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub log: Log,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Log {
    pub pretty: bool,
}

impl EnvConf {
    /// Layers, last wins: built-in defaults, `default` and `<env>` files
    /// from the conf dir, `RELAY__*` variables, `PORT`
    pub fn derive(env: &Env) -> Result<Self, config::ConfigError> {
        fn join_filename(conf_dir: &std::path::Path, filename: &str) -> String {
            conf_dir.join(filename).to_string_lossy().into_owned()
        }

        let conf_dir = std::env::var(prefixed_env("CONF_DIR"))
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|_| std::path::PathBuf::from("conf"));

        config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3000)?
            .set_default("log.pretty", false)?
            .add_source(config::File::with_name(&join_filename(&conf_dir, "default")).required(false))
            .add_source(
                config::File::with_name(&join_filename(&conf_dir, env.as_ref())).required(false),
            )
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .set_override_option(
                "port",
                // empty counts as unset
                std::env::var(PORT_ENV).ok().filter(|port| !port.is_empty()),
            )?
            .build()?
            .try_deserialize()
    }

    #[allow(unused)] // RA bug
    pub fn test_default() -> Self {
        Self {
            port: 0,
            host: "127.0.0.1".into(),
            log: Log { pretty: false },
        }
    }
}

use derive_more::Display;

#[derive(Debug, PartialEq, Display, Clone, Copy)]
pub enum Env {
    #[display(fmt = "local")]
    Local,
    #[display(fmt = "prod")]
    Prod,
}

impl Env {
    pub fn current() -> Result<Self, StartupError> {
        let glob_env = std::env::var(GLOB_ENV).unwrap_or_else(|_| "local".into());

        // Or set a more specific per executable
        std::env::var(prefixed_env("ENV"))
            .unwrap_or(glob_env)
            .try_into()
            .map_err(StartupError::Env)
    }

    pub fn local(&self) -> bool {
        matches!(self, Self::Local)
    }

    #[allow(unused)]
    pub fn prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

impl AsRef<str> for Env {
    fn as_ref(&self) -> &str {
        match self {
            Self::Local => "local",
            Self::Prod => "prod",
        }
    }
}

impl TryFrom<String> for Env {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "prod" => Ok(Self::Prod),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `prod`.",
                other
            )),
        }
    }
}
