use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use config::{
    Config as ConfigLoader, Environment, Map,
    builder::{ConfigBuilder, DefaultState},
};
use is_terminal::IsTerminal;
use serde::Deserialize;

const PREFIX: &str = "RELAY";

#[derive(Debug, Default)]
pub enum LogStyle {
    #[default]
    Auto,
    Always,
    Never,
}

impl LogStyle {
    pub fn is_color(&self) -> bool {
        match self {
            LogStyle::Auto => std::io::stdout().is_terminal(),
            LogStyle::Always => true,
            LogStyle::Never => false,
        }
    }
}

impl<'de> Deserialize<'de> for LogStyle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?.to_lowercase();
        match s.as_str() {
            "auto" => Ok(LogStyle::Auto),
            "always" => Ok(LogStyle::Always),
            "never" => Ok(LogStyle::Never),
            _ => Err(serde::de::Error::unknown_variant(
                &s,
                &["auto", "always", "never"],
            )),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Log {
    pub level: String,
    pub style: LogStyle,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            level: String::from("scan_relay=info,tower_http=warn"),
            style: LogStyle::default(),
        }
    }
}

/// Where the host-intelligence lookups go.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Upstream {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for Upstream {
    fn default() -> Self {
        Self {
            base_url: String::from("https://api.shodan.io"),
            timeout_seconds: 30,
        }
    }
}

impl Upstream {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Deserialize)]
#[serde(default)]
pub struct Config {
    pub log: Log,
    pub host: IpAddr,
    pub port: u16,
    pub cors: bool,
    pub strict_ipv4: bool,
    pub api_key: String,
    pub upstream: Upstream,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log: Log::default(),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 4000,
            cors: true,
            strict_ipv4: false,
            api_key: String::new(),
            upstream: Upstream::default(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("log", &self.log)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors", &self.cors)
            .field("strict_ipv4", &self.strict_ipv4)
            .field("api_key_set", &!self.api_key.trim().is_empty())
            .field("upstream", &self.upstream)
            .finish()
    }
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{PREFIX}_API_KEY must be set"
            )));
        }
        if self.upstream.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "upstream base url must not be empty".into(),
            ));
        }
        if self.upstream.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "upstream timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// `RELAY_LOG_LEVEL` style keys resolve through the single `_` source. Nested
/// fields whose own name contains `_` need `__`, e.g.
/// `RELAY_UPSTREAM__TIMEOUT_SECONDS`. `vars` replaces the process
/// environment when given.
fn env_sources(vars: Option<Map<String, String>>) -> ConfigBuilder<DefaultState> {
    ConfigLoader::builder()
        .add_source(
            Environment::with_prefix(PREFIX)
                .separator("_")
                .try_parsing(true)
                .source(vars.clone()),
        )
        .add_source(
            Environment::with_prefix(PREFIX)
                .separator("__")
                .prefix_separator("_")
                .try_parsing(true)
                .source(vars),
        )
}

pub fn load(builder: ConfigBuilder<DefaultState>) -> Result<Config, ConfigError> {
    let config = builder.build()?.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}

/// Reads the `RELAY_*` environment. A missing API key is fatal.
pub fn init_config() -> Config {
    match load(env_sources(None)) {
        Ok(config) => {
            println!("{:#?}", config);
            config
        }
        Err(err) => {
            panic!("{}", err);
        }
    }
}
