// Configuration module entry point
// Layered configuration loading and shared runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

// Re-export public types
pub use state::AppState;
pub use types::{Config, HealthConfig, HttpConfig};

/// Environment variable prefix, e.g. `EMPATHY_SERVER__PORT=5001`
const ENV_PREFIX: &str = "EMPATHY";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Missing file is not an error; defaults fill any unset key
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::build(
            config::File::with_name(config_path).required(false),
            Self::environment(),
        )
    }

    /// `EMPATHY_` prefix, `__` between nested keys
    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn build<S>(file: S, env: config::Environment) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Idle bound between requests on a kept-alive connection, `None` disables keep-alive
    pub fn keep_alive_idle(&self) -> Option<Duration> {
        match self.performance.keep_alive_timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Upper bound for a single connection's lifetime
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(std::cmp::max(
            self.performance.read_timeout,
            self.performance.write_timeout,
        ))
    }
}
