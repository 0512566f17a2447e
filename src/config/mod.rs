// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

// Re-export public types
pub use state::AppState;
pub use types::{Config, FrameworkInfo};

/// Prefix for environment overrides, e.g. `STATUS_API_SERVER__PORT=9000`
const ENV_PREFIX: &str = "STATUS_API";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, environment())
    }

    /// Defaults, then the optional file, then the given environment source
    fn load_with_env(
        config_path: &str,
        env: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let settings = Self::with_defaults()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(env)
            .build()?;

        settings.try_deserialize()
    }

    fn with_defaults(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default(
                "http.server_name",
                concat!("status-api/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("framework.name", "Hyper")?
            .set_default("framework.version", "1")
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Upper bound on the lifetime of a single connection
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(std::cmp::max(
            self.performance.read_timeout,
            self.performance.write_timeout,
        ))
    }
}

/// `STATUS_API_<SECTION>__<KEY>` overrides
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
impl Config {
    /// Built-in defaults only, no file or environment sources
    pub fn defaults() -> Self {
        Self::with_defaults()
            .and_then(|builder| builder.build())
            .and_then(|settings| settings.try_deserialize())
            .expect("built-in defaults must deserialize")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::defaults();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.workers, None);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.performance.max_connections, None);
        assert_eq!(cfg.framework.name, "Hyper");
        assert!(cfg.http.server_name.starts_with("status-api/"));
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::defaults();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );

        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }

    #[test]
    fn test_connection_timeout_uses_larger_value() {
        let mut cfg = Config::defaults();
        cfg.performance.read_timeout = 5;
        cfg.performance.write_timeout = 12;
        assert_eq!(cfg.connection_timeout(), Duration::from_secs(12));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let cfg = Config::load_from("definitely-not-a-config-file").unwrap();
        assert_eq!(cfg.server.port, 8080);
    }

    fn write_config(name: &str, contents: &str) -> String {
        let base = std::env::temp_dir().join(format!("{name}-{}", std::process::id()));
        std::fs::write(base.with_extension("toml"), contents).unwrap();
        base.to_string_lossy().into_owned()
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = write_config(
            "status-api-file-layer",
            "[server]\nport = 9100\nworkers = 2\n\n[framework]\nname = \"Custom\"\nversion = \"7\"\n",
        );

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.server.workers, Some(2));
        assert_eq!(cfg.framework.name, "Custom");
        assert_eq!(cfg.framework.version, "7");
        // Keys absent from the file keep their defaults
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.logging.access_log_format, "combined");

        std::fs::remove_file(format!("{path}.toml")).unwrap();
    }

    #[test]
    fn test_environment_overrides_file() {
        let path = write_config(
            "status-api-env-layer",
            "[server]\nport = 9100\n\n[framework]\nname = \"Custom\"\n",
        );
        let vars = std::collections::HashMap::from([
            ("STATUS_API_SERVER__PORT".to_string(), "9200".to_string()),
            ("STATUS_API_LOGGING__ACCESS_LOG".to_string(), "false".to_string()),
        ]);

        let cfg = Config::load_with_env(&path, environment().source(Some(vars))).unwrap();
        assert_eq!(cfg.server.port, 9200);
        assert!(!cfg.logging.access_log);
        assert_eq!(cfg.framework.name, "Custom");

        std::fs::remove_file(format!("{path}.toml")).unwrap();
    }
}
