// Configuration module entry point
// Loads layered configuration once at startup

mod types;

use std::net::SocketAddr;

pub use types::Config;

/// Default config file, looked up without extension
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from the given file path (without extension)
    ///
    /// `PORT` and `APP_ENV` are read here, once, and take precedence over
    /// every other source.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_from_env(config_path, |key| std::env::var(key).ok())
    }

    /// Load configuration, resolving `PORT` / `APP_ENV` through `lookup`
    ///
    /// An empty value counts as unset.
    pub fn load_from_env<F>(config_path: &str, lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self::load_with(config_path, non_empty("PORT"), non_empty("APP_ENV"))
    }

    /// Load configuration with explicit `PORT` / `APP_ENV` values
    pub fn load_with(
        config_path: &str,
        port: Option<String>,
        app_env: Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("HELLO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("app.env", "development")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_override_option("server.port", port)?
            .set_override_option("app.env", app_env)?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values that would only fail later, at runtime construction
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.server.workers == Some(0) {
            return Err(config::ConfigError::Message(
                "server.workers must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING: &str = "does-not-exist/config";

    #[test]
    fn test_defaults() {
        let cfg = Config::load_with(MISSING, None, None).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.workers, None);
        assert_eq!(cfg.app.env, "development");
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.performance.keep_alive_timeout, 75);
        assert_eq!(cfg.performance.max_connections, None);
    }

    #[test]
    fn test_port_and_env_override() {
        let cfg = Config::load_with(
            MISSING,
            Some("9090".to_string()),
            Some("production".to_string()),
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.app.env, "production");
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "0.0.0.0:9090".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_env_lookup_overrides() {
        let cfg = Config::load_from_env(MISSING, |key| match key {
            "PORT" => Some("3000".to_string()),
            "APP_ENV" => Some("staging".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.app.env, "staging");
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let cfg = Config::load_from_env(MISSING, |_| Some(String::new())).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.app.env, "development");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = Config::load_with(MISSING, Some("not-a-port".to_string()), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let dir = std::env::temp_dir().join(format!("hello-server-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[server]\nworkers = 0\n").unwrap();

        let path = dir.join("config");
        let result = Config::load_with(path.to_str().unwrap(), None, None);
        let _ = std::fs::remove_dir_all(&dir);

        let err = result.unwrap_err().to_string();
        assert!(err.contains("server.workers"), "{err}");
    }
}
