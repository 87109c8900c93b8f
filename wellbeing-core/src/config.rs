use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Environment variables with this prefix override file settings,
/// e.g. `WELLBEING__HTTP__PORT=8080`.
pub const ENV_PREFIX: &str = "WELLBEING";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct WellbeingConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://wellbeing.db".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    /// Size of the recent window charted on the dashboard.
    pub recent_limit: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { recent_limit: 30 }
    }
}

impl WellbeingConfig {
    /// Defaults, then the TOML file at `path` if it exists, then `WELLBEING__*` env vars.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Self::load_with_env_prefix(path, ENV_PREFIX)
    }

    /// Same as [`WellbeingConfig::load`], reading overrides from `<prefix>__*` instead.
    pub fn load_with_env_prefix(path: &str, prefix: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix(prefix).separator("__"))
            .build()?;
        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = WellbeingConfig::load("does-not-exist-wellbeing.toml").unwrap();
        assert_eq!(config.database.url, "sqlite://wellbeing.db");
        assert_eq!(config.http.port, 5000);
        assert_eq!(config.dashboard.recent_limit, 30);
        assert_eq!(config.service.log_level, "info");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = std::env::temp_dir().join(format!("wellbeing-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("partial.toml");
        std::fs::write(&path, "[http]\nport = 8080\n").unwrap();

        let config = WellbeingConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.database.max_connections, 5);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_env_overrides_file_and_defaults() {
        // Own prefix so parallel tests reading WELLBEING__* are unaffected.
        const PREFIX: &str = "WELLBEING_ENV_OVERRIDE_TEST";
        let port_var = format!("{}__HTTP__PORT", PREFIX);
        let limit_var = format!("{}__DASHBOARD__RECENT_LIMIT", PREFIX);

        let dir = std::env::temp_dir().join(format!("wellbeing-env-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("file.toml");
        std::fs::write(&path, "[http]\nport = 8080\n\n[dashboard]\nrecent_limit = 12\n").unwrap();

        std::env::set_var(&port_var, "8081");
        std::env::set_var(&limit_var, "7");
        let config = WellbeingConfig::load_with_env_prefix(path.to_str().unwrap(), PREFIX);
        std::env::remove_var(&port_var);
        std::env::remove_var(&limit_var);
        std::fs::remove_dir_all(&dir).ok();

        let config = config.unwrap();
        assert_eq!(config.http.port, 8081);
        assert_eq!(config.dashboard.recent_limit, 7);
        assert_eq!(config.http.host, "0.0.0.0", "unset keys keep their defaults");
    }

    #[test]
    fn test_in_memory_detection() {
        assert!(DatabaseConfig::in_memory().is_in_memory());
        assert!(DatabaseConfig {
            url: "sqlite:file:test?mode=memory&cache=shared".to_string(),
            max_connections: 1,
        }
        .is_in_memory());
        assert!(!DatabaseConfig::default().is_in_memory());
    }
}
