//! Application configuration, loaded via
//! the `config` crate exactly as `api-gateway/src/config.rs` does, but
//! flattened to a closed, unprefixed key set — there is
//! no nested sub-config here to warrant an `APP__SERVER__PORT`-style
//! prefix/separator scheme.

use serde::Deserialize;

/// Which surfaces this process exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    Api,
    Worker,
    Both,
}

impl Default for AppMode {
    fn default() -> Self {
        AppMode::Both
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_redis_host")]
    pub redis_host: String,
    #[serde(default = "default_redis_port")]
    pub redis_port: u16,
    #[serde(default)]
    pub redis_password: Option<String>,
    #[serde(default = "default_max_browser_instances")]
    pub max_browser_instances: usize,
    #[serde(default = "default_browser_timeout")]
    pub browser_timeout: u64,
    #[serde(default = "default_worker_concurrency")]
    pub worker_concurrency: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub app_mode: AppMode,
}

fn default_port() -> u16 {
    3000
}
fn default_redis_host() -> String {
    "127.0.0.1".to_string()
}
fn default_redis_port() -> u16 {
    6379
}
fn default_max_browser_instances() -> usize {
    4
}
fn default_browser_timeout() -> u64 {
    15_000
}
fn default_worker_concurrency() -> usize {
    4
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load from environment variables only; the key set is flat
    /// and unprefixed (`PORT`, `REDIS_HOST`, ...) rather than nested under an
    /// `APP__SECTION__FIELD`-style prefix.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()
    }

    pub fn redis_url(&self) -> String {
        match &self.redis_password {
            Some(password) if !password.is_empty() => {
                format!("redis://:{password}@{}:{}", self.redis_host, self.redis_port)
            }
            _ => format!("redis://{}:{}", self.redis_host, self.redis_port),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            redis_host: default_redis_host(),
            redis_port: default_redis_port(),
            redis_password: None,
            max_browser_instances: default_max_browser_instances(),
            browser_timeout: default_browser_timeout(),
            worker_concurrency: default_worker_concurrency(),
            log_level: default_log_level(),
            app_mode: AppMode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_port_3000_and_mode_both() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.app_mode, AppMode::Both);
    }

    #[test]
    fn redis_url_omits_auth_when_no_password() {
        let config = Config::default();
        assert_eq!(config.redis_url(), "redis://127.0.0.1:6379");
    }

    #[test]
    fn redis_url_includes_password_when_set() {
        let mut config = Config::default();
        config.redis_password = Some("secret".into());
        assert_eq!(config.redis_url(), "redis://:secret@127.0.0.1:6379");
    }
}
