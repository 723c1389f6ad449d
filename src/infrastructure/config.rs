use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_address: SocketAddr,
    /// Messages queued per connected device before senders wait.
    pub outbox_capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheSettings {
    pub path: PathBuf,
}

/// Defaults, then `config/dashboards.*` if present, then `DASHBOARDS__*`
/// environment variables (e.g. `DASHBOARDS__CACHE__PATH`).
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = builder()?
        .add_source(config::File::with_name("config/dashboards").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARDS").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

fn builder() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(config::Config::builder()
        .set_default("server.bind_address", "0.0.0.0:8080")?
        .set_default("server.outbox_capacity", 64)?
        .set_default("cache.path", "data/dashboards.json")?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: AppConfig = builder().unwrap().build().unwrap().try_deserialize().unwrap();

        assert_eq!(config.server.bind_address, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.server.outbox_capacity, 64);
        assert_eq!(config.cache.path, PathBuf::from("data/dashboards.json"));
    }

    #[test]
    fn test_overrides_win_over_defaults() {
        let config: AppConfig = builder()
            .unwrap()
            .set_override("cache.path", "/tmp/cache.json")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.cache.path, PathBuf::from("/tmp/cache.json"));
    }
}
