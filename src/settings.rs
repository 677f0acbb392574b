use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub fetch: FetchSettings,
    pub lookup: LookupSettings,
    pub sweep: SweepSettings,
}

#[derive(Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    pub access_key: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub max_retries: u32,
}

#[derive(Debug, Deserialize)]
pub struct FetchSettings {
    pub limit: u32,
}

/// Page size used when searching for an aircraft's next flight by time.
#[derive(Debug, Deserialize)]
pub struct LookupSettings {
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct SweepSettings {
    pub min_delay: i64,
}

impl Settings {
    /// Defaults, then the optional YAML file at `path`, then `DELAYWATCH__*` variables.
    pub fn new(path: &Path) -> Result<Settings, ConfigError> {
        Self::builder(path)?.build()?.try_deserialize()
    }

    pub fn builder(path: &Path) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("api.base_url", "http://api.aviationstack.com/v1")?
            .set_default("api.timeout", "10s")?
            .set_default("api.max_retries", 3_i64)?
            .set_default("fetch.limit", 100_i64)?
            .set_default("lookup.limit", 10_i64)?
            .set_default("sweep.min_delay", 180_i64)?
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("DELAYWATCH")
                    .separator("__")
                    .try_parsing(true),
            ))
    }
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("access_key", &"***")
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(overrides: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let mut builder = Settings::builder(Path::new("config/does-not-exist.yaml"))?;
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        builder.build()?.try_deserialize()
    }

    #[test]
    fn test_defaults() {
        let settings = load(&[("api.access_key", "secret")]).unwrap();

        assert_eq!(settings.api.base_url, "http://api.aviationstack.com/v1");
        assert_eq!(settings.api.timeout, Duration::from_secs(10));
        assert_eq!(settings.api.max_retries, 3);
        assert_eq!(settings.fetch.limit, 100);
        assert_eq!(settings.lookup.limit, 10);
        assert_eq!(settings.sweep.min_delay, 180);
    }

    #[test]
    fn test_overrides() {
        let settings = load(&[
            ("api.access_key", "secret"),
            ("api.timeout", "1m 30s"),
            ("sweep.min_delay", "60"),
        ])
        .unwrap();

        assert_eq!(settings.api.timeout, Duration::from_secs(90));
        assert_eq!(settings.sweep.min_delay, 60);
    }

    #[test]
    fn test_debug_redacts_access_key() {
        let settings = load(&[("api.access_key", "secret")]).unwrap();
        let debug = format!("{:?}", settings.api);
        assert!(!debug.contains("secret"));
    }
}
