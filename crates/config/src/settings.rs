use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub store: StoreSettings,
    pub auth: AuthSettings,
    pub retry: RetrySettings,
    pub reconcile: ReconcileSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Where the refresh credential survives restarts. Falls back to the
    /// platform data directory when unset.
    pub credentials_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    pub jitter: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReconcileSettings {
    pub timeout_ms: u64,
    pub max_attempts: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    pub json: bool,
}

impl StoreSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl ReconcileSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file (silently ignore if missing)
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("HOMEBASE"),
            )
            .set_default("store.base_url", "http://localhost:8085")?
            .set_default("store.request_timeout_ms", 10_000)?
            .set_default("auth.base_url", "http://localhost:9099")?
            .set_default("auth.api_key", None::<String>)?
            .set_default("auth.credentials_path", None::<String>)?
            .set_default("retry.max_attempts", 3)?
            .set_default("retry.base_delay_ms", 200)?
            .set_default("retry.max_delay_ms", 2_000)?
            .set_default("retry.multiplier", 2.0)?
            .set_default("retry.jitter", 0.1)?
            .set_default("reconcile.timeout_ms", 5_000)?
            .set_default("reconcile.max_attempts", 2)?
            .set_default("telemetry.json", false)?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store: StoreSettings {
                base_url: "http://localhost:8085".to_string(),
                request_timeout_ms: 10_000,
            },
            auth: AuthSettings {
                base_url: "http://localhost:9099".to_string(),
                api_key: None,
                credentials_path: None,
            },
            retry: RetrySettings {
                max_attempts: 3,
                base_delay_ms: 200,
                max_delay_ms: 2_000,
                multiplier: 2.0,
                jitter: 0.1,
            },
            reconcile: ReconcileSettings {
                timeout_ms: 5_000,
                max_attempts: 2,
            },
            telemetry: TelemetrySettings { json: false },
        }
    }
}
