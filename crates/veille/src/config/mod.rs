use crate::workflows::opportunities::{PolicyError, ScoreWeights, ScoringPolicy};
use std::env;
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the service and the scoring engine.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringPolicy,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring: load_scoring_policy()?,
        })
    }
}

/// Reads policy overrides; unset variables keep the product defaults.
fn load_scoring_policy() -> Result<ScoringPolicy, ConfigError> {
    let mut policy = ScoringPolicy::default();

    if let Ok(raw) = env::var("APP_SCORE_WEIGHTS") {
        let values = raw
            .split(',')
            .map(|value| value.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ConfigError::InvalidScoreWeights { value: raw.clone() })?;
        policy.weights = ScoreWeights::from_slice(&values)?;
    }

    if let Some(level) = threshold_var("APP_BLUE_OCEAN_MAX_COMPETITION")? {
        policy.blue_ocean.max_competition_level = level;
    }
    if let Some(level) = threshold_var("APP_BLUE_OCEAN_MIN_POTENTIAL")? {
        policy.blue_ocean.min_financial_potential = level;
    }

    policy.validate()?;
    Ok(policy)
}

fn threshold_var(variable: &'static str) -> Result<Option<u8>, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|level| *level <= 100)
            .map(Some)
            .ok_or(ConfigError::InvalidThreshold { variable }),
        Err(_) => Ok(None),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost { source: std::net::AddrParseError },
    #[error("APP_SCORE_WEIGHTS must be five comma-separated numbers (got '{value}')")]
    InvalidScoreWeights { value: String },
    #[error("{variable} must be an integer between 0 and 100")]
    InvalidThreshold { variable: &'static str },
    #[error("invalid scoring policy: {0}")]
    Policy(#[from] PolicyError),
}
