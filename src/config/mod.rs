use std::env;
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/mlsc";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

const DEFAULT_LAUNCHPAD_EVENT: &str = "launchpad";
const DEFAULT_LAUNCHPAD_INTRO_HASHTAG: &str = "#lp24-introduction";
const DEFAULT_LAUNCHPAD_ORG_TYPES: &str = "College,School,Company";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub addr: SocketAddr,
    pub cors_allowed_origins: Vec<String>,
    /// HSTS is only sent when running behind TLS in production.
    pub include_hsts: bool,
    pub launchpad: LaunchpadConfig,
}

/// Scope of the launchpad leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchpadConfig {
    pub event: String,
    pub intro_hashtag: String,
    pub allowed_org_types: Vec<String>,
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            event: DEFAULT_LAUNCHPAD_EVENT.to_string(),
            intro_hashtag: DEFAULT_LAUNCHPAD_INTRO_HASHTAG.to_string(),
            allowed_org_types: parse_list(DEFAULT_LAUNCHPAD_ORG_TYPES),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("HOST", DEFAULT_HOST);
        let host: IpAddr = host.parse().map_err(|_| ConfigError::InvalidValue {
            var: "HOST",
            value: host.clone(),
        })?;
        let port = parse_env("PORT", DEFAULT_PORT)?;

        Ok(Self {
            database_url: env_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            max_connections: parse_env("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            addr: SocketAddr::new(host, port),
            cors_allowed_origins: parse_list(&env_or(
                "CORS_ALLOWED_ORIGINS",
                DEFAULT_ALLOWED_ORIGINS,
            )),
            include_hsts: env::var("RUST_ENV")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
            launchpad: LaunchpadConfig::from_env()?,
        })
    }
}

impl LaunchpadConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let allowed_org_types =
            parse_list(&env_or("LAUNCHPAD_ORG_TYPES", DEFAULT_LAUNCHPAD_ORG_TYPES));
        if allowed_org_types.is_empty() {
            return Err(ConfigError::Empty("LAUNCHPAD_ORG_TYPES"));
        }

        Ok(Self {
            event: env_or("LAUNCHPAD_EVENT", DEFAULT_LAUNCHPAD_EVENT),
            intro_hashtag: env_or("LAUNCHPAD_INTRO_HASHTAG", DEFAULT_LAUNCHPAD_INTRO_HASHTAG),
            allowed_org_types,
        })
    }
}

fn env_or(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        Err(_) => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
