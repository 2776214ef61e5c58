use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::workflows::dock::{
    DockLayoutConfig, DEFAULT_MAX_APPLICATIONS, DEFAULT_MAX_MEMO_STATES, DEFAULT_MINIMUM_INSURANCE,
};

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub planner: PlannerConfig,
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
            planner: PlannerConfig::from_env()?,
        })
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

/// Dock geometry and intake limits used by the planning service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    pub layout: DockLayoutConfig,
    pub max_applications: usize,
    /// Memo states the planner may record per pump-out position before giving up.
    pub max_memo_states: usize,
    pub minimum_insurance: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            layout: DockLayoutConfig::default(),
            max_applications: DEFAULT_MAX_APPLICATIONS,
            max_memo_states: DEFAULT_MAX_MEMO_STATES,
            minimum_insurance: DEFAULT_MINIMUM_INSURANCE,
        }
    }
}

impl PlannerConfig {
    /// Defaults overridden by any `DOCK_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let layout = DockLayoutConfig {
            small_length: env_or("DOCK_SMALL_LENGTH", defaults.layout.small_length)?,
            inside_south_length: env_or(
                "DOCK_INSIDE_SOUTH_LENGTH",
                defaults.layout.inside_south_length,
            )?,
            inside_north_length: env_or(
                "DOCK_INSIDE_NORTH_LENGTH",
                defaults.layout.inside_north_length,
            )?,
            inside_gap: env_or("DOCK_INSIDE_GAP", defaults.layout.inside_gap)?,
            pump_start_min: env_or("DOCK_PUMP_START_MIN", defaults.layout.pump_start_min)?,
            pump_start_max: env_or("DOCK_PUMP_START_MAX", defaults.layout.pump_start_max)?,
            pump_zone_width: env_or("DOCK_PUMP_ZONE_WIDTH", defaults.layout.pump_zone_width)?,
            outside_run_length: env_or(
                "DOCK_OUTSIDE_RUN_LENGTH",
                defaults.layout.outside_run_length,
            )?,
            boat_spacing: env_or("DOCK_BOAT_SPACING", defaults.layout.boat_spacing)?,
            ..defaults.layout
        };

        if layout.pump_start_min > layout.pump_start_max {
            return Err(ConfigError::InvalidSweepRange {
                min: layout.pump_start_min,
                max: layout.pump_start_max,
            });
        }

        Ok(Self {
            layout,
            max_applications: env_or("DOCK_MAX_APPLICATIONS", defaults.max_applications)?,
            max_memo_states: env_or("DOCK_MAX_MEMO_STATES", defaults.max_memo_states)?,
            minimum_insurance: env_or("DOCK_MIN_INSURANCE", defaults.minimum_insurance)?,
        })
    }
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    InvalidSweepRange { min: u32, max: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer (found '{value}')")
            }
            ConfigError::InvalidSweepRange { min, max } => write!(
                f,
                "DOCK_PUMP_START_MIN ({min}) must not exceed DOCK_PUMP_START_MAX ({max})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidSweepRange { .. } => None,
        }
    }
}
