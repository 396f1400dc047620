use crate::exchange::{DrawStrategy, RandomSource};
use std::env;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// Telegram Bot API settings used for best-effort notifications
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub api_url: String,
}

/// Gift-exchange draw settings
#[derive(Debug, Clone)]
pub struct DrawConfig {
    pub strategy: DrawStrategy,
    pub random_source: RandomSource,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub telegram: TelegramConfig,
    pub draw: DrawConfig,
    pub log_level: String,
    pub http_port: u16,
    pub environment: String,
    pub room_sweep_interval_secs: u64,
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable is required")?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);

        let acquire_timeout_secs = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_secs = env::var("DATABASE_IDLE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(600); // 10 minutes

        let max_lifetime_secs = env::var("DATABASE_MAX_LIFETIME_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1800); // 30 minutes

        let test_before_acquire = env::var("DATABASE_TEST_BEFORE_ACQUIRE")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(true);

        if max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
        })
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/togetherly".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl TelegramConfig {
    pub fn from_env() -> Self {
        let bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        let api_url = env::var("TELEGRAM_API_URL")
            .unwrap_or_else(|_| "https://api.telegram.org".to_string());

        Self {
            bot_token,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_url: "https://api.telegram.org".to_string(),
        }
    }
}

impl DrawConfig {
    pub fn from_env() -> Result<Self, String> {
        let strategy = match env::var("DRAW_STRATEGY") {
            Ok(value) => DrawStrategy::from_str(&value)?,
            Err(_) => DrawStrategy::default(),
        };

        let random_source = match env::var("DRAW_SEED") {
            Ok(value) => {
                let seed = value
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid DRAW_SEED: {}", value))?;
                RandomSource::Seeded(seed)
            }
            Err(_) => RandomSource::Entropy,
        };

        Ok(Self {
            strategy,
            random_source,
        })
    }
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            strategy: DrawStrategy::default(),
            random_source: RandomSource::Entropy,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let database = DatabaseConfig::from_env()?;
        let telegram = TelegramConfig::from_env();
        let draw = DrawConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string());

        let http_port = match env::var("HTTP_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|_| format!("Invalid HTTP_PORT: {}", value))?,
            Err(_) => 3000,
        };

        let environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string());

        let room_sweep_interval_secs = env::var("ROOM_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(3600);

        let config = Self {
            database,
            telegram,
            draw,
            log_level: log_level.to_lowercase(),
            http_port,
            environment: environment.to_lowercase(),
            room_sweep_interval_secs,
        };
        config.validate()?;

        Ok(config)
    }

    /// Validate cross-field settings
    pub fn validate(&self) -> Result<(), String> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                self.log_level, valid_log_levels
            ));
        }

        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&self.environment.as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                self.environment, valid_environments
            ));
        }

        if self.is_production() && matches!(self.draw.random_source, RandomSource::Seeded(_)) {
            return Err("DRAW_SEED must not be set in production".to_string());
        }

        if self.room_sweep_interval_secs == 0 {
            return Err("ROOM_SWEEP_INTERVAL_SECS must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Get database URL (convenience method)
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    pub fn room_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.room_sweep_interval_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            telegram: TelegramConfig::default(),
            draw: DrawConfig::default(),
            log_level: "info".to_string(),
            http_port: 3000,
            environment: "development".to_string(),
            room_sweep_interval_secs: 3600,
        }
    }
}
