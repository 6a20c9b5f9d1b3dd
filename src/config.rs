use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

const PLACEHOLDER_GEMINI_API_KEY: &str = "PLACEHOLDER_GEMINI_API_KEY";

/// Main configuration structure for the guidance service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub gemini: GeminiConfig,
    pub retry: RetryConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub database: u8,
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    pub max_size: usize,
    pub timeout_seconds: u64,
    pub create_timeout_seconds: u64,
    pub recycle_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Full generateContent URL; the key is appended as a query parameter.
    pub endpoint: String,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_factor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub concern_min_chars: usize,
    pub concern_max_chars: usize,
    pub context_max_chars: usize,
    pub display_name_min_chars: usize,
    pub bio_max_chars: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            concern_min_chars: 3,
            concern_max_chars: 2000,
            context_max_chars: 4000,
            display_name_min_chars: 2,
            bio_max_chars: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl GeminiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl HistoryConfig {
    fn is_usable(&self) -> bool {
        self.default_limit >= 1 && self.max_limit >= 1 && self.default_limit <= self.max_limit
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides.
    /// Never fails; problems fall back to defaults and are logged.
    pub fn load() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::info!("Loaded .env from: {}", path.display()),
            Err(_) => tracing::debug!("No .env file found - continuing with env vars only"),
        }

        let config_path = env::var("FG_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match Self::from_yaml(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::warn!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();
        config.reset_unusable_sections();

        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(bind) = env::var("FG_HTTP_BIND") {
            self.server.bind = bind;
        }

        // Redis overrides
        if let Ok(host) = env::var("REDIS_HOST") {
            self.redis.host = host;
        }
        if let Ok(port) = env::var("REDIS_PORT") {
            if let Ok(port_num) = port.parse() {
                self.redis.port = port_num;
            }
        }
        if let Ok(db) = env::var("REDIS_DB") {
            if let Ok(db_num) = db.parse() {
                self.redis.database = db_num;
            }
        }
        if let Ok(pool_size) = env::var("FG_REDIS_POOL_SIZE") {
            if let Ok(size) = pool_size.parse() {
                self.redis.pool.max_size = size;
            }
        }

        // Gemini overrides
        if let Ok(api_key) = env::var("GEMINI_API_KEY") {
            self.gemini.api_key = api_key;
        }
        if let Ok(endpoint) = env::var("GEMINI_ENDPOINT") {
            self.gemini.endpoint = endpoint;
        }
        if let Ok(timeout) = env::var("GEMINI_TIMEOUT_SECONDS") {
            if let Ok(secs) = timeout.parse() {
                self.gemini.timeout_seconds = secs;
            }
        }

        if let Ok(attempts) = env::var("FG_RETRY_MAX_ATTEMPTS") {
            if let Ok(n) = attempts.parse() {
                self.retry.max_attempts = n;
            }
        }
    }

    /// Sections that would break request handling fall back to defaults.
    fn reset_unusable_sections(&mut self) {
        if !self.history.is_usable() {
            tracing::warn!(
                default_limit = self.history.default_limit,
                max_limit = self.history.max_limit,
                "Unusable history limits - using defaults"
            );
            self.history = HistoryConfig::default();
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.redis.port == 0 {
            return Err("Redis port cannot be 0".into());
        }

        if self.gemini.api_key == PLACEHOLDER_GEMINI_API_KEY || self.gemini.api_key.is_empty() {
            return Err("GEMINI_API_KEY environment variable must be set".into());
        }
        if !(0.0..=2.0).contains(&self.gemini.temperature) {
            return Err("Gemini temperature must be between 0.0 and 2.0".into());
        }
        if !(0.0..=1.0).contains(&self.gemini.top_p) {
            return Err("Gemini top_p must be between 0.0 and 1.0".into());
        }
        if self.gemini.timeout_seconds == 0 {
            return Err("Gemini timeout_seconds cannot be 0".into());
        }

        if self.retry.max_attempts == 0 {
            return Err("Retry max_attempts must be at least 1".into());
        }
        if self.retry.jitter_factor < 0.0 || self.retry.jitter_factor > 1.0 {
            return Err("Retry jitter factor must be between 0.0 and 1.0".into());
        }

        if self.validation.concern_min_chars > self.validation.concern_max_chars {
            return Err("validation.concern_min_chars exceeds concern_max_chars".into());
        }
        if !self.history.is_usable() {
            return Err("history limits must satisfy 1 <= default_limit <= max_limit".into());
        }

        Ok(())
    }

    /// Get Redis URL with password from environment
    pub fn get_redis_url(&self) -> String {
        let password = env::var("REDIS_PASSWORD").unwrap_or_else(|_| {
            tracing::warn!("REDIS_PASSWORD not set, assuming no password for local development.");
            "".to_string()
        });

        if password.is_empty() {
            format!(
                "redis://{}:{}/{}",
                self.redis.host, self.redis.port, self.redis.database
            )
        } else {
            format!(
                "redis://:{}@{}:{}/{}",
                password, self.redis.host, self.redis.port, self.redis.database
            )
        }
    }

    pub fn get_pool_timeout(&self) -> Duration {
        Duration::from_secs(self.redis.pool.timeout_seconds)
    }

    pub fn get_pool_create_timeout(&self) -> Duration {
        Duration::from_secs(self.redis.pool.create_timeout_seconds)
    }

    pub fn get_pool_recycle_timeout(&self) -> Duration {
        Duration::from_secs(self.redis.pool.recycle_timeout_seconds)
    }

    /// Clamp a requested history page size into the configured bounds.
    pub fn history_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.history.default_limit)
            .clamp(1, self.history.max_limit.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "faith-guidance".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                bind: "127.0.0.1:8080".to_string(),
            },
            redis: RedisConfig {
                host: "localhost".to_string(),
                port: 6379,
                database: 0,
                pool: PoolConfig {
                    max_size: 16,
                    timeout_seconds: 5,
                    create_timeout_seconds: 5,
                    recycle_timeout_seconds: 5,
                },
            },
            gemini: GeminiConfig {
                api_key: env::var("GEMINI_API_KEY").unwrap_or_else(|_| {
                    tracing::warn!("GEMINI_API_KEY not set, using placeholder");
                    PLACEHOLDER_GEMINI_API_KEY.to_string()
                }),
                endpoint: "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent".to_string(),
                temperature: 0.7,
                top_k: 40,
                top_p: 0.95,
                max_output_tokens: 2048,
                timeout_seconds: 60,
            },
            retry: RetryConfig {
                max_attempts: 2,
                initial_delay_ms: 250,
                max_delay_ms: 2000,
                jitter_factor: 0.2,
            },
            validation: ValidationConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}
