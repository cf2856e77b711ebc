use crate::error::{config_error, env_error, DespachoResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Optional overrides file, merged over the environment
pub const CONFIG_FILE: &str = "config/despacho.toml";

/// Default lifetime of a signed download link
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 60;

/// Which persistence backend holds the records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Redis,
}

impl FromStr for StoreBackend {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "redis" => Ok(StoreBackend::Redis),
            other => Err(config_error(&format!("Unknown store backend: {}", other))),
        }
    }
}

/// Main configuration structure for the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// IANA time zone used to turn timestamps into calendar dates
    pub timezone: String,
    /// UI locale for month and weekday labels
    pub locale: String,
    /// Persistence backend
    pub store_backend: StoreBackend,
    /// Redis connection URL, used by the redis backend
    pub redis_url: String,
    /// Directory holding uploaded document files
    pub storage_dir: String,
    /// Base URL used when building signed download links
    pub public_url: String,
    /// HTTP port
    pub port: u16,
    /// Lifetime of signed download links in seconds
    pub signed_url_ttl_secs: u64,
    /// How many hearings the dashboard lists
    pub upcoming_hearings_limit: usize,
    /// How many documents the dashboard lists
    pub recent_documents_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: String::from("UTC"),
            locale: String::from("es"),
            store_backend: StoreBackend::Memory,
            redis_url: String::from("redis://127.0.0.1:6379"),
            storage_dir: String::from("./storage"),
            public_url: String::from("http://127.0.0.1:3000"),
            port: 3000,
            signed_url_ttl_secs: DEFAULT_SIGNED_URL_TTL_SECS,
            upcoming_hearings_limit: 3,
            recent_documents_limit: 5,
        }
    }
}

/// Partial configuration read from the overrides file
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    timezone: Option<String>,
    locale: Option<String>,
    store_backend: Option<StoreBackend>,
    redis_url: Option<String>,
    storage_dir: Option<String>,
    public_url: Option<String>,
    port: Option<u16>,
    signed_url_ttl_secs: Option<u64>,
    upcoming_hearings_limit: Option<usize>,
    recent_documents_limit: Option<usize>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> DespachoResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Self::from_env()?;

        if Path::new(CONFIG_FILE).exists() {
            let content = fs::read_to_string(CONFIG_FILE)?;
            config.merge_toml(&content)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Build configuration from environment variables only
    pub fn from_env() -> DespachoResult<Self> {
        let defaults = Config::default();

        let timezone = env::var("TIMEZONE").unwrap_or(defaults.timezone);
        let locale = env::var("APP_LOCALE").unwrap_or(defaults.locale);
        let store_backend = match env::var("STORE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.store_backend,
        };
        let redis_url = env::var("REDIS_URL").unwrap_or(defaults.redis_url);
        let storage_dir = env::var("STORAGE_DIR").unwrap_or(defaults.storage_dir);
        let public_url = env::var("PUBLIC_URL").unwrap_or(defaults.public_url);

        let port = parse_env("PORT", defaults.port)?;
        let signed_url_ttl_secs = parse_env("SIGNED_URL_TTL_SECS", defaults.signed_url_ttl_secs)?;
        let upcoming_hearings_limit =
            parse_env("UPCOMING_HEARINGS_LIMIT", defaults.upcoming_hearings_limit)?;
        let recent_documents_limit =
            parse_env("RECENT_DOCUMENTS_LIMIT", defaults.recent_documents_limit)?;

        Ok(Config {
            timezone,
            locale,
            store_backend,
            redis_url,
            storage_dir,
            public_url,
            port,
            signed_url_ttl_secs,
            upcoming_hearings_limit,
            recent_documents_limit,
        })
    }

    /// Apply overrides from a TOML document
    pub fn merge_toml(&mut self, content: &str) -> DespachoResult<()> {
        let file: ConfigFile = toml::from_str(content)?;

        if let Some(timezone) = file.timezone {
            self.timezone = timezone;
        }
        if let Some(locale) = file.locale {
            self.locale = locale;
        }
        if let Some(backend) = file.store_backend {
            self.store_backend = backend;
        }
        if let Some(redis_url) = file.redis_url {
            self.redis_url = redis_url;
        }
        if let Some(storage_dir) = file.storage_dir {
            self.storage_dir = storage_dir;
        }
        if let Some(public_url) = file.public_url {
            self.public_url = public_url;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(ttl) = file.signed_url_ttl_secs {
            self.signed_url_ttl_secs = ttl;
        }
        if let Some(limit) = file.upcoming_hearings_limit {
            self.upcoming_hearings_limit = limit;
        }
        if let Some(limit) = file.recent_documents_limit {
            self.recent_documents_limit = limit;
        }

        Ok(())
    }

    /// Check values that can only be verified after merging
    pub fn validate(&self) -> DespachoResult<()> {
        self.tz()?;
        url::Url::parse(&self.public_url)
            .map_err(|e| config_error(&format!("Invalid PUBLIC_URL: {}", e)))?;
        Ok(())
    }

    /// Parsed time zone
    pub fn tz(&self) -> DespachoResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown time zone: {}", self.timezone)))
    }
}

fn parse_env<T: FromStr>(var: &str, default: T) -> DespachoResult<T> {
    match env::var(var) {
        Ok(value) => parse_value(var, &value),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(env::VarError::NotUnicode(_)) => Err(env_error(var)),
    }
}

/// Parse a numeric setting; a bad value is a configuration error naming `var`
fn parse_value<T: FromStr>(var: &str, value: &str) -> DespachoResult<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| config_error(&format!("Invalid value for {}: {:?}", var, value)))
}
