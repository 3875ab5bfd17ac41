use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::Level;

/// An error raised while reading the configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("invalid value for {key}: {message}")]
	Invalid { key: &'static str, message: String },
	#[error("{key} must be at least 1")]
	Zero { key: &'static str },
}

/// Runtime configuration, read from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub host: String,
	pub port: u16,
	/// The number of posts on a single feed page.
	pub page_size: i64,
	/// How long a rendered landing page is served from the cache.
	pub index_cache_ttl: Duration,
	pub log_level: Level,
	/// Whether to export traces and metrics over OTLP.
	pub otlp: bool,
	pub rate_limit_per_second: u64,
	pub rate_limit_burst: u32,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			database_url: "sqlite://blog.db".into(),
			host: "127.0.0.1".into(),
			port: 3000,
			page_size: 10,
			index_cache_ttl: Duration::from_secs(20),
			log_level: Level::INFO,
			otlp: false,
			rate_limit_per_second: 10,
			rate_limit_burst: 50,
		}
	}
}

impl Config {
	pub fn load() -> Result<Self, ConfigError> {
		let defaults = Self::default();

		let page_size = try_load("PAGE_SIZE", defaults.page_size)?;
		let rate_limit_per_second = try_load("RATE_LIMIT_PER_SECOND", defaults.rate_limit_per_second)?;
		let rate_limit_burst = try_load("RATE_LIMIT_BURST", defaults.rate_limit_burst)?;

		if page_size < 1 {
			return Err(ConfigError::Zero { key: "PAGE_SIZE" });
		}

		if rate_limit_per_second == 0 {
			return Err(ConfigError::Zero {
				key: "RATE_LIMIT_PER_SECOND",
			});
		}

		if rate_limit_burst == 0 {
			return Err(ConfigError::Zero {
				key: "RATE_LIMIT_BURST",
			});
		}

		Ok(Self {
			database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
			host: env::var("HOST").unwrap_or(defaults.host),
			port: try_load("PORT", defaults.port)?,
			page_size,
			index_cache_ttl: Duration::from_secs(try_load(
				"INDEX_CACHE_TTL",
				defaults.index_cache_ttl.as_secs(),
			)?),
			log_level: try_load("LOG_LEVEL", defaults.log_level)?,
			otlp: env::var_os("OTEL_EXPORTER_OTLP_ENDPOINT").is_some(),
			rate_limit_per_second,
			rate_limit_burst,
		})
	}
}

fn try_load<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError>
where
	T::Err: Display,
{
	match env::var(key) {
		Ok(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
			key,
			message: e.to_string(),
		}),
		Err(_) => Ok(default),
	}
}
