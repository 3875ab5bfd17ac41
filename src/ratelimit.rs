use std::{sync::Arc, time::Duration};

use axum::{
	body::Body,
	response::{IntoResponse, Response},
};
use governor::{
	clock::QuantaInstant,
	middleware::{RateLimitingMiddleware, StateInformationMiddleware},
};
use tower_governor::{
	governor::{GovernorConfig, GovernorConfigBuilder},
	key_extractor::{KeyExtractor, PeerIpKeyExtractor},
	GovernorError,
};

use crate::{config::Config, error::AppError};

pub type Limit = Arc<GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>>;

/// Per-IP request limits applied by the served binary.
pub struct Limits {
	/// Applied to every route.
	pub default: Limit,
	/// Applied to the authentication routes, which hash passwords.
	pub secure: Limit,
}

impl Limits {
	pub fn new(config: &Config) -> Option<Self> {
		let default = GovernorConfigBuilder::default()
			.per_second(config.rate_limit_per_second)
			.burst_size(config.rate_limit_burst)
			.use_headers()
			.error_handler(error_handler)
			.finish()?;

		let secure = GovernorConfigBuilder::default()
			.per_second(1)
			.use_headers()
			.error_handler(error_handler)
			.finish()?;

		Some(Self {
			default: Arc::new(default),
			secure: Arc::new(secure),
		})
	}
}

impl From<GovernorError> for AppError {
	fn from(error: GovernorError) -> Self {
		match error {
			GovernorError::TooManyRequests { wait_time, .. } => Self::RateLimited { wait_time },
			error => Self::RateLimiter(format!("{error:?}")),
		}
	}
}

fn error_handler(error: GovernorError) -> Response<Body> {
	AppError::from(error).into_response()
}

/// Periodically drops the state of clients that have not made requests recently.
pub fn cleanup_old_limits<T, M>(configs: &[&Arc<GovernorConfig<T, M>>])
where
	T: KeyExtractor,
	<T as KeyExtractor>::Key: Send + Sync + 'static,
	M: RateLimitingMiddleware<QuantaInstant> + Send + Sync + 'static,
{
	let limiters = configs
		.iter()
		.map(|config| config.limiter().clone())
		.collect::<Vec<_>>();
	let interval = Duration::from_secs(60);

	std::thread::spawn(move || loop {
		std::thread::sleep(interval);

		for limiter in &limiters {
			tracing::debug!("rate limiting storage size: {}", limiter.len());

			limiter.retain_recent();
		}
	});
}

#[cfg(test)]
mod test {
	use axum::http::StatusCode;

	use super::*;

	#[test]
	fn test_limits_from_default_config() {
		assert!(Limits::new(&Config::default()).is_some());
	}

	#[test]
	fn test_zero_rate_is_rejected() {
		let config = Config {
			rate_limit_per_second: 0,
			..Config::default()
		};

		assert!(Limits::new(&config).is_none());
	}

	#[test]
	fn test_too_many_requests() {
		let error = AppError::from(GovernorError::TooManyRequests {
			wait_time: 3,
			headers: None,
		});

		assert_eq!(error.status(), StatusCode::TOO_MANY_REQUESTS);
	}
}
