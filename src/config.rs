//! Client configuration: environments, credentials, limits, and compatibility mode.
//!
//! [`ClientConfig::builder`] validates everything up front so the rest of the client can
//! assume sane values. [`ClientConfigBuilder::from_env`] seeds a builder from the
//! `FUEL_FINDER_*` variables; anything set on the builder afterwards wins.

// std
use std::num::NonZeroUsize;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	rate_limit::RateLimitConfig,
};

/// Client ID variable.
pub const ENV_CLIENT_ID: &str = "FUEL_FINDER_CLIENT_ID";
/// Client secret variable.
pub const ENV_CLIENT_SECRET: &str = "FUEL_FINDER_CLIENT_SECRET";
/// Environment label variable (`production` or `test`).
pub const ENV_ENVIRONMENT: &str = "FUEL_FINDER_ENVIRONMENT";
/// Backward-compatibility switch (`1`, `true`, or `yes` enables legacy mode).
pub const ENV_BACKWARD_COMPATIBLE: &str = "UKFUELFINDER_BACKWARD_COMPATIBLE";

/// Fuel Finder deployment to talk to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
	/// Live service.
	#[default]
	Production,
	/// Integration sandbox with tighter limits.
	Test,
}
impl Environment {
	/// Returns a stable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Environment::Production => "production",
			Environment::Test => "test",
		}
	}

	/// API root for this deployment.
	pub const fn base_url(self) -> &'static str {
		match self {
			Environment::Production => "https://www.fuel-finder.service.gov.uk/api/v1",
			Environment::Test => "https://test.fuel-finder.service.gov.uk/api/v1",
		}
	}

	/// Published per-minute request ceiling.
	pub const fn requests_per_minute(self) -> u32 {
		match self {
			Environment::Production => 120,
			Environment::Test => 30,
		}
	}

	/// Published daily request ceiling.
	pub const fn daily_limit(self) -> u32 {
		match self {
			Environment::Production => 10_000,
			Environment::Test => 5_000,
		}
	}
}
impl Display for Environment {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Environment {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"production" | "prod" => Ok(Self::Production),
			"test" => Ok(Self::Test),
			_ => Err(ConfigError::UnknownEnvironment { value: s.to_owned() }),
		}
	}
}

/// How records are handed back to callers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatMode {
	/// Records are returned as-is.
	Current,
	/// Records are wrapped so the retired `success`/`message` accessors keep working, and
	/// missing batches surface as invalid batch numbers.
	#[default]
	Legacy,
}
impl CompatMode {
	/// Interprets an environment flag value; `1`, `true`, and `yes` select legacy mode.
	pub fn from_flag(value: &str) -> Self {
		match value.trim().to_ascii_lowercase().as_str() {
			"1" | "true" | "yes" => Self::Legacy,
			_ => Self::Current,
		}
	}

	/// Returns `true` for [`CompatMode::Legacy`].
	pub fn is_legacy(self) -> bool {
		matches!(self, Self::Legacy)
	}
}

/// Validated client settings.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: TokenSecret,
	/// Target deployment.
	pub environment: Environment,
	/// API root; defaults to the environment's URL.
	pub base_url: Url,
	/// Per-request timeout.
	pub timeout: Duration,
	/// Whether responses are cached.
	pub cache_enabled: bool,
	/// Optional bound on cached entries.
	pub cache_max_entries: Option<NonZeroUsize>,
	/// Admission and backoff settings.
	pub rate_limit: RateLimitConfig,
	/// Total attempts for a request that fails at the transport layer.
	pub max_retries: u32,
	/// Record presentation mode.
	pub compat: CompatMode,
}
impl ClientConfig {
	/// Returns a builder seeded with the provided credentials.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> ClientConfigBuilder {
		ClientConfigBuilder::new().client_id(client_id).client_secret(client_secret)
	}

	/// Loads the configuration from process environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		ClientConfigBuilder::from_env()?.build()
	}

	/// Token generation endpoint.
	pub fn token_url(&self) -> String {
		self.endpoint_url("/oauth/generate_access_token")
	}

	/// Token refresh endpoint.
	pub fn refresh_url(&self) -> String {
		self.endpoint_url("/oauth/regenerate_access_token")
	}

	/// Joins `path` onto [`ClientConfig::base_url`], keeping the base path intact.
	pub fn endpoint_url(&self, path: &str) -> String {
		format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path.trim_start_matches('/'))
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Clone, Debug, Default)]
pub struct ClientConfigBuilder {
	/// OAuth client identifier.
	pub client_id: Option<String>,
	/// OAuth client secret.
	pub client_secret: Option<String>,
	/// Target deployment; production when unset.
	pub environment: Option<Environment>,
	/// Raw API root override.
	pub base_url: Option<String>,
	/// Per-request timeout; 30 seconds when unset.
	pub timeout: Option<Duration>,
	/// Response caching switch; enabled when unset.
	pub cache_enabled: Option<bool>,
	/// Optional bound on cached entries.
	pub cache_max_entries: Option<NonZeroUsize>,
	/// Limiter override; the environment's published limits when unset.
	pub rate_limit: Option<RateLimitConfig>,
	/// Transport retry budget; 3 when unset.
	pub max_retries: Option<u32>,
	/// Presentation mode; legacy when unset.
	pub compat: Option<CompatMode>,
}
impl ClientConfigBuilder {
	const DEFAULT_MAX_RETRIES: u32 = 3;
	const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Seeds a builder from process environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_env_with(|name| std::env::var(name).ok())
	}

	/// Seeds a builder from `lookup`, which resolves variable names to values.
	pub fn from_env_with<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
		let mut builder = Self::new();

		builder.client_id = non_empty(ENV_CLIENT_ID);
		builder.client_secret = non_empty(ENV_CLIENT_SECRET);
		builder.environment = non_empty(ENV_ENVIRONMENT).map(|raw| raw.parse()).transpose()?;
		builder.compat = lookup(ENV_BACKWARD_COMPATIBLE).map(|raw| CompatMode::from_flag(&raw));

		Ok(builder)
	}

	/// Sets the client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
		self.client_secret = Some(client_secret.into());

		self
	}

	/// Selects the deployment.
	pub fn environment(mut self, environment: Environment) -> Self {
		self.environment = Some(environment);

		self
	}

	/// Overrides the API root (proxies, mock servers).
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());

		self
	}

	/// Overrides the per-request timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Enables or disables response caching.
	pub fn cache_enabled(mut self, enabled: bool) -> Self {
		self.cache_enabled = Some(enabled);

		self
	}

	/// Bounds the number of cached responses.
	pub fn cache_max_entries(mut self, max: NonZeroUsize) -> Self {
		self.cache_max_entries = Some(max);

		self
	}

	/// Overrides the limiter settings.
	pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
		self.rate_limit = Some(config);

		self
	}

	/// Overrides the transport retry budget.
	pub fn max_retries(mut self, attempts: u32) -> Self {
		self.max_retries = Some(attempts);

		self
	}

	/// Selects the presentation mode.
	pub fn compat(mut self, mode: CompatMode) -> Self {
		self.compat = Some(mode);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let client_id = self
			.client_id
			.filter(|id| !id.trim().is_empty())
			.ok_or(ConfigError::MissingCredentials { name: ENV_CLIENT_ID })?;
		let client_secret = self
			.client_secret
			.filter(|secret| !secret.trim().is_empty())
			.ok_or(ConfigError::MissingCredentials { name: ENV_CLIENT_SECRET })?;
		let environment = self.environment.unwrap_or_default();
		let raw_url = self.base_url.unwrap_or_else(|| environment.base_url().to_owned());
		let base_url = Url::parse(&raw_url)
			.map_err(|source| ConfigError::InvalidBaseUrl { url: raw_url.clone(), source })?;
		let timeout = self.timeout.unwrap_or(Self::DEFAULT_TIMEOUT);

		if timeout.is_zero() {
			return Err(ConfigError::NonPositiveTimeout);
		}

		let rate_limit =
			self.rate_limit.unwrap_or_else(|| RateLimitConfig::for_environment(environment));

		rate_limit.validate()?;

		let max_retries = self.max_retries.unwrap_or(Self::DEFAULT_MAX_RETRIES);

		if max_retries == 0 {
			return Err(ConfigError::InvalidRetryCount);
		}

		Ok(ClientConfig {
			client_id,
			client_secret: TokenSecret::new(client_secret),
			environment,
			base_url,
			timeout,
			cache_enabled: self.cache_enabled.unwrap_or(true),
			cache_max_entries: self.cache_max_entries,
			rate_limit,
			max_retries,
			compat: self.compat.unwrap_or_default(),
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars = vars
			.iter()
			.map(|(name, value)| (name.to_string(), value.to_string()))
			.collect::<HashMap<_, _>>();

		move |name| vars.get(name).cloned()
	}

	#[test]
	fn defaults_follow_environment() {
		let config = ClientConfig::builder("id", "secret")
			.environment(Environment::Test)
			.build()
			.expect("Config with credentials should build.");

		assert_eq!(config.base_url.as_str(), "https://test.fuel-finder.service.gov.uk/api/v1");
		assert_eq!(
			config.token_url(),
			"https://test.fuel-finder.service.gov.uk/api/v1/oauth/generate_access_token"
		);
		assert_eq!(
			config.refresh_url(),
			"https://test.fuel-finder.service.gov.uk/api/v1/oauth/regenerate_access_token"
		);
		assert_eq!(config.rate_limit.requests_per_window, 30);
		assert_eq!(config.timeout, Duration::from_secs(30));
		assert_eq!(config.max_retries, 3);
		assert!(config.cache_enabled);
		assert_eq!(config.compat, CompatMode::Legacy);
	}

	#[test]
	fn missing_credentials_are_reported() {
		let err = ClientConfigBuilder::new()
			.client_id("id")
			.build()
			.expect_err("Config without a secret should fail.");

		assert!(matches!(err, ConfigError::MissingCredentials { name: ENV_CLIENT_SECRET }));
	}

	#[test]
	fn invalid_values_are_rejected() {
		assert!(matches!(
			ClientConfig::builder("id", "secret").base_url("not a url").build(),
			Err(ConfigError::InvalidBaseUrl { .. })
		));
		assert!(matches!(
			ClientConfig::builder("id", "secret").timeout(Duration::ZERO).build(),
			Err(ConfigError::NonPositiveTimeout)
		));
		assert!(matches!(
			ClientConfig::builder("id", "secret").max_retries(0).build(),
			Err(ConfigError::InvalidRetryCount)
		));
		assert!(matches!(
			ClientConfig::builder("id", "secret").rate_limit(RateLimitConfig::per_minute(0)).build(),
			Err(ConfigError::InvalidRateLimit { .. })
		));
	}

	#[test]
	fn environment_variables_seed_builder() {
		let config = ClientConfigBuilder::from_env_with(lookup(&[
			(ENV_CLIENT_ID, "env-id"),
			(ENV_CLIENT_SECRET, "env-secret"),
			(ENV_ENVIRONMENT, "TEST"),
			(ENV_BACKWARD_COMPATIBLE, "false"),
		]))
		.expect("Environment should parse.")
		.client_id("explicit-id")
		.build()
		.expect("Seeded config should build.");

		assert_eq!(config.client_id, "explicit-id");
		assert_eq!(config.client_secret.expose(), "env-secret");
		assert_eq!(config.environment, Environment::Test);
		assert_eq!(config.compat, CompatMode::Current);
	}

	#[test]
	fn unknown_environment_is_rejected() {
		let err = ClientConfigBuilder::from_env_with(lookup(&[(ENV_ENVIRONMENT, "staging")]))
			.expect_err("Unknown environments should fail.");

		assert!(matches!(err, ConfigError::UnknownEnvironment { .. }));
	}

	#[test]
	fn compat_flag_values() {
		for raw in ["1", "true", "YES"] {
			assert_eq!(CompatMode::from_flag(raw), CompatMode::Legacy);
		}
		for raw in ["0", "false", "no", ""] {
			assert_eq!(CompatMode::from_flag(raw), CompatMode::Current);
		}
	}

	#[test]
	fn base_url_override_keeps_path() {
		let config = ClientConfig::builder("id", "secret")
			.base_url("http://127.0.0.1:8080/api/v1/")
			.build()
			.expect("Override should build.");

		assert_eq!(config.endpoint_url("/pfs"), "http://127.0.0.1:8080/api/v1/pfs");
	}
}
