//! OAuth2 client-credentials authentication against the Fuel Finder token endpoints.
//!
//! [`Authenticator::access_token`] hands out the cached bearer token while more than the
//! preemptive window (60 seconds by default) remains. Otherwise it renews the token: the
//! refresh endpoint is tried first when a refresh secret is held, and a fresh
//! client-credentials exchange is the fallback. A singleflight guard makes concurrent callers
//! share one in-flight exchange instead of stampeding the token endpoint.

pub mod token;

pub use token::*;

// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	error::{AuthError, TransportError},
	http,
	obs::{self, ApiSpan, Operation, Outcome},
};

#[derive(Serialize)]
struct GenerateRequest<'a> {
	client_id: &'a str,
	client_secret: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
	client_id: &'a str,
	refresh_token: &'a str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Exchange {
	Generate,
	Refresh,
}

/// Token manager shared by every API call of a client.
pub struct Authenticator {
	http: ReqwestClient,
	client_id: String,
	client_secret: TokenSecret,
	token_url: String,
	refresh_url: String,
	preemptive_window: time::Duration,
	state: RwLock<Option<AccessToken>>,
	singleflight: AsyncMutex<()>,
}
impl Authenticator {
	const DEFAULT_PREEMPTIVE_WINDOW: time::Duration = time::Duration::seconds(60);

	/// Creates an authenticator for the endpoints and credentials in `config`.
	pub fn new(config: &ClientConfig, http: ReqwestClient) -> Self {
		Self {
			http,
			client_id: config.client_id.clone(),
			client_secret: config.client_secret.clone(),
			token_url: config.token_url(),
			refresh_url: config.refresh_url(),
			preemptive_window: Self::DEFAULT_PREEMPTIVE_WINDOW,
			state: RwLock::new(None),
			singleflight: AsyncMutex::new(()),
		}
	}

	/// Overrides how long before expiry a token is renewed (defaults to 60 seconds).
	pub fn with_preemptive_window(mut self, window: Duration) -> Self {
		self.preemptive_window =
			time::Duration::try_from(window).unwrap_or(Self::DEFAULT_PREEMPTIVE_WINDOW);

		self
	}

	/// Returns a bearer token that stays valid beyond the preemptive window.
	pub async fn access_token(&self) -> Result<TokenSecret> {
		if let Some(token) = self.fresh_token() {
			return Ok(token);
		}

		let span = ApiSpan::new(Operation::Token, "access_token");

		span.instrument(async {
			let _singleflight = self.singleflight.lock().await;

			// Another caller may have renewed the token while this one waited.
			if let Some(token) = self.fresh_token() {
				return Ok(token);
			}

			obs::record_operation_outcome(Operation::Token, Outcome::Attempt);

			let result = self.renew().await;

			match &result {
				Ok(_) => obs::record_operation_outcome(Operation::Token, Outcome::Success),
				Err(_) => obs::record_operation_outcome(Operation::Token, Outcome::Failure),
			}

			let record = result?;
			let secret = record.access_token.clone();

			*self.state.write() = Some(record);

			Ok::<_, Error>(secret)
		})
		.await
	}

	/// Marks the cached access token as stale, e.g. after the API rejected it.
	///
	/// The refresh secret is kept so the next renewal can still use it.
	pub fn invalidate(&self) {
		if let Some(token) = self.state.write().as_mut() {
			token.expire(OffsetDateTime::now_utc());
		}
	}

	/// Returns a copy of the cached token record, if any.
	pub fn current(&self) -> Option<AccessToken> {
		self.state.read().clone()
	}

	fn fresh_token(&self) -> Option<TokenSecret> {
		let now = OffsetDateTime::now_utc();

		self.state
			.read()
			.as_ref()
			.filter(|token| !token.should_refresh_at(now, self.preemptive_window))
			.map(|token| token.access_token.clone())
	}

	async fn renew(&self) -> Result<AccessToken> {
		let previous_refresh =
			self.state.read().as_ref().and_then(|token| token.refresh_token.clone());

		if let Some(refresh) = previous_refresh {
			let body = RefreshRequest { client_id: &self.client_id, refresh_token: refresh.expose() };

			match self
				.exchange(Exchange::Refresh, &self.refresh_url, &body, Some(refresh.clone()))
				.await
			{
				Ok(record) => return Ok(record),
				Err(e) => obs::token_refresh_fallback(&e),
			}
		}

		let body = GenerateRequest {
			client_id: &self.client_id,
			client_secret: self.client_secret.expose(),
		};

		self.exchange(Exchange::Generate, &self.token_url, &body, None).await
	}

	async fn exchange<B>(
		&self,
		kind: Exchange,
		url: &str,
		body: &B,
		previous_refresh: Option<TokenSecret>,
	) -> Result<AccessToken>
	where
		B: Serialize,
	{
		let response = self
			.http
			.post(url)
			.header(reqwest::header::ACCEPT, "application/json")
			.json(body)
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status().as_u16();
		let bytes = response.bytes().await.map_err(TransportError::from)?;

		if !(200..300).contains(&status) {
			return Err(match (kind, status) {
				(Exchange::Generate, 401) => AuthError::InvalidCredentials,
				(Exchange::Refresh, 400 | 401) => AuthError::RefreshRejected { status },
				_ => AuthError::TokenEndpoint { status, message: http::body_summary(&bytes) },
			}
			.into());
		}

		let payload = http::decode_json(&bytes)
			.map(http::unwrap_envelope)
			.map_err(|source| AuthError::TokenResponseParse { source })?;
		let response: TokenResponse = serde_path_to_error::deserialize(payload)
			.map_err(|source| AuthError::TokenResponseParse { source })?;

		response.into_token(OffsetDateTime::now_utc(), previous_refresh).map_err(Error::from)
	}
}
impl Debug for Authenticator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator")
			.field("client_id", &self.client_id)
			.field("token_url", &self.token_url)
			.field("has_token", &self.state.read().is_some())
			.finish()
	}
}
