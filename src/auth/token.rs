//! Access token records and the redacting secret wrapper.

// self
use crate::{_prelude::*, error::AuthError};

/// Redacted secret wrapper keeping credentials and tokens out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Bearer token issued by the token endpoint.
#[derive(Clone, Debug)]
pub struct AccessToken {
	/// Bearer secret sent with API calls.
	pub access_token: TokenSecret,
	/// Refresh secret, when the endpoint issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Instant the token was received.
	pub issued_at: OffsetDateTime,
	/// Instant the token stops being accepted.
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Returns `true` once `instant` reaches the expiry.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` when fewer than `window` remain before expiry at `instant`.
	pub fn should_refresh_at(&self, instant: OffsetDateTime, window: time::Duration) -> bool {
		self.is_expired_at(instant) || self.expires_at - instant <= window
	}

	/// Marks the token as expired so the next lookup renews it, keeping the refresh secret.
	pub fn expire(&mut self, instant: OffsetDateTime) {
		self.expires_at = self.expires_at.min(instant);
	}
}

/// Token endpoint payload after the optional `data` wrapper is removed.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
	/// Bearer secret.
	pub access_token: String,
	/// Refresh secret.
	#[serde(default)]
	pub refresh_token: Option<String>,
	/// Lifetime in seconds.
	pub expires_in: i64,
}
impl TokenResponse {
	/// Converts the payload into an [`AccessToken`] issued at `now`.
	///
	/// A response without a refresh token keeps `previous_refresh`, so a later refresh can still
	/// reuse it.
	pub fn into_token(
		self,
		now: OffsetDateTime,
		previous_refresh: Option<TokenSecret>,
	) -> Result<AccessToken, AuthError> {
		if self.expires_in <= 0 {
			return Err(AuthError::NonPositiveExpiresIn);
		}

		let expires_at = now
			.checked_add(time::Duration::seconds(self.expires_in))
			.ok_or(AuthError::NonPositiveExpiresIn)?;

		Ok(AccessToken {
			access_token: TokenSecret::new(self.access_token),
			refresh_token: self.refresh_token.map(TokenSecret::new).or(previous_refresh),
			issued_at: now,
			expires_at,
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn refresh_window_is_inclusive() {
		let now = OffsetDateTime::now_utc();
		let token = TokenResponse {
			access_token: "a".into(),
			refresh_token: None,
			expires_in: 3_600,
		}
		.into_token(now, Some(TokenSecret::new("old-refresh")))
		.expect("Positive lifetimes should convert.");
		let window = time::Duration::seconds(60);

		assert!(!token.should_refresh_at(now, window));
		assert!(token.should_refresh_at(now + time::Duration::seconds(3_540), window));
		assert!(token.is_expired_at(now + time::Duration::seconds(3_600)));
		assert_eq!(token.refresh_token.as_ref().map(TokenSecret::expose), Some("old-refresh"));
	}

	#[test]
	fn non_positive_lifetime_is_rejected() {
		let err = TokenResponse { access_token: "a".into(), refresh_token: None, expires_in: 0 }
			.into_token(OffsetDateTime::now_utc(), None)
			.expect_err("Zero lifetimes should fail.");

		assert!(matches!(err, AuthError::NonPositiveExpiresIn));
	}

	#[test]
	fn expire_keeps_refresh_secret() {
		let now = OffsetDateTime::now_utc();
		let mut token = TokenResponse {
			access_token: "a".into(),
			refresh_token: Some("r".into()),
			expires_in: 600,
		}
		.into_token(now, None)
		.expect("Positive lifetimes should convert.");

		token.expire(now);

		assert!(token.is_expired_at(now));
		assert!(token.refresh_token.is_some());
	}
}
