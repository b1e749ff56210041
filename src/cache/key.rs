//! Deterministic request fingerprints used as cache keys.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Fingerprint of an endpoint plus its query parameters.
///
/// Parameters are sorted by name (then value) before hashing, so the same set in any order
/// maps to the same key. Each component is length-prefixed, so separator characters inside
/// names or values cannot make two distinct requests collide.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);
impl CacheKey {
	/// Builds the key for `endpoint` with `params`.
	pub fn new<I, K, V>(endpoint: &str, params: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let mut pairs = params
			.into_iter()
			.map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().to_owned()))
			.collect::<Vec<_>>();

		pairs.sort();

		let mut hasher = Sha256::new();

		absorb(&mut hasher, endpoint);

		for (name, value) in &pairs {
			absorb(&mut hasher, name);
			absorb(&mut hasher, value);
		}

		Self(STANDARD_NO_PAD.encode(hasher.finalize()))
	}

	/// Returns the encoded fingerprint.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Debug for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("CacheKey").field(&self.0).finish()
	}
}
impl Display for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn absorb(hasher: &mut Sha256, part: &str) {
	hasher.update((part.len() as u64).to_le_bytes());
	hasher.update(part.as_bytes());
}
