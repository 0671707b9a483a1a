//! Local private key signer.
//!
//! Wraps an in-memory secp256k1 key parsed from configuration. Key
//! material only ever enters through [`SecretString`], so it stays out
//! of logs and debug output.

use crate::{AccountError, Signer};
use alloy_primitives::{Address, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use setcode_types::{SecretString, Signature};

/// Signer backed by a locally held private key.
pub struct LocalSigner {
	inner: PrivateKeySigner,
}

impl LocalSigner {
	/// Parses a hex-encoded private key (with or without `0x` prefix)
	/// into a signer.
	pub fn from_secret(key: &SecretString) -> Result<Self, AccountError> {
		if key.is_empty() {
			return Err(AccountError::InvalidKey("private key is empty".to_string()));
		}
		let inner = key
			.with_exposed(|k| k.parse::<PrivateKeySigner>())
			.map_err(|_| AccountError::InvalidKey("invalid private key format".to_string()))?;
		Ok(Self { inner })
	}
}

impl Signer for LocalSigner {
	fn address(&self) -> Address {
		self.inner.address()
	}

	fn sign_digest(&self, digest: &B256) -> Result<Signature, AccountError> {
		let sig = self
			.inner
			.sign_hash_sync(digest)
			.map_err(|e| AccountError::SigningFailed(e.to_string()))?;

		Ok(Signature {
			y_parity: sig.v(),
			r: sig.r(),
			s: sig.s(),
		})
	}
}
