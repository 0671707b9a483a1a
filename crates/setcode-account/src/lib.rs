//! Account management for the set-code transaction sender.
//!
//! This crate provides the signing seam the transaction builders
//! depend on: a small trait for producing recoverable secp256k1
//! signatures over 32-byte digests, plus a local private key
//! implementation. Hashing and curve arithmetic are treated as
//! external primitives; nothing here reimplements cryptography.

use alloy_primitives::{Address, B256};
use setcode_types::Signature;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

pub use implementations::local::LocalSigner;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// Error that occurs when signing operations fail.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// Error that occurs when a cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
}

/// Interface for accounts that can sign transaction digests.
///
/// Both signing stages (the EIP-7702 authorization tuple and the outer
/// type-0x04 transaction) hand a keccak256 digest to this trait and
/// receive the recoverable signature components back. Implementations
/// must be usable from async contexts, hence `Send + Sync`; signing
/// itself is synchronous because local key operations are.
pub trait Signer: Send + Sync {
	/// Returns the address associated with this account.
	fn address(&self) -> Address;

	/// Signs a 32-byte digest, returning `(yParity, r, s)`.
	///
	/// The signature nonce scheme is the implementation's choice; any
	/// valid ECDSA signature over the digest is acceptable.
	fn sign_digest(&self, digest: &B256) -> Result<Signature, AccountError>;
}
