//! EIP-7702 set-code transaction construction and signing.
//!
//! Two signing stages live here. The authorization stage produces a
//! signed `(chainId, address, nonce)` tuple over the `0x05`-prefixed
//! digest; the transaction stage assembles the type-0x04 envelope
//! around one or more of those tuples and signs the `0x04`-prefixed
//! digest. Each stage consumes its input and produces an immutable
//! result, so a signed artifact can never drift from the bytes that
//! were hashed.

use setcode_account::AccountError;
use thiserror::Error;

/// EIP-7702 authorization tuple building and signing.
pub mod authorization;
/// Type-0x04 transaction envelope assembly, signing, and decoding.
pub mod transaction;

pub use authorization::{Authorization, SignedAuthorization};
pub use transaction::{
	AccessListItem, SetCodeTransaction, SignedSetCodeTransaction, TransactionFields,
};

/// Transaction type byte for EIP-7702 set-code transactions.
pub const SET_CODE_TX_TYPE: u8 = 0x04;

/// Domain-separator byte prepended to the authorization preimage.
pub const AUTHORIZATION_MAGIC: u8 = 0x05;

/// Errors that can occur while building, signing, or decoding a
/// set-code transaction.
#[derive(Debug, Error)]
pub enum TxError {
	/// A set-code transaction with zero authorizations is well-formed
	/// by the schema but degenerate: its whole purpose is to carry a
	/// delegation. Rejected before any signing or network call.
	#[error("a set-code transaction must carry at least one authorization")]
	EmptyAuthorizationList,
	/// RLP-level failure while decoding.
	#[error("rlp error: {0}")]
	Rlp(#[from] setcode_rlp::Error),
	/// The underlying signer failed.
	#[error("signing error: {0}")]
	Signing(#[from] AccountError),
	/// A raw transaction did not match the type-0x04 layout.
	#[error("invalid raw transaction: {0}")]
	Decode(String),
}
