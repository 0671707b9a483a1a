//! Common types for the set-code transaction sender.
//!
//! This crate defines the shared data types used throughout the
//! workspace: signatures, receipts, fee data, and the secure string
//! wrapper used for private key material.

/// Transaction delivery types: receipts and fee data.
pub mod delivery;
/// Secure string type for private keys.
pub mod secret_string;
/// Hex string formatting helpers.
pub mod utils;

pub use delivery::{FeeData, TransactionReceipt};
pub use secret_string::SecretString;
pub use utils::{with_0x_prefix, without_0x_prefix};

use alloy_primitives::{Address, Bytes, U256};

/// A secp256k1 signature split into its recoverable components.
///
/// `y_parity` is the recovery-id bit used to recover the signer's
/// public key; `r` and `s` are the curve scalars. Both signing stages
/// (authorization tuple and outer transaction) produce this shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
	/// Recovery-id bit (false = 0, true = 1).
	pub y_parity: bool,
	/// The R scalar.
	pub r: U256,
	/// The S scalar.
	pub s: U256,
}

/// One batched sub-operation carried in the outer transaction's data.
///
/// Opaque to this workspace: ABI-encoding a list of calls into the
/// delegate contract's calldata is the caller's concern. The type is
/// provided so callers have a stable shape to encode from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
	/// Recipient of the sub-call.
	pub to: Address,
	/// Value in wei forwarded by the sub-call.
	pub value: U256,
	/// Calldata of the sub-call.
	pub data: Bytes,
}
