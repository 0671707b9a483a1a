//! Transaction delivery types.
//!
//! Types describing what comes back from the node after submission:
//! the inclusion receipt and the fee data used to price a transaction.

use alloy_primitives::B256;

/// Receipt confirming a transaction was included in a block.
///
/// The submitter only needs to distinguish "not yet found" from
/// "found"; everything beyond these three fields is left to the node.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the included transaction.
	pub hash: B256,
	/// The block number the transaction was included in.
	pub block_number: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
}

/// Fee values fetched from the node for an EIP-1559 style transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FeeData {
	/// Priority fee (tip) per gas, in wei.
	pub max_priority_fee_per_gas: u128,
	/// Maximum total fee per gas the sender is willing to pay, in wei.
	pub max_fee_per_gas: u128,
}
