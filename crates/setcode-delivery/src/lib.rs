//! Transaction delivery for the set-code sender.
//!
//! This crate handles everything that talks to the JSON-RPC node: the
//! reads that feed transaction construction (chain id, nonce, fee
//! data, account code), raw transaction submission, and the receipt
//! poll loop. The transport is a trait so the submit-and-confirm
//! protocol can be exercised against a stub node in tests.

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use serde_json::{json, Value};
use setcode_types::{with_0x_prefix, FeeData, TransactionReceipt};
use std::time::Duration;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod http;
}

pub use implementations::http::HttpTransport;

/// Errors that can occur during delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// The node rejected a call. Surfaced with the node's message and
	/// never retried automatically: retrying a rejected transaction
	/// without correcting the offending field repeats the failure.
	#[error("RPC error {code}: {message}")]
	Rpc {
		/// JSON-RPC error code.
		code: i64,
		/// The node's error message.
		message: String,
	},
	/// The node answered with something this client cannot interpret.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
}

/// Generic JSON-RPC request primitive.
///
/// The node client is written against this seam; production uses the
/// HTTP implementation and tests substitute a scripted stub.
#[async_trait]
pub trait RpcTransport: Send + Sync {
	/// Performs one request and returns the `result` value.
	async fn request(&self, method: &str, params: Value) -> Result<Value, DeliveryError>;
}

/// Client for the node operations the pipeline needs.
pub struct NodeClient<T> {
	transport: T,
}

impl<T: RpcTransport> NodeClient<T> {
	/// Creates a client over the given transport.
	pub fn new(transport: T) -> Self {
		Self { transport }
	}

	/// Returns the node's chain id.
	pub async fn chain_id(&self) -> Result<u64, DeliveryError> {
		let result = self.transport.request("eth_chainId", json!([])).await?;
		quantity_u64(&result)
	}

	/// Returns the account's current nonce.
	pub async fn transaction_count(&self, address: Address) -> Result<u64, DeliveryError> {
		let result = self
			.transport
			.request(
				"eth_getTransactionCount",
				json!([format_address(&address), "latest"]),
			)
			.await?;
		quantity_u64(&result)
	}

	/// Fetches fee data for an EIP-1559 style transaction: the node's
	/// suggested tip, and a max fee of twice the latest base fee plus
	/// that tip.
	pub async fn fee_data(&self) -> Result<FeeData, DeliveryError> {
		let tip = self
			.transport
			.request("eth_maxPriorityFeePerGas", json!([]))
			.await?;
		let max_priority_fee_per_gas = quantity_u128(&tip)?;

		let block = self
			.transport
			.request("eth_getBlockByNumber", json!(["latest", false]))
			.await?;
		let base_fee = block
			.get("baseFeePerGas")
			.filter(|v| !v.is_null())
			.ok_or_else(|| {
				DeliveryError::InvalidResponse(
					"latest block has no baseFeePerGas; node is not EIP-1559 capable".to_string(),
				)
			})?;
		let base_fee = quantity_u128(base_fee)?;

		Ok(FeeData {
			max_priority_fee_per_gas,
			max_fee_per_gas: base_fee * 2 + max_priority_fee_per_gas,
		})
	}

	/// Returns the code currently stored at an account. After a
	/// successful delegation this is the `0xef0100 ++ address`
	/// designator; after a clearing transaction it is empty.
	pub async fn code_at(&self, address: Address) -> Result<Bytes, DeliveryError> {
		let result = self
			.transport
			.request("eth_getCode", json!([format_address(&address), "latest"]))
			.await?;
		let code = hex::decode(without_prefix(quantity_str(&result)?))
			.map_err(|e| DeliveryError::InvalidResponse(format!("invalid code hex: {e}")))?;
		Ok(Bytes::from(code))
	}

	/// Broadcasts a raw signed transaction and returns its hash.
	pub async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, DeliveryError> {
		let raw_hex = with_0x_prefix(&hex::encode(raw));
		let result = self
			.transport
			.request("eth_sendRawTransaction", json!([raw_hex]))
			.await?;
		let hash = parse_hash(&result)?;
		tracing::info!(tx_hash = %format_hash(&hash), "Submitted raw transaction");
		Ok(hash)
	}

	/// Fetches the receipt for a transaction, or `None` if it has not
	/// been included yet. Absence is a normal intermediate state, not
	/// an error.
	pub async fn transaction_receipt(
		&self,
		hash: &B256,
	) -> Result<Option<TransactionReceipt>, DeliveryError> {
		let result = self
			.transport
			.request("eth_getTransactionReceipt", json!([format_hash(hash)]))
			.await?;
		if result.is_null() {
			return Ok(None);
		}

		let tx_hash = result
			.get("transactionHash")
			.map(parse_hash)
			.transpose()?
			.ok_or_else(|| {
				DeliveryError::InvalidResponse("receipt has no transactionHash".to_string())
			})?;
		let block_number = result
			.get("blockNumber")
			.map(quantity_u64)
			.transpose()?
			.ok_or_else(|| {
				DeliveryError::InvalidResponse("receipt has no blockNumber".to_string())
			})?;
		let success = result.get("status").and_then(Value::as_str) == Some("0x1");

		Ok(Some(TransactionReceipt {
			hash: tx_hash,
			block_number,
			success,
		}))
	}

	/// Polls for a receipt at a fixed interval until one appears.
	///
	/// There is no internal timeout: callers needing bounded waiting
	/// wrap this future in their own deadline or cancellation. Each
	/// poll is spaced by `poll_interval` to avoid overloading the node.
	pub async fn wait_for_inclusion(
		&self,
		hash: &B256,
		poll_interval: Duration,
	) -> Result<TransactionReceipt, DeliveryError> {
		loop {
			if let Some(receipt) = self.transaction_receipt(hash).await? {
				tracing::info!(
					tx_hash = %format_hash(hash),
					block = receipt.block_number,
					success = receipt.success,
					"Transaction included"
				);
				return Ok(receipt);
			}
			tracing::debug!(tx_hash = %format_hash(hash), "Not yet included, waiting");
			tokio::time::sleep(poll_interval).await;
		}
	}
}

fn format_address(address: &Address) -> String {
	with_0x_prefix(&hex::encode(address.as_slice()))
}

fn format_hash(hash: &B256) -> String {
	with_0x_prefix(&hex::encode(hash.as_slice()))
}

fn without_prefix(s: &str) -> &str {
	setcode_types::without_0x_prefix(s)
}

fn quantity_str(value: &Value) -> Result<&str, DeliveryError> {
	value
		.as_str()
		.ok_or_else(|| DeliveryError::InvalidResponse(format!("expected a hex string, got {value}")))
}

fn quantity_u64(value: &Value) -> Result<u64, DeliveryError> {
	let s = quantity_str(value)?;
	let digits = without_prefix(s);
	// Some nodes answer a zero quantity as bare "0x".
	if digits.is_empty() {
		return Ok(0);
	}
	u64::from_str_radix(digits, 16)
		.map_err(|e| DeliveryError::InvalidResponse(format!("invalid quantity {s}: {e}")))
}

fn quantity_u128(value: &Value) -> Result<u128, DeliveryError> {
	let s = quantity_str(value)?;
	let digits = without_prefix(s);
	if digits.is_empty() {
		return Ok(0);
	}
	u128::from_str_radix(digits, 16)
		.map_err(|e| DeliveryError::InvalidResponse(format!("invalid quantity {s}: {e}")))
}

fn parse_hash(value: &Value) -> Result<B256, DeliveryError> {
	let s = quantity_str(value)?;
	let bytes = hex::decode(without_prefix(s))
		.map_err(|e| DeliveryError::InvalidResponse(format!("invalid hash hex {s}: {e}")))?;
	if bytes.len() != 32 {
		return Err(DeliveryError::InvalidResponse(format!(
			"hash is {} bytes, expected 32",
			bytes.len()
		)));
	}
	Ok(B256::from_slice(&bytes))
}
