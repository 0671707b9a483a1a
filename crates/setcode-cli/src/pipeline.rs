//! The delegation pipeline: fetch, authorize, build, sign, submit,
//! poll.
//!
//! The near-identical scripts this tool replaces differed only in
//! their hard-coded delegate and network; here those are parameters
//! and the flow is written once.

use alloy_primitives::{Address, Bytes, U256};
use setcode_account::Signer;
use setcode_delivery::{DeliveryError, NodeClient, RpcTransport};
use setcode_tx::{Authorization, SetCodeTransaction, TransactionFields, TxError};
use setcode_types::TransactionReceipt;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the pipeline. Every stage fails fast; a failed
/// submission produces no partial output.
#[derive(Debug, Error)]
pub enum PipelineError {
	/// Building or signing the transaction failed.
	#[error(transparent)]
	Tx(#[from] TxError),
	/// A node interaction failed.
	#[error(transparent)]
	Delivery(#[from] DeliveryError),
}

/// Per-invocation transaction parameters.
#[derive(Debug, Clone)]
pub struct SubmitOptions {
	/// Gas limit for the outer transaction.
	pub gas_limit: u64,
	/// Value in wei attached to the outer transaction.
	pub value: U256,
	/// Calldata executed against the freshly delegated account
	/// (already ABI-encoded by the caller).
	pub data: Bytes,
	/// Spacing between receipt polls.
	pub poll_interval: Duration,
}

/// Runs the full set-code flow against the node and returns the
/// inclusion receipt.
///
/// Pass the zero address as `delegate` to clear an existing
/// delegation. The account nonce is read exactly once and both the
/// outer nonce and the authorization nonce (`nonce + 1`) derive from
/// that read; a concurrent transaction from the same account between
/// the read and submission invalidates the authorization, so callers
/// must serialize submissions per account.
pub async fn send_set_code<T: RpcTransport>(
	client: &NodeClient<T>,
	signer: &dyn Signer,
	delegate: Address,
	options: SubmitOptions,
) -> Result<TransactionReceipt, PipelineError> {
	let sender = signer.address();

	let chain_id = client.chain_id().await?;
	let nonce = client.transaction_count(sender).await?;
	let fees = client.fee_data().await?;

	tracing::info!(
		chain_id,
		nonce,
		auth_nonce = nonce + 1,
		delegate = %delegate,
		"Preparing set-code transaction"
	);

	let authorization = Authorization::self_sponsored(chain_id, delegate, nonce).sign(signer)?;

	let fields = TransactionFields {
		chain_id,
		nonce,
		max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
		max_fee_per_gas: fees.max_fee_per_gas,
		gas_limit: options.gas_limit,
		to: sender,
		value: options.value,
		data: options.data,
		access_list: Vec::new(),
	};

	let signed = SetCodeTransaction::build(fields, vec![authorization])?.sign(signer)?;
	let hash = client.send_raw_transaction(&signed.encode()).await?;

	let receipt = client.wait_for_inclusion(&hash, options.poll_interval).await?;
	Ok(receipt)
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use serde_json::{json, Value};
	use setcode_account::LocalSigner;
	use setcode_tx::SignedSetCodeTransaction;
	use setcode_types::{without_0x_prefix, SecretString};
	use std::collections::VecDeque;
	use std::sync::Mutex;

	const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	/// Stub node scripting one full pipeline run and recording every
	/// request it receives.
	struct StubNode {
		responses: Mutex<VecDeque<Value>>,
		requests: Mutex<Vec<(String, Value)>>,
	}

	impl StubNode {
		fn new(responses: Vec<Value>) -> Self {
			Self {
				responses: Mutex::new(responses.into()),
				requests: Mutex::new(Vec::new()),
			}
		}
	}

	#[async_trait]
	impl RpcTransport for &StubNode {
		async fn request(&self, method: &str, params: Value) -> Result<Value, DeliveryError> {
			self.requests
				.lock()
				.unwrap()
				.push((method.to_string(), params));
			Ok(self
				.responses
				.lock()
				.unwrap()
				.pop_front()
				.expect("stub ran out of scripted responses"))
		}
	}

	#[tokio::test]
	async fn full_pipeline_produces_a_well_formed_transaction() {
		let tx_hash = "0x2222222222222222222222222222222222222222222222222222222222222222";
		let node = StubNode::new(vec![
			json!("0xaa36a7"),   // chain id: 11155111
			json!("0x5"),        // sender nonce
			json!("0x3b9aca00"), // tip
			json!({ "baseFeePerGas": "0x77359400" }),
			json!(tx_hash),
			Value::Null, // first poll: not yet included
			json!({
				"transactionHash": tx_hash,
				"blockNumber": "0x20",
				"status": "0x1"
			}),
		]);
		let client = NodeClient::new(&node);
		let signer = LocalSigner::from_secret(&SecretString::from(TEST_KEY)).unwrap();
		let delegate: Address = "0xf19588Ce7eF802F26bf7a7d9d96444dD4Ed8DA59"
			.parse()
			.unwrap();

		let receipt = send_set_code(
			&client,
			&signer,
			delegate,
			SubmitOptions {
				gas_limit: 1_000_000,
				value: U256::ZERO,
				data: Bytes::new(),
				poll_interval: Duration::from_millis(5),
			},
		)
		.await
		.unwrap();

		assert_eq!(receipt.block_number, 0x20);
		assert!(receipt.success);

		// Nonce and fees are read before submission, and nothing is
		// sent before the envelope is complete.
		let requests = node.requests.lock().unwrap();
		let methods: Vec<&str> = requests.iter().map(|(m, _)| m.as_str()).collect();
		assert_eq!(
			methods,
			vec![
				"eth_chainId",
				"eth_getTransactionCount",
				"eth_maxPriorityFeePerGas",
				"eth_getBlockByNumber",
				"eth_sendRawTransaction",
				"eth_getTransactionReceipt",
				"eth_getTransactionReceipt",
			]
		);

		// Decode the broadcast bytes the stub received and check the
		// envelope against the scenario.
		let raw_hex = requests[4].1[0].as_str().unwrap().to_string();
		let raw = hex::decode(without_0x_prefix(&raw_hex)).unwrap();
		assert_eq!(raw[0], 0x04);

		let decoded = SignedSetCodeTransaction::decode(&raw).unwrap();
		let fields = decoded.transaction().fields();
		assert_eq!(fields.chain_id, 11155111);
		assert_eq!(fields.nonce, 5);
		assert_eq!(fields.to, signer.address());

		let auth = decoded.transaction().authorization_list()[0].authorization();
		assert_eq!(auth.nonce, 6);
		assert_eq!(auth.address, delegate);
		assert_eq!(auth.chain_id, 11155111);
	}

	#[tokio::test]
	async fn nothing_is_sent_when_fee_fetch_fails() {
		// Script ends after the block fetch; a missing base fee aborts
		// the run before any submission.
		let node = StubNode::new(vec![json!("0x1"), json!("0x0"), json!("0x0"), json!({})]);
		let client = NodeClient::new(&node);
		let signer = LocalSigner::from_secret(&SecretString::from(TEST_KEY)).unwrap();

		let result = send_set_code(
			&client,
			&signer,
			Address::ZERO,
			SubmitOptions {
				gas_limit: 1_000_000,
				value: U256::ZERO,
				data: Bytes::new(),
				poll_interval: Duration::from_millis(5),
			},
		)
		.await;

		assert!(matches!(result, Err(PipelineError::Delivery(_))));
		let methods: Vec<String> = node
			.requests
			.lock()
			.unwrap()
			.iter()
			.map(|(m, _)| m.clone())
			.collect();
		assert!(!methods.iter().any(|m| m == "eth_sendRawTransaction"));
	}
}
