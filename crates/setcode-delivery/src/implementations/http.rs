//! HTTP JSON-RPC transport.
//!
//! Thin JSON-RPC 2.0 client over reqwest. Node-side errors come back
//! as [`DeliveryError::Rpc`] with the node's code and message intact.

use crate::{DeliveryError, RpcTransport};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// JSON-RPC transport over HTTP.
pub struct HttpTransport {
	client: reqwest::Client,
	url: String,
	next_id: AtomicU64,
}

impl HttpTransport {
	/// Creates a transport for the given RPC endpoint URL.
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			client: reqwest::Client::new(),
			url: url.into(),
			next_id: AtomicU64::new(1),
		}
	}
}

#[async_trait]
impl RpcTransport for HttpTransport {
	async fn request(&self, method: &str, params: Value) -> Result<Value, DeliveryError> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let body = json!({
			"jsonrpc": "2.0",
			"id": id,
			"method": method,
			"params": params,
		});

		let response = self
			.client
			.post(&self.url)
			.json(&body)
			.send()
			.await
			.map_err(|e| DeliveryError::Network(format!("{method} request failed: {e}")))?;

		let payload: Value = response
			.json()
			.await
			.map_err(|e| DeliveryError::Network(format!("{method} response unreadable: {e}")))?;

		if let Some(error) = payload.get("error").filter(|e| !e.is_null()) {
			return Err(DeliveryError::Rpc {
				code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
				message: error
					.get("message")
					.and_then(Value::as_str)
					.unwrap_or("unknown error")
					.to_string(),
			});
		}

		payload.get("result").cloned().ok_or_else(|| {
			DeliveryError::InvalidResponse(format!(
				"{method} response has neither result nor error"
			))
		})
	}
}
