//! Type-0x04 set-code transaction envelope.
//!
//! The envelope is a fixed 10-field list; field order and presence are
//! dictated by the transaction type and reordering or omission produces
//! an invalid transaction. Signing hashes `0x04 ++ RLP([10 fields])`;
//! the broadcast bytes are `0x04 ++ RLP([10 fields ++ yParity, r, s])`.

use crate::{SignedAuthorization, TxError, SET_CODE_TX_TYPE};
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use setcode_account::Signer;
use setcode_rlp::{decode, Item};
use setcode_types::Signature;

/// One access list entry. The pipeline always sends an empty access
/// list, but the envelope slot is structural and is encoded correctly
/// when populated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessListItem {
	/// Account to pre-warm.
	pub address: Address,
	/// Storage slots to pre-warm.
	pub storage_keys: Vec<B256>,
}

/// The non-authorization fields of a set-code transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionFields {
	/// Chain the transaction is valid on.
	pub chain_id: u64,
	/// Sender account nonce consumed by this transaction.
	pub nonce: u64,
	/// Priority fee (tip) per gas, in wei.
	pub max_priority_fee_per_gas: u128,
	/// Maximum total fee per gas, in wei.
	pub max_fee_per_gas: u128,
	/// Gas limit.
	pub gas_limit: u64,
	/// Destination. A set-code transaction always has one; for the
	/// delegation pipeline this is the sender itself.
	pub to: Address,
	/// Value in wei.
	pub value: U256,
	/// Calldata executed against the (freshly delegated) account.
	pub data: Bytes,
	/// Access list; empty in this system's pipeline.
	pub access_list: Vec<AccessListItem>,
}

/// An unsigned set-code transaction: the 10-field envelope with a
/// non-empty authorization list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCodeTransaction {
	fields: TransactionFields,
	authorization_list: Vec<SignedAuthorization>,
}

impl SetCodeTransaction {
	/// Assembles the envelope. Pure assembly, no I/O.
	///
	/// Rejects an empty authorization list before anything is hashed,
	/// signed, or sent: the schema permits it but this system's whole
	/// purpose is to carry at least one delegation.
	pub fn build(
		fields: TransactionFields,
		authorization_list: Vec<SignedAuthorization>,
	) -> Result<Self, TxError> {
		if authorization_list.is_empty() {
			return Err(TxError::EmptyAuthorizationList);
		}
		Ok(Self {
			fields,
			authorization_list,
		})
	}

	/// The envelope fields.
	pub fn fields(&self) -> &TransactionFields {
		&self.fields
	}

	/// The carried authorizations.
	pub fn authorization_list(&self) -> &[SignedAuthorization] {
		&self.authorization_list
	}

	fn unsigned_rlp_items(&self) -> Vec<Item> {
		let f = &self.fields;
		vec![
			Item::uint(f.chain_id),
			Item::uint(f.nonce),
			Item::uint(f.max_priority_fee_per_gas),
			Item::uint(f.max_fee_per_gas),
			Item::uint(f.gas_limit),
			Item::address(&f.to),
			Item::uint(f.value),
			Item::bytes(f.data.to_vec()),
			Item::list(
				f.access_list
					.iter()
					.map(|entry| {
						Item::list(vec![
							Item::address(&entry.address),
							Item::list(
								entry
									.storage_keys
									.iter()
									.map(|key| Item::bytes(key.to_vec()))
									.collect(),
							),
						])
					})
					.collect(),
			),
			Item::list(
				self.authorization_list
					.iter()
					.map(SignedAuthorization::rlp_item)
					.collect(),
			),
		]
	}

	/// Returns the signing preimage: `0x04 ++ RLP([10 fields])`.
	pub fn encode_unsigned(&self) -> Vec<u8> {
		let mut out = vec![SET_CODE_TX_TYPE];
		Item::list(self.unsigned_rlp_items()).encode_into(&mut out);
		out
	}

	/// Returns the keccak256 digest of the signing preimage.
	pub fn signature_hash(&self) -> B256 {
		keccak256(self.encode_unsigned())
	}

	/// Attaches an externally produced outer signature.
	pub fn into_signed(self, signature: Signature) -> SignedSetCodeTransaction {
		SignedSetCodeTransaction {
			tx: self,
			signature,
		}
	}

	/// Signs the transaction digest with the sender's key, consuming
	/// the unsigned envelope.
	pub fn sign(self, signer: &dyn Signer) -> Result<SignedSetCodeTransaction, TxError> {
		let signature = signer.sign_digest(&self.signature_hash())?;
		Ok(self.into_signed(signature))
	}
}

/// A signed set-code transaction. Terminal artifact: [`Self::encode`]
/// is exactly the byte sequence broadcast to the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedSetCodeTransaction {
	tx: SetCodeTransaction,
	signature: Signature,
}

impl SignedSetCodeTransaction {
	/// The signed envelope.
	pub fn transaction(&self) -> &SetCodeTransaction {
		&self.tx
	}

	/// The outer signature.
	pub fn signature(&self) -> &Signature {
		&self.signature
	}

	/// Encodes the broadcast bytes: `0x04 ++ RLP([10 fields ++ yParity,
	/// r, s])`. The outer signature follows the same canonical integer
	/// rule as authorization signatures.
	pub fn encode(&self) -> Vec<u8> {
		let mut items = self.tx.unsigned_rlp_items();
		items.push(Item::uint(self.signature.y_parity as u8));
		items.push(Item::uint(self.signature.r));
		items.push(Item::uint(self.signature.s));

		let mut out = vec![SET_CODE_TX_TYPE];
		Item::list(items).encode_into(&mut out);
		out
	}

	/// The transaction hash the node will report: keccak256 of the
	/// broadcast bytes.
	pub fn hash(&self) -> B256 {
		keccak256(self.encode())
	}

	/// Decodes broadcast bytes back into the envelope and signature.
	///
	/// Accepts only the canonical encoding; used to verify that signing
	/// and encoding round-trip exactly.
	pub fn decode(raw: &[u8]) -> Result<Self, TxError> {
		match raw.first() {
			Some(&SET_CODE_TX_TYPE) => {}
			Some(other) => {
				return Err(TxError::Decode(format!(
					"type byte is {other:#04x}, expected 0x04"
				)))
			}
			None => return Err(TxError::Decode("empty input".to_string())),
		}

		let top = decode(&raw[1..])?;
		let items = top.as_list()?;
		if items.len() != 13 {
			return Err(TxError::Decode(format!(
				"signed envelope has {} items, expected 13",
				items.len()
			)));
		}

		let access_list = items[8]
			.as_list()?
			.iter()
			.map(|entry| {
				let parts = entry.as_list()?;
				if parts.len() != 2 {
					return Err(TxError::Decode(
						"access list entry is not a 2-tuple".to_string(),
					));
				}
				let storage_keys = parts[1]
					.as_list()?
					.iter()
					.map(|key| {
						let bytes = key.as_bytes()?;
						if bytes.len() != 32 {
							return Err(TxError::Decode(
								"storage key is not 32 bytes".to_string(),
							));
						}
						Ok(B256::from_slice(bytes))
					})
					.collect::<Result<Vec<_>, TxError>>()?;
				Ok(AccessListItem {
					address: parts[0].as_address()?,
					storage_keys,
				})
			})
			.collect::<Result<Vec<_>, TxError>>()?;

		let authorization_list = items[9]
			.as_list()?
			.iter()
			.map(SignedAuthorization::from_rlp)
			.collect::<Result<Vec<_>, TxError>>()?;

		let fields = TransactionFields {
			chain_id: items[0].as_u64()?,
			nonce: items[1].as_u64()?,
			max_priority_fee_per_gas: items[2].as_u128()?,
			max_fee_per_gas: items[3].as_u128()?,
			gas_limit: items[4].as_u64()?,
			to: items[5].as_address()?,
			value: items[6].as_u256()?,
			data: Bytes::copy_from_slice(items[7].as_bytes()?),
			access_list,
		};

		let y_parity = match items[10].as_u64()? {
			0 => false,
			1 => true,
			other => {
				return Err(TxError::Decode(format!(
					"outer yParity is {other}, expected 0 or 1"
				)))
			}
		};
		let signature = Signature {
			y_parity,
			r: items[11].as_u256()?,
			s: items[12].as_u256()?,
		};

		let tx = SetCodeTransaction::build(fields, authorization_list)?;
		Ok(tx.into_signed(signature))
	}
}
