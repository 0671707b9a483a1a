//! EIP-7702 authorization tuples.
//!
//! An authorization is a capability grant: "this account's code is
//! delegate `address` at this `nonce`". The signed preimage is
//! `0x05 ++ RLP([chainId, address, nonce])`.

use crate::{TxError, AUTHORIZATION_MAGIC};
use alloy_primitives::{keccak256, Address, B256};
use setcode_account::Signer;
use setcode_rlp::Item;
use setcode_types::Signature;

/// An unsigned EIP-7702 authorization tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authorization {
	/// Chain the delegation is valid on.
	pub chain_id: u64,
	/// The delegate whose code the signer's account adopts. The zero
	/// address is a legitimate value meaning "clear any existing
	/// delegation".
	pub address: Address,
	/// Account nonce the authorization is validated against.
	pub nonce: u64,
}

impl Authorization {
	/// Creates an authorization tuple with an explicit nonce.
	pub fn new(chain_id: u64, address: Address, nonce: u64) -> Self {
		Self {
			chain_id,
			address,
			nonce,
		}
	}

	/// Builds the authorization a sender signs for its own set-code
	/// transaction.
	///
	/// The tuple nonce is `sender_nonce + 1`: the outer transaction
	/// consumes `sender_nonce` first, and the authorization is
	/// validated against the post-increment value. `sender_nonce` must
	/// be the same read that prices the outer transaction; a concurrent
	/// transaction from the account invalidates the derivation.
	pub fn self_sponsored(chain_id: u64, address: Address, sender_nonce: u64) -> Self {
		Self::new(chain_id, address, sender_nonce + 1)
	}

	pub(crate) fn rlp_items(&self) -> Vec<Item> {
		vec![
			Item::uint(self.chain_id),
			Item::address(&self.address),
			Item::uint(self.nonce),
		]
	}

	/// Returns the exact byte sequence that is hashed and signed:
	/// the magic `0x05` byte followed by the RLP 3-tuple.
	pub fn signing_payload(&self) -> Vec<u8> {
		let mut payload = vec![AUTHORIZATION_MAGIC];
		Item::list(self.rlp_items()).encode_into(&mut payload);
		payload
	}

	/// Returns the keccak256 digest of the signing payload.
	pub fn signature_hash(&self) -> B256 {
		keccak256(self.signing_payload())
	}

	/// Attaches an externally produced signature.
	pub fn into_signed(self, signature: Signature) -> SignedAuthorization {
		SignedAuthorization {
			inner: self,
			signature,
		}
	}

	/// Signs the authorization digest, consuming the tuple.
	pub fn sign(self, signer: &dyn Signer) -> Result<SignedAuthorization, TxError> {
		let signature = signer.sign_digest(&self.signature_hash())?;
		Ok(self.into_signed(signature))
	}
}

/// A signed authorization tuple, immutable once produced.
///
/// Consumed exactly once by the transaction that carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedAuthorization {
	inner: Authorization,
	signature: Signature,
}

impl SignedAuthorization {
	/// The signed tuple.
	pub fn authorization(&self) -> &Authorization {
		&self.inner
	}

	/// The signature over the tuple's digest.
	pub fn signature(&self) -> &Signature {
		&self.signature
	}

	/// Encodes the 6-tuple carried inside the transaction envelope:
	/// `[chainId, address, nonce, yParity, r, s]`. yParity and the
	/// signature scalars follow the canonical integer rule, so a
	/// parity of zero serializes as the empty string.
	pub(crate) fn rlp_item(&self) -> Item {
		let mut items = self.inner.rlp_items();
		items.push(Item::uint(self.signature.y_parity as u8));
		items.push(Item::uint(self.signature.r));
		items.push(Item::uint(self.signature.s));
		Item::list(items)
	}

	pub(crate) fn from_rlp(item: &Item) -> Result<Self, TxError> {
		let fields = item.as_list()?;
		if fields.len() != 6 {
			return Err(TxError::Decode(format!(
				"authorization tuple has {} fields, expected 6",
				fields.len()
			)));
		}
		let y_parity = match fields[3].as_u64()? {
			0 => false,
			1 => true,
			other => {
				return Err(TxError::Decode(format!(
					"authorization yParity is {other}, expected 0 or 1"
				)))
			}
		};
		Ok(SignedAuthorization {
			inner: Authorization {
				chain_id: fields[0].as_u64()?,
				address: fields[1].as_address()?,
				nonce: fields[2].as_u64()?,
			},
			signature: Signature {
				y_parity,
				r: fields[4].as_u256()?,
				s: fields[5].as_u256()?,
			},
		})
	}
}
