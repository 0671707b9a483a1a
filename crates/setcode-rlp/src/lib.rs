//! Canonical RLP encoding and decoding.
//!
//! This crate implements the Recursive Length Prefix serialization used
//! by Ethereum wire formats, as a tree of byte strings and lists. The
//! rules that matter for transaction encoding are enforced throughout:
//!
//! - unsigned integers encode as their minimal big-endian byte string
//!   with no leading zero byte; the integer zero encodes as the empty
//!   byte string (header `0x80`), never as `0x00`
//! - addresses are fixed 20-byte strings and are never shortened
//! - the decoder rejects non-canonical input (padded lengths, single
//!   bytes wrapped in a header, trailing data), so a decoded tree
//!   re-encodes to exactly the input bytes

use alloy_primitives::{ruint::UintTryFrom, Address, U256};
use thiserror::Error;

/// Errors produced while decoding RLP or reading typed values out of a
/// decoded tree. Encoding itself cannot fail: inputs are unsigned and
/// no realistic payload exceeds the 8-byte length-prefix capacity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
	/// Input ended before the announced payload length.
	#[error("input ended before the announced payload length")]
	UnexpectedEnd,
	/// The input is valid RLP structurally but not the unique canonical
	/// encoding of its content.
	#[error("non-canonical encoding: {0}")]
	NonCanonical(&'static str),
	/// Bytes remained after the top-level item was decoded.
	#[error("trailing bytes after the decoded item")]
	TrailingBytes,
	/// A byte string was expected but a list was found.
	#[error("expected a byte string, found a list")]
	ExpectedBytes,
	/// A list was expected but a byte string was found.
	#[error("expected a list, found a byte string")]
	ExpectedList,
	/// An integer field carried a leading zero byte.
	#[error("integer has a leading zero byte")]
	LeadingZeroInteger,
	/// An integer field does not fit the requested width.
	#[error("integer does not fit the requested width")]
	IntegerOverflow,
	/// A fixed-width byte string had the wrong length.
	#[error("expected a {expected}-byte string, found {actual} bytes")]
	InvalidLength {
		/// The required length.
		expected: usize,
		/// The length actually found.
		actual: usize,
	},
}

/// A single RLP value: either a byte string or a list of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
	/// An opaque byte string.
	Bytes(Vec<u8>),
	/// An ordered list of nested items.
	List(Vec<Item>),
}

impl Item {
	/// Creates a byte-string item from raw bytes.
	pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
		Item::Bytes(data.into())
	}

	/// Creates a list item.
	pub fn list(items: Vec<Item>) -> Self {
		Item::List(items)
	}

	/// Creates a byte-string item from an unsigned integer using the
	/// canonical rule: minimal big-endian bytes, zero as the empty
	/// string.
	pub fn uint<T>(value: T) -> Self
	where
		U256: UintTryFrom<T>,
	{
		Item::Bytes(U256::from(value).to_be_bytes_trimmed_vec())
	}

	/// Creates a byte-string item from an address.
	///
	/// Addresses encode as literal 20-byte strings, never as integers,
	/// so leading zero bytes are preserved.
	pub fn address(addr: &Address) -> Self {
		Item::Bytes(addr.to_vec())
	}

	/// Encodes this item into a fresh buffer.
	pub fn encode(&self) -> Vec<u8> {
		let mut out = Vec::new();
		self.encode_into(&mut out);
		out
	}

	/// Encodes this item, appending to `out`.
	pub fn encode_into(&self, out: &mut Vec<u8>) {
		match self {
			Item::Bytes(data) => {
				if data.len() == 1 && data[0] < 0x80 {
					out.push(data[0]);
				} else {
					encode_length(data.len(), 0x80, out);
					out.extend_from_slice(data);
				}
			}
			Item::List(items) => {
				let mut payload = Vec::new();
				for item in items {
					item.encode_into(&mut payload);
				}
				encode_length(payload.len(), 0xc0, out);
				out.extend_from_slice(&payload);
			}
		}
	}

	/// Returns the byte-string payload, or an error for lists.
	pub fn as_bytes(&self) -> Result<&[u8], Error> {
		match self {
			Item::Bytes(data) => Ok(data),
			Item::List(_) => Err(Error::ExpectedBytes),
		}
	}

	/// Returns the nested items, or an error for byte strings.
	pub fn as_list(&self) -> Result<&[Item], Error> {
		match self {
			Item::List(items) => Ok(items),
			Item::Bytes(_) => Err(Error::ExpectedList),
		}
	}

	/// Reads this item as a canonical unsigned integer of up to 256
	/// bits. Rejects leading zero bytes, so only the unique encoding of
	/// each value is accepted.
	pub fn as_u256(&self) -> Result<U256, Error> {
		let bytes = self.as_bytes()?;
		if !bytes.is_empty() && bytes[0] == 0 {
			return Err(Error::LeadingZeroInteger);
		}
		U256::try_from_be_slice(bytes).ok_or(Error::IntegerOverflow)
	}

	/// Reads this item as a canonical u128.
	pub fn as_u128(&self) -> Result<u128, Error> {
		u128::try_from(self.as_u256()?).map_err(|_| Error::IntegerOverflow)
	}

	/// Reads this item as a canonical u64.
	pub fn as_u64(&self) -> Result<u64, Error> {
		u64::try_from(self.as_u256()?).map_err(|_| Error::IntegerOverflow)
	}

	/// Reads this item as a 20-byte address.
	pub fn as_address(&self) -> Result<Address, Error> {
		let bytes = self.as_bytes()?;
		if bytes.len() != 20 {
			return Err(Error::InvalidLength {
				expected: 20,
				actual: bytes.len(),
			});
		}
		Ok(Address::from_slice(bytes))
	}
}

/// Writes the length header for a payload of `len` bytes, where
/// `offset` is 0x80 for byte strings and 0xc0 for lists.
fn encode_length(len: usize, offset: u8, out: &mut Vec<u8>) {
	if len <= 55 {
		out.push(offset + len as u8);
	} else {
		let be = (len as u64).to_be_bytes();
		let first = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
		let len_bytes = &be[first..];
		out.push(offset + 55 + len_bytes.len() as u8);
		out.extend_from_slice(len_bytes);
	}
}

/// Decodes exactly one item spanning the whole input.
///
/// Fails on structurally invalid input, on any non-canonical encoding,
/// and on trailing bytes.
pub fn decode(input: &[u8]) -> Result<Item, Error> {
	let mut decoder = Decoder { input, pos: 0 };
	let item = decoder.decode_item()?;
	if decoder.pos != input.len() {
		return Err(Error::TrailingBytes);
	}
	Ok(item)
}

struct Decoder<'a> {
	input: &'a [u8],
	pos: usize,
}

impl<'a> Decoder<'a> {
	fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
		let end = self.pos.checked_add(len).ok_or(Error::UnexpectedEnd)?;
		if end > self.input.len() {
			return Err(Error::UnexpectedEnd);
		}
		let slice = &self.input[self.pos..end];
		self.pos = end;
		Ok(slice)
	}

	/// Reads a long-form length of `n` bytes and enforces canonical
	/// form: no leading zero byte, and a value that actually requires
	/// the long form.
	fn read_length(&mut self, n: usize) -> Result<usize, Error> {
		if n > 8 {
			return Err(Error::IntegerOverflow);
		}
		let bytes = self.take(n)?;
		if bytes[0] == 0 {
			return Err(Error::NonCanonical("length prefix has a leading zero"));
		}
		let mut len: u64 = 0;
		for &b in bytes {
			len = (len << 8) | u64::from(b);
		}
		if len <= 55 {
			return Err(Error::NonCanonical("long form used for a short length"));
		}
		usize::try_from(len).map_err(|_| Error::IntegerOverflow)
	}

	fn decode_item(&mut self) -> Result<Item, Error> {
		let prefix = *self.input.get(self.pos).ok_or(Error::UnexpectedEnd)?;
		self.pos += 1;

		match prefix {
			0x00..=0x7f => Ok(Item::Bytes(vec![prefix])),
			0x80..=0xb7 => {
				let len = (prefix - 0x80) as usize;
				let payload = self.take(len)?;
				if len == 1 && payload[0] < 0x80 {
					return Err(Error::NonCanonical("single byte below 0x80 has a header"));
				}
				Ok(Item::Bytes(payload.to_vec()))
			}
			0xb8..=0xbf => {
				let len = self.read_length((prefix - 0xb7) as usize)?;
				Ok(Item::Bytes(self.take(len)?.to_vec()))
			}
			0xc0..=0xf7 => {
				let len = (prefix - 0xc0) as usize;
				self.decode_list_payload(len)
			}
			0xf8..=0xff => {
				let len = self.read_length((prefix - 0xf7) as usize)?;
				self.decode_list_payload(len)
			}
		}
	}

	fn decode_list_payload(&mut self, len: usize) -> Result<Item, Error> {
		let payload = self.take(len)?;
		let mut inner = Decoder {
			input: payload,
			pos: 0,
		};
		let mut items = Vec::new();
		while inner.pos < payload.len() {
			items.push(inner.decode_item()?);
		}
		Ok(Item::List(items))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	#[test]
	fn encode_zero_is_empty_string() {
		// The single most error-prone rule: zero is the empty byte
		// string, not 0x00.
		assert_eq!(Item::uint(0u64).encode(), vec![0x80]);
		assert_ne!(Item::uint(0u64).encode(), vec![0x00]);
	}

	#[test]
	fn uint_accepts_all_unsigned_widths() {
		assert_eq!(Item::uint(1u8).encode(), vec![0x01]);
		assert_eq!(Item::uint(1u64).encode(), vec![0x01]);
		assert_eq!(Item::uint(1u128).encode(), vec![0x01]);
		assert_eq!(Item::uint(U256::from(1u64)).encode(), vec![0x01]);
	}

	#[test]
	fn encode_small_integers() {
		assert_eq!(Item::uint(1u64).encode(), vec![0x01]);
		assert_eq!(Item::uint(0x7fu64).encode(), vec![0x7f]);
		// 0x80 no longer fits a direct byte.
		assert_eq!(Item::uint(0x80u64).encode(), vec![0x81, 0x80]);
		assert_eq!(Item::uint(1024u64).encode(), vec![0x82, 0x04, 0x00]);
	}

	#[test]
	fn encode_has_no_leading_zero_bytes() {
		for value in [1u64, 0x80, 0x100, 0x10000, u64::MAX] {
			let encoded = Item::uint(value).encode();
			let payload = if encoded.len() == 1 {
				&encoded[..]
			} else {
				&encoded[1..]
			};
			assert_ne!(payload[0], 0, "value {value} encoded with a leading zero");
		}
	}

	#[test]
	fn encode_string_boundaries() {
		// Classic vectors.
		assert_eq!(Item::bytes(b"dog".to_vec()).encode(), b"\x83dog".to_vec());
		assert_eq!(Item::bytes(Vec::<u8>::new()).encode(), vec![0x80]);

		// 55 bytes takes the short form, 56 the long form.
		let s55 = vec![0x61u8; 55];
		let encoded = Item::bytes(s55.clone()).encode();
		assert_eq!(encoded[0], 0x80 + 55);
		assert_eq!(&encoded[1..], &s55[..]);

		let s56 = vec![0x61u8; 56];
		let encoded = Item::bytes(s56.clone()).encode();
		assert_eq!(encoded[0], 0xb8);
		assert_eq!(encoded[1], 56);
		assert_eq!(&encoded[2..], &s56[..]);
	}

	#[test]
	fn encode_lists() {
		// [ "cat", "dog" ]
		let encoded = Item::list(vec![
			Item::bytes(b"cat".to_vec()),
			Item::bytes(b"dog".to_vec()),
		])
		.encode();
		assert_eq!(encoded, b"\xc8\x83cat\x83dog".to_vec());

		// Empty list.
		assert_eq!(Item::list(vec![]).encode(), vec![0xc0]);
	}

	#[test]
	fn address_is_never_shortened() {
		let addr = address!("00000000000000000000000000000000000000aa");
		let encoded = Item::address(&addr).encode();
		assert_eq!(encoded.len(), 21);
		assert_eq!(encoded[0], 0x80 + 20);
		assert_eq!(&encoded[1..], addr.as_slice());
	}

	#[test]
	fn uint_round_trip() {
		for value in [0u64, 1, 0x7f, 0x80, 0xff, 0x100, 1024, u64::MAX] {
			let decoded = decode(&Item::uint(value).encode()).unwrap();
			assert_eq!(decoded.as_u64().unwrap(), value);
		}

		let big = U256::MAX;
		let decoded = decode(&Item::uint(big).encode()).unwrap();
		assert_eq!(decoded.as_u256().unwrap(), big);
	}

	#[test]
	fn nested_list_round_trip() {
		let item = Item::list(vec![
			Item::uint(7u64),
			Item::list(vec![Item::bytes(vec![0xab; 40]), Item::uint(0u64)]),
			Item::bytes(Vec::<u8>::new()),
		]);
		let encoded = item.encode();
		assert_eq!(decode(&encoded).unwrap(), item);
	}

	#[test]
	fn decode_rejects_wrapped_single_byte() {
		// 0x05 must be encoded as itself, not as 0x81 0x05.
		assert_eq!(
			decode(&[0x81, 0x05]),
			Err(Error::NonCanonical("single byte below 0x80 has a header"))
		);
	}

	#[test]
	fn decode_rejects_padded_long_length() {
		// Long form for a 3-byte string.
		let mut input = vec![0xb8, 0x03];
		input.extend_from_slice(b"dog");
		assert_eq!(
			decode(&input),
			Err(Error::NonCanonical("long form used for a short length"))
		);

		// Length bytes with a leading zero.
		let mut input = vec![0xb9, 0x00, 0x38];
		input.extend_from_slice(&[0x61; 56]);
		assert_eq!(
			decode(&input),
			Err(Error::NonCanonical("length prefix has a leading zero"))
		);
	}

	#[test]
	fn decode_rejects_truncation_and_trailing_bytes() {
		assert_eq!(decode(&[0x83, b'd', b'o']), Err(Error::UnexpectedEnd));
		assert_eq!(decode(&[0x01, 0x02]), Err(Error::TrailingBytes));
		assert_eq!(decode(&[]), Err(Error::UnexpectedEnd));
	}

	#[test]
	fn integer_accessor_rejects_leading_zero() {
		// 0x820001 is valid RLP for the string [0x00, 0x01] but not a
		// canonical integer.
		let decoded = decode(&[0x82, 0x00, 0x01]).unwrap();
		assert_eq!(decoded.as_u64(), Err(Error::LeadingZeroInteger));
	}

	#[test]
	fn typed_accessor_mismatches() {
		let list = decode(&[0xc0]).unwrap();
		assert_eq!(list.as_bytes(), Err(Error::ExpectedBytes));
		assert_eq!(list.as_u64(), Err(Error::ExpectedBytes));

		let bytes = decode(&[0x80]).unwrap();
		assert_eq!(bytes.as_list(), Err(Error::ExpectedList));

		let short = decode(&[0x83, 1, 2, 3]).unwrap();
		assert_eq!(
			short.as_address(),
			Err(Error::InvalidLength {
				expected: 20,
				actual: 3
			})
		);
	}
}
