use primitive_types::{H160, H256, U256};
use rlp::RlpStream;

use crate::error::FillError;
use crate::hash::{keccak, u256_to_h256};

/// Unsigned legacy transaction as a test declares it. The secret key
/// stands in for the sender, matching the fixture format where both are
/// published side by side.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestTx {
	pub nonce: U256,
	pub gas_price: U256,
	pub gas_limit: U256,
	pub to: Option<H160>,
	pub value: U256,
	pub data: Vec<u8>,
	pub secret_key: H256,
}

impl TestTx {
	fn secret(&self) -> Result<libsecp256k1::SecretKey, FillError> {
		libsecp256k1::SecretKey::parse(&self.secret_key.0).map_err(|_| FillError::InvalidSecretKey)
	}

	/// Address the secret key signs for.
	pub fn sender(&self) -> Result<H160, FillError> {
		let public = libsecp256k1::PublicKey::from_secret_key(&self.secret()?);
		Ok(H160::from(keccak(&public.serialize()[1..65])))
	}

	/// Replay-protected signing hash, `keccak(rlp([.., chain_id, 0, 0]))`.
	pub fn signing_hash(&self, chain_id: u64) -> H256 {
		signing_hash(
			self.nonce,
			self.gas_price,
			self.gas_limit,
			self.to,
			self.value,
			&self.data,
			chain_id,
		)
	}

	pub fn sign(&self, chain_id: u64) -> Result<SignedTx, FillError> {
		let message = libsecp256k1::Message::parse(&self.signing_hash(chain_id).0);
		let (signature, recovery_id) = libsecp256k1::sign(&message, &self.secret()?);
		let signature = signature.serialize();

		Ok(SignedTx {
			nonce: self.nonce,
			gas_price: self.gas_price,
			gas_limit: self.gas_limit,
			to: self.to,
			value: self.value,
			data: self.data.clone(),
			v: 35 + 2 * chain_id + u64::from(recovery_id.serialize()),
			r: H256::from_slice(&signature[..32]),
			s: H256::from_slice(&signature[32..]),
		})
	}
}

/// Signed legacy transaction in its nine-field wire form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignedTx {
	pub nonce: U256,
	pub gas_price: U256,
	pub gas_limit: U256,
	pub to: Option<H160>,
	pub value: U256,
	pub data: Vec<u8>,
	pub v: u64,
	pub r: H256,
	pub s: H256,
}

impl SignedTx {
	/// Recover the signer, checking the replay-protected `v` range.
	pub fn recover(&self, chain_id: u64) -> Result<H160, FillError> {
		let recovery_id = self
			.v
			.checked_sub(35 + 2 * chain_id)
			.filter(|id| *id < 2)
			.ok_or(FillError::InvalidSignature)?;
		let recovery_id = libsecp256k1::RecoveryId::parse(recovery_id as u8)
			.map_err(|_| FillError::InvalidSignature)?;

		let mut data = [0u8; 64];
		data[..32].copy_from_slice(&self.r[..]);
		data[32..].copy_from_slice(&self.s[..]);
		let signature = libsecp256k1::Signature::parse_standard(&data)
			.map_err(|_| FillError::InvalidSignature)?;

		let hash = signing_hash(
			self.nonce,
			self.gas_price,
			self.gas_limit,
			self.to,
			self.value,
			&self.data,
			chain_id,
		);
		let message = libsecp256k1::Message::parse(&hash.0);
		let public = libsecp256k1::recover(&message, &signature, &recovery_id)
			.map_err(|_| FillError::InvalidSignature)?;

		Ok(H160::from(keccak(&public.serialize()[1..65])))
	}
}

impl rlp::Encodable for SignedTx {
	fn rlp_append(&self, stream: &mut RlpStream) {
		stream.begin_list(9);
		stream.append(&self.nonce);
		stream.append(&self.gas_price);
		stream.append(&self.gas_limit);
		match self.to {
			Some(address) => stream.append(&address),
			None => stream.append_empty_data(),
		};
		stream.append(&self.value);
		stream.append(&self.data);
		stream.append(&self.v);
		// r and s are integers on the wire, not fixed-width words
		stream.append(&U256::from_big_endian(&self.r[..]));
		stream.append(&U256::from_big_endian(&self.s[..]));
	}
}

impl rlp::Decodable for SignedTx {
	fn decode(rlp: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
		if rlp.item_count()? != 9 {
			return Err(rlp::DecoderError::RlpIncorrectListLen);
		}

		let to = rlp.at(3)?;
		let to = if to.is_empty() {
			None
		} else {
			Some(to.as_val()?)
		};

		Ok(SignedTx {
			nonce: rlp.val_at(0)?,
			gas_price: rlp.val_at(1)?,
			gas_limit: rlp.val_at(2)?,
			to,
			value: rlp.val_at(4)?,
			data: rlp.val_at(5)?,
			v: rlp.val_at(6)?,
			r: u256_to_h256(rlp.val_at(7)?),
			s: u256_to_h256(rlp.val_at(8)?),
		})
	}
}

fn signing_hash(
	nonce: U256,
	gas_price: U256,
	gas_limit: U256,
	to: Option<H160>,
	value: U256,
	data: &[u8],
	chain_id: u64,
) -> H256 {
	let mut stream = RlpStream::new_list(9);
	stream.append(&nonce);
	stream.append(&gas_price);
	stream.append(&gas_limit);
	match to {
		Some(address) => stream.append(&address),
		None => stream.append_empty_data(),
	};
	stream.append(&value);
	stream.append(&data.to_vec());
	stream.append(&chain_id);
	stream.append(&0u8);
	stream.append(&0u8);
	keccak(&stream.out())
}
