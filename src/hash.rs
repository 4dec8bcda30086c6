use std::collections::BTreeMap;

use primitive_types::{H160, H256, U256};
use sha3::{Digest, Keccak256};

use crate::types::AccountState;

/// Keccak-256 digest as an `H256`.
pub fn keccak(data: &[u8]) -> H256 {
	H256::from_slice(&Keccak256::digest(data))
}

pub fn u256_to_h256(u: U256) -> H256 {
	let mut h = H256::default();
	u.to_big_endian(&mut h[..]);
	h
}

/// Root of the empty trie, `keccak(rlp(""))`.
pub fn empty_trie_root() -> H256 {
	keccak(&rlp::NULL_RLP)
}

/// Hash of an empty log list, `keccak(rlp([]))`. Every test in the suite
/// runs log-free programs, so this is the only logs value fixtures carry.
pub fn empty_logs_hash() -> H256 {
	keccak(&rlp::EMPTY_LIST_RLP)
}

/// Basic account type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrieAccount {
	/// Nonce of the account.
	pub nonce: U256,
	/// Balance of the account.
	pub balance: U256,
	/// Storage root of the account.
	pub storage_root: H256,
	/// Code hash of the account.
	pub code_hash: H256,
}

impl rlp::Encodable for TrieAccount {
	fn rlp_append(&self, stream: &mut rlp::RlpStream) {
		stream.begin_list(4);
		stream.append(&self.nonce);
		stream.append(&self.balance);
		stream.append(&self.storage_root);
		stream.append(&self.code_hash);
	}
}

/// Root of the secure trie over the given accounts. Zero-valued storage
/// slots count as absent.
pub fn state_root(state: &BTreeMap<H160, AccountState>) -> H256 {
	let tree = state
		.iter()
		.map(|(address, account)| {
			let storage_root = ethereum::util::sec_trie_root(
				account
					.storage
					.iter()
					.filter(|(_, value)| !value.is_zero())
					.map(|(k, v)| (u256_to_h256(*k), rlp::encode(v))),
			);

			let code_hash = keccak(&account.code.0);
			let account = TrieAccount {
				nonce: account.nonce,
				balance: account.balance,
				storage_root,
				code_hash,
			};

			(address, rlp::encode(&account))
		})
		.collect::<Vec<_>>();

	ethereum::util::sec_trie_root(tree)
}
