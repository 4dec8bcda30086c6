use std::{collections::BTreeMap, str::FromStr};

use hex::FromHex;
use primitive_types::{H160, H256, U256};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::fork::Fork;

/// Statistic type to gather fixture check completion status
#[derive(Default, Clone, Debug, Eq, PartialEq)]
pub struct CheckStatus {
	pub completed: usize,
	pub skipped: usize,
	pub failed: usize,
}

impl std::ops::AddAssign for CheckStatus {
	fn add_assign(&mut self, rhs: Self) {
		self.completed += rhs.completed;
		self.skipped += rhs.skipped;
		self.failed += rhs.failed;
	}
}

impl CheckStatus {
	/// Increment `completed` statistic field
	pub fn inc_completed(&mut self) {
		self.completed += 1
	}

	/// Increment `skipped` statistic field
	pub fn inc_skipped(&mut self) {
		self.skipped += 1
	}

	/// Increment `failed` statistic field
	pub fn inc_failed(&mut self) {
		self.failed += 1
	}

	/// Get total checked tests
	pub fn get_total(&self) -> usize {
		self.completed + self.skipped + self.failed
	}

	pub fn is_clean(&self) -> bool {
		self.failed == 0
	}

	/// Print totals for a whole run
	pub fn print_total(&self) {
		println!(
			"\nTOTAL: {} tests\n\tCOMPLETED: {}\n\tSKIPPED: {}\n\tFAILED: {}",
			self.get_total(),
			self.completed,
			self.skipped,
			self.failed
		);
	}
}

/// A filled state test as written to disk. The enclosing file maps test
/// name to `Fixture`, one shared pre state and transaction with post
/// expectations keyed by fork.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Fixture {
	#[serde(rename = "_info")]
	pub info: FixtureInfo,
	pub env: FixtureEnv,
	pub post: BTreeMap<Fork, Vec<FixturePostState>>,
	pub pre: BTreeMap<H160, AccountState>,
	pub transaction: FixtureTransaction,
}

impl Fixture {
	/// Equality over everything a client replays. `_info` provenance is
	/// free to differ between tool versions.
	pub fn same_content(&self, other: &Fixture) -> bool {
		self.env == other.env
			&& self.post == other.post
			&& self.pre == other.pre
			&& self.transaction == other.transaction
	}
}

/// Provenance block carried under the `_info` key
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureInfo {
	pub comment: String,
	#[serde(rename = "filling-tool-version")]
	pub filling_tool_version: String,
	#[serde(rename = "reference-spec")]
	pub reference_spec: String,
	#[serde(rename = "reference-spec-version")]
	pub reference_spec_version: String,
}

/// Block environment the transaction executes in. Header fields that only
/// exist from a certain fork on are optional and left out when no covered
/// fork requires them.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureEnv {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub current_base_fee: Option<U256>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub current_beacon_root: Option<H256>,
	pub current_coinbase: H160,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub current_difficulty: Option<U256>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub current_excess_blob_gas: Option<U256>,
	pub current_gas_limit: U256,
	pub current_number: U256,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub current_random: Option<H256>,
	pub current_timestamp: U256,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub current_withdrawals_root: Option<H256>,
}

/// One expected outcome for a fork: state root, log hash and the signed
/// transaction bytes the external client should replay.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixturePostState {
	pub hash: H256,
	pub indexes: FixturePostStateIndexes,
	pub logs: H256,
	pub txbytes: HexBytes,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct FixturePostStateIndexes {
	pub data: usize,
	pub gas: usize,
	pub value: usize,
}

/// Account record used for both the pre state and expectation maps
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct AccountState {
	pub balance: U256,
	pub code: HexBytes,
	pub nonce: U256,
	pub storage: BTreeMap<U256, U256>,
}

/// Legacy transaction template in the parameter-array form the fixture
/// format uses. The suite fills exactly one data/gas/value combination.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureTransaction {
	pub data: Vec<HexBytes>,
	pub gas_limit: Vec<U256>,
	pub gas_price: U256,
	pub nonce: U256,
	pub secret_key: H256,
	pub sender: H160,
	#[serde(serialize_with = "serialize_to", deserialize_with = "deserialize_to")]
	pub to: Option<H160>,
	pub value: Vec<U256>,
}

fn deserialize_to<'de, D>(deserializer: D) -> Result<Option<H160>, D::Error>
where
	D: Deserializer<'de>,
{
	let data: String = Deserialize::deserialize(deserializer)?;

	if data.is_empty() {
		Ok(None)
	} else {
		Ok(Some(H160::from_str(&data).map_err(de::Error::custom)?))
	}
}

fn serialize_to<S>(value: &Option<H160>, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let s = if let Some(v) = value {
		format!("{v:?}")
	} else {
		"".to_string()
	};
	s.serialize(serializer)
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct HexBytes(
	#[serde(
		deserialize_with = "deserialize_hex_bytes",
		serialize_with = "serialize_hex_bytes"
	)]
	pub Vec<u8>,
);

fn deserialize_hex_bytes<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
	D: Deserializer<'de>,
{
	let data = String::deserialize(deserializer)?;
	if !data.starts_with("0x") {
		return Err(de::Error::custom("should start with 0x"));
	}
	FromHex::from_hex(&data[2..]).map_err(de::Error::custom)
}

fn serialize_hex_bytes<S>(value: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let mut s = "0x".to_string();
	s.push_str(&hex::encode(value));
	s.serialize(serializer)
}
