use std::{
	collections::BTreeMap,
	fs::{self, File},
	io::{BufReader, BufWriter},
};

use log::debug;
use primitive_types::{H160, H256, U256};

use crate::{
	error::{Error, FillError, TestError},
	fork::Fork,
	hash::{empty_logs_hash, empty_trie_root, state_root, u256_to_h256},
	transaction::TestTx,
	types::{
		AccountState, CheckStatus, Fixture, FixtureEnv, FixtureInfo, FixturePostState,
		FixturePostStateIndexes, FixtureTransaction, HexBytes,
	},
};

/// Chain id every test transaction is signed for.
pub const CHAIN_ID: u64 = 1;

/// Gas charged before the first opcode of a message call runs.
pub const TX_INTRINSIC_GAS: u64 = 21000;

/// Base fee the default environment charges per gas.
pub const DEFAULT_BASE_FEE: u64 = 7;

/// Coinbase of the default environment.
pub const COINBASE: H160 = H160([
	0x2a, 0xdc, 0x25, 0x66, 0x50, 0x18, 0xaa, 0x1f, 0xe0, 0xe6, 0xbc, 0x66, 0x6d, 0xac, 0x8f,
	0xc2, 0x69, 0x7f, 0xf9, 0xba,
]);

/// Block environment a test executes in. One instance covers every fork
/// the fixture is filled for; fork-dependent header fields are projected
/// out by [`StateTest::fill`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestEnv {
	pub coinbase: H160,
	pub difficulty: U256,
	pub number: U256,
	pub timestamp: U256,
	pub gas_limit: U256,
	pub base_fee: U256,
	pub prev_randao: H256,
}

impl Default for TestEnv {
	fn default() -> Self {
		let difficulty = U256::from(0x20000);
		TestEnv {
			coinbase: COINBASE,
			difficulty,
			number: U256::one(),
			timestamp: U256::from(1000),
			gas_limit: U256::from(10_000_000),
			base_fee: U256::from(DEFAULT_BASE_FEE),
			prev_randao: u256_to_h256(difficulty),
		}
	}
}

/// A declared state test: pre state, one transaction and the post state
/// the external client is expected to reach.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StateTest {
	pub name: String,
	pub comment: String,
	pub reference_spec: String,
	pub reference_spec_version: String,
	pub valid_from: Fork,
	pub env: TestEnv,
	pub pre: BTreeMap<H160, AccountState>,
	pub post: BTreeMap<H160, AccountState>,
	pub tx: TestTx,
}

/// Minimum gas the transaction needs before any execution happens.
pub fn intrinsic_gas(tx: &TestTx) -> u64 {
	let mut gas = TX_INTRINSIC_GAS;
	if tx.to.is_none() {
		gas += 32000;
	}
	for byte in &tx.data {
		gas += if *byte == 0 { 4 } else { 16 };
	}
	gas
}

impl StateTest {
	/// Turn the declared test into a fixture covering every requested
	/// fork at or above `valid_from`.
	pub fn fill(&self, forks: &[Fork]) -> Result<Fixture, FillError> {
		let covered: Vec<Fork> = forks
			.iter()
			.copied()
			.filter(|fork| *fork >= self.valid_from)
			.collect();
		if covered.is_empty() {
			return Err(FillError::UnsupportedFork);
		}

		self.validate(&covered)?;

		let signed = self.tx.sign(CHAIN_ID)?;
		let txbytes = rlp::encode(&signed).to_vec();
		let hash = state_root(&self.post);
		let logs = empty_logs_hash();
		debug!("{}: post state root {hash:?}", self.name);

		let post_state = FixturePostState {
			hash,
			indexes: FixturePostStateIndexes {
				data: 0,
				gas: 0,
				value: 0,
			},
			logs,
			txbytes: HexBytes(txbytes),
		};
		let post = covered
			.iter()
			.map(|fork| (*fork, vec![post_state.clone()]))
			.collect();

		Ok(Fixture {
			info: FixtureInfo {
				comment: self.comment.clone(),
				filling_tool_version: format!(
					"{}-{}",
					env!("CARGO_PKG_NAME"),
					env!("CARGO_PKG_VERSION")
				),
				reference_spec: self.reference_spec.clone(),
				reference_spec_version: self.reference_spec_version.clone(),
			},
			env: fixture_env(&self.env, &covered),
			post,
			pre: self.pre.clone(),
			transaction: FixtureTransaction {
				data: vec![HexBytes(self.tx.data.clone())],
				gas_limit: vec![self.tx.gas_limit],
				gas_price: self.tx.gas_price,
				nonce: self.tx.nonce,
				secret_key: self.tx.secret_key,
				sender: self.tx.sender()?,
				to: self.tx.to,
				value: vec![self.tx.value],
			},
		})
	}

	/// The checks a conforming client runs before execution, applied in
	/// reverse: a test that would be rejected on replay must not fill.
	fn validate(&self, covered: &[Fork]) -> Result<(), FillError> {
		if self.tx.gas_limit < U256::from(intrinsic_gas(&self.tx)) {
			return Err(FillError::IntrinsicGas);
		}
		if self.tx.gas_limit > self.env.gas_limit {
			return Err(FillError::GasLimitReached);
		}
		if self.tx.gas_price < self.env.base_fee {
			return Err(FillError::GasPriceLessThanBaseFee);
		}

		let sender = self.tx.sender()?;
		let balance = self
			.pre
			.get(&sender)
			.map(|account| account.balance)
			.unwrap_or_default();
		let required_funds = self
			.tx
			.gas_limit
			.checked_mul(self.tx.gas_price)
			.ok_or(FillError::OutOfFund)?
			.checked_add(self.tx.value)
			.ok_or(FillError::OutOfFund)?;
		if balance < required_funds {
			return Err(FillError::OutOfFund);
		}

		for fork in covered {
			if !fork.tx_types().contains(&0) {
				return Err(FillError::TxTypeNotSupported);
			}
			for precompile in fork.precompiles() {
				if self.pre.contains_key(&precompile) {
					return Err(FillError::PrecompileCollision);
				}
			}
		}

		Ok(())
	}
}

fn fixture_env(env: &TestEnv, covered: &[Fork]) -> FixtureEnv {
	FixtureEnv {
		current_base_fee: covered
			.iter()
			.any(|fork| fork.header_base_fee_required())
			.then_some(env.base_fee),
		current_beacon_root: covered
			.iter()
			.any(|fork| fork.header_beacon_root_required())
			.then_some(H256::zero()),
		current_coinbase: env.coinbase,
		current_difficulty: covered
			.iter()
			.any(|fork| !fork.header_prev_randao_required())
			.then_some(env.difficulty),
		current_excess_blob_gas: covered
			.iter()
			.any(|fork| fork.header_excess_blob_gas_required())
			.then_some(U256::zero()),
		current_gas_limit: env.gas_limit,
		current_number: env.number,
		current_random: covered
			.iter()
			.any(|fork| fork.header_prev_randao_required())
			.then_some(env.prev_randao),
		current_timestamp: env.timestamp,
		current_withdrawals_root: covered
			.iter()
			.any(|fork| fork.header_withdrawals_required())
			.then_some(empty_trie_root()),
	}
}

/// Fill every test of the suite, skipping those no requested fork covers.
pub fn fill_suite(
	tests: &[StateTest],
	forks: &[Fork],
) -> Result<(BTreeMap<String, Fixture>, CheckStatus), Error> {
	let mut fixtures = BTreeMap::new();
	let mut status = CheckStatus::default();

	for test in tests {
		print!("fill {}: ", test.name);
		match test.fill(forks) {
			Ok(fixture) => {
				fixtures.insert(test.name.clone(), fixture);
				status.inc_completed();
				println!("ok");
			}
			Err(FillError::UnsupportedFork) => {
				status.inc_skipped();
				println!("skipped");
			}
			Err(err) => {
				println!("ERROR: {err:?}");
				return Err(err.into());
			}
		}
	}

	Ok((fixtures, status))
}

/// Fill the suite and write it as one fixture file.
pub fn write_fixtures(
	tests: &[StateTest],
	forks: &[Fork],
	filename: &str,
) -> Result<CheckStatus, Error> {
	let (fixtures, status) = fill_suite(tests, forks)?;
	serde_json::to_writer_pretty(BufWriter::new(File::create(filename)?), &fixtures)?;
	debug!("wrote {} fixtures to {filename}", fixtures.len());
	Ok(status)
}

/// Check fixtures in a single json file against freshly filled ones.
pub fn check_file(
	tests: &[StateTest],
	forks: &[Fork],
	filename: &str,
) -> Result<CheckStatus, Error> {
	let found: BTreeMap<String, Fixture> =
		serde_json::from_reader(BufReader::new(File::open(filename)?))?;
	let mut status = CheckStatus::default();

	for test in tests {
		print!("{filename} | {}: ", test.name);
		let expected = match test.fill(forks) {
			Ok(fixture) => fixture,
			Err(FillError::UnsupportedFork) => {
				status.inc_skipped();
				println!("skipped");
				continue;
			}
			Err(err) => {
				println!("ERROR: {err:?}");
				return Err(err.into());
			}
		};

		match check_test(&test.name, &expected, found.get(&test.name)) {
			Ok(()) => {
				status.inc_completed();
				println!("ok");
			}
			Err(err) => {
				status.inc_failed();
				println!("ERROR: {err}");
			}
		}
	}

	for name in found.keys() {
		if !tests.iter().any(|test| test.name == *name) {
			status.inc_failed();
			println!("{filename} | {name}: ERROR: {}", TestError::UnknownTest(name.clone()));
		}
	}

	Ok(status)
}

fn check_test(name: &str, expected: &Fixture, found: Option<&Fixture>) -> Result<(), TestError> {
	match found {
		None => Err(TestError::MissingTest(name.to_string())),
		Some(fixture) if !fixture.same_content(expected) => {
			Err(TestError::FixtureMismatch(name.to_string()))
		}
		Some(_) => Ok(()),
	}
}

/// Check a single fixture file or every json file in a directory.
pub fn check_single(
	tests: &[StateTest],
	forks: &[Fork],
	filename: &str,
) -> Result<CheckStatus, Error> {
	if fs::metadata(filename)?.is_dir() {
		let mut status = CheckStatus::default();

		for filename in fs::read_dir(filename)? {
			let filepath = filename?.path();
			let filename = filepath.to_str().ok_or(Error::NonUtf8Filename)?;

			if filename.ends_with(".json") {
				println!("CHECK for: {filename}");
				status += check_file(tests, forks, filename)?;
			}
		}
		Ok(status)
	} else {
		check_file(tests, forks, filename)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	fn transfer_test() -> StateTest {
		let secret = H256::from_str(
			"0x45a915e4d060149eb4365960e6a7a45f334393093061116b197e3240065ff2d8",
		)
		.unwrap();
		let sender = H160::from_str("0xa94f5374fce5edbc8e2a8697c15331677e6ebf0b").unwrap();

		let mut pre = BTreeMap::new();
		pre.insert(
			sender,
			AccountState {
				balance: U256::exp10(18),
				..Default::default()
			},
		);

		StateTest {
			name: "transfer".to_string(),
			comment: String::new(),
			reference_spec: String::new(),
			reference_spec_version: String::new(),
			valid_from: Fork::London,
			env: TestEnv::default(),
			pre,
			post: BTreeMap::new(),
			tx: TestTx {
				nonce: U256::zero(),
				gas_price: U256::from(DEFAULT_BASE_FEE),
				gas_limit: U256::from(TX_INTRINSIC_GAS),
				to: Some(H160::from_low_u64_be(0xaa)),
				value: U256::one(),
				data: Vec::new(),
				secret_key: secret,
			},
		}
	}

	#[test]
	fn intrinsic_gas_counts_calldata() {
		let mut tx = transfer_test().tx;
		assert_eq!(intrinsic_gas(&tx), 21000);

		tx.data = vec![0x00, 0x01, 0xff];
		assert_eq!(intrinsic_gas(&tx), 21000 + 4 + 16 + 16);

		tx.to = None;
		assert_eq!(intrinsic_gas(&tx), 21000 + 32000 + 4 + 16 + 16);
	}

	#[test]
	fn fill_covers_requested_forks() {
		let fixture = transfer_test().fill(&Fork::ALL).unwrap();
		assert_eq!(fixture.post.len(), Fork::ALL.len());
		let entry = &fixture.post[&Fork::London][0];
		assert_eq!(entry.logs, empty_logs_hash());
		assert_eq!(entry.indexes, FixturePostStateIndexes { data: 0, gas: 0, value: 0 });
		assert_eq!(fixture.post[&Fork::Prague][0], *entry);
	}

	#[test]
	fn fill_skips_when_no_fork_is_covered() {
		let mut test = transfer_test();
		test.valid_from = Fork::Cancun;
		assert_eq!(
			test.fill(&[Fork::London, Fork::Merge]),
			Err(FillError::UnsupportedFork)
		);
	}

	#[test]
	fn fill_rejects_sub_intrinsic_gas_limit() {
		let mut test = transfer_test();
		test.tx.gas_limit = U256::from(TX_INTRINSIC_GAS - 1);
		assert_eq!(test.fill(&Fork::ALL), Err(FillError::IntrinsicGas));
	}

	#[test]
	fn fill_rejects_underfunded_sender() {
		let mut test = transfer_test();
		for account in test.pre.values_mut() {
			account.balance = U256::from(1000);
		}
		assert_eq!(test.fill(&Fork::ALL), Err(FillError::OutOfFund));
	}

	#[test]
	fn fill_rejects_gas_price_below_base_fee() {
		let mut test = transfer_test();
		test.tx.gas_price = test.env.base_fee - U256::one();
		assert_eq!(test.fill(&Fork::ALL), Err(FillError::GasPriceLessThanBaseFee));
	}

	#[test]
	fn fill_rejects_block_gas_limit_overflow() {
		let mut test = transfer_test();
		test.tx.gas_limit = test.env.gas_limit + U256::one();
		assert_eq!(test.fill(&Fork::ALL), Err(FillError::GasLimitReached));
	}

	#[test]
	fn fill_rejects_precompile_in_pre_state() {
		let mut test = transfer_test();
		test.pre
			.insert(H160::from_low_u64_be(0x01), AccountState::default());
		assert_eq!(test.fill(&Fork::ALL), Err(FillError::PrecompileCollision));
	}

	#[test]
	fn env_projection_tracks_fork_capabilities() {
		let test = transfer_test();

		let london = test.fill(&[Fork::London]).unwrap().env;
		assert_eq!(london.current_difficulty, Some(U256::from(0x20000)));
		assert_eq!(london.current_random, None);
		assert_eq!(london.current_withdrawals_root, None);
		assert_eq!(london.current_base_fee, Some(U256::from(DEFAULT_BASE_FEE)));

		let shanghai = test.fill(&[Fork::Shanghai]).unwrap().env;
		assert_eq!(shanghai.current_difficulty, None);
		assert_eq!(shanghai.current_random, Some(u256_to_h256(U256::from(0x20000))));
		assert_eq!(shanghai.current_withdrawals_root, Some(empty_trie_root()));
		assert_eq!(shanghai.current_beacon_root, None);

		let cancun = test.fill(&[Fork::Cancun]).unwrap().env;
		assert_eq!(cancun.current_beacon_root, Some(H256::zero()));
		assert_eq!(cancun.current_excess_blob_gas, Some(U256::zero()));

		let all = test.fill(&Fork::ALL).unwrap().env;
		assert_eq!(all.current_difficulty, Some(U256::from(0x20000)));
		assert!(all.current_random.is_some());
	}

	#[test]
	fn filled_transaction_mirrors_the_declared_one() {
		let test = transfer_test();
		let fixture = test.fill(&Fork::ALL).unwrap();
		let tx = &fixture.transaction;
		assert_eq!(tx.sender, test.tx.sender().unwrap());
		assert_eq!(tx.gas_limit, vec![test.tx.gas_limit]);
		assert_eq!(tx.value, vec![test.tx.value]);
		assert_eq!(tx.secret_key, test.tx.secret_key);

		let signed: crate::transaction::SignedTx =
			rlp::decode(&fixture.post[&Fork::London][0].txbytes.0).unwrap();
		assert_eq!(signed.recover(CHAIN_ID).unwrap(), tx.sender);
	}
}
