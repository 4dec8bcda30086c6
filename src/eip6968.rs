//! Contract Secured Revenue scenarios.
//!
//! Under EIP-6968 a fifth of the base fee burned by a frame is credited
//! to the contract that ran it. Each case below declares the bytecode of
//! one or two accounts together with the gas its frame burns, and the
//! expected post state follows from [`calc_revenue`] alone. Running the
//! programs is the job of the client replaying the fixtures.

use std::collections::BTreeMap;

use primitive_types::{H160, H256, U256};

use crate::{
	bytecode::{Bytecode, Opcode},
	error::FillError,
	filler::{StateTest, TestEnv, TX_INTRINSIC_GAS},
	fork::Fork,
	transaction::TestTx,
	types::{AccountState, HexBytes},
};

pub const REFERENCE_SPEC_GIT_PATH: &str = "EIPS/eip-6968.md";
pub const REFERENCE_SPEC_VERSION: &str = "7500ac4fc1bbdfaf684e7ef851f798f6b667b2fe";

/// Divisor splitting the burned base fee between protocol and contract.
pub const REVENUE_SHARE_QUOTIENT: u64 = 5;

/// Funded account every test sends from.
pub const TEST_ADDRESS: H160 = H160([
	0xa9, 0x4f, 0x53, 0x74, 0xfc, 0xe5, 0xed, 0xbc, 0x8e, 0x2a, 0x86, 0x97, 0xc1, 0x53, 0x31,
	0x67, 0x7e, 0x6e, 0xbf, 0x0b,
]);

/// Secret key behind [`TEST_ADDRESS`].
pub const TEST_SECRET_KEY: H256 = H256([
	0x45, 0xa9, 0x15, 0xe4, 0xd0, 0x60, 0x14, 0x9e, 0xb4, 0x36, 0x59, 0x60, 0xe6, 0xa7, 0xa4,
	0x5f, 0x33, 0x43, 0x93, 0x09, 0x30, 0x61, 0x11, 0x6b, 0x19, 0x7e, 0x32, 0x40, 0x06, 0x5f,
	0xf2, 0xd8,
]);

/// Short form for the low-byte addresses tests deploy at.
pub fn to_address(n: u64) -> H160 {
	H160::from_low_u64_be(n)
}

/// Revenue a contract earns for the gas burned in its own frame:
/// `gas_used * base_fee` floored into fifths.
pub fn calc_revenue(base_fee: U256, gas_used: u64) -> U256 {
	base_fee * U256::from(gas_used) / U256::from(REVENUE_SHARE_QUOTIENT)
}

/// Code and declared frame gas of one deployed account.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseAccount {
	pub code: Vec<u8>,
	pub gas_used: u64,
}

/// One revenue scenario. The transaction enters at the account with the
/// lowest address; every account earns revenue for its own frame only.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestCase {
	pub name: &'static str,
	pub accounts: BTreeMap<H160, CaseAccount>,
}

impl TestCase {
	/// Transaction gas limit: intrinsic cost plus the gas declared for
	/// every frame. Execution is expected to consume it exactly, except
	/// in the out-of-gas case where the shortfall is the scenario.
	pub fn gas_limit(&self) -> u64 {
		TX_INTRINSIC_GAS
			+ self
				.accounts
				.values()
				.map(|account| account.gas_used)
				.sum::<u64>()
	}

	/// Account the transaction calls into.
	pub fn entry(&self) -> Result<H160, FillError> {
		self.accounts
			.keys()
			.next()
			.copied()
			.ok_or(FillError::NoEntryAccount)
	}

	/// Expand the scenario into a declared state test at the default
	/// environment, paying no priority fee.
	pub fn state_test(&self) -> Result<StateTest, FillError> {
		let env = TestEnv::default();
		let gas_price = env.base_fee;
		let gas_limit = self.gas_limit();
		let balance = U256::exp10(18);

		let mut pre = BTreeMap::new();
		pre.insert(
			TEST_ADDRESS,
			AccountState {
				balance,
				..Default::default()
			},
		);
		for (address, account) in &self.accounts {
			pre.insert(
				*address,
				AccountState {
					code: HexBytes(account.code.clone()),
					..Default::default()
				},
			);
		}

		let mut post = BTreeMap::new();
		post.insert(
			TEST_ADDRESS,
			AccountState {
				balance: balance - gas_price * U256::from(gas_limit),
				nonce: U256::one(),
				..Default::default()
			},
		);
		for (address, account) in &self.accounts {
			post.insert(
				*address,
				AccountState {
					balance: calc_revenue(env.base_fee, account.gas_used),
					code: HexBytes(account.code.clone()),
					..Default::default()
				},
			);
		}

		let tx = TestTx {
			nonce: U256::zero(),
			gas_price,
			gas_limit: U256::from(gas_limit),
			to: Some(self.entry()?),
			value: U256::zero(),
			data: Vec::new(),
			secret_key: TEST_SECRET_KEY,
		};

		Ok(StateTest {
			name: self.name.to_string(),
			comment: format!("EIP-6968 contract secured revenue: {}", self.name),
			reference_spec: REFERENCE_SPEC_GIT_PATH.to_string(),
			reference_spec_version: REFERENCE_SPEC_VERSION.to_string(),
			valid_from: Fork::London,
			env,
			pre,
			post,
			tx,
		})
	}
}

/// The scenario table. New EIP-6968 behaviors are covered by adding
/// entries here, not by writing new assembly elsewhere.
pub fn test_cases() -> Vec<TestCase> {
	// PUSH1 (3) + PUSH1 (3) + ADD (3) = 9
	let add = Bytecode::new()
		.pushv(1u64)
		.pushv(2u64)
		.opcode(Opcode::ADD)
		.opcode(Opcode::STOP)
		.build();

	// five environment reads at 2 gas each
	let env_reads = Bytecode::new()
		.opcode(Opcode::BASEFEE)
		.opcode(Opcode::GASPRICE)
		.opcode(Opcode::ORIGIN)
		.opcode(Opcode::COINBASE)
		.opcode(Opcode::NUMBER)
		.opcode(Opcode::STOP)
		.build();

	// 4x RETURNDATASIZE (2) + PUSH1 (3) + PUSH2 (3) + PUSH1 (3)
	// + cold CALL (2600) + POP (2) = 2619 in the caller's own frame
	let caller = Bytecode::new()
		.opcode(Opcode::RETURNDATASIZE)
		.opcode(Opcode::RETURNDATASIZE)
		.opcode(Opcode::RETURNDATASIZE)
		.opcode(Opcode::RETURNDATASIZE)
		.pushv(0u64)
		.pushv(0x0200u64)
		.pushv(0xffu64)
		.opcode(Opcode::CALL)
		.opcode(Opcode::POP)
		.opcode(Opcode::STOP)
		.build();

	// PUSH1 (3) + POP (2) = 5
	let callee = Bytecode::new()
		.pushv(0u64)
		.opcode(Opcode::POP)
		.opcode(Opcode::STOP)
		.build();

	vec![
		TestCase {
			name: "simply add two numbers",
			accounts: BTreeMap::from([(
				to_address(0x100),
				CaseAccount {
					code: add.clone(),
					gas_used: 9,
				},
			)]),
		},
		TestCase {
			name: "read environment opcodes",
			accounts: BTreeMap::from([(
				to_address(0x100),
				CaseAccount {
					code: env_reads,
					gas_used: 10,
				},
			)]),
		},
		TestCase {
			// the 4-gas allowance dies on the second push and is burned
			// whole, so the frame still earns revenue on exactly 4 gas
			name: "out-of-gas",
			accounts: BTreeMap::from([(
				to_address(0x100),
				CaseAccount {
					code: add,
					gas_used: 4,
				},
			)]),
		},
		TestCase {
			name: "simple call",
			accounts: BTreeMap::from([
				(
					to_address(0x100),
					CaseAccount {
						code: caller,
						gas_used: 2619,
					},
				),
				(
					to_address(0x200),
					CaseAccount {
						code: callee,
						gas_used: 5,
					},
				),
			]),
		},
	]
}

/// EOA to EOA transfer: balances move only through the gas fee, and the
/// untouched recipient keeps its balance to the wei.
pub fn simple_tx_test() -> StateTest {
	let env = TestEnv::default();
	let balance = U256::exp10(21);
	let gas_price = U256::from(10);
	let recipient = to_address(0xaa);
	let fee = gas_price * U256::from(TX_INTRINSIC_GAS);
	let tip = (gas_price - env.base_fee) * U256::from(TX_INTRINSIC_GAS);

	let mut pre = BTreeMap::new();
	pre.insert(
		TEST_ADDRESS,
		AccountState {
			balance,
			..Default::default()
		},
	);
	pre.insert(
		recipient,
		AccountState {
			balance: U256::from(100),
			..Default::default()
		},
	);

	let mut post = BTreeMap::new();
	post.insert(
		TEST_ADDRESS,
		AccountState {
			balance: balance - fee,
			nonce: U256::one(),
			..Default::default()
		},
	);
	post.insert(
		recipient,
		AccountState {
			balance: U256::from(100),
			..Default::default()
		},
	);
	post.insert(
		env.coinbase,
		AccountState {
			balance: tip,
			..Default::default()
		},
	);

	StateTest {
		name: "simple_tx".to_string(),
		comment: "EOA to EOA transfer behavior does not change".to_string(),
		reference_spec: REFERENCE_SPEC_GIT_PATH.to_string(),
		reference_spec_version: REFERENCE_SPEC_VERSION.to_string(),
		valid_from: Fork::London,
		env,
		pre,
		post,
		tx: TestTx {
			nonce: U256::zero(),
			gas_price,
			gas_limit: U256::from(TX_INTRINSIC_GAS),
			to: Some(recipient),
			value: U256::zero(),
			data: Vec::new(),
			secret_key: TEST_SECRET_KEY,
		},
	}
}

/// Every test of the suite, the transfer first, then the table in order.
pub fn suite() -> Result<Vec<StateTest>, FillError> {
	let mut tests = vec![simple_tx_test()];
	for case in test_cases() {
		tests.push(case.state_test()?);
	}
	Ok(tests)
}
