#[cfg(test)]
mod simple_tx_tests {
	use csr_statetests::eip6968::{simple_tx_test, to_address, TEST_ADDRESS};
	use csr_statetests::filler::TX_INTRINSIC_GAS;
	use csr_statetests::fork::Fork;
	use primitive_types::U256;

	#[test]
	fn sender_pays_exactly_the_gas_fee() {
		let test = simple_tx_test();

		// gas_price 10 * intrinsic 21000 = 210000 leaves the sender
		let fee = U256::from(10) * U256::from(TX_INTRINSIC_GAS);
		assert_eq!(
			test.post[&TEST_ADDRESS].balance,
			test.pre[&TEST_ADDRESS].balance - fee
		);
		assert_eq!(test.post[&TEST_ADDRESS].nonce, U256::one());
	}

	#[test]
	fn recipient_balance_is_unchanged() {
		let test = simple_tx_test();
		let recipient = to_address(0xaa);

		assert_eq!(test.tx.to, Some(recipient));
		assert_eq!(test.tx.value, U256::zero());
		assert_eq!(test.pre[&recipient].balance, test.post[&recipient].balance);
	}

	#[test]
	fn coinbase_earns_the_priority_fee_only() {
		let test = simple_tx_test();

		// tip (10 - 7) * 21000 = 63000; the burned base fee goes to no account
		assert_eq!(test.post[&test.env.coinbase].balance, U256::from(63_000));
	}

	#[test]
	fn transfer_fills_for_every_covered_fork() {
		let test = simple_tx_test();
		let fixture = test.fill(&Fork::ALL).unwrap();

		assert_eq!(fixture.post.len(), Fork::ALL.len());
		assert_eq!(fixture.transaction.sender, TEST_ADDRESS);
		assert_eq!(fixture.transaction.to, Some(to_address(0xaa)));
		assert_eq!(
			fixture.transaction.gas_limit,
			vec![U256::from(TX_INTRINSIC_GAS)]
		);

		// one post state per fork, all identical since the state diff
		// does not depend on the fork
		for states in fixture.post.values() {
			assert_eq!(states.len(), 1);
			assert_eq!(states[0].hash, fixture.post[&Fork::London][0].hash);
		}
	}
}
