#[cfg(test)]
mod execution_tests {
	use csr_statetests::eip6968::{calc_revenue, test_cases, to_address, TEST_ADDRESS};
	use csr_statetests::filler::TX_INTRINSIC_GAS;
	use csr_statetests::fork::Fork;
	use primitive_types::U256;

	#[test]
	fn every_case_fills_at_every_fork() {
		for case in test_cases() {
			let test = case.state_test().unwrap();
			let fixture = test.fill(&Fork::ALL).unwrap();
			assert_eq!(fixture.post.len(), Fork::ALL.len(), "{}", case.name);
		}
	}

	#[test]
	fn posted_balances_follow_the_formula() {
		for case in test_cases() {
			let test = case.state_test().unwrap();
			for (address, account) in &case.accounts {
				assert_eq!(
					test.post[address].balance,
					calc_revenue(test.env.base_fee, account.gas_used),
					"{}",
					case.name
				);
			}
		}
	}

	#[test]
	fn add_case_revenue_at_base_fee_seven() {
		let cases = test_cases();
		let add = cases
			.iter()
			.find(|case| case.name == "simply add two numbers")
			.unwrap();
		let test = add.state_test().unwrap();

		// 9 gas * base fee 7 // 5 = 12
		assert_eq!(test.env.base_fee, U256::from(7));
		assert_eq!(test.post[&to_address(0x100)].balance, U256::from(12));
	}

	#[test]
	fn out_of_gas_case_still_earns_declared_revenue() {
		let cases = test_cases();
		let oog = cases.iter().find(|case| case.name == "out-of-gas").unwrap();
		let test = oog.state_test().unwrap();

		// the limit grants the frame 4 gas against a 9 gas program; the
		// frame dies but the 4 gas it burned still pays 4 * 7 // 5 = 5
		assert_eq!(oog.gas_limit(), TX_INTRINSIC_GAS + 4);
		assert_eq!(test.tx.gas_limit, U256::from(21004));
		assert_eq!(test.post[&to_address(0x100)].balance, U256::from(5));
	}

	#[test]
	fn call_case_pays_each_frame_its_own_share() {
		let cases = test_cases();
		let call = cases.iter().find(|case| case.name == "simple call").unwrap();
		let test = call.state_test().unwrap();

		// caller 2619 * 7 // 5 = 3666, callee 5 * 7 // 5 = 7
		assert_eq!(test.post[&to_address(0x100)].balance, U256::from(3666));
		assert_eq!(test.post[&to_address(0x200)].balance, U256::from(7));

		// the whole allowance is 2619 + 5 on top of the intrinsic cost
		assert_eq!(test.tx.gas_limit, U256::from(23624));
	}

	#[test]
	fn sender_is_charged_the_full_allowance() {
		// the programs consume their limit exactly (or die trying), so the
		// sender always pays gas_price * gas_limit with nothing refunded
		for case in test_cases() {
			let test = case.state_test().unwrap();
			assert_eq!(
				test.post[&TEST_ADDRESS].balance,
				test.pre[&TEST_ADDRESS].balance - test.tx.gas_price * test.tx.gas_limit,
				"{}",
				case.name
			);
			assert_eq!(test.post[&TEST_ADDRESS].nonce, U256::one());
		}
	}

	#[test]
	fn contracts_keep_their_code_and_stay_at_nonce_zero() {
		for case in test_cases() {
			let test = case.state_test().unwrap();
			for address in case.accounts.keys() {
				assert_eq!(test.pre[address].code, test.post[address].code);
				assert_eq!(test.post[address].nonce, U256::zero());
				assert!(test.pre[address].balance.is_zero());
			}
		}
	}

	#[test]
	fn transactions_enter_at_the_first_account() {
		for case in test_cases() {
			let test = case.state_test().unwrap();
			assert_eq!(test.tx.to, Some(case.entry().unwrap()), "{}", case.name);
			assert!(test.tx.data.is_empty());
			assert_eq!(test.tx.value, U256::zero());
		}
	}
}
