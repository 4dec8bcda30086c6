use clap::ValueEnum;
use primitive_types::H160;
use serde::{Deserialize, Serialize};

/// Forks the suite can emit fixtures for, oldest first.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Deserialize, Serialize, ValueEnum)]
pub enum Fork {
	London,
	Merge,
	Shanghai,
	Cancun,
	Prague,
}

impl Fork {
	/// All supported forks, oldest first.
	pub const ALL: [Fork; 5] = [
		Fork::London,
		Fork::Merge,
		Fork::Shanghai,
		Fork::Cancun,
		Fork::Prague,
	];

	/// Block headers carry a base fee from London on.
	pub const fn header_base_fee_required(self) -> bool {
		true
	}

	/// Difficulty is replaced by the beacon mix digest from the Merge on.
	pub fn header_prev_randao_required(self) -> bool {
		self >= Fork::Merge
	}

	/// Block headers commit to a withdrawals trie from Shanghai on.
	pub fn header_withdrawals_required(self) -> bool {
		self >= Fork::Shanghai
	}

	/// Block headers track blob gas from Cancun on.
	pub fn header_excess_blob_gas_required(self) -> bool {
		self >= Fork::Cancun
	}

	/// Block headers carry the parent beacon block root from Cancun on.
	pub fn header_beacon_root_required(self) -> bool {
		self >= Fork::Cancun
	}

	/// Transaction envelope types valid at this fork.
	pub fn tx_types(self) -> &'static [u8] {
		match self {
			Fork::London | Fork::Merge | Fork::Shanghai => &[0, 1, 2],
			Fork::Cancun => &[0, 1, 2, 3],
			Fork::Prague => &[0, 1, 2, 3, 4],
		}
	}

	/// Addresses of the precompiled contracts active at this fork.
	pub fn precompiles(self) -> Vec<H160> {
		let last = match self {
			Fork::London | Fork::Merge | Fork::Shanghai => 0x09,
			Fork::Cancun => 0x0a,
			Fork::Prague => 0x11,
		};
		(0x01..=last).map(H160::from_low_u64_be).collect()
	}
}
