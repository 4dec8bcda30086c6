use primitive_types::U256;

/// Opcode newtype. One-to-one corresponding to an `u8` value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Opcode(pub u8);

impl Opcode {
	/// `STOP`
	pub const STOP: Opcode = Opcode(0x00);
	/// `ADD`
	pub const ADD: Opcode = Opcode(0x01);

	/// `ORIGIN`
	pub const ORIGIN: Opcode = Opcode(0x32);
	/// `GASPRICE`
	pub const GASPRICE: Opcode = Opcode(0x3a);
	/// `RETURNDATASIZE`
	pub const RETURNDATASIZE: Opcode = Opcode(0x3d);

	/// `COINBASE`
	pub const COINBASE: Opcode = Opcode(0x41);
	/// `NUMBER`
	pub const NUMBER: Opcode = Opcode(0x43);
	/// `BASEFEE`
	pub const BASEFEE: Opcode = Opcode(0x48);

	/// `POP`
	pub const POP: Opcode = Opcode(0x50);

	/// `PUSH0`
	pub const PUSH0: Opcode = Opcode(0x5f);
	/// `PUSH1`
	pub const PUSH1: Opcode = Opcode(0x60);
	/// `PUSH2`
	pub const PUSH2: Opcode = Opcode(0x61);
	/// `PUSH32`
	pub const PUSH32: Opcode = Opcode(0x7f);

	/// `CALL`
	pub const CALL: Opcode = Opcode(0xf1);
}

/// Builder for the small handwritten programs the test accounts run.
///
/// Value pushes always use the narrowest `PUSH1`..`PUSH32` form and never
/// `PUSH0`, so the same bytes stay valid from London on.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Bytecode(Vec<u8>);

impl Bytecode {
	pub fn new() -> Self {
		Self(Vec::new())
	}

	/// Append a bare opcode.
	pub fn opcode(mut self, opcode: Opcode) -> Self {
		self.0.push(opcode.0);
		self
	}

	/// Append the narrowest push of `value`.
	pub fn pushv(mut self, value: impl Into<U256>) -> Self {
		let value: U256 = value.into();
		let len = ((value.bits() + 7) / 8).max(1);
		self.0.push(Opcode::PUSH1.0 + (len as u8 - 1));
		let mut word = [0u8; 32];
		value.to_big_endian(&mut word);
		self.0.extend_from_slice(&word[32 - len..]);
		self
	}

	pub fn build(self) -> Vec<u8> {
		self.0
	}
}
