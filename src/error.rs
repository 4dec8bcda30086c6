use thiserror::Error;

/// Reasons a declared test cannot be turned into a fixture.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FillError {
	#[error("fork is below the first fork the test is valid from")]
	UnsupportedFork,
	#[error("transaction gas limit is below intrinsic gas")]
	IntrinsicGas,
	#[error("sender cannot cover gas limit and value upfront")]
	OutOfFund,
	#[error("transaction gas limit exceeds block gas limit")]
	GasLimitReached,
	#[error("gas price is below block base fee")]
	GasPriceLessThanBaseFee,
	#[error("pre state account collides with a precompile")]
	PrecompileCollision,
	#[error("transaction type is not supported by a covered fork")]
	TxTypeNotSupported,
	#[error("test case declares no account to call into")]
	NoEntryAccount,
	#[error("invalid secret key")]
	InvalidSecretKey,
	#[error("signature does not recover to a sender")]
	InvalidSignature,
}

#[derive(Error, Debug)]
pub enum TestError {
	#[error("fixture is missing test {0}")]
	MissingTest(String),
	#[error("fixture for test {0} differs from the declared state")]
	FixtureMismatch(String),
	#[error("fixture file contains unknown test {0}")]
	UnknownTest(String),
}

#[derive(Error, Debug)]
pub enum Error {
	#[error("io error")]
	IO(#[from] std::io::Error),
	#[error("json error")]
	JSON(#[from] serde_json::Error),
	#[error("non utf8 filename")]
	NonUtf8Filename,
	#[error("fill error")]
	Fill(#[from] FillError),
	#[error("test error")]
	Test(#[from] TestError),
}
