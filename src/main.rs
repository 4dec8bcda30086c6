use std::{fs, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};

use csr_statetests::{eip6968, error::Error, filler, fork::Fork, types::CheckStatus};

/// Contract Secured Revenue state test utilities
#[derive(Parser)]
#[command(name = "csr-statetests", version, about)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Fill the test suite and write the fixture file
	Fill {
		/// Output fixture file
		#[arg(short, long, default_value = "fixtures/eip6968.json")]
		out: PathBuf,

		/// Fill for a single fork instead of all supported forks
		#[arg(long, value_enum)]
		fork: Option<Fork>,
	},
	/// Re-fill the suite in memory and compare against existing fixtures
	Check {
		/// Fixture file or directory of fixture files
		path: PathBuf,

		/// Check against a single fork instead of all supported forks
		#[arg(long, value_enum)]
		fork: Option<Fork>,
	},
}

fn forks(fork: Option<Fork>) -> Vec<Fork> {
	match fork {
		Some(fork) => vec![fork],
		None => Fork::ALL.to_vec(),
	}
}

fn run(cli: Cli) -> Result<CheckStatus, Error> {
	let tests = eip6968::suite()?;

	match cli.command {
		Command::Fill { out, fork } => {
			if let Some(dir) = out.parent() {
				if !dir.as_os_str().is_empty() {
					fs::create_dir_all(dir)?;
				}
			}
			let filename = out.to_str().ok_or(Error::NonUtf8Filename)?;
			filler::write_fixtures(&tests, &forks(fork), filename)
		}
		Command::Check { path, fork } => {
			let filename = path.to_str().ok_or(Error::NonUtf8Filename)?;
			filler::check_single(&tests, &forks(fork), filename)
		}
	}
}

fn main() -> ExitCode {
	env_logger::init();

	match run(Cli::parse()) {
		Ok(status) => {
			status.print_total();
			if status.is_clean() {
				ExitCode::SUCCESS
			} else {
				ExitCode::FAILURE
			}
		}
		Err(err) => {
			eprintln!("ERROR: {err:?}");
			ExitCode::FAILURE
		}
	}
}
