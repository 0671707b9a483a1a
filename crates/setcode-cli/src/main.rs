//! CLI entry point for the set-code transaction sender.
//!
//! Builds, signs, and submits EIP-7702 set-code transactions: point an
//! externally-owned account's code at a delegate contract, clear an
//! existing delegation, or inspect the code currently stored at an
//! account.

use alloy_primitives::{Address, Bytes, U256};
use clap::{Parser, Subcommand};
use setcode_account::{LocalSigner, Signer};
use setcode_config::Config;
use setcode_delivery::{HttpTransport, NodeClient};
use setcode_types::{with_0x_prefix, without_0x_prefix};
use std::path::PathBuf;
use std::time::Duration;

mod pipeline;

use pipeline::SubmitOptions;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Delegate the sender's code to a contract and optionally execute
	/// calldata against the freshly delegated account.
	Delegate {
		/// Address of the delegate contract
		#[arg(long)]
		delegate: String,
		/// ABI-encoded calldata to execute, as hex
		#[arg(long)]
		calldata: Option<String>,
		/// Value in wei to attach to the transaction
		#[arg(long)]
		value: Option<String>,
	},
	/// Clear any existing delegation by authorizing the zero address.
	Revoke,
	/// Print the code currently stored at an account (defaults to the
	/// sender).
	Code {
		/// Account to inspect
		#[arg(long)]
		address: Option<String>,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt().with_env_filter(env_filter).with_target(true).init();

	let config = Config::from_file(&args.config)?;
	let signer = LocalSigner::from_secret(&config.account.private_key)?;
	let client = NodeClient::new(HttpTransport::new(config.node.rpc_url.clone()));
	let poll_interval = Duration::from_millis(config.node.poll_interval_ms);

	match args.command {
		Command::Delegate {
			delegate,
			calldata,
			value,
		} => {
			let delegate: Address = delegate.parse()?;
			let data = match calldata {
				Some(hex_str) => Bytes::from(hex::decode(without_0x_prefix(&hex_str))?),
				None => Bytes::new(),
			};
			let value = match value {
				Some(v) => U256::from_str_radix(&v, 10)?,
				None => U256::ZERO,
			};

			let receipt = pipeline::send_set_code(
				&client,
				&signer,
				delegate,
				SubmitOptions {
					gas_limit: config.transaction.gas_limit,
					value,
					data,
					poll_interval,
				},
			)
			.await?;

			tracing::info!(
				block = receipt.block_number,
				success = receipt.success,
				"Delegation transaction mined"
			);
			log_account_code(&client, signer.address()).await?;
		}
		Command::Revoke => {
			tracing::info!(sender = %signer.address(), "Removing account code");
			log_account_code(&client, signer.address()).await?;

			let receipt = pipeline::send_set_code(
				&client,
				&signer,
				Address::ZERO,
				SubmitOptions {
					gas_limit: config.transaction.gas_limit,
					value: U256::ZERO,
					data: Bytes::new(),
					poll_interval,
				},
			)
			.await?;

			tracing::info!(
				block = receipt.block_number,
				success = receipt.success,
				"Revocation transaction mined"
			);
			log_account_code(&client, signer.address()).await?;
		}
		Command::Code { address } => {
			let address = match address {
				Some(a) => a.parse()?,
				None => signer.address(),
			};
			log_account_code(&client, address).await?;
		}
	}

	Ok(())
}

async fn log_account_code(
	client: &NodeClient<HttpTransport>,
	address: Address,
) -> Result<(), setcode_delivery::DeliveryError> {
	let code = client.code_at(address).await?;
	tracing::info!(
		account = %address,
		code = %with_0x_prefix(&hex::encode(&code)),
		"Account code"
	);
	Ok(())
}
