#[macro_use]
extern crate log;

use alloy::primitives::U256;
use clap::Parser;
use colored::*;
use eyre::{Result, WrapErr, bail};
use std::path::Path;

use deposit_batcher::{
    batch::ValidationResult,
    config::{self, BalanceArgs, Cli, CliArgs, CliCmd},
    helpers::{self, depositdata},
    indexer::GraphQlIndexer,
    logger::Logger,
    network::NetworkConfig,
    rpc::Client,
    submission::SubmissionPlan,
    validator,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Install a backtrace hook
    // stable_eyre::install()?;

    // Parse args with clap
    let args = Cli::parse();

    // Load config file, command line args take precedence
    let config = config::merge_args_from_file::<CliArgs>(args.config, args.config_path)?;

    // Setup our global logger
    let logger = Logger::new(config.log_level());
    logger.set_global()?;

    cmd_dispatch(&config, &args.command).await
}

async fn cmd_dispatch(config: &CliArgs, cmd: &CliCmd) -> Result<()> {
    match cmd {
        CliCmd::Version {} => {
            println!(
                "{} {}",
                env!("CARGO_PKG_NAME").green().bold(),
                env!("CARGO_PKG_VERSION").blue()
            );
            Ok(())
        }
        CliCmd::Networks {} => {
            for network in NetworkConfig::presets() {
                println!(
                    "{:<8} {:<14} {} {}",
                    network.name.white().bold(),
                    format!("chainId:{}", network.chain_id).blue(),
                    format!("fork:{}", network.fork_version).magenta(),
                    format!("deposit:{}", network.deposit_contract).green(),
                );
            }
            Ok(())
        }
        CliCmd::Validate { file, balance } => {
            let network = config.network_config()?;
            let result = validate_file(config, &network, file, balance).await?;
            print!("{}", result.sprintf_summary(&filename(file), &network));
            Ok(())
        }
        CliCmd::Plan { file, balance, out } => {
            let network = config.network_config()?;
            let result = validate_file(config, &network, file, balance).await?;
            print!("{}", result.sprintf_summary(&filename(file), &network));
            let plan = SubmissionPlan::new(&result, &network, balance.owner);
            match out {
                Some(path) => {
                    helpers::json::write_pretty(path, &plan)?;
                    println!(
                        "{} {} {}{}{}",
                        "Plan with".white(),
                        plan.transactions.len().to_string().red(),
                        "transactions succesfully written to \"".white(),
                        path.display().to_string().green(),
                        "\".".white(),
                    );
                }
                None => println!("{}", serde_json::to_string_pretty(&plan)?),
            }
            Ok(())
        }
    }
}

async fn validate_file(
    config: &CliArgs,
    network: &NetworkConfig,
    file: &Path,
    balance_args: &BalanceArgs,
) -> Result<ValidationResult> {
    let payload = helpers::json::read_to_string(file)?;
    let deposits = depositdata::parse_deposit_file(&payload)?;
    let balance = resolve_balance(config, network, balance_args).await?;
    debug!(
        "{}: {} deposits, balance {} {}",
        filename(file),
        deposits.len(),
        helpers::format_token(&balance),
        network.token_symbol
    );

    let indexer_url = match &network.indexer_url {
        Some(url) => url.clone(),
        None => bail!("must specify a valid --indexer-url"),
    };
    let indexer = GraphQlIndexer::new(reqwest::Client::new(), indexer_url);

    validator::validate(&deposits, balance, &network.context()?, &indexer)
        .await
        .wrap_err_with(|| format!("{} rejected", filename(file)))
}

// Explicit `--balance` wins, otherwise query the token contract
async fn resolve_balance(
    config: &CliArgs,
    network: &NetworkConfig,
    balance_args: &BalanceArgs,
) -> Result<U256> {
    if let Some(balance) = balance_args.balance {
        return Ok(balance);
    }
    match (&config.rpc_url, balance_args.owner) {
        (Some(rpc_url), Some(owner)) => {
            Client::connect(rpc_url)
                .await?
                .token_balance(network, owner)
                .await
        }
        _ => bail!("Balance not loaded correctly. Use --balance, or --owner with --rpc-url"),
    }
}

fn filename(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
