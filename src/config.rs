use alloy::primitives::{Address, U256};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::{fs::File, io::BufReader};

use eyre::{Result, WrapErr, bail};
use serde_derive::Deserialize;

use clap_serde_derive::{
    ClapSerde,
    clap::{self, Args, Parser, Subcommand},
};

use crate::network::NetworkConfig;

pub const DEFAULT_LOG_LEVEL: u8 = 3;
pub const DEFAULT_NETWORK: &str = "gnosis";

fn config_file() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| String::from("~/.config"));
    PathBuf::from(shellexpand::tilde(&base).to_string())
        .join("deposit-batcher")
        .join("config.toml")
}

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Config file
    #[arg(short, long = "config", default_value = config_file().into_os_string())]
    pub config_path: Option<PathBuf>,

    /// Global arguments
    #[command(flatten)]
    pub config: <CliArgs as ClapSerde>::Opt,

    // Subcommands
    #[command(subcommand)]
    pub command: CliCmd,
}

// Make sure all values are optional or parsing fails if a value
// is missing in the config file
#[derive(Debug, Clone, ClapSerde, Deserialize)]
pub struct CliArgs {
    /// Logging level, 0 (critical) to 5 (trace) [default: 3]
    #[arg(short, long = "log-level", required = false)]
    pub log_level: Option<u8>,

    /// Network preset name or chain id [default: gnosis]
    #[arg(short, long, required = false)]
    pub network: Option<String>,

    /// JsonRPC URL, used to read the token balance
    #[arg(long = "rpc-url", required = false)]
    pub rpc_url: Option<String>,

    /// GraphQL endpoint indexing deposit contract events
    #[arg(long = "indexer-url", required = false)]
    pub indexer_url: Option<String>,

    /// Override the network's validators per batch
    #[arg(long = "max-batch-size", required = false)]
    pub max_batch_size: Option<usize>,
}

impl CliArgs {
    pub fn log_level(&self) -> u8 {
        self.log_level.unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Preset selected by `network` with the configured overrides applied
    pub fn network_config(&self) -> Result<NetworkConfig> {
        let mut network =
            NetworkConfig::preset(self.network.as_deref().unwrap_or(DEFAULT_NETWORK))?;
        if let Some(max_batch_size) = self.max_batch_size {
            network = network.with_max_batch_size(max_batch_size)?;
        }
        if let Some(url) = self.indexer_url.as_deref() {
            network = network.with_indexer_url(url)?;
        }
        Ok(network)
    }
}

// Command line cmds
#[derive(Subcommand)]
pub enum CliCmd {
    /// Print version information
    #[clap(visible_alias = "ver")]
    Version {},
    /// List built-in networks
    #[clap(visible_alias = "net")]
    Networks {},
    /// Validate a deposit data file and print the resulting batches
    #[clap(visible_alias = "v")]
    Validate {
        /// deposit_data-*.json produced by the staking deposit CLI
        #[arg(required = true)]
        file: PathBuf,
        #[command(flatten)]
        balance: BalanceArgs,
    },
    /// Validate a deposit data file and build the unsigned transactions
    #[clap(visible_alias = "p")]
    Plan {
        #[arg(required = true)]
        file: PathBuf,
        #[command(flatten)]
        balance: BalanceArgs,
        /// Write the plan as JSON instead of printing it
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct BalanceArgs {
    /// Spendable token balance in wei
    #[arg(long, conflicts_with = "owner")]
    pub balance: Option<U256>,
    /// Read the spendable balance of this address over --rpc-url
    #[arg(long)]
    pub owner: Option<Address>,
}

pub fn merge_args_from_file<T>(
    args: <T as ClapSerde>::Opt,
    maybe_path: Option<PathBuf>,
) -> Result<T>
where
    T: ClapSerde + serde::de::DeserializeOwned,
{
    match maybe_path {
        Some(path) => {
            let config_path = std::path::Path::new(&path);
            match config_path.exists() {
                true => {
                    let config = match config_path.extension().and_then(OsStr::to_str) {
                        Some("toml") => read_toml_config::<T, _>(config_path),
                        Some("json") => read_json_config::<T, _>(config_path),
                        Some("jsonc") => read_jsonc_config::<T, _>(config_path),
                        _ => {
                            bail!("Unsupported config file type: {:?}", path);
                        }
                    }?;
                    // Values given on the command line win over the file
                    Ok(T::from(config).merge(args))
                }
                false => Ok(T::from(args)),
            }
        }
        None => Ok(T::from(args)),
    }
}

fn read_toml_config<T, P>(path: P) -> Result<<T as ClapSerde>::Opt>
where
    P: AsRef<std::path::Path> + std::fmt::Debug + Copy,
    T: ClapSerde + serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path).wrap_err_with(|| format!("{:?}", path))?;
    Ok(toml::from_str(&content).wrap_err_with(|| format!("{:?}", path))?)
}

fn read_json_config<T: ClapSerde, P>(path: P) -> Result<<T as ClapSerde>::Opt>
where
    P: AsRef<std::path::Path> + std::fmt::Debug + Copy,
{
    let f = File::open(path).wrap_err_with(|| format!("{:?}", path))?;
    Ok(serde_json::from_reader::<_, <T as ClapSerde>::Opt>(
        BufReader::new(f),
    )?)
}

fn read_jsonc_config<T: ClapSerde, P>(path: P) -> Result<<T as ClapSerde>::Opt>
where
    P: AsRef<std::path::Path> + std::fmt::Debug + Copy,
{
    let f = File::open(path).wrap_err_with(|| format!("{:?}", path))?;
    Ok(serde_jsonc::from_reader::<_, <T as ClapSerde>::Opt>(
        BufReader::new(f),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_config(ext: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "deposit-batcher-config-{}-{}.{}",
            std::process::id(),
            ext,
            ext
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn cli_overrides_file() {
        let path = tmp_config(
            "toml",
            r#"
            network = "chiado"
            max_batch_size = 16
            indexer_url = "http://localhost:8080/v1/graphql"
            "#,
        );
        let cli = Cli::parse_from([
            "deposit-batcher",
            "--max-batch-size",
            "4",
            "networks",
        ]);
        let args = merge_args_from_file::<CliArgs>(cli.config, Some(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(args.network.as_deref(), Some("chiado"));
        assert_eq!(args.max_batch_size, Some(4));
        assert_eq!(args.log_level(), DEFAULT_LOG_LEVEL);

        let network = args.network_config().unwrap();
        assert_eq!(network.chain_id, 10200);
        assert_eq!(network.max_batch_size, 4);
        assert_eq!(
            network.indexer_url.unwrap().as_str(),
            "http://localhost:8080/v1/graphql"
        );
    }

    #[test]
    fn json_config() {
        let path = tmp_config("json", r#"{ "log_level": 5, "network": "100" }"#);
        let cli = Cli::parse_from(["deposit-batcher", "version"]);
        let args = merge_args_from_file::<CliArgs>(cli.config, Some(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(args.log_level(), 5);
        assert_eq!(args.network_config().unwrap().name, "gnosis");
    }

    #[test]
    fn missing_file_uses_args() {
        let cli = Cli::parse_from(["deposit-batcher", "-n", "chiado", "version"]);
        let args = merge_args_from_file::<CliArgs>(
            cli.config,
            Some(PathBuf::from("/nonexistent/deposit-batcher.toml")),
        )
        .unwrap();
        assert_eq!(args.network.as_deref(), Some("chiado"));
        assert_eq!(args.network_config().unwrap().max_batch_size, 128);
    }

    #[test]
    fn zero_batch_size_rejected() {
        let cli = Cli::parse_from(["deposit-batcher", "--max-batch-size", "0", "version"]);
        let args = merge_args_from_file::<CliArgs>(cli.config, None).unwrap();
        assert!(args.network_config().is_err());
    }

    #[test]
    fn balance_and_owner_conflict() {
        let res = Cli::try_parse_from([
            "deposit-batcher",
            "validate",
            "deposit_data.json",
            "--balance",
            "1",
            "--owner",
            "0x1111111111111111111111111111111111111111",
        ]);
        assert!(res.is_err());

        let cli = Cli::parse_from([
            "deposit-batcher",
            "plan",
            "deposit_data.json",
            "--balance",
            "64000000000000000000",
            "-o",
            "plan.json",
        ]);
        match cli.command {
            CliCmd::Plan { balance, out, .. } => {
                assert_eq!(balance.balance, Some(U256::from(64) * U256::from(10).pow(U256::from(18))));
                assert_eq!(out, Some(PathBuf::from("plan.json")));
            }
            _ => panic!("expected plan"),
        }
    }
}
