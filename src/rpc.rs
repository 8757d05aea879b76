use alloy::{
    primitives::{Address, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
};
use colored::*;
use eyre::{Result, WrapErr, bail};
use log::*;

use crate::{network::NetworkConfig, submission::IERC677};

/// Thin JSON-RPC client used to snapshot the spendable token balance
pub struct Client {
    pub rpc_url: String,
    provider: DynProvider,
    chain_id: u64,
}

impl Client {
    pub async fn connect(url: &str) -> Result<Client> {
        if url.trim().is_empty() {
            bail!("must specify a valid --rpc-url")
        };

        let provider = DynProvider::new(
            ProviderBuilder::new()
                .connect(url)
                .await
                .wrap_err_with(|| format!("Connect failed to '{}'", url))?,
        );
        let chain_id = provider.get_chain_id().await?;
        let height = provider.get_block_number().await?;

        debug!(
            "Connected to {} {}:{} {}:{}",
            url.green().bold(),
            "chainId".white().bold(),
            format!("{:?}", chain_id).blue(),
            "height".white().bold(),
            format!("{:?}", height).blue(),
        );

        Ok(Client {
            rpc_url: url.to_string(),
            provider,
            chain_id,
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Refuses to read balances from a node of another network
    pub fn ensure_network(&self, network: &NetworkConfig) -> Result<&Self> {
        if self.chain_id != network.chain_id {
            bail!(
                "RPC node is on chain {} but network '{}' expects chain {}",
                self.chain_id,
                network.name,
                network.chain_id
            )
        }
        Ok(self)
    }

    /// ERC-677 `balanceOf(owner)` on the network's staking token
    pub async fn token_balance(&self, network: &NetworkConfig, owner: Address) -> Result<U256> {
        self.ensure_network(network)?;
        let token = IERC677::new(network.token, self.provider.clone());
        let balance = token
            .balanceOf(owner)
            .call()
            .await
            .wrap_err_with(|| format!("balanceOf({}) failed on {}", owner, network.token))?;
        debug!("{} token balance: {} wei", owner, balance);
        Ok(balance)
    }
}
