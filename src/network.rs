use alloy::primitives::{Address, FixedBytes, U256, utils::Unit};
use eyre::{Result, bail};
use log::*;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use url::Url;

use crate::macros::{fork_version, parse_address};

/// Deposit CLI amount of a pre-pectra deposit, 32 tokens in gwei
pub const LEGACY_DEPOSIT_AMOUNT: u64 = 32_000_000_000;

/// Validators per `batchDeposit` call
pub const MAX_BATCH_DEPOSIT: usize = 128;

/// Everything the pipeline and the submission plan need to know about a
/// network. Passed around explicitly, never stored in a global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
    pub fork_version: FixedBytes<4>,
    pub deposit_contract: Address,
    pub token: Address,
    pub token_symbol: String,
    pub legacy_unit: u64,
    /// Token base units (wei) paid per legacy unit deposited
    pub scaling: U256,
    pub max_batch_size: usize,
    pub indexer_url: Option<Url>,
}

/// The constants a single validation run depends on. Only built through
/// `new`, so the legacy unit and the batch size are never zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    expected_fork_version: FixedBytes<4>,
    chain_id: u64,
    legacy_unit: u64,
    max_batch_size: usize,
    scaling: U256,
}

impl ValidationContext {
    pub fn new(
        expected_fork_version: FixedBytes<4>,
        chain_id: u64,
        legacy_unit: u64,
        max_batch_size: usize,
        scaling: U256,
    ) -> Result<Self> {
        if legacy_unit == 0 {
            bail!("legacy deposit amount must be greater than zero")
        }
        if max_batch_size == 0 {
            bail!("max batch size must be greater than zero")
        }
        Ok(Self {
            expected_fork_version,
            chain_id,
            legacy_unit,
            max_batch_size,
            scaling,
        })
    }

    pub fn expected_fork_version(&self) -> FixedBytes<4> {
        self.expected_fork_version
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn legacy_unit(&self) -> u64 {
        self.legacy_unit
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn scaling(&self) -> U256 {
        self.scaling
    }

    /// Token amount required for a deposit of `amount` (deposit CLI units),
    /// fractions of a legacy unit are not charged
    pub fn scaled(&self, amount: u64) -> U256 {
        U256::from(amount / self.legacy_unit) * self.scaling
    }
}

impl NetworkConfig {
    pub fn context(&self) -> Result<ValidationContext> {
        ValidationContext::new(
            self.fork_version,
            self.chain_id,
            self.legacy_unit,
            self.max_batch_size,
            self.scaling,
        )
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Result<Self> {
        if max_batch_size == 0 {
            bail!("max batch size must be greater than zero")
        }
        self.max_batch_size = max_batch_size;
        Ok(self)
    }

    pub fn with_indexer_url(mut self, url: &str) -> Result<Self> {
        self.indexer_url = Some(
            url.parse::<Url>()
                .map_err(|e| eyre::eyre!("invalid indexer url '{}': {}", url, e))?,
        );
        Ok(self)
    }

    /// Lookup a preset by name (case insensitive) or chain id
    pub fn preset(name_or_id: &str) -> Result<Self> {
        let key = name_or_id.trim().to_lowercase();
        let found = match key.parse::<u64>() {
            Ok(id) => PRESETS.values().find(|n| n.chain_id == id),
            Err(_) => PRESETS.get(key.as_str()),
        };
        match found {
            Some(network) => {
                trace!("{:#?}", network);
                Ok(network.clone())
            }
            None => bail!(
                "Unknown network '{}', expected one of: {}",
                name_or_id,
                PRESETS.keys().cloned().collect::<Vec<_>>().join(", ")
            ),
        }
    }

    pub fn presets() -> impl Iterator<Item = &'static NetworkConfig> {
        PRESETS.values()
    }
}

static PRESETS: Lazy<BTreeMap<&'static str, NetworkConfig>> = Lazy::new(|| {
    let mut m = BTreeMap::new();
    m.insert("gnosis", NETWORK_GNOSIS.clone());
    m.insert("chiado", NETWORK_CHIADO.clone());
    m
});

static NETWORK_GNOSIS: Lazy<NetworkConfig> = Lazy::new(|| NetworkConfig {
    name: "gnosis".to_string(),
    chain_id: 100,
    fork_version: fork_version!("0x00000064"),
    deposit_contract: parse_address!("0x0B98057eA310F4d31F2a452B414647007d1645d9"),
    token: parse_address!("0x9C58BAcC331c9aa871AFD802DB6379a98e80CEdb"),
    token_symbol: "GNO".to_string(),
    legacy_unit: LEGACY_DEPOSIT_AMOUNT,
    scaling: Unit::ETHER.wei(),
    max_batch_size: MAX_BATCH_DEPOSIT,
    indexer_url: None,
});

static NETWORK_CHIADO: Lazy<NetworkConfig> = Lazy::new(|| NetworkConfig {
    name: "chiado".to_string(),
    chain_id: 10200,
    fork_version: fork_version!("0x0000006f"),
    deposit_contract: parse_address!("0xb97036A26259B7147018913bD58a774cf91acf25"),
    token: parse_address!("0x19C653Da7c37c66208fbfbE8908A5051B57b4C70"),
    token_symbol: "GNO".to_string(),
    legacy_unit: LEGACY_DEPOSIT_AMOUNT,
    scaling: Unit::ETHER.wei(),
    max_batch_size: MAX_BATCH_DEPOSIT,
    indexer_url: None,
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_by_name_or_id() {
        let by_name = NetworkConfig::preset("Gnosis").unwrap();
        let by_id = NetworkConfig::preset("100").unwrap();
        assert_eq!(by_name, by_id);
        assert_eq!(by_name.fork_version, FixedBytes::from([0, 0, 0, 0x64]));

        let chiado = NetworkConfig::preset("10200").unwrap();
        assert_eq!(chiado.name, "chiado");
        assert!(NetworkConfig::preset("mainnet").is_err());
    }

    #[test]
    fn scaled_amount_floors_legacy_units() {
        let ctx = NetworkConfig::preset("gnosis").unwrap().context().unwrap();
        assert_eq!(ctx.scaled(LEGACY_DEPOSIT_AMOUNT), Unit::ETHER.wei());
        assert_eq!(
            ctx.scaled(2 * LEGACY_DEPOSIT_AMOUNT),
            U256::from(2) * Unit::ETHER.wei()
        );
        // 48 tokens only pays for one full legacy unit
        assert_eq!(ctx.scaled(48_000_000_000), Unit::ETHER.wei());
        assert_eq!(ctx.scaled(1_000_000_000), U256::ZERO);
    }

    #[test]
    fn overrides() {
        let network = NetworkConfig::preset("chiado").unwrap();
        assert!(network.clone().with_max_batch_size(0).is_err());
        let network = network
            .with_max_batch_size(2)
            .unwrap()
            .with_indexer_url("http://localhost:8080/v1/graphql")
            .unwrap();
        assert_eq!(network.context().unwrap().max_batch_size(), 2);
        assert!(network.indexer_url.is_some());
    }

    #[test]
    fn rejects_zero_constants() {
        let fork = FixedBytes::from([0, 0, 0, 0x64]);
        let scaling = Unit::ETHER.wei();
        let err = ValidationContext::new(fork, 100, 0, 128, scaling).unwrap_err();
        assert!(err.to_string().contains("legacy deposit amount"));
        let err = ValidationContext::new(fork, 100, LEGACY_DEPOSIT_AMOUNT, 0, scaling).unwrap_err();
        assert!(err.to_string().contains("max batch size"));

        // fields are public on the network, the context still refuses them
        let mut network = NetworkConfig::preset("gnosis").unwrap();
        network.legacy_unit = 0;
        assert!(network.context().is_err());
        let mut network = NetworkConfig::preset("gnosis").unwrap();
        network.max_batch_size = 0;
        assert!(network.context().is_err());
    }
}
