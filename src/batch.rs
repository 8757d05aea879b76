use alloy::primitives::{B256, Bytes, U256};
use colored::*;
use serde::Serialize;

use crate::{
    credentials::CredentialType,
    helpers::{self, depositdata::DepositRecord},
    macros::format_field,
    network::{NetworkConfig, ValidationContext},
};

/// Deposits submitted together in one `batchDeposit` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Batch {
    pub deposits: Vec<DepositRecord>,
    /// Staking token base units the batch transfers
    pub total_amount: U256,
}

/// Output of a successful validation run, batches are in submission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub batches: Vec<Batch>,
    pub credential_type: CredentialType,
}

impl ValidationResult {
    pub fn total_amount(&self) -> U256 {
        self.batches.iter().map(|b| b.total_amount).sum()
    }

    pub fn deposit_count(&self) -> usize {
        self.batches.iter().map(|b| b.deposits.len()).sum()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.iter().map(|b| b.deposits.len()).collect()
    }

    pub fn deposits(&self) -> impl Iterator<Item = &DepositRecord> {
        self.batches.iter().flat_map(|b| b.deposits.iter())
    }

    pub fn sprintf_summary(&self, filename: &str, network: &NetworkConfig) -> String {
        let align = 34;
        let sizes = self
            .batch_sizes()
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let mut summary = format!("{}\n", filename.white().bold());
        summary.push_str(&format_field!(align, "Accepted", white, network.name, green));
        summary.push_str(&format_field!(
            align,
            "Withdrawal credentials type",
            white,
            format!("0x{}", self.credential_type),
            blue
        ));
        summary.push_str(&format_field!(
            align,
            "Batches of deposits",
            white,
            self.batches.len(),
            magenta
        ));
        summary.push_str(&format_field!(
            align,
            "Validator deposits per batch",
            white,
            sizes,
            magenta
        ));
        summary.push_str(&format_field!(
            align,
            "Total validators to be deployed",
            white,
            self.deposit_count(),
            magenta
        ));
        summary.push_str(&format_field!(
            align,
            "Total amount required",
            white,
            format!(
                "{} {}",
                helpers::format_token(&self.total_amount()),
                network.token_symbol
            ),
            yellow
        ));
        summary
    }
}

/// Splits `deposits` into consecutive chunks of at most `max_batch_size`,
/// preserving order, and prices each chunk
pub fn partition(deposits: &[DepositRecord], ctx: &ValidationContext) -> Vec<Batch> {
    deposits
        .chunks(ctx.max_batch_size())
        .map(|chunk| Batch {
            deposits: chunk.to_vec(),
            total_amount: chunk.iter().map(|d| ctx.scaled(d.amount)).sum(),
        })
        .collect()
}

/// Calldata arguments of `batchDeposit`, fields concatenated in batch order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchDepositInputs {
    pub pubkeys: Bytes,
    pub withdrawal_credentials: Bytes,
    pub signatures: Bytes,
    pub deposit_data_roots: Vec<B256>,
    pub amounts: Vec<u64>,
}

impl From<&Batch> for BatchDepositInputs {
    fn from(batch: &Batch) -> Self {
        let mut pubkeys = Vec::with_capacity(batch.deposits.len() * 48);
        let mut withdrawal_credentials = Vec::with_capacity(batch.deposits.len() * 32);
        let mut signatures = Vec::with_capacity(batch.deposits.len() * 96);
        let mut deposit_data_roots = Vec::with_capacity(batch.deposits.len());
        let mut amounts = Vec::with_capacity(batch.deposits.len());
        for d in batch.deposits.iter() {
            pubkeys.extend_from_slice(d.pubkey.as_slice());
            withdrawal_credentials.extend_from_slice(d.withdrawal_credentials.as_slice());
            signatures.extend_from_slice(d.signature.as_slice());
            deposit_data_roots.push(d.deposit_data_root);
            amounts.push(d.amount);
        }
        Self {
            pubkeys: pubkeys.into(),
            withdrawal_credentials: withdrawal_credentials.into(),
            signatures: signatures.into(),
            deposit_data_roots,
            amounts,
        }
    }
}
