//! Pre-flight checks a deposit data file goes through before any token is
//! approved or deposited. Stages run strictly in order and the first
//! failing stage rejects the whole run:
//!
//! network -> on-chain duplicates -> in-file duplicates -> credentials ->
//! amounts -> balance -> batches
use alloy::primitives::{FixedBytes, U256};
use colored::*;
use log::*;
use std::collections::HashSet;

use crate::{
    batch::{self, ValidationResult},
    credentials::CredentialType,
    error::ValidationError,
    helpers::{
        self,
        depositdata::{self, DepositRecord},
    },
    indexer::DepositIndexer,
    network::ValidationContext,
};

/// Parses the raw file payload and runs the full pipeline over it
pub async fn validate_payload<I>(
    payload: &str,
    balance: U256,
    ctx: &ValidationContext,
    indexer: &I,
) -> Result<ValidationResult, ValidationError>
where
    I: DepositIndexer,
{
    let deposits = depositdata::parse_deposit_file(payload)?;
    validate(&deposits, balance, ctx, indexer).await
}

/// Runs every stage over a working copy of `deposits`, `balance` is the
/// spendable token balance (base units) snapshot for this run
pub async fn validate<I>(
    deposits: &[DepositRecord],
    balance: U256,
    ctx: &ValidationContext,
    indexer: &I,
) -> Result<ValidationResult, ValidationError>
where
    I: DepositIndexer,
{
    check_network(deposits, ctx)?;
    info!("The file has {} deposits.", deposits.len());

    let deposits = filter_deposited(deposits.to_vec(), ctx.chain_id(), indexer).await?;
    check_unique_pubkeys(&deposits)?;
    let credential_type = check_credentials(&deposits)?;
    check_amounts(&deposits, credential_type, ctx)?;
    let deposits = trim_to_balance(deposits, balance, ctx)?;

    let batches = batch::partition(&deposits, ctx);
    debug!(
        "{} deposits in {} batches, credentials {}",
        deposits.len(),
        batches.len(),
        format!("0x{}", credential_type).blue()
    );
    Ok(ValidationResult {
        batches,
        credential_type,
    })
}

/// Every deposit must have been signed for the target network
pub fn check_network(
    deposits: &[DepositRecord],
    ctx: &ValidationContext,
) -> Result<(), ValidationError> {
    match deposits
        .iter()
        .all(|d| d.fork_version == ctx.expected_fork_version())
    {
        true => Ok(()),
        false => Err(ValidationError::WrongNetwork {
            chain_id: ctx.chain_id(),
        }),
    }
}

/// Drops deposits the indexer has already seen on chain, keeping order.
/// Partially processed files are only a warning.
pub async fn filter_deposited<I>(
    deposits: Vec<DepositRecord>,
    chain_id: u64,
    indexer: &I,
) -> Result<Vec<DepositRecord>, ValidationError>
where
    I: DepositIndexer,
{
    let pubkeys = deposits.iter().map(|d| d.pubkey).collect::<Vec<_>>();
    let existing = indexer
        .deposits(&pubkeys, chain_id)
        .await?
        .into_iter()
        .map(|d| d.pubkey)
        .collect::<HashSet<FixedBytes<48>>>();

    let total = deposits.len();
    let remaining = deposits
        .into_iter()
        .filter(|d| !existing.contains(&d.pubkey))
        .collect::<Vec<_>>();

    if remaining.is_empty() {
        return Err(ValidationError::AllDepositsAlreadyMade);
    }
    if remaining.len() != total {
        warn!(
            "Some of the deposits have already been made to the validators in this file. Only new deposits will be processed. ({} of {} skipped)",
            total - remaining.len(),
            total
        );
    }
    Ok(remaining)
}

pub fn check_unique_pubkeys(deposits: &[DepositRecord]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(deposits.len());
    match deposits.iter().all(|d| seen.insert(d.pubkey)) {
        true => Ok(()),
        false => Err(ValidationError::DuplicatePubkeysInFile),
    }
}

/// The first deposit decides the credential type, every other deposit must
/// carry the exact same credentials
pub fn check_credentials(deposits: &[DepositRecord]) -> Result<CredentialType, ValidationError> {
    let first = match deposits.first() {
        Some(d) => d.withdrawal_credentials,
        None => return Err(ValidationError::AllDepositsAlreadyMade),
    };
    let credential_type = match CredentialType::from_credentials(&first) {
        Some(t) => t,
        None => {
            debug!("Unknown withdrawal credentials {}", first);
            return Err(ValidationError::InvalidCredentialType);
        }
    };
    if !deposits
        .iter()
        .all(|d| credential_type.matches(&d.withdrawal_credentials))
    {
        return Err(ValidationError::MixedCredentialTypes(credential_type));
    }
    if !deposits.iter().all(|d| d.withdrawal_credentials == first) {
        return Err(ValidationError::MixedCredentialValues);
    }
    Ok(credential_type)
}

/// Legacy credentials only accept the fixed 32 token deposit
pub fn check_amounts(
    deposits: &[DepositRecord],
    credential_type: CredentialType,
    ctx: &ValidationContext,
) -> Result<(), ValidationError> {
    if credential_type.is_legacy() && !deposits.iter().all(|d| d.amount == ctx.legacy_unit()) {
        return Err(ValidationError::InvalidAmount);
    }
    Ok(())
}

/// Keeps the longest prefix of `deposits` the balance can pay for. A deposit
/// that doesn't fit ends the list, cheaper deposits after it are not
/// considered so the file order is what gets submitted.
pub fn trim_to_balance(
    mut deposits: Vec<DepositRecord>,
    balance: U256,
    ctx: &ValidationContext,
) -> Result<Vec<DepositRecord>, ValidationError> {
    let required: U256 = deposits.iter().map(|d| ctx.scaled(d.amount)).sum();
    if balance < required {
        warn!(
            "Insufficient balance. {} is required to process all deposits in the file, available {}. We are going to process only those who can be processed with the current balance.",
            helpers::format_token(&required).red(),
            helpers::format_token(&balance).yellow(),
        );
        let mut cumulative = U256::ZERO;
        let mut last_index = 0;
        for d in deposits.iter() {
            cumulative += ctx.scaled(d.amount);
            if cumulative > balance {
                warn!(
                    "Skipping deposits starting after index {} due to insufficient balance.",
                    last_index
                );
                break;
            }
            last_index += 1;
        }
        deposits.truncate(last_index);
    }
    if deposits.is_empty() {
        return Err(ValidationError::InsufficientBalance);
    }
    Ok(deposits)
}
