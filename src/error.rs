use thiserror::Error;

use crate::credentials::CredentialType;

/// Every way a validation run can be rejected. Each variant renders the
/// message shown to the user verbatim, so callers branch on the variant
/// and display the `to_string()`.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Oops, something went wrong while parsing your json file. Please check the file and try again.")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Invalid JSON structure. Deposit {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },
    #[error("File is for the wrong network. Expected: {chain_id}")]
    WrongNetwork { chain_id: u64 },
    #[error("Deposits have already been made to all validators in this file.")]
    AllDepositsAlreadyMade,
    #[error("Duplicated public keys detected in the deposit file.")]
    DuplicatePubkeysInFile,
    #[error("Invalid withdrawal credential type.")]
    InvalidCredentialType,
    #[error("All validators in the file must have the same withdrawal credentials of type {0}")]
    MixedCredentialTypes(CredentialType),
    #[error("All validators in the file must have the same withdrawal credential")]
    MixedCredentialValues,
    #[error("Amount should be exactly 32 tokens for deposits.")]
    InvalidAmount,
    #[error("Insufficient balance to process any deposits in the file.")]
    InsufficientBalance,
    #[error("deposit indexer query failed: {0}")]
    Indexer(#[from] IndexerError),
}

impl ValidationError {
    /// Payloads that fail to decode at all are reported under the same
    /// kind as structurally broken records.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ValidationError::InvalidJson(_) | ValidationError::MalformedRecord { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected http status {0}")]
    Status(reqwest::StatusCode),
    #[error("graphql errors: {0}")]
    GraphQl(String),
    #[error("malformed response: {0}")]
    Response(String),
}
