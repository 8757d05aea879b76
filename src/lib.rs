pub mod macros;

pub mod batch;
pub mod config;
pub mod credentials;
pub mod error;
pub mod helpers;
pub mod indexer;
pub mod logger;
pub mod network;
pub mod rpc;
pub mod submission;
pub mod validator;

pub use batch::{Batch, BatchDepositInputs, ValidationResult};
pub use credentials::CredentialType;
pub use error::{IndexerError, ValidationError};
pub use helpers::depositdata::{DepositRecord, parse_deposit_file};
pub use indexer::{DepositIndexer, GraphQlIndexer, IndexedDeposit, SnapshotIndexer};
pub use network::{NetworkConfig, ValidationContext};
pub use validator::{validate, validate_payload};
