use alloy::{
    network::TransactionBuilder,
    primitives::{Address, U256},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};
use log::*;
use serde::Serialize;

use crate::{
    batch::{BatchDepositInputs, ValidationResult},
    network::NetworkConfig,
};

alloy::sol! {
    #[sol(rpc)]
    #[derive(Debug, PartialEq)]
    interface IERC677 {
        function approve(address spender, uint256 value) external returns (bool);
        function balanceOf(address owner) external view returns (uint256);
    }

    #[derive(Debug, PartialEq)]
    interface ISBCDepositContract {
        /// @notice Submit multiple deposits in a single call, all deposits
        /// share the same withdrawal credentials.
        function batchDeposit(
            bytes calldata pubkeys,
            bytes calldata withdrawal_credentials,
            bytes calldata signatures,
            bytes32[] calldata deposit_data_roots,
            uint256[] calldata amounts
        ) external;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedTx {
    pub description: String,
    pub tx: TransactionRequest,
}

/// Unsigned transactions, to be sent in order: the token approval first,
/// then one `batchDeposit` per batch
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionPlan {
    pub chain_id: u64,
    pub total_amount: U256,
    pub transactions: Vec<PlannedTx>,
}

pub fn approve_calldata(spender: Address, value: U256) -> Vec<u8> {
    IERC677::approveCall { spender, value }.abi_encode()
}

pub fn batch_deposit_calldata(inputs: &BatchDepositInputs) -> Vec<u8> {
    ISBCDepositContract::batchDepositCall {
        pubkeys: inputs.pubkeys.clone(),
        withdrawal_credentials: inputs.withdrawal_credentials.clone(),
        signatures: inputs.signatures.clone(),
        deposit_data_roots: inputs.deposit_data_roots.clone(),
        amounts: inputs.amounts.iter().map(|a| U256::from(*a)).collect(),
    }
    .abi_encode()
}

impl SubmissionPlan {
    pub fn new(result: &ValidationResult, network: &NetworkConfig, from: Option<Address>) -> Self {
        let base = |to: Address| {
            let tx = TransactionRequest::default()
                .with_to(to)
                .with_chain_id(network.chain_id);
            match from {
                Some(from) => tx.with_from(from),
                None => tx,
            }
        };

        let total_amount = result.total_amount();
        let mut transactions = vec![PlannedTx {
            description: format!(
                "approve {} to spend {} wei",
                network.deposit_contract, total_amount
            ),
            tx: base(network.token)
                .with_input(approve_calldata(network.deposit_contract, total_amount)),
        }];

        for (i, batch) in result.batches.iter().enumerate() {
            let inputs = BatchDepositInputs::from(batch);
            debug!(
                "Batch deposit {}: {} validators, {} wei",
                i,
                batch.deposits.len(),
                batch.total_amount
            );
            transactions.push(PlannedTx {
                description: format!(
                    "batchDeposit #{} ({} validators, {} wei)",
                    i,
                    batch.deposits.len(),
                    batch.total_amount
                ),
                tx: base(network.deposit_contract).with_input(batch_deposit_calldata(&inputs)),
            });
        }
        trace!("{:#?}", transactions);

        Self {
            chain_id: network.chain_id,
            total_amount,
            transactions,
        }
    }
}
