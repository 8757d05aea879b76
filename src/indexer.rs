use alloy::primitives::{FixedBytes, hex};
use log::*;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};
use std::{collections::BTreeMap, future::Future};
use url::Url;

use crate::error::IndexerError;

pub const GET_DEPOSIT_EVENTS: &str = r#"
query MyQuery($pubkeys: [String!], $chainId: Int!) {
  SBCDepositContract_DepositEvent(
    where: {
      pubkey: {
        _in: $pubkeys
      },
      chainId: {_eq: $chainId}
    }
  ) {
    id
    amount
    db_write_timestamp
    index
    withdrawal_credentials
    pubkey
  }
}
"#;

/// A deposit event the indexer has already seen on chain
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexedDeposit {
    pub pubkey: FixedBytes<48>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub amount: Option<String>,
    #[serde(default)]
    pub withdrawal_credentials: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub index: Option<String>,
    #[serde(default, rename = "db_write_timestamp")]
    pub timestamp: Option<String>,
}

/// Source of already processed deposits, queried once per validation run
pub trait DepositIndexer {
    fn deposits(
        &self,
        pubkeys: &[FixedBytes<48>],
        chain_id: u64,
    ) -> impl Future<Output = Result<Vec<IndexedDeposit>, IndexerError>> + Send;
}

/// Hasura style GraphQL endpoint exposing `SBCDepositContract_DepositEvent`
#[derive(Debug, Clone)]
pub struct GraphQlIndexer {
    client: Client,
    url: Url,
}

impl GraphQlIndexer {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<DepositEvents>,
    #[serde(default)]
    errors: Vec<Value>,
}

#[derive(Deserialize)]
struct DepositEvents {
    #[serde(rename = "SBCDepositContract_DepositEvent")]
    events: Vec<IndexedDeposit>,
}

impl DepositIndexer for GraphQlIndexer {
    async fn deposits(
        &self,
        pubkeys: &[FixedBytes<48>],
        chain_id: u64,
    ) -> Result<Vec<IndexedDeposit>, IndexerError> {
        let pubkeys = pubkeys
            .iter()
            .map(|pk| hex::encode_prefixed(pk))
            .collect::<Vec<_>>();
        debug!(
            "Querying {} for {} pubkeys on chain {}",
            self.url,
            pubkeys.len(),
            chain_id
        );
        let body = json!({
            "query": GET_DEPOSIT_EVENTS,
            "variables": {
                "pubkeys": pubkeys,
                "chainId": chain_id,
            },
        });
        let response = self
            .client
            .post(self.url.clone())
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(IndexerError::Status(response.status()));
        }
        let response = response
            .json::<GraphQlResponse>()
            .await
            .map_err(|e| IndexerError::Response(e.to_string()))?;
        if !response.errors.is_empty() {
            return Err(IndexerError::GraphQl(Value::Array(response.errors).to_string()));
        }
        let events = response
            .data
            .ok_or_else(|| IndexerError::Response("missing `data`".to_string()))?
            .events;
        trace!("{:#?}", events);
        Ok(events)
    }
}

/// In-memory snapshot of known deposits, keyed by chain id
#[derive(Debug, Clone, Default)]
pub struct SnapshotIndexer {
    pub known: BTreeMap<u64, Vec<IndexedDeposit>>,
}

impl SnapshotIndexer {
    pub fn from_pubkeys<I: IntoIterator<Item = FixedBytes<48>>>(chain_id: u64, pubkeys: I) -> Self {
        Self::default().with_pubkeys(chain_id, pubkeys)
    }

    pub fn with_pubkeys<I: IntoIterator<Item = FixedBytes<48>>>(
        mut self,
        chain_id: u64,
        pubkeys: I,
    ) -> Self {
        self.known
            .entry(chain_id)
            .or_default()
            .extend(pubkeys.into_iter().map(|pubkey| IndexedDeposit {
                pubkey,
                amount: None,
                withdrawal_credentials: None,
                index: None,
                timestamp: None,
            }));
        self
    }
}

impl DepositIndexer for SnapshotIndexer {
    async fn deposits(
        &self,
        pubkeys: &[FixedBytes<48>],
        chain_id: u64,
    ) -> Result<Vec<IndexedDeposit>, IndexerError> {
        Ok(self
            .known
            .get(&chain_id)
            .map(|known| {
                known
                    .iter()
                    .filter(|d| pubkeys.contains(&d.pubkey))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

// Hasura renders numeric/bigint columns either way depending on size
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
