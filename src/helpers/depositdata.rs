use alloy::primitives::{B256, FixedBytes};
use serde_json::Value;

use crate::error::ValidationError;

/// Keys every entry of a deposit CLI `deposit_data-*.json` must carry
pub const REQUIRED_FIELDS: [&str; 7] = [
    "pubkey",
    "withdrawal_credentials",
    "amount",
    "signature",
    "deposit_message_root",
    "deposit_data_root",
    "fork_version",
];

/// One entry of a deposit data file, as produced by the staking deposit CLI
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DepositRecord {
    /// Validator public key
    pub pubkey: FixedBytes<48>,
    /// Withdrawal credentials
    pub withdrawal_credentials: B256,
    /// Amount deposited in gwei
    pub amount: u64,
    /// Deposit signature
    pub signature: FixedBytes<96>,
    pub deposit_message_root: B256,
    pub deposit_data_root: B256,
    pub fork_version: FixedBytes<4>,
}

/// Decodes the raw file payload, the structural check runs on the raw
/// objects first so a missing key is reported before any typed decoding
pub fn parse_deposit_file(payload: &str) -> Result<Vec<DepositRecord>, ValidationError> {
    let value = serde_json::from_str::<Value>(payload).map_err(ValidationError::InvalidJson)?;
    let entries = match value {
        Value::Array(entries) => entries,
        _ => {
            return Err(ValidationError::MalformedRecord {
                index: 0,
                reason: "expected a list of deposits".to_string(),
            });
        }
    };
    check_structure(&entries)?;
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value::<DepositRecord>(entry).map_err(|e| {
                ValidationError::MalformedRecord {
                    index,
                    reason: e.to_string(),
                }
            })
        })
        .collect()
}

/// Every entry must be an object containing all of `REQUIRED_FIELDS`
pub fn check_structure(entries: &[Value]) -> Result<(), ValidationError> {
    for (index, entry) in entries.iter().enumerate() {
        let obj = entry
            .as_object()
            .ok_or_else(|| ValidationError::MalformedRecord {
                index,
                reason: "not an object".to_string(),
            })?;
        if let Some(missing) = REQUIRED_FIELDS.iter().find(|key| !obj.contains_key(**key)) {
            return Err(ValidationError::MalformedRecord {
                index,
                reason: format!("missing field `{}`", missing),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(pubkey_byte: u8) -> Value {
        json!({
            "pubkey": "a".repeat(94) + &format!("{:02x}", pubkey_byte),
            "withdrawal_credentials": format!("01{}", "0".repeat(22) + &"b".repeat(40)),
            "amount": 32000000000u64,
            "signature": "c".repeat(192),
            "deposit_message_root": "d".repeat(64),
            "deposit_data_root": "e".repeat(64),
            "fork_version": "00000064",
            "network_name": "gnosis",
            "deposit_cli_version": "2.7.0"
        })
    }

    #[test]
    fn parses_deposit_cli_output() {
        let payload = Value::Array(vec![entry(1), entry(2)]).to_string();
        let records = parse_deposit_file(&payload).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount, 32_000_000_000);
        assert_eq!(records[1].pubkey[47], 2);
        assert_eq!(records[0].withdrawal_credentials[0], 1);
        assert_eq!(records[0].fork_version, FixedBytes::from([0, 0, 0, 0x64]));
    }

    #[test]
    fn accepts_0x_prefixed_hex() {
        let mut e = entry(1);
        e["fork_version"] = json!("0x00000064");
        let records = parse_deposit_file(&Value::Array(vec![e]).to_string()).unwrap();
        assert_eq!(records[0].fork_version, FixedBytes::from([0, 0, 0, 0x64]));
    }

    #[test]
    fn rejects_non_json() {
        let err = parse_deposit_file("{not json").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidJson(_)));
        assert!(err.is_malformed());
    }

    #[test]
    fn rejects_missing_field() {
        for key in REQUIRED_FIELDS {
            let mut e = entry(2);
            e.as_object_mut().unwrap().remove(key);
            let payload = Value::Array(vec![entry(1), e]).to_string();
            match parse_deposit_file(&payload) {
                Err(ValidationError::MalformedRecord { index, reason }) => {
                    assert_eq!(index, 1);
                    assert!(reason.contains(key), "{reason}");
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn rejects_wrong_length_hex() {
        let mut e = entry(1);
        e["pubkey"] = json!("abcd");
        let err = parse_deposit_file(&Value::Array(vec![e]).to_string()).unwrap_err();
        assert!(matches!(err, ValidationError::MalformedRecord { index: 0, .. }));
    }

    #[test]
    fn rejects_non_list_payload() {
        let err = parse_deposit_file(&entry(1).to_string()).unwrap_err();
        assert!(err.is_malformed());
        let err = parse_deposit_file("[1, 2]").unwrap_err();
        assert!(matches!(err, ValidationError::MalformedRecord { index: 0, .. }));
    }
}
