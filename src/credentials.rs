use alloy::primitives::B256;
use std::fmt;

/// Withdrawal credential flavours, keyed by the prefix byte.
///
/// https://github.com/ethereum/consensus-specs/blob/dev/specs/phase0/validator.md#withdrawal-credentials
/// https://eips.ethereum.org/EIPS/eip-7251
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialType {
    /// 0x00, BLS withdrawal key
    Bls,
    /// 0x01, execution address
    Execution,
    /// 0x02, execution address with compounding balance
    Compounding,
}

impl CredentialType {
    pub const fn prefix(&self) -> u8 {
        match self {
            CredentialType::Bls => 0x00,
            CredentialType::Execution => 0x01,
            CredentialType::Compounding => 0x02,
        }
    }

    pub fn from_prefix(prefix: u8) -> Option<Self> {
        match prefix {
            0x00 => Some(CredentialType::Bls),
            0x01 => Some(CredentialType::Execution),
            0x02 => Some(CredentialType::Compounding),
            _ => None,
        }
    }

    pub fn from_credentials(credentials: &B256) -> Option<Self> {
        Self::from_prefix(credentials[0])
    }

    /// Pre-pectra credentials only support the fixed 32 token deposit
    pub const fn is_legacy(&self) -> bool {
        matches!(self, CredentialType::Bls | CredentialType::Execution)
    }

    pub fn matches(&self, credentials: &B256) -> bool {
        credentials[0] == self.prefix()
    }
}

impl serde::Serialize for CredentialType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// Rendered the way the credentials themselves are written in the file
impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}", self.prefix())
    }
}
