//! Identifiers of accounts and assets on either side of a swap.

use {
    serde::{Deserialize, Serialize},
    std::{fmt, str::FromStr},
    thiserror::Error,
};

/// Longest identifier accepted. NEAR account ids are capped at 64 bytes and
/// Ethereum addresses are 42 characters long.
pub const MAX_ACCOUNT_ID_LEN: usize = 64;

/// The chain an [`AccountId`] lives on.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Chain {
    Near,
    Ethereum,
}

/// An account, contract or token identifier.
///
/// Both NEAR account ids (`alice.testnet`, `wrap.testnet`) and `0x` prefixed
/// Ethereum addresses are accepted, as are the short asset tickers the order
/// forms use (`wNEAR`). The only requirements are that the identifier is
/// non-empty, at most [`MAX_ACCOUNT_ID_LEN`] bytes and free of whitespace and
/// control characters.
///
/// Ethereum addresses are case-insensitive and stored lowercased, so a
/// checksummed and a lowercase spelling of the same address compare equal.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum InvalidAccountId {
    #[error("account id is empty")]
    Empty,
    #[error("account id is {0} bytes long, at most {max} are allowed", max = MAX_ACCOUNT_ID_LEN)]
    TooLong(usize),
    #[error("account id contains invalid character {0:?}")]
    InvalidChar(char),
}

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Identifiers shaped like an Ethereum address are attributed to
    /// Ethereum, everything else to NEAR.
    pub fn chain(&self) -> Chain {
        if is_ethereum_address(&self.0) {
            Chain::Ethereum
        } else {
            Chain::Near
        }
    }
}

fn is_ethereum_address(id: &str) -> bool {
    id.strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

impl TryFrom<String> for AccountId {
    type Error = InvalidAccountId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(InvalidAccountId::Empty);
        }
        if value.len() > MAX_ACCOUNT_ID_LEN {
            return Err(InvalidAccountId::TooLong(value.len()));
        }
        if let Some(c) = value
            .chars()
            .find(|c| c.is_whitespace() || c.is_control())
        {
            return Err(InvalidAccountId::InvalidChar(c));
        }
        if is_ethereum_address(&value) {
            return Ok(Self(value.to_ascii_lowercase()));
        }
        Ok(Self(value))
    }
}

impl FromStr for AccountId {
    type Err = InvalidAccountId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
