//! Contains the Fusion+ order type with serialization matching the payloads
//! the order forms and the settlement contract views exchange.

use {
    crate::{
        account::AccountId,
        auction::{AuctionDetails, ScheduleError},
    },
    alloy_primitives::{B256, Keccak256, U256},
    number::{conversions::u256_to_big_uint, serialization::HexOrDecimalU256},
    serde::{Deserialize, Serialize},
    serde_with::serde_as,
    std::fmt::{self, Display},
    thiserror::Error,
};

/// Identifier of an order as assigned by the settlement contract.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct OrderHash(pub B256);

impl Display for OrderHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for OrderHash {
    type Err = alloy_primitives::hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Random nonce that keeps otherwise identical orders from sharing a hash.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Salt(pub B256);

impl Salt {
    pub fn random() -> Self {
        Self(B256::from(rand::random::<[u8; 32]>()))
    }
}

/// Order option flags (partial fills, expiration, ...). Opaque to this crate.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MakerTraits(pub u64);

impl MakerTraits {
    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn contains(self, mask: u64) -> bool {
        self.0 & mask == mask
    }
}

/// The fields a maker signs up to when creating an order.
#[serde_as]
#[derive(Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct OrderData {
    pub maker: AccountId,
    #[serde(default)]
    pub resolver: Option<AccountId>,
    pub maker_asset: AccountId,
    pub taker_asset: AccountId,
    #[serde_as(as = "HexOrDecimalU256")]
    pub making_amount: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub taking_amount: U256,
    #[serde(default)]
    pub maker_traits: MakerTraits,
    pub salt: Salt,
}

impl OrderData {
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.making_amount.is_zero() {
            return Err(OrderError::ZeroMakingAmount);
        }
        if self.taking_amount.is_zero() {
            return Err(OrderError::ZeroTakingAmount);
        }
        if self.maker_asset == self.taker_asset {
            return Err(OrderError::SameAssets(self.maker_asset.clone()));
        }
        Ok(())
    }

    /// Keccak-256 as computed by the settlement contract when the order is
    /// created. The contract hashes the submitted `order_hash` field first,
    /// which order forms leave zeroed, and expects amounts to fit into 128
    /// bits.
    pub fn hash(&self) -> Result<OrderHash, OrderError> {
        let mut hasher = Keccak256::new();
        hasher.update(B256::ZERO);
        hasher.update(self.maker.as_bytes());
        if let Some(resolver) = &self.resolver {
            hasher.update(resolver.as_bytes());
        }
        hasher.update(self.maker_asset.as_bytes());
        hasher.update(self.taker_asset.as_bytes());
        hasher.update(contract_amount("making", self.making_amount)?.to_le_bytes());
        hasher.update(contract_amount("taking", self.taking_amount)?.to_le_bytes());
        hasher.update(self.maker_traits.bits().to_le_bytes());
        hasher.update(self.salt.0);
        Ok(OrderHash(hasher.finalize()))
    }

    /// Whether a fill of `making` for `taking` keeps the exact price of the
    /// order. Both amounts have to be non-zero.
    pub fn is_valid_partial_fill(&self, making: U256, taking: U256) -> bool {
        if making.is_zero() || taking.is_zero() {
            return false;
        }
        u256_to_big_uint(&self.taking_amount) * u256_to_big_uint(&making)
            == u256_to_big_uint(&self.making_amount) * u256_to_big_uint(&taking)
    }
}

/// An order as submitted by the order form, before the settlement contract
/// has assigned it a hash.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct OrderCreation {
    #[serde(flatten)]
    pub data: OrderData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auction: Option<AuctionDetails>,
}

impl OrderCreation {
    /// Rejects structurally invalid orders and auction schedules before they
    /// are handed to any chain collaborator.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(&self.data, self.auction.as_ref())
    }

    /// The hash the order will be registered under.
    pub fn hash(&self) -> Result<OrderHash, OrderError> {
        self.data.hash()
    }

    pub fn into_order(self) -> Result<(FusionOrder, Option<AuctionDetails>), OrderError> {
        let order = FusionOrder {
            order_hash: self.data.hash()?,
            data: self.data,
        };
        Ok((order, self.auction))
    }
}

/// An order as known to the settlement contract.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct FusionOrder {
    pub order_hash: OrderHash,
    #[serde(flatten)]
    pub data: OrderData,
}

impl FusionOrder {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(&self.data, None)
    }

    /// Recomputes the hash from the order fields. Orders created elsewhere
    /// may use a different scheme so a mismatch is not an error by itself.
    pub fn compute_hash(&self) -> Result<OrderHash, OrderError> {
        self.data.hash()
    }
}

fn contract_amount(field: &'static str, amount: U256) -> Result<u128, OrderError> {
    u128::try_from(amount).map_err(|_| OrderError::AmountExceedsU128 { field, amount })
}

/// Validates an order together with its optional auction schedule.
pub fn validate(
    order: &OrderData,
    auction: Option<&AuctionDetails>,
) -> Result<(), ValidationError> {
    order.validate()?;
    if let Some(auction) = auction {
        auction.validate()?;
    }
    Ok(())
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum OrderError {
    #[error("making amount is zero")]
    ZeroMakingAmount,
    #[error("taking amount is zero")]
    ZeroTakingAmount,
    #[error("maker and taker asset are both {0}")]
    SameAssets(AccountId),
    #[error("filled {filled} exceeds order amount {total}")]
    OverFilled { filled: U256, total: U256 },
    #[error("{field} amount {amount} does not fit into 128 bits")]
    AmountExceedsU128 { field: &'static str, amount: U256 },
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid order: {0}")]
    InvalidOrder(#[from] OrderError),
    #[error("invalid auction schedule: {0}")]
    InvalidAuctionSchedule(#[from] ScheduleError),
}

#[cfg(test)]
pub(crate) mod tests {
    use {super::*, crate::auction::AuctionPoint, serde_json::json};

    pub fn account(id: &str) -> AccountId {
        id.parse().unwrap()
    }

    pub fn order_data() -> OrderData {
        OrderData {
            maker: account("alice.testnet"),
            resolver: None,
            maker_asset: account("wNEAR"),
            taker_asset: account("USDC"),
            making_amount: U256::from(10).pow(U256::from(24)),
            taking_amount: U256::from(1_000_000),
            maker_traits: MakerTraits::default(),
            salt: Salt(B256::repeat_byte(2)),
        }
    }

    #[test]
    fn valid_order_passes() {
        assert_eq!(order_data().validate(), Ok(()));
        let creation = OrderCreation {
            data: order_data(),
            auction: None,
        };
        assert_eq!(creation.validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_amounts() {
        let order = OrderData {
            making_amount: U256::ZERO,
            ..order_data()
        };
        assert_eq!(
            validate(&order, None),
            Err(ValidationError::InvalidOrder(OrderError::ZeroMakingAmount))
        );

        let order = OrderData {
            taking_amount: U256::ZERO,
            ..order_data()
        };
        assert_eq!(
            validate(&order, None),
            Err(ValidationError::InvalidOrder(OrderError::ZeroTakingAmount))
        );
    }

    #[test]
    fn rejects_same_assets() {
        let order = OrderData {
            taker_asset: account("wNEAR"),
            ..order_data()
        };
        assert_eq!(
            validate(&order, None),
            Err(ValidationError::InvalidOrder(OrderError::SameAssets(
                account("wNEAR")
            )))
        );
    }

    #[test]
    fn rejects_same_ethereum_asset_in_different_case() {
        let order = OrderData {
            maker_asset: account("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
            taker_asset: account("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
            ..order_data()
        };
        assert_eq!(
            order.validate(),
            Err(OrderError::SameAssets(account(
                "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
            )))
        );
    }

    #[test]
    fn rejects_invalid_auction() {
        let creation = OrderCreation {
            data: order_data(),
            auction: Some(AuctionDetails {
                start_time: 0,
                duration: 100,
                initial_rate_bump: 100,
                points: vec![
                    AuctionPoint {
                        delay: 60,
                        coefficient: 500_000,
                    },
                    AuctionPoint {
                        delay: 30,
                        coefficient: 400_000,
                    },
                ],
            }),
        };
        assert!(matches!(
            creation.validate(),
            Err(ValidationError::InvalidAuctionSchedule(
                ScheduleError::DelayNotIncreasing { index: 1, .. }
            ))
        ));
    }

    #[test]
    fn order_errors_take_precedence_over_auction_errors() {
        let creation = OrderCreation {
            data: OrderData {
                making_amount: U256::ZERO,
                ..order_data()
            },
            auction: Some(AuctionDetails {
                start_time: u64::MAX,
                duration: u64::MAX,
                ..Default::default()
            }),
        };
        assert_eq!(
            creation.validate(),
            Err(ValidationError::InvalidOrder(OrderError::ZeroMakingAmount))
        );
    }

    #[test]
    fn partial_fill_keeps_price() {
        let order = OrderData {
            making_amount: U256::from(1000),
            taking_amount: U256::from(2000),
            ..order_data()
        };
        assert!(order.is_valid_partial_fill(U256::from(500), U256::from(1000)));
        assert!(order.is_valid_partial_fill(U256::from(1000), U256::from(2000)));
        assert!(!order.is_valid_partial_fill(U256::from(500), U256::from(900)));
        assert!(!order.is_valid_partial_fill(U256::ZERO, U256::ZERO));
        assert!(!order.is_valid_partial_fill(U256::from(500), U256::ZERO));
        assert!(!order.is_valid_partial_fill(U256::ZERO, U256::from(1000)));
    }

    #[test]
    fn partial_fill_does_not_overflow() {
        let order = OrderData {
            making_amount: U256::MAX,
            taking_amount: U256::MAX,
            ..order_data()
        };
        assert!(order.is_valid_partial_fill(U256::MAX, U256::MAX));
        assert!(!order.is_valid_partial_fill(U256::MAX, U256::MAX - U256::from(1)));
    }

    #[test]
    fn hash_depends_on_every_field() {
        let base = order_data();
        let variants = [
            OrderData {
                maker: account("bob.testnet"),
                ..base.clone()
            },
            OrderData {
                resolver: Some(account("resolver.testnet")),
                ..base.clone()
            },
            OrderData {
                maker_asset: account("USDT"),
                ..base.clone()
            },
            OrderData {
                taking_amount: U256::from(1_000_001),
                ..base.clone()
            },
            OrderData {
                maker_traits: MakerTraits(1),
                ..base.clone()
            },
            OrderData {
                salt: Salt(B256::repeat_byte(3)),
                ..base.clone()
            },
        ];
        for variant in variants {
            assert_ne!(variant.hash().unwrap(), base.hash().unwrap(), "{variant:?}");
        }
        assert_eq!(base.hash(), order_data().hash());
    }

    #[test]
    fn hash_matches_settlement_contract_encoding() {
        assert_eq!(
            order_data().hash().unwrap().to_string(),
            "0x1444596531929d6b098e4e404c444cb30dfcd32a5bc70a33beeb84a74de37484"
        );

        let matched = OrderData {
            resolver: Some(account("resolver.testnet")),
            ..order_data()
        };
        assert_eq!(
            matched.hash().unwrap().to_string(),
            "0x7e0a523a6e0961f2863f7aef317a06391311e8057098d57b4ea17c54a1c81688"
        );
    }

    #[test]
    fn hash_requires_128_bit_amounts() {
        let order = OrderData {
            making_amount: U256::from(u128::MAX),
            ..order_data()
        };
        assert!(order.hash().is_ok());

        let order = OrderData {
            taking_amount: U256::from(u128::MAX) + U256::from(1),
            ..order_data()
        };
        assert_eq!(
            order.hash(),
            Err(OrderError::AmountExceedsU128 {
                field: "taking",
                amount: U256::from(u128::MAX) + U256::from(1),
            })
        );
    }

    #[test]
    fn into_order_assigns_hash() {
        let creation = OrderCreation {
            data: order_data(),
            auction: None,
        };
        let expected = creation.hash().unwrap();
        let (order, auction) = creation.into_order().unwrap();
        assert_eq!(order.order_hash, expected);
        assert_eq!(order.compute_hash(), Ok(expected));
        assert!(auction.is_none());
    }

    #[test]
    fn deserializes_front_end_payload() {
        let order: FusionOrder = serde_json::from_value(json!({
            "order_hash": "0x0101010101010101010101010101010101010101010101010101010101010101",
            "maker": "alice.testnet",
            "maker_asset": "wrap.testnet",
            "taker_asset": "usdc.fakes.testnet",
            "making_amount": "1000000000000000000000000",
            "taking_amount": "1000000",
            "maker_traits": 0,
            "salt": "0x0202020202020202020202020202020202020202020202020202020202020202",
        }))
        .unwrap();
        assert_eq!(order.order_hash, OrderHash(B256::repeat_byte(1)));
        assert_eq!(order.data.resolver, None);
        assert_eq!(order.data.making_amount, U256::from(10).pow(U256::from(24)));
        assert_eq!(order.validate(), Ok(()));
    }

    #[test]
    fn serializes_amounts_as_decimal_strings() {
        let creation = OrderCreation {
            data: order_data(),
            auction: None,
        };
        let value = serde_json::to_value(&creation).unwrap();
        assert_eq!(value["making_amount"], json!("1000000000000000000000000"));
        assert_eq!(value["taking_amount"], json!("1000000"));
        assert_eq!(value["maker_traits"], json!(0));
        assert!(value.get("auction").is_none());
        assert_eq!(
            serde_json::from_value::<OrderCreation>(value).unwrap(),
            creation
        );
    }

    #[test]
    fn random_salts_differ() {
        assert_ne!(Salt::random(), Salt::random());
    }
}
