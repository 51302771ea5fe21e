//! Read-only view of an order as tracked by the settlement contract.

use {
    crate::{
        auction::{AuctionDetails, AuctionError, BASIS_POINTS},
        order::{FusionOrder, OrderError, ValidationError},
    },
    alloy_primitives::U256,
    number::serialization::HexOrDecimalU256,
    serde::{Deserialize, Serialize},
    serde_with::serde_as,
    thiserror::Error,
};

#[serde_as]
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct OrderState {
    pub order: FusionOrder,
    #[serde_as(as = "HexOrDecimalU256")]
    pub filled_making_amount: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub filled_taking_amount: U256,
    pub is_cancelled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auction: Option<AuctionDetails>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    Open,
    PartiallyFilled,
    Filled,
    Cancelled,
}

/// Amounts of an order that can still be filled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RemainingAmounts {
    pub making: U256,
    pub taking: U256,
}

/// The transfers a fill would cause at a given time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FillQuote {
    pub making_amount: U256,
    pub taking_amount: U256,
    /// Rate bump in basis points applied on top of `taking_amount`.
    pub rate_bump: u32,
    /// The bumped taking amount, paid by the taker.
    pub maker_receives: U256,
    /// `making_amount` minus the protocol fee.
    pub taker_receives: U256,
    pub protocol_fee: U256,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum FillError {
    #[error("order is cancelled")]
    Cancelled,
    #[error("filling {making} for {taking} does not keep the order price")]
    InvalidRatio { making: U256, taking: U256 },
    #[error("making amount {requested} exceeds the remaining {remaining}")]
    ExceedsRemainingMaking { requested: U256, remaining: U256 },
    #[error("taking amount {requested} exceeds the remaining {remaining}")]
    ExceedsRemainingTaking { requested: U256, remaining: U256 },
    #[error("protocol fee of {0} basis points exceeds 100%")]
    ProtocolFeeTooHigh(u32),
    #[error("protocol fee overflows")]
    Overflow,
    #[error(transparent)]
    InvalidOrder(#[from] OrderError),
    #[error(transparent)]
    Auction(#[from] AuctionError),
}

impl OrderState {
    /// A freshly created, unfilled order.
    pub fn new(order: FusionOrder, auction: Option<AuctionDetails>) -> Self {
        Self {
            order,
            filled_making_amount: U256::ZERO,
            filled_taking_amount: U256::ZERO,
            is_cancelled: false,
            auction,
        }
    }

    /// Checks the order, its auction and that fills never exceed the order
    /// amounts.
    pub fn validate(&self) -> Result<(), ValidationError> {
        crate::order::validate(&self.order.data, self.auction.as_ref())?;
        self.remaining()?;
        Ok(())
    }

    pub fn remaining(&self) -> Result<RemainingAmounts, OrderError> {
        let remaining = |total: U256, filled: U256| {
            total
                .checked_sub(filled)
                .ok_or(OrderError::OverFilled { filled, total })
        };
        Ok(RemainingAmounts {
            making: remaining(self.order.data.making_amount, self.filled_making_amount)?,
            taking: remaining(self.order.data.taking_amount, self.filled_taking_amount)?,
        })
    }

    /// Cancellation wins over any fill progress.
    pub fn status(&self) -> OrderStatus {
        if self.is_cancelled {
            OrderStatus::Cancelled
        } else if self.filled_making_amount.is_zero() {
            OrderStatus::Open
        } else if self.filled_making_amount >= self.order.data.making_amount {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        }
    }

    /// Rate bump in basis points that currently applies to fills of this
    /// order, `None` for fixed price orders.
    pub fn rate_bump_at(&self, now: u64) -> Result<Option<u32>, AuctionError> {
        self.auction
            .as_ref()
            .map(|auction| auction.rate_bump_at(now))
            .transpose()
    }

    /// Checks a fill of `making` for `taking` at `now` the way the settlement
    /// contract does and computes what each party would receive. Nothing is
    /// settled.
    pub fn quote_fill(
        &self,
        making: U256,
        taking: U256,
        now: u64,
        protocol_fee_bps: u32,
    ) -> Result<FillQuote, FillError> {
        if protocol_fee_bps > BASIS_POINTS {
            return Err(FillError::ProtocolFeeTooHigh(protocol_fee_bps));
        }
        if self.is_cancelled {
            return Err(FillError::Cancelled);
        }
        if !self.order.data.is_valid_partial_fill(making, taking) {
            return Err(FillError::InvalidRatio { making, taking });
        }

        let remaining = self.remaining()?;
        if making > remaining.making {
            return Err(FillError::ExceedsRemainingMaking {
                requested: making,
                remaining: remaining.making,
            });
        }
        if taking > remaining.taking {
            return Err(FillError::ExceedsRemainingTaking {
                requested: taking,
                remaining: remaining.taking,
            });
        }

        let (rate_bump, maker_receives) = match &self.auction {
            Some(auction) => (
                auction.rate_bump_at(now)?,
                auction.bumped_taking_amount(taking, now)?,
            ),
            None => (0, taking),
        };
        let protocol_fee = making
            .checked_mul(U256::from(protocol_fee_bps))
            .ok_or(FillError::Overflow)?
            / U256::from(BASIS_POINTS);
        Ok(FillQuote {
            making_amount: making,
            taking_amount: taking,
            rate_bump,
            maker_receives,
            taker_receives: making - protocol_fee,
            protocol_fee,
        })
    }
}
