//! Parameters of the hashed timelock escrows securing both legs of a
//! cross-chain swap.
//!
//! The source escrow holds the maker's funds, the destination escrow the
//! resolver's. Both unlock with the same secret and move through time windows
//! in which first only the intended party, then anybody, may withdraw or
//! cancel. All times are unix seconds.

use {
    crate::{account::AccountId, order::OrderHash},
    alloy_primitives::{B256, Keccak256, U256, keccak256},
    number::serialization::HexOrDecimalU256,
    serde::{Deserialize, Serialize},
    serde_with::serde_as,
    strum::{EnumIter, IntoEnumIterator},
    thiserror::Error,
};

/// A named point in an escrow's life after deployment.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, EnumIter, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    SrcWithdrawal,
    SrcPublicWithdrawal,
    SrcCancellation,
    SrcPublicCancellation,
    DstWithdrawal,
    DstPublicWithdrawal,
    DstCancellation,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimeBound {
    Before,
    After,
}

/// Stage offsets in seconds relative to the escrow deployment.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct StageOffsets {
    pub src_withdrawal: u64,
    pub src_public_withdrawal: u64,
    pub src_cancellation: u64,
    pub src_public_cancellation: u64,
    pub dst_withdrawal: u64,
    pub dst_public_withdrawal: u64,
    pub dst_cancellation: u64,
}

impl StageOffsets {
    pub const DEFAULT: Self = Self {
        src_withdrawal: 3600,
        src_public_withdrawal: 7200,
        src_cancellation: 10800,
        src_public_cancellation: 14400,
        dst_withdrawal: 1800,
        dst_public_withdrawal: 3600,
        dst_cancellation: 7200,
    };

    pub fn get(&self, stage: Stage) -> u64 {
        match stage {
            Stage::SrcWithdrawal => self.src_withdrawal,
            Stage::SrcPublicWithdrawal => self.src_public_withdrawal,
            Stage::SrcCancellation => self.src_cancellation,
            Stage::SrcPublicCancellation => self.src_public_cancellation,
            Stage::DstWithdrawal => self.dst_withdrawal,
            Stage::DstPublicWithdrawal => self.dst_public_withdrawal,
            Stage::DstCancellation => self.dst_cancellation,
        }
    }

    /// Stages of each chain have to open in order. The destination side is
    /// expected to be shorter than the source side but that is left to
    /// whoever deploys the escrows.
    pub fn validate(&self) -> Result<(), TimelockError> {
        const ORDERED: [&[Stage]; 2] = [
            &[
                Stage::SrcWithdrawal,
                Stage::SrcPublicWithdrawal,
                Stage::SrcCancellation,
                Stage::SrcPublicCancellation,
            ],
            &[
                Stage::DstWithdrawal,
                Stage::DstPublicWithdrawal,
                Stage::DstCancellation,
            ],
        ];
        for stages in ORDERED {
            for pair in stages.windows(2) {
                let (earlier, later) = (pair[0], pair[1]);
                if self.get(earlier) >= self.get(later) {
                    return Err(TimelockError::NotIncreasing { earlier, later });
                }
            }
        }
        Ok(())
    }
}

impl Default for StageOffsets {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum TimelockError {
    #[error("stage {later} does not open after {earlier}")]
    NotIncreasing { earlier: Stage, later: Stage },
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct Timelocks {
    pub src_withdrawal: u64,
    pub src_public_withdrawal: u64,
    pub src_cancellation: u64,
    pub src_public_cancellation: u64,
    pub dst_withdrawal: u64,
    pub dst_public_withdrawal: u64,
    pub dst_cancellation: u64,
    pub deployed_at: u64,
}

/// Which actions an escrow currently allows.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EscrowPhase {
    /// Nobody can act yet.
    Finality,
    /// Only the taker may withdraw.
    PrivateWithdrawal,
    /// Anybody holding the secret may withdraw on the taker's behalf.
    PublicWithdrawal,
    /// Only the taker may cancel. On the destination chain this is the only
    /// cancellation window.
    PrivateCancellation,
    /// Anybody may cancel and return the funds.
    PublicCancellation,
}

impl Timelocks {
    pub fn with_offsets(offsets: StageOffsets, deployed_at: u64) -> Self {
        Self {
            src_withdrawal: offsets.src_withdrawal,
            src_public_withdrawal: offsets.src_public_withdrawal,
            src_cancellation: offsets.src_cancellation,
            src_public_cancellation: offsets.src_public_cancellation,
            dst_withdrawal: offsets.dst_withdrawal,
            dst_public_withdrawal: offsets.dst_public_withdrawal,
            dst_cancellation: offsets.dst_cancellation,
            deployed_at,
        }
    }

    pub fn with_default_offsets(deployed_at: u64) -> Self {
        Self::with_offsets(StageOffsets::DEFAULT, deployed_at)
    }

    pub fn offsets(&self) -> StageOffsets {
        StageOffsets {
            src_withdrawal: self.src_withdrawal,
            src_public_withdrawal: self.src_public_withdrawal,
            src_cancellation: self.src_cancellation,
            src_public_cancellation: self.src_public_cancellation,
            dst_withdrawal: self.dst_withdrawal,
            dst_public_withdrawal: self.dst_public_withdrawal,
            dst_cancellation: self.dst_cancellation,
        }
    }

    pub fn validate(&self) -> Result<(), TimelockError> {
        self.offsets().validate()
    }

    /// Absolute time at which `stage` begins.
    pub fn stage_time(&self, stage: Stage) -> u64 {
        self.deployed_at.saturating_add(self.offsets().get(stage))
    }

    /// `After` holds from the stage time on, `Before` strictly before it.
    pub fn is_stage_time(&self, stage: Stage, bound: TimeBound, now: u64) -> bool {
        let stage_time = self.stage_time(stage);
        match bound {
            TimeBound::Before => now < stage_time,
            TimeBound::After => now >= stage_time,
        }
    }

    /// All stages with their absolute start times.
    pub fn schedule(&self) -> impl Iterator<Item = (Stage, u64)> + '_ {
        Stage::iter().map(|stage| (stage, self.stage_time(stage)))
    }

    pub fn src_phase(&self, now: u64) -> EscrowPhase {
        let after = |stage| self.is_stage_time(stage, TimeBound::After, now);
        if after(Stage::SrcPublicCancellation) {
            EscrowPhase::PublicCancellation
        } else if after(Stage::SrcCancellation) {
            EscrowPhase::PrivateCancellation
        } else if after(Stage::SrcPublicWithdrawal) {
            EscrowPhase::PublicWithdrawal
        } else if after(Stage::SrcWithdrawal) {
            EscrowPhase::PrivateWithdrawal
        } else {
            EscrowPhase::Finality
        }
    }

    pub fn dst_phase(&self, now: u64) -> EscrowPhase {
        let after = |stage| self.is_stage_time(stage, TimeBound::After, now);
        if after(Stage::DstCancellation) {
            EscrowPhase::PrivateCancellation
        } else if after(Stage::DstPublicWithdrawal) {
            EscrowPhase::PublicWithdrawal
        } else if after(Stage::DstWithdrawal) {
            EscrowPhase::PrivateWithdrawal
        } else {
            EscrowPhase::Finality
        }
    }
}

/// Keccak-256 commitment to the swap secret.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Hashlock(pub B256);

impl Hashlock {
    /// Whether `secret` is the preimage of this hashlock.
    pub fn is_unlocked_by(&self, secret: &[u8]) -> bool {
        keccak256(secret) == self.0
    }
}

/// Everything an escrow is deployed with. None of it changes afterwards.
#[serde_as]
#[derive(Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct Immutables {
    pub order_hash: OrderHash,
    pub hashlock: Hashlock,
    pub maker: AccountId,
    pub taker: AccountId,
    pub token: AccountId,
    #[serde_as(as = "HexOrDecimalU256")]
    pub amount: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub safety_deposit: U256,
    pub timelocks: Timelocks,
}

impl Immutables {
    /// Keccak-256 over all fields in the layout the escrow factory uses as
    /// the deployment salt of the escrow created with these parameters.
    pub fn hash(&self) -> Result<B256, ImmutablesError> {
        let amount = |field, amount: U256| {
            u128::try_from(amount).map_err(|_| ImmutablesError::AmountExceedsU128 { field, amount })
        };

        let mut hasher = Keccak256::new();
        hasher.update(self.order_hash.0);
        hasher.update(self.hashlock.0);
        hasher.update(self.maker.as_bytes());
        hasher.update(self.taker.as_bytes());
        hasher.update(self.token.as_bytes());
        hasher.update(amount("escrow", self.amount)?.to_le_bytes());
        hasher.update(amount("safety deposit", self.safety_deposit)?.to_le_bytes());
        for offset in [
            self.timelocks.src_withdrawal,
            self.timelocks.src_public_withdrawal,
            self.timelocks.src_cancellation,
            self.timelocks.src_public_cancellation,
            self.timelocks.dst_withdrawal,
            self.timelocks.dst_public_withdrawal,
            self.timelocks.dst_cancellation,
            self.timelocks.deployed_at,
        ] {
            hasher.update(offset.to_le_bytes());
        }
        Ok(hasher.finalize())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ImmutablesError {
    #[error("{field} amount {amount} does not fit into 128 bits")]
    AmountExceedsU128 { field: &'static str, amount: U256 },
}
