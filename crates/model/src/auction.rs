//! Dutch auction rate bump schedules attached to orders.
//!
//! An auction starts with the order's full `initial_rate_bump` (in basis
//! points) and decays it to zero over `duration` seconds. The shape of the
//! decay is given by checkpoints whose coefficients are multipliers of the
//! initial bump on a [`COEFFICIENT_SCALE`] scale: `1_000_000` means the full
//! initial bump, `500_000` half of it. Between checkpoints the coefficient is
//! interpolated linearly. The schedule has two implicit checkpoints, the
//! origin `{ delay: 0, coefficient: COEFFICIENT_SCALE }` and the end
//! `{ delay: duration, coefficient: 0 }`.

use {
    alloy_primitives::U256,
    serde::{Deserialize, Serialize},
    std::iter,
    thiserror::Error,
};

/// Coefficient representing the full initial rate bump.
pub const COEFFICIENT_SCALE: u32 = 1_000_000;

/// Basis points representing 100%.
pub const BASIS_POINTS: u32 = 10_000;

#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct AuctionDetails {
    /// Unix timestamp in seconds at which the auction starts.
    pub start_time: u64,
    /// Seconds after `start_time` at which the rate bump reaches zero.
    pub duration: u64,
    /// Rate bump at `start_time` in basis points.
    pub initial_rate_bump: u32,
    /// Decay checkpoints, ordered by delay.
    #[serde(default)]
    pub points: Vec<AuctionPoint>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct AuctionPoint {
    /// Seconds after the auction start.
    pub delay: u32,
    /// Fraction of the initial rate bump left at `delay`, scaled by
    /// [`COEFFICIENT_SCALE`].
    pub coefficient: u32,
}

/// Where an auction is at a given point in time.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum AuctionPhase {
    Pending,
    Running,
    Finished,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ScheduleError {
    #[error("start time {start_time} plus duration {duration} overflows")]
    EndOverflows { start_time: u64, duration: u64 },
    #[error("point {index} has delay {delay} which does not come after {previous}")]
    DelayNotIncreasing {
        index: usize,
        delay: u32,
        previous: u32,
    },
    #[error("point {index} has delay {delay} past the auction duration {duration}")]
    DelayBeyondDuration {
        index: usize,
        delay: u32,
        duration: u64,
    },
    #[error("point {index} has coefficient {coefficient} above {max}", max = COEFFICIENT_SCALE)]
    CoefficientAboveScale { index: usize, coefficient: u32 },
    #[error("point {index} has coefficient {coefficient} which increases over {previous}")]
    CoefficientIncreasing {
        index: usize,
        coefficient: u32,
        previous: u32,
    },
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum AuctionError {
    #[error("invalid auction schedule: {0}")]
    InvalidSchedule(#[from] ScheduleError),
    /// Informational: the auction has not started yet, callers usually treat
    /// this as the full initial rate bump.
    #[error("auction starts in {starts_in} seconds")]
    NotStarted { starts_in: u64 },
    #[error("bumped amount overflows")]
    Overflow,
}

impl AuctionDetails {
    /// Checks that delays are strictly increasing (starting after the implicit
    /// origin at delay 0), never exceed the duration and that coefficients
    /// never increase (starting from the implicit full coefficient).
    pub fn validate(&self) -> Result<(), ScheduleError> {
        self.end_time()?;

        let mut previous = AuctionPoint {
            delay: 0,
            coefficient: COEFFICIENT_SCALE,
        };
        for (index, point) in self.points.iter().enumerate() {
            if point.delay <= previous.delay {
                return Err(ScheduleError::DelayNotIncreasing {
                    index,
                    delay: point.delay,
                    previous: previous.delay,
                });
            }
            if u64::from(point.delay) > self.duration {
                return Err(ScheduleError::DelayBeyondDuration {
                    index,
                    delay: point.delay,
                    duration: self.duration,
                });
            }
            if point.coefficient > COEFFICIENT_SCALE {
                return Err(ScheduleError::CoefficientAboveScale {
                    index,
                    coefficient: point.coefficient,
                });
            }
            if point.coefficient > previous.coefficient {
                return Err(ScheduleError::CoefficientIncreasing {
                    index,
                    coefficient: point.coefficient,
                    previous: previous.coefficient,
                });
            }
            previous = *point;
        }
        Ok(())
    }

    /// Unix timestamp at which the rate bump reaches zero.
    pub fn end_time(&self) -> Result<u64, ScheduleError> {
        self.start_time
            .checked_add(self.duration)
            .ok_or(ScheduleError::EndOverflows {
                start_time: self.start_time,
                duration: self.duration,
            })
    }

    pub fn phase(&self, now: u64) -> Result<AuctionPhase, ScheduleError> {
        Ok(if now < self.start_time {
            AuctionPhase::Pending
        } else if now < self.end_time()? {
            AuctionPhase::Running
        } else {
            AuctionPhase::Finished
        })
    }

    /// Coefficient of the initial rate bump left at `now`, in
    /// `[0, COEFFICIENT_SCALE]`.
    ///
    /// Before the auction starts this returns [`AuctionError::NotStarted`];
    /// see [`Self::coefficient_at`] for the variant that treats that as the
    /// full coefficient.
    pub fn try_coefficient_at(&self, now: u64) -> Result<u32, AuctionError> {
        self.validate()?;
        let Some(elapsed) = now.checked_sub(self.start_time) else {
            return Err(AuctionError::NotStarted {
                starts_in: self.start_time - now,
            });
        };
        if elapsed >= self.duration {
            return Ok(0);
        }

        let checkpoints = self
            .points
            .iter()
            .map(|point| (u64::from(point.delay), u64::from(point.coefficient)))
            .chain(iter::once((self.duration, 0)));
        let mut previous = (0, u64::from(COEFFICIENT_SCALE));
        for (delay, coefficient) in checkpoints {
            if elapsed < delay {
                let (previous_delay, previous_coefficient) = previous;
                // `validate` guarantees `previous_delay <= elapsed < delay` and
                // `coefficient <= previous_coefficient`.
                let decay = u128::from(previous_coefficient - coefficient)
                    * u128::from(elapsed - previous_delay)
                    / u128::from(delay - previous_delay);
                let interpolated = u128::from(previous_coefficient) - decay;
                return Ok(u32::try_from(interpolated).unwrap_or(COEFFICIENT_SCALE));
            }
            previous = (delay, coefficient);
        }
        Ok(0)
    }

    /// Like [`Self::try_coefficient_at`] but a not yet started auction yields
    /// the full coefficient.
    pub fn coefficient_at(&self, now: u64) -> Result<u32, AuctionError> {
        match self.try_coefficient_at(now) {
            Err(AuctionError::NotStarted { .. }) => Ok(COEFFICIENT_SCALE),
            result => result,
        }
    }

    /// Effective rate bump in basis points at `now`.
    pub fn rate_bump_at(&self, now: u64) -> Result<u32, AuctionError> {
        let coefficient = self.coefficient_at(now)?;
        let bump = u64::from(self.initial_rate_bump) * u64::from(coefficient)
            / u64::from(COEFFICIENT_SCALE);
        // The coefficient is at most the full scale so the bump never exceeds
        // the initial one.
        Ok(u32::try_from(bump).unwrap_or(self.initial_rate_bump))
    }

    /// The taking amount a filler has to provide at `now`: the base amount
    /// plus the current rate bump on top of it.
    pub fn bumped_taking_amount(&self, taking_amount: U256, now: u64) -> Result<U256, AuctionError> {
        let bump = U256::from(self.rate_bump_at(now)?);
        taking_amount
            .checked_mul(bump)
            .map(|bonus| bonus / U256::from(BASIS_POINTS))
            .and_then(|bonus| taking_amount.checked_add(bonus))
            .ok_or(AuctionError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest, serde_json::json};

    fn point(delay: u32, coefficient: u32) -> AuctionPoint {
        AuctionPoint { delay, coefficient }
    }

    fn auction() -> AuctionDetails {
        AuctionDetails {
            start_time: 1000,
            duration: 3600,
            initial_rate_bump: 200,
            points: vec![point(900, 750_000), point(1800, 500_000)],
        }
    }

    #[test]
    fn full_coefficient_at_start() {
        let auction = auction();
        assert_eq!(auction.coefficient_at(1000).unwrap(), COEFFICIENT_SCALE);
        assert_eq!(auction.rate_bump_at(1000).unwrap(), 200);
    }

    #[test]
    fn zero_at_and_after_end() {
        let auction = auction();
        for now in [4600, 4601, 10_000, u64::MAX] {
            assert_eq!(auction.coefficient_at(now).unwrap(), 0);
            assert_eq!(auction.rate_bump_at(now).unwrap(), 0);
        }
    }

    #[test]
    fn not_started_is_informational() {
        let auction = auction();
        assert_eq!(
            auction.try_coefficient_at(400),
            Err(AuctionError::NotStarted { starts_in: 600 })
        );
        assert_eq!(auction.coefficient_at(400).unwrap(), COEFFICIENT_SCALE);
        assert_eq!(auction.rate_bump_at(400).unwrap(), 200);
    }

    #[test]
    fn hits_checkpoints_exactly() {
        let auction = auction();
        assert_eq!(auction.coefficient_at(1900).unwrap(), 750_000);
        assert_eq!(auction.coefficient_at(2800).unwrap(), 500_000);
        assert_eq!(auction.rate_bump_at(2800).unwrap(), 100);
    }

    #[test]
    fn interpolates_between_checkpoints() {
        let auction = auction();
        // Half way between the origin and the first point.
        assert_eq!(auction.coefficient_at(1450).unwrap(), 875_000);
        // Half way between the last point and the implicit end.
        assert_eq!(auction.coefficient_at(3700).unwrap(), 250_000);
    }

    #[test]
    fn past_last_point_decays_towards_zero() {
        let auction = auction();
        // 1900 seconds into the auction lies between the point at 1800 and the
        // implicit zero at 3600.
        let coefficient = auction.coefficient_at(auction.start_time + 1900).unwrap();
        assert!(0 < coefficient && coefficient < 500_000, "{coefficient}");
    }

    #[test]
    fn without_points_decays_linearly() {
        let auction = AuctionDetails {
            start_time: 0,
            duration: 100,
            initial_rate_bump: 1000,
            points: vec![],
        };
        assert_eq!(auction.coefficient_at(25).unwrap(), 750_000);
        assert_eq!(auction.rate_bump_at(25).unwrap(), 750);
    }

    #[test]
    fn point_at_duration_is_respected() {
        let auction = AuctionDetails {
            start_time: 0,
            duration: 100,
            initial_rate_bump: 1000,
            points: vec![point(50, 500_000), point(100, 500_000)],
        };
        assert_eq!(auction.coefficient_at(99).unwrap(), 500_000);
        assert_eq!(auction.coefficient_at(100).unwrap(), 0);
    }

    #[test]
    fn non_increasing_over_time() {
        let auction = auction();
        let mut previous = COEFFICIENT_SCALE;
        for now in auction.start_time..=auction.end_time().unwrap() {
            let coefficient = auction.coefficient_at(now).unwrap();
            assert!(coefficient <= previous, "increase at {now}");
            previous = coefficient;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn zero_duration_is_finished_immediately() {
        let auction = AuctionDetails {
            start_time: 10,
            duration: 0,
            initial_rate_bump: 500,
            points: vec![],
        };
        assert_eq!(auction.coefficient_at(9).unwrap(), COEFFICIENT_SCALE);
        assert_eq!(auction.coefficient_at(10).unwrap(), 0);
        assert_eq!(auction.phase(10).unwrap(), AuctionPhase::Finished);
    }

    #[test]
    fn phases() {
        let auction = auction();
        assert_eq!(auction.phase(999).unwrap(), AuctionPhase::Pending);
        assert_eq!(auction.phase(1000).unwrap(), AuctionPhase::Running);
        assert_eq!(auction.phase(4599).unwrap(), AuctionPhase::Running);
        assert_eq!(auction.phase(4600).unwrap(), AuctionPhase::Finished);
    }

    #[rstest]
    #[case::swapped(vec![point(1800, 750_000), point(900, 500_000)])]
    #[case::repeated(vec![point(900, 750_000), point(900, 500_000)])]
    #[case::zero_delay(vec![point(0, 750_000)])]
    #[case::reversed_triple(vec![point(2700, 900_000), point(1800, 800_000), point(900, 700_000)])]
    #[case::last_two_swapped(vec![point(900, 900_000), point(2700, 800_000), point(1800, 700_000)])]
    fn rejects_unordered_delays(#[case] points: Vec<AuctionPoint>) {
        let auction = AuctionDetails {
            points,
            ..auction()
        };
        assert!(matches!(
            auction.validate(),
            Err(ScheduleError::DelayNotIncreasing { .. })
        ));
        assert!(matches!(
            auction.coefficient_at(2000),
            Err(AuctionError::InvalidSchedule(
                ScheduleError::DelayNotIncreasing { .. }
            ))
        ));
    }

    #[test]
    fn rejects_any_unordered_permutation() {
        let sorted = [point(600, 900_000), point(1200, 600_000), point(2400, 300_000)];
        let permutations = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        for permutation in permutations {
            let auction = AuctionDetails {
                points: permutation.iter().map(|&i| sorted[i]).collect(),
                ..auction()
            };
            assert_eq!(auction.validate().is_ok(), permutation == [0, 1, 2]);
        }
    }

    #[test]
    fn rejects_delay_past_duration() {
        let auction = AuctionDetails {
            points: vec![point(3601, 0)],
            ..auction()
        };
        assert_eq!(
            auction.validate(),
            Err(ScheduleError::DelayBeyondDuration {
                index: 0,
                delay: 3601,
                duration: 3600
            })
        );
    }

    #[test]
    fn rejects_increasing_coefficients() {
        let increasing = AuctionDetails {
            points: vec![point(900, 500_000), point(1800, 750_000)],
            ..auction()
        };
        assert_eq!(
            increasing.validate(),
            Err(ScheduleError::CoefficientIncreasing {
                index: 1,
                coefficient: 750_000,
                previous: 500_000
            })
        );

        let above_scale = AuctionDetails {
            points: vec![point(900, 1_000_001)],
            ..auction()
        };
        assert_eq!(
            above_scale.validate(),
            Err(ScheduleError::CoefficientAboveScale {
                index: 0,
                coefficient: 1_000_001
            })
        );
    }

    #[test]
    fn rejects_overflowing_end() {
        let auction = AuctionDetails {
            start_time: u64::MAX,
            duration: 1,
            initial_rate_bump: 0,
            points: vec![],
        };
        assert!(matches!(
            auction.validate(),
            Err(ScheduleError::EndOverflows { .. })
        ));
    }

    #[test]
    fn bumps_taking_amount() {
        let auction = auction();
        let taking = U256::from(1_000_000);
        // 2% at the start, 1% at the second checkpoint, nothing at the end.
        assert_eq!(
            auction.bumped_taking_amount(taking, 1000).unwrap(),
            U256::from(1_020_000)
        );
        assert_eq!(
            auction.bumped_taking_amount(taking, 2800).unwrap(),
            U256::from(1_010_000)
        );
        assert_eq!(auction.bumped_taking_amount(taking, 4600).unwrap(), taking);
        assert_eq!(
            auction.bumped_taking_amount(U256::MAX, 1000),
            Err(AuctionError::Overflow)
        );
    }

    #[test]
    fn deserializes_front_end_payload() {
        let auction: AuctionDetails = serde_json::from_value(json!({
            "start_time": 1000,
            "duration": 3600,
            "initial_rate_bump": 200,
            "points": [
                { "delay": 900, "coefficient": 750000 },
                { "delay": 1800, "coefficient": 500000 },
            ],
        }))
        .unwrap();
        assert_eq!(auction, self::auction());
    }
}
