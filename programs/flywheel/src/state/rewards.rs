use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::FlywheelError;
use crate::state::curve::mul_div;

/// One linear emission stream for a single reward token.
/// `reward_rate` and `reward_per_token_stored` are scaled by PRECISION.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug)]
pub struct RewardStream {
    /// Reward token mint
    pub mint: Pubkey,

    /// Tokens streamed per second, scaled by PRECISION
    pub reward_rate: u128,

    /// Unix timestamp when the current period stops accruing
    pub period_finish: i64,

    /// Last time this stream's index was advanced
    pub last_update: i64,

    /// Cumulative reward per unit of pool balance, scaled by PRECISION
    pub reward_per_token_stored: u128,
}

impl RewardStream {
    pub const SIZE: usize = 32  // mint
        + 16  // reward_rate
        + 8   // period_finish
        + 8   // last_update
        + 16; // reward_per_token_stored

    fn last_time_applicable(&self, now: i64) -> i64 {
        now.min(self.period_finish)
    }
}

/// Per-account mirror of a reward pool: index checkpoints and settled
/// but unclaimed amounts, slot-aligned with the pool's streams.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug)]
pub struct UserRewards {
    /// Pool index already credited to this account, per stream slot
    pub reward_per_token_paid: [u128; MAX_REWARD_TOKENS],

    /// Settled, claimable amount per stream slot
    pub pending: [u64; MAX_REWARD_TOKENS],
}

impl UserRewards {
    pub const SIZE: usize = MAX_REWARD_TOKENS * 16  // reward_per_token_paid
        + MAX_REWARD_TOKENS * 8; // pending
}

/// Fixed-duration linear-emission reward accumulator. Written once and
/// embedded by the escrow rewarder, every gauge and every bribe; the three
/// differ only in whose balances feed `total_supply` and who may notify.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug)]
pub struct RewardPool {
    /// Sum of all account balances participating in the pool
    pub total_supply: u64,

    /// Number of registered reward tokens
    pub reward_count: u8,

    /// Registered streams; slots beyond `reward_count` are unused
    pub streams: [RewardStream; MAX_REWARD_TOKENS],
}

impl RewardPool {
    pub const SIZE: usize = 8  // total_supply
        + 1  // reward_count
        + MAX_REWARD_TOKENS * RewardStream::SIZE;

    pub fn token_index(&self, mint: &Pubkey) -> Option<usize> {
        self.streams[..self.reward_count as usize]
            .iter()
            .position(|s| s.mint == *mint)
    }

    /// Register a new reward token
    pub fn add_reward_token(&mut self, mint: Pubkey) -> Result<()> {
        if mint == Pubkey::default() {
            return err!(FlywheelError::InvalidZeroAddress);
        }
        if self.token_index(&mint).is_some() {
            return err!(FlywheelError::RewardTokenAlreadyAdded);
        }
        if (self.reward_count as usize) >= MAX_REWARD_TOKENS {
            return err!(FlywheelError::RewardTokenListFull);
        }
        self.streams[self.reward_count as usize] = RewardStream {
            mint,
            ..Default::default()
        };
        self.reward_count += 1;
        Ok(())
    }

    /// Current cumulative index for stream `i`
    pub fn reward_per_token(&self, i: usize, now: i64) -> Result<u128> {
        let stream = &self.streams[i];
        if self.total_supply == 0 {
            return Ok(stream.reward_per_token_stored);
        }
        let elapsed = stream
            .last_time_applicable(now)
            .saturating_sub(stream.last_update) as u128;
        let accrued = elapsed
            .checked_mul(stream.reward_rate)
            .ok_or(FlywheelError::MathOverflow)?
            .checked_div(self.total_supply as u128)
            .ok_or(FlywheelError::MathOverflow)?;
        stream
            .reward_per_token_stored
            .checked_add(accrued)
            .ok_or_else(|| error!(FlywheelError::MathOverflow))
    }

    /// Amount stream `i` owes `balance` given the account's checkpoints
    pub fn earned(&self, i: usize, now: i64, balance: u64, user: &UserRewards) -> Result<u64> {
        let rpt = self.reward_per_token(i, now)?;
        let delta = rpt.saturating_sub(user.reward_per_token_paid[i]);
        let owed = mul_div(balance as u128, delta, PRECISION)? as u64;
        owed.checked_add(user.pending[i])
            .ok_or_else(|| error!(FlywheelError::MathOverflow))
    }

    /// Advance every stream's index to `now`
    pub fn update(&mut self, now: i64) -> Result<()> {
        for i in 0..self.reward_count as usize {
            let rpt = self.reward_per_token(i, now)?;
            let stream = &mut self.streams[i];
            stream.reward_per_token_stored = rpt;
            stream.last_update = stream.last_time_applicable(now);
        }
        Ok(())
    }

    /// Advance every stream and fold the account's accrual into `pending`.
    /// Must run before any change to `balance` or `total_supply` so the
    /// index checkpoints stay aligned with the balances that earned them.
    pub fn settle(&mut self, now: i64, balance: u64, user: &mut UserRewards) -> Result<()> {
        self.update(now)?;
        for i in 0..self.reward_count as usize {
            let rpt = self.streams[i].reward_per_token_stored;
            let delta = rpt.saturating_sub(user.reward_per_token_paid[i]);
            let owed = mul_div(balance as u128, delta, PRECISION)? as u64;
            user.pending[i] = user.pending[i]
                .checked_add(owed)
                .ok_or(FlywheelError::MathOverflow)?;
            user.reward_per_token_paid[i] = rpt;
        }
        Ok(())
    }

    /// Start or extend stream `i` with `amount` over a fresh duration.
    /// A still-running period's undistributed remainder rolls into the new
    /// rate, so nothing is lost or double-counted.
    pub fn notify(&mut self, i: usize, amount: u64, now: i64) -> Result<()> {
        if amount == 0 {
            return err!(FlywheelError::InvalidZeroInput);
        }
        if amount < REWARD_DURATION as u64 {
            return err!(FlywheelError::RewardSmallerThanDuration);
        }
        self.update(now)?;

        let stream = &mut self.streams[i];
        let amount_scaled = (amount as u128)
            .checked_mul(PRECISION)
            .ok_or(FlywheelError::MathOverflow)?;
        let leftover_scaled = if now < stream.period_finish {
            ((stream.period_finish - now) as u128)
                .checked_mul(stream.reward_rate)
                .ok_or(FlywheelError::MathOverflow)?
        } else {
            0
        };
        stream.reward_rate = amount_scaled
            .checked_add(leftover_scaled)
            .ok_or(FlywheelError::MathOverflow)?
            .checked_div(REWARD_DURATION as u128)
            .ok_or(FlywheelError::MathOverflow)?;
        stream.last_update = now;
        stream.period_finish = now
            .checked_add(REWARD_DURATION)
            .ok_or(FlywheelError::MathOverflow)?;
        Ok(())
    }

    /// Total a full period distributes at the current rate
    pub fn reward_for_duration(&self, i: usize) -> u64 {
        (self.streams[i]
            .reward_rate
            .saturating_mul(REWARD_DURATION as u128)
            / PRECISION) as u64
    }

    /// Undistributed remainder of stream `i`'s current period
    pub fn left(&self, i: usize, now: i64) -> u64 {
        let stream = &self.streams[i];
        if now >= stream.period_finish {
            return 0;
        }
        let remaining_scaled =
            ((stream.period_finish - now) as u128).saturating_mul(stream.reward_rate);
        (remaining_scaled / PRECISION) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: u64 = 1_000_000_000;
    const T0: i64 = 1_700_000_000;

    fn assert_err<T: std::fmt::Debug>(res: Result<T>, expected: FlywheelError) {
        match res {
            Err(Error::AnchorError(e)) => {
                assert_eq!(e.error_code_number, u32::from(expected))
            }
            other => panic!("expected {:?}, got {:?}", expected, other),
        }
    }

    fn pool_with_token() -> (RewardPool, Pubkey) {
        let mint = Pubkey::new_unique();
        let mut pool = RewardPool::default();
        pool.add_reward_token(mint).unwrap();
        (pool, mint)
    }

    #[test]
    fn add_reward_token_guards() {
        let (mut pool, mint) = pool_with_token();
        assert_err(
            pool.add_reward_token(mint),
            FlywheelError::RewardTokenAlreadyAdded,
        );
        assert_err(
            pool.add_reward_token(Pubkey::default()),
            FlywheelError::InvalidZeroAddress,
        );
        for _ in 1..MAX_REWARD_TOKENS {
            pool.add_reward_token(Pubkey::new_unique()).unwrap();
        }
        assert_err(
            pool.add_reward_token(Pubkey::new_unique()),
            FlywheelError::RewardTokenListFull,
        );
    }

    #[test]
    fn notify_smaller_than_duration_rejected() {
        let (mut pool, _) = pool_with_token();
        assert_err(
            pool.notify(0, REWARD_DURATION as u64 - 1, T0),
            FlywheelError::RewardSmallerThanDuration,
        );
    }

    #[test]
    fn sole_staker_earns_full_amount_over_duration() {
        let (mut pool, _) = pool_with_token();
        let mut user = UserRewards::default();

        pool.settle(T0, 0, &mut user).unwrap();
        pool.total_supply = 100 * UNIT;
        let amount = 1_000 * UNIT;
        pool.notify(0, amount, T0).unwrap();

        let end = T0 + REWARD_DURATION;
        let earned = pool.earned(0, end, 100 * UNIT, &user).unwrap();
        assert!(earned <= amount);
        // No under-distribution beyond integer rounding
        assert!(amount - earned < REWARD_DURATION as u64);

        // Accrual stops at period finish
        let later = pool.earned(0, end + ONE_DAY, 100 * UNIT, &user).unwrap();
        assert_eq!(earned, later);
    }

    #[test]
    fn two_stakers_split_proportionally() {
        let (mut pool, _) = pool_with_token();
        let mut alice = UserRewards::default();
        let mut bob = UserRewards::default();

        pool.settle(T0, 0, &mut alice).unwrap();
        pool.settle(T0, 0, &mut bob).unwrap();
        pool.total_supply = 300 * UNIT; // alice 100, bob 200
        let amount = 900 * UNIT;
        pool.notify(0, amount, T0).unwrap();

        let end = T0 + REWARD_DURATION;
        let a = pool.earned(0, end, 100 * UNIT, &alice).unwrap();
        let b = pool.earned(0, end, 200 * UNIT, &bob).unwrap();
        assert!(a + b <= amount);
        assert!(amount - (a + b) < 2 * REWARD_DURATION as u64);
        // Bob holds twice the balance, earns twice the reward
        assert!((b as i128 - 2 * a as i128).unsigned_abs() < UNIT as u128);
    }

    #[test]
    fn mid_period_notify_rolls_leftover_without_loss() {
        let (mut pool, _) = pool_with_token();
        let mut user = UserRewards::default();

        pool.settle(T0, 0, &mut user).unwrap();
        pool.total_supply = UNIT;
        pool.notify(0, 700 * UNIT, T0).unwrap();

        // Halfway through, add a second tranche
        let half = T0 + REWARD_DURATION / 2;
        pool.notify(0, 700 * UNIT, half).unwrap();

        // After the second period ends everything has streamed out
        let end = half + REWARD_DURATION;
        let earned = pool.earned(0, end, UNIT, &user).unwrap();
        let total = 1_400 * UNIT;
        assert!(earned <= total);
        assert!(total - earned < 2 * REWARD_DURATION as u64);
    }

    #[test]
    fn settle_checkpoints_before_balance_change() {
        let (mut pool, _) = pool_with_token();
        let mut alice = UserRewards::default();
        let mut bob = UserRewards::default();

        pool.settle(T0, 0, &mut alice).unwrap();
        pool.total_supply = 100 * UNIT;
        pool.notify(0, 700 * UNIT, T0).unwrap();

        // Bob joins halfway; alice's first-half accrual must be untouched
        let half = T0 + REWARD_DURATION / 2;
        pool.settle(half, 0, &mut bob).unwrap();
        pool.total_supply += 100 * UNIT;

        let end = T0 + REWARD_DURATION;
        let a = pool.earned(0, end, 100 * UNIT, &alice).unwrap();
        let b = pool.earned(0, end, 100 * UNIT, &bob).unwrap();

        // Alice: full first half plus half of the second half = 75%
        let quarter = 175 * UNIT;
        assert!((a as i128 - 3 * quarter as i128).unsigned_abs() < UNIT as u128);
        assert!((b as i128 - quarter as i128).unsigned_abs() < UNIT as u128);
        assert!(a + b <= 700 * UNIT);
    }

    #[test]
    fn claim_then_reaccrue() {
        let (mut pool, _) = pool_with_token();
        let mut user = UserRewards::default();

        pool.settle(T0, 0, &mut user).unwrap();
        pool.total_supply = UNIT;
        pool.notify(0, 700 * UNIT, T0).unwrap();

        let half = T0 + REWARD_DURATION / 2;
        pool.settle(half, UNIT, &mut user).unwrap();
        let first = user.pending[0];
        assert!(first > 0);
        user.pending[0] = 0; // claimed

        let end = T0 + REWARD_DURATION;
        pool.settle(end, UNIT, &mut user).unwrap();
        let second = user.pending[0];
        assert!(first + second <= 700 * UNIT);
        assert!(700 * UNIT - (first + second) < 2 * REWARD_DURATION as u64);
    }
}
