use anchor_lang::prelude::*;

use crate::errors::FlywheelError;
use crate::state::rewards::{RewardPool, UserRewards};

/// Vote-escrow ledger - aggregate side
///
/// Staked curve tokens live in the escrow vault; balances here are
/// non-transferable voting weight. The embedded reward pool streams
/// protocol revenue to stakers.
#[account]
#[derive(Default)]
pub struct EscrowState {
    /// Multi-token staker reward streams; `total_supply` is the total
    /// escrowed balance across all accounts
    pub rewards: RewardPool,

    /// PDA bump seed
    pub bump: u8,
}

impl EscrowState {
    pub const LEN: usize = 8  // discriminator
        + RewardPool::SIZE
        + 1   // bump
        + 32; // padding

    pub fn total_locked(&self) -> u64 {
        self.rewards.total_supply
    }
}

/// Vote-escrow ledger - one account per staker
#[account]
#[derive(Default)]
pub struct EscrowAccount {
    /// The staker's wallet address
    pub owner: Pubkey,

    /// Escrowed balance conferring voting weight
    pub balance: u64,

    /// Portion of `balance` credited from option burns - never withdrawable
    pub burned_credit: u64,

    /// Voting weight currently allocated to plugins
    pub used_weight: u64,

    /// Last epoch in which this account voted or reset
    pub last_vote_epoch: u64,

    /// Reward checkpoints against the escrow reward pool
    pub rewards: UserRewards,

    /// PDA bump seed
    pub bump: u8,
}

impl EscrowAccount {
    pub const LEN: usize = 8  // discriminator
        + 32  // owner
        + 8   // balance
        + 8   // burned_credit
        + 8   // used_weight
        + 8   // last_vote_epoch
        + UserRewards::SIZE
        + 1   // bump
        + 16; // padding

    /// Balance not pinned by collateral, allocated votes, or burn credit
    pub fn withdraw_available(&self, debt: u64) -> u64 {
        if debt > 0 || self.used_weight > 0 {
            return 0;
        }
        self.balance.saturating_sub(self.burned_credit)
    }

    /// Validate an unstake of `amount` against both lock conditions
    pub fn check_unstake(&self, amount: u64, debt: u64) -> Result<()> {
        if amount == 0 {
            return err!(FlywheelError::InvalidZeroInput);
        }
        if debt > 0 {
            return err!(FlywheelError::CollateralActive);
        }
        if self.used_weight > 0 {
            return err!(FlywheelError::VotingWeightActive);
        }
        if amount > self.balance.saturating_sub(self.burned_credit) {
            return err!(FlywheelError::ExceedsWithdrawableBalance);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_err<T: std::fmt::Debug>(res: Result<T>, expected: FlywheelError) {
        match res {
            Err(Error::AnchorError(e)) => {
                assert_eq!(e.error_code_number, u32::from(expected))
            }
            other => panic!("expected {:?}, got {:?}", expected, other),
        }
    }

    fn account(balance: u64, burned: u64, used: u64) -> EscrowAccount {
        EscrowAccount {
            balance,
            burned_credit: burned,
            used_weight: used,
            ..Default::default()
        }
    }

    #[test]
    fn unstake_blocked_by_outstanding_debt() {
        let acc = account(100, 0, 0);
        assert_err(acc.check_unstake(50, 1), FlywheelError::CollateralActive);
        assert_eq!(acc.withdraw_available(1), 0);
    }

    #[test]
    fn unstake_blocked_by_allocated_votes() {
        let acc = account(100, 0, 60);
        assert_err(acc.check_unstake(50, 0), FlywheelError::VotingWeightActive);
        assert_eq!(acc.withdraw_available(0), 0);
    }

    #[test]
    fn burn_credit_never_withdrawable() {
        let acc = account(100, 30, 0);
        assert_eq!(acc.withdraw_available(0), 70);
        assert!(acc.check_unstake(70, 0).is_ok());
        assert_err(
            acc.check_unstake(71, 0),
            FlywheelError::ExceedsWithdrawableBalance,
        );
    }

    #[test]
    fn unstake_succeeds_only_when_both_locks_clear() {
        let acc = account(100, 0, 0);
        assert!(acc.check_unstake(100, 0).is_ok());
        assert_err(acc.check_unstake(0, 0), FlywheelError::InvalidZeroInput);
    }

    #[test]
    fn collateral_round_trip() {
        use crate::constants::DEFAULT_SWAP_FEE_BPS;
        use crate::state::curve::CurveState;

        const UNIT: u64 = 1_000_000_000;
        let mut curve = CurveState {
            reserve_virt: 1_000 * UNIT,
            max_supply: 1_000 * UNIT,
            swap_fee_bps: DEFAULT_SWAP_FEE_BPS,
            ..Default::default()
        };

        // Buy, then stake everything
        let q = curve.quote_buy(10 * UNIT).unwrap();
        curve.apply_buy(&q).unwrap();
        let mut acc = account(q.token_out, 0, 0);

        // Borrow the full credit limit
        let credit = curve.credit_limit(acc.balance).unwrap();
        assert!(credit > 0);
        let debt = curve.apply_borrow(0, credit, credit).unwrap();
        assert_eq!(debt, credit);

        // Collateral lock holds until the debt clears
        assert_err(
            acc.check_unstake(acc.balance, debt),
            FlywheelError::CollateralActive,
        );

        // Repay in full, then the whole stake withdraws
        let debt = curve.apply_repay(debt, debt).unwrap();
        assert_eq!(debt, 0);
        assert_eq!(curve.total_debt, 0);
        assert!(acc.check_unstake(acc.balance, debt).is_ok());
        acc.balance = 0;
        assert_eq!(acc.withdraw_available(0), 0);
    }
}
