use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::FlywheelError;

/// Checked a * b / denom in u128
pub fn mul_div(a: u128, b: u128, denom: u128) -> Result<u128> {
    if denom == 0 {
        return err!(FlywheelError::MathOverflow);
    }
    a.checked_mul(b)
        .ok_or(FlywheelError::MathOverflow)?
        .checked_div(denom)
        .ok_or_else(|| error!(FlywheelError::MathOverflow))
}

/// Checked ceiling division in u128
pub fn div_ceil(a: u128, b: u128) -> Result<u128> {
    if b == 0 {
        return err!(FlywheelError::MathOverflow);
    }
    let add = a.checked_add(b - 1).ok_or(FlywheelError::MathOverflow)?;
    Ok(add / b)
}

/// Fee breakdown and curve output of a buy, computed before any transfer
#[derive(Clone, Copy, Debug, Default)]
pub struct BuyQuote {
    /// Portion of the fee reclassified into the floor reserve
    pub fee_floor: u64,
    /// Portion of the fee transferred to the treasury
    pub fee_treasury: u64,
    /// Portion of the fee transferred to the referral account
    pub fee_referral: u64,
    /// Reserve amount entering the market reserves
    pub base_to_market: u64,
    /// Curve tokens minted to the recipient
    pub token_out: u64,
}

/// Fee breakdown and curve output of a sell
#[derive(Clone, Copy, Debug, Default)]
pub struct SellQuote {
    /// Gross reserve amount leaving the market reserves
    pub base_gross: u64,
    pub fee_floor: u64,
    pub fee_treasury: u64,
    pub fee_referral: u64,
    /// Net reserve amount paid to the recipient
    pub base_out: u64,
}

/// Global bonding-curve ledger - one per deployment
///
/// Pricing runs a constant product over the market reserves:
/// `K = (reserve_virt + mr_base) * (max_supply - supply)`. The floor reserve
/// `fr_base` backs every circulating token at the floor price
/// `fr_base / max_supply`; the vault balance equals
/// `fr_base + mr_base - total_debt`, and `total_debt` never exceeds the
/// floor value of escrowed collateral, so floor redemptions and market
/// sells are always payable.
#[account]
#[derive(Default)]
pub struct CurveState {
    /// Reserve asset mint (external)
    pub base_mint: Pubkey,

    /// Curve token mint (mint authority = this PDA)
    pub token_mint: Pubkey,

    /// Option token mint (mint authority = voter PDA)
    pub otoken_mint: Pubkey,

    /// Virtual reserve constant - makes pricing well-defined at zero supply
    pub reserve_virt: u64,

    /// Floor reserve - backs circulating tokens at the floor price
    pub fr_base: u64,

    /// Real market reserve - the constant-product side that pays sells
    pub mr_base: u64,

    /// Circulating curve-token supply
    pub supply: u64,

    /// Curve capacity; shrinks on redeem so the floor price never falls
    pub max_supply: u64,

    /// Total reserve asset lent out against escrowed collateral
    pub total_debt: u64,

    /// Swap fee in basis points
    pub swap_fee_bps: u16,

    /// PDA bump seed
    pub bump: u8,
}

impl CurveState {
    pub const LEN: usize = 8  // discriminator
        + 32  // base_mint
        + 32  // token_mint
        + 32  // otoken_mint
        + 8   // reserve_virt
        + 8   // fr_base
        + 8   // mr_base
        + 8   // supply
        + 8   // max_supply
        + 8   // total_debt
        + 2   // swap_fee_bps
        + 1   // bump
        + 32; // padding for future expansion

    /// Unminted curve-token inventory on the market side
    pub fn remaining(&self) -> u64 {
        self.max_supply.saturating_sub(self.supply)
    }

    /// Constant-product invariant over the market reserves
    fn invariant_k(&self) -> Result<u128> {
        let base = (self.reserve_virt as u128)
            .checked_add(self.mr_base as u128)
            .ok_or(FlywheelError::MathOverflow)?;
        base.checked_mul(self.remaining() as u128)
            .ok_or_else(|| error!(FlywheelError::MathOverflow))
    }

    /// Current market price, reserve-per-token scaled by PRECISION
    pub fn market_price(&self) -> Result<u128> {
        let remaining = self.remaining();
        if remaining == 0 {
            return err!(FlywheelError::ExceedsCurveInventory);
        }
        let base = (self.reserve_virt as u128)
            .checked_add(self.mr_base as u128)
            .ok_or(FlywheelError::MathOverflow)?;
        mul_div(base, PRECISION, remaining as u128)
    }

    /// Current floor price, reserve-per-token scaled by PRECISION.
    /// Monotonically non-decreasing across every curve operation.
    pub fn floor_price(&self) -> Result<u128> {
        if self.max_supply == 0 {
            return err!(FlywheelError::InvalidCurveParameter);
        }
        mul_div(self.fr_base as u128, PRECISION, self.max_supply as u128)
    }

    /// Reserve asset actually held by the vault
    pub fn vault_balance(&self) -> u64 {
        self.fr_base
            .saturating_add(self.mr_base)
            .saturating_sub(self.total_debt)
    }

    /// Split `fee` into (floor, treasury, referral) slices
    fn split_fee(fee: u64) -> Result<(u64, u64, u64)> {
        let treasury = mul_div(fee as u128, FEE_TO_TREASURY_BPS as u128, BPS_DENOMINATOR as u128)? as u64;
        let referral = mul_div(fee as u128, FEE_TO_REFERRAL_BPS as u128, BPS_DENOMINATOR as u128)? as u64;
        let floor = fee
            .checked_sub(treasury)
            .and_then(|f| f.checked_sub(referral))
            .ok_or(FlywheelError::MathOverflow)?;
        Ok((floor, treasury, referral))
    }

    /// Quote a buy of `base_in` reserve units. Pure; no state change.
    pub fn quote_buy(&self, base_in: u64) -> Result<BuyQuote> {
        if base_in == 0 {
            return err!(FlywheelError::InvalidZeroInput);
        }
        let remaining = self.remaining() as u128;
        if remaining == 0 {
            return err!(FlywheelError::ExceedsCurveInventory);
        }

        let fee = mul_div(base_in as u128, self.swap_fee_bps as u128, BPS_DENOMINATOR as u128)? as u64;
        let (fee_floor, fee_treasury, fee_referral) = Self::split_fee(fee)?;
        let base_to_market = base_in.checked_sub(fee).ok_or(FlywheelError::MathOverflow)?;

        let k = self.invariant_k()?;
        let base_before = (self.reserve_virt as u128)
            .checked_add(self.mr_base as u128)
            .ok_or(FlywheelError::MathOverflow)?;
        let base_after = base_before
            .checked_add(base_to_market as u128)
            .ok_or(FlywheelError::MathOverflow)?;
        // Round the retained inventory up so the mint rounds against the buyer
        let remaining_after = div_ceil(k, base_after)?;
        let token_out = remaining.saturating_sub(remaining_after) as u64;

        Ok(BuyQuote {
            fee_floor,
            fee_treasury,
            fee_referral,
            base_to_market,
            token_out,
        })
    }

    /// Commit a previously computed buy quote
    pub fn apply_buy(&mut self, q: &BuyQuote) -> Result<()> {
        self.fr_base = self
            .fr_base
            .checked_add(q.fee_floor)
            .ok_or(FlywheelError::MathOverflow)?;
        self.mr_base = self
            .mr_base
            .checked_add(q.base_to_market)
            .ok_or(FlywheelError::MathOverflow)?;
        self.supply = self
            .supply
            .checked_add(q.token_out)
            .ok_or(FlywheelError::MathOverflow)?;
        Ok(())
    }

    /// Quote a sell of `token_in` curve tokens. Pure; no state change.
    /// Fails `ExceedsSwapMarketReserves` when the payout would exceed the
    /// real market reserves or push the market price below the floor.
    pub fn quote_sell(&self, token_in: u64) -> Result<SellQuote> {
        if token_in == 0 {
            return err!(FlywheelError::InvalidZeroInput);
        }
        if token_in > self.supply {
            return err!(FlywheelError::ExceedsSwapMarketReserves);
        }

        let k = self.invariant_k()?;
        let base_before = (self.reserve_virt as u128)
            .checked_add(self.mr_base as u128)
            .ok_or(FlywheelError::MathOverflow)?;
        let remaining_after = (self.remaining() as u128)
            .checked_add(token_in as u128)
            .ok_or(FlywheelError::MathOverflow)?;
        // Round the retained base up so the payout rounds against the seller
        let base_after = div_ceil(k, remaining_after)?;
        let gross = base_before.saturating_sub(base_after);

        if gross > self.mr_base as u128 {
            return err!(FlywheelError::ExceedsSwapMarketReserves);
        }
        let price_after = mul_div(base_after, PRECISION, remaining_after)?;
        if price_after < self.floor_price()? {
            return err!(FlywheelError::ExceedsSwapMarketReserves);
        }

        let gross = gross as u64;
        let fee = mul_div(gross as u128, self.swap_fee_bps as u128, BPS_DENOMINATOR as u128)? as u64;
        let (fee_floor, fee_treasury, fee_referral) = Self::split_fee(fee)?;
        let base_out = gross.checked_sub(fee).ok_or(FlywheelError::MathOverflow)?;

        Ok(SellQuote {
            base_gross: gross,
            fee_floor,
            fee_treasury,
            fee_referral,
            base_out,
        })
    }

    /// Commit a previously computed sell quote
    pub fn apply_sell(&mut self, token_in: u64, q: &SellQuote) -> Result<()> {
        self.mr_base = self
            .mr_base
            .checked_sub(q.base_gross)
            .ok_or(FlywheelError::ExceedsSwapMarketReserves)?;
        self.fr_base = self
            .fr_base
            .checked_add(q.fee_floor)
            .ok_or(FlywheelError::MathOverflow)?;
        self.supply = self
            .supply
            .checked_sub(token_in)
            .ok_or(FlywheelError::MathOverflow)?;
        Ok(())
    }

    /// Whether `token_in` passes both sell bounds at the current state
    fn sell_feasible(&self, token_in: u64) -> bool {
        self.quote_sell(token_in).is_ok()
    }

    /// Largest curve-token amount sellable right now. Callers quoting with
    /// this bound never hit `ExceedsSwapMarketReserves`.
    pub fn max_sell(&self) -> u64 {
        if self.supply == 0 || !self.sell_feasible(1) {
            return 0;
        }
        if self.sell_feasible(self.supply) {
            return self.supply;
        }
        // Feasibility is monotone in the sell amount
        let mut lo: u64 = 1;
        let mut hi: u64 = self.supply;
        while lo < hi {
            let mid = lo + (hi - lo + 1) / 2;
            if self.sell_feasible(mid) {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        lo
    }

    /// Floor value of an escrowed balance, the account's borrow ceiling
    pub fn credit_limit(&self, escrow_balance: u64) -> Result<u64> {
        let credit = mul_div(escrow_balance as u128, self.floor_price()?, PRECISION)?;
        Ok(credit as u64)
    }

    /// Register a borrow against escrowed collateral
    pub fn apply_borrow(&mut self, position_debt: u64, amount: u64, credit: u64) -> Result<u64> {
        if amount == 0 {
            return err!(FlywheelError::InvalidZeroInput);
        }
        let new_debt = position_debt
            .checked_add(amount)
            .ok_or(FlywheelError::MathOverflow)?;
        if new_debt > credit {
            return err!(FlywheelError::ExceedsBorrowCreditLimit);
        }
        self.total_debt = self
            .total_debt
            .checked_add(amount)
            .ok_or(FlywheelError::MathOverflow)?;
        Ok(new_debt)
    }

    /// Register a repayment. Over-repay is a hard failure, never a clamp.
    pub fn apply_repay(&mut self, position_debt: u64, amount: u64) -> Result<u64> {
        if amount == 0 {
            return err!(FlywheelError::InvalidZeroInput);
        }
        if amount > position_debt {
            return err!(FlywheelError::ExceedsOutstandingDebt);
        }
        self.total_debt = self
            .total_debt
            .checked_sub(amount)
            .ok_or(FlywheelError::MathOverflow)?;
        Ok(position_debt - amount)
    }

    /// Exercise option tokens: mint at the floor price, payment raises the
    /// floor reserve. Returns the reserve payment owed.
    pub fn apply_exercise(&mut self, amount: u64) -> Result<u64> {
        if amount == 0 {
            return err!(FlywheelError::InvalidZeroInput);
        }
        // Keep at least one token of market inventory so pricing stays defined
        if amount as u128 >= self.remaining() as u128 {
            return err!(FlywheelError::ExceedsCurveInventory);
        }
        let cost = div_ceil(
            (amount as u128)
                .checked_mul(self.floor_price()?)
                .ok_or(FlywheelError::MathOverflow)?,
            PRECISION,
        )? as u64;
        self.fr_base = self
            .fr_base
            .checked_add(cost)
            .ok_or(FlywheelError::MathOverflow)?;
        self.supply = self
            .supply
            .checked_add(amount)
            .ok_or(FlywheelError::MathOverflow)?;
        Ok(cost)
    }

    /// Redeem curve tokens at the floor price. Shrinks `max_supply` with the
    /// burn so the floor price is left exactly unchanged. Returns the payout.
    pub fn apply_redeem(&mut self, amount: u64) -> Result<u64> {
        if amount == 0 {
            return err!(FlywheelError::InvalidZeroInput);
        }
        if amount > self.supply {
            return err!(FlywheelError::ExceedsSwapMarketReserves);
        }
        let payout = mul_div(
            amount as u128,
            self.fr_base as u128,
            self.max_supply as u128,
        )? as u64;
        self.fr_base = self
            .fr_base
            .checked_sub(payout)
            .ok_or(FlywheelError::MathOverflow)?;
        self.max_supply = self
            .max_supply
            .checked_sub(amount)
            .ok_or(FlywheelError::MathOverflow)?;
        self.supply = self
            .supply
            .checked_sub(amount)
            .ok_or(FlywheelError::MathOverflow)?;
        Ok(payout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: u64 = 1_000_000_000;

    fn assert_err<T: std::fmt::Debug>(res: Result<T>, expected: FlywheelError) {
        match res {
            Err(Error::AnchorError(e)) => {
                assert_eq!(e.error_code_number, u32::from(expected))
            }
            other => panic!("expected {:?}, got {:?}", expected, other),
        }
    }

    fn curve() -> CurveState {
        CurveState {
            reserve_virt: 1_000 * UNIT,
            max_supply: 1_000 * UNIT,
            swap_fee_bps: DEFAULT_SWAP_FEE_BPS,
            ..Default::default()
        }
    }

    fn buy(c: &mut CurveState, base_in: u64) -> BuyQuote {
        let q = c.quote_buy(base_in).unwrap();
        c.apply_buy(&q).unwrap();
        q
    }

    #[test]
    fn buy_mints_and_raises_both_prices() {
        let mut c = curve();
        let p0 = c.market_price().unwrap();
        let f0 = c.floor_price().unwrap();

        let q = buy(&mut c, 10 * UNIT);
        assert!(q.token_out > 0);
        assert_eq!(
            q.base_to_market + q.fee_floor + q.fee_treasury + q.fee_referral,
            10 * UNIT
        );
        assert!(c.market_price().unwrap() > p0);
        assert!(c.floor_price().unwrap() > f0);
        assert!(c.market_price().unwrap() >= c.floor_price().unwrap());
    }

    #[test]
    fn zero_input_rejected() {
        let c = curve();
        assert_err(c.quote_buy(0), FlywheelError::InvalidZeroInput);
        assert_err(c.quote_sell(0), FlywheelError::InvalidZeroInput);
    }

    #[test]
    fn sell_round_trip_costs_fees_only() {
        let mut c = curve();
        let q = buy(&mut c, 100 * UNIT);
        let s = c.quote_sell(q.token_out).unwrap();
        c.apply_sell(q.token_out, &s).unwrap();

        // Buyer cannot get back more than they put in
        assert!(s.base_out < 100 * UNIT);
        // Fees are the only loss: roughly two swap fees of slippage
        assert!(s.base_out > 93 * UNIT);
        assert_eq!(c.supply, 0);
    }

    #[test]
    fn sell_beyond_max_sell_rejected() {
        let mut c = curve();
        buy(&mut c, 50 * UNIT);
        // Exercised tokens circulate without adding market reserves, so the
        // full supply can no longer be sold back through the curve
        c.apply_exercise(40 * UNIT).unwrap();

        let max = c.max_sell();
        assert!(max > 0);
        assert!(max < c.supply);
        assert!(c.quote_sell(max).is_ok());
        assert_err(
            c.quote_sell(max + 1),
            FlywheelError::ExceedsSwapMarketReserves,
        );
        assert_err(
            c.quote_sell(c.supply),
            FlywheelError::ExceedsSwapMarketReserves,
        );
    }

    #[test]
    fn sell_more_than_supply_rejected() {
        let mut c = curve();
        let q = buy(&mut c, 10 * UNIT);
        assert_err(
            c.quote_sell(q.token_out + 1),
            FlywheelError::ExceedsSwapMarketReserves,
        );
    }

    #[test]
    fn floor_monotone_across_operation_sequences() {
        let mut c = curve();
        let mut last_floor = c.floor_price().unwrap();
        let mut held: u64 = 0;

        let steps: [(u8, u64); 10] = [
            (0, 25 * UNIT),
            (0, 3 * UNIT),
            (1, 2 * UNIT),
            (0, 40 * UNIT),
            (1, 10 * UNIT),
            (2, UNIT),
            (0, 7 * UNIT),
            (3, UNIT / 2),
            (1, 5 * UNIT),
            (0, 12 * UNIT),
        ];
        for (op, amt) in steps {
            match op {
                0 => held += buy(&mut c, amt).token_out,
                1 => {
                    let amt = amt.min(c.max_sell()).min(held);
                    if amt > 0 {
                        let s = c.quote_sell(amt).unwrap();
                        c.apply_sell(amt, &s).unwrap();
                        held -= amt;
                    }
                }
                2 => {
                    c.apply_exercise(amt).unwrap();
                    held += amt;
                }
                _ => {
                    let amt = amt.min(held);
                    if amt > 0 {
                        c.apply_redeem(amt).unwrap();
                        held -= amt;
                    }
                }
            }
            let floor = c.floor_price().unwrap();
            assert!(floor >= last_floor, "floor price regressed");
            assert!(c.market_price().unwrap() >= floor);
            last_floor = floor;
        }
    }

    #[test]
    fn reserve_conservation() {
        let mut c = curve();
        let mut vault: u64 = 0; // mirrors actual transfers in and out

        let q = buy(&mut c, 200 * UNIT);
        vault += 200 * UNIT - q.fee_treasury - q.fee_referral;
        assert_eq!(vault, c.vault_balance());

        let s = c.quote_sell(q.token_out / 2).unwrap();
        c.apply_sell(q.token_out / 2, &s).unwrap();
        vault -= s.base_out + s.fee_treasury + s.fee_referral;
        assert_eq!(vault, c.vault_balance());

        let credit = c.credit_limit(q.token_out / 2).unwrap();
        let debt = c.apply_borrow(0, credit, credit).unwrap();
        vault -= credit;
        assert_eq!(vault, c.vault_balance());

        c.apply_repay(debt, debt).unwrap();
        vault += debt;
        assert_eq!(vault, c.vault_balance());
        assert_eq!(c.total_debt, 0);
    }

    #[test]
    fn borrow_beyond_credit_rejected() {
        let mut c = curve();
        let q = buy(&mut c, 100 * UNIT);
        let credit = c.credit_limit(q.token_out).unwrap();
        assert!(credit > 0);
        assert_err(
            c.apply_borrow(0, credit + 1, credit),
            FlywheelError::ExceedsBorrowCreditLimit,
        );
        // State unchanged on failure
        assert_eq!(c.total_debt, 0);
        assert!(c.apply_borrow(0, credit, credit).is_ok());
    }

    #[test]
    fn over_repay_is_a_hard_failure() {
        let mut c = curve();
        let q = buy(&mut c, 100 * UNIT);
        let credit = c.credit_limit(q.token_out).unwrap();
        let debt = c.apply_borrow(0, credit, credit).unwrap();
        assert_err(
            c.apply_repay(debt, debt + 1),
            FlywheelError::ExceedsOutstandingDebt,
        );
        assert_eq!(c.total_debt, debt);
    }

    #[test]
    fn exercise_pays_floor_and_raises_floor() {
        let mut c = curve();
        buy(&mut c, 100 * UNIT);
        let floor = c.floor_price().unwrap();
        assert!(floor > 0);

        let cost = c.apply_exercise(UNIT).unwrap();
        let expected = div_ceil(UNIT as u128 * floor, PRECISION).unwrap() as u64;
        assert_eq!(cost, expected);
        assert!(c.floor_price().unwrap() >= floor);
    }

    #[test]
    fn redeem_preserves_floor_price() {
        let mut c = curve();
        let q = buy(&mut c, 100 * UNIT);
        let floor = c.floor_price().unwrap();
        let fr_before = c.fr_base;

        let payout = c.apply_redeem(q.token_out / 3).unwrap();
        assert!(payout > 0);
        assert_eq!(c.fr_base, fr_before - payout);
        assert!(c.floor_price().unwrap() >= floor);
        // Redeem pays exactly the floor value, within one unit of rounding
        let expected = mul_div(q.token_out as u128 / 3, floor, PRECISION).unwrap() as u64;
        assert!(payout.abs_diff(expected) <= 1);
    }

    #[test]
    fn quote_matches_execution() {
        let mut c = curve();
        buy(&mut c, 75 * UNIT);
        let snapshot = c.clone();
        let q = snapshot.quote_buy(5 * UNIT).unwrap();
        let executed = buy(&mut c, 5 * UNIT);
        assert_eq!(q.token_out, executed.token_out);
    }
}
