use anchor_lang::prelude::*;

use crate::constants::*;
use crate::events::SwapQuote;
use crate::state::*;

/// Read-only quoting - emits the quote as an event, the integration
/// contract for off-chain clients
#[derive(Accounts)]
pub struct EmitQuote<'info> {
    #[account(
        seeds = [CURVE_SEED],
        bump = curve.bump
    )]
    pub curve: Account<'info, CurveState>,
}

pub fn quote_buy_handler(ctx: Context<EmitQuote>, base_in: u64) -> Result<()> {
    let curve = &ctx.accounts.curve;
    let quote = curve.quote_buy(base_in)?;

    emit!(SwapQuote {
        base_amount: base_in,
        token_amount: quote.token_out,
        is_buy: true,
        market_price: curve.market_price()?,
        floor_price: curve.floor_price()?,
        max_sell: curve.max_sell(),
    });

    Ok(())
}

/// Fails with the same named condition the matching `sell` would, so
/// callers can avoid unsellable amounts up front
pub fn quote_sell_handler(ctx: Context<EmitQuote>, token_in: u64) -> Result<()> {
    let curve = &ctx.accounts.curve;
    let quote = curve.quote_sell(token_in)?;

    emit!(SwapQuote {
        base_amount: quote.base_out,
        token_amount: token_in,
        is_buy: false,
        market_price: curve.market_price()?,
        floor_price: curve.floor_price()?,
        max_sell: curve.max_sell(),
    });

    Ok(())
}
