use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, MintTo, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::FlywheelError;
use crate::events::{CurveBuy, CurveSell};
use crate::state::*;

#[derive(Accounts)]
pub struct Buy<'info> {
    pub buyer: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, ProtocolConfig>,

    #[account(
        mut,
        seeds = [CURVE_SEED],
        bump = curve.bump
    )]
    pub curve: Account<'info, CurveState>,

    #[account(
        mut,
        address = curve.token_mint
    )]
    pub token_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [RESERVE_VAULT_SEED],
        bump
    )]
    pub reserve_vault: Account<'info, TokenAccount>,

    /// Buyer's reserve asset account, debited by `base_in`
    #[account(
        mut,
        constraint = buyer_base.mint == curve.base_mint @ FlywheelError::InvalidRewardVault
    )]
    pub buyer_base: Account<'info, TokenAccount>,

    /// Destination for the minted curve tokens
    #[account(
        mut,
        constraint = recipient_token.mint == curve.token_mint @ FlywheelError::InvalidRewardVault
    )]
    pub recipient_token: Account<'info, TokenAccount>,

    /// Treasury's reserve asset account
    #[account(
        mut,
        constraint = treasury_base.owner == config.treasury @ FlywheelError::InvalidRewardVault,
        constraint = treasury_base.mint == curve.base_mint @ FlywheelError::InvalidRewardVault
    )]
    pub treasury_base: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    // remaining_accounts:
    // [0] optional referral reserve-asset token account (writable); when
    //     absent the referral fee slice goes to the treasury
}

pub fn buy_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Buy<'info>>,
    base_in: u64,
    min_out: u64,
    deadline: i64,
) -> Result<()> {
    let clock = Clock::get()?;
    require!(!ctx.accounts.config.paused, FlywheelError::ProtocolPaused);
    require!(clock.unix_timestamp <= deadline, FlywheelError::SwapExpired);

    let quote = ctx.accounts.curve.quote_buy(base_in)?;
    require!(
        quote.token_out >= min_out,
        FlywheelError::ExceedsSwapSlippageTolerance
    );

    // Route the referral slice to the referral account when one is passed
    let referral = match ctx.remaining_accounts.first() {
        Some(info) => {
            let acc = Account::<TokenAccount>::try_from(info)?;
            require!(
                acc.mint == ctx.accounts.curve.base_mint,
                FlywheelError::InvalidRewardVault
            );
            Some(info.clone())
        }
        None => None,
    };

    // Reserve in: the floor and market slices stay in the vault
    let vault_in = quote
        .base_to_market
        .checked_add(quote.fee_floor)
        .ok_or(FlywheelError::MathOverflow)?;
    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.buyer_base.to_account_info(),
                to: ctx.accounts.reserve_vault.to_account_info(),
                authority: ctx.accounts.buyer.to_account_info(),
            },
        ),
        vault_in,
    )?;

    let (treasury_fee, referral_fee) = match &referral {
        Some(_) => (quote.fee_treasury, quote.fee_referral),
        None => (quote.fee_treasury + quote.fee_referral, 0),
    };
    if treasury_fee > 0 {
        token::transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.buyer_base.to_account_info(),
                    to: ctx.accounts.treasury_base.to_account_info(),
                    authority: ctx.accounts.buyer.to_account_info(),
                },
            ),
            treasury_fee,
        )?;
    }
    if let Some(referral_info) = referral {
        if referral_fee > 0 {
            token::transfer(
                CpiContext::new(
                    ctx.accounts.token_program.to_account_info(),
                    Transfer {
                        from: ctx.accounts.buyer_base.to_account_info(),
                        to: referral_info,
                        authority: ctx.accounts.buyer.to_account_info(),
                    },
                ),
                referral_fee,
            )?;
        }
    }

    // Book the swap before minting so the curve never reflects a
    // half-applied trade
    ctx.accounts.curve.apply_buy(&quote)?;

    let curve_bump = ctx.accounts.curve.bump;
    let seeds: &[&[u8]] = &[CURVE_SEED, &[curve_bump]];
    token::mint_to(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            MintTo {
                mint: ctx.accounts.token_mint.to_account_info(),
                to: ctx.accounts.recipient_token.to_account_info(),
                authority: ctx.accounts.curve.to_account_info(),
            },
            &[seeds],
        ),
        quote.token_out,
    )?;

    let curve = &ctx.accounts.curve;
    emit!(CurveBuy {
        buyer: ctx.accounts.buyer.key(),
        recipient: ctx.accounts.recipient_token.owner,
        base_in,
        token_out: quote.token_out,
        fee_floor: quote.fee_floor,
        fee_treasury: quote.fee_treasury,
        fee_referral: quote.fee_referral,
        floor_price: curve.floor_price()?,
        market_price: curve.market_price()?,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Sell<'info> {
    pub seller: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, ProtocolConfig>,

    #[account(
        mut,
        seeds = [CURVE_SEED],
        bump = curve.bump
    )]
    pub curve: Account<'info, CurveState>,

    #[account(
        mut,
        address = curve.token_mint
    )]
    pub token_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [RESERVE_VAULT_SEED],
        bump
    )]
    pub reserve_vault: Account<'info, TokenAccount>,

    /// Seller's curve token account, burned from
    #[account(
        mut,
        constraint = seller_token.mint == curve.token_mint @ FlywheelError::InvalidRewardVault
    )]
    pub seller_token: Account<'info, TokenAccount>,

    /// Destination for the reserve payout
    #[account(
        mut,
        constraint = recipient_base.mint == curve.base_mint @ FlywheelError::InvalidRewardVault
    )]
    pub recipient_base: Account<'info, TokenAccount>,

    /// Treasury's reserve asset account
    #[account(
        mut,
        constraint = treasury_base.owner == config.treasury @ FlywheelError::InvalidRewardVault,
        constraint = treasury_base.mint == curve.base_mint @ FlywheelError::InvalidRewardVault
    )]
    pub treasury_base: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    // remaining_accounts:
    // [0] optional referral reserve-asset token account (writable)
}

pub fn sell_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Sell<'info>>,
    token_in: u64,
    min_out: u64,
    deadline: i64,
) -> Result<()> {
    let clock = Clock::get()?;
    require!(!ctx.accounts.config.paused, FlywheelError::ProtocolPaused);
    require!(clock.unix_timestamp <= deadline, FlywheelError::SwapExpired);

    let quote = ctx.accounts.curve.quote_sell(token_in)?;
    require!(
        quote.base_out >= min_out,
        FlywheelError::ExceedsSwapSlippageTolerance
    );

    let referral = match ctx.remaining_accounts.first() {
        Some(info) => {
            let acc = Account::<TokenAccount>::try_from(info)?;
            require!(
                acc.mint == ctx.accounts.curve.base_mint,
                FlywheelError::InvalidRewardVault
            );
            Some(info.clone())
        }
        None => None,
    };

    // Burn before paying out; the vault never fronts unbacked reserve
    token::burn(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.token_mint.to_account_info(),
                from: ctx.accounts.seller_token.to_account_info(),
                authority: ctx.accounts.seller.to_account_info(),
            },
        ),
        token_in,
    )?;

    ctx.accounts.curve.apply_sell(token_in, &quote)?;

    let curve_bump = ctx.accounts.curve.bump;
    let seeds: &[&[u8]] = &[CURVE_SEED, &[curve_bump]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.reserve_vault.to_account_info(),
                to: ctx.accounts.recipient_base.to_account_info(),
                authority: ctx.accounts.curve.to_account_info(),
            },
            &[seeds],
        ),
        quote.base_out,
    )?;

    let (treasury_fee, referral_fee) = match &referral {
        Some(_) => (quote.fee_treasury, quote.fee_referral),
        None => (quote.fee_treasury + quote.fee_referral, 0),
    };
    if treasury_fee > 0 {
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.reserve_vault.to_account_info(),
                    to: ctx.accounts.treasury_base.to_account_info(),
                    authority: ctx.accounts.curve.to_account_info(),
                },
                &[seeds],
            ),
            treasury_fee,
        )?;
    }
    if let Some(referral_info) = referral {
        if referral_fee > 0 {
            token::transfer(
                CpiContext::new_with_signer(
                    ctx.accounts.token_program.to_account_info(),
                    Transfer {
                        from: ctx.accounts.reserve_vault.to_account_info(),
                        to: referral_info,
                        authority: ctx.accounts.curve.to_account_info(),
                    },
                    &[seeds],
                ),
                referral_fee,
            )?;
        }
    }

    let curve = &ctx.accounts.curve;
    emit!(CurveSell {
        seller: ctx.accounts.seller.key(),
        recipient: ctx.accounts.recipient_base.owner,
        token_in,
        base_out: quote.base_out,
        fee_floor: quote.fee_floor,
        fee_treasury: quote.fee_treasury,
        fee_referral: quote.fee_referral,
        floor_price: curve.floor_price()?,
        market_price: curve.market_price()?,
    });

    Ok(())
}
