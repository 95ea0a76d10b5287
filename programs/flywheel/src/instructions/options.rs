use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, MintTo, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::FlywheelError;
use crate::events::{OptionBurnedForEscrow, OptionExercised, Redeemed};
use crate::state::*;

#[derive(Accounts)]
pub struct Exercise<'info> {
    pub user: Signer<'info>,

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
        address = curve.otoken_mint
    )]
    pub otoken_mint: Account<'info, Mint>,

    /// Option tokens burned by the exercise
    #[account(
        mut,
        constraint = user_otoken.mint == curve.otoken_mint @ FlywheelError::InvalidRewardVault
    )]
    pub user_otoken: Account<'info, TokenAccount>,

    /// Reserve asset paying the floor-price strike
    #[account(
        mut,
        constraint = user_base.mint == curve.base_mint @ FlywheelError::InvalidRewardVault
    )]
    pub user_base: Account<'info, TokenAccount>,

    /// Destination for the minted curve tokens
    #[account(
        mut,
        constraint = recipient_token.mint == curve.token_mint @ FlywheelError::InvalidRewardVault
    )]
    pub recipient_token: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [RESERVE_VAULT_SEED],
        bump
    )]
    pub reserve_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn exercise_handler(ctx: Context<Exercise>, amount: u64) -> Result<()> {
    require!(!ctx.accounts.config.paused, FlywheelError::ProtocolPaused);

    let base_paid = ctx.accounts.curve.apply_exercise(amount)?;
    let floor_price = ctx.accounts.curve.floor_price()?;

    token::burn(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.otoken_mint.to_account_info(),
                from: ctx.accounts.user_otoken.to_account_info(),
                authority: ctx.accounts.user.to_account_info(),
            },
        ),
        amount,
    )?;

    if base_paid > 0 {
        token::transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.user_base.to_account_info(),
                    to: ctx.accounts.reserve_vault.to_account_info(),
                    authority: ctx.accounts.user.to_account_info(),
                },
            ),
            base_paid,
        )?;
    }

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
        amount,
    )?;

    emit!(OptionExercised {
        account: ctx.accounts.user.key(),
        recipient: ctx.accounts.recipient_token.owner,
        amount,
        base_paid,
        floor_price,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Redeem<'info> {
    pub user: Signer<'info>,

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

    /// Curve tokens burned at the floor price
    #[account(
        mut,
        constraint = user_token.mint == curve.token_mint @ FlywheelError::InvalidRewardVault
    )]
    pub user_token: Account<'info, TokenAccount>,

    /// Destination for the floor-price payout
    #[account(
        mut,
        constraint = recipient_base.mint == curve.base_mint @ FlywheelError::InvalidRewardVault
    )]
    pub recipient_base: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [RESERVE_VAULT_SEED],
        bump
    )]
    pub reserve_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn redeem_handler(ctx: Context<Redeem>, amount: u64) -> Result<()> {
    let floor_price = ctx.accounts.curve.floor_price()?;
    let base_out = ctx.accounts.curve.apply_redeem(amount)?;

    token::burn(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.token_mint.to_account_info(),
                from: ctx.accounts.user_token.to_account_info(),
                authority: ctx.accounts.user.to_account_info(),
            },
        ),
        amount,
    )?;

    if base_out > 0 {
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
            base_out,
        )?;
    }

    emit!(Redeemed {
        account: ctx.accounts.user.key(),
        recipient: ctx.accounts.recipient_base.owner,
        token_in: amount,
        base_out,
        floor_price,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct BurnFor<'info> {
    #[account(mut)]
    pub caller: Signer<'info>,

    /// CHECK: Account receiving the escrow credit; any address, gated below
    pub beneficiary: UncheckedAccount<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, ProtocolConfig>,

    #[account(
        seeds = [CURVE_SEED],
        bump = curve.bump
    )]
    pub curve: Account<'info, CurveState>,

    #[account(
        mut,
        seeds = [ESCROW_SEED],
        bump = escrow.bump
    )]
    pub escrow: Account<'info, EscrowState>,

    #[account(
        init_if_needed,
        payer = caller,
        space = EscrowAccount::LEN,
        seeds = [ESCROW_ACCOUNT_SEED, beneficiary.key().as_ref()],
        bump
    )]
    pub escrow_account: Account<'info, EscrowAccount>,

    #[account(
        mut,
        address = curve.otoken_mint
    )]
    pub otoken_mint: Account<'info, Mint>,

    /// Caller's option tokens, burned for the credit
    #[account(
        mut,
        constraint = caller_otoken.mint == curve.otoken_mint @ FlywheelError::InvalidRewardVault
    )]
    pub caller_otoken: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn burn_for_handler(ctx: Context<BurnFor>, amount: u64) -> Result<()> {
    require!(!ctx.accounts.config.paused, FlywheelError::ProtocolPaused);
    require!(amount > 0, FlywheelError::InvalidZeroInput);

    // Self-service burn, or the rewarder topping up any account
    let caller = ctx.accounts.caller.key();
    let beneficiary = ctx.accounts.beneficiary.key();
    require!(
        caller == beneficiary || caller == ctx.accounts.config.rewarder,
        FlywheelError::NotAuthorizedRewarder
    );

    let clock = Clock::get()?;
    let escrow = &mut ctx.accounts.escrow;
    let account = &mut ctx.accounts.escrow_account;
    if account.owner == Pubkey::default() {
        account.owner = beneficiary;
        account.bump = ctx.bumps.escrow_account;
    }

    // Settle reward checkpoints before the balance change
    escrow
        .rewards
        .settle(clock.unix_timestamp, account.balance, &mut account.rewards)?;

    account.balance = account
        .balance
        .checked_add(amount)
        .ok_or(FlywheelError::MathOverflow)?;
    account.burned_credit = account
        .burned_credit
        .checked_add(amount)
        .ok_or(FlywheelError::MathOverflow)?;
    escrow.rewards.total_supply = escrow
        .rewards
        .total_supply
        .checked_add(amount)
        .ok_or(FlywheelError::MathOverflow)?;

    token::burn(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.otoken_mint.to_account_info(),
                from: ctx.accounts.caller_otoken.to_account_info(),
                authority: ctx.accounts.caller.to_account_info(),
            },
        ),
        amount,
    )?;

    emit!(OptionBurnedForEscrow {
        caller,
        account: beneficiary,
        amount,
        balance: account.balance,
    });

    Ok(())
}
