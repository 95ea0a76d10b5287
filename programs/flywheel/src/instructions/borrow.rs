use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::FlywheelError;
use crate::events::{Borrowed, Repaid};
use crate::state::*;

#[derive(Accounts)]
pub struct Borrow<'info> {
    #[account(mut)]
    pub borrower: Signer<'info>,

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

    /// Escrowed balance backing the loan
    #[account(
        seeds = [ESCROW_ACCOUNT_SEED, borrower.key().as_ref()],
        bump = escrow_account.bump,
        constraint = escrow_account.owner == borrower.key() @ FlywheelError::NotAuthorizedUser
    )]
    pub escrow_account: Account<'info, EscrowAccount>,

    #[account(
        init_if_needed,
        payer = borrower,
        space = BorrowPosition::LEN,
        seeds = [BORROW_SEED, borrower.key().as_ref()],
        bump
    )]
    pub borrow_position: Account<'info, BorrowPosition>,

    #[account(
        mut,
        seeds = [RESERVE_VAULT_SEED],
        bump
    )]
    pub reserve_vault: Account<'info, TokenAccount>,

    /// Borrower's reserve asset account, credited with the loan
    #[account(
        mut,
        constraint = borrower_base.mint == curve.base_mint @ FlywheelError::InvalidRewardVault
    )]
    pub borrower_base: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn borrow_handler(ctx: Context<Borrow>, amount: u64) -> Result<()> {
    require!(!ctx.accounts.config.paused, FlywheelError::ProtocolPaused);

    let position = &mut ctx.accounts.borrow_position;
    if position.owner == Pubkey::default() {
        position.owner = ctx.accounts.borrower.key();
        position.bump = ctx.bumps.borrow_position;
    }

    let credit = ctx
        .accounts
        .curve
        .credit_limit(ctx.accounts.escrow_account.balance)?;
    let new_debt = ctx
        .accounts
        .curve
        .apply_borrow(position.debt, amount, credit)?;
    position.debt = new_debt;

    let curve_bump = ctx.accounts.curve.bump;
    let seeds: &[&[u8]] = &[CURVE_SEED, &[curve_bump]];
    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.reserve_vault.to_account_info(),
                to: ctx.accounts.borrower_base.to_account_info(),
                authority: ctx.accounts.curve.to_account_info(),
            },
            &[seeds],
        ),
        amount,
    )?;

    emit!(Borrowed {
        account: ctx.accounts.borrower.key(),
        amount,
        total_debt: position.debt,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Repay<'info> {
    pub borrower: Signer<'info>,

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
        seeds = [BORROW_SEED, borrower.key().as_ref()],
        bump = borrow_position.bump,
        constraint = borrow_position.owner == borrower.key() @ FlywheelError::NotAuthorizedUser
    )]
    pub borrow_position: Account<'info, BorrowPosition>,

    #[account(
        mut,
        seeds = [RESERVE_VAULT_SEED],
        bump
    )]
    pub reserve_vault: Account<'info, TokenAccount>,

    /// Borrower's reserve asset account, debited by the repayment
    #[account(
        mut,
        constraint = borrower_base.mint == curve.base_mint @ FlywheelError::InvalidRewardVault
    )]
    pub borrower_base: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn repay_handler(ctx: Context<Repay>, amount: u64) -> Result<()> {
    let position = &mut ctx.accounts.borrow_position;

    let remaining = ctx.accounts.curve.apply_repay(position.debt, amount)?;
    position.debt = remaining;

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.borrower_base.to_account_info(),
                to: ctx.accounts.reserve_vault.to_account_info(),
                authority: ctx.accounts.borrower.to_account_info(),
            },
        ),
        amount,
    )?;

    emit!(Repaid {
        account: ctx.accounts.borrower.key(),
        amount,
        remaining_debt: position.debt,
    });

    Ok(())
}
