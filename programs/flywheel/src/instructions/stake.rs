use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::FlywheelError;
use crate::events::{RewardClaimed, RewardNotified, RewardTokenAdded, Staked, Unstaked};
use crate::state::*;

#[derive(Accounts)]
pub struct Stake<'info> {
    #[account(mut)]
    pub staker: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, ProtocolConfig>,

    #[account(
        mut,
        seeds = [ESCROW_SEED],
        bump = escrow.bump
    )]
    pub escrow: Account<'info, EscrowState>,

    #[account(
        init_if_needed,
        payer = staker,
        space = EscrowAccount::LEN,
        seeds = [ESCROW_ACCOUNT_SEED, staker.key().as_ref()],
        bump
    )]
    pub escrow_account: Account<'info, EscrowAccount>,

    #[account(
        mut,
        seeds = [ESCROW_VAULT_SEED],
        bump
    )]
    pub escrow_vault: Account<'info, TokenAccount>,

    /// Staker's curve token account, debited by `amount`
    #[account(
        mut,
        constraint = staker_token.mint == escrow_vault.mint @ FlywheelError::InvalidRewardVault
    )]
    pub staker_token: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn stake_handler(ctx: Context<Stake>, amount: u64) -> Result<()> {
    require!(!ctx.accounts.config.paused, FlywheelError::ProtocolPaused);
    require!(amount > 0, FlywheelError::InvalidZeroInput);

    let clock = Clock::get()?;
    let escrow = &mut ctx.accounts.escrow;
    let account = &mut ctx.accounts.escrow_account;
    if account.owner == Pubkey::default() {
        account.owner = ctx.accounts.staker.key();
        account.bump = ctx.bumps.escrow_account;
    }

    // Settle reward checkpoints before the balance change
    escrow
        .rewards
        .settle(clock.unix_timestamp, account.balance, &mut account.rewards)?;

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.staker_token.to_account_info(),
                to: ctx.accounts.escrow_vault.to_account_info(),
                authority: ctx.accounts.staker.to_account_info(),
            },
        ),
        amount,
    )?;

    account.balance = account
        .balance
        .checked_add(amount)
        .ok_or(FlywheelError::MathOverflow)?;
    escrow.rewards.total_supply = escrow
        .rewards
        .total_supply
        .checked_add(amount)
        .ok_or(FlywheelError::MathOverflow)?;

    emit!(Staked {
        account: account.owner,
        amount,
        balance: account.balance,
        total_locked: escrow.total_locked(),
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Unstake<'info> {
    #[account(mut)]
    pub staker: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, ProtocolConfig>,

    #[account(
        mut,
        seeds = [ESCROW_SEED],
        bump = escrow.bump
    )]
    pub escrow: Account<'info, EscrowState>,

    #[account(
        mut,
        seeds = [ESCROW_ACCOUNT_SEED, staker.key().as_ref()],
        bump = escrow_account.bump,
        constraint = escrow_account.owner == staker.key() @ FlywheelError::NotAuthorizedUser
    )]
    pub escrow_account: Account<'info, EscrowAccount>,

    /// Debt record gating the withdrawal; created empty for accounts that
    /// never borrowed so the collateral check cannot be skipped
    #[account(
        init_if_needed,
        payer = staker,
        space = BorrowPosition::LEN,
        seeds = [BORROW_SEED, staker.key().as_ref()],
        bump
    )]
    pub borrow_position: Account<'info, BorrowPosition>,

    #[account(
        mut,
        seeds = [ESCROW_VAULT_SEED],
        bump
    )]
    pub escrow_vault: Account<'info, TokenAccount>,

    /// Destination for the unstaked curve tokens
    #[account(
        mut,
        constraint = staker_token.mint == escrow_vault.mint @ FlywheelError::InvalidRewardVault
    )]
    pub staker_token: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn unstake_handler(ctx: Context<Unstake>, amount: u64) -> Result<()> {
    require!(!ctx.accounts.config.paused, FlywheelError::ProtocolPaused);

    let position = &mut ctx.accounts.borrow_position;
    if position.owner == Pubkey::default() {
        position.owner = ctx.accounts.staker.key();
        position.bump = ctx.bumps.borrow_position;
    }

    let clock = Clock::get()?;
    let escrow = &mut ctx.accounts.escrow;
    let account = &mut ctx.accounts.escrow_account;

    account.check_unstake(amount, position.debt)?;

    escrow
        .rewards
        .settle(clock.unix_timestamp, account.balance, &mut account.rewards)?;

    account.balance = account
        .balance
        .checked_sub(amount)
        .ok_or(FlywheelError::ExceedsWithdrawableBalance)?;
    escrow.rewards.total_supply = escrow
        .rewards
        .total_supply
        .checked_sub(amount)
        .ok_or(FlywheelError::MathOverflow)?;

    let escrow_bump = ctx.accounts.escrow.bump;
    let seeds: &[&[u8]] = &[ESCROW_SEED, &[escrow_bump]];
    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.escrow_vault.to_account_info(),
                to: ctx.accounts.staker_token.to_account_info(),
                authority: ctx.accounts.escrow.to_account_info(),
            },
            &[seeds],
        ),
        amount,
    )?;

    let escrow = &ctx.accounts.escrow;
    let account = &ctx.accounts.escrow_account;
    emit!(Unstaked {
        account: account.owner,
        amount,
        balance: account.balance,
        total_locked: escrow.total_locked(),
    });

    Ok(())
}

#[derive(Accounts)]
pub struct ClaimEscrowRewards<'info> {
    pub staker: Signer<'info>,

    #[account(
        mut,
        seeds = [ESCROW_SEED],
        bump = escrow.bump
    )]
    pub escrow: Account<'info, EscrowState>,

    #[account(
        mut,
        seeds = [ESCROW_ACCOUNT_SEED, staker.key().as_ref()],
        bump = escrow_account.bump,
        constraint = escrow_account.owner == staker.key() @ FlywheelError::NotAuthorizedUser
    )]
    pub escrow_account: Account<'info, EscrowAccount>,

    pub token_program: Program<'info, Token>,
    // remaining_accounts, one pair per registered reward token in stream
    // order: [reward vault (writable), staker token account (writable)]
}

pub fn claim_escrow_rewards_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, ClaimEscrowRewards<'info>>,
) -> Result<()> {
    let clock = Clock::get()?;
    let escrow_key = ctx.accounts.escrow.key();
    let escrow_bump = ctx.accounts.escrow.bump;

    {
        let escrow = &mut ctx.accounts.escrow;
        let account = &mut ctx.accounts.escrow_account;
        escrow
            .rewards
            .settle(clock.unix_timestamp, account.balance, &mut account.rewards)?;
    }

    let reward_count = ctx.accounts.escrow.rewards.reward_count as usize;
    require!(
        ctx.remaining_accounts.len() >= reward_count * 2,
        FlywheelError::InvalidRewardVault
    );

    let seeds: &[&[u8]] = &[ESCROW_SEED, &[escrow_bump]];
    for i in 0..reward_count {
        let amount = ctx.accounts.escrow_account.rewards.pending[i];
        let mint = ctx.accounts.escrow.rewards.streams[i].mint;

        let vault_info = &ctx.remaining_accounts[i * 2];
        let dest_info = &ctx.remaining_accounts[i * 2 + 1];
        let vault = Account::<TokenAccount>::try_from(vault_info)?;
        let dest = Account::<TokenAccount>::try_from(dest_info)?;
        require!(
            vault.owner == escrow_key && vault.mint == mint,
            FlywheelError::InvalidRewardVault
        );
        require!(dest.mint == mint, FlywheelError::InvalidRewardVault);

        if amount == 0 {
            continue;
        }
        ctx.accounts.escrow_account.rewards.pending[i] = 0;

        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: vault_info.clone(),
                    to: dest_info.clone(),
                    authority: ctx.accounts.escrow.to_account_info(),
                },
                &[seeds],
            ),
            amount,
        )?;

        emit!(RewardClaimed {
            pool: escrow_key,
            account: ctx.accounts.staker.key(),
            reward_mint: mint,
            amount,
        });
    }

    Ok(())
}

#[derive(Accounts)]
pub struct AddEscrowRewardToken<'info> {
    #[account(
        mut,
        address = config.authority @ FlywheelError::NotAuthorizedGovernance
    )]
    pub authority: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, ProtocolConfig>,

    #[account(
        mut,
        seeds = [ESCROW_SEED],
        bump = escrow.bump
    )]
    pub escrow: Account<'info, EscrowState>,

    pub reward_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = authority,
        seeds = [ESCROW_REWARD_VAULT_SEED, reward_mint.key().as_ref()],
        bump,
        token::mint = reward_mint,
        token::authority = escrow
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn add_escrow_reward_token_handler(ctx: Context<AddEscrowRewardToken>) -> Result<()> {
    let escrow = &mut ctx.accounts.escrow;
    escrow
        .rewards
        .add_reward_token(ctx.accounts.reward_mint.key())?;

    emit!(RewardTokenAdded {
        pool: escrow.key(),
        reward_mint: ctx.accounts.reward_mint.key(),
    });

    Ok(())
}

#[derive(Accounts)]
pub struct NotifyEscrowReward<'info> {
    #[account(
        address = config.rewarder @ FlywheelError::NotAuthorizedRewarder
    )]
    pub rewarder: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, ProtocolConfig>,

    #[account(
        mut,
        seeds = [ESCROW_SEED],
        bump = escrow.bump
    )]
    pub escrow: Account<'info, EscrowState>,

    pub reward_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [ESCROW_REWARD_VAULT_SEED, reward_mint.key().as_ref()],
        bump
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    /// Rewarder's token account funding the stream
    #[account(
        mut,
        constraint = rewarder_token.mint == reward_mint.key() @ FlywheelError::InvalidRewardVault
    )]
    pub rewarder_token: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn notify_escrow_reward_handler(ctx: Context<NotifyEscrowReward>, amount: u64) -> Result<()> {
    let clock = Clock::get()?;
    let mint = ctx.accounts.reward_mint.key();

    let index = ctx
        .accounts
        .escrow
        .rewards
        .token_index(&mint)
        .ok_or(FlywheelError::NotRewardToken)?;

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.rewarder_token.to_account_info(),
                to: ctx.accounts.reward_vault.to_account_info(),
                authority: ctx.accounts.rewarder.to_account_info(),
            },
        ),
        amount,
    )?;

    ctx.accounts
        .escrow
        .rewards
        .notify(index, amount, clock.unix_timestamp)?;

    emit!(RewardNotified {
        pool: ctx.accounts.escrow.key(),
        reward_mint: mint,
        amount,
    });

    Ok(())
}
