use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::FlywheelError;
use crate::events::{GaugeDeposit, GaugeWithdraw, RewardClaimed};
use crate::state::*;

/// Book a plugin deposit into the gauge. Only the registered plugin
/// adapter may move gauge balances; the gauge itself never touches the
/// wrapped external protocol.
#[derive(Accounts)]
#[instruction(plugin_index: u8)]
pub struct GaugeDepositIx<'info> {
    #[account(mut)]
    pub adapter: Signer<'info>,

    /// CHECK: The depositor credited with the gauge balance
    pub beneficiary: UncheckedAccount<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, ProtocolConfig>,

    #[account(
        seeds = [VOTER_SEED],
        bump = voter.bump
    )]
    pub voter: Account<'info, VoterState>,

    #[account(
        mut,
        seeds = [GAUGE_SEED, &[plugin_index]],
        bump = gauge_state.bump
    )]
    pub gauge_state: Account<'info, GaugeState>,

    #[account(
        init_if_needed,
        payer = adapter,
        space = GaugeAccount::LEN,
        seeds = [GAUGE_ACCOUNT_SEED, &[plugin_index], beneficiary.key().as_ref()],
        bump
    )]
    pub gauge_account: Account<'info, GaugeAccount>,

    pub system_program: Program<'info, System>,
}

pub fn gauge_deposit_handler(
    ctx: Context<GaugeDepositIx>,
    plugin_index: u8,
    amount: u64,
) -> Result<()> {
    require!(!ctx.accounts.config.paused, FlywheelError::ProtocolPaused);
    require!(amount > 0, FlywheelError::InvalidZeroInput);

    let plugin = ctx.accounts.voter.plugin(plugin_index)?;
    require!(
        plugin.adapter == ctx.accounts.adapter.key(),
        FlywheelError::NotAuthorizedPlugin
    );
    require!(plugin.alive, FlywheelError::GaugeIsDead);

    let clock = Clock::get()?;
    let gauge = &mut ctx.accounts.gauge_state;
    let account = &mut ctx.accounts.gauge_account;
    if account.owner == Pubkey::default() {
        account.owner = ctx.accounts.beneficiary.key();
        account.plugin_index = plugin_index;
        account.bump = ctx.bumps.gauge_account;
    }

    gauge
        .rewards
        .settle(clock.unix_timestamp, account.balance, &mut account.rewards)?;

    account.balance = account
        .balance
        .checked_add(amount)
        .ok_or(FlywheelError::MathOverflow)?;
    gauge.rewards.total_supply = gauge
        .rewards
        .total_supply
        .checked_add(amount)
        .ok_or(FlywheelError::MathOverflow)?;

    emit!(GaugeDeposit {
        plugin_index,
        account: account.owner,
        amount,
        balance: account.balance,
    });

    Ok(())
}

/// Book a plugin withdrawal out of the gauge. Withdrawals stay open when
/// the plugin is dead so depositors can always exit.
#[derive(Accounts)]
#[instruction(plugin_index: u8)]
pub struct GaugeWithdrawIx<'info> {
    pub adapter: Signer<'info>,

    /// CHECK: The depositor whose gauge balance is released
    pub beneficiary: UncheckedAccount<'info>,

    #[account(
        seeds = [VOTER_SEED],
        bump = voter.bump
    )]
    pub voter: Account<'info, VoterState>,

    #[account(
        mut,
        seeds = [GAUGE_SEED, &[plugin_index]],
        bump = gauge_state.bump
    )]
    pub gauge_state: Account<'info, GaugeState>,

    #[account(
        mut,
        seeds = [GAUGE_ACCOUNT_SEED, &[plugin_index], beneficiary.key().as_ref()],
        bump = gauge_account.bump,
        constraint = gauge_account.owner == beneficiary.key() @ FlywheelError::NotAuthorizedUser
    )]
    pub gauge_account: Account<'info, GaugeAccount>,
}

pub fn gauge_withdraw_handler(
    ctx: Context<GaugeWithdrawIx>,
    plugin_index: u8,
    amount: u64,
) -> Result<()> {
    require!(amount > 0, FlywheelError::InvalidZeroInput);

    let plugin = ctx.accounts.voter.plugin(plugin_index)?;
    require!(
        plugin.adapter == ctx.accounts.adapter.key(),
        FlywheelError::NotAuthorizedPlugin
    );

    let clock = Clock::get()?;
    let gauge = &mut ctx.accounts.gauge_state;
    let account = &mut ctx.accounts.gauge_account;

    gauge
        .rewards
        .settle(clock.unix_timestamp, account.balance, &mut account.rewards)?;

    account.balance = account
        .balance
        .checked_sub(amount)
        .ok_or(FlywheelError::ExceedsDepositedBalance)?;
    gauge.rewards.total_supply = gauge
        .rewards
        .total_supply
        .checked_sub(amount)
        .ok_or(FlywheelError::MathOverflow)?;

    emit!(GaugeWithdraw {
        plugin_index,
        account: account.owner,
        amount,
        balance: account.balance,
    });

    Ok(())
}

/// Pay out a depositor's earned gauge emissions. Callable by the
/// depositor, or by the plugin adapter on the depositor's behalf.
#[derive(Accounts)]
#[instruction(plugin_index: u8)]
pub struct ClaimGaugeRewards<'info> {
    pub claimer: Signer<'info>,

    /// CHECK: The depositor whose rewards are settled
    pub beneficiary: UncheckedAccount<'info>,

    #[account(
        seeds = [VOTER_SEED],
        bump = voter.bump
    )]
    pub voter: Account<'info, VoterState>,

    #[account(
        mut,
        seeds = [GAUGE_SEED, &[plugin_index]],
        bump = gauge_state.bump
    )]
    pub gauge_state: Account<'info, GaugeState>,

    #[account(
        mut,
        seeds = [GAUGE_ACCOUNT_SEED, &[plugin_index], beneficiary.key().as_ref()],
        bump = gauge_account.bump,
        constraint = gauge_account.owner == beneficiary.key() @ FlywheelError::NotAuthorizedUser
    )]
    pub gauge_account: Account<'info, GaugeAccount>,

    #[account(
        mut,
        seeds = [GAUGE_REWARD_VAULT_SEED, &[plugin_index]],
        bump
    )]
    pub gauge_reward_vault: Account<'info, TokenAccount>,

    /// Destination for the claimed option tokens
    #[account(
        mut,
        constraint = recipient_otoken.mint == voter.otoken_mint @ FlywheelError::InvalidRewardVault
    )]
    pub recipient_otoken: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn claim_gauge_rewards_handler(ctx: Context<ClaimGaugeRewards>, plugin_index: u8) -> Result<()> {
    let plugin = ctx.accounts.voter.plugin(plugin_index)?;
    let claimer = ctx.accounts.claimer.key();
    require!(
        claimer == ctx.accounts.gauge_account.owner || claimer == plugin.adapter,
        FlywheelError::NotAuthorizedUser
    );

    let clock = Clock::get()?;
    let otoken = ctx.accounts.voter.otoken_mint;
    {
        let gauge = &mut ctx.accounts.gauge_state;
        let account = &mut ctx.accounts.gauge_account;
        gauge
            .rewards
            .settle(clock.unix_timestamp, account.balance, &mut account.rewards)?;
    }

    let index = ctx
        .accounts
        .gauge_state
        .rewards
        .token_index(&otoken)
        .ok_or(FlywheelError::NotRewardToken)?;
    let amount = ctx.accounts.gauge_account.rewards.pending[index];
    if amount == 0 {
        return Ok(());
    }
    ctx.accounts.gauge_account.rewards.pending[index] = 0;

    let voter_bump = ctx.accounts.voter.bump;
    let seeds: &[&[u8]] = &[VOTER_SEED, &[voter_bump]];
    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.gauge_reward_vault.to_account_info(),
                to: ctx.accounts.recipient_otoken.to_account_info(),
                authority: ctx.accounts.voter.to_account_info(),
            },
            &[seeds],
        ),
        amount,
    )?;

    emit!(RewardClaimed {
        pool: ctx.accounts.gauge_state.key(),
        account: ctx.accounts.gauge_account.owner,
        reward_mint: otoken,
        amount,
    });

    Ok(())
}
