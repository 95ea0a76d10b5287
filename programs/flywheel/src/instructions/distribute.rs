use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::FlywheelError;
use crate::events::{BribeDeposited, BribesDistributed, EmissionDistributed};
use crate::state::*;

/// Epoch-boundary gauge emission. Permissionless; the first call of an
/// epoch freezes the weight snapshot, every further call for an already
/// distributed plugin is a no-op.
#[derive(Accounts)]
#[instruction(plugin_index: u8)]
pub struct Distribute<'info> {
    pub caller: Signer<'info>,

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
        address = voter.otoken_mint
    )]
    pub otoken_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [GAUGE_REWARD_VAULT_SEED, &[plugin_index]],
        bump
    )]
    pub gauge_reward_vault: Account<'info, TokenAccount>,

    /// Treasury's option token account receiving the team slice
    #[account(
        mut,
        constraint = treasury_otoken.owner == config.treasury @ FlywheelError::InvalidRewardVault,
        constraint = treasury_otoken.mint == voter.otoken_mint @ FlywheelError::InvalidRewardVault
    )]
    pub treasury_otoken: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn distribute_handler(ctx: Context<Distribute>, plugin_index: u8) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;
    let epoch = epoch_of(now);

    // Freeze this epoch's weights and emission on first touch
    let curve_supply = ctx.accounts.curve.supply;
    let growth_rate_bps = ctx.accounts.config.growth_rate_bps;
    ctx.accounts
        .voter
        .roll_epoch(now, curve_supply, growth_rate_bps)?;

    {
        let plugin = ctx.accounts.voter.plugin(plugin_index)?;
        require!(plugin.alive, FlywheelError::GaugeIsDead);
        // Repeat calls inside one epoch distribute nothing
        if plugin.last_gauge_epoch >= epoch {
            return Ok(());
        }
    }

    let share = ctx.accounts.voter.emission_share(plugin_index)?;
    let team_amount = mul_div(
        share as u128,
        ctx.accounts.config.team_rate_bps as u128,
        BPS_DENOMINATOR as u128,
    )? as u64;
    let gauge_amount = share
        .checked_sub(team_amount)
        .ok_or(FlywheelError::MathOverflow)?;

    ctx.accounts
        .voter
        .plugin_mut(plugin_index)?
        .last_gauge_epoch = epoch;

    if share == 0 {
        return Ok(());
    }

    let voter_bump = ctx.accounts.voter.bump;
    let seeds: &[&[u8]] = &[VOTER_SEED, &[voter_bump]];

    if team_amount > 0 {
        token::mint_to(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                MintTo {
                    mint: ctx.accounts.otoken_mint.to_account_info(),
                    to: ctx.accounts.treasury_otoken.to_account_info(),
                    authority: ctx.accounts.voter.to_account_info(),
                },
                &[seeds],
            ),
            team_amount,
        )?;
    }

    token::mint_to(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            MintTo {
                mint: ctx.accounts.otoken_mint.to_account_info(),
                to: ctx.accounts.gauge_reward_vault.to_account_info(),
                authority: ctx.accounts.voter.to_account_info(),
            },
            &[seeds],
        ),
        gauge_amount,
    )?;

    let otoken = ctx.accounts.voter.otoken_mint;
    let gauge = &mut ctx.accounts.gauge_state;
    let index = gauge
        .rewards
        .token_index(&otoken)
        .ok_or(FlywheelError::NotRewardToken)?;
    gauge.rewards.notify(index, gauge_amount, now)?;

    emit!(EmissionDistributed {
        plugin_index,
        epoch,
        gauge_amount,
        team_amount,
    });

    Ok(())
}

/// Third parties escrow bribe rewards against a plugin; amounts sit in
/// `pending` until the epoch-boundary distribution folds them into the
/// vote-weight streams.
#[derive(Accounts)]
#[instruction(plugin_index: u8)]
pub struct DepositBribe<'info> {
    pub depositor: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, ProtocolConfig>,

    #[account(
        mut,
        seeds = [BRIBE_SEED, &[plugin_index]],
        bump = bribe_state.bump
    )]
    pub bribe_state: Account<'info, BribeState>,

    pub reward_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [BRIBE_REWARD_VAULT_SEED, &[plugin_index], reward_mint.key().as_ref()],
        bump
    )]
    pub bribe_reward_vault: Account<'info, TokenAccount>,

    /// Depositor's token account funding the bribe
    #[account(
        mut,
        constraint = depositor_token.mint == reward_mint.key() @ FlywheelError::InvalidRewardVault
    )]
    pub depositor_token: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn deposit_bribe_handler(
    ctx: Context<DepositBribe>,
    plugin_index: u8,
    amount: u64,
) -> Result<()> {
    require!(!ctx.accounts.config.paused, FlywheelError::ProtocolPaused);
    require!(amount > 0, FlywheelError::InvalidZeroInput);

    let mint = ctx.accounts.reward_mint.key();
    let bribe = &mut ctx.accounts.bribe_state;
    let index = bribe
        .rewards
        .token_index(&mint)
        .ok_or(FlywheelError::NotRewardToken)?;

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.depositor_token.to_account_info(),
                to: ctx.accounts.bribe_reward_vault.to_account_info(),
                authority: ctx.accounts.depositor.to_account_info(),
            },
        ),
        amount,
    )?;

    bribe.pending[index] = bribe.pending[index]
        .checked_add(amount)
        .ok_or(FlywheelError::MathOverflow)?;

    emit!(BribeDeposited {
        plugin_index,
        depositor: ctx.accounts.depositor.key(),
        reward_mint: mint,
        amount,
    });

    Ok(())
}

/// Epoch-boundary bribe distribution. Permissionless and idempotent per
/// epoch; pending amounts too small to stream wait for the next epoch.
#[derive(Accounts)]
#[instruction(plugin_index: u8)]
pub struct DistributeBribes<'info> {
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [BRIBE_SEED, &[plugin_index]],
        bump = bribe_state.bump
    )]
    pub bribe_state: Account<'info, BribeState>,
}

pub fn distribute_bribes_handler(ctx: Context<DistributeBribes>, plugin_index: u8) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;
    let epoch = epoch_of(now);

    let bribe = &mut ctx.accounts.bribe_state;
    if bribe.last_distro_epoch >= epoch {
        return Ok(());
    }
    bribe.last_distro_epoch = epoch;

    for i in 0..bribe.rewards.reward_count as usize {
        let amount = bribe.pending[i];
        if amount < REWARD_DURATION as u64 {
            continue;
        }
        bribe.pending[i] = 0;
        bribe.rewards.notify(i, amount, now)?;
    }

    emit!(BribesDistributed {
        plugin_index,
        epoch,
    });

    Ok(())
}
