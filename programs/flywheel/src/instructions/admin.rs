use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::errors::FlywheelError;
use crate::events::{
    AuthorityTransferred, GaugeKilled, GaugeRevived, ParametersUpdated, PauseSet, PluginAdded,
};
use crate::state::*;

/// Register a plugin: the plugin record, its gauge, its bribe and the
/// gauge's emission vault are created atomically and never destroyed.
#[derive(Accounts)]
pub struct AddPlugin<'info> {
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
        seeds = [VOTER_SEED],
        bump = voter.bump
    )]
    pub voter: Account<'info, VoterState>,

    /// CHECK: Adapter address for the new plugin; the only signer allowed
    /// to move the gauge's balances
    #[account(
        constraint = adapter.key() != Pubkey::default() @ FlywheelError::InvalidZeroAddress
    )]
    pub adapter: UncheckedAccount<'info>,

    #[account(
        init,
        payer = authority,
        space = GaugeState::LEN,
        seeds = [GAUGE_SEED, &[voter.plugin_count]],
        bump
    )]
    pub gauge_state: Account<'info, GaugeState>,

    #[account(
        init,
        payer = authority,
        space = BribeState::LEN,
        seeds = [BRIBE_SEED, &[voter.plugin_count]],
        bump
    )]
    pub bribe_state: Account<'info, BribeState>,

    #[account(address = voter.otoken_mint)]
    pub otoken_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = authority,
        seeds = [GAUGE_REWARD_VAULT_SEED, &[voter.plugin_count]],
        bump,
        token::mint = otoken_mint,
        token::authority = voter
    )]
    pub gauge_reward_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn add_plugin_handler(ctx: Context<AddPlugin>) -> Result<()> {
    let otoken = ctx.accounts.voter.otoken_mint;
    let index = ctx
        .accounts
        .voter
        .add_plugin(ctx.accounts.adapter.key())?;

    let gauge = &mut ctx.accounts.gauge_state;
    gauge.plugin_index = index;
    gauge.rewards.add_reward_token(otoken)?;
    gauge.bump = ctx.bumps.gauge_state;

    let bribe = &mut ctx.accounts.bribe_state;
    bribe.plugin_index = index;
    bribe.bump = ctx.bumps.bribe_state;

    emit!(PluginAdded {
        plugin_index: index,
        adapter: ctx.accounts.adapter.key(),
        gauge: gauge.key(),
        bribe: bribe.key(),
    });

    Ok(())
}

#[derive(Accounts)]
pub struct SetGaugeStatus<'info> {
    #[account(
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
        seeds = [VOTER_SEED],
        bump = voter.bump
    )]
    pub voter: Account<'info, VoterState>,
}

pub fn kill_gauge_handler(ctx: Context<SetGaugeStatus>, plugin_index: u8) -> Result<()> {
    ctx.accounts.voter.kill_gauge(plugin_index)?;
    emit!(GaugeKilled { plugin_index });
    Ok(())
}

pub fn revive_gauge_handler(ctx: Context<SetGaugeStatus>, plugin_index: u8) -> Result<()> {
    ctx.accounts.voter.revive_gauge(plugin_index)?;
    emit!(GaugeRevived { plugin_index });
    Ok(())
}

/// Update emission and fee parameters
/// Only callable by the governance authority
#[derive(Accounts)]
pub struct UpdateParameters<'info> {
    #[account(
        address = config.authority @ FlywheelError::NotAuthorizedGovernance
    )]
    pub authority: Signer<'info>,

    #[account(
        mut,
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
}

pub fn update_parameters_handler(
    ctx: Context<UpdateParameters>,
    new_growth_rate_bps: Option<u16>,
    new_team_rate_bps: Option<u16>,
    new_swap_fee_bps: Option<u16>,
) -> Result<()> {
    let config = &mut ctx.accounts.config;

    if let Some(rate) = new_growth_rate_bps {
        require!(rate <= MAX_GROWTH_RATE_BPS, FlywheelError::GrowthRateTooHigh);
        config.growth_rate_bps = rate;
    }

    if let Some(rate) = new_team_rate_bps {
        require!(rate <= MAX_TEAM_RATE_BPS, FlywheelError::FeeTooHigh);
        config.team_rate_bps = rate;
    }

    if let Some(fee) = new_swap_fee_bps {
        require!(fee <= MAX_SWAP_FEE_BPS, FlywheelError::FeeTooHigh);
        ctx.accounts.curve.swap_fee_bps = fee;
    }

    emit!(ParametersUpdated {
        growth_rate_bps: config.growth_rate_bps,
        team_rate_bps: config.team_rate_bps,
        swap_fee_bps: ctx.accounts.curve.swap_fee_bps,
    });

    Ok(())
}

/// Pause/unpause user-facing mutations (emergency)
#[derive(Accounts)]
pub struct SetPaused<'info> {
    #[account(
        address = config.authority @ FlywheelError::NotAuthorizedGovernance
    )]
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, ProtocolConfig>,
}

pub fn set_paused_handler(ctx: Context<SetPaused>, paused: bool) -> Result<()> {
    ctx.accounts.config.paused = paused;
    emit!(PauseSet { paused });
    Ok(())
}

/// Transfer the governance authority
#[derive(Accounts)]
pub struct TransferAuthority<'info> {
    #[account(
        address = config.authority @ FlywheelError::NotAuthorizedGovernance
    )]
    pub authority: Signer<'info>,

    /// CHECK: New governance authority
    #[account(
        constraint = new_authority.key() != Pubkey::default() @ FlywheelError::InvalidZeroAddress
    )]
    pub new_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, ProtocolConfig>,
}

pub fn transfer_authority_handler(ctx: Context<TransferAuthority>) -> Result<()> {
    let config = &mut ctx.accounts.config;
    let old_authority = config.authority;
    config.authority = ctx.accounts.new_authority.key();

    emit!(AuthorityTransferred {
        old_authority,
        new_authority: config.authority,
    });

    Ok(())
}
