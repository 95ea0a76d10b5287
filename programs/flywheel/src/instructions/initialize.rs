use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::errors::FlywheelError;
use crate::events::{CurveInitialized, ProtocolInitialized};
use crate::state::*;

#[derive(Accounts)]
pub struct InitializeProtocol<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        init,
        payer = authority,
        space = ProtocolConfig::LEN,
        seeds = [CONFIG_SEED],
        bump
    )]
    pub config: Account<'info, ProtocolConfig>,

    /// CHECK: Treasury wallet receiving fee slices - must not be zero address
    #[account(
        constraint = treasury.key() != Pubkey::default() @ FlywheelError::InvalidZeroAddress
    )]
    pub treasury: UncheckedAccount<'info>,

    /// CHECK: Reward distributor role - must not be zero address
    #[account(
        constraint = rewarder.key() != Pubkey::default() @ FlywheelError::InvalidZeroAddress
    )]
    pub rewarder: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_protocol_handler(ctx: Context<InitializeProtocol>) -> Result<()> {
    let config = &mut ctx.accounts.config;

    config.authority = ctx.accounts.authority.key();
    config.treasury = ctx.accounts.treasury.key();
    config.rewarder = ctx.accounts.rewarder.key();

    // Default emission and fee parameters
    config.growth_rate_bps = DEFAULT_GROWTH_RATE_BPS;
    config.team_rate_bps = DEFAULT_TEAM_RATE_BPS;
    config.paused = false;

    config.bump = ctx.bumps.config;

    emit!(ProtocolInitialized {
        authority: config.authority,
        treasury: config.treasury,
        rewarder: config.rewarder,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct InitializeCurve<'info> {
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
        init,
        payer = authority,
        space = CurveState::LEN,
        seeds = [CURVE_SEED],
        bump
    )]
    pub curve: Account<'info, CurveState>,

    /// Reserve asset mint (external)
    pub base_mint: Account<'info, Mint>,

    /// Curve token mint, issued by the curve PDA
    #[account(
        init,
        payer = authority,
        seeds = [TOKEN_MINT_SEED],
        bump,
        mint::decimals = base_mint.decimals,
        mint::authority = curve
    )]
    pub token_mint: Account<'info, Mint>,

    /// CHECK: Voter state PDA, created later by initialize_voter; only its
    /// address is needed here as the option mint authority
    #[account(
        seeds = [VOTER_SEED],
        bump
    )]
    pub voter: UncheckedAccount<'info>,

    /// Option token mint, issued by the voter PDA at epoch distribution
    #[account(
        init,
        payer = authority,
        seeds = [OTOKEN_MINT_SEED],
        bump,
        mint::decimals = base_mint.decimals,
        mint::authority = voter
    )]
    pub otoken_mint: Account<'info, Mint>,

    /// Vault holding all reserve backing
    #[account(
        init,
        payer = authority,
        seeds = [RESERVE_VAULT_SEED],
        bump,
        token::mint = base_mint,
        token::authority = curve
    )]
    pub reserve_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn initialize_curve_handler(
    ctx: Context<InitializeCurve>,
    reserve_virt: u64,
    max_supply: u64,
) -> Result<()> {
    require!(
        reserve_virt > 0 && max_supply > 0,
        FlywheelError::InvalidCurveParameter
    );

    let curve = &mut ctx.accounts.curve;
    curve.base_mint = ctx.accounts.base_mint.key();
    curve.token_mint = ctx.accounts.token_mint.key();
    curve.otoken_mint = ctx.accounts.otoken_mint.key();
    curve.reserve_virt = reserve_virt;
    curve.max_supply = max_supply;
    curve.fr_base = 0;
    curve.mr_base = 0;
    curve.supply = 0;
    curve.total_debt = 0;
    curve.swap_fee_bps = DEFAULT_SWAP_FEE_BPS;
    curve.bump = ctx.bumps.curve;

    emit!(CurveInitialized {
        base_mint: curve.base_mint,
        token_mint: curve.token_mint,
        otoken_mint: curve.otoken_mint,
        reserve_virt,
        max_supply,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct InitializeEscrow<'info> {
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
        seeds = [CURVE_SEED],
        bump = curve.bump
    )]
    pub curve: Account<'info, CurveState>,

    #[account(
        init,
        payer = authority,
        space = EscrowState::LEN,
        seeds = [ESCROW_SEED],
        bump
    )]
    pub escrow: Account<'info, EscrowState>,

    #[account(address = curve.token_mint)]
    pub token_mint: Account<'info, Mint>,

    /// Vault holding all staked curve tokens
    #[account(
        init,
        payer = authority,
        seeds = [ESCROW_VAULT_SEED],
        bump,
        token::mint = token_mint,
        token::authority = escrow
    )]
    pub escrow_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn initialize_escrow_handler(ctx: Context<InitializeEscrow>) -> Result<()> {
    let escrow = &mut ctx.accounts.escrow;
    escrow.rewards = RewardPool::default();
    escrow.bump = ctx.bumps.escrow;
    Ok(())
}

#[derive(Accounts)]
pub struct InitializeVoter<'info> {
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
        seeds = [CURVE_SEED],
        bump = curve.bump
    )]
    pub curve: Account<'info, CurveState>,

    #[account(
        init,
        payer = authority,
        space = VoterState::LEN,
        seeds = [VOTER_SEED],
        bump
    )]
    pub voter: Account<'info, VoterState>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_voter_handler(ctx: Context<InitializeVoter>) -> Result<()> {
    let voter = &mut ctx.accounts.voter;
    voter.otoken_mint = ctx.accounts.curve.otoken_mint;
    voter.plugin_count = 0;
    voter.total_weight = 0;
    voter.bump = ctx.bumps.voter;
    Ok(())
}
