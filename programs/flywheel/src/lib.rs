use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;

use instructions::*;

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

#[program]
pub mod flywheel {
    use super::*;

    // ============ Protocol Initialization ============

    /// Initialize the protocol config (one-time setup)
    pub fn initialize_protocol(ctx: Context<InitializeProtocol>) -> Result<()> {
        instructions::initialize::initialize_protocol_handler(ctx)
    }

    /// Initialize the bonding curve, its mints and the reserve vault
    pub fn initialize_curve(
        ctx: Context<InitializeCurve>,
        reserve_virt: u64,
        max_supply: u64,
    ) -> Result<()> {
        instructions::initialize::initialize_curve_handler(ctx, reserve_virt, max_supply)
    }

    /// Initialize the vote-escrow ledger and its staking vault
    pub fn initialize_escrow(ctx: Context<InitializeEscrow>) -> Result<()> {
        instructions::initialize::initialize_escrow_handler(ctx)
    }

    /// Initialize the epoch coordinator
    pub fn initialize_voter(ctx: Context<InitializeVoter>) -> Result<()> {
        instructions::initialize::initialize_voter_handler(ctx)
    }

    // ============ Bonding Curve ============

    /// Buy curve tokens with the reserve asset
    pub fn buy<'info>(
        ctx: Context<'_, '_, 'info, 'info, Buy<'info>>,
        base_in: u64,
        min_out: u64,
        deadline: i64,
    ) -> Result<()> {
        instructions::swap::buy_handler(ctx, base_in, min_out, deadline)
    }

    /// Sell curve tokens back into the market reserves
    pub fn sell<'info>(
        ctx: Context<'_, '_, 'info, 'info, Sell<'info>>,
        token_in: u64,
        min_out: u64,
        deadline: i64,
    ) -> Result<()> {
        instructions::swap::sell_handler(ctx, token_in, min_out, deadline)
    }

    /// Borrow reserve asset against escrowed collateral
    pub fn borrow(ctx: Context<Borrow>, amount: u64) -> Result<()> {
        instructions::borrow::borrow_handler(ctx, amount)
    }

    /// Repay borrowed reserve asset
    pub fn repay(ctx: Context<Repay>, amount: u64) -> Result<()> {
        instructions::borrow::repay_handler(ctx, amount)
    }

    /// Exercise option tokens into curve tokens at the floor price
    pub fn exercise(ctx: Context<Exercise>, amount: u64) -> Result<()> {
        instructions::options::exercise_handler(ctx, amount)
    }

    /// Redeem curve tokens for reserve asset at the floor price
    pub fn redeem(ctx: Context<Redeem>, amount: u64) -> Result<()> {
        instructions::options::redeem_handler(ctx, amount)
    }

    /// Emit a buy quote event
    pub fn quote_buy(ctx: Context<EmitQuote>, base_in: u64) -> Result<()> {
        instructions::quote::quote_buy_handler(ctx, base_in)
    }

    /// Emit a sell quote event
    pub fn quote_sell(ctx: Context<EmitQuote>, token_in: u64) -> Result<()> {
        instructions::quote::quote_sell_handler(ctx, token_in)
    }

    // ============ Vote Escrow ============

    /// Stake curve tokens into the vote escrow
    pub fn stake(ctx: Context<Stake>, amount: u64) -> Result<()> {
        instructions::stake::stake_handler(ctx, amount)
    }

    /// Withdraw staked curve tokens; blocked while collateral or voting
    /// weight is active
    pub fn unstake(ctx: Context<Unstake>, amount: u64) -> Result<()> {
        instructions::stake::unstake_handler(ctx, amount)
    }

    /// Burn option tokens into permanent escrow credit
    pub fn burn_for(ctx: Context<BurnFor>, amount: u64) -> Result<()> {
        instructions::options::burn_for_handler(ctx, amount)
    }

    /// Claim accrued escrow staking rewards
    pub fn claim_escrow_rewards<'info>(
        ctx: Context<'_, '_, 'info, 'info, ClaimEscrowRewards<'info>>,
    ) -> Result<()> {
        instructions::stake::claim_escrow_rewards_handler(ctx)
    }

    /// Register a reward token on the escrow rewarder
    pub fn add_escrow_reward_token(ctx: Context<AddEscrowRewardToken>) -> Result<()> {
        instructions::stake::add_escrow_reward_token_handler(ctx)
    }

    /// Fund the escrow reward streams (rewarder role)
    pub fn notify_escrow_reward(ctx: Context<NotifyEscrowReward>, amount: u64) -> Result<()> {
        instructions::stake::notify_escrow_reward_handler(ctx, amount)
    }

    // ============ Voting ============

    /// Allocate escrowed voting weight across plugins (once per epoch)
    pub fn vote<'info>(
        ctx: Context<'_, '_, 'info, 'info, Vote<'info>>,
        plugin_ids: Vec<u8>,
        weights: Vec<u64>,
    ) -> Result<()> {
        instructions::vote::vote_handler(ctx, plugin_ids, weights)
    }

    /// Clear the caller's allocation (once per epoch, same gate as vote)
    pub fn reset<'info>(ctx: Context<'_, '_, 'info, 'info, Reset<'info>>) -> Result<()> {
        instructions::vote::reset_handler(ctx)
    }

    // ============ Distribution ============

    /// Distribute this epoch's emission share to a plugin's gauge
    pub fn distribute(ctx: Context<Distribute>, plugin_index: u8) -> Result<()> {
        instructions::distribute::distribute_handler(ctx, plugin_index)
    }

    /// Escrow a bribe against a plugin for its next distribution
    pub fn deposit_bribe(ctx: Context<DepositBribe>, plugin_index: u8, amount: u64) -> Result<()> {
        instructions::distribute::deposit_bribe_handler(ctx, plugin_index, amount)
    }

    /// Fold a plugin's pending bribes into its reward streams
    pub fn distribute_bribes(ctx: Context<DistributeBribes>, plugin_index: u8) -> Result<()> {
        instructions::distribute::distribute_bribes_handler(ctx, plugin_index)
    }

    // ============ Gauge ============

    /// Book a deposit into a plugin's gauge (plugin adapter only)
    pub fn gauge_deposit(ctx: Context<GaugeDepositIx>, plugin_index: u8, amount: u64) -> Result<()> {
        instructions::gauge::gauge_deposit_handler(ctx, plugin_index, amount)
    }

    /// Book a withdrawal out of a plugin's gauge (plugin adapter only)
    pub fn gauge_withdraw(
        ctx: Context<GaugeWithdrawIx>,
        plugin_index: u8,
        amount: u64,
    ) -> Result<()> {
        instructions::gauge::gauge_withdraw_handler(ctx, plugin_index, amount)
    }

    /// Claim a depositor's earned gauge emissions
    pub fn claim_gauge_rewards(ctx: Context<ClaimGaugeRewards>, plugin_index: u8) -> Result<()> {
        instructions::gauge::claim_gauge_rewards_handler(ctx, plugin_index)
    }

    // ============ Bribe ============

    /// Open the caller's bribe position for a plugin
    pub fn open_bribe_account(ctx: Context<OpenBribeAccount>, plugin_index: u8) -> Result<()> {
        instructions::bribe::open_bribe_account_handler(ctx, plugin_index)
    }

    /// Register a reward token on a plugin's bribe pool
    pub fn add_bribe_reward_token(
        ctx: Context<AddBribeRewardToken>,
        plugin_index: u8,
    ) -> Result<()> {
        instructions::bribe::add_bribe_reward_token_handler(ctx, plugin_index)
    }

    /// Claim the caller's earned bribes for a plugin
    pub fn claim_bribe_rewards<'info>(
        ctx: Context<'_, '_, 'info, 'info, ClaimBribeRewards<'info>>,
        plugin_index: u8,
    ) -> Result<()> {
        instructions::bribe::claim_bribe_rewards_handler(ctx, plugin_index)
    }

    // ============ Governance ============

    /// Register a new plugin with its gauge and bribe
    pub fn add_plugin(ctx: Context<AddPlugin>) -> Result<()> {
        instructions::admin::add_plugin_handler(ctx)
    }

    /// Stop a plugin from receiving votes and emissions
    pub fn kill_gauge(ctx: Context<SetGaugeStatus>, plugin_index: u8) -> Result<()> {
        instructions::admin::kill_gauge_handler(ctx, plugin_index)
    }

    /// Restore a killed plugin
    pub fn revive_gauge(ctx: Context<SetGaugeStatus>, plugin_index: u8) -> Result<()> {
        instructions::admin::revive_gauge_handler(ctx, plugin_index)
    }

    /// Update emission and fee parameters
    pub fn update_parameters(
        ctx: Context<UpdateParameters>,
        new_growth_rate_bps: Option<u16>,
        new_team_rate_bps: Option<u16>,
        new_swap_fee_bps: Option<u16>,
    ) -> Result<()> {
        instructions::admin::update_parameters_handler(
            ctx,
            new_growth_rate_bps,
            new_team_rate_bps,
            new_swap_fee_bps,
        )
    }

    /// Pause/unpause user-facing mutations (emergency)
    pub fn set_paused(ctx: Context<SetPaused>, paused: bool) -> Result<()> {
        instructions::admin::set_paused_handler(ctx, paused)
    }

    /// Transfer the governance authority
    pub fn transfer_authority(ctx: Context<TransferAuthority>) -> Result<()> {
        instructions::admin::transfer_authority_handler(ctx)
    }
}
