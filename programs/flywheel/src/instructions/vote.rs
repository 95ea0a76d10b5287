use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::FlywheelError;
use crate::events::{VoteResetEvent, Voted};
use crate::state::*;

/// Pull the next (bribe state, bribe account) pair off the remaining
/// accounts, validating it belongs to `plugin_index` and `owner`. The
/// caller must `exit()` both after mutating.
fn next_bribe_pair<'info>(
    rem: &mut std::slice::Iter<'info, AccountInfo<'info>>,
    plugin_index: u8,
    owner: Pubkey,
) -> Result<(Account<'info, BribeState>, Account<'info, BribeAccount>)> {
    let state_info = rem.next().ok_or(FlywheelError::PluginNotFound)?;
    let account_info = rem.next().ok_or(FlywheelError::PluginNotFound)?;

    let bribe_state = Account::<BribeState>::try_from(state_info)?;
    let bribe_account = Account::<BribeAccount>::try_from(account_info)?;
    require!(
        bribe_state.plugin_index == plugin_index,
        FlywheelError::PluginNotFound
    );
    require!(
        bribe_account.plugin_index == plugin_index && bribe_account.owner == owner,
        FlywheelError::NotAuthorizedUser
    );
    Ok((bribe_state, bribe_account))
}

/// Unwind the account's standing allocation, releasing plugin weights and
/// bribe balances. Consumes one bribe pair per previously voted plugin,
/// ascending by plugin index.
fn clear_allocation<'info>(
    voter: &mut VoterState,
    vote_account: &mut VoteAccount,
    rem: &mut std::slice::Iter<'info, AccountInfo<'info>>,
    now: i64,
    owner: Pubkey,
    program_id: &Pubkey,
) -> Result<u64> {
    let mut released: u64 = 0;
    for idx in 0..MAX_PLUGINS {
        let amount = vote_account.weights[idx];
        if amount == 0 {
            continue;
        }
        let (mut bribe_state, mut bribe_account) = next_bribe_pair(rem, idx as u8, owner)?;

        bribe_state
            .rewards
            .settle(now, bribe_account.balance, &mut bribe_account.rewards)?;
        bribe_account.balance = bribe_account
            .balance
            .checked_sub(amount)
            .ok_or(FlywheelError::MathOverflow)?;
        bribe_state.rewards.total_supply = bribe_state
            .rewards
            .total_supply
            .checked_sub(amount)
            .ok_or(FlywheelError::MathOverflow)?;

        let plugin = voter.plugin_mut(idx as u8)?;
        plugin.weight = plugin
            .weight
            .checked_sub(amount)
            .ok_or(FlywheelError::MathOverflow)?;
        voter.total_weight = voter
            .total_weight
            .checked_sub(amount)
            .ok_or(FlywheelError::MathOverflow)?;
        vote_account.weights[idx] = 0;
        released = released
            .checked_add(amount)
            .ok_or(FlywheelError::MathOverflow)?;

        bribe_state.exit(program_id)?;
        bribe_account.exit(program_id)?;
    }
    Ok(released)
}

#[derive(Accounts)]
pub struct Vote<'info> {
    #[account(mut)]
    pub voter_signer: Signer<'info>,

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

    #[account(
        mut,
        seeds = [ESCROW_ACCOUNT_SEED, voter_signer.key().as_ref()],
        bump = escrow_account.bump,
        constraint = escrow_account.owner == voter_signer.key() @ FlywheelError::NotAuthorizedUser
    )]
    pub escrow_account: Account<'info, EscrowAccount>,

    #[account(
        init_if_needed,
        payer = voter_signer,
        space = VoteAccount::LEN,
        seeds = [VOTE_ACCOUNT_SEED, voter_signer.key().as_ref()],
        bump
    )]
    pub vote_account: Account<'info, VoteAccount>,

    pub system_program: Program<'info, System>,
    // remaining_accounts, pairs of [bribe state (writable), caller's bribe
    // account (writable)]:
    // - first one pair per previously voted plugin, ascending by index
    // - then one pair per plugin in `plugin_ids` order
    // A plugin present in both lists appears twice.
}

pub fn vote_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Vote<'info>>,
    plugin_ids: Vec<u8>,
    weights: Vec<u64>,
) -> Result<()> {
    require!(!ctx.accounts.config.paused, FlywheelError::ProtocolPaused);

    let clock = Clock::get()?;
    let now = clock.unix_timestamp;
    let epoch = epoch_of(now);
    let owner = ctx.accounts.voter_signer.key();

    // One vote-or-reset action per account per epoch
    require!(
        ctx.accounts.escrow_account.last_vote_epoch < epoch,
        FlywheelError::AlreadyVotedThisEpoch
    );

    require!(
        plugin_ids.len() == weights.len(),
        FlywheelError::PluginLengthNotEqualToWeightLength
    );
    require!(!plugin_ids.is_empty(), FlywheelError::InvalidZeroInput);
    for w in &weights {
        require!(*w > 0, FlywheelError::InvalidZeroInput);
    }
    for (i, id) in plugin_ids.iter().enumerate() {
        require!(
            !plugin_ids[..i].contains(id),
            FlywheelError::DuplicatePlugin
        );
        let plugin = ctx.accounts.voter.plugin(*id)?;
        require!(plugin.alive, FlywheelError::GaugeIsDead);
    }

    let balance = ctx.accounts.escrow_account.balance;
    require!(balance > 0, FlywheelError::ZeroVotingWeight);
    let (allocations, used) = allocate_weights(balance, &weights)?;

    let vote_account = &mut ctx.accounts.vote_account;
    if vote_account.owner == Pubkey::default() {
        vote_account.owner = owner;
        vote_account.bump = ctx.bumps.vote_account;
    }

    let mut rem = ctx.remaining_accounts.iter();
    clear_allocation(
        &mut ctx.accounts.voter,
        vote_account,
        &mut rem,
        now,
        owner,
        ctx.program_id,
    )?;

    for (k, id) in plugin_ids.iter().enumerate() {
        let amount = allocations[k];
        let (mut bribe_state, mut bribe_account) = next_bribe_pair(&mut rem, *id, owner)?;

        bribe_state
            .rewards
            .settle(now, bribe_account.balance, &mut bribe_account.rewards)?;
        bribe_account.balance = bribe_account
            .balance
            .checked_add(amount)
            .ok_or(FlywheelError::MathOverflow)?;
        bribe_state.rewards.total_supply = bribe_state
            .rewards
            .total_supply
            .checked_add(amount)
            .ok_or(FlywheelError::MathOverflow)?;

        let voter = &mut ctx.accounts.voter;
        let plugin = voter.plugin_mut(*id)?;
        plugin.weight = plugin
            .weight
            .checked_add(amount)
            .ok_or(FlywheelError::MathOverflow)?;
        voter.total_weight = voter
            .total_weight
            .checked_add(amount)
            .ok_or(FlywheelError::MathOverflow)?;
        vote_account.weights[*id as usize] = amount;

        bribe_state.exit(ctx.program_id)?;
        bribe_account.exit(ctx.program_id)?;
    }

    let escrow_account = &mut ctx.accounts.escrow_account;
    escrow_account.used_weight = used;
    escrow_account.last_vote_epoch = epoch;

    emit!(Voted {
        account: owner,
        epoch,
        used_weight: used,
        plugin_count: plugin_ids.len() as u8,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Reset<'info> {
    pub voter_signer: Signer<'info>,

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

    #[account(
        mut,
        seeds = [ESCROW_ACCOUNT_SEED, voter_signer.key().as_ref()],
        bump = escrow_account.bump,
        constraint = escrow_account.owner == voter_signer.key() @ FlywheelError::NotAuthorizedUser
    )]
    pub escrow_account: Account<'info, EscrowAccount>,

    #[account(
        mut,
        seeds = [VOTE_ACCOUNT_SEED, voter_signer.key().as_ref()],
        bump = vote_account.bump,
        constraint = vote_account.owner == voter_signer.key() @ FlywheelError::NotAuthorizedUser
    )]
    pub vote_account: Account<'info, VoteAccount>,
    // remaining_accounts: one pair of [bribe state (writable), caller's
    // bribe account (writable)] per previously voted plugin, ascending by
    // plugin index
}

pub fn reset_handler<'info>(ctx: Context<'_, '_, 'info, 'info, Reset<'info>>) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;
    let epoch = epoch_of(now);
    let owner = ctx.accounts.voter_signer.key();

    // Reset is epoch-gated identically to vote
    require!(
        ctx.accounts.escrow_account.last_vote_epoch < epoch,
        FlywheelError::AlreadyVotedThisEpoch
    );

    let mut rem = ctx.remaining_accounts.iter();
    let released = clear_allocation(
        &mut ctx.accounts.voter,
        &mut ctx.accounts.vote_account,
        &mut rem,
        now,
        owner,
        ctx.program_id,
    )?;

    let escrow_account = &mut ctx.accounts.escrow_account;
    escrow_account.used_weight = 0;
    escrow_account.last_vote_epoch = epoch;

    emit!(VoteResetEvent {
        account: owner,
        epoch,
        released_weight: released,
    });

    Ok(())
}
