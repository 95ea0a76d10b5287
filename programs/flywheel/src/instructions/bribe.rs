use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::FlywheelError;
use crate::events::{RewardClaimed, RewardTokenAdded};
use crate::state::*;

/// Open the caller's bribe position for a plugin. Voting for a plugin
/// requires the position to exist, one rent payment per (plugin, voter).
#[derive(Accounts)]
#[instruction(plugin_index: u8)]
pub struct OpenBribeAccount<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        seeds = [BRIBE_SEED, &[plugin_index]],
        bump = bribe_state.bump
    )]
    pub bribe_state: Account<'info, BribeState>,

    #[account(
        init,
        payer = user,
        space = BribeAccount::LEN,
        seeds = [BRIBE_ACCOUNT_SEED, &[plugin_index], user.key().as_ref()],
        bump
    )]
    pub bribe_account: Account<'info, BribeAccount>,

    pub system_program: Program<'info, System>,
}

pub fn open_bribe_account_handler(ctx: Context<OpenBribeAccount>, plugin_index: u8) -> Result<()> {
    let account = &mut ctx.accounts.bribe_account;
    account.owner = ctx.accounts.user.key();
    account.plugin_index = plugin_index;
    account.bump = ctx.bumps.bribe_account;
    Ok(())
}

/// Register a reward token on a plugin's bribe pool and create its vault
#[derive(Accounts)]
#[instruction(plugin_index: u8)]
pub struct AddBribeRewardToken<'info> {
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
        seeds = [VOTER_SEED],
        bump = voter.bump
    )]
    pub voter: Account<'info, VoterState>,

    #[account(
        mut,
        seeds = [BRIBE_SEED, &[plugin_index]],
        bump = bribe_state.bump
    )]
    pub bribe_state: Account<'info, BribeState>,

    pub reward_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = authority,
        seeds = [BRIBE_REWARD_VAULT_SEED, &[plugin_index], reward_mint.key().as_ref()],
        bump,
        token::mint = reward_mint,
        token::authority = voter
    )]
    pub bribe_reward_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn add_bribe_reward_token_handler(
    ctx: Context<AddBribeRewardToken>,
    _plugin_index: u8,
) -> Result<()> {
    let bribe = &mut ctx.accounts.bribe_state;
    bribe
        .rewards
        .add_reward_token(ctx.accounts.reward_mint.key())?;

    emit!(RewardTokenAdded {
        pool: bribe.key(),
        reward_mint: ctx.accounts.reward_mint.key(),
    });

    Ok(())
}

/// Pay out the caller's earned bribes for one plugin across every
/// registered reward token
#[derive(Accounts)]
#[instruction(plugin_index: u8)]
pub struct ClaimBribeRewards<'info> {
    pub claimer: Signer<'info>,

    #[account(
        seeds = [VOTER_SEED],
        bump = voter.bump
    )]
    pub voter: Account<'info, VoterState>,

    #[account(
        mut,
        seeds = [BRIBE_SEED, &[plugin_index]],
        bump = bribe_state.bump
    )]
    pub bribe_state: Account<'info, BribeState>,

    #[account(
        mut,
        seeds = [BRIBE_ACCOUNT_SEED, &[plugin_index], claimer.key().as_ref()],
        bump = bribe_account.bump,
        constraint = bribe_account.owner == claimer.key() @ FlywheelError::NotAuthorizedUser
    )]
    pub bribe_account: Account<'info, BribeAccount>,

    pub token_program: Program<'info, Token>,
    // remaining_accounts, one pair per registered reward token in stream
    // order: [bribe reward vault (writable), claimer token account
    // (writable)]
}

pub fn claim_bribe_rewards_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, ClaimBribeRewards<'info>>,
    plugin_index: u8,
) -> Result<()> {
    let clock = Clock::get()?;
    let voter_key = ctx.accounts.voter.key();
    let voter_bump = ctx.accounts.voter.bump;
    let bribe_key = ctx.accounts.bribe_state.key();

    {
        let bribe = &mut ctx.accounts.bribe_state;
        let account = &mut ctx.accounts.bribe_account;
        bribe
            .rewards
            .settle(clock.unix_timestamp, account.balance, &mut account.rewards)?;
    }

    let reward_count = ctx.accounts.bribe_state.rewards.reward_count as usize;
    require!(
        ctx.remaining_accounts.len() >= reward_count * 2,
        FlywheelError::InvalidRewardVault
    );

    let seeds: &[&[u8]] = &[VOTER_SEED, &[voter_bump]];
    for i in 0..reward_count {
        let amount = ctx.accounts.bribe_account.rewards.pending[i];
        let mint = ctx.accounts.bribe_state.rewards.streams[i].mint;

        let vault_info = &ctx.remaining_accounts[i * 2];
        let dest_info = &ctx.remaining_accounts[i * 2 + 1];
        let vault = Account::<TokenAccount>::try_from(vault_info)?;
        let dest = Account::<TokenAccount>::try_from(dest_info)?;
        let (expected_vault, _) = Pubkey::find_program_address(
            &[
                BRIBE_REWARD_VAULT_SEED,
                &[plugin_index],
                mint.as_ref(),
            ],
            ctx.program_id,
        );
        require!(
            vault_info.key() == expected_vault && vault.owner == voter_key,
            FlywheelError::InvalidRewardVault
        );
        require!(dest.mint == mint, FlywheelError::InvalidRewardVault);

        if amount == 0 {
            continue;
        }
        ctx.accounts.bribe_account.rewards.pending[i] = 0;

        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: vault_info.clone(),
                    to: dest_info.clone(),
                    authority: ctx.accounts.voter.to_account_info(),
                },
                &[seeds],
            ),
            amount,
        )?;

        emit!(RewardClaimed {
            pool: bribe_key,
            account: ctx.accounts.claimer.key(),
            reward_mint: mint,
            amount,
        });
    }

    Ok(())
}
