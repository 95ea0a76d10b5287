use anchor_lang::prelude::*;

use crate::constants::MAX_REWARD_TOKENS;
use crate::state::rewards::{RewardPool, UserRewards};

/// Per-plugin bribe pool - third-party rewards streamed to the accounts
/// whose votes back the plugin
///
/// Balances are vote weights, written by `vote`/`reset`. Deposits escrow
/// into `pending` and only start streaming at the next epoch-boundary
/// distribution, so a bribe accrues to the epoch's voters.
#[account]
#[derive(Default)]
pub struct BribeState {
    /// Index into the voter's plugin registry
    pub plugin_index: u8,

    /// Last epoch pending deposits were folded into the streams
    pub last_distro_epoch: u64,

    /// Escrowed deposits awaiting distribution, slot-aligned with streams
    pub pending: [u64; MAX_REWARD_TOKENS],

    /// Reward streams; `total_supply` is the plugin's allocated vote weight
    pub rewards: RewardPool,

    /// PDA bump seed
    pub bump: u8,
}

impl BribeState {
    pub const LEN: usize = 8  // discriminator
        + 1   // plugin_index
        + 8   // last_distro_epoch
        + MAX_REWARD_TOKENS * 8  // pending
        + RewardPool::SIZE
        + 1   // bump
        + 32; // padding
}

/// One bribe position per (plugin, voter)
#[account]
#[derive(Default)]
pub struct BribeAccount {
    /// The voter's wallet address
    pub owner: Pubkey,

    /// Index into the voter's plugin registry
    pub plugin_index: u8,

    /// Vote weight currently allocated to the plugin by this account
    pub balance: u64,

    /// Reward checkpoints against the bribe's pool
    pub rewards: UserRewards,

    /// PDA bump seed
    pub bump: u8,
}

impl BribeAccount {
    pub const LEN: usize = 8  // discriminator
        + 32  // owner
        + 1   // plugin_index
        + 8   // balance
        + UserRewards::SIZE
        + 1   // bump
        + 16; // padding
}
