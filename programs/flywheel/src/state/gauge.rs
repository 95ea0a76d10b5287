use anchor_lang::prelude::*;

use crate::state::rewards::{RewardPool, UserRewards};

/// Per-plugin staking gauge - streams epoch emissions to plugin depositors
///
/// Balances mirror positions held by the plugin adapter; the gauge never
/// touches the wrapped external protocol, it only books `deposit`/`withdraw`
/// calls signed by the registered adapter.
#[account]
#[derive(Default)]
pub struct GaugeState {
    /// Index into the voter's plugin registry
    pub plugin_index: u8,

    /// Reward streams; `total_supply` is the sum of booked deposits
    pub rewards: RewardPool,

    /// PDA bump seed
    pub bump: u8,
}

impl GaugeState {
    pub const LEN: usize = 8  // discriminator
        + 1   // plugin_index
        + RewardPool::SIZE
        + 1   // bump
        + 32; // padding
}

/// One gauge position per (plugin, depositor)
#[account]
#[derive(Default)]
pub struct GaugeAccount {
    /// The depositor's wallet address
    pub owner: Pubkey,

    /// Index into the voter's plugin registry
    pub plugin_index: u8,

    /// Booked deposit balance
    pub balance: u64,

    /// Reward checkpoints against the gauge's pool
    pub rewards: UserRewards,

    /// PDA bump seed
    pub bump: u8,
}

impl GaugeAccount {
    pub const LEN: usize = 8  // discriminator
        + 32  // owner
        + 1   // plugin_index
        + 8   // balance
        + UserRewards::SIZE
        + 1   // bump
        + 16; // padding
}
