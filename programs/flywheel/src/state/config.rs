use anchor_lang::prelude::*;

/// Protocol-level roles and parameters
/// Single PDA managing global settings for the Flywheel Protocol
#[account]
#[derive(Default)]
pub struct ProtocolConfig {
    /// Governance authority - registers plugins, sets parameters
    pub authority: Pubkey,

    /// Treasury receiving fee and team-emission slices
    pub treasury: Pubkey,

    /// Role allowed to notify escrow rewards and burn options for others
    pub rewarder: Pubkey,

    /// Weekly emission as basis points of circulating curve supply
    pub growth_rate_bps: u16,

    /// Slice of each emission minted to the treasury
    pub team_rate_bps: u16,

    /// Emergency pause flag
    pub paused: bool,

    /// PDA bump seed
    pub bump: u8,
}

impl ProtocolConfig {
    pub const LEN: usize = 8  // discriminator
        + 32  // authority
        + 32  // treasury
        + 32  // rewarder
        + 2   // growth_rate_bps
        + 2   // team_rate_bps
        + 1   // paused
        + 1   // bump
        + 32; // padding for future expansion
}
