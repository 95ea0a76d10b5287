use anchor_lang::prelude::*;

// ============================================================
// PROTOCOL LIFECYCLE EVENTS
// ============================================================

#[event]
pub struct ProtocolInitialized {
    pub authority: Pubkey,
    pub treasury: Pubkey,
    pub rewarder: Pubkey,
}

#[event]
pub struct CurveInitialized {
    pub base_mint: Pubkey,
    pub token_mint: Pubkey,
    pub otoken_mint: Pubkey,
    pub reserve_virt: u64,
    pub max_supply: u64,
}

#[event]
pub struct ParametersUpdated {
    pub growth_rate_bps: u16,
    pub team_rate_bps: u16,
    pub swap_fee_bps: u16,
}

#[event]
pub struct PauseSet {
    pub paused: bool,
}

#[event]
pub struct AuthorityTransferred {
    pub old_authority: Pubkey,
    pub new_authority: Pubkey,
}

// ============================================================
// CURVE EVENTS
// ============================================================

#[event]
pub struct CurveBuy {
    pub buyer: Pubkey,
    pub recipient: Pubkey,
    pub base_in: u64,
    pub token_out: u64,
    pub fee_floor: u64,
    pub fee_treasury: u64,
    pub fee_referral: u64,
    pub floor_price: u128,
    pub market_price: u128,
}

#[event]
pub struct CurveSell {
    pub seller: Pubkey,
    pub recipient: Pubkey,
    pub token_in: u64,
    pub base_out: u64,
    pub fee_floor: u64,
    pub fee_treasury: u64,
    pub fee_referral: u64,
    pub floor_price: u128,
    pub market_price: u128,
}

#[event]
pub struct Borrowed {
    pub account: Pubkey,
    pub amount: u64,
    pub total_debt: u64,
}

#[event]
pub struct Repaid {
    pub account: Pubkey,
    pub amount: u64,
    pub remaining_debt: u64,
}

#[event]
pub struct OptionExercised {
    pub account: Pubkey,
    pub recipient: Pubkey,
    pub amount: u64,
    pub base_paid: u64,
    pub floor_price: u128,
}

#[event]
pub struct Redeemed {
    pub account: Pubkey,
    pub recipient: Pubkey,
    pub token_in: u64,
    pub base_out: u64,
    pub floor_price: u128,
}

#[event]
pub struct SwapQuote {
    pub base_amount: u64,
    pub token_amount: u64,
    pub is_buy: bool,
    pub market_price: u128,
    pub floor_price: u128,
    pub max_sell: u64,
}

// ============================================================
// ESCROW EVENTS
// ============================================================

#[event]
pub struct Staked {
    pub account: Pubkey,
    pub amount: u64,
    pub balance: u64,
    pub total_locked: u64,
}

#[event]
pub struct Unstaked {
    pub account: Pubkey,
    pub amount: u64,
    pub balance: u64,
    pub total_locked: u64,
}

#[event]
pub struct OptionBurnedForEscrow {
    pub caller: Pubkey,
    pub account: Pubkey,
    pub amount: u64,
    pub balance: u64,
}

// ============================================================
// VOTING EVENTS
// ============================================================

#[event]
pub struct Voted {
    pub account: Pubkey,
    pub epoch: u64,
    pub used_weight: u64,
    pub plugin_count: u8,
}

#[event]
pub struct VoteResetEvent {
    pub account: Pubkey,
    pub epoch: u64,
    pub released_weight: u64,
}

#[event]
pub struct PluginAdded {
    pub plugin_index: u8,
    pub adapter: Pubkey,
    pub gauge: Pubkey,
    pub bribe: Pubkey,
}

#[event]
pub struct GaugeKilled {
    pub plugin_index: u8,
}

#[event]
pub struct GaugeRevived {
    pub plugin_index: u8,
}

// ============================================================
// DISTRIBUTION EVENTS
// ============================================================

#[event]
pub struct EmissionDistributed {
    pub plugin_index: u8,
    pub epoch: u64,
    pub gauge_amount: u64,
    pub team_amount: u64,
}

#[event]
pub struct BribeDeposited {
    pub plugin_index: u8,
    pub depositor: Pubkey,
    pub reward_mint: Pubkey,
    pub amount: u64,
}

#[event]
pub struct BribesDistributed {
    pub plugin_index: u8,
    pub epoch: u64,
}

// ============================================================
// REWARD STREAM EVENTS
// ============================================================

#[event]
pub struct RewardTokenAdded {
    pub pool: Pubkey,
    pub reward_mint: Pubkey,
}

#[event]
pub struct RewardNotified {
    pub pool: Pubkey,
    pub reward_mint: Pubkey,
    pub amount: u64,
}

#[event]
pub struct RewardClaimed {
    pub pool: Pubkey,
    pub account: Pubkey,
    pub reward_mint: Pubkey,
    pub amount: u64,
}

// ============================================================
// GAUGE EVENTS
// ============================================================

#[event]
pub struct GaugeDeposit {
    pub plugin_index: u8,
    pub account: Pubkey,
    pub amount: u64,
    pub balance: u64,
}

#[event]
pub struct GaugeWithdraw {
    pub plugin_index: u8,
    pub account: Pubkey,
    pub amount: u64,
    pub balance: u64,
}
