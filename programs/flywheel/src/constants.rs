use anchor_lang::prelude::*;

// ============================================================
// FIXED-POINT PRECISION
// ============================================================

/// Scale factor for price and reward-index math (1e18)
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

// ============================================================
// TIME CONSTANTS (in seconds)
// ============================================================

/// 1 day in seconds
pub const ONE_DAY: i64 = 24 * 60 * 60;

/// 7 days in seconds
pub const SEVEN_DAYS: i64 = 7 * ONE_DAY;

/// Epoch length - one vote/distribution cycle
pub const EPOCH_SECONDS: i64 = SEVEN_DAYS;

/// Reward streaming duration - every notify streams linearly over one epoch
pub const REWARD_DURATION: i64 = EPOCH_SECONDS;

// ============================================================
// BASIS POINTS
// ============================================================

/// 100% in basis points (denominator for BPS calculations)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Maximum swap fee (5% = 500 bps)
pub const MAX_SWAP_FEE_BPS: u16 = 500;

/// Default swap fee (3% = 300 bps)
pub const DEFAULT_SWAP_FEE_BPS: u16 = 300;

/// Share of each swap fee routed to the treasury (20% of the fee)
pub const FEE_TO_TREASURY_BPS: u64 = 2_000;

/// Share of each swap fee routed to an optional referral (10% of the fee)
pub const FEE_TO_REFERRAL_BPS: u64 = 1_000;

/// Maximum weekly emission rate (2% of curve supply = 200 bps)
pub const MAX_GROWTH_RATE_BPS: u16 = 200;

/// Default weekly emission rate (1% of curve supply)
pub const DEFAULT_GROWTH_RATE_BPS: u16 = 100;

/// Maximum team slice of each emission (20% = 2000 bps)
pub const MAX_TEAM_RATE_BPS: u16 = 2_000;

/// Default team slice of each emission (3%)
pub const DEFAULT_TEAM_RATE_BPS: u16 = 300;

// ============================================================
// REGISTRY LIMITS
// ============================================================

/// Maximum number of registered plugins
pub const MAX_PLUGINS: usize = 16;

/// Maximum reward tokens per reward pool
pub const MAX_REWARD_TOKENS: usize = 8;

// ============================================================
// PDA SEEDS
// ============================================================

pub const CONFIG_SEED: &[u8] = b"config";
pub const CURVE_SEED: &[u8] = b"curve";
pub const TOKEN_MINT_SEED: &[u8] = b"token_mint";
pub const OTOKEN_MINT_SEED: &[u8] = b"otoken_mint";
pub const RESERVE_VAULT_SEED: &[u8] = b"reserve_vault";
pub const BORROW_SEED: &[u8] = b"borrow";
pub const ESCROW_SEED: &[u8] = b"escrow";
pub const ESCROW_VAULT_SEED: &[u8] = b"escrow_vault";
pub const ESCROW_ACCOUNT_SEED: &[u8] = b"escrow_account";
pub const ESCROW_REWARD_VAULT_SEED: &[u8] = b"escrow_reward_vault";
pub const VOTER_SEED: &[u8] = b"voter";
pub const VOTE_ACCOUNT_SEED: &[u8] = b"vote";
pub const GAUGE_SEED: &[u8] = b"gauge";
pub const GAUGE_ACCOUNT_SEED: &[u8] = b"gauge_account";
pub const GAUGE_REWARD_VAULT_SEED: &[u8] = b"gauge_reward_vault";
pub const BRIBE_SEED: &[u8] = b"bribe";
pub const BRIBE_ACCOUNT_SEED: &[u8] = b"bribe_account";
pub const BRIBE_REWARD_VAULT_SEED: &[u8] = b"bribe_reward_vault";
