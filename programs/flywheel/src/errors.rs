use anchor_lang::prelude::*;

#[error_code]
pub enum FlywheelError {
    // ============================================================
    // INPUT VALIDATION
    // ============================================================

    #[msg("Amount must be greater than zero")]
    InvalidZeroInput,

    #[msg("Address must not be the zero address")]
    InvalidZeroAddress,

    #[msg("Plugin list length does not match weight list length")]
    PluginLengthNotEqualToWeightLength,

    #[msg("Plugin appears more than once in the vote")]
    DuplicatePlugin,

    #[msg("Plugin index is not registered")]
    PluginNotFound,

    #[msg("Invalid curve parameter")]
    InvalidCurveParameter,

    // ============================================================
    // AUTHORIZATION
    // ============================================================

    #[msg("Caller is not the governance authority")]
    NotAuthorizedGovernance,

    #[msg("Caller is not the voter authority")]
    NotAuthorizedVoter,

    #[msg("Caller is not the plugin registered for this gauge")]
    NotAuthorizedPlugin,

    #[msg("Caller may not claim on behalf of this account")]
    NotAuthorizedUser,

    #[msg("Caller is not the reward distributor")]
    NotAuthorizedRewarder,

    // ============================================================
    // STATE-MACHINE VIOLATIONS
    // ============================================================

    #[msg("Outstanding debt pins the escrowed balance")]
    CollateralActive,

    #[msg("Allocated voting weight pins the escrowed balance")]
    VotingWeightActive,

    #[msg("Account already voted or reset this epoch")]
    AlreadyVotedThisEpoch,

    #[msg("Gauge is already alive")]
    GaugeIsAlive,

    #[msg("Gauge is dead")]
    GaugeIsDead,

    #[msg("A gauge already exists for this plugin")]
    GaugeExists,

    #[msg("Plugin registry is full")]
    PluginListFull,

    #[msg("Account has no voting weight")]
    ZeroVotingWeight,

    // ============================================================
    // ECONOMIC LIMIT VIOLATIONS
    // ============================================================

    #[msg("Borrow would exceed the account's credit limit")]
    ExceedsBorrowCreditLimit,

    #[msg("Repay amount exceeds outstanding debt")]
    ExceedsOutstandingDebt,

    #[msg("Swap output exceeds available market reserves")]
    ExceedsSwapMarketReserves,

    #[msg("Swap output is below the slippage tolerance")]
    ExceedsSwapSlippageTolerance,

    #[msg("Swap deadline has passed")]
    SwapExpired,

    #[msg("Mint would exceed the remaining curve inventory")]
    ExceedsCurveInventory,

    #[msg("Amount exceeds the withdrawable escrow balance")]
    ExceedsWithdrawableBalance,

    #[msg("Amount exceeds the deposited gauge balance")]
    ExceedsDepositedBalance,

    #[msg("Growth rate exceeds the maximum")]
    GrowthRateTooHigh,

    #[msg("Fee exceeds the maximum")]
    FeeTooHigh,

    // ============================================================
    // REWARD STREAM VIOLATIONS
    // ============================================================

    #[msg("Reward amount is smaller than the streaming duration")]
    RewardSmallerThanDuration,

    #[msg("Reward token has already been added")]
    RewardTokenAlreadyAdded,

    #[msg("Token is not a registered reward token")]
    NotRewardToken,

    #[msg("Reward token list is full")]
    RewardTokenListFull,

    #[msg("Reward vault does not match the reward token")]
    InvalidRewardVault,

    // ============================================================
    // PROTOCOL SAFETY
    // ============================================================

    #[msg("Protocol is currently paused")]
    ProtocolPaused,

    #[msg("Arithmetic overflow")]
    MathOverflow,
}
