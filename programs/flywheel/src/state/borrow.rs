use anchor_lang::prelude::*;

/// Outstanding reserve-asset loan against escrowed collateral
/// One BorrowPosition per borrower; principal only, no interest
#[account]
#[derive(Default)]
pub struct BorrowPosition {
    /// The borrower's wallet address
    pub owner: Pubkey,

    /// Reserve asset owed
    pub debt: u64,

    /// PDA bump seed
    pub bump: u8,
}

impl BorrowPosition {
    pub const LEN: usize = 8  // discriminator
        + 32  // owner
        + 8   // debt
        + 1   // bump
        + 16; // padding
}
