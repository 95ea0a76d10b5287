use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::FlywheelError;
use crate::state::curve::mul_div;

/// Epoch index of a timestamp (truncating division)
pub fn epoch_of(ts: i64) -> u64 {
    (ts / EPOCH_SECONDS) as u64
}

/// Wall-clock start of the epoch containing `ts`
pub fn epoch_start(ts: i64) -> i64 {
    ts / EPOCH_SECONDS * EPOCH_SECONDS
}

/// One registered plugin: the unit of voting and of external yield
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug)]
pub struct PluginRecord {
    /// Adapter address - the only signer allowed to move gauge balances
    pub adapter: Pubkey,

    /// Dead plugins receive no emission and accept no new votes
    pub alive: bool,

    /// Aggregate voting weight currently allocated to this plugin
    pub weight: u64,

    /// Weight frozen at the current epoch's first distribution call
    pub weight_snapshot: u64,

    /// Last epoch this plugin's gauge emission was distributed
    pub last_gauge_epoch: u64,
}

impl PluginRecord {
    pub const SIZE: usize = 32  // adapter
        + 1   // alive
        + 8   // weight
        + 8   // weight_snapshot
        + 8;  // last_gauge_epoch
}

/// Epoch coordinator - plugin registry, aggregate vote weights and
/// emission bookkeeping. Gauge and bribe records hang off each plugin
/// index 1:1, created together at registration and never destroyed.
#[account]
#[derive(Default)]
pub struct VoterState {
    /// Option token mint (emissions are minted with this PDA's authority)
    pub otoken_mint: Pubkey,

    /// Number of registered plugins
    pub plugin_count: u8,

    /// Sum of live allocated voting weight across all plugins
    pub total_weight: u64,

    /// Epoch whose weights have been snapshotted for distribution
    pub snapshot_epoch: u64,

    /// Total weight frozen at the snapshot
    pub total_weight_snapshot: u64,

    /// Option tokens to emit across gauges this epoch
    pub epoch_emission: u64,

    /// Registered plugins; slots beyond `plugin_count` are unused
    pub plugins: [PluginRecord; MAX_PLUGINS],

    /// PDA bump seed
    pub bump: u8,
}

impl VoterState {
    pub const LEN: usize = 8  // discriminator
        + 32  // otoken_mint
        + 1   // plugin_count
        + 8   // total_weight
        + 8   // snapshot_epoch
        + 8   // total_weight_snapshot
        + 8   // epoch_emission
        + MAX_PLUGINS * PluginRecord::SIZE
        + 1   // bump
        + 32; // padding

    pub fn plugin(&self, index: u8) -> Result<&PluginRecord> {
        if (index as usize) >= self.plugin_count as usize {
            return err!(FlywheelError::PluginNotFound);
        }
        Ok(&self.plugins[index as usize])
    }

    pub fn plugin_mut(&mut self, index: u8) -> Result<&mut PluginRecord> {
        if (index as usize) >= self.plugin_count as usize {
            return err!(FlywheelError::PluginNotFound);
        }
        Ok(&mut self.plugins[index as usize])
    }

    /// Register a new plugin; fails on duplicates and a full registry
    pub fn add_plugin(&mut self, adapter: Pubkey) -> Result<u8> {
        if adapter == Pubkey::default() {
            return err!(FlywheelError::InvalidZeroAddress);
        }
        let count = self.plugin_count as usize;
        if self.plugins[..count].iter().any(|p| p.adapter == adapter) {
            return err!(FlywheelError::GaugeExists);
        }
        if count >= MAX_PLUGINS {
            return err!(FlywheelError::PluginListFull);
        }
        self.plugins[count] = PluginRecord {
            adapter,
            alive: true,
            ..Default::default()
        };
        self.plugin_count += 1;
        Ok(count as u8)
    }

    pub fn kill_gauge(&mut self, index: u8) -> Result<()> {
        let plugin = self.plugin_mut(index)?;
        if !plugin.alive {
            return err!(FlywheelError::GaugeIsDead);
        }
        plugin.alive = false;
        Ok(())
    }

    pub fn revive_gauge(&mut self, index: u8) -> Result<()> {
        let plugin = self.plugin_mut(index)?;
        if plugin.alive {
            return err!(FlywheelError::GaugeIsAlive);
        }
        plugin.alive = true;
        Ok(())
    }

    /// Freeze this epoch's weights and emission on first touch after the
    /// boundary. Idempotent within an epoch.
    pub fn roll_epoch(&mut self, now: i64, curve_supply: u64, growth_rate_bps: u16) -> Result<()> {
        let epoch = epoch_of(now);
        if self.snapshot_epoch >= epoch {
            return Ok(());
        }
        for i in 0..self.plugin_count as usize {
            self.plugins[i].weight_snapshot = self.plugins[i].weight;
        }
        self.total_weight_snapshot = self.total_weight;
        self.epoch_emission = mul_div(
            curve_supply as u128,
            growth_rate_bps as u128,
            BPS_DENOMINATOR as u128,
        )? as u64;
        self.snapshot_epoch = epoch;
        Ok(())
    }

    /// This epoch's emission share for one plugin, from the frozen snapshot
    pub fn emission_share(&self, index: u8) -> Result<u64> {
        let plugin = self.plugin(index)?;
        if self.total_weight_snapshot == 0 {
            return Ok(0);
        }
        let share = mul_div(
            self.epoch_emission as u128,
            plugin.weight_snapshot as u128,
            self.total_weight_snapshot as u128,
        )? as u64;
        Ok(share)
    }
}

/// Per-account vote allocation, persisted between epochs until re-voted
/// or reset
#[account]
#[derive(Default)]
pub struct VoteAccount {
    /// The voter's wallet address
    pub owner: Pubkey,

    /// Absolute escrow weight allocated per plugin index
    pub weights: [u64; MAX_PLUGINS],

    /// PDA bump seed
    pub bump: u8,
}

impl VoteAccount {
    pub const LEN: usize = 8  // discriminator
        + 32  // owner
        + MAX_PLUGINS * 8  // weights
        + 1   // bump
        + 16; // padding

    pub fn allocated(&self) -> u64 {
        self.weights.iter().copied().sum()
    }
}

/// Split `balance` across `weights` proportionally. Returns the per-plugin
/// allocations and their sum; the sum becomes the account's used weight.
pub fn allocate_weights(balance: u64, weights: &[u64]) -> Result<(Vec<u64>, u64)> {
    let total: u128 = weights.iter().map(|w| *w as u128).sum();
    if total == 0 {
        return err!(FlywheelError::InvalidZeroInput);
    }
    let mut allocations = Vec::with_capacity(weights.len());
    let mut used: u64 = 0;
    for w in weights {
        let alloc = mul_div(balance as u128, *w as u128, total)? as u64;
        used = used
            .checked_add(alloc)
            .ok_or(FlywheelError::MathOverflow)?;
        allocations.push(alloc);
    }
    Ok((allocations, used))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_err<T: std::fmt::Debug>(res: Result<T>, expected: FlywheelError) {
        match res {
            Err(Error::AnchorError(e)) => {
                assert_eq!(e.error_code_number, u32::from(expected))
            }
            other => panic!("expected {:?}, got {:?}", expected, other),
        }
    }

    #[test]
    fn epoch_boundaries_truncate() {
        let ts = 1_700_000_000;
        let start = epoch_start(ts);
        assert_eq!(start % EPOCH_SECONDS, 0);
        assert!(start <= ts && ts < start + EPOCH_SECONDS);
        // Every timestamp inside the window maps to the same epoch
        assert_eq!(epoch_of(start), epoch_of(start + EPOCH_SECONDS - 1));
        assert_eq!(epoch_of(start + EPOCH_SECONDS), epoch_of(start) + 1);
    }

    #[test]
    fn plugin_registry_lifecycle() {
        let mut voter = VoterState::default();
        let adapter = Pubkey::new_unique();
        let index = voter.add_plugin(adapter).unwrap();
        assert_eq!(index, 0);
        assert_err(voter.add_plugin(adapter), FlywheelError::GaugeExists);

        assert_err(voter.revive_gauge(index), FlywheelError::GaugeIsAlive);
        voter.kill_gauge(index).unwrap();
        assert_err(voter.kill_gauge(index), FlywheelError::GaugeIsDead);
        voter.revive_gauge(index).unwrap();
        assert!(voter.plugin(index).unwrap().alive);

        assert_err(voter.kill_gauge(9), FlywheelError::PluginNotFound);
    }

    #[test]
    fn registry_fills_up() {
        let mut voter = VoterState::default();
        for _ in 0..MAX_PLUGINS {
            voter.add_plugin(Pubkey::new_unique()).unwrap();
        }
        assert_err(
            voter.add_plugin(Pubkey::new_unique()),
            FlywheelError::PluginListFull,
        );
    }

    #[test]
    fn allocation_is_proportional_and_bounded() {
        let (allocs, used) = allocate_weights(1_000, &[1, 1, 2]).unwrap();
        assert_eq!(allocs, vec![250, 250, 500]);
        assert_eq!(used, 1_000);

        // Rounding never allocates more than the balance
        let (allocs, used) = allocate_weights(100, &[1, 1, 1]).unwrap();
        assert!(used <= 100);
        assert_eq!(allocs.len(), 3);

        assert_err(allocate_weights(100, &[0, 0]), FlywheelError::InvalidZeroInput);
    }

    #[test]
    fn one_vote_or_reset_action_per_epoch() {
        // Same gate the vote and reset handlers apply to last_vote_epoch
        let t0 = epoch_start(1_700_000_000) + 100;
        let mut last_vote_epoch: u64 = 0;

        assert!(last_vote_epoch < epoch_of(t0));
        last_vote_epoch = epoch_of(t0);

        // A second vote or a reset later in the same epoch is blocked
        assert!(last_vote_epoch >= epoch_of(t0 + 3_600));
        // The next epoch reopens the window
        assert!(last_vote_epoch < epoch_of(t0 + EPOCH_SECONDS));
    }

    #[test]
    fn epoch_snapshot_is_idempotent() {
        let mut voter = VoterState::default();
        let i = voter.add_plugin(Pubkey::new_unique()).unwrap();
        voter.plugins[i as usize].weight = 500;
        voter.total_weight = 500;

        let now = 1_700_000_000;
        voter.roll_epoch(now, 1_000_000, 100).unwrap();
        assert_eq!(voter.epoch_emission, 10_000);
        assert_eq!(voter.total_weight_snapshot, 500);

        // Weight changes after the snapshot do not affect this epoch
        voter.plugins[i as usize].weight = 900;
        voter.total_weight = 900;
        voter.roll_epoch(now + 60, 2_000_000, 100).unwrap();
        assert_eq!(voter.total_weight_snapshot, 500);
        assert_eq!(voter.emission_share(i).unwrap(), 10_000);

        // Next epoch picks up the new weights
        voter
            .roll_epoch(now + EPOCH_SECONDS, 2_000_000, 100)
            .unwrap();
        assert_eq!(voter.total_weight_snapshot, 900);
        assert_eq!(voter.epoch_emission, 20_000);
    }
}
