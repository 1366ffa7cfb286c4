//! Deterministic random choices for wandering and spawning.
//!
//! Every random decision is derived from `(world seed, decision counter,
//! agent id, context)` so a replay with the same seed picks the same headings
//! and spawn cells regardless of how many other agents exist.

/// Random source keyed by an explicit seed.
///
/// Implementations must return the same value for the same seed.
pub trait RngOracle: Send + Sync {
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform index in `0..len`. Returns 0 for an empty range.
    fn pick(&self, seed: u64, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.next_u32(seed) as usize) % len
    }

    fn coin(&self, seed: u64) -> bool {
        self.next_u32(seed) & 1 == 1
    }

    /// Value in `[min, max]` inclusive.
    fn range(&self, seed: u64, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        min + (self.next_u32(seed) % (max - min + 1))
    }
}

/// PCG-XSH-RR generator: 64-bit LCG state, 32-bit permuted output.
///
/// See <https://www.pcg-random.org/>.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Purpose tags mixed into [`compute_seed`] so independent decisions made by
/// the same agent on the same counter do not correlate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum SeedContext {
    InitialHeading = 0,
    WanderTurn = 1,
    SpawnCell = 2,
    RoomPopulation = 3,
}

/// Mixes the seed components with SplitMix64-style multipliers and a final
/// avalanche step.
pub fn compute_seed(world_seed: u64, counter: u64, agent_id: u32, context: SeedContext) -> u64 {
    let mut hash = world_seed;
    hash ^= counter.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (agent_id as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}
