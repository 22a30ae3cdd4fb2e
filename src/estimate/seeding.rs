//! Per-batch random streams.
//!
//! Every batch owns a private [`StdRng`]. Its seed is a SplitMix64 finalization
//! of the batch offset combined with either fresh entropy or a fixed base, so
//! batches running side by side never share or correlate a stream.

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};

use crate::config::SeedPolicy;

/// SplitMix64 finalizer.
#[inline]
pub(crate) fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed for the batch at `offset` under `policy`.
pub(crate) fn batch_seed(policy: SeedPolicy, offset: u64) -> u64 {
    match policy {
        SeedPolicy::Fixed(base) => mix64(base ^ mix64(offset)),
        SeedPolicy::Entropy => {
            let pid = u64::from(std::process::id());
            mix64((pid << 32) ^ mix64(offset) ^ OsRng.next_u64())
        }
    }
}

/// Random stream for the batch at `offset` under `policy`.
pub(crate) fn batch_rng(policy: SeedPolicy, offset: u64) -> StdRng {
    StdRng::seed_from_u64(batch_seed(policy, offset))
}
