//! Entropy source trait for seed selection.

/// Source of fresh run seeds.
///
/// The run driver only draws from this when neither an explicit seed nor a
/// declared per-iteration seed applies.
///
/// # Implementations
///
/// - **Production**: `OsEntropy` - thread-local RNG seeded from the OS
/// - **Testing**: `SeededEntropy` - `ChaCha8Rng(seed)`, reproducible draws
pub trait EntropySource {
    /// Draws a fresh seed.
    fn draw_seed(&mut self) -> u64;

    /// Returns the master seed, if the source is seeded. The run driver
    /// records it in its summary so drawn seeds can be reproduced.
    fn master_seed(&self) -> Option<u64>;
}
