use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seedable generator owned by each tree, evaluator and algorithm instance.
pub type RandomSource = ChaCha8Rng;

/// Create a randomness source, seeded for reproducibility or from entropy.
pub fn random_source(seed: Option<u64>) -> RandomSource {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}
