use rand::rngs::StdRng;
use rand::SeedableRng;

/// Random source threaded through grouping and rebalancing.
///
/// A fixed seed reproduces a split exactly; `None` draws from entropy.
pub fn random_source(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
