use rand::rngs::StdRng;
use rand::SeedableRng;

/// Генератор с фиксированным seed или, без него, из энтропии ОС
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
