use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaChaRng;

/// A fixed-seed ChaCha stream. Only for tests and benches.
pub fn test_rng() -> ChaChaRng {
    ChaChaRng::from_seed(*b"zkinfer deterministic test seed!")
}

#[cfg(test)]
mod test {
    use crate::prelude::*;

    #[test]
    fn streams_repeat() {
        let a: [u64; 4] = test_rng().gen();
        let b: [u64; 4] = test_rng().gen();
        assert_eq!(a, b);
        assert_ne!(a[0], a[1]);
    }
}
