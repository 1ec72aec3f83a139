//! Deterministic random number generation.
//!
//! Seeds are carried as source text. A seed string is hashed with
//! FNV-1a into the 32-bit state of a xorshift generator, and seeded
//! draws are warmed up by a discard count derived from both the seed
//! and the construct's source position, so two identically seeded
//! values at different positions still draw differently.

const FNV_OFFSET: u32 = 2166136261;
const FNV_PRIME: u32 = 16777619;
/// Replaces an all-zero hash; xorshift state must never be zero.
const NONZERO_FALLBACK: u32 = 0x9E3779B9;

/// 32-bit FNV-1a over the bytes of `text`.
pub fn fnv1a(text: &str) -> u32 {
    let mut hash = FNV_OFFSET;
    for byte in text.bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Maps a unit-interval draw onto an integer in the inclusive range
/// between the rounded endpoints, given in either order.
pub fn uniform_int(draw: f64, a: f64, b: f64) -> f64 {
    let (lo, hi) = {
        let a = a.round() as i64;
        let b = b.round() as i64;
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    };
    let width = (hi - lo + 1) as f64;
    let picked = lo + (draw * width).floor() as i64;
    picked.clamp(lo, hi) as f64
}

/// Xorshift32 stream seeded from a text seed.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: &str) -> Self {
        Self::from_state(fnv1a(seed))
    }

    pub fn from_state(state: u32) -> Self {
        SeededRng {
            state: if state == 0 { NONZERO_FALLBACK } else { state },
        }
    }

    /// A generator for a seeded construct at `position` (byte offset in
    /// the source). Discards between 1 and 256 draws so that the same
    /// seed at different positions yields different streams.
    pub fn warmed(seed: &str, position: usize) -> Self {
        let mut rng = Self::new(seed);
        let salt = fnv1a(seed) ^ (position as u32).wrapping_mul(2654435761);
        let discard = 1 + (salt & 0xFF);
        for _ in 0..discard {
            rng.next_f64();
        }
        rng
    }

    /// Advances the stream and returns a draw in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x as f64 / 4294967296.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_known_inputs() {
        assert_eq!(fnv1a(""), FNV_OFFSET);
        assert_ne!(fnv1a("a"), fnv1a("b"));
        assert_eq!(fnv1a("seed"), fnv1a("seed"));
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = SeededRng::new("1f");
        let mut b = SeededRng::new("1f");
        for _ in 0..100 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = SeededRng::new("1f");
        let mut b = SeededRng::new("2e");
        let same = (0..10).filter(|_| a.next_f64() == b.next_f64()).count();
        assert!(same < 10, "streams should not track each other");
    }

    #[test]
    fn test_draws_stay_in_unit_interval() {
        let mut rng = SeededRng::new("bounds");
        for _ in 0..1000 {
            let draw = rng.next_f64();
            assert!((0.0..1.0).contains(&draw), "draw out of range: {draw}");
        }
    }

    #[test]
    fn test_zero_hash_is_replaced() {
        let mut rng = SeededRng::from_state(0);
        // A zero state would be a fixed point; the stream must move.
        let first = rng.next_f64();
        let second = rng.next_f64();
        assert_ne!(first, second);
    }

    #[test]
    fn test_warmup_varies_with_position() {
        let mut at_zero = SeededRng::warmed("ab", 0);
        let mut at_five = SeededRng::warmed("ab", 5);
        let diverged = (0..10).any(|_| at_zero.next_f64() != at_five.next_f64());
        assert!(diverged, "different positions must desynchronize the stream");
    }

    #[test]
    fn test_warmup_replays_identically() {
        let mut a = SeededRng::warmed("ab", 12);
        let mut b = SeededRng::warmed("ab", 12);
        for _ in 0..20 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }

    #[test]
    fn test_uniform_int_endpoints_inclusive() {
        assert_eq!(uniform_int(0.0, 2.0, 5.0), 2.0);
        assert_eq!(uniform_int(0.999999, 2.0, 5.0), 5.0);
        assert_eq!(uniform_int(0.5, 2.0, 5.0), 4.0);
    }

    #[test]
    fn test_uniform_int_reversed_endpoints() {
        assert_eq!(uniform_int(0.0, 5.0, 2.0), 2.0);
        assert_eq!(uniform_int(0.999999, 5.0, 2.0), 5.0);
    }

    #[test]
    fn test_uniform_int_single_point_range() {
        for draw in [0.0, 0.3, 0.99] {
            assert_eq!(uniform_int(draw, 3.0, 3.0), 3.0);
        }
    }

    #[test]
    fn test_uniform_int_covers_all_values() {
        let mut rng = SeededRng::new("coverage");
        let mut seen = [false; 4];
        for _ in 0..200 {
            let v = uniform_int(rng.next_f64(), 0.0, 3.0);
            seen[v as usize] = true;
        }
        assert_eq!(seen, [true; 4], "every value in 0..=3 should appear");
    }
}
