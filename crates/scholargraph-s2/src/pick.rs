//! Deterministic pick stream keyed by seed and row key

/// Uniform picks from a blake3 XOF seeded with `(seed, key)`.
///
/// The same seed and key always yield the same sequence, independent of
/// input order or how many other keys were processed before.
pub struct Picker {
    reader: blake3::OutputReader,
}

impl Picker {
    pub fn new(seed: u64, key: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&seed.to_le_bytes());
        hasher.update(key.as_bytes());
        Self {
            reader: hasher.finalize_xof(),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.reader.fill(&mut buf);
        u64::from_le_bytes(buf)
    }

    /// Uniform index in `0..n` (rejection sampling, no modulo bias).
    ///
    /// `n` must be non-zero.
    pub fn below(&mut self, n: usize) -> usize {
        debug_assert!(n > 0);
        let n = n as u64;
        let zone = u64::MAX - (u64::MAX % n);
        loop {
            let v = self.next_u64();
            if v < zone {
                return (v % n) as usize;
            }
        }
    }

    /// Uniform value in `lo..=hi`
    pub fn between(&mut self, lo: usize, hi: usize) -> usize {
        lo + self.below(hi - lo + 1)
    }
}
