//! Random sources for game rounds
//!
//! Production rounds use [`SeededSource`] (ChaCha8) or the auditable
//! [`VerifiableSource`]; tests script exact draws with [`SequenceSource`].

use crate::common::traits::RandomSource;
use crate::errors::RandomSourceError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use std::sync::Mutex;

/// ChaCha8-backed uniform source
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: ChaCha8Rng,
}

impl SeededSource {
    /// Deterministic source for a given seed
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Independent stream `stream` of the same seed, used for per-worker
    /// generators in parallel simulations
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        Self { rng }
    }

    /// Seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl RandomSource for SeededSource {
    fn next_f64(&mut self) -> Result<f64, RandomSourceError> {
        Ok(self.rng.gen::<f64>())
    }
}

/// Finite scripted source; fails once the script runs out
#[derive(Debug, Clone, Default)]
pub struct SequenceSource {
    values: Vec<f64>,
    position: usize,
}

impl SequenceSource {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().collect(),
            position: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.values.len() - self.position
    }
}

impl From<Vec<f64>> for SequenceSource {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl RandomSource for SequenceSource {
    fn next_f64(&mut self) -> Result<f64, RandomSourceError> {
        let value = *self
            .values
            .get(self.position)
            .ok_or(RandomSourceError::Exhausted { drawn: self.position })?;
        if !(0.0..1.0).contains(&value) {
            return Err(RandomSourceError::OutOfRange(value));
        }
        self.position += 1;
        Ok(value)
    }
}

/// Hash-chain source that anyone holding the seeds can replay
///
/// Block `n` is `SHA-256("{server_seed}:{client_seed}:{nonce}:{n}")`; each
/// block yields eight big-endian `u32` words mapped onto `[0, 1)`.
#[derive(Debug, Clone)]
pub struct VerifiableSource {
    server_seed: String,
    client_seed: String,
    nonce: u64,
    block_index: u64,
    block: [u8; 32],
    cursor: usize,
}

impl VerifiableSource {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce,
            block_index: 0,
            block: [0u8; 32],
            cursor: 32,
        }
    }

    /// Commitment published before play
    pub fn server_seed_hash_hex(&self) -> String {
        hex::encode(Sha256::digest(self.server_seed.as_bytes()))
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    fn refill(&mut self) {
        let message = format!(
            "{}:{}:{}:{}",
            self.server_seed, self.client_seed, self.nonce, self.block_index
        );
        self.block.copy_from_slice(&Sha256::digest(message.as_bytes()));
        self.block_index += 1;
        self.cursor = 0;
    }
}

impl RandomSource for VerifiableSource {
    fn next_f64(&mut self) -> Result<f64, RandomSourceError> {
        if self.cursor + 4 > self.block.len() {
            self.refill();
        }
        let chunk = &self.block[self.cursor..self.cursor + 4];
        let word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        self.cursor += 4;
        Ok(word as f64 / (u32::MAX as f64 + 1.0))
    }
}

/// Mutex-guarded source shared between threads
///
/// A round must take all of its draws under one lock so that two concurrent
/// rounds never interleave on the same sequence; use [`SharedSource::with_round`].
#[derive(Debug, Default)]
pub struct SharedSource<R> {
    inner: Mutex<R>,
}

impl<R: RandomSource> SharedSource<R> {
    pub fn new(source: R) -> Self {
        Self {
            inner: Mutex::new(source),
        }
    }

    /// Run one whole round with exclusive access to the generator
    pub fn with_round<T>(&self, round: impl FnOnce(&mut R) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        round(&mut guard)
    }

    /// Take `count` consecutive draws as a single block
    pub fn draw_round(&self, count: usize) -> Result<Vec<f64>, RandomSourceError> {
        self.with_round(|rng| (0..count).map(|_| rng.next_f64()).collect())
    }

    pub fn into_inner(self) -> R {
        self.inner.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Fisher-Yates shuffle driven by a [`RandomSource`]
pub fn shuffle<T, R: RandomSource + ?Sized>(items: &mut [T], rng: &mut R) -> Result<(), RandomSourceError> {
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1)?;
        items.swap(i, j);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_seeded_source_is_reproducible() {
        let mut a = SeededSource::from_seed(7);
        let mut b = SeededSource::from_seed(7);
        for _ in 0..100 {
            assert_eq!(a.next_f64().unwrap(), b.next_f64().unwrap());
        }
    }

    #[test]
    fn test_entropy_source_yields_unit_interval() {
        let mut source = SeededSource::from_entropy();
        for _ in 0..100 {
            let value = source.next_f64().unwrap();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_streams_are_independent() {
        let mut a = SeededSource::for_stream(7, 0);
        let mut b = SeededSource::for_stream(7, 1);
        let first: Vec<f64> = (0..8).map(|_| a.next_f64().unwrap()).collect();
        let second: Vec<f64> = (0..8).map(|_| b.next_f64().unwrap()).collect();
        assert_ne!(first, second);
    }

    #[test]
    fn test_seeded_values_in_unit_interval() {
        let mut rng = SeededSource::from_seed(99);
        for _ in 0..10_000 {
            let u = rng.next_f64().unwrap();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn test_sequence_source_exhausts() {
        let mut rng = SequenceSource::new([0.1, 0.2]);
        assert_eq!(rng.next_f64().unwrap(), 0.1);
        assert_eq!(rng.remaining(), 1);
        assert_eq!(rng.next_f64().unwrap(), 0.2);
        assert_eq!(rng.next_f64(), Err(RandomSourceError::Exhausted { drawn: 2 }));
    }

    #[test]
    fn test_sequence_source_rejects_out_of_range() {
        let mut rng = SequenceSource::new([1.0]);
        assert_eq!(rng.next_f64(), Err(RandomSourceError::OutOfRange(1.0)));
    }

    #[test]
    fn test_verifiable_source_replays() {
        let mut a = VerifiableSource::new("server", "client", 1);
        let mut b = VerifiableSource::new("server", "client", 1);
        let mut c = VerifiableSource::new("server", "client", 2);

        // More than one hash block's worth of draws
        let xs: Vec<f64> = (0..20).map(|_| a.next_f64().unwrap()).collect();
        let ys: Vec<f64> = (0..20).map(|_| b.next_f64().unwrap()).collect();
        let zs: Vec<f64> = (0..20).map(|_| c.next_f64().unwrap()).collect();

        assert_eq!(xs, ys);
        assert_ne!(xs, zs);
        assert!(xs.iter().all(|u| (0.0..1.0).contains(u)));
        assert_eq!(a.server_seed_hash_hex(), c.server_seed_hash_hex());
        assert_eq!(a.server_seed_hash_hex().len(), 64);
    }

    #[test]
    fn test_shared_source_rounds_do_not_interleave() {
        let shared = Arc::new(SharedSource::new(SequenceSource::new(
            (0..400).map(|i| i as f64 / 400.0),
        )));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    (0..10)
                        .map(|_| shared.draw_round(10).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            for round in handle.join().unwrap() {
                // Each round saw ten consecutive positions of the script
                for pair in round.windows(2) {
                    assert!((pair[1] - pair[0] - 1.0 / 400.0).abs() < 1e-12);
                }
            }
        }
        assert_eq!(Arc::try_unwrap(shared).unwrap().into_inner().remaining(), 0);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = SeededSource::from_seed(3);
        let mut items: Vec<u8> = (1..=50).collect();
        shuffle(&mut items, &mut rng).unwrap();
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=50).collect::<Vec<u8>>());
    }
}
