//! Identifier generation for `xml:id` values.
//!
//! IDs must be valid `xs:ID`s, which rules out a leading digit. The random
//! source is pluggable so that editions can draw their IDs from a generator
//! seeded by their title, which keeps output diffable across runs.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use sha2::{Digest, Sha256};
use uuid::Builder;

const STEM_LENGTH: usize = 8;

pub struct IdGenerator {
    rng: Box<dyn RngCore + Send>,
}

impl IdGenerator {
    /// Generator seeded from OS entropy.
    pub fn random() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Reproducible generator: the same seed text yields the same IDs.
    pub fn seeded(seed: &str) -> Self {
        let digest = Sha256::digest(seed.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self::from_rng(StdRng::from_seed(bytes))
    }

    pub fn from_rng<R: RngCore + Send + 'static>(rng: R) -> Self {
        Self { rng: Box::new(rng) }
    }

    /// `<prefix>-<8 hex digits>`; a blank prefix is replaced by a random
    /// lowercase stem.
    pub fn prefixed_id(&mut self, prefix: &str) -> String {
        let prefix = prefix.trim();
        let stem = if prefix.is_empty() {
            (0..STEM_LENGTH)
                .map(|_| char::from(self.rng.gen_range(b'a'..=b'z')))
                .collect()
        } else {
            prefix.to_string()
        };
        let mut suffix = [0u8; 4];
        self.rng.fill_bytes(&mut suffix);
        format!("{}-{}", stem, hex::encode(suffix))
    }

    /// Random version 4 UUID that does not start with a digit.
    pub fn uuid(&mut self) -> String {
        loop {
            let mut bytes = [0u8; 16];
            self.rng.fill_bytes(&mut bytes);
            let uuid = Builder::from_random_bytes(bytes).into_uuid().to_string();
            if !uuid.starts_with(|c: char| c.is_ascii_digit()) {
                return uuid;
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::random()
    }
}
