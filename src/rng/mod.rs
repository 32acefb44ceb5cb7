//! Stream generators and their checkpointable state.
//!
//! Every generator here can hand out its complete internal state as a
//! [`GeneratorState`] and be rebuilt from it bit-exactly:
//! - Restored generators continue the exact stream of the original
//! - States are plain owned bytes, so copies never alias
//! - Algorithms are tagged by name, so the wire format stays stable as
//!   algorithms are added

mod taus;

use std::fmt;
use std::str::FromStr;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::{ChaCha20Rng, ChaCha8Rng};

use crate::error::{MontePiError, Result};

pub use taus::{Taus, TausState, TAUS_STATE_SIZE};

// seed (32) + stream (8) + word position (16)
const CHACHA_STATE_SIZE: usize = 56;

/// Supported generator algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    #[default]
    Taus,
    ChaCha8,
    ChaCha20,
}

impl Algorithm {
    /// All algorithms, in enumeration order.
    pub const ALL: [Algorithm; 3] = [Algorithm::Taus, Algorithm::ChaCha8, Algorithm::ChaCha20];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Taus => "taus",
            Algorithm::ChaCha8 => "chacha8",
            Algorithm::ChaCha20 => "chacha20",
        }
    }

    /// Serialized state size in bytes.
    pub fn state_size(self) -> usize {
        match self {
            Algorithm::Taus => TAUS_STATE_SIZE,
            Algorithm::ChaCha8 | Algorithm::ChaCha20 => CHACHA_STATE_SIZE,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = MontePiError;

    fn from_str(s: &str) -> Result<Self> {
        Algorithm::ALL
            .into_iter()
            .find(|alg| alg.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| MontePiError::Configuration(format!("unknown generator algorithm '{s}'")))
    }
}

/// Names of every supported algorithm.
pub fn algorithm_names() -> impl Iterator<Item = &'static str> {
    Algorithm::ALL.into_iter().map(Algorithm::name)
}

/// Complete, owned snapshot of a generator: algorithm tag plus opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorState {
    algorithm: Algorithm,
    bytes: Vec<u8>,
}

impl GeneratorState {
    /// Wrap raw bytes, checking the size against the algorithm.
    pub fn new(algorithm: Algorithm, bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() != algorithm.state_size() {
            return Err(MontePiError::Serialization(format!(
                "{algorithm} state must be {} bytes, got {}",
                algorithm.state_size(),
                bytes.len()
            )));
        }
        Ok(Self { algorithm, bytes })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// A generator of any supported algorithm.
///
/// Each instance is exclusively owned; checkpoints are taken with
/// [`StreamRng::capture`] and never by sharing the instance.
#[derive(Debug, Clone)]
pub enum StreamRng {
    Taus(Taus),
    ChaCha8(ChaCha8Rng),
    ChaCha20(ChaCha20Rng),
}

impl StreamRng {
    /// Freshly seeded generator.
    pub fn seeded(algorithm: Algorithm, seed: u64) -> Self {
        match algorithm {
            Algorithm::Taus => StreamRng::Taus(Taus::new(seed)),
            Algorithm::ChaCha8 => StreamRng::ChaCha8(ChaCha8Rng::seed_from_u64(seed)),
            Algorithm::ChaCha20 => StreamRng::ChaCha20(ChaCha20Rng::seed_from_u64(seed)),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            StreamRng::Taus(_) => Algorithm::Taus,
            StreamRng::ChaCha8(_) => Algorithm::ChaCha8,
            StreamRng::ChaCha20(_) => Algorithm::ChaCha20,
        }
    }

    /// One draw: a uniform value in [0, 1).
    ///
    /// This is the only way streams are advanced, both when spacing
    /// checkpoints and when sampling.
    #[inline]
    pub fn next_uniform(&mut self) -> f64 {
        match self {
            StreamRng::Taus(rng) => rng.next_uniform(),
            StreamRng::ChaCha8(rng) => rng.gen::<f64>(),
            StreamRng::ChaCha20(rng) => rng.gen::<f64>(),
        }
    }

    /// Snapshot the full internal state.
    pub fn capture(&self) -> GeneratorState {
        let bytes = match self {
            StreamRng::Taus(rng) => {
                let st = rng.state();
                let words = [st.s1.to_le(), st.s2.to_le(), st.s3.to_le()];
                bytemuck::bytes_of(&words).to_vec()
            }
            StreamRng::ChaCha8(rng) => {
                chacha_bytes(rng.get_seed(), rng.get_stream(), rng.get_word_pos())
            }
            StreamRng::ChaCha20(rng) => {
                chacha_bytes(rng.get_seed(), rng.get_stream(), rng.get_word_pos())
            }
        };
        GeneratorState {
            algorithm: self.algorithm(),
            bytes,
        }
    }

    /// Rebuild a generator that continues exactly where the snapshot was taken.
    pub fn restore(state: &GeneratorState) -> Result<Self> {
        let bytes = state.as_bytes();
        match state.algorithm() {
            Algorithm::Taus => {
                let words: [u32; 3] = bytemuck::pod_read_unaligned(bytes);
                let regs = TausState {
                    s1: u32::from_le(words[0]),
                    s2: u32::from_le(words[1]),
                    s3: u32::from_le(words[2]),
                };
                Taus::from_state(regs).map(StreamRng::Taus).ok_or_else(|| {
                    MontePiError::Serialization(format!("degenerate taus registers {regs:?}"))
                })
            }
            Algorithm::ChaCha8 => {
                let (seed, stream, word_pos) = chacha_parts(bytes);
                let mut rng = ChaCha8Rng::from_seed(seed);
                rng.set_stream(stream);
                rng.set_word_pos(word_pos);
                Ok(StreamRng::ChaCha8(rng))
            }
            Algorithm::ChaCha20 => {
                let (seed, stream, word_pos) = chacha_parts(bytes);
                let mut rng = ChaCha20Rng::from_seed(seed);
                rng.set_stream(stream);
                rng.set_word_pos(word_pos);
                Ok(StreamRng::ChaCha20(rng))
            }
        }
    }
}

impl RngCore for StreamRng {
    fn next_u32(&mut self) -> u32 {
        match self {
            StreamRng::Taus(rng) => rng.next_u32(),
            StreamRng::ChaCha8(rng) => rng.next_u32(),
            StreamRng::ChaCha20(rng) => rng.next_u32(),
        }
    }

    fn next_u64(&mut self) -> u64 {
        match self {
            StreamRng::Taus(rng) => rng.next_u64(),
            StreamRng::ChaCha8(rng) => rng.next_u64(),
            StreamRng::ChaCha20(rng) => rng.next_u64(),
        }
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        match self {
            StreamRng::Taus(rng) => rng.fill_bytes(dest),
            StreamRng::ChaCha8(rng) => rng.fill_bytes(dest),
            StreamRng::ChaCha20(rng) => rng.fill_bytes(dest),
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

fn chacha_bytes(seed: [u8; 32], stream: u64, word_pos: u128) -> Vec<u8> {
    let mut out = Vec::with_capacity(CHACHA_STATE_SIZE);
    out.extend_from_slice(&seed);
    out.extend_from_slice(&stream.to_le_bytes());
    out.extend_from_slice(&word_pos.to_le_bytes());
    out
}

// Callers have already checked the length via `GeneratorState::new`.
fn chacha_parts(bytes: &[u8]) -> ([u8; 32], u64, u128) {
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&bytes[..32]);
    let mut stream = [0u8; 8];
    stream.copy_from_slice(&bytes[32..40]);
    let mut word_pos = [0u8; 16];
    word_pos.copy_from_slice(&bytes[40..56]);
    (seed, u64::from_le_bytes(stream), u128::from_le_bytes(word_pos))
}
