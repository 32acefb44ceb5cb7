//! Combined Tausworthe generator.
//!
//! L'Ecuyer's maximally equidistributed three-component Tausworthe
//! generator (period ~2^88). Seeding follows the classic procedure so that
//! a seed produces the same stream as other well-known implementations of
//! `taus`.

use bytemuck::{Pod, Zeroable};
use rand::RngCore;

/// Raw register state (12 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct TausState {
    pub s1: u32,
    pub s2: u32,
    pub s3: u32,
}

/// Size of the serialized register state in bytes.
pub const TAUS_STATE_SIZE: usize = std::mem::size_of::<TausState>();

// Registers below these values collapse to a short cycle.
const S1_MIN: u32 = 2;
const S2_MIN: u32 = 8;
const S3_MIN: u32 = 16;

const WARM_UP: usize = 6;

#[inline]
fn lcg(n: u32) -> u32 {
    n.wrapping_mul(69069)
}

#[inline]
fn tausworthe(s: u32, a: u32, b: u32, c: u32, d: u32) -> u32 {
    ((s & c) << d) ^ (((s << a) ^ s) >> b)
}

/// Tausworthe PRNG instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taus {
    state: TausState,
}

impl Taus {
    /// Seed the generator. A zero seed is treated as 1.
    pub fn new(seed: u64) -> Self {
        let seed = if seed == 0 { 1 } else { seed };

        let mut s1 = lcg(seed as u32);
        if s1 < S1_MIN {
            s1 += S1_MIN;
        }
        let mut s2 = lcg(s1);
        if s2 < S2_MIN {
            s2 += S2_MIN;
        }
        let mut s3 = lcg(s2);
        if s3 < S3_MIN {
            s3 += S3_MIN;
        }

        let mut rng = Self {
            state: TausState { s1, s2, s3 },
        };
        for _ in 0..WARM_UP {
            rng.step();
        }
        rng
    }

    /// Restore from captured registers. Returns `None` for degenerate states.
    pub fn from_state(state: TausState) -> Option<Self> {
        if state.s1 < S1_MIN || state.s2 < S2_MIN || state.s3 < S3_MIN {
            return None;
        }
        Some(Self { state })
    }

    /// Current registers (for checkpointing).
    pub fn state(&self) -> TausState {
        self.state
    }

    #[inline]
    fn step(&mut self) -> u32 {
        let st = &mut self.state;
        st.s1 = tausworthe(st.s1, 13, 19, 0xFFFF_FFFE, 12);
        st.s2 = tausworthe(st.s2, 2, 25, 0xFFFF_FFF8, 4);
        st.s3 = tausworthe(st.s3, 3, 11, 0xFFFF_FFF0, 17);
        st.s1 ^ st.s2 ^ st.s3
    }

    /// Uniform in [0, 1) from a single 32-bit output.
    #[inline]
    pub fn next_uniform(&mut self) -> f64 {
        self.step() as f64 / 4_294_967_296.0
    }
}

impl RngCore for Taus {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        rand_chacha::rand_core::impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand_chacha::rand_core::impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
