#![allow(dead_code)]

use soa_engine::Soa;

pub const ROWS_SMALL: usize = 10_000;
pub const ROWS_MED: usize = 100_000;
pub const ROWS_LARGE: usize = 1_000_000;

#[derive(Clone, Copy)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy)]
pub struct Wealth {
    pub value: f32,
}

#[derive(Clone, Copy)]
pub struct Productivity {
    pub rate: f32,
}

pub type Agents = Soa<(Position, Wealth, Productivity)>;

/// Deterministic xorshift64* stream for bench data; no external RNG
/// needed for reproducible inputs.
pub struct XorShift(u64);

impl XorShift {
    pub fn new() -> Self {
        Self(0x9E37_79B9_7F4A_7C15)
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

pub fn populate(count: usize) -> Agents {
    let mut rng = XorShift::new();
    let mut agents = Agents::with_capacity(count);
    for _ in 0..count {
        agents.push_back((
            Position {
                x: rng.next_f32(),
                y: rng.next_f32(),
            },
            Wealth {
                value: 100.0 * rng.next_f32(),
            },
            Productivity {
                rate: rng.next_f32(),
            },
        ));
    }
    agents
}
