// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]
//! Deterministic synthetic signals shared by the benchmarks.

fn lcg_next(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state
}

/// Uniform noise in `[-1, 1)` from a fixed seed.
pub fn noise(len: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..len)
        .map(|_| (lcg_next(&mut state) >> 11) as f64 / (1u64 << 52) as f64 - 1.0)
        .collect()
}

/// A sine with period `period` plus `amplitude`-scaled noise.
pub fn noisy_sine(len: usize, period: f64, amplitude: f64, seed: u64) -> Vec<f64> {
    noise(len, seed)
        .into_iter()
        .enumerate()
        .map(|(idx, eps)| (idx as f64 * std::f64::consts::TAU / period).sin() + amplitude * eps)
        .collect()
}

/// Logistic-map driven pair where `y` follows `x` with a lag of `lag` samples.
pub fn coupled_pair(len: usize, lag: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut state = seed;
    let mut value = 0.1 + ((lcg_next(&mut state) >> 11) as f64 / (1u64 << 53) as f64) * 0.8;
    let x: Vec<f64> = (0..len + lag)
        .map(|_| {
            value = 3.9 * value * (1.0 - value);
            value
        })
        .collect();
    let jitter = noise(len, seed ^ 0x9e37_79b9_7f4a_7c15);
    let y = (0..len).map(|idx| x[idx] + 0.05 * jitter[idx]).collect();
    (x[lag..].to_vec(), y)
}
