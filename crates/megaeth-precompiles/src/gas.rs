//! Gas cost functions of the precompiles whose price depends on the input.
//!
//! The pricing formulas are `revm`'s. This module reads the input the way the precompiles do
//! and saturates at [`u64::MAX`] where a length does not fit, so an absurd input always prices
//! itself out of any gas limit.

use alloy_primitives::U256;
use revm::precompile::{bn128::PAIR_ELEMENT_LEN, modexp};

use crate::constants::istanbul::{BLAKE2F_INPUT_LENGTH, BLAKE2F_PER_ROUND_GAS};

/// Cost of a bn254 pairing check over `len` bytes of input.
#[inline]
pub const fn pairing_cost(len: usize, base: u64, per_point: u64) -> u64 {
    let pairs = (len / PAIR_ELEMENT_LEN) as u64;
    base.saturating_add(per_point.saturating_mul(pairs))
}

/// Cost of `blake2f` as defined by EIP-152: one unit per round. Malformed input is priced at
/// zero, the precompile itself rejects it.
#[inline]
pub fn blake2f_cost(input: &[u8]) -> u64 {
    if input.len() != BLAKE2F_INPUT_LENGTH {
        return 0;
    }
    let rounds = u32::from_be_bytes([input[0], input[1], input[2], input[3]]);
    (rounds as u64).saturating_mul(BLAKE2F_PER_ROUND_GAS)
}

/// Cost of `modexp` under EIP-198.
pub fn modexp_eip198_cost(input: &[u8]) -> u64 {
    let header = ModExpHeader::parse(input);
    modexp::byzantium_gas_calc(header.base_len, header.exp_len, header.mod_len, &header.exp_head)
}

/// Cost of `modexp` under EIP-2565.
pub fn modexp_eip2565_cost(input: &[u8]) -> u64 {
    let header = ModExpHeader::parse(input);
    modexp::berlin_gas_calc(header.base_len, header.exp_len, header.mod_len, &header.exp_head)
}

/// The length header of a `modexp` call and the head of its exponent.
///
/// Lengths that do not fit in a `u64` are clamped to [`u64::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ModExpHeader {
    base_len: u64,
    exp_len: u64,
    mod_len: u64,
    /// The first (at most) 32 bytes of the exponent.
    exp_head: U256,
}

impl ModExpHeader {
    fn parse(input: &[u8]) -> Self {
        let base_len = saturating_u64(read_padded(input, 0, 32));
        let exp_len = saturating_u64(read_padded(input, 32, 32));
        let mod_len = saturating_u64(read_padded(input, 64, 32));
        let data = input.get(96..).unwrap_or_default();

        let exp_head = match usize::try_from(base_len) {
            Ok(start) if start < data.len() => read_padded(data, start, exp_len.min(32) as usize),
            _ => U256::ZERO,
        };

        Self { base_len, exp_len, mod_len, exp_head }
    }
}

/// Reads `size` (at most 32) big-endian bytes at `start`, treating bytes past the end of
/// `input` as zero.
fn read_padded(input: &[u8], start: usize, size: usize) -> U256 {
    let mut buf = [0u8; 32];
    if let Some(available) = input.get(start..) {
        let n = available.len().min(size);
        buf[..n].copy_from_slice(&available[..n]);
    }
    U256::from_be_slice(&buf[..size])
}

fn saturating_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
