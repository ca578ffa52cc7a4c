//! Constants for the precompiles.
//!
//! Addresses are taken from the `revm` implementations that back each precompile. `revm`
//! exports the identity, bn254 and `modexp` prices itself; the sub-modules only hold the
//! prices it applies inline, grouped by the spec that introduced them.

use alloy_primitives::Address;
use revm::precompile::{blake2, bn128, hash, identity, modexp, secp256k1};

/// Address of the `ecrecover` precompile.
pub const ECRECOVER_ADDRESS: Address = secp256k1::ECRECOVER.0;
/// Address of the `sha256` precompile.
pub const SHA256_ADDRESS: Address = hash::SHA256.0;
/// Address of the `ripemd160` precompile.
pub const RIPEMD160_ADDRESS: Address = hash::RIPEMD160.0;
/// Address of the `identity` (data copy) precompile.
pub const IDENTITY_ADDRESS: Address = identity::FUN.0;
/// Address of the `modexp` precompile.
pub const MODEXP_ADDRESS: Address = modexp::BYZANTIUM.0;
/// Address of the bn254 point addition precompile.
pub const BN254_ADD_ADDRESS: Address = bn128::add::BYZANTIUM.0;
/// Address of the bn254 scalar multiplication precompile.
pub const BN254_MUL_ADDRESS: Address = bn128::mul::BYZANTIUM.0;
/// Address of the bn254 pairing check precompile.
pub const BN254_PAIRING_ADDRESS: Address = bn128::pair::ADDRESS;
/// Address of the `blake2f` compression precompile.
pub const BLAKE2F_ADDRESS: Address = blake2::FUN.0;

/// Constants for the `HOMESTEAD` spec.
pub mod homestead {
    /// Flat cost of `ecrecover`.
    pub const ECRECOVER_GAS: u64 = 3_000;
    /// Base cost of `sha256`.
    pub const SHA256_BASE_GAS: u64 = 60;
    /// Cost of `sha256` per 32-byte word of input.
    pub const SHA256_PER_WORD_GAS: u64 = 12;
    /// Base cost of `ripemd160`.
    pub const RIPEMD160_BASE_GAS: u64 = 600;
    /// Cost of `ripemd160` per 32-byte word of input.
    pub const RIPEMD160_PER_WORD_GAS: u64 = 120;
}

/// Constants for the `ISTANBUL` spec (EIP-152).
pub mod istanbul {
    /// Cost of `blake2f` per round.
    pub const BLAKE2F_PER_ROUND_GAS: u64 = 1;
    /// Exact input length accepted by `blake2f`.
    pub const BLAKE2F_INPUT_LENGTH: usize = 213;
}

#[cfg(test)]
mod tests {
    use super::*;
    use revm::precompile::u64_to_address;

    #[test]
    fn test_addresses() {
        let addresses = [
            ECRECOVER_ADDRESS,
            SHA256_ADDRESS,
            RIPEMD160_ADDRESS,
            IDENTITY_ADDRESS,
            MODEXP_ADDRESS,
            BN254_ADD_ADDRESS,
            BN254_MUL_ADDRESS,
            BN254_PAIRING_ADDRESS,
            BLAKE2F_ADDRESS,
        ];
        for (idx, address) in addresses.into_iter().enumerate() {
            assert_eq!(address, u64_to_address(idx as u64 + 1));
        }
    }
}
