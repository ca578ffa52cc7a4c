//! Native operations callable at a fixed address.

use alloy_primitives::{Address, Bytes, U256};
use revm::precompile::{bn128, calc_linear_cost_u32, identity, Precompiles};

use crate::{constants, gas, PrecompileSpecId};

/// Execution context handed to a [`NativeOperation`].
///
/// It is the hook through which cancellation or deadlines would reach an operation. The
/// dispatcher always passes [`CallContext::background`] and never checks it, so operations
/// must not expect to be interrupted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct CallContext {}

impl CallContext {
    /// A context that is never cancelled.
    pub const fn background() -> Self {
        Self {}
    }
}

/// A natively implemented operation that is priced by an explicit gas cost.
pub trait NativeOperation {
    /// Error returned when the execution fails.
    type Error;

    /// Returns the gas needed to execute the operation on `input`. Must be side-effect free.
    fn required_gas(&self, input: &[u8]) -> u64;

    /// Executes the operation.
    ///
    /// `readonly` tells the operation that the call happens in a static context; enforcing
    /// it is up to the operation. Output produced before a failure is not returned by the
    /// dispatcher; an operation that needs to expose it carries it in [`Self::Error`].
    fn execute(
        &self,
        ctx: &CallContext,
        input: &Bytes,
        caller: Address,
        value: U256,
        readonly: bool,
    ) -> Result<Bytes, Self::Error>;
}

impl<T: NativeOperation + ?Sized> NativeOperation for &T {
    type Error = T::Error;

    #[inline]
    fn required_gas(&self, input: &[u8]) -> u64 {
        (**self).required_gas(input)
    }

    #[inline]
    fn execute(
        &self,
        ctx: &CallContext,
        input: &Bytes,
        caller: Address,
        value: U256,
        readonly: bool,
    ) -> Result<Bytes, Self::Error> {
        (**self).execute(ctx, input, caller, value, readonly)
    }
}

/// Errors returned by the built-in [`Precompile`]s.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrecompileFailure {
    /// The backing implementation set has no precompile at this address.
    #[error("no backing implementation for precompile {address} in {spec}")]
    Unavailable {
        /// Address of the precompile.
        address: Address,
        /// Spec whose implementation set was consulted.
        spec: PrecompileSpecId,
    },
    /// The precompile rejected its input.
    #[error("{0}")]
    Backend(String),
}

/// Pricing of the `modexp` precompile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModExpPricing {
    /// EIP-198, introduced in Byzantium.
    Eip198,
    /// EIP-2565, introduced in Berlin.
    Eip2565,
}

/// Pricing of the bn254 precompiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bn254Pricing {
    /// EIP-196 and EIP-197, introduced in Byzantium.
    Byzantium,
    /// EIP-1108, introduced in Istanbul.
    Istanbul,
}

/// The built-in precompiles. Variants that were repriced by a later spec carry their pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precompile {
    /// Public key recovery from an ECDSA signature.
    EcRecover,
    /// SHA2-256 hash.
    Sha256,
    /// RIPEMD-160 hash.
    Ripemd160,
    /// Returns its input.
    Identity,
    /// Modular exponentiation.
    ModExp(ModExpPricing),
    /// bn254 point addition.
    Bn254Add(Bn254Pricing),
    /// bn254 scalar multiplication.
    Bn254Mul(Bn254Pricing),
    /// bn254 pairing check.
    Bn254Pairing(Bn254Pricing),
    /// BLAKE2 compression function `F`.
    Blake2F,
}

impl Precompile {
    /// The address the precompile is deployed at.
    pub const fn address(&self) -> Address {
        match self {
            Self::EcRecover => constants::ECRECOVER_ADDRESS,
            Self::Sha256 => constants::SHA256_ADDRESS,
            Self::Ripemd160 => constants::RIPEMD160_ADDRESS,
            Self::Identity => constants::IDENTITY_ADDRESS,
            Self::ModExp(_) => constants::MODEXP_ADDRESS,
            Self::Bn254Add(_) => constants::BN254_ADD_ADDRESS,
            Self::Bn254Mul(_) => constants::BN254_MUL_ADDRESS,
            Self::Bn254Pairing(_) => constants::BN254_PAIRING_ADDRESS,
            Self::Blake2F => constants::BLAKE2F_ADDRESS,
        }
    }

    /// Short name of the precompile.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EcRecover => "ecrecover",
            Self::Sha256 => "sha256",
            Self::Ripemd160 => "ripemd160",
            Self::Identity => "identity",
            Self::ModExp(_) => "modexp",
            Self::Bn254Add(_) => "bn254_add",
            Self::Bn254Mul(_) => "bn254_mul",
            Self::Bn254Pairing(_) => "bn254_pairing",
            Self::Blake2F => "blake2f",
        }
    }

    /// The spec whose implementation set backs this variant.
    pub const fn backing_spec(&self) -> PrecompileSpecId {
        match self {
            Self::EcRecover | Self::Sha256 | Self::Ripemd160 | Self::Identity => {
                PrecompileSpecId::HOMESTEAD
            }
            Self::ModExp(ModExpPricing::Eip198) |
            Self::Bn254Add(Bn254Pricing::Byzantium) |
            Self::Bn254Mul(Bn254Pricing::Byzantium) |
            Self::Bn254Pairing(Bn254Pricing::Byzantium) => PrecompileSpecId::BYZANTIUM,
            Self::Bn254Add(Bn254Pricing::Istanbul) |
            Self::Bn254Mul(Bn254Pricing::Istanbul) |
            Self::Bn254Pairing(Bn254Pricing::Istanbul) |
            Self::Blake2F => PrecompileSpecId::ISTANBUL,
            Self::ModExp(ModExpPricing::Eip2565) => PrecompileSpecId::BERLIN,
        }
    }

    fn backing_set(spec: PrecompileSpecId) -> &'static Precompiles {
        match spec {
            PrecompileSpecId::HOMESTEAD => Precompiles::homestead(),
            PrecompileSpecId::BYZANTIUM => Precompiles::byzantium(),
            PrecompileSpecId::ISTANBUL => Precompiles::istanbul(),
            PrecompileSpecId::BERLIN => Precompiles::berlin(),
        }
    }
}

impl NativeOperation for Precompile {
    type Error = PrecompileFailure;

    fn required_gas(&self, input: &[u8]) -> u64 {
        use bn128::{add, mul, pair};
        use constants::homestead;

        match self {
            Self::EcRecover => homestead::ECRECOVER_GAS,
            Self::Sha256 => calc_linear_cost_u32(
                input.len(),
                homestead::SHA256_BASE_GAS,
                homestead::SHA256_PER_WORD_GAS,
            ),
            Self::Ripemd160 => calc_linear_cost_u32(
                input.len(),
                homestead::RIPEMD160_BASE_GAS,
                homestead::RIPEMD160_PER_WORD_GAS,
            ),
            Self::Identity => calc_linear_cost_u32(
                input.len(),
                identity::IDENTITY_BASE,
                identity::IDENTITY_PER_WORD,
            ),
            Self::ModExp(ModExpPricing::Eip198) => gas::modexp_eip198_cost(input),
            Self::ModExp(ModExpPricing::Eip2565) => gas::modexp_eip2565_cost(input),
            Self::Bn254Add(Bn254Pricing::Byzantium) => add::BYZANTIUM_ADD_GAS_COST,
            Self::Bn254Add(Bn254Pricing::Istanbul) => add::ISTANBUL_ADD_GAS_COST,
            Self::Bn254Mul(Bn254Pricing::Byzantium) => mul::BYZANTIUM_MUL_GAS_COST,
            Self::Bn254Mul(Bn254Pricing::Istanbul) => mul::ISTANBUL_MUL_GAS_COST,
            Self::Bn254Pairing(Bn254Pricing::Byzantium) => gas::pairing_cost(
                input.len(),
                pair::BYZANTIUM_PAIR_BASE,
                pair::BYZANTIUM_PAIR_PER_POINT,
            ),
            Self::Bn254Pairing(Bn254Pricing::Istanbul) => gas::pairing_cost(
                input.len(),
                pair::ISTANBUL_PAIR_BASE,
                pair::ISTANBUL_PAIR_PER_POINT,
            ),
            Self::Blake2F => gas::blake2f_cost(input),
        }
    }

    fn execute(
        &self,
        _ctx: &CallContext,
        input: &Bytes,
        _caller: Address,
        _value: U256,
        _readonly: bool,
    ) -> Result<Bytes, Self::Error> {
        let spec = self.backing_spec();
        let address = self.address();
        let Some(run) = Self::backing_set(spec).get(&address) else {
            return Err(PrecompileFailure::Unavailable { address, spec });
        };
        // Gas was already charged by the caller, so the backend runs unmetered.
        run(input, u64::MAX)
            .map(|output| output.bytes)
            .map_err(|err| PrecompileFailure::Backend(err.to_string()))
    }
}
