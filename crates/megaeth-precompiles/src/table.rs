//! The per-spec precompile tables.

use alloy_primitives::{map::HashMap, Address};
use once_cell::race::OnceBox;

use crate::{Bn254Pricing, ModExpPricing, Precompile, PrecompileSpecId};

/// An immutable mapping from address to [`Precompile`] for one [`PrecompileSpecId`].
///
/// Tables are only built through the per-spec constructors, each of which extends the table of
/// the previous spec. Addresses are never removed, only added or repriced.
#[derive(Debug, Clone)]
pub struct PrecompileTable {
    spec: PrecompileSpecId,
    inner: HashMap<Address, Precompile>,
    /// Addresses in ascending order.
    addresses: Vec<Address>,
}

impl PrecompileTable {
    /// Returns the table in effect for `spec`.
    pub fn for_spec(spec: PrecompileSpecId) -> &'static Self {
        match spec {
            PrecompileSpecId::HOMESTEAD => Self::homestead(),
            PrecompileSpecId::BYZANTIUM => Self::byzantium(),
            PrecompileSpecId::ISTANBUL => Self::istanbul(),
            PrecompileSpecId::BERLIN => Self::berlin(),
        }
    }

    /// Precompiles for the `HOMESTEAD` spec.
    pub fn homestead() -> &'static Self {
        static INSTANCE: OnceBox<PrecompileTable> = OnceBox::new();
        INSTANCE.get_or_init(|| {
            let mut table = Self {
                spec: PrecompileSpecId::HOMESTEAD,
                inner: HashMap::default(),
                addresses: Vec::new(),
            };
            table.extend([
                Precompile::EcRecover,
                Precompile::Sha256,
                Precompile::Ripemd160,
                Precompile::Identity,
            ]);
            Box::new(table)
        })
    }

    /// Precompiles for the `BYZANTIUM` spec.
    pub fn byzantium() -> &'static Self {
        static INSTANCE: OnceBox<PrecompileTable> = OnceBox::new();
        INSTANCE.get_or_init(|| {
            let mut table = Self::homestead().clone();
            table.spec = PrecompileSpecId::BYZANTIUM;
            // EIP-198, EIP-196 and EIP-197
            table.extend([
                Precompile::ModExp(ModExpPricing::Eip198),
                Precompile::Bn254Add(Bn254Pricing::Byzantium),
                Precompile::Bn254Mul(Bn254Pricing::Byzantium),
                Precompile::Bn254Pairing(Bn254Pricing::Byzantium),
            ]);
            Box::new(table)
        })
    }

    /// Precompiles for the `ISTANBUL` spec.
    pub fn istanbul() -> &'static Self {
        static INSTANCE: OnceBox<PrecompileTable> = OnceBox::new();
        INSTANCE.get_or_init(|| {
            let mut table = Self::byzantium().clone();
            table.spec = PrecompileSpecId::ISTANBUL;
            // EIP-1108 reprices the bn254 precompiles, EIP-152 adds blake2f
            table.extend([
                Precompile::Bn254Add(Bn254Pricing::Istanbul),
                Precompile::Bn254Mul(Bn254Pricing::Istanbul),
                Precompile::Bn254Pairing(Bn254Pricing::Istanbul),
                Precompile::Blake2F,
            ]);
            Box::new(table)
        })
    }

    /// Precompiles for the `BERLIN` spec.
    pub fn berlin() -> &'static Self {
        static INSTANCE: OnceBox<PrecompileTable> = OnceBox::new();
        INSTANCE.get_or_init(|| {
            let mut table = Self::istanbul().clone();
            table.spec = PrecompileSpecId::BERLIN;
            // EIP-2565
            table.extend([Precompile::ModExp(ModExpPricing::Eip2565)]);
            Box::new(table)
        })
    }

    /// Inserts the precompiles at their addresses, replacing any precompile already deployed
    /// there.
    fn extend(&mut self, precompiles: impl IntoIterator<Item = Precompile>) {
        for precompile in precompiles {
            let address = precompile.address();
            if self.inner.insert(address, precompile).is_none() {
                let idx = self.addresses.partition_point(|existing| *existing < address);
                self.addresses.insert(idx, address);
            }
        }
    }

    /// The spec this table belongs to.
    pub const fn spec(&self) -> PrecompileSpecId {
        self.spec
    }

    /// Returns the precompile deployed at `address`, if any.
    #[inline]
    pub fn get(&self, address: &Address) -> Option<&Precompile> {
        self.inner.get(address)
    }

    /// Returns `true` if a precompile is deployed at `address`.
    #[inline]
    pub fn contains(&self, address: &Address) -> bool {
        self.inner.contains_key(address)
    }

    /// Addresses of all precompiles in the table, in ascending order.
    pub fn addresses(&self) -> impl ExactSizeIterator<Item = &Address> + '_ {
        self.addresses.iter()
    }

    /// Iterates over `(address, precompile)` pairs in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Precompile)> + '_ {
        self.addresses.iter().filter_map(|address| self.inner.get_key_value(address))
    }

    /// Number of precompiles in the table.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Returns `true` if the table has no precompile.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
