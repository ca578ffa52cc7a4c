use revm::primitives::hardfork::{SpecId, UnknownHardfork};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Precompile spec id type. Each variant is an upgrade point at which the set of precompiles
/// (or their pricing) changed.
#[repr(u8)]
#[derive(
    Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[allow(non_camel_case_types, clippy::upper_case_acronyms, missing_docs)]
pub enum PrecompileSpecId {
    /// The base precompile set, active when no later upgrade is enabled.
    #[default]
    HOMESTEAD,
    BYZANTIUM,
    ISTANBUL,
    BERLIN,
}

/// String identifiers for the precompile upgrade points
#[allow(missing_docs)]
pub mod name {
    pub const HOMESTEAD: &str = "Homestead";
    pub const BYZANTIUM: &str = "Byzantium";
    pub const ISTANBUL: &str = "Istanbul";
    pub const BERLIN: &str = "Berlin";
}

impl PrecompileSpecId {
    /// All known spec ids, oldest first.
    pub const ALL: [Self; 4] = [Self::HOMESTEAD, Self::BYZANTIUM, Self::ISTANBUL, Self::BERLIN];

    /// Converts the [`PrecompileSpecId`] into a [`SpecId`].
    pub const fn into_eth_spec(self) -> SpecId {
        match self {
            Self::HOMESTEAD => SpecId::HOMESTEAD,
            Self::BYZANTIUM => SpecId::BYZANTIUM,
            Self::ISTANBUL => SpecId::ISTANBUL,
            Self::BERLIN => SpecId::BERLIN,
        }
    }

    /// Checks if one [`PrecompileSpecId`] is enabled in another.
    ///
    /// Precompile sets are backward compatible, so a lower version is always enabled in a
    /// higher version.
    pub const fn is_enabled_in(self, other: Self) -> bool {
        other as u8 <= self as u8
    }
}

impl From<PrecompileSpecId> for &'static str {
    fn from(spec_id: PrecompileSpecId) -> Self {
        match spec_id {
            PrecompileSpecId::HOMESTEAD => name::HOMESTEAD,
            PrecompileSpecId::BYZANTIUM => name::BYZANTIUM,
            PrecompileSpecId::ISTANBUL => name::ISTANBUL,
            PrecompileSpecId::BERLIN => name::BERLIN,
        }
    }
}

impl core::fmt::Display for PrecompileSpecId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str((*self).into())
    }
}

impl FromStr for PrecompileSpecId {
    type Err = UnknownHardfork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            name::HOMESTEAD => Ok(Self::HOMESTEAD),
            name::BYZANTIUM => Ok(Self::BYZANTIUM),
            name::ISTANBUL => Ok(Self::ISTANBUL),
            name::BERLIN => Ok(Self::BERLIN),
            _ => Err(UnknownHardfork),
        }
    }
}

impl From<PrecompileSpecId> for SpecId {
    fn from(spec_id: PrecompileSpecId) -> Self {
        spec_id.into_eth_spec()
    }
}

/// Errors reported by [`Rules::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// A fork is marked active while an earlier fork it builds on is not.
    #[error("fork {fork} is active but its predecessor {missing} is not")]
    BrokenChain {
        /// The active fork.
        fork: &'static str,
        /// The inactive predecessor.
        missing: &'static str,
    },
}

/// The protocol rule set of an execution context: one flag per upgrade point.
///
/// Flags are expected to be cumulative, i.e. a later upgrade being active implies that all
/// earlier upgrades are active too. Only the flags bound to a precompile table take part in
/// table selection; the others are carried so the rule set of a newer chain config can be
/// passed in unchanged.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct Rules {
    pub chain_id: u64,
    pub is_homestead: bool,
    #[serde(rename = "isEIP150")]
    pub is_eip150: bool,
    #[serde(rename = "isEIP155")]
    pub is_eip155: bool,
    #[serde(rename = "isEIP158")]
    pub is_eip158: bool,
    pub is_byzantium: bool,
    pub is_constantinople: bool,
    pub is_petersburg: bool,
    pub is_istanbul: bool,
    pub is_berlin: bool,
    pub is_london: bool,
    pub is_merge: bool,
    pub is_shanghai: bool,
    pub is_cancun: bool,
    pub is_prague: bool,
}

impl Rules {
    /// Create a chain-consistent rule set in which every fork up to and including `spec` is
    /// active.
    pub const fn from_spec(spec: PrecompileSpecId) -> Self {
        let byzantium = spec.is_enabled_in(PrecompileSpecId::BYZANTIUM);
        let istanbul = spec.is_enabled_in(PrecompileSpecId::ISTANBUL);
        let berlin = spec.is_enabled_in(PrecompileSpecId::BERLIN);
        Self {
            chain_id: 0,
            is_homestead: true,
            is_eip150: true,
            is_eip155: true,
            is_eip158: true,
            is_byzantium: byzantium,
            is_constantinople: istanbul,
            is_petersburg: istanbul,
            is_istanbul: istanbul,
            is_berlin: berlin,
            is_london: false,
            is_merge: false,
            is_shanghai: false,
            is_cancun: false,
            is_prague: false,
        }
    }

    /// Set the chain id.
    pub const fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Returns the newest [`PrecompileSpecId`] whose flag is set.
    ///
    /// Flags are matched by priority, newest first. If none of the table-bearing flags is set
    /// the base [`PrecompileSpecId::HOMESTEAD`] is returned, so this never fails.
    pub const fn spec_id(&self) -> PrecompileSpecId {
        if self.is_berlin {
            PrecompileSpecId::BERLIN
        } else if self.is_istanbul {
            PrecompileSpecId::ISTANBUL
        } else if self.is_byzantium {
            PrecompileSpecId::BYZANTIUM
        } else {
            PrecompileSpecId::HOMESTEAD
        }
    }

    /// The flags in activation order, paired with their fork names.
    pub const fn chain(&self) -> [(&'static str, bool); 14] {
        [
            ("Homestead", self.is_homestead),
            ("EIP150", self.is_eip150),
            ("EIP155", self.is_eip155),
            ("EIP158", self.is_eip158),
            ("Byzantium", self.is_byzantium),
            ("Constantinople", self.is_constantinople),
            ("Petersburg", self.is_petersburg),
            ("Istanbul", self.is_istanbul),
            ("Berlin", self.is_berlin),
            ("London", self.is_london),
            ("Merge", self.is_merge),
            ("Shanghai", self.is_shanghai),
            ("Cancun", self.is_cancun),
            ("Prague", self.is_prague),
        ]
    }

    /// Checks that the flags form a chain: no fork is active unless every earlier fork is.
    pub fn validate(&self) -> Result<(), RulesError> {
        let chain = self.chain();
        for (idx, &(fork, active)) in chain.iter().enumerate().skip(1) {
            if !active {
                continue;
            }
            if let Some(&(missing, _)) = chain[..idx].iter().find(|(_, active)| !active) {
                return Err(RulesError::BrokenChain { fork, missing });
            }
        }
        Ok(())
    }

    /// Like [`Self::spec_id`], but logs a warning if the flags do not form a chain.
    pub(crate) fn resolve_spec_id(&self) -> PrecompileSpecId {
        if let Err(err) = self.validate() {
            warn!(target: "megaeth_precompiles", rules = ?self, %err, "Inconsistent rule set");
        }
        self.spec_id()
    }
}

impl From<PrecompileSpecId> for Rules {
    fn from(spec: PrecompileSpecId) -> Self {
        Self::from_spec(spec)
    }
}
