use alloy_primitives::{Address, Bytes, U256};
use revm::Database;
use tracing::{debug, trace};

use crate::{CallContext, NativeOperation, Precompile, PrecompileSpecId, PrecompileTable, Rules};

/// Inputs of a precompile call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecompileInputs {
    /// Call data.
    pub input: Bytes,
    /// Caller of the precompile.
    pub caller: Address,
    /// Value transferred with the call.
    pub value: U256,
    /// Gas supplied to the call.
    pub gas_limit: u64,
    /// Whether the call happens in a static context.
    pub is_static: bool,
}

/// Successful result of [`PrecompileManager::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecompileCallOutput {
    /// Output of the precompile.
    pub output: Bytes,
    /// Gas left after paying for the call.
    pub remaining_gas: u64,
}

/// Error of [`PrecompileManager::run`]. `E` is the error type of the invoked operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrecompileCallError<E> {
    /// The supplied gas does not cover the cost. The operation was not executed.
    #[error("out of gas: required {required}, supplied {supplied}")]
    OutOfGas {
        /// Gas required by the operation.
        required: u64,
        /// Gas supplied to the call.
        supplied: u64,
    },
    /// The operation was charged and executed, but failed.
    #[error("precompile execution failed: {error}")]
    Execution {
        /// The operation's own error, unchanged.
        error: E,
        /// Gas left after paying for the call.
        remaining_gas: u64,
    },
}

impl<E> PrecompileCallError<E> {
    /// Gas left to the caller. Always zero for [`PrecompileCallError::OutOfGas`].
    pub const fn remaining_gas(&self) -> u64 {
        match self {
            Self::OutOfGas { .. } => 0,
            Self::Execution { remaining_gas, .. } => *remaining_gas,
        }
    }

    /// Returns `true` for [`PrecompileCallError::OutOfGas`].
    pub const fn is_out_of_gas(&self) -> bool {
        matches!(self, Self::OutOfGas { .. })
    }
}

/// Resolves the precompile table for a rule set and runs precompiles under a gas budget.
///
/// The table is selected once, in the constructor, and never changes afterwards. The manager
/// holds only a `&'static` reference to the table, so it is cheap to create one per call frame
/// and safe to share between threads.
#[derive(Debug, Clone, Copy)]
pub struct PrecompileManager {
    rules: Rules,
    spec: PrecompileSpecId,
    precompiles: &'static PrecompileTable,
}

impl PrecompileManager {
    /// Create a new `PrecompileManager` for the given rule set.
    pub fn new(rules: Rules) -> Self {
        let spec = rules.resolve_spec_id();
        let precompiles = PrecompileTable::for_spec(spec);
        debug!(
            target: "megaeth_precompiles",
            %spec,
            chain_id = rules.chain_id,
            count = precompiles.len(),
            "Resolved precompile table"
        );
        Self { rules, spec, precompiles }
    }

    /// Create a new `PrecompileManager` for a chain-consistent rule set ending at `spec`.
    pub fn from_spec(spec: PrecompileSpecId) -> Self {
        Self::new(Rules::from_spec(spec))
    }

    /// The rule set this manager was created with.
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// The spec selected from the rule set.
    pub const fn spec(&self) -> PrecompileSpecId {
        self.spec
    }

    /// The table in effect.
    pub const fn precompiles(&self) -> &'static PrecompileTable {
        self.precompiles
    }

    /// Returns `true` if a precompile is deployed at `address`.
    #[inline]
    pub fn contains(&self, address: &Address) -> bool {
        self.precompiles.contains(address)
    }

    /// Returns the precompile deployed at `address`, if any.
    #[inline]
    pub fn get(&self, address: &Address) -> Option<&'static Precompile> {
        self.precompiles.get(address)
    }

    /// Addresses of the active precompiles, which are warm from the start of a transaction
    /// (EIP-2929).
    pub fn warm_addresses(&self) -> impl ExactSizeIterator<Item = Address> + 'static {
        self.precompiles.addresses().copied()
    }

    /// Runs `precompile` with the given inputs.
    ///
    /// The cost is charged before execution. If `inputs.gas_limit` does not cover it, the call
    /// fails with [`PrecompileCallError::OutOfGas`] and the precompile is not executed.
    /// Otherwise the precompile is executed exactly once and its output or error is returned
    /// unchanged, together with the gas left.
    ///
    /// `state` is accepted for precompiles that need access to it and is not read here.
    pub fn run<DB, P>(
        &self,
        _state: &mut DB,
        precompile: &P,
        inputs: &PrecompileInputs,
    ) -> Result<PrecompileCallOutput, PrecompileCallError<P::Error>>
    where
        DB: Database,
        P: NativeOperation + ?Sized,
    {
        let required = precompile.required_gas(&inputs.input);
        let Some(remaining_gas) = inputs.gas_limit.checked_sub(required) else {
            trace!(
                target: "megaeth_precompiles",
                required,
                supplied = inputs.gas_limit,
                "Precompile out of gas"
            );
            return Err(PrecompileCallError::OutOfGas { required, supplied: inputs.gas_limit });
        };

        match precompile.execute(
            &CallContext::background(),
            &inputs.input,
            inputs.caller,
            inputs.value,
            inputs.is_static,
        ) {
            Ok(output) => {
                trace!(
                    target: "megaeth_precompiles",
                    required,
                    remaining_gas,
                    "Precompile executed"
                );
                Ok(PrecompileCallOutput { output, remaining_gas })
            }
            Err(error) => {
                trace!(
                    target: "megaeth_precompiles",
                    required,
                    remaining_gas,
                    "Precompile failed"
                );
                Err(PrecompileCallError::Execution { error, remaining_gas })
            }
        }
    }
}

impl Default for PrecompileManager {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}

impl From<Rules> for PrecompileManager {
    fn from(rules: Rules) -> Self {
        Self::new(rules)
    }
}
