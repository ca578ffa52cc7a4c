//! Fork-aware precompile dispatcher for the Megaeth evm.
//!
//! [`PrecompileManager`] selects the precompile table of the active [`Rules`] and runs
//! precompiles under a prepaid gas budget.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod constants;

pub mod gas;

mod manager;
pub use manager::*;

mod precompile;
pub use precompile::*;

mod spec;
pub use spec::*;

mod table;
pub use table::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
