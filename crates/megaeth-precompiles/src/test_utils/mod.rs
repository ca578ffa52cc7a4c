//! Test utilities for the precompile dispatcher.

mod operation;

pub use operation::*;
