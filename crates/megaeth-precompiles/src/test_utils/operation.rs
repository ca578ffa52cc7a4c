use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use alloy_primitives::{Address, Bytes, U256};

use crate::{CallContext, NativeOperation};

/// Arguments of one [`CountingOperation::execute`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Call data.
    pub input: Bytes,
    /// Caller.
    pub caller: Address,
    /// Transferred value.
    pub value: U256,
    /// Whether the call was static.
    pub readonly: bool,
}

/// A [`NativeOperation`] with a fixed gas cost that counts how often it is executed.
#[derive(Debug)]
pub struct CountingOperation {
    gas: u64,
    result: Result<Bytes, &'static str>,
    calls: AtomicUsize,
    last_call: Mutex<Option<RecordedCall>>,
}

impl CountingOperation {
    /// An operation costing `gas` that returns `output`.
    pub fn new(gas: u64, output: Bytes) -> Self {
        Self::with_result(gas, Ok(output))
    }

    /// An operation costing `gas` that fails with `error`.
    pub fn failing(gas: u64, error: &'static str) -> Self {
        Self::with_result(gas, Err(error))
    }

    fn with_result(gas: u64, result: Result<Bytes, &'static str>) -> Self {
        Self { gas, result, calls: AtomicUsize::new(0), last_call: Mutex::new(None) }
    }

    /// Number of times [`NativeOperation::execute`] was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Arguments of the most recent execution.
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.last_call.lock().unwrap().clone()
    }
}

impl NativeOperation for CountingOperation {
    type Error = &'static str;

    fn required_gas(&self, _input: &[u8]) -> u64 {
        self.gas
    }

    fn execute(
        &self,
        _ctx: &CallContext,
        input: &Bytes,
        caller: Address,
        value: U256,
        readonly: bool,
    ) -> Result<Bytes, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_call.lock().unwrap() =
            Some(RecordedCall { input: input.clone(), caller, value, readonly });
        self.result.clone()
    }
}
