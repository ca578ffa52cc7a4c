//! Tests for dispatching calls through the [`PrecompileManager`].

use std::{sync::Arc, thread};

use alloy_primitives::{address, hex, Address, Bytes, U256};
use megaeth_precompiles::{
    constants::{self, BLAKE2F_ADDRESS, ECRECOVER_ADDRESS, IDENTITY_ADDRESS, MODEXP_ADDRESS},
    test_utils::CountingOperation,
    NativeOperation, PrecompileCallError, PrecompileInputs, PrecompileManager, PrecompileSpecId,
    Rules,
};
use revm::{
    database::EmptyDB,
    precompile::{bn128, identity},
};

const CALLER: Address = address!("2000000000000000000000000000000000000002");

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn call(input: impl Into<Bytes>, gas_limit: u64) -> PrecompileInputs {
    PrecompileInputs { input: input.into(), caller: CALLER, gas_limit, ..Default::default() }
}

#[test]
fn test_base_table_gas_gate() {
    let mut db = EmptyDB::default();
    init_tracing();
    let manager = PrecompileManager::new(Rules { is_homestead: true, ..Default::default() });
    assert_eq!(manager.spec(), PrecompileSpecId::HOMESTEAD);

    // ecrecover costs 3000 regardless of its input.
    let ecrecover = manager.get(&ECRECOVER_ADDRESS).unwrap();
    let input = Bytes::from(vec![0u8; 128]);
    assert_eq!(ecrecover.required_gas(&input), 3000);

    let output = manager.run(&mut db, ecrecover, &call(input.clone(), 5000)).unwrap();
    assert_eq!(output.remaining_gas, 2000);
    // An all-zero signature does not recover, which yields empty output.
    assert!(output.output.is_empty());

    let err = manager.run(&mut db, ecrecover, &call(input, 2000)).unwrap_err();
    assert!(err.is_out_of_gas());
    assert_eq!(err.remaining_gas(), 0);
}

#[test]
fn test_gas_gate_boundaries() {
    let mut db = EmptyDB::default();
    let manager = PrecompileManager::from_spec(PrecompileSpecId::BERLIN);
    for (required, supplied) in [(0, 0), (1, 0), (3000, 2999), (3000, 3000), (3000, u64::MAX)] {
        let operation = CountingOperation::new(required, Bytes::from_static(b"ok"));
        let result = manager.run(&mut db, &operation, &call(Bytes::new(), supplied));
        if supplied < required {
            assert_eq!(result, Err(PrecompileCallError::OutOfGas { required, supplied }));
            assert_eq!(operation.calls(), 0);
        } else {
            let output = result.unwrap();
            assert_eq!(output.remaining_gas, supplied - required);
            assert_eq!(output.output, Bytes::from_static(b"ok"));
            assert_eq!(operation.calls(), 1);
        }
    }
}

#[test]
fn test_newer_rules_are_served_by_newest_known_table() {
    let rules: Rules = serde_json::from_str(
        r#"{
            "chainId": 6342,
            "isHomestead": true,
            "isEIP150": true,
            "isEIP155": true,
            "isEIP158": true,
            "isByzantium": true,
            "isConstantinople": true,
            "isPetersburg": true,
            "isIstanbul": true,
            "isBerlin": true,
            "isLondon": true,
            "isMerge": true,
            "isShanghai": true,
            "isCancun": true,
            "isPrague": true
        }"#,
    )
    .unwrap();
    assert_eq!(rules.validate(), Ok(()));

    let manager = PrecompileManager::new(rules);
    assert_eq!(manager.spec(), PrecompileSpecId::BERLIN);
    assert_eq!(manager.rules().chain_id, 6342);
    assert_eq!(manager.warm_addresses().count(), 9);
    assert!(!manager.contains(&Address::with_last_byte(0x0a)));
}

#[test]
fn test_modexp_repriced_in_berlin() {
    let mut db = EmptyDB::default();
    // 3 ** (p - 2) % p with p the secp256k1 field prime.
    let mut input = Vec::new();
    input.extend_from_slice(&U256::from(1).to_be_bytes::<32>());
    input.extend_from_slice(&U256::from(32).to_be_bytes::<32>());
    input.extend_from_slice(&U256::from(32).to_be_bytes::<32>());
    input.push(0x03);
    input.extend_from_slice(&hex!(
        "fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2e"
    ));
    input.extend_from_slice(&hex!(
        "fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f"
    ));
    let input = Bytes::from(input);

    let istanbul = PrecompileManager::from_spec(PrecompileSpecId::ISTANBUL);
    let berlin = PrecompileManager::from_spec(PrecompileSpecId::BERLIN);
    let old = istanbul.get(&MODEXP_ADDRESS).unwrap();
    let new = berlin.get(&MODEXP_ADDRESS).unwrap();
    assert_eq!(old.required_gas(&input), 13_056);
    assert_eq!(new.required_gas(&input), 1_360);

    let old_output = istanbul.run(&mut db, old, &call(input.clone(), 20_000)).unwrap();
    let new_output = berlin.run(&mut db, new, &call(input, 20_000)).unwrap();
    assert_eq!(old_output.remaining_gas, 20_000 - 13_056);
    assert_eq!(new_output.remaining_gas, 20_000 - 1_360);
    assert_eq!(old_output.output, new_output.output);
    assert_eq!(old_output.output.len(), 32);
}

#[test]
fn test_blake2f_only_from_istanbul() {
    let mut db = EmptyDB::default();
    assert!(!PrecompileManager::from_spec(PrecompileSpecId::BYZANTIUM).contains(&BLAKE2F_ADDRESS));
    assert!(PrecompileManager::from_spec(PrecompileSpecId::ISTANBUL).contains(&BLAKE2F_ADDRESS));

    // Twelve rounds, test vector 5 of EIP-152.
    let input = hex!(
        "0000000c48c9bdf267e6096a3ba7ca8485ae67bb2bf894fe72f36e3cf1361d5f3af54fa5d182e6ad7f520e511f6c3e2b8c68059b6bbd41fbabd9831f79217e1319cde05b61626300000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000300000000000000000000000000000001"
    );
    let manager = PrecompileManager::from_spec(PrecompileSpecId::ISTANBUL);
    let blake2f = manager.get(&BLAKE2F_ADDRESS).unwrap();
    let output = manager.run(&mut db, blake2f, &call(input.to_vec(), 12)).unwrap();
    assert_eq!(output.remaining_gas, 0);
    assert_eq!(
        output.output.as_ref(),
        hex!(
            "ba80a53f981c4d0d6a2797b69f12f6e94c212f14685ac4b74b12bb6fdbffa2d17d87c5392aab792dc252d5de4533cc9518d38aa8dbf1925ab92386edd4009923"
        )
    );
}

#[test]
fn test_shared_manager_across_threads() {
    let manager = Arc::new(PrecompileManager::from_spec(PrecompileSpecId::BERLIN));
    let handles: Vec<_> = (0..4)
        .map(|idx| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                let precompile = manager.get(&IDENTITY_ADDRESS).unwrap();
                let data = vec![idx as u8; 64];
                let output = manager
                    .run(&mut EmptyDB::default(), precompile, &call(data.clone(), 1_000))
                    .unwrap();
                assert_eq!(output.output.as_ref(), data.as_slice());
                assert_eq!(
                    output.remaining_gas,
                    1_000 - identity::IDENTITY_BASE - 2 * identity::IDENTITY_PER_WORD
                );
                manager.warm_addresses().collect::<Vec<_>>()
            })
        })
        .collect();

    let expected: Vec<_> = manager.warm_addresses().collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_execution_error_keeps_remaining_gas() {
    let mut db = EmptyDB::default();
    let manager = PrecompileManager::from_spec(PrecompileSpecId::BYZANTIUM);
    let pairing = manager.get(&constants::BN254_PAIRING_ADDRESS).unwrap();
    // Not a multiple of 192 bytes.
    let input = Bytes::from(vec![1u8; 100]);
    assert_eq!(pairing.required_gas(&input), bn128::pair::BYZANTIUM_PAIR_BASE);

    let err = manager.run(&mut db, pairing, &call(input, 150_000)).unwrap_err();
    match err {
        PrecompileCallError::Execution { remaining_gas, .. } => {
            assert_eq!(remaining_gas, 50_000)
        }
        PrecompileCallError::OutOfGas { .. } => panic!("unexpected out of gas"),
    }
}
