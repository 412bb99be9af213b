#![cfg(test)]

// Property tests for Dict kept inside the crate so they can also check
// the table's bucket layout directly.

use crate::dict::Dict;
use crate::error::DictError;
use crate::hash::{HashSeed, StrHasher};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i32),
    Get(usize),
    Delete(usize),
    Contains(String),
    Pop(usize, Option<i32>),
    SetDefault(usize, i32),
    Iterate,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=16).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            2 => idx.clone().prop_map(OpI::Get),
            2 => idx.clone().prop_map(OpI::Delete),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (idx.clone(), proptest::option::of(any::<i32>()))
                .prop_map(|(i, d)| OpI::Pop(i, d)),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::SetDefault(i, v)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_scenario(seed: HashSeed, pool: &[String], ops: Vec<OpI>) -> Result<(), TestCaseError> {
    let mut sut: Dict<i32> = Dict::with_seed(seed);
    let mut model: BTreeMap<String, i32> = BTreeMap::new();
    let hasher = StrHasher::new(seed);

    for op in ops {
        match op {
            OpI::Set(i, v) => {
                let k = &pool[i];
                let old = sut.set(k.clone(), v);
                prop_assert_eq!(old, model.insert(k.clone(), v));
                // Overwritten or new, the key is now last in its bucket.
                let idx = sut.table.bucket_index(k);
                prop_assert_eq!(sut.table.bucket_keys(idx).last(), Some(k.as_str()));
            }
            OpI::Get(i) => {
                let k = &pool[i];
                match model.get(k) {
                    Some(v) => prop_assert_eq!(sut.get(k), Ok(v)),
                    None => prop_assert_eq!(sut.get(k), Err(DictError::KeyNotFound(k.clone()))),
                }
            }
            OpI::Delete(i) => {
                let k = &pool[i];
                match model.remove(k) {
                    Some(v) => prop_assert_eq!(sut.delete(k), Ok(v)),
                    None => prop_assert!(sut.delete(k).is_err()),
                }
                prop_assert!(!sut.contains(k));
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains(&s), model.contains_key(&s));
            }
            OpI::Pop(i, d) => {
                let k = &pool[i];
                let got = sut.pop(k, d);
                match (model.remove(k), d) {
                    (Some(v), _) | (None, Some(v)) => prop_assert_eq!(got, Ok((k.clone(), v))),
                    (None, None) => prop_assert_eq!(got, Err(DictError::KeyNotFound(k.clone()))),
                }
            }
            OpI::SetDefault(i, v) => {
                let k = &pool[i];
                let expected = *model.entry(k.clone()).or_insert(v);
                let (kk, vv) = sut.set_default(k, v);
                prop_assert_eq!(kk, k.as_str());
                prop_assert_eq!(*vv, expected);
            }
            OpI::Iterate => {
                let first = sut.items();
                let second = sut.items();
                prop_assert_eq!(&first, &second, "items must be stable without mutation");
                let s_keys: BTreeSet<&str> = first.iter().map(|(k, _)| *k).collect();
                let m_keys: BTreeSet<&str> = model.keys().map(String::as_str).collect();
                prop_assert_eq!(s_keys, m_keys);
            }
            OpI::Clear => {
                let buckets = sut.bucket_count();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.bucket_count(), buckets);
            }
        }

        // Post-conditions after each op
        // 1) Size parity and no duplicate keys
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.keys().len(), model.len());
        // 2) Every entry sits in the bucket its hash selects
        let n = sut.bucket_count() as u64;
        for idx in 0..sut.bucket_count() {
            for k in sut.table.bucket_keys(idx) {
                prop_assert_eq!((hasher.hash_str(k) % n) as usize, idx);
            }
        }
        // 3) Growth only ever squares from 8
        prop_assert!([8usize, 64, 4096].contains(&sut.bucket_count()));
        // 4) Values agree with the model
        for (k, v) in &sut {
            prop_assert_eq!(model.get(k), Some(v));
        }
    }
    Ok(())
}

// Property: State-machine equivalence against BTreeMap with a fixed seed.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_fixed_seed((pool, ops) in arb_scenario()) {
        run_scenario(HashSeed::new(0x5eed), &pool, ops)?;
    }
}

// Property: Same invariants with arbitrary seeds, including ones that make
// the accumulator wrap on the first character.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_any_seed(seed in any::<u64>(), (pool, ops) in arb_scenario()) {
        run_scenario(HashSeed::new(seed), &pool, ops)?;
    }
}

// Property: len equals the number of distinct keys set, and every key
// survives any number of growths with its last value.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_growth_preserves_entries(keys in proptest::collection::vec("[a-z0-9]{1,8}", 0..200)) {
        let mut sut: Dict<usize> = Dict::with_seed(HashSeed::new(42));
        let mut model: BTreeMap<String, usize> = BTreeMap::new();
        for (i, k) in keys.iter().enumerate() {
            sut.set(k.clone(), i);
            model.insert(k.clone(), i);
        }
        prop_assert_eq!(sut.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(sut.get(k), Ok(v));
        }
    }
}
