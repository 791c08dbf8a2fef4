//! 路由值大小写折叠的性质验证。
//!
//! - `RouteKey` 的相等、排序与哈希必须对同一折叠口径保持一致，否则选择索引中的分桶会与查找结果不符；
//! - 空文本与显式 `Null` 在匹配语义上等价于缺失。

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use dispatch_core::route_values::{eq_ignore_case, fold_case};
use dispatch_core::{RouteKey, RouteValue, RouteValueDictionary};
use proptest::prelude::*;

fn hash_of(key: &RouteKey) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

proptest! {
    #[test]
    fn equal_keys_hash_equally(raw in "[a-zA-Z_]{0,12}") {
        let upper = RouteKey::new(raw.to_uppercase());
        let lower = RouteKey::new(raw.to_lowercase());
        prop_assert_eq!(&upper, &lower);
        prop_assert_eq!(hash_of(&upper), hash_of(&lower));
    }

    #[test]
    fn eq_ignore_case_agrees_with_fold(left in "[a-zA-Z]{0,6}", right in "[a-zA-Z]{0,6}") {
        prop_assert_eq!(eq_ignore_case(&left, &right), fold_case(&left) == fold_case(&right));
    }

    #[test]
    fn dictionary_lookup_ignores_case(key in "[a-z]{1,8}", value in "[A-Za-z0-9]{1,8}") {
        let mut values = RouteValueDictionary::new();
        values.insert(key.clone(), value.clone());
        let lookup = key.to_uppercase();
        let found = values.get_str(&lookup);
        prop_assert_eq!(found.as_deref(), Some(value.as_str()));
    }
}

#[test]
fn absent_values_are_equivalent() {
    assert!(RouteValue::Null.is_absent());
    assert!(RouteValue::from("").is_absent());
    assert!(RouteValue::from(None::<&'static str>).is_absent());
    assert!(!RouteValue::from(0_i64).is_absent());
}
