//! Property tests for the pure matchers.

use apitest::predicate::{
    json_equals, match_subset, text_equals, FieldKind, JsonPathCheck, PathEvaluator,
    Rfc9535Evaluator,
};
use hyper::header::{HeaderName, HeaderValue};
use hyper::HeaderMap;
use proptest::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;

fn field_map() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-e]{1,2}", "[0-9]{1,2}", 0..6)
}

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        // Integers stay within the range f64 represents exactly.
        (-(1i64 << 53)..(1i64 << 53)).prop_map(Value::from),
        "[a-z ]{0,8}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

// Same object, keys written in reverse order.
fn reversed_object(map: &BTreeMap<String, i64>) -> String {
    let fields: Vec<String> = map
        .iter()
        .rev()
        .map(|(k, v)| format!("{}: {}", Value::from(k.as_str()), v))
        .collect();
    format!("{{ {} }}", fields.join(", "))
}

fn header_map(fields: &BTreeMap<String, String>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in fields {
        headers.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    headers
}

proptest! {
    /// Subset matching passes exactly when every declared entry is observed.
    #[test]
    fn subset_passes_iff_contained(expected in field_map(), observed in field_map()) {
        let contained = expected.iter().all(|(k, v)| observed.get(k) == Some(v));
        let result = match_subset(FieldKind::Cookie, &expected, &observed);
        prop_assert_eq!(result.is_pass(), contained);
        if !contained {
            let missing = expected.iter().filter(|(k, v)| observed.get(*k) != Some(*v)).count();
            prop_assert_eq!(result.mismatches.len(), missing);
        }
    }

    /// Header lookups ignore case on the declared name.
    #[test]
    fn header_subset_ignores_name_case(observed in field_map()) {
        let headers = header_map(&observed);
        let shouted: BTreeMap<String, String> = observed
            .iter()
            .map(|(k, v)| (k.to_ascii_uppercase(), v.clone()))
            .collect();
        prop_assert!(match_subset(FieldKind::Header, &shouted, &headers).is_pass());
    }

    /// An empty declaration always passes.
    #[test]
    fn empty_subset_always_passes(observed in field_map()) {
        prop_assert!(match_subset(FieldKind::Header, &BTreeMap::new(), &header_map(&observed)).is_pass());
    }

    /// Formatting never affects structural equality.
    #[test]
    fn json_equal_ignores_formatting(value in json_value()) {
        let compact = serde_json::to_string(&value).unwrap();
        let pretty = serde_json::to_string_pretty(&value).unwrap();
        prop_assert!(json_equals(&pretty, compact.as_bytes()).is_none());
    }

    /// Key order never affects structural equality.
    #[test]
    fn json_equal_ignores_key_order(map in prop::collection::btree_map("[a-z]{1,4}", any::<i64>(), 1..6)) {
        let sorted = serde_json::to_string(&map).unwrap();
        prop_assert!(json_equals(&reversed_object(&map), sorted.as_bytes()).is_none());
    }

    /// Different documents never compare equal; numbers compare by value.
    #[test]
    fn json_equal_detects_differences(a in json_value(), b in json_value()) {
        let result = json_equals(&a.to_string(), b.to_string().as_bytes());
        prop_assert_eq!(result.is_none(), a == b);
    }

    /// Integers and their float spelling are the same number.
    #[test]
    fn json_equal_integer_matches_float_spelling(n in -(1i64 << 53)..(1i64 << 53)) {
        let expected = format!(r#"{{"n": {n}}}"#);
        let actual = format!(r#"{{"n": {n}.0}}"#);
        prop_assert!(json_equals(&expected, actual.as_bytes()).is_none());
        let quoted = format!(r#"{{"n": "{n}"}}"#);
        prop_assert!(json_equals(&expected, quoted.as_bytes()).is_some());
    }

    /// Exact text comparison matches byte equality.
    #[test]
    fn text_equal_iff_identical(a in ".{0,12}", b in ".{0,12}") {
        prop_assert_eq!(text_equals(&a, b.as_bytes()).is_none(), a == b);
        prop_assert!(text_equals(&a, a.as_bytes()).is_none());
    }

    /// Length checks agree with the array that was matched.
    #[test]
    fn json_path_len_matches_array(items in prop::collection::vec(any::<i64>(), 0..8)) {
        let document = serde_json::json!({ "items": items });
        let values = Rfc9535Evaluator.evaluate(&document, "$.items[*]").unwrap();
        prop_assert_eq!(values.len(), items.len());
        prop_assert!(JsonPathCheck::Len(items.len()).check("$.items[*]", &values).is_none());
    }
}
