//! Comprehensive tests for the dynamic map family

use mapkit::{
    AccessError, DynMap, Key, Preserve, Stringify, Value,
};

fn fixture() -> DynMap {
    let mut address: DynMap = DynMap::new();
    address.set("city", "London");
    address.set("postcode", "N1 9GU");

    let mut map: DynMap = DynMap::new();
    map.set("name", "Ada");
    map.set(Key::sym("age"), 36i64);
    map.set("address", address);
    map
}

mod indifferent_access_tests {
    use super::*;

    #[test]
    fn test_string_and_symbol_forms_hit_one_entry() {
        let mut map = fixture();
        assert_eq!(map.get("age"), Value::Int(36));
        assert_eq!(map.get(Key::sym("age")), Value::Int(36));

        map.set("age", 37i64);
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(Key::sym("age")), Value::Int(37));
    }

    #[test]
    fn test_preserve_keeps_written_form() {
        let map = fixture();
        let age_key = map.keys().find(|k| k.as_str() == "age").unwrap();
        assert!(age_key.is_sym());
    }

    #[test]
    fn test_stringify_canonicalizes_on_insert() {
        let mut map: DynMap<Stringify> = DynMap::new();
        map.set(Key::sym("age"), 36i64);
        assert!(map.keys().all(Key::is_str));
        assert_eq!(map.get(Key::sym("age")), Value::Int(36));
    }

    #[test]
    fn test_insertion_order_is_stable() {
        let map = fixture();
        let keys: Vec<_> = map.keys().map(|k| k.as_str().to_string()).collect();
        assert_eq!(keys, ["name", "age", "address"]);
    }
}

mod accessor_tests {
    use super::*;

    #[test]
    fn test_get_set_query_roundtrip() {
        let mut map = fixture();
        assert_eq!(map.call("name", &[]).unwrap(), Value::Str("Ada".into()));
        map.call("name=", &[Value::Str("Grace".into())]).unwrap();
        assert_eq!(map.call("name?", &[]).unwrap(), Value::Bool(true));
        assert_eq!(map.call("missing?", &[]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_symbol_prefix_selects_symbol_form() {
        let mut map: DynMap = DynMap::new();
        map.call(":kind=", &[Value::Str("admin".into())]).unwrap();
        assert!(map.keys().next().unwrap().is_sym());
        // Reads are indifferent either way.
        assert_eq!(map.call("kind", &[]).unwrap(), Value::Str("admin".into()));
    }

    #[test]
    fn test_bare_get_ignores_surplus_arguments() {
        let mut map = fixture();
        let surplus = [Value::Int(1), Value::Int(2)];
        assert_eq!(map.call("name", &surplus).unwrap(), Value::Str("Ada".into()));
    }

    #[test]
    fn test_set_arity_is_enforced() {
        let mut map = fixture();
        let err = map.call("name=", &[]).unwrap_err();
        assert_eq!(
            err,
            AccessError::ArgumentCount {
                accessor: "name=".into(),
                expected: 1,
                got: 0,
            }
        );
    }

    #[test]
    fn test_ensure_installs_probe_does_not() {
        let mut map: DynMap = DynMap::new();
        assert!(map.call("nested!", &[]).unwrap().is_map());
        assert!(map.contains_key("nested"));

        assert!(map.call("absent_", &[]).unwrap().is_map());
        assert!(!map.contains_key("absent"));
    }

    #[test]
    fn test_malformed_accessors_are_rejected() {
        let mut map = fixture();
        for bad in ["", "=", "9lives", "na me", "name=?"] {
            assert!(matches!(
                map.call(bad, &[]),
                Err(AccessError::InvalidAccessor(_))
            ));
        }
    }
}

mod default_tests {
    use super::*;

    #[test]
    fn test_default_covers_misses_only() {
        let mut map: DynMap = DynMap::with_default(Value::Int(0));
        map.set("present", 5i64);
        assert_eq!(map.get("present"), Value::Int(5));
        assert_eq!(map.get("absent"), Value::Int(0));
        assert!(!map.contains_key("absent"));
    }

    #[test]
    fn test_generator_produces_fresh_values() {
        let map: DynMap = DynMap::with_default_fn(|| Value::Map(DynMap::new()));
        let a = map.get("a");
        let b = map.get("b");
        assert!(a.is_map() && b.is_map());
        assert!(map.is_empty());
    }
}

mod merge_tests {
    use super::*;

    fn nested(city: &str, postcode: Option<&str>) -> DynMap {
        let mut address: DynMap = DynMap::new();
        address.set("city", city);
        if let Some(pc) = postcode {
            address.set("postcode", pc);
        }
        let mut map: DynMap = DynMap::new();
        map.set("address", address);
        map
    }

    #[test]
    fn test_deep_merge_recurses_into_maps() {
        let base = nested("London", Some("N1 9GU"));
        let incoming = nested("Paris", None);
        let merged = base.deep_merge(&incoming);

        let address = merged.get_ref("address").and_then(Value::as_map).unwrap();
        assert_eq!(address.get("city"), Value::Str("Paris".into()));
        // Keys absent from the incoming side survive.
        assert_eq!(address.get("postcode"), Value::Str("N1 9GU".into()));
    }

    #[test]
    fn test_shallow_merge_replaces_whole_values() {
        let base = nested("London", Some("N1 9GU"));
        let incoming = nested("Paris", None);
        let merged = base.shallow_merge(&incoming);

        let address = merged.get_ref("address").and_then(Value::as_map).unwrap();
        assert_eq!(address.get("postcode"), Value::Null);
    }

    #[test]
    fn test_conflict_callback_sees_scalar_conflicts_only() {
        let mut base = nested("London", None);
        base.set("n", 1i64);
        let mut incoming = nested("Paris", None);
        incoming.set("n", 2i64);

        let merged = base.deep_merge_with(&incoming, &|_, old, new| {
            match (old.as_int(), new.as_int()) {
                (Some(a), Some(b)) => Value::Int(a + b),
                _ => new.clone(),
            }
        });

        assert_eq!(merged.get("n"), Value::Int(3));
        // Map-vs-map pairs recursed instead of hitting the callback.
        let address = merged.get_ref("address").and_then(Value::as_map).unwrap();
        assert_eq!(address.get("city"), Value::Str("Paris".into()));
    }

    #[test]
    fn test_merge_appends_new_keys_in_incoming_order() {
        let base: DynMap = [("a", 1i64)].into_iter().collect();
        let incoming: DynMap = [("c", 3i64), ("b", 2i64)].into_iter().collect();
        let merged = base.deep_merge(&incoming);
        let keys: Vec<_> = merged.keys().map(|k| k.as_str().to_string()).collect();
        assert_eq!(keys, ["a", "c", "b"]);
    }
}

mod convert_tests {
    use super::*;

    #[test]
    fn test_from_json_builds_nested_maps() {
        let json = serde_json::json!({
            "name": "Ada",
            "address": { "city": "London" },
            "scores": [1, 2.5, null]
        });
        let map = DynMap::<Preserve>::from_json(json).unwrap();
        assert_eq!(map.get("name"), Value::Str("Ada".into()));
        assert!(map.get_ref("address").unwrap().is_map());
        assert_eq!(
            map.get("scores"),
            Value::Seq(vec![Value::Int(1), Value::Float(2.5), Value::Null])
        );
    }

    #[test]
    fn test_non_object_json_is_rejected() {
        let err = DynMap::<Preserve>::from_json(serde_json::json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_to_plain_flattens_symbols() {
        let mut map: DynMap = DynMap::new();
        map.set(Key::sym("kind"), Value::Sym("admin".into()));
        assert_eq!(map.to_plain(), serde_json::json!({ "kind": "admin" }));
    }

    #[test]
    fn test_key_form_rewrites_recurse() {
        let mut map = super::fixture();
        map.symbolize_keys();
        assert!(map.keys().all(Key::is_sym));
        let address = map.get_ref("address").and_then(Value::as_map).unwrap();
        assert!(address.keys().all(Key::is_sym));

        map.stringify_keys();
        assert!(map.keys().all(Key::is_str));
    }

    #[test]
    fn test_serde_json_roundtrip() {
        let map = super::fixture();
        let text = serde_json::to_string(&map).unwrap();
        let back: DynMap = serde_json::from_str(&text).unwrap();
        // Symbol forms flatten to strings on the way out, so compare through
        // the canonical plain shape.
        assert_eq!(back.to_plain(), map.to_plain());
    }
}
