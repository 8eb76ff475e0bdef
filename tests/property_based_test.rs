//! Property-based tests using proptest
//!
//! Tests that verify properties hold for arbitrary inputs.

use horizon_exporter::collectors::{Collection, CollectionStatus};
use horizon_exporter::horizon::xml;
use horizon_exporter::mapping::{
    resolve, FamilySet, MetricDescriptor, MetricTable, PathKey, SampleValue,
};
use horizon_exporter::metrics::render_collection;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

/// Nested document built from a key path, with `leaf` at the bottom
fn nest(keys: &[PathKey], leaf: Value) -> Value {
    keys.iter().rev().fold(leaf, |inner, key| match key {
        PathKey::Key(k) => {
            let mut map = Map::new();
            map.insert(k.clone(), inner);
            Value::Object(map)
        }
        PathKey::Index(i) => {
            let mut items = vec![Value::Null; *i];
            items.push(inner);
            Value::Array(items)
        }
    })
}

fn path_key() -> impl Strategy<Value = PathKey> {
    prop_oneof![
        "[a-zA-Z@#_][a-zA-Z0-9_]{0,8}".prop_map(PathKey::Key),
        (0usize..4).prop_map(PathKey::Index),
    ]
}

proptest! {
    #[test]
    fn test_resolution_composes_over_prefixes(
        keys in prop::collection::vec(path_key(), 0..6),
        split in 0usize..6,
        leaf in any::<i64>(),
    ) {
        // Given: A document containing `leaf` at the end of `keys`
        let document = nest(&keys, json!(leaf));
        let split = split.min(keys.len());

        // When: Resolving the whole path, and prefix then suffix
        let whole = resolve(&document, &keys).unwrap();
        let middle = resolve(&document, &keys[..split]).unwrap();
        let stepped = resolve(middle, &keys[split..]).unwrap();

        // Then: Both land on the same leaf
        prop_assert_eq!(whole, &json!(leaf));
        prop_assert_eq!(whole, stepped);
    }

    #[test]
    fn test_any_label_value_renders_without_panic(name in "\\PC*") {
        // Given: A repeated group whose label is an arbitrary string
        let document = json!({"protocol": [{"@name": name, "sessions": "1"}]});
        let table = MetricTable::new(
            &[],
            vec![MetricDescriptor::gauge("sessions", "Sessions", ["protocol"])
                .records()
                .record_label("@name", "name")
                .field("sessions")
                .build()
                .unwrap()],
        )
        .unwrap();
        let mut set = FamilySet::new(&table);
        set.evaluate(&document, &[]);
        let collection = Collection {
            status: CollectionStatus::Success,
            families: set.into_families(),
        };

        // When: Rendering
        let result = render_collection("up", "up", &collection);

        // Then: Rendering should not panic
        prop_assert!(result.is_ok());
    }

    #[test]
    fn test_any_numeric_string_is_a_gauge(value in -1e12f64..1e12) {
        // Given: A numeric value transported as text, like XML bodies do
        let descriptor = MetricDescriptor::gauge("g", "Gauge", ["g"]).build().unwrap();

        // When: Coercing
        let samples = descriptor.coerce(&json!(value.to_string())).unwrap();

        // Then: The same number comes back
        prop_assert_eq!(samples, vec![SampleValue::Gauge(value)]);
    }

    #[test]
    fn test_arbitrary_text_never_panics_xml_decoding(body in "\\PC*") {
        // Given: Arbitrary input
        // When: Decoding it as XML
        let _ = xml::parse(&body);
        // Then: Reaching this point means no panic
    }

    #[test]
    fn test_xml_element_text_roundtrips(text in "[a-zA-Z0-9._-][a-zA-Z0-9 .:_-]{0,31}") {
        let body = format!("<root><value>{}</value></root>", text);

        let document = xml::parse(&body).unwrap();

        prop_assert_eq!(&document["root"]["value"], &json!(text.trim()));
    }
}
