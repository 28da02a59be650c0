//! Property-based tests for contrail.
//!
//! These tests use proptest to check schema text, wire codec and evolution
//! properties across many generated inputs.

use bytes::Bytes;
use proptest::prelude::*;

use contrail::codec::varint;
use contrail::schema::*;
use contrail::{collect_all, encode_all, Datum};

// ============================================================================
// Schema Generators
// ============================================================================

fn arb_primitive_schema() -> impl Strategy<Value = Schema> {
    prop_oneof![
        Just(Schema::Null),
        Just(Schema::Boolean),
        Just(Schema::Int),
        Just(Schema::Long),
        Just(Schema::Float),
        Just(Schema::Double),
        Just(Schema::Bytes),
        Just(Schema::String),
    ]
}

/// Names follow `[A-Za-z_][A-Za-z0-9_]*`; the `N_` prefix keeps them clear
/// of primitive type names.
fn arb_name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_]{0,12}".prop_map(|s| format!("N_{}", s))
}

fn arb_namespace() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        arb_name().prop_map(Some),
        (arb_name(), arb_name()).prop_map(|(a, b)| Some(format!("{}.{}", a, b))),
    ]
}

fn arb_enum_schema() -> impl Strategy<Value = EnumSchema> {
    (
        arb_name(),
        arb_namespace(),
        prop::collection::hash_set(arb_name(), 1..5),
    )
        .prop_map(|(name, namespace, symbols)| {
            let schema = EnumSchema::new(name, symbols.into_iter().collect());
            match namespace {
                Some(ns) => schema.with_namespace(ns),
                None => schema,
            }
        })
}

fn arb_fixed_schema() -> impl Strategy<Value = FixedSchema> {
    (arb_name(), arb_namespace(), 1usize..64).prop_map(|(name, namespace, size)| {
        let fixed = FixedSchema::new(name, size);
        match namespace {
            Some(ns) => fixed.with_namespace(ns),
            None => fixed,
        }
    })
}

fn arb_logical_type() -> impl Strategy<Value = Schema> {
    prop_oneof![
        Just(Schema::Logical(LogicalType::new(
            Schema::Int,
            LogicalTypeName::Date
        ))),
        Just(Schema::Logical(LogicalType::new(
            Schema::Int,
            LogicalTypeName::TimeMillis
        ))),
        Just(Schema::Logical(LogicalType::new(
            Schema::Long,
            LogicalTypeName::TimestampMicros
        ))),
        Just(Schema::Logical(LogicalType::new(
            Schema::Long,
            LogicalTypeName::LocalTimestampMillis
        ))),
        Just(Schema::Logical(LogicalType::new(
            Schema::String,
            LogicalTypeName::Uuid
        ))),
        (1u32..38, 0u32..10).prop_map(|(precision, scale)| {
            Schema::Logical(LogicalType::new(
                Schema::Bytes,
                LogicalTypeName::Decimal {
                    precision,
                    scale: scale.min(precision),
                },
            ))
        }),
    ]
}

fn arb_simple_schema() -> impl Strategy<Value = Schema> {
    let leaf = prop_oneof![
        8 => arb_primitive_schema(),
        2 => arb_enum_schema().prop_map(Schema::Enum),
        2 => arb_fixed_schema().prop_map(Schema::Fixed),
        3 => arb_logical_type(),
    ];

    leaf.prop_recursive(3, 16, 10, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| Schema::Array(Box::new(s))),
            inner.clone().prop_map(|s| Schema::Map(Box::new(s))),
            inner
                .clone()
                .prop_filter("null member appears once", |s| !s.is_nullable())
                .prop_map(|s| Schema::Union(vec![Schema::Null, s])),
        ]
    })
}

fn arb_record_schema() -> impl Strategy<Value = RecordSchema> {
    (
        arb_name(),
        arb_namespace(),
        prop::collection::vec((arb_name(), arb_simple_schema()), 1..5),
    )
        .prop_filter("field names must be unique", |(_, _, fields)| {
            let mut seen = std::collections::HashSet::new();
            fields.iter().all(|(name, _)| seen.insert(name.clone()))
        })
        .prop_map(|(name, namespace, fields)| {
            let fields = fields
                .into_iter()
                .map(|(name, schema)| FieldSchema::new(name, schema))
                .collect();
            let record = RecordSchema::new(name, fields);
            match namespace {
                Some(ns) => record.with_namespace(ns),
                None => record,
            }
        })
}

fn arb_schema() -> impl Strategy<Value = Schema> {
    prop_oneof![
        8 => arb_simple_schema(),
        2 => arb_record_schema().prop_map(Schema::Record),
    ]
}

// ============================================================================
// Datum Generators
// ============================================================================

const EVENT_SCHEMA: &str = r#"{
    "type": "record",
    "name": "Event",
    "namespace": "test",
    "fields": [
        {"name": "id", "type": "long"},
        {"name": "name", "type": "string"},
        {"name": "tags", "type": {"type": "array", "items": "string"}},
        {"name": "counts", "type": {"type": "map", "values": "int"}},
        {"name": "score", "type": ["null", "double"]},
        {"name": "payload", "type": "bytes"}
    ]
}"#;

/// The same record with a writer-only `blob` field between `name` and `tags`.
const EVENT_WITH_BLOB_SCHEMA: &str = r#"{
    "type": "record",
    "name": "Event",
    "namespace": "test",
    "fields": [
        {"name": "id", "type": "long"},
        {"name": "name", "type": "string"},
        {"name": "blob", "type": {"type": "array", "items": ["null", "string"]}},
        {"name": "tags", "type": {"type": "array", "items": "string"}},
        {"name": "counts", "type": {"type": "map", "values": "int"}},
        {"name": "score", "type": ["null", "double"]},
        {"name": "payload", "type": "bytes"}
    ]
}"#;

fn arb_event() -> impl Strategy<Value = Datum> {
    (
        any::<i64>(),
        ".{0,20}",
        prop::collection::vec("[a-z]{0,8}", 0..6),
        prop::collection::btree_map("[a-z]{1,6}", any::<i32>(), 0..5),
        prop::option::of(any::<f64>()),
        prop::collection::vec(any::<u8>(), 0..32),
    )
        .prop_map(|(id, name, tags, counts, score, payload)| {
            Datum::record([
                ("id", Datum::Long(id)),
                ("name", Datum::String(name)),
                (
                    "tags",
                    Datum::Array(tags.into_iter().map(Datum::String).collect()),
                ),
                (
                    "counts",
                    Datum::Map(
                        counts
                            .into_iter()
                            .map(|(k, v)| (k, Datum::Int(v)))
                            .collect(),
                    ),
                ),
                ("score", score.map(Datum::Double).unwrap_or(Datum::Null)),
                ("payload", Datum::Bytes(Bytes::from(payload))),
            ])
        })
}

fn with_blob(event: &Datum, blob: Vec<Option<String>>) -> Datum {
    let Datum::Record(fields) = event else {
        panic!("event must be a record");
    };
    let mut fields = fields.clone();
    let blob = blob
        .into_iter()
        .map(|s| s.map(Datum::String).unwrap_or(Datum::Null))
        .collect();
    fields.insert(2, ("blob".to_string(), Datum::Array(blob)));
    Datum::Record(fields)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Parsing a schema's JSON text and printing it again is stable.
    #[test]
    fn prop_schema_text_round_trip(schema in arb_schema()) {
        let json1 = schema.to_json();
        let parsed1 = parse_schema(&json1)
            .unwrap_or_else(|e| panic!("Failed to parse JSON {}: {}", json1, e));
        let json2 = parsed1.to_json();
        let parsed2 = parse_schema(&json2)
            .unwrap_or_else(|e| panic!("Failed to parse second JSON {}: {}", json2, e));

        prop_assert_eq!(parsed1, parsed2, "Round-trip failed for {}", json1);
    }

    /// Zigzag varints decode to the value encoded, consuming every byte.
    #[test]
    fn prop_zigzag_varint(value in any::<i64>()) {
        let bytes = varint::encode_zigzag(value);
        prop_assert!(bytes.len() <= 10);

        let mut cursor = bytes.as_slice();
        prop_assert_eq!(varint::decode_zigzag(&mut cursor).unwrap(), value);
        prop_assert!(cursor.is_empty());
    }

    /// A stream of records read with the schema it was written with yields
    /// the records written.
    #[test]
    fn prop_identity_decode(events in prop::collection::vec(arb_event(), 0..8)) {
        let schema = parse_schema(EVENT_SCHEMA).unwrap();
        let bytes = encode_all(&schema, &events).unwrap();

        let pair = ResolvedSchemaPair::identity(&schema).unwrap();
        let mut decoder = pair.new_reader(&bytes);
        let decoded = collect_all(&mut decoder).unwrap();
        prop_assert_eq!(decoded, events);
    }

    /// Dropping a writer field never shifts the fields after it, over any
    /// number of consecutive records.
    #[test]
    fn prop_removed_field_does_not_drift(
        events in prop::collection::vec(arb_event(), 3..8),
        blobs in prop::collection::vec(
            prop::collection::vec(prop::option::of(".{0,10}"), 0..4),
            8,
        ),
    ) {
        let writer = parse_schema(EVENT_WITH_BLOB_SCHEMA).unwrap();
        let reader = parse_schema(EVENT_SCHEMA).unwrap();

        let written: Vec<Datum> = events
            .iter()
            .zip(blobs)
            .map(|(event, blob)| with_blob(event, blob))
            .collect();
        let bytes = encode_all(&writer, &written).unwrap();

        let pair = ResolvedSchemaPair::resolve(&writer, &reader).unwrap();
        let mut decoder = pair.new_reader(&bytes);
        let decoded = collect_all(&mut decoder).unwrap();
        prop_assert_eq!(decoded, events);
    }

    /// Ints written under an int schema read back widened under long,
    /// float and double reader schemas.
    #[test]
    fn prop_int_promotion(values in prop::collection::vec(any::<i32>(), 1..16)) {
        let writer = Schema::Int;
        let data: Vec<Datum> = values.iter().map(|v| Datum::Int(*v)).collect();
        let bytes = encode_all(&writer, &data).unwrap();

        let pair = ResolvedSchemaPair::resolve(&writer, &Schema::Long).unwrap();
        let decoded = collect_all(&mut pair.new_reader(&bytes)).unwrap();
        let expected: Vec<Datum> = values.iter().map(|v| Datum::Long(*v as i64)).collect();
        prop_assert_eq!(decoded, expected);

        let pair = ResolvedSchemaPair::resolve(&writer, &Schema::Double).unwrap();
        let decoded = collect_all(&mut pair.new_reader(&bytes)).unwrap();
        let expected: Vec<Datum> = values.iter().map(|v| Datum::Double(*v as f64)).collect();
        prop_assert_eq!(decoded, expected);
    }

    /// Truncated input fails with an error instead of yielding a partial value.
    #[test]
    fn prop_truncation_is_an_error(event in arb_event(), cut in 1usize..8) {
        let schema = parse_schema(EVENT_SCHEMA).unwrap();
        let bytes = encode_all(&schema, std::slice::from_ref(&event)).unwrap();
        prop_assume!(cut < bytes.len());

        let truncated = &bytes[..bytes.len() - cut];
        let pair = ResolvedSchemaPair::identity(&schema).unwrap();
        let mut decoder = pair.new_reader(truncated);
        prop_assert!(collect_all(&mut decoder).is_err());
    }
}
