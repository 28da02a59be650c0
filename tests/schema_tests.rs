//! Tests for Avro schema types and parsing.

use contrail::schema::*;

// ============================================================================
// Parser Tests - Primitive Types
// ============================================================================

#[test]
fn test_parse_primitive_string_schemas() {
    assert_eq!(parse_schema(r#""null""#).unwrap(), Schema::Null);
    assert_eq!(parse_schema(r#""boolean""#).unwrap(), Schema::Boolean);
    assert_eq!(parse_schema(r#""int""#).unwrap(), Schema::Int);
    assert_eq!(parse_schema(r#""long""#).unwrap(), Schema::Long);
    assert_eq!(parse_schema(r#""float""#).unwrap(), Schema::Float);
    assert_eq!(parse_schema(r#""double""#).unwrap(), Schema::Double);
    assert_eq!(parse_schema(r#""bytes""#).unwrap(), Schema::Bytes);
    assert_eq!(parse_schema(r#""string""#).unwrap(), Schema::String);
}

// ============================================================================
// Parser Tests - Record Schema
// ============================================================================

#[test]
fn test_parse_simple_record() {
    let json = r#"{
        "type": "record",
        "name": "User",
        "fields": [
            {"name": "id", "type": "long"},
            {"name": "name", "type": "string"}
        ]
    }"#;

    let schema = parse_schema(json).unwrap();
    match schema {
        Schema::Record(r) => {
            assert_eq!(r.name, "User");
            assert_eq!(r.fields.len(), 2);
            assert_eq!(r.fields[0].name, "id");
            assert_eq!(r.fields[0].schema, Schema::Long);
            assert_eq!(r.fields[1].name, "name");
            assert_eq!(r.fields[1].schema, Schema::String);
        }
        _ => panic!("Expected Record schema"),
    }
}

#[test]
fn test_parse_record_with_field_defaults() {
    let json = r#"{
        "type": "record",
        "name": "Config",
        "fields": [
            {"name": "count", "type": "int", "default": 0},
            {"name": "enabled", "type": "boolean", "default": true}
        ]
    }"#;

    let schema = parse_schema(json).unwrap();
    match schema {
        Schema::Record(r) => {
            assert_eq!(r.fields[0].default, Some(serde_json::json!(0)));
            assert_eq!(r.fields[1].default, Some(serde_json::json!(true)));
        }
        _ => panic!("Expected Record schema"),
    }
}

#[test]
fn test_parse_nested_record() {
    let json = r#"{
        "type": "record",
        "name": "Person",
        "fields": [
            {"name": "name", "type": "string"},
            {
                "name": "address",
                "type": {
                    "type": "record",
                    "name": "Address",
                    "fields": [
                        {"name": "street", "type": "string"},
                        {"name": "city", "type": "string"}
                    ]
                }
            }
        ]
    }"#;

    let schema = parse_schema(json).unwrap();
    match schema {
        Schema::Record(r) => {
            assert_eq!(r.name, "Person");
            assert_eq!(r.fields.len(), 2);
            match &r.fields[1].schema {
                Schema::Record(addr) => {
                    assert_eq!(addr.name, "Address");
                    assert_eq!(addr.fields.len(), 2);
                }
                _ => panic!("Expected nested Record schema"),
            }
        }
        _ => panic!("Expected Record schema"),
    }
}

// ============================================================================
// Parser Tests - Enum Schema
// ============================================================================

#[test]
fn test_parse_enum() {
    let json = r#"{
        "type": "enum",
        "name": "Color",
        "symbols": ["RED", "GREEN", "BLUE"]
    }"#;

    let schema = parse_schema(json).unwrap();
    match schema {
        Schema::Enum(e) => {
            assert_eq!(e.name, "Color");
            assert_eq!(e.symbols, vec!["RED", "GREEN", "BLUE"]);
        }
        _ => panic!("Expected Enum schema"),
    }
}

// ============================================================================
// Parser Tests - Fixed Schema
// ============================================================================

#[test]
fn test_parse_fixed() {
    let json = r#"{
        "type": "fixed",
        "name": "MD5",
        "size": 16
    }"#;

    let schema = parse_schema(json).unwrap();
    match schema {
        Schema::Fixed(f) => {
            assert_eq!(f.name, "MD5");
            assert_eq!(f.size, 16);
        }
        _ => panic!("Expected Fixed schema"),
    }
}

// ============================================================================
// Parser Tests - Logical Types
// ============================================================================

#[test]
fn test_parse_decimal_logical_type() {
    let json = r#"{
        "type": "bytes",
        "logicalType": "decimal",
        "precision": 10,
        "scale": 2
    }"#;

    let schema = parse_schema(json).unwrap();
    match schema {
        Schema::Logical(lt) => {
            assert_eq!(*lt.base, Schema::Bytes);
            match lt.logical_type {
                LogicalTypeName::Decimal { precision, scale } => {
                    assert_eq!(precision, 10);
                    assert_eq!(scale, 2);
                }
                _ => panic!("Expected Decimal logical type"),
            }
        }
        _ => panic!("Expected Logical schema"),
    }
}

#[test]
fn test_parse_date_logical_type() {
    let json = r#"{
        "type": "int",
        "logicalType": "date"
    }"#;

    let schema = parse_schema(json).unwrap();
    match schema {
        Schema::Logical(lt) => {
            assert_eq!(*lt.base, Schema::Int);
            assert!(matches!(lt.logical_type, LogicalTypeName::Date));
        }
        _ => panic!("Expected Logical schema"),
    }
}

#[test]
fn test_parse_timestamp_logical_types() {
    let millis_json = r#"{"type": "long", "logicalType": "timestamp-millis"}"#;
    let micros_json = r#"{"type": "long", "logicalType": "timestamp-micros"}"#;

    let millis = parse_schema(millis_json).unwrap();
    let micros = parse_schema(micros_json).unwrap();

    match millis {
        Schema::Logical(lt) => {
            assert!(matches!(lt.logical_type, LogicalTypeName::TimestampMillis));
        }
        _ => panic!("Expected Logical schema"),
    }

    match micros {
        Schema::Logical(lt) => {
            assert!(matches!(lt.logical_type, LogicalTypeName::TimestampMicros));
        }
        _ => panic!("Expected Logical schema"),
    }
}

#[test]
fn test_parse_uuid_logical_type() {
    let json = r#"{"type": "string", "logicalType": "uuid"}"#;

    let schema = parse_schema(json).unwrap();
    match schema {
        Schema::Logical(lt) => {
            assert_eq!(*lt.base, Schema::String);
            assert!(matches!(lt.logical_type, LogicalTypeName::Uuid));
        }
        _ => panic!("Expected Logical schema"),
    }
}

#[test]
fn test_parse_unknown_logical_type_returns_base() {
    let json = r#"{"type": "string", "logicalType": "unknown-type"}"#;

    let schema = parse_schema(json).unwrap();
    assert_eq!(schema, Schema::String);
}

// ============================================================================
// Parser Tests - Array and Map
// ============================================================================

#[test]
fn test_parse_array() {
    let json = r#"{"type": "array", "items": "string"}"#;

    let schema = parse_schema(json).unwrap();
    match schema {
        Schema::Array(items) => {
            assert_eq!(*items, Schema::String);
        }
        _ => panic!("Expected Array schema"),
    }
}

#[test]
fn test_parse_map() {
    let json = r#"{"type": "map", "values": "long"}"#;

    let schema = parse_schema(json).unwrap();
    match schema {
        Schema::Map(values) => {
            assert_eq!(*values, Schema::Long);
        }
        _ => panic!("Expected Map schema"),
    }
}

// ============================================================================
// Parser Tests - Union
// ============================================================================

#[test]
fn test_parse_union() {
    let json = r#"["null", "string"]"#;

    let schema = parse_schema(json).unwrap();
    match schema {
        Schema::Union(variants) => {
            assert_eq!(variants.len(), 2);
            assert_eq!(variants[0], Schema::Null);
            assert_eq!(variants[1], Schema::String);
        }
        _ => panic!("Expected Union schema"),
    }
}

#[test]
fn test_field_schema_with_default() {
    let field = FieldSchema::new("count", Schema::Int)
        .with_default(serde_json::json!(0))
        .with_doc("The count value");

    assert_eq!(field.name, "count");
    assert_eq!(field.default, Some(serde_json::json!(0)));
    assert_eq!(field.doc, Some("The count value".to_string()));
}

// ============================================================================
// Parser Tests - Named Type References
// ============================================================================

#[test]
fn test_parse_named_type_reference() {
    let json = r#"{
        "type": "record",
        "name": "LinkedList",
        "fields": [
            {"name": "value", "type": "int"},
            {"name": "next", "type": ["null", "LinkedList"]}
        ]
    }"#;

    let schema = parse_schema(json).unwrap();
    match schema {
        Schema::Record(r) => {
            assert_eq!(r.name, "LinkedList");
            match &r.fields[1].schema {
                Schema::Union(variants) => {
                    assert_eq!(variants.len(), 2);
                    match &variants[1] {
                        Schema::Named(name) => {
                            assert_eq!(name, "LinkedList");
                        }
                        _ => panic!("Expected Named reference"),
                    }
                }
                _ => panic!("Expected Union schema"),
            }
        }
        _ => panic!("Expected Record schema"),
    }
}

#[test]
fn test_parse_named_type_with_namespace_resolution() {
    let json = r#"{
        "type": "record",
        "name": "Outer",
        "namespace": "com.example",
        "fields": [
            {
                "name": "inner",
                "type": {
                    "type": "record",
                    "name": "Inner",
                    "fields": [{"name": "value", "type": "int"}]
                }
            },
            {"name": "ref", "type": "Inner"}
        ]
    }"#;

    let schema = parse_schema(json).unwrap();
    match schema {
        Schema::Record(r) => {
            assert_eq!(r.fullname(), "com.example.Outer");
            // The reference to "Inner" should resolve to "com.example.Inner"
            match &r.fields[1].schema {
                Schema::Named(name) => {
                    assert_eq!(name, "com.example.Inner");
                }
                _ => panic!("Expected Named reference"),
            }
        }
        _ => panic!("Expected Record schema"),
    }
}

// ============================================================================
// Parser Tests - Error Cases
// ============================================================================

#[test]
fn test_parse_invalid_json() {
    let result = parse_schema("not valid json");
    assert!(result.is_err());
}

#[test]
fn test_parse_empty_union() {
    let result = parse_schema("[]");
    assert!(result.is_err());
}

#[test]
fn test_parse_record_missing_name() {
    let json = r#"{"type": "record", "fields": []}"#;
    let result = parse_schema(json);
    assert!(result.is_err());
}

#[test]
fn test_parse_record_missing_fields() {
    let json = r#"{"type": "record", "name": "Test"}"#;
    let result = parse_schema(json);
    assert!(result.is_err());
}

#[test]
fn test_parse_enum_missing_symbols() {
    let json = r#"{"type": "enum", "name": "Test"}"#;
    let result = parse_schema(json);
    assert!(result.is_err());
}

#[test]
fn test_parse_enum_empty_symbols() {
    let json = r#"{"type": "enum", "name": "Test", "symbols": []}"#;
    let result = parse_schema(json);
    assert!(result.is_err());
}

#[test]
fn test_parse_fixed_missing_size() {
    let json = r#"{"type": "fixed", "name": "Test"}"#;
    let result = parse_schema(json);
    assert!(result.is_err());
}

#[test]
fn test_parse_array_missing_items() {
    let json = r#"{"type": "array"}"#;
    let result = parse_schema(json);
    assert!(result.is_err());
}

#[test]
fn test_parse_map_missing_values() {
    let json = r#"{"type": "map"}"#;
    let result = parse_schema(json);
    assert!(result.is_err());
}

#[test]
fn test_parse_decimal_missing_precision() {
    let json = r#"{"type": "bytes", "logicalType": "decimal"}"#;
    let result = parse_schema(json);
    assert!(result.is_err());
}

// ============================================================================
// Pretty Printer Tests (to_json)
// ============================================================================

#[test]
fn test_to_json_primitive_types() {
    assert_eq!(Schema::Null.to_json(), r#""null""#);
    assert_eq!(Schema::Boolean.to_json(), r#""boolean""#);
    assert_eq!(Schema::Int.to_json(), r#""int""#);
    assert_eq!(Schema::Long.to_json(), r#""long""#);
    assert_eq!(Schema::Float.to_json(), r#""float""#);
    assert_eq!(Schema::Double.to_json(), r#""double""#);
    assert_eq!(Schema::Bytes.to_json(), r#""bytes""#);
    assert_eq!(Schema::String.to_json(), r#""string""#);
}

#[test]
fn test_to_json_simple_record() {
    let fields = vec![
        FieldSchema::new("id", Schema::Long),
        FieldSchema::new("name", Schema::String),
    ];
    let record = RecordSchema::new("User", fields);
    let schema = Schema::Record(record);

    let json = schema.to_json();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed["type"], "record");
    assert_eq!(parsed["name"], "User");
    assert_eq!(parsed["fields"].as_array().unwrap().len(), 2);
    assert_eq!(parsed["fields"][0]["name"], "id");
    assert_eq!(parsed["fields"][0]["type"], "long");
    assert_eq!(parsed["fields"][1]["name"], "name");
    assert_eq!(parsed["fields"][1]["type"], "string");
}

#[test]
fn test_to_json_enum() {
    let symbols = vec!["RED".to_string(), "GREEN".to_string(), "BLUE".to_string()];
    let enum_schema = EnumSchema::new("Color", symbols);
    let schema = Schema::Enum(enum_schema);

    let json = schema.to_json();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed["type"], "enum");
    assert_eq!(parsed["name"], "Color");
    assert_eq!(
        parsed["symbols"].as_array().unwrap(),
        &vec!["RED", "GREEN", "BLUE"]
    );
}

#[test]
fn test_to_json_fixed() {
    let fixed = FixedSchema::new("MD5", 16);
    let schema = Schema::Fixed(fixed);

    let json = schema.to_json();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed["type"], "fixed");
    assert_eq!(parsed["name"], "MD5");
    assert_eq!(parsed["size"], 16);
}

#[test]
fn test_to_json_array() {
    let schema = Schema::Array(Box::new(Schema::String));

    let json = schema.to_json();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed["type"], "array");
    assert_eq!(parsed["items"], "string");
}

#[test]
fn test_to_json_map() {
    let schema = Schema::Map(Box::new(Schema::Long));

    let json = schema.to_json();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed["type"], "map");
    assert_eq!(parsed["values"], "long");
}

#[test]
fn test_to_json_union() {
    let schema = Schema::Union(vec![Schema::Null, Schema::String]);

    let json = schema.to_json();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert!(parsed.is_array());
    let arr = parsed.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0], "null");
    assert_eq!(arr[1], "string");
}

#[test]
fn test_to_json_named_reference() {
    let schema = Schema::Named("com.example.User".to_string());

    let json = schema.to_json();
    assert_eq!(json, r#""com.example.User""#);
}

#[test]
fn test_to_json_logical_type_date() {
    let schema = Schema::Logical(LogicalType::new(Schema::Int, LogicalTypeName::Date));

    let json = schema.to_json();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed["type"], "int");
    assert_eq!(parsed["logicalType"], "date");
}

#[test]
fn test_to_json_logical_type_decimal() {
    let schema = Schema::Logical(LogicalType::new(
        Schema::Bytes,
        LogicalTypeName::Decimal {
            precision: 10,
            scale: 2,
        },
    ));

    let json = schema.to_json();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed["type"], "bytes");
    assert_eq!(parsed["logicalType"], "decimal");
    assert_eq!(parsed["precision"], 10);
    assert_eq!(parsed["scale"], 2);
}

#[test]
fn test_to_json_field_with_default() {
    let field = FieldSchema::new("count", Schema::Int)
        .with_default(serde_json::json!(0))
        .with_doc("The count value");

    let json_value = field.to_json_value();

    assert_eq!(json_value["name"], "count");
    assert_eq!(json_value["type"], "int");
    assert_eq!(json_value["default"], 0);
    assert_eq!(json_value["doc"], "The count value");
}

// ============================================================================
// Strict Schema Validation Tests
// ============================================================================

#[test]
fn test_strict_mode_rejects_duplicate_types_in_union() {
    use contrail::schema::parse_schema_with_options;

    // Permissive mode (default) - should succeed with warning
    let json = r#"["int", "int"]"#;
    let result = parse_schema_with_options(json, false);
    assert!(
        result.is_ok(),
        "Permissive mode should allow duplicate types"
    );

    // Strict mode - should fail
    let result = parse_schema_with_options(json, true);
    assert!(result.is_err(), "Strict mode should reject duplicate types");
    let err = result.unwrap_err();
    assert!(err.to_string().contains("duplicate type"));
}

#[test]
fn test_strict_mode_rejects_nested_unions() {
    use contrail::schema::parse_schema_with_options;

    // Permissive mode - should succeed with warning
    let json = r#"["int", ["string", "null"]]"#;
    let result = parse_schema_with_options(json, false);
    assert!(result.is_ok(), "Permissive mode should allow nested unions");

    // Strict mode - should fail
    let result = parse_schema_with_options(json, true);
    assert!(result.is_err(), "Strict mode should reject nested unions");
    let err = result.unwrap_err();
    assert!(err.to_string().contains("nested union"));
}

#[test]
fn test_strict_mode_rejects_invalid_record_names() {
    use contrail::schema::parse_schema_with_options;

    // Name starting with number
    let json = r#"{
        "type": "record",
        "name": "123Invalid",
        "fields": [{"name": "value", "type": "int"}]
    }"#;

    // Permissive mode - should succeed with warning
    let result = parse_schema_with_options(json, false);
    assert!(result.is_ok(), "Permissive mode should allow invalid names");

    // Strict mode - should fail
    let result = parse_schema_with_options(json, true);
    assert!(result.is_err(), "Strict mode should reject invalid names");
    let err = result.unwrap_err();
    assert!(err.to_string().contains("must match"));
}

#[test]
fn test_strict_mode_rejects_invalid_enum_symbols() {
    use contrail::schema::parse_schema_with_options;

    // Enum symbol with special characters
    let json = r#"{
        "type": "enum",
        "name": "Status",
        "symbols": ["OK", "NOT-OK"]
    }"#;

    // Permissive mode - should succeed with warning
    let result = parse_schema_with_options(json, false);
    assert!(
        result.is_ok(),
        "Permissive mode should allow invalid symbol names"
    );

    // Strict mode - should fail
    let result = parse_schema_with_options(json, true);
    assert!(
        result.is_err(),
        "Strict mode should reject invalid symbol names"
    );
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Enum symbol name 'NOT-OK'"));
}

#[test]
fn test_strict_mode_accepts_valid_names() {
    use contrail::schema::parse_schema_with_options;

    // Valid names should work in both modes
    let json = r#"{
        "type": "record",
        "name": "ValidName123",
        "fields": [
            {"name": "_valid_field", "type": "int"},
            {"name": "AnotherField", "type": "string"}
        ]
    }"#;

    let result_permissive = parse_schema_with_options(json, false);
    assert!(
        result_permissive.is_ok(),
        "Valid names should work in permissive mode"
    );

    let result_strict = parse_schema_with_options(json, true);
    assert!(
        result_strict.is_ok(),
        "Valid names should work in strict mode"
    );
}


// ============================================================================
// Field Metadata Round Trip Tests
// ============================================================================

#[test]
fn test_aliases_order_and_properties_survive_round_trip() {
    let json = r#"{
        "type": "record",
        "name": "Account",
        "namespace": "bank",
        "aliases": ["Acct"],
        "tier": "gold",
        "fields": [
            {"name": "id", "type": "long", "order": "descending", "aliases": ["account_id"]},
            {"name": "owner", "type": "string", "order": "ignore", "pii": true}
        ]
    }"#;

    let schema = parse_schema(json).unwrap();
    let reparsed = parse_schema(&schema.to_json()).unwrap();
    assert_eq!(schema, reparsed);

    let Schema::Record(record) = reparsed else {
        panic!("Expected Record schema");
    };
    assert_eq!(record.aliases, vec!["Acct".to_string()]);
    assert_eq!(record.qualified_aliases(), vec!["bank.Acct".to_string()]);
    assert_eq!(record.properties["tier"], "gold");
    assert_eq!(record.fields[0].order, FieldOrder::Descending);
    assert_eq!(record.fields[0].aliases, vec!["account_id".to_string()]);
    assert_eq!(record.fields[1].order, FieldOrder::Ignore);
    assert_eq!(record.fields[1].properties["pii"], true);
}

#[test]
fn test_duplicate_field_names_rejected() {
    let json = r#"{
        "type": "record",
        "name": "Twice",
        "fields": [
            {"name": "a", "type": "int"},
            {"name": "a", "type": "long"}
        ]
    }"#;

    let err = parse_schema(json).unwrap_err();
    assert!(err.to_string().contains("duplicate field 'a'"));
}

#[test]
fn test_enum_default_must_be_a_symbol() {
    let json = r#"{"type": "enum", "name": "E", "symbols": ["A", "B"], "default": "C"}"#;
    assert!(parse_schema(json).is_err());

    let json = r#"{"type": "enum", "name": "E", "symbols": ["A", "B"], "default": "B"}"#;
    match parse_schema(json).unwrap() {
        Schema::Enum(e) => assert_eq!(e.default.as_deref(), Some("B")),
        _ => panic!("Expected Enum schema"),
    }
}

#[test]
fn test_recursive_record_round_trip() {
    let json = r#"{
        "type": "record",
        "name": "Node",
        "fields": [
            {"name": "value", "type": "int"},
            {"name": "next", "type": ["null", "Node"], "default": null}
        ]
    }"#;

    let schema = parse_schema(json).unwrap();
    match &schema {
        Schema::Record(record) => {
            let next = record.field("next").unwrap();
            assert_eq!(
                next.schema,
                Schema::Union(vec![Schema::Null, Schema::Named("Node".to_string())])
            );
            assert_eq!(next.default, Some(serde_json::Value::Null));
        }
        _ => panic!("Expected Record schema"),
    }
    assert_eq!(parse_schema(&schema.to_json()).unwrap(), schema);
}
