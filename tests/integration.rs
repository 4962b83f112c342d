//! Integration tests: registry, manager and options over whole comment blocks.

use codemark::{
    ConversionManager, ConvertError, Converter, Error, Literal, Marker, OptionDescriptor,
    ParseError, Registry, RegistryError, Target, Targets, TypeId, Value, ValueKind,
};
use std::sync::Arc;
use std::thread;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn registry() -> Registry {
    let registry = Registry::new();
    let defs = [
        OptionDescriptor::new("codemark:parser:bool", TypeId::Bool),
        OptionDescriptor::new("codemark:parser:int", TypeId::I64),
        OptionDescriptor::new("codemark:parser:list", TypeId::sequence_of(TypeId::U8)),
        OptionDescriptor::new("codemark:parser:string", TypeId::Byte),
        OptionDescriptor::new("codemark:parser:complex", TypeId::C128),
        OptionDescriptor::new("codemark:parser:name", TypeId::String)
            .unique()
            .with_doc("Overrides the generated name."),
        OptionDescriptor::new("codemark:parser:tags", TypeId::sequence_of(TypeId::String)),
        OptionDescriptor::new("codemark:parser:raw", TypeId::Any),
        OptionDescriptor::new("codemark:field:min", TypeId::referenced(TypeId::F64))
            .with_targets(Target::Field),
        OptionDescriptor::new("codemark:type:kind", TypeId::String)
            .with_targets(Targets::TYPES)
            .with_default(Value::String("object".to_string())),
        OptionDescriptor::new("codemark:parser:oldname", TypeId::String)
            .deprecated_in_favor_of("codemark:parser:name"),
    ];
    for d in defs {
        registry.define(d).expect("define");
    }
    registry
}

fn manager() -> ConversionManager {
    ConversionManager::new(Arc::new(registry()))
}

// ==================== Scenarios ====================

#[test]
fn scenario_bare_bool() {
    let options = manager()
        .parse_and_convert_all("+codemark:parser:bool", Target::Struct)
        .expect("convert");
    assert_eq!(options.first("codemark:parser:bool"), Some(&Value::Bool(true)));
}

#[test]
fn scenario_negative_int() {
    let options = manager()
        .parse_and_convert_all("+codemark:parser:int=-99", Target::Field)
        .expect("convert");
    assert_eq!(options.first("codemark:parser:int"), Some(&Value::I64(-99)));
}

#[test]
fn scenario_list_of_u8() {
    let m = manager();
    let options = m
        .parse_and_convert_all("+codemark:parser:list=[1, 2, 3]", Target::Struct)
        .expect("convert");
    assert_eq!(
        options.first("codemark:parser:list"),
        Some(&Value::List(vec![Value::U8(1), Value::U8(2), Value::U8(3)]))
    );

    let err = m
        .parse_and_convert_all("+codemark:parser:list=[1, 999999]", Target::Struct)
        .unwrap_err();
    match err.conversion() {
        Some(ConvertError::Element { index: 1, source }) => {
            assert!(matches!(**source, ConvertError::Overflow { .. }))
        }
        other => panic!("expected element overflow, got {:?}", other),
    }
}

#[test]
fn scenario_single_byte() {
    let m = manager();
    let options = m
        .parse_and_convert_all("+codemark:parser:string=\"a\"", Target::Field)
        .expect("convert");
    assert_eq!(options.first("codemark:parser:string"), Some(&Value::U8(97)));

    let err = m
        .parse_and_convert_all("+codemark:parser:string=\"ab\"", Target::Field)
        .unwrap_err();
    assert!(matches!(
        err.conversion(),
        Some(ConvertError::Length { expected: 1, found: 2 })
    ));
}

#[test]
fn scenario_unique_repeated() {
    let text = "+codemark:parser:name=\"a\"\n+codemark:parser:name=\"b\"";
    let err = manager()
        .parse_and_convert_all(text, Target::Struct)
        .unwrap_err();
    assert!(matches!(err, Error::UniquenessViolation(ref id) if id == "codemark:parser:name"));
}

#[test]
fn scenario_complex() {
    let m = manager();
    let options = m
        .parse_and_convert_all("+codemark:parser:complex=3+2i", Target::Function)
        .expect("convert");
    assert_eq!(
        options.first("codemark:parser:complex"),
        Some(&Value::C128(3.0, 2.0))
    );
    let err = m
        .parse_and_convert_all("+codemark:parser:complex=2i+3", Target::Function)
        .unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::Lexical { .. })));
}

// ==================== Options ====================

#[test]
fn options_keep_first_seen_order_and_values() {
    let text = "\
Widget is a thing.
+codemark:parser:tags=[\"a\", \"b\"]
+codemark:parser:bool=false
+codemark:parser:tags=[\"c\"]
+codemark:parser:raw=[1, \"x\"]
";
    let options = manager()
        .parse_and_convert_all(text, Target::Struct)
        .expect("convert");
    let ids: Vec<&str> = options.iter().map(|(id, _)| id).collect();
    assert_eq!(
        ids,
        vec!["codemark:parser:tags", "codemark:parser:bool", "codemark:parser:raw"]
    );
    assert_eq!(options.len(), 3);
    assert_eq!(options.values("codemark:parser:tags").map(|v| v.len()), Some(2));
    assert_eq!(
        options.values("codemark:parser:tags").unwrap()[1],
        Value::List(vec![Value::String("c".to_string())])
    );
    assert_eq!(
        options.first("codemark:parser:raw"),
        Some(&Value::Literal(Literal::List(vec![
            Literal::Int(1),
            Literal::String("x".to_string())
        ])))
    );
    assert!(!options.contains("codemark:parser:int"));
    assert!(options.deprecations().is_empty());
}

#[test]
fn empty_block_gives_empty_options() {
    let options = manager()
        .parse_and_convert_all("Nothing to see here.", Target::Package)
        .expect("convert");
    assert!(options.is_empty());
}

#[test]
fn default_value_when_absent() {
    let m = manager();
    let descriptor = m.lookup("codemark:type:kind").expect("defined");
    let options = m
        .parse_and_convert_all("+codemark:parser:bool", Target::Struct)
        .expect("convert");
    assert_eq!(
        options.first_or_default(&descriptor),
        Some(&Value::String("object".to_string()))
    );
    let options = m
        .parse_and_convert_all("+codemark:type:kind=\"array\"", Target::Struct)
        .expect("convert");
    assert_eq!(
        options.first_or_default(&descriptor),
        Some(&Value::String("array".to_string()))
    );
}

// ==================== Failures ====================

#[test]
fn undefined_identifier() {
    let err = manager()
        .parse_and_convert_all("+codemark:parser:bool\n+codemark:parser:nope=1", Target::Struct)
        .unwrap_err();
    assert!(matches!(err, Error::IdentifierNotDefined(ref id) if id == "codemark:parser:nope"));
}

#[test]
fn target_not_applicable() {
    let m = manager();
    assert!(m
        .parse_and_convert_all("+codemark:field:min=0.5", Target::Field)
        .is_ok());
    let err = m
        .parse_and_convert_all("+codemark:field:min=0.5", Target::Struct)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::TargetNotApplicable { target: Target::Struct, .. }
    ));
    assert!(m
        .parse_and_convert_all("+codemark:type:kind=\"x\"", Target::Interface)
        .is_ok());
    assert!(m
        .parse_and_convert_all("+codemark:type:kind=\"x\"", Target::Function)
        .is_err());
}

#[test]
fn kind_mismatch_is_reported_with_identifier() {
    let err = manager()
        .parse_and_convert_all("+codemark:parser:int=\"nine\"", Target::Field)
        .unwrap_err();
    assert!(matches!(
        err.conversion(),
        Some(ConvertError::KindMismatch { found: ValueKind::String, .. })
    ));
    assert!(err.to_string().contains("codemark:parser:int"));
}

#[test]
fn one_failure_fails_the_block() {
    let text = "+codemark:parser:bool\n+codemark:parser:int=1.5\n+codemark:parser:name=\"n\"";
    assert!(manager().parse_and_convert_all(text, Target::Struct).is_err());
}

// ==================== Deprecation ====================

#[test]
fn deprecated_marker_warns_and_continues() {
    init_tracing();
    let options = manager()
        .parse_and_convert_all("+codemark:parser:oldname=\"legacy\"", Target::Struct)
        .expect("deprecation is not fatal");
    assert_eq!(
        options.first("codemark:parser:oldname"),
        Some(&Value::String("legacy".to_string()))
    );
    let deprecations = options.deprecations();
    assert_eq!(deprecations.len(), 1);
    assert_eq!(deprecations[0].identifier, "codemark:parser:oldname");
    assert_eq!(deprecations[0].replacement, "codemark:parser:name");
    assert_eq!(deprecations[0].position.line, 1);
}

// ==================== Registry ====================

#[test]
fn duplicate_definition_is_rejected() {
    let r = registry();
    let err = r
        .define(OptionDescriptor::new("codemark:parser:bool", TypeId::String))
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::DuplicateDefinition("codemark:parser:bool".to_string())
    );
    assert_eq!(r.lookup("codemark:parser:bool").unwrap().type_id, TypeId::Bool);
}

#[test]
fn malformed_identifier_is_rejected() {
    let r = Registry::new();
    for id in ["a:b", "A:b:c", "a:b:c.", "1a:b:c", "a:b:c:d"] {
        assert!(
            matches!(
                r.define(OptionDescriptor::new(id, TypeId::Bool)),
                Err(RegistryError::InvalidIdentifier(_))
            ),
            "{} should be rejected",
            id
        );
    }
    assert!(r.is_empty());
}

#[test]
fn descriptors_are_sorted() {
    let r = registry();
    let ids: Vec<String> = r.descriptors().iter().map(|d| d.identifier.clone()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    assert_eq!(r.len(), ids.len());
    assert_eq!(
        r.lookup("codemark:parser:name").and_then(|d| d.doc.clone()).as_deref(),
        Some("Overrides the generated name.")
    );
}

// ==================== Custom converters ====================

/// Parses durations such as `"1500ms"` or `"2s"` into nanoseconds.
struct DurationConverter;

impl Converter for DurationConverter {
    fn name(&self) -> &str {
        "duration"
    }

    fn can_convert(&self, marker: &Marker, type_id: &TypeId) -> Result<(), ConvertError> {
        match marker.kind() {
            ValueKind::String => Ok(()),
            found => Err(ConvertError::KindMismatch {
                type_id: type_id.clone(),
                found,
            }),
        }
    }

    fn convert(
        &self,
        marker: &Marker,
        _type_id: &TypeId,
        _manager: &ConversionManager,
    ) -> Result<Value, ConvertError> {
        let text = marker.value.as_str().unwrap_or_default();
        let (digits, scale) = if let Some(d) = text.strip_suffix("ms") {
            (d, 1_000_000)
        } else if let Some(d) = text.strip_suffix('s') {
            (d, 1_000_000_000)
        } else {
            return Err(anyhow::anyhow!("duration '{}' needs an 's' or 'ms' suffix", text).into());
        };
        let n: u64 = digits
            .parse()
            .map_err(|e| anyhow::anyhow!("duration '{}': {}", text, e))?;
        Ok(Value::U64(n * scale))
    }
}

fn manager_with_duration() -> ConversionManager {
    let r = Registry::new();
    r.define(OptionDescriptor::new("app:server:timeout", TypeId::opaque("Duration")))
        .expect("define");
    r.define(OptionDescriptor::new(
        "app:server:retries",
        TypeId::sequence_of(TypeId::opaque("Duration")),
    ))
    .expect("define");
    let m = ConversionManager::new(Arc::new(r));
    m.register_converter(TypeId::opaque("Duration"), Arc::new(DurationConverter))
        .expect("register");
    m
}

#[test]
fn registered_converter_handles_opaque_type() {
    let m = manager_with_duration();
    let options = m
        .parse_and_convert_all("+app:server:timeout=\"1500ms\"", Target::Struct)
        .expect("convert");
    assert_eq!(
        options.first("app:server:timeout"),
        Some(&Value::U64(1_500_000_000))
    );
    let err = m
        .parse_and_convert_all("+app:server:timeout=\"soon\"", Target::Struct)
        .unwrap_err();
    assert!(matches!(err.conversion(), Some(ConvertError::Custom(_))));
    assert!(err.to_string().contains("needs an 's' or 'ms' suffix"));
}

#[test]
fn sequence_of_opaque_is_not_a_builtin_list() {
    let err = manager_with_duration()
        .parse_and_convert_all("+app:server:retries=[\"1s\"]", Target::Struct)
        .unwrap_err();
    assert!(matches!(
        err.conversion(),
        Some(ConvertError::ConverterNotFound(_))
    ));
}

#[test]
fn builtin_types_win_over_registered_converters() {
    let m = manager();
    m.register_converter(TypeId::Bool, Arc::new(DurationConverter))
        .expect("register");
    assert_eq!(m.resolve_converter(&TypeId::Bool).unwrap().name(), "bool");
    assert!(matches!(
        m.register_converter(TypeId::Bool, Arc::new(DurationConverter)),
        Err(RegistryError::DuplicateConverter(TypeId::Bool))
    ));
}

// ==================== Concurrency ====================

#[test]
fn parallel_parses_share_read_only_registry() {
    let m = Arc::new(manager());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let m = Arc::clone(&m);
            thread::spawn(move || {
                let text = format!("+codemark:parser:int={}\n+codemark:parser:list=[{}, 1]", i, i);
                m.parse_and_convert_all(&text, Target::Field)
            })
        })
        .collect();
    for (i, h) in handles.into_iter().enumerate() {
        let options = h.join().expect("thread").expect("convert");
        assert_eq!(options.first("codemark:parser:int"), Some(&Value::I64(i as i64)));
    }
}
