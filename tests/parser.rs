//! Parser tests: markers per block, literal values, list collection and block-level failure.

use codemark::{parse, Literal, ParseError, Parser, Tokenizer, ValueKind};

fn single(text: &str) -> codemark::Marker {
    let mut markers = parse(text).expect("parse");
    assert_eq!(markers.len(), 1, "expected one marker in {:?}", text);
    markers.remove(0)
}

// ==================== Scalars ====================

#[test]
fn bare_marker_is_true() {
    let m = single("+codemark:parser:bool");
    assert_eq!(m.identifier.to_string(), "codemark:parser:bool");
    assert_eq!(m.identifier.domain, "codemark");
    assert_eq!(m.identifier.resource, "parser");
    assert_eq!(m.identifier.option, "bool");
    assert_eq!(m.kind(), ValueKind::Bool);
    assert_eq!(m.value, Literal::Bool(true));
}

#[test]
fn negative_int() {
    let m = single("+codemark:parser:int=-99");
    assert_eq!(m.kind(), ValueKind::Int);
    assert_eq!(m.value, Literal::Int(-99));
}

#[test]
fn every_scalar_family_round_trips() {
    let cases = [
        ("+d:r:o=false", Literal::Bool(false)),
        ("+d:r:o=42", Literal::Int(42)),
        ("+d:r:o=0x2A", Literal::Int(42)),
        ("+d:r:o=052", Literal::Int(42)),
        ("+d:r:o=0b101010", Literal::Int(42)),
        ("+d:r:o=-0.5", Literal::Float(-0.5)),
        ("+d:r:o=2.5e3", Literal::Float(2500.0)),
        ("+d:r:o=3+2i", Literal::Complex(3.0, 2.0)),
        ("+d:r:o=-1.5-4i", Literal::Complex(-1.5, -4.0)),
        ("+d:r:o=\"tab\\there\"", Literal::String("tab\there".to_string())),
        ("+d:r:o=\"\\u00e9\"", Literal::String("é".to_string())),
        ("+d:r:o=``", Literal::String(String::new())),
        ("+d:r:o=`a\\nb`", Literal::String("a\\nb".to_string())),
    ];
    for (text, expected) in cases {
        let m = single(text);
        assert_eq!(m.value, expected, "{}", text);
        assert_eq!(m.kind(), expected.kind(), "{}", text);
    }
}

#[test]
fn multi_line_string_keeps_newlines() {
    let m = single("+d:r:o=`line one\n  line two`");
    assert_eq!(m.value, Literal::String("line one\n  line two".to_string()));
}

// ==================== Lists ====================

#[test]
fn int_list() {
    let m = single("+codemark:parser:list=[1, 2, 3]");
    assert_eq!(m.kind(), ValueKind::List);
    assert_eq!(
        m.value,
        Literal::List(vec![Literal::Int(1), Literal::Int(2), Literal::Int(3)])
    );
}

#[test]
fn mixed_list_is_syntactically_legal() {
    let m = single(r#"+d:r:o=["a", 1, 2.5, true, 1+1i]"#);
    let items = m.value.as_list().expect("list");
    assert_eq!(items.len(), 5);
    assert_eq!(items[0], Literal::String("a".to_string()));
    assert_eq!(items[4], Literal::Complex(1.0, 1.0));
}

#[test]
fn list_element_count_matches_source() {
    for n in 1..=12 {
        let body: Vec<String> = (0..n).map(|i| i.to_string()).collect();
        let text = format!("+d:r:o=[{}]", body.join(", "));
        let m = single(&text);
        assert_eq!(m.value.as_list().map(|l| l.len()), Some(n));
    }
}

#[test]
fn list_of_strings_with_commas_inside() {
    let m = single(r#"+d:r:o=["a, b", "c]"]"#);
    assert_eq!(
        m.value,
        Literal::List(vec![
            Literal::String("a, b".to_string()),
            Literal::String("c]".to_string())
        ])
    );
}

// ==================== Blocks ====================

#[test]
fn block_with_prose_and_several_markers() {
    let text = "\
Deployment describes a rollout.

+k8s:crd:scope=\"Namespaced\"
Some more prose with a + sign.
  +k8s:crd:replicas=[1, 2]
+k8s:crd:served
";
    let markers = parse(text).expect("parse");
    assert_eq!(markers.len(), 3);
    assert_eq!(markers[0].identifier.option, "scope");
    assert_eq!(markers[0].position.line, 3);
    assert_eq!(markers[1].identifier.option, "replicas");
    assert_eq!(markers[1].position.column, 3);
    assert_eq!(markers[2].value, Literal::Bool(true));
}

#[test]
fn repeated_identifiers_are_kept_in_order() {
    let markers = parse("+a:b:c=1\n+a:b:c=2\n+a:b:c=3").expect("parse");
    let values: Vec<_> = markers.iter().map(|m| m.value.clone()).collect();
    assert_eq!(values, vec![Literal::Int(1), Literal::Int(2), Literal::Int(3)]);
}

#[test]
fn no_markers_is_empty() {
    assert!(parse("just prose\nand more prose").expect("parse").is_empty());
}

#[test]
fn one_bad_marker_fails_the_whole_block() {
    let text = "+a:b:c=1\n+a:b:d=[1,2]\n+a:b:e=3";
    let err = parse(text).unwrap_err();
    match err {
        ParseError::Lexical { position, .. } => assert_eq!(position.line, 2),
        other => panic!("expected lexical error, got {:?}", other),
    }
}

#[test]
fn non_ascii_number_fails_block_without_panic() {
    for text in ["+a:b:c=1é", "+a:b:c=[1, 0€]", "prose\n+a:b:c=7ü\n"] {
        assert!(matches!(parse(text), Err(ParseError::Lexical { .. })), "{}", text);
    }
}

#[test]
fn lexical_error_message_is_propagated() {
    let err = parse("+codemark:parser:complex=2i+3").unwrap_err();
    assert!(matches!(err, ParseError::Lexical { .. }));
    assert!(err.to_string().contains("imaginary part must follow the real part"));
}

#[test]
fn explicit_parser_matches_convenience_fn() {
    let text = "+a:b:c=[\"x\", \"y\"]\n+a:b:d=1.5";
    let explicit = Parser::new(Tokenizer::new(text)).parse().expect("parse");
    assert_eq!(explicit, parse(text).expect("parse"));
}

#[test]
fn fresh_parsers_are_idempotent() {
    let text = "doc\n+a:b:c=[1, 2.5, \"s\"]\n+a:b:d\n";
    assert_eq!(parse(text).expect("parse"), parse(text).expect("parse"));
}
