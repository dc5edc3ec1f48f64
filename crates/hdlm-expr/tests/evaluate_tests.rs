use hdlm_expr::{Error, Value, evaluate, identifiers, substitute};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::BTreeMap;

fn ctx(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn test_log2_of_depth() {
    let context = ctx(&[("DEPTH", Value::Int(256))]);
    assert_eq!(evaluate("log2(DEPTH)", &context).unwrap(), Value::Int(8));
}

#[test]
fn test_width_arithmetic() {
    let context = ctx(&[("WIDTH", Value::Int(4))]);
    assert_eq!(evaluate("WIDTH * 2 + 1", &context).unwrap(), Value::Int(9));
}

#[test]
fn test_placeholder_ternary() {
    let context = ctx(&[("A", Value::Int(3)), ("B", Value::Int(5))]);
    assert_eq!(evaluate("${A} > ${B} ? 1 : 0", &context).unwrap(), Value::Int(0));
}

#[rstest]
#[case("${NEG} * 2", Value::Int(-6))]
#[case("${NEG} ** 2", Value::Int(9))]
#[case("${EN} + 1", Value::Int(2))]
#[case("${NAME} + '_v2'", Value::from("fifo_v2"))]
#[case("${RATIO} * 4", Value::Real(2.0))]
fn test_placeholder_literals(#[case] expression: &str, #[case] expected: Value) {
    let context = ctx(&[
        ("NEG", Value::Int(-3)),
        ("EN", Value::Bool(true)),
        ("NAME", Value::from("fifo")),
        ("RATIO", Value::Real(0.5)),
    ]);
    assert_eq!(evaluate(expression, &context).unwrap(), expected);
}

#[test]
fn test_missing_placeholder_degrades_to_identifier() {
    assert_eq!(substitute("${DEPTH} - 1", &BTreeMap::new()), "DEPTH - 1");
    let context = ctx(&[("NEG", Value::Int(-3))]);
    assert_eq!(substitute("${NEG} + ${X}", &context), "(-3) + X");
}

#[test]
fn test_unknown_identifier() {
    let err = evaluate("WIDTH + 1", &BTreeMap::new()).unwrap_err();
    assert_eq!(err, Error::UnknownVariable { name: "WIDTH".into() });
    let err = evaluate("${WIDTH} + 1", &BTreeMap::new()).unwrap_err();
    assert_eq!(err, Error::UnknownVariable { name: "WIDTH".into() });
}

#[rstest]
#[case("__import__('os')", "__import__")]
#[case("exec('1')", "exec")]
#[case("eval('1')", "eval")]
#[case("open('/etc/passwd')", "open")]
fn test_disallowed_functions_are_named(#[case] expression: &str, #[case] name: &str) {
    let err = evaluate(expression, &BTreeMap::new()).unwrap_err();
    assert_eq!(err, Error::FunctionNotAllowed { name: name.into() });
    assert!(err.to_string().contains(name));
}

#[rstest]
#[case("max(a=1, b=2)", "keyword argument")]
#[case("WIDTH.bit_length", "attribute access")]
#[case("WIDTH[0]", "subscript")]
#[case("[1, 2]", "subscript")]
#[case("WIDTH = 3", "assignment")]
#[case("(WIDTH := 3)", "assignment")]
#[case("1 < WIDTH < 3", "chained comparison")]
#[case("WIDTH and 1", "boolean operator")]
#[case("not WIDTH", "boolean operator")]
#[case("lambda: 1", "lambda")]
#[case("(1, 2)", "tuple")]
#[case("max(*[1, 2])", "argument unpacking")]
fn test_disallowed_constructs(#[case] expression: &str, #[case] construct: &str) {
    let context = ctx(&[("WIDTH", Value::Int(2))]);
    match evaluate(expression, &context).unwrap_err() {
        Error::Disallowed { construct: found } => {
            assert!(found.starts_with(construct), "{found} for {expression}")
        }
        other => panic!("expected disallowed construct for {expression}, got {other:?}"),
    }
}

#[test]
fn test_nested_builtins() {
    let context = ctx(&[("DEPTH", Value::Int(1000)), ("WIDTH", Value::Int(12))]);
    assert_eq!(
        evaluate("max(ceil(log2(DEPTH)), WIDTH // 4) + int(sqrt(16))", &context).unwrap(),
        Value::Int(13)
    );
}

#[test]
fn test_identifiers_lists_free_names() {
    let names = identifiers("${A} + max(B, C if D else 1) - log2(A)").unwrap();
    assert_eq!(
        names.into_iter().collect::<Vec<_>>(),
        vec!["A", "B", "C", "D"]
    );
}
