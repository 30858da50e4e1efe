//! Interpreted/compiled equivalence
//!
//! The compiled routine must produce results identical in value, span, and
//! error content to direct interpretation, for every input. The torture
//! grammar mixes shared sub-readers with recursive self-reference.

use lector::{GrammarError, Reader, TextSize, Value};

/// A recursive list-of-numbers grammar with deliberately shared leaves:
/// `value = number | '[' value (',' value)* ']' | "null"`
fn torture_grammar() -> Reader {
    let digit = Reader::char_class("[0-9]").unwrap();
    // the same digit reader is shared by both number positions
    let number = Reader::sequence([digit.clone(), digit.repeated()]).map(|v| {
        let mut text = String::new();
        collect_chars(&v, &mut text);
        match text.parse::<f64>() {
            Ok(n) => Value::Num(n),
            Err(_) => Value::Null,
        }
    });
    let null = Reader::literal("null").map(|_| Value::Null);

    let value = Reader::delegate_labeled("a value");
    let list = value
        .clone()
        .separated_by(Reader::char(','))
        .between(Reader::char('['), Reader::char(']'));
    value
        .bind(Reader::choice([number, list, null]))
        .unwrap();
    value
}

fn collect_chars(value: &Value, out: &mut String) {
    match value {
        Value::Char(c) => out.push(*c),
        Value::Str(s) => out.push_str(s),
        Value::List(items) => {
            for item in items {
                collect_chars(item, out);
            }
        }
        _ => {}
    }
}

#[test]
fn test_equivalence_on_successes() {
    let grammar = torture_grammar();
    let compiled = grammar.compile().unwrap();

    for input in [
        "1",
        "42",
        "null",
        "[]",
        "[1]",
        "[1,2,3]",
        "[[1],[2,3],null]",
        "[[[9]]]",
        "[1,[2,[3,[4]]]]",
    ] {
        let direct = grammar.read(input, TextSize::zero());
        let flat = compiled.read(input, TextSize::zero());
        assert!(direct.is_ok(), "{input:?} should parse");
        assert_eq!(direct, flat, "compiled result differs on {input:?}");
    }
}

#[test]
fn test_equivalence_on_failures() {
    let grammar = torture_grammar();
    let compiled = grammar.compile().unwrap();

    for input in ["", "x", "[", "[1", "[1,", "[1,]", "[1 2]", "nul", "[,1]"] {
        let direct = grammar.read(input, TextSize::zero());
        let flat = compiled.read(input, TextSize::zero());
        assert_eq!(direct, flat, "compiled result differs on {input:?}");
    }
}

#[test]
fn test_equivalence_at_nonzero_start() {
    let grammar = torture_grammar();
    let compiled = grammar.compile().unwrap();

    let input = "xx[1,2]yy";
    for start in 0..=input.len() as u32 {
        let pos = TextSize::from(start);
        assert_eq!(grammar.read(input, pos), compiled.read(input, pos));
    }
}

#[test]
fn test_shared_leaves_compile_once() {
    let grammar = torture_grammar();
    let compiled = grammar.compile().unwrap();
    assert_eq!(compiled.routine_count(), 1);
    // sharing: the digit leaf appears twice in the graph but is one node
    let failure = compiled.read("x", TextSize::zero()).unwrap_err();
    assert_eq!(failure.errors.len(), 3);
}

#[test]
fn test_raw_delegate_target_is_threaded_through() {
    // a hand-written read function as a late-bound dependency
    let word = Reader::delegate();
    word.bind_fn(|input: &str, pos: TextSize| {
        let rest = input.get(pos.as_usize()..).unwrap_or("");
        let len = rest.chars().take_while(|c| c.is_ascii_lowercase()).count() as u32;
        if len == 0 {
            return Err(lector::Failure::expected(pos, "a word"));
        }
        let next = pos + TextSize::from(len);
        Ok(lector::Token::spanning(
            Value::Str(rest[..len as usize].to_owned()),
            pos,
            next,
        ))
    })
    .unwrap();

    let grammar = Reader::sequence([word, Reader::char('!')]);
    let compiled = grammar.compile().unwrap();

    for input in ["hey!", "!", "hey?", ""] {
        assert_eq!(
            grammar.read(input, TextSize::zero()),
            compiled.read(input, TextSize::zero())
        );
    }
}

#[test]
fn test_compile_rejects_each_interpreter_only_combinator() {
    let cases = [
        (Reader::char('a').labeled("x"), "labeled"),
        (Reader::char('a').lookahead(Reader::char('b')), "lookahead"),
        (Reader::char('a').fail_when(|_| false), "fail_when"),
        (
            Reader::char('a').ignoring_success_failures(),
            "ignoring_success_failures",
        ),
    ];
    for (reader, expected) in cases {
        // even buried inside a compilable wrapper
        let wrapped = Reader::sequence([Reader::char('('), reader, Reader::char(')')]);
        match wrapped.compile() {
            Err(GrammarError::NotCompilable { node }) => assert_eq!(node, expected),
            other => panic!("expected NotCompilable, got {other:?}"),
        }
    }
}

#[test]
fn test_compiled_reader_is_reusable_and_pure() {
    let grammar = torture_grammar();
    let compiled = grammar.compile().unwrap();
    let first = compiled.read("[1,[2]]", TextSize::zero());
    let second = compiled.read("[1,[2]]", TextSize::zero());
    assert_eq!(first, second);
}
