//! Property-based tests: purity and interpreted/compiled equivalence
//! over randomly generated inputs.

use lector::{Reader, TextSize, Value};
use proptest::prelude::*;

/// `value = digit+ | '[' value (',' value)* ']'` with a shared digit leaf
fn bracket_grammar() -> Reader {
    let digit = Reader::char_class("[0-9]").unwrap();
    let number = Reader::sequence([digit.clone(), digit.repeated()]);
    let value = Reader::delegate();
    let list = value
        .clone()
        .separated_by(Reader::char(','))
        .between(Reader::char('['), Reader::char(']'));
    value.bind(Reader::choice([number, list])).unwrap();
    value
}

fn as_start(input: &str, raw: usize) -> TextSize {
    TextSize::from((raw % (input.len() + 1)) as u32)
}

proptest! {
    #[test]
    fn prop_reads_are_deterministic(input in "[\\[\\]0-9,x]{0,16}", raw_start in 0usize..32) {
        let grammar = bracket_grammar();
        let start = as_start(&input, raw_start);
        let first = grammar.read(&input, start);
        let second = grammar.read(&input, start);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_compiled_matches_interpreted(input in "[\\[\\]0-9,x]{0,16}", raw_start in 0usize..32) {
        let grammar = bracket_grammar();
        let compiled = grammar.compile().unwrap();
        let start = as_start(&input, raw_start);
        prop_assert_eq!(grammar.read(&input, start), compiled.read(&input, start));
    }

    #[test]
    fn prop_repetition_never_fails(input in "[xy]{0,24}", raw_start in 0usize..32) {
        let grammar = Reader::char('x').repeated();
        let start = as_start(&input, raw_start);
        let token = grammar.read(&input, start).unwrap();
        prop_assert!(token.next >= start);
        match &token.value {
            Value::List(items) => {
                let consumed = (token.next - start).into() as usize;
                prop_assert_eq!(items.len(), consumed);
            }
            other => prop_assert!(false, "unexpected value {:?}", other),
        }
    }

    #[test]
    fn prop_optional_never_fails(input in "[ab]{0,8}") {
        let grammar = Reader::char('a').optional();
        prop_assert!(grammar.read(&input, TextSize::zero()).is_ok());
    }
}
