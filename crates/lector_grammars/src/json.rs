//! # JSON grammar
//!
//! A complete JSON reader built from lector combinators: null, booleans,
//! numbers (sign, integer, fraction, exponent), strings with every escape
//! including `\uXXXX`, arrays, and objects, with insignificant whitespace
//! between tokens. The value/array/object cycle is wired through a single
//! delegating reader.
//!
//! The grammar uses only compilable combinators, so [`json_value`] can be
//! handed to `lector::compile` unchanged.
//!
//! ```
//! use lector_grammars::json::{self, Json};
//!
//! let value = json::parse(r#"{"a": [1, true, null]}"#).unwrap();
//! assert_eq!(
//!     value,
//!     Json::Object(vec![(
//!         "a".into(),
//!         Json::Array(vec![Json::Num(1.0), Json::Bool(true), Json::Null])
//!     )])
//! );
//! ```

use crate::support::{collect_text, expecting, lexeme, quiet};
use lector::{Failure, Reader, TextSize, Value};
use once_cell::sync::Lazy;

/// A parsed JSON document as native containers and scalars.
///
/// Objects keep their members in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Json {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    Array(Vec<Json>),
    Object(Vec<(String, Json)>),
}

impl Json {
    /// Convert an engine value produced by [`json_value`] into native form
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Num(n) => Self::Num(*n),
            Value::Str(s) => Self::Str(s.clone()),
            Value::Char(c) => Self::Str(c.to_string()),
            Value::List(items) => Self::Array(items.iter().map(Self::from_value).collect()),
            Value::Map(entries) => Self::Object(
                entries
                    .iter()
                    .map(|(key, val)| (key.clone(), Self::from_value(val)))
                    .collect(),
            ),
        }
    }
}

fn class(pattern: &str) -> Reader {
    Reader::char_class(pattern).expect("static class pattern")
}

fn unicode_escape(value: Value) -> Value {
    let mut code = 0u32;
    if let Value::List(items) = &value {
        for item in items.iter().skip(1) {
            if let Value::Char(c) = item {
                code = code * 16 + c.to_digit(16).unwrap_or(0);
            }
        }
    }
    // lone surrogates have no scalar form; substitute the replacement char
    Value::Char(char::from_u32(code).unwrap_or('\u{FFFD}'))
}

fn build_value() -> Reader {
    let value = Reader::delegate_labeled("a JSON value");

    let ws = quiet(class("[ \\t\\r\\n]").repeated());
    let token = |reader: Reader| lexeme(reader, &ws);

    // keywords
    let null_lit = token(Reader::literal("null")).map(|_| Value::Null);
    let true_lit = token(Reader::literal("true")).map(|_| Value::Bool(true));
    let false_lit = token(Reader::literal("false")).map(|_| Value::Bool(false));

    // number: sign, integer, fraction, exponent
    let digit = class("[0-9]");
    let digits = Reader::sequence([digit.clone(), digit.clone().repeated()]);
    let integer = Reader::sequence([
        Reader::char('-').optional(),
        Reader::choice([
            Reader::char('0'),
            Reader::sequence([class("[1-9]"), digit.repeated()]),
        ]),
    ]);
    let fraction = Reader::sequence([Reader::char('.'), digits.clone()]).optional();
    let exponent = Reader::sequence([
        class("[eE]"),
        class("[+-]").optional(),
        digits,
    ])
    .optional();
    let number = quiet(token(
        Reader::sequence([integer, fraction, exponent]).map(|v| {
            let mut text = String::new();
            collect_text(&v, &mut text);
            match text.parse::<f64>() {
                Ok(n) => Value::Num(n),
                Err(_) => Value::Null,
            }
        }),
    ));

    // string: content span excludes the quotes; escapes normalize here
    let hex = class("[0-9a-fA-F]");
    let escape = Reader::sequence([
        Reader::char('\\'),
        Reader::choice([
            Reader::char('"'),
            Reader::char('\\'),
            Reader::char('/'),
            Reader::char('b').map(|_| Value::Char('\u{0008}')),
            Reader::char('f').map(|_| Value::Char('\u{000C}')),
            Reader::char('n').map(|_| Value::Char('\n')),
            Reader::char('r').map(|_| Value::Char('\r')),
            Reader::char('t').map(|_| Value::Char('\t')),
            Reader::sequence([
                Reader::char('u'),
                hex.clone(),
                hex.clone(),
                hex.clone(),
                hex,
            ])
            .map(unicode_escape),
        ]),
    ])
    .map(|v| match v {
        Value::List(mut items) => items.pop().unwrap_or(Value::Null),
        other => other,
    });
    let string_body = Reader::choice([escape, class("[^\"\\\\]")])
        .repeated()
        .map(|v| {
            let mut text = String::new();
            collect_text(&v, &mut text);
            Value::Str(text)
        });
    // trailing whitespace rides on the closing quote so the token keeps
    // the content's own span, without the delimiters
    let string = quiet(string_body.between(Reader::char('"'), token(Reader::char('"'))));

    // structure
    let comma = token(Reader::char(','));
    let colon = token(Reader::char(':'));

    let elements = value.clone().separated_by(comma.clone());
    let array = elements.between(token(Reader::char('[')), token(Reader::char(']')));

    let member = Reader::sequence([string.clone(), colon, value.clone()]);
    let object = member
        .separated_by(comma)
        .between(token(Reader::char('{')), token(Reader::char('}')))
        .map(|v| {
            let mut entries = Vec::new();
            if let Value::List(members) = v {
                for item in members {
                    if let Value::List(mut kv) = item {
                        if kv.len() == 3 {
                            let val = kv.pop().unwrap_or(Value::Null);
                            kv.pop(); // the colon
                            let key = match kv.pop() {
                                Some(Value::Str(k)) => k,
                                _ => String::new(),
                            };
                            entries.push((key, val));
                        }
                    }
                }
            }
            Value::Map(entries)
        });

    let alternatives = Reader::choice([
        object, array, string, number, true_lit, false_lit, null_lit,
    ]);
    value
        .bind(expecting(alternatives, "a JSON value"))
        .expect("value delegate bound once");
    value
}

static JSON_VALUE: Lazy<Reader> = Lazy::new(build_value);

static JSON_DOCUMENT: Lazy<Reader> = Lazy::new(|| {
    let ws = quiet(class("[ \\t\\r\\n]").repeated());
    Reader::sequence([ws, json_value(), Reader::eof()]).map(|v| match v {
        Value::List(mut items) => items.swap_remove(1),
        other => other,
    })
});

/// The `value` reader: any JSON value, consuming trailing whitespace.
///
/// Cheap to call; the grammar is wired once and shared.
#[must_use]
pub fn json_value() -> Reader {
    JSON_VALUE.clone()
}

/// Parse a whole document into native [`Json`], requiring end of input.
///
/// # Errors
///
/// The read failure, with every attempted alternative; the furthest
/// errors are the actionable ones.
pub fn parse(input: &str) -> Result<Json, Failure> {
    let token = JSON_DOCUMENT.read(input, TextSize::zero())?;
    Ok(Json::from_value(&token.value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(parse("null"), Ok(Json::Null));
        assert_eq!(parse("true"), Ok(Json::Bool(true)));
        assert_eq!(parse("false"), Ok(Json::Bool(false)));
        assert_eq!(parse("0"), Ok(Json::Num(0.0)));
        assert_eq!(parse("-12.5e2"), Ok(Json::Num(-1250.0)));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(parse(r#""a\nb""#), Ok(Json::Str("a\nb".into())));
        assert_eq!(parse(r#""A""#), Ok(Json::Str("A".into())));
        assert_eq!(parse(r#""\\\" \/""#), Ok(Json::Str("\\\" /".into())));
    }

    #[test]
    fn test_string_span_excludes_quotes() {
        let token = json_value().read("\"abc\"", TextSize::zero()).unwrap();
        assert_eq!(token.position, TextSize::from(1));
        assert_eq!(token.length, TextSize::from(3));
        assert_eq!(token.next, TextSize::from(5));
    }

    #[test]
    fn test_nested_containers() {
        assert_eq!(
            parse(r#"[ {"k": [true]}, [] ]"#),
            Ok(Json::Array(vec![
                Json::Object(vec![("k".into(), Json::Array(vec![Json::Bool(true)]))]),
                Json::Array(vec![]),
            ]))
        );
    }

    #[test]
    fn test_object_order_preserved() {
        let parsed = parse(r#"{"z": 1, "a": 2}"#).unwrap();
        assert_eq!(
            parsed,
            Json::Object(vec![("z".into(), Json::Num(1.0)), ("a".into(), Json::Num(2.0))])
        );
    }

    #[test]
    fn test_document_requires_end_of_input() {
        let failure = parse("1 2").unwrap_err();
        assert_eq!(failure.furthest_position(), TextSize::from(2));
    }
}
