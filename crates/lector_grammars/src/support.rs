//! Shared helpers for the grammars in this crate

use lector::{ErrorList, Expectation, Failure, Reader, TextSize, Value};

/// Drop trailing diagnostics once a terminal production is accepted.
///
/// Built on `map_result` so it stays compilable.
pub(crate) fn quiet(reader: Reader) -> Reader {
    reader.map_result(|result| {
        result.map(|mut token| {
            token.trailing.clear();
            token
        })
    })
}

/// `reader` followed by `trivia`, keeping only `reader`'s value
pub(crate) fn lexeme(reader: Reader, trivia: &Reader) -> Reader {
    Reader::sequence([reader, trivia.clone()]).map(|value| match value {
        Value::List(mut items) => items.swap_remove(0),
        other => other,
    })
}

/// Collapse the shallow errors of a failure into one friendly expectation.
///
/// Errors at the failure's starting position (its minimum) are replaced by
/// a single `label` expectation there; deeper errors, which show real
/// progress, are kept in order behind it.
pub(crate) fn expecting(reader: Reader, label: &'static str) -> Reader {
    reader.map_result(move |result| match result {
        Ok(token) => Ok(token),
        Err(failure) => {
            let start = failure
                .errors
                .iter()
                .map(|e| e.position)
                .min()
                .unwrap_or(TextSize::zero());
            let mut errors = ErrorList::new();
            errors.push(Expectation::new(start, label));
            errors.extend(failure.errors.into_iter().filter(|e| e.position > start));
            Err(Failure::of(errors))
        }
    })
}

/// Collect every character and string in a value tree, in order
pub(crate) fn collect_text(value: &Value, out: &mut String) {
    match value {
        Value::Char(c) => out.push(*c),
        Value::Str(s) => out.push_str(s),
        Value::List(items) => {
            for item in items {
                collect_text(item, out);
            }
        }
        _ => {}
    }
}
