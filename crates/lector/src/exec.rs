//! Read semantics
//!
//! One routine per node kind, shared verbatim between the tree-walking
//! interpreter ([`read_node`]) and the compiled form: the routines are
//! generic over how a child is run, so both execution modes flow through
//! identical aggregation logic and cannot drift apart.

use crate::reader::delegate::DelegateTarget;
use crate::reader::{FailGen, MapFn, PredicateFn, Reader, ReaderNode, ResultFn, TokenFn};
use crate::result::{ContextFrame, ErrorList, Expectation, Failure, ReadResult, Token, Value};
use crate::text::{char_at, TextSize};
use crate::LabelOptions;
use compact_str::CompactString;
use regex::Regex;

/// How a semantic routine runs one of its children
pub(crate) trait RunChild {
    fn run(&self, input: &str, pos: TextSize) -> ReadResult;
}

impl RunChild for Reader {
    fn run(&self, input: &str, pos: TextSize) -> ReadResult {
        read_node(&self.node, input, pos)
    }
}

// ---------------------------------------------------------------------------
// Primitives

pub(crate) fn read_char(expected: char, fold: bool, input: &str, pos: TextSize) -> ReadResult {
    match char_at(input, pos) {
        Some(c) if crate::reader::prim::chars_match(c, expected, fold) => {
            let len = TextSize::of_char(c);
            Ok(Token::new(Value::Char(expected), pos, len, pos + len))
        }
        _ => Err(Failure::expected(pos, crate::reader::prim::char_label(expected))),
    }
}

pub(crate) fn read_literal(text: &str, fold: bool, input: &str, pos: TextSize) -> ReadResult {
    let mut cursor = pos;
    for expected in text.chars() {
        match char_at(input, cursor) {
            Some(c) if crate::reader::prim::chars_match(c, expected, fold) => {
                cursor += TextSize::of_char(c);
            }
            _ => return Err(Failure::expected(pos, crate::reader::prim::literal_label(text))),
        }
    }
    Ok(Token::spanning(Value::Str(text.to_owned()), pos, cursor))
}

pub(crate) fn read_char_class(
    pattern: &CompactString,
    matcher: &Regex,
    input: &str,
    pos: TextSize,
) -> ReadResult {
    if let Some(c) = char_at(input, pos) {
        let mut buf = [0u8; 4];
        if matcher.is_match(c.encode_utf8(&mut buf)) {
            let len = TextSize::of_char(c);
            return Ok(Token::new(Value::Char(c), pos, len, pos + len));
        }
    }
    Err(Failure::expected(pos, pattern.clone()))
}

pub(crate) fn read_any(input: &str, pos: TextSize) -> ReadResult {
    match char_at(input, pos) {
        Some(c) => {
            let len = TextSize::of_char(c);
            Ok(Token::new(Value::Char(c), pos, len, pos + len))
        }
        None => Err(Failure::expected(pos, "any character")),
    }
}

pub(crate) fn read_eof(input: &str, pos: TextSize) -> ReadResult {
    if pos >= TextSize::of_str(input) {
        Ok(Token::new(Value::Null, pos, TextSize::zero(), pos))
    } else {
        Err(Failure::expected(pos, "end of input"))
    }
}

pub(crate) fn read_succeed(pos: TextSize) -> ReadResult {
    Ok(Token::new(Value::Null, pos, TextSize::zero(), pos))
}

pub(crate) fn read_fail(generate: &FailGen, input: &str, pos: TextSize) -> ReadResult {
    match generate {
        FailGen::Label(label) => Err(Failure::expected(pos, label.clone())),
        FailGen::Generate(generate) => Err(generate.as_ref()(input, pos)),
    }
}

// ---------------------------------------------------------------------------
// Combinators

pub(crate) fn run_choice<C: RunChild>(branches: &[C], input: &str, pos: TextSize) -> ReadResult {
    let mut errors = ErrorList::new();
    for branch in branches {
        match branch.run(input, pos) {
            Ok(mut token) => {
                // earlier branches' misses ride along as diagnostics
                if !errors.is_empty() {
                    errors.extend(std::mem::take(&mut token.trailing));
                    token.trailing = errors;
                }
                return Ok(token);
            }
            Err(failure) => errors.extend(failure.errors),
        }
    }
    Err(Failure::of(errors))
}

pub(crate) fn run_seq<C: RunChild>(members: &[C], input: &str, pos: TextSize) -> ReadResult {
    let mut values = Vec::with_capacity(members.len());
    let mut trailing = ErrorList::new();
    let mut cursor = pos;
    for member in members {
        match member.run(input, cursor) {
            Ok(token) => {
                cursor = token.next;
                trailing.extend(token.trailing);
                values.push(token.value);
            }
            Err(mut failure) => {
                // trailing diagnostics of earlier successful steps go ahead
                // of the failing step's own errors
                if !trailing.is_empty() {
                    trailing.extend(failure.errors);
                    failure.errors = trailing;
                }
                return Err(failure);
            }
        }
    }
    let mut token = Token::spanning(Value::List(values), pos, cursor);
    token.trailing = trailing;
    Ok(token)
}

pub(crate) fn run_repeat<C: RunChild>(inner: &C, input: &str, pos: TextSize) -> ReadResult {
    let mut values = Vec::new();
    let mut trailing = ErrorList::new();
    let mut cursor = pos;
    loop {
        match inner.run(input, cursor) {
            Ok(token) => {
                // a zero-width success cannot make progress; record it once
                // and stop rather than loop forever
                let stalled = token.next == cursor;
                cursor = token.next;
                trailing.extend(token.trailing);
                values.push(token.value);
                if stalled {
                    break;
                }
            }
            Err(failure) => {
                trailing.extend(failure.errors);
                break;
            }
        }
    }
    let mut token = Token::spanning(Value::List(values), pos, cursor);
    token.trailing = trailing;
    Ok(token)
}

pub(crate) fn run_separated<C: RunChild>(
    item: &C,
    separator: &C,
    input: &str,
    pos: TextSize,
) -> ReadResult {
    let mut values = Vec::new();
    let mut trailing = ErrorList::new();
    let mut cursor = pos;

    match item.run(input, pos) {
        Ok(token) => {
            cursor = token.next;
            trailing.extend(token.trailing);
            values.push(token.value);
        }
        Err(failure) => {
            trailing.extend(failure.errors);
            let mut token = Token::spanning(Value::List(values), pos, pos);
            token.trailing = trailing;
            return Ok(token);
        }
    }

    loop {
        let before = cursor;
        let sep_token = match separator.run(input, cursor) {
            Ok(token) => token,
            Err(failure) => {
                trailing.extend(failure.errors);
                break;
            }
        };
        trailing.extend(sep_token.trailing);
        match item.run(input, sep_token.next) {
            Ok(token) => {
                cursor = token.next;
                trailing.extend(token.trailing);
                values.push(token.value);
            }
            Err(failure) => {
                // the dangling separator is not absorbed; cursor stays at
                // the last item and downstream readers fail on it
                trailing.extend(failure.errors);
                break;
            }
        }
        if cursor == before {
            break;
        }
    }

    let mut token = Token::spanning(Value::List(values), pos, cursor);
    token.trailing = trailing;
    Ok(token)
}

pub(crate) fn run_between<C: RunChild>(
    open: &C,
    inner: &C,
    close: &C,
    input: &str,
    pos: TextSize,
) -> ReadResult {
    let open_token = open.run(input, pos)?;
    let mut trailing = open_token.trailing;

    let mid = match inner.run(input, open_token.next) {
        Ok(token) => token,
        Err(mut failure) => {
            if !trailing.is_empty() {
                trailing.extend(failure.errors);
                failure.errors = trailing;
            }
            return Err(failure);
        }
    };
    let mid_next = mid.next;
    trailing.extend(mid.trailing);

    let close_token = match close.run(input, mid_next) {
        Ok(token) => token,
        Err(mut failure) => {
            if !trailing.is_empty() {
                trailing.extend(failure.errors);
                failure.errors = trailing;
            }
            return Err(failure);
        }
    };
    trailing.extend(close_token.trailing);

    Ok(Token {
        value: mid.value,
        position: mid.position,
        length: mid.length,
        next: close_token.next,
        trailing,
    })
}

pub(crate) fn run_optional<C: RunChild>(inner: &C, input: &str, pos: TextSize) -> ReadResult {
    match inner.run(input, pos) {
        Ok(token) => Ok(token),
        Err(failure) => {
            let mut token = Token::new(Value::Null, pos, TextSize::zero(), pos);
            token.trailing = failure.errors;
            Ok(token)
        }
    }
}

pub(crate) fn run_lookahead<C: RunChild>(
    inner: &C,
    ahead: &C,
    input: &str,
    pos: TextSize,
) -> ReadResult {
    let token = inner.run(input, pos)?;
    match ahead.run(input, token.next) {
        // the assertion's own consumption and diagnostics are invisible
        Ok(_) => Ok(token),
        Err(mut failure) => {
            let mut errors = token.trailing;
            if !errors.is_empty() {
                errors.extend(failure.errors);
                failure.errors = errors;
            }
            Err(failure)
        }
    }
}

pub(crate) fn run_fail_when<C: RunChild>(
    inner: &C,
    predicate: &PredicateFn,
    label: &str,
    input: &str,
    pos: TextSize,
) -> ReadResult {
    let token = inner.run(input, pos)?;
    if predicate(&token.value) {
        Err(Failure::expected(pos, label))
    } else {
        Ok(token)
    }
}

pub(crate) fn run_map<C: RunChild>(
    inner: &C,
    transform: &MapFn,
    input: &str,
    pos: TextSize,
) -> ReadResult {
    let mut token = inner.run(input, pos)?;
    let value = std::mem::replace(&mut token.value, Value::Null);
    token.value = transform(value);
    Ok(token)
}

pub(crate) fn run_map_token<C: RunChild>(
    inner: &C,
    transform: &TokenFn,
    input: &str,
    pos: TextSize,
) -> ReadResult {
    let mut token = inner.run(input, pos)?;
    token.value = transform(&token);
    Ok(token)
}

pub(crate) fn run_map_result<C: RunChild>(
    inner: &C,
    transform: &ResultFn,
    input: &str,
    pos: TextSize,
) -> ReadResult {
    transform(inner.run(input, pos))
}

pub(crate) fn run_labeled(
    result: ReadResult,
    label: &CompactString,
    options: LabelOptions,
    entry: TextSize,
) -> ReadResult {
    match result {
        Ok(mut token) => {
            if options.context {
                for error in &mut token.trailing {
                    error.push_outer(ContextFrame::new(label.clone(), entry));
                }
            }
            Ok(token)
        }
        Err(mut failure) => {
            if options.simplify {
                if let Some(earliest) = failure.errors.iter().map(|e| e.position).min() {
                    failure.errors.retain(|e| e.position == earliest);
                    failure.errors.truncate(1);
                }
            }
            if options.relabel {
                let mut errors = ErrorList::new();
                errors.push(Expectation::new(entry, label.clone()));
                return Err(Failure::of(errors));
            }
            if options.context {
                for error in &mut failure.errors {
                    error.push_outer(ContextFrame::new(label.clone(), entry));
                }
            }
            Err(failure)
        }
    }
}

pub(crate) fn run_ignore_trailing<C: RunChild>(
    inner: &C,
    input: &str,
    pos: TextSize,
) -> ReadResult {
    match inner.run(input, pos) {
        Ok(mut token) => {
            token.trailing.clear();
            Ok(token)
        }
        Err(failure) => Err(failure),
    }
}

// ---------------------------------------------------------------------------
// Interpreter

/// Tree-walking interpretation of one node
pub(crate) fn read_node(node: &ReaderNode, input: &str, pos: TextSize) -> ReadResult {
    match node {
        ReaderNode::Char { expected, fold } => read_char(*expected, *fold, input, pos),
        ReaderNode::Literal { text, fold } => read_literal(text, *fold, input, pos),
        ReaderNode::CharClass { pattern, matcher } => {
            read_char_class(pattern, matcher, input, pos)
        }
        ReaderNode::AnyChar => read_any(input, pos),
        ReaderNode::Eof => read_eof(input, pos),
        ReaderNode::Succeed => read_succeed(pos),
        ReaderNode::Fail(generate) => read_fail(generate, input, pos),
        ReaderNode::Choice(branches) => run_choice(branches, input, pos),
        ReaderNode::Seq(members) => run_seq(members, input, pos),
        ReaderNode::Repeat(inner) => run_repeat(inner, input, pos),
        ReaderNode::Separated { item, separator } => run_separated(item, separator, input, pos),
        ReaderNode::Between { open, inner, close } => {
            run_between(open, inner, close, input, pos)
        }
        ReaderNode::Optional(inner) => run_optional(inner, input, pos),
        ReaderNode::Lookahead { inner, ahead } => run_lookahead(inner, ahead, input, pos),
        ReaderNode::FailWhen { inner, predicate } => {
            run_fail_when(inner, predicate.as_ref(), inner.label().as_str(), input, pos)
        }
        ReaderNode::Map { inner, transform } => run_map(inner, transform.as_ref(), input, pos),
        ReaderNode::MapToken { inner, transform } => {
            run_map_token(inner, transform.as_ref(), input, pos)
        }
        ReaderNode::MapResult { inner, transform } => {
            run_map_result(inner, transform.as_ref(), input, pos)
        }
        ReaderNode::Labeled {
            inner,
            label,
            options,
        } => run_labeled(inner.run(input, pos), label, *options, pos),
        ReaderNode::IgnoreTrailing(inner) => run_ignore_trailing(inner, input, pos),
        ReaderNode::Delegate(cell) => match cell.target.get() {
            Some(DelegateTarget::Reader(reader)) => reader.run(input, pos),
            Some(DelegateTarget::Raw(read)) => read.as_ref()(input, pos),
            None => panic!(
                "delegating reader `{}` was read before being bound",
                cell.label()
            ),
        },
    }
}
