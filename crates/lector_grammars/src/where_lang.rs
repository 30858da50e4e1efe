//! # Where-language grammar
//!
//! A filter-expression language (`price > 10 and not (sku = 'x' or qty <
//! 2)`). Reading happens in two stages: the reader produces a *flat
//! operator chain* per expression level (operands and operator labels
//! interleaved, parenthesized sub-expressions nested through delegation),
//! and a separate grammar-owned pass resolves chains into a [`WhereExpr`]
//! tree by precedence climbing, driven by a caller-supplied [`OpTable`].
//!
//! The grammar labels its productions for diagnostics, so unlike the JSON
//! grammar it is interpreter-only: handing it to `lector::compile` fails
//! fast naming the `labeled` node.
//!
//! ```
//! use lector_grammars::where_lang::{self, OpTable, WhereExpr};
//!
//! let table = OpTable::standard();
//! let expr = where_lang::parse("qty < 2 or qty > 10", &table).unwrap();
//! match expr {
//!     WhereExpr::Binary { op, .. } => assert_eq!(op, "or"),
//!     other => panic!("unexpected tree: {other:?}"),
//! }
//! ```

use crate::support::{collect_text, lexeme, quiet};
use lector::{Failure, Reader, TextSize, Value};
use once_cell::sync::Lazy;
use thiserror::Error;

/// Resolved where-expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum WhereExpr {
    Ident(String),
    Num(f64),
    Str(String),
    Not(Box<WhereExpr>),
    Binary {
        op: String,
        lhs: Box<WhereExpr>,
        rhs: Box<WhereExpr>,
    },
}

/// Operator associativity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

/// Caller-supplied precedence and associativity table.
///
/// Higher numbers bind tighter. Operators the reader accepts but the table
/// does not list fail resolution with [`ResolveError::UnknownOperator`].
#[derive(Debug, Clone, Default)]
pub struct OpTable {
    ops: Vec<(String, u8, Assoc)>,
}

impl OpTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, op: &str, precedence: u8, assoc: Assoc) -> Self {
        self.ops.push((op.to_owned(), precedence, assoc));
        self
    }

    /// The conventional table: `or` < `and` < comparisons < additive <
    /// multiplicative, all left-associative
    #[must_use]
    pub fn standard() -> Self {
        let mut table = Self::new();
        table = table.with("or", 1, Assoc::Left);
        table = table.with("and", 2, Assoc::Left);
        for cmp in ["=", "!=", "<>", "<", "<=", ">", ">=", "like", "in"] {
            table = table.with(cmp, 3, Assoc::Left);
        }
        table = table.with("+", 4, Assoc::Left);
        table = table.with("-", 4, Assoc::Left);
        table = table.with("*", 5, Assoc::Left);
        table = table.with("/", 5, Assoc::Left);
        table
    }

    fn lookup(&self, op: &str) -> Option<(u8, Assoc)> {
        self.ops
            .iter()
            .find(|(name, _, _)| name == op)
            .map(|(_, prec, assoc)| (*prec, *assoc))
    }
}

/// An error from the resolution pass
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown operator `{0}`")]
    UnknownOperator(String),
    #[error("malformed operator chain")]
    MalformedChain,
}

/// A read or resolution error from [`parse`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WhereError {
    #[error("{0}")]
    Read(Failure),
    #[error("{0}")]
    Resolve(#[from] ResolveError),
}

fn class(pattern: &str) -> Reader {
    Reader::char_class(pattern).expect("static class pattern")
}

fn tag(key: &str, value: Value) -> Value {
    Value::Map(vec![(key.to_owned(), value)])
}

fn build_expr() -> Reader {
    let expr = Reader::delegate_labeled("a where expression");

    let ws = quiet(class("[ \\t\\r\\n]").repeated());
    let token = |reader: Reader| lexeme(reader, &ws);
    let text = |reader: Reader| {
        reader.map(|v| {
            let mut s = String::new();
            collect_text(&v, &mut s);
            Value::Str(s)
        })
    };

    // a keyword must not run into a following word character
    let word_break = Reader::choice([class("[^A-Za-z0-9_]"), Reader::eof()]);
    let keyword = |word: &str| token(Reader::literal(word).lookahead(word_break.clone()));

    let ident = token(text(Reader::sequence([
        class("[A-Za-z_]"),
        class("[A-Za-z0-9_]").repeated(),
    ])))
    .map(|v| tag("ident", v))
    .labeled("identifier");

    let digit = class("[0-9]");
    let number = quiet(token(
        Reader::sequence([
            digit.clone(),
            digit.clone().repeated(),
            Reader::sequence([Reader::char('.'), digit.clone(), digit.repeated()]).optional(),
        ])
        .map(|v| {
            let mut s = String::new();
            collect_text(&v, &mut s);
            match s.parse::<f64>() {
                Ok(n) => Value::Num(n),
                Err(_) => Value::Null,
            }
        }),
    ))
    .map(|v| tag("num", v))
    .labeled("number");

    let string = quiet(
        text(class("[^']").repeated())
            .between(Reader::char('\''), token(Reader::char('\''))),
    )
    .map(|v| tag("str", v))
    .labeled("string");

    let group = expr
        .clone()
        .between(token(Reader::char('(')), token(Reader::char(')')));

    let operand = Reader::delegate_labeled("an operand");
    let not = Reader::sequence([keyword("not"), operand.clone()]).map(|v| {
        let inner = match v {
            Value::List(mut items) => items.pop().unwrap_or(Value::Null),
            other => other,
        };
        tag("not", inner)
    });
    operand
        .bind(Reader::choice([not, group, string, number, ident]))
        .expect("operand delegate bound once");

    // multi-character operators first so they win over their prefixes
    let op = token(text(Reader::choice([
        Reader::literal("<="),
        Reader::literal(">="),
        Reader::literal("!="),
        Reader::literal("<>"),
        Reader::char('='),
        Reader::char('<'),
        Reader::char('>'),
        Reader::char('+'),
        Reader::char('-'),
        Reader::char('*'),
        Reader::char('/'),
        keyword("and"),
        keyword("or"),
        keyword("like"),
        keyword("in"),
    ])))
    .labeled("operator");

    let chain = Reader::sequence([
        operand.clone(),
        Reader::sequence([op, operand]).repeated(),
    ])
    .map(|v| {
        let mut flat = Vec::new();
        if let Value::List(mut parts) = v {
            let rest = parts.pop().unwrap_or(Value::Null);
            flat.push(parts.pop().unwrap_or(Value::Null));
            if let Value::List(pairs) = rest {
                for pair in pairs {
                    if let Value::List(op_operand) = pair {
                        flat.extend(op_operand);
                    }
                }
            }
        }
        tag("chain", Value::List(flat))
    });

    expr.bind(chain.labeled("where expression"))
        .expect("expr delegate bound once");
    expr
}

static WHERE_EXPR: Lazy<Reader> = Lazy::new(build_expr);

static WHERE_DOCUMENT: Lazy<Reader> = Lazy::new(|| {
    let ws = quiet(class("[ \\t\\r\\n]").repeated());
    Reader::sequence([ws, where_expr(), Reader::eof()]).map(|v| match v {
        Value::List(mut items) => items.swap_remove(1),
        other => other,
    })
});

/// The top-level `expr` reader producing flat operator chains
#[must_use]
pub fn where_expr() -> Reader {
    WHERE_EXPR.clone()
}

/// Resolve a chain value produced by [`where_expr`] into a tree.
///
/// # Errors
///
/// [`ResolveError::UnknownOperator`] for an operator missing from `table`;
/// [`ResolveError::MalformedChain`] when the value is not a chain shape
/// this grammar produces.
pub fn resolve(value: &Value, table: &OpTable) -> Result<WhereExpr, ResolveError> {
    let Value::Map(entries) = value else {
        return Err(ResolveError::MalformedChain);
    };
    let Some((key, inner)) = entries.first() else {
        return Err(ResolveError::MalformedChain);
    };
    match (key.as_str(), inner) {
        ("chain", Value::List(items)) => resolve_chain(items, table),
        ("ident", Value::Str(name)) => Ok(WhereExpr::Ident(name.clone())),
        ("str", Value::Str(text)) => Ok(WhereExpr::Str(text.clone())),
        ("num", Value::Num(n)) => Ok(WhereExpr::Num(*n)),
        ("not", operand) => Ok(WhereExpr::Not(Box::new(resolve(operand, table)?))),
        _ => Err(ResolveError::MalformedChain),
    }
}

fn resolve_chain(items: &[Value], table: &OpTable) -> Result<WhereExpr, ResolveError> {
    let first = items.first().ok_or(ResolveError::MalformedChain)?;
    let lhs = resolve(first, table)?;
    let mut cursor = 0;
    let expr = climb(items, &mut cursor, lhs, 0, table)?;
    if cursor + 1 < items.len() {
        return Err(ResolveError::MalformedChain);
    }
    Ok(expr)
}

fn peek_op(
    items: &[Value],
    cursor: usize,
    table: &OpTable,
) -> Result<Option<(String, u8, Assoc)>, ResolveError> {
    let Some(item) = items.get(cursor + 1) else {
        return Ok(None);
    };
    let Value::Str(op) = item else {
        return Err(ResolveError::MalformedChain);
    };
    let (prec, assoc) = table
        .lookup(op)
        .ok_or_else(|| ResolveError::UnknownOperator(op.clone()))?;
    Ok(Some((op.clone(), prec, assoc)))
}

/// Precedence climbing over `items`, with `cursor` on the operand index
/// `lhs` was resolved from
fn climb(
    items: &[Value],
    cursor: &mut usize,
    lhs: WhereExpr,
    min_prec: u8,
    table: &OpTable,
) -> Result<WhereExpr, ResolveError> {
    let mut lhs = lhs;
    loop {
        let Some((op, prec, assoc)) = peek_op(items, *cursor, table)? else {
            return Ok(lhs);
        };
        if prec < min_prec {
            return Ok(lhs);
        }
        *cursor += 2;
        let operand = items.get(*cursor).ok_or(ResolveError::MalformedChain)?;
        let mut rhs = resolve(operand, table)?;
        loop {
            let Some((_, next_prec, _)) = peek_op(items, *cursor, table)? else {
                break;
            };
            let climbs = next_prec > prec || (assoc == Assoc::Right && next_prec == prec);
            if !climbs {
                break;
            }
            let next_min = if next_prec > prec { prec + 1 } else { prec };
            rhs = climb(items, cursor, rhs, next_min, table)?;
        }
        lhs = WhereExpr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        };
    }
}

/// Read and resolve a whole where-expression, requiring end of input.
///
/// # Errors
///
/// [`WhereError::Read`] with the accumulated expectations, or
/// [`WhereError::Resolve`] from the precedence pass.
pub fn parse(input: &str, table: &OpTable) -> Result<WhereExpr, WhereError> {
    let token = WHERE_DOCUMENT
        .read(input, TextSize::zero())
        .map_err(WhereError::Read)?;
    resolve(&token.value, table).map_err(WhereError::from)
}
