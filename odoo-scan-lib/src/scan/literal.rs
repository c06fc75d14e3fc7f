//! Restricted evaluation of Python literal expressions.
//!
//! Only strings, numbers, booleans, `None`, lists, tuples and dictionaries are understood.
//! Names, calls, operators (beyond a sign on a number) and comprehensions are rejected,
//! so nothing in the analyzed module is ever executed or resolved.

use super::python::{PythonSource, named_children};
use crate::Result;
use ohno::{app_err, bail};
use serde_json::{Map, Number, Value};
use tree_sitter::Node;

/// Evaluate a literal expression into a JSON value.
///
/// Tuples become arrays. Dictionary keys that are not strings are rendered the way a JSON
/// encoder renders scalar keys (`1` → `"1"`, `True` → `"true"`, `None` → `"null"`).
///
/// # Errors
///
/// Returns an error if `node` is not a literal expression.
pub fn evaluate(source: &PythonSource, node: Node<'_>) -> Result<Value> {
    match node.kind() {
        "dictionary" => {
            let mut map = Map::new();
            for entry in named_children(node) {
                if entry.kind() != "pair" {
                    bail!("'{}' is not a literal dictionary entry", source.text(entry));
                }

                let key = entry.child_by_field_name("key").ok_or_else(|| app_err!("dictionary entry without a key"))?;
                let value = entry.child_by_field_name("value").ok_or_else(|| app_err!("dictionary entry without a value"))?;
                let _ = map.insert(key_string(evaluate(source, key)?)?, evaluate(source, value)?);
            }

            Ok(Value::Object(map))
        }
        "list" | "tuple" => named_children(node)
            .into_iter()
            .map(|element| evaluate(source, element))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        "parenthesized_expression" => match named_children(node)[..] {
            [inner] => evaluate(source, inner),
            _ => bail!("'{}' is not a literal", source.text(node)),
        },
        "string" | "concatenated_string" => {
            string_value(source, node).map(Value::String).ok_or_else(|| app_err!("'{}' is not a literal string", source.text(node)))
        }
        "integer" => parse_integer(source.text(node)),
        "float" => parse_float(source.text(node)),
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        "none" => Ok(Value::Null),
        "unary_operator" => {
            let operator = node.child_by_field_name("operator").map(|op| source.text(op));
            let argument = node
                .child_by_field_name("argument")
                .ok_or_else(|| app_err!("unary operator without an operand"))?;

            let numeric = matches!(argument.kind(), "integer" | "float");
            match (operator, evaluate(source, argument)?) {
                (Some("+"), value @ Value::Number(_)) => Ok(value),
                (Some("-"), Value::Number(n)) => negate(&n),
                (Some("+"), value @ Value::String(_)) if numeric => Ok(value),
                (Some("-"), Value::String(magnitude)) if numeric => Ok(Value::String(format!("-{magnitude}"))),
                _ => bail!("'{}' is not a literal", source.text(node)),
            }
        }
        kind => bail!("'{}' is not a literal ({kind})", source.text(node)),
    }
}

/// Evaluate `node` only if it is a single constant: a string, a number, `True`, `False` or `None`.
#[must_use]
pub fn constant(source: &PythonSource, node: Node<'_>) -> Option<Value> {
    match node.kind() {
        "string" | "concatenated_string" | "integer" | "float" | "true" | "false" | "none" => evaluate(source, node).ok(),
        _ => None,
    }
}

/// The value of a string literal (implicit concatenation included); `None` for anything else,
/// f-strings included.
#[must_use]
pub fn string_value(source: &PythonSource, node: Node<'_>) -> Option<String> {
    match node.kind() {
        "string" => decode_string(source.text(node)).ok(),
        "concatenated_string" => named_children(node)
            .into_iter()
            .map(|part| string_value(source, part))
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.concat()),
        _ => None,
    }
}

fn key_string(key: Value) -> Result<String> {
    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Array(_) | Value::Object(_) => bail!("dictionary keys must be scalar literals"),
    }
}

fn negate(n: &Number) -> Result<Value> {
    if let Some(i) = n.as_i64() {
        return Ok(i.checked_neg().map_or_else(|| Value::from(i.unsigned_abs()), Value::from));
    }

    if let Some(negated) = n.as_u64().and_then(|u| 0_i64.checked_sub_unsigned(u)) {
        return Ok(Value::from(negated));
    }

    n.as_f64().map(|f| Value::from(-f)).ok_or_else(|| app_err!("integer literal out of range"))
}

/// Integers beyond 64 bits become the nearest float, or their source text once even that overflows.
fn parse_integer(text: &str) -> Result<Value> {
    let digits = text.replace('_', "").to_ascii_lowercase();

    let (radix, body) = if let Some(hex) = digits.strip_prefix("0x") {
        (16, hex)
    } else if let Some(octal) = digits.strip_prefix("0o") {
        (8, octal)
    } else if let Some(binary) = digits.strip_prefix("0b") {
        (2, binary)
    } else {
        (10, digits.as_str())
    };

    if let Ok(value) = i64::from_str_radix(body, radix) {
        return Ok(value.into());
    }

    if let Ok(value) = u64::from_str_radix(body, radix) {
        return Ok(value.into());
    }

    let approximate = if radix == 10 {
        body.parse::<f64>().ok().filter(|_| body.bytes().all(|b| b.is_ascii_digit()))
    } else {
        body.chars()
            .try_fold(0.0_f64, |acc, c| c.to_digit(radix).map(|digit| acc.mul_add(f64::from(radix), f64::from(digit))))
    }
    .ok_or_else(|| app_err!("'{text}' is not a supported integer literal"))?;

    Ok(Number::from_f64(approximate).map_or_else(|| Value::String(text.to_string()), Value::Number))
}

fn parse_float(text: &str) -> Result<Value> {
    let digits = text.replace('_', "");
    if digits.ends_with(['j', 'J']) {
        bail!("complex literal '{text}' is not supported");
    }

    let value: f64 = digits.parse().map_err(|_e| app_err!("'{text}' is not a float literal"))?;

    // JSON has no infinity; an overflowing literal is kept as written
    Ok(Number::from_f64(value).map_or_else(|| Value::String(text.to_string()), Value::Number))
}

/// Decode the full source text of one string literal, prefix and quotes included.
fn decode_string(literal: &str) -> Result<String> {
    let prefix_len = literal.find(['\'', '"']).ok_or_else(|| app_err!("unterminated string literal"))?;
    let (prefix, quoted) = literal.split_at(prefix_len);
    let prefix = prefix.to_ascii_lowercase();

    if prefix.contains('f') || prefix.contains('t') {
        bail!("interpolated strings are not literals");
    }

    let quote_len = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") { 3 } else { 1 };
    let body = quoted
        .get(quote_len..quoted.len().saturating_sub(quote_len))
        .ok_or_else(|| app_err!("unterminated string literal"))?;

    if prefix.contains('r') {
        Ok(body.to_string())
    } else {
        unescape(body)
    }
}

fn unescape(body: &str) -> Result<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(escape) = chars.next() else {
            out.push('\\');
            break;
        };

        match escape {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(escape),
            'a' => out.push('\u{7}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{b}'),
            '0'..='7' => {
                let mut code = escape.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match chars.peek().and_then(|next| next.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            let _ = chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code).ok_or_else(|| app_err!("invalid octal escape"))?);
            }
            'x' => out.push(hex_escape(&mut chars, 2)?),
            'u' => out.push(hex_escape(&mut chars, 4)?),
            'U' => out.push(hex_escape(&mut chars, 8)?),
            // Named escapes and unknown sequences are kept as written
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}

fn hex_escape(chars: &mut impl Iterator<Item = char>, len: usize) -> Result<char> {
    let mut code = 0;
    for _ in 0..len {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| app_err!("truncated \\x, \\u or \\U escape"))?;
        code = code * 16 + digit;
    }

    char::from_u32(code).ok_or_else(|| app_err!("escape does not name a valid character"))
}
