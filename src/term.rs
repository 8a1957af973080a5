//! Elixir Term Conversion Utilities
//!
//! Converts query results to Elixir terms. Lookup misses become the atom
//! `false`.

use rustler::{Encoder, Env, NewBinary, NifResult, Term};

use crate::serialize::ArrayValue;

/// The `false` atom returned for lookup misses
#[inline]
pub fn miss(env: Env<'_>) -> Term<'_> {
    rustler::types::atom::false_().encode(env)
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}

/// A binary for `Some`, `false` for `None`
pub fn optional_binary<'a>(env: Env<'a>, value: Option<&str>) -> Term<'a> {
    match value {
        Some(s) => str_to_binary(env, s),
        None => miss(env),
    }
}

/// Convert a generic array to a binary or a map of binaries
///
/// Maps are built bottom-up from an explicit stack so deep trees cannot
/// overflow the native stack.
pub fn array_to_term<'a>(env: Env<'a>, value: &ArrayValue) -> NifResult<Term<'a>> {
    enum Frame<'v, 'a> {
        Enter(&'v ArrayValue),
        Build(&'v [(String, ArrayValue)]),
        Done(Term<'a>),
    }

    let mut work = vec![Frame::Enter(value)];
    let mut built: Vec<Term<'a>> = Vec::new();

    while let Some(frame) = work.pop() {
        match frame {
            Frame::Enter(ArrayValue::Text(text)) => work.push(Frame::Done(str_to_binary(env, text))),
            Frame::Enter(ArrayValue::Map(entries)) => {
                work.push(Frame::Build(entries));
                work.extend(entries.iter().rev().map(|(_, child)| Frame::Enter(child)));
            }
            Frame::Build(entries) => {
                let values = built.split_off(built.len() - entries.len());
                let pairs: Vec<(Term<'a>, Term<'a>)> = entries
                    .iter()
                    .zip(values)
                    .map(|((key, _), value)| (str_to_binary(env, key), value))
                    .collect();
                built.push(Term::map_from_pairs(env, &pairs)?);
            }
            Frame::Done(term) => built.push(term),
        }
    }

    Ok(built.pop().unwrap_or_else(|| miss(env)))
}
