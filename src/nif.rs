//! BEAM binding
//!
//! Each NIF takes a tree resource and returns a term. Lookup misses come
//! back as `false`, matching the query surface's `None`.

use rustler::{Binary, Encoder, Env, NifResult, Term};

use crate::options::ParseOptions;
use crate::query::parallel::fetch_parallel as fetch_all;
use crate::resource::{tree_ref, TreeRef};
use crate::term::{array_to_term, miss, optional_binary, str_to_binary};
use crate::tree::{Resolved, XmlArray, XmlTree};

/// Parse XML into a tree resource
#[rustler::nif(schedule = "DirtyCpu")]
fn parse<'a>(input: Binary<'a>, auto_trim: bool, diagnostic_level: Option<i32>) -> TreeRef {
    let options = ParseOptions::new()
        .with_auto_trim(auto_trim)
        .with_diagnostic_level(diagnostic_level);
    tree_ref(XmlArray::from_bytes(input.as_slice(), options))
}

#[rustler::nif]
fn name<'a>(env: Env<'a>, tree: TreeRef) -> Term<'a> {
    str_to_binary(env, tree.tree.name())
}

#[rustler::nif]
fn fetch<'a>(env: Env<'a>, tree: TreeRef, query: &str, include_elements: bool) -> Term<'a> {
    optional_binary(env, tree.tree.fetch(query, include_elements).as_deref())
}

/// Sub-tree resource, attribute binary, or `false`
#[rustler::nif]
fn path<'a>(env: Env<'a>, tree: TreeRef, query: &str, force_set: bool) -> Term<'a> {
    match tree.tree.path(query, force_set) {
        Some(Resolved::Tree(sub)) => tree_ref(sub).encode(env),
        Some(Resolved::Attribute(value)) => str_to_binary(env, &value),
        None => miss(env),
    }
}

#[rustler::nif]
fn exists(tree: TreeRef, query: &str) -> bool {
    tree.tree.exists(query)
}

#[rustler::nif]
fn count(tree: TreeRef, query: &str) -> usize {
    tree.tree.count(query)
}

#[rustler::nif]
fn set(tree: TreeRef, query: &str) -> Vec<TreeRef> {
    tree.tree.set(query).into_iter().map(tree_ref).collect()
}

#[rustler::nif]
fn create_xml<'a>(env: Env<'a>, tree: TreeRef, query: Option<&str>) -> Term<'a> {
    optional_binary(env, tree.tree.create_xml(query).as_deref())
}

#[rustler::nif]
fn to_array<'a>(env: Env<'a>, tree: TreeRef, query: Option<&str>) -> NifResult<Term<'a>> {
    match tree.tree.to_array(query) {
        Some(value) => array_to_term(env, &value),
        None => Ok(miss(env)),
    }
}

/// Fetch many paths at once on the dirty scheduler
#[rustler::nif(schedule = "DirtyCpu")]
fn fetch_parallel<'a>(env: Env<'a>, tree: TreeRef, paths: Vec<&str>) -> Term<'a> {
    let results = fetch_all(&tree.tree, &paths);

    let mut list = Term::list_new_empty(env);
    for result in results.iter().rev() {
        list = list.list_prepend(optional_binary(env, result.as_deref()));
    }
    list
}

rustler::init!("Elixir.XmlArray.Native");
