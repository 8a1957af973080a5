//! Parallel path evaluation
//!
//! Trees are immutable once parsed, so many paths can be resolved against
//! the same tree at once with Rayon.

use rayon::prelude::*;

use crate::tree::XmlTree;

/// Fetch the text of every path in parallel, in input order
pub fn fetch_parallel<T: XmlTree + Sync>(tree: &T, paths: &[&str]) -> Vec<Option<String>> {
    paths
        .par_iter()
        .map(|path| tree.fetch(path, false))
        .collect()
}

/// Count the matches of every path in parallel, in input order
pub fn count_parallel<T: XmlTree + Sync>(tree: &T, paths: &[&str]) -> Vec<usize> {
    paths.par_iter().map(|path| tree.count(path)).collect()
}

/// Fetch keyed paths in parallel
pub fn fetch_map<T: XmlTree + Sync>(
    tree: &T,
    queries: &[(&str, &str)], // (key, path)
) -> Vec<(String, Option<String>)> {
    queries
        .par_iter()
        .map(|(key, path)| (key.to_string(), tree.fetch(path, false)))
        .collect()
}
