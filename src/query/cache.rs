//! Compiled path cache
//!
//! Process-wide LRU keyed by the raw path string. Malformed paths are
//! never cached.

use super::path::{compile, CompiledPath};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, OnceLock};

const CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

static CACHE: OnceLock<Mutex<LruCache<String, Arc<CompiledPath>>>> = OnceLock::new();

fn cache() -> &'static Mutex<LruCache<String, Arc<CompiledPath>>> {
    CACHE.get_or_init(|| Mutex::new(LruCache::new(CACHE_CAPACITY)))
}

/// Compile a path, reusing a cached compilation when present
///
/// A poisoned cache lock is ignored and the path compiled directly.
pub fn compile_cached(path: &str) -> Result<Arc<CompiledPath>, String> {
    if let Ok(mut guard) = cache().lock() {
        if let Some(hit) = guard.get(path) {
            return Ok(Arc::clone(hit));
        }
    }

    let compiled = Arc::new(compile(path)?);
    if let Ok(mut guard) = cache().lock() {
        guard.put(path.to_string(), Arc::clone(&compiled));
    }
    Ok(compiled)
}
