use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::LazyLock;

use ahash::AHasher;
use dashmap::DashMap;
use std::hash::{Hash, Hasher};

/// An interned identifier. Cheap to copy and compare; the text lives in the
/// global [`StringTable`] for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    pub fn intern(text: &str) -> Symbol {
        STRING_TABLE.intern(text)
    }

    pub fn as_str(&self) -> &'static str {
        STRING_TABLE.resolve(*self)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

struct StringTable {
    by_hash: DashMap<u64, Vec<(&'static str, u32)>>,
    by_index: DashMap<u32, &'static str>,
    next_index: AtomicU32,
}

static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(|| StringTable {
    by_hash: DashMap::new(),
    by_index: DashMap::new(),
    next_index: AtomicU32::new(0),
});

fn hash_of(text: &str) -> u64 {
    let mut hasher = AHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}

impl StringTable {
    fn intern(&self, text: &str) -> Symbol {
        let hash = hash_of(text);
        if let Some(bucket) = self.by_hash.get(&hash) {
            if let Some((_, idx)) = bucket.iter().find(|(s, _)| *s == text) {
                return Symbol(*idx);
            }
        }

        // Strings are intentionally leaked: the table lives for the whole
        // process and every `Symbol` is `'static`, so there is nothing to free.
        let leaked: &'static str = Box::leak(text.to_string().into_boxed_str());
        let idx = self.next_index.fetch_add(1, Ordering::Relaxed);
        self.by_hash.entry(hash).or_default().push((leaked, idx));
        self.by_index.insert(idx, leaked);
        Symbol(idx)
    }

    fn resolve(&self, symbol: Symbol) -> &'static str {
        *self
            .by_index
            .get(&symbol.0)
            .expect("symbol not present in string table")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let a = Symbol::intern("hello");
        let b = Symbol::intern("hello");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "hello");
    }

    #[test]
    fn distinct_text_yields_distinct_symbols() {
        let a = Symbol::intern("foo");
        let b = Symbol::intern("bar");
        assert_ne!(a, b);
    }

    quickcheck::quickcheck! {
        /// Interning any string and resolving it back always reproduces the
        /// original text, no matter how many times it has already been interned.
        fn intern_then_resolve_round_trips(text: String) -> bool {
            Symbol::intern(&text).as_str() == text
        }
    }
}
