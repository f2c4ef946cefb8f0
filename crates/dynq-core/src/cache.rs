//! Compiled predicate cache.
//!
//! Compiling resolves field names and binds operators; callers that receive the
//! same filter repeatedly can keep the result here instead of recompiling.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use dynq_proto::{Criterion, Value};
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::compiler::{CompiledPredicate, PredicateCompiler};
use crate::error::CompileError;
use crate::record::RecordType;

/// Default maximum number of cached predicates.
pub const DEFAULT_CACHE_SIZE: usize = 1024;

/// Fingerprint of a filter for cache lookup.
///
/// Covers the entity name and every criterion including its value, since a
/// compiled predicate binds its comparison values.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PredicateFingerprint {
    hash: u64,
}

impl PredicateFingerprint {
    /// Compute the fingerprint of criteria for an entity.
    pub fn new(entity: &str, criteria: &[Criterion]) -> Self {
        let mut hasher = DefaultHasher::new();
        entity.hash(&mut hasher);
        criteria.len().hash(&mut hasher);
        for criterion in criteria {
            criterion.field.hash(&mut hasher);
            criterion.operator.hash(&mut hasher);
            hash_value(&criterion.value, &mut hasher);
        }
        Self {
            hash: hasher.finish(),
        }
    }
}

/// Hash a value, floats by their bit pattern.
fn hash_value<H: Hasher>(value: &Value, hasher: &mut H) {
    std::mem::discriminant(value).hash(hasher);
    match value {
        Value::Null => {}
        Value::Bool(v) => v.hash(hasher),
        Value::Int32(v) => v.hash(hasher),
        Value::Int64(v) | Value::Timestamp(v) => v.hash(hasher),
        Value::Float32(v) => v.to_bits().hash(hasher),
        Value::Float64(v) => v.to_bits().hash(hasher),
        Value::String(v) => v.hash(hasher),
        Value::Bytes(v) => v.hash(hasher),
        Value::Uuid(v) => v.hash(hasher),
        Value::BoolArray(v) => v.hash(hasher),
        Value::Int32Array(v) => v.hash(hasher),
        Value::Int64Array(v) => v.hash(hasher),
        Value::Float32Array(v) => {
            v.len().hash(hasher);
            v.iter().for_each(|f| f.to_bits().hash(hasher));
        }
        Value::Float64Array(v) => {
            v.len().hash(hasher);
            v.iter().for_each(|f| f.to_bits().hash(hasher));
        }
        Value::StringArray(v) => v.hash(hasher),
        Value::UuidArray(v) => v.hash(hasher),
    }
}

/// Cached predicate with the criteria it was compiled from.
struct CachedPredicate<R: ?Sized> {
    criteria: Vec<Criterion>,
    predicate: CompiledPredicate<R>,
    hit_count: AtomicU64,
}

impl<R: ?Sized> CachedPredicate<R> {
    fn matches(&self, criteria: &[Criterion]) -> bool {
        self.criteria == criteria
    }

    fn record_hit(&self) -> u64 {
        self.hit_count.fetch_add(1, AtomicOrdering::Relaxed) + 1
    }

    fn hits(&self) -> u64 {
        self.hit_count.load(AtomicOrdering::Relaxed)
    }
}

/// Cache statistics.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl CacheStats {
    /// Get hit count.
    pub fn hits(&self) -> u64 {
        self.hits.load(AtomicOrdering::Relaxed)
    }

    /// Get miss count.
    pub fn misses(&self) -> u64 {
        self.misses.load(AtomicOrdering::Relaxed)
    }

    /// Get eviction count.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(AtomicOrdering::Relaxed)
    }

    /// Calculate hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }
}

type Entries<R> = HashMap<PredicateFingerprint, CachedPredicate<R>>;

/// Thread-safe cache of predicates compiled against one record-type
/// descriptor.
///
/// The cache owns its descriptor, so every cached predicate carries that
/// descriptor's field readers. Use one cache per descriptor. When full, the
/// entry with the fewest hits is evicted.
pub struct PredicateCache<D: RecordType> {
    descriptor: D,
    cache: RwLock<Entries<D::Record>>,
    max_entries: usize,
    compiler: PredicateCompiler,
    stats: CacheStats,
}

impl<D: RecordType> PredicateCache<D> {
    /// Create a cache for `descriptor` holding up to [`DEFAULT_CACHE_SIZE`]
    /// predicates.
    pub fn new(descriptor: D) -> Self {
        Self::with_capacity(descriptor, DEFAULT_CACHE_SIZE)
    }

    /// Create a cache holding at most `max_entries` predicates.
    pub fn with_capacity(descriptor: D, max_entries: usize) -> Self {
        Self::with_compiler(descriptor, max_entries, PredicateCompiler::default())
    }

    /// Create a cache that compiles misses with `compiler`.
    pub fn with_compiler(descriptor: D, max_entries: usize, compiler: PredicateCompiler) -> Self {
        Self {
            descriptor,
            cache: RwLock::new(HashMap::new()),
            max_entries,
            compiler,
            stats: CacheStats::default(),
        }
    }

    /// The descriptor every cached predicate was compiled against.
    pub fn descriptor(&self) -> &D {
        &self.descriptor
    }

    /// The compiler used for misses.
    pub fn compiler(&self) -> &PredicateCompiler {
        &self.compiler
    }

    fn fingerprint(&self, criteria: &[Criterion]) -> PredicateFingerprint {
        PredicateFingerprint::new(&self.descriptor.entity().name, criteria)
    }

    /// Look up a predicate compiled from exactly these criteria.
    pub fn get(&self, criteria: &[Criterion]) -> Option<CompiledPredicate<D::Record>> {
        let entity = &self.descriptor.entity().name;
        let fingerprint = self.fingerprint(criteria);
        let guard = self.cache.read();

        if let Some(cached) = guard.get(&fingerprint) {
            if cached.matches(criteria) {
                let hits = cached.record_hit();
                self.stats.hits.fetch_add(1, AtomicOrdering::Relaxed);
                trace!(%entity, hits, "predicate cache hit");
                return Some(cached.predicate.clone());
            }
        }

        self.stats.misses.fetch_add(1, AtomicOrdering::Relaxed);
        trace!(%entity, "predicate cache miss");
        None
    }

    /// Return the cached predicate for `criteria`, compiling and caching it on
    /// a miss. Compile errors are not cached.
    pub fn get_or_compile(
        &self,
        criteria: &[Criterion],
    ) -> Result<CompiledPredicate<D::Record>, CompileError> {
        if let Some(predicate) = self.get(criteria) {
            return Ok(predicate);
        }

        let predicate = self.compiler.compile(&self.descriptor, criteria)?;
        self.insert(criteria, predicate.clone());
        Ok(predicate)
    }

    /// Store a predicate, evicting the least-used entry if the cache is full.
    fn insert(&self, criteria: &[Criterion], predicate: CompiledPredicate<D::Record>) {
        if self.max_entries == 0 {
            return;
        }

        let fingerprint = self.fingerprint(criteria);
        let cached = CachedPredicate {
            criteria: criteria.to_vec(),
            predicate,
            hit_count: AtomicU64::new(0),
        };

        let mut guard = self.cache.write();
        if guard.len() >= self.max_entries && !guard.contains_key(&fingerprint) {
            self.evict_least_used(&mut guard);
        }
        guard.insert(fingerprint, cached);
    }

    fn evict_least_used(&self, cache: &mut Entries<D::Record>) {
        let evict_key = cache
            .iter()
            .min_by_key(|(_, v)| v.hits())
            .map(|(k, _)| *k);

        if let Some(key) = evict_key {
            cache.remove(&key);
            self.stats.evictions.fetch_add(1, AtomicOrdering::Relaxed);
            debug!(?key, "evicted cached predicate");
        }
    }

    /// Get cache statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Get the current number of cached entries.
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all cached entries.
    pub fn clear(&self) {
        self.cache.write().clear();
    }
}
