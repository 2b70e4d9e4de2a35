//! # Provider Memoization
//!
//! Layout probes the same substrings and path sources many times: every
//! sibling is sized at both extremes before it is sized for real, and nested
//! stacks repeat the whole exercise for each proposal their parent tries.
//! These wrappers put a shared cache in front of any measurer or path
//! provider.
//!
//! [`Memo`] computes each key at most once, even under concurrent access:
//! the map lock is only held to find or insert a slot, and the computation
//! runs inside the slot's [`OnceLock`] so other keys stay available while a
//! slow measurement is in flight.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::error::{PlacardError, Result};
use crate::layout::Rect;
use crate::style::FontSpec;
use crate::svg::{PathGeometry, PathHandle};
use crate::text::{TextMeasurer, TextMetrics};

/// A thread-safe at-most-once memo table.
pub struct Memo<K, V> {
    slots: Mutex<HashMap<K, Arc<OnceLock<V>>>>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash, V: Clone> Memo<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, computing it with `compute` if no
    /// caller has yet. Concurrent callers for the same key wait for the first.
    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> V {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key).or_default())
        };
        slot.get_or_init(compute).clone()
    }

    /// Number of keys seen so far.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// A failure stored in a memo table. `PlacardError` wraps non-clonable
/// sources, so cached failures keep their variant and message only.
#[derive(Debug, Clone)]
enum Failure {
    InvalidPath { source_text: String, reason: String },
    Measure(String),
    Image(String),
    Font(String),
    Other(String),
}

impl From<PlacardError> for Failure {
    fn from(err: PlacardError) -> Self {
        match err {
            PlacardError::InvalidPath {
                source_text,
                reason,
            } => Failure::InvalidPath {
                source_text,
                reason,
            },
            PlacardError::Measure(msg) => Failure::Measure(msg),
            PlacardError::Image(msg) => Failure::Image(msg),
            PlacardError::Font(msg) => Failure::Font(msg),
            other @ PlacardError::Parse { .. } => Failure::Other(other.to_string()),
        }
    }
}

impl Failure {
    fn thaw(&self, other: impl FnOnce(String) -> PlacardError) -> PlacardError {
        match self {
            Failure::InvalidPath {
                source_text,
                reason,
            } => PlacardError::InvalidPath {
                source_text: source_text.clone(),
                reason: reason.clone(),
            },
            Failure::Measure(msg) => PlacardError::Measure(msg.clone()),
            Failure::Image(msg) => PlacardError::Image(msg.clone()),
            Failure::Font(msg) => PlacardError::Font(msg.clone()),
            Failure::Other(msg) => other(msg.clone()),
        }
    }
}

type MeasureKey = ((String, u64, u32), String);

/// A [`TextMeasurer`] that remembers every (font, substring) it has measured.
pub struct CachedMeasurer<M> {
    inner: M,
    memo: Memo<MeasureKey, std::result::Result<TextMetrics, Failure>>,
}

impl<M: TextMeasurer> CachedMeasurer<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            memo: Memo::new(),
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Number of distinct measurements cached.
    pub fn cached(&self) -> usize {
        self.memo.len()
    }
}

impl<M: TextMeasurer> TextMeasurer for CachedMeasurer<M> {
    fn measure(&self, font: &FontSpec, text: &str) -> Result<TextMetrics> {
        self.memo
            .get_or_compute((font.key(), text.to_string()), || {
                self.inner.measure(font, text).map_err(Failure::from)
            })
            .map_err(|f| f.thaw(PlacardError::Measure))
    }
}

/// A [`PathGeometry`] that parses each source once for bounds and once for
/// materialization.
pub struct CachedPaths<P> {
    inner: P,
    bounds: Memo<String, std::result::Result<Rect, Failure>>,
    handles: Memo<String, std::result::Result<PathHandle, Failure>>,
}

impl<P: PathGeometry> CachedPaths<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            bounds: Memo::new(),
            handles: Memo::new(),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: PathGeometry> PathGeometry for CachedPaths<P> {
    fn tight_bounds(&self, source: &str) -> Result<Rect> {
        self.bounds
            .get_or_compute(source.to_string(), || {
                self.inner.tight_bounds(source).map_err(Failure::from)
            })
            .map_err(|f| f.thaw(|reason| PlacardError::invalid_path(source, reason)))
    }

    fn materialize(&self, source: &str) -> Result<PathHandle> {
        self.handles
            .get_or_compute(source.to_string(), || {
                self.inner.materialize(source).map_err(Failure::from)
            })
            .map_err(|f| f.thaw(|reason| PlacardError::invalid_path(source, reason)))
    }
}
