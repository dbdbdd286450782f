//! Memoized parsing
//!
//! Charts are re-rendered far more often than they are edited, so parsed
//! documents are kept by source text. The cache is shared by reference across
//! threads; documents are handed out as `Arc`s and never mutated.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use crate::ast::Document;
use crate::error::ChartError;
use crate::parser::parse;

pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Default)]
struct Entries {
    documents: HashMap<String, Arc<Document>>,
    /// Insertion order, oldest first
    order: VecDeque<String>,
}

/// A bounded map from chart text to its parsed document.
///
/// ```
/// use chartmark::cache::ParseCache;
/// use std::sync::Arc;
///
/// let cache = ParseCache::new(8);
/// let first = cache.get_or_parse("|C|G|").unwrap().unwrap();
/// let second = cache.get_or_parse("|C|G|").unwrap().unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
pub struct ParseCache {
    entries: RwLock<Entries>,
    capacity: usize,
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ParseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            capacity: capacity.max(1),
        }
    }

    /// Return the cached document for `source`, parsing it on a miss.
    ///
    /// Blank input and parse errors are not cached.
    pub fn get_or_parse(&self, source: &str) -> Result<Option<Arc<Document>>, ChartError> {
        if let Some(doc) = self.get(source) {
            log::debug!("Parse cache hit ({} bytes)", source.len());
            return Ok(Some(doc));
        }

        let Some(doc) = parse(source)? else {
            return Ok(None);
        };
        let doc = Arc::new(doc);
        self.insert(source, Arc::clone(&doc));
        Ok(Some(doc))
    }

    pub fn get(&self, source: &str) -> Option<Arc<Document>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.documents.get(source).cloned()
    }

    fn insert(&self, source: &str, doc: Arc<Document>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.documents.contains_key(source) {
            return;
        }
        while entries.documents.len() >= self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.documents.remove(&oldest);
        }
        entries.order.push_back(source.to_string());
        entries.documents.insert(source.to_string(), doc);
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .documents
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.documents.clear();
        entries.order.clear();
    }
}
