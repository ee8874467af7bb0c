//! Rendered-view cache and its invalidation seam
//!
//! Page loaders store their JSON output keyed by route path plus a variant
//! (the query string for the list page). Mutation handlers only see the
//! [`CacheInvalidator`] side: invalidating a path drops every variant
//! stored under it.
//!
//! Each path holds at most `max_variants` entries. Once a path is full, new
//! variants are rendered but not stored until the path is invalidated.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Marks cached views stale after a mutation
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn invalidate(&self, path: &str);
}

/// Variants kept per path unless configured otherwise
pub const DEFAULT_MAX_VARIANTS: usize = 64;

/// In-process view cache
#[derive(Debug)]
pub struct ViewCache {
    entries: RwLock<HashMap<String, HashMap<String, Value>>>,
    max_variants: usize,
}

impl Default for ViewCache {
    fn default() -> Self {
        Self::with_max_variants(DEFAULT_MAX_VARIANTS)
    }
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_variants(max_variants: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_variants,
        }
    }

    pub fn max_variants(&self) -> usize {
        self.max_variants
    }

    pub async fn get(&self, path: &str, variant: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        entries.get(path).and_then(|v| v.get(variant)).cloned()
    }

    /// Store a view; returns false when the path is full
    pub async fn put(&self, path: &str, variant: &str, view: Value) -> bool {
        let mut entries = self.entries.write().await;
        let variants = entries.entry(path.to_string()).or_default();
        if !variants.contains_key(variant) && variants.len() >= self.max_variants {
            tracing::debug!(path, variant, "view cache full for path, not stored");
            return false;
        }
        variants.insert(variant.to_string(), view);
        true
    }

    /// Return the cached view, or render, store and return it
    ///
    /// A render error is returned as-is and nothing is stored.
    pub async fn get_or_insert<F, Fut, E>(
        &self,
        path: &str,
        variant: &str,
        render: F,
    ) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Value, E>>,
    {
        if let Some(view) = self.get(path, variant).await {
            tracing::debug!(path, variant, "view cache hit");
            return Ok(view);
        }
        let view = render().await?;
        self.put(path, variant, view.clone()).await;
        Ok(view)
    }

    pub async fn contains(&self, path: &str) -> bool {
        let entries = self.entries.read().await;
        entries.get(path).is_some_and(|v| !v.is_empty())
    }

    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().map(HashMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheInvalidator for ViewCache {
    async fn invalidate(&self, path: &str) {
        let removed = self.entries.write().await.remove(path);
        tracing::debug!(
            path,
            variants = removed.map(|v| v.len()).unwrap_or_default(),
            "view cache invalidated"
        );
    }
}
