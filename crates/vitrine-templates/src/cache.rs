//! Compiled template cache.

use crate::template::Template;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of cached templates.
    pub size: usize,
    /// Cached template names, sorted.
    pub templates: Vec<String>,
}

/// Mapping from template name to compiled template.
///
/// Entries are shared as `Arc<Template>` and never mutated; a name is only
/// ever replaced wholesale or removed by [`TemplateCache::clear`]. There is
/// no eviction.
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: RwLock<HashMap<String, Arc<Template>>>,
}

impl TemplateCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` is cached.
    pub fn has(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Cached template for `name`.
    pub fn get(&self, name: &str) -> Option<Arc<Template>> {
        self.entries.read().get(name).cloned()
    }

    /// Store `template` under its name, replacing any previous entry.
    pub fn set(&self, template: Template) -> Arc<Template> {
        let template = Arc::new(template);
        self.entries
            .write()
            .insert(template.name().to_string(), Arc::clone(&template));
        template
    }

    /// Store `template` unless its name is already cached; returns whichever
    /// entry ends up in the cache.
    pub fn insert_if_absent(&self, template: Template) -> Arc<Template> {
        let mut entries = self.entries.write();
        Arc::clone(
            entries
                .entry(template.name().to_string())
                .or_insert_with(|| Arc::new(template)),
        )
    }

    /// Remove every entry, returning how many were removed.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let removed = entries.len();
        entries.clear();
        removed
    }

    /// Number of cached templates.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of cache size and names.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        let mut templates: Vec<String> = entries.keys().cloned().collect();
        templates.sort();
        CacheStats {
            size: entries.len(),
            templates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_has() {
        let cache = TemplateCache::new();
        assert!(!cache.has("hero"));
        assert!(cache.get("hero").is_none());

        cache.set(Template::compile("hero", "<h1>{{title}}</h1>"));
        assert!(cache.has("hero"));
        assert_eq!(cache.get("hero").unwrap().source(), "<h1>{{title}}</h1>");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_set_replaces_wholesale() {
        let cache = TemplateCache::new();
        let first = cache.set(Template::compile("hero", "v1"));
        cache.set(Template::compile("hero", "v2"));

        assert_eq!(first.source(), "v1");
        assert_eq!(cache.get("hero").unwrap().source(), "v2");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_insert_if_absent_keeps_first() {
        let cache = TemplateCache::new();
        let first = cache.insert_if_absent(Template::compile("hero", "v1"));
        let second = cache.insert_if_absent(Template::compile("hero", "v2"));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.get("hero").unwrap().source(), "v1");
    }

    #[test]
    fn test_clear_and_stats() {
        let cache = TemplateCache::new();
        cache.set(Template::compile("project2", ""));
        cache.set(Template::compile("project1", ""));

        assert_eq!(
            cache.stats(),
            CacheStats {
                size: 2,
                templates: vec!["project1".to_string(), "project2".to_string()],
            }
        );

        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
        assert!(!cache.has("project1"));
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_concurrent_insert_if_absent_single_entry() {
        let cache = Arc::new(TemplateCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache.insert_if_absent(Template::compile("shared", format!("v{}", i)))
                })
            })
            .collect();

        let results: Vec<Arc<Template>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let cached = cache.get("shared").unwrap();
        assert!(results.iter().all(|t| Arc::ptr_eq(t, &cached)));
        assert_eq!(cache.len(), 1);
    }
}
