//! Discovery cache
//!
//! Holds resolved pipeline configurations per language pair for a fixed TTL.
//! A zero TTL disables storing entirely.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use akara_core::LanguagePair;

use super::resolver::PipelineConfig;

pub struct DiscoveryCache {
    ttl: Duration,
    entries: RwLock<HashMap<LanguagePair, (Instant, PipelineConfig)>>,
}

impl DiscoveryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Fresh entry for `pair`, if any. Expired entries are dropped.
    pub fn get(&self, pair: &LanguagePair) -> Option<PipelineConfig> {
        if !self.is_enabled() {
            return None;
        }

        {
            let entries = self.entries.read();
            match entries.get(pair) {
                Some((stored, config)) if stored.elapsed() < self.ttl => {
                    return Some(config.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        self.entries.write().remove(pair);
        None
    }

    pub fn insert(&self, pair: LanguagePair, config: PipelineConfig) {
        if !self.is_enabled() {
            return;
        }
        self.entries.write().insert(pair, (Instant::now(), config));
    }

    /// Drop the entry for `pair`; called when a compute call using it fails
    pub fn invalidate(&self, pair: &LanguagePair) {
        if self.entries.write().remove(pair).is_some() {
            tracing::debug!(pair = %pair, "Discovery cache entry invalidated");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for DiscoveryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bhashini::tasks::{InferenceApiKey, StageServices};

    fn config(tag: &str) -> PipelineConfig {
        PipelineConfig {
            callback_url: format!("https://example.org/{}", tag),
            inference_key: InferenceApiKey {
                name: "Authorization".into(),
                value: tag.into(),
            },
            services: StageServices {
                asr: "S1".into(),
                translation: "S2".into(),
                tts: "S3".into(),
            },
        }
    }

    #[test]
    fn test_zero_ttl_never_stores() {
        let cache = DiscoveryCache::new(Duration::ZERO);
        let pair = LanguagePair::new("hi", "en");
        cache.insert(pair.clone(), config("a"));
        assert!(cache.is_empty());
        assert!(cache.get(&pair).is_none());
    }

    #[test]
    fn test_keyed_by_pair() {
        let cache = DiscoveryCache::new(Duration::from_secs(60));
        cache.insert(LanguagePair::new("hi", "en"), config("hi-en"));
        cache.insert(LanguagePair::new("en", "hi"), config("en-hi"));

        let hit = cache.get(&LanguagePair::new("hi", "en")).unwrap();
        assert_eq!(hit.inference_key.value, "hi-en");
        assert!(cache.get(&LanguagePair::new("ta", "en")).is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_invalidate_removes_entry() {
        let cache = DiscoveryCache::new(Duration::from_secs(60));
        let pair = LanguagePair::new("hi", "en");
        cache.insert(pair.clone(), config("a"));
        cache.invalidate(&pair);
        assert!(cache.get(&pair).is_none());
    }

    #[test]
    fn test_expired_entry_is_dropped() {
        let cache = DiscoveryCache::new(Duration::from_millis(5));
        let pair = LanguagePair::new("hi", "en");
        cache.insert(pair.clone(), config("a"));
        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get(&pair).is_none());
        assert!(cache.is_empty());
    }
}
