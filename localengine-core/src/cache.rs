//! In-memory store of parsed locale data.
//!
//! Entries are immutable and shared as `Arc<CacheEntry>`. Installing or
//! refreshing a locale swaps the whole `Arc` under a short write lock, so a
//! reader either sees the old entry or the new one, never a mix. The lock is
//! never held while locale data is being loaded.

use crate::loader::{LoadedLocale, Metadata};
use crate::locale::LocaleId;
use crate::tree::TranslationTree;
use localengine_log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// One cached locale.
#[derive(Debug)]
pub struct CacheEntry {
    pub locale: LocaleId,
    pub tree: TranslationTree,
    pub metadata: Metadata,
    pub loaded_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    /// Instant at which the entry becomes stale.
    pub fn expires_at(&self) -> Instant {
        self.loaded_at + self.ttl
    }

    /// Whether the entry is past its TTL at `now`.
    pub fn is_stale_at(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }

    /// Time elapsed since the entry was loaded.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.loaded_at)
    }
}

/// Snapshot of store occupancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub stale: usize,
}

/// Locale-keyed store with TTL staleness.
///
/// There is no capacity eviction; the store holds at most one entry per
/// locale ever loaded.
#[derive(Debug)]
pub struct CacheStore {
    entries: RwLock<HashMap<LocaleId, Arc<CacheEntry>>>,
    ttl: Duration,
}

impl CacheStore {
    /// Create an empty store whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// TTL applied to new entries.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current entry for `locale`, stale or not.
    pub fn get(&self, locale: &LocaleId) -> Option<Arc<CacheEntry>> {
        self.entries.read().get(locale).cloned()
    }

    /// Install or replace the entry for `locale`. Last writer wins.
    pub fn put(
        &self,
        locale: &LocaleId,
        tree: TranslationTree,
        metadata: Metadata,
        now: Instant,
    ) -> Arc<CacheEntry> {
        let entry = self.build_entry(locale, tree, metadata, now);
        self.entries.write().insert(locale.clone(), Arc::clone(&entry));
        debug!("Cached locale {} (ttl {:?})", locale, self.ttl);
        entry
    }

    /// [`put`](Self::put) for a loader result.
    pub fn install(&self, locale: &LocaleId, loaded: LoadedLocale, now: Instant) -> Arc<CacheEntry> {
        self.put(locale, loaded.tree, loaded.metadata, now)
    }

    /// Replace the entry for `locale` only if one is still present.
    ///
    /// Used by background refresh so that a reload finishing after
    /// [`invalidate`](Self::invalidate) does not bring the locale back.
    pub fn replace_existing(&self, locale: &LocaleId, loaded: LoadedLocale, now: Instant) -> bool {
        let entry = self.build_entry(locale, loaded.tree, loaded.metadata, now);
        let mut entries = self.entries.write();
        match entries.get_mut(locale) {
            Some(slot) => {
                *slot = entry;
                debug!("Refreshed cached locale {}", locale);
                true
            }
            None => false,
        }
    }

    fn build_entry(
        &self,
        locale: &LocaleId,
        tree: TranslationTree,
        metadata: Metadata,
        now: Instant,
    ) -> Arc<CacheEntry> {
        Arc::new(CacheEntry {
            locale: locale.clone(),
            tree,
            metadata,
            loaded_at: now,
            ttl: self.ttl,
        })
    }

    /// `true` iff an entry exists and is past its TTL at `now`.
    ///
    /// A missing entry is a miss, not stale.
    pub fn is_stale(&self, locale: &LocaleId, now: Instant) -> bool {
        self.entries
            .read()
            .get(locale)
            .is_some_and(|entry| entry.is_stale_at(now))
    }

    /// Whether an entry exists for `locale`.
    pub fn contains(&self, locale: &LocaleId) -> bool {
        self.entries.read().contains_key(locale)
    }

    /// Identifiers of every cached locale, sorted.
    pub fn locales(&self) -> Vec<LocaleId> {
        let mut locales: Vec<LocaleId> = self.entries.read().keys().cloned().collect();
        locales.sort();
        locales
    }

    /// Identifiers of cached locales that are stale at `now`.
    pub fn stale_locales(&self, now: Instant) -> Vec<LocaleId> {
        let mut locales: Vec<LocaleId> = self
            .entries
            .read()
            .values()
            .filter(|entry| entry.is_stale_at(now))
            .map(|entry| entry.locale.clone())
            .collect();
        locales.sort();
        locales
    }

    /// Drop the entry for `locale`.
    pub fn invalidate(&self, locale: &LocaleId) -> bool {
        let removed = self.entries.write().remove(locale).is_some();
        if removed {
            debug!("Invalidated cached locale {}", locale);
        }
        removed
    }

    /// Drop every entry.
    pub fn invalidate_all(&self) {
        let mut entries = self.entries.write();
        let count = entries.len();
        entries.clear();
        debug!("Invalidated {} cached locales", count);
    }

    /// Entry and stale counts at `now`.
    pub fn stats(&self, now: Instant) -> CacheStats {
        let entries = self.entries.read();
        CacheStats {
            entries: entries.len(),
            stale: entries.values().filter(|e| e.is_stale_at(now)).count(),
        }
    }

    /// Number of cached locales, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no locale is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
