//! JSONL-backed translation cache.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sha2::{Digest, Sha256};

use crate::cache::types::{CacheEntry, CacheError, CacheStats, RecordOutcome};
use crate::observability::metrics;

const SECS_PER_DAY: i64 = 24 * 60 * 60;

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// SHA-256 hex digest of `from|to|text`.
pub fn cache_key(from: &str, to: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(from.as_bytes());
    hasher.update(b"|");
    hasher.update(to.as_bytes());
    hasher.update(b"|");
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Thread-safe translation cache, cheap to clone.
#[derive(Clone, Default)]
pub struct TranslationCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    next_id: Arc<AtomicU64>,
    path: Option<PathBuf>,
    /// Held for the whole write-and-rename; autosave and SIGHUP may overlap.
    save_lock: Arc<Mutex<()>>,
}

impl TranslationCache {
    /// Empty cache; `path` is where `save` writes.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
            path,
            save_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Cache bound to `path`, loaded from it when the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let cache = Self::new(Some(path.into()));
        cache.load()?;
        Ok(cache)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read entries from the backing file. Malformed lines are skipped.
    pub fn load(&self) -> Result<usize, CacheError> {
        let Some(path) = &self.path else {
            return Ok(0);
        };
        if !path.exists() {
            tracing::info!(path = %path.display(), "Cache file not found, starting empty");
            return Ok(0);
        }

        let reader = BufReader::new(File::open(path)?);
        let mut loaded = 0;
        let mut skipped = 0;
        let mut max_id = 0;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<CacheEntry>(&line) {
                Ok(entry) => {
                    max_id = max_id.max(entry.id);
                    self.entries.insert(entry.hash.clone(), entry);
                    loaded += 1;
                }
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(line = line_no + 1, error = %e, "Skipping malformed cache line");
                }
            }
        }

        self.next_id.fetch_max(max_id.saturating_add(1), Ordering::SeqCst);
        metrics::record_cache_size(self.entries.len());
        tracing::info!(path = %path.display(), loaded, skipped, "Loaded translation cache");
        Ok(loaded)
    }

    /// Write every entry, ordered by id, replacing the backing file.
    pub fn save(&self) -> Result<usize, CacheError> {
        let Some(path) = &self.path else {
            return Ok(0);
        };

        let _guard = self.save_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let entries = self.entries(None, None);
        let tmp = path.with_extension("jsonl.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            for entry in &entries {
                serde_json::to_writer(&mut writer, entry)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;

        tracing::info!(path = %path.display(), entries = entries.len(), "Saved translation cache");
        Ok(entries.len())
    }

    pub fn lookup(&self, from: &str, to: &str, text: &str) -> Option<CacheEntry> {
        self.entries
            .get(&cache_key(from, to, text))
            .map(|r| r.value().clone())
    }

    /// Return the cached translation when its count has reached
    /// `threshold`, bumping its usage on the way out.
    pub fn serve_if_hot(&self, from: &str, to: &str, text: &str, threshold: u64) -> Option<String> {
        let mut entry = self.entries.get_mut(&cache_key(from, to, text))?;
        if entry.count < threshold {
            return None;
        }
        entry.count += 1;
        entry.last_used = now_unix();
        Some(entry.target.clone())
    }

    /// Fold a fresh backend translation into the cache.
    pub fn record(&self, from: &str, to: &str, text: &str, translation: &str) -> RecordOutcome {
        let key = cache_key(from, to, text);
        let now = now_unix();

        let outcome = match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.last_used = now;
                if entry.target == translation {
                    entry.count += 1;
                    RecordOutcome::Bumped
                } else {
                    entry.target = translation.to_string();
                    entry.count = 1;
                    RecordOutcome::Replaced
                }
            }
            Entry::Vacant(vacant) => {
                let hash = vacant.key().clone();
                vacant.insert(CacheEntry {
                    id: self.next_id.fetch_add(1, Ordering::SeqCst),
                    hash,
                    from: from.to_string(),
                    to: to.to_string(),
                    source: text.to_string(),
                    target: translation.to_string(),
                    count: 1,
                    last_used: now,
                    created_at: now,
                });
                RecordOutcome::Added
            }
        };

        metrics::record_cache_size(self.entries.len());
        outcome
    }

    /// Remove every entry for a language pair.
    pub fn remove_pair(&self, from: &str, to: &str) -> usize {
        self.remove_where(|e| e.from == from && e.to == to)
    }

    pub fn delete(&self, id: u64) -> bool {
        self.remove_where(|e| e.id == id) > 0
    }

    pub fn clear(&self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        metrics::record_cache_size(0);
        removed
    }

    /// Drop entries unused for `days` days. Non-positive windows are a no-op.
    pub fn cleanup(&self, days: i64) -> usize {
        self.cleanup_at(days, now_unix())
    }

    pub fn cleanup_at(&self, days: i64, now: i64) -> usize {
        if days <= 0 {
            return 0;
        }
        let cutoff = now - days * SECS_PER_DAY;
        self.remove_where(|e| e.last_used < cutoff)
    }

    pub fn stats(&self, threshold: u64, days: i64) -> CacheStats {
        self.stats_at(threshold, days, now_unix())
    }

    pub fn stats_at(&self, threshold: u64, days: i64, now: i64) -> CacheStats {
        let cutoff = now - days.max(0) * SECS_PER_DAY;
        self.entries.iter().fold(
            CacheStats {
                total: self.entries.len(),
                ..CacheStats::default()
            },
            |mut stats, r| {
                if r.count >= threshold {
                    stats.active += 1;
                }
                if days > 0 && r.last_used < cutoff {
                    stats.expired += 1;
                }
                stats
            },
        )
    }

    /// Snapshot of entries, optionally filtered by language, ordered by id.
    pub fn entries(&self, from: Option<&str>, to: Option<&str>) -> Vec<CacheEntry> {
        let mut out: Vec<CacheEntry> = self
            .entries
            .iter()
            .filter(|r| from.map_or(true, |f| r.from == f) && to.map_or(true, |t| r.to == t))
            .map(|r| r.value().clone())
            .collect();
        out.sort_by_key(|e| e.id);
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove_where(&self, predicate: impl Fn(&CacheEntry) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| !predicate(e));
        let removed = before.saturating_sub(self.entries.len());
        metrics::record_cache_size(self.entries.len());
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_stable_sha256() {
        let key = cache_key("kor", "eng", "테스트");
        assert_eq!(key.len(), 64);
        assert_eq!(key, cache_key("kor", "eng", "테스트"));
        assert_ne!(key, cache_key("eng", "kor", "테스트"));
        assert_eq!(
            cache_key("kor", "eng", "hello"),
            "ea51cfd26a7a3eb3aaaea8ae4f2a5867bbc6165541b4b016e7b80b557253d7a5"
        );
    }

    #[test]
    fn test_record_add_bump_replace() {
        let cache = TranslationCache::new(None);
        assert_eq!(cache.record("kor", "eng", "안녕", "Hello"), RecordOutcome::Added);
        assert_eq!(cache.record("kor", "eng", "안녕", "Hello"), RecordOutcome::Bumped);
        assert_eq!(cache.lookup("kor", "eng", "안녕").unwrap().count, 2);

        assert_eq!(cache.record("kor", "eng", "안녕", "Hi"), RecordOutcome::Replaced);
        let entry = cache.lookup("kor", "eng", "안녕").unwrap();
        assert_eq!(entry.count, 1);
        assert_eq!(entry.target, "Hi");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_serve_if_hot_respects_threshold() {
        let cache = TranslationCache::new(None);
        cache.record("kor", "eng", "안녕", "Hello");
        assert_eq!(cache.serve_if_hot("kor", "eng", "안녕", 2), None);

        cache.record("kor", "eng", "안녕", "Hello");
        assert_eq!(cache.serve_if_hot("kor", "eng", "안녕", 2).as_deref(), Some("Hello"));
        assert_eq!(cache.lookup("kor", "eng", "안녕").unwrap().count, 3);
        assert_eq!(cache.serve_if_hot("kor", "jpn", "안녕", 1), None);
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let cache = TranslationCache::new(None);
        cache.record("kor", "eng", "a", "A");
        cache.record("kor", "eng", "b", "B");
        cache.record("kor", "jpn", "a", "A");
        let ids: Vec<u64> = cache.entries(None, None).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_pair_delete_clear() {
        let cache = TranslationCache::new(None);
        cache.record("kor", "eng", "a", "A");
        cache.record("kor", "eng", "b", "B");
        cache.record("kor", "jpn", "a", "A");

        assert_eq!(cache.entries(Some("kor"), Some("eng")).len(), 2);
        assert_eq!(cache.remove_pair("kor", "eng"), 2);
        assert_eq!(cache.len(), 1);

        assert!(cache.delete(3));
        assert!(!cache.delete(3));
        assert!(cache.is_empty());

        cache.record("kor", "eng", "c", "C");
        assert_eq!(cache.clear(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cleanup_and_stats_use_last_used() {
        let cache = TranslationCache::new(None);
        cache.record("kor", "eng", "old", "Old");
        cache.record("kor", "eng", "new", "New");
        cache.record("kor", "eng", "new", "New");
        let now = now_unix();
        if let Some(mut entry) = cache.entries.get_mut(&cache_key("kor", "eng", "old")) {
            entry.last_used = now - 40 * SECS_PER_DAY;
        }

        let stats = cache.stats_at(2, 30, now);
        assert_eq!(stats, CacheStats { total: 2, active: 1, expired: 1 });

        assert_eq!(cache.cleanup_at(0, now), 0);
        assert_eq!(cache.cleanup_at(30, now), 1);
        assert!(cache.lookup("kor", "eng", "old").is_none());
        assert!(cache.lookup("kor", "eng", "new").is_some());
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trans_cache.jsonl");

        let cache = TranslationCache::new(Some(path.clone()));
        cache.record("kor", "eng", "안녕", "Hello");
        cache.record("kor", "jpn", "안녕", "こんにちは");
        assert_eq!(cache.save().unwrap(), 2);

        let reloaded = TranslationCache::open(&path).unwrap();
        assert_eq!(reloaded.entries(None, None), cache.entries(None, None));
        assert_eq!(reloaded.record("eng", "kor", "Hi", "안녕"), RecordOutcome::Added);
        assert_eq!(reloaded.lookup("eng", "kor", "Hi").unwrap().id, 3);
    }

    #[test]
    fn test_load_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.jsonl");
        let good = CacheEntry {
            id: 7,
            hash: cache_key("kor", "eng", "x"),
            from: "kor".into(),
            to: "eng".into(),
            source: "x".into(),
            target: "X".into(),
            count: 4,
            last_used: 1,
            created_at: 1,
        };
        let contents = format!("{}\nnot json\n\n{{\"id\":1}}\n", serde_json::to_string(&good).unwrap());
        fs::write(&path, contents).unwrap();

        let cache = TranslationCache::open(&path).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup("kor", "eng", "x").unwrap().count, 4);
    }

    #[test]
    fn test_overlapping_saves_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trans_cache.jsonl");
        let cache = TranslationCache::new(Some(path.clone()));
        for i in 0..2_000 {
            cache.record("kor", "eng", &format!("source {}", i), &format!("target {}", i));
        }

        for _ in 0..5 {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let cache = cache.clone();
                    std::thread::spawn(move || cache.save())
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap().unwrap(), 2_000);
            }
            assert_eq!(TranslationCache::open(&path).unwrap().len(), 2_000);
        }
        assert!(!path.with_extension("jsonl.tmp").exists());
    }

    #[test]
    fn test_max_id_on_disk_does_not_overflow() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.jsonl");
        let entry = CacheEntry {
            id: u64::MAX,
            hash: cache_key("kor", "eng", "x"),
            from: "kor".into(),
            to: "eng".into(),
            source: "x".into(),
            target: "X".into(),
            count: 1,
            last_used: 1,
            created_at: 1,
        };
        fs::write(&path, format!("{}\n", serde_json::to_string(&entry).unwrap())).unwrap();

        let cache = TranslationCache::open(&path).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup("kor", "eng", "x").unwrap().id, u64::MAX);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TranslationCache::open(dir.path().join("absent.jsonl")).unwrap();
        assert!(cache.is_empty());
    }
}
