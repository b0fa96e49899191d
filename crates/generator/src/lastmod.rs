use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sports_portal_core::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Stored state for one sitemap URL
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LastmodEntry {
    pub lastmod: NaiveDate,
    pub priority: f64,
}

/// Persisted `loc -> {lastmod, priority}` map backing sitemap freshness.
///
/// Loaded once per generation, mutated in memory, written back with
/// [`LastmodStore::flush`]. Entries are never removed and their dates never
/// move backwards.
#[derive(Debug)]
pub struct LastmodStore {
    path: PathBuf,
    entries: BTreeMap<String, LastmodEntry>,
}

impl LastmodStore {
    /// Load the store at `path`.
    ///
    /// A missing file yields an empty store. An unparseable one is an error
    /// so the history of other domains is never overwritten.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                warn!(path = %path.display(), error = %e, "Lastmod store unreadable");
                Error::ConfigParse(format!("Lastmod store {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No lastmod store yet");
                BTreeMap::new()
            }
            Err(e) => return Err(Error::from(e)),
        };

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, loc: &str) -> Option<&LastmodEntry> {
        self.entries.get(loc)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge one URL into the store and return its resulting lastmod.
    ///
    /// | fresh | stored | result                     |
    /// |-------|--------|----------------------------|
    /// | yes   | yes    | later of stored and today  |
    /// | yes   | no     | today                      |
    /// | no    | yes    | stored, unchanged          |
    /// | no    | no     | today (first seen)         |
    pub fn update(&mut self, loc: &str, fresh: bool, today: NaiveDate, priority: f64) -> NaiveDate {
        let lastmod = match (fresh, self.entries.get(loc)) {
            (true, Some(prev)) => prev.lastmod.max(today),
            (false, Some(prev)) => prev.lastmod,
            (_, None) => today,
        };

        self.entries
            .insert(loc.to_string(), LastmodEntry { lastmod, priority });
        lastmod
    }

    /// Write every entry back to disk.
    ///
    /// The JSON goes to a temporary file next to the store which is then
    /// renamed over it, so readers see either the old or the new contents.
    pub fn flush(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(&self.entries)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!(path = %self.path.display(), entries = self.entries.len(), "Lastmod store flushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LastmodStore::load(dir.path().join("lastmod.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_rejected_and_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lastmod.json");
        for content in ["{not json", ""] {
            fs::write(&path, content).unwrap();
            let err = LastmodStore::load(&path).unwrap_err();
            assert!(matches!(err, Error::ConfigParse(_)), "{content:?}: {err}");
            assert_eq!(fs::read_to_string(&path).unwrap(), content);
        }
    }

    #[test]
    fn test_update_first_seen_defaults_to_today() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LastmodStore::load(dir.path().join("l.json")).unwrap();
        assert_eq!(store.update("https://a.com/", false, day(18), 1.0), day(18));
        assert_eq!(store.update("https://a.com/x", true, day(18), 0.8), day(18));
    }

    #[test]
    fn test_update_stale_keeps_stored_date() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LastmodStore::load(dir.path().join("l.json")).unwrap();
        store.update("https://a.com/", false, day(10), 1.0);
        assert_eq!(store.update("https://a.com/", false, day(18), 1.0), day(10));
        assert_eq!(store.get("https://a.com/").unwrap().lastmod, day(10));
    }

    #[test]
    fn test_update_fresh_never_regresses() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LastmodStore::load(dir.path().join("l.json")).unwrap();
        store.update("https://a.com/", true, day(20), 1.0);
        assert_eq!(store.update("https://a.com/", true, day(18), 1.0), day(20));
        assert_eq!(store.update("https://a.com/", true, day(25), 1.0), day(25));
    }

    #[test]
    fn test_flush_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("lastmod.json");

        let mut store = LastmodStore::load(&path).unwrap();
        store.update("https://a.com/live-tennis", false, day(3), 0.8);
        store.flush().unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"lastmod\": \"2026-10-03\""));

        let reloaded = LastmodStore::load(&path).unwrap();
        assert_eq!(
            reloaded.get("https://a.com/live-tennis"),
            Some(&LastmodEntry {
                lastmod: day(3),
                priority: 0.8
            })
        );
    }

    #[test]
    fn test_flush_replaces_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lastmod.json");

        let mut store = LastmodStore::load(&path).unwrap();
        store.update("https://www.other.com/live-tennis", false, day(2), 0.8);
        store.flush().unwrap();

        let mut store = LastmodStore::load(&path).unwrap();
        store.update("https://www.example.com/", true, day(18), 1.0);
        store.flush().unwrap();

        let reloaded = LastmodStore::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("https://www.other.com/live-tennis").unwrap().lastmod, day(2));

        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1, "temporary file left behind");
    }
}
