use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::error::{DataError, Result};
use super::loader::load_file;
use super::model::Dataset;

// ---------------------------------------------------------------------------
// DatasetCache – load once, reload when the file changes
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct CacheEntry {
    path: PathBuf,
    modified: Option<SystemTime>,
    invalidated: bool,
    dataset: Dataset,
}

/// Holds the last loaded dataset, keyed by source path and modification time.
///
/// Filtering and aggregation run on every pass; loading only runs when the
/// key changes or after [`DatasetCache::invalidate`]. A failed reload keeps
/// the previous dataset.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<CacheEntry>,
    loads: usize,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the dataset for `path`, loading it if it is not cached or the
    /// file changed on disk.
    pub fn get(&mut self, path: &Path) -> Result<&Dataset> {
        let modified = std::fs::metadata(path)
            .map_err(|source| DataError::Load {
                path: path.to_path_buf(),
                source,
            })?
            .modified()
            .ok();

        let entry = match self.entry.take() {
            Some(entry) if !entry.invalidated && entry.path == path && entry.modified == modified => {
                log::debug!("Dataset cache hit for {}", path.display());
                entry
            }
            previous => {
                log::debug!("Dataset cache miss for {}", path.display());
                match load_file(path) {
                    Ok(dataset) => {
                        self.loads += 1;
                        CacheEntry {
                            path: path.to_path_buf(),
                            modified,
                            invalidated: false,
                            dataset,
                        }
                    }
                    Err(err) => {
                        self.entry = previous;
                        return Err(err);
                    }
                }
            }
        };

        Ok(&self.entry.insert(entry).dataset)
    }

    /// Last successfully loaded dataset, without checking the file.
    pub fn current(&self) -> Option<&Dataset> {
        self.entry.as_ref().map(|e| &e.dataset)
    }

    /// Path of the cached dataset.
    pub fn current_path(&self) -> Option<&Path> {
        self.entry.as_ref().map(|e| e.path.as_path())
    }

    /// Force the next [`DatasetCache::get`] to reload. The stale dataset stays
    /// readable through [`DatasetCache::current`] until then.
    pub fn invalidate(&mut self) {
        if let Some(entry) = &mut self.entry {
            log::debug!("Invalidating dataset cache for {}", entry.path.display());
            entry.invalidated = true;
        }
    }

    /// Number of loads performed so far.
    pub fn loads(&self) -> usize {
        self.loads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::io::Write;
    use std::time::{Duration, UNIX_EPOCH};

    const HEADER: &str = "sport;competition;date_rencontre;equipe_1;equipe_2;mises;n_mises;n_joueurs";

    fn write_rows(path: &Path, rows: &[&str], mtime_secs: u64) {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file.set_modified(UNIX_EPOCH + Duration::from_secs(mtime_secs)).unwrap();
    }

    const ROW_A: &str = "Football;Ligue 1;2022-08-28;PSG;Monaco;2 100 000€;98 000;40 120";
    const ROW_B: &str = "Tennis;Roland Garros;2021-06-13;Djokovic;Tsitsipas;3 456 789€;120 345;45 678";

    #[test]
    fn second_get_is_a_hit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bets.csv");
        write_rows(&path, &[ROW_A], 1_000);

        let mut cache = DatasetCache::new();
        assert_eq!(cache.get(&path).unwrap().len(), 1);
        assert_eq!(cache.get(&path).unwrap().len(), 1);
        assert_eq!(cache.loads(), 1);
        assert_eq!(cache.current_path(), Some(path.as_path()));
    }

    #[test]
    fn modification_time_change_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bets.csv");
        write_rows(&path, &[ROW_A], 1_000);

        let mut cache = DatasetCache::new();
        cache.get(&path).unwrap();
        write_rows(&path, &[ROW_A, ROW_B], 2_000);
        assert_eq!(cache.get(&path).unwrap().len(), 2);
        assert_eq!(cache.loads(), 2);
    }

    #[test]
    fn invalidate_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bets.csv");
        write_rows(&path, &[ROW_A], 1_000);

        let mut cache = DatasetCache::new();
        cache.get(&path).unwrap();
        // same mtime, different content: only an explicit invalidation sees it
        write_rows(&path, &[ROW_A, ROW_B], 1_000);
        assert_eq!(cache.get(&path).unwrap().len(), 1);

        cache.invalidate();
        assert_eq!(cache.current().map(Dataset::len), Some(1));
        assert_eq!(cache.get(&path).unwrap().len(), 2);
        assert_eq!(cache.loads(), 2);
    }

    #[test]
    fn failed_reload_keeps_previous_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bets.csv");
        write_rows(&path, &[ROW_A], 1_000);

        let mut cache = DatasetCache::new();
        cache.get(&path).unwrap();
        write_rows(&path, &["Football;Ligue 1;not-a-date;PSG;OM;1€;1;1"], 2_000);

        assert!(matches!(cache.get(&path), Err(DataError::MalformedDate { .. })));
        assert_eq!(cache.current().map(Dataset::len), Some(1));

        let missing = dir.path().join("gone.csv");
        assert!(matches!(cache.get(&missing), Err(DataError::Load { .. })));
        assert_eq!(cache.current().map(Dataset::len), Some(1));
    }
}
