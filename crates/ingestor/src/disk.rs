//! Lazy file-size sampler over a directory tree.
//!
//! The walk is depth-first and single-use: it reflects the filesystem as it
//! is while being iterated. Entries that cannot be read are yielded as
//! [`ScanEntry::Skipped`] and never abort the walk.

use crate::error::{Error, Result};
use serde::Serialize;
use std::{
    fs::{self, DirEntry, ReadDir},
    io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::{debug, info, trace, warn};

/// Caller supplied scan parameters
#[derive(Debug, Clone, Default)]
pub struct DiskScanConfig {
    /// Directory the walk starts from
    pub root: PathBuf,
    /// Subtrees whose absolute path starts with any of these are pruned
    pub exclude_prefixes: Vec<PathBuf>,
    /// Stop after this many file sizes have been sampled (None = unbounded)
    pub max_entries: Option<usize>,
    /// Stop walking once this much wall-clock time has elapsed (None = unbounded)
    pub time_limit: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Excluded,
    NotRegularFile,
    Io(io::ErrorKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEntry {
    Size { path: PathBuf, bytes: u64 },
    Skipped { path: PathBuf, reason: SkipReason },
}

impl ScanEntry {
    pub fn size(&self) -> Option<u64> {
        match self {
            ScanEntry::Size { bytes, .. } => Some(*bytes),
            ScanEntry::Skipped { .. } => None,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ScanEntry::Size { path, .. } | ScanEntry::Skipped { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub sampled: usize,
    pub skipped: usize,
    pub excluded: usize,
    pub truncated: bool,
    pub timed_out: bool,
}

pub struct DiskSizeSampler {
    exclude: Vec<PathBuf>,
    max_entries: Option<usize>,
    deadline: Option<Instant>,
    pending: Vec<PathBuf>,
    current: Option<(PathBuf, ReadDir)>,
    stats: ScanStats,
}

impl DiskSizeSampler {
    pub fn new(config: DiskScanConfig) -> Result<Self> {
        if !config.root.exists() {
            return Err(Error::MissingPath(config.root));
        }
        if !config.root.is_dir() {
            return Err(Error::NotADirectory(config.root));
        }

        let root = std::path::absolute(&config.root)?;
        let exclude = config
            .exclude_prefixes
            .iter()
            .map(std::path::absolute)
            .collect::<io::Result<Vec<_>>>()?;

        debug!(
            "Scanning {} (excluded prefixes: {}, max entries: {:?})",
            root.display(),
            exclude.len(),
            config.max_entries
        );

        Ok(Self {
            exclude,
            max_entries: config.max_entries,
            deadline: config.time_limit.map(|limit| Instant::now() + limit),
            pending: vec![root],
            current: None,
            stats: ScanStats::default(),
        })
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Drain the walk, keeping only the sampled sizes
    pub fn collect_sizes(&mut self) -> Vec<u64> {
        let mut sizes = Vec::new();
        for entry in self.by_ref() {
            match entry {
                ScanEntry::Size { bytes, .. } => sizes.push(bytes),
                ScanEntry::Skipped { path, reason } => {
                    trace!("Skipped {}: {:?}", path.display(), reason)
                }
            }
        }

        let stats = self.stats;
        info!(
            "Disk scan sampled {} files ({} skipped, {} excluded subtrees)",
            stats.sampled, stats.skipped, stats.excluded
        );
        if stats.timed_out {
            warn!("Disk scan stopped at its time limit, sizes are partial");
        }
        sizes
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.iter().any(|prefix| path.starts_with(prefix))
    }

    fn limit_reached(&mut self) -> bool {
        if self.stats.truncated || self.stats.timed_out {
            return true;
        }
        if self.max_entries.is_some_and(|max| self.stats.sampled >= max) {
            self.stats.truncated = true;
            return true;
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            self.stats.timed_out = true;
            return true;
        }
        false
    }

    fn skip(&mut self, path: PathBuf, reason: SkipReason) -> ScanEntry {
        match reason {
            SkipReason::Excluded => self.stats.excluded += 1,
            _ => self.stats.skipped += 1,
        }
        ScanEntry::Skipped { path, reason }
    }

    fn open_dir(&mut self, dir: PathBuf) -> Option<ScanEntry> {
        if self.is_excluded(&dir) {
            return Some(self.skip(dir, SkipReason::Excluded));
        }
        match fs::read_dir(&dir) {
            Ok(entries) => {
                self.current = Some((dir, entries));
                None
            }
            Err(err) => Some(self.skip(dir, SkipReason::Io(err.kind()))),
        }
    }

    fn visit(&mut self, entry: DirEntry) -> Option<ScanEntry> {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) => return Some(self.skip(path, SkipReason::Io(err.kind()))),
        };

        if file_type.is_dir() {
            self.pending.push(path);
            return None;
        }

        // Symlinked files count with their target's size; symlinked dirs are not followed
        let metadata = if file_type.is_symlink() {
            fs::metadata(&path)
        } else {
            entry.metadata()
        };

        Some(match metadata {
            Ok(meta) if meta.is_file() => {
                self.stats.sampled += 1;
                ScanEntry::Size {
                    path,
                    bytes: meta.len(),
                }
            }
            Ok(_) => self.skip(path, SkipReason::NotRegularFile),
            Err(err) => self.skip(path, SkipReason::Io(err.kind())),
        })
    }
}

impl Iterator for DiskSizeSampler {
    type Item = ScanEntry;

    fn next(&mut self) -> Option<ScanEntry> {
        loop {
            if self.limit_reached() {
                self.current = None;
                self.pending.clear();
                return None;
            }

            if self.current.is_none() {
                let dir = self.pending.pop()?;
                if let Some(entry) = self.open_dir(dir) {
                    return Some(entry);
                }
                continue;
            }

            let next = self
                .current
                .as_mut()
                .and_then(|(_, entries)| entries.next());
            match next {
                None => self.current = None,
                Some(Err(err)) => {
                    let dir = self
                        .current
                        .as_ref()
                        .map(|(dir, _)| dir.clone())
                        .unwrap_or_default();
                    return Some(self.skip(dir, SkipReason::Io(err.kind())));
                }
                Some(Ok(entry)) => {
                    if let Some(scanned) = self.visit(entry) {
                        return Some(scanned);
                    }
                }
            }
        }
    }
}
