//! Batch Processing Module
//!
//! File collection and result bookkeeping for directory conversions.

use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Regular files under `dir` with one of `extensions`, sorted by path.
pub fn collect_files(dir: &Path, extensions: &[&str], recursive: bool) -> Vec<PathBuf> {
    let walker = if recursive {
        WalkDir::new(dir).follow_links(true)
    } else {
        WalkDir::new(dir).max_depth(1)
    };

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| has_extension(e.path(), extensions))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResult<T> {
    pub succeeded: Vec<T>,
    pub skipped: Vec<PathBuf>,
    pub errors: Vec<(PathBuf, String)>,
}

impl<T> BatchResult<T> {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            skipped: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn success(&mut self, item: T) {
        self.succeeded.push(item);
    }

    pub fn fail(&mut self, path: PathBuf, error: String) {
        self.errors.push((path, error));
    }

    pub fn skip(&mut self, path: PathBuf) {
        self.skipped.push(path);
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.skipped.len() + self.errors.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            100.0
        } else {
            (self.succeeded.len() as f64 / self.total() as f64) * 100.0
        }
    }
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        Self::new()
    }
}
