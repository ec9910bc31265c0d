//! Dataset loading.
//!
//! Discovers sales CSV files under a path and parses them into a single
//! read-only [`Dataset`]. Dates are parsed here, once; the engine never
//! looks at date text.

pub mod parser;

use crate::error::LoadError;
use crate::models::{Dataset, Record};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use parser::parse_file;

/// Configuration for dataset loading.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// File extensions to include when loading a directory (e.g., ["csv"])
    pub extensions: Vec<String>,
    /// `chrono` format string for the `Date` column
    pub date_format: String,
    /// Skip malformed rows instead of failing the whole load
    pub skip_invalid_rows: bool,
    /// Show a progress bar while loading several files
    pub show_progress: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["csv".to_string()],
            date_format: "%Y-%m-%d".to_string(),
            skip_invalid_rows: false,
            show_progress: false,
        }
    }
}

impl From<&crate::config::DataConfig> for LoadConfig {
    fn from(config: &crate::config::DataConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            date_format: config.date_format.clone(),
            skip_invalid_rows: config.skip_invalid_rows,
            show_progress: false,
        }
    }
}

/// A loaded dataset plus bookkeeping about how it was read.
#[derive(Debug)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub files_read: usize,
    pub rows_read: usize,
    pub rows_skipped: usize,
}

/// Loads sales records from a file or a directory of files.
pub struct DatasetLoader {
    config: LoadConfig,
}

impl DatasetLoader {
    pub fn new(config: LoadConfig) -> Self {
        Self { config }
    }

    /// Load every matching file under `path` into one dataset.
    ///
    /// Records keep file order (sorted by path) and row order within a file.
    pub fn load(&self, path: &Path) -> Result<LoadedDataset, LoadError> {
        let files = self.discover(path)?;
        if files.is_empty() {
            return Err(LoadError::NoInputFiles(path.to_path_buf()));
        }

        info!("Loading {} data file(s) from {}", files.len(), path.display());

        let progress = self.progress_bar(files.len());
        let mut records: Vec<Record> = Vec::new();
        let mut rows_read = 0;
        let mut rows_skipped = 0;

        for file in &files {
            if let Some(ref pb) = progress {
                pb.set_message(file.display().to_string());
            }

            let outcome = parse_file(file, &self.config)?;
            debug!(
                "{}: {} rows, {} skipped",
                file.display(),
                outcome.rows_read,
                outcome.rows_skipped
            );

            rows_read += outcome.rows_read;
            rows_skipped += outcome.rows_skipped;
            records.extend(outcome.records);

            if let Some(ref pb) = progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        Ok(LoadedDataset {
            dataset: Dataset::new(records),
            files_read: files.len(),
            rows_read,
            rows_skipped,
        })
    }

    /// Resolve `path` to the list of files to load.
    pub fn discover(&self, path: &Path) -> Result<Vec<PathBuf>, LoadError> {
        let metadata = fs::metadata(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if metadata.is_file() {
            return Ok(vec![path.to_path_buf()]);
        }

        let mut files = Vec::new();
        self.walk_dir(path, &mut files)?;
        files.sort();
        Ok(files)
    }

    /// Check if a file has one of the configured extensions.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                self.config
                    .extensions
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Walk directory recursively.
    fn walk_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), LoadError> {
        let entries = fs::read_dir(dir).map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();

            // Hidden files and directories
            if name.starts_with('.') {
                continue;
            }

            if path.is_dir() {
                self.walk_dir(&path, files)?;
            } else if path.is_file() && self.matches(&path) {
                files.push(path);
            }
        }

        Ok(())
    }

    fn progress_bar(&self, file_count: usize) -> Option<ProgressBar> {
        if !self.config.show_progress || file_count < 2 {
            return None;
        }

        let pb = ProgressBar::new(file_count as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|s| s.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        Some(pb)
    }
}
