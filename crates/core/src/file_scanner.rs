//! Input discovery for batch runs
//!
//! Expands a mix of files and directories into a sorted list of image files.

use crate::error::{Error, Result};
use imagecraft_image::ImageFormat;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Image file scanner with configurable filters
#[derive(Debug, Clone)]
pub struct FileScanner {
    inputs: Vec<PathBuf>,
    extensions: Vec<String>,
    exclude_patterns: Vec<glob::Pattern>,
    max_depth: Option<usize>,
}

impl FileScanner {
    /// Scanner over the given files and directories, accepting every
    /// extension of a decodable format
    pub fn new<I, P>(inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let extensions = ImageFormat::ALL
            .iter()
            .filter(|f| f.is_encodable())
            .flat_map(|f| f.extensions().iter().map(|e| e.to_string()))
            .collect();
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            extensions,
            exclude_patterns: Vec::new(),
            max_depth: None,
        }
    }

    /// Restrict to these extensions (case-insensitive, without the dot)
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|s| s.to_ascii_lowercase()).collect();
        self
    }

    /// Skip paths matching any of these glob patterns
    pub fn exclude(mut self, patterns: &[impl AsRef<str>]) -> Result<Self> {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let compiled = glob::Pattern::new(pattern).map_err(|e| {
                Error::validation(format!("Invalid exclude pattern '{}': {}", pattern, e))
            })?;
            self.exclude_patterns.push(compiled);
        }
        Ok(self)
    }

    /// Limit directory recursion
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Scan and return matching files, sorted and deduplicated
    ///
    /// Files named explicitly are kept regardless of extension; only
    /// directory contents are filtered.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for input in &self.inputs {
            if input.is_file() {
                if !self.is_excluded(input) {
                    files.push(input.clone());
                }
                continue;
            }
            if !input.is_dir() {
                return Err(Error::file_not_found(input));
            }

            let mut walker = WalkDir::new(input).follow_links(false);
            if let Some(depth) = self.max_depth {
                walker = walker.max_depth(depth);
            }
            for entry in walker
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if entry.file_type().is_file() && self.has_image_extension(path) && !self.is_excluded(path) {
                    files.push(path.to_path_buf());
                }
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    fn has_image_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .is_some_and(|e| self.extensions.iter().any(|allowed| *allowed == e))
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.exclude_patterns.iter().any(|p| p.matches_path(path))
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.') && n != "." && n != "..")
        .unwrap_or(false)
}

/// Get file size in bytes
pub fn file_size(path: &Path) -> Result<u64> {
    Ok(std::fs::metadata(path)?.len())
}
