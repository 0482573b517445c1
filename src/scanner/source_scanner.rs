use crate::config::FilterConfig;
use crate::error::{Result, SvExportError};
use crate::scanner::file_filter::FileFilter;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::{DirEntry, WalkDir};

/// One HDL source file discovered in the project (or export) tree.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub filename: String,
    pub extension: String,
    pub size: u64,
    pub modified: SystemTime,
}

impl SourceFile {
    pub fn new(
        source_path: PathBuf,
        relative_path: PathBuf,
        size: u64,
        modified: SystemTime,
    ) -> Self {
        let filename = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        let extension = source_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        Self {
            source_path,
            relative_path,
            filename,
            extension,
            size,
            modified,
        }
    }

    pub fn display_path(&self) -> String {
        self.relative_path.display().to_string()
    }
}

/// Walks a project tree and collects the HDL sources the stripper will visit.
pub struct SourceScanner {
    filter: FileFilter,
    max_depth: usize,
}

impl SourceScanner {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            filter: FileFilter::new(config),
            max_depth: config.max_depth,
        }
    }

    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<Vec<SourceFile>> {
        let root_path = root.as_ref();

        if !root_path.exists() {
            return Err(SvExportError::InvalidPath {
                path: root_path.display().to_string(),
            });
        }

        if !root_path.is_dir() {
            return Err(SvExportError::InvalidPath {
                path: format!("{} is not a directory", root_path.display()),
            });
        }

        let mut sources = Vec::new();
        let mut scan_errors = Vec::new();

        let walker = WalkDir::new(root_path)
            .max_depth(self.max_depth)
            .follow_links(false) // Security: don't follow symlinks
            .into_iter()
            .filter_entry(|e| self.should_traverse(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err
                        .io_error()
                        .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
                    {
                        scan_errors.push(format!("Permission denied: {}", err));
                    } else {
                        scan_errors.push(format!("Scan error: {}", err));
                    }
                    continue;
                }
            };

            if entry.file_type().is_file() {
                match self.process_file(&entry, root_path) {
                    Ok(Some(source)) => sources.push(source),
                    Ok(None) => {} // File filtered out
                    Err(err) => {
                        scan_errors.push(format!(
                            "Error processing {}: {}",
                            entry.path().display(),
                            err
                        ));
                    }
                }
            }
        }

        if !scan_errors.is_empty() && sources.is_empty() {
            return Err(SvExportError::Permission {
                path: format!("Multiple scan errors: {}", scan_errors.join(", ")),
            });
        }

        if sources.is_empty() {
            return Err(SvExportError::NoSourcesFound {
                searched_extensions: self.filter.get_extensions().clone(),
            });
        }

        // Sort by relative path for deterministic processing order
        sources.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        Ok(sources)
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        if entry.depth() > self.max_depth {
            return false;
        }

        if entry.file_type().is_file() {
            return true;
        }

        if entry.depth() == 0 {
            return true;
        }

        if entry.file_type().is_dir() {
            return self.filter.should_traverse_directory(entry.path());
        }

        true
    }

    fn process_file(&self, entry: &DirEntry, root_path: &Path) -> Result<Option<SourceFile>> {
        let path = entry.path();

        if !self.filter.is_hdl_source(path) {
            return Ok(None);
        }

        let metadata = entry.metadata().map_err(|e| SvExportError::Io(e.into()))?;

        if !self.filter.is_size_allowed(metadata.len()) {
            return Ok(None);
        }

        let relative_path = self.calculate_relative_path(path, root_path)?;
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        let source = SourceFile::new(path.to_path_buf(), relative_path, metadata.len(), modified);

        Ok(Some(source))
    }

    fn calculate_relative_path(&self, file_path: &Path, root_path: &Path) -> Result<PathBuf> {
        let relative = file_path
            .strip_prefix(root_path)
            .map_err(|_| SvExportError::InvalidPath {
                path: format!(
                    "Cannot calculate relative path for {} from root {}",
                    file_path.display(),
                    root_path.display()
                ),
            })?;

        // Security: no parent directory references in relative paths
        if relative
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(SvExportError::InvalidPath {
                path: format!(
                    "Path contains parent directory references: {}",
                    relative.display()
                ),
            });
        }

        Ok(relative.to_path_buf())
    }

    pub fn get_statistics(&self, sources: &[SourceFile]) -> ScanStatistics {
        let total_files = sources.len();
        let total_size = sources.iter().map(|s| s.size).sum();

        let mut files_by_extension = std::collections::HashMap::new();
        for source in sources {
            *files_by_extension
                .entry(source.extension.clone())
                .or_insert(0) += 1;
        }

        ScanStatistics {
            total_files,
            total_size,
            files_by_extension,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
    pub files_by_extension: std::collections::HashMap<String, usize>,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan Results:\n  Total files: {}\n  Total size: {} bytes\n",
            self.total_files, self.total_size
        );

        if !self.files_by_extension.is_empty() {
            summary.push_str("  Files by type:\n");
            let mut extensions: Vec<_> = self.files_by_extension.iter().collect();
            extensions.sort_by(|a, b| b.1.cmp(a.1));

            for (ext, count) in extensions {
                summary.push_str(&format!("    {}: {} files\n", ext, count));
            }
        }

        summary
    }
}
