use crate::config::FilterConfig;
use crate::error::{Result, SvExportError};
use crate::scanner::FileFilter;
use filetime::FileTime;
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::{Duration, Instant};
use walkdir::{DirEntry, WalkDir};

/// Running totals for an export, shared by the copy and strip phases.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    pub files_processed: usize,
    pub total_files: usize,
    pub bytes_processed: u64,
    pub lines_removed: usize,
    pub current_file: Option<String>,
    pub start_time: Instant,
    pub errors: Vec<String>,
}

impl ExportProgress {
    pub fn new(total_files: usize) -> Self {
        Self {
            files_processed: 0,
            total_files,
            bytes_processed: 0,
            lines_removed: 0,
            current_file: None,
            start_time: Instant::now(),
            errors: Vec::new(),
        }
    }

    pub fn record_file(&mut self, path: &Path, bytes: u64) {
        self.files_processed += 1;
        self.bytes_processed += bytes;
        self.current_file = Some(path.display().to_string());
    }

    pub fn record_error(&mut self, message: String) {
        self.errors.push(message);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for ExportProgress {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Mirrors a project tree into the export directory, keeping timestamps.
///
/// Every file survives the copy, HDL or not; only excluded directories
/// (version control, scripts, build output) are left behind. Resolving the
/// configuration regions happens afterwards, in place, on the copy.
pub struct TreeCopier {
    filter: FileFilter,
    max_depth: usize,
    preserve_timestamps: bool,
}

impl TreeCopier {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            filter: FileFilter::new(config),
            max_depth: config.max_depth,
            preserve_timestamps: true,
        }
    }

    /// Fail early when the destination already holds something, unless the
    /// caller asked to overwrite.
    pub fn validate_destination(&self, dest: &Path, force: bool) -> Result<()> {
        if dest.exists() {
            let mut entries = fs::read_dir(dest)?;
            if entries.next().is_some() && !force {
                return Err(SvExportError::OutputDirectoryExists {
                    path: dest.display().to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn copy_tree<F>(
        &self,
        source_root: &Path,
        dest_root: &Path,
        mut on_file: F,
    ) -> Result<ExportProgress>
    where
        F: FnMut(&ExportProgress) -> Result<()>,
    {
        if !source_root.is_dir() {
            return Err(SvExportError::InvalidPath {
                path: source_root.display().to_string(),
            });
        }

        fs::create_dir_all(dest_root)?;

        // Exporting into the project being copied would recurse.
        let source_canon = source_root.canonicalize()?;
        let dest_canon = dest_root.canonicalize()?;
        if dest_canon.starts_with(&source_canon) {
            return Err(SvExportError::InvalidPath {
                path: format!(
                    "Export destination {} lies inside the project tree",
                    dest_root.display()
                ),
            });
        }

        let mut progress = ExportProgress::new(0);

        let walker = WalkDir::new(source_root)
            .max_depth(self.max_depth)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.should_traverse(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    progress.record_error(format!("Copy scan error: {}", err));
                    continue;
                }
            };

            let relative = entry
                .path()
                .strip_prefix(source_root)
                .map_err(|_| SvExportError::InvalidPath {
                    path: entry.path().display().to_string(),
                })?;

            if relative.as_os_str().is_empty() {
                continue;
            }

            let dest_path = dest_root.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest_path)?;
                continue;
            }

            if !entry.file_type().is_file() {
                continue; // symlinks and specials are skipped
            }

            if self
                .filter
                .matches_any_pattern(&entry.path().to_string_lossy())
            {
                continue;
            }

            match self.copy_file(entry.path(), &dest_path) {
                Ok(bytes) => {
                    progress.record_file(relative, bytes);
                    on_file(&progress)?;
                }
                Err(err) => {
                    progress.record_error(format!(
                        "Failed to copy {}: {}",
                        relative.display(),
                        err
                    ));
                }
            }
        }

        progress.total_files = progress.files_processed;
        Ok(progress)
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        self.filter.should_traverse_directory(entry.path())
    }

    fn copy_file(&self, source: &Path, dest: &Path) -> Result<u64> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let metadata = fs::metadata(source)?;

        let mut reader = BufReader::new(fs::File::open(source)?);
        let mut writer = BufWriter::new(fs::File::create(dest)?);
        let bytes = std::io::copy(&mut reader, &mut writer)?;

        if self.preserve_timestamps {
            let mtime = FileTime::from_last_modification_time(&metadata);
            filetime::set_file_mtime(dest, mtime).ok();
        }

        Ok(bytes)
    }
}
