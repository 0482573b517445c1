use crate::error::{Result, SvExportError};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::path::{Path, PathBuf};

/// Pack an export directory into `<dir>.tar.gz` next to it and remove the
/// directory afterwards. Returns the archive path.
pub fn archive_directory(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(SvExportError::InvalidPath {
            path: dir.display().to_string(),
        });
    }

    let dir_name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SvExportError::InvalidPath {
            path: dir.display().to_string(),
        })?;

    let archive_path = dir.with_extension("tar.gz");

    let tar_gz = fs::File::create(&archive_path)?;
    let encoder = GzEncoder::new(tar_gz, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    // Entries keep the export directory name as their top-level prefix.
    builder.append_dir_all(dir_name, dir)?;

    let encoder = builder.into_inner()?;
    encoder.finish()?;

    fs::remove_dir_all(dir)?;

    Ok(archive_path)
}
