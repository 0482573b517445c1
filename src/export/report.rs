use crate::error::Result;
use crate::export::tree_copier::ExportProgress;
use crate::preprocess::EnabledSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const METADATA_DIR: &str = ".svexport";
const NOTICE_FILE: &str = "GENERATED_EXPORT.md";

/// What an export run did, persisted alongside the exported tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    pub project_name: String,
    pub config_source: String,
    pub export_time: DateTime<Utc>,
    pub tool_version: String,
    pub enabled_options: Vec<String>,
    pub summary: ExportSummary,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSummary {
    pub total_files_processed: usize,
    pub hdl_files_stripped: usize,
    pub total_lines_removed: usize,
    pub total_bytes: u64,
    pub duration_ms: u64,
}

impl ExportReport {
    pub fn new(
        project_name: String,
        config_source: String,
        enabled: &EnabledSet,
        hdl_files_stripped: usize,
        progress: &ExportProgress,
    ) -> Self {
        Self {
            project_name,
            config_source,
            export_time: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            enabled_options: enabled.names_in_order().to_vec(),
            summary: ExportSummary {
                total_files_processed: progress.files_processed,
                hdl_files_stripped,
                total_lines_removed: progress.lines_removed,
                total_bytes: progress.bytes_processed,
                duration_ms: progress.elapsed().as_millis() as u64,
            },
            errors: progress.errors.clone(),
        }
    }
}

/// Writes the report files and the generated-export notice into an export
/// directory.
pub struct ExportManager {
    export_root: PathBuf,
}

impl ExportManager {
    pub fn new<P: AsRef<Path>>(export_root: P) -> Self {
        Self {
            export_root: export_root.as_ref().to_path_buf(),
        }
    }

    fn metadata_dir(&self) -> PathBuf {
        self.export_root.join(METADATA_DIR)
    }

    pub fn save_report(&self, report: &ExportReport) -> Result<PathBuf> {
        let metadata_dir = self.metadata_dir();
        fs::create_dir_all(&metadata_dir)?;

        let json_path = metadata_dir.join("export_report.json");
        let json = serde_json::to_string_pretty(report).map_err(|e| {
            crate::error::SvExportError::Config {
                message: format!("Failed to serialize export report: {}", e),
            }
        })?;
        fs::write(&json_path, json)?;

        let text_path = metadata_dir.join("export_report.txt");
        fs::write(&text_path, self.render_text_report(report))?;

        Ok(json_path)
    }

    fn render_text_report(&self, report: &ExportReport) -> String {
        let mut out = String::new();

        out.push_str("SvExport Report\n");
        out.push_str("===============\n\n");
        out.push_str(&format!("Project:       {}\n", report.project_name));
        out.push_str(&format!("Config source: {}\n", report.config_source));
        out.push_str(&format!(
            "Exported:      {}\n",
            report.export_time.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        out.push_str(&format!("Tool version:  {}\n\n", report.tool_version));

        out.push_str(&format!(
            "Files copied:   {}\n",
            report.summary.total_files_processed
        ));
        out.push_str(&format!(
            "HDL stripped:   {}\n",
            report.summary.hdl_files_stripped
        ));
        out.push_str(&format!(
            "Lines removed:  {}\n\n",
            report.summary.total_lines_removed
        ));

        if report.enabled_options.is_empty() {
            out.push_str("No configuration options enabled.\n");
        } else {
            out.push_str("Enabled options:\n");
            for name in &report.enabled_options {
                out.push_str(&format!("  {}\n", name));
            }
        }

        if !report.errors.is_empty() {
            out.push_str("\nIssues:\n");
            for error in &report.errors {
                out.push_str(&format!("  - {}\n", error));
            }
        }

        out
    }

    /// Drop a notice at the export root so nobody edits the generated tree
    /// thinking it is the configurable original.
    pub fn write_notice_file(&self, report: &ExportReport) -> Result<PathBuf> {
        let path = self.export_root.join(NOTICE_FILE);

        let mut content = String::new();
        content.push_str("# Generated export\n\n");
        content.push_str(&format!(
            "This tree was exported from `{}` on {} with svexport {}.\n",
            report.project_name,
            report.export_time.format("%Y-%m-%d"),
            report.tool_version
        ));
        content.push_str(
            "All configuration switches have been resolved; edit the original \
             project instead of this copy.\n\n",
        );

        if report.enabled_options.is_empty() {
            content.push_str("No configuration options were enabled.\n");
        } else {
            content.push_str("Enabled configuration options:\n\n");
            for name in &report.enabled_options {
                content.push_str(&format!("- `{}`\n", name));
            }
        }

        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn load_report(&self) -> Result<ExportReport> {
        let json_path = self.metadata_dir().join("export_report.json");
        let content = fs::read_to_string(&json_path)?;

        serde_json::from_str(&content).map_err(|e| crate::error::SvExportError::Config {
            message: format!(
                "Failed to parse export report {}: {}",
                json_path.display(),
                e
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_report() -> ExportReport {
        let enabled = EnabledSet::from_names(["RVC", "MUL"]);
        let mut progress = ExportProgress::new(2);
        progress.record_file(Path::new("rtl/core.sv"), 100);
        progress.lines_removed = 42;

        ExportReport::new(
            "littleRISCV".to_string(),
            "include/riscv_config.sv".to_string(),
            &enabled,
            1,
            &progress,
        )
    }

    #[test]
    fn test_report_round_trip() {
        let dir = TempDir::new().unwrap();
        let manager = ExportManager::new(dir.path());

        let report = sample_report();
        let json_path = manager.save_report(&report).unwrap();
        assert!(json_path.exists());
        assert!(dir.path().join(".svexport/export_report.txt").exists());

        let loaded = manager.load_report().unwrap();
        assert_eq!(loaded.project_name, "littleRISCV");
        assert_eq!(loaded.enabled_options, vec!["RVC", "MUL"]);
        assert_eq!(loaded.summary.total_lines_removed, 42);
    }

    #[test]
    fn test_notice_file_lists_options() {
        let dir = TempDir::new().unwrap();
        let manager = ExportManager::new(dir.path());

        let path = manager.write_notice_file(&sample_report()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();

        assert!(content.contains("Generated export"));
        assert!(content.contains("`RVC`"));
        assert!(content.contains("`MUL`"));
    }

    #[test]
    fn test_text_report_mentions_counts() {
        let dir = TempDir::new().unwrap();
        let manager = ExportManager::new(dir.path());

        let text = manager.render_text_report(&sample_report());
        assert!(text.contains("Lines removed:  42"));
        assert!(text.contains("littleRISCV"));
    }
}
