use crate::config::SynthesisConfig;
use crate::error::{Result, SvExportError};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Area figure scraped from one configuration's synthesis reports.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaFigure {
    pub config_name: String,
    pub report_file: PathBuf,
    pub raw_area: f64,
    pub kilo_gates: f64,
}

/// Pulls the core's cell area out of synthesis report files.
///
/// Area reports list one hierarchical cell per line, the cell path followed
/// by its absolute area. The line for the configured core cell is matched and
/// the area converted to kilo gate equivalents using the configured divisor.
pub struct ReportScraper {
    file_pattern: Regex,
    area_line: Regex,
    gate_divisor: f64,
}

impl ReportScraper {
    pub fn new(config: &SynthesisConfig) -> Result<Self> {
        let file_pattern =
            Regex::new(&config.report_pattern).map_err(|e| SvExportError::Config {
                message: format!(
                    "Invalid report filename pattern '{}': {}",
                    config.report_pattern, e
                ),
            })?;

        let area_line = Regex::new(&format!(
            r"^{}\s+(\d+)\s+.*$",
            regex::escape(&config.area_cell)
        ))
        .map_err(|e| SvExportError::Config {
            message: format!("Invalid area cell '{}': {}", config.area_cell, e),
        })?;

        Ok(Self {
            file_pattern,
            area_line,
            gate_divisor: config.gate_divisor,
        })
    }

    /// Scrape the area figure for one collected result directory.
    pub fn scrape(&self, result_dir: &Path, report_subdir: &Path) -> Result<AreaFigure> {
        let config_name = result_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let report_dir = result_dir.join(report_subdir);

        if !report_dir.is_dir() {
            return Err(SvExportError::ReportParse {
                path: report_dir.display().to_string(),
            });
        }

        let mut report_files: Vec<PathBuf> = fs::read_dir(&report_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| self.file_pattern.is_match(n))
            })
            .collect();
        report_files.sort();

        for report_file in report_files {
            if let Some(raw_area) = self.scan_report(&report_file)? {
                return Ok(AreaFigure {
                    config_name,
                    kilo_gates: raw_area / self.gate_divisor,
                    raw_area,
                    report_file,
                });
            }
        }

        Err(SvExportError::ReportParse {
            path: report_dir.display().to_string(),
        })
    }

    fn scan_report(&self, path: &Path) -> Result<Option<f64>> {
        let content = fs::read_to_string(path)?;

        for line in content.lines() {
            if let Some(caps) = self.area_line.captures(line) {
                if let Ok(area) = caps[1].parse::<f64>() {
                    return Ok(Some(area));
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn scraper() -> ReportScraper {
        ReportScraper::new(&SynthesisConfig::default()).unwrap()
    }

    fn write_result(root: &Path, name: &str, report: &str) -> PathBuf {
        let result_dir = root.join(name);
        let reports = result_dir.join("reports");
        fs::create_dir_all(&reports).unwrap();
        fs::write(reports.join("core_area.rpt"), report).unwrap();
        result_dir
    }

    #[test]
    fn test_scrapes_area_line() {
        let temp = TempDir::new().unwrap();
        let result_dir = write_result(
            temp.path(),
            "small",
            "Hierarchical cell areas\n\
             pulpino_i/core_region_i/RISCV_CORE   144000   0.53  riscv_core\n\
             pulpino_i/core_region_i/OTHER        99      0.01  other\n",
        );

        let figure = scraper()
            .scrape(&result_dir, Path::new("reports"))
            .unwrap();

        assert_eq!(figure.config_name, "small");
        assert!((figure.raw_area - 144000.0).abs() < f64::EPSILON);
        assert!((figure.kilo_gates - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_ignores_non_matching_report_files() {
        let temp = TempDir::new().unwrap();
        let result_dir = temp.path().join("custom");
        let reports = result_dir.join("reports");
        fs::create_dir_all(&reports).unwrap();
        fs::write(
            reports.join("timing.rpt"),
            "pulpino_i/core_region_i/RISCV_CORE   144000   x\n",
        )
        .unwrap();

        // The area figure only comes from files whose names match the
        // configured pattern.
        let result = scraper().scrape(&result_dir, Path::new("reports"));
        assert!(matches!(result, Err(SvExportError::ReportParse { .. })));
    }

    #[test]
    fn test_missing_report_dir() {
        let temp = TempDir::new().unwrap();
        let result_dir = temp.path().join("empty");
        fs::create_dir_all(&result_dir).unwrap();

        let result = scraper().scrape(&result_dir, Path::new("reports"));
        assert!(matches!(result, Err(SvExportError::ReportParse { .. })));
    }

    #[test]
    fn test_report_without_area_line() {
        let temp = TempDir::new().unwrap();
        let result_dir = write_result(temp.path(), "broken", "no area data here\n");

        let result = scraper().scrape(&result_dir, Path::new("reports"));
        assert!(matches!(result, Err(SvExportError::ReportParse { .. })));
    }
}
