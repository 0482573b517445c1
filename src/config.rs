use crate::error::{Result, SvExportError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub filters: FilterConfig,
    pub output: OutputConfig,
    pub synthesis: SynthesisConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    pub extensions: Vec<String>,
    pub max_file_size: u64,
    pub exclude_dirs: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Path of the configuration source, relative to the project root.
    pub config_path: PathBuf,
    /// Write a generated-export notice file listing the enabled options.
    pub notice_file: bool,
    pub generate_report: bool,
    /// Package the export into a .tar.gz and remove the directory.
    pub archive: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SynthesisConfig {
    /// Synthesis entry script, relative to the project root.
    pub script: PathBuf,
    /// Where per-configuration synthesis results are collected, relative to
    /// the project root.
    pub results_dir: PathBuf,
    /// Sample configurations for the batch flows, relative to the project
    /// root.
    pub example_configs_dir: PathBuf,
    /// Subdirectory of a result tree holding the report files.
    pub report_dir: PathBuf,
    /// Filename pattern selecting area reports inside the report directory.
    pub report_pattern: String,
    /// Hierarchical cell whose area line is scraped from the report.
    pub area_cell: String,
    /// Raw cell area is divided by this factor (gate area times 1000).
    pub gate_divisor: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filters: FilterConfig::default(),
            output: OutputConfig::default(),
            synthesis: SynthesisConfig::default(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["sv".to_string(), "svh".to_string(), "v".to_string()],
            max_file_size: 10 * 1024 * 1024, // 10MB
            exclude_dirs: vec![
                ".git".to_string(),
                "scripts".to_string(),
                "docs".to_string(),
            ],
            exclude_patterns: vec![r".*\.bak".to_string()],
            max_depth: 10,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("include/riscv_config.sv"),
            notice_file: true,
            generate_report: true,
            archive: false,
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            script: PathBuf::from("../../../synopsys/start_synopsys_synth.py"),
            results_dir: PathBuf::from("scripts/synthesis_results"),
            example_configs_dir: PathBuf::from("scripts/example_configs"),
            report_dir: PathBuf::from("reports"),
            report_pattern: r".*_area.*".to_string(),
            area_cell: "pulpino_i/core_region_i/RISCV_CORE".to_string(),
            gate_divisor: 1.44 * 1000.0,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SvExportError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SvExportError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| SvExportError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["svexport.toml", "svexport.config.toml", ".svexport.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref formats) = cli_args.formats {
            self.filters.extensions = formats
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(ref exclude) = cli_args.exclude {
            self.filters.exclude_dirs.extend(exclude.clone());
        }

        if let Some(max_size) = cli_args.max_file_size {
            self.filters.max_file_size = max_size;
        }

        if let Some(ref config_path) = cli_args.config_path {
            self.output.config_path = config_path.clone();
        }

        if let Some(archive) = cli_args.archive {
            self.output.archive = archive;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| SvExportError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| SvExportError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.filters.extensions.is_empty() {
            return Err(SvExportError::Config {
                message: "At least one file extension must be specified".to_string(),
            });
        }

        if self.filters.max_file_size == 0 {
            return Err(SvExportError::Config {
                message: "Maximum file size must be greater than 0".to_string(),
            });
        }

        if self.filters.max_depth == 0 {
            return Err(SvExportError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        if self.output.config_path.as_os_str().is_empty() {
            return Err(SvExportError::Config {
                message: "Configuration source path must not be empty".to_string(),
            });
        }

        if self.output.config_path.is_absolute() {
            return Err(SvExportError::Config {
                message: "Configuration source path must be relative to the project root"
                    .to_string(),
            });
        }

        if self.synthesis.gate_divisor <= 0.0 {
            return Err(SvExportError::Config {
                message: "Gate divisor must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub formats: Option<String>,
    pub exclude: Option<Vec<String>>,
    pub max_file_size: Option<u64>,
    pub config_path: Option<PathBuf>,
    pub archive: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formats(mut self, formats: Option<String>) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_exclude(mut self, exclude: Option<Vec<String>>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_max_file_size(mut self, max_size: Option<u64>) -> Self {
        self.max_file_size = max_size;
        self
    }

    pub fn with_config_path(mut self, config_path: Option<PathBuf>) -> Self {
        self.config_path = config_path;
        self
    }

    pub fn with_archive(mut self, archive: Option<bool>) -> Self {
        self.archive = archive;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.filters.extensions.contains(&"sv".to_string()));
        assert_eq!(
            config.output.config_path,
            PathBuf::from("include/riscv_config.sv")
        );
        assert!((config.synthesis.gate_divisor - 1440.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.filters.extensions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_absolute_config_path_rejected() {
        let mut config = Config::default();
        config.output.config_path = PathBuf::from("/etc/riscv_config.sv");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let config = Config::default();
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(
            config.output.config_path,
            loaded_config.output.config_path
        );
        assert_eq!(config.filters.extensions, loaded_config.filters.extensions);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_formats(Some("sv,vhd".to_string()))
            .with_archive(Some(true))
            .with_config_path(Some(PathBuf::from("cfg/core_config.sv")));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.filters.extensions, vec!["sv", "vhd"]);
        assert!(config.output.archive);
        assert_eq!(config.output.config_path, PathBuf::from("cfg/core_config.sv"));
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(!sample.is_empty());
        assert!(sample.contains("[filters]"));
        assert!(sample.contains("[output]"));
        assert!(sample.contains("[synthesis]"));
    }
}
