use crate::config::FilterConfig;
use regex::Regex;
use std::path::Path;

pub struct FileFilter {
    hdl_extensions: Vec<String>,
    max_file_size: u64,
    exclude_dirs: Vec<String>,
    exclude_patterns: Vec<Regex>,
}

impl FileFilter {
    pub fn new(config: &FilterConfig) -> Self {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        Self {
            hdl_extensions: config.extensions.clone(),
            max_file_size: config.max_file_size,
            exclude_dirs: config.exclude_dirs.clone(),
            exclude_patterns,
        }
    }

    /// True when the path looks like an HDL source the stripper should visit.
    pub fn is_hdl_source(&self, path: &Path) -> bool {
        if let Some(extension) = path.extension().and_then(|s| s.to_str()) {
            let ext_lower = extension.to_lowercase();
            if self.hdl_extensions.contains(&ext_lower) {
                return true;
            }
        }
        false
    }

    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        if let Some(dir_name) = path.file_name().and_then(|s| s.to_str()) {
            let dir_name_lower = dir_name.to_lowercase();

            if self
                .exclude_dirs
                .iter()
                .any(|exclude| exclude.to_lowercase() == dir_name_lower)
            {
                return false;
            }

            let path_str = path.to_string_lossy();
            for pattern in &self.exclude_patterns {
                if pattern.is_match(&path_str) {
                    return false;
                }
            }

            // Hidden directories never contain exportable sources.
            if dir_name.starts_with('.') && dir_name != "." && dir_name != ".." {
                return false;
            }

            // Common build/output directories.
            if matches!(
                dir_name_lower.as_str(),
                "target" | "build" | "dist" | "out" | "output" | "work" | "tmp" | "temp"
            ) {
                return false;
            }
        }

        true
    }

    pub fn is_size_allowed(&self, size: u64) -> bool {
        size <= self.max_file_size
    }

    pub fn get_extensions(&self) -> &Vec<String> {
        &self.hdl_extensions
    }

    pub fn matches_any_pattern(&self, text: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.is_match(text))
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        let config = FilterConfig::default();
        Self::new(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> FilterConfig {
        FilterConfig {
            extensions: vec!["sv".to_string(), "svh".to_string(), "v".to_string()],
            max_file_size: 1024 * 1024, // 1MB
            exclude_dirs: vec![
                ".git".to_string(),
                "scripts".to_string(),
                "docs".to_string(),
            ],
            exclude_patterns: vec![r".*\.bak".to_string()],
            max_depth: 10,
        }
    }

    #[test]
    fn test_hdl_source_detection() {
        let config = create_test_config();
        let filter = FileFilter::new(&config);

        assert!(filter.is_hdl_source(Path::new("riscv_core.sv")));
        assert!(filter.is_hdl_source(Path::new("include/riscv_config.svh")));
        assert!(filter.is_hdl_source(Path::new("legacy.v")));

        // Case insensitivity
        assert!(filter.is_hdl_source(Path::new("RISCV_CORE.SV")));

        // Non-HDL files
        assert!(!filter.is_hdl_source(Path::new("Makefile")));
        assert!(!filter.is_hdl_source(Path::new("README.md")));
        assert!(!filter.is_hdl_source(Path::new("wave.vcd")));
        assert!(!filter.is_hdl_source(Path::new("core"))); // no extension
    }

    #[test]
    fn test_directory_traversal_rules() {
        let config = create_test_config();
        let filter = FileFilter::new(&config);

        assert!(filter.should_traverse_directory(Path::new("rtl")));
        assert!(filter.should_traverse_directory(Path::new("include")));
        assert!(filter.should_traverse_directory(Path::new("tb")));

        assert!(!filter.should_traverse_directory(Path::new(".git")));
        assert!(!filter.should_traverse_directory(Path::new("scripts")));
        assert!(!filter.should_traverse_directory(Path::new("docs")));

        assert!(!filter.should_traverse_directory(Path::new("build")));
        assert!(!filter.should_traverse_directory(Path::new("work")));
        assert!(!filter.should_traverse_directory(Path::new(".github")));
    }

    #[test]
    fn test_size_limits() {
        let config = create_test_config();
        let filter = FileFilter::new(&config);

        assert!(filter.is_size_allowed(1024));
        assert!(filter.is_size_allowed(1024 * 1024));
        assert!(!filter.is_size_allowed(2 * 1024 * 1024));
    }

    #[test]
    fn test_pattern_matching() {
        let config = create_test_config();
        let filter = FileFilter::new(&config);

        assert!(filter.matches_any_pattern("riscv_config.sv.bak"));
        assert!(!filter.matches_any_pattern("riscv_config.sv"));
    }
}
