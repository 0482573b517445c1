use crate::config::SynthesisConfig;
use crate::error::{Result, SvExportError};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Drives the external synthesis flow and collects its outputs.
///
/// The flow itself lives outside this tool: a vendor script is launched from
/// the project's `scripts` directory and leaves its reports next to itself.
/// After a run the report tree is copied under the results directory, keyed
/// by configuration name, so several configurations can be compared later.
pub struct SynthesisRunner {
    project_root: PathBuf,
    config: SynthesisConfig,
}

impl SynthesisRunner {
    pub fn new<P: AsRef<Path>>(project_root: P, config: SynthesisConfig) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
            config,
        }
    }

    fn scripts_dir(&self) -> PathBuf {
        self.project_root.join("scripts")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.project_root.join(&self.config.results_dir)
    }

    pub fn result_dir_for(&self, name: &str) -> PathBuf {
        self.results_dir().join(name)
    }

    /// Sample configuration files shipped with the project, sorted by name.
    pub fn example_configs(&self) -> Result<Vec<PathBuf>> {
        let dir = self.project_root.join(&self.config.example_configs_dir);

        if !dir.is_dir() {
            return Err(SvExportError::InvalidPath {
                path: dir.display().to_string(),
            });
        }

        let mut configs = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                configs.push(entry.path());
            }
        }

        configs.sort();
        Ok(configs)
    }

    /// Run the synthesis script and collect its reports under the given
    /// configuration name.
    pub fn synthesize(&self, name: &str) -> Result<PathBuf> {
        let scripts_dir = self.scripts_dir();

        if !scripts_dir.is_dir() {
            return Err(SvExportError::Synthesis {
                message: format!(
                    "Project has no scripts directory: {}",
                    scripts_dir.display()
                ),
            });
        }

        let status = Command::new("python")
            .arg(&self.config.script)
            .current_dir(&scripts_dir)
            .status()
            .map_err(|e| SvExportError::Synthesis {
                message: format!(
                    "Failed to launch synthesis script {}: {}",
                    self.config.script.display(),
                    e
                ),
            })?;

        if !status.success() {
            return Err(SvExportError::Synthesis {
                message: format!(
                    "Synthesis script {} exited with {}",
                    self.config.script.display(),
                    status
                ),
            });
        }

        self.collect_reports(name)
    }

    /// Copy the report tree a synthesis run left behind into the results
    /// directory. Separated from [`synthesize`](Self::synthesize) so results
    /// produced out of band can still be filed.
    pub fn collect_reports(&self, name: &str) -> Result<PathBuf> {
        // The script resolves relative to the scripts directory, and its
        // report output lands next to it.
        let script_dir = self
            .scripts_dir()
            .join(&self.config.script)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.scripts_dir());

        let source = script_dir.join(&self.config.report_dir);

        if !source.is_dir() {
            return Err(SvExportError::Synthesis {
                message: format!("No synthesis reports found at {}", source.display()),
            });
        }

        let dest = self.result_dir_for(name).join(&self.config.report_dir);
        if dest.exists() {
            fs::remove_dir_all(&dest)?;
        }
        copy_dir(&source, &dest)?;

        Ok(self.result_dir_for(name))
    }

    /// Names of configurations that already have collected results.
    pub fn synthesized_configs(&self) -> Result<Vec<String>> {
        let results = self.results_dir();

        if !results.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&results)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

fn copy_dir(source: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)?;

    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn runner_in(root: &Path) -> SynthesisRunner {
        SynthesisRunner::new(root, SynthesisConfig::default())
    }

    #[test]
    fn test_example_configs_sorted() {
        let temp = TempDir::new().unwrap();
        let configs = temp.path().join("scripts/example_configs");
        fs::create_dir_all(&configs).unwrap();
        fs::write(configs.join("small.sv"), "// small\n").unwrap();
        fs::write(configs.join("full.sv"), "// full\n").unwrap();

        let runner = runner_in(temp.path());
        let found = runner.example_configs().unwrap();

        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["full.sv", "small.sv"]);
    }

    #[test]
    fn test_missing_example_configs_dir() {
        let temp = TempDir::new().unwrap();
        let runner = runner_in(temp.path());

        assert!(matches!(
            runner.example_configs(),
            Err(SvExportError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_synthesized_configs_lists_result_dirs() {
        let temp = TempDir::new().unwrap();
        let results = temp.path().join("scripts/synthesis_results");
        fs::create_dir_all(results.join("small")).unwrap();
        fs::create_dir_all(results.join("custom")).unwrap();
        fs::write(results.join("notes.txt"), "not a config\n").unwrap();

        let runner = runner_in(temp.path());
        let names = runner.synthesized_configs().unwrap();

        assert_eq!(names, vec!["custom", "small"]);
    }

    #[test]
    fn test_synthesized_configs_empty_without_results() {
        let temp = TempDir::new().unwrap();
        let runner = runner_in(temp.path());
        assert!(runner.synthesized_configs().unwrap().is_empty());
    }

    #[test]
    fn test_collect_reports_copies_tree() {
        let temp = TempDir::new().unwrap();

        let config = SynthesisConfig {
            script: PathBuf::from("flow/run_synth.py"),
            ..SynthesisConfig::default()
        };

        // Emulate what a finished synthesis run leaves behind next to the
        // vendor script.
        let reports = temp.path().join("scripts/flow/reports");
        fs::create_dir_all(&reports).unwrap();
        fs::write(reports.join("core_area.rpt"), "area data\n").unwrap();

        let runner = SynthesisRunner::new(temp.path(), config);
        let dest = runner.collect_reports("custom").unwrap();

        assert!(dest.join("reports/core_area.rpt").exists());
        assert!(dest.ends_with("scripts/synthesis_results/custom"));
    }
}
