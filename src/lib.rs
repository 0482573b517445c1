pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod preprocess;
pub mod scanner;
pub mod synth;
pub mod ui;

use crate::config::Config;
use crate::error::{Result, SvExportError};
use crate::export::report::{ExportManager, ExportReport};
use crate::export::tree_copier::{ExportProgress, TreeCopier};
use crate::preprocess::{ConfigExtractor, DirectiveStripper, EnabledSet};
use crate::scanner::{ScanStatistics, SourceFile, SourceScanner};
use crate::synth::{ReportScraper, SynthesisRunner};
use crate::ui::progress::{finish_progress_with_summary, update_file_progress};
use crate::ui::{GracefulShutdown, OutputFormatter, ProgressManager};
use std::fs;
use std::path::{Path, PathBuf};

/// Name under which a synthesis of the current configuration is filed.
const CUSTOM_CONFIG_NAME: &str = "custom";

/// The complete export pipeline for one core project.
///
/// Holds the project root, the merged configuration, and the UI plumbing.
/// Each public method is one CLI action; several can run in sequence on the
/// same instance (overwrite the configuration, then export, then synthesize).
pub struct SvExport {
    project_root: PathBuf,
    config: Config,
    output: OutputFormatter,
    progress: ProgressManager,
    shutdown: GracefulShutdown,
}

impl SvExport {
    pub fn new(
        project_root: PathBuf,
        config: Config,
        output: OutputFormatter,
        progress: ProgressManager,
        shutdown: GracefulShutdown,
    ) -> Result<Self> {
        if !project_root.is_dir() {
            return Err(SvExportError::InvalidPath {
                path: project_root.display().to_string(),
            });
        }

        Ok(Self {
            project_root,
            config,
            output,
            progress,
            shutdown,
        })
    }

    pub fn project_name(&self) -> String {
        self.project_root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("project")
            .to_string()
    }

    fn config_source_path(&self) -> PathBuf {
        self.project_root.join(&self.config.output.config_path)
    }

    /// Parse the project's configuration source into the enabled-option set.
    pub fn read_enabled_set(&self) -> Result<EnabledSet> {
        let path = self.config_source_path();

        if !path.is_file() {
            return Err(SvExportError::Config {
                message: format!("Configuration source not found: {}", path.display()),
            });
        }

        let content = fs::read_to_string(&path)?;
        let lines: Vec<&str> = content.lines().collect();

        let extractor = ConfigExtractor::new()
            .with_source_label(self.config.output.config_path.display().to_string());
        let enabled = extractor.extract(&lines)?;

        self.output.debug(&format!(
            "Configuration enables {} option(s)",
            enabled.len()
        ));

        Ok(enabled)
    }

    /// Replace the project's configuration source with a new file, keeping a
    /// `.bak` copy of the old one.
    pub fn overwrite_config(&self, new_config: &Path) -> Result<()> {
        if !new_config.is_file() {
            return Err(SvExportError::InvalidPath {
                path: new_config.display().to_string(),
            });
        }

        let target = self.config_source_path();

        if target.is_file() {
            let backup = backup_path(&target);
            fs::copy(&target, &backup)?;
            self.output
                .debug(&format!("Previous configuration saved to {}", backup.display()));
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(new_config, &target)?;

        self.output.success(&format!(
            "Configuration replaced with {}",
            new_config.display()
        ));
        Ok(())
    }

    /// What an export would process, without touching anything.
    pub fn plan_export(&self) -> Result<(EnabledSet, Vec<SourceFile>, ScanStatistics)> {
        let enabled = self.read_enabled_set()?;

        let scanner = SourceScanner::new(&self.config.filters);
        let sources = scanner.scan_directory(&self.project_root)?;
        let stats = scanner.get_statistics(&sources);

        Ok((enabled, sources, stats))
    }

    /// Export a clean copy of the core with every tagged region resolved.
    ///
    /// The configuration is parsed before anything is written: a malformed
    /// declaration aborts the whole export. The project tree is then mirrored
    /// into the destination and each HDL source in the copy is rewritten in
    /// place with the tagged regions removed. A file is only written once its
    /// complete filtered content exists, so a stripping error leaves that
    /// file as copied.
    pub fn export_clean(&self, dest: &Path, force: bool) -> Result<ExportReport> {
        self.shutdown.check_shutdown()?;
        self.output
            .start_operation(&format!("Exporting clean core to {}", dest.display()));

        let enabled = self.read_enabled_set()?;
        if !enabled.is_empty() {
            self.output.info(&format!(
                "Enabled options: {}",
                enabled.names_in_order().join(", ")
            ));
        }

        let copier = TreeCopier::new(&self.config.filters);
        copier.validate_destination(dest, force)?;
        if force && dest.exists() {
            fs::remove_dir_all(dest)?;
        }

        let spinner = self.progress.create_spinner("Copying project tree...");
        let shutdown = &self.shutdown;
        let mut progress = copier.copy_tree(&self.project_root, dest, |p| {
            spinner.set_message(format!("Copying ({} files)...", p.files_processed));
            shutdown.check_shutdown()
        })?;
        spinner.finish_and_clear();

        self.shutdown.check_shutdown()?;

        let scanner = SourceScanner::new(&self.config.filters);
        let sources = scanner.scan_directory(dest)?;

        let bar = self.progress.create_file_progress(sources.len() as u64);
        let stripped = self.strip_sources(&sources, &enabled, &mut progress, &bar)?;
        finish_progress_with_summary(&bar, "Stripping done", progress.elapsed());

        let manager = ExportManager::new(dest);
        let report = ExportReport::new(
            self.project_name(),
            self.config.output.config_path.display().to_string(),
            &enabled,
            stripped,
            &progress,
        );

        if self.config.output.notice_file {
            manager.write_notice_file(&report)?;
        }
        if self.config.output.generate_report {
            manager.save_report(&report)?;
        }

        self.progress.clear();
        if self.output.is_json() {
            // Structured consumers get the full report, not the summary.
            self.output.print_export_report(&report);
        } else {
            self.output.print_export_summary(&progress);
        }

        if self.config.output.archive {
            let archive = export::archive_directory(dest)?;
            self.output
                .success(&format!("Export archived to {}", archive.display()));
        }

        Ok(report)
    }

    #[cfg(not(feature = "parallel"))]
    fn strip_sources(
        &self,
        sources: &[SourceFile],
        enabled: &EnabledSet,
        progress: &mut ExportProgress,
        bar: &indicatif::ProgressBar,
    ) -> Result<usize> {
        let mut stripped = 0;

        for (index, source) in sources.iter().enumerate() {
            self.shutdown.check_shutdown()?;

            let removed = self.strip_file(source, enabled)?;
            progress.lines_removed += removed;
            stripped += 1;

            update_file_progress(bar, (index + 1) as u64, Some(&source.display_path()));
        }

        Ok(stripped)
    }

    #[cfg(feature = "parallel")]
    fn strip_sources(
        &self,
        sources: &[SourceFile],
        enabled: &EnabledSet,
        progress: &mut ExportProgress,
        bar: &indicatif::ProgressBar,
    ) -> Result<usize> {
        use rayon::prelude::*;
        use std::sync::atomic::{AtomicU64, Ordering};

        self.shutdown.check_shutdown()?;

        let done = AtomicU64::new(0);
        let removed_counts: Vec<usize> = sources
            .par_iter()
            .map(|source| {
                let removed = self.strip_file(source, enabled)?;
                let position = done.fetch_add(1, Ordering::Relaxed) + 1;
                update_file_progress(bar, position, Some(&source.display_path()));
                Ok(removed)
            })
            .collect::<Result<Vec<_>>>()?;

        progress.lines_removed += removed_counts.iter().sum::<usize>();
        Ok(removed_counts.len())
    }

    /// Rewrite one exported source in place. Returns how many lines the
    /// stripper removed.
    fn strip_file(&self, source: &SourceFile, enabled: &EnabledSet) -> Result<usize> {
        let content = fs::read_to_string(&source.source_path)?;
        let lines: Vec<&str> = content.lines().collect();

        let stripper = DirectiveStripper::new().with_source_label(source.display_path());
        let kept = stripper.strip(&lines, enabled)?;
        let removed = lines.len() - kept.len();

        if removed > 0 {
            let mut output = kept.join("\n");
            if content.ends_with('\n') {
                output.push('\n');
            }
            fs::write(&source.source_path, output)?;
        }

        Ok(removed)
    }

    /// Synthesize the configuration currently written in the project.
    pub fn synthesize(&self) -> Result<()> {
        self.synthesize_as(CUSTOM_CONFIG_NAME)
    }

    fn synthesize_as(&self, name: &str) -> Result<()> {
        self.shutdown.check_shutdown()?;
        self.output
            .start_operation(&format!("Synthesizing configuration '{}'", name));

        let runner = SynthesisRunner::new(&self.project_root, self.config.synthesis.clone());
        let spinner = self.progress.create_spinner("Running synthesis flow...");
        let result = runner.synthesize(name);
        spinner.finish_and_clear();

        let result_dir = result?;
        self.output.success(&format!(
            "Synthesis results collected in {}",
            result_dir.display()
        ));
        Ok(())
    }

    /// Print the area figure for the synthesized custom configuration.
    pub fn report(&self) -> Result<()> {
        let runner = SynthesisRunner::new(&self.project_root, self.config.synthesis.clone());
        let scraper = ReportScraper::new(&self.config.synthesis)?;

        let figure = scraper.scrape(
            &runner.result_dir_for(CUSTOM_CONFIG_NAME),
            &self.config.synthesis.report_dir,
        )?;

        self.output.print_header("Synthesis area");
        self.output
            .print_area_row(&figure.config_name, figure.kilo_gates);
        Ok(())
    }

    /// Synthesize every sample configuration shipped with the project.
    ///
    /// The project's configuration source is swapped for each sample and
    /// restored afterwards, even when a run fails partway.
    pub fn synthesize_all(&self) -> Result<()> {
        let runner = SynthesisRunner::new(&self.project_root, self.config.synthesis.clone());
        let configs = runner.example_configs()?;

        if configs.is_empty() {
            return Err(SvExportError::Synthesis {
                message: "No sample configurations found".to_string(),
            });
        }

        let target = self.config_source_path();
        let saved = fs::read(&target)?;

        let mut outcome = Ok(());
        for config_file in &configs {
            if let Err(err) = self.shutdown.check_shutdown() {
                outcome = Err(err);
                break;
            }

            let name = config_stem(config_file);
            if let Err(err) = fs::copy(config_file, &target)
                .map_err(SvExportError::from)
                .and_then(|_| self.synthesize_as(&name))
            {
                self.output.warning(&format!(
                    "Synthesis of '{}' failed: {}",
                    name, err
                ));
            }
        }

        fs::write(&target, saved)?;
        outcome
    }

    /// Print area figures for every configuration with collected results.
    pub fn report_all(&self) -> Result<()> {
        let runner = SynthesisRunner::new(&self.project_root, self.config.synthesis.clone());
        let scraper = ReportScraper::new(&self.config.synthesis)?;

        let names = runner.synthesized_configs()?;
        if names.is_empty() {
            return Err(SvExportError::Synthesis {
                message: "No synthesis results to report; run --synthesize-all first".to_string(),
            });
        }

        self.output.print_header("Synthesis area per configuration");

        for name in &names {
            match scraper.scrape(
                &runner.result_dir_for(name),
                &self.config.synthesis.report_dir,
            ) {
                Ok(figure) => {
                    self.output
                        .print_area_row(&figure.config_name, figure.kilo_gates);
                }
                Err(err) => {
                    self.output
                        .warning(&format!("Skipping '{}': {}", name, err));
                }
            }
        }

        Ok(())
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

fn config_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed")
        .to_string()
}
