use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "svexport")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Export clean SystemVerilog cores with configuration switches resolved")]
#[command(
    long_about = "SvExport parses a core's configuration file to determine the enabled \
                       options, then exports a copy of the project with all tagged \
                       `ifdef/`ifndef regions resolved and removed. It can also overwrite \
                       the configuration, archive the export, and drive an external \
                       synthesis flow."
)]
#[command(after_help = "EXAMPLES:\n  \
    svexport ./littleRISCV -o ./clean_core\n  \
    svexport ./littleRISCV -i configs/small.sv -o ./clean_core -z\n  \
    svexport ./littleRISCV --synthesize --report\n  \
    svexport ./littleRISCV --report-all --output-format json\n\n\
    For more information, visit: https://github.com/user/svexport")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Path to the core project root
    pub project: PathBuf,

    /// New configuration file to overwrite the project configuration
    #[arg(short = 'i', long = "new-config", value_name = "FILE")]
    pub new_config: Option<PathBuf>,

    /// Export a clean version of the core into this directory
    #[arg(short = 'o', long = "export", value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// Package the export into a .tar.gz and remove the directory
    #[arg(short = 'z', long, requires = "export")]
    pub archive: bool,

    /// Synthesize the current configuration
    #[arg(long)]
    pub synthesize: bool,

    /// Report the synthesized custom design
    #[arg(long)]
    pub report: bool,

    /// Synthesize every sample configuration in the example configs folder
    #[arg(long, conflicts_with = "synthesize")]
    pub synthesize_all: bool,

    /// Report every sample configuration that has been synthesized
    #[arg(long, conflicts_with = "report")]
    pub report_all: bool,

    /// File extensions to process (comma-separated)
    #[arg(short, long, help = "File extensions to process (e.g., sv,svh,v)")]
    pub formats: Option<String>,

    /// Directories to exclude from the export
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Maximum file size in MB
    #[arg(long, help = "Maximum file size to process (in MB)")]
    pub max_size: Option<u64>,

    /// Configuration source path, relative to the project root
    #[arg(long, value_name = "PATH")]
    pub config_source: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force overwrite of an existing export directory
    #[arg(long, help = "Overwrite existing export directory")]
    pub force: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "Show what would be exported without actually doing it")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        let max_file_size = self.max_size.map(|size| size * 1024 * 1024); // MB to bytes

        CliOverrides::new()
            .with_formats(self.formats.clone())
            .with_exclude(self.exclude.clone())
            .with_max_file_size(max_file_size)
            .with_config_path(self.config_source.clone())
            .with_archive(if self.archive { Some(true) } else { None })
    }

    /// At least one of the pipeline actions was requested.
    pub fn action_requested(&self) -> bool {
        self.new_config.is_some()
            || self.export.is_some()
            || self.synthesize
            || self.report
            || self.synthesize_all
            || self.report_all
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose > 0 && !self.quiet
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
