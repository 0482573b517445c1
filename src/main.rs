use clap::Parser;
use svexport::cli::{Cli, OutputFormat};
use svexport::config::Config;
use svexport::error::{Result, SvExportError};
use svexport::ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};
use svexport::SvExport;

fn main() {
    let cli = Cli::parse();
    let mode = output_mode(&cli.output_format);
    let output = OutputFormatter::new(mode, cli.verbosity_level(), cli.quiet);

    if let Err(err) = run(&cli, mode) {
        output.print_user_friendly_error(&err);
        std::process::exit(exit_code(&err));
    }
}

fn run(cli: &Cli, mode: OutputMode) -> Result<()> {
    if cli.generate_config {
        return generate_config(cli, mode);
    }

    let config = cli.load_config()?;
    let output = OutputFormatter::new(mode, cli.verbosity_level(), cli.quiet);

    if cli.dry_run {
        return dry_run(cli, config, output);
    }

    if !cli.action_requested() {
        output.warning("No action requested; see --help for the available actions");
        return Ok(());
    }

    let progress =
        ProgressManager::new(mode == OutputMode::Human && !cli.quiet && console::Term::stdout().is_term());
    let shutdown = GracefulShutdown::new()?;

    let pipeline = SvExport::new(cli.project.clone(), config, output, progress, shutdown)?;

    // Actions compose in a fixed order: reconfigure, export, then the
    // synthesis flows.
    if let Some(ref new_config) = cli.new_config {
        pipeline.overwrite_config(new_config)?;
    }

    if let Some(ref dest) = cli.export {
        pipeline.export_clean(dest, cli.force)?;
    }

    if cli.synthesize {
        pipeline.synthesize()?;
    }

    if cli.synthesize_all {
        pipeline.synthesize_all()?;
    }

    if cli.report {
        pipeline.report()?;
    }

    if cli.report_all {
        pipeline.report_all()?;
    }

    Ok(())
}

fn generate_config(cli: &Cli, mode: OutputMode) -> Result<()> {
    let output = OutputFormatter::new(mode, cli.verbosity_level(), cli.quiet);
    let path = "svexport.toml";

    if std::path::Path::new(path).exists() && !cli.force {
        return Err(SvExportError::Config {
            message: format!("{} already exists; use --force to overwrite", path),
        });
    }

    std::fs::write(path, Config::create_sample_config())?;
    output.success(&format!("Sample configuration written to {}", path));
    Ok(())
}

fn dry_run(cli: &Cli, config: Config, output: OutputFormatter) -> Result<()> {
    let pipeline = SvExport::new(
        cli.project.clone(),
        config,
        OutputFormatter::new(output_mode(&cli.output_format), cli.verbosity_level(), cli.quiet),
        ProgressManager::new(false),
        GracefulShutdown::new_for_test(),
    )?;

    let (enabled, sources, stats) = pipeline.plan_export()?;

    output.print_header("Dry run");
    if enabled.is_empty() {
        output.info("No configuration options enabled");
    } else {
        output.info(&format!(
            "Enabled options: {}",
            enabled.names_in_order().join(", ")
        ));
    }

    output.info(&format!(
        "{} HDL source file(s) would be processed:",
        sources.len()
    ));
    for source in &sources {
        output.info(&format!("  {}", source.display_path()));
    }
    output.debug(&stats.display_summary());

    if let Some(ref dest) = cli.export {
        output.info(&format!("Would export to {}", dest.display()));
    }

    Ok(())
}

fn output_mode(format: &OutputFormat) -> OutputMode {
    match format {
        OutputFormat::Human => OutputMode::Human,
        OutputFormat::Json => OutputMode::Json,
        OutputFormat::Plain => OutputMode::Plain,
    }
}

fn exit_code(error: &SvExportError) -> i32 {
    match error {
        SvExportError::Cancelled => 130,
        SvExportError::Config { .. }
        | SvExportError::MalformedDeclaration { .. }
        | SvExportError::MalformedRegion { .. } => 2,
        _ => 1,
    }
}
