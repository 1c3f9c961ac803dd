use clap::{Parser, Subcommand};
use magic_model::config::{self, ToolConfig};
use magic_model::{DirSink, DirSource, JinjaEvaluator, MemorySink, ModelPipeline, output, store};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that run the pipeline.
#[derive(clap::Args, Clone)]
struct LocaleArgs {
    /// Locale to build (repeatable). Defaults to the config file's list, then
    /// to every <locale>-template.json in the input folder
    #[arg(long = "locale", short = 'l', value_name = "LOCALE")]
    locales: Vec<String>,
}

#[derive(Parser)]
#[command(name = "magic-model")]
#[command(about = "Expand voice model templates: config placeholders and spintax phrases")]
#[command(long_about = "\
Expand voice model templates: config placeholders and spintax phrases

Model folder layout:

  magicModel/
  ├── config.json            # Variables for every locale (optional)
  ├── config-de.json         # Variables for 'de', override config.json (optional)
  ├── de-template.json       # Template for 'de'
  └── en-template.json       # Template for 'en'
  models/
  ├── de.json                # Generated
  └── en.json                # Generated

Template syntax:
  \"${Key}\"                   Whole value: replaced by the config value, any type
  \"v${version}.${1+1}\"       Embedded: expressions evaluated and inserted as text
  \"What [now|can I do]\"      Spintax in 'phrases': one entry per combination

Run 'magic-model gen-config' to generate a documented magic-model.toml.")]
#[command(version)]
struct Cli {
    /// Tool configuration file
    #[arg(long, default_value = config::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Model folder (overrides input_dir)
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Output folder (overrides output_dir)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Log pipeline internals to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build every locale and write the generated models
    Build(LocaleArgs),
    /// Build every locale without writing anything
    Check(LocaleArgs),
    /// Print a stock magic-model.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Command::Build(args) => {
            let tool_config = config::load_config(&cli.config)?;
            let input = resolve_input(&cli, &tool_config);
            let output_dir = cli
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&tool_config.output_dir));
            let locales = resolve_locales(args, &tool_config, &input)?;

            println!("==> Building {}", input.display());
            let pipeline = ModelPipeline::new(JinjaEvaluator)
                .with_expansion_threshold(tool_config.expansion.warn_threshold);
            let mut sink = DirSink::new(&output_dir);
            let report = pipeline.run(&locales, &DirSource::new(&input), &mut sink);
            output::print_run_report(&report, Some(&output_dir));
            if report.has_failures() {
                std::process::exit(1);
            }
        }
        Command::Check(args) => {
            let tool_config = config::load_config(&cli.config)?;
            let input = resolve_input(&cli, &tool_config);
            let locales = resolve_locales(args, &tool_config, &input)?;

            println!("==> Checking {}", input.display());
            let pipeline = ModelPipeline::new(JinjaEvaluator)
                .with_expansion_threshold(tool_config.expansion.warn_threshold);
            let report = pipeline.run(&locales, &DirSource::new(&input), &mut MemorySink::new());
            output::print_run_report(&report, None);
            if report.has_failures() {
                std::process::exit(1);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn resolve_input(cli: &Cli, tool_config: &ToolConfig) -> PathBuf {
    cli.input
        .clone()
        .unwrap_or_else(|| PathBuf::from(&tool_config.input_dir))
}

/// Command-line locales, then the config file's list, then discovery.
fn resolve_locales(
    args: &LocaleArgs,
    tool_config: &ToolConfig,
    input: &Path,
) -> Result<Vec<String>, store::SourceError> {
    if !args.locales.is_empty() {
        return Ok(args.locales.clone());
    }
    if !tool_config.locales.is_empty() {
        return Ok(tool_config.locales.clone());
    }
    store::discover_locales(input)
}
