//! The command line interface for the program.
use crate::config::ModelConfig;
use crate::formulation::build_formulation;
use crate::input::load_input;
use crate::log;
use crate::output::{
    ScheduleReport, create_output_directory, get_output_dir, log_report, write_results,
};
use crate::settings::Settings;
use crate::solver::solve;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the program.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for loading the model configuration
#[derive(Args, Default)]
pub struct ConfigOpts {
    /// Path to a model configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Solver time limit in seconds, overriding the configuration file
    #[arg(long)]
    pub time_limit: Option<u32>,
    /// Target relative optimality gap, overriding the configuration file
    #[arg(long)]
    pub gap: Option<f64>,
}

/// Options for the run command
#[derive(Args, Default)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// Model configuration options
    #[command(flatten)]
    pub config: ConfigOpts,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Formulate and solve a unit commitment problem.
    Run {
        /// Path to the input document (JSON).
        input_path: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Manage example cases.
    Example {
        /// The available subcommands for managing example cases.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Load an input document and build its model without solving it.
    Validate {
        /// Path to the input document (JSON).
        input_path: PathBuf,
        /// Model configuration options
        #[command(flatten)]
        config: ConfigOpts,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { input_path, opts } => {
                handle_run_command(&input_path, &opts, None).map(|_| ())
            }
            Self::Example { subcommand } => subcommand.execute(),
            Self::Validate { input_path, config } => {
                handle_validate_command(&input_path, &config, None)
            }
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start the program
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ scuc --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load the model configuration and apply any command-line overrides
fn load_config(opts: &ConfigOpts) -> Result<ModelConfig> {
    let mut config = match &opts.config {
        Some(path) => ModelConfig::from_path(path)?,
        None => ModelConfig::default(),
    };

    if let Some(time_limit) = opts.time_limit {
        config.solver_time_limit_sec = time_limit;
    }
    if let Some(gap) = opts.gap {
        config.relative_gap = gap;
    }
    config
        .validate()
        .context("Invalid command-line options")?;

    Ok(config)
}

/// Handle the `run` command.
///
/// # Returns
///
/// The solved schedule, which has also been written to the output folder.
pub fn handle_run_command(
    input_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<ScheduleReport> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(input_path)?;
        &pathbuf
    };

    let allow_overwrite = opts.overwrite || settings.overwrite;
    let overwrite =
        create_output_directory(output_path, allow_overwrite).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    // Initialise program logger
    log::init(Some(&settings.log_level), Some(output_path))
        .context("Failed to initialise logging.")?;

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    let config = load_config(&opts.config).context("Failed to load model configuration.")?;
    let input = load_input(input_path, &config).context("Failed to load input.")?;
    info!("Loaded input from {}", input_path.display());
    info!("Output folder: {}", output_path.display());

    let formulation = build_formulation(&input).context("Failed to build model.")?;
    let solution = solve(&formulation.problem, &config).context("Failed to solve model.")?;
    let report = ScheduleReport::new(&input, &formulation.vars, &solution);
    log_report(&report);
    write_results(output_path, &report).context("Failed to write results.")?;

    Ok(report)
}

/// Handle the `validate` command.
pub fn handle_validate_command(
    input_path: &Path,
    config_opts: &ConfigOpts,
    settings: Option<Settings>,
) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(Some(&settings.log_level), None).context("Failed to initialise logging.")?;

    let config = load_config(config_opts).context("Failed to load model configuration.")?;
    let input = load_input(input_path, &config).context("Failed to validate input.")?;
    build_formulation(&input).context("Failed to build model.")?;
    info!("Validation successful!");

    Ok(())
}
