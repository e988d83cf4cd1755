//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use quickstart_core::pipeline::{Pipeline, ProgressReporter};
use quickstart_core::launcher;
use quickstart_shared::{AppConfig, PipelineResult, init_config, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Quickstart: from a tool's web page to runnable Docker bootstrap scripts.
#[derive(Parser)]
#[command(
    name = "quickstart",
    version,
    about = "Turn a tool's web page into a Bash bootstrap script and a Docker Compose snippet.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Result output format for `process`.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch a URL, identify the tool it describes, and generate bootstrap scripts.
    Process {
        /// Page URL to analyse.
        url: String,

        /// Output format: text or json.
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,

        /// Page fetch timeout in seconds (overrides config).
        #[arg(long)]
        timeout: Option<u64>,

        /// Use the offline mock extractor.
        #[arg(long)]
        mock: bool,

        /// Extraction model (overrides config).
        #[arg(long, env = "QUICKSTART_MODEL")]
        model: Option<String>,
    },

    /// Start a local component by running its start.sh.
    Start {
        /// Component name (a directory under the components root).
        component: String,

        /// Components root directory (defaults to config, then the binary's directory).
        #[arg(long)]
        root: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "quickstart=info",
        1 => "quickstart=debug",
        _ => "quickstart=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
///
/// A processed URL whose result carries an error has already been reported
/// on stdout, so it surfaces only as a failing exit code.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    let failed = match cli.command {
        Command::Process {
            url,
            output,
            timeout,
            mock,
            model,
        } => cmd_process(&url, output, timeout, mock, model).await,
        Command::Start { component, root } => cmd_start(&component, root.as_deref()).map(|()| false),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        }
        .map(|()| false),
    }?;

    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

// ---------------------------------------------------------------------------
// process
// ---------------------------------------------------------------------------

async fn cmd_process(
    url: &str,
    output: OutputFormat,
    timeout: Option<u64>,
    mock: bool,
    model: Option<String>,
) -> Result<bool> {
    let mut config = load_config()?;
    if let Some(secs) = timeout {
        config.fetch.timeout_secs = secs;
    }
    if mock {
        config.extractor.provider = "mock".to_string();
    }
    if let Some(model) = model {
        config.extractor.model = model;
    }

    let pipeline = Pipeline::from_config(&config)?;

    info!(url, extractor = pipeline.extractor_name(), "processing URL");

    let result = match output {
        OutputFormat::Text => {
            let reporter = CliProgress::new();
            let result = pipeline.run_with_progress(url, &reporter).await;
            print_text(&result);
            result
        }
        OutputFormat::Json => {
            let result = pipeline.run(url).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            result
        }
    };

    Ok(result.is_error())
}

/// Print a pipeline result for humans.
fn print_text(result: &PipelineResult) {
    println!();
    println!("  Submitted URL: {}", result.submitted_url);
    println!();
    println!("  Steps:");
    for (i, step) in result.steps.iter().enumerate() {
        println!("    {:>2}. {step}", i + 1);
    }

    if let Some(snippet) = &result.snippet {
        println!();
        println!("  Raw content snippet:");
        print_block(snippet);
    }

    if let Some(extracted) = &result.extracted {
        println!();
        println!("  Extracted information:");
        match serde_json::to_string_pretty(extracted) {
            Ok(json) => print_block(&json),
            Err(e) => println!("    <unprintable: {e}>"),
        }
    }

    if let Some(artifacts) = &result.artifacts {
        println!();
        println!("  Bash script:");
        print_block(&artifacts.bash_script);
        println!();
        println!("  Docker Compose:");
        print_block(&artifacts.compose_script);
    }

    if let Some(error) = &result.error {
        println!();
        println!("  Error: {error}");
    }
    println!();
}

fn print_block(text: &str) {
    for line in text.lines() {
        println!("    {line}");
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn step(&self, message: &str) {
        self.spinner.set_message(message.to_string());
    }

    fn done(&self, _result: &PipelineResult) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// start
// ---------------------------------------------------------------------------

fn cmd_start(component: &str, root: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let root = components_root(&config, root)?;

    info!(component, root = %root.display(), "starting component");

    // Resolve first so an unknown name is reported before anything is printed.
    launcher::resolve_component(&root, component)?;

    println!("starting {component} ...");
    launcher::start_component(&root, component)?;
    println!("Component {component} started successfully.");
    Ok(())
}

/// `--root` flag, then `[launcher] components_dir`, then the binary's directory.
fn components_root(config: &AppConfig, flag: Option<&str>) -> Result<PathBuf> {
    if let Some(root) = flag {
        return Ok(PathBuf::from(root));
    }
    if let Some(dir) = &config.launcher.components_dir {
        return Ok(PathBuf::from(dir));
    }
    Ok(launcher::default_components_root()?)
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
