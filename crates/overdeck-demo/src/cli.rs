use std::io::{self, Write};

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::{DemoError, Result};
use crate::logging;
use crate::scenario;

/// Upper bound on `--count` for the toast and modal scenarios.
pub const MAX_COUNT: usize = 64;

#[derive(Debug, Parser)]
#[command(
    name = "overdeck-demo",
    about = "Script toast and modal overlays against a headless host and print every frame",
    version
)]
pub struct Cli {
    /// Log filter directive, e.g. `debug` or `overdeck_runtime=trace`.
    #[arg(long, env = "OVERDECK_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Write logs to stderr as JSON lines.
    #[arg(long, env = "OVERDECK_LOG_JSON", global = true)]
    pub log_json: bool,

    /// Frame width in cells.
    #[arg(long, env = "OVERDECK_WIDTH", default_value_t = 60, global = true)]
    pub width: u16,

    /// Frame height in cells.
    #[arg(long, env = "OVERDECK_HEIGHT", default_value_t = 16, global = true)]
    pub height: u16,

    /// Element the overlay container is inserted after.
    #[arg(long, env = "OVERDECK_ANCHOR", default_value = scenario::DOCUMENT_ANCHOR, global = true)]
    pub anchor: String,

    /// How frames are written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Open toasts, then close or expire them.
    Toast(ToastArgs),

    /// Stack modals, hide and reveal one, then close them newest first.
    Modal(ModalArgs),

    /// Toasts underneath a modal backdrop.
    Mixed,

    /// Print the registered overlay kinds.
    #[command(name = "list-kinds")]
    ListKinds,
}

#[derive(Debug, Clone, Args)]
pub struct ToastArgs {
    /// Number of toasts to open, at most 64.
    #[arg(long, default_value_t = 3)]
    pub count: usize,

    /// Expire toasts after this many milliseconds, staggered by position.
    #[arg(long)]
    pub ttl_ms: Option<u64>,

    /// Newest toasts kept on screen.
    #[arg(long, default_value_t = 5)]
    pub max_visible: usize,
}

#[derive(Debug, Clone, Args)]
pub struct ModalArgs {
    /// Number of modals to stack, at most 64.
    #[arg(long, default_value_t = 2)]
    pub count: usize,

    /// Vertical step between modals, in percent.
    #[arg(long, default_value_t = 20)]
    pub step: u16,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_json)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&cli, &mut out)
}

pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    if cli.width == 0 || cli.height == 0 {
        return Err(DemoError::invalid("--width and --height must be positive"));
    }
    tracing::info!(
        message = "demo.start",
        command = command_name(&cli.command),
        width = cli.width,
        height = cli.height
    );
    match &cli.command {
        Commands::Toast(args) => {
            check_count(args.count)?;
            scenario::run_toast(cli, args, out)
        }
        Commands::Modal(args) => {
            check_count(args.count)?;
            if args.step > 100 {
                return Err(DemoError::invalid("--step must be at most 100"));
            }
            scenario::run_modal(cli, args, out)
        }
        Commands::Mixed => scenario::run_mixed(cli, out),
        Commands::ListKinds => scenario::list_kinds(cli, out),
    }
}

fn check_count(count: usize) -> Result<()> {
    if count > MAX_COUNT {
        return Err(DemoError::invalid(format!(
            "--count must be at most {MAX_COUNT}"
        )));
    }
    Ok(())
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Toast(_) => "toast",
        Commands::Modal(_) => "modal",
        Commands::Mixed => "mixed",
        Commands::ListKinds => "list-kinds",
    }
}
