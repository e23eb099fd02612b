mod commands;
mod context;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Parser, Subcommand};
use morning_call::DomainError;

use commands::check::{CheckCommands, handle_check_commands};
use commands::config::handle_config;
use commands::demo::{DemoArgs, handle_demo};
use context::CliContext;
use output::{Flags, OutputFormat, Printer};

const AFTER_HELP: &str = "\
Environment:
  MORNING_CALL_CONFIG  Config file (default .morning-call/config.toml)
  RUST_LOG             Log filter, e.g. morning_call=debug";

const DEMO_EXAMPLES: &str = "\
Examples:
  morning-call demo
  morning-call demo --sequential-ids --days-ahead 3
  morning-call --output json demo";

const CHECK_EXAMPLES: &str = "\
Examples:
  morning-call check email Alice@Example.com
  morning-call check username taro_yamada";

const CONFIG_EXAMPLES: &str = "\
Examples:
  morning-call config
  morning-call --config ./staging.toml --output json config";

fn help_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().bold())
        .usage(AnsiColor::BrightBlue.on_default().bold())
        .literal(AnsiColor::Magenta.on_default())
        .placeholder(AnsiColor::BrightBlack.on_default())
}

/// Friend relationships and scheduled wake-up calls, held in memory
#[derive(Parser)]
#[command(name = "morning-call", version, styles = help_styles(), after_long_help = AFTER_HELP)]
struct Cli {
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Config file to load
    #[arg(long, env = "MORNING_CALL_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Print only errors
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colors and box drawing
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the friend and morning-call flows on a fresh in-memory store
    #[command(after_long_help = DEMO_EXAMPLES)]
    Demo(DemoArgs),

    /// Validate an email address or a username the way registration does
    #[command(subcommand, after_long_help = CHECK_EXAMPLES)]
    Check(CheckCommands),

    /// Show the effective configuration
    #[command(after_long_help = CONFIG_EXAMPLES)]
    Config,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }
    let printer = Printer::new(Flags {
        format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        plain: cli.no_color,
    });

    if let Err(err) = execute(cli, &printer).await {
        match err.downcast_ref::<DomainError>() {
            Some(domain) => printer.refused(domain),
            None => printer.error(&format!("{err:#}")),
        }
        std::process::exit(1);
    }
}

async fn execute(cli: Cli, printer: &Printer) -> Result<()> {
    let ctx = CliContext::load(cli.config)?;
    printer.detail(&format!("config: {}", ctx.config_path.display()));

    match cli.command {
        Commands::Demo(args) => handle_demo(args, &ctx.config, printer).await,
        Commands::Check(command) => handle_check_commands(command, &ctx.config, printer),
        Commands::Config => handle_config(&ctx, printer),
    }
}
