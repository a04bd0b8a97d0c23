//! deckhand CLI - Main Entry Point
//!
//! Task runner for a browser presentation: bundle, compile themes, lint,
//! serve with live reload, package, and run the QUnit suite headlessly.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use deckhand_cli::commands::{build, lint, package, qunit, serve, tasks};
use deckhand_cli::exit;
use deckhand_cli::output::print_error;
use deckhand_cli::project::Project;
use deckhand_common::CONFIG_FILE;

/// deckhand - build, serve and test a browser presentation
#[derive(Parser)]
#[command(name = "deckhand")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file; its directory is the project root
    #[arg(long, short, default_value = CONFIG_FILE, env = "DECKHAND_CONFIG", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bundle the library (minified UMD and ES module)
    Build,

    /// Compile the theme stylesheets
    #[command(alias = "themes")]
    Css,

    /// Lint the library sources
    Lint,

    /// Serve the presentation with live reload
    Serve(serve::ServeArgs),

    /// Package the presentation into a zip archive
    Zip,

    /// Run the QUnit suite in a headless browser
    Qunit(qunit::QunitArgs),

    /// Lint, then run the QUnit suite
    Test(qunit::QunitArgs),

    /// Lint, build, compile themes, test, then zip
    Package(qunit::QunitArgs),

    /// Lint, build, compile themes, then test
    Default(qunit::QunitArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::from(exit::SUCCESS),
        Err(e) => {
            if !exit::is_suite_failure(&e) {
                print_error(&format!("{:#}", e));
            }
            ExitCode::from(exit::code_for(&e))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let project = Project::load(&cli.config)?;

    match cli.command {
        Commands::Build => build::execute_build(&project).await,
        Commands::Css => build::execute_css(&project).await,
        Commands::Lint => lint::execute(&project).await,
        Commands::Serve(args) => serve::execute(&project, &args).await,
        Commands::Zip => package::execute(&project).await,
        Commands::Qunit(args) => qunit::execute(&project, &args).await,
        Commands::Test(args) => tasks::run(&project, tasks::TEST, &args).await,
        Commands::Package(args) => tasks::run(&project, tasks::PACKAGE, &args).await,
        Commands::Default(args) => tasks::run(&project, tasks::DEFAULT, &args).await,
    }
}
