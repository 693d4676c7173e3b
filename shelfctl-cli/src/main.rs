//! shelfctl CLI - front-end for a hosted library database
//!
//! Runs the interactive numbered menu by default. Every menu action is also
//! available as a scriptable subcommand:
//! - Member registration and maintenance (`member` subcommand)
//! - Book catalogue and stock (`book` subcommand)
//! - Circulation through the database's procedures (`borrow`, `return`)
//! - Reporting views (`report` subcommand)

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{ConnectionArgs, Session};
use crate::output::OutputFormat;
use crate::tracing_setup::TracingConfig;

mod commands;
mod menu;
mod output;
mod tracing_setup;
mod ui;

#[derive(Parser, Debug)]
#[command(
    name = "shelfctl",
    author,
    version,
    about = "Manage members, books and loans in a hosted library database",
    long_about = "Register members and books, update stock, borrow and return books, and read \
                  the circulation reports. Without a subcommand an interactive menu is shown."
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress progress spinners (for script consumption)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Print rows as a JSON array instead of one row per line
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive numbered menu (default)
    Menu,
    /// Register, show, update or delete members
    Member(commands::member::MemberArgs),
    /// Add, list, search, restock or delete books
    Book(commands::book::BookArgs),
    /// Borrow a book for a member
    Borrow(commands::circulation::CirculationArgs),
    /// Return a borrowed book
    Return(commands::circulation::CirculationArgs),
    /// Show the circulation reports
    Report(commands::report::ReportArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Before parsing so .env values reach clap's env fallbacks
    shelfctl_core::config::load_dotenv();
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();
    let progress = ui::Progress::detect(cli.quiet);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Lines
    };

    let connection = cli.connection;
    let connect = || Session::connect(&connection, format, progress);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => commands::run_menu(&connect()?, &mut out).await?,
        Commands::Member(args) => commands::run_member(args, &connect()?, &mut out).await?,
        Commands::Book(args) => commands::run_book(args, &connect()?, &mut out).await?,
        Commands::Borrow(args) => commands::run_borrow(args, &connect()?, &mut out).await?,
        Commands::Return(args) => commands::run_return(args, &connect()?, &mut out).await?,
        Commands::Report(args) => commands::run_report(args, &connect()?, &mut out).await?,
        Commands::Completions(args) => run_completions(args)?,
    }
    Ok(())
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
