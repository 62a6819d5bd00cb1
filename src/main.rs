use changelog_filter::{
    compile_pattern, parse_changelog, parse_changelog_file, write_json, write_text,
};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use std::error::Error;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Read standard input instead of a file
const STDIN_SENTINEL: &str = "-";

#[derive(Parser)]
#[command(name = "changelog-filter", version)]
#[command(about = "Filter for Ubuntu Linux kernel changelog")]
#[command(
    long_about = "Filter for Ubuntu Linux kernel changelog.\n\n\
    Keeps the changes whose summary or details match a regular expression and prints \
    them in changelog layout, together with the header and maintainer line of their entry."
)]
struct Cli {
    /// Changelog filename ("-" for stdin)
    #[arg(long, value_name = "FILE", default_value = STDIN_SENTINEL)]
    file: String,

    /// Regular expression matched against change summaries and details
    #[arg(long, value_name = "REGEX", default_value = ".")]
    filter: String,

    /// Print the filtered entries as a JSON array
    #[arg(long)]
    json: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL", exclusive = true)]
    completions: Option<Shell>,

    /// Print the man page and exit
    #[arg(long, exclusive = true)]
    man: bool,
}

fn main() -> ExitCode {
    // Set RUST_LOG=debug for verbose logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "changelog-filter", &mut io::stdout());
        return Ok(());
    }

    if cli.man {
        clap_mangen::Man::new(Cli::command()).render(&mut io::stdout())?;
        return Ok(());
    }

    let pattern = compile_pattern(&cli.filter)?;

    let changelog = if cli.file == STDIN_SENTINEL {
        parse_changelog(io::stdin().lock())?
    } else {
        parse_changelog_file(&cli.file)?
    };

    let filtered = changelog.filter(&pattern);

    let stdout = io::stdout().lock();
    if cli.json {
        write_json(&filtered, stdout)?;
    } else {
        write_text(&filtered, stdout)?;
    }

    Ok(())
}
