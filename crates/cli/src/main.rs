// remitmatch CLI - reconcile a remittance ledger against submitted claims

mod exit_codes;
mod inspect;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use remitmatch_recon::config::OutputFormat;

use exit_codes::{EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_READ, EXIT_SUCCESS, EXIT_USAGE, EXIT_WRITE};

#[derive(Parser)]
#[command(name = "remitmatch")]
#[command(about = "Match remittance rows to claims and report what was paid and rejected")]
#[command(version)]
struct Cli {
    /// Log pipeline stages (same as RUST_LOG=debug)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a target ledger against a source ledger
    #[command(after_help = "\
Examples:
  remitmatch run --source remits.xlsx --target claims.xlsx
  remitmatch run --source remits.csv --target claims.csv --format csv --out-dir out/
  remitmatch run --source remits.xlsx --target claims.xlsx --config march.toml --json")]
    Run {
        /// Source ledger (remittances): xlsx, xls, xlsb, ods, csv or tsv
        #[arg(long, short = 's')]
        source: PathBuf,

        /// Target ledger (claims) to partition into matched and unmatched
        #[arg(long, short = 't')]
        target: PathBuf,

        /// TOML file with header/column overrides and output settings
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Directory for the matched and unmatched files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Output format (overrides the config file)
        #[arg(long, short = 'f')]
        format: Option<FormatArg>,

        /// Print the run report as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Show how the header row of a file is chosen
    #[command(after_help = "\
Examples:
  remitmatch inspect remits.xlsx
  remitmatch inspect claims.csv --json")]
    Inspect {
        /// File to inspect
        file: PathBuf,

        /// Print the score breakdown as JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Xlsx,
    Csv,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Xlsx => OutputFormat::Xlsx,
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let result = match cli.command {
        Commands::Run {
            source,
            target,
            config,
            out_dir,
            format,
            json,
        } => run::cmd_run(run::RunArgs {
            source,
            target,
            config,
            out_dir,
            format: format.map(OutputFormat::from),
            json,
        }),
        Commands::Inspect { file, json } => inspect::cmd_inspect(file, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn read(msg: impl Into<String>) -> Self {
        Self { code: EXIT_READ, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INVALID_CONFIG, message: msg.into(), hint: None }
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self { code: EXIT_WRITE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
