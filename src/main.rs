use clap::{Parser, Subcommand};
use soundchecker::command::check::{run_checks, CheckArgs};
use soundchecker::command::info::get_audio_info;
use soundchecker::command::Verdict;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Define CLI application structure using clap
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log progress to stderr (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

// Define available subcommands and their arguments
#[derive(Subcommand)]
enum Commands {
    /// Validate audio files in a folder tree
    Check(CheckArgs),

    /// Display the file count and audio header information
    Info {
        /// Input directory
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for information
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "soundchecker=warn",
        1 => "soundchecker=info",
        _ => "soundchecker=debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// Main function: Parse CLI arguments and dispatch to appropriate handler
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check(args) => run_checks(&args),
        Commands::Info { input, output } => {
            get_audio_info(&input, output.as_ref()).map(|()| Verdict::Clean)
        }
    };

    match result {
        Ok(Verdict::Clean) => ExitCode::SUCCESS,
        Ok(Verdict::Violations) => ExitCode::from(1),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(2)
        }
    }
}
