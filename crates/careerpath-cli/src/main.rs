//! careerpath CLI: take the RIASEC quiz and inspect question banks.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "careerpath", version, about = "RIASEC career assessment")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take the career quiz
    Take {
        /// Pre-selected option ids in question order (e.g. "r1_a,r2_c,...");
        /// prompts interactively when omitted
        #[arg(long)]
        answers: Option<String>,

        /// Question bank file, overriding the configured bank
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Save the result as JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// User credited with the completion achievement
        #[arg(long)]
        user: Option<String>,

        /// Skip the recommendation service and score locally
        #[arg(long)]
        offline: bool,
    },

    /// Score a list of answers locally, without a session
    Score {
        /// Question bank file
        #[arg(long)]
        bank: PathBuf,

        /// Selected option ids in question order
        #[arg(long)]
        answers: String,

        /// Career catalog TOML (defaults to the built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Print the scores as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a question bank file
    Validate {
        /// Question bank file (TOML or JSON)
        #[arg(long)]
        bank: PathBuf,
    },

    /// List the careers in the catalog
    Catalog {
        /// Career catalog TOML (defaults to the built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Create a starter config and question bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("careerpath=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            answers,
            bank,
            output,
            config,
            user,
            offline,
        } => commands::take::execute(answers, bank, output, config, user, offline).await,
        Commands::Score {
            bank,
            answers,
            catalog,
            json,
        } => commands::score::execute(bank, answers, catalog, json),
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Catalog { catalog } => commands::catalog::execute(catalog),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
