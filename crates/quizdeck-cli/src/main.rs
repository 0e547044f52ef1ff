//! quizdeck CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizdeck", version, about = "Quiz authoring, taking and grading API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Keep all data in memory instead of the configured database
        #[arg(long)]
        memory: bool,
    },

    /// Create starter config and example quiz
    Init,

    /// Validate quiz definition TOML files
    Validate {
        /// Path to a quiz file or directory
        #[arg(long)]
        quizzes: PathBuf,
    },

    /// Create the admin account and load quiz definitions
    Seed {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to a quiz file or directory to load
        #[arg(long)]
        quizzes: Option<PathBuf>,

        /// Admin username
        #[arg(long, default_value = "admin")]
        admin_username: String,

        /// Admin email
        #[arg(long, default_value = "admin@quizapp.com")]
        admin_email: String,

        /// Admin password
        #[arg(long, default_value = "admin123")]
        admin_password: String,
    },

    /// Grade a set of answers against a quiz file offline
    Grade {
        /// Quiz definition TOML file
        #[arg(long)]
        quiz: PathBuf,

        /// JSON answers: a file path or an inline object keyed by question number
        #[arg(long)]
        answers: String,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Export a report of a quiz's submissions
    Report {
        /// Quiz id
        #[arg(long)]
        quiz_id: i64,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory
        #[arg(long, default_value = "./quizdeck-reports")]
        output: PathBuf,

        /// Output format: json, html, gradebook, all
        #[arg(long, default_value = "json")]
        format: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizdeck=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            config,
            port,
            memory,
        } => commands::serve::execute(config, port, memory).await,
        Commands::Init => commands::init::execute(),
        Commands::Validate { quizzes } => commands::validate::execute(quizzes),
        Commands::Seed {
            config,
            quizzes,
            admin_username,
            admin_email,
            admin_password,
        } => {
            commands::seed::execute(
                config,
                quizzes,
                admin_username,
                admin_email,
                admin_password,
            )
            .await
        }
        Commands::Grade {
            quiz,
            answers,
            format,
        } => commands::grade::execute(quiz, answers, format),
        Commands::Report {
            quiz_id,
            config,
            output,
            format,
        } => commands::report::execute(quiz_id, config, output, format).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
