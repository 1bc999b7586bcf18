use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "studium", version, about = "Studium study-time tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Focus session control
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Subject catalog
    Subject {
        #[command(subcommand)]
        action: commands::subject::SubjectAction,
    },
    /// Topics within a subject
    Topic {
        #[command(subcommand)]
        action: commands::topic::TopicAction,
    },
    /// Saved interval presets
    Preset {
        #[command(subcommand)]
        action: commands::preset::PresetAction,
    },
    /// Session statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Session { action } => commands::session::run(action),
        Commands::Subject { action } => commands::subject::run(action),
        Commands::Topic { action } => commands::topic::run(action),
        Commands::Preset { action } => commands::preset::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
