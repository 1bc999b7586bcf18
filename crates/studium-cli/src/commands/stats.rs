use clap::Subcommand;
use studium_core::storage::Database;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Totals for sessions recorded today
    Today,
    /// Totals across all recorded sessions
    All,
    /// List recorded sessions, newest first
    Sessions {
        /// Restrict to one subject
        #[arg(long)]
        subject: Option<String>,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        StatsAction::Today => {
            let stats = db.stats_today()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::All => {
            let stats = db.stats_all()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Sessions { subject } => {
            let sessions = db.list_sessions(subject.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
    }
    Ok(())
}
