use clap::Subcommand;
use studium_core::storage::Database;
use studium_core::Topic;

#[derive(Subcommand)]
pub enum TopicAction {
    /// Create a topic under a subject
    Add {
        #[arg(long)]
        subject: String,
        name: String,
    },
    /// List a subject's topics
    List {
        #[arg(long)]
        subject: String,
    },
    /// Mark a topic as completed
    Done { id: String },
    /// Mark a completed topic as pending again
    Reopen { id: String },
    /// Delete a topic
    Remove { id: String },
}

pub fn run(action: TopicAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        TopicAction::Add { subject, name } => {
            if db.get_subject(&subject)?.is_none() {
                return Err(format!("unknown subject id: {subject}").into());
            }
            let topic = Topic::new(subject, name);
            db.insert_topic(&topic)?;
            println!("{}", serde_json::to_string_pretty(&topic)?);
        }
        TopicAction::List { subject } => {
            let topics = db.list_topics(&subject)?;
            println!("{}", serde_json::to_string_pretty(&topics)?);
        }
        TopicAction::Done { id } => {
            db.set_topic_completed(&id, true)?;
            eprintln!("Marked done.");
        }
        TopicAction::Reopen { id } => {
            db.set_topic_completed(&id, false)?;
            eprintln!("Reopened.");
        }
        TopicAction::Remove { id } => {
            db.delete_topic(&id)?;
            eprintln!("Topic deleted.");
        }
    }
    Ok(())
}
