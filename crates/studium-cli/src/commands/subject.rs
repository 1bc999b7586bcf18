use clap::Subcommand;
use studium_core::storage::Database;
use studium_core::Subject;

#[derive(Subcommand)]
pub enum SubjectAction {
    /// Create a subject
    Add {
        name: String,
        /// Display color, any CSS-style string
        #[arg(long, default_value = "#7c9a92")]
        color: String,
    },
    /// List subjects
    List {
        /// Include archived subjects
        #[arg(long)]
        archived: bool,
    },
    /// Hide a subject from the active list, keeping its history
    Archive { id: String },
    /// Bring an archived subject back
    Restore { id: String },
    /// Delete a subject and everything recorded under it
    Remove { id: String },
}

pub fn run(action: SubjectAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut db = Database::open()?;
    match action {
        SubjectAction::Add { name, color } => {
            let subject = Subject::new(name, color);
            db.insert_subject(&subject)?;
            println!("{}", serde_json::to_string_pretty(&subject)?);
        }
        SubjectAction::List { archived } => {
            let subjects = db.list_subjects(archived)?;
            println!("{}", serde_json::to_string_pretty(&subjects)?);
        }
        SubjectAction::Archive { id } => {
            require_subject(&db, &id)?;
            db.set_subject_archived(&id, true)?;
            eprintln!("Archived.");
        }
        SubjectAction::Restore { id } => {
            require_subject(&db, &id)?;
            db.set_subject_archived(&id, false)?;
            eprintln!("Restored.");
        }
        SubjectAction::Remove { id } => {
            require_subject(&db, &id)?;
            db.delete_subject(&id)?;
            eprintln!("Subject, its topics and its sessions deleted.");
        }
    }
    Ok(())
}

fn require_subject(db: &Database, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db.get_subject(id)?.is_none() {
        return Err(format!("unknown subject id: {id}").into());
    }
    Ok(())
}
