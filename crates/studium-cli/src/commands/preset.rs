use clap::Subcommand;
use studium_core::storage::Config;
use studium_core::timer::IntervalConfig;
use studium_core::IntervalPreset;

#[derive(Subcommand)]
pub enum PresetAction {
    /// Save a study/break duration pair
    Add {
        name: String,
        /// Study phase length in minutes
        #[arg(long = "study")]
        study_minutes: u64,
        /// Break phase length in minutes
        #[arg(long = "break")]
        break_minutes: u64,
    },
    /// List saved presets
    List,
    /// Delete a preset
    Remove { id: String },
}

pub fn run(action: PresetAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    match action {
        PresetAction::Add {
            name,
            study_minutes,
            break_minutes,
        } => {
            // Same validation the timer applies at session start.
            IntervalConfig::new(study_minutes, break_minutes)?;
            let preset = IntervalPreset::new(name, study_minutes, break_minutes);
            config.add_preset(preset.clone())?;
            println!("{}", serde_json::to_string_pretty(&preset)?);
        }
        PresetAction::List => {
            println!("{}", serde_json::to_string_pretty(&config.presets)?);
        }
        PresetAction::Remove { id } => {
            if config.remove_preset(&id)? {
                eprintln!("Preset deleted.");
            } else {
                return Err(format!("unknown preset id: {id}").into());
            }
        }
    }
    Ok(())
}
