use clap::Subcommand;
use mealstreak_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the full configuration as JSON
    Show,
    /// Get a value by dot-separated key, e.g. rewards.donate_cost
    Get { key: String },
    /// Set a value by dot-separated key
    Set { key: String, value: String },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let cfg = Config::load_or_default();
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
        ConfigAction::Get { key } => {
            let cfg = Config::load_or_default();
            match cfg.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown config key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut cfg = Config::load_or_default();
            cfg.set(&key, &value)?;
            println!("{key} = {value}");
        }
    }
    Ok(())
}
