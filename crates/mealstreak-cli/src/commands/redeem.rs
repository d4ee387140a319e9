use chrono::NaiveDate;
use clap::Subcommand;
use mealstreak_core::{Config, ConsultRequest};

use super::{open_ledger, resolve_user};

#[derive(Subcommand)]
pub enum RedeemAction {
    /// Print redemption history as JSON, newest first
    List {
        #[arg(long)]
        user: Option<String>,
    },
    /// Redeem tokens for a food donation
    Donate {
        #[arg(long)]
        user: Option<String>,
    },
    /// Redeem tokens for a dietitian consultation booking
    Consult {
        /// Name for the booking
        #[arg(long)]
        name: String,
        /// Booking date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Booking time, e.g. 14:00
        #[arg(long)]
        time: String,
        /// Goals to discuss
        #[arg(long)]
        goals: String,
        #[arg(long)]
        user: Option<String>,
    },
}

pub fn run(action: RedeemAction) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load_or_default();

    match action {
        RedeemAction::List { user } => {
            let ledger = open_ledger(&resolve_user(user, &cfg), &cfg)?;
            println!("{}", serde_json::to_string_pretty(&ledger.redemptions()?)?);
        }
        RedeemAction::Donate { user } => {
            let mut ledger = open_ledger(&resolve_user(user, &cfg), &cfg)?;
            let redemption = ledger.redeem_donate(cfg.rewards.donate_cost)?;
            println!("{}", serde_json::to_string_pretty(&redemption)?);
        }
        RedeemAction::Consult {
            name,
            date,
            time,
            goals,
            user,
        } => {
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| format!("invalid date '{date}': {e}"))?;
            let mut ledger = open_ledger(&resolve_user(user, &cfg), &cfg)?;
            let redemption = ledger.redeem_consult(
                cfg.rewards.consult_cost,
                ConsultRequest {
                    name,
                    date,
                    time,
                    goals,
                },
            )?;
            println!("{}", serde_json::to_string_pretty(&redemption)?);
        }
    }
    Ok(())
}
