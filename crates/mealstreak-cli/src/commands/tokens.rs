use clap::Subcommand;
use mealstreak_core::{Completion, Config, DayOfWeek, MealSlot};

use super::{open_ledger, resolve_user};

#[derive(Subcommand)]
pub enum TokensAction {
    /// Print balance, streak and completed days as JSON
    Status {
        /// Act as this user instead of the configured one
        #[arg(long)]
        user: Option<String>,
    },
    /// Mark one meal slot done (+0.1 token)
    CompleteMeal {
        /// Day of week, e.g. Monday
        day: String,
        /// Meal slot: breakfast, morningSnack, lunch, afternoonSnack, dinner
        meal: String,
        #[arg(long)]
        user: Option<String>,
    },
    /// Mark a whole day done (+1 token, folds in all five meals)
    CompleteDay {
        /// Day of week, e.g. Monday
        day: String,
        #[arg(long)]
        user: Option<String>,
    },
}

pub fn run(action: TokensAction) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load_or_default();

    match action {
        TokensAction::Status { user } => {
            let ledger = open_ledger(&resolve_user(user, &cfg), &cfg)?;
            println!("{}", serde_json::to_string_pretty(&ledger.summary())?);
        }
        TokensAction::CompleteMeal { day, meal, user } => {
            let day: DayOfWeek = day.parse()?;
            let meal: MealSlot = meal.parse()?;
            let mut ledger = open_ledger(&resolve_user(user, &cfg), &cfg)?;
            if ledger.complete_meal(day, meal) == Completion::AlreadyComplete {
                eprintln!("{meal} on {day} is already completed");
            }
            println!("{}", serde_json::to_string_pretty(&ledger.summary())?);
        }
        TokensAction::CompleteDay { day, user } => {
            let day: DayOfWeek = day.parse()?;
            let mut ledger = open_ledger(&resolve_user(user, &cfg), &cfg)?;
            // The collaborator REST surface answers 400 here; the CLI
            // equivalent is a nonzero exit.
            if ledger.complete_day(day) == Completion::AlreadyComplete {
                return Err(format!("{day} is already completed").into());
            }
            println!("{}", serde_json::to_string_pretty(&ledger.summary())?);
        }
    }
    Ok(())
}
