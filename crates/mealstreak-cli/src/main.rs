use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mealstreak-cli", version, about = "Mealstreak CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Token and streak tracking
    Tokens {
        #[command(subcommand)]
        action: commands::tokens::TokensAction,
    },
    /// Token redemption
    Redeem {
        #[command(subcommand)]
        action: commands::redeem::RedeemAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Tokens { action } => commands::tokens::run(action),
        Commands::Redeem { action } => commands::redeem::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
