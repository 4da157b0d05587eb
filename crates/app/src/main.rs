use clap::{Parser, Subcommand};
use homebase_app::{AppState, telemetry};
use homebase_config::Settings;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "homebase",
    about = "Resolve the signed-in user's apartment or join one by invite code"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in with email and password, then route.
    SignIn { email: String, password: String },
    /// Redeem an invite code.
    Join {
        #[arg(value_name = "CODE")]
        code: String,
    },
    /// Forget the persisted session.
    SignOut,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load()?;
    telemetry::init(&settings.telemetry)?;
    info!(store = %settings.store.base_url, auth = %settings.auth.base_url, "starting homebase");

    let state = AppState::new(settings)?;
    let reconciler = &state.reconciler;

    // No subcommand: route whoever is already signed in.
    let outcome = match cli.command {
        None => Ok(reconciler.reconcile().await),
        Some(Command::SignIn { email, password }) => reconciler.sign_in(&email, &password).await,
        Some(Command::Join { code }) => reconciler.redeem_invite(&code).await,
        Some(Command::SignOut) => Ok(reconciler.sign_out().await),
    };

    match outcome {
        Ok(route) => println!("{}", serde_json::to_string_pretty(&route)?),
        Err(notice) => {
            eprintln!("{notice}");
            std::process::exit(1);
        }
    }
    Ok(())
}
