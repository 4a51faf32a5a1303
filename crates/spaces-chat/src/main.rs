use clap::{Parser, Subcommand};
use spaces_client::ClientConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod client_data;
mod fortune;
mod guest;

#[derive(Parser)]
#[command(name = "spaces-chat")]
#[command(about = "Chat in a Spaces group space from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Briefly join a space as an anonymous guest.
    Guest {
        /// Space to enter; falls back to SPACES_SPACE_ID.
        #[arg(env = "SPACES_SPACE_ID")]
        space_id: String,
        #[arg(long, default_value = "Mr. Anonymous")]
        display_name: String,
        #[arg(long, default_value = "Hello from spaces-chat")]
        message: String,
        /// How long to print incoming messages before leaving.
        #[arg(long, default_value_t = 60)]
        listen_secs: u64,
    },
    /// Answer "@fortune" messages in a space with fortune(1) output.
    Fortune {
        /// Space to enter; falls back to SPACES_SPACE_ID.
        #[arg(env = "SPACES_SPACE_ID")]
        space_id: String,
        #[arg(long, env = "SPACES_REFRESH_TOKEN")]
        refresh_token: String,
        /// File holding `client_id=` and `client_secret=` lines.
        #[arg(long, default_value = ".client_data")]
        client_data: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;

    info!("=== spaces-chat {} ===", spaces_client::VERSION);
    match cli.command {
        Command::Guest {
            space_id,
            display_name,
            message,
            listen_secs,
        } => {
            guest::run(
                config,
                guest::GuestOptions {
                    space_id,
                    display_name,
                    message,
                    listen_secs,
                },
            )
            .await
        }
        Command::Fortune {
            space_id,
            refresh_token,
            client_data,
        } => {
            let client = client_data::read_client_data(&client_data)?;
            fortune::run(config, &space_id, &refresh_token, client).await
        }
    }
}
