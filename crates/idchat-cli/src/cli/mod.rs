//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use idchat_core::chat::ChatClient;
use idchat_core::config::Config;
use idchat_core::identity::SessionManager;
use idchat_core::{identity, logging};

mod commands;

#[derive(Parser)]
#[command(name = "idchat")]
#[command(version)]
#[command(about = "Chat with your backend after signing in with OpenID Connect")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the chat endpoint from config
    #[arg(long, global = true, value_name = "URL")]
    endpoint: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in with the browser
    Login,
    /// Sign the active account out
    Logout,
    /// Show the signed-in account
    Status,
    /// Send one prompt and print the reply
    Ask {
        /// The prompt to send
        #[arg(short, long)]
        prompt: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

/// Everything a non-config command needs, built from the loaded config.
struct App {
    config: Config,
    sessions: SessionManager,
    client: ChatClient,
    _log_guard: logging::WorkerGuard,
}

impl App {
    fn load(endpoint: Option<&str>) -> Result<Self> {
        let mut config = Config::load().context("load config")?;
        if let Some(endpoint) = endpoint.map(str::trim)
            && !endpoint.is_empty()
        {
            config.chat.endpoint = endpoint.to_string();
        }

        let log_guard = logging::init(&config.log).context("init logging")?;
        tracing::info!(endpoint = %config.chat.endpoint, "idchat starting");

        let sessions = identity::connect(&config.identity)?;
        let client = ChatClient::new(config.chat.endpoint.clone());
        Ok(Self {
            config,
            sessions,
            client,
            _log_guard: log_guard,
        })
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, endpoint } = cli;

    // default to the interactive app
    let Some(command) = command else {
        let app = App::load(endpoint.as_deref())?;
        return commands::chat::run(&app.config, app.sessions.clone(), app.client.clone()).await;
    };

    match command {
        // Config commands must work before a valid config exists.
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
        Commands::Login => {
            let app = App::load(endpoint.as_deref())?;
            commands::auth::login(&app.sessions).await
        }
        Commands::Logout => {
            let app = App::load(endpoint.as_deref())?;
            commands::auth::logout(&app.sessions).await
        }
        Commands::Status => {
            let app = App::load(endpoint.as_deref())?;
            commands::auth::status(&app.sessions);
            Ok(())
        }
        Commands::Ask { prompt } => {
            let app = App::load(endpoint.as_deref())?;
            commands::ask::run(&app.sessions, &app.client, &prompt).await
        }
    }
}
