mod app;
mod config_commands;

use std::path::PathBuf;

use {
    anyhow::bail,
    clap::{Parser, Subcommand},
    jarvis_chat::{describe_error, render},
    tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use crate::{app::App, config_commands::ConfigAction};

#[derive(Parser)]
#[command(name = "jarvis", about = "JARVIS-X, personal AI assistant with provider fallback")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Settings file (overrides discovery of ./jarvis.toml and ~/.config/jarvis/).
    #[arg(long, global = true, env = "JARVIS_CONFIG")]
    config: Option<PathBuf>,

    /// Models registry file (overrides `router.models_config_path`).
    #[arg(long, global = true)]
    models: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat on stdin (default when no subcommand is provided).
    Chat,
    /// Send a single message and print the reply.
    Ask {
        message: String,
        /// Mode to answer in (fast, code, pro, study, ...).
        #[arg(long)]
        mode: Option<String>,
        /// Force one provider instead of the fallback order.
        #[arg(long)]
        provider: Option<String>,
        /// Force one model.
        #[arg(long)]
        model: Option<String>,
    },
    /// List registry providers and their key status.
    Providers,
    /// List every provider's models.
    Models,
    /// Settings management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so replies on stdout stay clean.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "jarvis starting");

    match cli.command {
        None | Some(Commands::Chat) => {
            let app = App::load(cli.config.as_deref(), cli.models)?;
            chat(&app).await
        },
        Some(Commands::Ask {
            message,
            mode,
            provider,
            model,
        }) => {
            let app = App::load(cli.config.as_deref(), cli.models)?;
            ask(&app, &message, mode, provider, model).await
        },
        Some(Commands::Providers) => {
            let app = App::load(cli.config.as_deref(), cli.models)?;
            println!("{}", render::provider_status(&app.router()?));
            Ok(())
        },
        Some(Commands::Models) => {
            let app = App::load(cli.config.as_deref(), cli.models)?;
            println!("{}", render::model_listing(&app.router()?));
            Ok(())
        },
        Some(Commands::Config { action }) => {
            config_commands::handle_config(action, cli.config.as_deref(), cli.models.as_deref())
        },
    }
}

async fn chat(app: &App) -> anyhow::Result<()> {
    let mut session = app.session()?;
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if !app.capabilities.any_provider_key {
        eprintln!("No provider API key found. Set GEMINI_API_KEY, GROQ_API_KEY, ... and restart.");
    }
    stdout
        .write_all(b"JARVIS-X ready. Type /help for commands, exit to quit.\n")
        .await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if matches!(line, "exit" | "quit") {
            break;
        }
        let reply = session.process(line).await;
        if !reply.is_empty() {
            stdout.write_all(reply.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
        }
    }
    Ok(())
}

async fn ask(
    app: &App,
    message: &str,
    mode: Option<String>,
    provider: Option<String>,
    model: Option<String>,
) -> anyhow::Result<()> {
    let mut session = app.session()?;
    if let Some(mode) = mode
        && !session.modes_mut().set_mode(&mode)
    {
        bail!("unknown mode '{mode}'");
    }
    if let Some(provider) = provider
        && let Err(e) = session.router_mut().set_provider(&provider)
    {
        bail!(describe_error(&e));
    }
    if let Some(model) = model {
        session.router_mut().set_model(&model);
    }

    match session.send(message).await {
        Ok(reply) => {
            println!("{reply}");
            Ok(())
        },
        Err(e) => {
            tracing::debug!(error = %e, "ask failed");
            eprintln!("{}", describe_error(&e));
            std::process::exit(1);
        },
    }
}
