use anyhow::Context;
use bookshelf_app::Application;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Book catalog REST service
#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Migrate, then serve the HTTP API until Ctrl-C (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Print the effective configuration as JSON
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{rendered}");
        }
        Command::Migrate => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            let app = Application::build(settings).await?;
            let applied = app.migrate().await?;
            println!("applied {applied} migration(s)");
        }
        Command::Serve => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "bookshelf serve starting");
            Application::build(settings).await?.run().await?;
        }
    }

    Ok(())
}
