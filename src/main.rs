use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod config;
mod controller;
mod conversation;
mod error;
mod handler;
mod models;
mod pipeline;
mod service;
mod tui;
mod ui;
mod wikipedia;

#[cfg(test)]
mod testing;

use app::App;
use config::Config;
use controller::RequestController;
use models::{DiagnosisResult, Phase};
use pipeline::{Pipeline, Variant};
use service::DiagnosisClient;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "symptom-chat")]
#[command(version, about = "Describe symptoms, get likely conditions and care advice")]
struct Cli {
    /// Base URL of the diagnosis service
    #[arg(long, global = true, env = "SYMPTOM_CHAT_SERVICE_URL")]
    service_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat and analysis screens (default)
    Chat,
    /// Analyze one symptom description and print the top matches
    Analyze {
        /// Free-text symptom description
        text: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Chat);

    // The terminal UI draws on stderr, so chat logs go to a file
    init_logging(matches!(command, Commands::Chat))?;

    let config = Config::load()?.with_service_url(cli.service_url);

    match command {
        Commands::Chat => run_tui(config).await,
        Commands::Analyze { text, json } => analyze_once(&config, &text, json).await,
        Commands::Config { init } => show_config(&config, init),
    }
}

fn init_logging(to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "symptom_chat=info".into());

    if to_file {
        let dir = Config::config_dir()?;
        fs::create_dir_all(&dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("symptom-chat.log"))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

async fn run_tui(config: Config) -> Result<()> {
    let mut app = App::new(&config)?;
    info!(service_url = %config.service_url, "starting chat");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = async {
        loop {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await,
                None => break,
            }

            if app.should_quit {
                break;
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

async fn analyze_once(config: &Config, text: &str, json: bool) -> Result<()> {
    // Single-shot runs never enrich, so no image client is built
    let service = Arc::new(DiagnosisClient::new(&config.service_url));
    let mut controller =
        RequestController::new(Pipeline::without_images(service), Variant::SingleShot);

    controller.submit(text).await;

    let state = controller.state();
    match (state.phase, controller.current()) {
        (Phase::Success, Some(result)) => {
            if json {
                println!("{}", serde_json::to_string_pretty(result)?);
            } else {
                print_result(result);
            }
            Ok(())
        }
        _ => Err(anyhow!(
            "{}",
            state.error_message.as_deref().unwrap_or("No result")
        )),
    }
}

fn print_result(result: &DiagnosisResult) {
    println!("Extracted Symptoms: {}", result.symptoms.join(", "));

    if result.top_diseases.is_empty() {
        println!("No matching diseases");
        return;
    }

    println!("\nTop Matching Diseases");
    for (i, m) in result.top_diseases.iter().enumerate() {
        println!("\n{}. {} ({})", i + 1, m.disease, m.match_label());
        if !m.workouts.is_empty() {
            println!("   Recommended Workouts:");
            for workout in &m.workouts {
                println!("     • {}", workout);
            }
        }
        if !m.precautions.is_empty() {
            println!("   Precautions:");
            for precaution in &m.precautions {
                println!("     • {}", precaution);
            }
        }
    }
}

fn show_config(config: &Config, init: bool) -> Result<()> {
    if init {
        config.save()?;
        println!("Wrote {}", Config::config_dir()?.join("config.json").display());
    }
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
