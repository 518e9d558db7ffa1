use anyhow::Result;
use clap::{Parser, Subcommand};
use guidely_core::api::{self, proxy};
use guidely_core::config::{self, Config};
use guidely_core::planner::TravelPlanner;
use std::io::{BufRead, Write};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
mod onboard;

#[derive(Parser)]
#[command(name = "guidely")]
#[command(about = "guidely - AI travel planner with live data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive first-time setup
    Onboard,
    /// Plan a single trip and print the itinerary
    Plan {
        #[arg(short, long)]
        query: String,
    },
    /// Ask one question per line
    Chat,
    /// Run the HTTP backend
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run the front proxy that forwards to the backend
    Proxy {
        #[arg(short, long)]
        port: Option<u16>,
        #[arg(long)]
        backend_url: Option<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guidely_core=info,guidely=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn print_answer(answer: &str) {
    termimad::print_text(answer);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let command = cli.command.unwrap_or_else(|| {
        if !config::config_exists() {
            Commands::Onboard
        } else {
            Commands::Chat
        }
    });

    match command {
        Commands::Onboard => {
            let onboard_config = onboard::run_onboard().map_err(|e| {
                eprintln!("❌ Onboarding failed: {}", e);
                anyhow::anyhow!("Onboarding failed: {}", e)
            })?;
            config::save_config(&onboard_config)?;
        }
        Commands::Plan { query } => {
            let planner = load_planner()?;

            println!("\n🧭 Planning...\n");
            match planner.submit_query(&query).await {
                Ok(answer) => print_answer(&answer),
                Err(e) => {
                    eprintln!("❌ Error: {}", e);
                    anyhow::bail!("Planning failed: {}", e);
                }
            }
        }
        Commands::Chat => {
            let planner = load_planner()?;
            chat(&planner).await;
        }
        Commands::Serve { host, port } => {
            let config = Config::load_or_init()?;
            let planner = TravelPlanner::from_config(&config)?;
            let addr = format!(
                "{}:{}",
                host.unwrap_or(config.server.host),
                port.unwrap_or(config.server.port)
            );

            tokio::select! {
                result = api::serve(planner, &addr) => result?,
                _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down backend"),
            }
        }
        Commands::Proxy { port, backend_url } => {
            let config = Config::load_or_init()?;
            let state = proxy::ProxyState::new(
                backend_url.unwrap_or(config.server.backend_url),
                Duration::from_secs(config.server.proxy_timeout_secs),
            )?;
            let addr = format!(
                "{}:{}",
                config.server.host,
                port.unwrap_or(config.server.proxy_port)
            );

            tokio::select! {
                result = proxy::serve(state, &addr) => result?,
                _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down proxy"),
            }
        }
    }

    Ok(())
}

fn load_planner() -> Result<TravelPlanner> {
    let config = Config::load_or_init()?;
    TravelPlanner::from_config(&config).map_err(|e| {
        eprintln!("❌ Error: {:#}", e);
        e
    })
}

/// Every line is an independent query; nothing carries over between them.
async fn chat(planner: &TravelPlanner) {
    println!("🧭 guidely");
    println!("Where do you want to go? (Ctrl+D to exit)\n");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) | Err(_) => {
                println!("\n👋 Goodbye!");
                break;
            }
            Ok(_) => {
                let input = input.trim();
                if input.is_empty() {
                    continue;
                }

                println!("\n🧭 Planning...\n");
                match planner.submit_query(input).await {
                    Ok(answer) => print_answer(&answer),
                    Err(e) => eprintln!("❌ Error: {}", e),
                }
                println!();
            }
        }
    }
}
