use clap::{Parser, Subcommand};
use serde_json::Value;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "voice-gateway-cli")]
#[command(about = "Operator CLI for the voice gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Liveness status
    Health,
    /// Dependency readiness report
    Ready,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let path = match cli.command {
        Commands::Health => "/health",
        Commands::Ready => "/ready",
    };

    match fetch(&format!("{}{}", cli.url.trim_end_matches('/'), path)).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

async fn fetch(url: &str) -> Result<bool, reqwest::Error> {
    let res = reqwest::get(url).await?;
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or(text)
        ),
        Err(_) => println!("{}", text),
    }

    if !status.is_success() {
        eprintln!("Gateway returned status {}", status);
    }
    Ok(status.is_success())
}
