use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use affiliate_redirect::affiliate::{classify, Rewrite};
use affiliate_redirect::settings::{FileSettingsStore, GlobalSettings, SettingsStore, SETTINGS_KEY};

#[derive(Parser)]
#[command(name = "affiliate-cli")]
#[command(about = "Inspect affiliate settings and preview rewrites", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the affiliate URL a destination would be rewritten to
    Rewrite {
        /// Directory holding the settings record
        #[arg(short, long, default_value = "./data")]
        settings: PathBuf,

        /// Destination URL
        url: String,
    },
    /// List configured merchants
    Merchants {
        /// Directory holding the settings record
        #[arg(short, long, default_value = "./data")]
        settings: PathBuf,
    },
    /// Fetch the settings record from a running service
    RemoteSettings {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,

        #[arg(short, long)]
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rewrite { settings, url } => {
            let settings = load_local(&settings)?;
            match affiliate_redirect::rewrite(&url, &settings) {
                Rewrite::Rewritten(payload) => println!("{}", payload.target_url),
                Rewrite::NotApplicable => match classify(&url, &settings.merchants) {
                    Err(reason) => println!("no rewrite: {reason}"),
                    Ok(merchant) => println!("no rewrite: building link for {} failed", merchant.key),
                },
            }
        }
        Commands::Merchants { settings } => {
            let settings = load_local(&settings)?;
            println!(
                "affiliate id: {}",
                if settings.affiliate_id.is_empty() { "(unset)" } else { settings.affiliate_id.as_str() }
            );
            for merchant in settings.merchants.iter() {
                println!(
                    "{:<20} {:<8} mid={:<10} {}",
                    merchant.key,
                    if merchant.enabled { "enabled" } else { "disabled" },
                    merchant.network_merchant_id,
                    merchant.domains.join(", ")
                );
            }
        }
        Commands::RemoteSettings { url, key } => {
            let mut headers = HeaderMap::new();
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", key))?,
            );

            let res = reqwest::Client::new()
                .get(format!("{}/admin/settings", url.trim_end_matches('/')))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn load_local(dir: &Path) -> Result<GlobalSettings, Box<dyn std::error::Error>> {
    let store = FileSettingsStore::new(dir);
    store
        .load(SETTINGS_KEY)?
        .ok_or_else(|| format!("no settings record at {}", store.path_for(SETTINGS_KEY).display()).into())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
