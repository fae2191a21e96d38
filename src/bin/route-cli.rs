use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::path::PathBuf;

use carrier_route::codec::{record_from_data, RouteFormat, RouteStore};
use carrier_route::routing::{route, RouteRequest};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Inspect route files and manage a running carrier-routed", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and build a route file, reporting the first error
    Check {
        file: PathBuf,
        #[arg(short, long)]
        format: Option<RouteFormat>,
    },
    /// Route one number against a route file
    Lookup {
        file: PathBuf,
        #[arg(short, long)]
        domain: String,
        #[arg(short, long)]
        number: String,
        #[arg(short, long)]
        carrier: Option<String>,
        /// Destination kept when the chosen rule has no host.
        #[arg(long)]
        destination: Option<String>,
        /// Selection key for hash-based rules.
        #[arg(short, long)]
        key: Option<String>,
        #[arg(long)]
        probing: bool,
    },
    /// Re-render a route file, optionally converting its format
    Dump {
        file: PathBuf,
        #[arg(short, long, default_value = "native")]
        format: RouteFormat,
    },
    /// Ask a running daemon to reload its route file
    Reload {
        #[arg(short, long, default_value = "http://localhost:8081")]
        url: String,
        #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION")]
        key: String,
    },
    /// Show the status of a running daemon
    Status {
        #[arg(short, long, default_value = "http://localhost:8081")]
        url: String,
        #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION")]
        key: String,
    },
}

fn open_store(file: PathBuf, format: Option<RouteFormat>) -> RouteStore {
    match format {
        Some(format) => RouteStore::with_format(file, format),
        None => RouteStore::new(file),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file, format } => {
            let data = open_store(file, format).load()?;
            println!(
                "ok: {} carrier(s), {} domain(s), {} rule(s)",
                data.carriers().len(),
                data.domain_count(),
                data.rule_count()
            );
        }
        Commands::Lookup {
            file,
            domain,
            number,
            carrier,
            destination,
            key,
            probing,
        } => {
            let data = RouteStore::new(file).load()?;
            let mut request = RouteRequest::new(&domain, &number).allow_probing(probing);
            if let Some(carrier) = carrier.as_deref() {
                request = request.carrier(carrier);
            }
            if let Some(destination) = destination.as_deref() {
                request = request.destination(destination);
            }
            if let Some(key) = key.as_deref() {
                request = request.selection_key(key);
            }
            let outcome = route(&data, &request, &mut rand::thread_rng());
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Dump { file, format } => {
            let data = RouteStore::new(file).load()?;
            print!("{}", format.encode(&record_from_data(&data))?);
        }
        Commands::Reload { url, key } => {
            let res = reqwest::Client::new()
                .post(format!("{}/admin/reload", url))
                .headers(auth_headers(&key)?)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Status { url, key } => {
            let res = reqwest::Client::new()
                .get(format!("{}/admin/status", url))
                .headers(auth_headers(&key)?)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn auth_headers(key: &str) -> Result<HeaderMap, Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
    Ok(headers)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Err(format!("request failed with {}", status).into());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
